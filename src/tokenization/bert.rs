//! BERT-style WordPiece tokenization built from a plain vocabulary file.
use std::path::Path;

use tokenizers::models::wordpiece::WordPiece;
use tokenizers::normalizers::BertNormalizer;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::processors::bert::BertProcessing;
use tokenizers::Tokenizer;

use crate::error::Error;

pub const CLS: &str = "[CLS]";
pub const SEP: &str = "[SEP]";
pub const UNK: &str = "[UNK]";
/// Prefix marking a sub-word token that continues the previous token.
pub const CONTINUATION: &str = "##";

/// A WordPiece tokenizer with the usual BERT pipeline: Bert normalizer,
/// Bert pre-tokenizer, and `[CLS]`/`[SEP]` boundary tokens on batch
/// encodes.
pub struct BertWordPiece {
    tokenizer: Tokenizer,
}

impl BertWordPiece {
    /// Build from a vocabulary file (one token per line).
    ///
    /// The vocabulary must contain the boundary tokens, since document
    /// encodes carry them.
    pub fn from_vocab(vocab: &Path, lowercase: bool) -> Result<Self, Error> {
        let vocab = vocab
            .to_str()
            .ok_or_else(|| Error::Config(format!("non-UTF8 vocabulary path: {:?}", vocab)))?;
        let model = WordPiece::from_file(vocab)
            .unk_token(UNK.to_string())
            .continuing_subword_prefix(CONTINUATION.to_string())
            .build()?;

        let mut tokenizer = Tokenizer::new(model);
        let sep = tokenizer
            .token_to_id(SEP)
            .ok_or_else(|| Error::Config(format!("vocabulary {} has no {} token", vocab, SEP)))?;
        let cls = tokenizer
            .token_to_id(CLS)
            .ok_or_else(|| Error::Config(format!("vocabulary {} has no {} token", vocab, CLS)))?;
        tokenizer.with_normalizer(BertNormalizer::new(true, true, None, lowercase));
        tokenizer.with_pre_tokenizer(BertPreTokenizer);
        tokenizer.with_post_processor(BertProcessing::new(
            (SEP.to_string(), sep),
            (CLS.to_string(), cls),
        ));

        Ok(BertWordPiece { tokenizer })
    }

    /// Batch-encode a whole chunk in one call. Boundary tokens included.
    pub fn encode_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<String>>, Error> {
        let encodings = self.tokenizer.encode_batch(texts, true)?;
        Ok(encodings
            .into_iter()
            .map(|e| e.get_tokens().to_vec())
            .collect())
    }

    /// Encode a single record without boundary tokens.
    pub fn encode(&self, text: &str) -> Result<Vec<String>, Error> {
        let encoding = self.tokenizer.encode(text, false)?;
        Ok(encoding.get_tokens().to_vec())
    }
}

/// Drop a leading `[CLS]` and a trailing `[SEP]` when present.
pub fn strip_boundaries(tokens: &[String]) -> &[String] {
    let mut tokens = tokens;
    if let Some((first, rest)) = tokens.split_first() {
        if first.as_str() == CLS {
            tokens = rest;
        }
    }
    if let Some((last, rest)) = tokens.split_last() {
        if last.as_str() == SEP {
            tokens = rest;
        }
    }
    tokens
}

/// Join sub-word tokens with spaces, fusing continuation tokens onto
/// their predecessor: `["play", "##ing"]` becomes `"playing"`.
pub fn normalized_text(tokens: &[String]) -> String {
    let mut out = String::new();
    for token in tokens {
        match token.strip_prefix(CONTINUATION) {
            Some(continuation) => out.push_str(continuation),
            None => {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(token);
            }
        }
    }
    out
}
