//! Record parsing for the tab-separated corpus and query files.
//!
//! Lines with an unexpected field count are dropped by the callers, not
//! treated as fatal: the MS MARCO dumps contain a handful of such records.

/// A single corpus record: `doc_id\turl\ttitle\tbody`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocRecord {
    pub doc_id: String,
    pub url: String,
    pub title: String,
    pub body: String,
}

impl DocRecord {
    /// Parse one corpus line. Returns [None] unless the line has exactly
    /// four tab-separated fields.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\n', '\r']);
        let mut fields = line.split('\t');
        let doc_id = fields.next()?;
        let url = fields.next()?;
        let title = fields.next()?;
        let body = fields.next()?;
        if fields.next().is_some() {
            return None;
        }
        Some(DocRecord {
            doc_id: doc_id.to_string(),
            url: url.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        })
    }

    /// Tokenizer input: url, title and body joined by single spaces.
    pub fn text(&self) -> String {
        format!("{} {} {}", self.url, self.title, self.body)
    }
}

/// A single query record: `query_id\tquery_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRecord {
    pub query_id: String,
    pub text: String,
}

impl QueryRecord {
    /// Parse one query line. Returns [None] unless the line has exactly
    /// two tab-separated fields.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\n', '\r']);
        let mut fields = line.split('\t');
        let query_id = fields.next()?;
        let text = fields.next()?;
        if fields.next().is_some() {
            return None;
        }
        Some(QueryRecord {
            query_id: query_id.to_string(),
            text: text.to_string(),
        })
    }
}
