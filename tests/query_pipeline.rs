use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use marcoprep::config::{Config, Step};
use marcoprep::pipelines::{Pipeline, QuerySet, QueryTokenizer};

const VOCAB: &str = "[PAD]\n[UNK]\n[CLS]\n[SEP]\n[MASK]\nwhat\nis\nplay\n##ing\n";

fn setup(train: &str, dev: &str) -> (tempfile::TempDir, Config) {
    let home = tempfile::tempdir().unwrap();
    let queries = home.path().join("queries");
    fs::create_dir_all(&queries).unwrap();
    fs::write(queries.join("msmarco-doctrain-queries.tsv"), train).unwrap();
    fs::write(queries.join("msmarco-docdev-queries.tsv"), dev).unwrap();
    let vocab = home.path().join("vocab.txt");
    fs::write(&vocab, VOCAB).unwrap();
    let config = Config {
        data_home: home.path().to_path_buf(),
        force_steps: HashSet::new(),
        number_of_cpus: 1,
        corpus_size: 0,
        train_queries: 2,
        full_dev_queries: 1,
        tokenizer_vocab_path: vocab,
        bert_class: "distilbert-base-uncased".to_string(),
    };
    (home, config)
}

fn train_output(config: &Config, ext: &str) -> PathBuf {
    config
        .data_home
        .join("queries")
        .join(format!("msmarco-doctrain-queries.tsv.{}", ext))
}

#[test]
fn writes_both_output_forms() {
    let (_home, config) = setup("1\twhat is playing\n2\tplaying\n", "3\twhat is\n");
    QueryTokenizer::new(&config, QuerySet::Train).run().unwrap();
    QueryTokenizer::new(&config, QuerySet::Dev).run().unwrap();

    let tokenized = fs::read_to_string(train_output(&config, "tokenized")).unwrap();
    assert_eq!(tokenized, "1\twhat is playing\n2\tplaying\n");
    let bert = fs::read_to_string(train_output(&config, "bert")).unwrap();
    assert_eq!(bert, "1\twhat is play ##ing\n2\tplay ##ing\n");

    let dev_tokenized = fs::read_to_string(
        config
            .data_home
            .join("queries")
            .join("msmarco-docdev-queries.tsv.tokenized"),
    )
    .unwrap();
    assert_eq!(dev_tokenized, "3\twhat is\n");
}

#[test]
fn rerun_short_circuits_unless_forced() {
    let (_home, mut config) = setup("1\tplaying\n", "2\tplaying\n");
    QueryTokenizer::new(&config, QuerySet::Train).run().unwrap();

    let tokenized_path = train_output(&config, "tokenized");
    fs::write(&tokenized_path, "sentinel\n").unwrap();
    QueryTokenizer::new(&config, QuerySet::Train).run().unwrap();
    assert_eq!(fs::read_to_string(&tokenized_path).unwrap(), "sentinel\n");

    config.force_steps.insert(Step::TrainQueryTokenizer);
    QueryTokenizer::new(&config, QuerySet::Train).run().unwrap();
    assert_eq!(
        fs::read_to_string(&tokenized_path).unwrap(),
        "1\tplaying\n"
    );
}

#[test]
fn forcing_one_set_does_not_force_the_other() {
    let (_home, mut config) = setup("1\tplaying\n", "2\tplaying\n");
    QueryTokenizer::new(&config, QuerySet::Train).run().unwrap();
    QueryTokenizer::new(&config, QuerySet::Dev).run().unwrap();

    let dev_path = config
        .data_home
        .join("queries")
        .join("msmarco-docdev-queries.tsv.tokenized");
    fs::write(&dev_path, "sentinel\n").unwrap();

    config.force_steps.insert(Step::TrainQueryTokenizer);
    QueryTokenizer::new(&config, QuerySet::Dev).run().unwrap();
    assert_eq!(fs::read_to_string(&dev_path).unwrap(), "sentinel\n");
}

#[test]
fn malformed_query_lines_are_dropped() {
    let (_home, config) = setup("1\tplaying\nno tab here\n3\twhat\n", "2\tplaying\n");
    QueryTokenizer::new(&config, QuerySet::Train).run().unwrap();

    let tokenized = fs::read_to_string(train_output(&config, "tokenized")).unwrap();
    assert_eq!(tokenized.lines().count(), 2);
    assert_eq!(tokenized, "1\tplaying\n3\twhat\n");
}

#[test]
fn missing_query_file_is_a_configuration_error() {
    let (_home, config) = setup("1\tplaying\n", "2\tplaying\n");
    fs::remove_file(config.data_home.join("queries").join("msmarco-docdev-queries.tsv"))
        .unwrap();
    assert!(QueryTokenizer::new(&config, QuerySet::Dev).run().is_err());
}
