// End-to-end tests against the bundled rule table in data/.

use std::fs;
use std::path::PathBuf;

use nefnir::{CasePolicy, Config, Error, Lemmatizer, Record, RuleTable, StreamProcessor};

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

fn lemmatizer(case_policy: CasePolicy) -> Lemmatizer {
    let config = Config {
        case_policy,
        ..Config::from_data_dir(data_dir())
    };
    Lemmatizer::from_config(&config).expect("bundled rules should load")
}

fn lemmatize_text(lem: &Lemmatizer, input: &str) -> String {
    let mut out = Vec::new();
    StreamProcessor::new(lem, "\t")
        .unwrap()
        .process(input.as_bytes(), &mut out)
        .unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn readme_example() {
    let lem = lemmatizer(CasePolicy::ProperNoun);
    let output = lemmatize_text(&lem, "Hvað\tfshen\nvar\tsfg3eþ\nþetta\tfahen\n?\t?\n");
    assert_eq!(
        output,
        "Hvað\tfshen\thver\nvar\tsfg3eþ\tvera\nþetta\tfahen\tþessi\n?\t?\t?\n"
    );
}

#[test]
fn bundled_rules_cover_suffixes_and_forms() {
    let lem = lemmatizer(CasePolicy::ProperNoun);
    let cases = [
        ("Maðurinn", "nkeng", "maður"),
        ("Menn", "nkeng", "maður"),
        ("hestinn", "nkeng", "hest"),
        ("Halldórs", "nken-s", "Halldór"),
        ("kallaði", "sfg3eþ", "kallaða"),
        ("svaf", "sfg3eþ", "svaf"),
        ("Hestur", "nkfng", "Hestur"),
    ];
    for (form, tag, expected) in cases {
        assert_eq!(lem.lemmatize(form, tag), expected, "({form}, {tag})");
    }
}

#[test]
fn restore_policy_copies_form_case() {
    let lem = lemmatizer(CasePolicy::Restore);
    assert_eq!(lem.lemmatize("Maðurinn", "nkeng"), "Maður");
    assert_eq!(lem.lemmatize("MAÐURINN", "nkeng"), "MAÐUR");
    assert_eq!(lem.lemmatize("Hvað", "fshen"), "Hver");
}

#[test]
fn resolution_is_deterministic() {
    let first = lemmatizer(CasePolicy::ProperNoun);
    let second = lemmatizer(CasePolicy::ProperNoun);
    let input = "Maðurinn\tnkeng\nvar\tsfg3eþ\n\nHalldórs\tnken-s\n";
    assert_eq!(lemmatize_text(&first, input), lemmatize_text(&second, input));
}

#[test]
fn record_counts_round_trip() {
    let lem = lemmatizer(CasePolicy::ProperNoun);
    let input = "Hvað\tfshen\nvar\tsfg3eþ\n\nþetta\tfahen\n.\t.\n\n";
    let output = lemmatize_text(&lem, input);

    let blank = |s: &str| s.lines().filter(|l| l.is_empty()).count();
    let non_blank = |s: &str| s.lines().filter(|l| !l.is_empty()).count();
    assert_eq!(blank(&output), blank(input));
    assert_eq!(non_blank(&output), non_blank(input));
    for (i, line) in input.lines().enumerate() {
        let out = output.lines().nth(i).unwrap();
        assert_eq!(line.is_empty(), out.is_empty(), "line {}", i + 1);
        assert!(out.starts_with(line));
    }
}

#[test]
fn batch_resolution_matches_single() {
    let lem = lemmatizer(CasePolicy::Restore);
    let records = vec![
        Record::new("Maðurinn", "nkeng"),
        Record::new("var", "sfg3eþ"),
        Record::new("Halldórs", "nken-s"),
    ];
    let resolved = lem.lemmatize_batch(records.clone(), std::num::NonZeroUsize::new(2).unwrap());
    for (record, out) in records.iter().zip(&resolved) {
        assert_eq!(out.lemma, lem.lemmatize(&record.form, &record.tag));
    }
}

#[test]
fn tsv_rule_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.tsv");
    fs::write(
        &path,
        "# tag\tsuffix\treplacement\tweight\tkind\n\
         nkeng\tinn\t\t4\n\
         nkeng\tinn\tinn\t9\n\
         nk\turinn\tur\t1\n\
         sfg3eþ\tvar\tvera\t0\tform\n",
    )
    .unwrap();

    let table = RuleTable::load(&path).unwrap();
    assert_eq!(table.len(), 3);

    let lem = Lemmatizer::new(table);
    assert_eq!(lem.lemmatize("hestinn", "nkeng"), "hestinn");
    assert_eq!(lem.lemmatize("maðurinn", "nkeng"), "maður");
    assert_eq!(lem.lemmatize("var", "sfg3eþ"), "vera");
}

#[test]
fn conflicting_rules_fail_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.tsv");
    fs::write(&path, "nkeng\tinn\t\t4\nnkeng\tinn\tur\t4\n").unwrap();
    assert!(matches!(
        RuleTable::load(&path),
        Err(Error::DuplicateRule { .. })
    ));
}

#[test]
fn missing_rule_file_is_an_io_error() {
    let config = Config::new(data_dir().join("does-not-exist.json"));
    assert!(matches!(Lemmatizer::from_config(&config), Err(Error::Io(_))));
}
