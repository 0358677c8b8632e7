// pinyin/tests/search_pipeline.rs
//
// End-to-end question search: JSON bank -> romanization at ingestion ->
// level filtering -> score ordering.

use examkey_pinyin::{
    romanizer_from_config, Config, Question, QuestionBank, QuestionType, RomanizationTable,
    Romanizer, StrictnessLevel,
};
use std::sync::Arc;

const BANK: &str = r#"[
  {"type":"SINGLE_CHOICE","text":"马克思主义基本原理","options":["A. 对","B. 错"],"correct":["A"]},
  {"type":"MULTIPLE_CHOICE","text":"实践是检验真理的唯一标准","options":["A. 甲","B. 乙","C. 丙"],"correct":["C","A"]},
  {"type":"TRUE_FALSE","text":"马克思主义是科学的理论","correct":["T"]},
  {"type":"SINGLE_CHOICE","text":"中国特色社会主义","options":["A. 对"],"correct":["A"]},
  {"type":"TRUE_FALSE","text":"学习马克思主义理论","correct":["F"],"explanation":"略"}
]"#;

fn builtin_bank() -> QuestionBank {
    let romanizer = Arc::new(Romanizer::new());
    romanizer.init_builtin();
    QuestionBank::from_json_str(BANK, romanizer).unwrap()
}

fn texts<'a>(hits: &[&'a Question]) -> Vec<&'a str> {
    hits.iter().map(|q| q.text.as_str()).collect()
}

#[test]
fn ingestion_romanizes_text() {
    let bank = builtin_bank();
    assert_eq!(bank.len(), 5);
    assert!(bank.questions()[0].pinyin_text.starts_with("makesizhuyi"));
    assert!(bank.questions()[4].pinyin_text.starts_with("xuexi"));
}

#[test]
fn prefix_hits_rank_above_inner_hits() {
    let bank = builtin_bank();
    let hits = bank.search("makesi", StrictnessLevel::Medium);
    assert_eq!(
        texts(&hits),
        vec!["马克思主义基本原理", "马克思主义是科学的理论", "学习马克思主义理论"]
    );

    let scored = bank.ranked_hits("makesi", StrictnessLevel::Medium, None);
    assert_eq!(scored[0].score, 20 + 85 + 12);
    assert_eq!(scored[1].score, scored[0].score);
    assert_eq!(scored[2].score, 85 + 12);
}

#[test]
fn query_is_trimmed_and_lowercased() {
    let bank = builtin_bank();
    let a = texts(&bank.search("makesi", StrictnessLevel::Medium));
    let b = texts(&bank.search("  MaKeSi ", StrictnessLevel::Medium));
    assert_eq!(a, b);
}

#[test]
fn original_script_query_matches_text() {
    let bank = builtin_bank();
    let hits = bank.search("主义理论", StrictnessLevel::Medium);
    assert_eq!(texts(&hits), vec!["学习马克思主义理论"]);
}

#[test]
fn level_minimum_applies_before_matching() {
    let bank = builtin_bank();
    // scattered letters only work at Low
    assert_eq!(bank.search("mks", StrictnessLevel::Low).len(), 3);
    assert!(bank.search("mks", StrictnessLevel::Medium).is_empty());
    // five chars is below High's minimum
    assert!(bank.search("makes", StrictnessLevel::High).is_empty());
    assert!(!bank.search("makesi", StrictnessLevel::High).is_empty());
    assert!(bank.search("   ", StrictnessLevel::Low).is_empty());
}

#[test]
fn type_filter() {
    let bank = builtin_bank();
    let hits =
        bank.search_by_type("makesi", StrictnessLevel::Medium, Some(QuestionType::TrueFalse));
    assert_eq!(texts(&hits), vec!["马克思主义是科学的理论", "学习马克思主义理论"]);
    assert!(bank
        .search_by_type("makesi", StrictnessLevel::Medium, Some(QuestionType::MultipleChoice))
        .is_empty());
}

#[test]
fn stats_and_answers() {
    let bank = builtin_bank();
    let stats = bank.stats();
    assert_eq!(stats[&QuestionType::SingleChoice], 2);
    assert_eq!(stats[&QuestionType::MultipleChoice], 1);
    assert_eq!(stats[&QuestionType::TrueFalse], 2);

    let multi = &bank.questions()[1];
    assert_eq!(multi.formatted_answers(), vec!["AC".to_string()]);
    assert_eq!(multi.answer_description(), "C. 丙, A. 甲");
    assert_eq!(bank.questions()[4].answer_description(), "错误");
}

#[test]
fn late_romanizer_is_picked_up_by_refresh() {
    let romanizer = Arc::new(Romanizer::new());
    let mut bank = QuestionBank::from_json_str(BANK, Arc::clone(&romanizer)).unwrap();
    assert!(bank.questions().iter().all(|q| q.pinyin_text.is_empty()));
    assert!(bank.search("makesi", StrictnessLevel::Medium).is_empty());
    assert_eq!(bank.refresh_romanization(), 0);

    romanizer.init_builtin();
    assert_eq!(bank.refresh_romanization(), 5);
    assert_eq!(bank.search("makesi", StrictnessLevel::Medium).len(), 3);
    assert_eq!(bank.refresh_romanization(), 0);
}

#[test]
fn stored_romanization_is_kept() {
    let json = r#"[{"type":"SINGLE_CHOICE","text":"马克思","pinyinText":"custom","correct":["A"]}]"#;
    let romanizer = Arc::new(Romanizer::new());
    romanizer.init_builtin();
    let bank = QuestionBank::from_json_str(json, romanizer).unwrap();
    assert_eq!(bank.questions()[0].pinyin_text, "custom");
}

#[test]
fn configured_data_file_replaces_builtin_table() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("pinyin.txt");
    std::fs::write(&data, "U+9A6C: mǎ  # 马\nU+514B: kè  # 克\n").unwrap();

    let cfg = Config {
        pinyin_data: Some(data.clone()),
        ..Config::default()
    };
    let romanizer = romanizer_from_config(&cfg);
    assert!(romanizer.is_ready());
    assert_eq!(romanizer.romanize("马克思"), "make思");

    let snapshot = dir.path().join("table.bincode");
    RomanizationTable::load(&data)
        .unwrap()
        .save_bincode(&snapshot)
        .unwrap();
    let from_snapshot = romanizer_from_config(&Config {
        pinyin_data: Some(snapshot),
        ..Config::default()
    });
    assert_eq!(from_snapshot.romanize("马克"), "make");
}

#[test]
fn missing_data_file_degrades_to_pass_through() {
    let cfg = Config {
        pinyin_data: Some("/nonexistent/pinyin.txt".into()),
        ..Config::default()
    };
    let romanizer = romanizer_from_config(&cfg);
    assert!(!romanizer.is_ready());
    assert_eq!(romanizer.romanize("马克思"), "马克思");
}

#[test]
fn bank_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bank.json");
    let bank = builtin_bank();
    std::fs::write(&path, bank.to_json_string().unwrap()).unwrap();

    // romanizations stored in the file are used as-is
    let reloaded = QuestionBank::load_json(&path, Arc::new(Romanizer::new())).unwrap();
    assert_eq!(reloaded.questions(), bank.questions());
    assert_eq!(reloaded.search("makesi", StrictnessLevel::Medium).len(), 3);
}
