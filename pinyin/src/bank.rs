//! Question bank: the searchable collection of exam questions.
//!
//! Each question's text is romanized once, when it enters the bank, and the
//! romanization is stored next to the text. Searches filter by the current
//! strictness level (or verbatim containment in the original text) and rank
//! hits by `scorer::score`.
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use examkey_core::{rank_candidates, utils, ScoredCandidate, StrictnessLevel};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::matcher::matches;
use crate::romanize::Romanizer;
use crate::scorer::score;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    TrueFalse,
}

impl QuestionType {
    /// Display label used in statistics.
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "单选题",
            QuestionType::MultipleChoice => "多选题",
            QuestionType::TrueFalse => "判断题",
        }
    }
}

/// One question as stored in the bank's JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub text: String,
    /// Romanized `text`; empty until the bank romanizes it.
    #[serde(default)]
    pub pinyin_text: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    /// Human-readable answer: the full option lines for choice questions,
    /// 正确/错误 for true/false.
    pub fn answer_description(&self) -> String {
        match self.question_type {
            QuestionType::SingleChoice | QuestionType::MultipleChoice => self
                .correct
                .iter()
                .map(|key| {
                    self.options
                        .iter()
                        .find(|opt| opt.starts_with(key.as_str()))
                        .cloned()
                        .unwrap_or_else(|| key.clone())
                })
                .collect::<Vec<_>>()
                .join(", "),
            QuestionType::TrueFalse => {
                if self.correct.first().map(String::as_str) == Some("T") {
                    "正确".to_string()
                } else {
                    "错误".to_string()
                }
            }
        }
    }

    /// Answers in the form typed back into an answer field: multiple choice
    /// keys are sorted and joined ("ACD"), others are returned as-is.
    pub fn formatted_answers(&self) -> Vec<String> {
        match self.question_type {
            QuestionType::SingleChoice | QuestionType::TrueFalse => self.correct.clone(),
            QuestionType::MultipleChoice => {
                let mut keys = self.correct.clone();
                keys.sort();
                vec![keys.concat()]
            }
        }
    }
}

/// The form a typed query is searched in: full-width letters folded to
/// ASCII, NFC, trimmed, lowercased.
pub fn normalize_query(query: &str) -> String {
    utils::normalize(&utils::fold_fullwidth(query)).to_lowercase()
}

/// In-memory question bank bound to a romanizer.
#[derive(Debug)]
pub struct QuestionBank {
    questions: Vec<Question>,
    romanizer: Arc<Romanizer>,
}

impl QuestionBank {
    pub fn new(romanizer: Arc<Romanizer>) -> Self {
        Self {
            questions: Vec::new(),
            romanizer,
        }
    }

    /// Parse a JSON array of questions.
    pub fn from_json_str(json: &str, romanizer: Arc<Romanizer>) -> anyhow::Result<Self> {
        let questions: Vec<Question> =
            serde_json::from_str(json).context("parse question bank json")?;
        let mut bank = Self::new(romanizer);
        bank.extend(questions);
        Ok(bank)
    }

    pub fn load_json<P: AsRef<Path>>(path: P, romanizer: Arc<Romanizer>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let bank = Self::from_json_str(&json, romanizer)
            .with_context(|| format!("load {}", path.display()))?;
        debug!(path = %path.display(), questions = bank.len(), "question bank loaded");
        Ok(bank)
    }

    pub fn to_json_string(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(&self.questions)?)
    }

    /// Add a question, romanizing its text if no romanization is stored.
    pub fn push(&mut self, mut question: Question) {
        if question.pinyin_text.is_empty() && self.romanizer.is_ready() {
            question.pinyin_text = self.romanizer.romanize(&question.text);
        }
        self.questions.push(question);
    }

    pub fn extend<I: IntoIterator<Item = Question>>(&mut self, questions: I) {
        for q in questions {
            self.push(q);
        }
        let missing = self.missing_romanizations();
        if missing > 0 {
            warn!(missing, "questions without romanization, pinyin search skips them");
        }
    }

    /// Romanize questions that entered the bank before the romanizer was
    /// ready. Returns how many were filled in.
    pub fn refresh_romanization(&mut self) -> usize {
        if !self.romanizer.is_ready() {
            return 0;
        }
        let mut filled = 0;
        for q in self.questions.iter_mut().filter(|q| q.pinyin_text.is_empty()) {
            q.pinyin_text = self.romanizer.romanize(&q.text);
            filled += 1;
        }
        filled
    }

    fn missing_romanizations(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| q.pinyin_text.is_empty())
            .count()
    }

    /// Questions matching `query` at `level`, best first.
    pub fn search(&self, query: &str, level: StrictnessLevel) -> Vec<&Question> {
        self.search_by_type(query, level, None)
    }

    /// Like `search`, restricted to one question type when given.
    ///
    /// Blank queries and queries shorter than the level's minimum return
    /// nothing. A question is a hit when its romanization matches at `level`
    /// or its lowercased text contains the query.
    pub fn search_by_type(
        &self,
        query: &str,
        level: StrictnessLevel,
        question_type: Option<QuestionType>,
    ) -> Vec<&Question> {
        self.ranked_hits(query, level, question_type)
            .into_iter()
            .map(|hit| &self.questions[hit.id])
            .collect()
    }

    /// Hits as (index into `questions()`, score), best first.
    pub fn ranked_hits(
        &self,
        query: &str,
        level: StrictnessLevel,
        question_type: Option<QuestionType>,
    ) -> Vec<ScoredCandidate> {
        let query = normalize_query(query);
        if query.is_empty() || query.chars().count() < level.min_length() {
            return Vec::new();
        }

        let mut hits: Vec<ScoredCandidate> = self
            .questions
            .iter()
            .enumerate()
            .filter(|(_, q)| question_type.map_or(true, |t| q.question_type == t))
            .filter(|(_, q)| {
                let pinyin_hit = !q.pinyin_text.is_empty() && matches(&q.pinyin_text, &query, level);
                pinyin_hit || q.text.to_lowercase().contains(&query)
            })
            .map(|(i, q)| ScoredCandidate::new(i, score(&q.text, &q.pinyin_text, &query, level)))
            .collect();
        rank_candidates(&mut hits);
        hits
    }

    /// Question count per type.
    pub fn stats(&self) -> BTreeMap<QuestionType, usize> {
        let mut out = BTreeMap::new();
        for q in &self.questions {
            *out.entry(q.question_type).or_insert(0) += 1;
        }
        out
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
