//! Core data model types for examprep.
//!
//! These are the fundamental types the whole workspace uses to represent
//! questions, submitted answers, and raw presentation input.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ExamError;

/// Topic assigned to questions that do not declare one.
pub const DEFAULT_TOPIC: &str = "Uncategorized";

/// Choices offered for a true-false question that carries no explicit options.
const TRUE_FALSE_CHOICES: [&str; 2] = ["True", "False"];

/// Maximum characters shown for a free-text answer preview.
const PREVIEW_CHARS: usize = 30;

/// The supported question types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QuestionKind {
    MultipleChoice,
    TrueFalse,
    FillIn,
    CodeAnalysis,
    DragAndDrop,
    /// Anything the bank declares that we do not understand. Never graded correct.
    #[default]
    Unknown,
}

impl QuestionKind {
    /// Whether the question is answered by picking one of a fixed set of choices.
    pub fn is_choice(self) -> bool {
        matches!(self, QuestionKind::MultipleChoice | QuestionKind::TrueFalse)
    }

    /// Whether the question is answered with free text.
    pub fn is_free_text(self) -> bool {
        matches!(self, QuestionKind::FillIn | QuestionKind::CodeAnalysis)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice => "multiple-choice",
            QuestionKind::TrueFalse => "true-false",
            QuestionKind::FillIn => "fill-in",
            QuestionKind::CodeAnalysis => "code-analysis",
            QuestionKind::DragAndDrop => "drag-and-drop",
            QuestionKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "multiple-choice" => Ok(QuestionKind::MultipleChoice),
            "true-false" => Ok(QuestionKind::TrueFalse),
            "fill-in" => Ok(QuestionKind::FillIn),
            "code-analysis" => Ok(QuestionKind::CodeAnalysis),
            "drag-and-drop" => Ok(QuestionKind::DragAndDrop),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

impl Serialize for QuestionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for QuestionKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or_else(|e: String| {
            tracing::debug!("{e}, treating as unknown");
            QuestionKind::Unknown
        }))
    }
}

/// One target slot of a drag-and-drop question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropZone {
    /// Label shown inside the empty zone.
    #[serde(default)]
    pub placeholder: String,
    /// The item that belongs in this zone.
    pub correct_item: String,
}

/// A single question from the bank. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Identifier from the bank, if it declares one.
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    /// The question type.
    #[serde(rename = "type", default)]
    pub kind: QuestionKind,
    /// The question prompt.
    pub question: String,
    /// Optional code snippet shown with the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Reporting category. Missing or blank topics become [`DEFAULT_TOPIC`].
    #[serde(default = "default_topic", deserialize_with = "lenient::topic")]
    pub topic: String,
    /// Expected answer for the string-valued question types.
    #[serde(default, deserialize_with = "lenient::text")]
    pub answer: String,
    /// Choices for choice questions. Kept optional so a bank listing options on a
    /// non-choice question can be detected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// Drop targets for drag-and-drop questions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drop_zones: Vec<DropZone>,
    /// Items the candidate can place into zones.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub draggable_items: Vec<String>,
}

fn default_topic() -> String {
    DEFAULT_TOPIC.to_string()
}

impl Question {
    fn bare(kind: QuestionKind, question: &str, answer: &str) -> Self {
        Self {
            id: None,
            kind,
            question: question.to_string(),
            code: None,
            topic: default_topic(),
            answer: answer.to_string(),
            options: None,
            drop_zones: Vec::new(),
            draggable_items: Vec::new(),
        }
    }

    pub fn multiple_choice(question: &str, options: &[&str], answer: &str) -> Self {
        Self {
            options: Some(options.iter().map(|o| o.to_string()).collect()),
            ..Self::bare(QuestionKind::MultipleChoice, question, answer)
        }
    }

    pub fn true_false(question: &str, answer: &str) -> Self {
        Self::bare(QuestionKind::TrueFalse, question, answer)
    }

    pub fn fill_in(question: &str, answer: &str) -> Self {
        Self::bare(QuestionKind::FillIn, question, answer)
    }

    pub fn code_analysis(question: &str, code: &str, answer: &str) -> Self {
        Self {
            code: Some(code.to_string()),
            ..Self::bare(QuestionKind::CodeAnalysis, question, answer)
        }
    }

    /// Build a drag-and-drop question from `(placeholder, correct item)` pairs.
    pub fn drag_and_drop(question: &str, zones: &[(&str, &str)], items: &[&str]) -> Self {
        Self {
            drop_zones: zones
                .iter()
                .map(|(placeholder, correct)| DropZone {
                    placeholder: placeholder.to_string(),
                    correct_item: correct.to_string(),
                })
                .collect(),
            draggable_items: items.iter().map(|i| i.to_string()).collect(),
            ..Self::bare(QuestionKind::DragAndDrop, question, "")
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_topic(mut self, topic: &str) -> Self {
        self.topic = if topic.trim().is_empty() {
            default_topic()
        } else {
            topic.to_string()
        };
        self
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.code = Some(code.to_string());
        self
    }

    /// The choices a candidate picks from. True-false questions without explicit
    /// options fall back to `True` / `False`.
    pub fn choices(&self) -> Vec<String> {
        match (&self.options, self.kind) {
            (Some(options), _) if !options.is_empty() => options.clone(),
            (_, QuestionKind::TrueFalse) => {
                TRUE_FALSE_CHOICES.iter().map(|c| c.to_string()).collect()
            }
            _ => Vec::new(),
        }
    }

    /// The expected answer in the same shape a candidate would submit it.
    pub fn expected_answer(&self) -> Answer {
        match self.kind {
            QuestionKind::DragAndDrop => Answer::Placement(
                self.drop_zones
                    .iter()
                    .enumerate()
                    .map(|(index, zone)| (ZoneId::new(index), zone.correct_item.clone()))
                    .collect(),
            ),
            kind if kind.is_choice() => Answer::Choice(self.answer.clone()),
            _ => Answer::Text(self.answer.clone()),
        }
    }
}

/// Identifier of a drop zone. The wire form is `zone-<index>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZoneId(usize);

impl ZoneId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zone-{}", self.0)
    }
}

impl FromStr for ZoneId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("zone-")
            .and_then(|index| index.parse::<usize>().ok())
            .map(ZoneId)
            .ok_or_else(|| format!("invalid zone identifier: {s}"))
    }
}

impl Serialize for ZoneId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ZoneId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Items placed into drop zones, keyed by zone.
pub type Placement = BTreeMap<ZoneId, String>;

/// A submitted answer. The variant follows the question type; the evaluator
/// checks that it fits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Answer {
    /// A selected option (multiple-choice, true-false).
    Choice(String),
    /// Free text (fill-in, code-analysis).
    Text(String),
    /// Drag-and-drop placements.
    Placement(Placement),
}

impl Answer {
    /// Empty strings and empty placements do not count as answered.
    pub fn is_blank(&self) -> bool {
        match self {
            Answer::Choice(s) | Answer::Text(s) => s.is_empty(),
            Answer::Placement(map) => map.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Answer::Choice(s) | Answer::Text(s) => Some(s),
            Answer::Placement(_) => None,
        }
    }

    pub fn as_placement(&self) -> Option<&Placement> {
        match self {
            Answer::Placement(map) => Some(map),
            _ => None,
        }
    }

    /// Short one-line form for summary lists.
    pub fn preview(&self, question: &Question) -> String {
        match self {
            Answer::Choice(s) => s.clone(),
            Answer::Text(s) if s.chars().count() > PREVIEW_CHARS => {
                let head: String = s.chars().take(PREVIEW_CHARS).collect();
                format!("{head}...")
            }
            Answer::Text(s) => s.clone(),
            Answer::Placement(map) => {
                format!("{} of {} placed", map.len(), question.drop_zones.len())
            }
        }
    }

    /// Multi-line form for result pages. Zones are numbered from 1.
    pub fn display(&self) -> String {
        match self {
            Answer::Choice(s) | Answer::Text(s) => s.clone(),
            Answer::Placement(map) if map.is_empty() => "No items placed".to_string(),
            Answer::Placement(map) => map
                .iter()
                .map(|(zone, item)| format!("Zone {}: {item}", zone.index() + 1))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Whether an answer slot counts as answered.
pub fn is_answered(slot: Option<&Answer>) -> bool {
    slot.is_some_and(|answer| !answer.is_blank())
}

/// Raw, presentation-neutral input that still has to be matched to the current
/// question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerInput {
    /// Pick a choice by its 1-based number.
    Option(usize),
    /// Typed text. For choice questions this is the option text itself.
    Text(String),
    /// Place items into zones, by 0-based zone index.
    Place(Vec<(usize, String)>),
    /// Reset the slot to an empty answer of the question's shape.
    Clear,
}

impl AnswerInput {
    /// Resolve the input against `question`. Placements merge into the answer
    /// already recorded at `position`; an item placed twice moves to its new zone.
    pub fn resolve(
        self,
        question: &Question,
        position: usize,
        previous: Option<&Answer>,
    ) -> Result<Answer, ExamError> {
        let reject = |reason: String| ExamError::InvalidInput { position, reason };

        match (self, question.kind) {
            (AnswerInput::Clear, QuestionKind::DragAndDrop) => {
                Ok(Answer::Placement(Placement::new()))
            }
            (AnswerInput::Clear, kind) if kind.is_choice() => Ok(Answer::Choice(String::new())),
            (AnswerInput::Clear, _) => Ok(Answer::Text(String::new())),
            (AnswerInput::Option(number), kind) if kind.is_choice() => {
                let choices = question.choices();
                number
                    .checked_sub(1)
                    .and_then(|index| choices.get(index).cloned())
                    .map(Answer::Choice)
                    .ok_or_else(|| {
                        reject(format!("choose an option between 1 and {}", choices.len()))
                    })
            }
            (AnswerInput::Text(text), kind) if kind.is_choice() => Ok(Answer::Choice(text)),
            (AnswerInput::Text(text), _) if question.kind != QuestionKind::DragAndDrop => {
                Ok(Answer::Text(text))
            }
            (AnswerInput::Place(moves), QuestionKind::DragAndDrop) => {
                let mut placement = previous
                    .and_then(Answer::as_placement)
                    .cloned()
                    .unwrap_or_default();
                for (zone, item) in moves {
                    if zone >= question.drop_zones.len() {
                        return Err(reject(format!(
                            "zone {} does not exist (question has {} zones)",
                            zone + 1,
                            question.drop_zones.len()
                        )));
                    }
                    if !question.draggable_items.is_empty()
                        && !question.draggable_items.contains(&item)
                    {
                        return Err(reject(format!("'{item}' is not one of the draggable items")));
                    }
                    placement.retain(|_, placed| *placed != item);
                    placement.insert(ZoneId::new(zone), item);
                }
                Ok(Answer::Placement(placement))
            }
            (input, kind) => Err(reject(format!("{input:?} does not fit a {kind} question"))),
        }
    }
}

/// Deserialization helpers that accept the loose shapes found in hand-written banks.
mod lenient {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Flag(bool),
        Int(i64),
        Float(f64),
    }

    impl Scalar {
        fn into_text(self) -> String {
            match self {
                Scalar::Text(s) => s,
                Scalar::Flag(b) => b.to_string(),
                Scalar::Int(i) => i.to_string(),
                Scalar::Float(f) => f.to_string(),
            }
        }
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(Option::<Scalar>::deserialize(deserializer)?
            .map(Scalar::into_text)
            .unwrap_or_default())
    }

    pub fn optional_text<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_text))
    }

    pub fn topic<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(super::default_topic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_kind_display_and_parse() {
        assert_eq!(QuestionKind::DragAndDrop.to_string(), "drag-and-drop");
        assert_eq!(
            "multiple-choice".parse::<QuestionKind>().unwrap(),
            QuestionKind::MultipleChoice
        );
        assert_eq!(
            "True_False".parse::<QuestionKind>().unwrap(),
            QuestionKind::TrueFalse
        );
        assert!("essay".parse::<QuestionKind>().is_err());
    }

    #[test]
    fn question_from_original_json_shape() {
        let json = r#"{
            "id": 7,
            "type": "drag-and-drop",
            "question": "Order the layers",
            "dropZones": [
                {"placeholder": "top", "correctItem": "View"},
                {"placeholder": "bottom", "correctItem": "Model"}
            ],
            "draggableItems": ["Model", "View"]
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.id.as_deref(), Some("7"));
        assert_eq!(q.kind, QuestionKind::DragAndDrop);
        assert_eq!(q.topic, DEFAULT_TOPIC);
        assert_eq!(q.drop_zones[1].correct_item, "Model");
        assert!(q.answer.is_empty());
    }

    #[test]
    fn boolean_answer_and_blank_topic_are_normalized() {
        let json = r#"{"type": "true-false", "question": "Rust has GC", "answer": false, "topic": " "}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.answer, "false");
        assert_eq!(q.topic, DEFAULT_TOPIC);
    }

    #[test]
    fn unknown_type_is_kept_as_unknown() {
        let json = r#"{"type": "essay", "question": "Discuss"}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.kind, QuestionKind::Unknown);
    }

    #[test]
    fn zone_id_wire_form() {
        assert_eq!(ZoneId::new(3).to_string(), "zone-3");
        assert_eq!("zone-12".parse::<ZoneId>().unwrap(), ZoneId::new(12));
        assert!("zone-x".parse::<ZoneId>().is_err());
        assert!("slot-1".parse::<ZoneId>().is_err());

        let mut placement = Placement::new();
        placement.insert(ZoneId::new(0), "A".to_string());
        let json = serde_json::to_string(&Answer::Placement(placement)).unwrap();
        assert_eq!(json, r#"{"kind":"placement","value":{"zone-0":"A"}}"#);
    }

    #[test]
    fn blank_answers_are_not_answered() {
        assert!(!is_answered(None));
        assert!(!is_answered(Some(&Answer::Text(String::new()))));
        assert!(!is_answered(Some(&Answer::Placement(Placement::new()))));
        assert!(is_answered(Some(&Answer::Choice("A".into()))));
    }

    #[test]
    fn expected_answer_for_drag_and_drop() {
        let q = Question::drag_and_drop("Match", &[("1", "A"), ("2", "B")], &["A", "B"]);
        let expected = q.expected_answer();
        assert_eq!(expected.display(), "Zone 1: A\nZone 2: B");
    }

    #[test]
    fn true_false_has_default_choices() {
        let q = Question::true_false("Rust is memory safe", "True");
        assert_eq!(q.choices(), vec!["True", "False"]);
        let answer = AnswerInput::Option(2).resolve(&q, 0, None).unwrap();
        assert_eq!(answer, Answer::Choice("False".into()));
    }

    #[test]
    fn option_number_out_of_range_is_rejected() {
        let q = Question::multiple_choice("Pick", &["a", "b"], "a");
        assert!(matches!(
            AnswerInput::Option(3).resolve(&q, 4, None),
            Err(ExamError::InvalidInput { position: 4, .. })
        ));
        assert!(AnswerInput::Option(0).resolve(&q, 4, None).is_err());
    }

    #[test]
    fn placement_input_merges_and_moves_items() {
        let q = Question::drag_and_drop("Match", &[("1", "A"), ("2", "B")], &["A", "B"]);
        let first = AnswerInput::Place(vec![(0, "A".into())])
            .resolve(&q, 0, None)
            .unwrap();
        let moved = AnswerInput::Place(vec![(1, "A".into())])
            .resolve(&q, 0, Some(&first))
            .unwrap();
        let placement = moved.as_placement().unwrap();
        assert_eq!(placement.len(), 1);
        assert_eq!(placement.get(&ZoneId::new(1)).map(String::as_str), Some("A"));

        assert!(AnswerInput::Place(vec![(5, "A".into())])
            .resolve(&q, 0, None)
            .is_err());
        assert!(AnswerInput::Place(vec![(0, "Z".into())])
            .resolve(&q, 0, None)
            .is_err());
    }

    #[test]
    fn text_input_does_not_fit_drag_and_drop() {
        let q = Question::drag_and_drop("Match", &[("1", "A")], &["A"]);
        assert!(AnswerInput::Text("A".into()).resolve(&q, 0, None).is_err());
    }

    #[test]
    fn preview_truncates_long_text() {
        let q = Question::fill_in("Explain", "x");
        let answer = Answer::Text("a".repeat(40));
        assert_eq!(answer.preview(&q), format!("{}...", "a".repeat(30)));
    }
}
