//! Answer evaluation.
//!
//! Decides whether a submitted answer matches a question's expected answer.
//! Grading is all-or-nothing per question.

use crate::model::{Answer, Question, QuestionKind, ZoneId};

/// Punctuation ignored when comparing free-text answers.
const IGNORED_PUNCTUATION: [char; 5] = ['.', ',', ';', '!', '?'];

/// Something that can grade a submitted answer.
pub trait AnswerEvaluator: Send + Sync {
    /// Returns `true` if `submitted` is an acceptable answer to `question`.
    fn is_correct(&self, question: &Question, submitted: Option<&Answer>) -> bool;
}

/// The grading rules used for every exam unless a caller supplies its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEvaluator;

impl AnswerEvaluator for StandardEvaluator {
    fn is_correct(&self, question: &Question, submitted: Option<&Answer>) -> bool {
        is_correct(question, submitted)
    }
}

/// Grade one answer.
///
/// - multiple-choice: exact string equality
/// - true-false: trimmed, case-insensitive equality
/// - fill-in / code-analysis: lenient free-text match, see [`free_text_matches`]
/// - drag-and-drop: every zone holds its correct item
///
/// Missing or blank submissions and unknown question types are never correct.
pub fn is_correct(question: &Question, submitted: Option<&Answer>) -> bool {
    let Some(answer) = submitted.filter(|a| !a.is_blank()) else {
        return false;
    };

    match question.kind {
        QuestionKind::MultipleChoice => answer.as_text() == Some(question.answer.as_str()),
        QuestionKind::TrueFalse => answer
            .as_text()
            .is_some_and(|text| normalize(text) == normalize(&question.answer)),
        QuestionKind::FillIn | QuestionKind::CodeAnalysis => answer
            .as_text()
            .is_some_and(|text| free_text_matches(text, &question.answer)),
        QuestionKind::DragAndDrop => answer.as_placement().is_some_and(|placement| {
            question
                .drop_zones
                .iter()
                .enumerate()
                .all(|(index, zone)| {
                    placement.get(&ZoneId::new(index)) == Some(&zone.correct_item)
                })
        }),
        QuestionKind::Unknown => false,
    }
}

/// Lenient comparison for short technical answers.
///
/// Both sides are trimmed, lowercased, and stripped of `.,;!?`. The answer is
/// accepted when the cleaned strings are equal, when either contains the other,
/// or when the submission equals the cleaned expected value, its capitalized
/// form, or its upper-cased form. Containment accepts over- and
/// under-specific answers ("class" matches "subclass").
pub fn free_text_matches(submitted: &str, expected: &str) -> bool {
    let user = strip_punctuation(&normalize(submitted));
    let correct = strip_punctuation(&normalize(expected));

    if user == correct {
        return true;
    }

    let variations = [correct.clone(), capitalize(&correct), correct.to_uppercase()];

    variations.contains(&user) || user.contains(&correct) || correct.contains(&user)
}

/// Count zones holding their correct item, for partial-credit displays.
/// Returns `(correct, total zones)`; grading itself stays all-or-nothing.
pub fn placement_count(question: &Question, submitted: Option<&Answer>) -> (usize, usize) {
    let total = question.drop_zones.len();
    let Some(placement) = submitted.and_then(Answer::as_placement) else {
        return (0, total);
    };
    let correct = question
        .drop_zones
        .iter()
        .enumerate()
        .filter(|(index, zone)| placement.get(&ZoneId::new(*index)) == Some(&zone.correct_item))
        .count();
    (correct, total)
}

fn normalize(answer: &str) -> String {
    answer.trim().to_lowercase()
}

fn strip_punctuation(answer: &str) -> String {
    answer
        .chars()
        .filter(|c| !IGNORED_PUNCTUATION.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Placement;

    fn text(s: &str) -> Answer {
        Answer::Text(s.to_string())
    }

    fn choice(s: &str) -> Answer {
        Answer::Choice(s.to_string())
    }

    #[test]
    fn multiple_choice_is_exact() {
        let q = Question::multiple_choice("Pick", &["Vec", "vec"], "Vec");
        assert!(is_correct(&q, Some(&choice("Vec"))));
        assert!(!is_correct(&q, Some(&choice("vec"))));
        assert!(!is_correct(&q, Some(&choice(" Vec"))));
    }

    #[test]
    fn true_false_ignores_case_and_whitespace() {
        let q = Question::true_false("Rust is memory safe", "True");
        assert!(is_correct(&q, Some(&choice(" true "))));
        assert!(is_correct(&q, Some(&text("TRUE"))));
        assert!(!is_correct(&q, Some(&choice("false"))));
    }

    #[test]
    fn fill_in_strips_punctuation() {
        let q = Question::fill_in("LIFO structure?", "Stack");
        assert!(is_correct(&q, Some(&text("stack!"))));
        assert!(is_correct(&q, Some(&text("  STACK.  "))));
    }

    #[test]
    fn fill_in_accepts_containment_both_ways() {
        let q = Question::fill_in("Inheriting type", "subclass");
        assert!(is_correct(&q, Some(&text("class"))));

        let q = Question::code_analysis("What prints?", "println!(\"hi\")", "hi");
        assert!(is_correct(&q, Some(&text("it prints hi"))));
        assert!(!is_correct(&q, Some(&text("bye"))));
    }

    #[test]
    fn punctuation_only_submission_matches_by_containment() {
        let q = Question::fill_in("Anything", "heap");
        assert!(is_correct(&q, Some(&text("?"))));
    }

    #[test]
    fn drag_and_drop_requires_every_zone() {
        let q = Question::drag_and_drop("Match", &[("1", "A"), ("2", "B")], &["A", "B"]);

        let mut partial = Placement::new();
        partial.insert(ZoneId::new(0), "A".to_string());
        assert!(!is_correct(&q, Some(&Answer::Placement(partial.clone()))));

        let mut full = partial;
        full.insert(ZoneId::new(1), "B".to_string());
        assert!(is_correct(&q, Some(&Answer::Placement(full))));
    }

    #[test]
    fn mismatched_variant_is_incorrect() {
        let q = Question::drag_and_drop("Match", &[("1", "A")], &["A"]);
        assert!(!is_correct(&q, Some(&text("A"))));

        let mut placement = Placement::new();
        placement.insert(ZoneId::new(0), "A".to_string());
        let q = Question::multiple_choice("Pick", &["A"], "A");
        assert!(!is_correct(&q, Some(&Answer::Placement(placement))));
    }

    #[test]
    fn absent_or_blank_is_incorrect() {
        let q = Question::fill_in("Anything", "heap");
        assert!(!is_correct(&q, None));
        assert!(!is_correct(&q, Some(&text(""))));
    }

    #[test]
    fn unknown_type_is_incorrect() {
        let mut q = Question::fill_in("Anything", "heap");
        q.kind = QuestionKind::Unknown;
        assert!(!is_correct(&q, Some(&text("heap"))));
    }

    #[test]
    fn placement_count_reports_partial_progress() {
        let q = Question::drag_and_drop("Match", &[("1", "A"), ("2", "B")], &["A", "B"]);
        let mut placement = Placement::new();
        placement.insert(ZoneId::new(0), "A".to_string());
        placement.insert(ZoneId::new(1), "A".to_string());
        assert_eq!(placement_count(&q, Some(&Answer::Placement(placement))), (1, 2));
        assert_eq!(placement_count(&q, None), (0, 2));
    }

    #[test]
    fn capitalize_handles_empty_and_unicode() {
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("élan"), "Élan");
    }
}
