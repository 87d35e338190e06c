//! Per-option credit computation for both target formats.
//!
//! QTI scoring is binary (exact-set match against the correct-identifier
//! set), so the QTI side of the plan is just the ordered list of correct
//! choice identifiers. Moodle encodes grading as per-answer percentage
//! fractions, positionally tied to option order.

use crate::model::Options;

/// Moodle's single- versus multi-select grading semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradingMode {
    /// Radio-button semantics: one answer carries all the credit.
    Single,
    /// Checkbox semantics with zero-sum split credit.
    Multi,
}

/// Decide the grading mode: `Single` iff auto-detection is on and exactly
/// one option is flagged correct.
pub fn detect_mode(options: &Options, auto_single: bool) -> GradingMode {
    if auto_single && options.correct_count() == 1 {
        GradingMode::Single
    } else {
        GradingMode::Multi
    }
}

/// Generated choice identifier for the option at `position` (0-based).
pub fn choice_id(position: usize) -> String {
    format!("ID_{}", position + 1)
}

/// Identifiers of the correctly-flagged options, in option order.
pub fn correct_choice_ids(options: &Options) -> Vec<String> {
    options
        .iter()
        .enumerate()
        .filter(|(_, c)| c.correct)
        .map(|(i, _)| choice_id(i))
        .collect()
}

/// Moodle fraction literals, positionally aligned with the option order.
///
/// `Single`: the first correct option gets `100.000000`, everything else `0`
/// (all `0` when nothing is correct). `Multi`: each correct option gets
/// `+100/C` and each incorrect one `-100/W`, six decimal places, which nets
/// exactly 100 for a perfect response and penalizes each wrong pick by its
/// share of the wrong pool.
pub fn moodle_fractions(options: &Options, mode: GradingMode) -> Vec<String> {
    match mode {
        GradingMode::Single => {
            let first_correct = options.iter().position(|c| c.correct);
            options
                .iter()
                .enumerate()
                .map(|(i, _)| {
                    if Some(i) == first_correct {
                        "100.000000".to_string()
                    } else {
                        "0".to_string()
                    }
                })
                .collect()
        }
        GradingMode::Multi => {
            let correct = options.correct_count();
            let wrong = options.len() - correct;
            options
                .iter()
                .map(|c| {
                    // Each branch is only reachable when its count is >= 1.
                    if c.correct {
                        format!("{:.6}", 100.0 / correct as f64)
                    } else {
                        format!("{:.6}", -100.0 / wrong as f64)
                    }
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_detection() {
        let one = Options::from_pairs([("3", false), ("4", true), ("5", false)]);
        assert_eq!(detect_mode(&one, true), GradingMode::Single);
        assert_eq!(detect_mode(&one, false), GradingMode::Multi);

        let two = Options::from_pairs([("a", true), ("b", true)]);
        assert_eq!(detect_mode(&two, true), GradingMode::Multi);

        let none = Options::from_pairs([("a", false)]);
        assert_eq!(detect_mode(&none, true), GradingMode::Multi);
    }

    #[test]
    fn arithmetic_question_grades_single() {
        // {"3": false, "4": true, "5": false} -> fractions [0, 100.000000, 0]
        let options = Options::from_pairs([("3", false), ("4", true), ("5", false)]);
        let mode = detect_mode(&options, true);
        assert_eq!(mode, GradingMode::Single);
        assert_eq!(
            moodle_fractions(&options, mode),
            vec!["0", "100.000000", "0"]
        );
        assert_eq!(correct_choice_ids(&options), vec!["ID_2"]);
    }

    #[test]
    fn primes_question_splits_credit() {
        // 2 correct, 2 incorrect -> [50, 50, -50, -50]
        let options =
            Options::from_pairs([("2", true), ("3", true), ("4", false), ("9", false)]);
        let mode = detect_mode(&options, true);
        assert_eq!(mode, GradingMode::Multi);
        assert_eq!(
            moodle_fractions(&options, mode),
            vec!["50.000000", "50.000000", "-50.000000", "-50.000000"]
        );
        assert_eq!(correct_choice_ids(&options), vec!["ID_1", "ID_2"]);
    }

    #[test]
    fn multi_fractions_are_zero_sum() {
        let options = Options::from_pairs([
            ("a", true),
            ("b", true),
            ("c", true),
            ("d", false),
            ("e", false),
        ]);
        let fractions = moodle_fractions(&options, GradingMode::Multi);

        let positive: f64 = fractions
            .iter()
            .filter_map(|f| f.parse::<f64>().ok())
            .filter(|v| *v > 0.0)
            .sum();
        let negative: f64 = fractions
            .iter()
            .filter_map(|f| f.parse::<f64>().ok())
            .filter(|v| *v < 0.0)
            .sum();

        assert!((positive - 100.0).abs() < 1e-4, "positive sum {positive}");
        assert!((negative + 100.0).abs() < 1e-4, "negative sum {negative}");
        assert_eq!(fractions[0], "33.333333");
        assert_eq!(fractions[3], "-50.000000");
    }

    #[test]
    fn single_with_no_correct_is_all_zero() {
        let options = Options::from_pairs([("a", false), ("b", false)]);
        assert_eq!(
            moodle_fractions(&options, GradingMode::Single),
            vec!["0", "0"]
        );
        assert!(correct_choice_ids(&options).is_empty());
    }

    #[test]
    fn multi_with_no_correct_penalizes_everything() {
        let options = Options::from_pairs([("a", false), ("b", false)]);
        assert_eq!(
            moodle_fractions(&options, GradingMode::Multi),
            vec!["-50.000000", "-50.000000"]
        );
    }

    #[test]
    fn multi_with_all_correct_has_no_penalties() {
        let options = Options::from_pairs([("a", true), ("b", true)]);
        assert_eq!(
            moodle_fractions(&options, GradingMode::Multi),
            vec!["50.000000", "50.000000"]
        );
    }

    #[test]
    fn correct_set_cardinality_matches_flags() {
        let options = Options::from_pairs([
            ("w", false),
            ("x", true),
            ("y", false),
            ("z", true),
        ]);
        let ids = correct_choice_ids(&options);
        assert_eq!(ids.len(), options.correct_count());
        assert_eq!(ids, vec!["ID_2", "ID_4"]);
    }
}
