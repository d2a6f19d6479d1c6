//! Fixed answer key for the gated and scored scenes.

use crate::Scene;

/// Meeting 1, question 1: which platform fits a visual café brand.
pub const M1Q1_CORRECT: &str = "instagram";
/// Meeting 1, question 2: which ad product captures search intent.
pub const M1Q2_CORRECT: &str = "search-ads";
/// Meeting 1, question 3: the two ad parts to assemble, order-insensitive.
pub const M1Q3_CORRECT_PAIR: [&str; 2] = ["headline", "description"];

/// How a meeting-two submission is compared against the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerKind {
    /// Exact match on a selected option id.
    Choice,
    /// The calculator display, normalized before comparison.
    Calculator,
}

/// Per-scene answer key for the scored meeting-two questions. Each correct
/// submission is worth exactly one point.
pub fn meeting_two_key(scene: Scene) -> Option<(&'static str, AnswerKind)> {
    match scene {
        // Rp300.000 bought 10 customers, so 25 customers cost Rp750.000.
        Scene::M2Q1 => Some(("750000", AnswerKind::Calculator)),
        // 25 customers x Rp50.000 average spend minus the Rp750.000 budget.
        Scene::M2Q2 => Some(("500000", AnswerKind::Calculator)),
        Scene::M2Q3 => Some(("promo-b-smallest", AnswerKind::Choice)),
        Scene::M2Q4 => Some(("time-3", AnswerKind::Choice)),
        // Engagement rate: (50 likes + 100 comments) puts post at 4 percent.
        Scene::M2Q5 => Some(("4", AnswerKind::Calculator)),
        Scene::M2Q6 => Some(("B", AnswerKind::Choice)),
        Scene::M2Q7 => Some(("C", AnswerKind::Choice)),
        _ => None,
    }
}

/// Normalizes a calculator display value the way the quiz UI does:
/// parse as a float and re-render in the shortest form, so "750000.00",
/// "750000." and "750000" all compare equal. Unparseable input renders as
/// "NaN" and can never match a key.
pub fn normalize_calculator_display(display: &str) -> String {
    match display.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => format!("{value}"),
        _ => "NaN".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calculator_normalization_collapses_equivalent_displays() {
        assert_eq!(normalize_calculator_display("750000"), "750000");
        assert_eq!(normalize_calculator_display("750000.00"), "750000");
        assert_eq!(normalize_calculator_display(" 750000.0 "), "750000");
        assert_eq!(normalize_calculator_display("0.5"), "0.5");
        assert_eq!(normalize_calculator_display("4."), "4");
    }

    #[test]
    fn garbage_display_never_matches() {
        assert_eq!(normalize_calculator_display(""), "NaN");
        assert_eq!(normalize_calculator_display("tujuh"), "NaN");
        for scene in [Scene::M2Q1, Scene::M2Q2, Scene::M2Q5] {
            let (key, _) = meeting_two_key(scene).expect("scored scene");
            assert_ne!(normalize_calculator_display("not a number"), key);
        }
    }

    #[test]
    fn every_scored_scene_has_a_key() {
        for scene in [
            Scene::M2Q1,
            Scene::M2Q2,
            Scene::M2Q3,
            Scene::M2Q4,
            Scene::M2Q5,
            Scene::M2Q6,
            Scene::M2Q7,
        ] {
            assert!(meeting_two_key(scene).is_some(), "{scene:?}");
        }
        assert!(meeting_two_key(Scene::M1Q1).is_none());
    }
}
