use crate::vocabulary::Label;
use serde::{Deserialize, Serialize};

/// Whether the user's guess agreed with the parsed label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Match,
    Mismatch,
}

impl Verdict {
    /// Exact string equality; fallback and error labels never match.
    pub fn compare(label: &Label, guess: &str) -> Self {
        match label {
            Label::Category(category) if category == guess => Verdict::Match,
            _ => Verdict::Mismatch,
        }
    }

    pub fn is_match(self) -> bool {
        self == Verdict::Match
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_category_matches() {
        let label = Label::Category("친일파".into());
        assert_eq!(Verdict::compare(&label, "친일파"), Verdict::Match);
        assert!(Verdict::compare(&label, "친일파").is_match());
    }

    #[test]
    fn different_category_mismatches() {
        let label = Label::Category("친일파".into());
        assert_eq!(Verdict::compare(&label, "무장투쟁론"), Verdict::Mismatch);
    }

    #[test]
    fn comparison_is_exact() {
        let label = Label::Category("주전론".into());
        assert_eq!(Verdict::compare(&label, "주전론 "), Verdict::Mismatch);
        assert_eq!(Verdict::compare(&label, "주전"), Verdict::Mismatch);
    }

    #[test]
    fn fallback_and_error_never_match() {
        assert_eq!(
            Verdict::compare(&Label::Fallback("기타".into()), "기타"),
            Verdict::Mismatch
        );
        assert_eq!(
            Verdict::compare(&Label::Error("오류".into()), "오류"),
            Verdict::Mismatch
        );
    }
}
