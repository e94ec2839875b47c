//! Text normalization for extracted documents

use once_cell::sync::Lazy;
use regex::Regex;

static BLANK_LINE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{2,}").expect("blank line pattern is valid"));

/// Collapses every run of two or more newlines down to exactly two
///
/// The result never contains more than one blank line in a row. Applying it
/// twice is the same as applying it once.
pub fn normalize_blank_lines(text: &str) -> String {
    BLANK_LINE_RUN.replace_all(text, "\n\n").into_owned()
}

/// Joins a title and body with one blank line and normalizes the result
pub fn compose_text(title: &str, body: &str) -> String {
    normalize_blank_lines(&format!("{}\n\n{}", title, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_newlines_collapse_to_two() {
        assert_eq!(normalize_blank_lines("a\n\n\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_short_runs_unchanged() {
        let text = "line one\nline two\n\nstanza two";
        assert_eq!(normalize_blank_lines(text), text);
    }

    #[test]
    fn test_idempotent() {
        let samples = ["", "\n\n\n", "a\n\n\n\n\nb\n\n\nc", "x\ny", "\n\n\n\nend"];
        for sample in samples {
            let once = normalize_blank_lines(sample);
            assert_eq!(normalize_blank_lines(&once), once, "sample {:?}", sample);
        }
    }

    #[test]
    fn test_compose_text_separates_title() {
        assert_eq!(compose_text("Title", "Body"), "Title\n\nBody");
    }

    #[test]
    fn test_compose_text_absorbs_leading_newlines_in_body() {
        assert_eq!(compose_text("Title\n", "\n\nBody"), "Title\n\nBody");
    }
}
