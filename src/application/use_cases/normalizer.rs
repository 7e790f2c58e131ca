use once_cell::sync::Lazy;
use regex::Regex;

static ARTICLE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(a|an|the)\b").unwrap());

/// SQuAD-style answer normalization used before exact-match comparison.
///
/// Lower-cases, drops ASCII punctuation, blanks out the articles "a", "an" and
/// "the" as whole words, then collapses whitespace runs and trims.
pub fn normalize_answer(text: &str) -> String {
    let lowered = text.to_lowercase();
    let without_punctuation: String = lowered
        .chars()
        .filter(|ch| !ch.is_ascii_punctuation())
        .collect();
    let without_articles = ARTICLE_PATTERN.replace_all(&without_punctuation, " ");

    without_articles
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize_answer("The Quick, Brown FOX!"), "quick brown fox");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_answer(""), "");
        assert_eq!(normalize_answer("   \t\n"), "");
    }

    #[test]
    fn test_normalize_only_articles() {
        assert_eq!(normalize_answer("A an THE"), "");
    }

    #[test]
    fn test_normalize_keeps_article_substrings() {
        assert_eq!(normalize_answer("Theatre and banana"), "theatre and banana");
    }

    #[test]
    fn test_normalize_punctuation_joins_words() {
        // Punctuation is removed before article matching, so "a.n" becomes "an".
        assert_eq!(normalize_answer("x a.n y"), "x y");
        assert_eq!(normalize_answer("Non-Transferable"), "nontransferable");
    }

    #[test]
    fn test_normalize_idempotent() {
        let samples = [
            "The Quick, Brown FOX!",
            "BIRCH FIRST GLOBAL INVESTMENTS INC.",
            "  the   the a an  ",
            "“Agreement” (the \"Company\")",
            "May 8, 2014",
            "",
        ];
        for sample in samples {
            let once = normalize_answer(sample);
            assert_eq!(normalize_answer(&once), once, "not idempotent for {:?}", sample);
        }
    }
}
