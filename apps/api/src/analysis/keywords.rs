//! Keyword Summarizer — most frequent meaningful words of a document.
//!
//! Pure-Rust, deterministic, no model call. Tokens are split on any
//! non-alphanumeric character; only purely alphabetic tokens survive, lowercased,
//! with English stop words and a few résumé boilerplate words removed.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use serde::Serialize;

/// Number of keywords returned by `summarize`.
pub const TOP_N: usize = 10;

pub const CHART_TITLE: &str = "Top Keywords in Resume";
pub const CHART_X_LABEL: &str = "Frequency";

/// Words that appear in almost every resume and job description.
const DOMAIN_EXCLUSIONS: [&str; 4] = [
    "responsibilities",
    "experience",
    "requirements",
    "qualifications",
];

static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
        "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
        "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
        "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
        "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
        "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
        "for", "with", "about", "against", "between", "into", "through", "during", "before",
        "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
        "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
        "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
        "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can",
        "will", "just", "don", "should", "now", "d", "ll", "m", "o", "re", "ve", "y", "also",
        "would", "could", "may", "might", "must", "shall", "within", "across", "per", "via",
        "etc", "us", "well",
    ]
    .into_iter()
    .chain(DOMAIN_EXCLUSIONS)
    .collect()
});

/// One bar of the keyword chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
    pub token: String,
    pub count: u32,
}

/// Chart-ready keyword summary. Rendering is left to the client.
#[derive(Debug, Clone, Serialize)]
pub struct KeywordChart {
    pub title: &'static str,
    pub x_label: &'static str,
    pub keywords: Vec<KeywordCount>,
}

impl KeywordChart {
    /// `None` when there is nothing to plot.
    pub fn from_summary(keywords: Vec<KeywordCount>) -> Option<Self> {
        if keywords.is_empty() {
            return None;
        }
        Some(Self {
            title: CHART_TITLE,
            x_label: CHART_X_LABEL,
            keywords,
        })
    }
}

/// Returns up to `TOP_N` tokens by descending count. Equal counts keep the order
/// in which the tokens first appeared.
pub fn summarize(text: &str) -> Vec<KeywordCount> {
    let mut counts: HashMap<String, (u32, usize)> = HashMap::new();

    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty() && t.chars().all(char::is_alphabetic))
    {
        let token = token.to_lowercase();
        if STOP_WORDS.contains(token.as_str()) {
            continue;
        }
        let next_seen = counts.len();
        counts.entry(token).or_insert((0, next_seen)).0 += 1;
    }

    let mut ranked: Vec<(String, u32, usize)> = counts
        .into_iter()
        .map(|(token, (count, first_seen))| (token, count, first_seen))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(TOP_N)
        .map(|(token, count, _)| KeywordCount { token, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(summary: &[KeywordCount]) -> Vec<&str> {
        summary.iter().map(|k| k.token.as_str()).collect()
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        assert!(summarize("").is_empty());
        assert!(summarize("   \n\t ").is_empty());
    }

    #[test]
    fn test_only_excluded_words_yields_no_chart() {
        let summary = summarize("responsibilities experience requirements qualifications the a an");
        assert!(summary.is_empty());
        assert!(KeywordChart::from_summary(summary).is_none());
    }

    #[test]
    fn test_non_alphabetic_tokens_are_dropped() {
        let summary = summarize("Python3 2019 C++ rust-lang 5+ years");
        // "Python3" and "2019" are not purely alphabetic; "C++" splits to "c"
        assert_eq!(tokens(&summary), vec!["c", "rust", "lang", "years"]);
    }

    #[test]
    fn test_counts_are_case_insensitive_and_sorted() {
        let summary = summarize("Rust rust RUST kafka Kafka docker");
        assert_eq!(
            summary,
            vec![
                KeywordCount { token: "rust".into(), count: 3 },
                KeywordCount { token: "kafka".into(), count: 2 },
                KeywordCount { token: "docker".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let summary = summarize("zeta alpha mike alpha zeta mike");
        assert_eq!(tokens(&summary), vec!["zeta", "alpha", "mike"]);
    }

    #[test]
    fn test_at_most_ten_with_non_increasing_counts() {
        let text = (1..=15)
            .map(|i| {
                let word: String = std::iter::repeat(char::from(b'a' + i as u8))
                    .take(3)
                    .collect();
                vec![word; i].join(" ")
            })
            .collect::<Vec<_>>()
            .join(" ");
        let summary = summarize(&text);
        assert_eq!(summary.len(), TOP_N);
        assert!(summary.windows(2).all(|w| w[0].count >= w[1].count));
        assert_eq!(summary[0].count, 15);
    }

    #[test]
    fn test_chart_carries_labels() {
        let chart = KeywordChart::from_summary(summarize("distributed systems engineer")).unwrap();
        assert_eq!(chart.title, "Top Keywords in Resume");
        assert_eq!(chart.x_label, "Frequency");
        assert_eq!(chart.keywords.len(), 3);
    }
}
