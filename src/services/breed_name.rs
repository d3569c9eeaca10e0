//! Conversions between classifier labels, display names and URL slugs.
//!
//! `golden_retriever` displays as `Golden Retriever` and queries as
//! `golden-retriever`; both forms map back to the same slug.

pub fn normalize_for_display(name: &str) -> String {
    name.replace('_', " ")
        .split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Runs of spaces or underscores become a single `-`.
pub fn normalize_for_query(name: &str) -> String {
    name.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
