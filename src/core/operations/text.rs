//! Text helpers shared by the rule-based fallbacks

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "any", "are", "can", "do", "for", "from", "give", "how", "i", "im", "in",
    "is", "it", "make", "me", "my", "need", "of", "on", "or", "please", "recipe", "recipes",
    "show", "some", "something", "that", "the", "to", "want", "what", "with", "would", "you",
];

/// Lowercased alphanumeric words of `text`, stop-words removed, order kept
pub fn keywords(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '-')
        .map(|w| w.trim_matches('-').to_lowercase())
        .filter(|w| !w.is_empty())
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

/// Trim, lowercase and collapse whitespace
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Case-insensitive containment of any of `needles`
pub fn mentions_any(haystack: &str, needles: &[&str]) -> bool {
    let haystack = haystack.to_lowercase();
    needles.iter().any(|n| haystack.contains(n))
}
