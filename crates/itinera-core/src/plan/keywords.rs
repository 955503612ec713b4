use std::collections::BTreeSet;

/// Tokens this short or shorter are ignored.
const MIN_TOKEN_CHARS: usize = 3;

/// Build the sorted keyword set for a trip.
///
/// Splits `text` on whitespace, lowercases, keeps tokens longer than three
/// characters and adds the lowercased destination. No punctuation is
/// stripped: `aventura,` and `aventura` are different keywords.
pub fn extract_keywords(text: &str, destination: &str) -> BTreeSet<String> {
    let mut keywords: BTreeSet<String> = text
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|token| token.chars().count() > MIN_TOKEN_CHARS)
        .collect();
    keywords.insert(destination.to_lowercase());
    keywords
}
