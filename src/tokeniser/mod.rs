use std::collections::HashSet;

use lazy_static::lazy_static;
use log::warn;
use tokenizers::{normalizers::BertNormalizer, pre_tokenizers::bert::BertPreTokenizer, NormalizedString, Normalizer, OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer};

/// Keywords kept per description
const MAX_KEYWORDS: usize = 4;

lazy_static! {
    static ref STOP_WORDS: HashSet<&'static str> = [
        "com", "para", "por", "que", "uma", "dos", "das", "the", "and", "mas",
        "ate", "sem", "sob", "sobre", "tras", "entre", "ante", "for", "with", "from",
    ].into_iter().collect();
}

/// Lowercase, strip accents and split on whitespace and punctuation.
/// Punctuation tokens are dropped.
pub(crate) fn tokenise(text: &str) -> Vec<String> {
    let normaliser = BertNormalizer::new(true, true, None, true);
    let mut normalised = NormalizedString::from(text);
    if let Err(e) = normaliser.normalize(&mut normalised) {
        warn!("Unable to normalise '{text}': {e}");
        return vec![];
    }

    let pre_tokenizer = BertPreTokenizer {};
    let mut pre_tokenized = PreTokenizedString::from(normalised.get());
    if let Err(e) = pre_tokenizer.pre_tokenize(&mut pre_tokenized) {
        warn!("Unable to split '{text}': {e}");
        return vec![];
    }

    pre_tokenized.get_splits(OffsetReferential::Original, OffsetType::Byte)
        .into_iter()
        .filter(|s| s.0.chars().any(char::is_alphanumeric))
        .map(|s| s.0.to_string())
        .collect()
}

/// The first few meaningful words of a description, used to relate descriptions to categories and amounts
pub(crate) fn keywords(description: &str) -> Vec<String> {
    tokenise(description)
        .into_iter()
        .filter(|token| token.chars().count() > 2 && !STOP_WORDS.contains(token.as_str()))
        .take(MAX_KEYWORDS)
        .collect()
}
