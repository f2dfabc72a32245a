use std::collections::{BTreeMap, HashMap, HashSet};
use chrono::NaiveDateTime;
use log::debug;
use crate::tokeniser::keywords;
use crate::transaction::{Category, Transaction, TransactionType};
use crate::util::title_case;

/// Minimum keyword overlap for two descriptions to share amounts
const SIMILARITY_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PopularEntry {
    pub(crate) description: String,
    pub(crate) category: Option<Category>,
    pub(crate) amount: Option<f64>,
    pub(crate) frequency: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Statistics {
    pub(crate) total_descriptions: usize,
    pub(crate) unique_descriptions: usize,
    pub(crate) keywords_learned: usize,
    pub(crate) category_patterns: usize,
    pub(crate) last_update: Option<NaiveDateTime>,
}

/// A keyword and the category it most often leads to
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Pattern {
    pub(crate) keyword: String,
    pub(crate) category: Category,
    pub(crate) frequency: usize,
    /// Share of the keyword's occurrences that used `category`, in percent
    pub(crate) confidence: f64,
}

/// Learns from past transactions to propose descriptions, categories and amounts for new ones
#[derive(Debug, Default)]
pub(crate) struct SuggestionEngine {
    /// Lowercased descriptions per type with their occurrence count, in first-seen order
    descriptions: HashMap<TransactionType, Vec<(String, usize)>>,
    /// Categories seen with each keyword, with counts, in first-seen order
    keyword_categories: HashMap<String, Vec<(Category, usize)>>,
    keyword_frequency: HashMap<String, usize>,
    /// Amounts recorded for each lowercased description
    amounts: BTreeMap<String, Vec<f64>>,
    description_keywords: HashMap<String, Vec<String>>,
    last_update: Option<NaiveDateTime>,
}

impl SuggestionEngine {
    pub(crate) fn new() -> SuggestionEngine {
        SuggestionEngine::default()
    }

    /// Forget everything and learn again from the given transactions
    pub(crate) fn rebuild<'a>(&mut self, transactions: impl Iterator<Item = &'a Transaction>, now: NaiveDateTime) {
        *self = SuggestionEngine::new();

        for t in transactions {
            let description = normalise(&t.description);
            if description.is_empty() {
                continue;
            }

            let history = self.descriptions.entry(t.transaction_type).or_default();
            match history.iter_mut().find(|(d, _)| *d == description) {
                Some((_, count)) => *count += 1,
                None => history.push((description.clone(), 1)),
            }

            let words = self.description_keywords.entry(description.clone())
                .or_insert_with(|| keywords(&description))
                .clone();
            for word in words {
                *self.keyword_frequency.entry(word.clone()).or_insert(0) += 1;
                let categories = self.keyword_categories.entry(word).or_default();
                match categories.iter_mut().find(|(c, _)| *c == t.category) {
                    Some((_, count)) => *count += 1,
                    None => categories.push((t.category, 1)),
                }
            }

            self.amounts.entry(description).or_default().push(t.amount);
        }

        self.last_update = Some(now);
        debug!("Suggestions rebuilt: {} keywords, {} descriptions", self.keyword_frequency.len(), self.amounts.len());
    }

    /// Descriptions for autocompletion. An empty `partial` returns the most frequent ones,
    /// otherwise descriptions starting with `partial` come before descriptions merely containing it.
    pub(crate) fn descriptions(&self, partial: &str, transaction_type: TransactionType, limit: usize) -> Vec<String> {
        let Some(history) = self.descriptions.get(&transaction_type) else {
            return vec![];
        };

        let partial = normalise(partial);
        if partial.is_empty() {
            let mut by_frequency: Vec<&(String, usize)> = history.iter().collect();
            // stable sort keeps first-seen order between equal counts
            by_frequency.sort_by(|a, b| b.1.cmp(&a.1));
            return by_frequency.into_iter().take(limit).map(|(d, _)| title_case(d)).collect();
        }

        let starts_with = history.iter().filter(|(d, _)| d.starts_with(&partial));
        let contains = history.iter().filter(|(d, _)| !d.starts_with(&partial) && d.contains(&partial));

        let mut seen = HashSet::new();
        starts_with.chain(contains)
            .filter(|(d, _)| seen.insert(d.as_str()))
            .take(limit)
            .map(|(d, _)| title_case(d))
            .collect()
    }

    /// Every known description of any type, for tab completion
    pub(crate) fn all_descriptions(&self) -> Vec<String> {
        let mut result: Vec<String> = self.amounts.keys().map(|d| title_case(d)).collect();
        result.dedup();
        result
    }

    /// Most likely category for a description. Each keyword votes for the categories it was seen with,
    /// weighted by how often the keyword occurs overall.
    pub(crate) fn category_for(&self, description: &str, transaction_type: TransactionType) -> Option<Category> {
        let mut scores: Vec<(Category, usize)> = vec![];

        for word in keywords(description) {
            let Some(categories) = self.keyword_categories.get(&word) else {
                continue;
            };
            let weight = self.keyword_frequency.get(&word).copied().unwrap_or(1);
            for (category, _) in categories {
                if !category.is_compatible(transaction_type) {
                    continue;
                }
                match scores.iter_mut().find(|(c, _)| c == category) {
                    Some((_, score)) => *score += weight,
                    None => scores.push((*category, weight)),
                }
            }
        }

        let mut best: Option<(Category, usize)> = None;
        for (category, score) in scores {
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((category, score));
            }
        }
        best.map(|(category, _)| category)
    }

    /// Typical amount for a description: the mean for an exact match, otherwise the mean over
    /// all descriptions sharing enough keywords with it
    pub(crate) fn amount_for(&self, description: &str) -> Option<f64> {
        let description = normalise(description);
        if let Some(amounts) = self.amounts.get(&description) {
            return mean(amounts);
        }

        let words: HashSet<String> = keywords(&description).into_iter().collect();
        if words.is_empty() {
            return None;
        }

        let mut similar_amounts: Vec<f64> = vec![];
        for (stored, amounts) in &self.amounts {
            let stored_words: HashSet<&String> = match self.description_keywords.get(stored) {
                Some(w) => w.iter().collect(),
                None => continue,
            };
            let common = stored_words.iter().filter(|w| words.contains(w.as_str())).count();
            if common == 0 {
                continue;
            }
            let similarity = common as f64 / words.len().max(stored_words.len()) as f64;
            if similarity > SIMILARITY_THRESHOLD {
                similar_amounts.extend(amounts);
            }
        }

        mean(&similar_amounts)
    }

    /// The most frequent descriptions of a type with their suggested category and amount
    pub(crate) fn popular(&self, transaction_type: TransactionType, limit: usize) -> Vec<PopularEntry> {
        let Some(history) = self.descriptions.get(&transaction_type) else {
            return vec![];
        };

        let mut by_frequency: Vec<&(String, usize)> = history.iter().collect();
        by_frequency.sort_by(|a, b| b.1.cmp(&a.1));

        by_frequency.into_iter()
            .take(limit)
            .map(|(description, frequency)| PopularEntry {
                description: title_case(description),
                category: self.category_for(description, transaction_type),
                amount: self.amount_for(description),
                frequency: *frequency,
            })
            .collect()
    }

    pub(crate) fn statistics(&self) -> Statistics {
        let total_descriptions = self.descriptions.values().flatten().map(|(_, count)| count).sum();
        let unique_descriptions = self.descriptions.values()
            .flatten()
            .map(|(d, _)| d.as_str())
            .collect::<HashSet<&str>>()
            .len();

        Statistics {
            total_descriptions,
            unique_descriptions,
            keywords_learned: self.keyword_frequency.len(),
            category_patterns: self.keyword_categories.values().map(Vec::len).sum(),
            last_update: self.last_update,
        }
    }

    /// Dominant category per keyword, most frequent first
    pub(crate) fn patterns(&self, limit: usize) -> Vec<Pattern> {
        let mut patterns: Vec<Pattern> = self.keyword_categories.iter()
            .filter_map(|(keyword, categories)| {
                let total: usize = categories.iter().map(|(_, count)| count).sum();
                let mut dominant: Option<&(Category, usize)> = None;
                for entry in categories {
                    if dominant.map_or(true, |d| entry.1 > d.1) {
                        dominant = Some(entry);
                    }
                }
                dominant.map(|(category, frequency)| Pattern {
                    keyword: keyword.clone(),
                    category: *category,
                    frequency: *frequency,
                    confidence: *frequency as f64 / total as f64 * 100.0,
                })
            })
            .collect();

        patterns.sort_by(|a, b| b.frequency.cmp(&a.frequency).then_with(|| a.keyword.cmp(&b.keyword)));
        patterns.truncate(limit);
        patterns
    }
}

fn normalise(description: &str) -> String {
    description.trim().to_lowercase()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
