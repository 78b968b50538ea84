//! Token normalization and homophone equivalence.
//!
//! Every comparison in the alignment engine happens on normalized forms:
//! lowercase with a fixed punctuation set removed. Homophone classes are
//! stored normalized too, so "they're" lives in the table as "theyre".

use crate::config::HomophoneConfig;
use crate::defaults;
use std::collections::HashMap;

/// Built-in English homophone classes.
///
/// Words a young reader says correctly but a recognizer may spell either way.
pub const BUILTIN_CLASSES: &[&[&str]] = &[
    &["ate", "eight"],
    &["be", "bee"],
    &["bear", "bare"],
    &["blue", "blew"],
    &["by", "buy", "bye"],
    &["cent", "sent", "scent"],
    &["dear", "deer"],
    &["eye", "i"],
    &["fair", "fare"],
    &["flour", "flower"],
    &["for", "four", "fore"],
    &["hair", "hare"],
    &["hear", "here"],
    &["hole", "whole"],
    &["hour", "our"],
    &["knew", "new"],
    &["knight", "night"],
    &["know", "no"],
    &["made", "maid"],
    &["mail", "male"],
    &["meat", "meet"],
    &["oh", "owe"],
    &["one", "won"],
    &["pair", "pear"],
    &["peace", "piece"],
    &["plain", "plane"],
    &["read", "red"],
    &["right", "write"],
    &["road", "rode"],
    &["sail", "sale"],
    &["sea", "see"],
    &["so", "sew"],
    &["son", "sun"],
    &["tail", "tale"],
    &["their", "there", "they're"],
    &["threw", "through"],
    &["to", "too", "two"],
    &["wait", "weight"],
    &["way", "weigh"],
    &["weak", "week"],
    &["wear", "where"],
    &["which", "witch"],
    &["whose", "who's"],
    &["wood", "would"],
    &["your", "you're"],
];

/// Lowercase a raw token and strip the fixed punctuation set.
///
/// Surrounding whitespace is trimmed; inner characters are otherwise kept.
pub fn normalize(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !defaults::STRIPPED_PUNCTUATION.contains(c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Set of homophone classes with a reverse index from word to class.
#[derive(Debug, Clone, Default)]
pub struct HomophoneTable {
    classes: Vec<Vec<String>>,
    index: HashMap<String, usize>,
}

impl HomophoneTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding the built-in classes.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for class in BUILTIN_CLASSES {
            table.add_class(class.iter().copied());
        }
        table
    }

    /// Build a table from configuration: built-ins unless disabled, then
    /// the configured classes.
    pub fn from_config(config: &HomophoneConfig) -> Self {
        let mut table = if config.disable_defaults {
            Self::new()
        } else {
            Self::builtin()
        };
        for class in &config.classes {
            table.add_class(class.iter().map(String::as_str));
        }
        table
    }

    /// Add a class of interchangeable words.
    ///
    /// Members are normalized and deduplicated. A class that shares a word
    /// with existing classes is merged with them, so every word belongs to
    /// at most one class. Classes with fewer than two distinct forms are
    /// ignored.
    pub fn add_class<'a>(&mut self, words: impl IntoIterator<Item = &'a str>) {
        let mut members: Vec<String> = Vec::new();
        for word in words {
            let form = normalize(word);
            if !form.is_empty() && !members.contains(&form) {
                members.push(form);
            }
        }

        let mut overlapping: Vec<usize> = members
            .iter()
            .filter_map(|m| self.index.get(m).copied())
            .collect();
        overlapping.sort_unstable();
        overlapping.dedup();

        if overlapping.is_empty() {
            if members.len() < 2 {
                return;
            }
            self.classes.push(members);
        } else {
            let target = overlapping[0];
            for &other in overlapping[1..].iter().rev() {
                let moved = std::mem::take(&mut self.classes[other]);
                for word in moved {
                    if !self.classes[target].contains(&word) {
                        self.classes[target].push(word);
                    }
                }
            }
            for word in members {
                if !self.classes[target].contains(&word) {
                    self.classes[target].push(word);
                }
            }
            self.classes.retain(|c| !c.is_empty());
        }

        self.reindex();
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, class) in self.classes.iter().enumerate() {
            for word in class {
                self.index.insert(word.clone(), i);
            }
        }
    }

    /// The class containing `word` (already normalized), if any.
    pub fn class_of(&self, word: &str) -> Option<&[String]> {
        self.index.get(word).map(|&i| self.classes[i].as_slice())
    }

    /// Whether two normalized words share a class.
    pub fn same_class(&self, a: &str, b: &str) -> bool {
        match (self.index.get(a), self.index.get(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Canonicalizes tokens and answers homophone queries.
#[derive(Debug, Clone)]
pub struct NormalizationService {
    homophones: HomophoneTable,
}

impl NormalizationService {
    pub fn new(homophones: HomophoneTable) -> Self {
        Self { homophones }
    }

    pub fn from_config(config: &HomophoneConfig) -> Self {
        Self::new(HomophoneTable::from_config(config))
    }

    /// See [`normalize`].
    pub fn normalize(&self, raw: &str) -> String {
        normalize(raw)
    }

    /// True iff both words, once normalized, belong to the same class.
    ///
    /// Used only after an exact comparison has failed.
    pub fn is_homophone(&self, a: &str, b: &str) -> bool {
        self.homophones.same_class(&normalize(a), &normalize(b))
    }

    /// The equivalence class containing `word`, or `None`.
    pub fn get_homophones(&self, word: &str) -> Option<&[String]> {
        self.homophones.class_of(&normalize(word))
    }

    pub fn table(&self) -> &HomophoneTable {
        &self.homophones
    }
}

impl Default for NormalizationService {
    fn default() -> Self {
        Self::new(HomophoneTable::builtin())
    }
}
