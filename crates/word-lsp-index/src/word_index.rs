//! First-letter word index and the per-source snapshot store.

use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use word_lsp_types::{SourceKind, Word};

/// Words bucketed by the literal (case-preserved) first char of their key.
///
/// Order inside a bucket is insertion order and is the final tie-breaker
/// when ranking. Buckets iterate in creation order.
#[derive(Debug, Clone, Default)]
pub struct WordIndex {
    buckets: HashMap<char, Vec<Word>>,
    keys: Vec<char>,
}

impl WordIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `word` to the bucket for `key`. No dedup at insert time.
    pub fn push(&mut self, key: char, word: Word) {
        match self.buckets.get_mut(&key) {
            Some(bucket) => bucket.push(word),
            None => {
                self.keys.push(key);
                self.buckets.insert(key, vec![word]);
            }
        }
    }

    /// Bucket for `key`, empty when absent.
    pub fn get(&self, key: char) -> &[Word] {
        self.buckets.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every indexed entry, bucket by bucket.
    pub fn words(&self) -> impl Iterator<Item = &Word> + '_ {
        self.keys.iter().flat_map(move |k| self.get(*k).iter())
    }

    /// Number of entries (a word under several keys counts once per key).
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.keys.len()
    }
}

impl FromIterator<Word> for WordIndex {
    /// Keys each word under its value's first char, then under each alias's
    /// first char not already used for that word.
    fn from_iter<I: IntoIterator<Item = Word>>(iter: I) -> Self {
        let mut index = WordIndex::new();
        for word in iter {
            let mut keys: Vec<char> = Vec::with_capacity(1 + word.aliases.len());
            keys.extend(word.first_char());
            for alias in &word.aliases {
                if let Some(c) = alias.chars().next() {
                    if !keys.contains(&c) {
                        keys.push(c);
                    }
                }
            }
            for key in keys {
                index.push(key, word.clone());
            }
        }
        index
    }
}

/// Read-only view of the three per-source indexes used by one query.
#[derive(Debug, Clone, Default)]
pub struct IndexedWords {
    pub current_file: Arc<WordIndex>,
    pub custom_dictionary: Arc<WordIndex>,
    pub internal_link: Arc<WordIndex>,
}

impl IndexedWords {
    pub fn get(&self, kind: SourceKind) -> &WordIndex {
        match kind {
            SourceKind::CurrentFile => &self.current_file,
            SourceKind::CustomDictionary => &self.custom_dictionary,
            SourceKind::InternalLink => &self.internal_link,
        }
    }
}

/// Live indexes, one per source.
///
/// A refresh builds a complete `WordIndex` off to the side and swaps it in
/// with a single insert, so readers see the old or the new index, never a
/// partially built one.
pub struct WordIndexStore {
    indexes: DashMap<SourceKind, Arc<WordIndex>>,
}

impl WordIndexStore {
    pub fn new() -> Self {
        WordIndexStore {
            indexes: DashMap::new(),
        }
    }

    /// Swap in a freshly built index for `kind`. Last write wins.
    pub fn replace(&self, kind: SourceKind, index: WordIndex) {
        tracing::debug!(
            "Replacing {} index: {} words in {} buckets",
            kind.label(),
            index.len(),
            index.bucket_count()
        );
        self.indexes.insert(kind, Arc::new(index));
    }

    /// Empty the index of a disabled source.
    pub fn clear(&self, kind: SourceKind) {
        self.indexes.insert(kind, Arc::new(WordIndex::new()));
    }

    pub fn get(&self, kind: SourceKind) -> Arc<WordIndex> {
        self.indexes
            .get(&kind)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }

    /// Current snapshot of all three sources. Missing sources are empty.
    pub fn snapshot(&self) -> IndexedWords {
        IndexedWords {
            current_file: self.get(SourceKind::CurrentFile),
            custom_dictionary: self.get(SourceKind::CustomDictionary),
            internal_link: self.get(SourceKind::InternalLink),
        }
    }
}

impl Default for WordIndexStore {
    fn default() -> Self {
        Self::new()
    }
}
