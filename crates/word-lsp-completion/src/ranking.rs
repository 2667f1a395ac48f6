//! Candidate gathering, ordering and deduplication.
//!
//! Ordering, on the first key that differs:
//! 1. (partial policy only) matched value starts with the raw query
//! 2. shorter matched value
//! 3. plain word before internal link
//! 4. value match before alias match
//!
//! Remaining ties keep index order. Results are truncated to `max` before
//! deduplication, so fewer than `max` words may come back; callers size
//! their UI around that.

use crate::matcher::{judge, judge_by_partial_match, query_starts_with_upper};
use word_lsp_index::{IndexedWords, WordIndex};
use word_lsp_types::{Judgement, MatchStrategy, Word};

/// Sort key, ascending.
type RankKey = (bool, usize, bool, bool);

fn rank_key(judgement: &Judgement, partial_query: Option<&str>) -> RankKey {
    let value = judgement.value.as_deref().unwrap_or_default();
    let contains_only = partial_query.is_some_and(|q| !value.starts_with(q));
    (
        contains_only,
        value.chars().count(),
        judgement.word.internal_link,
        judgement.alias,
    )
}

/// Keep the first word of every `(value, internal_link)` identity.
pub fn uniq_words(words: Vec<Word>) -> Vec<Word> {
    let mut unique: Vec<Word> = Vec::with_capacity(words.len());
    for word in words {
        if !unique.iter().any(|u| u.same_suggestion(&word)) {
            unique.push(word);
        }
    }
    unique
}

fn rank(judgements: Vec<Judgement>, max: usize, partial_query: Option<&str>) -> Vec<Word> {
    let mut scored: Vec<(RankKey, Judgement)> = judgements
        .into_iter()
        .filter(Judgement::is_match)
        .map(|j| (rank_key(&j, partial_query), j))
        .collect();
    // Stable: equal keys keep index order.
    scored.sort_by_key(|(key, _)| *key);

    let candidates: Vec<Word> = scored
        .into_iter()
        .map(|(_, j)| j.word)
        .take(max)
        .collect();
    uniq_words(candidates)
}

fn lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn upper(c: char) -> char {
    c.to_uppercase().next().unwrap_or(c)
}

/// Buckets consulted by the prefix policy, in read order.
fn prefix_buckets<'a>(indexed: &'a IndexedWords, first: char, starts_upper: bool) -> Vec<&'a [Word]> {
    let mut buckets: Vec<&[Word]> = Vec::with_capacity(6);
    let mut read = |index: &'a WordIndex, keys: &[char]| {
        for (i, key) in keys.iter().enumerate() {
            // A caseless char would read the same bucket twice.
            if keys[..i].contains(key) {
                continue;
            }
            buckets.push(index.get(*key));
        }
    };

    if starts_upper {
        read(indexed.current_file.as_ref(), &[first, lower(first)]);
        read(indexed.custom_dictionary.as_ref(), &[first, lower(first)]);
        read(indexed.internal_link.as_ref(), &[first, lower(first)]);
    } else {
        read(indexed.current_file.as_ref(), &[first]);
        read(indexed.custom_dictionary.as_ref(), &[first]);
        // Link titles are frequently capitalized proper nouns.
        read(indexed.internal_link.as_ref(), &[first, upper(first)]);
    }
    buckets
}

/// Prefix policy. Only buckets keyed by the query's first char (and its
/// case flip) are scanned.
pub fn suggest_words(indexed: &IndexedWords, query: &str, max: usize) -> Vec<Word> {
    let Some(first) = query.chars().next() else {
        return vec![];
    };
    if max == 0 {
        return vec![];
    }
    let starts_upper = query_starts_with_upper(query);

    let judgements: Vec<Judgement> = prefix_buckets(indexed, first, starts_upper)
        .into_iter()
        .flatten()
        .map(|w| judge(w, query, starts_upper))
        .collect();

    rank(judgements, max, None)
}

/// Prefix-or-substring policy. Scans every bucket of every source; an order
/// of magnitude slower than [`suggest_words`].
pub fn suggest_words_by_partial_match(indexed: &IndexedWords, query: &str, max: usize) -> Vec<Word> {
    if query.is_empty() || max == 0 {
        return vec![];
    }
    let starts_upper = query_starts_with_upper(query);

    let judgements: Vec<Judgement> = indexed
        .current_file
        .words()
        .chain(indexed.custom_dictionary.words())
        .chain(indexed.internal_link.words())
        .map(|w| judge_by_partial_match(w, query, starts_upper))
        .collect();

    rank(judgements, max, Some(query))
}

/// Dispatch on the configured policy.
pub fn suggest(strategy: MatchStrategy, indexed: &IndexedWords, query: &str, max: usize) -> Vec<Word> {
    match strategy {
        MatchStrategy::Prefix => suggest_words(indexed, query, max),
        MatchStrategy::Partial => suggest_words_by_partial_match(indexed, query, max),
    }
}
