//! Word/query matching.
//!
//! Comparisons are case-insensitive and ignore spaces on both sides, so a
//! phrase query like `new yo` matches `New York`.

use word_lsp_types::{Judgement, Word};

pub fn capitalize_first_letter(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// True when the query equals its own capitalized form.
pub fn query_starts_with_upper(query: &str) -> bool {
    capitalize_first_letter(query) == query
}

fn normalize(s: &str) -> String {
    s.replace(' ', "").to_lowercase()
}

pub fn lower_starts_without_space(one: &str, other: &str) -> bool {
    normalize(one).starts_with(&normalize(other))
}

pub fn lower_includes_without_space(one: &str, other: &str) -> bool {
    normalize(one).contains(&normalize(other))
}

/// A match on the word's own value. Capitalized queries capitalize plain
/// words; link targets keep their exact casing.
fn value_match(word: &Word, query_starts_with_upper: bool) -> Judgement {
    if query_starts_with_upper && !word.internal_link {
        let capitalized = capitalize_first_letter(&word.value);
        let adjusted = Word {
            value: capitalized.clone(),
            ..word.clone()
        };
        Judgement {
            word: adjusted,
            value: Some(capitalized),
            alias: false,
        }
    } else {
        Judgement {
            word: word.clone(),
            value: Some(word.value.clone()),
            alias: false,
        }
    }
}

fn alias_match(word: &Word, alias: &str) -> Judgement {
    let mut matched = word.clone();
    matched.matched_alias = Some(alias.to_string());
    Judgement {
        word: matched,
        value: Some(alias.to_string()),
        alias: true,
    }
}

/// Prefix policy: value prefix first, then the first alias with that prefix.
pub fn judge(word: &Word, query: &str, query_starts_with_upper: bool) -> Judgement {
    if lower_starts_without_space(&word.value, query) {
        return value_match(word, query_starts_with_upper);
    }
    match word
        .aliases
        .iter()
        .find(|a| lower_starts_without_space(a, query))
    {
        Some(alias) => alias_match(word, alias),
        None => Judgement::miss(word.clone()),
    }
}

/// Substring policy: the prefix rule, then value contains, then the first
/// alias that contains the query.
pub fn judge_by_partial_match(word: &Word, query: &str, query_starts_with_upper: bool) -> Judgement {
    if lower_starts_without_space(&word.value, query) {
        return value_match(word, query_starts_with_upper);
    }
    if lower_includes_without_space(&word.value, query) {
        return Judgement {
            word: word.clone(),
            value: Some(word.value.clone()),
            alias: false,
        };
    }
    match word
        .aliases
        .iter()
        .find(|a| lower_includes_without_space(a, query))
    {
        Some(alias) => alias_match(word, alias),
        None => Judgement::miss(word.clone()),
    }
}
