//! Custom dictionary word source.
//!
//! One word per non-empty line: `value<delim>description<delim>alias...`.
//! Only local files are read.

use crate::word_index::WordIndex;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;
use word_lsp_types::{ColumnDelimiter, Word};

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("failed to read dictionary {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("remote dictionary is not supported: {0}")]
    Remote(String),
    #[error("invalid word pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Parse a single dictionary line. Blank lines and empty values yield `None`.
pub fn parse_dictionary_line(line: &str, delimiter: ColumnDelimiter) -> Option<Word> {
    let line = line.trim_end_matches('\r');
    let mut columns = line.split(delimiter.as_char());
    let value = columns.next().filter(|v| !v.is_empty())?;

    let mut word = Word::new(value);
    if let Some(description) = columns.next().filter(|d| !d.is_empty()) {
        word.description = Some(description.to_string());
    }
    word.aliases = columns
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect();
    Some(word)
}

/// Read one dictionary file.
pub fn load_dictionary(
    path: &Path,
    delimiter: ColumnDelimiter,
) -> Result<Vec<Word>, DictionaryError> {
    let source = std::fs::read_to_string(path).map_err(|source| DictionaryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(source
        .lines()
        .filter_map(|line| parse_dictionary_line(line, delimiter))
        .collect())
}

fn is_remote(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

/// Build the custom dictionary index from every configured path.
///
/// Unreadable files are logged and skipped. An invalid `word_pattern` fails
/// the whole build since it would filter every file.
pub fn index_custom_dictionaries(
    paths: &[String],
    delimiter: ColumnDelimiter,
    word_pattern: &str,
) -> Result<WordIndex, DictionaryError> {
    let pattern = if word_pattern.is_empty() {
        None
    } else {
        Some(
            Regex::new(word_pattern).map_err(|source| DictionaryError::Pattern {
                pattern: word_pattern.to_string(),
                source,
            })?,
        )
    };

    let mut words = Vec::new();
    for path in paths.iter().filter(|p| !p.trim().is_empty()) {
        let loaded = if is_remote(path) {
            Err(DictionaryError::Remote(path.clone()))
        } else {
            load_dictionary(Path::new(path), delimiter)
        };
        match loaded {
            Ok(loaded) => {
                tracing::debug!("Loaded dictionary {}: {} words", path, loaded.len());
                words.extend(loaded);
            }
            Err(e) => {
                tracing::warn!("Skipping dictionary: {}", e);
            }
        }
    }

    if let Some(ref re) = pattern {
        words.retain(|w| re.is_match(&w.value));
    }

    Ok(words.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_line_with_description_and_aliases() {
        let word = parse_dictionary_line("cat\ta small feline\tkitty\tpuss", ColumnDelimiter::Tab)
            .unwrap();
        assert_eq!(word.value, "cat");
        assert_eq!(word.description.as_deref(), Some("a small feline"));
        assert_eq!(word.aliases, vec!["kitty", "puss"]);
        assert!(!word.internal_link);
    }

    #[test]
    fn test_parse_line_empty_description_keeps_aliases() {
        let word = parse_dictionary_line("dog||hound", ColumnDelimiter::Pipe).unwrap();
        assert_eq!(word.description, None);
        assert_eq!(word.aliases, vec!["hound"]);
    }

    #[test]
    fn test_parse_blank_line() {
        assert!(parse_dictionary_line("", ColumnDelimiter::Tab).is_none());
        assert!(parse_dictionary_line("\r", ColumnDelimiter::Tab).is_none());
    }

    #[test]
    fn test_index_skips_missing_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "apple,fruit").unwrap();
        writeln!(file, "Avocado").unwrap();
        writeln!(file).unwrap();
        let paths = vec![
            "/definitely/not/here.txt".to_string(),
            file.path().to_string_lossy().to_string(),
            "https://example.com/words.txt".to_string(),
        ];

        let index = index_custom_dictionaries(&paths, ColumnDelimiter::Comma, "").unwrap();
        assert_eq!(index.get('a').len(), 1);
        assert_eq!(index.get('A').len(), 1);
        assert_eq!(index.get('a')[0].description.as_deref(), Some("fruit"));
    }

    #[test]
    fn test_index_filters_by_pattern() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "alpha\nalpha2\nbeta").unwrap();
        let paths = vec![file.path().to_string_lossy().to_string()];

        let index = index_custom_dictionaries(&paths, ColumnDelimiter::Tab, "^[a-z]+$").unwrap();
        let values: Vec<&str> = index.words().map(|w| w.value.as_str()).collect();
        assert_eq!(values, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let result = index_custom_dictionaries(&[], ColumnDelimiter::Tab, "(");
        assert!(matches!(result, Err(DictionaryError::Pattern { .. })));
    }
}
