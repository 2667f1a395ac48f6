//! Internal link word source: one link word per markdown note in the workspace.
//!
//! The value is the file stem, the description the workspace-relative path,
//! and aliases come from the front matter `aliases` (or `alias`) key.

use crate::word_index::WordIndex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use word_lsp_types::Word;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AliasList {
    One(String),
    Many(Vec<String>),
}

impl AliasList {
    fn into_vec(self) -> Vec<String> {
        match self {
            AliasList::One(alias) => vec![alias],
            AliasList::Many(aliases) => aliases,
        }
    }
}

/// Partial front matter schema (only what we need).
#[derive(Debug, Deserialize, Default)]
struct FrontMatter {
    #[serde(default)]
    aliases: Option<AliasList>,
    #[serde(default)]
    alias: Option<AliasList>,
}

/// Extract the YAML block between the leading `---` fences.
fn front_matter_block(source: &str) -> Option<&str> {
    let rest = source
        .strip_prefix("---\n")
        .or_else(|| source.strip_prefix("---\r\n"))?;
    let end = rest.find("\n---")?;
    Some(&rest[..end])
}

/// Aliases declared in the note's front matter. Malformed YAML yields none.
pub fn front_matter_aliases(source: &str) -> Vec<String> {
    let Some(block) = front_matter_block(source) else {
        return vec![];
    };
    let front_matter: FrontMatter = match serde_norway::from_str(block) {
        Ok(fm) => fm,
        Err(e) => {
            tracing::debug!("Ignoring unparsable front matter: {}", e);
            return vec![];
        }
    };
    front_matter
        .aliases
        .or(front_matter.alias)
        .map(AliasList::into_vec)
        .unwrap_or_default()
        .into_iter()
        .filter(|a| !a.trim().is_empty())
        .collect()
}

/// Build the link word for a note, or `None` if the path has no usable stem.
pub fn link_word(root: &Path, path: &Path, aliases: Vec<String>) -> Option<Word> {
    let stem = path.file_stem()?.to_string_lossy().to_string();
    if stem.is_empty() {
        return None;
    }
    let relative = path.strip_prefix(root).unwrap_or(path);
    Some(
        Word::link(stem)
            .with_description(relative.to_string_lossy())
            .with_aliases(aliases),
    )
}

fn is_excluded(relative: &Path, exclude_prefixes: &[String]) -> bool {
    let relative = relative.to_string_lossy();
    exclude_prefixes
        .iter()
        .filter(|p| !p.is_empty())
        .any(|p| relative.starts_with(p.as_str()))
}

/// Recursively collect .md files, skipping hidden directories.
fn collect_markdown_files(dir: &Path, files: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Failed to read directory {}: {}", dir.display(), e);
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if name_str.starts_with('.') || name_str == "node_modules" {
                continue;
            }
            collect_markdown_files(&path, files);
        } else if path.extension().and_then(|e| e.to_str()) == Some("md") {
            files.push(path);
        }
    }
}

/// Build the internal link index for every note under `root`.
pub fn index_internal_links(root: &Path, exclude_prefixes: &[String]) -> WordIndex {
    let mut files = Vec::new();
    collect_markdown_files(root, &mut files);
    files.sort();

    let words: Vec<Word> = files
        .iter()
        .map(PathBuf::as_path)
        .filter(|path| !is_excluded(path.strip_prefix(root).unwrap_or(*path), exclude_prefixes))
        .filter_map(|path| {
            let aliases = match std::fs::read_to_string(path) {
                Ok(source) => front_matter_aliases(&source),
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", path.display(), e);
                    vec![]
                }
            };
            link_word(root, path, aliases)
        })
        .collect();

    tracing::debug!("Indexed {} internal links under {}", words.len(), root.display());
    words.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_front_matter_alias_list() {
        let source = "---\ntitle: x\naliases:\n  - Start\n  - Hub\n---\n# Home\n";
        assert_eq!(front_matter_aliases(source), vec!["Start", "Hub"]);
    }

    #[test]
    fn test_front_matter_single_alias() {
        let source = "---\nalias: Start\n---\nbody";
        assert_eq!(front_matter_aliases(source), vec!["Start"]);
    }

    #[test]
    fn test_no_front_matter() {
        assert!(front_matter_aliases("# Title\n---\n").is_empty());
        assert!(front_matter_aliases("---\naliases: [unclosed\n---\n").is_empty());
    }

    #[test]
    fn test_index_workspace_notes() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("notes")).unwrap();
        std::fs::create_dir_all(root.join("archive")).unwrap();
        std::fs::create_dir_all(root.join(".trash")).unwrap();
        std::fs::write(root.join("Home.md"), "---\naliases: [start]\n---\n").unwrap();
        std::fs::write(root.join("notes/Tokyo.md"), "city").unwrap();
        std::fs::write(root.join("notes/readme.txt"), "not a note").unwrap();
        std::fs::write(root.join("archive/Old.md"), "").unwrap();
        std::fs::write(root.join(".trash/Gone.md"), "").unwrap();

        let index = index_internal_links(root, &["archive".to_string()]);

        let home = &index.get('H')[0];
        assert!(home.internal_link);
        assert_eq!(home.aliases, vec!["start"]);
        assert_eq!(home.description.as_deref(), Some("Home.md"));
        assert_eq!(index.get('s')[0].value, "Home");
        assert_eq!(index.get('T')[0].value, "Tokyo");
        assert!(index.get('O').is_empty());
        assert!(index.get('G').is_empty());
        assert!(index.get('r').is_empty());
    }
}
