//! Word lists that drive name parsing.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{GeniusError, Result};

const DEFAULT_PATTERNS_YAML: &str = include_str!("../../patterns/name_patterns.yml");

static DEFAULT_PATTERNS: Lazy<NamePatterns> = Lazy::new(|| {
    serde_yaml::from_str(DEFAULT_PATTERNS_YAML).expect("built-in name patterns are valid YAML")
});

/// Punctuation kept inside name tokens.
pub const KEPT_PUNCTUATION: [char; 4] = ['&', '\'', '-', '.'];

/// Lowercase word lists consulted while parsing names.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct NamePatterns {
    pub prefixes: Vec<String>,
    pub suffixes: Vec<String>,
    pub ampersands: Vec<String>,
    pub camelcase_particles: Vec<String>,
    pub compound_fnames: Vec<String>,
    pub lname_particles: Vec<String>,
    pub invalid_words: Vec<String>,
}

impl NamePatterns {
    /// The built-in lists.
    pub fn builtin() -> Self {
        DEFAULT_PATTERNS.clone()
    }

    /// Built-in lists extended by an optional custom pattern file.
    pub fn load(custom_pattern_file: Option<&Path>) -> Result<Self> {
        let mut patterns = Self::builtin();
        if let Some(path) = custom_pattern_file {
            patterns.add_custom_pattern_file(path)?;
        }
        Ok(patterns)
    }

    /// Append the lists in a `.yml`/`.yaml` file to these lists.
    pub fn add_custom_pattern_file(&mut self, path: &Path) -> Result<()> {
        let custom = load_custom_patterns(path)?;
        for (key, values) in custom {
            self.extend(&key, values);
        }
        Ok(())
    }

    /// Append `values` to the list called `key`. Unknown keys are ignored.
    pub fn extend(&mut self, key: &str, values: Vec<String>) {
        let list = match key {
            "prefixes" => &mut self.prefixes,
            "suffixes" => &mut self.suffixes,
            "ampersands" => &mut self.ampersands,
            "camelcase_particles" => &mut self.camelcase_particles,
            "compound_fnames" => &mut self.compound_fnames,
            "lname_particles" => &mut self.lname_particles,
            "invalid_words" => &mut self.invalid_words,
            other => {
                warn!(key = other, "unknown name pattern list, ignoring");
                return;
            }
        };
        debug!(key, count = values.len(), "extending name patterns");
        list.extend(values.into_iter().map(|v| v.to_lowercase()));
    }

    pub fn is_prefix(&self, word: &str) -> bool {
        contains(&self.prefixes, word)
    }

    pub fn is_suffix(&self, word: &str) -> bool {
        contains(&self.suffixes, word)
    }

    pub fn is_ampersand(&self, word: &str) -> bool {
        contains(&self.ampersands, word)
    }

    pub fn is_compound_fname(&self, words: &str) -> bool {
        contains(&self.compound_fnames, words)
    }

    pub fn is_lname_particle(&self, word: &str) -> bool {
        contains(&self.lname_particles, word)
    }

    pub fn is_invalid_word(&self, word: &str) -> bool {
        contains(&self.invalid_words, word)
    }
}

fn contains(list: &[String], word: &str) -> bool {
    let word = word.to_lowercase();
    list.iter().any(|w| *w == word)
}

/// Read a custom pattern file. Every top-level value must be a list.
pub fn load_custom_patterns(path: &Path) -> Result<IndexMap<String, Vec<String>>> {
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml")
    );
    if !is_yaml {
        return Err(GeniusError::Config(format!(
            "custom_pattern_file {} must be a .yml or .yaml file.",
            path.display()
        )));
    }

    let text = fs::read_to_string(path).map_err(|e| GeniusError::io(path, e))?;
    let raw: IndexMap<String, serde_yaml::Value> = serde_yaml::from_str(&text)?;
    let mut lists = IndexMap::new();
    for (key, value) in raw {
        let serde_yaml::Value::Sequence(items) = value else {
            return Err(GeniusError::Config(format!(
                "custom_pattern_file must contain only list objects. {}: {:?} is invalid.",
                key, value
            )));
        };
        let words = items
            .into_iter()
            .filter_map(|item| match item {
                serde_yaml::Value::String(s) => Some(s),
                serde_yaml::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect();
        lists.insert(key, words);
    }
    Ok(lists)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_pattern_file(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(suffix).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_builtin_patterns_load() {
        let p = NamePatterns::builtin();
        assert!(p.is_prefix("Mr."));
        assert!(p.is_suffix("III"));
        assert!(p.is_ampersand("and"));
        assert!(p.is_invalid_word("Family"));
        assert!(p.is_invalid_word("CPA"));
        assert!(p.is_compound_fname("mary ann"));
        assert!(!p.is_suffix("e."));
    }

    #[test]
    fn test_custom_pattern_file_appends() {
        let f = create_pattern_file(".yml", "compound_fnames: [this, is, a, test]\n");
        let p = NamePatterns::load(Some(f.path())).unwrap();
        assert!(p.is_compound_fname("test"));
        assert!(p.is_compound_fname("mary ann"));
        assert_eq!(
            load_custom_patterns(f.path()).unwrap()["compound_fnames"],
            vec!["this", "is", "a", "test"]
        );
    }

    #[test]
    fn test_custom_pattern_file_must_be_yaml() {
        let f = create_pattern_file(".csv", "a,b\n");
        let err = NamePatterns::load(Some(f.path())).unwrap_err();
        assert!(err.to_string().contains("must be a .yml or .yaml file."));
    }

    #[test]
    fn test_custom_pattern_file_must_hold_lists() {
        let f = create_pattern_file(".yaml", "compound_fnames: x\n");
        let err = NamePatterns::load(Some(f.path())).unwrap_err();
        assert!(err
            .to_string()
            .contains("custom_pattern_file must contain only list objects."));
    }
}
