use std::collections::HashMap;
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::data;
use crate::error::Result;

/// Web addresses and interjections: the lemma is the lower-cased form.
const LOWERCASE_TAGS: [&str; 2] = ["v", "au"];
/// Foreign words, unanalyzed tokens and abbreviations: the lemma is the form.
const UNANALYZED_TAGS: [&str; 3] = ["x", "e", "as"];
const UNANALYZED_PREFIX: &str = "nx";

/// Decides which rule tag patterns apply to a word tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TagMatch {
    Exact,
    #[default]
    Prefix,
    WordClass,
}

impl TagMatch {
    pub fn patterns<'a>(&self, tag: &'a str) -> Vec<&'a str> {
        match self {
            TagMatch::Exact => vec![tag],
            TagMatch::Prefix => {
                let mut patterns: Vec<&str> = tag
                    .char_indices()
                    .map(|(i, _)| &tag[..i])
                    .chain(std::iter::once(tag))
                    .collect();
                patterns.reverse();
                patterns
            }
            TagMatch::WordClass => match tag.chars().next() {
                Some(c) if c.len_utf8() < tag.len() => vec![tag, &tag[..c.len_utf8()]],
                _ => vec![tag],
            },
        }
    }

    pub fn matches(&self, pattern: &str, tag: &str) -> bool {
        match self {
            TagMatch::Exact => pattern == tag,
            TagMatch::Prefix => tag.starts_with(pattern),
            TagMatch::WordClass => {
                pattern == tag
                    || tag
                        .chars()
                        .next()
                        .is_some_and(|c| pattern.len() == c.len_utf8() && tag.starts_with(pattern))
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Tagset {
    map: Option<HashMap<String, String>>,
}

impl Tagset {
    pub fn identity() -> Self {
        Self { map: None }
    }

    pub fn from_tag_map(map: HashMap<String, String>) -> Self {
        Self { map: Some(map) }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let map = data::load_tag_map(path)?;
        info!("Loaded {} tags from {}", map.len(), path.display());
        Ok(Self::from_tag_map(map))
    }

    pub fn is_mapped(&self) -> bool {
        self.map.is_some()
    }

    pub fn normalize<'a>(&'a self, tag: &'a str) -> Option<&'a str> {
        match &self.map {
            None => Some(tag),
            Some(map) => map.get(tag).map(String::as_str),
        }
    }

    pub fn is_proper(&self, tag: &str) -> bool {
        tag.starts_with('n') && tag.ends_with(['m', 'ö', 's'])
    }

    pub fn is_unanalyzed(&self, tag: &str) -> bool {
        tag.starts_with(UNANALYZED_PREFIX) || UNANALYZED_TAGS.contains(&tag)
    }

    pub fn is_lowercase(&self, tag: &str) -> bool {
        LOWERCASE_TAGS.contains(&tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_longest_first() {
        assert_eq!(TagMatch::Exact.patterns("nkeng"), vec!["nkeng"]);
        assert_eq!(TagMatch::Prefix.patterns("nke"), vec!["nke", "nk", "n", ""]);
        assert_eq!(TagMatch::WordClass.patterns("nkeng"), vec!["nkeng", "n"]);
        assert_eq!(TagMatch::WordClass.patterns("n"), vec!["n"]);
        assert_eq!(TagMatch::Prefix.patterns(""), vec![""]);
    }

    #[test]
    fn test_prefix_patterns_respect_char_boundaries() {
        assert_eq!(TagMatch::Prefix.patterns("sþ"), vec!["sþ", "s", ""]);
        assert_eq!(TagMatch::WordClass.patterns("þa"), vec!["þa", "þ"]);
    }

    #[test]
    fn test_matches_agrees_with_patterns() {
        for policy in [TagMatch::Exact, TagMatch::Prefix, TagMatch::WordClass] {
            for pattern in ["", "n", "nk", "nkeng", "nkengx", "s"] {
                let expected = policy.patterns("nkeng").contains(&pattern);
                assert_eq!(policy.matches(pattern, "nkeng"), expected, "{policy:?} {pattern:?}");
            }
        }
    }

    #[test]
    fn test_identity_tagset() {
        let tagset = Tagset::identity();
        assert!(!tagset.is_mapped());
        assert_eq!(tagset.normalize("whatever"), Some("whatever"));
    }

    #[test]
    fn test_mapped_tagset() {
        let map = HashMap::from([("nkeng".to_string(), "nkeng".to_string())]);
        let tagset = Tagset::from_tag_map(map);
        assert!(tagset.is_mapped());
        assert_eq!(tagset.normalize("nkeng"), Some("nkeng"));
        assert_eq!(tagset.normalize("zzz"), None);
    }

    #[test]
    fn test_tag_classes() {
        let tagset = Tagset::identity();
        assert!(tagset.is_proper("nken-s"));
        assert!(tagset.is_proper("nvfö"));
        assert!(!tagset.is_proper("nkeng"));
        assert!(tagset.is_unanalyzed("nxex"));
        assert!(tagset.is_unanalyzed("e"));
        assert!(!tagset.is_unanalyzed("nkeng"));
        assert!(tagset.is_lowercase("au"));
    }
}
