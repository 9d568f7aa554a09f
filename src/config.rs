use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lemmatizer::CasePolicy;
use crate::tagset::TagMatch;

pub const RULES_FILE: &str = "rules.json";
pub const TAGS_FILE: &str = "tags.json";
pub const DEFAULT_SEPARATOR: &str = "\t";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub rules: PathBuf,
    pub tags: Option<PathBuf>,
    pub separator: String,
    pub tag_match: TagMatch,
    pub case_policy: CasePolicy,
    pub workers: NonZeroUsize,
}

impl Config {
    pub fn new(rules: impl Into<PathBuf>) -> Self {
        Self {
            rules: rules.into(),
            tags: None,
            separator: DEFAULT_SEPARATOR.to_string(),
            tag_match: TagMatch::default(),
            case_policy: CasePolicy::default(),
            workers: NonZeroUsize::MIN,
        }
    }

    pub fn from_data_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let tags = dir.join(TAGS_FILE);
        Self {
            tags: tags.exists().then_some(tags),
            ..Self::new(dir.join(RULES_FILE))
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.separator.is_empty() {
            return Err(Error::Config("separator must not be empty".to_string()));
        }
        Ok(())
    }
}

pub fn resolve_data_dir() -> PathBuf {
    std::env::var("NEFNIR_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(Path::to_path_buf))
                .unwrap_or_else(|| PathBuf::from("."))
        })
}

/// Decode backslash escapes in a separator given on the command line, so
/// that `\t` means a tab. Unknown escapes are kept as written.
pub fn unescape_separator(raw: &str) -> Result<String> {
    let bad = |what: &str| Error::Config(format!("invalid escape in separator {raw:?}: {what}"));

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            None => return Err(bad("trailing backslash")),
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                out.push(decode_hex(&hex, 2).ok_or_else(|| bad("\\x needs two hex digits"))?);
            }
            Some('u') => {
                let hex: String = if chars.peek() == Some(&'{') {
                    chars.next();
                    chars.by_ref().take_while(|&c| c != '}').collect()
                } else {
                    chars.by_ref().take(4).collect()
                };
                out.push(decode_hex(&hex, 0).ok_or_else(|| bad("bad \\u escape"))?);
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    Ok(out)
}

fn decode_hex(hex: &str, exact: usize) -> Option<char> {
    if hex.is_empty() || (exact > 0 && hex.chars().count() != exact) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}
