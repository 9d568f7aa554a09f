use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::lexicon::RuleKind;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleRecord {
    pub tag: String,
    pub suffix: String,
    pub replacement: String,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub kind: RuleKind,
}

#[derive(Debug, Default, Deserialize)]
struct TagRules {
    #[serde(default)]
    form: BTreeMap<String, (String, String)>,
    #[serde(default)]
    suffix: BTreeMap<String, (String, String)>,
}

pub fn load_rules(path: impl AsRef<Path>) -> Result<Vec<RuleRecord>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let source = path.display().to_string();
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let records = if is_json {
        parse_rules_json(&text, &source)?
    } else {
        parse_rules_tsv(&text, &source)?
    };
    debug!("Read {} rule records from {}", records.len(), source);
    Ok(records)
}

pub fn load_tag_map(path: impl AsRef<Path>) -> Result<HashMap<String, String>> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

pub fn parse_rules_json(text: &str, source: &str) -> Result<Vec<RuleRecord>> {
    let located = |e: serde_json::Error| {
        Error::malformed(format!("{}:{}:{}", source, e.line(), e.column()), e.to_string())
    };

    // A top-level array is the flat layout, anything else the nested one.
    match text.trim_start().as_bytes().first() {
        Some(b'[') => serde_json::from_str::<Vec<RuleRecord>>(text).map_err(located),
        _ => {
            let tags: BTreeMap<String, TagRules> = serde_json::from_str(text).map_err(located)?;
            let mut records = Vec::new();
            for (tag, rules) in tags {
                for (key, (strip, append)) in rules.form {
                    records.push(convert_pair(source, &tag, key, &strip, &append, RuleKind::Form)?);
                }
                for (key, (strip, append)) in rules.suffix {
                    records.push(convert_pair(source, &tag, key, &strip, &append, RuleKind::Suffix)?);
                }
            }
            Ok(records)
        }
    }
}

/// Turn a `key -> [strip, append]` entry into a rule that replaces the whole
/// matched key. `strip` must itself be a suffix of `key`.
fn convert_pair(
    source: &str,
    tag: &str,
    key: String,
    strip: &str,
    append: &str,
    kind: RuleKind,
) -> Result<RuleRecord> {
    let Some(kept) = key.strip_suffix(strip) else {
        return Err(Error::malformed(
            format!("{source} [{tag}/{key}]"),
            format!("stripped part {strip:?} is not a suffix of {key:?}"),
        ));
    };
    let replacement = format!("{kept}{append}");
    Ok(RuleRecord {
        tag: tag.to_string(),
        suffix: key,
        replacement,
        weight: 0,
        kind,
    })
}

pub fn parse_rules_tsv(text: &str, source: &str) -> Result<Vec<RuleRecord>> {
    let mut records = Vec::new();

    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let location = || format!("{}:{}", source, i + 1);

        let fields: Vec<&str> = line.split('\t').collect();
        if !(4..=5).contains(&fields.len()) {
            return Err(Error::malformed(
                location(),
                format!("expected 4 or 5 tab-separated fields, found {}", fields.len()),
            ));
        }

        let weight = fields[3]
            .trim()
            .parse::<u32>()
            .map_err(|e| Error::malformed(location(), format!("bad weight {:?}: {}", fields[3], e)))?;
        let kind = match fields.get(4).map(|k| k.trim()) {
            None | Some("") | Some("suffix") => RuleKind::Suffix,
            Some("form") => RuleKind::Form,
            Some(other) => {
                return Err(Error::malformed(location(), format!("unknown rule kind {other:?}")));
            }
        };

        records.push(RuleRecord {
            tag: fields[0].to_string(),
            suffix: fields[1].to_string(),
            replacement: fields[2].to_string(),
            weight,
            kind,
        });
    }

    Ok(records)
}
