use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::data::{self, RuleRecord};
use crate::error::{Error, Result};

pub type RuleId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    #[default]
    Suffix,
    Form,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub id: RuleId,
    pub tag: String,
    pub suffix: String,
    pub replacement: String,
    pub weight: u32,
    pub kind: RuleKind,
}

impl Rule {
    pub fn apply(&self, key: &str) -> Option<String> {
        if self.kind == RuleKind::Form && key != self.suffix {
            return None;
        }
        let stem = key.strip_suffix(self.suffix.as_str())?;
        Some(format!("{}{}", stem, self.replacement))
    }

    pub fn is_fallback(&self) -> bool {
        self.kind == RuleKind::Suffix && self.suffix.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
    by_tag: HashMap<String, Vec<RuleId>>,
}

impl RuleTable {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let table = Self::from_records(data::load_rules(path)?)?;
        info!(
            "Loaded {} rules for {} tag classes from {}",
            table.len(),
            table.by_tag.len(),
            path.display()
        );
        Ok(table)
    }

    /// Build a table from raw records.
    ///
    /// Records sharing tag, suffix and kind are merged: the heavier one wins,
    /// equal-weight copies with the same replacement collapse into one, and
    /// equal-weight copies that disagree are a [`Error::DuplicateRule`]. A
    /// surviving rule keeps the id of the first record with its key.
    pub fn from_records(records: impl IntoIterator<Item = RuleRecord>) -> Result<Self> {
        let mut rules: Vec<Rule> = Vec::new();
        let mut seen: HashMap<(String, String, RuleKind), RuleId> = HashMap::new();

        for (n, record) in records.into_iter().enumerate() {
            validate(n, &record)?;

            match seen.entry((record.tag.clone(), record.suffix.clone(), record.kind)) {
                Entry::Occupied(slot) => {
                    let existing = &mut rules[*slot.get()];
                    if record.weight > existing.weight {
                        debug!(
                            "Rule {}/{:?} replaced by heavier duplicate ({} > {})",
                            record.tag, record.suffix, record.weight, existing.weight
                        );
                        existing.replacement = record.replacement;
                        existing.weight = record.weight;
                    } else if record.weight == existing.weight
                        && record.replacement != existing.replacement
                    {
                        return Err(Error::DuplicateRule {
                            tag: record.tag,
                            suffix: record.suffix,
                        });
                    }
                }
                Entry::Vacant(slot) => {
                    let id = rules.len();
                    slot.insert(id);
                    rules.push(Rule {
                        id,
                        tag: record.tag,
                        suffix: record.suffix,
                        replacement: record.replacement,
                        weight: record.weight,
                        kind: record.kind,
                    });
                }
            }
        }

        let mut by_tag: HashMap<String, Vec<RuleId>> = HashMap::new();
        for rule in &rules {
            by_tag.entry(rule.tag.clone()).or_default().push(rule.id);
        }

        Ok(Self { rules, by_tag })
    }

    pub fn rules_for_tag_class<'a>(&'a self, tag: &str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.by_tag
            .get(tag)
            .map(|ids| ids.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&id| &self.rules[id])
    }

    pub fn tag_classes(&self) -> impl Iterator<Item = &str> {
        self.by_tag.keys().map(String::as_str)
    }

    pub fn contains_tag_class(&self, tag: &str) -> bool {
        self.by_tag.contains_key(tag)
    }

    pub fn get(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn validate(n: usize, record: &RuleRecord) -> Result<()> {
    let location = || format!("record {}", n + 1);

    if record.tag.chars().any(char::is_whitespace) {
        return Err(Error::malformed(
            location(),
            format!("tag pattern {:?} contains whitespace", record.tag),
        ));
    }
    if record.kind == RuleKind::Form && record.suffix.is_empty() {
        return Err(Error::malformed(location(), "form rule with an empty form"));
    }
    if record.suffix != record.suffix.to_lowercase() {
        warn!(
            "Rule {}/{:?} has upper-case letters and can never match a lower-cased form",
            record.tag, record.suffix
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tag: &str, suffix: &str, replacement: &str, weight: u32) -> RuleRecord {
        RuleRecord {
            tag: tag.to_string(),
            suffix: suffix.to_string(),
            replacement: replacement.to_string(),
            weight,
            kind: RuleKind::Suffix,
        }
    }

    #[test]
    fn test_groups_by_tag_class() {
        let table = RuleTable::from_records(vec![
            record("nkeng", "inn", "", 3),
            record("nkeng", "ur", "ur", 1),
            record("sfg3eþ", "ar", "a", 1),
        ])
        .unwrap();

        assert_eq!(table.len(), 3);
        let mut suffixes: Vec<&str> = table
            .rules_for_tag_class("nkeng")
            .map(|r| r.suffix.as_str())
            .collect();
        suffixes.sort();
        assert_eq!(suffixes, vec!["inn", "ur"]);
        assert_eq!(table.rules_for_tag_class("unknown").count(), 0);
        assert!(table.contains_tag_class("sfg3eþ"));
    }

    #[test]
    fn test_heavier_duplicate_wins() {
        let table = RuleTable::from_records(vec![
            record("n", "ar", "i", 2),
            record("n", "ur", "ur", 1),
            record("n", "ar", "ur", 7),
            record("n", "ar", "a", 1),
        ])
        .unwrap();

        assert_eq!(table.len(), 2);
        let rule = table.get(0).unwrap();
        assert_eq!(rule.suffix, "ar");
        assert_eq!(rule.replacement, "ur");
        assert_eq!(rule.weight, 7);
    }

    #[test]
    fn test_identical_duplicate_collapses() {
        let table =
            RuleTable::from_records(vec![record("n", "ar", "i", 2), record("n", "ar", "i", 2)])
                .unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_conflicting_duplicate_is_rejected() {
        let err = RuleTable::from_records(vec![record("n", "ar", "i", 2), record("n", "ar", "a", 2)])
            .unwrap_err();
        match err {
            Error::DuplicateRule { tag, suffix } => {
                assert_eq!(tag, "n");
                assert_eq!(suffix, "ar");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_form_and_suffix_rules_do_not_collide() {
        let mut form = record("n", "var", "vera", 0);
        form.kind = RuleKind::Form;
        let table = RuleTable::from_records(vec![record("n", "var", "var", 0), form]).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_malformed_records() {
        let err = RuleTable::from_records(vec![record("n k", "ar", "i", 1)]).unwrap_err();
        assert!(matches!(err, Error::MalformedRuleData { .. }));

        let mut form = record("n", "", "x", 1);
        form.kind = RuleKind::Form;
        let err = RuleTable::from_records(vec![form]).unwrap_err();
        assert!(matches!(err, Error::MalformedRuleData { .. }));
    }

    #[test]
    fn test_apply() {
        let table = RuleTable::from_records(vec![record("n", "inn", "", 1), record("n", "", "", 0)])
            .unwrap();
        let inn = table.get(0).unwrap();
        assert_eq!(inn.apply("maðurinn").as_deref(), Some("maður"));
        assert_eq!(inn.apply("maður"), None);
        assert!(table.get(1).unwrap().is_fallback());
        assert_eq!(table.get(1).unwrap().apply("hús").as_deref(), Some("hús"));
    }
}
