use std::num::NonZeroUsize;
use std::thread;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::index::RuleIndex;
use crate::lexicon::RuleTable;
use crate::tagset::{TagMatch, Tagset};
use crate::token::{Record, ResolvedRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CasePolicy {
    #[default]
    Restore,
    ProperNoun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Casing {
    Upper,
    Title,
    Lower,
}

impl Casing {
    fn of(s: &str) -> Self {
        let upper = s.chars().filter(|c| c.is_uppercase()).count();
        let lower = s.chars().filter(|c| c.is_lowercase()).count();
        if upper > 1 && lower == 0 {
            Casing::Upper
        } else if s.chars().next().is_some_and(char::is_uppercase) {
            Casing::Title
        } else {
            Casing::Lower
        }
    }

    fn apply(self, lemma: &str) -> String {
        match self {
            Casing::Upper => lemma.to_uppercase(),
            Casing::Title => capitalize(lemma),
            Casing::Lower => lemma.to_string(),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

fn has_interior_hyphen(form: &str) -> bool {
    let mut chars = form.chars();
    chars.next();
    chars.next_back();
    chars.as_str().contains('-')
}

#[derive(Debug)]
pub struct Lemmatizer {
    index: RuleIndex,
    tagset: Tagset,
    tag_match: TagMatch,
    case_policy: CasePolicy,
}

impl Lemmatizer {
    pub fn new(table: RuleTable) -> Self {
        Self {
            index: RuleIndex::build(table),
            tagset: Tagset::identity(),
            tag_match: TagMatch::default(),
            case_policy: CasePolicy::default(),
        }
    }

    pub fn with_tagset(mut self, tagset: Tagset) -> Self {
        self.tagset = tagset;
        self
    }

    pub fn with_tag_match(mut self, tag_match: TagMatch) -> Self {
        self.tag_match = tag_match;
        self
    }

    pub fn with_case_policy(mut self, case_policy: CasePolicy) -> Self {
        self.case_policy = case_policy;
        self
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let table = RuleTable::load(&config.rules)?;
        let tagset = match &config.tags {
            Some(path) => Tagset::load(path)?,
            None => Tagset::identity(),
        };
        info!(
            "Tag matching: {:?}, case policy: {:?}",
            config.tag_match, config.case_policy
        );

        Ok(Self::new(table)
            .with_tagset(tagset)
            .with_tag_match(config.tag_match)
            .with_case_policy(config.case_policy))
    }

    pub fn index(&self) -> &RuleIndex {
        &self.index
    }

    /// Lemmatize a word form given its tag. Never fails: when nothing
    /// applies, the form itself is the lemma.
    pub fn lemmatize(&self, form: &str, tag: &str) -> String {
        let Some(ntag) = self.tagset.normalize(tag) else {
            if tag.chars().any(char::is_alphabetic) {
                warn!("Unknown tag: ({}, {})", form, tag);
            }
            return form.to_string();
        };

        if self.tagset.is_mapped() {
            if let Some(lemma) = self.tag_class_lemma(form, tag) {
                return lemma;
            }
        }

        if form.is_empty() {
            return String::new();
        }

        let key = form.to_lowercase();
        let Some(rule) = self.index.best(&key, ntag, self.tag_match) else {
            debug!("No rules for this word form: {} {} {}", form, tag, ntag);
            return form.to_string();
        };

        let lemma = match rule.apply(&key) {
            Some(lemma) if !lemma.is_empty() => lemma,
            _ => {
                warn!(
                    "Rule produced an empty lemma: ({}, {}, {}) ({:?} -> {:?})",
                    form, tag, ntag, rule.suffix, rule.replacement
                );
                key
            }
        };

        self.recase(form, tag, &lemma)
    }

    fn tag_class_lemma(&self, form: &str, tag: &str) -> Option<String> {
        if self.tagset.is_lowercase(tag) {
            return Some(form.to_lowercase());
        }
        if self.tagset.is_unanalyzed(tag) {
            return Some(form.to_string());
        }

        let last = form.chars().next_back()?;
        if last == '-' {
            if self.tagset.is_proper(tag) {
                return Some(self.recase(form, tag, form));
            }
            return Some(form.to_lowercase());
        }
        if !last.is_alphabetic() {
            return Some(form.to_string());
        }
        None
    }

    fn recase(&self, form: &str, tag: &str, lemma: &str) -> String {
        if has_interior_hyphen(form) {
            return self.recase_parts(form, tag, lemma);
        }

        match self.case_policy {
            CasePolicy::Restore => Casing::of(form).apply(lemma),
            CasePolicy::ProperNoun if self.tagset.is_proper(tag) => capitalize(lemma),
            CasePolicy::ProperNoun => lemma.to_string(),
        }
    }

    /// Re-case each hyphen-separated part of a compound on its own, e.g.
    /// `DNA-þræðinum` -> `DNA-þráður`, `Vestur-Íslendingum` -> `Vestur-Íslendingur`.
    fn recase_parts(&self, form: &str, tag: &str, lemma: &str) -> String {
        let form_parts: Vec<&str> = form.split('-').collect();

        let mut parts: Vec<String> = lemma
            .split('-')
            .enumerate()
            .map(|(i, lpart)| match form_parts.get(i) {
                Some(fpart) if fpart.to_lowercase() == lpart.to_lowercase() => fpart.to_string(),
                Some(fpart) => Casing::of(fpart).apply(&lpart.to_lowercase()),
                None => lpart.to_string(),
            })
            .collect();

        if self.case_policy == CasePolicy::ProperNoun && self.tagset.is_proper(tag) {
            if let Some(first) = parts.first_mut() {
                if Casing::of(first) != Casing::Upper {
                    *first = capitalize(first);
                }
            }
        }

        parts.join("-")
    }

    pub fn resolve(&self, record: Record) -> ResolvedRecord {
        let lemma = self.lemmatize(&record.form, &record.tag);
        record.with_lemma(lemma)
    }

    pub fn lemmatize_batch(&self, records: Vec<Record>, workers: NonZeroUsize) -> Vec<ResolvedRecord> {
        if workers.get() == 1 || records.len() < 2 {
            return records.into_iter().map(|r| self.resolve(r)).collect();
        }

        let chunk = records.len().div_ceil(workers.get());
        let lemmas: Vec<String> = thread::scope(|s| {
            let handles: Vec<_> = records
                .chunks(chunk)
                .map(|part| {
                    s.spawn(move || {
                        part.iter()
                            .map(|r| self.lemmatize(&r.form, &r.tag))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        });

        records
            .into_iter()
            .zip(lemmas)
            .map(|(record, lemma)| record.with_lemma(lemma))
            .collect()
    }
}
