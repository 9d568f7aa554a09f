use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use crate::lexicon::{Rule, RuleId, RuleKind, RuleTable};
use crate::tagset::TagMatch;

#[derive(Debug, Default)]
struct Node {
    children: HashMap<char, usize>,
    suffix_rules: Vec<RuleId>,
    form_rules: Vec<RuleId>,
}

#[derive(Debug)]
struct SuffixTrie {
    nodes: Vec<Node>,
}

impl SuffixTrie {
    fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
        }
    }

    fn insert(&mut self, rule: &Rule) {
        let mut node = 0;
        for c in rule.suffix.chars().rev() {
            node = match self.nodes[node].children.get(&c) {
                Some(&next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[node].children.insert(c, next);
                    next
                }
            };
        }
        match rule.kind {
            RuleKind::Suffix => self.nodes[node].suffix_rules.push(rule.id),
            RuleKind::Form => self.nodes[node].form_rules.push(rule.id),
        }
    }

    fn sort(&mut self, table: &RuleTable) {
        let key = |id: &RuleId| {
            let weight = table.get(*id).map_or(0, |r| r.weight);
            (std::cmp::Reverse(weight), *id)
        };
        for node in &mut self.nodes {
            node.suffix_rules.sort_by_key(key);
            node.form_rules.sort_by_key(key);
        }
    }

    /// Call `visit(rule, matched_chars)` for every rule whose suffix ends `key`,
    /// shortest suffix first, then for form rules equal to `key`.
    fn walk(&self, key: &str, mut visit: impl FnMut(RuleId, usize)) {
        let mut node = 0;
        let mut depth = 0;
        for &id in &self.nodes[node].suffix_rules {
            visit(id, depth);
        }

        for c in key.chars().rev() {
            match self.nodes[node].children.get(&c) {
                Some(&next) => {
                    node = next;
                    depth += 1;
                    for &id in &self.nodes[node].suffix_rules {
                        visit(id, depth);
                    }
                }
                None => return,
            }
        }

        for &id in &self.nodes[node].form_rules {
            visit(id, depth);
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub rule: &'a Rule,
    pub suffix_len: usize,
    pub specificity: usize,
}

impl Candidate<'_> {
    /// Ranking order: form rules, then longer suffixes, more specific tag
    /// patterns, heavier rules, and finally earlier rules.
    pub fn rank(&self, other: &Self) -> Ordering {
        let is_form = |c: &Self| c.rule.kind == RuleKind::Form;
        is_form(other)
            .cmp(&is_form(self))
            .then(other.suffix_len.cmp(&self.suffix_len))
            .then(other.specificity.cmp(&self.specificity))
            .then(other.rule.weight.cmp(&self.rule.weight))
            .then(self.rule.id.cmp(&other.rule.id))
    }
}

#[derive(Debug)]
pub struct RuleIndex {
    table: RuleTable,
    tries: HashMap<String, SuffixTrie>,
}

impl RuleIndex {
    pub fn build(table: RuleTable) -> Self {
        let mut tries = HashMap::new();
        let mut nodes = 0;
        for tag in table.tag_classes() {
            let mut trie = SuffixTrie::new();
            for rule in table.rules_for_tag_class(tag) {
                trie.insert(rule);
            }
            trie.sort(&table);
            nodes += trie.nodes.len();
            tries.insert(tag.to_string(), trie);
        }
        debug!("Built {} suffix tries with {} nodes", tries.len(), nodes);

        Self { table, tries }
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    pub fn candidates(&self, form_lower: &str, tag: &str, policy: TagMatch) -> Vec<Candidate<'_>> {
        let mut found = Vec::new();
        self.each_candidate(form_lower, tag, policy, |c| found.push(c));
        found.sort_by(Candidate::rank);
        found
    }

    pub fn best(&self, form_lower: &str, tag: &str, policy: TagMatch) -> Option<&Rule> {
        let mut best: Option<Candidate<'_>> = None;
        self.each_candidate(form_lower, tag, policy, |c| {
            if best.is_none_or(|b| c.rank(&b) == Ordering::Less) {
                best = Some(c);
            }
        });
        best.map(|c| c.rule)
    }

    fn each_candidate<'a>(
        &'a self,
        form_lower: &str,
        tag: &str,
        policy: TagMatch,
        mut visit: impl FnMut(Candidate<'a>),
    ) {
        for pattern in policy.patterns(tag) {
            let Some(trie) = self.tries.get(pattern) else {
                continue;
            };
            let specificity = pattern.chars().count();
            trie.walk(form_lower, |id, suffix_len| {
                if let Some(rule) = self.table.get(id) {
                    visit(Candidate {
                        rule,
                        suffix_len,
                        specificity,
                    });
                }
            });
        }
    }
}
