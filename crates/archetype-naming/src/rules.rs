// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Ordered archetype rules. Earlier rules win; the catch-all never fails.

use crate::traits::TraitRecord;
use archetype_core::ArchetypeError;
use std::collections::BTreeSet;

pub const KITCHEN_SINK: &str = "Kitchen Sink";
/// Sub-archetype of a member that triggers no other rule.
pub const PURE: &str = "Pure";
pub const HYBRID_MARKER: &str = "\u{1F9EC}";

pub type Predicate = fn(&TraitRecord) -> bool;
pub type Strength = fn(&TraitRecord) -> f64;

#[derive(Clone, Copy, Debug)]
pub struct ArchetypeRule {
    pub name: &'static str,
    pub predicate: Predicate,
    /// Non-negative score used to rank secondary affinities.
    pub strength: Strength,
}

impl ArchetypeRule {
    pub fn new(name: &'static str, predicate: Predicate, strength: Strength) -> Self {
        Self {
            name,
            predicate,
            strength,
        }
    }

    pub fn matches(&self, traits: &TraitRecord) -> bool {
        (self.predicate)(traits)
    }

    pub fn score(&self, traits: &TraitRecord) -> f64 {
        let s = (self.strength)(traits);
        if s.is_finite() { s.max(0.0) } else { 0.0 }
    }
}

#[derive(Clone, Debug)]
pub struct RuleBook {
    rules: Vec<ArchetypeRule>,
    catch_all: &'static str,
}

impl RuleBook {
    /// Builds a rule book; names must be unique and distinct from `catch_all`.
    pub fn new(rules: Vec<ArchetypeRule>, catch_all: &'static str) -> Result<Self, ArchetypeError> {
        if catch_all.trim().is_empty() {
            return Err(ArchetypeError::config("catch-all archetype name must be non-empty"));
        }
        let mut seen = BTreeSet::new();
        for rule in &rules {
            if rule.name == catch_all || !seen.insert(rule.name) {
                return Err(ArchetypeError::config(format!(
                    "duplicate archetype rule name '{}'",
                    rule.name
                )));
            }
        }
        Ok(Self { rules, catch_all })
    }

    pub fn standard() -> Self {
        Self {
            rules: standard_rules(),
            catch_all: KITCHEN_SINK,
        }
    }

    pub fn rules(&self) -> &[ArchetypeRule] {
        &self.rules
    }

    pub fn catch_all(&self) -> &'static str {
        self.catch_all
    }

    /// Names known to this book, in priority order, ending with the catch-all.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules
            .iter()
            .map(|rule| rule.name)
            .chain(std::iter::once(self.catch_all))
    }

    /// First satisfied rule, top to bottom.
    pub fn primary(&self, traits: &TraitRecord) -> &'static str {
        self.rules
            .iter()
            .find(|rule| rule.matches(traits))
            .map_or(self.catch_all, |rule| rule.name)
    }

    /// Strongest satisfied rule other than `primary` and the catch-all.
    /// Ties keep the earlier rule.
    pub fn sub_archetype(&self, traits: &TraitRecord, primary: &str) -> Option<&'static str> {
        let mut best: Option<(&'static str, f64)> = None;
        for rule in &self.rules {
            if rule.name == primary || !rule.matches(traits) {
                continue;
            }
            let score = rule.score(traits);
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((rule.name, score));
            }
        }
        best.map(|(name, _)| name)
    }

    pub fn is_hybrid(&self, traits: &TraitRecord, primary: &str) -> bool {
        self.primary(traits) != primary
    }
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::standard()
    }
}

/// `primary`, `primary / sub`, or the hybrid-marked form. Hybrids always
/// carry their sub-archetype, `Pure` included.
pub fn display_label(primary: &str, sub: &str, hybrid: bool) -> String {
    if hybrid {
        format!("{HYBRID_MARKER} {primary} / {sub}")
    } else if sub == PURE {
        primary.to_string()
    } else {
        format!("{primary} / {sub}")
    }
}

fn standard_rules() -> Vec<ArchetypeRule> {
    vec![
        ArchetypeRule::new("Knuckleball Wizard", |t| t.kn() > 0.10, |t| t.kn()),
        ArchetypeRule::new("Split Demon", |t| t.fs() > 0.15, |t| t.fs()),
        ArchetypeRule::new("Uncle Charlie", |t| t.kc() > 0.15, |t| t.kc()),
        ArchetypeRule::new("Undertow", |t| t.si() > 0.35 && t.ff() < 0.05, |t| t.si()),
        ArchetypeRule::new("Boomerang", |t| t.st() > 0.20, |t| t.st()),
        ArchetypeRule::new("Ghost", |t| t.ch() > 0.20, |t| t.ch()),
        ArchetypeRule::new("Snake", |t| t.si() > 0.35 && t.fc() > 0.15, |t| t.si() + t.fc()),
        ArchetypeRule::new("Gardener", |t| t.si() > 0.35 && t.sl() > 0.18, |t| t.si() + t.sl()),
        ArchetypeRule::new("Earthworm", |t| t.si() > 0.50, |t| t.si()),
        ArchetypeRule::new("Barnburner", |t| t.ff() > 0.40 && t.sl() > 0.30, |t| t.ff() + t.sl()),
        ArchetypeRule::new(
            "Triple Threat",
            |t| t.ff() > 0.40 && t.sl() > 0.15 && t.cu() > 0.10,
            |t| t.ff() + t.sl() + t.cu(),
        ),
        ArchetypeRule::new(
            "CutCraft",
            |t| t.cu() > 0.15 && (t.fc() > 0.12 || t.sl() > 0.15),
            |t| t.cu() + t.fc(),
        ),
        ArchetypeRule::new("Yakker", |t| t.cu() > 0.12, |t| t.cu()),
        ArchetypeRule::new("Cutman", |t| t.fc() > 0.15, |t| t.fc()),
        ArchetypeRule::new("Swordfighter", |t| t.sl() > 0.25 && t.whiff > 0.25, |t| t.sl()),
        ArchetypeRule::new("Heavy Duty", |t| t.ff() + t.si() > 0.50, |t| t.ff() + t.si()),
    ]
}
