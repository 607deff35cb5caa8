use crate::categorizer::{domain_of, has_suffix, CustomRule, EmailPredicate};
use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    Domain { domain: String },
    DomainSuffix { suffix: String },
    LocalPrefix { prefix: String },
    Contains { text: String },
    Regex { pattern: String },
    And { all: Vec<Condition> },
    Or { any: Vec<Condition> },
    Not { condition: Box<Condition> },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Rule {
    /// Category label assigned when the condition holds.
    pub name: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    pub condition: Condition,
}

fn enabled_default() -> bool {
    true
}

/// A [`Condition`] with its literals lowercased and its regexes compiled.
#[derive(Debug, Clone)]
pub enum Matcher {
    Domain(String),
    DomainSuffix(String),
    LocalPrefix(String),
    Contains(String),
    Regex(Regex),
    And(Vec<Matcher>),
    Or(Vec<Matcher>),
    Not(Box<Matcher>),
}

impl Condition {
    /// Fails with `InvalidArgument` on the first regex that does not compile.
    pub fn compile(&self) -> Result<Matcher> {
        Ok(match self {
            Condition::Domain { domain } => Matcher::Domain(domain.to_lowercase()),
            Condition::DomainSuffix { suffix } => Matcher::DomainSuffix(suffix.to_lowercase()),
            Condition::LocalPrefix { prefix } => Matcher::LocalPrefix(prefix.to_lowercase()),
            Condition::Contains { text } => Matcher::Contains(text.to_lowercase()),
            Condition::Regex { pattern } => Matcher::Regex(Regex::new(pattern).map_err(|e| {
                Error::InvalidArgument(format!("invalid rule regex '{pattern}': {e}"))
            })?),
            Condition::And { all } => {
                Matcher::And(all.iter().map(Condition::compile).collect::<Result<_>>()?)
            }
            Condition::Or { any } => {
                Matcher::Or(any.iter().map(Condition::compile).collect::<Result<_>>()?)
            }
            Condition::Not { condition } => Matcher::Not(Box::new(condition.compile()?)),
        })
    }
}

impl Matcher {
    pub fn is_match(&self, email: &str) -> bool {
        match self {
            Matcher::Domain(domain) => domain_of(email).map_or(false, |d| &d == domain),
            Matcher::DomainSuffix(suffix) => {
                domain_of(email).map_or(false, |d| has_suffix(&d, suffix))
            }
            Matcher::LocalPrefix(prefix) => email
                .to_lowercase()
                .split_once('@')
                .map_or(false, |(local, _)| local.starts_with(prefix.as_str())),
            Matcher::Contains(text) => email.to_lowercase().contains(text.as_str()),
            Matcher::Regex(re) => re.is_match(email),
            Matcher::And(all) => all.iter().all(|m| m.is_match(email)),
            Matcher::Or(any) => any.iter().any(|m| m.is_match(email)),
            Matcher::Not(inner) => !inner.is_match(email),
        }
    }
}

impl EmailPredicate for Matcher {
    fn matches(&self, email: &str) -> anyhow::Result<bool> {
        Ok(self.is_match(email))
    }
}

/// One-off evaluation. Compiles `condition` on every call; use
/// [`Condition::compile`] when testing many addresses.
pub fn matches(condition: &Condition, email: &str) -> Result<bool> {
    Ok(condition.compile()?.is_match(email))
}

/// Enabled rules as custom-strategy rules, in the order given.
pub fn to_custom_rules(rules: &[Rule]) -> Result<Vec<CustomRule>> {
    rules
        .iter()
        .filter(|r| r.enabled)
        .map(|r| {
            let matcher = r.condition.compile().map_err(|e| match e {
                Error::InvalidArgument(msg) => {
                    Error::InvalidArgument(format!("rule '{}': {msg}", r.name))
                }
                other => other,
            })?;
            Ok(CustomRule::new(r.name.clone(), matcher))
        })
        .collect()
}

/// Reads every `*.toml` rule in `dir`, ordered by priority then file name.
pub fn load_rules_from_dir(dir: &Path) -> Result<Vec<Rule>> {
    let mut rules = Vec::new();
    if !dir.exists() {
        return Ok(rules);
    }
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| Error::io(dir, e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("toml"))
        .collect();
    paths.sort();

    for path in paths {
        let content = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let rule: Rule = toml::from_str(&content).map_err(|e| {
            Error::InvalidArgument(format!("bad rule file {}: {e}", path.display()))
        })?;
        debug!("Loaded rule '{}' from {}", rule.name, path.display());
        rules.push(rule);
    }
    rules.sort_by_key(|r| r.priority);
    Ok(rules)
}
