//! Bucketing strategies over an extracted address list.
//!
//! Every strategy assigns each address to exactly one category, first match
//! wins. `by_domain` is the only one allowed to drop an address, and only when
//! it has no domain.

use crate::error::{Error, Result};
use crate::models::{CategoryMap, KeywordRule, Method, PatternRule, Statistics, UNCATEGORIZED};
use regex::Regex;
use std::fmt;
use tracing::{debug, warn};

pub const FREE_EMAIL_DOMAINS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "hotmail.com",
    "outlook.com",
    "aol.com",
    "icloud.com",
    "mail.com",
    "protonmail.com",
    "yandex.com",
    "zoho.com",
];

pub const BUSINESS_DOMAINS: &[&str] = &["company.com", "corp.com", "enterprise.com", "business.com"];

pub const EDUCATIONAL_SUFFIXES: &[&str] = &["edu", "ac.uk", "edu.au", "edu.cn", "ac.in"];

pub const TYPE_LABELS: &[&str] = &["free", "business", "educational", "government", "other"];

/// A test that decides whether an address belongs to a category.
///
/// Evaluation may fail; the custom strategy logs the failure and moves on to
/// the next rule.
pub trait EmailPredicate {
    fn matches(&self, email: &str) -> anyhow::Result<bool>;
}

impl<F> EmailPredicate for F
where
    F: Fn(&str) -> anyhow::Result<bool>,
{
    fn matches(&self, email: &str) -> anyhow::Result<bool> {
        self(email)
    }
}

/// Adapts an infallible closure into an [`EmailPredicate`].
pub fn predicate_fn<F>(f: F) -> impl Fn(&str) -> anyhow::Result<bool>
where
    F: Fn(&str) -> bool,
{
    move |email| Ok(f(email))
}

pub struct CustomRule {
    pub label: String,
    pub predicate: Box<dyn EmailPredicate + Send + Sync>,
}

impl CustomRule {
    pub fn new<P>(label: impl Into<String>, predicate: P) -> Self
    where
        P: EmailPredicate + Send + Sync + 'static,
    {
        CustomRule {
            label: label.into(),
            predicate: Box::new(predicate),
        }
    }
}

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomRule")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Lower-cased text after the first `@`, or `None` when there is none.
pub fn domain_of(email: &str) -> Option<String> {
    email
        .split_once('@')
        .map(|(_, domain)| domain.to_lowercase())
        .filter(|domain| !domain.is_empty())
}

pub fn by_domain(emails: &[String]) -> CategoryMap {
    let mut map = CategoryMap::new();
    for email in emails {
        if let Some(domain) = domain_of(email) {
            map.push(&domain, email.as_str());
        }
    }
    map
}

pub fn by_type(emails: &[String]) -> CategoryMap {
    let mut map = CategoryMap::with_labels(TYPE_LABELS);
    for email in emails {
        let label = domain_of(email)
            .map(|domain| type_label(&domain))
            .unwrap_or("other");
        map.push(label, email.as_str());
    }
    map
}

fn type_label(domain: &str) -> &'static str {
    if FREE_EMAIL_DOMAINS.contains(&domain) {
        "free"
    } else if EDUCATIONAL_SUFFIXES
        .iter()
        .any(|suffix| has_suffix(domain, suffix))
    {
        "educational"
    } else if domain.ends_with(".gov") || has_suffix(domain, "gov.uk") {
        "government"
    } else if BUSINESS_DOMAINS.contains(&domain) || looks_like_business(domain) {
        "business"
    } else {
        "other"
    }
}

/// `domain` equals `suffix` or ends with `.suffix`.
pub(crate) fn has_suffix(domain: &str, suffix: &str) -> bool {
    domain == suffix
        || domain
            .strip_suffix(suffix)
            .map(|head| head.ends_with('.'))
            .unwrap_or(false)
}

fn looks_like_business(domain: &str) -> bool {
    domain.split('.').count() >= 2 && !FREE_EMAIL_DOMAINS.contains(&domain)
}

pub fn by_keywords(emails: &[String], rules: &[KeywordRule]) -> CategoryMap {
    let rules: Vec<(&str, Vec<String>)> = rules
        .iter()
        .map(|r| {
            (
                r.label.as_str(),
                r.keywords.iter().map(|k| k.to_lowercase()).collect(),
            )
        })
        .collect();

    let mut map = CategoryMap::new();
    for email in emails {
        let lowered = email.to_lowercase();
        let label = rules
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k.as_str())))
            .map(|(label, _)| *label)
            .unwrap_or(UNCATEGORIZED);
        map.push(label, email.as_str());
    }
    map
}

/// Patterns are anchored at the start of the address only.
pub fn by_pattern(emails: &[String], rules: &[PatternRule]) -> Result<CategoryMap> {
    let compiled = rules
        .iter()
        .map(|r| {
            Regex::new(&format!("^(?:{})", r.pattern))
                .map(|re| (r.label.as_str(), re))
                .map_err(|e| {
                    Error::InvalidArgument(format!("bad pattern for category {:?}: {e}", r.label))
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut map = CategoryMap::new();
    for email in emails {
        let label = compiled
            .iter()
            .find(|(_, re)| re.is_match(email))
            .map(|(label, _)| *label)
            .unwrap_or(UNCATEGORIZED);
        map.push(label, email.as_str());
    }
    Ok(map)
}

pub fn by_custom_rule(emails: &[String], rules: &[CustomRule]) -> CategoryMap {
    let mut map = CategoryMap::new();
    for email in emails {
        let mut label = UNCATEGORIZED;
        for rule in rules {
            match rule.predicate.matches(email) {
                Ok(true) => {
                    label = rule.label.as_str();
                    break;
                }
                Ok(false) => {}
                Err(e) => warn!("Error in custom rule '{}' for email '{}': {:#}", rule.label, email, e),
            }
        }
        map.push(label, email.as_str());
    }
    map
}

/// Applies each option-free method; the rest are skipped.
pub fn categorize_multi(emails: &[String], methods: &[Method]) -> Vec<(Method, CategoryMap)> {
    methods
        .iter()
        .filter_map(|method| match method {
            Method::Domain => Some((*method, by_domain(emails))),
            Method::Type => Some((*method, by_type(emails))),
            other => {
                debug!("categorize_multi: {} needs options, skipping", other);
                None
            }
        })
        .collect()
}

pub fn statistics(map: &CategoryMap) -> Statistics {
    Statistics::from(map)
}

/// Addresses of the requested categories, in the order they were requested.
pub fn filter_by_category<S: AsRef<str>>(map: &CategoryMap, labels: &[S]) -> Vec<String> {
    labels
        .iter()
        .filter_map(|label| map.get(label.as_ref()))
        .flat_map(|emails| emails.iter().cloned())
        .collect()
}

/// Addresses of every category not listed, in map order.
pub fn exclude_categories<S: AsRef<str>>(map: &CategoryMap, labels: &[S]) -> Vec<String> {
    map.iter()
        .filter(|(label, _)| !labels.iter().any(|l| l.as_ref() == *label))
        .flat_map(|(_, emails)| emails.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffixes_match_on_label_boundaries() {
        assert!(has_suffix("cs.mit.edu", "edu"));
        assert!(has_suffix("edu", "edu"));
        assert!(!has_suffix("myedu", "edu"));
        assert!(has_suffix("gov.uk", "gov.uk"));
        assert!(!has_suffix("notgov.uk", "gov.uk"));
    }

    #[test]
    fn domain_of_handles_missing_or_empty_domain() {
        assert_eq!(domain_of("a@Example.COM").as_deref(), Some("example.com"));
        assert_eq!(domain_of("nodomain"), None);
        assert_eq!(domain_of("trailing@"), None);
    }

    #[test]
    fn type_label_precedence() {
        assert_eq!(type_label("gmail.com"), "free");
        assert_eq!(type_label("school.ac.uk"), "educational");
        assert_eq!(type_label("agency.gov"), "government");
        assert_eq!(type_label("company.com"), "business");
        assert_eq!(type_label("localhost"), "other");
    }
}
