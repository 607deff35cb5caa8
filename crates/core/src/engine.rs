//! Extract-then-categorize pipeline with the last results kept as state.
//!
//! An [`EmailEngine`] is a single-owner working set: mutating calls take
//! `&mut self` and replace the previous result wholesale. Sharing one engine
//! between threads requires the caller to serialize access.

use crate::categorizer::{self, CustomRule};
use crate::error::{Error, Result};
use crate::export;
use crate::extractor::EmailExtractor;
use crate::models::{CategoryMap, KeywordRule, Method, PatternRule, Source, SourceType, Statistics};
use crate::scanner::ScanOptions;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::info;

/// Method-specific inputs for [`EmailEngine::categorize`].
#[derive(Debug, Default)]
pub struct CategorizeOptions {
    pub keywords: Option<Vec<KeywordRule>>,
    pub patterns: Option<Vec<PatternRule>>,
    pub rules: Option<Vec<CustomRule>>,
}

impl CategorizeOptions {
    pub fn keywords(keywords: Vec<KeywordRule>) -> Self {
        CategorizeOptions {
            keywords: Some(keywords),
            ..Default::default()
        }
    }

    pub fn patterns(patterns: Vec<PatternRule>) -> Self {
        CategorizeOptions {
            patterns: Some(patterns),
            ..Default::default()
        }
    }

    pub fn rules(rules: Vec<CustomRule>) -> Self {
        CategorizeOptions {
            rules: Some(rules),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessResult {
    pub total_emails: usize,
    pub emails: Vec<String>,
    pub categorized: CategoryMap,
    pub statistics: Statistics,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_emails: usize,
    pub has_categorization: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<Statistics>,
}

#[derive(Debug, Default)]
pub struct EmailEngine {
    extractor: EmailExtractor,
    scan: ScanOptions,
    emails: Vec<String>,
    categorized: CategoryMap,
}

impl EmailEngine {
    pub fn new(case_sensitive: bool) -> Self {
        EmailEngine {
            extractor: EmailExtractor::new(case_sensitive),
            ..Default::default()
        }
    }

    /// Options used when extracting from a directory.
    pub fn with_scan_options(mut self, scan: ScanOptions) -> Self {
        self.scan = scan;
        self
    }

    pub fn emails(&self) -> &[String] {
        &self.emails
    }

    pub fn categorized(&self) -> &CategoryMap {
        &self.categorized
    }

    pub fn extractor(&self) -> &EmailExtractor {
        &self.extractor
    }

    pub fn extract(&mut self, source: &Source, source_type: SourceType) -> Result<&[String]> {
        let emails = match (source_type, source) {
            (SourceType::Text, Source::Text(text)) => self.extractor.extract_from_text(text),
            (SourceType::Text, Source::Path(path)) => {
                let text = path.display().to_string();
                self.extractor.extract_from_text(&text)
            }
            (SourceType::File, Source::Path(path)) => self.extractor.extract_from_file(path)?,
            (SourceType::File, Source::Text(path)) => {
                self.extractor.extract_from_file(Path::new(path))?
            }
            (SourceType::Files, Source::Paths(paths)) => self.extractor.extract_from_files(paths),
            (SourceType::Files, _) => {
                return Err(Error::InvalidArgument(
                    "for 'files' source type, source must be a list".to_string(),
                ))
            }
            (SourceType::Directory, Source::Path(path)) => {
                self.extractor.extract_from_directory(path, &self.scan)?
            }
            (SourceType::Directory, Source::Text(path)) => {
                self.extractor.extract_from_directory(Path::new(path), &self.scan)?
            }
            (source_type, source) => {
                return Err(Error::InvalidArgument(format!(
                    "source {source:?} cannot be read as {source_type:?}"
                )))
            }
        };
        info!("Extracted {} email(s) from {:?} source", emails.len(), source_type);
        self.emails = emails;
        Ok(&self.emails)
    }

    pub fn categorize(&mut self, method: Method, options: &CategorizeOptions) -> Result<&CategoryMap> {
        if self.emails.is_empty() {
            return Err(Error::InvalidState(
                "no emails to categorize; run extract first".to_string(),
            ));
        }
        let categorized = match method {
            Method::Domain => categorizer::by_domain(&self.emails),
            Method::Type => categorizer::by_type(&self.emails),
            Method::Keywords => {
                let keywords = required(options.keywords.as_deref(), "keywords")?;
                categorizer::by_keywords(&self.emails, keywords)
            }
            Method::Pattern => {
                let patterns = required(options.patterns.as_deref(), "patterns")?;
                categorizer::by_pattern(&self.emails, patterns)?
            }
            Method::Custom => {
                let rules = required(options.rules.as_deref(), "rules")?;
                categorizer::by_custom_rule(&self.emails, rules)
            }
        };
        info!(
            "Categorized {} email(s) by {} into {} categories",
            self.emails.len(),
            method,
            categorized.len()
        );
        self.categorized = categorized;
        Ok(&self.categorized)
    }

    pub fn process(
        &mut self,
        source: &Source,
        source_type: SourceType,
        method: Method,
        options: &CategorizeOptions,
    ) -> Result<ProcessResult> {
        let emails = self.extract(source, source_type)?.to_vec();
        let categorized = self.categorize(method, options)?.clone();
        let statistics = categorizer::statistics(&categorized);
        Ok(ProcessResult {
            total_emails: emails.len(),
            emails,
            categorized,
            statistics,
        })
    }

    /// Runs the option-free methods over the current emails without touching
    /// the stored categorization.
    pub fn categorize_multi(&self, methods: &[Method]) -> Vec<(Method, CategoryMap)> {
        categorizer::categorize_multi(&self.emails, methods)
    }

    pub fn statistics(&self) -> Statistics {
        categorizer::statistics(&self.categorized)
    }

    pub fn filter_emails(
        &self,
        categories: Option<&[String]>,
        exclude_categories: Option<&[String]>,
    ) -> Result<Vec<String>> {
        if self.categorized.is_empty() {
            return Err(Error::InvalidState(
                "no categorization available; run categorize first".to_string(),
            ));
        }
        match (categories, exclude_categories) {
            (Some(keep), _) if !keep.is_empty() => {
                Ok(categorizer::filter_by_category(&self.categorized, keep))
            }
            (_, Some(drop)) if !drop.is_empty() => {
                Ok(categorizer::exclude_categories(&self.categorized, drop))
            }
            _ => Ok(self.emails.clone()),
        }
    }

    pub fn summary(&self) -> Summary {
        let has_categorization = !self.categorized.is_empty();
        Summary {
            total_emails: self.emails.len(),
            has_categorization,
            categories: has_categorization
                .then(|| self.categorized.labels().map(String::from).collect()),
            statistics: has_categorization.then(|| self.statistics()),
        }
    }

    pub fn reset(&mut self) {
        self.emails.clear();
        self.categorized = CategoryMap::new();
        self.extractor.clear_cache();
    }

    pub fn export_json(&self, path: &Path, include_stats: bool) -> Result<()> {
        export::write_json(path, &self.emails, &self.categorized, include_stats)
    }

    pub fn export_csv(&self, path: &Path, include_category: bool) -> Result<()> {
        export::write_csv(path, &self.emails, &self.categorized, include_category)
    }

    pub fn export_txt(&self, path: &Path, grouped: bool) -> Result<()> {
        export::write_txt(path, &self.emails, &self.categorized, grouped)
    }
}

impl fmt::Display for EmailEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EmailEngine(emails={}, categorized={})",
            self.emails.len(),
            !self.categorized.is_empty()
        )
    }
}

fn required<'a, T>(value: Option<&'a [T]>, name: &str) -> Result<&'a [T]> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::InvalidArgument(format!(
            "'{name}' argument required for this method"
        ))),
    }
}
