use crate::error::Result;
use crate::models::{KeywordRule, PatternRule};
use crate::scanner::ScanOptions;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub extraction: ExtractionConfig,
    pub categorization: CategorizationConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub case_sensitive: bool,
    pub recursive: bool,
    pub extensions: Vec<String>,
    pub exclude: Vec<String>,
}

impl ExtractionConfig {
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            recursive: self.recursive,
            extensions: self.extensions.clone(),
            exclude: self.exclude.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CategorizationConfig {
    pub method: Option<String>,
    pub keywords: Vec<KeywordRule>,
    pub patterns: Vec<PatternRule>,
    pub rules_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: String,
    pub include_stats: bool,
    pub grouped: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            format: "json".to_string(),
            include_stats: false,
            grouped: false,
        }
    }
}

/// Loads `path` (or the optional `config/default`), then `MAILSORT__*`
/// environment overrides. List settings take comma-separated values, e.g.
/// `MAILSORT__EXTRACTION__EXTENSIONS=txt,log`.
pub fn load(path: Option<&str>) -> Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(
        config::Environment::with_prefix("MAILSORT")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("extraction.extensions")
            .with_list_parse_key("extraction.exclude"),
    );
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_ordered_rule_tables_from_toml() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("mailsort.toml");
        std::fs::write(
            &path,
            r#"
                [extraction]
                recursive = true
                extensions = ["txt", "log"]

                [categorization]
                method = "keywords"

                [[categorization.keywords]]
                label = "sales"
                keywords = ["sales"]

                [[categorization.keywords]]
                label = "support"
                keywords = ["support", "help"]

                [output]
                format = "csv"
            "#,
        )
        .unwrap();

        let cfg = load(Some(path.to_str().unwrap())).unwrap();
        assert!(cfg.extraction.recursive);
        assert!(!cfg.extraction.case_sensitive);
        assert_eq!(cfg.extraction.scan_options().extensions, vec!["txt", "log"]);
        assert_eq!(cfg.categorization.method.as_deref(), Some("keywords"));
        assert_eq!(
            cfg.categorization.keywords,
            vec![
                KeywordRule::new("sales", &["sales"]),
                KeywordRule::new("support", &["support", "help"]),
            ]
        );
        assert!(cfg.categorization.patterns.is_empty());
        assert_eq!(cfg.output.format, "csv");
        assert!(!cfg.output.include_stats);
    }

    #[test]
    fn env_sets_list_settings_from_comma_separated_values() {
        std::env::set_var("MAILSORT__EXTRACTION__EXCLUDE", "*.bak,tmp/**");
        std::env::set_var("MAILSORT__OUTPUT__GROUPED", "true");
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("empty.toml");
        std::fs::write(&path, "").unwrap();

        let loaded = load(Some(path.to_str().unwrap()));
        std::env::remove_var("MAILSORT__EXTRACTION__EXCLUDE");
        std::env::remove_var("MAILSORT__OUTPUT__GROUPED");

        let cfg = loaded.unwrap();
        assert_eq!(cfg.extraction.exclude, vec!["*.bak", "tmp/**"]);
        assert!(cfg.output.grouped);
        assert_eq!(cfg.output.format, "json");
    }
}
