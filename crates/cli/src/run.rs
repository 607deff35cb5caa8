use crate::args::Cli;
use anyhow::{bail, Context, Result};
use mailsort_core::config::AppConfig;
use mailsort_core::export;
use mailsort_core::rules;
use mailsort_core::{CategorizeOptions, EmailEngine, Method, Source, SourceType};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

/// Runs one extraction. Results go to `out`, status lines to `err`.
pub fn run(cli: &Cli, cfg: AppConfig, out: &mut dyn Write, err: &mut dyn Write) -> Result<()> {
    let mut scan = cfg.extraction.scan_options();
    scan.recursive |= cli.recursive;
    if !cli.ext.is_empty() {
        scan.extensions = cli.ext.clone();
    }
    if !cli.exclude.is_empty() {
        scan.exclude = cli.exclude.clone();
    }
    let mut engine = EmailEngine::new(cli.case_sensitive || cfg.extraction.case_sensitive)
        .with_scan_options(scan.clone());

    let (source, source_type) = if let Some(text) = &cli.text {
        info!("Extracting emails from text...");
        (Source::Text(text.clone()), SourceType::Text)
    } else if let Some(file) = &cli.file {
        info!("Extracting emails from file: {}", file.display());
        (Source::Path(file.clone()), SourceType::File)
    } else if let Some(dir) = &cli.directory {
        let mode = if scan.recursive {
            "recursively"
        } else {
            "non-recursively"
        };
        info!("Extracting emails from directory {}: {}", mode, dir.display());
        (Source::Path(dir.clone()), SourceType::Directory)
    } else {
        bail!("one of --text, --file or --directory is required");
    };

    let found = engine
        .extract(&source, source_type)
        .context("extraction failed")?
        .len();
    if found == 0 {
        if !cli.quiet {
            writeln!(err, "No emails found.")?;
        }
        return Ok(());
    }
    info!("Found {} email(s)", found);

    let method_name = cli
        .categorize
        .clone()
        .or_else(|| cfg.categorization.method.clone())
        .unwrap_or_else(|| "none".to_string());
    let categorized = method_name != "none";
    if categorized {
        let method: Method = method_name.parse()?;
        info!("Categorizing emails by {}...", method);
        let options = categorize_options(method, cli, &cfg)?;
        engine
            .categorize(method, &options)
            .with_context(|| format!("categorizing by {method} failed"))?;
    }

    if let Some(path) = &cli.output {
        let format = cli
            .format
            .clone()
            .unwrap_or_else(|| cfg.output.format.clone());
        let written = match format.as_str() {
            "json" => engine.export_json(path, cli.stats || cfg.output.include_stats),
            "csv" => engine.export_csv(path, categorized),
            "txt" => engine.export_txt(path, cli.grouped || cfg.output.grouped),
            other => bail!("unknown output format: {other}"),
        };
        written.with_context(|| format!("writing {}", path.display()))?;
        if !cli.quiet {
            writeln!(err, "Results saved to: {}", path.display())?;
        }
    } else if categorized {
        out.write_all(export::render_grouped(engine.categorized()).as_bytes())?;
    } else {
        out.write_all(export::render_flat(engine.emails()).as_bytes())?;
    }

    if cli.stats && !cli.quiet {
        let summary = engine.summary();
        writeln!(err, "\n=== STATISTICS ===")?;
        writeln!(err, "Total emails: {}", summary.total_emails)?;
        if let Some(stats) = summary.statistics {
            writeln!(err, "\nBy category:")?;
            for (label, count) in stats.iter() {
                writeln!(err, "  {}: {}", label, count)?;
            }
        }
    }
    Ok(())
}

fn categorize_options(method: Method, cli: &Cli, cfg: &AppConfig) -> Result<CategorizeOptions> {
    let categorization = &cfg.categorization;
    Ok(match method {
        Method::Keywords => CategorizeOptions::keywords(categorization.keywords.clone()),
        Method::Pattern => CategorizeOptions::patterns(categorization.patterns.clone()),
        Method::Custom => {
            let dir = cli
                .rules
                .clone()
                .or_else(|| categorization.rules_path.as_ref().map(PathBuf::from))
                .context("the custom method needs --rules or categorization.rules_path")?;
            let loaded = rules::load_rules_from_dir(&dir)
                .with_context(|| format!("loading rules from {}", dir.display()))?;
            debug!("Loaded {} rule(s) from {}", loaded.len(), dir.display());
            CategorizeOptions::rules(rules::to_custom_rules(&loaded)?)
        }
        Method::Domain | Method::Type => CategorizeOptions::default(),
    })
}
