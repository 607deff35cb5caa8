//! Writers for the three export formats. Existing files are overwritten.

use crate::error::{Error, Result};
use crate::models::{CategoryMap, Statistics};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
struct JsonExport<'a> {
    emails: &'a [String],
    categorized: &'a CategoryMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    statistics: Option<Statistics>,
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| Error::io(path, e))
}

/// `{emails, categorized, statistics?}`; statistics only when asked for and
/// there is a categorization to count.
pub fn write_json(
    path: &Path,
    emails: &[String],
    categorized: &CategoryMap,
    include_stats: bool,
) -> Result<()> {
    let doc = JsonExport {
        emails,
        categorized,
        statistics: (include_stats && !categorized.is_empty())
            .then(|| Statistics::from(categorized)),
    };
    let mut out = create(path)?;
    serde_json::to_writer_pretty(&mut out, &doc)?;
    out.write_all(b"\n").map_err(|e| Error::io(path, e))?;
    out.flush().map_err(|e| Error::io(path, e))
}

pub fn write_csv(
    path: &Path,
    emails: &[String],
    categorized: &CategoryMap,
    include_category: bool,
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(create(path)?);
    if include_category && !categorized.is_empty() {
        writer.write_record(["Email", "Category"])?;
        for (label, members) in categorized.iter() {
            for email in members {
                writer.write_record([email.as_str(), label])?;
            }
        }
    } else {
        writer.write_record(["Email"])?;
        for email in emails {
            writer.write_record([email.as_str()])?;
        }
    }
    writer.flush().map_err(|e| Error::io(path, e))
}

pub fn write_txt(
    path: &Path,
    emails: &[String],
    categorized: &CategoryMap,
    grouped: bool,
) -> Result<()> {
    let mut out = create(path)?;
    let body = if grouped && !categorized.is_empty() {
        render_grouped(categorized)
    } else {
        render_flat(emails)
    };
    out.write_all(body.as_bytes())
        .and_then(|_| out.flush())
        .map_err(|e| Error::io(path, e))
}

/// One address per line.
pub fn render_flat(emails: &[String]) -> String {
    let mut body = String::new();
    for email in emails {
        body.push_str(email);
        body.push('\n');
    }
    body
}

/// A blank line and an `=== LABEL ===` header before each category.
pub fn render_grouped(categorized: &CategoryMap) -> String {
    let mut body = String::new();
    for (label, members) in categorized.iter() {
        body.push_str(&format!("\n=== {} ===\n", label.to_uppercase()));
        body.push_str(&render_flat(members));
    }
    body
}
