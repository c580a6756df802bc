//! Renders the finished result collection to a table or JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use unicode_width::UnicodeWidthStr;

use crate::config::{OutputConfig, OutputFormat};
use crate::schema::Item;

pub const HEADERS: [&str; 4] = ["Service", "Region", "Name", "Description"];

const FILE_STEM: &str = "secrets";

/// Directory all artifacts of one run are written under.
pub fn profile_dir(output: &OutputConfig, profile: &str) -> PathBuf {
    Path::new(&output.directory).join(profile)
}

fn row(item: &Item) -> [&str; 4] {
    [
        item.source_kind.label(),
        item.partition.as_str(),
        item.name.as_str(),
        item.description.as_str(),
    ]
}

/// Plain-text table, columns padded by display width.
pub fn render_table(items: &[Item]) -> String {
    let rows: Vec<[&str; 4]> = items.iter().map(row).collect();

    let mut widths = HEADERS.map(UnicodeWidthStr::width);
    for r in &rows {
        for (w, cell) in widths.iter_mut().zip(r) {
            *w = (*w).max(cell.width());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &HEADERS, &widths);

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');

    for r in &rows {
        push_line(&mut out, r, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[&str; 4], widths: &[usize; 4]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{cell}{}", " ".repeat(w - cell.width())))
        .collect();
    out.push_str(padded.join(" | ").trim_end());
    out.push('\n');
}

/// Writes the collection in the configured format.
///
/// Returns `None` without touching the filesystem when there is
/// nothing to write.
pub fn write_results(items: &[Item], output: &OutputConfig, profile: &str) -> Result<Option<PathBuf>> {
    if items.is_empty() {
        return Ok(None);
    }

    let (subdir, file_name, body) = match output.format {
        OutputFormat::Table => ("table", format!("{FILE_STEM}.txt"), render_table(items)),
        OutputFormat::Json => (
            "json",
            format!("{FILE_STEM}.json"),
            serde_json::to_string_pretty(items)?,
        ),
    };

    let dir = profile_dir(output, profile).join(subdir);
    fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let path = dir.join(file_name);
    fs::write(&path, body).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SourceKind;

    fn items() -> Vec<Item> {
        vec![
            Item {
                source_kind: SourceKind::SecretsManager,
                partition: "us-east-1".to_string(),
                name: "prod/db".to_string(),
                description: "primary".to_string(),
            },
            Item {
                source_kind: SourceKind::Ssm,
                partition: "eu-west-1".to_string(),
                name: "/app/key".to_string(),
                description: String::new(),
            },
        ]
    }

    fn output_in(dir: &Path, format: OutputFormat) -> OutputConfig {
        OutputConfig {
            directory: dir.to_string_lossy().into_owned(),
            format,
            verbosity: 1,
        }
    }

    #[test]
    fn table_aligns_columns() {
        let table = render_table(&items());
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "Service        | Region    | Name     | Description");
        assert_eq!(lines[1], "---------------+-----------+----------+------------");
        assert_eq!(lines[2], "SecretsManager | us-east-1 | prod/db  | primary");
        assert_eq!(lines[3], "SSM            | eu-west-1 | /app/key |");
    }

    #[test]
    fn table_pads_wide_characters_by_display_width() {
        let mut wide = items();
        wide[0].name = "秘密".to_string();
        let table = render_table(&wide);
        let lines: Vec<&str> = table.lines().collect();

        let name_cell = |l: &str| l.split(" | ").nth(2).unwrap().width();
        assert_eq!(name_cell(lines[0]), name_cell(lines[2]));
        assert_eq!(name_cell(lines[2]), 8);
    }

    #[test]
    fn empty_collection_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let written = write_results(&[], &output_in(tmp.path(), OutputFormat::Table), "p").unwrap();
        assert!(written.is_none());
        assert!(!tmp.path().join("p").exists());
    }

    #[test]
    fn writes_table_and_json_under_profile() {
        let tmp = tempfile::tempdir().unwrap();

        let table = write_results(&items(), &output_in(tmp.path(), OutputFormat::Table), "audit")
            .unwrap()
            .unwrap();
        assert_eq!(table, tmp.path().join("audit").join("table").join("secrets.txt"));
        assert!(fs::read_to_string(&table).unwrap().contains("prod/db"));

        let json = write_results(&items(), &output_in(tmp.path(), OutputFormat::Json), "audit")
            .unwrap()
            .unwrap();
        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(json).unwrap()).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[0]["service"], "SecretsManager");
        assert_eq!(parsed[1]["service"], "SSM");
    }
}
