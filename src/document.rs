use crate::fence::{CollapseReport, collapse_fences_with_report};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Splits text after every `\n`, keeping terminators so the document can be
/// written back byte for byte. A trailing fragment without `\n` is a line too.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {:?}", path))?;

    Ok(split_lines(&content)
        .into_iter()
        .map(str::to_string)
        .collect())
}

pub fn write_lines<S: AsRef<str>>(path: &Path, lines: &[S]) -> Result<()> {
    let content: String = lines.iter().map(|line| line.as_ref()).collect();

    fs::write(path, content).with_context(|| format!("Failed to write file: {:?}", path))
}

/// Reads `path`, collapses its fences and returns the result without writing.
pub fn preview_empty_code_blocks(path: &Path) -> Result<(String, CollapseReport)> {
    let lines = read_lines(path)?;
    let (output, report) = collapse_fences_with_report(&lines);
    log_report(path, &report);

    Ok((output.concat(), report))
}

pub fn remove_empty_code_blocks(path: &Path) -> Result<CollapseReport> {
    let lines = read_lines(path)?;
    let (output, report) = collapse_fences_with_report(&lines);
    log_report(path, &report);

    write_lines(path, &output)?;
    Ok(report)
}

fn log_report(path: &Path, report: &CollapseReport) {
    tracing::info!(
        "{:?}: removed {} empty block(s), collapsed {} fence run(s), skipped {} blank line(s) ({} -> {} lines)",
        path,
        report.empty_blocks_removed,
        report.runs_collapsed,
        report.blank_lines_skipped,
        report.input_lines,
        report.output_lines
    );
}
