use anyhow::{Context, Result};
use inventory_scan::{ScanResult, Workspace};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub lines: usize,
    pub matched: usize,
    pub unknown: usize,
    pub skipped: usize,
}

/// Split a `code` or `code;quantity` line. A quantity that is not a number
/// is kept with the code so the whole line is scanned as-is.
pub fn parse_batch_line(line: &str, default_quantity: i64) -> (&str, i64) {
    match line.rsplit_once([';', '\t']) {
        Some((code, qty)) => match qty.trim().parse::<i64>() {
            Ok(qty) => (code, qty),
            Err(_) => (line, default_quantity),
        },
        None => (line, default_quantity),
    }
}

/// Feed every line of `codes` into the current session of `workspace`.
pub fn replay(workspace: &mut Workspace, codes: &Path, default_quantity: i64) -> Result<BatchReport> {
    let text = fs::read_to_string(codes)
        .with_context(|| format!("reading scanned codes from '{}'", codes.display()))?;
    let mut report = BatchReport::default();

    for (idx, line) in text.lines().enumerate() {
        report.lines += 1;
        let (code, quantity) = parse_batch_line(line, default_quantity);
        match workspace.scan(code, quantity)? {
            Some(ScanResult::Matched { .. }) => report.matched += 1,
            Some(ScanResult::Unknown { code, .. }) => {
                warn!("Line {}: unknown code {}", idx + 1, code);
                report.unknown += 1;
            }
            Some(ScanResult::Removed { .. }) => {}
            None => {
                debug!("Line {}: blank, skipped", idx + 1);
                report.skipped += 1;
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_batch_line() {
        assert_eq!(parse_batch_line("111", 1), ("111", 1));
        assert_eq!(parse_batch_line("111;4", 1), ("111", 4));
        assert_eq!(parse_batch_line("111\t2", 1), ("111", 2));
        assert_eq!(parse_batch_line("111;x", 3), ("111;x", 3));
    }
}
