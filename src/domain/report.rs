//! Fixed-width report layout and run results

use uuid::Uuid;

use crate::domain::record::CollectedEntry;

pub const PASSWORD_WIDTH: usize = 30;
pub const PASSES_WIDTH: usize = 20;
pub const SALT_WIDTH: usize = 20;
pub const HASH_WIDTH: usize = 50;
pub const RULE_WIDTH: usize = 120;

/// Header row followed by the dash rule, both newline-terminated.
pub fn header() -> String {
    format!(
        "{}{}{}{}\n{}\n",
        pad_start("Password", PASSWORD_WIDTH),
        pad_start("Passes", PASSES_WIDTH),
        pad_start("Salt", SALT_WIDTH),
        pad_start("Hash", HASH_WIDTH),
        "-".repeat(RULE_WIDTH)
    )
}

/// One right-justified data row. Fields wider than their column are written in full.
pub fn row(entry: &CollectedEntry) -> String {
    format!(
        "{}{}{}{}\n",
        pad_start(&entry.record.password, PASSWORD_WIDTH),
        pad_start(&entry.record.passes.to_string(), PASSES_WIDTH),
        pad_start(&entry.record.salt.to_string(), SALT_WIDTH),
        pad_start(&entry.value, HASH_WIDTH)
    )
}

/// Left-pad with spaces to `width` UTF-16 code units, so a character outside the
/// Basic Multilingual Plane takes two columns.
pub fn pad_start(value: &str, width: usize) -> String {
    let units = value.encode_utf16().count();
    format!("{}{}", " ".repeat(width.saturating_sub(units)), value)
}

/// Counters for a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id:       Uuid,
    pub workers:      usize,
    pub submitted:    usize,
    pub accepted:     usize,
    pub rejected:     usize,
    pub failed:       usize,
    pub rows_written: usize
}

/// What the printer hands back once the report is on the sink
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: RunSummary,
    /// Entries in the order they were written
    pub entries: Vec<CollectedEntry>
}
