//! Scanning the lead report.
//!
//! The lead report is a pivot produced outside this application. Its layout
//! is loose: arbitrary rows may precede a header row, after which each row
//! is `utm_id, count` until a terminal row (usually `Grand Total`).

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Sentinels that bound the data rows of the lead report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadReportLayout {
    /// First-cell value of the header row.
    pub header: String,
    /// First-cell value of the row that ends the data.
    pub terminator: String,
}

impl LeadReportLayout {
    /// Creates a layout from the two sentinels.
    #[must_use]
    pub fn new(header: impl Into<String>, terminator: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            terminator: terminator.into(),
        }
    }
}

/// Result of summing counts for one UTM id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeadTally {
    /// Total leads.
    pub leads: u64,
    /// Matching rows whose count cell could not be read as a whole number.
    pub skipped_cells: usize,
}

fn first_cell(row: &[String]) -> &str {
    row.first().map_or("", |c| c.trim())
}

fn parse_count(cell: &str) -> Option<u64> {
    let cell = cell.trim().replace(',', "");
    if cell.is_empty() {
        return Some(0);
    }
    if let Ok(n) = cell.parse::<u64>() {
        return Some(n);
    }
    // Sheets may render counts as "12.0".
    let value: Decimal = cell.parse().ok()?;
    if value.fract().is_zero() {
        value.to_u64()
    } else {
        None
    }
}

/// Iterates the data rows between the header and the terminator.
fn data_rows<'a>(
    rows: &'a [Vec<String>],
    layout: &'a LeadReportLayout,
) -> impl Iterator<Item = &'a Vec<String>> + 'a {
    rows.iter()
        .skip_while(move |row| !first_cell(row).eq_ignore_ascii_case(layout.header.trim()))
        .skip(1)
        .take_while(move |row| !first_cell(row).eq_ignore_ascii_case(layout.terminator.trim()))
}

/// Sums the lead counts attributed to `utm_id`.
///
/// Matching is case-insensitive. A report without the header row yields zero.
/// Cells that are unreadable, or that would push the total past `u64::MAX`,
/// are counted in `skipped_cells` instead.
#[must_use]
pub fn count_leads(rows: &[Vec<String>], layout: &LeadReportLayout, utm_id: &str) -> LeadTally {
    let utm_id = utm_id.trim();
    let mut tally = LeadTally::default();

    for row in data_rows(rows, layout).filter(|row| first_cell(row).eq_ignore_ascii_case(utm_id)) {
        match parse_count(row.get(1).map_or("", String::as_str))
            .and_then(|n| tally.leads.checked_add(n))
        {
            Some(total) => tally.leads = total,
            None => tally.skipped_cells += 1,
        }
    }

    tally
}

/// Sums lead counts for every UTM id in the report.
///
/// Keys are lowercased UTM ids. Unreadable count cells, and cells that would
/// overflow the total, are ignored.
#[must_use]
pub fn lead_counts(rows: &[Vec<String>], layout: &LeadReportLayout) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();

    for row in data_rows(rows, layout) {
        let utm = first_cell(row);
        if utm.is_empty() {
            continue;
        }
        if let Some(n) = parse_count(row.get(1).map_or("", String::as_str)) {
            let total = counts.entry(utm.to_lowercase()).or_insert(0u64);
            if let Some(sum) = total.checked_add(n) {
                *total = sum;
            }
        }
    }

    counts
}
