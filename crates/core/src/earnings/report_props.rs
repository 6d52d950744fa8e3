//! Property-based tests for lead aggregation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::earnings::report::{LeadReportLayout, count_leads, lead_counts};
use crate::earnings::types::{UtmSummary, earnings_for};

fn arb_utm() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,11}"
}

fn arb_rows() -> impl Strategy<Value = Vec<(String, u32)>> {
    prop::collection::vec((arb_utm(), 0u32..10_000), 0..40)
}

fn build_report(rows: &[(String, u32)]) -> Vec<Vec<String>> {
    let mut report = vec![vec!["utm_source".to_string(), "count".to_string()]];
    report.extend(rows.iter().map(|(utm, n)| vec![utm.clone(), n.to_string()]));
    report.push(vec!["Grand Total".to_string(), "0".to_string()]);
    report
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Per-UTM counts equal the sum of that UTM's rows.
    #[test]
    fn prop_count_matches_manual_sum(rows in arb_rows(), probe in arb_utm()) {
        let layout = LeadReportLayout::new("utm_source", "Grand Total");
        let expected: u64 = rows
            .iter()
            .filter(|(utm, _)| utm == &probe)
            .map(|(_, n)| u64::from(*n))
            .sum();

        let tally = count_leads(&build_report(&rows), &layout, &probe);
        prop_assert_eq!(tally.leads, expected);
        prop_assert_eq!(tally.skipped_cells, 0);
    }

    /// The grouped totals add up to every data row.
    #[test]
    fn prop_grouped_counts_cover_all_rows(rows in arb_rows()) {
        let layout = LeadReportLayout::new("utm_source", "Grand Total");
        let total: u64 = rows.iter().map(|(_, n)| u64::from(*n)).sum();

        let counts = lead_counts(&build_report(&rows), &layout);
        prop_assert_eq!(counts.values().sum::<u64>(), total);
    }

    /// Earnings are always leads times rate.
    #[test]
    fn prop_earnings_is_leads_times_rate(leads in 0u64..1_000_000, cents in 0i64..100_000) {
        let rate = Decimal::new(cents, 2);
        let row = UtmSummary::new("utm", leads, rate).unwrap();
        prop_assert_eq!(row.earnings, Decimal::from(leads) * rate);
        prop_assert_eq!(earnings_for(leads, rate), Ok(row.earnings));
    }
}
