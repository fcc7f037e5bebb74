//! Aggregation of donation records into the statistics shown in the monthly report.

use indexmap::IndexMap;
use serde::Serialize;

use crate::record::{DonationRecord, SupporterId};

/// Number of supporters listed in the ranking.
pub const TOP_SUPPORTER_LIMIT: usize = 10;

/// Donation totals of a single supporter over the analyzed records.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SupporterAggregate {
    pub supporter_id: SupporterId,
    pub name: String,
    pub total: f64,
    pub count: usize,
}

/// Statistics derived from one month of donations.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Summary {
    /// Number of donation records. Kept as a record count, see `unique_supporters` for donors.
    pub total_supporters: usize,
    pub unique_supporters: usize,
    pub total_donations: usize,
    pub total_revenue: f64,
    pub average_donation: f64,
    /// Highest totals first; supporters with equal totals keep the order they were first seen in.
    pub top_supporters: Vec<SupporterAggregate>,
    /// Revenue per calendar day, in the order the days first appear in the input.
    pub daily_revenue: IndexMap<String, f64>,
}

impl Summary {
    /// Returns `true` when no donations were analyzed.
    pub fn is_empty(&self) -> bool {
        self.total_donations == 0
    }
}

#[derive(Debug)]
struct Tally {
    name: Option<String>,
    total: f64,
    count: usize,
}

/// Configurable analyzer; [`analyze`] uses the default ranking size.
#[derive(Clone, Copy, Debug)]
pub struct Analyzer {
    top_limit: usize,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self {
            top_limit: TOP_SUPPORTER_LIMIT,
        }
    }
}

impl Analyzer {
    /// Creates an analyzer ranking [`TOP_SUPPORTER_LIMIT`] supporters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how many supporters are kept in the ranking.
    pub fn with_top_limit(mut self, top_limit: usize) -> Self {
        self.top_limit = top_limit;
        self
    }

    /// Computes the summary for `records`, processing them in order.
    pub fn analyze(&self, records: &[DonationRecord]) -> Summary {
        if records.is_empty() {
            return Summary::default();
        }

        let mut daily_revenue: IndexMap<String, f64> = IndexMap::new();
        let mut tallies: IndexMap<&SupporterId, Tally> = IndexMap::new();
        let mut total_revenue = 0.0;

        for record in records {
            let amount = record.amount;
            total_revenue += amount;

            if let Some(day) = record.date_key() {
                *daily_revenue.entry(day.to_owned()).or_insert(0.0) += amount;
            }

            let tally = tallies.entry(&record.supporter_id).or_insert_with(|| Tally {
                name: None,
                total: 0.0,
                count: 0,
            });
            if tally.name.is_none() {
                tally.name = record.supporter_name.clone();
            }
            tally.total += amount;
            tally.count += 1;
        }

        let total_donations = records.len();
        let unique_supporters = tallies.len();

        let mut ranking: Vec<SupporterAggregate> = tallies
            .into_iter()
            .map(|(id, tally)| SupporterAggregate {
                supporter_id: id.clone(),
                name: tally.name.unwrap_or_else(|| id.placeholder_name()),
                total: tally.total,
                count: tally.count,
            })
            .collect();
        // `sort_by` is stable, so equal totals stay in first-encounter order.
        ranking.sort_by(|a, b| b.total.total_cmp(&a.total));
        ranking.truncate(self.top_limit);

        Summary {
            total_supporters: total_donations,
            unique_supporters,
            total_donations,
            total_revenue,
            average_donation: total_revenue / total_donations as f64,
            top_supporters: ranking,
            daily_revenue,
        }
    }
}

/// Computes the report summary for `records` with the default ranking size.
pub fn analyze(records: &[DonationRecord]) -> Summary {
    Analyzer::default().analyze(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn donation(id: i64, amount: f64, created_at: &str) -> DonationRecord {
        DonationRecord::new(SupporterId::number(id))
            .with_amount(amount)
            .with_created_at(created_at)
    }

    #[test]
    fn empty_input_yields_zeroed_summary() {
        let summary = analyze(&[]);
        assert_eq!(summary, Summary::default());
        assert!(summary.is_empty());
        assert_eq!(summary.average_donation, 0.0);
    }

    #[test]
    fn groups_revenue_by_day_in_first_seen_order() {
        let records = vec![
            donation(1, 10.0, "2023-01-07T08:00:00"),
            donation(2, 5.0, "2023-01-02T09:00:00"),
            donation(3, 2.5, "2023-01-07T23:59:59"),
        ];

        let summary = analyze(&records);
        let days: Vec<_> = summary.daily_revenue.iter().collect();
        assert_eq!(
            days,
            vec![(&"2023-01-07".to_string(), &12.5), (&"2023-01-02".to_string(), &5.0)]
        );
    }

    #[test]
    fn first_real_name_is_kept() {
        let records = vec![
            DonationRecord::new(SupporterId::number(1)).with_amount(1.0),
            DonationRecord::new(SupporterId::number(1))
                .with_name("Grace")
                .with_amount(1.0),
            DonationRecord::new(SupporterId::number(1))
                .with_name("G. Hopper")
                .with_amount(1.0),
        ];

        let summary = analyze(&records);
        assert_eq!(summary.top_supporters[0].name, "Grace");
        assert_eq!(summary.top_supporters[0].count, 3);
    }

    #[test]
    fn placeholder_used_when_no_name_seen() {
        let summary = analyze(&[donation(9, 3.0, "2023-01-01")]);
        assert_eq!(summary.top_supporters[0].name, "Supporter 9");
    }

    #[test]
    fn custom_top_limit_truncates_ranking() {
        let records: Vec<_> = (1..=5).map(|id| donation(id, id as f64, "2023-03-01")).collect();
        let summary = Analyzer::new().with_top_limit(2).analyze(&records);
        let ids: Vec<_> = summary
            .top_supporters
            .iter()
            .map(|s| s.supporter_id.clone())
            .collect();
        assert_eq!(ids, vec![SupporterId::number(5), SupporterId::number(4)]);
        assert_eq!(summary.unique_supporters, 5);
    }

    #[test]
    fn average_uses_record_count() {
        let records = vec![
            donation(1, 30.0, "2023-01-01"),
            donation(1, 0.0, "2023-01-01"),
            donation(2, 30.0, "2023-01-01"),
        ];
        let summary = analyze(&records);
        assert_eq!(summary.total_supporters, 3);
        assert_eq!(summary.unique_supporters, 2);
        assert_eq!(summary.average_donation, 20.0);
    }
}
