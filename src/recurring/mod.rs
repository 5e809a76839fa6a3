use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use log::info;

use crate::transaction::Transaction;

/// A merchant needs this many statement rows before it counts as recurring.
pub(crate) const MIN_OCCURRENCES: usize = 3;

/// Assumed billing cycle when a group has too few dates to measure one.
const DEFAULT_INTERVAL_DAYS: f64 = 30.0;

#[derive(Debug, Clone)]
pub(crate) struct Charge {
    pub(crate) date: NaiveDate,
    pub(crate) amount: f32,
}

/// Per-merchant summary of a detected recurring subscription. Computed once
/// after the statement scan and never mutated.
#[derive(Debug, Clone)]
pub(crate) struct Subscription {
    pub(crate) merchant: String,
    /// Total statement rows for this merchant, refunds included.
    pub(crate) count: usize,
    /// Mean of absolute amounts over charge rows only.
    pub(crate) avg_amount: f32,
    pub(crate) avg_interval_days: f64,
    pub(crate) next_billing: NaiveDate,
    /// Charge rows only, newest first.
    pub(crate) charges: Vec<Charge>,
}

/// Group transactions by exact merchant description and summarise every
/// merchant seen at least [`MIN_OCCURRENCES`] times. Results are ordered by
/// descending charge count; the sort is stable, so ties keep the order in
/// which merchants first appeared in the statement.
pub(crate) fn detect(transactions: &[Transaction], today: NaiveDate) -> Vec<Subscription> {
    let mut groups: HashMap<&str, Vec<&Transaction>> = HashMap::new();
    let mut merchant_order: Vec<&str> = vec![];
    for t in transactions {
        groups
            .entry(t.description.as_str())
            .or_insert_with(|| {
                merchant_order.push(t.description.as_str());
                vec![]
            })
            .push(t);
    }

    let mut subscriptions: Vec<Subscription> = vec![];
    for merchant in merchant_order {
        let records = &groups[merchant];
        if records.len() < MIN_OCCURRENCES {
            continue;
        }
        if let Some(subscription) = summarise(merchant, records, today) {
            subscriptions.push(subscription);
        }
    }

    subscriptions.sort_by(|a, b| b.count.cmp(&a.count));
    info!(
        "{} of {} merchants qualify as recurring",
        subscriptions.len(),
        groups.len()
    );
    subscriptions
}

fn summarise(merchant: &str, records: &[&Transaction], today: NaiveDate) -> Option<Subscription> {
    // Refund-only groups have no charge to move to a new card.
    let amounts: Vec<f32> = records
        .iter()
        .filter(|t| t.is_charge())
        .map(|t| t.amount.abs())
        .collect();
    if amounts.is_empty() {
        return None;
    }
    let avg_amount = amounts.iter().sum::<f32>() / amounts.len() as f32;

    let mut dates: Vec<NaiveDate> = records.iter().map(|t| t.date).collect();
    dates.sort();
    let intervals: Vec<i64> = dates.windows(2).map(|w| (w[1] - w[0]).num_days()).collect();
    let avg_interval_days = if intervals.is_empty() {
        DEFAULT_INTERVAL_DAYS
    } else {
        intervals.iter().sum::<i64>() as f64 / intervals.len() as f64
    };

    let last_date = *dates.last()?;
    let next_billing = predict_next_billing(last_date, avg_interval_days, today);

    let mut charges: Vec<Charge> = records
        .iter()
        .filter(|t| t.is_charge())
        .map(|t| Charge {
            date: t.date,
            amount: t.amount,
        })
        .collect();
    charges.sort_by(|a, b| b.date.cmp(&a.date));

    Some(Subscription {
        merchant: merchant.to_string(),
        count: records.len(),
        avg_amount,
        avg_interval_days,
        next_billing,
        charges,
    })
}

/// Step forward from the last charge date until strictly after `today`. The
/// step is the rounded interval, clamped to at least one day so a group of
/// same-day duplicate charges cannot stall the loop.
fn predict_next_billing(last_date: NaiveDate, avg_interval_days: f64, today: NaiveDate) -> NaiveDate {
    let step = Duration::days((avg_interval_days.round() as i64).max(1));
    let mut next = last_date + step;
    while next <= today {
        next += step;
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(date: &str, description: &str, amount: f32) -> Transaction {
        Transaction::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            description,
            amount,
        )
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn fewer_than_three_rows_is_not_recurring() {
        let transactions = vec![
            tx("2024-01-05", "NETFLIX.COM", -20.99),
            tx("2024-02-05", "NETFLIX.COM", -20.99),
        ];
        let result = detect(&transactions, date("2024-03-01"));
        assert!(result.is_empty());
    }

    #[test]
    fn refund_only_group_is_dropped() {
        let transactions = vec![
            tx("2024-01-05", "ACME REFUNDS", 5.00),
            tx("2024-02-05", "ACME REFUNDS", 5.00),
            tx("2024-03-05", "ACME REFUNDS", 5.00),
        ];
        let result = detect(&transactions, date("2024-03-10"));
        assert!(result.is_empty());
    }

    #[test]
    fn monthly_subscription_is_summarised() {
        let transactions = vec![
            tx("2024-01-01", "NETFLIX.COM", -9.99),
            tx("2024-01-31", "NETFLIX.COM", -9.99),
            tx("2024-03-01", "NETFLIX.COM", -9.99),
        ];
        let result = detect(&transactions, date("2024-03-15"));
        assert_eq!(result.len(), 1);
        let s = &result[0];
        assert_eq!(s.merchant, "NETFLIX.COM");
        assert_eq!(s.count, 3);
        assert!((s.avg_amount - 9.99).abs() < 1e-6);
        assert!((s.avg_interval_days - 30.0).abs() < 1e-9);
        assert_eq!(s.next_billing, date("2024-03-31"));
    }

    #[test]
    fn average_amount_ignores_refunds_but_count_does_not() {
        let transactions = vec![
            tx("2024-01-01", "AUDIBLE", -15.00),
            tx("2024-02-01", "AUDIBLE", -25.00),
            tx("2024-02-10", "AUDIBLE", 25.00),
        ];
        let result = detect(&transactions, date("2024-02-20"));
        assert_eq!(result.len(), 1);
        let s = &result[0];
        assert_eq!(s.count, 3);
        assert!((s.avg_amount - 20.00).abs() < 1e-6);
        // Charges list excludes the refund row.
        assert_eq!(s.charges.len(), 2);
        assert_eq!(s.charges[0].date, date("2024-02-01"));
    }

    #[test]
    fn next_billing_is_always_in_the_future() {
        let transactions = vec![
            tx("2023-01-01", "SPOTIFY", -11.99),
            tx("2023-02-01", "SPOTIFY", -11.99),
            tx("2023-03-01", "SPOTIFY", -11.99),
        ];
        let today = date("2024-01-15");
        let result = detect(&transactions, today);
        let s = &result[0];
        assert!(s.next_billing > today);
        // Prediction stays on the cadence of the last charge.
        let days_since_last = (s.next_billing - date("2023-03-01")).num_days();
        let step = s.avg_interval_days.round() as i64;
        assert_eq!(days_since_last % step, 0);
    }

    #[test]
    fn same_day_duplicates_do_not_stall_prediction() {
        let transactions = vec![
            tx("2024-01-01", "ZOOM.US", -20.00),
            tx("2024-01-01", "ZOOM.US", -20.00),
            tx("2024-01-01", "ZOOM.US", -20.00),
        ];
        let today = date("2024-02-01");
        let result = detect(&transactions, today);
        assert_eq!(result.len(), 1);
        assert!(result[0].next_billing > today);
    }

    #[test]
    fn results_ordered_by_count_with_stable_ties() {
        let transactions = vec![
            tx("2024-01-01", "B-FIRST-SEEN", -1.0),
            tx("2024-01-01", "A-SECOND-SEEN", -1.0),
            tx("2024-02-01", "B-FIRST-SEEN", -1.0),
            tx("2024-02-01", "A-SECOND-SEEN", -1.0),
            tx("2024-03-01", "B-FIRST-SEEN", -1.0),
            tx("2024-03-01", "A-SECOND-SEEN", -1.0),
            tx("2024-01-15", "BUSIEST", -2.0),
            tx("2024-02-15", "BUSIEST", -2.0),
            tx("2024-03-15", "BUSIEST", -2.0),
            tx("2024-04-15", "BUSIEST", -2.0),
        ];
        let result = detect(&transactions, date("2024-05-01"));
        let merchants: Vec<&str> = result.iter().map(|s| s.merchant.as_str()).collect();
        assert_eq!(merchants, vec!["BUSIEST", "B-FIRST-SEEN", "A-SECOND-SEEN"]);
    }

    #[test]
    fn same_day_rows_measure_a_zero_interval() {
        // Three rows on one date leave only zero-length gaps to average.
        let transactions = vec![
            tx("2024-01-01", "ONEPROVIDER", -7.00),
            tx("2024-01-01", "ONEPROVIDER", -7.00),
            tx("2024-01-01", "ONEPROVIDER", -7.00),
        ];
        let result = detect(&transactions, date("2024-01-02"));
        assert_eq!(result.len(), 1);
        assert!((result[0].avg_interval_days - 0.0).abs() < 1e-9);
    }
}
