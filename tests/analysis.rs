use donation_report::{analyze, DonationRecord, SupporterId};
use serde_json::json;

fn records(value: serde_json::Value) -> Vec<DonationRecord> {
    serde_json::from_value(value).expect("records decode")
}

#[test]
fn worked_example_matches_expected_summary() {
    let summary = analyze(&records(json!([
        {"supporter_id": 1, "amount": "50", "created_at": "2023-01-05T10:00:00"},
        {"supporter_id": 1, "amount": "30", "created_at": "2023-01-06T10:00:00"},
        {"supporter_id": 2, "amount": "100", "created_at": "2023-01-05T10:00:00"},
    ])));

    assert_eq!(summary.total_supporters, 3);
    assert_eq!(summary.unique_supporters, 2);
    assert_eq!(summary.total_donations, 3);
    assert_eq!(summary.total_revenue, 180.0);
    assert_eq!(summary.average_donation, 60.0);

    let days: Vec<(&str, f64)> = summary
        .daily_revenue
        .iter()
        .map(|(day, revenue)| (day.as_str(), *revenue))
        .collect();
    assert_eq!(days, vec![("2023-01-05", 150.0), ("2023-01-06", 30.0)]);

    let ranking: Vec<(SupporterId, f64, usize)> = summary
        .top_supporters
        .iter()
        .map(|s| (s.supporter_id.clone(), s.total, s.count))
        .collect();
    assert_eq!(
        ranking,
        vec![
            (SupporterId::number(2), 100.0, 1),
            (SupporterId::number(1), 80.0, 2),
        ]
    );
    assert_eq!(summary.top_supporters[0].name, "Supporter 2");
}

#[test]
fn empty_input_is_all_zero() {
    let summary = analyze(&[]);
    assert_eq!(summary.total_supporters, 0);
    assert_eq!(summary.unique_supporters, 0);
    assert_eq!(summary.total_donations, 0);
    assert_eq!(summary.total_revenue, 0.0);
    assert_eq!(summary.average_donation, 0.0);
    assert!(summary.top_supporters.is_empty());
    assert!(summary.daily_revenue.is_empty());
}

#[test]
fn ranking_is_capped_and_sorted() {
    let input: Vec<_> = (0..15)
        .map(|id| json!({"supporter_id": id, "amount": id * 10, "created_at": "2023-05-01T00:00:00"}))
        .collect();
    let summary = analyze(&records(serde_json::Value::Array(input)));

    assert_eq!(summary.unique_supporters, 15);
    assert_eq!(summary.top_supporters.len(), 10);
    assert!(summary
        .top_supporters
        .windows(2)
        .all(|pair| pair[0].total >= pair[1].total));
    assert_eq!(summary.top_supporters[0].supporter_id, SupporterId::number(14));
    assert_eq!(summary.top_supporters[9].supporter_id, SupporterId::number(5));
}

#[test]
fn ties_keep_first_encounter_order() {
    let summary = analyze(&records(json!([
        {"supporter_id": "b", "amount": 20},
        {"supporter_id": "a", "amount": 20},
        {"supporter_id": "c", "amount": 5},
        {"supporter_id": "d", "amount": 20},
    ])));

    let ids: Vec<String> = summary
        .top_supporters
        .iter()
        .map(|s| s.supporter_id.to_string())
        .collect();
    assert_eq!(ids, vec!["b", "a", "d", "c"]);
}

#[test]
fn missing_amount_still_counts_the_donation() {
    let summary = analyze(&records(json!([
        {"supporter_id": 7, "supporter_name": "Ada", "created_at": "2023-02-01T09:00:00"},
        {"supporter_id": 8, "amount": 12.5, "created_at": "2023-02-01T10:00:00"},
    ])));

    assert_eq!(summary.total_supporters, 2);
    assert_eq!(summary.total_donations, 2);
    assert_eq!(summary.unique_supporters, 2);
    assert_eq!(summary.total_revenue, 12.5);
    assert_eq!(summary.daily_revenue["2023-02-01"], 12.5);

    let ada = summary
        .top_supporters
        .iter()
        .find(|s| s.name == "Ada")
        .expect("Ada is ranked");
    assert_eq!(ada.total, 0.0);
    assert_eq!(ada.count, 1);
}

#[test]
fn first_real_name_wins() {
    let summary = analyze(&records(json!([
        {"supporter_id": 3, "amount": 1},
        {"supporter_id": 3, "supporter_name": "Grace", "amount": 1},
        {"supporter_id": 3, "supporter_name": "G. Hopper", "amount": 1},
    ])));

    assert_eq!(summary.top_supporters.len(), 1);
    assert_eq!(summary.top_supporters[0].name, "Grace");
    assert_eq!(summary.top_supporters[0].count, 3);
}

#[test]
fn unique_supporters_never_exceed_record_count() {
    let summary = analyze(&records(json!([
        {"supporter_id": 1, "amount": 1},
        {"supporter_id": "1", "amount": 1},
        {"amount": 1},
        {"supporter_id": null, "amount": 1},
    ])));

    // numeric and textual ids differ; records without an id share one key
    assert_eq!(summary.unique_supporters, 3);
    assert!(summary.unique_supporters <= summary.total_supporters);
    assert!(summary
        .top_supporters
        .iter()
        .any(|s| s.name == "Supporter unknown"));
}

#[test]
fn records_without_timestamp_are_not_grouped_by_day() {
    let summary = analyze(&records(json!([
        {"supporter_id": 1, "amount": 10},
        {"supporter_id": 2, "amount": 5, "created_at": "2023-03-09"},
    ])));

    assert_eq!(summary.total_revenue, 15.0);
    assert_eq!(summary.daily_revenue.len(), 1);
    assert_eq!(summary.daily_revenue["2023-03-09"], 5.0);
}
