use super::*;

fn customer(created_at: Option<&str>) -> Customer {
    Customer {
        customer_id: None,
        name: "c".into(),
        email: None,
        phone: None,
        address: None,
        status: None,
        created_at: created_at.map(Into::into),
    }
}

fn bill(status: &str, amount: f64, generated: Option<&str>) -> Bill {
    Bill {
        bill_id: "b".into(),
        customer_id: None,
        month: String::new(),
        amount,
        status: status.into(),
        generated_date: generated.map(Into::into),
    }
}

#[test]
fn short_month_reads_iso_prefix() {
    assert_eq!(short_month("2024-03-15T10:00:00.000Z"), Some("Mar"));
    assert_eq!(short_month("2023-12"), Some("Dec"));
    assert_eq!(short_month("2024-1-05"), Some("Jan"));
}

#[test]
fn short_month_rejects_unreadable_dates() {
    assert_eq!(short_month(""), None);
    assert_eq!(short_month("March 2024"), None);
    assert_eq!(short_month("2024-13-01"), None);
    assert_eq!(short_month("2024-00-01"), None);
}

#[test]
fn revenue_grouped_by_month_in_first_seen_order() {
    let bills = [
        bill("paid", 100.0, Some("2024-03-02")),
        bill("paid", 50.0, Some("2024-01-10")),
        bill("pending", 999.0, Some("2024-02-01")),
        bill("paid", 25.0, Some("2024-03-20")),
        bill("paid", 10.0, None),
    ];
    let report = Report::compute(&[], &bills);

    assert_eq!(
        report.revenue_by_month,
        [
            MonthlyRevenue { month: "Mar", revenue: 125.0, expenses: 0.0 },
            MonthlyRevenue { month: "Jan", revenue: 50.0, expenses: 0.0 },
        ]
    );
    assert!((report.total_revenue - 175.0).abs() < f64::EPSILON);
    assert!(report.total_expenses.abs() < f64::EPSILON);
}

#[test]
fn same_month_of_different_years_shares_a_bucket() {
    let bills = [bill("paid", 1.0, Some("2023-05-01")), bill("paid", 2.0, Some("2024-05-01"))];
    let report = Report::compute(&[], &bills);
    assert_eq!(report.revenue_by_month.len(), 1);
    assert!((report.revenue_by_month[0].revenue - 3.0).abs() < f64::EPSILON);
}

#[test]
fn customer_growth_counts_dated_customers() {
    let customers = [
        customer(Some("2024-02-01")),
        customer(None),
        customer(Some("2024-04-11")),
        customer(Some("2024-02-28")),
    ];
    let report = Report::compute(&customers, &[]);

    assert_eq!(
        report.customer_growth,
        [MonthlyCount { month: "Feb", customers: 2 }, MonthlyCount { month: "Apr", customers: 1 }]
    );
    assert_eq!(report.active_customers, 4);
}
