use super::*;

fn bill(status: &str, amount: f64) -> Bill {
    Bill {
        bill_id: "b".into(),
        customer_id: None,
        month: "2024-01".into(),
        amount,
        status: status.into(),
        generated_date: None,
    }
}

fn customer(name: &str) -> Customer {
    Customer {
        customer_id: None,
        name: name.into(),
        email: None,
        phone: None,
        address: None,
        status: None,
        created_at: None,
    }
}

#[test]
fn stats_count_pending_and_sum_paid() {
    let bills = [bill("paid", 1200.0), bill("pending", 900.0), bill("paid", 300.5), bill("pending", 1.0), bill("void", 50.0)];
    let customers = [customer("Asha"), customer("Ravi")];

    let stats = DashboardStats::compute(&customers, &bills);

    assert_eq!(stats, DashboardStats { customers: 2, pending_bills: 2, revenue: 1500.5 });
}

#[test]
fn stats_for_empty_lists_are_zero() {
    assert_eq!(DashboardStats::compute(&[], &[]), DashboardStats::default());
}

#[test]
fn greeting_by_hour() {
    assert_eq!(Greeting::for_hour(0), Greeting::Morning);
    assert_eq!(Greeting::for_hour(11), Greeting::Morning);
    assert_eq!(Greeting::for_hour(12), Greeting::Afternoon);
    assert_eq!(Greeting::for_hour(17), Greeting::Afternoon);
    assert_eq!(Greeting::for_hour(18), Greeting::Evening);
    assert_eq!(Greeting::for_hour(23), Greeting::Evening);
}

#[test]
fn greeting_uses_name_or_placeholder() {
    let user = UserRecord { name: Some("Priya".into()), ..UserRecord::default() };
    assert_eq!(greeting(9, Some(&user)), "Good Morning, Priya!");
    assert_eq!(greeting(20, None), "Good Evening, Admin!");
    assert_eq!(greeting(13, Some(&UserRecord::default())), "Good Afternoon, Admin!");
}
