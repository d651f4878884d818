//! Monthly revenue and customer-growth report.
//!
//! Records are bucketed by the short month name ("Jan", "Feb", ...) of a
//! `YYYY-MM...` date string. Years are not distinguished. Buckets appear in
//! the order their month is first seen; records without a readable date are
//! left out of the buckets.

use time::Month;

use crate::net::{Bill, Customer};

#[derive(Clone, Debug, PartialEq)]
pub struct MonthlyRevenue {
    pub month: &'static str,
    pub revenue: f64,
    /// Always zero; the backend records no expenses.
    pub expenses: f64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthlyCount {
    pub month: &'static str,
    pub customers: usize,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Report {
    pub revenue_by_month: Vec<MonthlyRevenue>,
    pub customer_growth: Vec<MonthlyCount>,
    /// Paid revenue across the dated bills.
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub active_customers: usize,
}

impl Report {
    #[must_use]
    pub fn compute(customers: &[Customer], bills: &[Bill]) -> Self {
        let mut customer_growth: Vec<MonthlyCount> = Vec::new();
        for month in customers.iter().filter_map(|c| c.created_at.as_deref().and_then(short_month)) {
            match customer_growth.iter_mut().find(|bucket| bucket.month == month) {
                Some(bucket) => bucket.customers += 1,
                None => customer_growth.push(MonthlyCount { month, customers: 1 }),
            }
        }

        let mut revenue_by_month: Vec<MonthlyRevenue> = Vec::new();
        let mut total_revenue = 0.0;
        for bill in bills.iter().filter(|b| b.is_paid()) {
            let Some(month) = bill.generated_date.as_deref().and_then(short_month) else {
                continue;
            };
            total_revenue += bill.amount;
            match revenue_by_month.iter_mut().find(|bucket| bucket.month == month) {
                Some(bucket) => bucket.revenue += bill.amount,
                None => revenue_by_month.push(MonthlyRevenue { month, revenue: bill.amount, expenses: 0.0 }),
            }
        }

        Self {
            revenue_by_month,
            customer_growth,
            total_revenue,
            total_expenses: 0.0,
            active_customers: customers.len(),
        }
    }
}

/// Short month name of a `YYYY-MM` prefixed date, e.g. `"2024-03-15"` -> `"Mar"`.
#[must_use]
pub fn short_month(date: &str) -> Option<&'static str> {
    let mut parts = date.trim().splitn(3, '-');
    let year = parts.next()?;
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let month_digits: String = parts.next()?.chars().take_while(char::is_ascii_digit).collect();
    let month = Month::try_from(month_digits.parse::<u8>().ok()?).ok()?;
    Some(abbreviation(month))
}

fn abbreviation(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

#[cfg(test)]
#[path = "reports_test.rs"]
mod tests;
