//! Dashboard counters and the navbar greeting.

use std::fmt;

use crate::net::types::PLACEHOLDER_NAME;
use crate::net::{Bill, Customer, UserRecord};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DashboardStats {
    pub customers: usize,
    pub pending_bills: usize,
    /// Sum of paid bill amounts.
    pub revenue: f64,
}

impl DashboardStats {
    #[must_use]
    pub fn compute(customers: &[Customer], bills: &[Bill]) -> Self {
        let pending_bills = bills.iter().filter(|b| b.is_pending()).count();
        let revenue = bills.iter().filter(|b| b.is_paid()).map(|b| b.amount).sum();
        Self { customers: customers.len(), pending_bills, revenue }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Greeting {
    Morning,
    Afternoon,
    Evening,
}

impl Greeting {
    /// `hour` is the local wall-clock hour, 0-23.
    #[must_use]
    pub fn for_hour(hour: u8) -> Self {
        match hour {
            0..12 => Self::Morning,
            12..18 => Self::Afternoon,
            _ => Self::Evening,
        }
    }
}

impl fmt::Display for Greeting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Morning => "Good Morning",
            Self::Afternoon => "Good Afternoon",
            Self::Evening => "Good Evening",
        })
    }
}

/// `"Good Morning, Priya!"`, falling back to the placeholder name.
#[must_use]
pub fn greeting(hour: u8, identity: Option<&UserRecord>) -> String {
    let name = identity.map_or(PLACEHOLDER_NAME, UserRecord::display_name);
    format!("{}, {name}!", Greeting::for_hour(hour))
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
