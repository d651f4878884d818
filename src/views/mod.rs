//! Non-visual logic behind the console screens.
//!
//! Each submodule turns backend records into what a screen shows: filtered
//! and paginated bill rows, ordered customers, dashboard counters, and
//! monthly reports. Nothing here talks to the session; callers pass the
//! bearer token in.

pub mod bills;
pub mod customers;
pub mod dashboard;
pub mod reports;

pub use bills::{
    BillDirectory, BillQuery, BillRow, ClientDirectory, Page, enrich_rows, invoice_file_name, load_rows, paginate,
};
pub use customers::{CustomerFormError, sort_by_name, validate_new, validate_update};
pub use dashboard::{DashboardStats, Greeting, greeting};
pub use reports::{MonthlyCount, MonthlyRevenue, Report, short_month};
