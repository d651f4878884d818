//! Bill list: row enrichment, filters, and pagination.
//!
//! DESIGN
//! ======
//! The backend returns bare bills. Each row is enriched with its customer
//! and payment mode through two lookups per bill, run concurrently. Lookup
//! failures leave the field empty rather than failing the whole list.

use futures::future::join_all;
use tracing::{debug, warn};

use crate::net::{ApiError, BackendClient, Bill, Customer};

pub const DEFAULT_PER_PAGE: usize = 5;
pub const PER_PAGE_CHOICES: [usize; 4] = [5, 10, 20, 50];
/// Shown in place of a payment mode for unpaid or unresolved bills.
pub const NO_MODE: &str = "-";

// =============================================================================
// ROWS
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct BillRow {
    pub bill: Bill,
    pub customer: Option<Customer>,
    pub mode: Option<String>,
}

impl BillRow {
    #[must_use]
    pub fn customer_name(&self) -> Option<&str> {
        self.customer.as_ref().map(|c| c.name.as_str())
    }

    #[must_use]
    pub fn mode_label(&self) -> &str {
        self.mode.as_deref().filter(|m| !m.is_empty()).unwrap_or(NO_MODE)
    }
}

/// Per-bill lookups used to enrich rows. Enables mocking in tests.
#[async_trait::async_trait]
pub trait BillDirectory: Send + Sync {
    async fn customer(&self, customer_id: &str) -> Result<Option<Customer>, ApiError>;
    async fn payment_mode(&self, bill_id: &str) -> Result<Option<String>, ApiError>;
}

/// [`BillDirectory`] backed by the REST client and one bearer token.
pub struct ClientDirectory<'a> {
    pub client: &'a BackendClient,
    pub token: &'a str,
}

#[async_trait::async_trait]
impl BillDirectory for ClientDirectory<'_> {
    async fn customer(&self, customer_id: &str) -> Result<Option<Customer>, ApiError> {
        self.client.get_customer(self.token, customer_id).await
    }

    async fn payment_mode(&self, bill_id: &str) -> Result<Option<String>, ApiError> {
        let payment = self.client.bill_payment(self.token, bill_id).await?;
        Ok(payment.and_then(|p| p.mode))
    }
}

async fn enrich(directory: &dyn BillDirectory, bill: Bill) -> BillRow {
    let customer_lookup = async {
        let id = bill.customer_id.as_deref()?;
        match directory.customer(id).await {
            Ok(customer) => customer,
            Err(e) => {
                warn!(bill_id = %bill.bill_id, error = %e, "bills: customer lookup failed");
                None
            }
        }
    };
    let mode_lookup = async {
        match directory.payment_mode(&bill.bill_id).await {
            Ok(mode) => mode,
            Err(e) => {
                warn!(bill_id = %bill.bill_id, error = %e, "bills: payment lookup failed");
                None
            }
        }
    };
    let (customer, mode) = futures::join!(customer_lookup, mode_lookup);
    BillRow { bill, customer, mode }
}

/// Enrich `bills` and return them newest first (reverse of backend order).
pub async fn enrich_rows(directory: &dyn BillDirectory, bills: Vec<Bill>) -> Vec<BillRow> {
    let mut rows = join_all(bills.into_iter().map(|bill| enrich(directory, bill))).await;
    rows.reverse();
    debug!(count = rows.len(), "bills: rows enriched");
    rows
}

/// Fetch every bill and enrich it.
///
/// # Errors
///
/// Returns [`ApiError`] when the bill list itself cannot be fetched.
pub async fn load_rows(client: &BackendClient, token: &str) -> Result<Vec<BillRow>, ApiError> {
    let bills = client.list_bills(token).await?;
    let directory = ClientDirectory { client, token };
    Ok(enrich_rows(&directory, bills).await)
}

// =============================================================================
// FILTERS
// =============================================================================

/// Search fields of the bill screen. Empty fields match everything, except
/// that a row without a customer name never matches.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BillQuery {
    pub name: String,
    pub month: String,
    pub status: String,
}

impl BillQuery {
    #[must_use]
    pub fn matches(&self, row: &BillRow) -> bool {
        let Some(customer_name) = row.customer_name() else {
            return false;
        };
        if !customer_name.to_lowercase().contains(&self.name.to_lowercase()) {
            return false;
        }
        if !self.month.is_empty() && !row.bill.month.to_lowercase().contains(&self.month.to_lowercase()) {
            return false;
        }
        self.status.is_empty() || row.bill.status.eq_ignore_ascii_case(&self.status)
    }

    #[must_use]
    pub fn apply<'a>(&self, rows: &'a [BillRow]) -> Vec<&'a BillRow> {
        rows.iter().filter(|row| self.matches(row)).collect()
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based, clamped into `1..=total_pages` (1 for an empty list).
    pub number: usize,
    /// `ceil(len / per_page)`; 0 for an empty list.
    pub total_pages: usize,
}

impl<T> Page<T> {
    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }
}

/// Slice page `page` (1-based) out of `items`.
///
/// A zero `per_page` is treated as [`DEFAULT_PER_PAGE`].
#[must_use]
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = if per_page == 0 { DEFAULT_PER_PAGE } else { per_page };
    let total_pages = items.len().div_ceil(per_page);
    let number = page.clamp(1, total_pages.max(1));
    let start = (number - 1) * per_page;
    let items = items.iter().skip(start).take(per_page).cloned().collect();
    Page { items, number, total_pages }
}

/// File name the downloaded invoice is saved under.
#[must_use]
pub fn invoice_file_name(customer_name: &str, bill_id: &str) -> String {
    format!("Invoice-{customer_name}-{bill_id}.pdf")
}

#[cfg(test)]
#[path = "bills_test.rs"]
mod tests;
