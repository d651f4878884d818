//! Customer list ordering and the create/update form checks.

use crate::net::{Customer, CustomerUpdate, NewCustomer};

/// Order customers by name, ignoring case. Ties keep backend order.
pub fn sort_by_name(customers: &mut [Customer]) {
    customers.sort_by_cached_key(|c| c.name.to_lowercase());
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CustomerFormError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("nothing to update")]
    EmptyUpdate,
}

/// Trim every field and require all four, as the create form does.
///
/// # Errors
///
/// Returns [`CustomerFormError::Missing`] naming the first blank field.
pub fn validate_new(customer: NewCustomer) -> Result<NewCustomer, CustomerFormError> {
    let trimmed = NewCustomer {
        name: customer.name.trim().to_owned(),
        email: customer.email.trim().to_owned(),
        phone: customer.phone.trim().to_owned(),
        address: customer.address.trim().to_owned(),
    };
    for (field, value) in [
        ("name", &trimmed.name),
        ("email", &trimmed.email),
        ("phone", &trimmed.phone),
        ("address", &trimmed.address),
    ] {
        if value.is_empty() {
            return Err(CustomerFormError::Missing(field));
        }
    }
    Ok(trimmed)
}

/// Drop blank fields from an update; an update with nothing left is refused.
///
/// # Errors
///
/// Returns [`CustomerFormError::EmptyUpdate`] when no field carries a value.
pub fn validate_update(update: CustomerUpdate) -> Result<CustomerUpdate, CustomerFormError> {
    let keep = |value: Option<String>| value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
    let cleaned = CustomerUpdate {
        name: keep(update.name),
        email: keep(update.email),
        phone: keep(update.phone),
        address: keep(update.address),
        status: keep(update.status),
    };
    if cleaned.is_empty() {
        return Err(CustomerFormError::EmptyUpdate);
    }
    Ok(cleaned)
}

#[cfg(test)]
#[path = "customers_test.rs"]
mod tests;
