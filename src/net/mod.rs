//! Backend access: wire types and the HTTP client.

pub mod api;
pub mod types;

pub use api::{AuthBackend, BackendClient, HttpTimeouts};
pub use types::{ApiError, Bill, Customer, CustomerUpdate, LoginResponse, NewCustomer, Payment, PaymentMode, UserRecord};
