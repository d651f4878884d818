//! rentdesk: session lifecycle and backend client for the rental billing console.
//!
//! ARCHITECTURE
//! ============
//! `session::SessionManager` owns the bearer credential, its decoded expiry,
//! and the display identity. `route` turns a session snapshot into render or
//! redirect decisions. `net` talks to the billing backend, and `views` holds
//! the non-visual logic of the customer, bill, and report screens. `login`
//! checks the login form and captcha before the auth exchange, and `config`
//! reads the console's environment.

pub mod config;
pub mod login;
pub mod net;
pub mod route;
pub mod session;
pub mod views;
