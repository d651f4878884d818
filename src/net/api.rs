//! REST client for the billing backend.
//!
//! Thin `reqwest` wrapper: one method per endpoint, bearer auth on every data
//! call, and pure helpers (`endpoint`, `classify_failure`, `parse_data`) that
//! carry the logic worth testing.
//!
//! ERROR HANDLING
//! ==============
//! A `401` on a data call becomes `ApiError::Unauthorized`, which callers treat
//! as "the backend no longer accepts this session" and answer with a logout.

use std::time::Duration;

use serde::de::DeserializeOwned;

use super::types::{
    ApiError, Bill, CreatePayment, Customer, CustomerUpdate, Envelope, ErrorBody, LoginResponse, NewCustomer,
    Payment, PaymentMode, RefreshResponse,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

// =============================================================================
// AUTH BACKEND TRAIT
// =============================================================================

/// The two auth exchanges the session manager needs. Enables mocking in tests.
#[async_trait::async_trait]
pub trait AuthBackend: Send + Sync {
    /// Exchange email + password for a token and the user record.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the backend rejects the credentials or
    /// cannot be reached.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError>;

    /// Ask for a fresh token. `Ok(None)` means the backend answered without one.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or a non-success status.
    async fn refresh(&self, token: &str) -> Result<Option<String>, ApiError>;
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request: Duration,
    pub connect: Duration,
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeouts: HttpTimeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeouts.request)
            .connect_timeout(timeouts.connect)
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        endpoint(&self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        if response.status().is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(status, &body))
    }

    async fn fetch<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<Option<T>, ApiError> {
        let response = self.send(request).await?;
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        parse_data(&body)
    }

    // -------------------------------------------------------------------------
    // users
    // -------------------------------------------------------------------------

    /// `POST /users/login`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on rejection, transport failure, or a response
    /// without a token.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let request = self
            .http
            .post(self.url("/users/login"))
            .json(&serde_json::json!({ "email": email, "password": password }));
        let result = self.fetch::<LoginResponse>(request).await;
        match result {
            Ok(Some(login)) => Ok(login),
            Ok(None) => Err(ApiError::MissingData),
            // A login 401 is a rejected password, not an expired session.
            Err(ApiError::Status { status, message }) if status == 400 || status == 403 => {
                Err(ApiError::Unauthorized { message })
            }
            Err(e) => Err(e),
        }
    }

    /// `POST /users/refresh-token`. The token travels both in the JSON body and
    /// the `Authorization` header.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success status.
    pub async fn refresh_token(&self, token: &str) -> Result<Option<String>, ApiError> {
        let request = self
            .http
            .post(self.url("/users/refresh-token"))
            .header(reqwest::header::AUTHORIZATION, token)
            .json(&serde_json::json!({ "Authorization": token }));
        let data = self.fetch::<RefreshResponse>(request).await?;
        Ok(data.and_then(|r| r.access_token).filter(|t| !t.is_empty()))
    }

    // -------------------------------------------------------------------------
    // customers
    // -------------------------------------------------------------------------

    /// `GET /customers/list`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, status, or parse failure.
    pub async fn list_customers(&self, token: &str) -> Result<Vec<Customer>, ApiError> {
        let request = self.http.get(self.url("/customers/list")).bearer_auth(token);
        Ok(self.fetch(request).await?.unwrap_or_default())
    }

    /// `GET /customers/get/{id}`. `Ok(None)` when the backend has no record.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, status, or parse failure.
    pub async fn get_customer(&self, token: &str, customer_id: &str) -> Result<Option<Customer>, ApiError> {
        let request = self
            .http
            .get(self.url(&format!("/customers/get/{customer_id}")))
            .bearer_auth(token);
        self.fetch(request).await
    }

    /// `POST /customers/create`. Returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, status, or parse failure, or when the
    /// backend does not echo the created customer.
    pub async fn create_customer(&self, token: &str, customer: &NewCustomer) -> Result<Customer, ApiError> {
        let request = self
            .http
            .post(self.url("/customers/create"))
            .bearer_auth(token)
            .json(customer);
        self.fetch(request).await?.ok_or(ApiError::MissingData)
    }

    /// `PUT /customers/update/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, status, or parse failure.
    pub async fn update_customer(
        &self,
        token: &str,
        customer_id: &str,
        update: &CustomerUpdate,
    ) -> Result<Option<Customer>, ApiError> {
        let request = self
            .http
            .put(self.url(&format!("/customers/update/{customer_id}")))
            .bearer_auth(token)
            .json(update);
        self.fetch(request).await
    }

    // -------------------------------------------------------------------------
    // bills & payments
    // -------------------------------------------------------------------------

    /// `GET /bills/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, status, or parse failure.
    pub async fn list_bills(&self, token: &str) -> Result<Vec<Bill>, ApiError> {
        let request = self.http.get(self.url("/bills/")).bearer_auth(token);
        Ok(self.fetch(request).await?.unwrap_or_default())
    }

    /// `PUT /bills/{id}` with a new amount.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport or status failure.
    pub async fn update_bill_amount(&self, token: &str, bill_id: &str, amount: f64) -> Result<(), ApiError> {
        let request = self
            .http
            .put(self.url(&format!("/bills/{bill_id}")))
            .bearer_auth(token)
            .json(&serde_json::json!({ "amount": amount }));
        self.send(request).await.map(|_| ())
    }

    /// `GET /payments/bills/{id}`. `Ok(None)` for unpaid bills.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, status, or parse failure.
    pub async fn bill_payment(&self, token: &str, bill_id: &str) -> Result<Option<Payment>, ApiError> {
        let request = self
            .http
            .get(self.url(&format!("/payments/bills/{bill_id}")))
            .bearer_auth(token);
        self.fetch(request).await
    }

    /// `POST /payments/create`: mark a bill paid with `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport or status failure.
    pub async fn create_payment(&self, token: &str, bill_id: &str, mode: PaymentMode) -> Result<(), ApiError> {
        let request = self
            .http
            .post(self.url("/payments/create"))
            .bearer_auth(token)
            .json(&CreatePayment { bill_id, mode });
        self.send(request).await.map(|_| ())
    }

    /// `POST /payments/bills/{id}/send-request`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport or status failure.
    pub async fn send_payment_request(&self, token: &str, bill_id: &str) -> Result<(), ApiError> {
        let request = self
            .http
            .post(self.url(&format!("/payments/bills/{bill_id}/send-request")))
            .bearer_auth(token);
        self.send(request).await.map(|_| ())
    }

    /// `GET /bills/{id}/invoice`: raw invoice document bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport or status failure.
    pub async fn download_invoice(&self, token: &str, bill_id: &str) -> Result<Vec<u8>, ApiError> {
        let request = self
            .http
            .get(self.url(&format!("/bills/{bill_id}/invoice")))
            .bearer_auth(token);
        let response = self.send(request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait::async_trait]
impl AuthBackend for BackendClient {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        BackendClient::login(self, email, password).await
    }

    async fn refresh(&self, token: &str) -> Result<Option<String>, ApiError> {
        self.refresh_token(token).await
    }
}

// =============================================================================
// PURE HELPERS
// =============================================================================

/// Join `base` and `path` with exactly one slash between them.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Map a non-success response to an [`ApiError`], preferring the backend's
/// `message` field.
pub(crate) fn classify_failure(status: u16, body: &str) -> ApiError {
    let backend_message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty());
    if status == 401 {
        let message = backend_message.unwrap_or_else(|| INVALID_CREDENTIALS.to_owned());
        return ApiError::Unauthorized { message };
    }
    let message = backend_message.unwrap_or_else(|| format!("request failed: {status}"));
    ApiError::Status { status, message }
}

/// Unwrap the `{ "data": ... }` envelope.
pub(crate) fn parse_data<T: DeserializeOwned>(body: &str) -> Result<Option<T>, ApiError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let envelope: Envelope<T> = serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))?;
    Ok(envelope.data)
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
