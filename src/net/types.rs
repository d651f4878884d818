//! Wire DTOs for the billing backend.
//!
//! DESIGN
//! ======
//! The backend wraps every payload in `{ "data": ... }` and uses camelCase
//! keys. Identifiers arrive as strings or numbers depending on the endpoint,
//! so they are normalized to `String` on the way in.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

pub const PLACEHOLDER_NAME: &str = "Admin";
pub const PLACEHOLDER_EMAIL: &str = "admin@example.com";
pub const PLACEHOLDER_AVATAR: &str = "https://ui-avatars.com/api/?name=Admin";

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by backend calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The backend rejected the bearer token or the login attempt.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Any other non-success status.
    #[error("{message} (status {status})")]
    Status { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The envelope carried no `data`.
    #[error("response carried no data")]
    MissingData,

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl ApiError {
    /// Message suitable for showing to the operator.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::Unauthorized { message } | Self::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

// =============================================================================
// ENVELOPE
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub(crate) data: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub(crate) message: Option<String>,
}

// =============================================================================
// USER
// =============================================================================

/// Display metadata for the signed-in operator. Never used for access control.
///
/// Deserialization is lenient: each field takes the first non-empty string
/// among its accepted keys, and values of any other type are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    #[serde(rename = "fullname", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "avatar", skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

const NAME_KEYS: [&str; 2] = ["fullname", "name"];
const EMAIL_KEYS: [&str; 1] = ["email"];
const AVATAR_KEYS: [&str; 2] = ["avatar", "avatarUrl"];

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.trim().is_empty())
}

impl UserRecord {
    /// Read a user object. `None` when `value` is not a JSON object.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        let pick = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| object.get(*key)?.as_str())
                .find(|s| !s.trim().is_empty())
                .map(str::to_owned)
        };
        Some(Self { name: pick(&NAME_KEYS), email: pick(&EMAIL_KEYS), avatar_url: pick(&AVATAR_KEYS) })
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        non_empty(self.name.as_ref()).unwrap_or(PLACEHOLDER_NAME)
    }

    #[must_use]
    pub fn display_email(&self) -> &str {
        non_empty(self.email.as_ref()).unwrap_or(PLACEHOLDER_EMAIL)
    }

    #[must_use]
    pub fn display_avatar(&self) -> &str {
        non_empty(self.avatar_url.as_ref()).unwrap_or(PLACEHOLDER_AVATAR)
    }
}

impl<'de> Deserialize<'de> for UserRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_json(&value).ok_or_else(|| D::Error::custom("expected a user object"))
    }
}

/// Result of `POST /users/login`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    /// A user field of the wrong shape reads as absent.
    #[serde(default, deserialize_with = "deserialize_lenient_user")]
    pub user: Option<UserRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshResponse {
    #[serde(default)]
    pub(crate) access_token: Option<String>,
}

// =============================================================================
// CUSTOMERS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub customer_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body of `POST /customers/create`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// Body of `PUT /customers/update/{id}`. Absent fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CustomerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl CustomerUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

// =============================================================================
// BILLS & PAYMENTS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    #[serde(deserialize_with = "deserialize_id")]
    pub bill_id: String,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub month: String,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub amount: f64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub generated_date: Option<String>,
}

impl Bill {
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.status.eq_ignore_ascii_case("paid")
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status.eq_ignore_ascii_case("pending")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub bill_id: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentMode {
    Cash,
    Upi,
    Card,
}

impl PaymentMode {
    pub const ALL: [Self; 3] = [Self::Cash, Self::Upi, Self::Card];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Upi => "UPI",
            Self::Card => "Card",
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown payment mode '{s}' (expected Cash, UPI or Card)"))
    }
}

impl Serialize for PaymentMode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatePayment<'a> {
    pub(crate) bill_id: &'a str,
    pub(crate) mode: PaymentMode,
}

// =============================================================================
// ID HELPERS
// =============================================================================

fn id_from_value<E: serde::de::Error>(value: serde_json::Value) -> Result<Option<String>, E> {
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s)),
        serde_json::Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(E::custom(format!("expected string or number id, got {other}"))),
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    id_from_value::<D::Error>(value)?.ok_or_else(|| D::Error::custom("id must not be null"))
}

fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    id_from_value::<D::Error>(value)
}

fn deserialize_lenient_user<'de, D>(deserializer: D) -> Result<Option<UserRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(UserRecord::from_json(&value))
}

/// Amounts arrive as numbers, numeric strings, or `null`. Anything
/// unreadable counts as zero.
fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or_default(),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0.0,
    })
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
