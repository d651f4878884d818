//! Login form: field checks and the text captcha, ahead of the auth exchange.

use rand::Rng;
use tracing::info;

use crate::session::{LoginError, SessionManager};

/// Captcha characters. Excludes `I`, `O`, `0` and `1`, which read alike.
pub const CAPTCHA_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const CAPTCHA_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captcha {
    code: String,
}

impl Captcha {
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let code = (0..CAPTCHA_LEN)
            .map(|_| {
                let idx = rng.random_range(0..CAPTCHA_ALPHABET.len());
                CAPTCHA_ALPHABET[idx] as char
            })
            .collect();
        Self { code }
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Compare an operator answer, ignoring surrounding whitespace and case.
    #[must_use]
    pub fn matches(&self, answer: &str) -> bool {
        answer.trim().to_ascii_uppercase() == self.code
    }

    pub fn regenerate(&mut self) {
        *self = Self::generate();
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub captcha_answer: String,
}

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("Email is required")]
    MissingEmail,
    #[error("Password is required")]
    MissingPassword,
    #[error("Captcha does not match. Please try again.")]
    CaptchaMismatch,
    #[error(transparent)]
    Login(#[from] LoginError),
}

/// Validate `form` and run the login exchange.
///
/// The captcha is regenerated after any failed attempt, so every retry faces
/// a new challenge.
///
/// # Errors
///
/// Returns a [`FormError`] for an incomplete form, a wrong captcha answer,
/// or a failed login exchange.
pub async fn submit(session: &SessionManager, form: &LoginForm, captcha: &mut Captcha) -> Result<(), FormError> {
    let email = form.email.trim();
    if email.is_empty() {
        return Err(FormError::MissingEmail);
    }
    if form.password.is_empty() {
        return Err(FormError::MissingPassword);
    }
    if !captcha.matches(&form.captcha_answer) {
        captcha.regenerate();
        return Err(FormError::CaptchaMismatch);
    }

    match session.authenticate(email, &form.password).await {
        Ok(()) => {
            info!(email, "login: signed in");
            Ok(())
        }
        Err(e) => {
            info!(email, error = %e, "login: rejected");
            captcha.regenerate();
            Err(e.into())
        }
    }
}

#[cfg(test)]
#[path = "login_test.rs"]
mod tests;
