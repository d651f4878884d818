use std::sync::Arc;

use super::*;
use crate::net::{ApiError, LoginResponse, UserRecord};
use crate::session::test_helpers::{MockBackend, T0, TokioClock, token_expiring_at};
use crate::session::{DEFAULT_WATCHDOG_LEAD, MemoryStore};

fn session_with(backend: Arc<MockBackend>) -> SessionManager {
    SessionManager::with_options(
        Arc::new(MemoryStore::new()),
        backend,
        Arc::new(TokioClock::starting_at_t0()),
        DEFAULT_WATCHDOG_LEAD,
    )
}

fn form(answer: &str) -> LoginForm {
    LoginForm { email: "ops@example.com".into(), password: "hunter2".into(), captcha_answer: answer.into() }
}

// =============================================================================
// Captcha
// =============================================================================

#[test]
fn captcha_uses_alphabet_and_length() {
    for _ in 0..50 {
        let captcha = Captcha::generate();
        assert_eq!(captcha.code().len(), CAPTCHA_LEN);
        assert!(captcha.code().bytes().all(|b| CAPTCHA_ALPHABET.contains(&b)));
    }
}

#[test]
fn captcha_never_contains_ambiguous_characters() {
    for b in b"IO01" {
        assert!(!CAPTCHA_ALPHABET.contains(b));
    }
}

#[test]
fn captcha_answer_is_trimmed_and_uppercased() {
    let captcha = Captcha { code: "AB23CD".into() };
    assert!(captcha.matches("AB23CD"));
    assert!(captcha.matches("  ab23cd\n"));
    assert!(!captcha.matches("AB23C"));
    assert!(!captcha.matches("AB 23CD"));
}

// =============================================================================
// submit
// =============================================================================

#[tokio::test(start_paused = true)]
async fn submit_with_wrong_captcha_skips_backend_and_regenerates() {
    let backend = Arc::new(MockBackend::default());
    let session = session_with(backend.clone());
    let mut captcha = Captcha { code: "AB23CD".into() };

    let err = submit(&session, &form("ZZZZZZ"), &mut captcha).await.unwrap_err();

    assert!(matches!(err, FormError::CaptchaMismatch));
    assert_eq!(err.to_string(), "Captcha does not match. Please try again.");
    assert!(!session.is_authenticated());
    assert!(backend.logins.lock().unwrap().is_empty());
    assert_eq!(captcha.code().len(), CAPTCHA_LEN);
}

#[tokio::test(start_paused = true)]
async fn submit_requires_email_and_password() {
    let session = session_with(Arc::new(MockBackend::default()));
    let mut captcha = Captcha { code: "AB23CD".into() };

    let mut missing_email = form("AB23CD");
    missing_email.email = "   ".into();
    assert!(matches!(submit(&session, &missing_email, &mut captcha).await, Err(FormError::MissingEmail)));

    let mut missing_password = form("AB23CD");
    missing_password.password.clear();
    assert!(matches!(submit(&session, &missing_password, &mut captcha).await, Err(FormError::MissingPassword)));
}

#[tokio::test(start_paused = true)]
async fn submit_success_authenticates() {
    let backend = Arc::new(MockBackend::default());
    backend.queue_login(Ok(LoginResponse {
        access_token: token_expiring_at(T0 + 3600),
        user: Some(UserRecord { name: Some("Ops".into()), ..UserRecord::default() }),
    }));
    let session = session_with(backend);
    let mut captcha = Captcha { code: "AB23CD".into() };

    submit(&session, &form("ab23cd"), &mut captcha).await.unwrap();

    assert!(session.is_authenticated());
    assert_eq!(session.identity().unwrap().display_name(), "Ops");
    assert_eq!(captcha.code(), "AB23CD");
}

#[tokio::test(start_paused = true)]
async fn submit_rejection_surfaces_backend_message() {
    let backend = Arc::new(MockBackend::default());
    backend.queue_login(Err(ApiError::Unauthorized { message: "Invalid credentials".into() }));
    let session = session_with(backend);
    let mut captcha = Captcha { code: "AB23CD".into() };

    let err = submit(&session, &form("AB23CD"), &mut captcha).await.unwrap_err();

    assert_eq!(err.to_string(), "Invalid credentials");
    assert!(!session.is_authenticated());
}
