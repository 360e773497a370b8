//! Contact form route handler.
//!
//! The form is a demo: submissions are validated and acknowledged, never sent
//! anywhere.

use axum::{Form, extract::State, response::Response};
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::routes::navigation::observe_origin;
use crate::routes::pages::render_page;
use crate::state::AppState;

/// Shown after a valid submission.
pub const ACKNOWLEDGEMENT: &str = "Thanks, message received (demo)";

/// Contact form data.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
    /// Path of the page the form was submitted from.
    #[serde(default)]
    pub from: Option<String>,
}

/// Check a submission, returning the notice to show.
#[must_use]
pub fn review(form: &ContactForm) -> &'static str {
    if !is_valid_email(form.email.trim()) {
        "Please enter a valid email address."
    } else if form.name.trim().is_empty() || form.message.trim().is_empty() {
        "Name and message are required."
    } else {
        ACKNOWLEDGEMENT
    }
}

/// Submit the contact form.
///
/// POST /contact
///
/// Re-renders the current page with the outcome as a notice.
///
/// # Errors
///
/// Returns 500 if the session is unavailable.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<ContactForm>,
) -> Result<Response> {
    let notice = review(&form);
    tracing::info!(accepted = notice == ACKNOWLEDGEMENT, "contact form submitted");

    let page = {
        let mut session = state.session()?;
        observe_origin(&mut session, form.from.as_deref());
        session.page()
    };
    Ok(render_page(state.catalog(), &page, Some(notice.to_string())))
}

/// Basic email validation.
fn is_valid_email(email: &str) -> bool {
    let mut parts = email.splitn(2, '@');
    let Some(local) = parts.next() else {
        return false;
    };
    let Some(domain) = parts.next() else {
        return false;
    };
    !local.is_empty() && !domain.is_empty() && domain.contains('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, message: &str) -> ContactForm {
        ContactForm {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
            from: None,
        }
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("info@mosslad.example"));
        assert!(!is_valid_email("info"));
        assert!(!is_valid_email("@mosslad.example"));
        assert!(!is_valid_email("info@localhost"));
    }

    #[test]
    fn test_review() {
        assert_eq!(review(&form("Ana", "ana@example.com", "Hi")), ACKNOWLEDGEMENT);
        assert_eq!(
            review(&form("Ana", "nope", "Hi")),
            "Please enter a valid email address."
        );
        assert_eq!(
            review(&form(" ", "ana@example.com", "Hi")),
            "Name and message are required."
        );
    }
}
