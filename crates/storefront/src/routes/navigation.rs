//! In-app navigation.
//!
//! Links that would trigger a client-side route change post here instead. The
//! session pushes the new location and the browser is sent there with
//! `303 See Other`, so the pushed entry and the browser's history agree.
//!
//! Every intent form also carries a hidden `from` field holding the path the
//! page was rendered for. Browsers restore pages from cache on back/forward
//! without asking the server, so that field is how the session learns where
//! the shopper really is before it applies the intent.

use axum::{Form, extract::State, http::HeaderValue, response::Redirect};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::route::{RouteEvent, Section};
use crate::session::Intent;
use crate::state::{AppState, HostSession};

/// Navigation form data.
#[derive(Debug, Deserialize)]
pub struct NavigateForm {
    /// Target path, optionally with a `#section` fragment.
    pub to: String,
    /// Section to jump to after navigating.
    #[serde(default)]
    pub section: Option<String>,
    /// Path of the page the form was submitted from.
    #[serde(default)]
    pub from: Option<String>,
}

/// Form data of intents that carry nothing but their origin.
#[derive(Debug, Default, Deserialize)]
pub struct OriginForm {
    #[serde(default)]
    pub from: Option<String>,
}

/// A validated navigation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub path: String,
    pub section: Option<Section>,
}

impl Target {
    /// Validate `to` as a same-origin path.
    ///
    /// A query string is dropped. A fragment in `to` is used when no explicit
    /// `section` is given; fragments that name no home section are ignored.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` unless `to` is an absolute local path
    /// that can be sent back as a `Location` header.
    pub fn parse(to: &str, section: Option<&str>) -> Result<Self> {
        let to = to.trim();
        if !is_local_path(to) {
            return Err(AppError::BadRequest(
                "navigation target must be a local path".to_string(),
            ));
        }

        let (rest, fragment) = match to.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (to, None),
        };
        let path = rest.split_once('?').map_or(rest, |(path, _)| path);

        let section = section
            .filter(|s| !s.is_empty())
            .or(fragment)
            .and_then(Section::from_anchor);

        let target = Self {
            path: path.to_string(),
            section,
        };
        if HeaderValue::from_str(&target.location()).is_err() {
            return Err(AppError::BadRequest(
                "navigation target is not a valid location".to_string(),
            ));
        }
        Ok(target)
    }

    /// Where to send the browser.
    #[must_use]
    pub fn location(&self) -> String {
        match self.section {
            Some(section) => format!("{}#{}", self.path, section.anchor()),
            None => self.path.clone(),
        }
    }
}

/// Same-origin absolute path without control characters.
fn is_local_path(raw: &str) -> bool {
    raw.starts_with('/')
        && !raw.starts_with("//")
        && !raw.contains('\\')
        && !raw.chars().any(char::is_control)
}

/// Report the page an intent form was submitted from.
///
/// Origins that are not usable local paths are ignored.
pub fn observe_origin(session: &mut HostSession, from: Option<&str>) {
    let Some(from) = from else {
        return;
    };
    match Target::parse(from, None) {
        Ok(origin) => {
            if session.observe_location(&origin.path) {
                tracing::debug!(
                    path = %origin.path,
                    "form submitted from a page restored by history"
                );
            }
        }
        Err(_) => tracing::debug!(from, "ignoring unusable form origin"),
    }
}

/// Navigate to a path.
///
/// # Errors
///
/// Returns 400 for targets outside the storefront.
#[instrument(skip(state))]
pub async fn navigate(
    State(state): State<AppState>,
    Form(form): Form<NavigateForm>,
) -> Result<Redirect> {
    let target = Target::parse(&form.to, form.section.as_deref())?;
    add_breadcrumb("navigation", "Navigate", Some(&[("to", target.path.as_str())]));

    let event = {
        let mut session = state.session()?;
        observe_origin(&mut session, form.from.as_deref());
        session.dispatch(Intent::Navigate(target.path.clone()))
    };
    if event == Some(RouteEvent::ScrollToTop) {
        tracing::debug!(path = %target.path, "pushed history entry");
    }

    Ok(Redirect::to(&target.location()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_path() {
        let target = Target::parse("/catalog", None).unwrap();
        assert_eq!(target.path, "/catalog");
        assert_eq!(target.section, None);
        assert_eq!(target.location(), "/catalog");
    }

    #[test]
    fn test_parse_section_field() {
        let target = Target::parse("/", Some("about")).unwrap();
        assert_eq!(target.section, Some(Section::About));
        assert_eq!(target.location(), "/#about");
    }

    #[test]
    fn test_parse_fragment_in_path() {
        let target = Target::parse("/#contact", None).unwrap();
        assert_eq!(target.path, "/");
        assert_eq!(target.location(), "/#contact");

        let explicit = Target::parse("/#contact", Some("about")).unwrap();
        assert_eq!(explicit.section, Some(Section::About));
    }

    #[test]
    fn test_parse_drops_query_and_unknown_fragment() {
        let target = Target::parse("/catalog?page=2#nowhere", None).unwrap();
        assert_eq!(target.path, "/catalog");
        assert_eq!(target.section, None);
    }

    #[test]
    fn test_parse_rejects_foreign_targets() {
        for to in [
            "https://example.com/",
            "//example.com",
            "catalog",
            "",
            "/\\evil",
            "/a\nb",
            "/catalog\r\nSet-Cookie: x=1",
            "/tab\there",
            "/#about\u{7f}",
        ] {
            assert!(
                matches!(Target::parse(to, None), Err(AppError::BadRequest(_))),
                "{to:?} should be rejected"
            );
        }
    }
}
