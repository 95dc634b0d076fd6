// src/middleware/i18n.rs

use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header, request::Parts};

use crate::config::AppState;

// O idioma negociado para as mensagens de erro
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Locale {
    /// Primeiro idioma do cabeçalho que temos catálogo, ou o padrão.
    pub fn negotiate(accept_language: Option<&str>, supported: &[&str], default: &str) -> Self {
        let lang = accept_language
            .and_then(|header_str| {
                accept_language::parse(header_str).into_iter().find_map(|tag| {
                    // "pt-BR" -> "pt"
                    let primary = tag.split('-').next().unwrap_or(&tag).to_lowercase();
                    supported.contains(&primary.as_str()).then_some(primary)
                })
            })
            .unwrap_or_else(|| default.to_string());

        Locale(lang)
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let i18n = &app_state.i18n_store;

        let header_value = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok());

        Ok(Locale::negotiate(
            header_value,
            &i18n.supported_locales(),
            i18n.default_locale(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUPPORTED: [&str; 2] = ["pt", "en"];

    #[test]
    fn picks_primary_subtag() {
        assert_eq!(Locale::negotiate(Some("pt-BR,pt;q=0.9"), &SUPPORTED, "en").0, "pt");
    }

    #[test]
    fn skips_unsupported_languages() {
        assert_eq!(Locale::negotiate(Some("de-DE,en;q=0.5"), &SUPPORTED, "pt").0, "en");
    }

    #[test]
    fn falls_back_to_default() {
        assert_eq!(Locale::negotiate(None, &SUPPORTED, "pt").0, "pt");
        assert_eq!(Locale::negotiate(Some("ja"), &SUPPORTED, "pt").0, "pt");
    }
}
