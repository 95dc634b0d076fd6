// src/common/i18n.rs

use std::collections::HashMap;
use std::sync::LazyLock;

pub const DEFAULT_LOCALE: &str = "pt";

// Catálogos embutidos no binário
const CATALOGS: [(&str, &str); 2] = [
    ("pt", include_str!("../../locales/pt.json")),
    ("en", include_str!("../../locales/en.json")),
];

static GLOBAL: LazyLock<I18nStore> = LazyLock::new(|| I18nStore::new(DEFAULT_LOCALE));

/// Mensagens de erro por idioma. Chaves ausentes caem no idioma padrão e depois na própria chave.
#[derive(Debug, Clone)]
pub struct I18nStore {
    default_locale: String,
    messages: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn new(default_locale: &str) -> Self {
        let mut messages = HashMap::new();
        for (lang, raw) in CATALOGS {
            match serde_json::from_str::<HashMap<String, String>>(raw) {
                Ok(catalog) => {
                    messages.insert(lang.to_string(), catalog);
                }
                Err(e) => tracing::error!("Catálogo de idioma '{}' inválido: {}", lang, e),
            }
        }

        let default_locale = if messages.contains_key(default_locale) {
            default_locale.to_string()
        } else {
            DEFAULT_LOCALE.to_string()
        };

        Self {
            default_locale,
            messages,
        }
    }

    pub fn global() -> &'static I18nStore {
        &GLOBAL
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    pub fn supported_locales(&self) -> Vec<&str> {
        CATALOGS
            .iter()
            .map(|(lang, _)| *lang)
            .filter(|lang| self.messages.contains_key(*lang))
            .collect()
    }

    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.messages
            .get(lang)
            .and_then(|catalog| catalog.get(key))
            .or_else(|| {
                self.messages
                    .get(&self.default_locale)
                    .and_then(|catalog| catalog.get(key))
            })
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}
