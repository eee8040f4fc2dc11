use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Display;

use crate::storage::SettingsBackend;

/// Storage key holding the cached list of supported languages.
pub const AVAILABLE_LANGUAGES_KEY: &str = "availableLanguages";

/// Storage key holding the user's chosen target language code.
pub const SELECTED_LANGUAGE_KEY: &str = "selectedLanguage";

/// One supported target language. Unique by `code` within a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageEntry {
    pub code: String,
    pub name: String,
}

impl LanguageEntry {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Process-wide language preference state: an in-memory two-slot cache
/// layered over a persistent key-value backend.
///
/// Reads go cache → backend → (optional fetch or default). Writes go
/// through the cache first and then the backend, so a reader running
/// between the two observes the new value. Persistence failures are
/// logged and treated as "no stored value"; they never propagate.
///
/// Note the store does not validate the selected code against the
/// available list. That self-healing check belongs to the panel that
/// renders the picker, at panel-open time.
pub struct LanguagePreferences {
    backend: Box<dyn SettingsBackend>,
    default_language: String,
    cached_languages: Option<Vec<LanguageEntry>>,
    cached_selected: Option<String>,
}

impl LanguagePreferences {
    /// Creates the store over a backend. `default_language` is the code
    /// the selected-language slot falls back to; nothing else in the
    /// crate hard-codes a language.
    pub fn new(backend: impl SettingsBackend + 'static, default_language: impl Into<String>) -> Self {
        Self {
            backend: Box::new(backend),
            default_language: default_language.into(),
            cached_languages: None,
            cached_selected: None,
        }
    }

    /// The configured fallback language code.
    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Returns the available-language list from cache or the backend,
    /// or an empty list when neither has one.
    pub fn available_languages(&mut self) -> Vec<LanguageEntry> {
        if let Some(languages) = &self.cached_languages {
            return languages.clone();
        }
        if let Some(languages) = self.read_persisted_languages() {
            self.cached_languages = Some(languages.clone());
            return languages;
        }
        Vec::new()
    }

    /// Like [`available_languages`](Self::available_languages), but falls
    /// through to `fetcher` when neither cache nor backend has a list. A
    /// fetched list is cached and persisted before being returned; a
    /// fetch failure is logged and yields an empty list so the caller can
    /// still render a best-effort state.
    pub fn available_languages_with<F, E>(&mut self, fetcher: F) -> Vec<LanguageEntry>
    where
        F: FnOnce() -> Result<Vec<LanguageEntry>, E>,
        E: Display,
    {
        if let Some(languages) = &self.cached_languages {
            return languages.clone();
        }
        if let Some(languages) = self.read_persisted_languages() {
            self.cached_languages = Some(languages.clone());
            return languages;
        }

        match fetcher() {
            Ok(languages) => {
                self.cached_languages = Some(languages.clone());
                self.persist_languages(&languages);
                languages
            }
            Err(error) => {
                log::error!("failed to fetch available languages: {error}");
                Vec::new()
            }
        }
    }

    /// Returns the selected language code, initializing it to the default
    /// (and persisting that) on first ever use.
    pub fn selected_language(&mut self) -> String {
        if let Some(code) = &self.cached_selected {
            return code.clone();
        }

        match self.backend.read(SELECTED_LANGUAGE_KEY) {
            Ok(Some(Value::String(code))) if !code.is_empty() => {
                self.cached_selected = Some(code.clone());
                code
            }
            Ok(Some(other)) => {
                log::warn!("ignoring malformed selected language {other}");
                self.initialize_default()
            }
            Ok(None) => self.initialize_default(),
            Err(error) => {
                log::warn!("failed to read selected language: {error}");
                self.initialize_default()
            }
        }
    }

    /// Records a new selected language: cache first, backend second, so
    /// concurrent readers during the pending write already see the new
    /// value. A failed backend write is logged; the cache keeps the value.
    pub fn set_selected_language(&mut self, code: impl Into<String>) {
        let code = code.into();
        self.cached_selected = Some(code.clone());
        if let Err(error) = self.backend.write(SELECTED_LANGUAGE_KEY, Value::String(code)) {
            log::warn!("failed to persist selected language: {error}");
        }
    }

    /// Drops both cached slots without touching the backend.
    pub fn clear_cache(&mut self) {
        self.cached_languages = None;
        self.cached_selected = None;
    }

    fn initialize_default(&mut self) -> String {
        let code = self.default_language.clone();
        self.set_selected_language(code.clone());
        code
    }

    fn read_persisted_languages(&mut self) -> Option<Vec<LanguageEntry>> {
        let value = match self.backend.read(AVAILABLE_LANGUAGES_KEY) {
            Ok(Some(value)) => value,
            Ok(None) => return None,
            Err(error) => {
                log::warn!("failed to read stored languages: {error}");
                return None;
            }
        };
        match serde_json::from_value::<Vec<LanguageEntry>>(value) {
            Ok(languages) => Some(languages),
            Err(error) => {
                log::warn!("stored language list is malformed, ignoring it: {error}");
                None
            }
        }
    }

    fn persist_languages(&mut self, languages: &[LanguageEntry]) {
        let value = match serde_json::to_value(languages) {
            Ok(value) => value,
            Err(error) => {
                log::warn!("failed to serialize language list: {error}");
                return;
            }
        };
        if let Err(error) = self.backend.write(AVAILABLE_LANGUAGES_KEY, value) {
            log::warn!("failed to persist language list: {error}");
        }
    }
}
