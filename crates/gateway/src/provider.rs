//! Upstream translation services.
//!
//! Providers sit at the network boundary and absorb its failures: both
//! operations return an empty sequence when anything upstream goes wrong
//! (the error is logged here), and never propagate an error to the
//! service loop.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::protocol::TranslatedSegment;
use quicklingo_settings::LanguageEntry;

/// An opaque, unreliable translation backend.
pub trait TranslationProvider: Send {
    /// Translated segments for `text` in `target_lang`. Empty on any
    /// upstream failure.
    fn translate(&self, text: &str, target_lang: &str) -> Vec<TranslatedSegment>;

    /// Supported target languages. Empty on any upstream failure.
    fn list_languages(&self) -> Vec<LanguageEntry>;
}

const DEFAULT_ENDPOINT: &str = "https://api.cognitive.microsofttranslator.com";
const API_VERSION: &str = "3.0";

/// Microsoft Translator Text API v3 client.
pub struct HttpTranslationProvider {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
    region: String,
}

impl HttpTranslationProvider {
    pub fn new(api_key: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            region: region.into(),
        }
    }

    /// Points the provider at a different endpoint, e.g. a sovereign
    /// cloud instance or a local stub.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn fetch_translation(
        &self,
        text: &str,
        target_lang: &str,
    ) -> Result<Vec<TranslatedSegment>, reqwest::Error> {
        #[derive(Serialize)]
        struct Body<'a> {
            #[serde(rename = "Text")]
            text: &'a str,
        }
        #[derive(Deserialize)]
        struct Item {
            translations: Vec<Translation>,
        }
        #[derive(Deserialize)]
        struct Translation {
            to: String,
            text: String,
        }

        let items: Vec<Item> = self
            .client
            .post(format!("{}/translate", self.endpoint))
            .query(&[("api-version", API_VERSION), ("to", target_lang)])
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .header("Ocp-Apim-Subscription-Region", &self.region)
            .json(&[Body { text }])
            .send()?
            .error_for_status()?
            .json()?;

        Ok(items
            .into_iter()
            .next()
            .map(|item| {
                item.translations
                    .into_iter()
                    .map(|translation| TranslatedSegment::new(translation.to, translation.text))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn fetch_languages(&self) -> Result<Vec<LanguageEntry>, reqwest::Error> {
        #[derive(Deserialize)]
        struct Languages {
            translation: BTreeMap<String, Description>,
        }
        #[derive(Deserialize)]
        struct Description {
            name: String,
        }

        let languages: Languages = self
            .client
            .get(format!("{}/languages", self.endpoint))
            .query(&[("api-version", API_VERSION), ("scope", "translation")])
            .send()?
            .error_for_status()?
            .json()?;

        Ok(languages
            .translation
            .into_iter()
            .map(|(code, description)| LanguageEntry::new(code, description.name))
            .collect())
    }
}

impl TranslationProvider for HttpTranslationProvider {
    fn translate(&self, text: &str, target_lang: &str) -> Vec<TranslatedSegment> {
        match self.fetch_translation(text, target_lang) {
            Ok(segments) => segments,
            Err(error) => {
                log::error!("translation request failed: {error}");
                Vec::new()
            }
        }
    }

    fn list_languages(&self) -> Vec<LanguageEntry> {
        match self.fetch_languages() {
            Ok(languages) => languages,
            Err(error) => {
                log::error!("language list request failed: {error}");
                Vec::new()
            }
        }
    }
}

/// Deterministic offline provider used by the preview app and tests:
/// translations are the original text tagged with the target language.
pub struct StaticTranslationProvider {
    languages: Vec<LanguageEntry>,
}

impl StaticTranslationProvider {
    pub fn new(languages: Vec<LanguageEntry>) -> Self {
        Self { languages }
    }
}

impl Default for StaticTranslationProvider {
    fn default() -> Self {
        Self::new(vec![
            LanguageEntry::new("en", "English"),
            LanguageEntry::new("fr", "French"),
            LanguageEntry::new("de", "German"),
            LanguageEntry::new("es", "Spanish"),
            LanguageEntry::new("ja", "Japanese"),
            LanguageEntry::new("zh-Hant", "Chinese (Traditional)"),
        ])
    }
}

impl TranslationProvider for StaticTranslationProvider {
    fn translate(&self, text: &str, target_lang: &str) -> Vec<TranslatedSegment> {
        vec![TranslatedSegment::new(
            target_lang,
            format!("[{target_lang}] {text}"),
        )]
    }

    fn list_languages(&self) -> Vec<LanguageEntry> {
        self.languages.clone()
    }
}
