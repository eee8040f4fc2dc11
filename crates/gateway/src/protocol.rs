//! Message kinds exchanged between the two execution contexts.
//!
//! Requests and replies are tagged variants rather than loose maps, so a
//! malformed payload fails in one well-defined place (deserialization or
//! the gateway's outcome mapping) instead of producing field-access
//! surprises downstream. The serde names match the wire protocol.

use serde::{Deserialize, Serialize};

use quicklingo_settings::LanguageEntry;

/// A request sent from the foreground context to the background worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Ask for the list of supported target languages.
    #[serde(rename = "GET_LANGUAGES")]
    GetLanguages,
    /// Ask for `text` translated into `target_lang`.
    #[serde(rename = "TRANSLATE_TEXT")]
    TranslateText {
        text: String,
        #[serde(rename = "targetLang")]
        target_lang: String,
    },
}

/// One translated segment, tagged with the language it is in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedSegment {
    pub code: String,
    pub text: String,
}

impl TranslatedSegment {
    pub fn new(code: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            text: text.into(),
        }
    }
}

/// The single reply produced for a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    Languages { languages: Vec<LanguageEntry> },
    Translated { translated: Vec<TranslatedSegment> },
    Error { error: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_serialize_with_wire_names() {
        let json = serde_json::to_value(Request::TranslateText {
            text: "hello".into(),
            target_lang: "fr".into(),
        })
        .expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({ "type": "TRANSLATE_TEXT", "text": "hello", "targetLang": "fr" })
        );

        let json = serde_json::to_value(Request::GetLanguages).expect("serialize");
        assert_eq!(json, serde_json::json!({ "type": "GET_LANGUAGES" }));
    }

    #[test]
    fn replies_parse_from_wire_shapes() {
        let reply: Reply =
            serde_json::from_str(r#"{ "languages": [{ "code": "en", "name": "English" }] }"#)
                .expect("parse languages");
        assert_eq!(
            reply,
            Reply::Languages {
                languages: vec![LanguageEntry::new("en", "English")]
            }
        );

        let reply: Reply = serde_json::from_str(r#"{ "error": "boom" }"#).expect("parse error");
        assert_eq!(reply, Reply::Error { error: "boom".into() });
    }
}
