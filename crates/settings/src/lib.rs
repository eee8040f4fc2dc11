pub mod languages;
pub mod storage;

pub use languages::{
    LanguageEntry, LanguagePreferences, AVAILABLE_LANGUAGES_KEY, SELECTED_LANGUAGE_KEY,
};
pub use storage::{JsonFileBackend, MemoryBackend, SettingsBackend, StorageError};
