use quicklingo_settings::{
    JsonFileBackend, LanguageEntry, LanguagePreferences, SettingsBackend, StorageError,
    AVAILABLE_LANGUAGES_KEY, SELECTED_LANGUAGE_KEY,
};
use serde_json::Value;
use std::fs;
use std::io;
use tempfile::tempdir;

fn sample_languages() -> Vec<LanguageEntry> {
    vec![
        LanguageEntry::new("en", "English"),
        LanguageEntry::new("fr", "French"),
    ]
}

#[test]
fn empty_store_yields_no_languages_and_default_selection() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("quicklingo.json");
    let backend = JsonFileBackend::load(&path).expect("load");
    let mut prefs = LanguagePreferences::new(backend, "en");

    assert!(prefs.available_languages().is_empty());
    assert_eq!(prefs.selected_language(), "en");

    // first read of the selection initializes and persists the default
    let reloaded = JsonFileBackend::load(&path).expect("reload");
    assert_eq!(
        reloaded.read(SELECTED_LANGUAGE_KEY).expect("read"),
        Some(Value::String("en".into()))
    );
}

#[test]
fn fetched_languages_are_cached_and_persisted() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("quicklingo.json");
    let backend = JsonFileBackend::load(&path).expect("load");
    let mut prefs = LanguagePreferences::new(backend, "en");

    let fetched =
        prefs.available_languages_with(|| Ok::<_, StorageError>(sample_languages()));
    assert_eq!(fetched, sample_languages());

    // second call must not invoke the fetcher again
    let cached = prefs.available_languages_with(|| -> Result<Vec<LanguageEntry>, StorageError> {
        panic!("fetcher must not run when the cache is warm")
    });
    assert_eq!(cached, sample_languages());

    // and a cold process finds the list on disk
    let backend = JsonFileBackend::load(&path).expect("reload");
    let mut cold = LanguagePreferences::new(backend, "en");
    assert_eq!(cold.available_languages(), sample_languages());
}

#[test]
fn fetch_failure_is_soft_and_leaves_the_backend_untouched() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("quicklingo.json");
    let backend = JsonFileBackend::load(&path).expect("load");
    let mut prefs = LanguagePreferences::new(backend, "en");

    let fetched = prefs
        .available_languages_with(|| Err::<Vec<LanguageEntry>, _>("provider unreachable"));
    assert!(fetched.is_empty());

    let reloaded = JsonFileBackend::load(&path).expect("reload");
    assert_eq!(reloaded.read(AVAILABLE_LANGUAGES_KEY).expect("read"), None);
}

#[test]
fn selection_survives_restart() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("quicklingo.json");
    let backend = JsonFileBackend::load(&path).expect("load");
    let mut prefs = LanguagePreferences::new(backend, "en");
    prefs.set_selected_language("fr");

    let backend = JsonFileBackend::load(&path).expect("reload");
    let mut cold = LanguagePreferences::new(backend, "en");
    assert_eq!(cold.selected_language(), "fr");
}

#[test]
fn clear_cache_drops_memory_but_not_the_file() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("quicklingo.json");
    let backend = JsonFileBackend::load(&path).expect("load");
    let mut prefs = LanguagePreferences::new(backend, "en");
    prefs.set_selected_language("de");

    prefs.clear_cache();
    // re-read falls through to the backend, not to the default
    assert_eq!(prefs.selected_language(), "de");
}

#[test]
fn malformed_stored_values_are_treated_as_absent() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("quicklingo.json");
    fs::write(
        &path,
        r#"{ "availableLanguages": "not-a-list", "selectedLanguage": 42 }"#,
    )
    .expect("seed corrupt store");

    let backend = JsonFileBackend::load(&path).expect("load");
    let mut prefs = LanguagePreferences::new(backend, "en");
    assert!(prefs.available_languages().is_empty());
    assert_eq!(prefs.selected_language(), "en");
}

#[test]
fn unreadable_store_file_is_a_parse_error() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("quicklingo.json");
    fs::write(&path, "{ definitely not json").expect("seed garbage");

    match JsonFileBackend::load(&path) {
        Err(StorageError::Parse { .. }) => {}
        other => panic!("expected parse error, got {other:?}"),
    }
}

/// Backend whose writes always fail, for exercising the write-through rule.
struct BrokenBackend;

impl SettingsBackend for BrokenBackend {
    fn read(&self, _key: &str) -> Result<Option<Value>, StorageError> {
        Ok(None)
    }

    fn write(&mut self, _key: &str, _value: Value) -> Result<(), StorageError> {
        Err(StorageError::Write {
            path: "broken".into(),
            source: io::Error::new(io::ErrorKind::Other, "disk on fire"),
        })
    }
}

#[test]
fn cache_is_updated_even_when_the_backend_write_fails() {
    let mut prefs = LanguagePreferences::new(BrokenBackend, "en");
    prefs.set_selected_language("ja");
    // cache-first write-through: readers see the new value immediately
    assert_eq!(prefs.selected_language(), "ja");
}
