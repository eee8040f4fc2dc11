use quicklingo_gateway::{ForegroundGateway, PendingLanguages, PendingTranslation};
use quicklingo_placement::{place_panel, Point, Rect, Size, PANEL_OFFSET};
use quicklingo_selection::SelectionSnapshot;
use quicklingo_settings::{LanguageEntry, LanguagePreferences};

use crate::lifecycle::{DismissalRegistry, LiveGuard, LiveToken};

/// Fixed text written into the translation slot whenever a translation
/// request is rejected. The slot never keeps a stale or blank value on
/// failure.
pub const TRANSLATION_PLACEHOLDER: &str = "[Translation error]";

/// Fixed row rendered in place of the language picker when the list
/// cannot be shown.
pub const PICKER_ERROR_ROW: &str = "Error. Please try again later";

/// State of the translation text slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationState {
    /// Request in flight, nothing to show yet.
    Pending,
    Ready(String),
    Failed,
}

impl TranslationState {
    /// What the host renders into the translation slot.
    pub fn display_text(&self) -> &str {
        match self {
            TranslationState::Pending => "",
            TranslationState::Ready(text) => text,
            TranslationState::Failed => TRANSLATION_PLACEHOLDER,
        }
    }
}

/// State of the language picker row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerState {
    /// Language list still being resolved.
    Loading,
    Ready {
        languages: Vec<LanguageEntry>,
        selected: String,
    },
    /// List could not be produced; the fixed error row is rendered.
    Unavailable,
}

/// One open translation panel.
pub struct TranslationPanel {
    original_text: String,
    selection_rect: Rect,
    translation: TranslationState,
    picker: PickerState,
    position: Option<Point>,
    size: Option<Size>,
    live: LiveToken,
    registry: DismissalRegistry,
}

impl TranslationPanel {
    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    pub fn translation(&self) -> &TranslationState {
        &self.translation
    }

    pub fn picker(&self) -> &PickerState {
        &self.picker
    }

    pub fn position(&self) -> Option<Point> {
        self.position
    }

    pub fn rect(&self) -> Option<Rect> {
        let position = self.position?;
        let size = self.size?;
        Some(Rect::new(
            position.x,
            position.y,
            position.x + size.width,
            position.y + size.height,
        ))
    }
}

/// Show/replace/dismiss lifecycle of the translation panel, plus the
/// asynchronous content resolution that runs while a panel is open.
///
/// Pending gateway replies are held here, each tied to a [`LiveGuard`] of
/// the instance that asked for them. A reply whose guard has been revoked
/// is discarded unapplied, so a panel that was dismissed (or replaced)
/// while its request was in flight never receives a stale write.
#[derive(Default)]
pub struct TranslationPanelController {
    current: Option<TranslationPanel>,
    inflight_translation: Option<(LiveGuard, PendingTranslation)>,
    inflight_languages: Option<(LiveGuard, PendingLanguages)>,
}

impl TranslationPanelController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&TranslationPanel> {
        self.current.as_ref()
    }

    /// Opens a panel for the activated selection, replacing any open one.
    ///
    /// The original text renders immediately; the selected language, the
    /// initial translation and the language list resolve concurrently
    /// while the panel is already on screen. Placement runs later, once
    /// the host has measured the content.
    pub fn open(
        &mut self,
        snapshot: &SelectionSnapshot,
        gateway: &ForegroundGateway,
        prefs: &mut LanguagePreferences,
    ) {
        self.dismiss();

        let live = LiveToken::new();
        let mut registry = DismissalRegistry::default();
        let token = live.clone();
        registry.register(move || token.revoke());

        let selected = prefs.selected_language();
        let pending = gateway.request_translation(&snapshot.text, &selected);
        self.inflight_translation = Some((live.guard(), pending));

        // cache or disk can satisfy the picker synchronously; only an
        // empty store goes across the channel
        let languages = prefs.available_languages();
        let picker = if languages.is_empty() {
            self.inflight_languages = Some((live.guard(), gateway.request_languages()));
            PickerState::Loading
        } else {
            healed_picker(languages, prefs)
        };

        self.current = Some(TranslationPanel {
            original_text: snapshot.text.clone(),
            selection_rect: snapshot.rect,
            translation: TranslationState::Pending,
            picker,
            position: None,
            size: None,
            live,
            registry,
        });
    }

    /// Registers extra teardown work for the open panel.
    pub fn register_disposer(&mut self, disposer: impl FnOnce() + Send + 'static) {
        if let Some(panel) = self.current.as_mut() {
            panel.registry.register(disposer);
        }
    }

    /// Drains any pending replies. Call once per host frame.
    pub fn poll(&mut self, prefs: &mut LanguagePreferences) {
        if let Some((guard, pending)) = self.inflight_translation.take() {
            if guard.is_live() {
                match pending.poll() {
                    None => self.inflight_translation = Some((guard, pending)),
                    Some(Ok(segments)) => {
                        if let Some(panel) = self.current.as_mut() {
                            panel.translation = match segments.into_iter().next() {
                                Some(first) => TranslationState::Ready(first.text),
                                None => TranslationState::Failed,
                            };
                        }
                    }
                    Some(Err(error)) => {
                        log::warn!("translation request rejected: {error}");
                        if let Some(panel) = self.current.as_mut() {
                            panel.translation = TranslationState::Failed;
                        }
                    }
                }
            }
            // a revoked guard means the instance is gone; the reply is
            // dropped unapplied
        }

        if let Some((guard, pending)) = self.inflight_languages.take() {
            if guard.is_live() {
                match pending.poll() {
                    None => self.inflight_languages = Some((guard, pending)),
                    Some(outcome) => {
                        let languages = prefs.available_languages_with(|| outcome);
                        if let Some(panel) = self.current.as_mut() {
                            panel.picker = healed_picker(languages, prefs);
                        }
                    }
                }
            }
        }
    }

    /// Picker change: persists the choice write-through, then issues a
    /// fresh translation of the same original text. A still-pending
    /// earlier request is superseded and its reply discarded.
    pub fn select_language(
        &mut self,
        code: impl Into<String>,
        gateway: &ForegroundGateway,
        prefs: &mut LanguagePreferences,
    ) {
        let Some(panel) = self.current.as_mut() else {
            return;
        };
        let code = code.into();
        prefs.set_selected_language(code.clone());
        if let PickerState::Ready { selected, .. } = &mut panel.picker {
            *selected = code.clone();
        }
        let pending = gateway.request_translation(&panel.original_text, &code);
        self.inflight_translation = Some((panel.live.guard(), pending));
    }

    /// Second placement pass: centers the measured panel on the selection
    /// with viewport clamping.
    pub fn place(&mut self, measured: Size, viewport: Size) -> Option<Point> {
        let panel = self.current.as_mut()?;
        let position = place_panel(panel.selection_rect, measured, viewport, PANEL_OFFSET);
        panel.size = Some(measured);
        panel.position = Some(position);
        Some(position)
    }

    /// Outside-press dismissal trigger. Presses inside the panel (or
    /// before placement) leave it open.
    pub fn handle_pointer_down(&mut self, at: Point) {
        let Some(rect) = self.current.as_ref().and_then(TranslationPanel::rect) else {
            return;
        };
        if !rect.contains(at) {
            self.dismiss();
        }
    }

    /// Explicit close action. Same teardown as every other trigger.
    pub fn close(&mut self) {
        self.dismiss();
    }

    pub fn dismiss(&mut self) {
        if let Some(mut panel) = self.current.take() {
            panel.registry.dispose_all();
        }
    }
}

/// Builds the picker state from a resolved language list, applying the
/// self-healing rule: a selected code that is not in the list is reset to
/// the default and the correction persisted before the picker renders.
fn healed_picker(languages: Vec<LanguageEntry>, prefs: &mut LanguagePreferences) -> PickerState {
    if languages.is_empty() {
        return PickerState::Unavailable;
    }
    let mut selected = prefs.selected_language();
    if !languages.iter().any(|language| language.code == selected) {
        selected = prefs.default_language().to_string();
        prefs.set_selected_language(selected.clone());
    }
    PickerState::Ready {
        languages,
        selected,
    }
}
