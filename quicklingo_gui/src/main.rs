use eframe::{egui, App, Frame, NativeOptions};
use egui::{Align, Layout, RichText};
use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use quicklingo_gateway::{
    BackgroundService, ForegroundGateway, GatewayError, HttpTranslationProvider,
    StaticTranslationProvider,
};
use quicklingo_overlay::{
    ActionControl, ActionControlController, PickerState, TranslationPanel,
    TranslationPanelController, TranslationState, PICKER_ERROR_ROW,
};
use quicklingo_placement::{Point, Rect, Size};
use quicklingo_selection::{
    is_selection_valid, FragmentNode, SelectionSnapshot, SELECTION_SETTLE_DELAY,
};
use quicklingo_settings::{JsonFileBackend, LanguagePreferences, MemoryBackend};

const APP_TITLE: &str = "QuickLingo – Select to Translate";

/// Code the selected-language slot falls back to; the panel's
/// self-healing rule resets to this as well.
const DEFAULT_LANGUAGE: &str = "en";
const DEFAULT_API_REGION: &str = "westeurope";

/// Overlays are parked here for their measure pass, before placement.
const OFFSCREEN: egui::Pos2 = egui::Pos2 {
    x: -4000.0,
    y: -4000.0,
};

// ---------------------------------------------------------------------------
// Sample document shown in the preview window
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq)]
enum SpanKind {
    Plain,
    Strong,
    /// Decorative inline element with no text content. Selecting only
    /// badges must not bring up the action control.
    Badge,
}

#[derive(Clone, Copy)]
struct SampleSpan {
    kind: SpanKind,
    text: &'static str,
}

impl SampleSpan {
    const fn plain(text: &'static str) -> Self {
        Self {
            kind: SpanKind::Plain,
            text,
        }
    }

    const fn strong(text: &'static str) -> Self {
        Self {
            kind: SpanKind::Strong,
            text,
        }
    }

    const fn badge() -> Self {
        Self {
            kind: SpanKind::Badge,
            text: "",
        }
    }
}

struct SampleParagraph {
    spans: &'static [SampleSpan],
}

static SAMPLE_DOCUMENT: &[SampleParagraph] = &[
    SampleParagraph {
        spans: &[
            SampleSpan::plain(
                "Drag across any words in this document with the mouse. When the \
                 selection contains real text, a small translate control appears \
                 next to it;",
            ),
            SampleSpan::strong("activating the control"),
            SampleSpan::plain("opens the translation panel."),
        ],
    },
    SampleParagraph {
        spans: &[
            SampleSpan::plain(
                "The panel shows the original text together with a translation and \
                 remembers the target language you pick, across restarts.",
            ),
            SampleSpan::badge(),
            SampleSpan::plain(
                "The diamond in the middle of this paragraph is a purely decorative \
                 element: select it on its own and nothing happens, because the \
                 selection carries no text.",
            ),
        ],
    },
    SampleParagraph {
        spans: &[
            SampleSpan::plain("Without an API key the app runs against an"),
            SampleSpan::strong("offline preview provider"),
            SampleSpan::plain(
                "that tags text with the target language instead of translating it. \
                 Set QUICKLINGO_API_KEY to use the real translation service.",
            ),
        ],
    },
];

/// One selectable word (or badge) of the sample document.
struct Token {
    paragraph: usize,
    span: usize,
    kind: SpanKind,
    text: &'static str,
}

static TOKENS: Lazy<Vec<Token>> = Lazy::new(|| {
    let mut tokens = Vec::new();
    for (paragraph_index, paragraph) in SAMPLE_DOCUMENT.iter().enumerate() {
        for (span_index, span) in paragraph.spans.iter().enumerate() {
            match span.kind {
                SpanKind::Badge => tokens.push(Token {
                    paragraph: paragraph_index,
                    span: span_index,
                    kind: span.kind,
                    text: "",
                }),
                _ => {
                    for word in span.text.split_whitespace() {
                        tokens.push(Token {
                            paragraph: paragraph_index,
                            span: span_index,
                            kind: span.kind,
                            text: word,
                        });
                    }
                }
            }
        }
    }
    tokens
});

/// Builds the flat text and the detached content clone for a token range.
/// Runs of tokens from the same span become one node; a selection spanning
/// paragraphs wraps each paragraph's nodes in a block element.
fn selected_fragment(tokens: &[Token], lo: usize, hi: usize) -> (String, Vec<FragmentNode>) {
    let mut paragraphs: Vec<(usize, Vec<FragmentNode>, Vec<&str>)> = Vec::new();
    let mut index = lo;
    while index <= hi {
        let (paragraph, span, kind) = {
            let token = &tokens[index];
            (token.paragraph, token.span, token.kind)
        };
        let mut words: Vec<&str> = Vec::new();
        while index <= hi && tokens[index].paragraph == paragraph && tokens[index].span == span {
            if !tokens[index].text.is_empty() {
                words.push(tokens[index].text);
            }
            index += 1;
        }

        let node = match kind {
            SpanKind::Plain => FragmentNode::text(words.join(" ")),
            SpanKind::Strong => {
                FragmentNode::element("strong", vec![FragmentNode::text(words.join(" "))])
            }
            SpanKind::Badge => FragmentNode::element("badge", vec![]),
        };

        match paragraphs.last_mut() {
            Some((current, nodes, text_words)) if *current == paragraph => {
                nodes.push(node);
                text_words.extend(words);
            }
            _ => paragraphs.push((paragraph, vec![node], words)),
        }
    }

    let text = paragraphs
        .iter()
        .map(|(_, _, words)| words.join(" "))
        .collect::<Vec<_>>()
        .join("\n");

    let fragment = if paragraphs.len() == 1 {
        paragraphs
            .into_iter()
            .next()
            .map(|(_, nodes, _)| nodes)
            .unwrap_or_default()
    } else {
        paragraphs
            .into_iter()
            .map(|(_, nodes, _)| FragmentNode::element("p", nodes))
            .collect()
    };

    (text, fragment)
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

#[derive(Default)]
struct DocumentSelection {
    anchor: Option<usize>,
    head: Option<usize>,
}

impl DocumentSelection {
    fn range(&self) -> Option<(usize, usize)> {
        match (self.anchor, self.head) {
            (Some(anchor), Some(head)) => Some((anchor.min(head), anchor.max(head))),
            _ => None,
        }
    }

    fn clear(&mut self) {
        self.anchor = None;
        self.head = None;
    }
}

struct QuickLingoApp {
    gateway: ForegroundGateway,
    _service: BackgroundService,
    prefs: LanguagePreferences,
    action_control: ActionControlController,
    panel: TranslationPanelController,
    selection: DocumentSelection,
    token_rects: Vec<egui::Rect>,
    pending_gesture: Option<(Instant, Point)>,
    press_on_overlay: bool,
}

impl QuickLingoApp {
    fn new() -> Result<Self, GatewayError> {
        let (gateway, service) = spawn_background()?;
        Ok(Self {
            gateway,
            _service: service,
            prefs: load_preferences(),
            action_control: ActionControlController::new(),
            panel: TranslationPanelController::new(),
            selection: DocumentSelection::default(),
            token_rects: vec![egui::Rect::NOTHING; TOKENS.len()],
            pending_gesture: None,
            press_on_overlay: false,
        })
    }

    fn token_at(&self, pos: egui::Pos2) -> Option<usize> {
        self.token_rects.iter().position(|rect| rect.contains(pos))
    }

    fn over_overlay(&self, point: Point) -> bool {
        let over_control = self
            .action_control
            .current()
            .and_then(ActionControl::rect)
            .map_or(false, |rect| rect.contains(point));
        let over_panel = self
            .panel
            .current()
            .and_then(TranslationPanel::rect)
            .map_or(false, |rect| rect.contains(point));
        over_control || over_panel
    }

    fn handle_pointer(&mut self, ctx: &egui::Context) {
        let (pressed, down, released, pos) = ctx.input(|input| {
            (
                input.pointer.primary_pressed(),
                input.pointer.primary_down(),
                input.pointer.primary_released(),
                input.pointer.interact_pos(),
            )
        });
        let Some(pos) = pos else {
            return;
        };
        let point = Point::new(pos.x, pos.y);

        if pressed {
            // gestures starting on the overlays never touch the selection
            self.press_on_overlay = self.over_overlay(point);
            self.action_control.handle_pointer_down(point);
            self.panel.handle_pointer_down(point);
            if !self.press_on_overlay {
                match self.token_at(pos) {
                    Some(index) => {
                        self.selection.anchor = Some(index);
                        self.selection.head = Some(index);
                    }
                    None => self.selection.clear(),
                }
            }
        } else if down && !self.press_on_overlay && self.selection.anchor.is_some() {
            if let Some(index) = self.token_at(pos) {
                self.selection.head = Some(index);
            }
        }

        if released {
            if self.press_on_overlay {
                self.press_on_overlay = false;
            } else if self.selection.range().is_some() {
                self.pending_gesture = Some((Instant::now(), point));
                ctx.request_repaint_after(SELECTION_SETTLE_DELAY);
            }
        }
    }

    fn process_pending_gesture(&mut self, ctx: &egui::Context) {
        let Some((started, pointer)) = self.pending_gesture else {
            return;
        };
        let elapsed = started.elapsed();
        if elapsed < SELECTION_SETTLE_DELAY {
            ctx.request_repaint_after(SELECTION_SETTLE_DELAY - elapsed);
            return;
        }
        self.pending_gesture = None;
        self.handle_select(pointer);
    }

    /// The pointer-release pipeline: snapshot the settled selection, run
    /// it through the validity gate, and only then show the control.
    fn handle_select(&mut self, pointer: Point) {
        let snapshot = self.selection_snapshot(pointer);
        let has_text = snapshot
            .as_ref()
            .map_or(false, |snapshot| !snapshot.text.trim().is_empty());
        if !has_text || !is_selection_valid(snapshot.as_ref()) {
            return;
        }
        if let Some(snapshot) = snapshot {
            self.action_control.show(snapshot);
        }
    }

    fn selection_snapshot(&self, pointer: Point) -> Option<SelectionSnapshot> {
        let (lo, hi) = self.selection.range()?;
        let mut union: Option<egui::Rect> = None;
        for rect in &self.token_rects[lo..=hi] {
            union = Some(match union {
                Some(current) => current.union(*rect),
                None => *rect,
            });
        }
        let union = union?;
        let rect = Rect::new(union.min.x, union.min.y, union.max.x, union.max.y);
        let (text, fragment) = selected_fragment(&TOKENS, lo, hi);
        Some(SelectionSnapshot::new(text, rect, pointer, fragment))
    }

    fn show_document(&mut self, ctx: &egui::Context) {
        let selected = self.selection.range();
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(8.0);
                ui.heading("QuickLingo preview");
                ui.weak("Select text below, then activate the floating control.");
                ui.add_space(12.0);

                for paragraph_index in 0..SAMPLE_DOCUMENT.len() {
                    ui.horizontal_wrapped(|ui| {
                        for (index, token) in TOKENS.iter().enumerate() {
                            if token.paragraph != paragraph_index {
                                continue;
                            }
                            let is_selected = selected
                                .map_or(false, |(lo, hi)| index >= lo && index <= hi);
                            let rich = match token.kind {
                                SpanKind::Plain => RichText::new(token.text),
                                SpanKind::Strong => RichText::new(token.text).strong(),
                                SpanKind::Badge => RichText::new("◆").weak(),
                            };
                            let rich = if is_selected {
                                rich.background_color(ui.visuals().selection.bg_fill)
                                    .color(ui.visuals().selection.stroke.color)
                            } else {
                                rich
                            };
                            let response =
                                ui.add(egui::Label::new(rich).sense(egui::Sense::hover()));
                            self.token_rects[index] = response.rect;
                        }
                    });
                    ui.add_space(10.0);
                }
            });
        });
    }

    fn show_action_control(&mut self, ctx: &egui::Context) {
        if !self.action_control.is_visible() {
            return;
        }
        let placed = self
            .action_control
            .current()
            .and_then(ActionControl::position);
        let anchor = placed.map_or(OFFSCREEN, |position| egui::pos2(position.x, position.y));

        let mut activated = false;
        let response = egui::Area::new(egui::Id::new("quicklingo_action_control"))
            .order(egui::Order::Foreground)
            .fixed_pos(anchor)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style())
                    .inner_margin(egui::Margin::same(2.0))
                    .show(ui, |ui| {
                        if ui
                            .button("🌐")
                            .on_hover_text("Translate selection")
                            .clicked()
                        {
                            activated = true;
                        }
                    });
            });

        if placed.is_none() {
            let rect = response.response.rect;
            self.action_control
                .place(Size::new(rect.width(), rect.height()), viewport_size(ctx));
            ctx.request_repaint();
        }

        if activated {
            if let Some(snapshot) = self.action_control.activate() {
                self.panel.open(&snapshot, &self.gateway, &mut self.prefs);
            }
        }
    }

    fn show_panel(&mut self, ctx: &egui::Context) {
        let Some(panel) = self.panel.current() else {
            return;
        };
        let placed = panel.position();
        let content_settled = panel.translation() != &TranslationState::Pending
            && panel.picker() != &PickerState::Loading;
        let original = panel.original_text().to_string();
        let translation = panel.translation().clone();
        let picker = panel.picker().clone();

        let anchor = placed.map_or(OFFSCREEN, |position| egui::pos2(position.x, position.y));
        let mut close_clicked = false;
        let mut picked: Option<String> = None;

        let response = egui::Area::new(egui::Id::new("quicklingo_panel"))
            .order(egui::Order::Foreground)
            .fixed_pos(anchor)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(340.0);

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if ui.small_button("✕").clicked() {
                            close_clicked = true;
                        }
                    });

                    ui.label(&original);
                    ui.add_space(6.0);

                    match &picker {
                        PickerState::Loading => {}
                        PickerState::Unavailable => {
                            ui.colored_label(ui.visuals().error_fg_color, PICKER_ERROR_ROW);
                        }
                        PickerState::Ready {
                            languages,
                            selected,
                        } => {
                            let mut current = selected.clone();
                            let selected_name = languages
                                .iter()
                                .find(|language| language.code == current)
                                .map(|language| language.name.clone())
                                .unwrap_or_else(|| current.clone());
                            egui::ComboBox::from_id_source("quicklingo_language_picker")
                                .selected_text(selected_name)
                                .show_ui(ui, |ui| {
                                    for language in languages {
                                        ui.selectable_value(
                                            &mut current,
                                            language.code.clone(),
                                            &language.name,
                                        );
                                    }
                                });
                            if &current != selected {
                                picked = Some(current);
                            }
                        }
                    }

                    ui.add_space(6.0);
                    ui.separator();
                    if translation == TranslationState::Failed {
                        ui.colored_label(
                            ui.visuals().error_fg_color,
                            translation.display_text(),
                        );
                    } else {
                        ui.label(translation.display_text());
                    }
                });
            });

        // placement is the second pass, run only once the content that
        // determines the panel height has arrived
        if placed.is_none() && content_settled {
            let rect = response.response.rect;
            self.panel
                .place(Size::new(rect.width(), rect.height()), viewport_size(ctx));
            ctx.request_repaint();
        }

        if close_clicked {
            self.panel.close();
        }
        if let Some(code) = picked {
            self.panel
                .select_language(code, &self.gateway, &mut self.prefs);
        }
    }
}

impl App for QuickLingoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.panel.poll(&mut self.prefs);
        self.process_pending_gesture(ctx);
        self.handle_pointer(ctx);

        self.show_document(ctx);
        self.show_action_control(ctx);
        self.show_panel(ctx);

        // keep frames coming while gateway replies are outstanding
        let waiting = self.panel.current().map_or(false, |panel| {
            panel.translation() == &TranslationState::Pending
                || panel.picker() == &PickerState::Loading
        });
        if waiting {
            ctx.request_repaint_after(Duration::from_millis(30));
        }
    }
}

fn viewport_size(ctx: &egui::Context) -> Size {
    let rect = ctx.screen_rect();
    Size::new(rect.width(), rect.height())
}

fn settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("quicklingo")
        .join("settings.json")
}

fn load_preferences() -> LanguagePreferences {
    let path = settings_path();
    match JsonFileBackend::load(&path) {
        Ok(backend) => LanguagePreferences::new(backend, DEFAULT_LANGUAGE),
        Err(error) => {
            log::warn!("settings file unavailable, keeping preferences in memory: {error}");
            LanguagePreferences::new(MemoryBackend::new(), DEFAULT_LANGUAGE)
        }
    }
}

fn spawn_background() -> Result<(ForegroundGateway, BackgroundService), GatewayError> {
    match env::var("QUICKLINGO_API_KEY") {
        Ok(key) if !key.trim().is_empty() => {
            let region =
                env::var("QUICKLINGO_API_REGION").unwrap_or_else(|_| DEFAULT_API_REGION.into());
            log::info!("using the Microsoft Translator backend");
            BackgroundService::spawn(HttpTranslationProvider::new(key, region))
        }
        _ => {
            log::info!("QUICKLINGO_API_KEY not set, using the offline preview provider");
            BackgroundService::spawn(StaticTranslationProvider::default())
        }
    }
}

fn main() -> eframe::Result<()> {
    env_logger::init();

    let app = match QuickLingoApp::new() {
        Ok(app) => app,
        Err(error) => {
            log::error!("failed to start the background worker: {error}");
            return Ok(());
        }
    };

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1100.0, 760.0]),
        ..Default::default()
    };
    eframe::run_native(APP_TITLE, options, Box::new(move |_cc| Box::new(app)))
}
