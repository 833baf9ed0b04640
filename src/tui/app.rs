// Viewer application state
//
// App owns one LineComponent per document line, in store order, and is the
// parent those components report to. It aggregates their selection events,
// writes finished edits back into the document, and routes pointer input:
// pointer-downs go to registered outside-click listeners first, then to the
// line under the pointer.

use super::input::{is_selection_modifier, ClickTracker, EditKey};
use super::scroll::{PendingScroll, ScrollState};
use super::toast::Toast;
use crate::config::Config;
use crate::document::{LineId, SharedDocument};
use crate::line::{LineComponent, LineContext, LineEvent, OutsideClickListeners, TextRange};
use crate::logging::LogBuffer;
use crate::translate::Translator;
use crossterm::event::{KeyEvent, KeyModifiers};
use ratatui::layout::Position;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

pub struct App {
    pub document: SharedDocument,

    /// Shown in the title bar
    pub source: Option<PathBuf>,

    ctx: Arc<LineContext>,

    /// One per document line, in store order
    pub components: Vec<LineComponent>,

    line_events: mpsc::UnboundedReceiver<LineEvent>,

    /// Lines toggled on through selection events
    pub selected: BTreeSet<LineId>,

    /// Drag selection across the transcript
    pub text_selection: Option<TextRange>,
    drag_anchor: Option<Position>,

    /// Line receiving keystrokes and the `t` shortcut
    pub focused: Option<LineId>,
    hovered: Option<LineId>,

    pub scroll: ScrollState,
    pending_scroll: Arc<PendingScroll>,
    clicks: ClickTracker,

    pub log_buffer: LogBuffer,
    /// Rows of the log strip; 0 hides it
    pub log_strip_lines: u16,
    pub toast: Option<Toast>,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        document: SharedDocument,
        source: Option<PathBuf>,
        config: &Config,
        translator: Arc<Translator>,
        log_buffer: LogBuffer,
    ) -> Self {
        let pending_scroll = Arc::new(PendingScroll::default());
        let (events_tx, line_events) = mpsc::unbounded_channel();

        let ctx = Arc::new(LineContext {
            display: config.display.clone(),
            translation: config.translation.clone(),
            document: Arc::clone(&document),
            scroll: pending_scroll.clone(),
            listeners: OutsideClickListeners::default(),
            events: events_tx,
            translator,
        });

        let (lines, last) = {
            let doc = document.lock();
            (doc.lines().to_vec(), doc.last_index())
        };
        let mut components: Vec<LineComponent> = lines
            .into_iter()
            .enumerate()
            .map(|(i, line)| LineComponent::new(line, Arc::clone(&ctx), Some(i) == last))
            .collect();
        for component in &mut components {
            component.mount();
        }

        Self {
            document,
            source,
            ctx,
            components,
            line_events,
            selected: BTreeSet::new(),
            text_selection: None,
            drag_anchor: None,
            focused: None,
            hovered: None,
            scroll: ScrollState::new(),
            pending_scroll,
            clicks: ClickTracker::default(),
            log_buffer,
            log_strip_lines: config.logging.strip_lines,
            toast: None,
            should_quit: false,
        }
    }

    pub fn has_credential(&self) -> bool {
        self.ctx.translator.has_credential()
    }

    pub fn is_detached(&self) -> bool {
        self.ctx.is_detached()
    }

    pub fn reverse_order(&self) -> bool {
        self.ctx.display.reverse_order
    }

    fn component(&self, id: &LineId) -> Option<&LineComponent> {
        self.components.iter().find(|c| c.id() == id)
    }

    fn component_mut(&mut self, id: &LineId) -> Option<&mut LineComponent> {
        self.components.iter_mut().find(|c| c.id() == id)
    }

    fn component_at(&mut self, position: Position) -> Option<&mut LineComponent> {
        self.components.iter_mut().find(|c| c.contains(position))
    }

    /// The line being edited, if any
    pub fn editing(&self) -> Option<&LineId> {
        self.components
            .iter()
            .find(|c| c.is_editable())
            .map(|c| c.id())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Document growth
    // ─────────────────────────────────────────────────────────────────────────

    /// Append a followed line; it becomes the last line and is mounted as such
    pub fn push_line(&mut self, text: String) {
        let line = self.document.lock().push_text(text);
        if let Some(previous) = self.components.iter_mut().find(|c| c.is_last()) {
            previous.set_last(false);
        }

        let mut component = LineComponent::new(line, Arc::clone(&self.ctx), true);
        tracing::debug!(line = %component.id(), "Line appended");
        component.mount();
        self.components.push(component);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Line events
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply everything the line components reported since the last call
    pub fn drain_line_events(&mut self) {
        while let Ok(event) = self.line_events.try_recv() {
            self.handle_line_event(event);
        }
    }

    fn handle_line_event(&mut self, event: LineEvent) {
        match event {
            LineEvent::Selected(id) => {
                self.selected.insert(id);
            }
            LineEvent::Deselected(id) => {
                self.selected.remove(&id);
            }
            LineEvent::Edit {
                in_edit: false,
                data: Some(data),
            } => {
                if data.new_text == data.original_text {
                    return;
                }
                if self.document.lock().apply_edit(&data) {
                    tracing::info!(line = %data.line.id, "Line edited");
                } else {
                    tracing::warn!(
                        line = %data.line.id,
                        index = data.line_index,
                        "Edited line is no longer at its index"
                    );
                }
            }
            LineEvent::Edit { .. } => {}
        }
    }

    /// Lines toggled on through selection events plus those the drag covers
    pub fn selected_lines(&self) -> Vec<LineId> {
        let mut lines = self.selected.clone();
        if let Some(range) = &self.text_selection {
            lines.extend(self.components.iter().filter_map(|c| c.hit_test(Some(range))));
        }
        lines.into_iter().collect()
    }

    pub fn clear_selection(&mut self) {
        for component in &mut self.components {
            component.deselect();
        }
        self.selected.clear();
        self.text_selection = None;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Keyboard
    // ─────────────────────────────────────────────────────────────────────────

    /// Offer a key to the line being edited; true if it was consumed
    pub fn edit_key(&mut self, key: &KeyEvent) -> bool {
        let Some(edit_key) = EditKey::from_event(key) else {
            return false;
        };
        let Some(buffer) = self
            .components
            .iter_mut()
            .find_map(|c| c.edit_buffer_mut())
        else {
            return false;
        };
        edit_key.apply(buffer);
        true
    }

    /// Translate the focused line, or the last line when nothing is focused
    pub fn translate_focused(&mut self) {
        let target = match &self.focused {
            Some(id) => self.component(id),
            None => self.components.last(),
        };
        let Some(component) = target else {
            return;
        };
        if component.request_translation().is_none() {
            self.show_toast("Translate control is disabled");
        }
    }

    pub fn copy_selection(&mut self) {
        let ids = self.selected_lines();
        if ids.is_empty() {
            self.show_toast("Nothing selected");
            return;
        }
        let text = self.document.lock().selected_text(&ids);
        match super::clipboard::copy_text(&text) {
            Ok(()) => self.show_toast(format!("✓ Copied {} line(s)", ids.len())),
            Err(e) => {
                tracing::warn!("Copy failed: {:#}", e);
                self.show_toast("✗ Failed to copy");
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Pointer
    // ─────────────────────────────────────────────────────────────────────────

    pub fn pointer_down(&mut self, position: Position, modifiers: KeyModifiers, at: Instant) {
        // Capture phase: editing lines hear about every press first
        for id in self.ctx.listeners.snapshot() {
            if let Some(component) = self.component_mut(&id) {
                component.pointer_down(position);
            }
        }

        if let Some(component) = self.components.iter().find(|c| c.control_hit(position)) {
            component.request_translation();
            return;
        }

        if self.clicks.press(position, at) {
            let modifier = is_selection_modifier(modifiers);
            let mut selection = self.text_selection.take();
            if let Some(component) = self.component_at(position) {
                component.double_activate(modifier, &mut selection);
            }
            self.text_selection = selection;
            self.drag_anchor = None;
            return;
        }

        self.drag_anchor = Some(position);
        self.text_selection = None;
        self.focused = self.component_at(position).map(|c| c.id().clone());
    }

    pub fn pointer_drag(&mut self, position: Position) {
        if let Some(anchor) = self.drag_anchor {
            self.text_selection = Some(TextRange::new(anchor, position));
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag_anchor = None;
        if self.text_selection.is_some_and(|r| r.is_collapsed()) {
            self.text_selection = None;
        }
    }

    /// Track which line the pointer is over
    pub fn pointer_moved(&mut self, position: Position) {
        let now = self.component_at(position).map(|c| c.id().clone());
        if now == self.hovered {
            return;
        }
        if let Some(previous) = self.hovered.take() {
            if let Some(component) = self.component_mut(&previous) {
                component.pointer_leave();
            }
        }
        if let Some(id) = &now {
            if let Some(component) = self.component_mut(id) {
                component.pointer_enter();
            }
        }
        self.hovered = now;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Frame bookkeeping
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply a scroll request left by a line since the last frame
    pub fn apply_pending_scroll(&mut self) {
        if let Some(options) = self.pending_scroll.take() {
            self.scroll.request(options);
        }
    }

    /// Move focus to a line that entered edit mode during the last frame
    ///
    /// Every pending request is consumed; the last one in store order wins.
    pub fn collect_focus_requests(&mut self) {
        for component in &mut self.components {
            if component.take_focus_request() {
                self.focused = Some(component.id().clone());
            }
        }
    }

    pub fn tick(&mut self) {
        if self.scroll.is_animating() {
            self.scroll.step();
        }
        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }
    }

    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::new(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranslationConfig;
    use crate::document::Document;
    use crossterm::event::KeyCode;
    use ratatui::layout::Rect;

    fn app(lines: &[&str]) -> App {
        let mut doc = Document::new();
        for line in lines {
            doc.push_text(*line);
        }
        let config = Config::default();
        let translator =
            Arc::new(Translator::build(&TranslationConfig::default(), None).unwrap());
        App::new(doc.into_shared(), None, &config, translator, LogBuffer::new())
    }

    /// Stack every line one row apart starting at the top of an 80x24 screen
    fn layout(app: &mut App) {
        let viewport = Rect::new(0, 0, 80, 24);
        let mut top = 0;
        for component in &mut app.components {
            let rendered = component.render(80);
            component.place(0, top, 80, &rendered, viewport);
            top += i32::from(rendered.height());
        }
    }

    fn double_click(app: &mut App, position: Position, modifiers: KeyModifiers) {
        let t0 = Instant::now();
        app.pointer_down(position, modifiers, t0);
        app.pointer_up();
        app.pointer_down(position, modifiers, t0 + std::time::Duration::from_millis(100));
        app.pointer_up();
        app.drain_line_events();
    }

    #[tokio::test]
    async fn test_modifier_double_click_selects_line() {
        let mut app = app(&["一", "二", "三"]);
        layout(&mut app);

        double_click(&mut app, Position::new(6, 1), KeyModifiers::CONTROL);

        assert_eq!(app.selected, BTreeSet::from([LineId::from(1)]));
        assert_eq!(app.selected_lines(), vec![LineId::from(1)]);

        app.clear_selection();
        assert!(app.selected_lines().is_empty());
    }

    #[tokio::test]
    async fn test_edit_round_trip_updates_document() {
        let mut app = app(&["一", "二"]);
        layout(&mut app);

        double_click(&mut app, Position::new(5, 0), KeyModifiers::NONE);
        app.collect_focus_requests();
        assert_eq!(app.focused, Some(LineId::from(0)));
        assert_eq!(app.editing(), Some(&LineId::from(0)));

        assert!(app.edit_key(&KeyEvent::new(KeyCode::Char('目'), KeyModifiers::NONE)));

        // click on the other line ends the edit
        app.pointer_down(Position::new(5, 1), KeyModifiers::NONE, Instant::now());
        app.drain_line_events();

        assert_eq!(app.editing(), None);
        assert_eq!(app.document.lock().get(0).unwrap().lock().text, "一目");
    }

    #[tokio::test]
    async fn test_focus_follows_newest_edit_and_consumes_requests() {
        let mut app = app(&["一", "二"]);
        layout(&mut app);

        double_click(&mut app, Position::new(5, 0), KeyModifiers::NONE);
        app.collect_focus_requests();
        assert_eq!(app.focused, Some(LineId::from(0)));

        double_click(&mut app, Position::new(5, 1), KeyModifiers::NONE);
        app.collect_focus_requests();
        assert_eq!(app.focused, Some(LineId::from(1)));
        assert!(app.components.iter_mut().all(|c| !c.take_focus_request()));
    }

    #[tokio::test]
    async fn test_selected_lines_merge_events_and_drag() {
        let mut app = app(&["一", "二", "三"]);
        layout(&mut app);

        double_click(&mut app, Position::new(6, 0), KeyModifiers::CONTROL);
        app.pointer_down(Position::new(5, 2), KeyModifiers::NONE, Instant::now());
        app.pointer_drag(Position::new(6, 2));
        app.pointer_up();

        assert_eq!(app.selected, BTreeSet::from([LineId::from(0)]));
        assert_eq!(app.selected_lines(), vec![LineId::from(0), LineId::from(2)]);

        // toggling off through the event path drops it from the count
        double_click(&mut app, Position::new(6, 0), KeyModifiers::CONTROL);
        assert!(app.selected.is_empty());
    }

    #[tokio::test]
    async fn test_drag_selection_hits_covered_lines() {
        let mut app = app(&["一", "二", "三"]);
        layout(&mut app);

        app.pointer_down(Position::new(5, 0), KeyModifiers::NONE, Instant::now());
        app.pointer_drag(Position::new(5, 1));
        app.pointer_up();

        assert_eq!(app.selected_lines(), vec![LineId::from(0), LineId::from(1)]);
    }

    #[tokio::test]
    async fn test_followed_line_becomes_last() {
        let mut app = app(&["一"]);
        app.push_line("二".to_string());

        assert_eq!(app.components.len(), 2);
        assert!(!app.components[0].is_last());
        assert!(app.components[1].is_last());
        assert_eq!(app.document.lock().len(), 2);

        app.apply_pending_scroll();
        app.drain_line_events();
    }

    #[tokio::test]
    async fn test_hover_follows_pointer() {
        let mut app = app(&["一", "二"]);
        for line in app.document.lock().lines() {
            line.lock().blur_translation = true;
        }
        layout(&mut app);

        app.pointer_moved(Position::new(5, 0));
        assert!(!app.components[0].translation_obscured());
        assert!(app.components[1].translation_obscured());

        app.pointer_moved(Position::new(5, 1));
        assert!(app.components[0].translation_obscured());
        assert!(!app.components[1].translation_obscured());
    }
}
