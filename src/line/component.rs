//! Per-line state machine: selection, inline editing, hover and translation triggers

use ratatui::layout::{Position, Rect};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::render::{self, ControlState, LineView, RenderedLine, GUTTER};
use super::{EditBuffer, EditData, LineContext, LineEvent, TextRange};
use crate::document::{LineId, SharedLine};
use crate::translate::{InFlight, TranslateError, TranslateJob};

/// Present only while the line is in edit mode
struct EditSession {
    original_text: String,
    buffer: EditBuffer,
}

/// Where the line was last drawn; all `None` while off screen
#[derive(Debug, Clone, Copy, Default)]
struct Regions {
    /// Text and translation rows
    block: Option<Rect>,
    /// The editable source text
    text: Option<Rect>,
    /// Translate control cell
    control: Option<Rect>,
}

pub struct LineComponent {
    id: LineId,
    line: SharedLine,
    ctx: Arc<LineContext>,
    is_last: bool,
    selected: bool,
    edit: Option<EditSession>,
    hovered: bool,
    focus_requested: bool,
    regions: Regions,
    liveness: CancellationToken,
    in_flight: InFlight,
}

impl LineComponent {
    pub fn new(line: SharedLine, ctx: Arc<LineContext>, is_last: bool) -> Self {
        let id = line.lock().id.clone();
        Self {
            id,
            line,
            ctx,
            is_last,
            selected: false,
            edit: None,
            hovered: false,
            focus_requested: false,
            regions: Regions::default(),
            liveness: CancellationToken::new(),
            in_flight: InFlight::default(),
        }
    }

    /// First appearance in the viewer
    ///
    /// The last line is scrolled into view and, when automatic translation
    /// is on and it has none yet, translated with the configured blur.
    pub fn mount(&mut self) -> Option<JoinHandle<Result<(), TranslateError>>> {
        if !self.is_last {
            return None;
        }
        self.ctx.scroll_request().fire();

        if !self.ctx.translation.auto_translate || self.line.lock().translation.is_some() {
            return None;
        }
        Some(self.spawn_translation(self.ctx.translation.blur_auto_translation))
    }

    pub fn id(&self) -> &LineId {
        &self.id
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_editable(&self) -> bool {
        self.edit.is_some()
    }

    pub fn is_last(&self) -> bool {
        self.is_last
    }

    pub fn set_last(&mut self, is_last: bool) {
        self.is_last = is_last;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Selection and editing
    // ─────────────────────────────────────────────────────────────────────

    /// Double-click on the line's text
    ///
    /// With the selection modifier held this toggles selection; without it
    /// the line enters edit mode. The viewer's drag selection is cleared
    /// either way. Nothing happens in the detached presentation.
    pub fn double_activate(&mut self, modifier: bool, text_selection: &mut Option<TextRange>) {
        if self.ctx.is_detached() {
            return;
        }
        *text_selection = None;

        if modifier {
            self.selected = !self.selected;
            let event = if self.selected {
                LineEvent::Selected(self.id.clone())
            } else {
                LineEvent::Deselected(self.id.clone())
            };
            tracing::debug!(line = %self.id, selected = self.selected, "Selection toggled");
            self.ctx.emit(event);
            return;
        }

        self.enter_edit();
    }

    fn enter_edit(&mut self) {
        let original_text = self.rendered_text();
        let buffer = match self.edit.take() {
            Some(session) => session.buffer,
            None => EditBuffer::new(original_text.clone()),
        };
        self.edit = Some(EditSession {
            original_text,
            buffer,
        });

        self.ctx.emit(LineEvent::edit_begin());
        self.ctx.listeners.register(self.id.clone());
        self.focus_requested = true;
        tracing::debug!(line = %self.id, "Editing started");
    }

    /// Pointer-down anywhere in the viewer, offered before normal routing
    ///
    /// Ends editing when the pointer lands outside the editable text.
    /// Returns true if that happened.
    pub fn pointer_down(&mut self, position: Position) -> bool {
        if self.regions.text.is_some_and(|r| r.contains(position)) {
            return false;
        }
        let Some(session) = self.edit.take() else {
            return false;
        };

        self.ctx.listeners.unregister(&self.id);
        let line = self.line.lock().clone();
        let data = EditData {
            original_text: session.original_text,
            new_text: session.buffer.into_string(),
            line_index: line.index,
            line,
        };
        let changed = data.original_text != data.new_text;
        tracing::debug!(line = %self.id, changed, "Editing finished");
        self.ctx.emit(LineEvent::edit_end(Some(data)));
        true
    }

    /// The buffer keystrokes go to while editing
    pub fn edit_buffer_mut(&mut self) -> Option<&mut EditBuffer> {
        self.edit.as_mut().map(|session| &mut session.buffer)
    }

    /// Whether focus should move into this line; clears the request
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_requested)
    }

    pub fn deselect(&mut self) {
        self.selected = false;
    }

    /// This line's id if it is selected or `range` covers its rendered rows
    pub fn hit_test(&self, range: Option<&TextRange>) -> Option<LineId> {
        let covered = match (range, self.regions.block) {
            (Some(range), Some(area)) => range.intersects(area),
            _ => false,
        };
        let hit = self.selected || covered;
        hit.then(|| self.id.clone())
    }

    /// Text as currently shown: the edit buffer while editing
    fn rendered_text(&self) -> String {
        match &self.edit {
            Some(session) => session.buffer.as_str().to_string(),
            None => self.line.lock().text.clone(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Hover and translation
    // ─────────────────────────────────────────────────────────────────────

    pub fn pointer_enter(&mut self) {
        self.hovered = true;
    }

    pub fn pointer_leave(&mut self) {
        self.hovered = false;
    }

    /// Whether the translation is drawn obscured right now
    pub fn translation_obscured(&self) -> bool {
        self.line.lock().blur_translation && !self.hovered
    }

    pub fn translate_control_visible(&self) -> bool {
        !self.ctx.is_detached() && self.ctx.translation.show_button
    }

    pub fn translation_pending(&self) -> bool {
        self.in_flight.is_active()
    }

    /// Translate on user request; `None` when the control is hidden
    pub fn request_translation(&self) -> Option<JoinHandle<Result<(), TranslateError>>> {
        if !self.translate_control_visible() {
            return None;
        }
        Some(self.spawn_translation(false))
    }

    fn spawn_translation(&self, blur: bool) -> JoinHandle<Result<(), TranslateError>> {
        let job = TranslateJob {
            line: Arc::clone(&self.line),
            document: Arc::clone(&self.ctx.document),
            blur,
            liveness: self.liveness.clone(),
            in_flight: self.in_flight.clone(),
            scroll: self.is_last.then(|| self.ctx.scroll_request()),
        };
        let translator = Arc::clone(&self.ctx.translator);
        tokio::spawn(async move { translator.translate(job).await })
    }

    /// Whether `position` lands on the translate control
    pub fn control_hit(&self, position: Position) -> bool {
        self.regions.control.is_some_and(|r| r.contains(position))
    }

    /// Whether `position` lands on the line's text or translation
    pub fn contains(&self, position: Position) -> bool {
        self.regions.block.is_some_and(|r| r.contains(position))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────

    pub fn render(&self, width: u16) -> RenderedLine {
        let milestone = self.ctx.milestone(&self.id);
        let line = self.line.lock();

        let control = if !self.translate_control_visible() {
            ControlState::Hidden
        } else if self.translation_pending() {
            ControlState::Pending
        } else {
            ControlState::Idle
        };

        let (text, cursor) = match &self.edit {
            Some(session) => (session.buffer.as_str(), Some(session.buffer.cursor())),
            None => (line.text.as_str(), None),
        };

        render::render(
            &LineView {
                text,
                translation: line.translation.as_deref(),
                translation_obscured: line.blur_translation && !self.hovered,
                milestone: milestone.as_deref(),
                selected: self.selected,
                cursor,
                control,
                preserve_whitespace: self.ctx.display.preserve_whitespace,
            },
            width,
        )
    }

    /// Record where `rendered` was drawn, clipped to the visible `viewport`
    ///
    /// `top` is the screen row of the line's first row and may lie above the
    /// viewport when the line is partly scrolled out.
    pub fn place(&mut self, x: u16, top: i32, width: u16, rendered: &RenderedLine, viewport: Rect) {
        let top = top + i32::from(rendered.milestone_rows);
        let body_rows = rendered.text_rows + rendered.translation_rows;

        self.regions = Regions {
            block: clip(x, top, width, body_rows, viewport),
            text: clip(
                x.saturating_add(GUTTER),
                top,
                width.saturating_sub(GUTTER),
                rendered.text_rows,
                viewport,
            ),
            control: if self.translate_control_visible() {
                clip(x, top, GUTTER, 1, viewport)
            } else {
                None
            },
        };
    }

    /// Forget the on-screen position; the line scrolled out of view
    pub fn unplace(&mut self) {
        self.regions = Regions::default();
    }
}

/// The visible part of a `width` x `height` box whose top row is `top`
fn clip(x: u16, top: i32, width: u16, height: u16, viewport: Rect) -> Option<Rect> {
    let from = top.max(i32::from(viewport.y));
    let to = (top + i32::from(height)).min(i32::from(viewport.bottom()));
    if to <= from {
        return None;
    }
    let (y, rows) = (u16::try_from(from).ok()?, u16::try_from(to - from).ok()?);
    let visible = Rect::new(x, y, width, rows).intersection(viewport);
    (!visible.is_empty()).then_some(visible)
}

impl Drop for LineComponent {
    fn drop(&mut self) {
        self.liveness.cancel();
        self.ctx.listeners.unregister(&self.id);
        self.ctx.emit(LineEvent::edit_end(None));
    }
}
