//! The interaction state machine: pointer and keyboard input in, book
//! mutations and host events out.

use crate::book::{Book, BookSnapshot};
use crate::config::EditorConfig;
use crate::events::{EditorEvent, Notice};
use crate::history::History;
use crate::input::{InputState, Modifiers, MouseButton, PointerEvent};
use crate::keymap::{EditorAction, KeyCombo, Keymap};
use crate::navigation::Navigator;
use crate::objects::{
    CellFormat, Image, Object, ObjectId, ObjectPatch, ObjectTrait, Shape, StickyNote, Stroke,
    StrokeTool, Table, Text, TextFormat,
};
use crate::page::{PageField, ZDirection};
use crate::pen::{PenEditor, PenMode, PenOutcome};
use crate::session::{
    EditSession, EditingKind, Handle, HandleKind, Session, hit_test_handle, object_handles,
    resize_bounds, rotation_towards, vertex_handles,
};
use crate::table_editor::{
    ContextMenu, TableAction, apply_menu_action, begin_cell_edit, commit_cell_edit,
};
use crate::tools::{ToolKind, ToolSettings};
use crate::upload::{PendingImage, UploadError, UploadedImage};
use kurbo::{Point, Rect, Vec2};
use std::collections::HashSet;
use std::ops::Range;

// Use web_time for WASM compatibility
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// The pointer gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum Gesture {
    #[default]
    Idle,
    /// Moving an object. History is committed on the first actual move.
    Dragging {
        id: ObjectId,
        last: Point,
        committed: bool,
    },
    Resizing {
        id: ObjectId,
        handle: HandleKind,
        original: Rect,
        committed: bool,
    },
    Rotating {
        id: ObjectId,
        original: Rect,
        committed: bool,
    },
    /// Screen-space panning.
    Panning { last: Point },
    /// Brush or eraser stroke being drawn.
    Stroking { id: ObjectId },
    PenFreehand { page: usize },
    /// Dragging a polygon vertex handle.
    PenVertex { page: usize, index: usize },
}

/// One open book and everything needed to edit it.
pub struct Editor {
    book: Book,
    history: History<BookSnapshot>,
    navigator: Navigator,
    session: Session,
    pen: PenEditor,
    input: InputState,
    keymap: Keymap,
    settings: ToolSettings,
    config: EditorConfig,
    menu: Option<ContextMenu>,
    gesture: Gesture,
    uploads: HashSet<u64>,
    next_upload: u64,
    events: Vec<EditorEvent>,
}

impl Editor {
    /// Start editing a fresh book.
    pub fn new(config: EditorConfig, settings: ToolSettings) -> Self {
        let book = Book::new(config.initial_pages.max(1));
        Self::with_book(book, config, settings)
    }

    /// Start editing an existing book. History starts empty.
    pub fn with_book(book: Book, config: EditorConfig, settings: ToolSettings) -> Self {
        log::info!("Opening book {} with {} page(s)", book.id, book.page_count());
        Self {
            history: History::new(config.history_depth),
            navigator: Navigator::new(book.page_count(), &config),
            session: Session::new(),
            pen: PenEditor::new(),
            input: InputState::new(config.double_click_ms),
            keymap: Keymap::default(),
            book,
            settings,
            config,
            menu: None,
            gesture: Gesture::Idle,
            uploads: HashSet::new(),
            next_upload: 0,
            events: Vec::new(),
        }
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    /// Give up the book, e.g. to save it.
    pub fn into_book(self) -> Book {
        self.book
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn pen(&self) -> &PenEditor {
        &self.pen
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    /// Toolbar values. The editor reads them at the next gesture.
    pub fn settings_mut(&mut self) -> &mut ToolSettings {
        &mut self.settings
    }

    pub fn keymap_mut(&mut self) -> &mut Keymap {
        &mut self.keymap
    }

    pub fn context_menu(&self) -> Option<&ContextMenu> {
        self.menu.as_ref()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// The committed page that tools act on.
    pub fn current_page(&self) -> usize {
        self.navigator.current_page()
    }

    /// Take all events queued since the last call.
    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: EditorEvent) {
        self.events.push(event);
    }

    fn emit_history(&mut self) {
        let event = EditorEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        };
        self.emit(event);
    }

    fn commit(&mut self, before: BookSnapshot) {
        self.history.commit(before);
        self.emit_history();
    }

    /// Commit the current state once per gesture.
    fn commit_once(&mut self, committed: &mut bool) {
        if !*committed {
            let before = self.book.snapshot();
            self.commit(before);
            *committed = true;
        }
    }

    /// Run a mutation and record history only if it changed something.
    fn mutate(&mut self, f: impl FnOnce(&mut Book) -> bool) -> bool {
        let before = self.book.snapshot();
        let changed = f(&mut self.book);
        if changed {
            self.commit(before);
        }
        changed
    }

    fn insert_object(&mut self, page: usize, object: Object) -> Option<ObjectId> {
        let before = self.book.snapshot();
        let kind = object.kind();
        let id = self.book.add_object(page, object)?;
        self.commit(before);
        log::debug!("Created {kind:?} {id} on page {page}");
        Some(id)
    }

    fn select(&mut self, id: ObjectId) {
        if self.session.select(id) {
            self.emit(EditorEvent::SelectionChanged(Some(id)));
        }
    }

    fn clear_selection(&mut self) {
        if self.session.clear_selection() {
            self.emit(EditorEvent::SelectionChanged(None));
        }
    }

    /// The selected object, looked up on the current page.
    pub fn selected_object(&self) -> Option<Object> {
        let id = self.session.selected()?;
        self.book.page(self.current_page())?.get_object(id)
    }

    /// Unlocked selected object id.
    fn selected_unlocked(&self) -> Option<ObjectId> {
        self.selected_object()
            .filter(|o| !o.is_locked())
            .map(|o| o.id())
    }

    fn to_page(&self, screen: Point) -> Point {
        self.navigator.screen_to_page(screen)
    }

    fn screen_rect(&self, rect: Rect) -> Rect {
        Rect::from_points(
            self.navigator.page_to_screen(Point::new(rect.x0, rect.y0)),
            self.navigator.page_to_screen(Point::new(rect.x1, rect.y1)),
        )
    }

    fn hit_tolerance(&self) -> f64 {
        self.config.hit_tolerance / self.navigator.zoom
    }

    fn handle_radius(&self) -> f64 {
        self.config.handle_radius / self.navigator.zoom
    }

    pub fn active_tool(&self) -> ToolKind {
        self.session.active_tool()
    }

    /// Switch tools. Any open menu closes and an open edit is committed.
    pub fn set_active_tool(&mut self, tool: ToolKind) {
        if tool == self.session.active_tool() {
            return;
        }
        self.menu = None;
        self.commit_edit();
        self.gesture = Gesture::Idle;
        self.session.set_active_tool(tool);
        log::debug!("Active tool: {tool:?}");
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.input.set_modifiers(modifiers);
    }

    // ----- Pointer input -----

    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        self.handle_pointer_event_at(event, Instant::now());
    }

    /// Process a pointer event that happened at `now` (screen coordinates).
    pub fn handle_pointer_event_at(&mut self, event: PointerEvent, now: Instant) {
        self.input.handle_pointer_event_at(event, now);
        match event {
            PointerEvent::Down { position, button } => self.pointer_down(position, button),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { .. } => self.pointer_up(),
            PointerEvent::Scroll { delta, .. } => self.scroll(delta),
        }
    }

    fn pointer_down(&mut self, screen: Point, button: MouseButton) {
        // Single active pointer.
        if self.gesture != Gesture::Idle {
            return;
        }
        self.menu = None;
        if let Some(edit) = self.session.editing() {
            // The host's input overlay owns presses inside it.
            if edit.screen_rect.contains(screen) {
                return;
            }
            self.commit_edit();
        }

        let tool = self.session.active_tool();
        if button == MouseButton::Middle || (tool == ToolKind::Pan && button == MouseButton::Left) {
            self.gesture = Gesture::Panning { last: screen };
            return;
        }

        let page = self.current_page();
        let point = self.to_page(screen);
        let hit = self
            .book
            .page(page)
            .and_then(|p| p.hit_test(point, self.hit_tolerance()));

        // Table cells win over every tool but Pan.
        let cell = hit.and_then(|id| Some((id, self.book.table(id)?.cell_at(point)?)));
        if let Some((id, cell)) = cell {
            self.table_pointer_down(id, cell, screen, button);
            return;
        }
        if button != MouseButton::Left {
            return;
        }

        match tool {
            ToolKind::Select => self.select_down(point, hit),
            ToolKind::Pan => {}
            ToolKind::Text => self.text_down(page, point, hit),
            ToolKind::Shape => match hit {
                Some(id) => self.select(id),
                None => {
                    let shape = Shape::new(self.settings.shape_kind, point)
                        .with_fill(self.settings.shape_fill);
                    if let Some(id) = self.insert_object(page, shape.into()) {
                        self.select(id);
                    }
                }
            },
            ToolKind::Brush | ToolKind::Eraser => self.stroke_down(page, point, tool),
            ToolKind::StickyNote => self.note_down(page, point, hit),
            ToolKind::Table => match hit {
                Some(id) => self.select(id),
                None => {
                    let defaults = &self.settings.table;
                    let mut table = Table::new(
                        point,
                        defaults.rows,
                        defaults.cols,
                        defaults.cell_width,
                        defaults.cell_height,
                    );
                    table.border_color = defaults.border_color;
                    table.border_width = defaults.border_width;
                    if let Some(id) = self.insert_object(page, table.into()) {
                        self.select(id);
                    }
                }
            },
            ToolKind::Pen => self.pen_down(page, point),
        }
    }

    fn select_down(&mut self, point: Point, hit: Option<ObjectId>) {
        if let Some((id, handle, bounds)) = self.selection_handle_at(point) {
            self.gesture = match handle {
                HandleKind::Rotate => Gesture::Rotating {
                    id,
                    original: bounds,
                    committed: false,
                },
                _ => Gesture::Resizing {
                    id,
                    handle,
                    original: bounds,
                    committed: false,
                },
            };
            return;
        }
        let Some(id) = hit else {
            self.clear_selection();
            return;
        };
        self.select(id);
        if self.input.is_double_click() && self.begin_object_edit(id) {
            return;
        }
        if self.book.object(id).is_some_and(|o| !o.is_locked()) {
            self.gesture = Gesture::Dragging {
                id,
                last: point,
                committed: false,
            };
        }
    }

    fn text_down(&mut self, page: usize, point: Point, hit: Option<ObjectId>) {
        if let Some(id) = hit {
            self.select(id);
            self.begin_object_edit(id);
            return;
        }
        let mut text = Text::new(point, self.settings.placeholder_text.clone());
        text.font_family.clone_from(&self.settings.font_family);
        text.font_size = self.settings.font_size;
        text.color = self.settings.text_color;
        if let Some(id) = self.insert_object(page, text.into()) {
            self.select(id);
            self.begin_object_edit(id);
        }
    }

    fn stroke_down(&mut self, page: usize, point: Point, tool: ToolKind) {
        let mut stroke = if tool == ToolKind::Eraser {
            Stroke::new(StrokeTool::Erase, self.settings.stroke_color, self.settings.eraser_width)
        } else {
            Stroke::new(StrokeTool::Draw, self.settings.stroke_color, self.settings.stroke_width)
        };
        stroke.add_point(point);
        if let Some(id) = self.insert_object(page, stroke.into()) {
            self.gesture = Gesture::Stroking { id };
        }
    }

    fn note_down(&mut self, page: usize, point: Point, hit: Option<ObjectId>) {
        match hit.and_then(|id| self.book.object(id)) {
            Some(Object::StickyNote(note)) => {
                let id = note.id();
                self.select(id);
                if note.expanded {
                    self.begin_object_edit(id);
                } else {
                    self.mutate(|book| {
                        book.update_object_with(id, |object| {
                            if let Object::StickyNote(n) = object {
                                n.expand();
                            }
                        })
                    });
                }
            }
            Some(other) => self.select(other.id()),
            None => {
                let mut note = StickyNote::new(point);
                note.background = self.settings.note_background;
                note.text_color = self.settings.note_text_color;
                if let Some(id) = self.insert_object(page, note.into()) {
                    self.select(id);
                }
            }
        }
    }

    fn pen_down(&mut self, page: usize, point: Point) {
        let settings = self.settings.pen.clone();
        if settings.mode == PenMode::Polygon {
            // Vertex 0 stays clickable so the shape can snap closed.
            let handles = vertex_handles(self.pen.vertices(page));
            if let Some(HandleKind::Vertex(index @ 1..)) =
                hit_test_handle(&handles, point, self.handle_radius())
            {
                self.gesture = Gesture::PenVertex { page, index };
                return;
            }
        } else {
            self.gesture = Gesture::PenFreehand { page };
        }
        let outcome = self.pen.pointer_down(page, point, &settings);
        self.apply_pen_outcome(page, outcome);
    }

    fn apply_pen_outcome(&mut self, page: usize, outcome: PenOutcome) {
        if let PenOutcome::Completed(stroke) = outcome {
            self.insert_object(page, stroke.into());
        }
    }

    fn table_pointer_down(
        &mut self,
        id: ObjectId,
        (row, col): (usize, usize),
        screen: Point,
        button: MouseButton,
    ) {
        self.select(id);
        let Some(table) = self.book.table(id) else {
            return;
        };
        let locked = table.locked;
        let (row, col) = table.anchor_of(row, col);
        // Cell selection is view state; it does not enter history.
        self.book.update_table(id, |t| t.select_cell(row, col));

        match button {
            MouseButton::Right => {
                self.menu = Some(ContextMenu {
                    table_id: id,
                    row,
                    col,
                    screen_position: screen,
                });
            }
            MouseButton::Left if self.input.is_double_click() && !locked => {
                let page = self.current_page();
                let edit = self
                    .book
                    .table(id)
                    .and_then(|t| begin_cell_edit(t, page, row, col, &self.navigator));
                if let Some(edit) = edit {
                    self.open_edit(edit);
                }
            }
            MouseButton::Left if self.session.active_tool() == ToolKind::Select && !locked => {
                self.gesture = Gesture::Dragging {
                    id,
                    last: self.to_page(screen),
                    committed: false,
                };
            }
            _ => {}
        }
    }

    fn selection_handle_at(&self, point: Point) -> Option<(ObjectId, HandleKind, Rect)> {
        let object = self.selected_object()?;
        let handles = object_handles(&object);
        let kind = hit_test_handle(&handles, point, self.handle_radius())?;
        Some((object.id(), kind, object.bounds()))
    }

    fn pointer_move(&mut self, screen: Point) {
        let point = self.to_page(screen);
        let mut gesture = std::mem::take(&mut self.gesture);
        match &mut gesture {
            Gesture::Idle => {
                let hovered = self
                    .book
                    .page(self.current_page())
                    .and_then(|p| p.hit_test(point, self.hit_tolerance()));
                self.session.set_hovered(hovered);
            }
            Gesture::Panning { last } => {
                self.navigator.pan_by(screen - *last);
                *last = screen;
            }
            Gesture::Dragging {
                id,
                last,
                committed,
            } => {
                let delta = point - *last;
                if delta != Vec2::ZERO {
                    self.commit_once(committed);
                    self.book.update_object_with(*id, |o| o.translate(delta));
                    *last = point;
                }
            }
            Gesture::Resizing {
                id,
                handle,
                original,
                committed,
            } => {
                let rect = resize_bounds(*original, *handle, point);
                self.commit_once(committed);
                let patch = ObjectPatch {
                    position: Some(rect.origin()),
                    size: Some(rect.size()),
                    ..ObjectPatch::default()
                };
                self.book.update_object(*id, &patch);
            }
            Gesture::Rotating {
                id,
                original,
                committed,
            } => {
                self.commit_once(committed);
                let rotation = rotation_towards(*original, point);
                self.book.update_object(*id, &ObjectPatch::rotation(rotation));
            }
            Gesture::Stroking { id } => {
                self.book.update_object_with(*id, |o| {
                    if let Object::Stroke(stroke) = o {
                        stroke.add_point(point);
                    }
                });
            }
            Gesture::PenFreehand { page } => {
                self.pen.pointer_move(*page, point);
            }
            Gesture::PenVertex { page, index } => {
                self.pen.move_vertex(*page, *index, point);
            }
        }
        self.gesture = gesture;
    }

    fn pointer_up(&mut self) {
        match std::mem::take(&mut self.gesture) {
            Gesture::Stroking { id } => log::debug!("Finished stroke {id}"),
            Gesture::PenFreehand { page } => {
                let settings = self.settings.pen.clone();
                let outcome = self.pen.pointer_up(page, &settings);
                self.apply_pen_outcome(page, outcome);
            }
            Gesture::Dragging {
                id,
                committed: true,
                ..
            } => log::debug!("Moved {id}"),
            _ => {}
        }
    }

    /// Ctrl+scroll zooms, plain scroll pans.
    fn scroll(&mut self, delta: Vec2) {
        if self.input.modifiers.ctrl {
            if delta.y < 0.0 {
                self.navigator.zoom_in();
            } else if delta.y > 0.0 {
                self.navigator.zoom_out();
            }
        } else {
            self.navigator.pan_by(-delta);
        }
    }

    // ----- Keyboard and semantic actions -----

    /// Resolve a key through the keymap and perform it. Returns whether the
    /// key was handled.
    pub fn handle_key(&mut self, combo: &KeyCombo) -> bool {
        match self.keymap.resolve(combo) {
            Some(action) => self.perform(action),
            None => false,
        }
    }

    /// Perform a semantic action. While an in-place editor is open only
    /// commit, cancel and backspace reach it; everything else is ignored.
    pub fn perform(&mut self, action: EditorAction) -> bool {
        if self.session.is_editing() {
            return match action {
                EditorAction::Escape => self.cancel_edit(),
                EditorAction::CommitEdit => {
                    self.commit_edit();
                    true
                }
                EditorAction::Backspace => self
                    .session
                    .editing_mut()
                    .is_some_and(EditSession::delete_back),
                _ => false,
            };
        }

        match action {
            EditorAction::ToggleBold => self.toggle_format(TextFormat::Bold),
            EditorAction::ToggleItalic => self.toggle_format(TextFormat::Italic),
            EditorAction::ToggleUnderline => self.toggle_format(TextFormat::Underline),
            EditorAction::ToggleStrikethrough => self.toggle_format(TextFormat::Strikethrough),
            EditorAction::Copy => self.copy(),
            EditorAction::Cut => self.cut(),
            EditorAction::Paste => self.paste().is_some(),
            EditorAction::Delete => self.delete_selected(),
            EditorAction::Backspace => {
                let page = self.current_page();
                if self.session.active_tool() == ToolKind::Pen && self.pen.has_draft(page) {
                    self.pen.backspace(page)
                } else {
                    self.delete_selected()
                }
            }
            EditorAction::Undo => self.undo(),
            EditorAction::Redo => self.redo(),
            EditorAction::Escape => {
                self.escape();
                true
            }
            EditorAction::CompleteShape => self.complete_pen_shape().is_some(),
            EditorAction::CommitEdit => false,
            EditorAction::Duplicate => self.duplicate_selected().is_some(),
            EditorAction::ToggleLock => self
                .session
                .selected()
                .is_some_and(|id| self.mutate(|book| book.toggle_lock(id).is_some())),
            EditorAction::ToggleVisibility => self
                .session
                .selected()
                .is_some_and(|id| self.mutate(|book| book.toggle_visibility(id).is_some())),
            EditorAction::BringForward => self.reorder_selected(ZDirection::Forward),
            EditorAction::SendBackward => self.reorder_selected(ZDirection::Backward),
            EditorAction::ZoomIn => {
                self.navigator.zoom_in();
                true
            }
            EditorAction::ZoomOut => {
                self.navigator.zoom_out();
                true
            }
            EditorAction::ResetView => {
                self.navigator.reset_view();
                true
            }
            EditorAction::NextPage => self.flip_next(),
            EditorAction::PrevPage => self.flip_prev(),
            EditorAction::IncreaseStrokeWidth => self.nudge_stroke_width(1.0),
            EditorAction::DecreaseStrokeWidth => self.nudge_stroke_width(-1.0),
        }
    }

    /// Cancel whatever is transient: the menu, an edit, the pen draft and
    /// the selection. Never touches the book.
    pub fn escape(&mut self) {
        self.menu = None;
        self.cancel_edit();
        let page = self.current_page();
        if self.pen.cancel(page)
            && matches!(
                self.gesture,
                Gesture::PenFreehand { .. } | Gesture::PenVertex { .. }
            )
        {
            self.gesture = Gesture::Idle;
        }
        self.clear_selection();
    }

    fn toggle_format(&mut self, format: TextFormat) -> bool {
        let Some(id) = self.session.selected() else {
            return false;
        };
        match self.selected_object() {
            Some(Object::Text(text)) if !text.locked => self.mutate(|book| {
                book.update_object_with(id, |object| {
                    if let Object::Text(t) = object {
                        t.toggle_format(format);
                    }
                })
            }),
            Some(Object::Table(table)) if !table.locked => {
                let Some(cell) = table
                    .selected_cell
                    .and_then(|(row, col)| table.cell(row, col))
                else {
                    return false;
                };
                let patch = match format {
                    TextFormat::Bold => CellFormat {
                        bold: Some(!cell.bold),
                        ..CellFormat::default()
                    },
                    TextFormat::Italic => CellFormat {
                        italic: Some(!cell.italic),
                        ..CellFormat::default()
                    },
                    _ => return false,
                };
                self.format_selected_cell(&patch)
            }
            _ => false,
        }
    }

    /// Apply formatting to the selected cell of the selected table.
    pub fn format_selected_cell(&mut self, format: &CellFormat) -> bool {
        let Some(Object::Table(table)) = self.selected_object() else {
            return false;
        };
        let Some((row, col)) = table.selected_cell.filter(|_| !table.locked) else {
            return false;
        };
        let id = table.id();
        self.mutate(|book| {
            book.update_table(id, |t| t.format_cell(row, col, format))
                .unwrap_or(false)
        })
    }

    pub fn copy(&mut self) -> bool {
        match self.selected_object() {
            Some(object) => {
                self.session.clipboard.copy(object);
                true
            }
            None => false,
        }
    }

    pub fn cut(&mut self) -> bool {
        if self.selected_unlocked().is_none() {
            return false;
        }
        self.copy() && self.delete_selected()
    }

    /// Paste the clipboard onto the current page and select the copy.
    pub fn paste(&mut self) -> Option<ObjectId> {
        let object = self.session.clipboard.paste(self.config.duplicate_offset)?;
        let id = self.insert_object(self.current_page(), object)?;
        self.select(id);
        Some(id)
    }

    /// Delete the selected object unless it is locked.
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selected_unlocked() else {
            return false;
        };
        if !self.mutate(|book| book.delete_object(id).is_some()) {
            return false;
        }
        log::debug!("Deleted {id}");
        self.session.forget(id);
        if self.menu.as_ref().is_some_and(|m| m.table_id == id) {
            self.menu = None;
        }
        self.emit(EditorEvent::SelectionChanged(None));
        true
    }

    pub fn duplicate_selected(&mut self) -> Option<ObjectId> {
        let id = self.selected_object()?.id();
        let before = self.book.snapshot();
        let copy = self.book.duplicate_object(id, self.config.duplicate_offset)?;
        self.commit(before);
        self.select(copy);
        Some(copy)
    }

    fn reorder_selected(&mut self, direction: ZDirection) -> bool {
        self.session
            .selected()
            .is_some_and(|id| self.mutate(|book| book.reorder(id, direction)))
    }

    fn nudge_stroke_width(&mut self, delta: f64) -> bool {
        let before = self.settings.stroke_width;
        let width = self.settings.nudge_stroke_width(delta);
        if width == before {
            return false;
        }
        self.emit(EditorEvent::StrokeWidthChanged(width));
        true
    }

    // ----- History -----

    pub fn undo(&mut self) -> bool {
        self.cancel_edit();
        let Some(snapshot) = self.history.undo(self.book.snapshot()) else {
            return false;
        };
        self.book.restore(snapshot);
        log::debug!("Undo ({} left)", self.history.undo_len());
        self.after_restore();
        true
    }

    pub fn redo(&mut self) -> bool {
        self.cancel_edit();
        let Some(snapshot) = self.history.redo(self.book.snapshot()) else {
            return false;
        };
        self.book.restore(snapshot);
        log::debug!("Redo ({} left)", self.history.redo_len());
        self.after_restore();
        true
    }

    /// Bring view state back in line with a restored book.
    fn after_restore(&mut self) {
        self.gesture = Gesture::Idle;
        if self.book.page_count() != self.navigator.page_count() {
            let before = self.current_page();
            self.navigator.set_page_count(self.book.page_count());
            self.emit(EditorEvent::PageCountChanged(self.book.page_count()));
            self.sync_page(before);
        }
        self.drop_stale_refs();
        self.emit_history();
    }

    /// Forget selection, hover, edit and menu targets that left the book.
    fn drop_stale_refs(&mut self) {
        let edit_target = self.session.editing().map(|edit| edit.target);
        if edit_target.is_some_and(|id| self.book.object(id).is_none()) {
            self.cancel_edit();
        }
        if self.session.selected().is_some() && self.selected_object().is_none() {
            self.clear_selection();
        }
        let hovered = self.session.hovered();
        if hovered.is_some_and(|id| self.book.object(id).is_none()) {
            self.session.set_hovered(None);
        }
        let menu_target = self.menu.as_ref().map(|m| m.table_id);
        if menu_target.is_some_and(|id| self.book.table(id).is_none()) {
            self.menu = None;
        }
    }

    // ----- In-place editing -----

    fn open_edit(&mut self, edit: EditSession) {
        let target = edit.target;
        self.select(target);
        if let Some(previous) = self.session.begin_edit(edit) {
            log::warn!("Replacing open edit on {}", previous.target);
        }
        self.emit(EditorEvent::EditingChanged(Some(target)));
    }

    /// Open the text or note editor for an object. Returns false when the
    /// object has no in-place editor or is locked.
    fn begin_object_edit(&mut self, id: ObjectId) -> bool {
        let page = self.current_page();
        let edit = match self.book.object(id) {
            Some(Object::Text(text)) if !text.locked => {
                let rect = self.screen_rect(text.bounds());
                EditSession::new(id, page, EditingKind::Text, text.content, rect)
            }
            Some(Object::StickyNote(note)) if !note.locked && note.expanded => {
                let rect = self.screen_rect(note.bounds());
                EditSession::new(id, page, EditingKind::StickyNote, note.text, rect)
            }
            _ => return false,
        };
        self.open_edit(edit);
        true
    }

    /// Append typed text to the open editor.
    pub fn type_text(&mut self, text: &str) -> bool {
        match self.session.editing_mut() {
            Some(edit) => {
                edit.insert_text(text);
                true
            }
            None => false,
        }
    }

    /// Replace the open editor's draft.
    pub fn set_edit_text(&mut self, text: &str) -> bool {
        match self.session.editing_mut() {
            Some(edit) => {
                edit.draft = text.to_string();
                true
            }
            None => false,
        }
    }

    /// Write the open edit back to the book. Returns whether the book changed.
    pub fn commit_edit(&mut self) -> bool {
        let Some(edit) = self.session.end_edit() else {
            return false;
        };
        self.emit(EditorEvent::EditingChanged(None));
        if !edit.is_dirty() {
            return false;
        }
        match edit.kind {
            EditingKind::Text | EditingKind::StickyNote => self.mutate(|book| {
                book.update_object(edit.target, &ObjectPatch::content(edit.draft.clone()))
            }),
            EditingKind::TableCell { .. } => self.mutate(|book| commit_cell_edit(book, &edit)),
        }
    }

    /// Close the open editor without writing. Returns whether one was open.
    pub fn cancel_edit(&mut self) -> bool {
        if self.session.end_edit().is_none() {
            return false;
        }
        self.emit(EditorEvent::EditingChanged(None));
        true
    }

    // ----- Table menu -----

    /// Run a context menu action and close the menu.
    pub fn apply_table_action(&mut self, action: TableAction) -> bool {
        let Some(menu) = self.menu.take() else {
            return false;
        };
        if self.book.object(menu.table_id).is_none_or(|o| o.is_locked()) {
            return false;
        }
        let applied = self.mutate(|book| apply_menu_action(book, &menu, action));
        if !applied {
            log::debug!("Table action {action:?} refused");
        }
        applied
    }

    // ----- Pen -----

    /// Close the current page's polygon draft.
    pub fn complete_pen_shape(&mut self) -> Option<ObjectId> {
        let page = self.current_page();
        let settings = self.settings.pen.clone();
        let stroke = self.pen.complete(page, &settings)?;
        self.insert_object(page, stroke.into())
    }

    /// Live preview of the current page's pen draft.
    pub fn pen_preview(&self) -> Option<Stroke> {
        self.pen.preview(self.current_page(), &self.settings.pen)
    }

    /// Vertex handles of the polygon draft on the current page.
    pub fn pen_handles(&self) -> Vec<Handle> {
        vertex_handles(self.pen.vertices(self.current_page()))
    }

    /// Handles of the selected object.
    pub fn selection_handles(&self) -> Vec<Handle> {
        self.selected_object()
            .map(|object| object_handles(&object))
            .unwrap_or_default()
    }

    // ----- Pages -----

    /// Append pages. Undoable.
    pub fn add_pages(&mut self, count: usize) -> Range<usize> {
        let before = self.book.snapshot();
        let added = self.book.add_pages(count);
        if !added.is_empty() {
            self.commit(before);
            self.navigator.set_page_count(self.book.page_count());
            self.emit(EditorEvent::PageCountChanged(self.book.page_count()));
        }
        added
    }

    /// Replace one page field. Replacing an object list can remove the
    /// selected or edited object, so those references are dropped.
    pub fn update_page_field(&mut self, index: usize, field: PageField) -> bool {
        let changed = self.mutate(|book| book.update_page_field(index, field));
        if changed {
            self.drop_stale_refs();
        }
        changed
    }

    /// Partial attribute update from the toolbar.
    pub fn update_object(&mut self, id: ObjectId, patch: &ObjectPatch) -> bool {
        self.mutate(|book| book.update_object(id, patch))
    }

    pub fn flip_next(&mut self) -> bool {
        let before = self.current_page();
        let started = self.navigator.flip_next();
        self.sync_page(before);
        started
    }

    pub fn flip_prev(&mut self) -> bool {
        let before = self.current_page();
        let started = self.navigator.flip_prev();
        self.sync_page(before);
        started
    }

    pub fn go_to_page(&mut self, index: usize) -> bool {
        let before = self.current_page();
        let moved = self.navigator.go_to_page(index);
        self.sync_page(before);
        moved
    }

    /// Advance animations by `dt` seconds.
    pub fn tick(&mut self, dt: f64) {
        if self.navigator.advance(dt).is_some() {
            self.on_page_changed();
        }
    }

    fn sync_page(&mut self, before: usize) {
        if self.current_page() != before {
            self.on_page_changed();
        }
    }

    fn on_page_changed(&mut self) {
        self.commit_edit();
        self.menu = None;
        self.gesture = Gesture::Idle;
        self.session.set_hovered(None);
        self.clear_selection();
        let page = self.current_page();
        log::debug!("Now on page {page}");
        self.emit(EditorEvent::PageChanged(page));
    }

    // ----- Images -----

    /// Reserve a spot for an image being uploaded.
    pub fn begin_image_upload(&mut self, position: Point) -> PendingImage {
        self.next_upload += 1;
        self.uploads.insert(self.next_upload);
        PendingImage {
            ticket: self.next_upload,
            page: self.current_page(),
            position,
        }
    }

    /// Place a finished upload. Failures become a notice and insert nothing.
    pub fn complete_image_upload(
        &mut self,
        pending: PendingImage,
        result: Result<UploadedImage, UploadError>,
    ) -> Option<ObjectId> {
        if !self.uploads.remove(&pending.ticket) {
            log::warn!("Ignoring unknown upload ticket {}", pending.ticket);
            return None;
        }
        let uploaded = match result {
            Ok(uploaded) => uploaded,
            Err(e) => {
                log::warn!("Image upload failed: {e}");
                self.emit(EditorEvent::Notice(Notice::error(format!("Could not add image: {e}"))));
                return None;
            }
        };
        if pending.page >= self.book.page_count() {
            log::warn!("Dropping image for removed page {}", pending.page);
            self.emit(EditorEvent::Notice(Notice::warning("The page for this image no longer exists")));
            return None;
        }
        let image = Image::new(
            pending.position,
            uploaded.source,
            f64::from(uploaded.width),
            f64::from(uploaded.height),
        )
        .fit_within(self.config.image_max_side);
        let id = self.insert_object(pending.page, image.into())?;
        if pending.page == self.current_page() {
            self.select(id);
        }
        Some(id)
    }

    /// Forget an upload the host gave up on.
    pub fn cancel_image_upload(&mut self, pending: &PendingImage) -> bool {
        self.uploads.remove(&pending.ticket)
    }
}
