//! Tables: a rows x cols grid of cells.
//!
//! Row/column counts change in two ways with different anchoring:
//! `set_rows`/`set_cols` grow by appending and shrink by truncating from the
//! end, while the insert/delete/merge operations act relative to the
//! selected cell (falling back to index 0 when nothing is selected).

use super::{ObjectId, ObjectTrait, SerializableColor, TextAlign};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Vertical alignment within a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VerticalAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// Where a new row goes relative to the selected cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowPosition {
    Above,
    Below,
}

/// Where a new column goes relative to the selected cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnPosition {
    Left,
    Right,
}

/// One grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cell {
    pub text: String,
    pub font_family: String,
    pub font_size: f64,
    pub bold: bool,
    pub italic: bool,
    pub color: SerializableColor,
    pub align: TextAlign,
    pub vertical_align: VerticalAlign,
    pub background: Option<SerializableColor>,
    pub row_span: Option<usize>,
    pub col_span: Option<usize>,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_family: "Arial".to_string(),
            font_size: 14.0,
            bold: false,
            italic: false,
            color: SerializableColor::black(),
            align: TextAlign::Left,
            vertical_align: VerticalAlign::Middle,
            background: None,
            row_span: None,
            col_span: None,
        }
    }
}

impl Cell {
    pub fn row_span(&self) -> usize {
        self.row_span.unwrap_or(1).max(1)
    }

    pub fn col_span(&self) -> usize {
        self.col_span.unwrap_or(1).max(1)
    }
}

/// Partial formatting update for a cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellFormat {
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub color: Option<SerializableColor>,
    pub align: Option<TextAlign>,
    pub vertical_align: Option<VerticalAlign>,
    /// `Some(None)` clears the background.
    pub background: Option<Option<SerializableColor>>,
}

impl CellFormat {
    fn apply(&self, cell: &mut Cell) {
        if let Some(family) = &self.font_family {
            cell.font_family.clone_from(family);
        }
        if let Some(size) = self.font_size {
            cell.font_size = size;
        }
        if let Some(bold) = self.bold {
            cell.bold = bold;
        }
        if let Some(italic) = self.italic {
            cell.italic = italic;
        }
        if let Some(color) = self.color {
            cell.color = color;
        }
        if let Some(align) = self.align {
            cell.align = align;
        }
        if let Some(valign) = self.vertical_align {
            cell.vertical_align = valign;
        }
        if let Some(background) = self.background {
            cell.background = background;
        }
    }
}

/// A table placed on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub(crate) id: ObjectId,
    pub position: Point,
    pub rows: usize,
    pub cols: usize,
    pub cell_width: f64,
    pub cell_height: f64,
    pub border_color: SerializableColor,
    pub border_width: f64,
    pub fill: Option<SerializableColor>,
    /// `cells[row][col]`; always `rows` x `cols`.
    pub cells: Vec<Vec<Cell>>,
    #[serde(default)]
    pub selected_cell: Option<(usize, usize)>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default = "super::text::default_visible")]
    pub visible: bool,
}

impl Table {
    pub const DEFAULT_ROWS: usize = 3;
    pub const DEFAULT_COLS: usize = 3;
    pub const DEFAULT_CELL_WIDTH: f64 = 100.0;
    pub const DEFAULT_CELL_HEIGHT: f64 = 40.0;

    /// Create a table of empty cells. Counts below 1 are raised to 1.
    pub fn new(position: Point, rows: usize, cols: usize, cell_width: f64, cell_height: f64) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            id: Uuid::new_v4(),
            position,
            rows,
            cols,
            cell_width,
            cell_height,
            border_color: SerializableColor::black(),
            border_width: 1.0,
            fill: Some(SerializableColor::white()),
            cells: vec![vec![Cell::default(); cols]; rows],
            selected_cell: None,
            locked: false,
            visible: true,
        }
    }

    pub fn width(&self) -> f64 {
        self.cols as f64 * self.cell_width
    }

    pub fn height(&self) -> f64 {
        self.rows as f64 * self.cell_height
    }

    /// Whether the cell array matches the row/column counts.
    pub fn is_consistent(&self) -> bool {
        self.cells.len() == self.rows && self.cells.iter().all(|row| row.len() == self.cols)
    }

    /// Bring a loaded table back to a `rows` x `cols` grid.
    ///
    /// Missing cells are filled with empty ones, extra cells are dropped and
    /// spans are cut at the grid edge. Returns whether anything changed.
    pub fn repair(&mut self) -> bool {
        let before = (self.rows, self.cols, self.selected_cell);
        let consistent = self.is_consistent();
        self.rows = self.rows.max(1);
        self.cols = self.cols.max(1);
        let (rows, cols) = (self.rows, self.cols);
        self.cells.resize_with(rows, Vec::new);
        let mut spans_cut = false;
        for (r, row) in self.cells.iter_mut().enumerate() {
            row.resize_with(cols, Cell::default);
            for (c, cell) in row.iter_mut().enumerate() {
                if cell.row_span() > rows - r {
                    cell.row_span = Some(rows - r);
                    spans_cut = true;
                }
                if cell.col_span() > cols - c {
                    cell.col_span = Some(cols - c);
                    spans_cut = true;
                }
            }
        }
        self.drop_stale_selection();
        !consistent || spans_cut || before != (self.rows, self.cols, self.selected_cell)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(row).and_then(|r| r.get(col))
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        self.cells.get_mut(row).and_then(|r| r.get_mut(col))
    }

    /// Select a cell. Returns false (and leaves the selection alone) when out of range.
    pub fn select_cell(&mut self, row: usize, col: usize) -> bool {
        if row < self.rows && col < self.cols {
            self.selected_cell = Some((row, col));
            true
        } else {
            false
        }
    }

    fn drop_stale_selection(&mut self) {
        if let Some((r, c)) = self.selected_cell {
            if r >= self.rows || c >= self.cols {
                self.selected_cell = None;
            }
        }
    }

    /// Set the row count: grow appends empty rows, shrink truncates from the end.
    pub fn set_rows(&mut self, rows: usize) {
        let rows = rows.max(1);
        let cols = self.cols;
        self.cells.resize_with(rows, || vec![Cell::default(); cols]);
        self.rows = rows;
        self.drop_stale_selection();
    }

    /// Set the column count: grow appends empty cells, shrink truncates from the end.
    pub fn set_cols(&mut self, cols: usize) {
        let cols = cols.max(1);
        for row in &mut self.cells {
            row.resize_with(cols, Cell::default);
        }
        self.cols = cols;
        self.drop_stale_selection();
    }

    /// Insert an empty row next to the selected cell's row; returns its index.
    pub fn insert_row(&mut self, position: RowPosition) -> usize {
        let anchor = self.selected_cell.map_or(0, |(r, _)| r);
        let index = match position {
            RowPosition::Above => anchor,
            RowPosition::Below => anchor + 1,
        }
        .min(self.rows);
        self.cells.insert(index, vec![Cell::default(); self.cols]);
        self.rows += 1;
        index
    }

    /// Insert an empty column next to the selected cell's column; returns its index.
    pub fn insert_column(&mut self, position: ColumnPosition) -> usize {
        let anchor = self.selected_cell.map_or(0, |(_, c)| c);
        let index = match position {
            ColumnPosition::Left => anchor,
            ColumnPosition::Right => anchor + 1,
        }
        .min(self.cols);
        for row in &mut self.cells {
            row.insert(index, Cell::default());
        }
        self.cols += 1;
        index
    }

    /// Remove the selected row. Refused when only one row is left.
    pub fn delete_row(&mut self) -> bool {
        if self.rows <= 1 {
            return false;
        }
        let index = self.selected_cell.map_or(0, |(r, _)| r).min(self.rows - 1);
        self.cells.remove(index);
        self.rows -= 1;
        self.selected_cell = None;
        true
    }

    /// Remove the selected column. Refused when only one column is left.
    pub fn delete_column(&mut self) -> bool {
        if self.cols <= 1 {
            return false;
        }
        let index = self.selected_cell.map_or(0, |(_, c)| c).min(self.cols - 1);
        for row in &mut self.cells {
            row.remove(index);
        }
        self.cols -= 1;
        self.selected_cell = None;
        true
    }

    /// Merge the fixed 2x2 block whose top-left is the selected cell.
    ///
    /// The selected cell's spans each grow by one and the other three cells
    /// of the block are reset to empty. Refused without a selection or when
    /// the block would leave the grid.
    pub fn merge_cells(&mut self) -> bool {
        let Some((row, col)) = self.selected_cell else {
            return false;
        };
        if row + 1 >= self.rows || col + 1 >= self.cols || !self.is_consistent() {
            return false;
        }

        let anchor = &mut self.cells[row][col];
        anchor.row_span = Some(anchor.row_span() + 1);
        anchor.col_span = Some(anchor.col_span() + 1);
        for (r, c) in [(row, col + 1), (row + 1, col), (row + 1, col + 1)] {
            self.cells[r][c] = Cell::default();
        }
        true
    }

    /// Replace a cell's text. Returns false when out of range.
    pub fn set_cell_text(&mut self, row: usize, col: usize, text: impl Into<String>) -> bool {
        match self.cell_mut(row, col) {
            Some(cell) => {
                cell.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Apply formatting to one cell. Returns false when out of range.
    pub fn format_cell(&mut self, row: usize, col: usize, format: &CellFormat) -> bool {
        match self.cell_mut(row, col) {
            Some(cell) => {
                format.apply(cell);
                true
            }
            None => false,
        }
    }

    /// The cell whose span covers (row, col): itself or a merged anchor.
    pub fn anchor_of(&self, row: usize, col: usize) -> (usize, usize) {
        for r in (0..=row.min(self.rows.saturating_sub(1))).rev() {
            for c in (0..=col.min(self.cols.saturating_sub(1))).rev() {
                if (r, c) == (row, col) {
                    continue;
                }
                if let Some(cell) = self.cell(r, c) {
                    if r + cell.row_span() > row && c + cell.col_span() > col {
                        return (r, c);
                    }
                }
            }
        }
        (row, col)
    }

    /// Page-space rectangle of a cell, including its spans.
    pub fn cell_rect(&self, row: usize, col: usize) -> Option<Rect> {
        let cell = self.cell(row, col)?;
        let x = self.position.x + col as f64 * self.cell_width;
        let y = self.position.y + row as f64 * self.cell_height;
        let cols = cell.col_span().min(self.cols.saturating_sub(col)).max(1);
        let rows = cell.row_span().min(self.rows.saturating_sub(row)).max(1);
        Some(Rect::new(
            x,
            y,
            x + cols as f64 * self.cell_width,
            y + rows as f64 * self.cell_height,
        ))
    }

    /// The (anchor) cell under a page-space point.
    pub fn cell_at(&self, point: Point) -> Option<(usize, usize)> {
        if !self.bounds().contains(point) || self.cell_width <= 0.0 || self.cell_height <= 0.0 {
            return None;
        }
        let col = ((point.x - self.position.x) / self.cell_width).floor() as usize;
        let row = ((point.y - self.position.y) / self.cell_height).floor() as usize;
        let (row, col) = (row.min(self.rows - 1), col.min(self.cols - 1));
        Some(self.anchor_of(row, col))
    }
}

impl ObjectTrait for Table {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, (self.width(), self.height()))
    }

    fn is_locked(&self) -> bool {
        self.locked
    }

    fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}
