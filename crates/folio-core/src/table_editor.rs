//! Table interaction: in-place cell editing and the row/column context menu.

use crate::book::Book;
use crate::navigation::Navigator;
use crate::objects::{ColumnPosition, ObjectId, ObjectTrait, RowPosition, Table};
use crate::session::{EditSession, EditingKind};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Structural operations offered by the context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableAction {
    InsertRowAbove,
    InsertRowBelow,
    InsertColumnLeft,
    InsertColumnRight,
    DeleteRow,
    DeleteColumn,
    MergeCells,
}

impl TableAction {
    pub const ALL: [TableAction; 7] = [
        TableAction::InsertRowAbove,
        TableAction::InsertRowBelow,
        TableAction::InsertColumnLeft,
        TableAction::InsertColumnRight,
        TableAction::DeleteRow,
        TableAction::DeleteColumn,
        TableAction::MergeCells,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TableAction::InsertRowAbove => "Insert row above",
            TableAction::InsertRowBelow => "Insert row below",
            TableAction::InsertColumnLeft => "Insert column left",
            TableAction::InsertColumnRight => "Insert column right",
            TableAction::DeleteRow => "Delete row",
            TableAction::DeleteColumn => "Delete column",
            TableAction::MergeCells => "Merge cells",
        }
    }

    /// Whether the action would change `table`.
    pub fn is_enabled(self, table: &Table) -> bool {
        match self {
            TableAction::DeleteRow => table.rows > 1,
            TableAction::DeleteColumn => table.cols > 1,
            TableAction::MergeCells => table
                .selected_cell
                .is_some_and(|(r, c)| r + 1 < table.rows && c + 1 < table.cols),
            _ => true,
        }
    }

    /// Run the action. Returns false when the table refused it.
    pub fn apply(self, table: &mut Table) -> bool {
        match self {
            TableAction::InsertRowAbove => {
                table.insert_row(RowPosition::Above);
                true
            }
            TableAction::InsertRowBelow => {
                table.insert_row(RowPosition::Below);
                true
            }
            TableAction::InsertColumnLeft => {
                table.insert_column(ColumnPosition::Left);
                true
            }
            TableAction::InsertColumnRight => {
                table.insert_column(ColumnPosition::Right);
                true
            }
            TableAction::DeleteRow => table.delete_row(),
            TableAction::DeleteColumn => table.delete_column(),
            TableAction::MergeCells => table.merge_cells(),
        }
    }
}

/// An open context menu for one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    pub table_id: ObjectId,
    pub row: usize,
    pub col: usize,
    /// Where the host should show the menu.
    pub screen_position: Point,
}

impl ContextMenu {
    /// Menu entries with their enabled state.
    pub fn entries(&self, table: &Table) -> Vec<(TableAction, bool)> {
        TableAction::ALL
            .iter()
            .map(|&action| (action, action.is_enabled(table)))
            .collect()
    }
}

/// Screen-space rectangle of a cell, spans included.
pub fn cell_screen_rect(table: &Table, row: usize, col: usize, navigator: &Navigator) -> Option<Rect> {
    let rect = table.cell_rect(row, col)?;
    let top_left = navigator.page_to_screen(Point::new(rect.x0, rect.y0));
    let bottom_right = navigator.page_to_screen(Point::new(rect.x1, rect.y1));
    Some(Rect::from_points(top_left, bottom_right))
}

/// Open an editor over the cell, seeded with its current text.
pub fn begin_cell_edit(
    table: &Table,
    page: usize,
    row: usize,
    col: usize,
    navigator: &Navigator,
) -> Option<EditSession> {
    let (row, col) = table.anchor_of(row, col);
    let cell = table.cell(row, col)?;
    let screen_rect = cell_screen_rect(table, row, col, navigator)?;
    Some(EditSession::new(
        table.id(),
        page,
        EditingKind::TableCell { row, col },
        cell.text.clone(),
        screen_rect,
    ))
}

/// Write a cell edit back. Returns false when the target is gone.
pub fn commit_cell_edit(book: &mut Book, edit: &EditSession) -> bool {
    let EditingKind::TableCell { row, col } = edit.kind else {
        return false;
    };
    book.update_table(edit.target, |table| {
        table.set_cell_text(row, col, edit.draft.clone())
    })
    .unwrap_or(false)
}

/// Run a menu action against the book.
pub fn apply_menu_action(book: &mut Book, menu: &ContextMenu, action: TableAction) -> bool {
    book.update_table(menu.table_id, |table| {
        // Act on the cell the menu was opened for, even if an undo moved the selection.
        table.select_cell(menu.row, menu.col) && action.apply(table)
    })
    .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;

    fn book_with_table() -> (Book, ObjectId) {
        let mut book = Book::new(1);
        let id = book
            .add_object(0, Table::new(Point::new(10.0, 10.0), 3, 3, 100.0, 40.0).into())
            .unwrap();
        (book, id)
    }

    #[test]
    fn test_cell_edit_commit() {
        let (mut book, id) = book_with_table();
        let nav = Navigator::new(1, &EditorConfig::default());
        let table = book.table(id).unwrap().clone();
        let mut edit = begin_cell_edit(&table, 0, 1, 2, &nav).unwrap();
        assert_eq!(edit.screen_rect, Rect::new(210.0, 50.0, 310.0, 90.0));
        edit.insert_text("42");
        assert!(commit_cell_edit(&mut book, &edit));
        assert_eq!(book.table(id).unwrap().cell(1, 2).unwrap().text, "42");
    }

    #[test]
    fn test_cell_rect_follows_zoom() {
        let (book, id) = book_with_table();
        let mut nav = Navigator::new(1, &EditorConfig::default());
        nav.set_zoom(2.0);
        let rect = cell_screen_rect(book.table(id).unwrap(), 0, 0, &nav).unwrap();
        assert_eq!(rect, Rect::new(20.0, 20.0, 220.0, 100.0));
    }

    #[test]
    fn test_edit_inside_merged_block_targets_anchor() {
        let (mut book, id) = book_with_table();
        book.update_table(id, |t| {
            t.select_cell(0, 0);
            t.merge_cells()
        });
        let nav = Navigator::new(1, &EditorConfig::default());
        let edit = begin_cell_edit(book.table(id).unwrap(), 0, 1, 1, &nav).unwrap();
        assert_eq!(edit.kind, EditingKind::TableCell { row: 0, col: 0 });
    }

    #[test]
    fn test_menu_entries_reflect_guards() {
        let mut table = Table::new(Point::ZERO, 1, 2, 10.0, 10.0);
        table.select_cell(0, 0);
        let menu = ContextMenu {
            table_id: table.id(),
            row: 0,
            col: 0,
            screen_position: Point::ZERO,
        };
        let entries = menu.entries(&table);
        assert!(entries.contains(&(TableAction::DeleteRow, false)));
        assert!(entries.contains(&(TableAction::DeleteColumn, true)));
        assert!(entries.contains(&(TableAction::MergeCells, false)));
    }

    #[test]
    fn test_apply_menu_action() {
        let (mut book, id) = book_with_table();
        book.update_table(id, |t| t.select_cell(1, 1));
        let menu = ContextMenu {
            table_id: id,
            row: 1,
            col: 1,
            screen_position: Point::ZERO,
        };
        assert!(apply_menu_action(&mut book, &menu, TableAction::InsertRowBelow));
        assert_eq!(book.table(id).unwrap().rows, 4);
        assert!(apply_menu_action(&mut book, &menu, TableAction::DeleteColumn));
        assert_eq!(book.table(id).unwrap().cols, 2);
        assert!(book.table(id).unwrap().is_consistent());
    }
}
