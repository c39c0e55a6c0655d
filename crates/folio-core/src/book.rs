//! The book document: an ordered sequence of pages.

use crate::objects::{Object, ObjectId, ObjectPatch, Table};
use crate::page::{Page, PageField, ZDirection};
use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::Arc;
use uuid::Uuid;

/// Current serialized schema version. Later versions only add fields.
pub const SCHEMA_VERSION: u32 = 1;

/// A point-in-time copy of the page sequence.
///
/// Pages are shared with the live book until one of them is mutated, at
/// which point only that page is copied. A snapshot therefore never observes
/// later edits.
#[derive(Debug, Clone, PartialEq)]
pub struct BookSnapshot {
    pages: Vec<Arc<Page>>,
}

impl BookSnapshot {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index).map(Arc::as_ref)
    }
}

/// A book containing all pages and their objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Unique document identifier.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: u32,
    pages: Vec<Arc<Page>>,
}

impl Default for Book {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Book {
    /// Create a book with `page_count` empty pages.
    pub fn new(page_count: usize) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "Untitled".to_string(),
            version: SCHEMA_VERSION,
            pages: (0..page_count).map(|_| Arc::new(Page::new())).collect(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index).map(Arc::as_ref)
    }

    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter().map(Arc::as_ref)
    }

    /// Mutable access to one page, copying it first if a snapshot shares it.
    pub fn page_mut(&mut self, index: usize) -> Option<&mut Page> {
        self.pages.get_mut(index).map(Arc::make_mut)
    }

    /// Append `count` empty pages and return their indices.
    pub fn add_pages(&mut self, count: usize) -> Range<usize> {
        let start = self.pages.len();
        self.pages
            .extend((0..count).map(|_| Arc::new(Page::new())));
        log::info!("Added {count} page(s); book now has {}", self.pages.len());
        start..self.pages.len()
    }

    /// Replace one field of a page. Returns false for a missing page.
    pub fn update_page_field(&mut self, index: usize, field: PageField) -> bool {
        match self.page_mut(index) {
            Some(page) => {
                page.set_field(field);
                true
            }
            None => {
                log::warn!("Ignoring field update for missing page {index}");
                false
            }
        }
    }

    /// Put an object on top of its collection on `page`.
    pub fn add_object(&mut self, page: usize, object: Object) -> Option<ObjectId> {
        let page = self.page_mut(page)?;
        Some(page.insert(object))
    }

    /// Index of the page holding `id`.
    pub fn page_of(&self, id: ObjectId) -> Option<usize> {
        self.pages.iter().position(|page| page.contains(id))
    }

    /// A copy of the object with `id` and the page it lives on.
    pub fn find_object(&self, id: ObjectId) -> Option<(usize, Object)> {
        let index = self.page_of(id)?;
        let object = self.pages[index].get_object(id)?;
        Some((index, object))
    }

    pub fn object(&self, id: ObjectId) -> Option<Object> {
        self.find_object(id).map(|(_, object)| object)
    }

    /// Apply a partial attribute update. Unknown ids leave the book unchanged.
    pub fn update_object(&mut self, id: ObjectId, patch: &ObjectPatch) -> bool {
        self.update_object_with(id, |object| object.apply_patch(patch))
    }

    /// Run `f` against the object with `id` in place.
    pub fn update_object_with(&mut self, id: ObjectId, f: impl FnOnce(&mut Object)) -> bool {
        // Locate first so only the owning page is copied on write.
        let Some(index) = self.page_of(id) else {
            log::warn!("Ignoring update for unknown object {id}");
            return false;
        };
        self.page_mut(index)
            .is_some_and(|page| page.update_object(id, f))
    }

    pub fn table(&self, id: ObjectId) -> Option<&Table> {
        self.pages.iter().find_map(|page| page.table(id))
    }

    /// Run `f` against the table with `id`.
    pub fn update_table<R>(&mut self, id: ObjectId, f: impl FnOnce(&mut Table) -> R) -> Option<R> {
        let index = self.pages.iter().position(|page| page.table(id).is_some())?;
        let table = self.page_mut(index)?.table_mut(id)?;
        Some(f(table))
    }

    pub fn delete_object(&mut self, id: ObjectId) -> Option<Object> {
        let index = self.page_of(id)?;
        self.page_mut(index)?.remove(id)
    }

    /// Copy an object onto the same page with a fresh id, shifted by `offset`.
    pub fn duplicate_object(&mut self, id: ObjectId, offset: Vec2) -> Option<ObjectId> {
        let (index, mut copy) = self.find_object(id)?;
        copy.regenerate_id();
        copy.translate(offset);
        copy.set_locked(false);
        self.add_object(index, copy)
    }

    /// Flip the lock flag; returns the new value.
    pub fn toggle_lock(&mut self, id: ObjectId) -> Option<bool> {
        let locked = !self.object(id)?.is_locked();
        self.update_object_with(id, |o| o.set_locked(locked))
            .then_some(locked)
    }

    /// Flip the visibility flag; returns the new value.
    pub fn toggle_visibility(&mut self, id: ObjectId) -> Option<bool> {
        let visible = !self.object(id)?.is_visible();
        self.update_object_with(id, |o| o.set_visible(visible))
            .then_some(visible)
    }

    /// Swap with the z-order neighbour.
    pub fn reorder(&mut self, id: ObjectId, direction: ZDirection) -> bool {
        let Some(index) = self.page_of(id) else {
            return false;
        };
        if !self.pages[index].can_reorder(id, direction) {
            return false;
        }
        self.page_mut(index)
            .is_some_and(|page| page.reorder(id, direction))
    }

    pub fn snapshot(&self) -> BookSnapshot {
        BookSnapshot {
            pages: self.pages.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: BookSnapshot) {
        self.pages = snapshot.pages;
    }

    /// Serialize the book to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a book from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut book: Self = serde_json::from_str(json)?;
        for page in &mut book.pages {
            let page = Arc::make_mut(page);
            for table in &mut page.tables {
                if table.repair() {
                    log::warn!("Table {} had a malformed cell grid; repaired", table.id);
                }
            }
        }
        if book.version > SCHEMA_VERSION {
            log::warn!(
                "Book {} uses schema version {} (newer than {SCHEMA_VERSION}); unknown fields are ignored",
                book.id,
                book.version
            );
        }
        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{Cell, ObjectTrait, Shape, ShapeKind, Table, Text};
    use kurbo::Point;
    use std::collections::HashSet;

    #[test]
    fn test_load_repairs_table_grid() {
        let mut table = Table::new(Point::ZERO, 2, 2, 100.0, 40.0);
        table.cells.truncate(1);
        table.cells[0].push(Cell::default());
        let mut book = Book::new(1);
        let id = book.add_object(0, table.into()).unwrap();

        let mut loaded = Book::from_json(&book.to_json().unwrap()).unwrap();
        let table = loaded.table(id).unwrap();
        assert!(table.is_consistent());
        assert_eq!((table.rows, table.cols), (2, 2));

        let merged = loaded.update_table(id, |table| {
            table.select_cell(0, 0);
            table.merge_cells()
        });
        assert_eq!(merged, Some(true));
        let rect = loaded.table(id).unwrap().cell_rect(0, 0).unwrap();
        assert_eq!(rect.size(), kurbo::Size::new(200.0, 80.0));
    }

    #[test]
    fn test_new_book() {
        let book = Book::new(3);
        assert_eq!(book.page_count(), 3);
        assert!(book.pages().all(Page::is_empty));
        assert_eq!(book.version, SCHEMA_VERSION);
    }

    #[test]
    fn test_add_pages_appends() {
        let mut book = Book::new(2);
        let id = book.add_object(1, Text::new(Point::ZERO, "keep").into()).unwrap();
        assert_eq!(book.add_pages(3), 2..5);
        assert_eq!(book.page_count(), 5);
        assert_eq!(book.page_of(id), Some(1));
    }

    #[test]
    fn test_invalid_targets_are_dropped() {
        let mut book = Book::new(1);
        let before = book.clone();
        let ghost = Uuid::new_v4();
        assert!(!book.update_object(ghost, &ObjectPatch::position(Point::ZERO)));
        assert!(book.delete_object(ghost).is_none());
        assert!(book.duplicate_object(ghost, Vec2::new(20.0, 20.0)).is_none());
        assert!(book.toggle_lock(ghost).is_none());
        assert!(!book.reorder(ghost, ZDirection::Forward));
        assert!(!book.update_page_field(9, PageField::Texts(Vec::new())));
        assert!(book.add_object(9, Text::new(Point::ZERO, "x").into()).is_none());
        assert_eq!(book, before);
    }

    #[test]
    fn test_duplicate_gets_new_id_and_offset() {
        let mut book = Book::new(1);
        let id = book
            .add_object(0, Shape::new(ShapeKind::Star, Point::new(10.0, 10.0)).into())
            .unwrap();
        book.toggle_lock(id);
        let copy = book.duplicate_object(id, Vec2::new(20.0, 20.0)).unwrap();
        assert_ne!(copy, id);
        let copy = book.object(copy).unwrap();
        assert_eq!(copy.position(), Point::new(30.0, 30.0));
        assert!(!copy.is_locked());
        assert_eq!(book.page(0).unwrap().shapes.len(), 2);
    }

    #[test]
    fn test_ids_unique_after_delete_and_duplicate() {
        let mut book = Book::new(2);
        let mut seen = HashSet::new();
        for i in 0..10 {
            let id = book
                .add_object(i % 2, Text::new(Point::ZERO, format!("t{i}")).into())
                .unwrap();
            assert!(seen.insert(id));
            if i % 3 == 0 {
                book.delete_object(id);
            } else if let Some(copy) = book.duplicate_object(id, Vec2::ZERO) {
                assert!(seen.insert(copy));
            }
        }
    }

    #[test]
    fn test_toggle_flags() {
        let mut book = Book::new(1);
        let id = book.add_object(0, Text::new(Point::ZERO, "x").into()).unwrap();
        assert_eq!(book.toggle_lock(id), Some(true));
        assert_eq!(book.toggle_visibility(id), Some(false));
        let object = book.object(id).unwrap();
        assert!(object.is_locked());
        assert!(!object.is_visible());
        assert_eq!(book.toggle_lock(id), Some(false));
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_edits() {
        let mut book = Book::new(2);
        let id = book.add_object(0, Text::new(Point::ZERO, "before").into()).unwrap();
        let snapshot = book.snapshot();

        book.update_object(id, &ObjectPatch::content("after"));
        book.add_object(1, Text::new(Point::ZERO, "new").into());

        let old_text = &snapshot.page(0).unwrap().texts[0];
        assert_eq!(old_text.content, "before");
        assert!(snapshot.page(1).unwrap().is_empty());

        book.restore(snapshot.clone());
        assert_eq!(book.snapshot(), snapshot);
    }

    #[test]
    fn test_untouched_pages_stay_shared() {
        let mut book = Book::new(2);
        let snapshot = book.snapshot();
        book.add_object(0, Text::new(Point::ZERO, "x").into());
        assert!(Arc::ptr_eq(&book.pages[1], &snapshot.pages[1]));
        assert!(!Arc::ptr_eq(&book.pages[0], &snapshot.pages[0]));
    }

    #[test]
    fn test_reorder_is_noop_at_end() {
        let mut book = Book::new(1);
        let a = book.add_object(0, Text::new(Point::ZERO, "a").into()).unwrap();
        let b = book.add_object(0, Text::new(Point::ZERO, "b").into()).unwrap();
        let snapshot = book.snapshot();
        assert!(!book.reorder(b, ZDirection::Forward));
        assert!(Arc::ptr_eq(&book.pages[0], &snapshot.pages[0]));
        assert!(book.reorder(a, ZDirection::Forward));
        assert_eq!(book.page(0).unwrap().texts[1].id(), a);
    }

    #[test]
    fn test_update_table() {
        let mut book = Book::new(1);
        let id = book
            .add_object(0, Table::new(Point::ZERO, 3, 3, 80.0, 30.0).into())
            .unwrap();
        let rows = book.update_table(id, |t| {
            t.set_rows(5);
            t.rows
        });
        assert_eq!(rows, Some(5));
        assert!(book.table(id).unwrap().is_consistent());
    }

    #[test]
    fn test_json_roundtrip() {
        let mut book = Book::new(2);
        book.name = "Holiday".into();
        book.add_object(1, Table::new(Point::ZERO, 2, 2, 50.0, 20.0).into());
        let json = book.to_json().unwrap();
        let loaded = Book::from_json(&json).unwrap();
        assert_eq!(loaded, book);
    }

    #[test]
    fn test_from_json_without_version() {
        let json = r#"{"id":"abc","name":"Old","pages":[{}]}"#;
        let book = Book::from_json(json).unwrap();
        assert_eq!(book.version, 0);
        assert_eq!(book.page_count(), 1);
    }
}
