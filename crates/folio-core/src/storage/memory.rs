//! In-memory storage, mostly for tests and headless runs.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::book::Book;
use std::collections::HashMap;
use std::sync::RwLock;

/// Keeps serialized books in a map, so a stored copy goes through the same
/// schema as a file on disk.
#[derive(Default)]
pub struct MemoryStorage {
    books: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {e}"))
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, book: &Book) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let json = book.to_json();
        Box::pin(async move {
            let json = json.map_err(|e| StorageError::Serialization(e.to_string()))?;
            self.books.write().map_err(lock_error)?.insert(id, json);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Book>> {
        let id = id.to_string();
        Box::pin(async move {
            let books = self.books.read().map_err(lock_error)?;
            let json = books.get(&id).ok_or_else(|| StorageError::NotFound(id.clone()))?;
            Book::from_json(json).map_err(|e| StorageError::Serialization(e.to_string()))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            self.books.write().map_err(lock_error)?.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let books = self.books.read().map_err(lock_error)?;
            let mut ids: Vec<String> = books.keys().cloned().collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move { Ok(self.books.read().map_err(lock_error)?.contains_key(&id)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Text;
    use kurbo::Point;
    use pollster::block_on;

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let mut book = Book::new(2);
        book.add_object(1, Text::new(Point::new(50.0, 50.0), "Hello").into());

        block_on(storage.save("album", &book)).unwrap();
        let loaded = block_on(storage.load("album")).unwrap();
        assert_eq!(loaded, book);
    }

    #[test]
    fn test_stored_copy_is_independent() {
        let storage = MemoryStorage::new();
        let mut book = Book::new(1);
        block_on(storage.save("album", &book)).unwrap();
        book.add_pages(3);
        assert_eq!(block_on(storage.load("album")).unwrap().page_count(), 1);
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = block_on(storage.load("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_exists_delete_list() {
        let storage = MemoryStorage::new();
        let book = Book::new(1);
        assert!(!block_on(storage.exists("b")).unwrap());
        block_on(storage.save("b", &book)).unwrap();
        block_on(storage.save("a", &book)).unwrap();
        assert!(block_on(storage.exists("b")).unwrap());
        assert_eq!(block_on(storage.list()).unwrap(), vec!["a", "b"]);
        block_on(storage.delete("b")).unwrap();
        assert!(!block_on(storage.exists("b")).unwrap());
    }
}
