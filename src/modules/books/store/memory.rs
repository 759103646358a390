use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BookStore, StoreError};
use crate::modules::books::models::Book;

/// Process-local store with the same contract as [`super::PgBookStore`].
#[derive(Default)]
pub struct InMemoryBookStore {
    books: RwLock<BTreeMap<String, Book>>,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store, replacing any row with the same isbn.
    pub async fn insert(&self, book: Book) {
        self.books.write().await.insert(book.isbn.clone(), book);
    }
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn list_all(&self) -> Result<Vec<Book>, StoreError> {
        let mut books: Vec<Book> = self.books.read().await.values().cloned().collect();
        books.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(books)
    }

    async fn get_by_isbn(&self, isbn: &str) -> Result<Book, StoreError> {
        self.books
            .read()
            .await
            .get(isbn)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(isbn.to_string()))
    }

    async fn create(&self, book: Book) -> Result<Book, StoreError> {
        let mut books = self.books.write().await;
        if books.contains_key(&book.isbn) {
            return Err(StoreError::Conflict(book.isbn));
        }
        books.insert(book.isbn.clone(), book.clone());
        Ok(book)
    }

    async fn update(&self, isbn: &str, book: Book) -> Result<Book, StoreError> {
        let mut books = self.books.write().await;
        if !books.contains_key(isbn) {
            return Err(StoreError::NotFound(isbn.to_string()));
        }
        if book.isbn != isbn && books.contains_key(&book.isbn) {
            return Err(StoreError::Conflict(book.isbn));
        }
        books.remove(isbn);
        books.insert(book.isbn.clone(), book.clone());
        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(isbn: &str, title: &str) -> Book {
        Book {
            isbn: isbn.to_string(),
            amazon_url: format!("https://example.com/{}", isbn),
            author: "Anon".to_string(),
            language: "english".to_string(),
            pages: 100,
            publisher: "Press".to_string(),
            title: title.to_string(),
            year: 2000,
        }
    }

    #[tokio::test]
    async fn lists_by_title() {
        let store = InMemoryBookStore::new();
        store.create(book("2", "Zebra")).await.unwrap();
        store.create(book("1", "Aardvark")).await.unwrap();

        let titles: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["Aardvark", "Zebra"]);
    }

    #[tokio::test]
    async fn duplicate_create_conflicts() {
        let store = InMemoryBookStore::new();
        store.create(book("1", "A")).await.unwrap();
        assert!(matches!(
            store.create(book("1", "B")).await,
            Err(StoreError::Conflict(isbn)) if isbn == "1"
        ));
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let store = InMemoryBookStore::new();
        assert!(matches!(
            store.get_by_isbn("nope").await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.update("nope", book("nope", "A")).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_overwrites_every_field() {
        let store = InMemoryBookStore::new();
        store.create(book("1", "A")).await.unwrap();

        let mut changed = book("1", "B");
        changed.author = "Jacob Stevens".to_string();
        changed.pages = 300;
        store.update("1", changed.clone()).await.unwrap();

        assert_eq!(store.get_by_isbn("1").await.unwrap(), changed);
    }

    #[tokio::test]
    async fn rekeying_onto_existing_isbn_conflicts() {
        let store = InMemoryBookStore::new();
        store.create(book("1", "A")).await.unwrap();
        store.create(book("2", "B")).await.unwrap();

        assert!(matches!(
            store.update("1", book("2", "C")).await,
            Err(StoreError::Conflict(_))
        ));
        assert_eq!(store.get_by_isbn("1").await.unwrap().title, "A");
    }
}
