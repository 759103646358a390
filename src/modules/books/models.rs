use serde::{Deserialize, Serialize};

/// A row of the `books` table, keyed by `isbn`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    /// Unique identifier for the book
    pub isbn: String,
    /// Amazon product link
    pub amazon_url: String,
    /// Author of the book
    pub author: String,
    /// Language the book is written in
    pub language: String,
    /// Page count
    pub pages: i32,
    /// Publisher of the book
    pub publisher: String,
    /// Title of the book
    pub title: String,
    /// Publication year
    pub year: i32,
}

/// Response body for single-book endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookEnvelope {
    pub book: Book,
}

/// Response body for the listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BooksEnvelope {
    pub books: Vec<Book>,
}
