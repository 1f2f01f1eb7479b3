use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{Book, BookFilter, BookId, Page, PageRequest};
use crate::ports::book_store::BookStore;
use crate::ports::{StoreError, StoreResult};

/// 書籍ストアのメモリ実装
///
/// テストとローカル起動用。ロックの中で重複確認と登録をまとめて行う
/// ことで、Postgres 版の一意制約に相当する保証を作る。
pub struct MemoryBookStore {
    books: Mutex<HashMap<BookId, Book>>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self {
            books: Mutex::new(HashMap::new()),
        }
    }

    /// 貸出ストアの結合用。ロックを1回だけ取って同期的に引く。
    pub(crate) fn get_snapshot(&self, id: BookId) -> Option<Book> {
        self.books.lock().unwrap().get(&id).cloned()
    }
}

impl Default for MemoryBookStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn insert(&self, mut book: Book) -> StoreResult<Book> {
        let mut books = self.books.lock().unwrap();

        // 一意制約に相当する確認。ロック中なので割り込みは起きない
        if books.values().any(|b| b.isbn == book.isbn) {
            return Err(StoreError::DuplicateIsbn);
        }

        let id = BookId::new();
        book.id = Some(id);
        books.insert(id, book.clone());
        Ok(book)
    }

    async fn find_by_id(&self, id: BookId) -> StoreResult<Option<Book>> {
        Ok(self.books.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_isbn(&self, isbn: &str) -> StoreResult<Option<Book>> {
        Ok(self
            .books
            .lock()
            .unwrap()
            .values()
            .find(|b| b.isbn == isbn)
            .cloned())
    }

    async fn exists_by_isbn(&self, isbn: &str) -> StoreResult<bool> {
        Ok(self.books.lock().unwrap().values().any(|b| b.isbn == isbn))
    }

    async fn find_by_filter(
        &self,
        filter: &BookFilter,
        page: PageRequest,
    ) -> StoreResult<Page<Book>> {
        let mut matched: Vec<Book> = self
            .books
            .lock()
            .unwrap()
            .values()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();

        // isbn は一意なのでページ間で順序が揺れない
        matched.sort_by(|a, b| a.isbn.cmp(&b.isbn));

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(Page::new(items, page, total))
    }

    async fn update_details(
        &self,
        id: BookId,
        title: &str,
        author: &str,
    ) -> StoreResult<Option<Book>> {
        let mut books = self.books.lock().unwrap();
        Ok(books.get_mut(&id).map(|book| {
            book.title = title.to_string();
            book.author = author.to_string();
            book.clone()
        }))
    }

    async fn delete(&self, id: BookId) -> StoreResult<bool> {
        Ok(self.books.lock().unwrap().remove(&id).is_some())
    }
}
