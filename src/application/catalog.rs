use std::sync::Arc;

use tracing::debug;

use crate::domain::{Book, BookFilter, BookId, Page, PageRequest};
use crate::ports::BookStore;

use super::errors::{Result, ServiceError};

/// 書籍カタログ
///
/// 書籍の登録・検索・更新・削除のユースケースを担う。自身は状態を
/// 持たず、永続化はストアポート越しに行う。
pub struct BookCatalog {
    store: Arc<dyn BookStore>,
}

impl BookCatalog {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// 書籍を登録する
    ///
    /// ビジネスルール：
    /// - ID は未採番であること（採番はストアの責務）
    /// - isbn が空でないこと
    /// - 同じ isbn の書籍が存在しないこと
    ///
    /// # 戻り値
    /// ID採番済みの書籍
    ///
    /// # エラー
    /// - `InvalidArgument`: ID が既に設定されている、または isbn が空
    /// - `IsbnAlreadyRegistered`: 同じ isbn が登録済み
    pub async fn create(&self, book: Book) -> Result<Book> {
        // 1. 前提条件の確認
        if book.id.is_some() {
            return Err(ServiceError::InvalidArgument(
                "Book id must not be set on create",
            ));
        }
        if book.isbn.trim().is_empty() {
            return Err(ServiceError::InvalidArgument("Isbn must not be empty"));
        }

        // 2. isbn の重複確認
        if self.store.exists_by_isbn(&book.isbn).await? {
            return Err(ServiceError::IsbnAlreadyRegistered);
        }

        // 3. 登録。確認後に割り込まれた場合はストアの一意制約違反が
        //    同じ IsbnAlreadyRegistered に翻訳される
        let book = self.store.insert(book).await?;
        debug!(isbn = %book.isbn, "book registered");
        Ok(book)
    }

    /// IDで書籍を引く。見つからなければ None。
    pub async fn get_by_id(&self, id: BookId) -> Result<Option<Book>> {
        Ok(self.store.find_by_id(id).await?)
    }

    /// isbn の完全一致で書籍を引く。見つからなければ None。
    pub async fn get_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        Ok(self.store.find_by_isbn(isbn).await?)
    }

    /// 条件に合致する書籍をページで返す
    ///
    /// 件数やページ番号はストアが数えたものをそのまま返す。
    pub async fn find(&self, filter: &BookFilter, page: PageRequest) -> Result<Page<Book>> {
        Ok(self.store.find_by_filter(filter, page).await?)
    }

    /// 書誌情報を更新する
    ///
    /// 書き換わるのは title / author のみ。isbn はこの経路では変更
    /// できない（渡された値は無視される）。
    ///
    /// # エラー
    /// - `InvalidArgument`: ID が未設定
    /// - `BookNotFound`: 対象が存在しない
    pub async fn update(&self, book: Book) -> Result<Book> {
        let id = book
            .id
            .ok_or(ServiceError::InvalidArgument("Book id must be set"))?;

        let updated = self
            .store
            .update_details(id, &book.title, &book.author)
            .await?
            .ok_or(ServiceError::BookNotFound)?;
        debug!(book_id = %id.value(), "book updated");
        Ok(updated)
    }

    /// 書籍を削除する
    ///
    /// # エラー
    /// - `InvalidArgument`: ID が未設定
    /// - `BookNotFound`: 対象が存在しない
    pub async fn delete(&self, book: Book) -> Result<()> {
        let id = book
            .id
            .ok_or(ServiceError::InvalidArgument("Book id must be set"))?;

        if !self.store.delete(id).await? {
            return Err(ServiceError::BookNotFound);
        }
        debug!(book_id = %id.value(), "book deleted");
        Ok(())
    }
}
