use async_trait::async_trait;

use crate::domain::{Book, BookFilter, BookId, Page, PageRequest};

use super::StoreResult;

/// 書籍ストアポート
///
/// カタログ永続化の境界。実装はメモリ版（テスト・ローカル用）と
/// Postgres 版の2つ。
#[async_trait]
pub trait BookStore: Send + Sync {
    /// 書籍を登録し、ID採番済みの書籍を返す
    ///
    /// 同じ isbn が既に登録されている場合は `StoreError::DuplicateIsbn`
    /// を返す。呼び出し側の事前確認とは独立に、ストア自身の一意制約と
    /// して保証すること。
    async fn insert(&self, book: Book) -> StoreResult<Book>;

    /// IDで引く
    async fn find_by_id(&self, id: BookId) -> StoreResult<Option<Book>>;

    /// isbn の完全一致で引く
    async fn find_by_isbn(&self, isbn: &str) -> StoreResult<Option<Book>>;

    /// isbn が登録済みか
    async fn exists_by_isbn(&self, isbn: &str) -> StoreResult<bool>;

    /// 条件に合致する書籍をページで返す
    ///
    /// 並び順は isbn 昇順で固定（一意キーなのでページ間で順序が揺れない）。
    async fn find_by_filter(
        &self,
        filter: &BookFilter,
        page: PageRequest,
    ) -> StoreResult<Page<Book>>;

    /// title / author だけを書き換え、更新後の書籍を返す
    ///
    /// isbn はこの経路では変更できない。対象が存在しなければ `None`。
    async fn update_details(
        &self,
        id: BookId,
        title: &str,
        author: &str,
    ) -> StoreResult<Option<Book>>;

    /// 書籍を削除する。削除できたら true、元々存在しなければ false。
    async fn delete(&self, id: BookId) -> StoreResult<bool>;
}
