use thiserror::Error;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// ストア層の失敗
///
/// 一意制約まわりの違反は型で区別する。存在確認と登録の間で競合が
/// 起きても、ストア自身の制約が最後の砦になり、サービス層はこの型を
/// ビジネスエラーへ翻訳する。
#[derive(Debug, Error)]
pub enum StoreError {
    /// isbn 一意制約への違反
    #[error("isbn is already registered in the store")]
    DuplicateIsbn,

    /// 「同一書籍の未返却貸出は1件まで」制約への違反
    #[error("an active loan already exists for the book")]
    ActiveLoanExists,

    /// 接続断や SQL 失敗などの基盤障害
    #[error("storage backend failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}
