use thiserror::Error;

use crate::ports::StoreError;

/// アプリケーション層のエラー
///
/// カタログと台帳で共有する。API 層はこの型だけを見てステータス
/// コードと応答ボディへ割り付ける。
#[derive(Debug, Error)]
pub enum ServiceError {
    /// 識別子の有無など、呼び出し側の前提違反
    #[error("{0}")]
    InvalidArgument(&'static str),

    /// 書籍が存在しない（更新・削除の対象が無い）
    #[error("Book not found")]
    BookNotFound,

    /// 貸出が存在しない
    #[error("Loan not found")]
    LoanNotFound,

    /// isbn の重複登録
    #[error("Isbn already registered")]
    IsbnAlreadyRegistered,

    /// 貸出申込の isbn に該当する書籍が無い
    #[error("Book not found for passed isbn")]
    BookNotFoundForIsbn,

    /// 対象書籍に未返却の貸出がある
    #[error("Book already loaned")]
    BookAlreadyLoaned,

    /// ストアが返した行が前提を満たしていない等の内部不整合
    #[error("Internal error: {0}")]
    Internal(&'static str),

    /// ストアの基盤障害
    #[error("Unexpected store failure")]
    Store(#[source] StoreError),
}

/// ストアエラーの翻訳
///
/// 存在確認と登録の間で別の書き込みが割り込むと、サービス層の事前
/// 確認をすり抜けてストアの制約違反がここへ流れてくる。どの経路から
/// 来ても同じビジネスエラーに見えるよう、この一箇所で写す。
impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateIsbn => Self::IsbnAlreadyRegistered,
            StoreError::ActiveLoanExists => Self::BookAlreadyLoaned,
            StoreError::Backend(_) => Self::Store(err),
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, ServiceError>;
