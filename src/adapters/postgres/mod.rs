pub mod book_store;
pub mod loan_store;

// パブリックに型を再エクスポート
pub use book_store::BookStore as PgBookStore;
pub use loan_store::LoanStore as PgLoanStore;

use crate::ports::StoreError;

/// sqlx のエラーをストアエラーへ写す
///
/// 一意制約違反は制約名で見分けて型付きの違反にする。存在確認と
/// 書き込みの間で別トランザクションが割り込んだときに通る経路で、
/// サービス層はこの型をビジネスエラーとして扱う。
pub(super) fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.constraint() {
            Some("books_isbn_key") => return StoreError::DuplicateIsbn,
            Some("loans_one_active_per_book") => return StoreError::ActiveLoanExists,
            _ => {}
        }
    }
    StoreError::backend(err)
}
