use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::{BookCatalog, LoanLedger, ServiceError};
use crate::domain::{Book, BookId, LoanId, Page};

use super::{
    error::ApiError,
    types::{
        BookRequest, BookResponse, CreateLoanRequest, ListBooksQuery, ListLoansQuery,
        LoanCreatedResponse, LoanResponse, PageQuery, ReturnedLoanRequest,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<BookCatalog>,
    pub ledger: Arc<LoanLedger>,
}

// ============================================================================
// Book handlers
// ============================================================================

/// POST /api/books - 書籍を登録
///
/// 強制されるビジネスルール:
/// - isbn / title / author が空でないこと
/// - isbn が未登録であること
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    let errors = req.validation_errors();
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let book = state
        .catalog
        .create(Book::new(req.isbn, req.title, req.author))
        .await?;

    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

/// GET /api/books/:id - 書籍詳細をIDで取得
///
/// 見つかった場合は書籍情報を返し、見つからない場合は404を返す。
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = state
        .catalog
        .get_by_id(BookId::from_uuid(id))
        .await?
        .ok_or(ServiceError::BookNotFound)?;

    Ok(Json(BookResponse::from(book)))
}

/// PUT /api/books/:id - 書誌情報を更新
///
/// 書き換わるのは title / author のみ。isbn はこの経路では変更
/// できない（リクエストの isbn は無視される）。
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<BookRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    let errors = req.validation_errors();
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let book = Book {
        id: Some(BookId::from_uuid(id)),
        isbn: req.isbn,
        title: req.title,
        author: req.author,
    };
    let book = state.catalog.update(book).await?;

    Ok(Json(BookResponse::from(book)))
}

/// DELETE /api/books/:id - 書籍を削除
///
/// 対象を解決してから削除する。見つからない場合は404を返す。
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let book = state
        .catalog
        .get_by_id(BookId::from_uuid(id))
        .await?
        .ok_or(ServiceError::BookNotFound)?;

    state.catalog.delete(book).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/books - 条件付き書籍一覧取得
///
/// クエリパラメータ:
/// - isbn / title / author: 部分一致の条件（大文字小文字は区別しない）
/// - page / size: ページ指定（省略時は 0 / 20）
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListBooksQuery>,
) -> Result<Json<Page<BookResponse>>, ApiError> {
    let page = state
        .catalog
        .find(&query.filter(), query.page_request())
        .await?;

    Ok(Json(page.map(BookResponse::from)))
}

/// GET /api/books/:id/loans - 1冊の貸出履歴を取得
///
/// 書籍を解決してから履歴を引く。返却済みも含む。各行には解決済みの
/// 書籍を埋め込んで返す。
pub async fn list_book_loans(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<LoanResponse>>, ApiError> {
    let book = state
        .catalog
        .get_by_id(BookId::from_uuid(id))
        .await?
        .ok_or(ServiceError::BookNotFound)?;

    let page = state
        .ledger
        .list_for_book(&book, query.page_request())
        .await?;

    Ok(Json(page.map(|loan| LoanResponse::with_book(loan, &book))))
}

// ============================================================================
// Loan handlers
// ============================================================================

/// POST /api/loans - 貸出を作成
///
/// 強制されるビジネスルール:
/// - isbn / customer が空でないこと
/// - isbn に該当する書籍が存在すること
/// - 対象書籍に未返却の貸出が無いこと
pub async fn create_loan(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateLoanRequest>,
) -> Result<(StatusCode, Json<LoanCreatedResponse>), ApiError> {
    let errors = req.validation_errors();
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let loan = state.ledger.create(req.into_loan_request()).await?;
    let id = loan
        .id
        .ok_or(ServiceError::Internal("stored loan is missing its id"))?;

    Ok((
        StatusCode::CREATED,
        Json(LoanCreatedResponse { id: id.value() }),
    ))
}

/// GET /api/loans/:id - 貸出詳細をIDで取得
///
/// 見つかった場合は貸出情報を返し、見つからない場合は404を返す。
pub async fn get_loan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<LoanResponse>, ApiError> {
    let loan = state
        .ledger
        .get_by_id(LoanId::from_uuid(id))
        .await?
        .ok_or(ServiceError::LoanNotFound)?;

    Ok(Json(LoanResponse::from(loan)))
}

/// PATCH /api/loans/:id - 返却フラグを更新
///
/// true の再送は冪等。false への書き戻し（返却の取り消し）は、同じ
/// 書籍に別の未返却貸出がある場合に拒否される。
pub async fn update_loan_returned(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReturnedLoanRequest>,
) -> Result<Json<LoanResponse>, ApiError> {
    let loan = state
        .ledger
        .mark_returned(LoanId::from_uuid(id), req.returned)
        .await?;

    Ok(Json(LoanResponse::from(loan)))
}

/// GET /api/loans - 条件付き貸出一覧取得
///
/// クエリパラメータ:
/// - isbn / customer: 完全一致の条件
/// - page / size: ページ指定（省略時は 0 / 20）
///
/// 各行には参照先の書籍を埋め込んで返す。
pub async fn list_loans(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListLoansQuery>,
) -> Result<Json<Page<LoanResponse>>, ApiError> {
    let page = state
        .ledger
        .find(&query.filter(), query.page_request())
        .await?;

    Ok(Json(page.map(LoanResponse::from)))
}
