use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Book, BookFilter, Loan, LoanFilter, LoanRequest, PageRequest};
use crate::ports::LoanWithBook;

// ============================================================================
// Requests
// ============================================================================

/// 書籍の登録・更新リクエスト（POST /api/books, PUT /api/books/:id）
#[derive(Debug, Clone, Deserialize)]
pub struct BookRequest {
    pub isbn: String,
    pub title: String,
    pub author: String,
}

impl BookRequest {
    /// 必須フィールドの検証。空のフィールドごとにメッセージを1件返す。
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.isbn.trim().is_empty() {
            errors.push("isbn must not be empty".to_string());
        }
        if self.title.trim().is_empty() {
            errors.push("title must not be empty".to_string());
        }
        if self.author.trim().is_empty() {
            errors.push("author must not be empty".to_string());
        }
        errors
    }
}

/// 貸出の作成リクエスト（POST /api/loans）
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLoanRequest {
    pub isbn: String,
    pub customer: String,
    pub email: Option<String>,
    /// 省略時は当日扱い
    pub loan_date: Option<NaiveDate>,
}

impl CreateLoanRequest {
    /// 必須フィールドの検証。空のフィールドごとにメッセージを1件返す。
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.isbn.trim().is_empty() {
            errors.push("isbn must not be empty".to_string());
        }
        if self.customer.trim().is_empty() {
            errors.push("customer must not be empty".to_string());
        }
        errors
    }

    pub fn into_loan_request(self) -> LoanRequest {
        LoanRequest {
            isbn: self.isbn,
            customer: self.customer,
            customer_email: self.email,
            loan_date: self.loan_date,
        }
    }
}

/// 返却フラグの更新リクエスト（PATCH /api/loans/:id）
#[derive(Debug, Clone, Deserialize)]
pub struct ReturnedLoanRequest {
    pub returned: bool,
}

/// 書籍一覧取得のクエリパラメータ
///
/// isbn / title / author は部分一致の条件。未指定はワイルドカード。
#[derive(Debug, Deserialize)]
pub struct ListBooksQuery {
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    /// ページ番号（0始まり）
    pub page: Option<u32>,
    /// 1ページあたりの件数
    pub size: Option<u32>,
}

impl ListBooksQuery {
    pub fn filter(&self) -> BookFilter {
        BookFilter {
            isbn: self.isbn.clone(),
            title: self.title.clone(),
            author: self.author.clone(),
        }
    }

    pub fn page_request(&self) -> PageRequest {
        page_request_from(self.page, self.size)
    }
}

/// 貸出一覧取得のクエリパラメータ
///
/// isbn / customer は完全一致の条件。未指定はワイルドカード。
#[derive(Debug, Deserialize)]
pub struct ListLoansQuery {
    pub isbn: Option<String>,
    pub customer: Option<String>,
    /// ページ番号(0始まり)
    pub page: Option<u32>,
    /// 1ページあたりの件数
    pub size: Option<u32>,
}

impl ListLoansQuery {
    pub fn filter(&self) -> LoanFilter {
        LoanFilter {
            isbn: self.isbn.clone(),
            customer: self.customer.clone(),
        }
    }

    pub fn page_request(&self) -> PageRequest {
        page_request_from(self.page, self.size)
    }
}

/// ページ系のみのクエリパラメータ（GET /api/books/:id/loans）
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl PageQuery {
    pub fn page_request(&self) -> PageRequest {
        page_request_from(self.page, self.size)
    }
}

fn page_request_from(page: Option<u32>, size: Option<u32>) -> PageRequest {
    let defaults = PageRequest::default();
    PageRequest::new(
        page.unwrap_or(defaults.page),
        size.unwrap_or(defaults.size),
    )
}

// ============================================================================
// Responses
// ============================================================================

/// 書籍レスポンス
#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub id: Option<Uuid>,
    pub isbn: String,
    pub title: String,
    pub author: String,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.map(|id| id.value()),
            isbn: book.isbn,
            title: book.title,
            author: book.author,
        }
    }
}

/// 貸出レスポンス
///
/// 一覧系では参照先の書籍を埋め込む。単体取得では book は付かない。
#[derive(Debug, Serialize)]
pub struct LoanResponse {
    pub id: Option<Uuid>,
    pub book_id: Uuid,
    pub customer: String,
    pub customer_email: Option<String>,
    pub loan_date: NaiveDate,
    pub returned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<BookResponse>,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        Self {
            id: loan.id.map(|id| id.value()),
            book_id: loan.book_id.value(),
            customer: loan.customer,
            customer_email: loan.customer_email,
            loan_date: loan.loan_date,
            returned: loan.returned,
            book: None,
        }
    }
}

impl From<LoanWithBook> for LoanResponse {
    fn from(joined: LoanWithBook) -> Self {
        let mut response = Self::from(joined.loan);
        response.book = Some(BookResponse::from(joined.book));
        response
    }
}

impl LoanResponse {
    /// 解決済みの書籍を埋め込む（1冊分の貸出履歴一覧用）
    pub fn with_book(loan: Loan, book: &Book) -> Self {
        let mut response = Self::from(loan);
        response.book = Some(BookResponse::from(book.clone()));
        response
    }
}

/// 貸出作成レスポンス（POST /api/loans）
#[derive(Debug, Serialize)]
pub struct LoanCreatedResponse {
    pub id: Uuid,
}

/// エラーレスポンス
///
/// ボディは {"errors": [...]} 形式。検証エラーは複数並ぶことがある。
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errors: Vec<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
        }
    }

    pub fn from_messages(messages: Vec<String>) -> Self {
        Self { errors: messages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_request_validation_collects_all_messages() {
        let request = BookRequest {
            isbn: "".to_string(),
            title: " ".to_string(),
            author: "".to_string(),
        };
        let errors = request.validation_errors();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("isbn"));
        assert!(errors[1].contains("title"));
        assert!(errors[2].contains("author"));
    }

    #[test]
    fn test_valid_book_request_has_no_errors() {
        let request = BookRequest {
            isbn: "001".to_string(),
            title: "As aventuras".to_string(),
            author: "Fulano".to_string(),
        };
        assert!(request.validation_errors().is_empty());
    }

    #[test]
    fn test_loan_request_requires_isbn_and_customer() {
        let request = CreateLoanRequest {
            isbn: " ".to_string(),
            customer: "".to_string(),
            email: None,
            loan_date: None,
        };
        let errors = request.validation_errors();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_list_books_query_defaults_paging() {
        let query = ListBooksQuery {
            isbn: None,
            title: Some("rust".to_string()),
            author: None,
            page: None,
            size: None,
        };
        let page = query.page_request();
        assert_eq!(page.page, 0);
        assert_eq!(page.size, 20);
        assert_eq!(query.filter().title.as_deref(), Some("rust"));
    }

    #[test]
    fn test_loan_response_embeds_book_when_joined() {
        let book = Book::new("001", "As aventuras", "Fulano");
        let loan = Loan::new(
            crate::domain::BookId::new(),
            "Fulano",
            Some("fulano@example.com".to_string()),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        );
        let response = LoanResponse::with_book(loan, &book);
        assert_eq!(response.book.as_ref().map(|b| b.isbn.as_str()), Some("001"));
    }
}
