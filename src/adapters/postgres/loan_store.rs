use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::domain::{Book, BookId, Loan, LoanFilter, LoanId, Page, PageRequest};
use crate::ports::StoreResult;
use crate::ports::loan_store::{LoanStore as LoanStoreTrait, LoanWithBook};

use super::map_sqlx_error;

/// PostgreSQLの行データをLoanに変換する
fn map_row_to_loan(row: &PgRow) -> Loan {
    Loan {
        id: Some(LoanId::from_uuid(row.get("id"))),
        book_id: BookId::from_uuid(row.get("book_id")),
        customer: row.get("customer"),
        customer_email: row.get("customer_email"),
        loan_date: row.get("loan_date"),
        returned: row.get("returned"),
    }
}

/// 書籍を結合した行をLoanWithBookに変換する
///
/// 書籍側の列は book_ 接頭辞の別名で取り出す（id の衝突を避ける）。
fn map_row_to_loan_with_book(row: &PgRow) -> LoanWithBook {
    LoanWithBook {
        loan: map_row_to_loan(row),
        book: Book {
            id: Some(BookId::from_uuid(row.get("book_pk"))),
            isbn: row.get("book_isbn"),
            title: row.get("book_title"),
            author: row.get("book_author"),
        },
    }
}

/// LoanStoreのPostgreSQL実装
///
/// 「同一書籍の未返却貸出は1件まで」は部分一意インデックス
/// loans_one_active_per_book が持つ。INSERT だけでなく returned の
/// 書き戻し（UPDATE）でも同じ制約が効く。
pub struct LoanStore {
    pool: PgPool,
}

impl LoanStore {
    /// PostgreSQLコネクションプールから新しいLoanStoreを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanStoreTrait for LoanStore {
    async fn insert(&self, loan: Loan) -> StoreResult<Loan> {
        let row = sqlx::query(
            r#"
            INSERT INTO loans (book_id, customer, customer_email, loan_date, returned)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, book_id, customer, customer_email, loan_date, returned
            "#,
        )
        .bind(loan.book_id.value())
        .bind(&loan.customer)
        .bind(&loan.customer_email)
        .bind(loan.loan_date)
        .bind(loan.returned)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(map_row_to_loan(&row))
    }

    async fn find_by_id(&self, id: LoanId) -> StoreResult<Option<Loan>> {
        let row = sqlx::query(
            r#"
            SELECT id, book_id, customer, customer_email, loan_date, returned
            FROM loans
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.as_ref().map(map_row_to_loan))
    }

    async fn has_active_for_book(&self, book_id: BookId) -> StoreResult<bool> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS(SELECT 1 FROM loans WHERE book_id = $1 AND NOT returned)
            "#,
        )
        .bind(book_id.value())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.get(0))
    }

    async fn update_returned(&self, id: LoanId, returned: bool) -> StoreResult<Option<Loan>> {
        let row = sqlx::query(
            r#"
            UPDATE loans
            SET returned = $2
            WHERE id = $1
            RETURNING id, book_id, customer, customer_email, loan_date, returned
            "#,
        )
        .bind(id.value())
        .bind(returned)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.as_ref().map(map_row_to_loan))
    }

    /// 未設定の条件は NULL で束縛してワイルドカード化する
    async fn find_by_filter(
        &self,
        filter: &LoanFilter,
        page: PageRequest,
    ) -> StoreResult<Page<LoanWithBook>> {
        let count_row = sqlx::query(
            r#"
            SELECT COUNT(*)
            FROM loans l
            JOIN books b ON b.id = l.book_id
            WHERE ($1::text IS NULL OR b.isbn = $1)
              AND ($2::text IS NULL OR l.customer = $2)
            "#,
        )
        .bind(&filter.isbn)
        .bind(&filter.customer)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        let total: i64 = count_row.get(0);

        let rows = sqlx::query(
            r#"
            SELECT
                l.id, l.book_id, l.customer, l.customer_email, l.loan_date, l.returned,
                b.id AS book_pk, b.isbn AS book_isbn,
                b.title AS book_title, b.author AS book_author
            FROM loans l
            JOIN books b ON b.id = l.book_id
            WHERE ($1::text IS NULL OR b.isbn = $1)
              AND ($2::text IS NULL OR l.customer = $2)
            ORDER BY l.loan_date DESC, l.id ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&filter.isbn)
        .bind(&filter.customer)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let items = rows.iter().map(map_row_to_loan_with_book).collect();
        Ok(Page::new(items, page, total as u64))
    }

    async fn find_by_book(&self, book_id: BookId, page: PageRequest) -> StoreResult<Page<Loan>> {
        let count_row = sqlx::query(
            r#"
            SELECT COUNT(*) FROM loans WHERE book_id = $1
            "#,
        )
        .bind(book_id.value())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        let total: i64 = count_row.get(0);

        let rows = sqlx::query(
            r#"
            SELECT id, book_id, customer, customer_email, loan_date, returned
            FROM loans
            WHERE book_id = $1
            ORDER BY loan_date DESC, id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(book_id.value())
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let items = rows.iter().map(map_row_to_loan).collect();
        Ok(Page::new(items, page, total as u64))
    }

    async fn find_overdue(&self, cutoff: NaiveDate) -> StoreResult<Vec<Loan>> {
        let rows = sqlx::query(
            r#"
            SELECT id, book_id, customer, customer_email, loan_date, returned
            FROM loans
            WHERE loan_date <= $1 AND NOT returned
            ORDER BY loan_date ASC, id ASC
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.iter().map(map_row_to_loan).collect())
    }
}
