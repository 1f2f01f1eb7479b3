use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::domain::{Book, BookFilter, BookId, Page, PageRequest};
use crate::ports::StoreResult;
use crate::ports::book_store::BookStore as BookStoreTrait;

use super::map_sqlx_error;

/// PostgreSQLの行データをBookに変換する
fn map_row_to_book(row: &PgRow) -> Book {
    Book {
        id: Some(BookId::from_uuid(row.get("id"))),
        isbn: row.get("isbn"),
        title: row.get("title"),
        author: row.get("author"),
    }
}

/// ILIKE 用に部分一致パターンを組み立てる
///
/// 条件中の % _ \ はワイルドカードではなく文字として扱う。
fn contains_pattern(needle: &Option<String>) -> Option<String> {
    needle.as_ref().map(|n| {
        let escaped = n
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{}%", escaped)
    })
}

/// BookStoreのPostgreSQL実装
///
/// isbn の一意性は books_isbn_key 制約が持つ。事前確認をすり抜けた
/// 重複登録は制約違反となり、map_sqlx_error が型付きエラーへ写す。
pub struct BookStore {
    pool: PgPool,
}

impl BookStore {
    /// PostgreSQLコネクションプールから新しいBookStoreを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStoreTrait for BookStore {
    async fn insert(&self, book: Book) -> StoreResult<Book> {
        let row = sqlx::query(
            r#"
            INSERT INTO books (isbn, title, author)
            VALUES ($1, $2, $3)
            RETURNING id, isbn, title, author
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.author)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(map_row_to_book(&row))
    }

    async fn find_by_id(&self, id: BookId) -> StoreResult<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT id, isbn, title, author
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.as_ref().map(map_row_to_book))
    }

    async fn find_by_isbn(&self, isbn: &str) -> StoreResult<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT id, isbn, title, author
            FROM books
            WHERE isbn = $1
            "#,
        )
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.as_ref().map(map_row_to_book))
    }

    async fn exists_by_isbn(&self, isbn: &str) -> StoreResult<bool> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)
            "#,
        )
        .bind(isbn)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.get(0))
    }

    /// 未設定の条件は NULL で束縛してワイルドカード化する
    async fn find_by_filter(
        &self,
        filter: &BookFilter,
        page: PageRequest,
    ) -> StoreResult<Page<Book>> {
        let isbn = contains_pattern(&filter.isbn);
        let title = contains_pattern(&filter.title);
        let author = contains_pattern(&filter.author);

        let count_row = sqlx::query(
            r#"
            SELECT COUNT(*)
            FROM books
            WHERE ($1::text IS NULL OR isbn ILIKE $1)
              AND ($2::text IS NULL OR title ILIKE $2)
              AND ($3::text IS NULL OR author ILIKE $3)
            "#,
        )
        .bind(&isbn)
        .bind(&title)
        .bind(&author)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        let total: i64 = count_row.get(0);

        let rows = sqlx::query(
            r#"
            SELECT id, isbn, title, author
            FROM books
            WHERE ($1::text IS NULL OR isbn ILIKE $1)
              AND ($2::text IS NULL OR title ILIKE $2)
              AND ($3::text IS NULL OR author ILIKE $3)
            ORDER BY isbn ASC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(&isbn)
        .bind(&title)
        .bind(&author)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let items = rows.iter().map(map_row_to_book).collect();
        Ok(Page::new(items, page, total as u64))
    }

    async fn update_details(
        &self,
        id: BookId,
        title: &str,
        author: &str,
    ) -> StoreResult<Option<Book>> {
        let row = sqlx::query(
            r#"
            UPDATE books
            SET title = $2, author = $3
            WHERE id = $1
            RETURNING id, isbn, title, author
            "#,
        )
        .bind(id.value())
        .bind(title)
        .bind(author)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.as_ref().map(map_row_to_book))
    }

    async fn delete(&self, id: BookId) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM books WHERE id = $1
            "#,
        )
        .bind(id.value())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
