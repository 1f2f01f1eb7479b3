use rusty_library_api::adapters::memory::MemoryBookStore;
use rusty_library_api::application::{BookCatalog, ServiceError};
use rusty_library_api::domain::{Book, BookFilter, BookId, Page, PageRequest};
use rusty_library_api::ports::{BookStore, StoreResult};
use std::sync::Arc;

// ============================================================================
// テスト用ヘルパー
// ============================================================================

fn setup_catalog() -> (Arc<MemoryBookStore>, BookCatalog) {
    let store = Arc::new(MemoryBookStore::new());
    let catalog = BookCatalog::new(store.clone());
    (store, catalog)
}

fn sample_book() -> Book {
    Book::new("123", "As aventuras", "Fulano")
}

/// 存在確認が常に「無し」と答えるストア
///
/// 事前確認と登録の間に別の書き込みが割り込んだ状況を再現する。
/// 登録自体は内側のストアへ委譲するので、一意制約違反はそのまま返る。
struct RacyBookStore {
    inner: MemoryBookStore,
}

#[async_trait::async_trait]
impl BookStore for RacyBookStore {
    async fn insert(&self, book: Book) -> StoreResult<Book> {
        self.inner.insert(book).await
    }

    async fn find_by_id(&self, id: BookId) -> StoreResult<Option<Book>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_isbn(&self, isbn: &str) -> StoreResult<Option<Book>> {
        self.inner.find_by_isbn(isbn).await
    }

    async fn exists_by_isbn(&self, _isbn: &str) -> StoreResult<bool> {
        Ok(false)
    }

    async fn find_by_filter(
        &self,
        filter: &BookFilter,
        page: PageRequest,
    ) -> StoreResult<Page<Book>> {
        self.inner.find_by_filter(filter, page).await
    }

    async fn update_details(
        &self,
        id: BookId,
        title: &str,
        author: &str,
    ) -> StoreResult<Option<Book>> {
        self.inner.update_details(id, title, author).await
    }

    async fn delete(&self, id: BookId) -> StoreResult<bool> {
        self.inner.delete(id).await
    }
}

// ============================================================================
// 登録
// ============================================================================

#[tokio::test]
async fn test_create_book_success() {
    // Arrange
    let (_, catalog) = setup_catalog();

    // Act
    let saved = catalog.create(sample_book()).await.unwrap();

    // Assert: IDが採番され、内容が保存されている
    assert!(saved.id.is_some());
    assert_eq!(saved.isbn, "123");
    assert_eq!(saved.title, "As aventuras");
    assert_eq!(saved.author, "Fulano");
}

#[tokio::test]
async fn test_create_book_with_duplicated_isbn() {
    // Arrange: 同じisbnの書籍を先に登録しておく
    let (_, catalog) = setup_catalog();
    catalog.create(sample_book()).await.unwrap();

    // Act
    let result = catalog.create(sample_book()).await;

    // Assert
    let err = result.unwrap_err();
    assert!(matches!(err, ServiceError::IsbnAlreadyRegistered));
    assert_eq!(err.to_string(), "Isbn already registered");
}

#[tokio::test]
async fn test_create_book_rejects_preset_id() {
    let (_, catalog) = setup_catalog();

    let mut book = sample_book();
    book.id = Some(BookId::new());

    let result = catalog.create(book).await;
    assert!(matches!(result, Err(ServiceError::InvalidArgument(_))));
}

#[tokio::test]
async fn test_create_book_rejects_blank_isbn() {
    let (_, catalog) = setup_catalog();

    let result = catalog.create(Book::new(" ", "As aventuras", "Fulano")).await;
    assert!(matches!(result, Err(ServiceError::InvalidArgument(_))));
}

#[tokio::test]
async fn test_create_book_translates_race_to_business_error() {
    // Arrange: 事前確認が嘘をつくストアに、同じisbnを先に入れておく
    let store = Arc::new(RacyBookStore {
        inner: MemoryBookStore::new(),
    });
    store.insert(sample_book()).await.unwrap();
    let catalog = BookCatalog::new(store);

    // Act: 事前確認を通過し、ストアの一意制約に当たる
    let result = catalog.create(sample_book()).await;

    // Assert: 制約違反も同じビジネスエラーに見える
    assert!(matches!(result, Err(ServiceError::IsbnAlreadyRegistered)));
}

// ============================================================================
// 取得・検索
// ============================================================================

#[tokio::test]
async fn test_get_book_by_id() {
    let (_, catalog) = setup_catalog();
    let saved = catalog.create(sample_book()).await.unwrap();

    let found = catalog.get_by_id(saved.id.unwrap()).await.unwrap();
    assert_eq!(found, Some(saved));

    let missing = catalog.get_by_id(BookId::new()).await.unwrap();
    assert_eq!(missing, None);
}

#[tokio::test]
async fn test_get_book_by_isbn() {
    let (_, catalog) = setup_catalog();
    let saved = catalog.create(sample_book()).await.unwrap();

    let found = catalog.get_by_isbn("123").await.unwrap();
    assert_eq!(found, Some(saved));

    let missing = catalog.get_by_isbn("999").await.unwrap();
    assert_eq!(missing, None);
}

#[tokio::test]
async fn test_find_books_matches_partially_and_ignores_case() {
    // Arrange
    let (_, catalog) = setup_catalog();
    catalog
        .create(Book::new("001", "Programming Rust", "Blandy"))
        .await
        .unwrap();
    catalog
        .create(Book::new("002", "The Rust Book", "Klabnik"))
        .await
        .unwrap();
    catalog
        .create(Book::new("003", "Effective Java", "Bloch"))
        .await
        .unwrap();

    // Act: title の部分一致（大文字小文字は区別しない）
    let filter = BookFilter {
        isbn: None,
        title: Some("rust".to_string()),
        author: None,
    };
    let page = catalog.find(&filter, PageRequest::default()).await.unwrap();

    // Assert: isbn 昇順で2件
    assert_eq!(page.total_elements, 2);
    let isbns: Vec<&str> = page.items.iter().map(|b| b.isbn.as_str()).collect();
    assert_eq!(isbns, vec!["001", "002"]);
}

#[tokio::test]
async fn test_find_books_combines_conditions_with_and() {
    let (_, catalog) = setup_catalog();
    catalog
        .create(Book::new("001", "Programming Rust", "Blandy"))
        .await
        .unwrap();
    catalog
        .create(Book::new("002", "The Rust Book", "Klabnik"))
        .await
        .unwrap();

    // title と author の両方に合致するものだけ
    let filter = BookFilter {
        isbn: None,
        title: Some("rust".to_string()),
        author: Some("klab".to_string()),
    };
    let page = catalog.find(&filter, PageRequest::default()).await.unwrap();

    assert_eq!(page.total_elements, 1);
    assert_eq!(page.items[0].isbn, "002");
}

#[tokio::test]
async fn test_find_books_empty_filter_returns_everything() {
    let (_, catalog) = setup_catalog();
    for n in 0..3 {
        catalog
            .create(Book::new(format!("{n:03}"), "Title", "Author"))
            .await
            .unwrap();
    }

    let page = catalog
        .find(&BookFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total_elements, 3);
}

#[tokio::test]
async fn test_find_books_paginates_with_stable_order() {
    // Arrange: 既定サイズを超える件数を登録
    let (_, catalog) = setup_catalog();
    for n in 0..25 {
        catalog
            .create(Book::new(format!("{n:03}"), "Title", "Author"))
            .await
            .unwrap();
    }

    // Act: 10件ずつ3ページに分かれる
    let first = catalog
        .find(&BookFilter::default(), PageRequest::new(0, 10))
        .await
        .unwrap();
    let last = catalog
        .find(&BookFilter::default(), PageRequest::new(2, 10))
        .await
        .unwrap();
    let beyond = catalog
        .find(&BookFilter::default(), PageRequest::new(9, 10))
        .await
        .unwrap();

    // Assert
    assert_eq!(first.total_elements, 25);
    assert_eq!(first.len(), 10);
    assert_eq!(first.items[0].isbn, "000");
    assert_eq!(last.len(), 5);
    assert_eq!(last.items[0].isbn, "020");

    // 末尾を超えたページは空になるだけでエラーにはしない
    assert!(beyond.is_empty());
    assert_eq!(beyond.total_elements, 25);
    assert_eq!(beyond.page_number, 9);
}

// ============================================================================
// 更新・削除
// ============================================================================

#[tokio::test]
async fn test_update_book_changes_title_and_author_only() {
    // Arrange
    let (_, catalog) = setup_catalog();
    let saved = catalog.create(sample_book()).await.unwrap();

    // Act: isbn も書き換えたつもりのリクエスト
    let updated = catalog
        .update(Book {
            id: saved.id,
            isbn: "999".to_string(),
            title: "Novo titulo".to_string(),
            author: "Beltrano".to_string(),
        })
        .await
        .unwrap();

    // Assert: title / author は変わり、isbn は元のまま
    assert_eq!(updated.title, "Novo titulo");
    assert_eq!(updated.author, "Beltrano");
    assert_eq!(updated.isbn, "123");
}

#[tokio::test]
async fn test_update_book_not_found() {
    let (_, catalog) = setup_catalog();

    let mut book = sample_book();
    book.id = Some(BookId::new());

    let result = catalog.update(book).await;
    assert!(matches!(result, Err(ServiceError::BookNotFound)));
}

#[tokio::test]
async fn test_update_book_requires_id() {
    let (_, catalog) = setup_catalog();

    let result = catalog.update(sample_book()).await;

    // Assert: 前提違反ではストアに何も書き込まない
    assert!(matches!(result, Err(ServiceError::InvalidArgument(_))));
    assert_eq!(catalog.get_by_isbn("123").await.unwrap(), None);
}

#[tokio::test]
async fn test_delete_book_success() {
    let (_, catalog) = setup_catalog();
    let saved = catalog.create(sample_book()).await.unwrap();
    let id = saved.id.unwrap();

    catalog.delete(saved).await.unwrap();

    assert_eq!(catalog.get_by_id(id).await.unwrap(), None);
}

#[tokio::test]
async fn test_delete_book_not_found() {
    let (_, catalog) = setup_catalog();

    let mut book = sample_book();
    book.id = Some(BookId::new());

    let result = catalog.delete(book).await;
    assert!(matches!(result, Err(ServiceError::BookNotFound)));
}

#[tokio::test]
async fn test_delete_book_requires_id() {
    let (_, catalog) = setup_catalog();

    let result = catalog.delete(sample_book()).await;
    assert!(matches!(result, Err(ServiceError::InvalidArgument(_))));
}
