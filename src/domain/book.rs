use serde::{Deserialize, Serialize};

use super::BookId;

/// 書籍 - カタログに登録される1タイトル
///
/// ビジネスルール：
/// - isbn はカタログ全体で一意（ストアの一意制約で保証）
/// - isbn は登録後に変更できない（update は title / author のみ書き換える）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    // 識別子（ストア採番。未登録の間は None）
    pub id: Option<BookId>,

    // 業務キー
    pub isbn: String,

    // 書誌情報
    pub title: String,
    pub author: String,
}

impl Book {
    /// 未登録の書籍を作る
    pub fn new(
        isbn: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            isbn: isbn.into(),
            title: title.into(),
            author: author.into(),
        }
    }
}

/// 書籍の検索条件
///
/// 未設定のフィールドはワイルドカード。設定されたフィールドは
/// 大文字小文字を無視した部分一致で、複数指定時は AND 結合。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookFilter {
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
}

impl BookFilter {
    /// 条件がひとつも設定されていないか
    pub fn is_unfiltered(&self) -> bool {
        self.isbn.is_none() && self.title.is_none() && self.author.is_none()
    }

    /// 書籍がこの条件に合致するか
    ///
    /// メモリストアはこの述語をそのまま使う。Postgresストアは同じ意味論を
    /// ILIKE 句で実装する。
    pub fn matches(&self, book: &Book) -> bool {
        contains_ignore_case(&self.isbn, &book.isbn)
            && contains_ignore_case(&self.title, &book.title)
            && contains_ignore_case(&self.author, &book.author)
    }
}

/// 部分一致（大文字小文字を無視）。条件が未設定なら常に真。
fn contains_ignore_case(needle: &Option<String>, haystack: &str) -> bool {
    match needle {
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
        None => true,
    }
}
