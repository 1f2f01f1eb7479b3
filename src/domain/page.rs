use serde::{Deserialize, Serialize};

/// 1ページあたりの既定件数
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// 1ページあたりの上限件数
pub const MAX_PAGE_SIZE: u32 = 100;

/// ページ指定 - 一覧系の操作が受け取るページング要求
///
/// ページ番号は0始まり。サイズは1〜100に正規化される（既定は20）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// ページ番号（0始まり）
    #[serde(default)]
    pub page: u32,

    /// 1ページあたりの件数
    #[serde(default = "default_page_size")]
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }.normalized()
    }

    /// 範囲外の値を有効域に丸める
    pub fn normalized(self) -> Self {
        Self {
            page: self.page,
            size: self.size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// クエリ用のオフセット
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.normalized().size)
    }

    /// クエリ用の取得上限
    pub fn limit(&self) -> u64 {
        u64::from(self.normalized().size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// ページ - 一覧結果のひとかたまり
///
/// `total_elements` はフィルタ適用後の全件数。要求ページが末尾を超えた
/// 場合は `items` が空になるだけで、エラーにはしない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        let request = request.normalized();
        Self {
            items,
            page_number: request.page,
            page_size: request.size,
            total_elements,
        }
    }

    /// 空ページ
    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }

    /// 要素だけを写像し、ページ情報は保つ
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_elements: self.total_elements,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
