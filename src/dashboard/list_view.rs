//! Search and page window over a fetched collection.

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Records that can be matched by the table search box.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;

    /// Case-insensitive substring match on any searchable field.
    /// An empty query matches everything.
    fn matches(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let needle = query.to_lowercase();
        self.search_fields()
            .into_iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView<T> {
    pub items: Vec<T>,
    pub total_pages: usize,
    pub total_matches: usize,
}

pub fn filtered<'a, T: Searchable>(collection: &'a [T], query: &str) -> Vec<&'a T> {
    collection.iter().filter(|item| item.matches(query)).collect()
}

/// Filters then slices `[(page-1)*page_size, page*page_size)`; fetch order is kept.
/// Pages are 1-based; a page past the end yields no items.
pub fn view<'a, T: Searchable>(
    collection: &'a [T],
    query: &str,
    page: usize,
    page_size: usize,
) -> PageView<&'a T> {
    let page_size = page_size.max(1);
    let matches = filtered(collection, query);
    let total_matches = matches.len();
    let total_pages = total_matches.div_ceil(page_size);

    let start = page.saturating_sub(1).saturating_mul(page_size);
    let items = matches.into_iter().skip(start).take(page_size).collect();

    PageView {
        items,
        total_pages,
        total_matches,
    }
}

/// Search text and current page of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    query: String,
    page: usize,
    page_size: usize,
}

impl Default for ListState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ListState {
    pub fn new(page_size: usize) -> Self {
        Self {
            query: String::new(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Any change of search text returns to the first page.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.page = 1;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Pulls the page back inside `1..=total_pages` after the collection shrank.
    pub fn clamp(&mut self, total_pages: usize) {
        self.page = self.page.min(total_pages.max(1));
    }

    pub fn apply<'a, T: Searchable>(&self, collection: &'a [T]) -> PageView<&'a T> {
        view(collection, &self.query, self.page, self.page_size)
    }
}
