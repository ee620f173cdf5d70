/// Extracts one searchable field from a record, already stringified.
pub type FieldAccessor<T> = fn(&T) -> String;

/// Number of rows per table page.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Records that can be searched by a fixed set of fields.
pub trait Searchable: Sized + 'static {
    fn search_fields() -> &'static [FieldAccessor<Self>];
}

/// True iff the lowercased `query` is a substring of at least one lowercased field.
/// An empty query matches everything.
pub fn matches<T>(record: &T, query: &str, fields: &[FieldAccessor<T>]) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    fields
        .iter()
        .any(|field| field(record).to_lowercase().contains(&needle))
}

/// Filter `source` by a single literal substring, OR-ed across `fields`.
///
/// Pure and order-preserving; the result is always a subsequence of `source`.
pub fn filter<T: Clone>(source: &[T], query: &str, fields: &[FieldAccessor<T>]) -> Vec<T> {
    source
        .iter()
        .filter(|record| matches(*record, query, fields))
        .cloned()
        .collect()
}

/// A fetched collection plus the current search query and its filtered result.
///
/// `visible` is recomputed in full whenever `source` or `query` changes;
/// a refetch replaces `source` wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionView<T> {
    source: Vec<T>,
    query: String,
    visible: Vec<T>,
}

impl<T> Default for CollectionView<T> {
    fn default() -> Self {
        Self {
            source: Vec::new(),
            query: String::new(),
            visible: Vec::new(),
        }
    }
}

impl<T: Searchable + Clone> CollectionView<T> {
    pub fn new(source: Vec<T>) -> Self {
        Self::with_query(source, String::new())
    }

    pub fn with_query(source: Vec<T>, query: impl Into<String>) -> Self {
        let query = query.into();
        let visible = filter(&source, &query, T::search_fields());
        Self {
            source,
            query,
            visible,
        }
    }

    /// Change the query and re-filter the whole source.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.refilter();
    }

    /// Swap in a freshly fetched source, keeping the current query.
    pub fn replace_source(&mut self, source: Vec<T>) {
        self.source = source;
        self.refilter();
    }

    fn refilter(&mut self) {
        self.visible = filter(&self.source, &self.query, T::search_fields());
    }

    pub fn source(&self) -> &[T] {
        &self.source
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn visible(&self) -> &[T] {
        &self.visible
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// Number of pages of visible rows (at least 1, so an empty table still has a page).
    pub fn page_count(&self) -> usize {
        self.visible.len().div_ceil(DEFAULT_PAGE_SIZE).max(1)
    }

    /// Rows on 1-based page `page`; out-of-range pages are empty.
    pub fn page(&self, page: usize) -> &[T] {
        if page == 0 {
            return &[];
        }
        let start = (page - 1) * DEFAULT_PAGE_SIZE;
        if start >= self.visible.len() {
            return &[];
        }
        let end = (start + DEFAULT_PAGE_SIZE).min(self.visible.len());
        &self.visible[start..end]
    }
}
