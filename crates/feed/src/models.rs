/// A parsed syndication document.
#[derive(Debug, Clone)]
pub struct Feed {
    /// Feed-level title, used as the fallback display name.
    pub title: String,
    /// Entries in document order. Feeds are assumed to list newest first.
    pub entries: Vec<Entry>,
}

/// One item within a feed.
#[derive(Debug, Clone)]
pub struct Entry {
    pub title: String,
    /// Entry permalink; entries without one are dropped during parsing.
    pub link: String,
    /// Raw summary/description markup as found in the document.
    pub summary: String,
    pub author: Option<String>,
}
