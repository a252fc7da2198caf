use super::models::{Book, SearchFilter};

/// The query shapes a search can resolve to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookQuery {
    TitleAuthorAvailable {
        title: String,
        author: String,
        available: bool,
    },
    TitleAvailable {
        title: String,
        available: bool,
    },
    AuthorAvailable {
        author: String,
        available: bool,
    },
    Title {
        title: String,
    },
    Author {
        author: String,
    },
    Available {
        available: bool,
    },
    All,
}

impl BookQuery {
    /// Pick the query for a filter. Rows are checked top to bottom; the first
    /// match wins.
    ///
    /// There is no title+author query without availability: that combination
    /// resolves to a title-only search and the author filter is ignored.
    pub fn resolve(filter: SearchFilter) -> Self {
        match (filter.title, filter.author, filter.available) {
            (Some(title), Some(author), Some(available)) => Self::TitleAuthorAvailable {
                title,
                author,
                available,
            },
            (Some(title), None, Some(available)) => Self::TitleAvailable { title, available },
            (None, Some(author), Some(available)) => Self::AuthorAvailable { author, available },
            (Some(title), _, None) => Self::Title { title },
            (None, Some(author), None) => Self::Author { author },
            (None, None, Some(available)) => Self::Available { available },
            (None, None, None) => Self::All,
        }
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TitleAuthorAvailable { .. } => "title_author_available",
            Self::TitleAvailable { .. } => "title_available",
            Self::AuthorAvailable { .. } => "author_available",
            Self::Title { .. } => "title",
            Self::Author { .. } => "author",
            Self::Available { .. } => "available",
            Self::All => "all",
        }
    }

    pub fn matches(&self, book: &Book) -> bool {
        match self {
            Self::TitleAuthorAvailable {
                title,
                author,
                available,
            } => {
                contains_ignore_case(&book.title, title)
                    && contains_ignore_case(&book.author, author)
                    && book.available == *available
            }
            Self::TitleAvailable { title, available } => {
                contains_ignore_case(&book.title, title) && book.available == *available
            }
            Self::AuthorAvailable { author, available } => {
                contains_ignore_case(&book.author, author) && book.available == *available
            }
            Self::Title { title } => contains_ignore_case(&book.title, title),
            Self::Author { author } => contains_ignore_case(&book.author, author),
            Self::Available { available } => book.available == *available,
            Self::All => true,
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
