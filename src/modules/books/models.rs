use bookshelf_db::Document;
use serde::{de, Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

/// Stored book record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Store-assigned identifier, `None` until first saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: Option<String>,
    pub available: bool,
}

impl Document for Book {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn assign_id(&mut self, id: String) {
        self.id = Some(id);
    }
}

impl From<BookView> for Book {
    fn from(view: BookView) -> Self {
        Self {
            id: None,
            title: view.title,
            author: view.author,
            description: view.description,
            available: view.available,
        }
    }
}

/// Wire representation of a book, used for create requests and search results.
///
/// Missing or `null` `title`/`author` deserialize to empty strings so they
/// fail validation instead of body parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct BookView {
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(
        custom(function = "not_blank", message = "Title must not be blank"),
        length(max = 100, message = "Title cannot exceed 100 characters")
    )]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(
        custom(function = "not_blank", message = "Author must not be blank"),
        length(max = 50, message = "Author cannot exceed 50 characters")
    )]
    pub author: String,
    #[serde(default)]
    #[validate(length(max = 300, message = "Description cannot exceed 300 characters"))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub available: bool,
}

impl From<Book> for BookView {
    fn from(book: Book) -> Self {
        Self {
            title: book.title,
            author: book.author,
            description: book.description,
            available: book.available,
        }
    }
}

/// Patch object: absent (or `null`) fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
}

/// Optional search filters taken from the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    /// Empty means unset; otherwise parsed like a form checkbox, ignoring case.
    #[serde(default, deserialize_with = "lenient_flag")]
    pub available: Option<bool>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "true" | "on" | "yes" | "1" => Ok(Some(true)),
        "false" | "off" | "no" | "0" => Ok(Some(false)),
        _ => Err(de::Error::invalid_value(
            de::Unexpected::Str(&raw),
            &"true or false",
        )),
    }
}

/// No-break spaces and NEL count as content; U+001C..U+001F count as blank.
fn is_blank_char(c: char) -> bool {
    match c {
        '\u{00A0}' | '\u{2007}' | '\u{202F}' | '\u{0085}' => false,
        '\u{001C}'..='\u{001F}' => true,
        c => c.is_whitespace(),
    }
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.chars().all(is_blank_char) {
        return Err(ValidationError::new("not_blank"));
    }
    Ok(())
}
