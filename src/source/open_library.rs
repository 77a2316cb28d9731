//! Open Library Books API source.
//!
//! `GET {base}/api/books?bibkeys=ISBN:{isbn}&format=json&jscmd=data` returns
//! an object keyed by the requested bibkey; an unknown ISBN yields `{}`.

use super::http::fetch_body;
use super::{non_blank, secure_url, MetadataSource};
use crate::entity::BookMetadata;
use crate::error::LookupError;
use crate::isbn::Isbn;
use serde::Deserialize;

pub const OPEN_LIBRARY_BASE_URL: &str = "https://openlibrary.org";
pub const SOURCE_NAME: &str = "open-library";

/// One book in the `jscmd=data` response.
#[derive(Debug, Deserialize)]
struct OpenLibraryBook {
    title: Option<String>,
    authors: Option<Vec<NamedEntry>>,
    publishers: Option<Vec<NamedEntry>>,
    publish_date: Option<String>,
    number_of_pages: Option<u32>,
    cover: Option<OpenLibraryCover>,
    notes: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct NamedEntry {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenLibraryCover {
    small: Option<String>,
    medium: Option<String>,
    large: Option<String>,
}

/// Open Library emits text either as a plain string or as
/// `{"type": "/type/text", "value": "..."}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextValue {
    Plain(String),
    Typed { value: String },
}

impl TextValue {
    fn into_string(self) -> String {
        match self {
            TextValue::Plain(s) => s,
            TextValue::Typed { value } => value,
        }
    }
}

/// Open Library, the primary source.
#[derive(Clone)]
pub struct OpenLibrarySource {
    client: reqwest::Client,
    base_url: String,
}

impl OpenLibrarySource {
    /// Source against `base_url` (no trailing slash needed).
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        OpenLibrarySource { client, base_url }
    }

    /// Source against the public Open Library endpoint.
    pub fn with_default_endpoint(client: reqwest::Client) -> Self {
        Self::new(client, OPEN_LIBRARY_BASE_URL)
    }

    fn url_for(&self, isbn: &Isbn) -> String {
        format!(
            "{}/api/books?bibkeys=ISBN:{}&format=json&jscmd=data",
            self.base_url, isbn
        )
    }
}

impl MetadataSource for OpenLibrarySource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn lookup(&self, isbn: &Isbn) -> Result<BookMetadata, LookupError> {
        let url = self.url_for(isbn);
        debug!("Querying Open Library: {}", url);

        let body = fetch_body(SOURCE_NAME, self.client.get(&url)).await?;
        parse_response(&body, isbn)
    }
}

/// Map a `jscmd=data` response body to metadata for `isbn`.
pub(crate) fn parse_response(body: &str, isbn: &Isbn) -> Result<BookMetadata, LookupError> {
    let mut books: serde_json::Map<String, serde_json::Value> = serde_json::from_str(body)?;
    let entry = books
        .remove(&format!("ISBN:{}", isbn))
        .ok_or(LookupError::NotFound)?;
    let book: OpenLibraryBook = serde_json::from_value(entry)?;

    let title = non_blank(book.title).ok_or(LookupError::NotFound)?;
    let authors = book
        .authors
        .unwrap_or_default()
        .into_iter()
        .filter_map(|a| non_blank(a.name))
        .collect();
    let publisher = book
        .publishers
        .unwrap_or_default()
        .into_iter()
        .find_map(|p| non_blank(p.name));
    let cover_url = book
        .cover
        .and_then(|c| non_blank(c.large).or(non_blank(c.medium)).or(non_blank(c.small)))
        .map(|url| secure_url(&url));

    Ok(BookMetadata {
        title,
        authors,
        isbn: isbn.clone(),
        cover_url,
        publisher,
        published_date: non_blank(book.publish_date),
        description: non_blank(book.notes.map(TextValue::into_string)),
        page_count: book.number_of_pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn isbn() -> Isbn {
        "9780134685991".parse().unwrap()
    }

    const FULL: &str = r#"{
        "ISBN:9780134685991": {
            "url": "https://openlibrary.org/books/OL27258011M/Effective_Java",
            "key": "/books/OL27258011M",
            "title": "Effective Java",
            "authors": [{"url": "https://openlibrary.org/authors/OL2639869A", "name": "Joshua Bloch"}],
            "number_of_pages": 412,
            "publishers": [{"name": "Addison-Wesley"}],
            "publish_date": "2018",
            "notes": "Third edition.",
            "cover": {
                "small": "https://covers.openlibrary.org/b/id/8739161-S.jpg",
                "medium": "https://covers.openlibrary.org/b/id/8739161-M.jpg",
                "large": "http://covers.openlibrary.org/b/id/8739161-L.jpg"
            }
        }
    }"#;

    #[test]
    fn test_full_record() {
        let book = parse_response(FULL, &isbn()).unwrap();

        assert_eq!(
            book,
            BookMetadata::new(isbn(), "Effective Java")
                .with_authors(["Joshua Bloch"])
                .with_publisher("Addison-Wesley")
                .with_published_date("2018")
                .with_description("Third edition.")
                .with_page_count(412)
                .with_cover_url("https://covers.openlibrary.org/b/id/8739161-L.jpg")
        );
    }

    #[test]
    fn test_minimal_record_defaults() {
        let body = r#"{"ISBN:9780134685991": {"title": "Effective Java"}}"#;
        let book = parse_response(body, &isbn()).unwrap();

        assert_eq!(book, BookMetadata::new(isbn(), "Effective Java"));
    }

    #[test]
    fn test_cover_falls_back_to_smaller_sizes() {
        let body = r#"{"ISBN:9780134685991": {
            "title": "Effective Java",
            "cover": {"small": "https://c/S.jpg", "medium": "https://c/M.jpg"}
        }}"#;
        let book = parse_response(body, &isbn()).unwrap();
        assert_eq!(book.cover_url.as_deref(), Some("https://c/M.jpg"));
    }

    #[test]
    fn test_typed_notes_and_title_without_subtitle() {
        let body = r#"{"ISBN:9780134685991": {
            "title": "Effective Java",
            "subtitle": "Programming Language Guide",
            "notes": {"type": "/type/text", "value": "Revised for Java 9."}
        }}"#;
        let book = parse_response(body, &isbn()).unwrap();

        assert_eq!(book.title, "Effective Java");
        assert_eq!(book.description.as_deref(), Some("Revised for Java 9."));
    }

    #[test]
    fn test_empty_object_is_not_found() {
        assert_eq!(parse_response("{}", &isbn()), Err(LookupError::NotFound));
    }

    #[test]
    fn test_other_isbn_key_is_not_found() {
        let body = r#"{"ISBN:9780306406157": {"title": "Something else"}}"#;
        assert_eq!(parse_response(body, &isbn()), Err(LookupError::NotFound));
    }

    #[test]
    fn test_missing_title_is_not_found() {
        let body = r#"{"ISBN:9780134685991": {"authors": [{"name": "Joshua Bloch"}]}}"#;
        assert_eq!(parse_response(body, &isbn()), Err(LookupError::NotFound));
    }

    #[test]
    fn test_malformed_bodies_are_decoding_errors() {
        for body in [
            "<html>Service Unavailable</html>",
            "[]",
            r#"{"ISBN:9780134685991": "not an object"}"#,
            r#"{"ISBN:9780134685991": {"title": "T", "number_of_pages": "many"}}"#,
        ] {
            assert!(
                matches!(parse_response(body, &isbn()), Err(LookupError::Decoding(_))),
                "body {:?} should fail to decode",
                body
            );
        }
    }

    #[test]
    fn test_url() {
        let source = OpenLibrarySource::new(reqwest::Client::new(), "http://localhost:8080/");
        assert_eq!(
            source.url_for(&isbn()),
            "http://localhost:8080/api/books?bibkeys=ISBN:9780134685991&format=json&jscmd=data"
        );
        assert_eq!(source.name(), "open-library");
    }
}
