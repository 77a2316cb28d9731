//! Google Books volumes API source.
//!
//! `GET {base}/books/v1/volumes?q=isbn:{isbn}` returns a volume list; an
//! unknown ISBN yields `{"totalItems": 0}` with no `items`.

use super::http::fetch_body;
use super::{non_blank, secure_url, MetadataSource};
use crate::entity::BookMetadata;
use crate::error::LookupError;
use crate::isbn::Isbn;
use serde::Deserialize;

pub const GOOGLE_BOOKS_BASE_URL: &str = "https://www.googleapis.com";
pub const SOURCE_NAME: &str = "google-books";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumesResponse {
    #[serde(default)]
    total_items: u32,
    items: Option<Vec<Volume>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    volume_info: Option<VolumeInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    title: Option<String>,
    authors: Option<Vec<String>>,
    publisher: Option<String>,
    published_date: Option<String>,
    description: Option<String>,
    page_count: Option<u32>,
    image_links: Option<ImageLinks>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageLinks {
    extra_large: Option<String>,
    large: Option<String>,
    medium: Option<String>,
    small: Option<String>,
    thumbnail: Option<String>,
    small_thumbnail: Option<String>,
}

impl ImageLinks {
    /// Largest available image.
    fn best(self) -> Option<String> {
        [
            self.extra_large,
            self.large,
            self.medium,
            self.small,
            self.thumbnail,
            self.small_thumbnail,
        ]
        .into_iter()
        .find_map(non_blank)
    }
}

/// Google Books, the fallback source.
#[derive(Clone)]
pub struct GoogleBooksSource {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GoogleBooksSource {
    /// Source against `base_url` (no trailing slash needed).
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        GoogleBooksSource {
            client,
            base_url,
            api_key: None,
        }
    }

    /// Source against the public Google Books endpoint.
    pub fn with_default_endpoint(client: reqwest::Client) -> Self {
        Self::new(client, GOOGLE_BOOKS_BASE_URL)
    }

    /// Send `key=<api_key>` with every request. Anonymous requests share a
    /// small per-IP quota.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn url_for(&self, isbn: &Isbn) -> String {
        format!("{}/books/v1/volumes?q=isbn:{}", self.base_url, isbn)
    }
}

impl MetadataSource for GoogleBooksSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn lookup(&self, isbn: &Isbn) -> Result<BookMetadata, LookupError> {
        let url = self.url_for(isbn);
        debug!("Querying Google Books: {}", url);

        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }

        let body = fetch_body(SOURCE_NAME, request).await?;
        parse_response(&body, isbn)
    }
}

/// Map a volumes response body to metadata for `isbn`. The first volume wins.
pub(crate) fn parse_response(body: &str, isbn: &Isbn) -> Result<BookMetadata, LookupError> {
    let response: VolumesResponse = serde_json::from_str(body)?;
    let info = response
        .items
        .and_then(|items| items.into_iter().next())
        .and_then(|volume| volume.volume_info)
        .ok_or_else(|| {
            debug!(
                "Google Books has no volume for {} (totalItems={})",
                isbn, response.total_items
            );
            LookupError::NotFound
        })?;

    let title = non_blank(info.title).ok_or(LookupError::NotFound)?;
    let authors = info
        .authors
        .unwrap_or_default()
        .into_iter()
        .filter_map(|a| non_blank(Some(a)))
        .collect();
    let cover_url = info
        .image_links
        .and_then(ImageLinks::best)
        .map(|url| secure_url(&url));

    Ok(BookMetadata {
        title,
        authors,
        isbn: isbn.clone(),
        cover_url,
        publisher: non_blank(info.publisher),
        published_date: non_blank(info.published_date),
        description: non_blank(info.description),
        page_count: info.page_count,
    })
}
