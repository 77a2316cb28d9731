//! HTTP source tests against local fake catalog servers.
//!
//! Each test binds an axum router to `127.0.0.1:0` and points the sources at
//! it, so status mapping, payload decoding and request shape are exercised
//! over real HTTP without touching the public APIs.

use axum::extract::Query;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::get;
use axum::Router;
use isbn_kit::source::{FallbackSource, GoogleBooksSource, MetadataSource, OpenLibrarySource};
use isbn_kit::{
    BookMetadata, Isbn, LookupConfig, LookupError, LookupService, LookupStrategy, Origin,
};
use std::collections::HashMap;
use std::time::Duration;

const OPEN_LIBRARY_BODY: &str = r#"{
    "ISBN:9780134685991": {
        "title": "Effective Java",
        "authors": [{"name": "Joshua Bloch"}],
        "publishers": [{"name": "Addison-Wesley"}],
        "publish_date": "2018",
        "number_of_pages": 412,
        "cover": {
            "small": "http://covers.openlibrary.org/b/id/8739161-S.jpg",
            "large": "http://covers.openlibrary.org/b/id/8739161-L.jpg"
        }
    }
}"#;

const GOOGLE_BOOKS_BODY: &str = r#"{
    "totalItems": 1,
    "items": [{"volumeInfo": {
        "title": "Effective Java",
        "authors": ["Joshua Bloch"],
        "publisher": "Addison-Wesley Professional",
        "publishedDate": "2017-12-18",
        "pageCount": 414,
        "imageLinks": {"thumbnail": "http://books.google.com/books/content?id=BIpDDwAAQBAJ&zoom=1"}
    }}]
}"#;

fn isbn() -> Isbn {
    "9780134685991".parse().expect("valid ISBN")
}

/// Serve `router` on an ephemeral port and return its base URL.
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    format!("http://{}", addr)
}

/// Both catalog routes answer with the same status and body.
fn fixed(status: StatusCode, body: &'static str) -> Router {
    let handler =
        move || async move { (status, [(header::CONTENT_TYPE, "application/json")], body) };
    Router::new()
        .route("/api/books", get(handler.clone()))
        .route("/books/v1/volumes", get(handler))
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

// ============================================================================
// Status Mapping
// ============================================================================

#[tokio::test]
async fn test_status_mapping() {
    let cases = [
        (StatusCode::NOT_FOUND, LookupError::Network("HTTP 404".to_string())),
        (StatusCode::TOO_MANY_REQUESTS, LookupError::RateLimited),
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            LookupError::Network("HTTP 500".to_string()),
        ),
        (
            StatusCode::SERVICE_UNAVAILABLE,
            LookupError::Network("HTTP 503".to_string()),
        ),
    ];

    for (status, expected) in cases {
        let base = serve(fixed(status, "{}")).await;
        let open_library = OpenLibrarySource::new(client(), base.as_str());
        let google_books = GoogleBooksSource::new(client(), base.as_str());

        assert_eq!(
            open_library.lookup(&isbn()).await,
            Err(expected.clone()),
            "Open Library, HTTP {}",
            status
        );
        assert_eq!(
            google_books.lookup(&isbn()).await,
            Err(expected),
            "Google Books, HTTP {}",
            status
        );
    }
}

#[tokio::test]
async fn test_unknown_isbn_is_not_found() {
    let open_library = serve(fixed(StatusCode::OK, "{}")).await;
    let google_books = serve(fixed(StatusCode::OK, r#"{"kind": "books#volumes", "totalItems": 0}"#)).await;

    assert_eq!(
        OpenLibrarySource::new(client(), open_library)
            .lookup(&isbn())
            .await,
        Err(LookupError::NotFound)
    );
    assert_eq!(
        GoogleBooksSource::new(client(), google_books)
            .lookup(&isbn())
            .await,
        Err(LookupError::NotFound)
    );
}

#[tokio::test]
async fn test_malformed_body_is_decoding_error() {
    let base = serve(fixed(StatusCode::OK, "<html>maintenance</html>")).await;

    let open_library = OpenLibrarySource::new(client(), base.as_str()).lookup(&isbn()).await;
    let google_books = GoogleBooksSource::new(client(), base.as_str()).lookup(&isbn()).await;

    assert!(matches!(open_library, Err(LookupError::Decoding(_))));
    assert!(matches!(google_books, Err(LookupError::Decoding(_))));
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let base = format!("http://{}", listener.local_addr().expect("local addr"));
    drop(listener);

    let result = OpenLibrarySource::new(client(), base).lookup(&isbn()).await;
    assert!(matches!(result, Err(LookupError::Network(_))));
}

#[tokio::test]
async fn test_timeout_is_network_error() {
    let router = Router::new().route(
        "/books/v1/volumes",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            GOOGLE_BOOKS_BODY
        }),
    );
    let base = serve(router).await;
    let config = LookupConfig::default().with_request_timeout(Duration::from_millis(200));
    let client = config.http_client().expect("client");

    let result = GoogleBooksSource::new(client, base).lookup(&isbn()).await;
    assert!(matches!(result, Err(LookupError::Network(_))));
}

// ============================================================================
// Payload Mapping and Request Shape
// ============================================================================

#[tokio::test]
async fn test_open_library_request_and_mapping() {
    let router = Router::new().route(
        "/api/books",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            let expected = [
                ("bibkeys", "ISBN:9780134685991"),
                ("format", "json"),
                ("jscmd", "data"),
            ];
            if expected
                .iter()
                .all(|(k, v)| params.get(*k).map(String::as_str) == Some(*v))
            {
                (StatusCode::OK, OPEN_LIBRARY_BODY)
            } else {
                (StatusCode::BAD_REQUEST, "{}")
            }
        }),
    );
    let base = serve(router).await;

    let book = OpenLibrarySource::new(client(), base)
        .lookup(&isbn())
        .await
        .expect("lookup should succeed");

    assert_eq!(
        book,
        BookMetadata::new(isbn(), "Effective Java")
            .with_authors(["Joshua Bloch"])
            .with_publisher("Addison-Wesley")
            .with_published_date("2018")
            .with_page_count(412)
            .with_cover_url("https://covers.openlibrary.org/b/id/8739161-L.jpg")
    );
}

#[tokio::test]
async fn test_google_books_sends_api_key() {
    let router = Router::new().route(
        "/books/v1/volumes",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            let query_ok = params.get("q").map(String::as_str) == Some("isbn:9780134685991");
            match params.get("key").map(String::as_str) {
                Some("secret") if query_ok => (StatusCode::OK, GOOGLE_BOOKS_BODY),
                _ => (StatusCode::FORBIDDEN, "{}"),
            }
        }),
    );
    let base = serve(router).await;

    let anonymous = GoogleBooksSource::new(client(), base.as_str()).lookup(&isbn()).await;
    assert_eq!(anonymous, Err(LookupError::Network("HTTP 403".to_string())));

    let book = GoogleBooksSource::new(client(), base.as_str())
        .with_api_key("secret")
        .lookup(&isbn())
        .await
        .expect("keyed lookup should succeed");

    assert_eq!(book.title, "Effective Java");
    assert_eq!(book.publisher.as_deref(), Some("Addison-Wesley Professional"));
    assert_eq!(book.page_count, Some(414));
    assert_eq!(
        book.cover_url.as_deref(),
        Some("https://books.google.com/books/content?id=BIpDDwAAQBAJ&zoom=1")
    );
}

// ============================================================================
// Fallback over HTTP
// ============================================================================

#[tokio::test]
async fn test_rate_limited_primary_falls_back() {
    let router = Router::new()
        .route(
            "/api/books",
            get(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        )
        .route("/books/v1/volumes", get(|| async { GOOGLE_BOOKS_BODY }));
    let base = serve(router).await;
    let chain = FallbackSource::new(
        OpenLibrarySource::new(client(), base.as_str()),
        GoogleBooksSource::new(client(), base.as_str()),
    );

    let sourced = chain.resolve(&isbn()).await.expect("fallback should answer");

    assert_eq!(sourced.source, "google-books");
    assert_eq!(sourced.book.page_count, Some(414));
}

#[tokio::test]
async fn test_service_from_config_end_to_end() {
    let router = Router::new()
        .route("/api/books", get(|| async { "{}" }))
        .route(
            "/books/v1/volumes",
            get(|headers: HeaderMap| async move {
                let agent = headers
                    .get(header::USER_AGENT)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default();
                if agent == "isbn-kit-tests" {
                    (StatusCode::OK, GOOGLE_BOOKS_BODY)
                } else {
                    (StatusCode::BAD_REQUEST, "unexpected user agent")
                }
            }),
        );
    let base = serve(router).await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let config = LookupConfig::default()
        .with_cache_dir(dir.path())
        .with_user_agent("isbn-kit-tests")
        .with_open_library_url(base.as_str())
        .with_google_books_url(base.as_str());
    let service = LookupService::from_config(&config).expect("Failed to build service");

    // Open Library has no record, Google Books does
    let first = service
        .resolve("0-13-468599-7", LookupStrategy::CacheFirst)
        .await
        .expect("lookup should succeed");
    assert_eq!(first.origin, Origin::Source("google-books".to_string()));

    let second = service
        .resolve("9780134685991", LookupStrategy::CacheFirst)
        .await
        .expect("lookup should succeed");
    assert_eq!(second.origin, Origin::Memory);
    assert_eq!(second.book, first.book);

    assert!(dir.path().join("isbn").join("9780134685991.bin").exists());
}
