use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// A request that did not produce a usable response.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: Url,
        #[source]
        source: reqwest_middleware::Error,
    },
    #[error("{url} still returned {status} after retries were exhausted")]
    RetriesExhausted { url: Url, status: StatusCode },
    #[error("{url} returned {status}")]
    Status { url: Url, status: StatusCode },
    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
}

/// The page did not have the shape we expect, most likely because the site
/// layout changed or the URL points at the wrong kind of page.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no `script` element in page body")]
    MissingScript,
    #[error("`var pages = ...;` not found in page script")]
    MissingPages,
    #[error("`pages` is not a valid list of images: {0}")]
    InvalidPages(#[from] serde_json::Error),
    #[error("`dl.chapter-list` not found on series page")]
    MissingChapterList,
    #[error("cannot resolve `{href}` against the base url: {source}")]
    BadLink {
        href: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("failed to parse {url}: {source}")]
    Parse {
        url: Url,
        #[source]
        source: ParseError,
    },
    #[error("filesystem error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("`{0}` is neither a chapter nor a series url")]
    UnsupportedUrl(String),
    #[error("{failed} of {total} chapters failed to download")]
    ChaptersFailed { failed: usize, total: usize },
}
