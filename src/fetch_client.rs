use crate::configuration::Settings;
use crate::error::FetchError;
use anyhow::Context;
use log::debug;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Response, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{
    default_on_request_failure, policies::ExponentialBackoff, RetryTransientMiddleware,
    Retryable, RetryableStrategy,
};
use std::time::Duration;
use url::Url;

/// Anything that can turn a URL into a page or an image.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    async fn fetch_text(&self, url: &Url) -> Result<String, FetchError>;
    async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>, FetchError>;
}

/// Rate limited HTTP client that retries transient failures.
///
/// Every request waits for the configured delay first, then goes through a
/// [`RetryTransientMiddleware`] that retries the configured status codes with
/// exponential backoff.
pub struct FetchClient {
    client: ClientWithMiddleware,
    delay: Duration,
    retry_statuses: Vec<StatusCode>,
}

impl FetchClient {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let retry_statuses = settings
            .retry_statuses
            .iter()
            .map(|s| StatusCode::from_u16(*s).with_context(|| format!("invalid status {s}")))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let headers = default_headers(settings)?;
        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let policy = retry_policy(settings);
        let strategy = RetryStatuses(retry_statuses.clone());

        let client = ClientBuilder::new(http_client)
            .with(RetryTransientMiddleware::new_with_policy_and_strategy(
                policy,
                strategy,
            ))
            .build();

        Ok(Self {
            client,
            delay: settings.delay(),
            retry_statuses,
        })
    }

    /// Wait out the delay and GET `url`, returning whatever the last attempt produced.
    pub async fn fetch(&self, url: &Url) -> Result<Response, FetchError> {
        tokio::time::sleep(self.delay).await;
        debug!("GET {}", url);
        self.client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })
    }

    async fn fetch_ok(&self, url: &Url) -> Result<Response, FetchError> {
        let res = self.fetch(url).await?;
        check_status(url, res.status(), &self.retry_statuses)?;
        Ok(res)
    }
}

impl Fetch for FetchClient {
    async fn fetch_text(&self, url: &Url) -> Result<String, FetchError> {
        self.fetch_ok(url)
            .await?
            .text()
            .await
            .map_err(|source| FetchError::Body {
                url: url.clone(),
                source,
            })
    }

    async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let bytes = self
            .fetch_ok(url)
            .await?
            .bytes()
            .await
            .map_err(|source| FetchError::Body {
                url: url.clone(),
                source,
            })?;
        Ok(bytes.to_vec())
    }
}

/// Retries exactly the configured statuses; connection level failures use the
/// middleware's own classification.
struct RetryStatuses(Vec<StatusCode>);

impl RetryableStrategy for RetryStatuses {
    fn handle(
        &self,
        res: &Result<Response, reqwest_middleware::Error>,
    ) -> Option<Retryable> {
        match res {
            Ok(response) if self.0.contains(&response.status()) => Some(Retryable::Transient),
            Ok(_) => None,
            Err(error) => default_on_request_failure(error),
        }
    }
}

fn retry_policy(settings: &Settings) -> ExponentialBackoff {
    ExponentialBackoff::builder()
        .retry_bounds(
            Duration::from_secs(u64::from(settings.min_backoff_secs)),
            Duration::from_secs(u64::from(settings.max_backoff_secs)),
        )
        .base(settings.backoff_base)
        .build_with_max_retries(settings.max_retries)
}

fn check_status(url: &Url, status: StatusCode, retry_statuses: &[StatusCode]) -> Result<(), FetchError> {
    if status.is_success() {
        return Ok(());
    }
    let url = url.clone();
    if retry_statuses.contains(&status) {
        Err(FetchError::RetriesExhausted { url, status })
    } else {
        Err(FetchError::Status { url, status })
    }
}

fn default_headers(settings: &Settings) -> anyhow::Result<HeaderMap> {
    const BROWSER: [(&str, &str); 8] = [
        ("sec-fetch-dest", "document"),
        ("sec-fetch-mode", "navigate"),
        ("sec-fetch-site", "same-origin"),
        ("sec-fetch-user", "?1"),
        (
            "sec-ch-ua",
            "\"Not?A_Brand\";v=\"8\", \"Chromium\";v=\"108\", \"Google Chrome\";v=\"108\"",
        ),
        ("sec-ch-ua-mobile", "?0"),
        ("sec-ch-ua-platform", "\"macOS\""),
        ("upgrade-insecure-requests", "1"),
    ];

    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.9"),
    );
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(
        header::REFERER,
        HeaderValue::from_str(&settings.base_url).context("base_url is not a valid referer")?,
    );
    headers.insert(
        header::USER_AGENT,
        HeaderValue::from_str(&settings.user_agent).context("user_agent is not a valid header")?,
    );
    for (name, value) in BROWSER {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    Ok(headers)
}
