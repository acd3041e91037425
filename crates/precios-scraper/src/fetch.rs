//! Outbound page/API requests.
//!
//! One [`PageClient`] exists per orchestrator invocation so header and
//! cookie identity never leaks across runs. Every request goes out with a
//! randomly drawn browser signature and a coherent header set (accept
//! types, language, client hints, referrer pointing at the target's own
//! origin). After each response the client sleeps a random duration inside
//! the configured window, the throttle that keeps the whole engine
//! strictly sequential.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL,
    PRAGMA, REFERER, USER_AGENT};

use crate::cancel::CancelToken;
use crate::capability::FallbackTransport;
use crate::error::ScrapeError;
use crate::log::ScrapeLog;

const UA_POOL: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36",
];

/// A fetched response body with its final URL and status.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchedPage {
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Deserialize`] when the body is not valid JSON
    /// of the expected shape.
    pub fn json<T: serde::de::DeserializeOwned>(&self, context: &str) -> Result<T, ScrapeError> {
        serde_json::from_slice(&self.body).map_err(|source| ScrapeError::Deserialize {
            context: context.to_owned(),
            source,
        })
    }
}

pub struct PageClient {
    http: reqwest::Client,
    delay_window: (f64, f64),
    cancel: CancelToken,
    fallback: Option<Arc<dyn FallbackTransport>>,
}

impl PageClient {
    /// Creates a per-run client.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        delay_window: (f64, f64),
        cancel: CancelToken,
        fallback: Option<Arc<dyn FallbackTransport>>,
    ) -> Result<Self, ScrapeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .cookie_store(true)
            .build()?;
        Ok(Self {
            http,
            delay_window,
            cancel,
            fallback,
        })
    }

    /// Issues a GET and returns the body of a 2xx response.
    ///
    /// The cancellation token is polled first; a cancelled run never sends
    /// the request. Non-2xx statuses become [`ScrapeError::Status`]; a 403
    /// is retried once through the fallback transport when one is
    /// installed, and the original error stands if that also fails.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::Cancelled`], [`ScrapeError::Http`] on network
    /// failure, [`ScrapeError::Status`] on a non-2xx response.
    pub async fn get(
        &self,
        log: &ScrapeLog,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<FetchedPage, ScrapeError> {
        if self.cancel.is_cancelled() {
            return Err(ScrapeError::Cancelled);
        }

        if params.is_empty() {
            log.push(format!("GET {url}"));
        } else {
            log.push(format!("GET {url} params={params:?}"));
        }

        let mut request = self.http.get(url).headers(browser_headers(url));
        if !params.is_empty() {
            request = request.query(params);
        }
        let response = request.send().await?;

        let status = response.status();
        let final_url = response.url().to_string();
        log.push(format!("HTTP {} {final_url}", status.as_u16()));

        let body = if status.is_success() {
            response.bytes().await?.to_vec()
        } else {
            Vec::new()
        };

        self.pause().await;

        if status.is_success() {
            return Ok(FetchedPage {
                url: final_url,
                status: status.as_u16(),
                body,
            });
        }

        if status == reqwest::StatusCode::FORBIDDEN {
            if let Some(fallback) = &self.fallback {
                log.push(format!("HTTP 403, retrying via fallback transport: {final_url}"));
                if let Ok(page) = fallback.fetch(&final_url).await {
                    if (200..300).contains(&page.status) {
                        log.push(format!("fallback transport HTTP {} {final_url}", page.status));
                        return Ok(page);
                    }
                }
            }
        }

        Err(ScrapeError::Status {
            status: status.as_u16(),
            url: final_url,
        })
    }

    /// The mandatory inter-request throttle: a uniform random sleep inside
    /// the configured `[min, max]` window.
    async fn pause(&self) {
        let (min, max) = self.delay_window;
        let upper = max.max(min);
        let span = upper - min;
        let secs = if span > 0.0 {
            min + rand::random::<f64>() * span
        } else {
            min
        };
        if secs > 0.0 {
            tokio::time::sleep(Duration::from_secs_f64(secs)).await;
        }
    }
}

impl std::fmt::Debug for PageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageClient")
            .field("delay_window", &self.delay_window)
            .field("has_fallback", &self.fallback.is_some())
            .finish_non_exhaustive()
    }
}

/// `"https://host/path"` → `"https://host"`. Falls back to the input when
/// no scheme/host prefix can be found.
fn origin_of(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.trim_end_matches('/').to_owned();
    };
    let rest = &url[scheme_end + 3..];
    let host_end = rest.find('/').unwrap_or(rest.len());
    format!("{}{}", &url[..scheme_end + 3], &rest[..host_end])
}

fn browser_headers(url: &str) -> HeaderMap {
    let origin = origin_of(url);
    let ua = UA_POOL[rand::random_range(0..UA_POOL.len())];

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(ua));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("es-AR,es;q=0.9,en-US;q=0.8,en;q=0.7"),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(
        HeaderName::from_static("upgrade-insecure-requests"),
        HeaderValue::from_static("1"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("none"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-user"),
        HeaderValue::from_static("?1"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua"),
        HeaderValue::from_static(
            "\"Chromium\";v=\"120\", \"Google Chrome\";v=\"120\", \"Not:A-Brand\";v=\"99\"",
        ),
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua-platform"),
        HeaderValue::from_static("\"Windows\""),
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua-mobile"),
        HeaderValue::from_static("?0"),
    );
    if let Ok(referer) = HeaderValue::from_str(&format!("{origin}/")) {
        headers.insert(REFERER, referer);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_strips_path_and_keeps_scheme() {
        assert_eq!(
            origin_of("https://www.naldo.com.ar/search?q=tv"),
            "https://www.naldo.com.ar"
        );
        assert_eq!(origin_of("http://host"), "http://host");
    }

    #[test]
    fn origin_of_schemeless_input_is_the_input() {
        assert_eq!(origin_of("www.naldo.com.ar/"), "www.naldo.com.ar");
    }

    #[test]
    fn headers_carry_a_pool_user_agent_and_origin_referer() {
        let headers = browser_headers("https://vendor.example/catalogo");
        let ua = headers.get(USER_AGENT).unwrap().to_str().unwrap();
        assert!(UA_POOL.contains(&ua));
        assert_eq!(
            headers.get(REFERER).unwrap().to_str().unwrap(),
            "https://vendor.example/"
        );
    }
}
