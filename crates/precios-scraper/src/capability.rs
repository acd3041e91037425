//! Optional capabilities injected into the engine.
//!
//! Both are modeled as traits with absent/no-op defaults so the strategies
//! degrade to "no match" instead of failing when a backend is not wired in.

use futures::future::BoxFuture;

use crate::error::ScrapeError;
use crate::fetch::FetchedPage;

/// Alternate transport impersonating a specific modern browser's TLS/HTTP
/// fingerprint. Consulted once when a request comes back 403; when it also
/// fails, the original status error stands.
pub trait FallbackTransport: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<FetchedPage, ScrapeError>>;
}

/// Optical character recognition over a rasterized document.
pub trait OcrEngine: Send + Sync {
    /// Best-effort text recovery. `None` means the backend cannot read the
    /// document (or there is no backend at all).
    fn recognize(&self, document: &[u8]) -> Option<String>;
}

/// The absent OCR backend. Brochures whose embedded text cannot be
/// extracted simply yield no match.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOcr;

impl OcrEngine for NoOcr {
    fn recognize(&self, _document: &[u8]) -> Option<String> {
        None
    }
}
