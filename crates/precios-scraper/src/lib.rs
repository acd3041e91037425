pub mod cancel;
pub mod capability;
pub mod error;
pub mod fetch;
pub mod log;
pub mod money;
pub mod orchestrator;
pub mod router;
pub mod strategies;
pub mod terms;
pub mod verify;

pub use cancel::CancelToken;
pub use capability::{FallbackTransport, NoOcr, OcrEngine};
pub use error::ScrapeError;
pub use fetch::{FetchedPage, PageClient};
pub use log::ScrapeLog;
pub use orchestrator::{PriceScraper, ScrapeReport};
pub use strategies::StrategyKind;
