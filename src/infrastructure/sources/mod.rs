//! # Asset Sources
//!
//! Port and HTTP adapters for the bank, securities and insurance services.
//!
//! - [`traits::SourceClient`]: fetch port used by the coordinator
//! - [`http_source::HttpSourceClient`]: reqwest-backed implementation
//! - [`error::SourceError`]: transport and protocol failures

pub mod error;
pub mod http_client;
pub mod http_source;
pub mod traits;

pub use error::{SourceError, SourceResult};
pub use http_client::HttpClient;
pub use http_source::HttpSourceClient;
pub use traits::{FetchResult, SourceClient, SourceFetch};
