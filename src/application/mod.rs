//! # Application Layer
//!
//! Use-case orchestration over the domain and the infrastructure ports.

pub mod cancellation;
pub mod error;
pub mod services;

pub use cancellation::CancellationSignal;
pub use error::{ApplicationError, ApplicationResult};
