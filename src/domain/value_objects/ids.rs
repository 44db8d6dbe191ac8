//! # Identifiers
//!
//! String-backed identifiers for customers, traces and persisted documents.
//!
//! Each identifier rejects blank input at construction, so holding one is
//! proof that the value is usable as a key.

use crate::domain::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates the identifier, trimming surrounding whitespace.
            ///
            /// # Errors
            ///
            /// Returns `DomainError::BlankIdentifier` if the value is blank.
            pub fn new(value: impl AsRef<str>) -> DomainResult<Self> {
                let trimmed = value.as_ref().trim();
                if trimmed.is_empty() {
                    return Err(DomainError::BlankIdentifier($label));
                }
                Ok(Self(trimmed.to_string()))
            }

            /// Returns the identifier as a string slice.
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of the customer whose assets are aggregated.
    CustomerId,
    "customerId"
);

string_id!(
    /// Correlation id carried through one aggregation request.
    TraceId,
    "traceId"
);

string_id!(
    /// Generated id of a persisted document.
    DocumentId,
    "documentId"
);

impl TraceId {
    /// Generates a fresh random trace id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Uses `candidate` when it is non-blank, otherwise `fallback`.
    #[must_use]
    pub fn or_fallback(candidate: Option<&str>, fallback: &TraceId) -> Self {
        candidate
            .and_then(|value| Self::new(value).ok())
            .unwrap_or_else(|| fallback.clone())
    }
}

impl DocumentId {
    /// Generates a fresh random document id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }
}
