//! # Domain Layer
//!
//! Value objects, entities and the currency converter. Nothing here
//! performs I/O.

pub mod entities;
pub mod errors;
pub mod services;
pub mod value_objects;
