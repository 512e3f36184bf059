//! kenbio-resolve library interface
//!
//! Read path for the Kenya biodiversity explorer: region catalog, region →
//! place resolution, species aggregates, taxon detail, image identification
//! and raw Registry occurrences. Every operation degrades to an empty result
//! on provider failure; consumers never handle provider errors.

pub mod error;
pub mod explorer;
pub mod models;
pub mod normalize;
pub mod providers;
pub mod services;
pub mod taxa;

pub use crate::error::{ProviderError, ProviderResult};
pub use crate::explorer::Explorer;
