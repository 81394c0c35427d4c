//! Derived-media cache for Mindia.
//!
//! Every `(source path, resolved transformation)` pair maps to one variant
//! path in the cache store, computed by [`derived_path`]. Variants are
//! built on a miss and served straight from the cache store on a hit. After
//! each build the source's [`Media`](mindia_core::Media) record gets its
//! variant list rebuilt from what the cache store actually holds.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod manager;
mod report;

pub use manager::{CacheManager, CachedVariant, derived_path};
pub use report::CleanupReport;
