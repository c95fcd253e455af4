//! Cache operation surface
//!
//! - `MultiNodeCacheClient`: the client capability this crate drives
//! - `CacheFacade`: operations routed through the self-healing topology cache

pub mod backend;
pub mod facade;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{sanitize_many, Fetched, MultiNodeCacheClient};
pub use facade::{CacheFacade, CacheResult};
