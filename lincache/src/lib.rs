#![doc = include_str!("../../README.md")]
#![deny(missing_docs)]
#![cfg_attr(all(doc, ENABLE_DOC_AUTO_CFG), feature(doc_auto_cfg))]

mod cache;
mod config;
mod error;
mod linked_map;
mod lru;
mod mru;
#[cfg(feature = "serde")]
mod pairs;
mod policy;

pub use cache::Cache;
pub use config::{
    CacheConfig,
    DEFAULT_RATIO,
};
pub use error::{
    Error,
    Result,
};
pub use linked_map::{
    Cursor,
    IntoIter,
    Iter,
    Keys,
    LinkedMap,
    Touch,
    Values,
};
pub use policy::Policy;

#[cfg(not(feature = "ahash"))]
type RandomState = std::hash::RandomState;
#[cfg(feature = "ahash")]
type RandomState = ahash::RandomState;

