//! Node-set selection for replicated logs.
//!
//! This crate decides which nodes may store copies of a log's records:
//! - How large the storage set should be
//! - Which failure domains it spans
//! - Which nodes of each domain it contains
//!
//! Selection is a pure function of the configuration snapshot, the log id
//! and the options; with a fixed seed it is fully reproducible.

pub mod domain;
pub mod draw;
pub mod error;
pub mod ratelimit;
pub mod selector;
pub mod sizer;

pub use domain::DomainMap;
pub use error::{ErrorKind, Result, SelectionError};
pub use selector::{
    Decision, NodeSetSelector, Options, RandomCrossDomainNodeSetSelector, RandomNodeSetSelector,
    SelectorKind,
};
pub use sizer::{size_storage_set, SizedPlan};
