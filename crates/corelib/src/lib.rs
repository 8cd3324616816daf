//! Cluster model shared by the node-set selectors.
//!
//! This crate provides the pieces a selector reads but never mutates:
//! - Node identifiers and descriptors
//! - Hierarchical locations and their scopes
//! - Replication properties
//! - The cluster configuration snapshot and the storage-set validity check

pub mod config;
pub mod error;
pub mod hash;
pub mod node;
pub mod replication;
pub mod topology;

pub use config::{valid_storage_set, ClusterConfig, LogAttributes, LogId};
pub use error::{Error, Result};
pub use node::{NodeDescriptor, NodeId, StorageSet};
pub use replication::ReplicationProperty;
pub use topology::{Location, LocationScope};
