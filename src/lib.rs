#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod config;
pub mod error;
pub mod lease;
pub mod lock;
pub mod policy;
pub mod storage;
pub mod time;

pub mod test_utils;

pub use config::{LockConfig, LockOptions};
pub use error::{Error, Result, StoreError};
pub use lease::Lease;
pub use lock::LeaseLock;
pub use policy::{Clause, Matcher, PermissionPreset, PermissionSet, PresetGraph, Validator};
pub use storage::{InMemoryStore, LeaseStore};
