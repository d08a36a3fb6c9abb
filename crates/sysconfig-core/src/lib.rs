//! # Sysconfig Core
//!
//! Desired container runtime configuration, as derived from cluster-level
//! registry policy objects.
//!
//! This crate provides the plain data model shared by the synchronizer and
//! its collaborators:
//!
//! - [`RegistriesModel`] - registry entries plus search-registry defaults,
//!   rendered as `registries.conf`
//! - [`PolicyModel`] - signature verification rules, rendered as `policy.json`
//! - [`CertTuple`] - a registry name and the CA certificate to trust for it
//! - [`ConfigModel`] - the composite record the synchronizer guards and
//!   mutates
//!
//! ## Example
//!
//! ```rust
//! use sysconfig_core::ConfigModel;
//!
//! let mut model = ConfigModel::default();
//! model
//!     .apply_registry_policy(&[], &["quay.io".to_string()], &[])
//!     .unwrap();
//!
//! assert!(model.policy.is_rejected("quay.io"));
//! assert_eq!(model.registries.get("quay.io").unwrap().blocked(), Some(true));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod certs;
pub mod error;
pub mod model;
pub mod policy;
pub mod registries;

#[cfg(test)]
mod proptest_tests;

// Re-export main types at crate root
pub use certs::{folder_name, CertTuple, CA_CERT_FILE_NAME};
pub use error::{ModelError, Result};
pub use model::ConfigModel;
pub use policy::{PolicyModel, PolicyRequirement, Transport};
pub use registries::{RegistriesModel, RegistryEntry, DEFAULT_SEARCH_REGISTRIES};
