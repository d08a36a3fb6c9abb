//! # Sysconfig Syncer
//!
//! Keeps the container runtime's system configuration in step with cluster
//! registry policy.
//!
//! Independent event sources call the mutation operations of a shared
//! [`ConfigSyncer`]; a single writer task turns each change into a full
//! rewrite of three artifacts:
//!
//! - `registries.conf` - mirrors, allowed/blocked/insecure registries
//! - `policy.json` - signature policy with reject rules for blocked registries
//! - `certs.d/<registry>/ca.crt` - trusted registry certificate authorities
//!
//! ## Example
//!
//! ```rust,no_run
//! use sysconfig_syncer::{ConfigSyncer, SyncerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let syncer = ConfigSyncer::start(SyncerConfig::under("/host"));
//!
//!     syncer
//!         .set_mirrors("quay.io", vec!["mirror.example.com/quay".to_string()])
//!         .await?;
//!
//!     // Mutations return once the writer has accepted them; wait for disk.
//!     let report = syncer.wait_for_pass(1).await?;
//!     assert!(report.is_success());
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod certs;
pub mod config;
pub mod error;
pub mod global;
pub mod report;
pub mod signal;
pub mod sink;
pub mod syncer;
pub mod writer;

// Re-export main types at crate root
pub use certs::CertMaterializer;
pub use config::SyncerConfig;
pub use error::{Result, SyncError};
pub use global::global;
pub use report::{PassOutcome, PassReport, PassStage, PassSummary};
pub use signal::{change_signal, PersistRequest, SignalReceiver, SignalSender};
pub use sink::ConfigSink;
pub use syncer::ConfigSyncer;
pub use writer::{PassFailure, PersistenceWriter};

pub use sysconfig_core::{CertTuple, ConfigModel};
