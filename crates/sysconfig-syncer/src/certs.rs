//! Certificate trust directory materialization.
//!
//! Lays out `<root>/<folder-name>/ca.crt` for every certificate tuple. The
//! tree is owned entirely by the synchronizer: it is removed and rebuilt on
//! every pass, so registries dropped from the tuple set disappear from disk.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sysconfig_core::{CertTuple, CA_CERT_FILE_NAME};
use tracing::debug;

use crate::error::{Result, SyncError};

/// Writes certificate tuples into a trust directory.
#[derive(Debug, Clone)]
pub struct CertMaterializer {
    root: PathBuf,
}

impl CertMaterializer {
    /// Creates a materializer rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root of the trust directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the certificate for `tuple`.
    #[must_use]
    pub fn folder_path(&self, tuple: &CertTuple) -> PathBuf {
        self.root.join(tuple.folder_name())
    }

    /// Path of the certificate file for `tuple`.
    #[must_use]
    pub fn cert_path(&self, tuple: &CertTuple) -> PathBuf {
        self.folder_path(tuple).join(CA_CERT_FILE_NAME)
    }

    /// Recursively removes the trust directory. A missing root is fine.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists and cannot be removed.
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SyncError::io(&self.root, e)),
        }
    }

    /// Writes one certificate, creating its folder.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder or file cannot be written.
    pub async fn write(&self, tuple: &CertTuple) -> Result<PathBuf> {
        let folder = self.folder_path(tuple);
        tokio::fs::create_dir_all(&folder)
            .await
            .map_err(|e| SyncError::io(&folder, e))?;

        let path = self.cert_path(tuple);
        tokio::fs::write(&path, tuple.certificate.as_bytes())
            .await
            .map_err(|e| SyncError::io(&path, e))?;

        debug!(
            registry = %tuple.registry,
            path = %path.display(),
            fingerprint = %tuple.fingerprint(),
            "wrote registry certificate"
        );
        Ok(path)
    }

    /// Writes every tuple in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first write error; later tuples are not written.
    pub async fn write_all(&self, tuples: &[CertTuple]) -> Result<usize> {
        for tuple in tuples {
            self.write(tuple).await?;
        }
        Ok(tuples.len())
    }
}
