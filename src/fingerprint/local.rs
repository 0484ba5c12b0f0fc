// Fingerprint of a staged PEM certificate

use super::{Digest, Fingerprint, expiry_of};
use crate::error::SyncError;
use std::fs;
use std::path::Path;
use x509_parser::pem::parse_x509_pem;
use x509_parser::prelude::*;

/// Fingerprint the first PEM block of a certificate file
///
/// Only the first block is looked at; a chain file yields the fingerprint of
/// its leading certificate.
pub fn fingerprint_file(path: &Path) -> Result<Fingerprint, SyncError> {
    let data = fs::read(path).map_err(|source| SyncError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let (_, pem) = parse_x509_pem(&data).map_err(|e| SyncError::Format {
        path: path.to_path_buf(),
        reason: format!("no PEM block found: {:?}", e),
    })?;

    let (rem, cert) = X509Certificate::from_der(&pem.contents).map_err(|e| SyncError::Format {
        path: path.to_path_buf(),
        reason: format!("parsing certificate: {:?}", e),
    })?;

    if !rem.is_empty() {
        return Err(SyncError::Format {
            path: path.to_path_buf(),
            reason: format!("{} trailing bytes after certificate", rem.len()),
        });
    }

    Ok(Fingerprint {
        digest: Digest::of(&pem.contents),
        not_after: expiry_of(&cert),
    })
}
