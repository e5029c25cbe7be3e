//! Checksum use case (§10.6 supplement, §6 "Checksums").

use sandboxfs_adapters::{compute_checksum as run_checksum, Algorithm, Encoding};
use sandboxfs_shared::{RequestContext, Result};

use crate::deps::Deps;
use crate::instrumentation::instrument;

const OP: &str = "compute_checksum";

/// Wire-level digest algorithm selector for [`ComputeChecksumInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumAlgorithm {
    /// MD5.
    Md5,
    /// SHA-1.
    Sha1,
    /// SHA-256 (the default).
    Sha256,
    /// SHA-512.
    Sha512,
}

impl Default for ChecksumAlgorithm {
    fn default() -> Self {
        Self::Sha256
    }
}

impl From<ChecksumAlgorithm> for Algorithm {
    fn from(value: ChecksumAlgorithm) -> Self {
        match value {
            ChecksumAlgorithm::Md5 => Self::Md5,
            ChecksumAlgorithm::Sha1 => Self::Sha1,
            ChecksumAlgorithm::Sha256 => Self::Sha256,
            ChecksumAlgorithm::Sha512 => Self::Sha512,
        }
    }
}

/// Wire-level digest encoding selector for [`ComputeChecksumInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumEncoding {
    /// Lowercase hexadecimal (the default).
    Hex,
    /// Standard base64.
    Base64,
}

impl Default for ChecksumEncoding {
    fn default() -> Self {
        Self::Hex
    }
}

impl From<ChecksumEncoding> for Encoding {
    fn from(value: ChecksumEncoding) -> Self {
        match value {
            ChecksumEncoding::Hex => Self::Hex,
            ChecksumEncoding::Base64 => Self::Base64,
        }
    }
}

/// Request payload for [`compute_checksum`].
#[derive(Debug, Clone, Default)]
pub struct ComputeChecksumInput {
    /// The file to checksum.
    pub path: String,
    /// The digest algorithm.
    pub algorithm: ChecksumAlgorithm,
    /// The textual encoding of the digest.
    pub encoding: ChecksumEncoding,
    /// Files larger than this are rejected rather than hashed.
    pub max_file_size: Option<u64>,
}

/// Streams `path` through the requested digest algorithm and returns the
/// encoded checksum.
pub async fn compute_checksum(
    ctx: &RequestContext,
    deps: &Deps,
    input: ComputeChecksumInput,
) -> Result<String> {
    instrument(
        deps.diagnostics.as_ref(),
        deps.clock.as_ref(),
        OP,
        Some(std::path::Path::new(&input.path)),
        async {
            let resolved = deps
                .sandbox
                .validate_existing_path(ctx, deps.fs.as_ref(), &input.path)
                .await?;

            let max_file_size = input
                .max_file_size
                .unwrap_or(deps.limits.hard_cap_checksum_max_file_size_bytes)
                .min(deps.limits.hard_cap_checksum_max_file_size_bytes);

            run_checksum(
                deps.fs.as_ref(),
                ctx,
                &resolved,
                input.algorithm.into(),
                input.encoding.into(),
                max_file_size,
            )
            .await
        },
    )
    .await
}
