//! Streamed checksum computation (§10.6 supplement, named in spec §6's
//! checksum input contract).

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use sha2::Digest;

use sandboxfs_domain::FsErrorKind;
use sandboxfs_ports::FileSystemPort;
use sandboxfs_shared::{ErrorEnvelope, RequestContext, Result};
use tokio::io::AsyncReadExt;

/// The supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// MD5 (128-bit), kept for compatibility with legacy callers.
    Md5,
    /// SHA-1 (160-bit), likewise legacy.
    Sha1,
    /// SHA-256 (256-bit), the recommended default.
    Sha256,
    /// SHA-512 (512-bit).
    Sha512,
}

/// How the digest bytes are textually encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Lowercase hexadecimal.
    Hex,
    /// Standard base64.
    Base64,
}

enum Hasher {
    Md5(md5::Context),
    Sha1(sha1::Sha1),
    Sha256(sha2::Sha256),
    Sha512(sha2::Sha512),
}

impl Hasher {
    fn new(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Md5 => Self::Md5(md5::Context::new()),
            Algorithm::Sha1 => Self::Sha1(sha1::Sha1::new()),
            Algorithm::Sha256 => Self::Sha256(sha2::Sha256::new()),
            Algorithm::Sha512 => Self::Sha512(sha2::Sha512::new()),
        }
    }

    fn update(&mut self, chunk: &[u8]) {
        match self {
            Self::Md5(context) => context.consume(chunk),
            Self::Sha1(hasher) => hasher.update(chunk),
            Self::Sha256(hasher) => hasher.update(chunk),
            Self::Sha512(hasher) => hasher.update(chunk),
        }
    }

    fn finish(self) -> Vec<u8> {
        match self {
            Self::Md5(context) => context.compute().0.to_vec(),
            Self::Sha1(hasher) => hasher.finalize().to_vec(),
            Self::Sha256(hasher) => hasher.finalize().to_vec(),
            Self::Sha512(hasher) => hasher.finalize().to_vec(),
        }
    }
}

fn encode(bytes: &[u8], encoding: Encoding) -> String {
    match encoding {
        Encoding::Hex => bytes.iter().map(|byte| format!("{byte:02x}")).collect(),
        Encoding::Base64 => BASE64_STANDARD.encode(bytes),
    }
}

/// Streams `path` through `algorithm` in fixed-size chunks, never holding
/// the whole file in memory, bounded by `max_file_size`.
pub async fn compute_checksum(
    fs: &dyn FileSystemPort,
    ctx: &RequestContext,
    path: &Path,
    algorithm: Algorithm,
    encoding: Encoding,
    max_file_size: u64,
) -> Result<String> {
    let metadata = fs.metadata(ctx, path.to_path_buf()).await?;
    if metadata.len > max_file_size {
        return Err(ErrorEnvelope::expected(
            FsErrorKind::InvalidInput.into_error_code(),
            format!(
                "file size {} exceeds maxFileSize {max_file_size} for checksum computation",
                metadata.len
            ),
        )
        .with_metadata("path", path.to_string_lossy()));
    }

    let mut file = fs.open(ctx, path.to_path_buf()).await?;
    let mut hasher = Hasher::new(algorithm);
    let mut buffer = vec![0u8; sandboxfs_config::limits::CHECKSUM_STREAM_CHUNK_BYTES];

    loop {
        ctx.ensure_not_cancelled("checksum.compute")?;
        let bytes_read = file.read(&mut buffer).await.map_err(ErrorEnvelope::from)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(encode(&hasher.finish(), encoding))
}
