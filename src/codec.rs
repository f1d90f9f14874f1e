//! Asset codec seam.
//!
//! The caches never interpret image bytes themselves. A [`Codec`] turns raw
//! bytes into the decoded asset held by the memory tier, back into bytes for
//! the disk tier, and estimates how much memory a decoded asset occupies.

use bytes::Bytes;

use crate::error::CodecError;

/// Converts between stored bytes and decoded assets.
pub trait Codec: Send + Sync {
    type Asset: Clone + Send + Sync + 'static;

    fn decode(&self, bytes: &[u8]) -> Result<Self::Asset, CodecError>;

    /// Lossless encoding used when writing to the disk tier.
    fn encode(&self, asset: &Self::Asset) -> Result<Bytes, CodecError>;

    /// Approximate memory footprint, e.g. bytes-per-row * height for a bitmap.
    fn cost(&self, asset: &Self::Asset) -> u64;
}

/// Codec that keeps the encoded bytes as the asset.
///
/// Useful when decoding happens elsewhere (GPU upload, a UI toolkit) and the
/// cache only needs to hold the original payload. Empty payloads are
/// rejected, the same way an image decoder refuses empty input.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesCodec;

impl Codec for BytesCodec {
    type Asset = Bytes;

    fn decode(&self, bytes: &[u8]) -> Result<Bytes, CodecError> {
        if bytes.is_empty() {
            return Err(CodecError::Decode("empty payload".to_string()));
        }
        Ok(Bytes::copy_from_slice(bytes))
    }

    fn encode(&self, asset: &Bytes) -> Result<Bytes, CodecError> {
        Ok(asset.clone())
    }

    fn cost(&self, asset: &Bytes) -> u64 {
        asset.len() as u64
    }
}
