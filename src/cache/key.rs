//! Key Normalization Module
//!
//! Turns an arbitrary cache key (usually a URL) into a single path segment.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Characters that are not allowed to survive into a file name.
const UNSAFE_CHARS: [char; 6] = ['/', ':', '?', '=', '&', '%'];

// == Normalized Key ==
/// Filesystem-safe identifier derived from a cache key.
///
/// Distinct keys may collide after substitution (for example two encodings
/// differing only in `/` vs `=`); the caches do not guard against that.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// == Normalize ==
/// Base64-encodes the UTF-8 bytes of `key`, then replaces `/ : ? = & %` with `_`.
pub fn normalize(key: &str) -> NormalizedKey {
    let encoded = STANDARD.encode(key.as_bytes());
    NormalizedKey(encoded.replace(UNSAFE_CHARS, "_"))
}
