//! Content fingerprints for duplicate-document detection.
//!
//! The fingerprint is the SHA-256 of the whitespace-normalised text, rendered
//! as 64 lowercase hex characters. Storage uses it as a uniqueness key, so the
//! normalisation below is frozen: any change must bump [`FINGERPRINT_VERSION`],
//! otherwise previously stored duplicates stop matching.
//!
//! # Normalisation (version 1)
//!
//! 1. Split on Unicode whitespace runs
//! 2. Drop empty pieces (trims both ends)
//! 3. Join with a single ASCII space

use std::fmt::Write;

use ring::digest;

/// Version of the normalisation + digest scheme used by [`fingerprint`].
pub const FINGERPRINT_VERSION: u32 = 1;

/// Collapse runs of whitespace to a single space and trim both ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Stable content digest of `raw_text`.
///
/// Empty input yields the digest of the empty string.
pub fn fingerprint(raw_text: &str) -> String {
    let normalized = normalize_whitespace(raw_text);
    let digest = digest::digest(&digest::SHA256, normalized.as_bytes());
    to_hex(digest.as_ref())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
            let _ = write!(out, "{b:02x}");
            out
        })
}
