//! Composite ledger keys built from ordered string segments.
//!
//! Plaintext and encrypted records share one addressing scheme: both paths
//! derive their ledger key through [`CompositeKey::encode`].

use std::fmt;

use serde::Deserialize;

/// How a [`CompositeKey`] is flattened into its ledger string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyScheme {
    /// Each segment is written as `<byte-len>:<segment>`. Distinct segment
    /// sequences never produce the same key.
    #[default]
    LengthPrefixed,
    /// Bare concatenation. `("ab","c")` and `("a","bc")` collide; callers
    /// must pick segment boundaries that avoid this.
    Concatenated,
}

impl fmt::Display for KeyScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyScheme::LengthPrefixed => f.write_str("length-prefixed"),
            KeyScheme::Concatenated => f.write_str("concatenated"),
        }
    }
}

/// An ordered sequence of opaque segments identifying one ledger entry.
///
/// Only the encoded string form is ever persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeKey {
    segments: Vec<String>,
}

impl CompositeKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Flatten the segments, left to right, under `scheme`.
    pub fn encode(&self, scheme: KeyScheme) -> String {
        match scheme {
            KeyScheme::Concatenated => self.segments.concat(),
            KeyScheme::LengthPrefixed => {
                let mut out = String::with_capacity(
                    self.segments.iter().map(|s| s.len() + 4).sum(),
                );
                for seg in &self.segments {
                    out.push_str(&seg.len().to_string());
                    out.push(':');
                    out.push_str(seg);
                }
                out
            }
        }
    }
}
