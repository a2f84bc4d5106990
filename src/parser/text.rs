//! Payload text decoding.
//!
//! None of these functions can fail: garbage bytes always produce *some*
//! string, either by byte-for-byte reinterpretation (ISO-8859-1) or by
//! U+FFFD replacement (UTF-8, UTF-16LE).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Single-byte legacy encoding used for untagged payloads and footer tags.
///
/// Both variants are seen in the wild and nothing in the container says which
/// one applies, so the caller picks one per run.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum LegacyEncoding {
    /// ISO-8859-1: every byte maps to the code point of the same value.
    #[default]
    #[serde(rename = "iso-8859-1", alias = "latin1")]
    #[value(name = "iso-8859-1", alias = "latin1")]
    Iso8859_1,
    /// UTF-8 with lossy replacement of invalid sequences.
    #[serde(rename = "utf-8", alias = "utf8")]
    #[value(name = "utf-8", alias = "utf8")]
    Utf8,
}

impl LegacyEncoding {
    /// Canonical label, as used in config files.
    pub fn label(self) -> &'static str {
        match self {
            Self::Iso8859_1 => "iso-8859-1",
            Self::Utf8 => "utf-8",
        }
    }

    /// Decode `bytes` without any further cleanup.
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Iso8859_1 => encoding_rs::mem::decode_latin1(bytes).into_owned(),
            Self::Utf8 => {
                let (text, had_errors) = encoding_rs::UTF_8.decode_without_bom_handling(bytes);
                if had_errors {
                    tracing::trace!(len = bytes.len(), "Replaced invalid UTF-8 sequences");
                }
                text.into_owned()
            }
        }
    }

    /// Decode `bytes` and drop every NUL character left over from padding.
    pub fn decode_stripped(self, bytes: &[u8]) -> String {
        strip_nul(self.decode(bytes))
    }
}

impl fmt::Display for LegacyEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Decode a UTF-16LE payload. A BOM is not sniffed; a dangling odd byte
/// becomes U+FFFD.
pub fn decode_utf16le(bytes: &[u8]) -> String {
    let (text, had_errors) = encoding_rs::UTF_16LE.decode_without_bom_handling(bytes);
    if had_errors {
        tracing::trace!(len = bytes.len(), "Replaced invalid UTF-16 sequences");
    }
    text.into_owned()
}

fn strip_nul(text: String) -> String {
    if text.contains('\0') {
        text.replace('\0', "")
    } else {
        text
    }
}
