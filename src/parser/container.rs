//! `.msg` container parser.
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ HEADER (96 bytes, fixed)             │
//! │  magic: u32 (native endian)          │
//! │  (format specific, not parsed)       │
//! ├──────────────────────────────────────┤
//! │ PAYLOAD                              │
//! │  UTF-16LE when a footer exists,      │
//! │  legacy single-byte text otherwise   │
//! ├──────────────────────────────────────┤
//! │ FOOTER (optional)                    │
//! │  starts at the LAST b"message\0"     │
//! │  legacy text, `message <Name>...`    │
//! └──────────────────────────────────────┘
//! ```
//!
//! The marker is searched over the whole file, header included. Checksums,
//! if the format has any, are not validated.

use std::path::Path;

use tracing::trace;

use crate::error::{MsgError, Result};
use crate::model::entry::{Layout, ParsedEntry};
use crate::parser::matcher::MarkerSearch;
use crate::parser::text::{decode_utf16le, LegacyEncoding};

/// Fixed header size in bytes.
pub const HEADER_SIZE: usize = 96;

/// Marker opening the optional footer.
pub const FOOTER_MARKER: &[u8; 8] = b"message\0";

/// Header magic announcing a NUL-terminated name at the start of the payload.
pub const EMBEDDED_NAME_MAGIC: u32 = 0xF654_2E8D;

/// Parser for `.msg` containers.
///
/// Holds the run's legacy encoding and a precompiled marker search, so one
/// instance can be shared by every worker thread.
#[derive(Debug, Clone)]
pub struct ContainerParser {
    encoding: LegacyEncoding,
    marker: MarkerSearch<'static>,
}

impl ContainerParser {
    /// Create a parser that decodes untagged payloads with `encoding`.
    pub fn new(encoding: LegacyEncoding) -> Self {
        Self {
            encoding,
            marker: MarkerSearch::new(FOOTER_MARKER),
        }
    }

    /// The legacy encoding configured for this run.
    pub fn encoding(&self) -> LegacyEncoding {
        self.encoding
    }

    /// Split `raw` into header, payload and footer and decode the payload.
    ///
    /// Fails only for files shorter than the header. Decoding never fails.
    pub fn parse<'a>(&self, raw: &'a [u8]) -> Result<ParsedEntry<'a>> {
        if raw.len() < HEADER_SIZE {
            return Err(MsgError::TruncatedContainer { len: raw.len() });
        }
        let header = &raw[..HEADER_SIZE];

        match self.marker.find_last(raw) {
            // A marker inside the header would leave no payload at all.
            Some(footer_start) if footer_start >= HEADER_SIZE => {
                let payload = &raw[HEADER_SIZE..footer_start];
                trace!(
                    footer_start,
                    payload_len = payload.len(),
                    "Tagged container"
                );
                Ok(ParsedEntry {
                    text: decode_utf16le(payload),
                    layout: Layout::Tagged,
                    header,
                    payload,
                    footer: Some(&raw[footer_start..]),
                })
            }
            Some(footer_start) => {
                trace!(footer_start, "Footer marker inside header");
                Ok(ParsedEntry {
                    text: String::new(),
                    layout: Layout::Tagged,
                    header,
                    payload: &raw[HEADER_SIZE..HEADER_SIZE],
                    footer: Some(&raw[footer_start..]),
                })
            }
            None => {
                let payload = &raw[HEADER_SIZE..];
                Ok(ParsedEntry {
                    text: self.encoding.decode_stripped(payload),
                    layout: Layout::Plain,
                    header,
                    payload,
                    footer: None,
                })
            }
        }
    }
}

/// Read a whole container file into memory.
pub fn read_container(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            MsgError::InputNotFound(path.to_path_buf())
        } else {
            MsgError::io(path, e)
        }
    })
}
