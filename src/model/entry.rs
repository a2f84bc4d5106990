//! Parsed container and resolved entry types.

use std::path::PathBuf;

use byteorder::{ByteOrder, NativeEndian};
use serde::Serialize;

/// Which of the two known container layouts a file uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// No footer marker: legacy single-byte payload up to EOF.
    Plain,
    /// Footer marker found: UTF-16LE payload, footer carries the entry tag.
    Tagged,
}

/// One decoded container.
///
/// `header`, `payload` and `footer` borrow from the raw file bytes and
/// cannot outlive them.
#[derive(Debug, Clone)]
pub struct ParsedEntry<'a> {
    /// Decoded payload text.
    pub text: String,
    /// Layout selected for this file.
    pub layout: Layout,
    /// The fixed-size header (always exactly `HEADER_SIZE` bytes).
    pub header: &'a [u8],
    /// Raw payload bytes, between the header and the footer (or EOF).
    pub payload: &'a [u8],
    /// Raw footer bytes starting at the last marker, for tagged entries.
    pub footer: Option<&'a [u8]>,
}

impl ParsedEntry<'_> {
    /// Whether the entry belongs in the `messages` subdirectory.
    pub fn is_tagged_message(&self) -> bool {
        self.layout == Layout::Tagged
    }

    /// The first four header bytes as a native-endian `u32`.
    pub fn header_magic(&self) -> u32 {
        NativeEndian::read_u32(&self.header[..4])
    }
}

/// Where a resolved entry name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NameSource {
    /// Word run after `message ` in the footer.
    FooterTag,
    /// NUL-terminated name at the start of the payload, behind the header magic.
    EmbeddedHeader,
    /// The source file's stem.
    SourceFile,
}

/// A single output file written by an extraction run.
#[derive(Debug, Clone, Serialize)]
pub struct WrittenEntry {
    /// The `.msg` file the text came from.
    pub source: PathBuf,
    /// The `.txt` file that was written.
    pub output: PathBuf,
    /// Final, collision-free entry name (without `.txt`).
    pub name: String,
    /// How the name was derived.
    pub name_source: NameSource,
    /// Whether the entry was routed to the `messages` subdirectory.
    pub tagged: bool,
    /// Size of the written UTF-8 text in bytes.
    pub bytes: u64,
}

/// A file that could not be extracted.
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    /// The `.msg` file that failed.
    pub source: PathBuf,
    /// Error category (see `MsgError::kind`).
    pub kind: &'static str,
    /// Human-readable error message.
    pub error: String,
}
