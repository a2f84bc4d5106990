//! Entry name resolution.
//!
//! Precedence, first hit wins:
//! 1. the footer tag (`message <Word>` in the footer),
//! 2. the NUL-terminated name behind [`EMBEDDED_NAME_MAGIC`],
//! 3. the source file stem.
//!
//! A footer whose tag yields no word skips straight to the file stem.

use std::path::Path;

use tracing::debug;

use crate::error::{MsgError, Result};
use crate::model::entry::{NameSource, ParsedEntry};
use crate::parser::container::EMBEDDED_NAME_MAGIC;
use crate::parser::text::LegacyEncoding;

/// Separator looked up in the decoded footer. Unlike the raw marker it ends
/// in a space.
pub const TAG_SEPARATOR: &str = "message ";

/// A candidate entry name and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub name: String,
    pub source: NameSource,
}

/// Compute the candidate name for `entry`, parsed from the file at `source`.
///
/// The result is sanitized and never empty.
pub fn resolve_name(
    entry: &ParsedEntry<'_>,
    source: &Path,
    encoding: LegacyEncoding,
) -> Result<ResolvedName> {
    let resolved = if let Some(footer) = entry.footer {
        footer_tag(footer, encoding).map(|name| ResolvedName {
            name,
            source: NameSource::FooterTag,
        })
    } else if entry.header_magic() == EMBEDDED_NAME_MAGIC {
        embedded_name(entry.payload).map(|raw| ResolvedName {
            name: sanitize_name(&encoding.decode(raw)),
            source: NameSource::EmbeddedHeader,
        })
    } else {
        None
    };

    let resolved = match resolved {
        Some(r) => r,
        None => {
            let stem = source
                .file_stem()
                .map(|s| s.to_string_lossy())
                .unwrap_or_default();
            ResolvedName {
                name: sanitize_name(&stem),
                source: NameSource::SourceFile,
            }
        }
    };

    if resolved.name.is_empty() {
        return Err(MsgError::EmptyResolvedName(source.to_path_buf()));
    }

    debug!(
        path = %source.display(),
        name = %resolved.name,
        source = ?resolved.source,
        "Resolved entry name"
    );
    Ok(resolved)
}

/// Word run following the last `message ` in the decoded footer.
fn footer_tag(footer: &[u8], encoding: LegacyEncoding) -> Option<String> {
    let text = encoding.decode_stripped(footer);
    let start = text.rfind(TAG_SEPARATOR)? + TAG_SEPARATOR.len();
    let word: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    (!word.is_empty()).then_some(word)
}

/// First NUL-terminated run in `payload`, ignoring leading NULs.
///
/// A run cut off by the end of the payload still counts.
fn embedded_name(payload: &[u8]) -> Option<&[u8]> {
    let start = payload.iter().position(|&b| b != 0)?;
    let rest = &payload[start..];
    let end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Replace characters the host filesystem rejects in file names with `_`.
///
/// Re-scans until the name is clean.
pub fn sanitize_name(name: &str) -> String {
    let mut name = name.to_string();
    while name.contains(is_invalid_name_char) {
        name = name.replace(is_invalid_name_char, "_");
    }
    name
}

/// Whether `c` is invalid in a path or file name on this host.
#[cfg(windows)]
pub fn is_invalid_name_char(c: char) -> bool {
    matches!(c, '"' | '<' | '>' | '|' | ':' | '*' | '?' | '\\' | '/') || (c as u32) < 0x20
}

/// Whether `c` is invalid in a path or file name on this host.
#[cfg(not(windows))]
pub fn is_invalid_name_char(c: char) -> bool {
    c == '/' || c == '\0'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entry::Layout;
    use crate::parser::container::{ContainerParser, HEADER_SIZE};

    const ENC: LegacyEncoding = LegacyEncoding::Iso8859_1;

    fn parse_and_resolve(raw: &[u8], source: &str) -> ResolvedName {
        let entry = ContainerParser::new(ENC).parse(raw).unwrap();
        resolve_name(&entry, Path::new(source), ENC).unwrap()
    }

    fn with_magic(payload: &[u8]) -> Vec<u8> {
        let mut raw = vec![0u8; HEADER_SIZE];
        raw[..4].copy_from_slice(&EMBEDDED_NAME_MAGIC.to_ne_bytes());
        raw.extend_from_slice(payload);
        raw
    }

    #[test]
    fn test_footer_tag() {
        let mut raw = vec![0u8; HEADER_SIZE];
        raw.extend_from_slice(b"Hello");
        raw.extend_from_slice(b"message\0");
        raw.extend_from_slice(b"message FooBar extra");
        let r = parse_and_resolve(&raw, "dir/0001.msg");
        assert_eq!(r.name, "FooBar");
        assert_eq!(r.source, NameSource::FooterTag);
    }

    #[test]
    fn test_footer_tag_stops_at_non_word() {
        assert_eq!(
            footer_tag(b"message\0message Item_01-b", ENC).as_deref(),
            Some("Item_01")
        );
    }

    #[test]
    fn test_footer_without_tag_falls_back_to_file() {
        let mut raw = with_magic(b"\0Bar\0");
        raw.extend_from_slice(b"message\0 ???");
        let r = parse_and_resolve(&raw, "msgs/0042.msg");
        // The embedded name is not consulted once a footer exists.
        assert_eq!(r.name, "0042");
        assert_eq!(r.source, NameSource::SourceFile);
    }

    #[test]
    fn test_embedded_name() {
        let raw = with_magic(b"\0Bar\0more text");
        let r = parse_and_resolve(&raw, "x/file.msg");
        assert_eq!(r.name, "Bar");
        assert_eq!(r.source, NameSource::EmbeddedHeader);
    }

    #[test]
    fn test_embedded_name_without_terminator() {
        assert_eq!(embedded_name(b"\0\0abc"), Some(&b"abc"[..]));
        assert_eq!(embedded_name(b"\0\0\0"), None);
        assert_eq!(embedded_name(b""), None);
    }

    #[test]
    fn test_embedded_name_is_sanitized() {
        let raw = with_magic(b"a/b\0");
        let r = parse_and_resolve(&raw, "x/file.msg");
        assert_eq!(r.name, "a_b");
        assert!(!r.name.contains(is_invalid_name_char));
    }

    #[test]
    fn test_wrong_magic_uses_file_stem() {
        let mut raw = vec![0u8; HEADER_SIZE];
        raw.extend_from_slice(b"\0Bar\0");
        let r = parse_and_resolve(&raw, "x/00A1.msg");
        assert_eq!(r.name, "00A1");
        assert_eq!(r.source, NameSource::SourceFile);
    }

    #[test]
    fn test_empty_payload_with_magic_uses_file_stem() {
        let raw = with_magic(b"");
        let entry = ContainerParser::new(ENC).parse(&raw).unwrap();
        assert_eq!(entry.layout, Layout::Plain);
        let r = resolve_name(&entry, Path::new("a/b.msg"), ENC).unwrap();
        assert_eq!(r.name, "b");
    }

    #[test]
    fn test_empty_source_name_is_an_error() {
        let raw = vec![0u8; HEADER_SIZE];
        let entry = ContainerParser::new(ENC).parse(&raw).unwrap();
        let err = resolve_name(&entry, Path::new(""), ENC).unwrap_err();
        assert!(matches!(err, MsgError::EmptyResolvedName(_)));
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("plain"), "plain");
        assert_eq!(sanitize_name("a/b/c"), "a_b_c");
        assert_eq!(sanitize_name("nul\0here"), "nul_here");
        for name in ["x/y", "\0", "//", "ok"] {
            assert!(!sanitize_name(name).contains(is_invalid_name_char));
        }
    }
}
