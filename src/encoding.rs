//! Conversion between UTF-8 and the engine's legacy byte encoding.
//!
//! Both directions are lossy rather than fallible: undecodable bytes turn into
//! U+FFFD and characters the target charset cannot represent turn into `?`.

use std::borrow::Cow;

use encoding_rs::{EncoderResult, Encoding, EUC_JP, SHIFT_JIS, UTF_8};
use serde::Serialize;

use crate::constants::DEFAULT_CHARSET;

/// Byte encoding spoken by an engine instance.
///
/// Keeps the label it was created from for reporting, and the resolved
/// encoder used for actual conversion. Labels no encoder recognizes resolve
/// to UTF-8.
#[derive(Debug, Clone)]
pub struct Charset {
    label: String,
    encoding: &'static Encoding,
    recognized: bool,
}

impl Charset {
    /// The UTF-8 charset.
    pub fn utf8() -> Self {
        Self {
            label: DEFAULT_CHARSET.to_string(),
            encoding: UTF_8,
            recognized: true,
        }
    }

    /// Resolves a charset label such as `EUC-JP`, `utf8` or `Shift_JIS`.
    pub fn new(label: &str) -> Self {
        let label = label.trim();
        match resolve_encoding(label) {
            Some(encoding) => Self {
                label: label.to_string(),
                encoding,
                recognized: true,
            },
            None => Self {
                label: label.to_string(),
                encoding: UTF_8,
                recognized: false,
            },
        }
    }

    /// The label this charset was created from.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Canonical name of the encoder in use.
    pub fn encoding_name(&self) -> &'static str {
        self.encoding.name()
    }

    pub fn is_utf8(&self) -> bool {
        self.encoding == UTF_8
    }

    /// Whether the label named a known encoding.
    pub fn is_recognized(&self) -> bool {
        self.recognized
    }
}

impl Default for Charset {
    fn default() -> Self {
        Self::utf8()
    }
}

impl PartialEq for Charset {
    fn eq(&self, other: &Self) -> bool {
        self.encoding == other.encoding
    }
}

impl std::fmt::Display for Charset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}

impl Serialize for Charset {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label)
    }
}

fn resolve_encoding(label: &str) -> Option<&'static Encoding> {
    let compact: String = label
        .chars()
        .filter(|ch| *ch != '-' && *ch != '_')
        .flat_map(char::to_lowercase)
        .collect();
    match compact.as_str() {
        "utf8" => Some(UTF_8),
        "eucjp" => Some(EUC_JP),
        "shiftjis" | "sjis" | "cp932" | "ms932" | "windows31j" => Some(SHIFT_JIS),
        _ => Encoding::for_label(label.as_bytes()),
    }
}

/// Encodes UTF-8 text into `charset` bytes for the engine.
pub fn to_system(text: &str, charset: &Charset) -> Vec<u8> {
    if charset.is_utf8() {
        return text.as_bytes().to_vec();
    }

    let mut encoder = charset.encoding.new_encoder();
    let mut output = Vec::with_capacity(
        encoder
            .max_buffer_length_from_utf8_without_replacement(text.len())
            .unwrap_or(text.len()),
    );
    let mut remaining = text;
    loop {
        let (result, read) =
            encoder.encode_from_utf8_to_vec_without_replacement(remaining, &mut output, true);
        remaining = &remaining[read..];
        match result {
            EncoderResult::InputEmpty => break,
            EncoderResult::OutputFull => {
                let needed = encoder
                    .max_buffer_length_from_utf8_without_replacement(remaining.len())
                    .unwrap_or(remaining.len() * 4 + 16);
                output.reserve(needed);
            }
            EncoderResult::Unmappable(_) => output.push(b'?'),
        }
    }
    output
}

/// Decodes engine bytes in `charset` back into UTF-8.
pub fn to_utf8(bytes: &[u8], charset: &Charset) -> String {
    if charset.is_utf8() {
        return String::from_utf8_lossy(bytes).into_owned();
    }
    let (decoded, _had_errors) = charset.encoding.decode_without_bom_handling(bytes);
    decoded.into_owned()
}

/// Repairs invalid UTF-8 by substituting U+FFFD for each bad sequence.
pub fn sanitize_utf8(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}
