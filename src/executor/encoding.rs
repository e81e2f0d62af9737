//! Text decoding with an ordered encoding fallback

use crate::types::RerootError;
use encoding_rs::Encoding;
use std::path::Path;

/// Look up encoding labels, keeping their order.
///
/// Only encodings that can also be written back are accepted; UTF-16 and the
/// WHATWG `replacement` encoding encode to something else and are rejected.
pub fn resolve_encodings(labels: &[String]) -> Result<Vec<&'static Encoding>, RerootError> {
    if labels.is_empty() {
        return Err(RerootError::Config(
            "encodings must list at least one encoding".to_string(),
        ));
    }

    labels
        .iter()
        .map(|label| {
            let encoding = Encoding::for_label(label.trim().as_bytes())
                .ok_or_else(|| RerootError::Config(format!("unknown encoding: {label}")))?;
            if encoding.output_encoding() != encoding {
                return Err(RerootError::Config(format!(
                    "encoding cannot be used for writing: {label}"
                )));
            }
            Ok(encoding)
        })
        .collect()
}

/// Source text together with the encoding that decoded it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static Encoding,
}

/// First encoding that decodes `bytes` without errors.
///
/// No BOM sniffing: a UTF-8 BOM stays in the text as U+FEFF and is written
/// back unchanged.
pub fn decode_bytes(bytes: &[u8], encodings: &[&'static Encoding]) -> Option<DecodedText> {
    encodings.iter().find_map(|&encoding| {
        encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|text| DecodedText {
                text: text.into_owned(),
                encoding,
            })
    })
}

/// Read and decode a file; `None` if it cannot be read or no encoding fits.
pub fn read_text(path: &Path, encodings: &[&'static Encoding]) -> Option<DecodedText> {
    let bytes = std::fs::read(path).ok()?;
    decode_bytes(&bytes, encodings)
}

/// Encode text for writing; `None` if a character has no mapping.
pub fn encode_text(text: &str, encoding: &'static Encoding) -> Option<Vec<u8>> {
    let (bytes, _, had_errors) = encoding.encode(text);
    if had_errors {
        None
    } else {
        Some(bytes.into_owned())
    }
}
