//! Project descriptor loading with byte-order-mark detection.
//!
//! The encoding detected at load time is kept next to the decoded text so
//! that write-back emits exactly the same byte layout (BOM included).

use crate::error::{ProjectError, Result};
use std::fs;
use std::path::{Path, PathBuf};

const BOM_UTF8: &[u8] = &[0xEF, 0xBB, 0xBF];
const BOM_UTF16_LE: &[u8] = &[0xFF, 0xFE];
const BOM_UTF16_BE: &[u8] = &[0xFE, 0xFF];
const BOM_UTF32_LE: &[u8] = &[0xFF, 0xFE, 0x00, 0x00];
const BOM_UTF32_BE: &[u8] = &[0x00, 0x00, 0xFE, 0xFF];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Text encodings recognised from a byte-order mark.
pub enum TextEncoding {
    /// UTF-8 without BOM; the fallback when no mark is present.
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
    Utf32Le,
    Utf32Be,
}

impl TextEncoding {
    /// Detect the encoding from a leading BOM, returning it with the BOM length.
    pub fn detect(bytes: &[u8]) -> (Self, usize) {
        // UTF-32LE shares its first two bytes with the UTF-16LE mark.
        if bytes.starts_with(BOM_UTF8) {
            (TextEncoding::Utf8Bom, BOM_UTF8.len())
        } else if bytes.starts_with(BOM_UTF32_LE) {
            (TextEncoding::Utf32Le, BOM_UTF32_LE.len())
        } else if bytes.starts_with(BOM_UTF32_BE) {
            (TextEncoding::Utf32Be, BOM_UTF32_BE.len())
        } else if bytes.starts_with(BOM_UTF16_LE) {
            (TextEncoding::Utf16Le, BOM_UTF16_LE.len())
        } else if bytes.starts_with(BOM_UTF16_BE) {
            (TextEncoding::Utf16Be, BOM_UTF16_BE.len())
        } else {
            (TextEncoding::Utf8, 0)
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Utf8Bom => "UTF-8 (BOM)",
            TextEncoding::Utf16Le => "UTF-16LE",
            TextEncoding::Utf16Be => "UTF-16BE",
            TextEncoding::Utf32Le => "UTF-32LE",
            TextEncoding::Utf32Be => "UTF-32BE",
        }
    }

    /// Decode `body` (BOM already stripped). `None` when the bytes are invalid.
    pub fn decode(self, body: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 | TextEncoding::Utf8Bom => String::from_utf8(body.to_vec()).ok(),
            TextEncoding::Utf16Le => decode_utf16(body, u16::from_le_bytes),
            TextEncoding::Utf16Be => decode_utf16(body, u16::from_be_bytes),
            TextEncoding::Utf32Le => decode_utf32(body, u32::from_le_bytes),
            TextEncoding::Utf32Be => decode_utf32(body, u32::from_be_bytes),
        }
    }

    /// Encode `text`, prefixing the BOM this encoding was detected with.
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            TextEncoding::Utf8 => text.as_bytes().to_vec(),
            TextEncoding::Utf8Bom => {
                let mut out = BOM_UTF8.to_vec();
                out.extend_from_slice(text.as_bytes());
                out
            }
            TextEncoding::Utf16Le => {
                let mut out = BOM_UTF16_LE.to_vec();
                out.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
                out
            }
            TextEncoding::Utf16Be => {
                let mut out = BOM_UTF16_BE.to_vec();
                out.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
                out
            }
            TextEncoding::Utf32Le => {
                let mut out = BOM_UTF32_LE.to_vec();
                out.extend(text.chars().flat_map(|c| u32::from(c).to_le_bytes()));
                out
            }
            TextEncoding::Utf32Be => {
                let mut out = BOM_UTF32_BE.to_vec();
                out.extend(text.chars().flat_map(|c| u32::from(c).to_be_bytes()));
                out
            }
        }
    }
}

fn decode_utf16(body: &[u8], unit: fn([u8; 2]) -> u16) -> Option<String> {
    if body.len() % 2 != 0 {
        return None;
    }
    let units = body.chunks_exact(2).map(|c| unit([c[0], c[1]]));
    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}

fn decode_utf32(body: &[u8], unit: fn([u8; 4]) -> u32) -> Option<String> {
    if body.len() % 4 != 0 {
        return None;
    }
    body.chunks_exact(4)
        .map(|c| char::from_u32(unit([c[0], c[1], c[2], c[3]])))
        .collect()
}

#[derive(Debug, Clone)]
/// Raw text of one descriptor plus the encoding it was read with.
pub struct Descriptor {
    pub path: PathBuf,
    pub text: String,
    pub encoding: TextEncoding,
}

impl Descriptor {
    /// Empty or whitespace-only content holds no settings.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Write `text` back using the encoding captured at load time.
    pub fn write_text(&self, text: &str) -> Result<()> {
        fs::write(&self.path, self.encoding.encode(text)).map_err(|source| {
            ProjectError::WriteFailure {
                path: self.path.clone(),
                source,
            }
        })
    }
}

/// Check that `path` names an absolute, existing regular file.
pub fn resolve(path: &Path) -> Result<()> {
    if !path.is_absolute() {
        return Err(ProjectError::PathUnresolved {
            path: path.to_path_buf(),
        });
    }
    let meta = fs::metadata(path).map_err(|source| ProjectError::NotFound {
        path: path.to_path_buf(),
        source: Some(source),
    })?;
    if meta.is_dir() {
        return Err(ProjectError::NotAFile {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Load a descriptor from disk, detecting its encoding.
pub fn load(path: &Path) -> Result<Descriptor> {
    resolve(path)?;
    let bytes = fs::read(path).map_err(|source| ProjectError::NotFound {
        path: path.to_path_buf(),
        source: Some(source),
    })?;
    let (encoding, bom_len) = TextEncoding::detect(&bytes);
    let text = encoding
        .decode(&bytes[bom_len..])
        .ok_or_else(|| ProjectError::Undecodable {
            path: path.to_path_buf(),
            encoding: encoding.label(),
        })?;
    Ok(Descriptor {
        path: path.to_path_buf(),
        text,
        encoding,
    })
}
