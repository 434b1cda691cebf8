// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text payloads.
//!
//! Text reaches a canvas as raw bytes plus an encoding. Commands keep the bytes
//! verbatim; decoding happens only to build a display preview.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write as _;

use crate::CaptureError;

/// Encoding of the bytes handed to a text draw.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    /// UTF-8 code units.
    #[default]
    Utf8,
    /// Native-endian UTF-16 code units.
    Utf16,
    /// Native-endian UTF-32 code units.
    Utf32,
    /// Native-endian 16-bit glyph ids.
    GlyphId,
}

impl TextEncoding {
    /// Display name of the encoding.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Utf16 => "UTF-16",
            Self::Utf32 => "UTF-32",
            Self::GlyphId => "Glyph ID",
        }
    }

    /// Size in bytes of one code unit.
    pub const fn unit_size(self) -> usize {
        match self {
            Self::Utf8 => 1,
            Self::Utf16 | Self::GlyphId => 2,
            Self::Utf32 => 4,
        }
    }
}

/// Owned text bytes together with their encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Text {
    bytes: Box<[u8]>,
    encoding: TextEncoding,
}

impl Text {
    /// Copy `bytes` into an owned text payload.
    ///
    /// Fails if the byte length is not a whole number of code units.
    pub fn new(bytes: &[u8], encoding: TextEncoding) -> Result<Self, CaptureError> {
        if bytes.len() % encoding.unit_size() != 0 {
            return Err(CaptureError::TextLength {
                encoding,
                len: bytes.len(),
            });
        }
        Ok(Self {
            bytes: bytes.into(),
            encoding,
        })
    }

    /// Raw bytes, exactly as captured.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Encoding recorded at capture time.
    #[inline]
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Number of glyphs the text will produce.
    pub fn glyph_count(&self) -> usize {
        count_text(&self.bytes, self.encoding).unwrap_or(0)
    }

    /// Display-safe rendering of the text.
    ///
    /// Invalid sequences become U+FFFD and control characters are escaped. Glyph
    /// ids are listed numerically since they have no textual meaning.
    pub fn preview(&self) -> String {
        let mut out = String::new();
        match self.encoding {
            TextEncoding::Utf8 => {
                push_escaped(&mut out, String::from_utf8_lossy(&self.bytes).chars());
            }
            TextEncoding::Utf16 => {
                let units = u16_units(&self.bytes);
                let chars = char::decode_utf16(units)
                    .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER));
                push_escaped(&mut out, chars);
            }
            TextEncoding::Utf32 => {
                let chars = self.bytes.chunks_exact(4).map(|c| {
                    char::from_u32(u32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
                        .unwrap_or(char::REPLACEMENT_CHARACTER)
                });
                push_escaped(&mut out, chars);
            }
            TextEncoding::GlyphId => {
                let ids: Vec<u16> = u16_units(&self.bytes).collect();
                for (i, id) in ids.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    let _ = write!(out, "{id}");
                }
            }
        }
        out
    }
}

/// Number of glyphs `bytes` produce under `encoding`.
///
/// UTF encodings count code points (invalid sequences count as one replacement
/// each); glyph-id text counts 16-bit ids.
pub fn count_text(bytes: &[u8], encoding: TextEncoding) -> Result<usize, CaptureError> {
    if bytes.len() % encoding.unit_size() != 0 {
        return Err(CaptureError::TextLength {
            encoding,
            len: bytes.len(),
        });
    }
    Ok(match encoding {
        TextEncoding::Utf8 => String::from_utf8_lossy(bytes).chars().count(),
        TextEncoding::Utf16 => char::decode_utf16(u16_units(bytes)).count(),
        TextEncoding::Utf32 => bytes.len() / 4,
        TextEncoding::GlyphId => bytes.len() / 2,
    })
}

fn u16_units(bytes: &[u8]) -> impl Iterator<Item = u16> + '_ {
    bytes
        .chunks_exact(2)
        .map(|c| u16::from_ne_bytes([c[0], c[1]]))
}

fn push_escaped(out: &mut String, chars: impl Iterator<Item = char>) {
    for c in chars {
        if c.is_control() {
            out.extend(c.escape_default());
        } else {
            out.push(c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn utf16_bytes(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(u16::to_ne_bytes).collect()
    }

    #[test]
    fn counts_code_points_not_bytes() {
        assert_eq!(count_text("héllo".as_bytes(), TextEncoding::Utf8), Ok(5));
        assert_eq!(count_text(&utf16_bytes("a😀"), TextEncoding::Utf16), Ok(2));
        assert_eq!(count_text(&[0; 8], TextEncoding::Utf32), Ok(2));
        assert_eq!(count_text(&[1, 0, 2, 0], TextEncoding::GlyphId), Ok(2));
        assert_eq!(count_text(&[], TextEncoding::Utf16), Ok(0));
    }

    #[test]
    fn odd_length_wide_text_is_rejected() {
        let err = Text::new(&[1, 2, 3], TextEncoding::Utf16).unwrap_err();
        assert_eq!(
            err,
            CaptureError::TextLength {
                encoding: TextEncoding::Utf16,
                len: 3
            }
        );
    }

    #[test]
    fn preview_is_display_safe() {
        let text = Text::new(b"a\nb\xff", TextEncoding::Utf8).unwrap();
        assert_eq!(text.preview(), "a\\nb\u{fffd}");

        let wide = Text::new(&utf16_bytes("hi"), TextEncoding::Utf16).unwrap();
        assert_eq!(wide.preview(), "hi");

        let glyphs = Text::new(&[7, 0, 9, 0], TextEncoding::GlyphId).unwrap();
        if cfg!(target_endian = "little") {
            assert_eq!(glyphs.preview(), "7 9");
        }
    }

    #[test]
    fn bytes_are_kept_verbatim() {
        let mut source = vec![b'o', b'k'];
        let text = Text::new(&source, TextEncoding::Utf8).unwrap();
        source[0] = b'n';
        assert_eq!(text.bytes(), b"ok");
        assert_eq!(text.glyph_count(), 2);
    }
}
