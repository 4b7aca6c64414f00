//! Primitive codec: little-endian scalars, length-prefixed and fixed-width
//! strings, vectors and colors.
//!
//! Reads never pad with zeros. Running out of input is an
//! [`OpfError::UnexpectedEof`] carrying the offset of the failed read, and
//! every declared length is checked against the remaining input before
//! anything is allocated for it.

use std::io::{Cursor, Read, Write};

use binrw::io::NoSeek;
use binrw::{BinRead, BinWrite, Endian};

use super::encoding::{decode_latin1, encode_latin1};
use super::error::{OpfError, ParseWarning, Result};
use super::types::{ColorValue4F, Vec2, Vec3};

// ============================================================================
// Reader
// ============================================================================

pub struct OpfReader<'a> {
    cursor: Cursor<&'a [u8]>,
    warnings: Vec<ParseWarning>,
}

impl<'a> OpfReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
            warnings: Vec::new(),
        }
    }

    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn len(&self) -> u64 {
        self.cursor.get_ref().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn remaining(&self) -> u64 {
        self.len().saturating_sub(self.position())
    }

    pub fn warn(&mut self, warning: ParseWarning) {
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn take_warnings(&mut self) -> Vec<ParseWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Fail with `UnexpectedEof` unless `needed` more bytes are available.
    pub fn ensure_remaining(&self, needed: u64, context: &str) -> Result<()> {
        if needed > self.remaining() {
            return Err(OpfError::UnexpectedEof {
                offset: self.position(),
                context: format!(
                    "{context} ({needed} bytes declared, {} left)",
                    self.remaining()
                ),
            });
        }
        Ok(())
    }

    /// Check that `count` elements of at least `min_size` bytes each can
    /// still be present.
    pub fn ensure_elements(&self, count: u64, min_size: u64, context: &str) -> Result<()> {
        self.ensure_remaining(count.saturating_mul(min_size), context)
    }

    fn read_array<const N: usize>(&mut self, context: &str) -> Result<[u8; N]> {
        let offset = self.position();
        let mut buf = [0u8; N];
        self.cursor
            .read_exact(&mut buf)
            .map_err(|_| OpfError::UnexpectedEof {
                offset,
                context: context.to_string(),
            })?;
        Ok(buf)
    }

    pub fn read_bytes(&mut self, len: usize, context: &str) -> Result<Vec<u8>> {
        self.ensure_remaining(len as u64, context)?;
        let mut buf = vec![0u8; len];
        self.cursor.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>("u8")?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array("u16")?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array("u32")?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array("i32")?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array("f32")?))
    }

    pub fn read_vec2(&mut self) -> Result<Vec2> {
        Ok([self.read_f32()?, self.read_f32()?])
    }

    pub fn read_vec3(&mut self) -> Result<Vec3> {
        Ok([self.read_f32()?, self.read_f32()?, self.read_f32()?])
    }

    pub fn read_color(&mut self) -> Result<ColorValue4F> {
        self.read_block("color")
    }

    /// u16 length followed by Latin-1 bytes.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_u16()?;
        let bytes = self.read_bytes(usize::from(len), "string")?;
        Ok(decode_latin1(&bytes))
    }

    /// u32 length followed by Latin-1 bytes.
    pub fn read_long_string(&mut self) -> Result<String> {
        let len = self.read_u32()?;
        let bytes = self.read_bytes(len as usize, "long string")?;
        Ok(decode_latin1(&bytes))
    }

    /// Exactly `size` bytes, cut at the first NUL.
    pub fn read_fixed_string(&mut self, size: usize) -> Result<String> {
        let bytes = self.read_bytes(size, "fixed string")?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Ok(decode_latin1(&bytes[..end]))
    }

    /// Read a fixed-layout `#[binrw]` block.
    pub fn read_block<T>(&mut self, context: &str) -> Result<T>
    where
        T: for<'b> BinRead<Args<'b> = ()>,
    {
        let offset = self.position();
        T::read_options(&mut self.cursor, Endian::Little, ())
            .map_err(|e| OpfError::decode(e, offset, context))
    }

    pub fn corrupt(&self, reason: impl Into<String>) -> OpfError {
        OpfError::RecordCorrupt {
            offset: self.position(),
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Writer
// ============================================================================

pub struct OpfWriter<W: Write> {
    out: W,
}

impl<W: Write> OpfWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.out.write_all(bytes)?;
        Ok(())
    }

    pub fn write_u8(&mut self, v: u8) -> Result<()> {
        self.write_bytes(&[v])
    }

    pub fn write_bool(&mut self, v: bool) -> Result<()> {
        self.write_u8(u8::from(v))
    }

    pub fn write_u16(&mut self, v: u16) -> Result<()> {
        self.write_bytes(&v.to_le_bytes())
    }

    pub fn write_u32(&mut self, v: u32) -> Result<()> {
        self.write_bytes(&v.to_le_bytes())
    }

    pub fn write_i32(&mut self, v: i32) -> Result<()> {
        self.write_bytes(&v.to_le_bytes())
    }

    pub fn write_f32(&mut self, v: f32) -> Result<()> {
        self.write_bytes(&v.to_le_bytes())
    }

    pub fn write_vec2(&mut self, v: &Vec2) -> Result<()> {
        v.iter().try_for_each(|&c| self.write_f32(c))
    }

    pub fn write_vec3(&mut self, v: &Vec3) -> Result<()> {
        v.iter().try_for_each(|&c| self.write_f32(c))
    }

    pub fn write_color(&mut self, c: &ColorValue4F) -> Result<()> {
        self.write_block(c, "color")
    }

    /// Write a collection length as the u32 the format uses for counts.
    pub fn write_count(&mut self, len: usize, what: &str) -> Result<()> {
        let count = u32::try_from(len).map_err(|_| OpfError::Unencodable {
            what: what.to_string(),
            reason: format!("{len} elements do not fit a u32 count"),
        })?;
        self.write_u32(count)
    }

    pub fn write_string(&mut self, s: &str) -> Result<()> {
        let bytes = encode_latin1(s);
        let len = u16::try_from(bytes.len()).map_err(|_| OpfError::Unencodable {
            what: "string".to_string(),
            reason: format!("{} bytes exceed the u16 length prefix", bytes.len()),
        })?;
        self.write_u16(len)?;
        self.write_bytes(&bytes)
    }

    pub fn write_long_string(&mut self, s: &str) -> Result<()> {
        let bytes = encode_latin1(s);
        self.write_count(bytes.len(), "long string")?;
        self.write_bytes(&bytes)
    }

    /// Exactly `size` bytes: truncated if longer, NUL padded if shorter.
    pub fn write_fixed_string(&mut self, s: &str, size: usize) -> Result<()> {
        let mut bytes = encode_latin1(s);
        bytes.resize(size, 0);
        self.write_bytes(&bytes)
    }

    pub fn write_block<T>(&mut self, value: &T, context: &str) -> Result<()>
    where
        T: for<'b> BinWrite<Args<'b> = ()>,
    {
        value
            .write_options(&mut NoSeek::new(&mut self.out), Endian::Little, ())
            .map_err(|e| OpfError::encode(e, context))
    }
}
