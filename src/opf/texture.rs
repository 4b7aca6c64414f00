//! Texture records and their embedded bitmaps.
//!
//! ```text
//! Texture:
//!   name, color_file, alpha_file      u16 strings
//!   TextureInfo                       fixed block, 53 bytes
//!   [Bitmap]                          if has_color_channel
//!   [Bitmap]                          if has_alpha_channel
//!
//! Bitmap:
//!   bpp, width, height, line_size     i32 x4
//!   bitmap_type                       u8 (0 = raw BMP, 1..3 = JPEG)
//!   header_size                       u32 (L)
//!   info header fields                each read only while fewer than L bytes are consumed
//!   extra header                      L - consumed bytes, verbatim
//!   payload                           raw: size_image or line_size * height bytes
//!                                     JPEG: u32 length + bytes
//! ```

use std::io::Write;

use super::error::{OpfError, Result};
use super::stream::{OpfReader, OpfWriter};
use super::types::{Bitmap, BitmapInfoHeader, BitmapType, Texture, TextureInfo};

/// Number of fields in BITMAPINFOHEADER, in on-disk order.
const INFO_HEADER_FIELDS: usize = 11;

impl OpfReader<'_> {
    pub fn read_texture(&mut self) -> Result<Texture> {
        let name = self.read_string()?;
        let color_file = self.read_string()?;
        let alpha_file = self.read_string()?;
        let info: TextureInfo = self.read_block("texture info")?;

        let color_bitmap = if info.has_color_channel {
            self.read_bitmap()?
        } else {
            Bitmap::default()
        };
        let alpha_bitmap = if info.has_alpha_channel {
            self.read_bitmap()?
        } else {
            Bitmap::default()
        };

        Ok(Texture {
            name,
            color_file,
            alpha_file,
            info,
            color_bitmap,
            alpha_bitmap,
        })
    }

    pub fn read_bitmap(&mut self) -> Result<Bitmap> {
        let bits_per_pixel = self.read_i32()?;
        let width = self.read_i32()?;
        let height = self.read_i32()?;
        let line_size = self.read_i32()?;
        let bitmap_type = BitmapType::from(self.read_u8()?);
        let header_size = self.read_u32()?;

        let (info_header, consumed) = self.read_info_header(header_size)?;
        let extra_header = if header_size > consumed {
            self.read_bytes((header_size - consumed) as usize, "bitmap extra header")?
        } else {
            Vec::new()
        };

        let mut bitmap = Bitmap {
            bits_per_pixel,
            width,
            height,
            line_size,
            bitmap_type,
            header_size,
            info_header,
            extra_header,
            data: Vec::new(),
        };

        let payload_len = if bitmap_type.is_raw() {
            bitmap.declared_raw_len()
        } else {
            u64::from(self.read_u32()?)
        };
        self.ensure_remaining(payload_len, "bitmap payload")?;
        bitmap.data = self.read_bytes(payload_len as usize, "bitmap payload")?;
        Ok(bitmap)
    }

    /// Read header fields while fewer than `limit` bytes have been consumed.
    /// Returns the header and the number of bytes actually read.
    fn read_info_header(&mut self, limit: u32) -> Result<(BitmapInfoHeader, u32)> {
        let mut h = BitmapInfoHeader::default();
        let mut consumed = 0u32;
        for field in 0..INFO_HEADER_FIELDS {
            if consumed >= limit {
                break;
            }
            consumed += match field {
                0 => {
                    h.size = self.read_u32()?;
                    4
                }
                1 => {
                    h.width = self.read_i32()?;
                    4
                }
                2 => {
                    h.height = self.read_i32()?;
                    4
                }
                3 => {
                    h.planes = self.read_u16()?;
                    2
                }
                4 => {
                    h.bit_count = self.read_u16()?;
                    2
                }
                5 => {
                    h.compression = self.read_u32()?;
                    4
                }
                6 => {
                    h.size_image = self.read_u32()?;
                    4
                }
                7 => {
                    h.x_pels_per_meter = self.read_i32()?;
                    4
                }
                8 => {
                    h.y_pels_per_meter = self.read_i32()?;
                    4
                }
                9 => {
                    h.clr_used = self.read_u32()?;
                    4
                }
                _ => {
                    h.clr_important = self.read_u32()?;
                    4
                }
            };
        }
        Ok((h, consumed))
    }
}

impl<W: Write> OpfWriter<W> {
    pub fn write_texture(&mut self, texture: &Texture) -> Result<()> {
        self.write_string(&texture.name)?;
        self.write_string(&texture.color_file)?;
        self.write_string(&texture.alpha_file)?;
        self.write_block(&texture.info, "texture info")?;

        // A channel whose flag is off has no bitmap block at all, whatever
        // the in-memory bitmap still holds.
        if texture.info.has_color_channel {
            self.write_bitmap(&texture.color_bitmap)?;
        }
        if texture.info.has_alpha_channel {
            self.write_bitmap(&texture.alpha_bitmap)?;
        }
        Ok(())
    }

    pub fn write_bitmap(&mut self, bitmap: &Bitmap) -> Result<()> {
        self.write_i32(bitmap.bits_per_pixel)?;
        self.write_i32(bitmap.width)?;
        self.write_i32(bitmap.height)?;
        self.write_i32(bitmap.line_size)?;
        self.write_u8(bitmap.bitmap_type.into())?;
        self.write_u32(bitmap.header_size)?;

        let consumed = self.write_info_header(&bitmap.info_header, bitmap.header_size)?;
        let expected_extra = bitmap.header_size.saturating_sub(consumed) as usize;
        if bitmap.extra_header.len() != expected_extra {
            return Err(OpfError::Unencodable {
                what: "bitmap header".to_string(),
                reason: format!(
                    "header size {} needs {} extra bytes, have {}",
                    bitmap.header_size,
                    expected_extra,
                    bitmap.extra_header.len()
                ),
            });
        }
        self.write_bytes(&bitmap.extra_header)?;

        if bitmap.bitmap_type.is_raw() {
            let declared = bitmap.declared_raw_len();
            if bitmap.data.len() as u64 != declared {
                return Err(OpfError::Unencodable {
                    what: "bitmap payload".to_string(),
                    reason: format!(
                        "raw bitmap declares {} bytes but holds {}",
                        declared,
                        bitmap.data.len()
                    ),
                });
            }
        } else {
            self.write_count(bitmap.data.len(), "bitmap payload")?;
        }
        self.write_bytes(&bitmap.data)
    }

    fn write_info_header(&mut self, h: &BitmapInfoHeader, limit: u32) -> Result<u32> {
        let mut written = 0u32;
        for field in 0..INFO_HEADER_FIELDS {
            if written >= limit {
                break;
            }
            written += match field {
                0 => self.write_u32(h.size).map(|_| 4)?,
                1 => self.write_i32(h.width).map(|_| 4)?,
                2 => self.write_i32(h.height).map(|_| 4)?,
                3 => self.write_u16(h.planes).map(|_| 2)?,
                4 => self.write_u16(h.bit_count).map(|_| 2)?,
                5 => self.write_u32(h.compression).map(|_| 4)?,
                6 => self.write_u32(h.size_image).map(|_| 4)?,
                7 => self.write_i32(h.x_pels_per_meter).map(|_| 4)?,
                8 => self.write_i32(h.y_pels_per_meter).map(|_| 4)?,
                9 => self.write_u32(h.clr_used).map(|_| 4)?,
                _ => self.write_u32(h.clr_important).map(|_| 4)?,
            };
        }
        Ok(written)
    }
}
