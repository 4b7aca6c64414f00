use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage, Rgba, RgbaImage};

use crate::opf::{Bitmap, OpfProject, Texture};

use super::sanitize_filename;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }
}

/// Options for writing embedded textures to disk.
#[derive(Debug, Clone)]
pub struct TextureExportOptions {
    pub format: ExportFormat,
    /// Output size as a percentage of the stored size (1..=400).
    pub scale_percent: u32,
    /// Only used for JPEG output.
    pub jpeg_quality: u8,
}

impl Default for TextureExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            scale_percent: 100,
            jpeg_quality: 90,
        }
    }
}

impl TextureExportOptions {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(1..=400).contains(&self.scale_percent) {
            bail!("scale must be between 1 and 400 percent, got {}", self.scale_percent);
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            bail!("JPEG quality must be between 1 and 100, got {}", self.jpeg_quality);
        }
        Ok(())
    }
}

/// Outcome of a bulk export.
#[derive(Debug, Default)]
pub struct TextureExportSummary {
    pub written: Vec<PathBuf>,
    /// Textures without color data.
    pub skipped: Vec<String>,
    /// Texture name and the reason it could not be exported.
    pub failed: Vec<(String, String)>,
}

/// Expand an RGB565 pixel to 8 bits per channel.
pub fn expand_rgb565(pixel: u16) -> [u8; 3] {
    let r = ((pixel >> 11) & 0x1f) as u8;
    let g = ((pixel >> 5) & 0x3f) as u8;
    let b = (pixel & 0x1f) as u8;
    [r << 3, g << 2, b << 3]
}

/// Bitmap dimensions, falling back to the texture's when the bitmap does
/// not carry its own.
fn dimensions(bitmap: &Bitmap, fallback: (u32, u32)) -> (u32, u32) {
    if bitmap.width > 0 && bitmap.height != 0 {
        (bitmap.width as u32, bitmap.height.unsigned_abs())
    } else {
        fallback
    }
}

/// Iterate the rows of a raw payload, honouring the stored line size when
/// it covers at least one packed row.
fn raw_rows(bitmap: &Bitmap, width: u32, height: u32, bytes_per_pixel: usize) -> anyhow::Result<Vec<&[u8]>> {
    let packed = width as usize * bytes_per_pixel;
    let stride = match usize::try_from(bitmap.line_size) {
        Ok(line) if line >= packed => line,
        _ => packed,
    };
    let needed = match height as usize {
        0 => 0,
        rows => stride * (rows - 1) + packed,
    };
    if bitmap.data.len() < needed {
        bail!(
            "payload holds {} bytes, {}x{} at {} bpp needs {}",
            bitmap.data.len(),
            width,
            height,
            bitmap.bits_per_pixel,
            needed
        );
    }
    Ok((0..height as usize)
        .map(|y| &bitmap.data[y * stride..y * stride + packed])
        .collect())
}

fn decode_jpeg(bitmap: &Bitmap) -> anyhow::Result<DynamicImage> {
    image::load_from_memory_with_format(&bitmap.data, ImageFormat::Jpeg)
        .context("failed to decode embedded JPEG")
}

/// Decode a color bitmap. Raw 32 bpp is read as RGBA, 24 bpp as RGB and
/// 16 bpp as RGB565.
pub fn bitmap_to_image(bitmap: &Bitmap, fallback: (u32, u32)) -> anyhow::Result<DynamicImage> {
    if !bitmap.bitmap_type.is_raw() {
        return decode_jpeg(bitmap);
    }

    let (width, height) = dimensions(bitmap, fallback);
    match bitmap.bits_per_pixel {
        32 => {
            let rows = raw_rows(bitmap, width, height, 4)?;
            let image = RgbaImage::from_fn(width, height, |x, y| {
                let p = &rows[y as usize][x as usize * 4..x as usize * 4 + 4];
                Rgba([p[0], p[1], p[2], p[3]])
            });
            Ok(DynamicImage::ImageRgba8(image))
        }
        24 => {
            let rows = raw_rows(bitmap, width, height, 3)?;
            let image = RgbImage::from_fn(width, height, |x, y| {
                let p = &rows[y as usize][x as usize * 3..x as usize * 3 + 3];
                Rgb([p[0], p[1], p[2]])
            });
            Ok(DynamicImage::ImageRgb8(image))
        }
        16 => {
            let rows = raw_rows(bitmap, width, height, 2)?;
            let image = RgbImage::from_fn(width, height, |x, y| {
                let p = &rows[y as usize][x as usize * 2..x as usize * 2 + 2];
                Rgb(expand_rgb565(u16::from_le_bytes([p[0], p[1]])))
            });
            Ok(DynamicImage::ImageRgb8(image))
        }
        other => bail!("unsupported color bit depth {}", other),
    }
}

/// Decode an alpha bitmap to a single gray channel: 8 bpp gray, the high
/// byte of 16 bpp, or the luma of a JPEG.
fn alpha_to_gray(bitmap: &Bitmap, fallback: (u32, u32)) -> anyhow::Result<GrayImage> {
    if !bitmap.bitmap_type.is_raw() {
        return Ok(decode_jpeg(bitmap)?.to_luma8());
    }

    let (width, height) = dimensions(bitmap, fallback);
    match bitmap.bits_per_pixel {
        8 => {
            let rows = raw_rows(bitmap, width, height, 1)?;
            Ok(GrayImage::from_fn(width, height, |x, y| {
                Luma([rows[y as usize][x as usize]])
            }))
        }
        16 => {
            let rows = raw_rows(bitmap, width, height, 2)?;
            Ok(GrayImage::from_fn(width, height, |x, y| {
                Luma([rows[y as usize][x as usize * 2 + 1]])
            }))
        }
        other => bail!("unsupported alpha bit depth {}", other),
    }
}

/// Decode a texture's color channel and merge its alpha channel, if any.
///
/// Returns `None` for textures without color data. An alpha channel that
/// fails to decode is logged and left out.
pub fn texture_to_image(texture: &Texture) -> anyhow::Result<Option<DynamicImage>> {
    let color = match texture.color() {
        Some(bitmap) if !bitmap.data.is_empty() => bitmap,
        _ => return Ok(None),
    };
    let fallback = (texture.info.width, texture.info.height);
    let image = bitmap_to_image(color, fallback)
        .with_context(|| format!("texture '{}' color channel", texture.name))?;

    let alpha = match texture.alpha() {
        Some(bitmap) if !bitmap.data.is_empty() => bitmap,
        _ => return Ok(Some(image)),
    };
    let gray = match alpha_to_gray(alpha, fallback) {
        Ok(gray) => gray,
        Err(e) => {
            tracing::warn!(texture = %texture.name, "alpha channel not merged: {:#}", e);
            return Ok(Some(image));
        }
    };

    let mut rgba = image.to_rgba8();
    let w = rgba.width().min(gray.width());
    let h = rgba.height().min(gray.height());
    for y in 0..h {
        for x in 0..w {
            rgba.get_pixel_mut(x, y)[3] = gray.get_pixel(x, y)[0];
        }
    }
    Ok(Some(DynamicImage::ImageRgba8(rgba)))
}

/// Composite onto white, since JPEG has no alpha.
fn flatten_on_white(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let blend = |c: u8| ((u16::from(c) * u16::from(a) + 255 * (255 - u16::from(a))) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

fn scale(image: DynamicImage, percent: u32) -> DynamicImage {
    if percent == 100 {
        return image;
    }
    let width = (image.width() * percent / 100).max(1);
    let height = (image.height() * percent / 100).max(1);
    image.resize_exact(width, height, FilterType::Lanczos3)
}

/// Write one decoded image in the requested format.
pub fn save_image(image: &DynamicImage, path: &Path, options: &TextureExportOptions) -> anyhow::Result<()> {
    match options.format {
        ExportFormat::Png => image
            .save_with_format(path, ImageFormat::Png)
            .with_context(|| format!("failed to write {}", path.display())),
        ExportFormat::Jpeg => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let encoder = JpegEncoder::new_with_quality(BufWriter::new(file), options.jpeg_quality);
            flatten_on_white(image)
                .write_with_encoder(encoder)
                .with_context(|| format!("failed to encode {}", path.display()))
        }
    }
}

/// File name a texture is exported under: `{name}_{id}.{ext}`.
pub fn texture_filename(texture: &Texture, format: ExportFormat) -> String {
    format!("{}_{}.{}", sanitize_filename(&texture.name), texture.id(), format.extension())
}

/// Decode and write every texture with color data into `dir`.
///
/// A texture that fails to decode is recorded in the summary and does not
/// stop the export.
pub fn export_textures(
    project: &OpfProject,
    dir: &Path,
    options: &TextureExportOptions,
) -> anyhow::Result<TextureExportSummary> {
    options.validate()?;
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let mut summary = TextureExportSummary::default();
    for texture in &project.textures {
        let decoded = texture_to_image(texture).and_then(|image| {
            image
                .map(|image| {
                    let path = dir.join(texture_filename(texture, options.format));
                    save_image(&scale(image, options.scale_percent), &path, options)?;
                    Ok::<_, anyhow::Error>(path)
                })
                .transpose()
        });

        match decoded {
            Ok(Some(path)) => {
                tracing::debug!(texture = %texture.name, path = %path.display(), "exported texture");
                summary.written.push(path);
            }
            Ok(None) => {
                tracing::debug!(texture = %texture.name, "no color data, skipping");
                summary.skipped.push(texture.name.clone());
            }
            Err(e) => {
                tracing::warn!(texture = %texture.name, "export failed: {:#}", e);
                summary.failed.push((texture.name.clone(), format!("{:#}", e)));
            }
        }
    }

    tracing::info!(
        written = summary.written.len(),
        skipped = summary.skipped.len(),
        failed = summary.failed.len(),
        "texture export finished"
    );
    if summary.written.is_empty() && !summary.failed.is_empty() {
        return Err(anyhow!("no texture could be exported ({} failed)", summary.failed.len()));
    }
    Ok(summary)
}
