//! Top level of a packed project file.
//!
//! ```text
//! header          23 bytes "Outforce Packed Content"
//! version         u32 (29)
//! project_name, author, email     u16 strings
//! description     u32 string
//! project_id      u16
//! dependencies    u32 count (<= 1000), count x 260-byte paths
//! events          u32 count (<= 10000), count x (i32 trigger, u16 string)
//! textures        u32 count (<= 10000), count x Texture
//! materials       u32 count (<= 10000), count x Material
//! objects         u32 count (<= 10000), count x Object
//! ```
//!
//! A texture, material or object that fails with a record-level error is
//! dropped and the list continues. Anything else, including running out of
//! data, aborts the parse.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use super::error::{OpfError, ParseWarning, Result};
use super::stream::{OpfReader, OpfWriter};
use super::types::{EventDesc, OpfProject};

pub const OPF_MAGIC: &str = "Outforce Packed Content";
pub const OPF_VERSION: u32 = 29;

pub const MIN_FILE_SIZE: u64 = 100;
pub const MAX_FILE_SIZE: u64 = 500 * 1024 * 1024;

pub const MAX_DEPENDENCIES: u32 = 1000;
pub const MAX_EVENTS: u32 = 10_000;
pub const MAX_TEXTURES: u32 = 10_000;
pub const MAX_MATERIALS: u32 = 10_000;
pub const MAX_OBJECTS: u32 = 10_000;

pub const DEPENDENCY_PATH_LEN: usize = 260;

/// What a parse of damaged input managed to recover.
#[derive(Debug)]
pub struct Salvage {
    pub project: OpfProject,
    pub warnings: Vec<ParseWarning>,
    /// The error that stopped the parse, if any.
    pub error: Option<OpfError>,
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse a complete project, logging and discarding warnings.
pub fn parse_opf(data: &[u8]) -> Result<OpfProject> {
    parse_opf_with_warnings(data).map(|(project, _)| project)
}

pub fn parse_opf_with_warnings(data: &[u8]) -> Result<(OpfProject, Vec<ParseWarning>)> {
    let mut reader = OpfReader::new(data);
    let mut project = OpfProject::default();
    reader.read_header(&mut project)?;
    reader.read_sections(&mut project)?;
    Ok((project, reader.take_warnings()))
}

/// Parse as much as possible. Only a bad header or version is an `Err`;
/// later failures return the sections and elements read up to that point.
pub fn salvage_opf(data: &[u8]) -> Result<Salvage> {
    let mut reader = OpfReader::new(data);
    let mut project = OpfProject::default();
    reader.read_header(&mut project)?;
    let error = reader.read_sections(&mut project).err();
    if let Some(err) = &error {
        tracing::warn!("Parse stopped early: {}", err);
    }
    Ok(Salvage {
        project,
        warnings: reader.take_warnings(),
        error,
    })
}

/// Read a project file, rejecting sizes outside the plausible window first.
pub fn load_opf(path: impl AsRef<Path>) -> Result<OpfProject> {
    load_opf_with_warnings(path).map(|(project, _)| project)
}

pub fn load_opf_with_warnings(path: impl AsRef<Path>) -> Result<(OpfProject, Vec<ParseWarning>)> {
    let path = path.as_ref();
    let size = fs::metadata(path)?.len();
    if !(MIN_FILE_SIZE..=MAX_FILE_SIZE).contains(&size) {
        return Err(OpfError::FileSize { size });
    }
    let data = fs::read(path)?;
    let parsed = parse_opf_with_warnings(&data)?;
    tracing::info!(
        "Loaded {}: {} textures, {} materials, {} objects",
        path.display(),
        parsed.0.textures.len(),
        parsed.0.materials.len(),
        parsed.0.objects.len()
    );
    Ok(parsed)
}

impl OpfReader<'_> {
    fn read_header(&mut self, project: &mut OpfProject) -> Result<()> {
        let magic = self.read_bytes(OPF_MAGIC.len(), "header")?;
        if magic != OPF_MAGIC.as_bytes() {
            return Err(OpfError::BadMagic {
                found: String::from_utf8_lossy(&magic).into_owned(),
            });
        }
        let version = self.read_u32()?;
        if version != OPF_VERSION {
            return Err(OpfError::UnsupportedVersion { found: version });
        }

        project.project_name = self.read_string()?;
        project.author = self.read_string()?;
        project.email = self.read_string()?;
        project.description = self.read_long_string()?;
        project.project_id = self.read_u16()?;
        Ok(())
    }

    /// Sections are filled into `project` as they are read, so a failure
    /// leaves everything before it in place.
    fn read_sections(&mut self, project: &mut OpfProject) -> Result<()> {
        let count = self.read_count("dependencies", MAX_DEPENDENCIES)?;
        for _ in 0..count {
            let path = self.read_fixed_string(DEPENDENCY_PATH_LEN)?;
            project.dependencies.push(path);
        }
        tracing::debug!("Read {} dependencies", count);

        let count = self.read_count("events", MAX_EVENTS)?;
        for _ in 0..count {
            let trigger = self.read_i32()?;
            let name = self.read_string()?;
            project.events.push(EventDesc { trigger, name });
        }
        tracing::debug!("Read {} events", count);

        let count = self.read_count("textures", MAX_TEXTURES)?;
        for index in 0..count as usize {
            match self.read_texture() {
                Ok(texture) => project.textures.push(texture),
                Err(error) if error.is_record_level() => {
                    self.warn(ParseWarning::SkippedTexture { index, error })
                }
                Err(error) => return Err(error),
            }
        }
        tracing::debug!("Read {} of {} textures", project.textures.len(), count);

        let count = self.read_count("materials", MAX_MATERIALS)?;
        for index in 0..count as usize {
            match self.read_material() {
                Ok(material) => project.materials.push(material),
                Err(error) if error.is_record_level() => {
                    self.warn(ParseWarning::SkippedMaterial { index, error })
                }
                Err(error) => return Err(error),
            }
        }
        tracing::debug!("Read {} of {} materials", project.materials.len(), count);

        let count = self.read_count("objects", MAX_OBJECTS)?;
        for index in 0..count as usize {
            match self.read_object() {
                Ok(object) => project.objects.push(object),
                Err(error) if error.is_record_level() => {
                    self.warn(ParseWarning::SkippedObject { index, error })
                }
                Err(error) => return Err(error),
            }
        }
        tracing::debug!("Read {} of {} objects", project.objects.len(), count);

        if self.remaining() > 0 {
            tracing::debug!("{} trailing bytes after objects", self.remaining());
        }
        Ok(())
    }

    /// Top-level list count, bounded before anything is allocated.
    fn read_count(&mut self, what: &'static str, max: u32) -> Result<u32> {
        let count = self.read_u32()?;
        if count > max {
            return Err(OpfError::CountOutOfBounds { what, count, max });
        }
        Ok(count)
    }
}

// ============================================================================
// Writing
// ============================================================================

pub fn write_opf(project: &OpfProject) -> Result<Vec<u8>> {
    let mut writer = OpfWriter::new(Vec::new());
    writer.write_project(project)?;
    Ok(writer.into_inner())
}

pub fn save_opf(path: impl AsRef<Path>, project: &OpfProject) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = OpfWriter::new(BufWriter::new(file));
    writer.write_project(project)?;
    writer.into_inner().flush()?;
    tracing::info!("Saved {}", path.display());
    Ok(())
}

/// Copy an existing file aside as `{stem}_backup_{unix seconds}.{ext}`,
/// then overwrite it. Returns the backup path when one was made.
pub fn save_opf_with_backup(path: impl AsRef<Path>, project: &OpfProject) -> Result<Option<PathBuf>> {
    let path = path.as_ref();
    let backup = if path.exists() {
        let backup = backup_path(path);
        fs::copy(path, &backup)?;
        tracing::info!("Backed up {} to {}", path.display(), backup.display());
        Some(backup)
    } else {
        None
    };
    save_opf(path, project)?;
    Ok(backup)
}

fn backup_path(path: &Path) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}_backup_{}.{}", stem, stamp, ext.to_string_lossy()),
        None => format!("{}_backup_{}", stem, stamp),
    };
    path.with_file_name(name)
}

impl<W: Write> OpfWriter<W> {
    pub fn write_project(&mut self, project: &OpfProject) -> Result<()> {
        self.write_bytes(OPF_MAGIC.as_bytes())?;
        self.write_u32(OPF_VERSION)?;
        self.write_string(&project.project_name)?;
        self.write_string(&project.author)?;
        self.write_string(&project.email)?;
        self.write_long_string(&project.description)?;
        self.write_u16(project.project_id)?;

        self.write_bounded_count(project.dependencies.len(), "dependencies", MAX_DEPENDENCIES)?;
        for dep in &project.dependencies {
            self.write_fixed_string(dep, DEPENDENCY_PATH_LEN)?;
        }

        self.write_bounded_count(project.events.len(), "events", MAX_EVENTS)?;
        for event in &project.events {
            self.write_i32(event.trigger)?;
            self.write_string(&event.name)?;
        }

        self.write_bounded_count(project.textures.len(), "textures", MAX_TEXTURES)?;
        for texture in &project.textures {
            self.write_texture(texture)?;
        }

        self.write_bounded_count(project.materials.len(), "materials", MAX_MATERIALS)?;
        for material in &project.materials {
            self.write_material(material)?;
        }

        self.write_bounded_count(project.objects.len(), "objects", MAX_OBJECTS)?;
        for object in &project.objects {
            self.write_object(object)?;
        }
        tracing::debug!(
            "Wrote {} textures, {} materials, {} objects",
            project.textures.len(),
            project.materials.len(),
            project.objects.len()
        );
        Ok(())
    }

    /// Refuse to write a list the reader would reject.
    fn write_bounded_count(&mut self, len: usize, what: &'static str, max: u32) -> Result<()> {
        if len > max as usize {
            return Err(OpfError::Unencodable {
                what: what.to_string(),
                reason: format!("{} entries exceed the limit of {}", len, max),
            });
        }
        self.write_count(len, what)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opf::types::{SceneObject, Texture};

    fn push_u32(buf: &mut Vec<u8>, v: u32) {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    fn header_bytes() -> Vec<u8> {
        write_opf(&OpfProject::default()).unwrap()[..OPF_MAGIC.len() + 4 + 2 + 2 + 2 + 4 + 2].to_vec()
    }

    #[test]
    fn empty_project_layout() {
        let bytes = write_opf(&OpfProject::default()).unwrap();
        // magic + version + 3 empty u16 strings + empty u32 string + id + 5 counts
        assert_eq!(bytes.len(), 23 + 4 + 6 + 4 + 2 + 5 * 4);
        assert_eq!(&bytes[..23], OPF_MAGIC.as_bytes());
        assert_eq!(parse_opf(&bytes).unwrap(), OpfProject::default());
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut bytes = write_opf(&OpfProject::default()).unwrap();
        bytes[0] = b'X';
        assert!(matches!(parse_opf(&bytes), Err(OpfError::BadMagic { .. })));
    }

    #[test]
    fn other_versions_are_rejected() {
        let mut bytes = write_opf(&OpfProject::default()).unwrap();
        bytes[23..27].copy_from_slice(&30u32.to_le_bytes());
        assert!(matches!(
            parse_opf(&bytes),
            Err(OpfError::UnsupportedVersion { found: 30 })
        ));
    }

    #[test]
    fn dependency_count_is_bounded() {
        let mut bytes = header_bytes();
        push_u32(&mut bytes, 1001);
        assert!(matches!(
            parse_opf(&bytes),
            Err(OpfError::CountOutOfBounds { what: "dependencies", count: 1001, .. })
        ));
    }

    #[test]
    fn dependencies_and_events_round_trip() {
        let project = OpfProject {
            project_name: "Campaign".to_string(),
            description: "Second\r\nline".to_string(),
            dependencies: vec!["Data\\Base.opf".to_string()],
            events: vec![EventDesc { trigger: 3, name: "OnWin".to_string() }],
            ..Default::default()
        };
        let bytes = write_opf(&project).unwrap();
        assert_eq!(parse_opf(&bytes).unwrap(), project);
    }

    fn object_len(obj: &SceneObject) -> usize {
        let mut w = OpfWriter::new(Vec::new());
        w.write_object(obj).unwrap();
        w.into_inner().len()
    }

    #[test]
    fn corrupt_object_is_skipped_and_earlier_siblings_kept() {
        let project = OpfProject {
            objects: vec![
                SceneObject { name: "First".to_string(), unique_id: 1, ..Default::default() },
                SceneObject { name: "Bad".to_string(), unique_id: 2, ..Default::default() },
                SceneObject { name: "Third".to_string(), unique_id: 3, ..Default::default() },
            ],
            ..Default::default()
        };
        let mut bytes = write_opf(&project).unwrap();

        let tail: usize = project.objects.iter().map(object_len).sum();
        let bad_start = bytes.len() - tail + object_len(&project.objects[0]);
        // class(2) is_unknown(1) project_id(2) unique_id(4) override(1)
        // exclude(1) name(2+3) transform(36) version(4) flags(3) physical(72)
        let mesh_count_at = bad_start + 2 + 1 + 2 + 4 + 1 + 1 + 5 + 36 + 4 + 3 + 72;
        bytes[mesh_count_at..mesh_count_at + 4].copy_from_slice(&500u32.to_le_bytes());

        // Whatever happens to the out-of-step third record, the first one
        // stays and the bad one is reported.
        let salvage = salvage_opf(&bytes).unwrap();
        assert_eq!(salvage.project.objects[0].name, "First");
        assert!(salvage.project.objects.iter().all(|o| o.name != "Bad"));
        assert!(salvage
            .warnings
            .iter()
            .any(|w| matches!(w, ParseWarning::SkippedObject { index: 1, .. })));
    }

    #[test]
    fn salvage_keeps_textures_before_truncation() {
        let textures: Vec<Texture> = (0..3)
            .map(|i| {
                let mut t = Texture { name: format!("tex{i}"), ..Default::default() };
                t.info.id = i;
                t.info.has_color_channel = false;
                t
            })
            .collect();
        let project = OpfProject { textures, ..Default::default() };
        let bytes = write_opf(&project).unwrap();
        let cut = &bytes[..bytes.len() - 20];

        assert!(matches!(parse_opf(cut), Err(OpfError::UnexpectedEof { .. })));
        let salvage = salvage_opf(cut).unwrap();
        assert_eq!(salvage.project.textures.len(), 2);
        assert!(matches!(salvage.error, Some(OpfError::UnexpectedEof { .. })));
    }

    #[test]
    fn backup_name_keeps_extension() {
        let p = backup_path(Path::new("/tmp/PackedProject.opf"));
        let name = p.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("PackedProject_backup_"));
        assert!(name.ends_with(".opf"));
    }
}
