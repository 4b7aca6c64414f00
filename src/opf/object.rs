//! Scene objects, meshes and morph targets.
//!
//! ```text
//! Object:
//!   class_name                        u16 string
//!   is_unknown u8, project_id u16, unique_id i32, override u8, exclude u8
//!   name                              u16 string
//!   position, rotation, scaling       Vec3 x3
//!   version u32, disabled u8, disable_tree u8, billboard u8
//!   template:
//!     physical, last_physical         PhysicalTransform x2
//!     mesh_count u32 (<= 100), meshes
//!   has_light u8, [Light]
//!   reserved u8                       expected 0
//!   setting_count u32, (name, value) u16 strings
//!   child_count u32, children         recursive
//!
//! Mesh:
//!   vertex_format i32, material_project_id u16, material_id i32, name
//!   TextureWrap, position Vec3, bound_radius f32
//!   morph_size i32, vertex/color/texture target counts i32 x3
//!   vertex targets: morph_size x MorphVertex, name
//!   color targets:  morph_size x u32
//!   texture targets: morph_size x Vec2
//!   MorphBlend
//!   buffer_type i32 (1..3), face_count i32 (<= 100000), face_count * buffer_type u16
//!   group target count i32, each morph_size bytes
//! ```

use std::io::Write;

use super::error::{OpfError, ParseWarning, Result};
use super::stream::{OpfReader, OpfWriter};
use super::types::{
    BufferType, ColorMorphTarget, CustomSetting, GroupMorphTarget, Light, Mesh, MorphBlend,
    MorphVertex, ObjectTemplate, PhysicalTransform, SceneObject, TextureMorphTarget, TextureWrap,
    VertexMorphTarget,
};

pub const MAX_MESHES_PER_OBJECT: u32 = 100;
pub const MAX_FACES_PER_MESH: i32 = 100_000;
/// Nesting limit for child objects, counting a top-level object as depth 0.
pub const MAX_OBJECT_DEPTH: usize = 256;
/// Names longer than this that also contain a NUL mean the stream is out of
/// step with the record layout.
pub const SUSPICIOUS_NAME_LEN: usize = 50;

const MORPH_VERTEX_SIZE: u64 = 24;
const CUSTOM_SETTING_MIN_SIZE: u64 = 4;
const OBJECT_MIN_SIZE: u64 = 100;

// ============================================================================
// Reading
// ============================================================================

impl OpfReader<'_> {
    pub fn read_object(&mut self) -> Result<SceneObject> {
        self.read_object_at(0)
    }

    fn read_object_at(&mut self, depth: usize) -> Result<SceneObject> {
        if depth >= MAX_OBJECT_DEPTH {
            return Err(self.corrupt(format!(
                "object nesting exceeds {} levels",
                MAX_OBJECT_DEPTH
            )));
        }

        let class_name = self.read_string()?;
        let is_unknown = self.read_bool()?;
        let project_id = self.read_u16()?;
        let unique_id = self.read_i32()?;
        let override_flags = self.read_u8()?;
        let exclude_from_export = self.read_bool()?;

        let name_offset = self.position();
        let name = self.read_string()?;
        if name.contains('\0') && name.chars().count() > SUSPICIOUS_NAME_LEN {
            return Err(OpfError::InvalidObjectName {
                offset: name_offset,
                name,
            });
        }

        let position = self.read_vec3()?;
        let rotation = self.read_vec3()?;
        let scaling = self.read_vec3()?;
        let version = self.read_u32()?;
        let disabled = self.read_bool()?;
        let disable_tree = self.read_bool()?;
        let billboard = self.read_bool()?;

        let template = self.read_object_template()?;

        let light = if self.read_bool()? {
            Some(self.read_block::<Light>("light")?)
        } else {
            None
        };

        let reserved = self.read_u8()?;
        if reserved != 0 {
            self.warn(ParseWarning::ReservedByteNonZero {
                object: name.clone(),
                value: reserved,
            });
        }

        let custom_settings = self.read_custom_settings()?;

        let child_count = self.read_u32()?;
        self.ensure_elements(u64::from(child_count), OBJECT_MIN_SIZE, "child objects")?;
        let mut children = Vec::with_capacity(child_count as usize);
        for _ in 0..child_count {
            // A failing child fails the whole subtree.
            children.push(self.read_object_at(depth + 1)?);
        }

        Ok(SceneObject {
            class_name,
            name,
            is_unknown,
            project_id,
            unique_id,
            override_flags,
            exclude_from_export,
            version,
            disabled,
            disable_tree,
            billboard,
            position,
            rotation,
            scaling,
            template,
            light,
            custom_settings,
            children,
        })
    }

    fn read_object_template(&mut self) -> Result<ObjectTemplate> {
        let physical: PhysicalTransform = self.read_block("physical transform")?;
        let last_physical: PhysicalTransform = self.read_block("physical transform")?;

        let mesh_count = self.read_u32()?;
        if mesh_count > MAX_MESHES_PER_OBJECT {
            return Err(self.corrupt(format!("suspicious mesh count {}", mesh_count)));
        }
        let mut meshes = Vec::with_capacity(mesh_count as usize);
        for _ in 0..mesh_count {
            meshes.push(self.read_mesh()?);
        }

        Ok(ObjectTemplate {
            physical,
            last_physical,
            meshes,
        })
    }

    fn read_custom_settings(&mut self) -> Result<Vec<CustomSetting>> {
        let count = self.read_u32()?;
        self.ensure_elements(u64::from(count), CUSTOM_SETTING_MIN_SIZE, "custom settings")?;
        let mut settings = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let name = self.read_string()?;
            let value = self.read_string()?;
            settings.push(CustomSetting { name, value });
        }
        Ok(settings)
    }

    /// Bound a morph target count by the input left. Targets of a zero-sized
    /// morph take no bytes, so there the count itself is capped.
    fn ensure_targets(&self, count: u32, entry_size: u64, context: &str) -> Result<()> {
        if entry_size == 0 && u64::from(count) > self.remaining() {
            return Err(self.corrupt(format!(
                "{} {} with an empty morph, {} bytes left",
                count,
                context,
                self.remaining()
            )));
        }
        self.ensure_elements(u64::from(count), entry_size, context)
    }

    /// Read an i32 count that must not be negative.
    fn read_len(&mut self, what: &str) -> Result<u32> {
        let value = self.read_i32()?;
        u32::try_from(value).map_err(|_| self.corrupt(format!("negative {}: {}", what, value)))
    }

    pub fn read_mesh(&mut self) -> Result<Mesh> {
        let vertex_format = self.read_i32()?;
        let material_project_id = self.read_u16()?;
        let material_id = self.read_i32()?;
        let name = self.read_string()?;
        let texture_wrap: TextureWrap = self.read_block("texture wrap")?;
        let position = self.read_vec3()?;
        let bound_radius = self.read_f32()?;

        let morph_size = self.read_len("morph size")?;
        let vertex_target_count = self.read_len("vertex morph target count")?;
        let color_target_count = self.read_len("color morph target count")?;
        let texture_target_count = self.read_len("texture morph target count")?;
        let morph = u64::from(morph_size);

        self.ensure_elements(
            u64::from(vertex_target_count),
            morph * MORPH_VERTEX_SIZE + 2,
            "vertex morph targets",
        )?;
        let mut vertex_targets = Vec::new();
        for _ in 0..vertex_target_count {
            let mut vertices = Vec::with_capacity(morph_size as usize);
            for _ in 0..morph_size {
                vertices.push(self.read_block::<MorphVertex>("morph vertex")?);
            }
            let name = self.read_string()?;
            vertex_targets.push(VertexMorphTarget { name, vertices });
        }

        self.ensure_targets(color_target_count, morph * 4, "color morph targets")?;
        let mut color_targets = Vec::new();
        for _ in 0..color_target_count {
            let mut colors = Vec::with_capacity(morph_size as usize);
            for _ in 0..morph_size {
                colors.push(self.read_u32()?);
            }
            color_targets.push(ColorMorphTarget { colors });
        }

        self.ensure_targets(texture_target_count, morph * 8, "texture morph targets")?;
        let mut texture_targets = Vec::new();
        for _ in 0..texture_target_count {
            let mut tex_coords = Vec::with_capacity(morph_size as usize);
            for _ in 0..morph_size {
                tex_coords.push(self.read_vec2()?);
            }
            texture_targets.push(TextureMorphTarget { tex_coords });
        }

        let blend: MorphBlend = self.read_block("morph blend")?;

        let raw_buffer_type = self.read_i32()?;
        let buffer_type = BufferType::try_from(raw_buffer_type).map_err(|e| self.corrupt(e))?;
        let raw_face_count = self.read_i32()?;
        if !(0..=MAX_FACES_PER_MESH).contains(&raw_face_count) {
            return Err(self.corrupt(format!("invalid face count {}", raw_face_count)));
        }
        let face_count = raw_face_count as u32;
        let index_count = face_count as usize * buffer_type.stride();
        self.ensure_elements(index_count as u64, 2, "face indices")?;
        let mut indices = Vec::with_capacity(index_count);
        for _ in 0..index_count {
            indices.push(self.read_u16()?);
        }

        let group_target_count = self.read_len("group morph target count")?;
        self.ensure_targets(group_target_count, morph, "group morph targets")?;
        let mut group_targets = Vec::new();
        for _ in 0..group_target_count {
            let groups = self.read_bytes(morph_size as usize, "group morph target")?;
            group_targets.push(GroupMorphTarget { groups });
        }

        Ok(Mesh {
            name,
            vertex_format,
            material_project_id,
            material_id,
            texture_wrap,
            position,
            bound_radius,
            morph_size,
            vertex_targets,
            color_targets,
            texture_targets,
            blend,
            buffer_type,
            face_count,
            indices,
            group_targets,
        })
    }
}

// ============================================================================
// Writing
// ============================================================================

fn unencodable(what: &str, reason: String) -> OpfError {
    OpfError::Unencodable {
        what: what.to_string(),
        reason,
    }
}

fn to_i32(len: usize, what: &str) -> Result<i32> {
    i32::try_from(len).map_err(|_| unencodable(what, format!("{} does not fit an i32", len)))
}

impl<W: Write> OpfWriter<W> {
    pub fn write_object(&mut self, obj: &SceneObject) -> Result<()> {
        self.write_object_at(obj, 0)
    }

    fn write_object_at(&mut self, obj: &SceneObject, depth: usize) -> Result<()> {
        if depth >= MAX_OBJECT_DEPTH {
            return Err(unencodable(
                &obj.name,
                format!("object nesting exceeds {} levels", MAX_OBJECT_DEPTH),
            ));
        }

        self.write_string(&obj.class_name)?;
        self.write_bool(obj.is_unknown)?;
        self.write_u16(obj.project_id)?;
        self.write_i32(obj.unique_id)?;
        self.write_u8(obj.override_flags)?;
        self.write_bool(obj.exclude_from_export)?;
        self.write_string(&obj.name)?;

        self.write_vec3(&obj.position)?;
        self.write_vec3(&obj.rotation)?;
        self.write_vec3(&obj.scaling)?;
        self.write_u32(obj.version)?;
        self.write_bool(obj.disabled)?;
        self.write_bool(obj.disable_tree)?;
        self.write_bool(obj.billboard)?;

        self.write_block(&obj.template.physical, "physical transform")?;
        self.write_block(&obj.template.last_physical, "physical transform")?;
        if obj.template.meshes.len() > MAX_MESHES_PER_OBJECT as usize {
            return Err(unencodable(
                &obj.name,
                format!("{} meshes exceed the limit of {}", obj.template.meshes.len(), MAX_MESHES_PER_OBJECT),
            ));
        }
        self.write_count(obj.template.meshes.len(), "meshes")?;
        for mesh in &obj.template.meshes {
            self.write_mesh(mesh)?;
        }

        match &obj.light {
            Some(light) => {
                self.write_bool(true)?;
                self.write_block(light, "light")?;
            }
            None => self.write_bool(false)?,
        }

        // reserved
        self.write_u8(0)?;

        self.write_count(obj.custom_settings.len(), "custom settings")?;
        for setting in &obj.custom_settings {
            self.write_string(&setting.name)?;
            self.write_string(&setting.value)?;
        }

        self.write_count(obj.children.len(), "child objects")?;
        for child in &obj.children {
            self.write_object_at(child, depth + 1)?;
        }
        Ok(())
    }

    pub fn write_mesh(&mut self, mesh: &Mesh) -> Result<()> {
        validate_mesh(mesh)?;

        self.write_i32(mesh.vertex_format)?;
        self.write_u16(mesh.material_project_id)?;
        self.write_i32(mesh.material_id)?;
        self.write_string(&mesh.name)?;
        self.write_block(&mesh.texture_wrap, "texture wrap")?;
        self.write_vec3(&mesh.position)?;
        self.write_f32(mesh.bound_radius)?;

        self.write_i32(to_i32(mesh.morph_size as usize, "morph size")?)?;
        self.write_i32(to_i32(mesh.vertex_targets.len(), "vertex morph targets")?)?;
        self.write_i32(to_i32(mesh.color_targets.len(), "color morph targets")?)?;
        self.write_i32(to_i32(mesh.texture_targets.len(), "texture morph targets")?)?;

        for target in &mesh.vertex_targets {
            for vertex in &target.vertices {
                self.write_block(vertex, "morph vertex")?;
            }
            self.write_string(&target.name)?;
        }
        for target in &mesh.color_targets {
            for &color in &target.colors {
                self.write_u32(color)?;
            }
        }
        for target in &mesh.texture_targets {
            for uv in &target.tex_coords {
                self.write_vec2(uv)?;
            }
        }

        self.write_block(&mesh.blend, "morph blend")?;

        self.write_i32(mesh.buffer_type as i32)?;
        self.write_i32(to_i32(mesh.face_count as usize, "face count")?)?;
        for &index in &mesh.indices {
            self.write_u16(index)?;
        }

        self.write_i32(to_i32(mesh.group_targets.len(), "group morph targets")?)?;
        for target in &mesh.group_targets {
            self.write_bytes(&target.groups)?;
        }
        Ok(())
    }
}

/// Check that every per-vertex array matches `morph_size` and the index
/// buffer matches `face_count`; the reader depends on both.
fn validate_mesh(mesh: &Mesh) -> Result<()> {
    let morph = mesh.morph_size as usize;
    let what = format!("mesh {:?}", mesh.name);

    let lengths = mesh
        .vertex_targets
        .iter()
        .map(|t| ("vertex", t.vertices.len()))
        .chain(mesh.color_targets.iter().map(|t| ("color", t.colors.len())))
        .chain(mesh.texture_targets.iter().map(|t| ("texture", t.tex_coords.len())))
        .chain(mesh.group_targets.iter().map(|t| ("group", t.groups.len())));
    for (kind, len) in lengths {
        if len != morph {
            return Err(unencodable(
                &what,
                format!("{} morph target has {} entries, morph size is {}", kind, len, morph),
            ));
        }
    }

    if mesh.face_count > MAX_FACES_PER_MESH as u32 {
        return Err(unencodable(
            &what,
            format!("{} faces exceed the limit of {}", mesh.face_count, MAX_FACES_PER_MESH),
        ));
    }
    let expected = mesh.face_count as usize * mesh.buffer_type.stride();
    if mesh.indices.len() != expected {
        return Err(unencodable(
            &what,
            format!(
                "{} indices, expected {} ({} faces x {})",
                mesh.indices.len(),
                expected,
                mesh.face_count,
                mesh.buffer_type.stride()
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn write_object(obj: &SceneObject) -> Vec<u8> {
        let mut w = OpfWriter::new(Cursor::new(Vec::new()));
        w.write_object(obj).unwrap();
        w.into_inner().into_inner()
    }

    fn make_test_mesh() -> Mesh {
        let vertices = vec![
            MorphVertex { position: [0.0, 0.0, 0.0], normal: [0.0, 1.0, 0.0] },
            MorphVertex { position: [1.0, 0.0, 0.0], normal: [0.0, 1.0, 0.0] },
            MorphVertex { position: [0.0, 0.0, 1.0], normal: [0.0, 1.0, 0.0] },
        ];
        Mesh {
            name: "hull".to_string(),
            material_id: 4,
            morph_size: 3,
            vertex_targets: vec![VertexMorphTarget { name: "rest".to_string(), vertices }],
            color_targets: vec![
                ColorMorphTarget { colors: vec![0xFFFF_FFFF; 3] },
                ColorMorphTarget { colors: vec![0xFF00_00FF; 3] },
            ],
            texture_targets: vec![TextureMorphTarget {
                tex_coords: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            }],
            buffer_type: BufferType::Triangles,
            face_count: 1,
            indices: vec![0, 1, 2],
            group_targets: vec![GroupMorphTarget { groups: vec![0, 0, 1] }],
            ..Default::default()
        }
    }

    fn make_test_object(name: &str, unique_id: i32) -> SceneObject {
        SceneObject {
            class_name: "CUnit".to_string(),
            name: name.to_string(),
            unique_id,
            scaling: [1.0, 1.0, 1.0],
            ..Default::default()
        }
    }

    #[test]
    fn mesh_round_trip_keeps_independent_channels() {
        let mesh = make_test_mesh();
        let mut w = OpfWriter::new(Cursor::new(Vec::new()));
        w.write_mesh(&mesh).unwrap();
        let bytes = w.into_inner().into_inner();

        let mut r = OpfReader::new(&bytes);
        let back = r.read_mesh().unwrap();
        assert_eq!(back.vertex_targets.len(), 1);
        assert_eq!(back.color_targets.len(), 2);
        assert_eq!(back.texture_targets.len(), 1);
        assert_eq!(back, mesh);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn current_pose_comes_from_target_zero() {
        let mut mesh = make_test_mesh();
        mesh.texture_targets[0].tex_coords.truncate(2);
        let verts = mesh.current_vertices();
        assert_eq!(verts.len(), 3);
        assert_eq!(verts[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(verts[1].tex_coord, [1.0, 0.0]);
        assert_eq!(verts[2].tex_coord, [0.0, 0.0]);
        assert!(Mesh::default().current_vertices().is_empty());
    }

    #[test]
    fn object_with_light_settings_and_children() {
        let mut parent = make_test_object("Factory", 10);
        parent.template.meshes.push(make_test_mesh());
        parent.light = Some(Light { range: 50.0, active: true, ..Default::default() });
        parent.custom_settings = vec![
            CustomSetting::new("CanBuildUnit", "Scout"),
            CustomSetting::new("Cost", "400"),
            CustomSetting::new("CanBuildUnit", "Scout"),
        ];
        parent.children.push(make_test_object("Turret", 11));

        let bytes = write_object(&parent);
        let mut r = OpfReader::new(&bytes);
        let back = r.read_object().unwrap();
        assert_eq!(back, parent);
        assert!(r.take_warnings().is_empty());
    }

    #[test]
    fn nonzero_reserved_byte_only_warns() {
        let obj = make_test_object("Rock", 3);
        let mut bytes = write_object(&obj);
        // Tail: reserved u8, settings count u32, child count u32.
        let reserved_at = bytes.len() - 9;
        assert_eq!(bytes[reserved_at], 0);
        bytes[reserved_at] = 7;

        let mut r = OpfReader::new(&bytes);
        let back = r.read_object().unwrap();
        assert_eq!(back.name, "Rock");
        let warnings = r.take_warnings();
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0],
            ParseWarning::ReservedByteNonZero { value: 7, .. }
        ));
    }

    #[test]
    fn long_name_with_nul_is_rejected() {
        let name = format!("{}\0{}", "a".repeat(30), "b".repeat(30));
        let bytes = write_object(&make_test_object(&name, 1));
        let mut r = OpfReader::new(&bytes);
        assert!(matches!(
            r.read_object(),
            Err(OpfError::InvalidObjectName { .. })
        ));

        // Short names with a NUL are tolerated.
        let bytes = write_object(&make_test_object("ab\0c", 1));
        assert!(OpfReader::new(&bytes).read_object().is_ok());
    }

    #[test]
    fn too_many_faces_is_record_corruption() {
        let mut mesh = make_test_mesh();
        mesh.face_count = 0;
        mesh.indices.clear();
        let mut w = OpfWriter::new(Cursor::new(Vec::new()));
        w.write_mesh(&mesh).unwrap();
        let mut bytes = w.into_inner().into_inner();
        // face count sits just before the group count, which is followed by one 3-byte target
        let at = bytes.len() - 3 - 4 - 4;
        bytes[at..at + 4].copy_from_slice(&200_000i32.to_le_bytes());

        let err = OpfReader::new(&bytes).read_mesh().unwrap_err();
        assert!(err.is_record_level(), "{err}");
    }

    #[test]
    fn index_buffer_must_match_face_count() {
        let mut mesh = make_test_mesh();
        mesh.face_count = 2;
        let mut w = OpfWriter::new(Cursor::new(Vec::new()));
        assert!(matches!(
            w.write_mesh(&mesh),
            Err(OpfError::Unencodable { .. })
        ));
    }

    #[test]
    fn morph_target_lengths_must_match_morph_size() {
        let mut mesh = make_test_mesh();
        mesh.color_targets[1].colors.pop();
        let mut w = OpfWriter::new(Cursor::new(Vec::new()));
        assert!(w.write_mesh(&mesh).is_err());
    }

    #[test]
    fn failing_child_fails_parent() {
        let mut parent = make_test_object("Base", 1);
        parent.children.push(make_test_object("Tower", 2));
        let bytes = write_object(&parent);
        // Drop the child's trailing child count.
        let truncated = &bytes[..bytes.len() - 2];
        assert!(OpfReader::new(truncated).read_object().is_err());
    }

    fn empty_morph_mesh() -> Mesh {
        Mesh {
            name: "decal".to_string(),
            bound_radius: 1234.5,
            buffer_type: BufferType::Triangles,
            ..Default::default()
        }
    }

    /// Offset of the morph size, found by the distinctive bound radius just before it.
    fn morph_size_offset(bytes: &[u8]) -> usize {
        let radius = 1234.5f32.to_le_bytes();
        let at = bytes.windows(4).position(|w| w == radius).unwrap();
        at + 4
    }

    #[test]
    fn empty_morph_keeps_small_target_counts() {
        let mut mesh = empty_morph_mesh();
        mesh.color_targets = vec![ColorMorphTarget::default(); 2];
        mesh.group_targets = vec![GroupMorphTarget::default()];
        let mut w = OpfWriter::new(Vec::new());
        w.write_mesh(&mesh).unwrap();
        let bytes = w.into_inner();

        let back = OpfReader::new(&bytes).read_mesh().unwrap();
        assert_eq!(back, mesh);
    }

    #[test]
    fn huge_target_count_with_empty_morph_is_record_corruption() {
        let mut w = OpfWriter::new(Vec::new());
        w.write_mesh(&empty_morph_mesh()).unwrap();
        let bytes = w.into_inner();
        let morph_at = morph_size_offset(&bytes);
        assert_eq!(&bytes[morph_at..morph_at + 4], &0i32.to_le_bytes());

        // color and texture target counts, then the trailing group target count
        for at in [morph_at + 8, morph_at + 12, bytes.len() - 4] {
            let mut patched = bytes.clone();
            patched[at..at + 4].copy_from_slice(&i32::MAX.to_le_bytes());
            let err = OpfReader::new(&patched).read_mesh().unwrap_err();
            assert!(matches!(err, OpfError::RecordCorrupt { .. }), "{err}");
            assert!(err.is_record_level());
        }
    }

    /// `levels` nested objects, each holding the next as its only child.
    fn nested_object_bytes(levels: usize) -> Vec<u8> {
        let leaf = write_object(&make_test_object("Link", 1));
        // Everything but the trailing child count.
        let header = &leaf[..leaf.len() - 4];
        let mut bytes = Vec::new();
        for _ in 1..levels {
            bytes.extend_from_slice(header);
            bytes.extend_from_slice(&1u32.to_le_bytes());
        }
        bytes.extend_from_slice(&leaf);
        bytes
    }

    #[test]
    fn nesting_up_to_the_limit_parses() {
        let bytes = nested_object_bytes(MAX_OBJECT_DEPTH);
        let mut r = OpfReader::new(&bytes);
        let root = r.read_object().unwrap();
        assert_eq!(r.remaining(), 0);

        let mut depth = 1;
        let mut node = &root;
        while let Some(child) = node.children.first() {
            depth += 1;
            node = child;
        }
        assert_eq!(depth, MAX_OBJECT_DEPTH);
    }

    #[test]
    fn nesting_past_the_limit_is_record_corruption() {
        let bytes = nested_object_bytes(MAX_OBJECT_DEPTH + 1);
        let err = OpfReader::new(&bytes).read_object().unwrap_err();
        assert!(matches!(err, OpfError::RecordCorrupt { .. }), "{err}");
        assert!(err.is_record_level());
    }

    #[test]
    fn writer_rejects_nesting_past_the_limit() {
        let mut root = make_test_object("Link", 1);
        for _ in 0..MAX_OBJECT_DEPTH {
            let mut parent = make_test_object("Link", 1);
            parent.children.push(root);
            root = parent;
        }
        let mut w = OpfWriter::new(Vec::new());
        assert!(matches!(
            w.write_object(&root),
            Err(OpfError::Unencodable { .. })
        ));

        // One level less fits.
        let inner = root.children.pop().unwrap();
        let mut w = OpfWriter::new(Vec::new());
        w.write_object(&inner).unwrap();
    }
}
