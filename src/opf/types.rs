//! In-memory model of a packed project.
//!
//! Fixed-size blocks are `#[binrw]` structs read in one go. Records with
//! strings, counts or optional parts are assembled by hand in the codec
//! modules. Every on-disk field is kept, including the ones the engine
//! treats as redundant, so that an unmodified project writes back the same
//! bytes it was read from.

use binrw::binrw;
use serde::{Deserialize, Serialize};

use crate::d3d::{
    D3DBlend, D3DCmpFunc, D3DFillMode, D3DLightType, D3DShadeMode, D3DTextureAddress,
    D3DTextureArg, D3DTextureMagFilter, D3DTextureMinFilter, D3DTextureMipFilter, D3DTextureOp,
    PixelOperation,
};

pub type Vec2 = [f32; 2];
pub type Vec3 = [f32; 3];

/// Packed D3DCOLOR (0xAARRGGBB).
pub type Color = u32;

#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ColorValue4F {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorValue4F {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_slice(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

// ============================================================================
// Project
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OpfProject {
    pub project_name: String,
    pub author: String,
    pub email: String,
    pub description: String,
    pub project_id: u16,
    /// Paths of other packed projects this one builds on.
    pub dependencies: Vec<String>,
    pub events: Vec<EventDesc>,
    pub textures: Vec<Texture>,
    pub materials: Vec<Material>,
    pub objects: Vec<SceneObject>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventDesc {
    pub trigger: i32,
    pub name: String,
}

// ============================================================================
// Textures and bitmaps
// ============================================================================

/// Storage of one embedded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitmapType {
    #[default]
    Bmp,
    JpegNoSubsampling,
    Jpeg411,
    Jpeg422,
    Unknown(u8),
}

impl BitmapType {
    /// Raw pixels carry no length prefix; everything else is a sized blob.
    pub fn is_raw(self) -> bool {
        self == BitmapType::Bmp
    }
}

impl From<u8> for BitmapType {
    fn from(value: u8) -> Self {
        match value {
            0 => BitmapType::Bmp,
            1 => BitmapType::JpegNoSubsampling,
            2 => BitmapType::Jpeg411,
            3 => BitmapType::Jpeg422,
            other => BitmapType::Unknown(other),
        }
    }
}

impl From<BitmapType> for u8 {
    fn from(value: BitmapType) -> Self {
        match value {
            BitmapType::Bmp => 0,
            BitmapType::JpegNoSubsampling => 1,
            BitmapType::Jpeg411 => 2,
            BitmapType::Jpeg422 => 3,
            BitmapType::Unknown(other) => other,
        }
    }
}

/// BITMAPINFOHEADER. Only the fields covered by the declared header length
/// are present on disk; the rest stay zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BitmapInfoHeader {
    pub size: u32,
    pub width: i32,
    pub height: i32,
    pub planes: u16,
    pub bit_count: u16,
    pub compression: u32,
    pub size_image: u32,
    pub x_pels_per_meter: i32,
    pub y_pels_per_meter: i32,
    pub clr_used: u32,
    pub clr_important: u32,
}

impl BitmapInfoHeader {
    pub const SCHEMA_SIZE: u32 = 40;
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bitmap {
    pub bits_per_pixel: i32,
    pub width: i32,
    pub height: i32,
    pub line_size: i32,
    pub bitmap_type: BitmapType,
    /// Declared info header length in bytes.
    pub header_size: u32,
    pub info_header: BitmapInfoHeader,
    /// Header bytes past the known schema, kept verbatim.
    pub extra_header: Vec<u8>,
    pub data: Vec<u8>,
}

impl Bitmap {
    /// Payload length a raw bitmap declares for itself.
    pub fn declared_raw_len(&self) -> u64 {
        if self.info_header.size_image != 0 {
            u64::from(self.info_header.size_image)
        } else {
            let line = i64::from(self.line_size).max(0) as u64;
            let rows = i64::from(self.height).unsigned_abs();
            line * rows
        }
    }
}

/// Fixed block between a texture's file names and its bitmaps.
#[binrw]
#[derive(Debug, Clone, PartialEq)]
pub struct TextureInfo {
    pub width: u32,
    pub height: u32,
    pub id: i32,

    pub color_bit_depth_in_file: i32,
    pub color_bit_depth_in_memory: i32,
    pub alpha_bit_depth_in_file: i32,
    pub alpha_bit_depth_in_memory: i32,

    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| u8::from(*x))]
    pub color_dither: bool,
    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| u8::from(*x))]
    pub alpha_dither: bool,
    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| u8::from(*x))]
    pub inverse_alpha: bool,
    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| u8::from(*x))]
    pub better_quality: bool,
    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| u8::from(*x))]
    pub has_color_channel: bool,
    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| u8::from(*x))]
    pub has_alpha_channel: bool,
    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| u8::from(*x))]
    pub gray_scale: bool,
    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| u8::from(*x))]
    pub multi_texture: bool,

    pub max_cap: i32,
    pub project_id: u16,
    pub version: u32,

    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| u8::from(*x))]
    pub mip_map: bool,
    pub override_flags: u8,
    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| u8::from(*x))]
    pub exclude_from_export: bool,

    /// Bitmap type codes used when the editor re-exports the channels.
    pub export_color_quality: u8,
    pub export_alpha_quality: u8,
    pub export_color_jpeg_quality: u8,
    pub export_alpha_jpeg_quality: u8,
}

impl Default for TextureInfo {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            id: 0,
            color_bit_depth_in_file: 0,
            color_bit_depth_in_memory: 0,
            alpha_bit_depth_in_file: 0,
            alpha_bit_depth_in_memory: 0,
            color_dither: true,
            alpha_dither: true,
            inverse_alpha: false,
            better_quality: false,
            has_color_channel: true,
            has_alpha_channel: false,
            gray_scale: false,
            multi_texture: false,
            max_cap: 16,
            project_id: 0,
            version: 0,
            mip_map: true,
            override_flags: 0,
            exclude_from_export: false,
            export_color_quality: 0,
            export_alpha_quality: 0,
            export_color_jpeg_quality: 88,
            export_alpha_jpeg_quality: 88,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Texture {
    pub name: String,
    /// Source file the color channel was imported from.
    pub color_file: String,
    pub alpha_file: String,
    pub info: TextureInfo,
    /// Only serialized when `info.has_color_channel` is set.
    pub color_bitmap: Bitmap,
    /// Only serialized when `info.has_alpha_channel` is set.
    pub alpha_bitmap: Bitmap,
}

impl Texture {
    pub fn id(&self) -> i32 {
        self.info.id
    }

    pub fn color(&self) -> Option<&Bitmap> {
        self.info.has_color_channel.then_some(&self.color_bitmap)
    }

    pub fn alpha(&self) -> Option<&Bitmap> {
        self.info.has_alpha_channel.then_some(&self.alpha_bitmap)
    }

    /// Bytes held by the embedded payloads.
    pub fn memory_usage(&self) -> usize {
        self.color_bitmap.data.len() + self.alpha_bitmap.data.len()
    }
}

// ============================================================================
// Materials
// ============================================================================

/// D3DMATERIAL7
#[binrw]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialDescription {
    pub diffuse: ColorValue4F,
    pub ambient: ColorValue4F,
    pub specular: ColorValue4F,
    pub emissive: ColorValue4F,
    pub power: f32,
}

impl Default for MaterialDescription {
    fn default() -> Self {
        Self {
            diffuse: ColorValue4F::new(1.0, 1.0, 1.0, 0.0),
            ambient: ColorValue4F::new(1.0, 1.0, 1.0, 0.0),
            specular: ColorValue4F::new(1.0, 1.0, 1.0, 0.0),
            emissive: ColorValue4F::default(),
            power: 0.0,
        }
    }
}

pub const STIPPLE_ROWS: usize = 32;

#[binrw]
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPassSettings {
    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| u8::from(*x))]
    pub antialias: bool,
    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| u8::from(*x))]
    pub perspective_correction: bool,
    pub fill_mode: u8,
    pub shade_mode: u8,
    pub line_repeat_factor: u16,
    pub line_pattern: u16,
    pub pixel_operation: u8,
    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| u8::from(*x))]
    pub write_z: bool,
    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| u8::from(*x))]
    pub alpha_test: bool,
    pub alpha_ref: u8,
    pub alpha_func: u8,
    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| u8::from(*x))]
    pub draw_last_pixel: bool,
    pub src_blend: u8,
    pub dst_blend: u8,
    pub z_func: u8,
    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| u8::from(*x))]
    pub alpha_blending: bool,
    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| u8::from(*x))]
    pub fog: bool,
    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| u8::from(*x))]
    pub specular: bool,
    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| u8::from(*x))]
    pub stippled: bool,
    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| u8::from(*x))]
    pub edge_antialias: bool,
    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| u8::from(*x))]
    pub color_keying: bool,
    pub z_bias: u8,
    pub texture_factor: Color,
    pub stipple_pattern: [u32; STIPPLE_ROWS],
    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| u8::from(*x))]
    pub use_vertex_color: bool,
    pub material: MaterialDescription,
}

impl Default for RenderPassSettings {
    fn default() -> Self {
        let mut stipple_pattern = [0u32; STIPPLE_ROWS];
        for (row, value) in stipple_pattern.iter_mut().enumerate() {
            *value = if row % 2 == 0 { 0xAAAA_AAAA } else { 0x5555_5555 };
        }
        Self {
            antialias: true,
            perspective_correction: true,
            fill_mode: D3DFillMode::Solid.into(),
            shade_mode: D3DShadeMode::Gouraud.into(),
            line_repeat_factor: 1,
            line_pattern: 0xFFFF,
            pixel_operation: PixelOperation::CopyPen.into(),
            write_z: true,
            alpha_test: false,
            alpha_ref: 0,
            alpha_func: D3DCmpFunc::Always.into(),
            draw_last_pixel: false,
            src_blend: D3DBlend::One.into(),
            dst_blend: D3DBlend::Zero.into(),
            z_func: D3DCmpFunc::LessEqual.into(),
            alpha_blending: false,
            fog: true,
            specular: false,
            stippled: false,
            edge_antialias: false,
            color_keying: false,
            z_bias: 0,
            texture_factor: 0,
            stipple_pattern,
            use_vertex_color: true,
            material: MaterialDescription::default(),
        }
    }
}

/// One texture blending stage.
#[binrw]
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPassStage {
    pub color_arg1: u8,
    pub color_arg2: u8,
    pub color_op: u8,
    pub alpha_arg1: u8,
    pub alpha_arg2: u8,
    pub alpha_op: u8,
    pub tex_coord_index: u8,
    pub address_u: u8,
    pub address_v: u8,
    pub border_color: Color,
    pub mag_filter: u8,
    pub min_filter: u8,
    pub mip_filter: u8,
    pub mip_lod_bias: f32,
    pub min_mip_level: u8,
    pub max_anisotropy: u8,
    /// D3DWRAP_U / D3DWRAP_V bits.
    pub wrapping: u8,
    pub texture_project_id: u16,
    pub texture_id: i32,
    pub texture_stage_in_texture: i32,
}

impl Default for RenderPassStage {
    fn default() -> Self {
        Self {
            color_arg1: D3DTextureArg::Texture.into(),
            color_arg2: D3DTextureArg::Diffuse.into(),
            color_op: D3DTextureOp::Modulate.into(),
            alpha_arg1: D3DTextureArg::Texture.into(),
            alpha_arg2: D3DTextureArg::Diffuse.into(),
            alpha_op: D3DTextureOp::Modulate.into(),
            tex_coord_index: 0,
            address_u: D3DTextureAddress::Wrap.into(),
            address_v: D3DTextureAddress::Wrap.into(),
            border_color: 0xFFFF_FFFF,
            mag_filter: D3DTextureMagFilter::Anisotropic.into(),
            min_filter: D3DTextureMinFilter::Anisotropic.into(),
            mip_filter: D3DTextureMipFilter::Linear.into(),
            mip_lod_bias: 0.0,
            min_mip_level: 0,
            max_anisotropy: 1,
            wrapping: 0,
            texture_project_id: 0,
            texture_id: 0,
            texture_stage_in_texture: 1,
        }
    }
}

/// A settings block followed by exactly `STAGES` stage blocks. The stage
/// count is not stored per pass; it is implied by which material list the
/// pass belongs to.
#[binrw]
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPass<const STAGES: usize> {
    pub settings: RenderPassSettings,
    pub stages: [RenderPassStage; STAGES],
}

impl<const STAGES: usize> Default for RenderPass<STAGES> {
    fn default() -> Self {
        Self {
            settings: RenderPassSettings::default(),
            stages: std::array::from_fn(|_| RenderPassStage::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub project_id: u16,
    pub id: i32,
    pub version: u32,
    pub double_sided: bool,
    pub enabled_lighting: bool,
    pub override_flags: u8,
    pub exclude_from_export: bool,
    pub passes_1: Vec<RenderPass<1>>,
    pub passes_2: Vec<RenderPass<2>>,
    pub passes_3: Vec<RenderPass<3>>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            project_id: 0,
            id: 0,
            version: 0,
            double_sided: true,
            enabled_lighting: true,
            override_flags: 0,
            exclude_from_export: false,
            passes_1: Vec::new(),
            passes_2: Vec::new(),
            passes_3: Vec::new(),
        }
    }
}

impl Material {
    /// Every stage of every pass, 1-stage passes first.
    pub fn stages(&self) -> impl Iterator<Item = &RenderPassStage> {
        self.passes_1
            .iter()
            .flat_map(|p| p.stages.iter())
            .chain(self.passes_2.iter().flat_map(|p| p.stages.iter()))
            .chain(self.passes_3.iter().flat_map(|p| p.stages.iter()))
    }

    /// First non-zero texture id referenced by any stage, or -1.
    pub fn primary_texture_id(&self) -> i32 {
        self.stages()
            .map(|s| s.texture_id)
            .find(|&id| id != 0)
            .unwrap_or(-1)
    }

    pub fn pass_count(&self) -> usize {
        self.passes_1.len() + self.passes_2.len() + self.passes_3.len()
    }
}

// ============================================================================
// Objects
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomSetting {
    pub name: String,
    pub value: String,
}

impl CustomSetting {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PhysicalTransform {
    pub scaling: Vec3,
    pub position: Vec3,
    pub rotation: Vec3,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectTemplate {
    pub physical: PhysicalTransform,
    /// Snapshot of `physical` from the previous editor session.
    pub last_physical: PhysicalTransform,
    pub meshes: Vec<Mesh>,
}

#[binrw]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub diffuse: ColorValue4F,
    pub ambient: ColorValue4F,
    pub specular: ColorValue4F,
    pub light_type: u32,
    pub attenuation0: f32,
    pub attenuation1: f32,
    pub attenuation2: f32,
    pub falloff: f32,
    pub phi: f32,
    pub range: f32,
    pub theta: f32,
    #[br(map = |x: u8| x != 0)]
    #[bw(map = |x: &bool| u8::from(*x))]
    pub active: bool,
    pub position: Vec3,
    pub rotation: Vec3,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            diffuse: ColorValue4F::new(1.0, 1.0, 1.0, 0.0),
            ambient: ColorValue4F::default(),
            specular: ColorValue4F::new(1.0, 1.0, 1.0, 0.0),
            light_type: D3DLightType::Point.into(),
            attenuation0: 0.0,
            attenuation1: 0.0,
            attenuation2: 1.0,
            falloff: 0.0,
            phi: 0.0,
            range: 1.0,
            theta: 0.0,
            active: false,
            position: [0.0; 3],
            rotation: [0.0; 3],
        }
    }
}

impl Light {
    pub fn kind(&self) -> Option<D3DLightType> {
        D3DLightType::try_from(self.light_type).ok()
    }
}

/// A scene object and the subtree it owns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneObject {
    pub class_name: String,
    pub name: String,
    pub is_unknown: bool,
    pub project_id: u16,
    /// Identity key used for lookups.
    pub unique_id: i32,
    pub override_flags: u8,
    pub exclude_from_export: bool,
    pub version: u32,
    pub disabled: bool,
    pub disable_tree: bool,
    pub billboard: bool,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scaling: Vec3,
    pub template: ObjectTemplate,
    pub light: Option<Light>,
    /// Gameplay parameters. Names may repeat and order is significant.
    pub custom_settings: Vec<CustomSetting>,
    pub children: Vec<SceneObject>,
}

impl SceneObject {
    pub fn meshes(&self) -> &[Mesh] {
        &self.template.meshes
    }

    pub fn meshes_mut(&mut self) -> &mut Vec<Mesh> {
        &mut self.template.meshes
    }

    pub fn has_light(&self) -> bool {
        self.light.is_some()
    }
}

// ============================================================================
// Meshes
// ============================================================================

/// Primitive topology. The value is also the number of indices per face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferType {
    Points = 1,
    Lines = 2,
    #[default]
    Triangles = 3,
}

impl BufferType {
    pub fn stride(self) -> usize {
        self as usize
    }
}

impl TryFrom<i32> for BufferType {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(BufferType::Points),
            2 => Ok(BufferType::Lines),
            3 => Ok(BufferType::Triangles),
            _ => Err(format!("Invalid buffer type: {}", value)),
        }
    }
}

#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextureWrap {
    /// 0 flat, 1 cylinder, 2 sphere, 3 square sequence, 4 triangle sequence
    pub wrap_type: u32,
    pub origin: Vec3,
    pub rotation: Vec3,
    pub scale: Vec2,
    pub position: Vec2,
}

#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MorphVertex {
    pub position: Vec3,
    pub normal: Vec3,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VertexMorphTarget {
    pub name: String,
    pub vertices: Vec<MorphVertex>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColorMorphTarget {
    pub colors: Vec<Color>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextureMorphTarget {
    pub tex_coords: Vec<Vec2>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupMorphTarget {
    pub groups: Vec<u8>,
}

/// How the runtime blends between morph targets, per channel. Texture
/// channels are indexed by texture coordinate set.
#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MorphBlend {
    pub src_vertex: i32,
    pub src_color: i32,
    pub src_texture: [i32; 3],
    pub dst_vertex: i32,
    pub dst_color: i32,
    pub dst_texture: [i32; 3],
    pub amount_vertex: f32,
    pub amount_color: f32,
    pub amount_texture: [f32; 3],
    #[br(map = |x: [u8; 3]| x.map(|b| b != 0))]
    #[bw(map = |x: &[bool; 3]| x.map(u8::from))]
    pub dst_environment: [bool; 3],
}

/// Vertex as seen in the current pose.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coord: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    /// D3DFVF flags.
    pub vertex_format: i32,
    pub material_project_id: u16,
    pub material_id: i32,
    pub texture_wrap: TextureWrap,
    pub position: Vec3,
    pub bound_radius: f32,
    /// Vertices per morph target.
    pub morph_size: u32,
    pub vertex_targets: Vec<VertexMorphTarget>,
    pub color_targets: Vec<ColorMorphTarget>,
    pub texture_targets: Vec<TextureMorphTarget>,
    pub blend: MorphBlend,
    pub buffer_type: BufferType,
    pub face_count: u32,
    pub indices: Vec<u16>,
    pub group_targets: Vec<GroupMorphTarget>,
}

impl Default for Mesh {
    fn default() -> Self {
        Self {
            name: String::new(),
            vertex_format: 0x002,
            material_project_id: 0,
            material_id: 0,
            texture_wrap: TextureWrap::default(),
            position: [0.0; 3],
            bound_radius: 0.0,
            morph_size: 0,
            vertex_targets: Vec::new(),
            color_targets: Vec::new(),
            texture_targets: Vec::new(),
            blend: MorphBlend::default(),
            buffer_type: BufferType::Triangles,
            face_count: 0,
            indices: Vec::new(),
            group_targets: Vec::new(),
        }
    }
}

impl Mesh {
    /// The current pose: positions and normals of vertex target 0 with the
    /// UVs of texture target 0 spliced in by index. Empty without a vertex
    /// target.
    pub fn current_vertices(&self) -> Vec<Vertex> {
        let Some(base) = self.vertex_targets.first() else {
            return Vec::new();
        };
        let uvs = self
            .texture_targets
            .first()
            .map(|t| t.tex_coords.as_slice())
            .unwrap_or(&[]);
        base.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| Vertex {
                position: v.position,
                normal: v.normal,
                tex_coord: uvs.get(i).copied().unwrap_or_default(),
            })
            .collect()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_targets
            .first()
            .map(|t| t.vertices.len())
            .unwrap_or(0)
    }
}
