use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::d3d::{describe, D3DBlend};
use crate::opf::{CustomSetting, EventDesc, Material, OpfProject, SceneObject, Texture};

use super::texture::{texture_filename, ExportFormat};

pub const MANIFEST_VERSION: &str = "2.0";

/// Machine-readable summary of a project for downstream tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub version: String,
    /// File the project was read from.
    pub source: String,
    pub project_name: String,
    #[serde(rename = "projectID")]
    pub project_id: u16,
    pub author: String,
    /// Every object in the project; descendants follow their root and name
    /// their parent.
    pub templates: Vec<TemplateEntry>,
    pub template_count: usize,
    pub textures: Vec<TextureEntry>,
    pub texture_count: usize,
    pub materials: Vec<MaterialEntry>,
    pub material_count: usize,
    pub dependencies: Vec<String>,
    pub events: Vec<EventDesc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateEntry {
    pub id: i32,
    /// Owning project id.
    pub index: u16,
    pub name: String,
    pub class: String,
    pub category: String,
    /// Lights and bases get special handling in the editor.
    pub is_special: bool,
    pub has_light: bool,
    pub is_billboard: bool,
    pub is_disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub mesh_count: usize,
    pub total_mesh_count: usize,
    pub child_count: usize,
    pub custom_settings: Vec<CustomSetting>,
    pub can_build_units: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureEntry {
    pub id: i32,
    pub name: String,
    #[serde(rename = "projectID")]
    pub project_id: u16,
    pub width: u32,
    pub height: u32,
    pub has_alpha: bool,
    pub has_color: bool,
    pub filename: String,
    /// Relative to the manifest.
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialEntry {
    pub id: i32,
    pub name: String,
    #[serde(rename = "projectID")]
    pub project_id: u16,
    pub double_sided: bool,
    pub lighting: bool,
    /// Primary texture, -1 when no stage references one.
    #[serde(rename = "textureID")]
    pub texture_id: i32,
    pub pass_count: usize,
    /// Blend factors of the first pass, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_blend: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_blend: Option<String>,
}

fn template_entry(object: &SceneObject, parent: Option<&str>) -> TemplateEntry {
    let is_special = object.has_light() || (parent.is_none() && object.class_name.contains("Base"));
    TemplateEntry {
        id: object.unique_id,
        index: object.project_id,
        name: object.name.clone(),
        class: object.class_name.clone(),
        category: object.category().to_string(),
        is_special,
        has_light: object.has_light(),
        is_billboard: object.billboard,
        is_disabled: object.disabled,
        parent: parent.map(str::to_string),
        mesh_count: object.meshes().len(),
        total_mesh_count: object.count_all_meshes_recursive(),
        child_count: object.children.len(),
        custom_settings: object.custom_settings.clone(),
        can_build_units: object
            .can_build_units()
            .into_iter()
            .map(str::to_string)
            .collect(),
    }
}

fn push_templates(object: &SceneObject, parent: Option<&str>, out: &mut Vec<TemplateEntry>) {
    out.push(template_entry(object, parent));
    for child in &object.children {
        push_templates(child, Some(&object.name), out);
    }
}

fn texture_entry(texture: &Texture) -> TextureEntry {
    let filename = texture_filename(texture, ExportFormat::Png);
    TextureEntry {
        id: texture.id(),
        name: texture.name.clone(),
        project_id: texture.info.project_id,
        width: texture.info.width,
        height: texture.info.height,
        has_alpha: texture.info.has_alpha_channel,
        has_color: texture.info.has_color_channel,
        path: format!("textures/{}", filename),
        filename,
    }
}

fn material_entry(material: &Material) -> MaterialEntry {
    let first = material
        .passes_1
        .first()
        .map(|p| &p.settings)
        .or_else(|| material.passes_2.first().map(|p| &p.settings))
        .or_else(|| material.passes_3.first().map(|p| &p.settings));

    MaterialEntry {
        id: material.id,
        name: material.name.clone(),
        project_id: material.project_id,
        double_sided: material.double_sided,
        lighting: material.enabled_lighting,
        texture_id: material.primary_texture_id(),
        pass_count: material.pass_count(),
        src_blend: first.map(|s| describe::<D3DBlend>(s.src_blend)),
        dst_blend: first.map(|s| describe::<D3DBlend>(s.dst_blend)),
    }
}

pub fn build_manifest(project: &OpfProject, source: &str) -> Manifest {
    let mut templates = Vec::new();
    for object in &project.objects {
        push_templates(object, None, &mut templates);
    }
    let textures: Vec<_> = project.textures.iter().map(texture_entry).collect();
    let materials: Vec<_> = project.materials.iter().map(material_entry).collect();

    Manifest {
        version: MANIFEST_VERSION.to_string(),
        source: source.to_string(),
        project_name: project.project_name.clone(),
        project_id: project.project_id,
        author: project.author.clone(),
        template_count: templates.len(),
        templates,
        texture_count: textures.len(),
        textures,
        material_count: materials.len(),
        materials,
        dependencies: project.dependencies.clone(),
        events: project.events.clone(),
    }
}

impl Manifest {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = self.to_json().context("failed to serialize manifest")?;
        std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), templates = self.template_count, "wrote manifest");
        Ok(())
    }
}
