//! Lookups and recursive statistics over a parsed project.

use std::collections::BTreeSet;
use std::fmt;

use super::types::{CustomSetting, Material, OpfProject, SceneObject, Texture};

/// Setting name that lists, one entry per unit, what an object can build.
pub const CAN_BUILD_UNIT: &str = "CanBuildUnit";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectCategory {
    Units,
    Buildings,
    Weapons,
    Projectiles,
    Effects,
    Environment,
    Other,
}

impl ObjectCategory {
    /// Classify by case-sensitive substrings of the class name. The first
    /// matching rule wins.
    pub fn from_class_name(class_name: &str) -> Self {
        if class_name.contains("Unit") {
            ObjectCategory::Units
        } else if class_name.contains("Base") || class_name.contains("Building") {
            ObjectCategory::Buildings
        } else if class_name.contains("Weapon") {
            ObjectCategory::Weapons
        } else if class_name.contains("Projectile") {
            ObjectCategory::Projectiles
        } else if class_name.contains("Effect") {
            ObjectCategory::Effects
        } else if class_name.contains("Env") {
            // also covers "Environment"
            ObjectCategory::Environment
        } else {
            ObjectCategory::Other
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ObjectCategory::Units => "Units",
            ObjectCategory::Buildings => "Buildings",
            ObjectCategory::Weapons => "Weapons",
            ObjectCategory::Projectiles => "Projectiles",
            ObjectCategory::Effects => "Effects",
            ObjectCategory::Environment => "Environment",
            ObjectCategory::Other => "Other",
        }
    }
}

impl fmt::Display for ObjectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Per-object queries
// ============================================================================

impl SceneObject {
    pub fn category(&self) -> ObjectCategory {
        ObjectCategory::from_class_name(&self.class_name)
    }

    /// Meshes of this object and all descendants.
    pub fn count_all_meshes_recursive(&self) -> usize {
        self.meshes().len()
            + self
                .children
                .iter()
                .map(SceneObject::count_all_meshes_recursive)
                .sum::<usize>()
    }

    /// Current-pose vertices of every mesh in the subtree.
    pub fn count_all_vertices_recursive(&self) -> usize {
        self.meshes().iter().map(|m| m.vertex_count()).sum::<usize>()
            + self
                .children
                .iter()
                .map(SceneObject::count_all_vertices_recursive)
                .sum::<usize>()
    }

    pub fn count_all_faces_recursive(&self) -> usize {
        self.meshes().iter().map(|m| m.face_count as usize).sum::<usize>()
            + self
                .children
                .iter()
                .map(SceneObject::count_all_faces_recursive)
                .sum::<usize>()
    }

    /// Number of descendants, not counting `self`.
    pub fn count_children_recursive(&self) -> usize {
        self.children.len()
            + self
                .children
                .iter()
                .map(SceneObject::count_children_recursive)
                .sum::<usize>()
    }

    pub fn has_any_meshes_recursive(&self) -> bool {
        !self.meshes().is_empty() || self.children.iter().any(SceneObject::has_any_meshes_recursive)
    }

    /// Depth-first pre-order walk over this object and its descendants.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a SceneObject, usize)) {
        self.walk_at(0, visit);
    }

    fn walk_at<'a>(&'a self, depth: usize, visit: &mut impl FnMut(&'a SceneObject, usize)) {
        visit(self, depth);
        for child in &self.children {
            child.walk_at(depth + 1, visit);
        }
    }

    /// Search this subtree by unique id.
    pub fn find_descendant(&self, unique_id: i32) -> Option<&SceneObject> {
        if self.unique_id == unique_id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_descendant(unique_id))
    }

    pub fn find_descendant_mut(&mut self, unique_id: i32) -> Option<&mut SceneObject> {
        if self.unique_id == unique_id {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|c| c.find_descendant_mut(unique_id))
    }

    // ------------------------------------------------------------------------
    // Custom settings
    // ------------------------------------------------------------------------

    /// Value of the first setting called `name`.
    pub fn custom_setting(&self, name: &str) -> Option<&str> {
        self.custom_settings
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.value.as_str())
    }

    pub fn has_custom_setting(&self, name: &str) -> bool {
        self.custom_settings.iter().any(|s| s.name == name)
    }

    /// Update the first setting called `name`, or append one.
    pub fn set_custom_setting(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.custom_settings.iter_mut().find(|s| s.name == name) {
            Some(setting) => setting.value = value,
            None => self.custom_settings.push(CustomSetting::new(name, value)),
        }
    }

    /// Remove the first setting called `name` only. Returns its value.
    pub fn remove_custom_setting(&mut self, name: &str) -> Option<String> {
        let index = self.custom_settings.iter().position(|s| s.name == name)?;
        Some(self.custom_settings.remove(index).value)
    }

    /// Every `CanBuildUnit` value in order, duplicates included.
    pub fn can_build_units(&self) -> Vec<&str> {
        self.custom_settings
            .iter()
            .filter(|s| s.name == CAN_BUILD_UNIT)
            .map(|s| s.value.as_str())
            .collect()
    }

    pub fn add_can_build_unit(&mut self, unit: impl Into<String>) {
        self.custom_settings.push(CustomSetting::new(CAN_BUILD_UNIT, unit));
    }

    /// Remove every `CanBuildUnit` entry naming `unit`.
    pub fn remove_can_build_unit(&mut self, unit: &str) {
        self.custom_settings
            .retain(|s| !(s.name == CAN_BUILD_UNIT && s.value == unit));
    }

    pub fn clear_can_build_units(&mut self) {
        self.custom_settings.retain(|s| s.name != CAN_BUILD_UNIT);
    }
}

// ============================================================================
// Project-wide queries
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProjectTotals {
    pub objects: usize,
    pub meshes: usize,
    pub vertices: usize,
    pub faces: usize,
}

impl OpfProject {
    pub fn find_object_by_id(&self, unique_id: i32) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.unique_id == unique_id)
    }

    pub fn find_object_by_id_mut(&mut self, unique_id: i32) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.unique_id == unique_id)
    }

    pub fn find_object_by_name(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn find_object_by_name_mut(&mut self, name: &str) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.name == name)
    }

    /// Search every subtree by unique id, roots first in order.
    pub fn find_object_in_tree(&self, unique_id: i32) -> Option<&SceneObject> {
        self.objects.iter().find_map(|o| o.find_descendant(unique_id))
    }

    pub fn find_object_in_tree_mut(&mut self, unique_id: i32) -> Option<&mut SceneObject> {
        self.objects
            .iter_mut()
            .find_map(|o| o.find_descendant_mut(unique_id))
    }

    pub fn find_texture_by_id(&self, id: i32) -> Option<&Texture> {
        self.textures.iter().find(|t| t.info.id == id)
    }

    pub fn find_texture_by_id_mut(&mut self, id: i32) -> Option<&mut Texture> {
        self.textures.iter_mut().find(|t| t.info.id == id)
    }

    pub fn find_texture_by_name(&self, name: &str) -> Option<&Texture> {
        self.textures.iter().find(|t| t.name == name)
    }

    pub fn find_material_by_id(&self, id: i32) -> Option<&Material> {
        self.materials.iter().find(|m| m.id == id)
    }

    pub fn find_material_by_id_mut(&mut self, id: i32) -> Option<&mut Material> {
        self.materials.iter_mut().find(|m| m.id == id)
    }

    pub fn find_material_by_name(&self, name: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.name == name)
    }

    /// Counts across every object in the project, descendants included.
    pub fn totals(&self) -> ProjectTotals {
        self.objects
            .iter()
            .fold(ProjectTotals::default(), |acc, o| ProjectTotals {
                objects: acc.objects + 1 + o.count_children_recursive(),
                meshes: acc.meshes + o.count_all_meshes_recursive(),
                vertices: acc.vertices + o.count_all_vertices_recursive(),
                faces: acc.faces + o.count_all_faces_recursive(),
            })
    }

    /// Top-level objects with at least one `CanBuildUnit` entry.
    pub fn buildable_objects(&self) -> Vec<&SceneObject> {
        self.objects
            .iter()
            .filter(|o| o.has_custom_setting(CAN_BUILD_UNIT))
            .collect()
    }

    /// Sorted, distinct names of top-level objects whose class is a unit.
    pub fn all_unit_names(&self) -> Vec<String> {
        self.objects
            .iter()
            .filter(|o| o.category() == ObjectCategory::Units)
            .map(|o| o.name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted, distinct names of every top-level object.
    pub fn all_object_names(&self) -> Vec<String> {
        self.objects
            .iter()
            .map(|o| o.name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
