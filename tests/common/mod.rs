// Shared builders for integration tests
#![allow(dead_code)]

use opf_tools_lib::opf::{
    BufferType, GroupMorphTarget, Mesh, MorphVertex, OpfProject, SceneObject, Texture,
    TextureMorphTarget, VertexMorphTarget,
};

/// Bare object with the engine's unit scaling.
pub fn make_object(name: &str, class_name: &str, unique_id: i32) -> SceneObject {
    SceneObject {
        class_name: class_name.to_string(),
        name: name.to_string(),
        unique_id,
        scaling: [1.0, 1.0, 1.0],
        ..Default::default()
    }
}

/// Triangle-list mesh with `verts` vertices and `faces` faces.
pub fn make_mesh(name: &str, faces: u32, verts: u32) -> Mesh {
    let vertices = (0..verts)
        .map(|i| MorphVertex {
            position: [i as f32, 0.0, (i % 3) as f32],
            normal: [0.0, 1.0, 0.0],
        })
        .collect();
    let indices = (0..faces * 3).map(|i| (i % verts.max(1)) as u16).collect();
    Mesh {
        name: name.to_string(),
        morph_size: verts,
        vertex_targets: vec![VertexMorphTarget {
            name: "base".to_string(),
            vertices,
        }],
        texture_targets: vec![TextureMorphTarget {
            tex_coords: (0..verts).map(|i| [i as f32 / 10.0, 0.5]).collect(),
        }],
        group_targets: vec![GroupMorphTarget {
            groups: vec![0; verts as usize],
        }],
        buffer_type: BufferType::Triangles,
        face_count: faces,
        indices,
        ..Default::default()
    }
}

/// A -> [B -> [D, E], C]
pub fn make_tree() -> SceneObject {
    let mut b = make_object("B", "CObject", 2);
    b.children = vec![
        make_object("D", "CObject", 4),
        make_object("E", "CObject", 5),
    ];
    let mut a = make_object("A", "CUnit", 1);
    a.children = vec![b, make_object("C", "CObject", 3)];
    a
}

/// Texture without embedded bitmaps.
pub fn make_texture(name: &str, id: i32) -> Texture {
    let mut texture = Texture {
        name: name.to_string(),
        ..Default::default()
    };
    texture.info.id = id;
    texture.info.has_color_channel = false;
    texture
}

pub fn make_project(objects: Vec<SceneObject>) -> OpfProject {
    OpfProject {
        project_name: "Test Project".to_string(),
        author: "Tester".to_string(),
        email: "test@example.com".to_string(),
        description: "Integration fixture".to_string(),
        project_id: 7,
        objects,
        ..Default::default()
    }
}
