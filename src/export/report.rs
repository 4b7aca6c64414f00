use std::collections::BTreeMap;

use ptree::item::StringItem;
use ptree::TreeBuilder;

use crate::opf::{ObjectCategory, OpfProject, SceneObject};

fn node_label(object: &SceneObject) -> String {
    format!(
        "{} [{}] id={} meshes={} children={}",
        object.name,
        object.class_name,
        object.unique_id,
        object.meshes().len(),
        object.children.len()
    )
}

fn add_object(tree: &mut TreeBuilder, object: &SceneObject) {
    if object.children.is_empty() {
        tree.add_empty_child(node_label(object));
    } else {
        tree.begin_child(node_label(object));
        for child in &object.children {
            add_object(tree, child);
        }
        tree.end_child();
    }
}

/// Object hierarchy rooted at the project name, for `ptree::print_tree`.
pub fn object_tree(project: &OpfProject) -> StringItem {
    let mut tree = TreeBuilder::new(project.project_name.clone());
    for object in &project.objects {
        add_object(&mut tree, object);
    }
    tree.build()
}

/// Plain-text overview of a project: header, totals, top-level objects by
/// category and the full object tree.
pub fn asset_report(project: &OpfProject) -> String {
    let totals = project.totals();
    let mut lines = vec![
        format!("Project: {}", project.project_name),
        format!("Author: {}", project.author),
        format!("Project ID: {}", project.project_id),
        String::new(),
        format!("Dependencies: {}", project.dependencies.len()),
        format!("Events: {}", project.events.len()),
        format!("Textures: {}", project.textures.len()),
        format!("Materials: {}", project.materials.len()),
        format!("Top-level objects: {}", project.objects.len()),
        format!("Objects (including children): {}", totals.objects),
        format!("Meshes: {}", totals.meshes),
        format!("Vertices: {}", totals.vertices),
        format!("Faces: {}", totals.faces),
    ];

    let mut by_category: BTreeMap<ObjectCategory, Vec<&str>> = BTreeMap::new();
    for object in &project.objects {
        by_category
            .entry(object.category())
            .or_default()
            .push(&object.name);
    }

    lines.push(String::new());
    lines.push("== Categories ==".to_string());
    for (category, names) in &mut by_category {
        names.sort_unstable();
        lines.push(format!("{} ({})", category, names.len()));
        lines.extend(names.iter().map(|name| format!("  {}", name)));
    }

    lines.push(String::new());
    lines.push("== Object tree ==".to_string());
    for object in &project.objects {
        object.walk(&mut |o, depth| {
            lines.push(format!(
                "{}{} ({}) meshes={} children={}",
                "  ".repeat(depth),
                o.name,
                o.class_name,
                o.meshes().len(),
                o.children.len()
            ));
        });
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
