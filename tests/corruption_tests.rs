// Damaged input: bounds checks, truncation and salvage

use opf_tools_lib::opf::{
    self, Bitmap, BitmapInfoHeader, BitmapType, OpfError, OpfProject, Texture, CAN_BUILD_UNIT,
};

#[path = "common/mod.rs"]
mod common;

fn texture_with_bitmap(index: i32) -> Texture {
    let mut texture = common::make_texture(&format!("tex{index}"), index);
    texture.info.has_color_channel = true;
    texture.color_bitmap = Bitmap {
        bits_per_pixel: 24,
        width: 8,
        height: 8,
        line_size: 24,
        bitmap_type: BitmapType::Bmp,
        header_size: 40,
        info_header: BitmapInfoHeader {
            size: 40,
            width: 8,
            height: 8,
            planes: 1,
            bit_count: 24,
            size_image: 192,
            ..Default::default()
        },
        extra_header: Vec::new(),
        data: vec![index as u8; 192],
    };
    texture
}

#[test]
fn huge_object_count_is_rejected() {
    let mut bytes = opf::write_opf(&common::make_project(Vec::new())).unwrap();
    let at = bytes.len() - 4;
    bytes[at..].copy_from_slice(&2_000_000u32.to_le_bytes());

    match opf::parse_opf(&bytes) {
        Err(OpfError::CountOutOfBounds { what, count, max }) => {
            assert_eq!(what, "objects");
            assert_eq!(count, 2_000_000);
            assert_eq!(max, 10_000);
        }
        other => panic!("expected CountOutOfBounds, got {:?}", other),
    }
}

#[test]
fn truncated_texture_keeps_earlier_textures() {
    let textures: Vec<Texture> = (0..5).map(texture_with_bitmap).collect();
    let project = OpfProject {
        textures: textures.clone(),
        ..common::make_project(Vec::new())
    };
    let bytes = opf::write_opf(&project).unwrap();

    // Offset where texture 2 begins: a project holding only the first two
    // textures, minus its material and object counts.
    let two = OpfProject {
        textures: textures[..2].to_vec(),
        ..common::make_project(Vec::new())
    };
    let texture_2_start = opf::write_opf(&two).unwrap().len() - 8;
    // Cut inside texture 2's pixel data
    let cut = &bytes[..texture_2_start + 150];

    assert!(matches!(
        opf::parse_opf(cut),
        Err(OpfError::UnexpectedEof { .. })
    ));

    let salvage = opf::salvage_opf(cut).unwrap();
    assert!(matches!(salvage.error, Some(OpfError::UnexpectedEof { .. })));
    assert_eq!(salvage.project.textures.len(), 2);
    assert_eq!(salvage.project.textures[0], textures[0]);
    assert_eq!(salvage.project.textures[1], textures[1]);
    assert!(salvage.project.materials.is_empty());
    assert_eq!(salvage.project.project_name, "Test Project");
}

#[test]
fn stale_bitmap_is_not_written_without_its_flag() {
    let mut stale = texture_with_bitmap(1);
    stale.info.has_color_channel = false;
    let clean = Texture {
        color_bitmap: Bitmap::default(),
        ..stale.clone()
    };

    let with_stale = OpfProject {
        textures: vec![stale],
        ..Default::default()
    };
    let with_clean = OpfProject {
        textures: vec![clean],
        ..Default::default()
    };
    assert_eq!(
        opf::write_opf(&with_stale).unwrap(),
        opf::write_opf(&with_clean).unwrap()
    );
}

#[test]
fn bad_header_fails_even_when_salvaging() {
    let mut bytes = opf::write_opf(&OpfProject::default()).unwrap();
    bytes[23..27].copy_from_slice(&28u32.to_le_bytes());
    assert!(matches!(
        opf::salvage_opf(&bytes),
        Err(OpfError::UnsupportedVersion { found: 28 })
    ));
    assert!(matches!(
        opf::salvage_opf(&bytes[..10]),
        Err(OpfError::UnexpectedEof { .. })
    ));
}

#[test]
fn can_build_unit_keeps_duplicates_and_removes_all() {
    let mut factory = common::make_object("Factory", "CBaseObject", 1);
    factory.set_custom_setting("Cost", "300");
    factory.add_can_build_unit("Tank");
    factory.add_can_build_unit("Tank");
    factory.add_can_build_unit("Jeep");
    assert_eq!(factory.can_build_units(), ["Tank", "Tank", "Jeep"]);

    let project = common::make_project(vec![factory]);
    let mut parsed = opf::parse_opf(&opf::write_opf(&project).unwrap()).unwrap();
    assert_eq!(parsed.buildable_objects().len(), 1);

    let factory = &mut parsed.objects[0];
    assert_eq!(factory.can_build_units(), ["Tank", "Tank", "Jeep"]);

    // The generic remove only takes the first match
    assert_eq!(
        factory.remove_custom_setting(CAN_BUILD_UNIT).as_deref(),
        Some("Tank")
    );
    assert_eq!(factory.can_build_units(), ["Tank", "Jeep"]);

    factory.add_can_build_unit("Tank");
    factory.remove_can_build_unit("Tank");
    assert_eq!(factory.can_build_units(), ["Jeep"]);
    assert_eq!(factory.custom_setting("Cost"), Some("300"));

    factory.clear_can_build_units();
    assert!(factory.can_build_units().is_empty());
    assert!(parsed.buildable_objects().is_empty());
}
