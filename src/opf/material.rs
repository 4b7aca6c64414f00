//! Materials and their render passes.
//!
//! ```text
//! Material:
//!   name                                  u16 string
//!   project_id u16, id i32, version u32
//!   double_sided, lighting, override, exclude   u8 x4
//!   u32 count, count x RenderPass<1>
//!   u32 count, count x RenderPass<2>
//!   u32 count, count x RenderPass<3>
//!
//! RenderPass<N>: RenderPassSettings (225 bytes) + N x RenderPassStage (33 bytes)
//! ```
//!
//! Passes carry no stage count of their own; the arity comes from the list a
//! pass is stored in.

use std::io::Write;

use super::error::Result;
use super::stream::{OpfReader, OpfWriter};
use super::types::{Material, RenderPass};

const SETTINGS_SIZE: u64 = 225;
const STAGE_SIZE: u64 = 33;

impl OpfReader<'_> {
    pub fn read_material(&mut self) -> Result<Material> {
        let name = self.read_string()?;
        let project_id = self.read_u16()?;
        let id = self.read_i32()?;
        let version = self.read_u32()?;
        let double_sided = self.read_bool()?;
        let enabled_lighting = self.read_bool()?;
        let override_flags = self.read_u8()?;
        let exclude_from_export = self.read_bool()?;

        let passes_1 = self.read_render_passes::<1>()?;
        let passes_2 = self.read_render_passes::<2>()?;
        let passes_3 = self.read_render_passes::<3>()?;

        Ok(Material {
            name,
            project_id,
            id,
            version,
            double_sided,
            enabled_lighting,
            override_flags,
            exclude_from_export,
            passes_1,
            passes_2,
            passes_3,
        })
    }

    /// A u32 count followed by that many `STAGES`-stage passes.
    pub fn read_render_passes<const STAGES: usize>(&mut self) -> Result<Vec<RenderPass<STAGES>>> {
        let count = self.read_u32()?;
        let pass_size = SETTINGS_SIZE + STAGE_SIZE * STAGES as u64;
        self.ensure_elements(u64::from(count), pass_size, "render passes")?;

        let mut passes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            passes.push(self.read_block::<RenderPass<STAGES>>("render pass")?);
        }
        Ok(passes)
    }
}

impl<W: Write> OpfWriter<W> {
    pub fn write_material(&mut self, material: &Material) -> Result<()> {
        self.write_string(&material.name)?;
        self.write_u16(material.project_id)?;
        self.write_i32(material.id)?;
        self.write_u32(material.version)?;
        self.write_bool(material.double_sided)?;
        self.write_bool(material.enabled_lighting)?;
        self.write_u8(material.override_flags)?;
        self.write_bool(material.exclude_from_export)?;

        self.write_render_passes(&material.passes_1)?;
        self.write_render_passes(&material.passes_2)?;
        self.write_render_passes(&material.passes_3)
    }

    pub fn write_render_passes<const STAGES: usize>(
        &mut self,
        passes: &[RenderPass<STAGES>],
    ) -> Result<()> {
        self.write_count(passes.len(), "render passes")?;
        for pass in passes {
            self.write_block(pass, "render pass")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::opf::error::OpfError;
    use crate::opf::types::{RenderPassSettings, RenderPassStage};

    fn write_material(material: &Material) -> Vec<u8> {
        let mut w = OpfWriter::new(Cursor::new(Vec::new()));
        w.write_material(material).unwrap();
        w.into_inner().into_inner()
    }

    fn stage_with_texture(texture_id: i32) -> RenderPassStage {
        RenderPassStage {
            texture_id,
            texture_project_id: 3,
            ..Default::default()
        }
    }

    #[test]
    fn block_sizes_match_layout() {
        let mut w = OpfWriter::new(Cursor::new(Vec::new()));
        w.write_block(&RenderPassSettings::default(), "settings").unwrap();
        assert_eq!(w.into_inner().into_inner().len() as u64, SETTINGS_SIZE);

        let mut w = OpfWriter::new(Cursor::new(Vec::new()));
        w.write_block(&RenderPassStage::default(), "stage").unwrap();
        assert_eq!(w.into_inner().into_inner().len() as u64, STAGE_SIZE);
    }

    #[test]
    fn pass_lists_keep_independent_arity() {
        let mut three = RenderPass::<3>::default();
        three.stages[2] = stage_with_texture(42);
        three.settings.alpha_blending = true;
        let material = Material {
            name: "Hull".to_string(),
            id: 9,
            passes_1: vec![RenderPass::default(), RenderPass::default()],
            passes_2: Vec::new(),
            passes_3: vec![three],
            ..Default::default()
        };

        let bytes = write_material(&material);
        let header = 2 + 4 + 2 + 4 + 4 + 4;
        let expected = header
            + 4 + 2 * (SETTINGS_SIZE + STAGE_SIZE) as usize
            + 4
            + 4 + (SETTINGS_SIZE + 3 * STAGE_SIZE) as usize;
        assert_eq!(bytes.len(), expected);

        let mut r = OpfReader::new(&bytes);
        let back = r.read_material().unwrap();
        assert_eq!(back.passes_1.len(), 2);
        assert_eq!(back.passes_2.len(), 0);
        assert_eq!(back.passes_3.len(), 1);
        assert_eq!(back.passes_3[0].stages[2].texture_id, 42);
        assert_eq!(back, material);
    }

    #[test]
    fn default_settings_survive_round_trip() {
        let settings = RenderPassSettings::default();
        assert_eq!(settings.stipple_pattern[0], 0xAAAA_AAAA);
        assert_eq!(settings.stipple_pattern[31], 0x5555_5555);

        let mut w = OpfWriter::new(Cursor::new(Vec::new()));
        w.write_block(&settings, "settings").unwrap();
        let bytes = w.into_inner().into_inner();
        let mut r = OpfReader::new(&bytes);
        let back: RenderPassSettings = r.read_block("settings").unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn primary_texture_is_first_non_zero_stage() {
        let mut two = RenderPass::<2>::default();
        two.stages[1] = stage_with_texture(7);
        let mut three = RenderPass::<3>::default();
        three.stages[0] = stage_with_texture(8);
        let material = Material {
            passes_1: vec![RenderPass::default()],
            passes_2: vec![two],
            passes_3: vec![three],
            ..Default::default()
        };
        assert_eq!(material.primary_texture_id(), 7);
        assert_eq!(Material::default().primary_texture_id(), -1);
    }

    #[test]
    fn absurd_pass_count_fails_before_allocating() {
        let mut bytes = write_material(&Material::default());
        // Patch the 1-stage count (right after the 16-byte header) to 4 billion.
        let at = 2 + 4 + 2 + 4 + 4;
        bytes[at..at + 4].copy_from_slice(&u32::MAX.to_le_bytes());
        let mut r = OpfReader::new(&bytes);
        assert!(matches!(
            r.read_material(),
            Err(OpfError::UnexpectedEof { .. })
        ));
    }
}
