//! Fixed-function Direct3D 7 enumerations stored as raw bytes in render
//! passes, stages, meshes and lights.
//!
//! The on-disk records keep these as plain integers so that unknown values
//! survive a round trip. The enums give names to the known values and build
//! the engine defaults.

use std::fmt;

macro_rules! d3d_enum {
    ($(#[$meta:meta])* $name:ident : $repr:ident { $($variant:ident = $value:expr),+ $(,)? }) => {
        $(#[$meta])*
        #[repr($repr)]
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant = $value),+
        }

        impl From<$name> for $repr {
            fn from(value: $name) -> Self {
                value as $repr
            }
        }

        impl TryFrom<$repr> for $name {
            type Error = String;

            fn try_from(value: $repr) -> Result<Self, Self::Error> {
                match value {
                    $(v if v == $value => Ok($name::$variant),)+
                    _ => Err(format!("Unknown {} value: {}", stringify!($name), value)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self, f)
            }
        }
    };
}

d3d_enum!(D3DFillMode: u8 {
    Point = 1,
    Wireframe = 2,
    Solid = 3,
});

d3d_enum!(D3DShadeMode: u8 {
    Flat = 1,
    Gouraud = 2,
    Phong = 3,
});

d3d_enum!(
    /// Raster operation applied when a pixel is written (R2_* codes).
    PixelOperation: u8 {
        Black = 1,
        NotMergePen = 2,
        MaskNotPen = 3,
        NotCopyPen = 4,
        MaskPenNot = 5,
        Not = 6,
        XorPen = 7,
        NotMaskPen = 8,
        MaskPen = 9,
        NotXorPen = 10,
        Nop = 11,
        MergeNotPen = 12,
        CopyPen = 13,
        MergePenNot = 14,
        MergePen = 15,
        White = 16,
    }
);

d3d_enum!(D3DCmpFunc: u8 {
    Never = 1,
    Less = 2,
    Equal = 3,
    LessEqual = 4,
    Greater = 5,
    NotEqual = 6,
    GreaterEqual = 7,
    Always = 8,
});

d3d_enum!(D3DBlend: u8 {
    Zero = 1,
    One = 2,
    SrcColor = 3,
    InvSrcColor = 4,
    SrcAlpha = 5,
    InvSrcAlpha = 6,
    DestAlpha = 7,
    InvDestAlpha = 8,
    DestColor = 9,
    InvDestColor = 10,
    SrcAlphaSat = 11,
    BothSrcAlpha = 12,
    BothInvSrcAlpha = 13,
});

d3d_enum!(
    /// Argument selector for a texture stage. The upper bits of the stored
    /// byte carry the complement / alpha-replicate modifiers.
    D3DTextureArg: u8 {
        Diffuse = 0x00,
        Current = 0x01,
        Texture = 0x02,
        TFactor = 0x03,
        Specular = 0x04,
    }
);

pub const D3DTA_SELECTMASK: u8 = 0x0f;
pub const D3DTA_COMPLEMENT: u8 = 0x10;
pub const D3DTA_ALPHAREPLICATE: u8 = 0x20;

d3d_enum!(D3DTextureOp: u8 {
    Disable = 1,
    SelectArg1 = 2,
    SelectArg2 = 3,
    Modulate = 4,
    Modulate2X = 5,
    Modulate4X = 6,
    Add = 7,
    AddSigned = 8,
    AddSigned2X = 9,
    Subtract = 10,
    AddSmooth = 11,
    BlendDiffuseAlpha = 12,
    BlendTextureAlpha = 13,
    BlendFactorAlpha = 14,
    BlendTextureAlphaPM = 15,
    BlendCurrentAlpha = 16,
    PreModulate = 17,
    ModulateAlphaAddColor = 18,
    ModulateColorAddAlpha = 19,
    ModulateInvAlphaAddColor = 20,
    ModulateInvColorAddAlpha = 21,
    BumpEnvMap = 22,
    BumpEnvMapLuminance = 23,
    DotProduct3 = 24,
});

d3d_enum!(D3DTextureAddress: u8 {
    Wrap = 1,
    Mirror = 2,
    Clamp = 3,
    Border = 4,
});

d3d_enum!(D3DTextureMagFilter: u8 {
    Point = 1,
    Linear = 2,
    FlatCubic = 3,
    GaussianCubic = 4,
    Anisotropic = 5,
});

d3d_enum!(D3DTextureMinFilter: u8 {
    Point = 1,
    Linear = 2,
    Anisotropic = 3,
});

d3d_enum!(D3DTextureMipFilter: u8 {
    None = 1,
    Point = 2,
    Linear = 3,
});

pub const D3DWRAP_U: u8 = 0x01;
pub const D3DWRAP_V: u8 = 0x02;

d3d_enum!(D3DLightType: u32 {
    Point = 1,
    Spot = 2,
    Directional = 3,
});

/// Describe a stored texture-stage argument byte, including its modifiers,
/// e.g. `Texture|Complement`.
pub fn describe_texture_arg(raw: u8) -> String {
    let mut out = match D3DTextureArg::try_from(raw & D3DTA_SELECTMASK) {
        Ok(arg) => arg.to_string(),
        Err(_) => format!("0x{:02x}", raw & D3DTA_SELECTMASK),
    };
    if raw & D3DTA_COMPLEMENT != 0 {
        out.push_str("|Complement");
    }
    if raw & D3DTA_ALPHAREPLICATE != 0 {
        out.push_str("|AlphaReplicate");
    }
    out
}

/// Name a raw enum byte, falling back to the numeric value for unknown codes.
pub fn describe<T>(raw: T::Repr) -> String
where
    T: RawEnum,
{
    T::name_of(raw)
}

/// Enums whose values are kept as raw integers on disk.
pub trait RawEnum: Sized {
    type Repr: Copy + fmt::Display;

    fn name_of(raw: Self::Repr) -> String;
}

macro_rules! raw_enum {
    ($($name:ident : $repr:ident),+ $(,)?) => {
        $(impl RawEnum for $name {
            type Repr = $repr;

            fn name_of(raw: $repr) -> String {
                match $name::try_from(raw) {
                    Ok(v) => v.to_string(),
                    Err(_) => format!("Unknown({})", raw),
                }
            }
        })+
    };
}

raw_enum!(
    D3DFillMode: u8,
    D3DShadeMode: u8,
    PixelOperation: u8,
    D3DCmpFunc: u8,
    D3DBlend: u8,
    D3DTextureOp: u8,
    D3DTextureAddress: u8,
    D3DTextureMagFilter: u8,
    D3DTextureMinFilter: u8,
    D3DTextureMipFilter: u8,
    D3DLightType: u32,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_values_match_d3d7() {
        assert_eq!(u8::from(D3DBlend::One), 2);
        assert_eq!(D3DBlend::try_from(6u8), Ok(D3DBlend::InvSrcAlpha));
        assert!(D3DBlend::try_from(0u8).is_err());
    }

    #[test]
    fn describe_unknown_falls_back_to_number() {
        assert_eq!(describe::<D3DCmpFunc>(4), "LessEqual");
        assert_eq!(describe::<D3DCmpFunc>(99), "Unknown(99)");
        assert_eq!(describe::<D3DLightType>(3), "Directional");
    }

    #[test]
    fn texture_arg_modifiers() {
        assert_eq!(describe_texture_arg(0x02), "Texture");
        assert_eq!(describe_texture_arg(0x12), "Texture|Complement");
        assert_eq!(describe_texture_arg(0x20), "Diffuse|AlphaReplicate");
    }
}
