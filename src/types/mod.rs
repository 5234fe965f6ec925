//! Shared types used throughout the library.

mod version;

pub use version::{EngineVersion, SchemaEra};

use glam::{IVec4, Vec4};
use serde::{Deserialize, Serialize};

use crate::error::TranscodeError;

/// A vertex attribute identity that is stable across every schema era.
///
/// All cross-era mapping is keyed by this enum, never by raw channel index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemanticAttribute {
    Position,
    Normal,
    Tangent,
    Color,
    Uv0,
    Uv1,
    Uv2,
    Uv3,
    SkinWeight,
    SkinBoneIndex,
}

impl SemanticAttribute {
    /// Every attribute, in the fixed enumeration order the payload copy
    /// engine walks them in.
    pub const ALL: [SemanticAttribute; 10] = [
        SemanticAttribute::Position,
        SemanticAttribute::Normal,
        SemanticAttribute::Tangent,
        SemanticAttribute::Color,
        SemanticAttribute::Uv0,
        SemanticAttribute::Uv1,
        SemanticAttribute::Uv2,
        SemanticAttribute::Uv3,
        SemanticAttribute::SkinWeight,
        SemanticAttribute::SkinBoneIndex,
    ];
}

/// Element format of a vertex channel.
///
/// The set is closed: serializers of every supported era pick from these five
/// formats. Raw on-disk codes enter through [`ElementFormat::try_from`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementFormat {
    /// 32-bit IEEE float.
    Float32,
    /// 16-bit IEEE float.
    Float16,
    /// 8-bit unsigned, normalized to 0.0-1.0.
    UNorm8,
    /// 32-bit signed integer.
    Int32,
    /// Four 8-bit color components packed into one 32-bit element.
    PackedColor32,
}

impl ElementFormat {
    /// Size in bytes of a single element of this format.
    pub fn element_width(&self) -> usize {
        match self {
            Self::Float32 | Self::Int32 | Self::PackedColor32 => 4,
            Self::Float16 => 2,
            Self::UNorm8 => 1,
        }
    }

    /// The interchange code for this format.
    pub fn code(&self) -> u8 {
        match self {
            Self::Float32 => 0,
            Self::Float16 => 1,
            Self::UNorm8 => 2,
            Self::Int32 => 3,
            Self::PackedColor32 => 4,
        }
    }
}

impl TryFrom<u8> for ElementFormat {
    type Error = TranscodeError;

    /// Map a raw format code from a serialized descriptor.
    ///
    /// Any code outside the closed set marks a serializer this transcoder has
    /// not been taught and fails the conversion outright.
    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Float32),
            1 => Ok(Self::Float16),
            2 => Ok(Self::UNorm8),
            3 => Ok(Self::Int32),
            4 => Ok(Self::PackedColor32),
            other => Err(TranscodeError::UnsupportedFormat(other)),
        }
    }
}

/// Byte order of serialized multi-byte elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ByteOrder {
    Little,
    Big,
}

/// Hardware platform a mesh is serialized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Standalone,
    Android,
    Ios,
    WebGl,
    Xbox360,
}

impl Platform {
    /// The byte order this platform serializes vertex data in.
    ///
    /// Xbox360 is the only big-endian family in the supported set.
    pub fn byte_order(&self) -> ByteOrder {
        match self {
            Self::Xbox360 => ByteOrder::Big,
            _ => ByteOrder::Little,
        }
    }
}

/// Per-vertex bone influence record: four weights and four bone indices.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SkinWeights4 {
    pub weights: Vec4,
    pub bone_indices: IVec4,
}

impl SkinWeights4 {
    /// Serialized size: four f32 weights followed by four i32 indices.
    pub const RECORD_SIZE: usize = 32;

    pub fn new(weights: Vec4, bone_indices: IVec4) -> Self {
        Self {
            weights,
            bone_indices,
        }
    }
}
