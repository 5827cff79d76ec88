//! Core shared types and errors (renderer-agnostic).

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Size in bytes of one float component in a flattened vertex buffer.
pub const FLOAT_SIZE: usize = std::mem::size_of::<f32>();

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Unknown shader stage '{0}'")]
    UnknownStage(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// One compilable unit of a shader program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    Vertex,
    TessControl,
    TessEvaluation,
    Geometry,
    Fragment,
}

impl ShaderStage {
    /// All stages in pipeline order.
    pub const ALL: [ShaderStage; 5] = [
        ShaderStage::Vertex,
        ShaderStage::TessControl,
        ShaderStage::TessEvaluation,
        ShaderStage::Geometry,
        ShaderStage::Fragment,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::TessControl => "tessellation control",
            ShaderStage::TessEvaluation => "tessellation evaluation",
            ShaderStage::Geometry => "geometry",
            ShaderStage::Fragment => "fragment",
        }
    }

    /// Stages every linkable program must contain.
    #[inline]
    pub fn is_required(self) -> bool {
        matches!(self, ShaderStage::Vertex | ShaderStage::Fragment)
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShaderStage {
    type Err = CoreError;

    /// Accepts the usual file-extension spellings (`vert`, `frag`, ...).
    fn from_str(s: &str) -> CoreResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "vertex" | "vert" | "vs" => Ok(ShaderStage::Vertex),
            "tesscontrol" | "tesc" | "cont" | "tcs" => Ok(ShaderStage::TessControl),
            "tessevaluation" | "tese" | "eval" | "tes" => Ok(ShaderStage::TessEvaluation),
            "geometry" | "geom" | "gs" => Ok(ShaderStage::Geometry),
            "fragment" | "frag" | "fs" => Ok(ShaderStage::Fragment),
            other => Err(CoreError::UnknownStage(other.to_string())),
        }
    }
}

/// Per-vertex attribute streams produced by the mesh loader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    Position,
    TexCoord,
    Normal,
}

impl Attribute {
    /// Attributes in the order their blocks appear in a flattened buffer.
    pub const BLOCK_ORDER: [Attribute; 3] =
        [Attribute::Position, Attribute::TexCoord, Attribute::Normal];

    /// Number of float components per vertex.
    #[inline]
    pub const fn components(self) -> usize {
        match self {
            Attribute::Position | Attribute::Normal => 3,
            Attribute::TexCoord => 2,
        }
    }

    /// Shader input location the attribute is bound to.
    #[inline]
    pub const fn location(self) -> u32 {
        match self {
            Attribute::Position => 0,
            Attribute::TexCoord => 1,
            Attribute::Normal => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Attribute::Position => "position",
            Attribute::TexCoord => "texture coordinate",
            Attribute::Normal => "normal",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Floats per face-vertex across all three blocks.
pub const FLOATS_PER_VERTEX: usize =
    Attribute::Position.components() + Attribute::TexCoord.components() + Attribute::Normal.components();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_parses_extension_spellings() {
        assert_eq!("vert".parse::<ShaderStage>().unwrap(), ShaderStage::Vertex);
        assert_eq!("FRAG".parse::<ShaderStage>().unwrap(), ShaderStage::Fragment);
        assert_eq!("eval".parse::<ShaderStage>().unwrap(), ShaderStage::TessEvaluation);
        assert!("compute".parse::<ShaderStage>().is_err());
    }

    #[test]
    fn only_vertex_and_fragment_are_required() {
        let required: Vec<_> = ShaderStage::ALL.into_iter().filter(|s| s.is_required()).collect();
        assert_eq!(required, vec![ShaderStage::Vertex, ShaderStage::Fragment]);
    }

    #[test]
    fn attribute_layout_adds_up() {
        assert_eq!(FLOATS_PER_VERTEX, 8);
        let locations: Vec<u32> = Attribute::BLOCK_ORDER.iter().map(|a| a.location()).collect();
        assert_eq!(locations, vec![0, 1, 2]);
    }
}
