//! Shader source loading. Text is passed through verbatim.

use std::{fs, path::Path};

use corelib::ShaderStage;

use crate::error::{AssetError, AssetResult};

/// Raw shader text tagged with the stage it is meant for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderSource {
    pub stage: ShaderStage,
    pub text: String,
}

impl ShaderSource {
    pub fn new(stage: ShaderStage, text: impl Into<String>) -> Self {
        Self {
            stage,
            text: text.into(),
        }
    }

    /// Read a shader file without altering its contents.
    pub fn load(stage: ShaderStage, path: impl AsRef<Path>) -> AssetResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| AssetError::FileNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded {} shader from {:?} ({} bytes)", stage, path, text.len());
        Ok(Self { stage, text })
    }
}
