use asset::AssetError;
use corelib::ShaderStage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("Failed to compile {stage} shader: {log}")]
    ShaderCompileError { stage: ShaderStage, log: String },

    #[error("Failed to link program: {log}")]
    ShaderLinkError { log: String },

    #[error("Failed to get {name} variable")]
    UniformNotFound { name: String },

    /// The context refused to allocate a shader or program object.
    #[error("Unable to create {what}: {reason}")]
    CreateFailed { what: String, reason: String },

    #[error("Program has no {0} stage")]
    MissingStage(ShaderStage),

    #[error("Program has more than one {0} stage")]
    DuplicateStage(ShaderStage),

    #[error(transparent)]
    Source(#[from] AssetError),
}

pub type ShaderResult<T> = Result<T, ShaderError>;

#[derive(Debug, Error)]
pub enum UploadError {
    /// wgpu draws take a `u32` vertex range.
    #[error("Mesh has {0} vertices, more than a single draw can address")]
    TooManyVertices(usize),
}

pub type UploadResult<T> = Result<T, UploadError>;
