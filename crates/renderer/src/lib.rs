//! Renderer-side hand-off: shader compilation/linking against a GL context
//! and upload of flattened meshes into wgpu vertex buffers.

pub mod backend;
pub mod error;
#[cfg(not(target_arch = "wasm32"))]
pub mod gl;
pub mod program;
pub mod upload;

#[cfg(test)]
mod fake;

pub use backend::ShaderBackend;
pub use error::{ShaderError, ShaderResult, UploadError, UploadResult};
pub use program::{
    CompiledShader, MODEL_MATRIX_UNIFORM, MVP_MATRIX_UNIFORM, Program, ProgramState,
    ProgramUniforms, ShaderPipeline, ShaderProgram,
};
pub use upload::{GpuMesh, block_layout, draw_count, upload_flattened, vertex_buffer_layouts};
