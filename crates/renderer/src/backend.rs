//! The rendering-context seam used by the shader pipeline.
//!
//! Methods mirror the GL object model one call each: create, source, compile,
//! query status, read the log, delete. Implementations are expected to be
//! called on the thread that owns a current context.

use corelib::ShaderStage;

pub trait ShaderBackend {
    type Shader: Copy + std::fmt::Debug;
    type Program: Copy + std::fmt::Debug;
    type UniformLocation: Clone + std::fmt::Debug;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);

    /// Make `program` current; `None` unbinds.
    fn use_program(&self, program: Option<Self::Program>);
    fn uniform_location(&self, program: Self::Program, name: &str)
    -> Option<Self::UniformLocation>;
}
