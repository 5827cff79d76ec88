//! Shader compilation and program linking.
//!
//! A program is handed out only once it has linked (`Linked`) and becomes
//! `Active` when made current. A compile or link failure deletes every object
//! created along the way before the error is returned.

use std::path::Path;

use asset::ShaderSource;
use corelib::ShaderStage;

use crate::{
    backend::ShaderBackend,
    error::{ShaderError, ShaderResult},
};

/// Uniform holding the model-view-projection matrix.
pub const MVP_MATRIX_UNIFORM: &str = "uMvpMatrix";
/// Uniform holding the model matrix.
pub const MODEL_MATRIX_UNIFORM: &str = "uModelMatrix";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgramState {
    Linked,
    Active,
}

/// A successfully compiled stage. Only useful as input to linking.
#[derive(Debug)]
#[must_use = "a compiled shader leaks unless it is linked or released"]
pub struct CompiledShader<S> {
    raw: S,
    stage: ShaderStage,
}

impl<S: Copy> CompiledShader<S> {
    #[inline]
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    #[inline]
    pub fn raw(&self) -> S {
        self.raw
    }

    /// Delete the stage object without linking it.
    pub fn release<B: ShaderBackend<Shader = S>>(self, backend: &B) {
        backend.delete_shader(self.raw);
    }
}

/// A linked program plus the stage objects still attached to it.
#[derive(Debug)]
#[must_use = "a program leaks unless it is deleted"]
pub struct ShaderProgram<P, S> {
    raw: P,
    stages: Vec<(ShaderStage, S)>,
    state: ProgramState,
}

impl<P: Copy, S: Copy> ShaderProgram<P, S> {
    #[inline]
    pub fn raw(&self) -> P {
        self.raw
    }

    #[inline]
    pub fn state(&self) -> ProgramState {
        self.state
    }

    /// Stages still owned by the program (empty after [`Self::release_stages`]).
    pub fn stages(&self) -> impl Iterator<Item = ShaderStage> + '_ {
        self.stages.iter().map(|(stage, _)| *stage)
    }

    /// Make this program current. Safe to call repeatedly.
    pub fn activate<B>(&mut self, backend: &B)
    where
        B: ShaderBackend<Program = P, Shader = S>,
        P: std::fmt::Debug,
    {
        backend.use_program(Some(self.raw));
        if self.state != ProgramState::Active {
            log::debug!("Program {:?} is now current", self.raw);
        }
        self.state = ProgramState::Active;
    }

    /// Detach and delete the stage objects; the program keeps working.
    pub fn release_stages<B>(&mut self, backend: &B)
    where
        B: ShaderBackend<Program = P, Shader = S>,
    {
        for (_, shader) in self.stages.drain(..) {
            backend.detach_shader(self.raw, shader);
            backend.delete_shader(shader);
        }
    }

    /// Look up a uniform by name.
    pub fn uniform_location<B>(&self, backend: &B, name: &str) -> ShaderResult<B::UniformLocation>
    where
        B: ShaderBackend<Program = P, Shader = S>,
    {
        backend
            .uniform_location(self.raw, name)
            .ok_or_else(|| ShaderError::UniformNotFound {
                name: name.to_string(),
            })
    }

    /// Delete the program and any stages it still owns.
    pub fn delete<B>(mut self, backend: &B)
    where
        B: ShaderBackend<Program = P, Shader = S>,
    {
        if self.state == ProgramState::Active {
            backend.use_program(None);
        }
        self.release_stages(backend);
        backend.delete_program(self.raw);
    }
}

/// Locations of the uniforms every lab shading model reads.
#[derive(Clone, Debug)]
pub struct ProgramUniforms<L> {
    pub mvp_matrix: L,
    pub model_matrix: L,
}

impl<L> ProgramUniforms<L> {
    pub fn locate<B>(
        backend: &B,
        program: &ShaderProgram<B::Program, B::Shader>,
    ) -> ShaderResult<Self>
    where
        B: ShaderBackend<UniformLocation = L>,
    {
        Ok(Self {
            mvp_matrix: program.uniform_location(backend, MVP_MATRIX_UNIFORM)?,
            model_matrix: program.uniform_location(backend, MODEL_MATRIX_UNIFORM)?,
        })
    }
}

/// Stateless compile/link service bound to a rendering context.
pub struct ShaderPipeline<'a, B: ShaderBackend> {
    backend: &'a B,
}

pub type Program<B> = ShaderProgram<<B as ShaderBackend>::Program, <B as ShaderBackend>::Shader>;

impl<'a, B: ShaderBackend> ShaderPipeline<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Compile one stage. On failure the stage object is already deleted.
    pub fn compile(&self, source: &str, stage: ShaderStage) -> ShaderResult<CompiledShader<B::Shader>> {
        let shader = self
            .backend
            .create_shader(stage)
            .map_err(|reason| ShaderError::CreateFailed {
                what: format!("{stage} shader"),
                reason,
            })?;

        self.backend.shader_source(shader, source);
        self.backend.compile_shader(shader);

        if !self.backend.compile_status(shader) {
            let log = self.backend.shader_info_log(shader);
            self.backend.delete_shader(shader);
            log::warn!("Failed to compile {} shader: {}", stage, log.trim_end());
            return Err(ShaderError::ShaderCompileError { stage, log });
        }

        log::debug!("Compiled {} shader {:?}", stage, shader);
        Ok(CompiledShader { raw: shader, stage })
    }

    pub fn compile_source(&self, source: &ShaderSource) -> ShaderResult<CompiledShader<B::Shader>> {
        self.compile(&source.text, source.stage)
    }

    /// Link a vertex and a fragment stage.
    pub fn link(
        &self,
        vertex: CompiledShader<B::Shader>,
        fragment: CompiledShader<B::Shader>,
    ) -> ShaderResult<Program<B>> {
        self.link_stages(vec![vertex, fragment])
    }

    /// Link any stage set holding exactly one vertex and one fragment stage
    /// and at most one of each optional stage. Takes ownership of the stages:
    /// on error all of them are deleted.
    pub fn link_stages(&self, stages: Vec<CompiledShader<B::Shader>>) -> ShaderResult<Program<B>> {
        if let Err(err) = check_stage_set(&stages) {
            self.release_all(stages);
            return Err(err);
        }

        let program = match self.backend.create_program() {
            Ok(program) => program,
            Err(reason) => {
                self.release_all(stages);
                return Err(ShaderError::CreateFailed {
                    what: "program".to_string(),
                    reason,
                });
            }
        };

        for shader in &stages {
            self.backend.attach_shader(program, shader.raw);
        }
        log::trace!("Program {:?}: {} stages attached", program, stages.len());

        self.backend.link_program(program);
        if !self.backend.link_status(program) {
            let log = self.backend.program_info_log(program);
            self.backend.delete_program(program);
            self.release_all(stages);
            log::warn!("Failed to link program: {}", log.trim_end());
            return Err(ShaderError::ShaderLinkError { log });
        }

        log::info!("Linked program {:?} from {} stages", program, stages.len());
        Ok(ShaderProgram {
            raw: program,
            stages: stages.into_iter().map(|s| (s.stage, s.raw)).collect(),
            state: ProgramState::Linked,
        })
    }

    /// Compile both sources and link them. A failed vertex stage stops the
    /// build before the fragment stage is compiled.
    pub fn build(&self, vertex: &str, fragment: &str) -> ShaderResult<Program<B>> {
        let vertex = self.compile(vertex, ShaderStage::Vertex)?;
        let fragment = match self.compile(fragment, ShaderStage::Fragment) {
            Ok(fragment) => fragment,
            Err(err) => {
                vertex.release(self.backend);
                return Err(err);
            }
        };
        self.link(vertex, fragment)
    }

    /// Compile and link an arbitrary set of sources.
    pub fn build_stages(&self, sources: &[ShaderSource]) -> ShaderResult<Program<B>> {
        let mut compiled = Vec::with_capacity(sources.len());
        for source in sources {
            match self.compile_source(source) {
                Ok(shader) => compiled.push(shader),
                Err(err) => {
                    self.release_all(compiled);
                    return Err(err);
                }
            }
        }
        self.link_stages(compiled)
    }

    /// Load, compile, link and activate a vertex/fragment pair from disk.
    pub fn build_from_files(
        &self,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> ShaderResult<Program<B>> {
        let vertex = ShaderSource::load(ShaderStage::Vertex, vertex_path)?;
        let fragment = ShaderSource::load(ShaderStage::Fragment, fragment_path)?;
        let mut program = self.build(&vertex.text, &fragment.text)?;
        program.activate(self.backend);
        Ok(program)
    }

    fn release_all(&self, stages: Vec<CompiledShader<B::Shader>>) {
        for shader in stages {
            shader.release(self.backend);
        }
    }
}

fn check_stage_set<S>(stages: &[CompiledShader<S>]) -> ShaderResult<()> {
    let mut seen = Vec::with_capacity(stages.len());
    for shader in stages {
        if seen.contains(&shader.stage) {
            return Err(ShaderError::DuplicateStage(shader.stage));
        }
        seen.push(shader.stage);
    }
    match ShaderStage::ALL
        .into_iter()
        .find(|stage| stage.is_required() && !seen.contains(stage))
    {
        Some(missing) => Err(ShaderError::MissingStage(missing)),
        None => Ok(()),
    }
}
