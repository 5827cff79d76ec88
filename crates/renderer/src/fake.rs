//! In-memory `ShaderBackend` that records object lifetimes.
//!
//! Compilation fails when the source contains `#error`, linking fails when
//! [`FakeGl::fail_link`] is set, and a linked program exposes the
//! `uniform <type> <name>;` declarations of the stages attached at link time.

use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
};

use corelib::ShaderStage;

use crate::backend::ShaderBackend;

#[derive(Debug, Default)]
struct FakeShader {
    source: String,
    compiled: Option<bool>,
}

#[derive(Debug, Default)]
struct FakeProgram {
    attached: Vec<u32>,
    linked: Option<bool>,
    uniforms: Vec<String>,
}

#[derive(Debug, Default)]
pub struct FakeGl {
    next_id: Cell<u32>,
    shaders: RefCell<BTreeMap<u32, FakeShader>>,
    programs: RefCell<BTreeMap<u32, FakeProgram>>,
    current: Cell<Option<u32>>,
    pub fail_link: Cell<bool>,
    pub refuse_program: Cell<bool>,
    pub use_calls: Cell<usize>,
}

impl FakeGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shader and program objects created and not yet deleted.
    pub fn live_handles(&self) -> usize {
        self.shaders.borrow().len() + self.programs.borrow().len()
    }

    pub fn live_shaders(&self) -> usize {
        self.shaders.borrow().len()
    }

    pub fn current(&self) -> Option<u32> {
        self.current.get()
    }

    fn alloc(&self) -> u32 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }
}

impl ShaderBackend for FakeGl {
    type Shader = u32;
    type Program = u32;
    type UniformLocation = i32;

    fn create_shader(&self, _stage: ShaderStage) -> Result<u32, String> {
        let id = self.alloc();
        self.shaders.borrow_mut().insert(id, FakeShader::default());
        Ok(id)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        if let Some(s) = self.shaders.borrow_mut().get_mut(&shader) {
            s.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: u32) {
        if let Some(s) = self.shaders.borrow_mut().get_mut(&shader) {
            s.compiled = Some(!s.source.contains("#error"));
        }
    }

    fn compile_status(&self, shader: u32) -> bool {
        self.shaders
            .borrow()
            .get(&shader)
            .and_then(|s| s.compiled)
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        match self.compile_status(shader) {
            true => String::new(),
            false => "0:1(1): error: #error directive\n".to_string(),
        }
    }

    fn delete_shader(&self, shader: u32) {
        self.shaders.borrow_mut().remove(&shader);
    }

    fn create_program(&self) -> Result<u32, String> {
        if self.refuse_program.get() {
            return Err("out of memory".to_string());
        }
        let id = self.alloc();
        self.programs.borrow_mut().insert(id, FakeProgram::default());
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let Some(p) = self.programs.borrow_mut().get_mut(&program) {
            p.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        if let Some(p) = self.programs.borrow_mut().get_mut(&program) {
            p.attached.retain(|&s| s != shader);
        }
    }

    fn link_program(&self, program: u32) {
        let ok = !self.fail_link.get();
        let shaders = self.shaders.borrow();
        if let Some(p) = self.programs.borrow_mut().get_mut(&program) {
            p.linked = Some(ok);
            p.uniforms = p
                .attached
                .iter()
                .filter_map(|id| shaders.get(id))
                .flat_map(|s| s.source.lines())
                .filter_map(uniform_name)
                .map(str::to_string)
                .collect();
        }
    }

    fn link_status(&self, program: u32) -> bool {
        self.programs
            .borrow()
            .get(&program)
            .and_then(|p| p.linked)
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: u32) -> String {
        match self.link_status(program) {
            true => String::new(),
            false => "error: varying vNormal not written by vertex shader\n".to_string(),
        }
    }

    fn delete_program(&self, program: u32) {
        self.programs.borrow_mut().remove(&program);
        if self.current.get() == Some(program) {
            self.current.set(None);
        }
    }

    fn use_program(&self, program: Option<u32>) {
        self.use_calls.set(self.use_calls.get() + 1);
        self.current.set(program);
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<i32> {
        let programs = self.programs.borrow();
        let p = programs.get(&program).filter(|p| p.linked == Some(true))?;
        p.uniforms
            .iter()
            .position(|declared| declared == name)
            .map(|i| i as i32)
    }
}

fn uniform_name(line: &str) -> Option<&str> {
    let decl = line.trim().strip_prefix("uniform ")?.strip_suffix(';')?;
    decl.split_whitespace().last()
}
