use std::cell::RefCell;

use rustc_hash::FxHashMap;

use crate::gpu::{
    GpuContext, Handle,
    driver::Driver,
    error::{GpuError, GpuResult},
    object::{Object, ObjectKind},
    shader::Shader,
};

/// Where a program is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramState {
    /// Shaders may still be attached.
    Created,
    /// Linked successfully; usable, no longer modifiable.
    Linked,
}

/// A shader pipeline: attached stages linked into one program.
#[derive(Debug)]
pub struct Program<D: Driver = glow::Context> {
    object: Object<D>,
    state: ProgramState,
    attached: Vec<Handle>,
    uniforms: RefCell<FxHashMap<String, u32>>,
}

impl<D: Driver> Program<D> {
    /// Create an empty program.
    pub fn new(ctx: &GpuContext<D>) -> GpuResult<Self> {
        let object = Object::create(ctx, ObjectKind::Program)?;
        Ok(Self {
            object,
            state: ProgramState::Created,
            attached: Vec::new(),
            uniforms: RefCell::new(FxHashMap::default()),
        })
    }

    /// Compile a vertex and a fragment stage and link them.
    pub fn from_sources(
        ctx: &GpuContext<D>,
        vertex_source: &str,
        fragment_source: &str,
    ) -> GpuResult<Self> {
        let vertex = Shader::vertex(ctx, vertex_source)?;
        let fragment = Shader::fragment(ctx, fragment_source)?;

        let mut program = Self::new(ctx)?;
        program.attach_shader(&vertex)?;
        program.attach_shader(&fragment)?;
        program.link()?;
        Ok(program)
    }

    /// Attach a compiled shader. Compatibility is only checked at link time.
    pub fn attach_shader(&mut self, shader: &Shader<D>) -> GpuResult<()> {
        if self.state == ProgramState::Linked {
            return Err(GpuError::AlreadyLinked(self.handle()));
        }
        self.context().ensure_same(shader.context())?;

        self.object
            .driver()
            .attach_shader(self.handle(), shader.handle());
        self.context().check("attach_shader")?;
        self.attached.push(shader.handle());
        Ok(())
    }

    /// Link all attached shaders.
    pub fn link(&mut self) -> GpuResult<()> {
        if self.state == ProgramState::Linked {
            return Err(GpuError::AlreadyLinked(self.handle()));
        }
        let handle = self.handle();
        let driver = self.object.driver();

        driver.link_program(handle);
        self.context().check("link_program")?;
        if !driver.program_link_status(handle) {
            let log = driver.program_info_log(handle);
            return Err(GpuError::Link { log });
        }

        log::debug!(
            "linked program {handle:?} from {} shader(s)",
            self.attached.len()
        );
        self.state = ProgramState::Linked;
        Ok(())
    }

    /// Make this the active program for subsequent draw calls.
    pub fn use_program(&self) -> GpuResult<()> {
        if self.state != ProgramState::Linked {
            return Err(GpuError::NotLinked(self.handle()));
        }
        self.object.driver().use_program(Some(self.handle()));
        self.context().bindings().program.set(Some(self.handle()));
        self.context().check("use_program")
    }

    /// Whether this program is the active one.
    pub fn is_active(&self) -> bool {
        self.context().bound_program() == Some(self.handle())
    }

    /// Look up an active uniform by name.
    pub fn uniform_location(&self, name: &str) -> GpuResult<u32> {
        if self.state != ProgramState::Linked {
            return Err(GpuError::NotLinked(self.handle()));
        }
        if let Some(&location) = self.uniforms.borrow().get(name) {
            return Ok(location);
        }
        let location = self
            .object
            .driver()
            .uniform_location(self.handle(), name)
            .ok_or_else(|| GpuError::UniformNotFound { name: name.into() })?;
        self.uniforms.borrow_mut().insert(name.to_string(), location);
        Ok(location)
    }

    /// Set a `float` uniform. Makes this program active.
    pub fn set_uniform_f32(&self, name: &str, value: f32) -> GpuResult<()> {
        let location = self.uniform_location(name)?;
        self.use_program()?;
        self.object.driver().uniform_1_f32(location, value);
        self.context().check("uniform_1_f32")
    }

    pub fn state(&self) -> ProgramState {
        self.state
    }

    /// Handles of the shaders attached so far.
    pub fn attached(&self) -> &[Handle] {
        &self.attached
    }

    /// Get the driver handle.
    pub fn handle(&self) -> Handle {
        self.object.handle()
    }

    pub fn context(&self) -> &GpuContext<D> {
        self.object.context()
    }
}
