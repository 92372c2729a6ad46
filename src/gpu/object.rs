use std::fmt;

use crate::gpu::{
    GpuContext, Handle,
    driver::Driver,
    error::{GpuError, GpuResult},
    shader::ShaderStage,
};

/// The category of a GL object, which decides how its handle is created and released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Buffer,
    VertexArray,
    Shader,
    Program,
    Texture,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Buffer => "buffer",
            Self::VertexArray => "vertex array",
            Self::Shader => "shader",
            Self::Program => "program",
            Self::Texture => "texture",
        };
        f.write_str(name)
    }
}

/// Sole owner of one driver handle.
///
/// The handle is released exactly once, when the object is dropped. Objects are
/// not `Clone`; moving one moves the ownership of the handle.
pub struct Object<D: Driver = glow::Context> {
    ctx: GpuContext<D>,
    handle: Handle,
    kind: ObjectKind,
}

impl<D: Driver> Object<D> {
    /// Allocate a new buffer, vertex array, program or texture handle.
    ///
    /// Shaders need a stage; use [`Object::create_shader`] for those.
    pub fn create(ctx: &GpuContext<D>, kind: ObjectKind) -> GpuResult<Self> {
        let driver = ctx.driver();
        let created = match kind {
            ObjectKind::Buffer => driver.create_buffer(),
            ObjectKind::VertexArray => driver.create_vertex_array(),
            ObjectKind::Program => driver.create_program(),
            ObjectKind::Texture => driver.create_texture(),
            ObjectKind::Shader => Err("shader objects are created with a stage".to_string()),
        };
        Self::adopt(ctx, kind, created)
    }

    /// Allocate a new shader handle for `stage`.
    pub fn create_shader(ctx: &GpuContext<D>, stage: ShaderStage) -> GpuResult<Self> {
        let created = ctx.driver().create_shader(stage);
        Self::adopt(ctx, ObjectKind::Shader, created)
    }

    fn adopt(
        ctx: &GpuContext<D>,
        kind: ObjectKind,
        created: Result<Handle, String>,
    ) -> GpuResult<Self> {
        let handle = created.map_err(|message| GpuError::Allocation { kind, message })?;
        log::debug!("created {kind} {handle:?}");
        Ok(Self {
            ctx: ctx.clone(),
            handle,
            kind,
        })
    }

    /// Get the driver handle.
    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Get the context this object was created from.
    pub fn context(&self) -> &GpuContext<D> {
        &self.ctx
    }

    pub(crate) fn driver(&self) -> &D {
        self.ctx.driver()
    }
}

impl<D: Driver> fmt::Debug for Object<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("kind", &self.kind)
            .field("handle", &self.handle)
            .finish()
    }
}

impl<D: Driver> Drop for Object<D> {
    fn drop(&mut self) {
        let driver = self.ctx.driver();
        match self.kind {
            ObjectKind::Buffer => driver.delete_buffer(self.handle),
            ObjectKind::VertexArray => driver.delete_vertex_array(self.handle),
            ObjectKind::Shader => driver.delete_shader(self.handle),
            ObjectKind::Program => driver.delete_program(self.handle),
            ObjectKind::Texture => driver.delete_texture(self.handle),
        }
        self.ctx.forget_bindings(self.kind, self.handle);
        log::debug!("deleted {} {:?}", self.kind, self.handle);
    }
}
