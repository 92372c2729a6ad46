use std::fmt;

use crate::gpu::{
    GpuContext, Handle,
    driver::Driver,
    error::{GpuError, GpuResult},
    object::Object,
};

/// A shader's role in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
    Compute,
}

impl ShaderStage {
    pub fn to_gl(self) -> u32 {
        match self {
            Self::Vertex => glow::VERTEX_SHADER,
            Self::Fragment => glow::FRAGMENT_SHADER,
            Self::Geometry => glow::GEOMETRY_SHADER,
            Self::Compute => glow::COMPUTE_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
            Self::Geometry => "geometry",
            Self::Compute => "compute",
        };
        f.write_str(name)
    }
}

/// A compiled shader stage.
///
/// Construction compiles synchronously, so an existing `Shader` is always compiled.
#[derive(Debug)]
pub struct Shader<D: Driver = glow::Context> {
    object: Object<D>,
    stage: ShaderStage,
}

impl<D: Driver> Shader<D> {
    /// Create and compile a shader of `stage` from `source`.
    pub fn new(ctx: &GpuContext<D>, stage: ShaderStage, source: &str) -> GpuResult<Self> {
        let object = Object::create_shader(ctx, stage)?;
        let handle = object.handle();
        let driver = object.driver();

        driver.shader_source(handle, source);
        ctx.check("shader_source")?;
        driver.compile_shader(handle);
        ctx.check("compile_shader")?;

        if !driver.shader_compile_status(handle) {
            let log = driver.shader_info_log(handle);
            return Err(GpuError::Compile { stage, log });
        }
        log::debug!("compiled {stage} shader {handle:?}");

        Ok(Self { object, stage })
    }

    /// Create and compile a vertex shader.
    pub fn vertex(ctx: &GpuContext<D>, source: &str) -> GpuResult<Self> {
        Self::new(ctx, ShaderStage::Vertex, source)
    }

    /// Create and compile a fragment shader.
    pub fn fragment(ctx: &GpuContext<D>, source: &str) -> GpuResult<Self> {
        Self::new(ctx, ShaderStage::Fragment, source)
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Get the driver handle.
    pub fn handle(&self) -> Handle {
        self.object.handle()
    }

    pub fn context(&self) -> &GpuContext<D> {
        self.object.context()
    }
}
