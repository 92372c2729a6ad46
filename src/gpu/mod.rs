pub mod buffer;
pub mod driver;
pub mod error;
pub mod object;
pub mod program;
pub mod shader;
pub mod texture;
pub mod vertex_array;

#[cfg(test)]
pub mod testing;

use std::cell::Cell;
use std::fmt;
use std::num::NonZeroU32;
use std::rc::Rc;

use driver::Driver;
use error::{DriverError, GpuError, GpuResult};
use object::ObjectKind;
use program::Program;
use vertex_array::VertexArray;

/// An opaque name issued by the driver for a live GL object.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(NonZeroU32);

impl Handle {
    /// Wrap a raw name; `0` is the GL "no object" name and yields `None`.
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    pub(crate) fn raw(self) -> NonZeroU32 {
        self.0
    }
}

impl From<NonZeroU32> for Handle {
    fn from(raw: NonZeroU32) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How vertices are assembled into primitives by a draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveMode {
    Points,
    Lines,
    Triangles,
    TriangleStrip,
}

impl PrimitiveMode {
    pub fn to_gl(self) -> u32 {
        match self {
            Self::Points => glow::POINTS,
            Self::Lines => glow::LINES,
            Self::Triangles => glow::TRIANGLES,
            Self::TriangleStrip => glow::TRIANGLE_STRIP,
        }
    }
}

/// Which object of each category is currently bound.
#[derive(Debug, Default)]
pub struct BindingState {
    pub(crate) array_buffer: Cell<Option<Handle>>,
    pub(crate) element_array_buffer: Cell<Option<Handle>>,
    pub(crate) uniform_buffer: Cell<Option<Handle>>,
    pub(crate) copy_read_buffer: Cell<Option<Handle>>,
    pub(crate) copy_write_buffer: Cell<Option<Handle>>,
    pub(crate) vertex_array: Cell<Option<Handle>>,
    pub(crate) program: Cell<Option<Handle>>,
    pub(crate) texture_2d: Cell<Option<Handle>>,
}

impl BindingState {
    /// Forget `handle` in every binding point of its kind that still names it.
    fn forget(&self, kind: ObjectKind, handle: Handle) {
        let cells: &[&Cell<Option<Handle>>] = match kind {
            ObjectKind::Buffer => &[
                &self.array_buffer,
                &self.element_array_buffer,
                &self.uniform_buffer,
                &self.copy_read_buffer,
                &self.copy_write_buffer,
            ],
            ObjectKind::VertexArray => &[&self.vertex_array],
            ObjectKind::Program => &[&self.program],
            ObjectKind::Texture => &[&self.texture_2d],
            ObjectKind::Shader => &[],
        };
        for cell in cells {
            if cell.get() == Some(handle) {
                cell.set(None);
            }
        }
    }
}

struct ContextInner<D> {
    driver: D,
    bindings: BindingState,
}

/// The rendering context every wrapper object is created from.
///
/// Clones share the driver and the binding state. The context is deliberately
/// `!Send`: GL calls must stay on the thread that owns the GL context.
pub struct GpuContext<D = glow::Context> {
    inner: Rc<ContextInner<D>>,
}

impl<D> Clone for GpuContext<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<D> fmt::Debug for GpuContext<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuContext")
            .field("bindings", &self.inner.bindings)
            .finish_non_exhaustive()
    }
}

impl GpuContext<glow::Context> {
    /// Wrap a loaded `glow` context.
    ///
    /// # Safety
    ///
    /// The GL context `gl` was loaded from must be current on the calling thread,
    /// and stay current for as long as this context or any object created from it
    /// is alive.
    pub unsafe fn from_glow(gl: glow::Context) -> Self {
        Self::new(gl)
    }
}

impl<D: Driver> GpuContext<D> {
    pub(crate) fn new(driver: D) -> Self {
        Self {
            inner: Rc::new(ContextInner {
                driver,
                bindings: BindingState::default(),
            }),
        }
    }

    /// Get the driver.
    pub fn driver(&self) -> &D {
        &self.inner.driver
    }

    /// Get the binding point state.
    pub fn bindings(&self) -> &BindingState {
        &self.inner.bindings
    }

    /// Whether both contexts are the same rendering context.
    pub fn same_context(&self, other: &GpuContext<D>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn ensure_same(&self, other: &GpuContext<D>) -> GpuResult<()> {
        if self.same_context(other) {
            Ok(())
        } else {
            Err(GpuError::ContextMismatch)
        }
    }

    /// The program currently in use, if any.
    pub fn bound_program(&self) -> Option<Handle> {
        self.inner.bindings.program.get()
    }

    /// The vertex array currently bound, if any.
    pub fn bound_vertex_array(&self) -> Option<Handle> {
        self.inner.bindings.vertex_array.get()
    }

    /// The buffer currently bound to the array buffer target, if any.
    pub fn bound_array_buffer(&self) -> Option<Handle> {
        self.inner.bindings.array_buffer.get()
    }

    /// The texture currently bound to the 2D texture target, if any.
    pub fn bound_texture_2d(&self) -> Option<Handle> {
        self.inner.bindings.texture_2d.get()
    }

    pub(crate) fn forget_bindings(&self, kind: ObjectKind, handle: Handle) {
        self.inner.bindings.forget(kind, handle);
    }

    /// Poll the driver error queue after `operation`.
    ///
    /// Only active with the `gl-check` feature; otherwise always `Ok`.
    pub(crate) fn check(&self, operation: &'static str) -> GpuResult<()> {
        if !cfg!(feature = "gl-check") {
            return Ok(());
        }
        let mut first = None;
        while let Some(error) = DriverError::from_code(self.driver().get_error()) {
            log::error!("GL error after {operation}: {error}");
            first.get_or_insert(error);
        }
        match first {
            Some(error) => Err(GpuError::Driver { operation, error }),
            None => Ok(()),
        }
    }

    /// Clear the color and depth buffers of the current framebuffer.
    pub fn clear(&self, color: [f32; 4]) -> GpuResult<()> {
        self.driver().clear(color);
        self.check("clear")
    }

    /// Set the viewport to cover `width` x `height` pixels from the origin.
    pub fn viewport(&self, width: u32, height: u32) -> GpuResult<()> {
        self.driver().viewport(width, height);
        self.check("viewport")
    }

    /// Draw every vertex the vertex array provides with the given program.
    pub fn draw_arrays(
        &self,
        program: &Program<D>,
        vertex_array: &VertexArray<D>,
        mode: PrimitiveMode,
    ) -> GpuResult<()> {
        self.ensure_same(program.context())?;
        self.ensure_same(vertex_array.context())?;

        let vertex_count = vertex_array.vertex_count();
        let count =
            u32::try_from(vertex_count).map_err(|_| GpuError::TooManyVertices(vertex_count))?;

        program.use_program()?;
        vertex_array.bind()?;
        self.driver().draw_arrays(mode, 0, count);
        self.check("draw_arrays")?;
        vertex_array.unbind()
    }
}
