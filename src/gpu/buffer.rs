use std::cell::Cell;
use std::marker::PhantomData;
use std::rc::Rc;

use bytemuck::Pod;

use crate::gpu::{
    GpuContext, Handle,
    driver::Driver,
    error::GpuResult,
    object::{Object, ObjectKind},
};

/// The binding point a buffer is used through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    Array,
    ElementArray,
    Uniform,
    CopyRead,
    CopyWrite,
}

impl BufferTarget {
    pub fn to_gl(self) -> u32 {
        match self {
            Self::Array => glow::ARRAY_BUFFER,
            Self::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
            Self::Uniform => glow::UNIFORM_BUFFER,
            Self::CopyRead => glow::COPY_READ_BUFFER,
            Self::CopyWrite => glow::COPY_WRITE_BUFFER,
        }
    }
}

/// How often the contents are expected to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Stream,
    Static,
    Dynamic,
}

/// Who reads and writes the contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Draw,
    Read,
    Copy,
}

/// A usage hint for the driver. It only affects performance, never correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferUsage {
    pub frequency: Frequency,
    pub access: Access,
}

impl BufferUsage {
    pub const STATIC_DRAW: Self = Self::new(Frequency::Static, Access::Draw);
    pub const DYNAMIC_DRAW: Self = Self::new(Frequency::Dynamic, Access::Draw);
    pub const STREAM_DRAW: Self = Self::new(Frequency::Stream, Access::Draw);

    pub const fn new(frequency: Frequency, access: Access) -> Self {
        Self { frequency, access }
    }

    pub fn to_gl(self) -> u32 {
        match (self.frequency, self.access) {
            (Frequency::Stream, Access::Draw) => glow::STREAM_DRAW,
            (Frequency::Stream, Access::Read) => glow::STREAM_READ,
            (Frequency::Stream, Access::Copy) => glow::STREAM_COPY,
            (Frequency::Static, Access::Draw) => glow::STATIC_DRAW,
            (Frequency::Static, Access::Read) => glow::STATIC_READ,
            (Frequency::Static, Access::Copy) => glow::STATIC_COPY,
            (Frequency::Dynamic, Access::Draw) => glow::DYNAMIC_DRAW,
            (Frequency::Dynamic, Access::Read) => glow::DYNAMIC_READ,
            (Frequency::Dynamic, Access::Copy) => glow::DYNAMIC_COPY,
        }
    }
}

/// A GPU buffer holding elements of type `T`.
///
/// No CPU-side copy is kept after an upload; only its size is remembered. The
/// size is shared with the vertex arrays reading from this buffer.
#[derive(Debug)]
pub struct Buffer<T, D: Driver = glow::Context> {
    object: Object<D>,
    target: BufferTarget,
    size: Rc<Cell<usize>>,
    _element: PhantomData<T>,
}

impl<T: Pod, D: Driver> Buffer<T, D> {
    /// Create an empty buffer used through `target`.
    pub fn new(ctx: &GpuContext<D>, target: BufferTarget) -> GpuResult<Self> {
        let object = Object::create(ctx, ObjectKind::Buffer)?;
        Ok(Self {
            object,
            target,
            size: Rc::new(Cell::new(0)),
            _element: PhantomData,
        })
    }

    /// Create a vertex attribute buffer.
    pub fn array(ctx: &GpuContext<D>) -> GpuResult<Self> {
        Self::new(ctx, BufferTarget::Array)
    }

    /// Create an index buffer.
    pub fn element_array(ctx: &GpuContext<D>) -> GpuResult<Self> {
        Self::new(ctx, BufferTarget::ElementArray)
    }

    /// Create a buffer and upload `items` into it.
    pub fn with_data(
        ctx: &GpuContext<D>,
        target: BufferTarget,
        items: &[T],
        usage: BufferUsage,
    ) -> GpuResult<Self> {
        let mut buffer = Self::new(ctx, target)?;
        buffer.data(items, usage)?;
        Ok(buffer)
    }

    /// Bind this buffer to its target.
    pub fn bind(&self) -> GpuResult<()> {
        self.object
            .driver()
            .bind_buffer(self.target, Some(self.handle()));
        self.binding_point().set(Some(self.handle()));
        self.context().check("bind_buffer")
    }

    /// Clear the binding of this buffer's target.
    pub fn unbind(&self) -> GpuResult<()> {
        self.object.driver().bind_buffer(self.target, None);
        self.binding_point().set(None);
        self.context().check("unbind_buffer")
    }

    /// Replace the contents with `items`.
    pub fn data(&mut self, items: &[T], usage: BufferUsage) -> GpuResult<()> {
        self.bind()?;
        self.object
            .driver()
            .buffer_data(self.target, bytemuck::cast_slice(items), usage);
        self.context().check("buffer_data")?;
        self.size.set(std::mem::size_of_val(items));
        self.unbind()
    }

    /// Read the whole contents back from the GPU.
    pub fn read(&self) -> GpuResult<Vec<T>> {
        let mut items = vec![T::zeroed(); self.len()];
        self.bind()?;
        self.object
            .driver()
            .get_buffer_sub_data(self.target, 0, bytemuck::cast_slice_mut(&mut items));
        self.context().check("get_buffer_sub_data")?;
        self.unbind()?;
        Ok(items)
    }

    fn binding_point(&self) -> &std::cell::Cell<Option<Handle>> {
        let bindings = self.context().bindings();
        match self.target {
            BufferTarget::Array => &bindings.array_buffer,
            BufferTarget::ElementArray => &bindings.element_array_buffer,
            BufferTarget::Uniform => &bindings.uniform_buffer,
            BufferTarget::CopyRead => &bindings.copy_read_buffer,
            BufferTarget::CopyWrite => &bindings.copy_write_buffer,
        }
    }
}

impl<T, D: Driver> Buffer<T, D> {
    /// Get the driver handle.
    pub fn handle(&self) -> Handle {
        self.object.handle()
    }

    pub fn target(&self) -> BufferTarget {
        self.target
    }

    /// Number of elements of the last upload.
    pub fn len(&self) -> usize {
        self.size
            .get()
            .checked_div(std::mem::size_of::<T>())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.size.get() == 0
    }

    /// Size of the last upload in bytes.
    pub fn size_in_bytes(&self) -> usize {
        self.size.get()
    }

    /// The upload size cell, updated by every `data` call.
    pub(crate) fn shared_size(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.size)
    }

    pub fn context(&self) -> &GpuContext<D> {
        self.object.context()
    }
}
