use std::cell::Cell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::gpu::{
    GpuContext, Handle,
    buffer::Buffer,
    driver::Driver,
    error::{GpuError, GpuResult},
    object::{Object, ObjectKind},
};

/// The scalar type of one attribute component as stored in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    HalfFloat,
    Float,
    Double,
}

impl ElementType {
    pub fn to_gl(self) -> u32 {
        match self {
            Self::Byte => glow::BYTE,
            Self::UnsignedByte => glow::UNSIGNED_BYTE,
            Self::Short => glow::SHORT,
            Self::UnsignedShort => glow::UNSIGNED_SHORT,
            Self::Int => glow::INT,
            Self::UnsignedInt => glow::UNSIGNED_INT,
            Self::HalfFloat => glow::HALF_FLOAT,
            Self::Float => glow::FLOAT,
            Self::Double => glow::DOUBLE,
        }
    }

    pub fn size_in_bytes(self) -> i32 {
        match self {
            Self::Byte | Self::UnsignedByte => 1,
            Self::Short | Self::UnsignedShort | Self::HalfFloat => 2,
            Self::Int | Self::UnsignedInt | Self::Float => 4,
            Self::Double => 8,
        }
    }
}

/// Where and how an attribute reads its values from a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeLayout {
    pub components: i32,
    pub element_type: ElementType,
    pub normalized: bool,
    pub stride: i32,
    pub offset: i32,
}

impl AttributeLayout {
    /// A tightly packed layout: one attribute per buffer, no gaps, starting at offset 0.
    pub fn packed(components: i32, element_type: ElementType) -> Self {
        Self {
            components,
            element_type,
            normalized: false,
            stride: components * element_type.size_in_bytes(),
            offset: 0,
        }
    }

    /// Bytes between the starts of two consecutive vertices.
    pub fn vertex_stride(&self) -> i32 {
        if self.stride == 0 {
            self.components * self.element_type.size_in_bytes()
        } else {
            self.stride
        }
    }
}

/// The source of one attribute slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeBinding {
    pub buffer: Handle,
    pub layout: AttributeLayout,
}

#[derive(Debug)]
struct Slot {
    binding: AttributeBinding,
    /// Current upload size of the source buffer, in bytes.
    buffer_size: Rc<Cell<usize>>,
}

/// A vertex array object: the mapping from shader input slots to buffers.
#[derive(Debug)]
pub struct VertexArray<D: Driver = glow::Context> {
    object: Object<D>,
    slots: FxHashMap<u32, Slot>,
}

impl<D: Driver> VertexArray<D> {
    /// Create an empty vertex array.
    pub fn new(ctx: &GpuContext<D>) -> GpuResult<Self> {
        let object = Object::create(ctx, ObjectKind::VertexArray)?;
        Ok(Self {
            object,
            slots: FxHashMap::default(),
        })
    }

    /// Make this the active vertex array.
    pub fn bind(&self) -> GpuResult<()> {
        self.object.driver().bind_vertex_array(Some(self.handle()));
        self.context().bindings().vertex_array.set(Some(self.handle()));
        self.context().check("bind_vertex_array")
    }

    /// Clear the active vertex array.
    pub fn unbind(&self) -> GpuResult<()> {
        self.object.driver().bind_vertex_array(None);
        self.context().bindings().vertex_array.set(None);
        self.context().check("unbind_vertex_array")
    }

    /// Feed `slot` with `components` tightly packed values of `element_type` per vertex from `buffer`.
    pub fn vertex_attrib_pointer<T: bytemuck::Pod>(
        &mut self,
        slot: u32,
        buffer: &Buffer<T, D>,
        components: i32,
        element_type: ElementType,
    ) -> GpuResult<()> {
        self.vertex_attrib_layout(slot, buffer, AttributeLayout::packed(components, element_type))
    }

    /// Feed `slot` from `buffer` with an explicit layout. Replaces any previous binding of `slot`.
    pub fn vertex_attrib_layout<T: bytemuck::Pod>(
        &mut self,
        slot: u32,
        buffer: &Buffer<T, D>,
        layout: AttributeLayout,
    ) -> GpuResult<()> {
        if !(1..=4).contains(&layout.components) {
            return Err(GpuError::InvalidComponentCount(layout.components));
        }
        self.context().ensure_same(buffer.context())?;

        self.bind()?;
        buffer.bind()?;
        let driver = self.object.driver();
        driver.vertex_attrib_pointer(slot, &layout);
        self.context().check("vertex_attrib_pointer")?;
        driver.enable_vertex_attrib_array(slot);
        self.context().check("enable_vertex_attrib_array")?;
        buffer.unbind()?;
        self.unbind()?;

        self.slots.insert(
            slot,
            Slot {
                binding: AttributeBinding {
                    buffer: buffer.handle(),
                    layout,
                },
                buffer_size: buffer.shared_size(),
            },
        );
        Ok(())
    }

    /// Get the binding of `slot`, if it was ever bound.
    pub fn binding(&self, slot: u32) -> Option<&AttributeBinding> {
        self.slots.get(&slot).map(|source| &source.binding)
    }

    /// All bound slots, in ascending slot order.
    pub fn bindings(&self) -> Vec<(u32, AttributeBinding)> {
        let mut bindings = self
            .slots
            .iter()
            .map(|(&slot, source)| (slot, source.binding))
            .collect::<Vec<_>>();
        bindings.sort_by_key(|(slot, _)| *slot);
        bindings
    }

    /// Vertices every bound attribute can provide from its buffer's current
    /// contents; 0 if nothing is bound.
    pub fn vertex_count(&self) -> usize {
        self.slots
            .values()
            .map(|source| vertices_in(source.buffer_size.get(), &source.binding.layout))
            .min()
            .unwrap_or(0)
    }

    /// Get the driver handle.
    pub fn handle(&self) -> Handle {
        self.object.handle()
    }

    pub fn context(&self) -> &GpuContext<D> {
        self.object.context()
    }
}

fn vertices_in(size_in_bytes: usize, layout: &AttributeLayout) -> usize {
    let attribute_size = (layout.components * layout.element_type.size_in_bytes()) as usize;
    let offset = layout.offset.max(0) as usize;
    let stride = layout.vertex_stride().max(1) as usize;
    if size_in_bytes < offset + attribute_size {
        return 0;
    }
    (size_in_bytes - offset - attribute_size) / stride + 1
}
