//! An in-memory stand-in for the GL driver.

use std::cell::RefCell;
use std::collections::{BTreeSet, VecDeque};

use rustc_hash::FxHashMap;

use crate::gpu::{
    Handle, PrimitiveMode,
    buffer::{BufferTarget, BufferUsage},
    driver::Driver,
    object::ObjectKind,
    shader::ShaderStage,
    texture::{PixelFormat, PixelType, Region, TextureFormat, TextureTarget},
    vertex_array::AttributeLayout,
};

/// An attribute slot as the driver last saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedAttribute {
    pub buffer: Option<Handle>,
    pub layout: AttributeLayout,
    pub enabled: bool,
}

/// One recorded draw call and the state it was issued with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub mode: PrimitiveMode,
    pub first: u32,
    pub count: u32,
    pub program: Option<Handle>,
    pub vertex_array: Option<Handle>,
}

#[derive(Debug)]
struct FakeShader {
    stage: ShaderStage,
    source: String,
    compiled: bool,
}

#[derive(Debug, Default)]
struct FakeProgram {
    attached: Vec<Handle>,
    sources: Vec<String>,
    linked: bool,
    log: String,
}

#[derive(Debug, Default)]
struct FakeTexture {
    storage: Option<(u32, u32)>,
    uploads: Vec<Region>,
}

#[derive(Debug, Default)]
struct FakeState {
    fail_allocations: bool,
    live: FxHashMap<ObjectKind, BTreeSet<u32>>,
    deletes: FxHashMap<(ObjectKind, u32), usize>,
    errors: VecDeque<u32>,

    buffers: FxHashMap<Handle, (Vec<u8>, u32)>,
    bound_buffers: FxHashMap<BufferTarget, Handle>,

    bound_vertex_array: Option<Handle>,
    attributes: FxHashMap<(Handle, u32), RecordedAttribute>,

    shaders: FxHashMap<Handle, FakeShader>,
    programs: FxHashMap<Handle, FakeProgram>,
    current_program: Option<Handle>,
    uniform_locations: FxHashMap<(Handle, String), u32>,
    uniform_values: FxHashMap<u32, f32>,
    uniform_lookups: usize,

    textures: FxHashMap<Handle, FakeTexture>,
    bound_texture: Option<Handle>,
    unpack_alignment: Option<u32>,

    clears: usize,
    viewport: Option<(u32, u32)>,
    draws: Vec<DrawCall>,
}

impl FakeState {
    fn allocate(&mut self, kind: ObjectKind) -> Result<Handle, String> {
        if self.fail_allocations {
            return Err(format!("out of {kind} names"));
        }
        let live = self.live.entry(kind).or_default();
        let raw = (1..).find(|raw| !live.contains(raw)).unwrap_or(u32::MAX);
        live.insert(raw);
        Handle::new(raw).ok_or_else(|| "handle space exhausted".to_string())
    }

    fn release(&mut self, kind: ObjectKind, handle: Handle) {
        let removed = self
            .live
            .get_mut(&kind)
            .is_some_and(|live| live.remove(&handle.get()));
        assert!(removed, "{kind} {handle:?} released twice or never created");
        *self.deletes.entry((kind, handle.get())).or_default() += 1;
    }

    fn invalid_operation(&mut self) {
        self.errors.push_back(glow::INVALID_OPERATION);
    }
}

/// A driver that keeps every object in memory.
///
/// Handles are the lowest free number per category, so released handles get
/// reused. Releasing a handle that is not live panics. Shaders whose source
/// contains `#error` fail to compile; programs link when they have both a
/// vertex and a fragment shader.
#[derive(Debug, Default)]
pub struct FakeDriver {
    state: RefCell<FakeState>,
}

impl FakeDriver {
    /// Make every following allocation fail.
    pub fn fail_allocations(&self, fail: bool) {
        self.state.borrow_mut().fail_allocations = fail;
    }

    /// Queue an error code to be returned by the next error poll.
    pub fn push_error(&self, code: u32) {
        self.state.borrow_mut().errors.push_back(code);
    }

    pub fn is_live(&self, kind: ObjectKind, handle: Handle) -> bool {
        self.state
            .borrow()
            .live
            .get(&kind)
            .is_some_and(|live| live.contains(&handle.get()))
    }

    pub fn live_count(&self, kind: ObjectKind) -> usize {
        self.state.borrow().live.get(&kind).map_or(0, BTreeSet::len)
    }

    /// How many times `handle` was released over the driver's lifetime.
    pub fn delete_count(&self, kind: ObjectKind, handle: Handle) -> usize {
        self.state
            .borrow()
            .deletes
            .get(&(kind, handle.get()))
            .copied()
            .unwrap_or(0)
    }

    pub fn buffer_bytes(&self, buffer: Handle) -> Option<Vec<u8>> {
        self.state
            .borrow()
            .buffers
            .get(&buffer)
            .map(|(bytes, _)| bytes.clone())
    }

    pub fn buffer_usage(&self, buffer: Handle) -> Option<u32> {
        self.state
            .borrow()
            .buffers
            .get(&buffer)
            .map(|(_, usage)| *usage)
    }

    pub fn attribute(&self, vertex_array: Handle, slot: u32) -> Option<RecordedAttribute> {
        self.state
            .borrow()
            .attributes
            .get(&(vertex_array, slot))
            .copied()
    }

    pub fn shader_stage(&self, shader: Handle) -> Option<ShaderStage> {
        self.state.borrow().shaders.get(&shader).map(|s| s.stage)
    }

    pub fn shader_compiled(&self, shader: Handle) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .is_some_and(|s| s.compiled)
    }

    pub fn current_program(&self) -> Option<Handle> {
        self.state.borrow().current_program
    }

    pub fn uniform_lookups(&self) -> usize {
        self.state.borrow().uniform_lookups
    }

    pub fn uniform_value(&self, location: u32) -> Option<f32> {
        self.state.borrow().uniform_values.get(&location).copied()
    }

    pub fn texture_storage(&self, texture: Handle) -> Option<(u32, u32)> {
        self.state
            .borrow()
            .textures
            .get(&texture)
            .and_then(|t| t.storage)
    }

    pub fn texture_uploads(&self, texture: Handle) -> Vec<Region> {
        self.state
            .borrow()
            .textures
            .get(&texture)
            .map(|t| t.uploads.clone())
            .unwrap_or_default()
    }

    /// The row alignment last set for uploads; GL starts out at 4.
    pub fn unpack_alignment(&self) -> u32 {
        self.state.borrow().unpack_alignment.unwrap_or(4)
    }

    pub fn clear_count(&self) -> usize {
        self.state.borrow().clears
    }

    pub fn viewport_size(&self) -> Option<(u32, u32)> {
        self.state.borrow().viewport
    }

    pub fn draws(&self) -> Vec<DrawCall> {
        self.state.borrow().draws.clone()
    }
}

/// Whether a line declares `uniform <type> <name>;`.
fn declares_uniform(line: &str, name: &str) -> bool {
    let Some(rest) = line.trim().strip_prefix("uniform ") else {
        return false;
    };
    rest.trim_end_matches(';')
        .split_whitespace()
        .last()
        .is_some_and(|declared| declared == name)
}

impl Driver for FakeDriver {
    fn version_string(&self) -> String {
        "3.3.0 fake".to_string()
    }

    fn get_error(&self) -> u32 {
        self.state
            .borrow_mut()
            .errors
            .pop_front()
            .unwrap_or(glow::NO_ERROR)
    }

    fn create_buffer(&self) -> Result<Handle, String> {
        let mut state = self.state.borrow_mut();
        let handle = state.allocate(ObjectKind::Buffer)?;
        state.buffers.insert(handle, (Vec::new(), glow::STATIC_DRAW));
        Ok(handle)
    }

    fn delete_buffer(&self, buffer: Handle) {
        let mut state = self.state.borrow_mut();
        state.release(ObjectKind::Buffer, buffer);
        state.buffers.remove(&buffer);
        state.bound_buffers.retain(|_, bound| *bound != buffer);
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Handle>) {
        let mut state = self.state.borrow_mut();
        match buffer {
            Some(buffer) => {
                state.bound_buffers.insert(target, buffer);
            }
            None => {
                state.bound_buffers.remove(&target);
            }
        }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        let mut state = self.state.borrow_mut();
        let Some(&buffer) = state.bound_buffers.get(&target) else {
            return state.invalid_operation();
        };
        state.buffers.insert(buffer, (data.to_vec(), usage.to_gl()));
    }

    fn get_buffer_sub_data(&self, target: BufferTarget, offset: usize, dst: &mut [u8]) {
        let mut state = self.state.borrow_mut();
        let Some(&buffer) = state.bound_buffers.get(&target) else {
            return state.invalid_operation();
        };
        let copied = match state.buffers[&buffer].0.get(offset..offset + dst.len()) {
            Some(src) => {
                dst.copy_from_slice(src);
                true
            }
            None => false,
        };
        if !copied {
            state.errors.push_back(glow::INVALID_VALUE);
        }
    }

    fn create_vertex_array(&self) -> Result<Handle, String> {
        self.state.borrow_mut().allocate(ObjectKind::VertexArray)
    }

    fn delete_vertex_array(&self, vertex_array: Handle) {
        let mut state = self.state.borrow_mut();
        state.release(ObjectKind::VertexArray, vertex_array);
        state.attributes.retain(|(vao, _), _| *vao != vertex_array);
        if state.bound_vertex_array == Some(vertex_array) {
            state.bound_vertex_array = None;
        }
    }

    fn bind_vertex_array(&self, vertex_array: Option<Handle>) {
        self.state.borrow_mut().bound_vertex_array = vertex_array;
    }

    fn vertex_attrib_pointer(&self, slot: u32, layout: &AttributeLayout) {
        let mut state = self.state.borrow_mut();
        let Some(vertex_array) = state.bound_vertex_array else {
            return state.invalid_operation();
        };
        let buffer = state.bound_buffers.get(&BufferTarget::Array).copied();
        let enabled = state
            .attributes
            .get(&(vertex_array, slot))
            .is_some_and(|a| a.enabled);
        state.attributes.insert(
            (vertex_array, slot),
            RecordedAttribute {
                buffer,
                layout: *layout,
                enabled,
            },
        );
    }

    fn enable_vertex_attrib_array(&self, slot: u32) {
        let mut state = self.state.borrow_mut();
        let Some(vertex_array) = state.bound_vertex_array else {
            return state.invalid_operation();
        };
        match state.attributes.get_mut(&(vertex_array, slot)) {
            Some(attribute) => attribute.enabled = true,
            None => state.invalid_operation(),
        }
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<Handle, String> {
        let mut state = self.state.borrow_mut();
        let handle = state.allocate(ObjectKind::Shader)?;
        state.shaders.insert(
            handle,
            FakeShader {
                stage,
                source: String::new(),
                compiled: false,
            },
        );
        Ok(handle)
    }

    fn delete_shader(&self, shader: Handle) {
        let mut state = self.state.borrow_mut();
        state.release(ObjectKind::Shader, shader);
        state.shaders.remove(&shader);
    }

    fn shader_source(&self, shader: Handle, source: &str) {
        if let Some(fake) = self.state.borrow_mut().shaders.get_mut(&shader) {
            fake.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: Handle) {
        if let Some(fake) = self.state.borrow_mut().shaders.get_mut(&shader) {
            fake.compiled = !fake.source.contains("#error");
        }
    }

    fn shader_compile_status(&self, shader: Handle) -> bool {
        self.shader_compiled(shader)
    }

    fn shader_info_log(&self, shader: Handle) -> String {
        let state = self.state.borrow();
        match state.shaders.get(&shader) {
            Some(fake) if !fake.compiled => {
                let line = fake
                    .source
                    .lines()
                    .position(|line| line.contains("#error"))
                    .map_or(0, |index| index + 1);
                format!("0:{line}(1): error: #error directive")
            }
            _ => String::new(),
        }
    }

    fn create_program(&self) -> Result<Handle, String> {
        let mut state = self.state.borrow_mut();
        let handle = state.allocate(ObjectKind::Program)?;
        state.programs.insert(handle, FakeProgram::default());
        Ok(handle)
    }

    fn delete_program(&self, program: Handle) {
        let mut state = self.state.borrow_mut();
        state.release(ObjectKind::Program, program);
        state.programs.remove(&program);
        if state.current_program == Some(program) {
            state.current_program = None;
        }
    }

    fn attach_shader(&self, program: Handle, shader: Handle) {
        if let Some(fake) = self.state.borrow_mut().programs.get_mut(&program) {
            fake.attached.push(shader);
        }
    }

    fn link_program(&self, program: Handle) {
        let mut state = self.state.borrow_mut();
        let state = &mut *state;
        let Some(fake) = state.programs.get_mut(&program) else {
            return;
        };
        let stages = fake
            .attached
            .iter()
            .filter_map(|shader| state.shaders.get(shader))
            .filter(|shader| shader.compiled)
            .map(|shader| shader.stage)
            .collect::<Vec<_>>();

        fake.linked = false;
        fake.log = if !stages.contains(&ShaderStage::Vertex) {
            "error: no vertex shader attached".to_string()
        } else if !stages.contains(&ShaderStage::Fragment) {
            "error: no fragment shader attached".to_string()
        } else {
            fake.linked = true;
            String::new()
        };
        fake.sources = fake
            .attached
            .iter()
            .filter_map(|shader| state.shaders.get(shader))
            .map(|shader| shader.source.clone())
            .collect();
    }

    fn program_link_status(&self, program: Handle) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: Handle) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn use_program(&self, program: Option<Handle>) {
        self.state.borrow_mut().current_program = program;
    }

    fn uniform_location(&self, program: Handle, name: &str) -> Option<u32> {
        let mut state = self.state.borrow_mut();
        state.uniform_lookups += 1;
        let declared = state.programs.get(&program).is_some_and(|p| {
            p.linked
                && p.sources
                    .iter()
                    .flat_map(|source| source.lines())
                    .any(|line| declares_uniform(line, name))
        });
        if !declared {
            return None;
        }
        let next = state.uniform_locations.len() as u32;
        Some(
            *state
                .uniform_locations
                .entry((program, name.to_string()))
                .or_insert(next),
        )
    }

    fn uniform_1_f32(&self, location: u32, value: f32) {
        let mut state = self.state.borrow_mut();
        if state.current_program.is_none() {
            return state.invalid_operation();
        }
        state.uniform_values.insert(location, value);
    }

    fn create_texture(&self) -> Result<Handle, String> {
        let mut state = self.state.borrow_mut();
        let handle = state.allocate(ObjectKind::Texture)?;
        state.textures.insert(handle, FakeTexture::default());
        Ok(handle)
    }

    fn delete_texture(&self, texture: Handle) {
        let mut state = self.state.borrow_mut();
        state.release(ObjectKind::Texture, texture);
        state.textures.remove(&texture);
        if state.bound_texture == Some(texture) {
            state.bound_texture = None;
        }
    }

    fn bind_texture(&self, _target: TextureTarget, texture: Option<Handle>) {
        self.state.borrow_mut().bound_texture = texture;
    }

    fn tex_storage_2d(&self, _target: TextureTarget, _format: TextureFormat, width: u32, height: u32) {
        let mut state = self.state.borrow_mut();
        let Some(texture) = state.bound_texture else {
            return state.invalid_operation();
        };
        if let Some(fake) = state.textures.get_mut(&texture) {
            fake.storage = Some((width, height));
        }
    }

    fn pixel_unpack_alignment(&self, alignment: u32) {
        self.state.borrow_mut().unpack_alignment = Some(alignment);
    }

    fn tex_sub_image_2d(
        &self,
        _target: TextureTarget,
        region: Region,
        format: PixelFormat,
        ty: PixelType,
        pixels: &[u8],
    ) {
        let mut state = self.state.borrow_mut();
        let Some(texture) = state.bound_texture else {
            return state.invalid_operation();
        };
        let alignment = state.unpack_alignment.unwrap_or(4) as usize;
        let read = unpacked_size(region, format, ty, alignment);
        assert!(
            read <= pixels.len(),
            "upload reads {read} bytes from a {} byte slice",
            pixels.len()
        );
        if let Some(fake) = state.textures.get_mut(&texture) {
            fake.uploads.push(region);
        }
    }

    fn clear(&self, _color: [f32; 4]) {
        self.state.borrow_mut().clears += 1;
    }

    fn viewport(&self, width: u32, height: u32) {
        self.state.borrow_mut().viewport = Some((width, height));
    }

    fn draw_arrays(&self, mode: PrimitiveMode, first: u32, count: u32) {
        let mut state = self.state.borrow_mut();
        let call = DrawCall {
            mode,
            first,
            count,
            program: state.current_program,
            vertex_array: state.bound_vertex_array,
        };
        state.draws.push(call);
    }
}

/// Bytes GL reads for `region` when every row starts on an `alignment` boundary.
fn unpacked_size(region: Region, format: PixelFormat, ty: PixelType, alignment: usize) -> usize {
    if region.width == 0 || region.height == 0 {
        return 0;
    }
    let row = region.width as usize * format.channels() * ty.size_in_bytes();
    let stride = row.div_ceil(alignment) * alignment;
    stride * (region.height as usize - 1) + row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpacked_size_pads_rows_to_the_alignment() {
        let rgb = Region::whole(2, 2);
        assert_eq!(unpacked_size(rgb, PixelFormat::Rgb, PixelType::UnsignedByte, 4), 14);
        assert_eq!(unpacked_size(rgb, PixelFormat::Rgb, PixelType::UnsignedByte, 1), 12);
        let red = Region::whole(3, 2);
        assert_eq!(unpacked_size(red, PixelFormat::Red, PixelType::UnsignedByte, 4), 7);
    }

    #[test]
    fn uniform_declarations_are_recognized() {
        assert!(declares_uniform("uniform float attenuation;", "attenuation"));
        assert!(declares_uniform("  uniform sampler2D checker;", "checker"));
        assert!(!declares_uniform("uniform float attenuation_scale;", "attenuation"));
        assert!(!declares_uniform("in vec3 attenuation;", "attenuation"));
    }
}
