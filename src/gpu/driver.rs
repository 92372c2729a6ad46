use glow::HasContext;

use crate::gpu::{
    Handle, PrimitiveMode,
    buffer::{BufferTarget, BufferUsage},
    shader::ShaderStage,
    texture::{PixelFormat, PixelType, Region, TextureFormat, TextureTarget},
    vertex_array::AttributeLayout,
};

/// The GL entry points the wrapper layer calls.
///
/// Implementors assume a current GL context on the calling thread; `GpuContext`
/// is where that assumption is established.
pub trait Driver {
    fn version_string(&self) -> String;
    fn get_error(&self) -> u32;

    fn create_buffer(&self) -> Result<Handle, String>;
    fn delete_buffer(&self, buffer: Handle);
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Handle>);
    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage);
    fn get_buffer_sub_data(&self, target: BufferTarget, offset: usize, dst: &mut [u8]);

    fn create_vertex_array(&self) -> Result<Handle, String>;
    fn delete_vertex_array(&self, vertex_array: Handle);
    fn bind_vertex_array(&self, vertex_array: Option<Handle>);
    fn vertex_attrib_pointer(&self, slot: u32, layout: &AttributeLayout);
    fn enable_vertex_attrib_array(&self, slot: u32);

    fn create_shader(&self, stage: ShaderStage) -> Result<Handle, String>;
    fn delete_shader(&self, shader: Handle);
    fn shader_source(&self, shader: Handle, source: &str);
    fn compile_shader(&self, shader: Handle);
    fn shader_compile_status(&self, shader: Handle) -> bool;
    fn shader_info_log(&self, shader: Handle) -> String;

    fn create_program(&self) -> Result<Handle, String>;
    fn delete_program(&self, program: Handle);
    fn attach_shader(&self, program: Handle, shader: Handle);
    fn link_program(&self, program: Handle);
    fn program_link_status(&self, program: Handle) -> bool;
    fn program_info_log(&self, program: Handle) -> String;
    fn use_program(&self, program: Option<Handle>);
    fn uniform_location(&self, program: Handle, name: &str) -> Option<u32>;
    fn uniform_1_f32(&self, location: u32, value: f32);

    fn create_texture(&self) -> Result<Handle, String>;
    fn delete_texture(&self, texture: Handle);
    fn bind_texture(&self, target: TextureTarget, texture: Option<Handle>);
    fn tex_storage_2d(&self, target: TextureTarget, format: TextureFormat, width: u32, height: u32);
    /// Set the byte alignment of each pixel row read by `tex_sub_image_2d`.
    fn pixel_unpack_alignment(&self, alignment: u32);
    fn tex_sub_image_2d(
        &self,
        target: TextureTarget,
        region: Region,
        format: PixelFormat,
        ty: PixelType,
        pixels: &[u8],
    );

    fn clear(&self, color: [f32; 4]);
    fn viewport(&self, width: u32, height: u32);
    fn draw_arrays(&self, mode: PrimitiveMode, first: u32, count: u32);
}

// SAFETY (all blocks below): `GpuContext::from_glow` is the only way a
// `glow::Context` reaches the wrapper layer, and its caller guarantees the
// context is current on this thread for as long as the driver lives.
impl Driver for glow::Context {
    fn version_string(&self) -> String {
        unsafe { self.get_parameter_string(glow::VERSION) }
    }

    fn get_error(&self) -> u32 {
        unsafe { HasContext::get_error(self) }
    }

    fn create_buffer(&self) -> Result<Handle, String> {
        unsafe { HasContext::create_buffer(self).map(|b| Handle::from(b.0)) }
    }

    fn delete_buffer(&self, buffer: Handle) {
        unsafe { HasContext::delete_buffer(self, glow::NativeBuffer(buffer.raw())) }
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Handle>) {
        unsafe {
            HasContext::bind_buffer(
                self,
                target.to_gl(),
                buffer.map(|b| glow::NativeBuffer(b.raw())),
            )
        }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        unsafe { self.buffer_data_u8_slice(target.to_gl(), data, usage.to_gl()) }
    }

    fn get_buffer_sub_data(&self, target: BufferTarget, offset: usize, dst: &mut [u8]) {
        unsafe { HasContext::get_buffer_sub_data(self, target.to_gl(), offset as i32, dst) }
    }

    fn create_vertex_array(&self) -> Result<Handle, String> {
        unsafe { HasContext::create_vertex_array(self).map(|v| Handle::from(v.0)) }
    }

    fn delete_vertex_array(&self, vertex_array: Handle) {
        unsafe { HasContext::delete_vertex_array(self, glow::NativeVertexArray(vertex_array.raw())) }
    }

    fn bind_vertex_array(&self, vertex_array: Option<Handle>) {
        unsafe {
            HasContext::bind_vertex_array(
                self,
                vertex_array.map(|v| glow::NativeVertexArray(v.raw())),
            )
        }
    }

    fn vertex_attrib_pointer(&self, slot: u32, layout: &AttributeLayout) {
        unsafe {
            self.vertex_attrib_pointer_f32(
                slot,
                layout.components,
                layout.element_type.to_gl(),
                layout.normalized,
                layout.stride,
                layout.offset,
            )
        }
    }

    fn enable_vertex_attrib_array(&self, slot: u32) {
        unsafe { HasContext::enable_vertex_attrib_array(self, slot) }
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<Handle, String> {
        unsafe { HasContext::create_shader(self, stage.to_gl()).map(|s| Handle::from(s.0)) }
    }

    fn delete_shader(&self, shader: Handle) {
        unsafe { HasContext::delete_shader(self, glow::NativeShader(shader.raw())) }
    }

    fn shader_source(&self, shader: Handle, source: &str) {
        unsafe { HasContext::shader_source(self, glow::NativeShader(shader.raw()), source) }
    }

    fn compile_shader(&self, shader: Handle) {
        unsafe { HasContext::compile_shader(self, glow::NativeShader(shader.raw())) }
    }

    fn shader_compile_status(&self, shader: Handle) -> bool {
        unsafe { self.get_shader_compile_status(glow::NativeShader(shader.raw())) }
    }

    fn shader_info_log(&self, shader: Handle) -> String {
        unsafe { self.get_shader_info_log(glow::NativeShader(shader.raw())) }
    }

    fn create_program(&self) -> Result<Handle, String> {
        unsafe { HasContext::create_program(self).map(|p| Handle::from(p.0)) }
    }

    fn delete_program(&self, program: Handle) {
        unsafe { HasContext::delete_program(self, glow::NativeProgram(program.raw())) }
    }

    fn attach_shader(&self, program: Handle, shader: Handle) {
        unsafe {
            HasContext::attach_shader(
                self,
                glow::NativeProgram(program.raw()),
                glow::NativeShader(shader.raw()),
            )
        }
    }

    fn link_program(&self, program: Handle) {
        unsafe { HasContext::link_program(self, glow::NativeProgram(program.raw())) }
    }

    fn program_link_status(&self, program: Handle) -> bool {
        unsafe { self.get_program_link_status(glow::NativeProgram(program.raw())) }
    }

    fn program_info_log(&self, program: Handle) -> String {
        unsafe { self.get_program_info_log(glow::NativeProgram(program.raw())) }
    }

    fn use_program(&self, program: Option<Handle>) {
        unsafe { HasContext::use_program(self, program.map(|p| glow::NativeProgram(p.raw()))) }
    }

    fn uniform_location(&self, program: Handle, name: &str) -> Option<u32> {
        unsafe {
            self.get_uniform_location(glow::NativeProgram(program.raw()), name)
                .map(|location| location.0)
        }
    }

    fn uniform_1_f32(&self, location: u32, value: f32) {
        let location = glow::NativeUniformLocation(location);
        unsafe { HasContext::uniform_1_f32(self, Some(&location), value) }
    }

    fn create_texture(&self) -> Result<Handle, String> {
        unsafe { HasContext::create_texture(self).map(|t| Handle::from(t.0)) }
    }

    fn delete_texture(&self, texture: Handle) {
        unsafe { HasContext::delete_texture(self, glow::NativeTexture(texture.raw())) }
    }

    fn bind_texture(&self, target: TextureTarget, texture: Option<Handle>) {
        unsafe {
            HasContext::bind_texture(
                self,
                target.to_gl(),
                texture.map(|t| glow::NativeTexture(t.raw())),
            )
        }
    }

    fn tex_storage_2d(&self, target: TextureTarget, format: TextureFormat, width: u32, height: u32) {
        unsafe {
            HasContext::tex_storage_2d(
                self,
                target.to_gl(),
                1,
                format.to_gl(),
                width as i32,
                height as i32,
            )
        }
    }

    fn pixel_unpack_alignment(&self, alignment: u32) {
        unsafe { self.pixel_store_i32(glow::UNPACK_ALIGNMENT, alignment as i32) }
    }

    fn tex_sub_image_2d(
        &self,
        target: TextureTarget,
        region: Region,
        format: PixelFormat,
        ty: PixelType,
        pixels: &[u8],
    ) {
        unsafe {
            HasContext::tex_sub_image_2d(
                self,
                target.to_gl(),
                0,
                region.x as i32,
                region.y as i32,
                region.width as i32,
                region.height as i32,
                format.to_gl(),
                ty.to_gl(),
                glow::PixelUnpackData::Slice(Some(pixels)),
            )
        }
    }

    fn clear(&self, color: [f32; 4]) {
        let [r, g, b, a] = color;
        unsafe {
            self.clear_color(r, g, b, a);
            HasContext::clear(self, glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    fn viewport(&self, width: u32, height: u32) {
        unsafe { HasContext::viewport(self, 0, 0, width as i32, height as i32) }
    }

    fn draw_arrays(&self, mode: PrimitiveMode, first: u32, count: u32) {
        unsafe { HasContext::draw_arrays(self, mode.to_gl(), first as i32, count as i32) }
    }
}
