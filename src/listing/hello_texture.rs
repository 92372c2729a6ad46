use image::{Rgba, RgbaImage};

use crate::config::SampleConfig;
use crate::constants::{POSITION_ATTRIBUTE_SLOT, TEXCOORD_ATTRIBUTE_SLOT};
use crate::gpu::{
    GpuContext, PrimitiveMode,
    buffer::{Buffer, BufferTarget, BufferUsage},
    driver::Driver,
    program::Program,
    texture::{PixelFormat, PixelType, Region, Texture, TextureFormat, TextureTarget},
    vertex_array::{ElementType, VertexArray},
};
use crate::listing::{Sample, load_program};

pub const NAME: &str = "hello-texture";
pub const USAGE: &str = "a quad sampling a generated checkerboard texture";

/// Triangle strip order: bottom-left, bottom-right, top-left, top-right.
const QUAD_POSITIONS: [[f32; 3]; 4] = [
    [-0.5, -0.5, 0.0],
    [0.5, -0.5, 0.0],
    [-0.5, 0.5, 0.0],
    [0.5, 0.5, 0.0],
];
const QUAD_TEXCOORDS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];

const CHECKER_SIZE: u32 = 64;
const CHECKER_CELL: u32 = 8;

/// A checkerboard of white and dark cells.
fn checkerboard(size: u32, cell: u32) -> RgbaImage {
    RgbaImage::from_fn(size, size, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([40, 40, 40, 255])
        }
    })
}

/// A textured quad.
pub struct HelloTexture<D: Driver = glow::Context> {
    program: Program<D>,
    vao: VertexArray<D>,
    texture: Texture<D>,
    _positions: Buffer<[f32; 3], D>,
    _texcoords: Buffer<[f32; 2], D>,
    clear_color: [f32; 4],
}

impl<D: Driver> Sample<D> for HelloTexture<D> {
    fn name() -> &'static str {
        NAME
    }

    fn usage() -> &'static str {
        USAGE
    }

    fn initialize(ctx: &GpuContext<D>, config: &SampleConfig) -> anyhow::Result<Self> {
        let program = load_program(ctx, config, "hello_texture.vert", "hello_texture.frag")?;

        let positions =
            Buffer::with_data(ctx, BufferTarget::Array, &QUAD_POSITIONS, BufferUsage::STATIC_DRAW)?;
        let texcoords =
            Buffer::with_data(ctx, BufferTarget::Array, &QUAD_TEXCOORDS, BufferUsage::STATIC_DRAW)?;
        let mut vao = VertexArray::new(ctx)?;
        vao.vertex_attrib_pointer(POSITION_ATTRIBUTE_SLOT, &positions, 3, ElementType::Float)?;
        vao.vertex_attrib_pointer(TEXCOORD_ATTRIBUTE_SLOT, &texcoords, 2, ElementType::Float)?;

        let checker = checkerboard(CHECKER_SIZE, CHECKER_CELL);
        let mut texture = Texture::new(ctx, TextureTarget::Texture2D)?;
        texture.storage_2d(TextureFormat::Rgba8, CHECKER_SIZE, CHECKER_SIZE)?;
        texture.sub_image_2d(
            Region::whole(CHECKER_SIZE, CHECKER_SIZE),
            PixelFormat::Rgba,
            PixelType::UnsignedByte,
            &checker,
        )?;

        Ok(Self {
            program,
            vao,
            texture,
            _positions: positions,
            _texcoords: texcoords,
            clear_color: config.clear_color,
        })
    }

    fn render(&mut self, ctx: &GpuContext<D>) -> anyhow::Result<()> {
        ctx.clear(self.clear_color)?;
        // `checker` samples texture unit 0, the default active unit.
        self.texture.bind()?;
        ctx.draw_arrays(&self.program, &self.vao, PrimitiveMode::TriangleStrip)?;
        self.texture.unbind()?;
        Ok(())
    }
}
