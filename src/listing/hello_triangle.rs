use crate::config::SampleConfig;
use crate::constants::{COLOR_ATTRIBUTE_SLOT, POSITION_ATTRIBUTE_SLOT};
use crate::gpu::{
    GpuContext, PrimitiveMode,
    buffer::{Buffer, BufferTarget, BufferUsage},
    driver::Driver,
    program::Program,
    vertex_array::{ElementType, VertexArray},
};
use crate::listing::{Sample, load_program};

pub const NAME: &str = "hello-triangle";
pub const USAGE: &str = "one triangle with red, green and blue corners";

pub const POSITIONS: [[f32; 3]; 3] = [[-0.5, -0.5, -1.0], [0.5, -0.5, -1.0], [0.0, 0.5, -1.0]];
pub const COLORS: [[f32; 4]; 3] = [
    [1.0, 0.0, 0.0, 1.0],
    [0.0, 1.0, 0.0, 1.0],
    [0.0, 0.0, 1.0, 1.0],
];

/// The triangle's vertex buffers and their vertex array.
pub(crate) struct TriangleGeometry<D: Driver> {
    pub vao: VertexArray<D>,
    pub positions: Buffer<[f32; 3], D>,
    pub colors: Buffer<[f32; 4], D>,
}

impl<D: Driver> TriangleGeometry<D> {
    pub fn upload(ctx: &GpuContext<D>, usage: BufferUsage) -> anyhow::Result<Self> {
        let positions = Buffer::with_data(ctx, BufferTarget::Array, &POSITIONS, usage)?;
        let colors = Buffer::with_data(ctx, BufferTarget::Array, &COLORS, usage)?;

        let mut vao = VertexArray::new(ctx)?;
        vao.vertex_attrib_pointer(POSITION_ATTRIBUTE_SLOT, &positions, 3, ElementType::Float)?;
        vao.vertex_attrib_pointer(COLOR_ATTRIBUTE_SLOT, &colors, 4, ElementType::Float)?;

        Ok(Self {
            vao,
            positions,
            colors,
        })
    }
}

/// One static triangle with per-vertex colors.
pub struct HelloTriangle<D: Driver = glow::Context> {
    program: Program<D>,
    geometry: TriangleGeometry<D>,
    clear_color: [f32; 4],
}

impl<D: Driver> Sample<D> for HelloTriangle<D> {
    fn name() -> &'static str {
        NAME
    }

    fn usage() -> &'static str {
        USAGE
    }

    fn initialize(ctx: &GpuContext<D>, config: &SampleConfig) -> anyhow::Result<Self> {
        let program = load_program(ctx, config, "hello_triangle.vert", "hello_triangle.frag")?;
        let geometry = TriangleGeometry::upload(ctx, BufferUsage::STATIC_DRAW)?;
        program.use_program()?;

        Ok(Self {
            program,
            geometry,
            clear_color: config.clear_color,
        })
    }

    fn render(&mut self, ctx: &GpuContext<D>) -> anyhow::Result<()> {
        ctx.clear(self.clear_color)?;
        ctx.draw_arrays(&self.program, &self.geometry.vao, PrimitiveMode::Triangles)?;
        Ok(())
    }
}
