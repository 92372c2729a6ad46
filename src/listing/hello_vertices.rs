use std::time::Duration;

use winit::keyboard::KeyCode;

use crate::config::SampleConfig;
use crate::gpu::{GpuContext, PrimitiveMode, buffer::BufferUsage, driver::Driver, program::Program};
use crate::listing::hello_triangle::TriangleGeometry;
use crate::listing::{Sample, load_program};

pub const NAME: &str = "hello-vertices";
pub const USAGE: &str = "use A, S, D keys to toggle the attenuation, x offset and y offset animations";

/// Units per second for every animated value.
const SPEED: f32 = 0.3;

/// The uniform values fed to the vertex shader.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Animation {
    attenuation: f32,
    direction: f32,
    x_offset: f32,
    y_offset: f32,
    animate_attenuation: bool,
    animate_x: bool,
    animate_y: bool,
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            attenuation: 1.0,
            direction: -1.0,
            x_offset: 0.0,
            y_offset: 0.0,
            animate_attenuation: true,
            animate_x: true,
            animate_y: true,
        }
    }
}

impl Animation {
    /// Advance by `amount`. Attenuation bounces within [0, 1]; offsets wrap from 1 to -1.
    fn step(&mut self, amount: f32) {
        if self.animate_attenuation {
            self.attenuation += self.direction * amount;
            if self.attenuation >= 1.0 {
                self.attenuation = 1.0;
                self.direction = -1.0;
            } else if self.attenuation <= 0.0 {
                self.attenuation = 0.0;
                self.direction = 1.0;
            }
        }
        if self.animate_x {
            self.x_offset = wrap_offset(self.x_offset, amount);
        }
        if self.animate_y {
            self.y_offset = wrap_offset(self.y_offset, amount);
        }
    }
}

fn wrap_offset(offset: f32, amount: f32) -> f32 {
    if offset < 1.0 { offset + amount } else { -1.0 }
}

/// The hello-triangle geometry moved and dimmed through uniforms.
pub struct HelloVertices<D: Driver = glow::Context> {
    program: Program<D>,
    geometry: TriangleGeometry<D>,
    animation: Animation,
    clear_color: [f32; 4],
}

impl<D: Driver> Sample<D> for HelloVertices<D> {
    fn name() -> &'static str {
        NAME
    }

    fn usage() -> &'static str {
        USAGE
    }

    fn initialize(ctx: &GpuContext<D>, config: &SampleConfig) -> anyhow::Result<Self> {
        let program = load_program(ctx, config, "hello_vertices.vert", "hello_vertices.frag")?;
        let geometry = TriangleGeometry::upload(ctx, BufferUsage::DYNAMIC_DRAW)?;

        Ok(Self {
            program,
            geometry,
            animation: Animation::default(),
            clear_color: config.clear_color,
        })
    }

    fn update(&mut self, dt: Duration) {
        self.animation.step(SPEED * dt.as_secs_f32());
    }

    fn process_key(&mut self, key: KeyCode) {
        let animation = &mut self.animation;
        match key {
            KeyCode::KeyA => animation.animate_attenuation = !animation.animate_attenuation,
            KeyCode::KeyS => animation.animate_x = !animation.animate_x,
            KeyCode::KeyD => animation.animate_y = !animation.animate_y,
            other => log::warn!("{NAME} has no binding for {other:?}"),
        }
    }

    fn render(&mut self, ctx: &GpuContext<D>) -> anyhow::Result<()> {
        ctx.clear(self.clear_color)?;
        self.program
            .set_uniform_f32("attenuation", self.animation.attenuation)?;
        self.program.set_uniform_f32("x_offset", self.animation.x_offset)?;
        self.program.set_uniform_f32("y_offset", self.animation.y_offset)?;
        ctx.draw_arrays(&self.program, &self.geometry.vao, PrimitiveMode::Triangles)?;
        Ok(())
    }
}
