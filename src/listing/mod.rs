pub mod hello_texture;
pub mod hello_triangle;
pub mod hello_vertices;

use std::time::Duration;

use anyhow::Context;
use winit::keyboard::KeyCode;

use crate::config::SampleConfig;
use crate::gpu::{GpuContext, driver::Driver, program::Program};
use crate::resources;

pub use hello_texture::HelloTexture;
pub use hello_triangle::HelloTriangle;
pub use hello_vertices::HelloVertices;

/// Every listing, as (name, usage).
pub const LISTINGS: &[(&str, &str)] = &[
    (hello_triangle::NAME, hello_triangle::USAGE),
    (hello_vertices::NAME, hello_vertices::USAGE),
    (hello_texture::NAME, hello_texture::USAGE),
];

/// A self-contained sample program driven by the host window's event loop.
///
/// The host calls `initialize` once with a current context, then `update` and
/// `render` once per frame.
pub trait Sample<D: Driver = glow::Context>: Sized {
    fn name() -> &'static str;

    fn usage() -> &'static str;

    fn config() -> SampleConfig {
        SampleConfig {
            title: Self::name().to_string(),
            ..SampleConfig::default()
        }
    }

    fn initialize(ctx: &GpuContext<D>, config: &SampleConfig) -> anyhow::Result<Self>;

    fn update(&mut self, _dt: Duration) {}

    fn process_key(&mut self, key: KeyCode) {
        log::warn!("{} has no binding for {key:?}", Self::name());
    }

    fn render(&mut self, ctx: &GpuContext<D>) -> anyhow::Result<()>;
}

/// Run the listing called `name` until its window closes.
pub fn run(name: &str) -> anyhow::Result<()> {
    match name {
        hello_triangle::NAME => crate::app::run::<HelloTriangle>(),
        hello_vertices::NAME => crate::app::run::<HelloVertices>(),
        hello_texture::NAME => crate::app::run::<HelloTexture>(),
        other => anyhow::bail!("unknown listing `{other}`, see --list"),
    }
}

/// Read a vertex/fragment source pair from the shader directory and link it.
pub(crate) fn load_program<D: Driver>(
    ctx: &GpuContext<D>,
    config: &SampleConfig,
    vertex_file: &str,
    fragment_file: &str,
) -> anyhow::Result<Program<D>> {
    let vertex_source = resources::load_string(&config.shader_dir, vertex_file)?;
    let fragment_source = resources::load_string(&config.shader_dir, fragment_file)?;
    Program::from_sources(ctx, &vertex_source, &fragment_source)
        .with_context(|| format!("building program from {vertex_file} and {fragment_file}"))
}
