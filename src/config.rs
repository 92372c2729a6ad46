use std::path::PathBuf;

/// Environment variable that overrides where shader sources are read from.
pub const SHADER_DIR_ENV: &str = "GL_LISTINGS_SHADER_DIR";

/// Window and renderer settings for a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
    pub vsync: bool,
    pub clear_color: [f32; 4],
    /// Requested core profile version, (major, minor).
    pub gl_version: (u8, u8),
    pub shader_dir: PathBuf,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            title: "gl_listings".to_string(),
            width: 800,
            height: 600,
            resizable: false,
            vsync: true,
            clear_color: [0.4, 0.5, 0.6, 1.0],
            gl_version: (4, 6),
            shader_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("shaders"),
        }
    }
}

impl SampleConfig {
    /// Apply overrides from the environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_shader_dir_override(std::env::var_os(SHADER_DIR_ENV).map(PathBuf::from))
    }

    fn with_shader_dir_override(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            log::info!("reading shaders from {dir:?}");
            self.shader_dir = dir;
        }
        self
    }
}
