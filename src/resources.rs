use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::gpu::{GpuContext, driver::Driver, error::GpuResult, texture::Texture};

/// An error from loading a resource file.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),
}

/// Read a text file, e.g. shader source.
pub fn load_string(dir: &Path, file_name: &str) -> Result<String, ResourceError> {
    let path = dir.join(file_name);
    log::debug!("loading {path:?}");
    std::fs::read_to_string(&path).map_err(|source| ResourceError::Read { path, source })
}

/// Read a binary file.
pub fn load_binary(dir: &Path, file_name: &str) -> Result<Vec<u8>, ResourceError> {
    let path = dir.join(file_name);
    log::debug!("loading {path:?}");
    std::fs::read(&path).map_err(|source| ResourceError::Read { path, source })
}

/// Loads a texture from an image file.
pub fn load_texture<D: Driver>(
    gpu: &GpuContext<D>,
    dir: &Path,
    file_name: &str,
) -> GpuResult<Texture<D>> {
    let data = load_binary(dir, file_name)?;
    let img = image::load_from_memory(&data).map_err(ResourceError::from)?;
    Texture::from_image(gpu, &img)
}
