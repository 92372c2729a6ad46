use thiserror::Error;

use crate::gpu::{Handle, object::ObjectKind, shader::ShaderStage};
use crate::resources::ResourceError;

/// An error raised by the GL driver's error queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DriverError {
    #[error("invalid enum")]
    InvalidEnum,
    #[error("invalid value")]
    InvalidValue,
    #[error("invalid operation")]
    InvalidOperation,
    #[error("stack overflow")]
    StackOverflow,
    #[error("stack underflow")]
    StackUnderflow,
    #[error("out of memory")]
    OutOfMemory,
    #[error("invalid framebuffer operation")]
    InvalidFramebufferOperation,
    #[error("context lost")]
    ContextLost,
    #[error("unknown error code {0:#06x}")]
    Unknown(u32),
}

impl DriverError {
    /// Translate a raw error code. Returns `None` for `GL_NO_ERROR`.
    pub fn from_code(code: u32) -> Option<Self> {
        let error = match code {
            glow::NO_ERROR => return None,
            glow::INVALID_ENUM => Self::InvalidEnum,
            glow::INVALID_VALUE => Self::InvalidValue,
            glow::INVALID_OPERATION => Self::InvalidOperation,
            glow::STACK_OVERFLOW => Self::StackOverflow,
            glow::STACK_UNDERFLOW => Self::StackUnderflow,
            glow::OUT_OF_MEMORY => Self::OutOfMemory,
            glow::INVALID_FRAMEBUFFER_OPERATION => Self::InvalidFramebufferOperation,
            glow::CONTEXT_LOST => Self::ContextLost,
            other => Self::Unknown(other),
        };
        Some(error)
    }
}

/// An error from the GPU wrapper layer.
#[derive(Debug, Error)]
pub enum GpuError {
    #[error("Failed to allocate a {kind} object: {message}")]
    Allocation { kind: ObjectKind, message: String },
    #[error("{stage} shader failed to compile:\n{log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("Program failed to link:\n{log}")]
    Link { log: String },
    #[error("Program {0:?} is not linked yet")]
    NotLinked(Handle),
    #[error("Program {0:?} is already linked")]
    AlreadyLinked(Handle),
    #[error("Uniform `{name}` is not an active uniform of the program")]
    UniformNotFound { name: String },
    #[error("Vertex attributes take 1 to 4 components, got {0}")]
    InvalidComponentCount(i32),
    #[error("Texture {0:?} already has storage allocated")]
    StorageAlreadyAllocated(Handle),
    #[error("Texture {0:?} has no storage allocated")]
    StorageNotAllocated(Handle),
    #[error("Texture dimensions must be non-zero, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error(
        "Sub-image region {width}x{height} at ({x}, {y}) does not fit in storage of {storage_width}x{storage_height}"
    )]
    SubImageOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        storage_width: u32,
        storage_height: u32,
    },
    #[error("Pixel data holds {actual} bytes but the region needs {expected}")]
    PixelDataTooShort { expected: usize, actual: usize },
    #[error("Objects from two different rendering contexts were combined")]
    ContextMismatch,
    #[error("Cannot draw {0} vertices in one call")]
    TooManyVertices(usize),
    #[error("GL error after {operation}: {error}")]
    Driver {
        operation: &'static str,
        error: DriverError,
    },
    #[error("{0}")]
    Resource(#[from] ResourceError),
}

/// A result from the GPU wrapper layer.
pub type GpuResult<T> = Result<T, GpuError>;
