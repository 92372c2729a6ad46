use crate::gpu::{
    GpuContext, Handle,
    driver::Driver,
    error::{GpuError, GpuResult},
    object::{Object, ObjectKind},
};

/// The kind of texture a texture object is bound as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureTarget {
    Texture2D,
}

impl TextureTarget {
    pub fn to_gl(self) -> u32 {
        match self {
            Self::Texture2D => glow::TEXTURE_2D,
        }
    }
}

/// The internal (GPU-side) format of texture storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    R8,
    Rgb8,
    Rgba8,
    Rgba32F,
}

impl TextureFormat {
    pub fn to_gl(self) -> u32 {
        match self {
            Self::R8 => glow::R8,
            Self::Rgb8 => glow::RGB8,
            Self::Rgba8 => glow::RGBA8,
            Self::Rgba32F => glow::RGBA32F,
        }
    }
}

/// Channel layout of uploaded pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Red,
    Rgb,
    Rgba,
}

impl PixelFormat {
    pub fn to_gl(self) -> u32 {
        match self {
            Self::Red => glow::RED,
            Self::Rgb => glow::RGB,
            Self::Rgba => glow::RGBA,
        }
    }

    pub fn channels(self) -> usize {
        match self {
            Self::Red => 1,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// Scalar type of each channel of uploaded pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelType {
    UnsignedByte,
    Float,
}

impl PixelType {
    pub fn to_gl(self) -> u32 {
        match self {
            Self::UnsignedByte => glow::UNSIGNED_BYTE,
            Self::Float => glow::FLOAT,
        }
    }

    pub fn size_in_bytes(self) -> usize {
        match self {
            Self::UnsignedByte => 1,
            Self::Float => 4,
        }
    }
}

/// A rectangle of texels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// The region starting at the origin.
    pub fn whole(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

/// Allocated immutable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Storage {
    pub format: TextureFormat,
    pub width: u32,
    pub height: u32,
}

/// A texture object with immutable storage.
#[derive(Debug)]
pub struct Texture<D: Driver = glow::Context> {
    object: Object<D>,
    target: TextureTarget,
    storage: Option<Storage>,
}

impl<D: Driver> Texture<D> {
    /// Create a texture without storage.
    pub fn new(ctx: &GpuContext<D>, target: TextureTarget) -> GpuResult<Self> {
        let object = Object::create(ctx, ObjectKind::Texture)?;
        Ok(Self {
            object,
            target,
            storage: None,
        })
    }

    /// Create a 2D texture and upload an image into RGBA8 storage.
    pub fn from_image(ctx: &GpuContext<D>, img: &image::DynamicImage) -> GpuResult<Self> {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        let mut texture = Self::new(ctx, TextureTarget::Texture2D)?;
        texture.storage_2d(TextureFormat::Rgba8, width, height)?;
        texture.sub_image_2d(
            Region::whole(width, height),
            PixelFormat::Rgba,
            PixelType::UnsignedByte,
            &rgba,
        )?;
        Ok(texture)
    }

    /// Bind this texture to its target.
    pub fn bind(&self) -> GpuResult<()> {
        self.object
            .driver()
            .bind_texture(self.target, Some(self.handle()));
        self.context().bindings().texture_2d.set(Some(self.handle()));
        self.context().check("bind_texture")
    }

    /// Clear the binding of this texture's target.
    pub fn unbind(&self) -> GpuResult<()> {
        self.object.driver().bind_texture(self.target, None);
        self.context().bindings().texture_2d.set(None);
        self.context().check("unbind_texture")
    }

    /// Allocate single-level storage. Can only be done once.
    pub fn storage_2d(&mut self, format: TextureFormat, width: u32, height: u32) -> GpuResult<()> {
        if self.storage.is_some() {
            return Err(GpuError::StorageAlreadyAllocated(self.handle()));
        }
        if width == 0 || height == 0 {
            return Err(GpuError::InvalidDimensions { width, height });
        }

        self.bind()?;
        self.object
            .driver()
            .tex_storage_2d(self.target, format, width, height);
        self.context().check("tex_storage_2d")?;
        self.unbind()?;

        self.storage = Some(Storage {
            format,
            width,
            height,
        });
        Ok(())
    }

    /// Upload `pixels` into `region` of the allocated storage.
    pub fn sub_image_2d(
        &self,
        region: Region,
        format: PixelFormat,
        ty: PixelType,
        pixels: &[u8],
    ) -> GpuResult<()> {
        let storage = self
            .storage
            .ok_or(GpuError::StorageNotAllocated(self.handle()))?;

        let fits_x = region.x.checked_add(region.width).is_some_and(|end| end <= storage.width);
        let fits_y = region.y.checked_add(region.height).is_some_and(|end| end <= storage.height);
        if !(fits_x && fits_y) {
            return Err(GpuError::SubImageOutOfBounds {
                x: region.x,
                y: region.y,
                width: region.width,
                height: region.height,
                storage_width: storage.width,
                storage_height: storage.height,
            });
        }

        let expected = region.width as usize
            * region.height as usize
            * format.channels()
            * ty.size_in_bytes();
        if pixels.len() < expected {
            return Err(GpuError::PixelDataTooShort {
                expected,
                actual: pixels.len(),
            });
        }

        // `pixels` holds tightly packed rows
        self.bind()?;
        let driver = self.object.driver();
        driver.pixel_unpack_alignment(1);
        driver.tex_sub_image_2d(self.target, region, format, ty, &pixels[..expected]);
        self.context().check("tex_sub_image_2d")?;
        self.unbind()
    }

    pub fn storage(&self) -> Option<Storage> {
        self.storage
    }

    pub fn target(&self) -> TextureTarget {
        self.target
    }

    /// Get the driver handle.
    pub fn handle(&self) -> Handle {
        self.object.handle()
    }

    pub fn context(&self) -> &GpuContext<D> {
        self.object.context()
    }
}
