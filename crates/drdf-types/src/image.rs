use crate::error::TypeError;
use crate::format::ImageFormat;
use crate::pixel::{
    Pixel, PixelAf32Tf32, PixelAu16, PixelAu16Tu16, PixelAu8, PixelAu8Tu8, PixelType,
};
use crate::view::{ImageView, ImageViewMut};

/// A 2D pixel array read out from one sensor.
///
/// The image exclusively owns its pixel buffer, whose length always equals
/// `format().size()`. `clone()` deep-copies the buffer; [`Image::take`]
/// moves it out and leaves an empty image behind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Image {
    format: ImageFormat,
    pixels: Vec<u8>,
}

impl Image {
    /// A zero-filled image with the given format.
    pub fn new(format: ImageFormat) -> Self {
        Self {
            format,
            pixels: vec![0; format.size()],
        }
    }

    /// Copy `pixels` verbatim into a new image.
    pub fn from_bytes(format: ImageFormat, pixels: &[u8]) -> Result<Self, TypeError> {
        Self::from_vec(format, pixels.to_vec())
    }

    /// Take ownership of an already-encoded pixel buffer.
    pub fn from_vec(format: ImageFormat, pixels: Vec<u8>) -> Result<Self, TypeError> {
        if pixels.len() != format.size() {
            return Err(TypeError::InvalidLength {
                expected: format.size(),
                actual: pixels.len(),
            });
        }
        Ok(Self { format, pixels })
    }

    /// Build a `width` x `height` image from typed records in row-major order.
    pub fn from_pixels<P: Pixel>(width: u16, height: u16, pixels: &[P]) -> Result<Self, TypeError> {
        let mut image = Self::new(ImageFormat::new(width, height, P::TYPE));
        if pixels.len() != image.format.pixel_count() {
            return Err(TypeError::InvalidLength {
                expected: image.format.pixel_count(),
                actual: pixels.len(),
            });
        }
        let stride = P::TYPE.byte_size();
        for (px, out) in pixels.iter().zip(image.pixels.chunks_exact_mut(stride)) {
            px.write_le(out);
        }
        Ok(image)
    }

    pub fn format(&self) -> &ImageFormat {
        &self.format
    }

    pub fn width(&self) -> u32 {
        u32::from(self.format.size_x)
    }

    pub fn height(&self) -> u32 {
        u32::from(self.format.size_y)
    }

    pub fn pixel_type(&self) -> PixelType {
        self.format.pixel_type
    }

    /// Byte length of the pixel buffer.
    pub fn size(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// The raw pixel buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable access to the raw pixel buffer. Its length cannot change.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Move the contents out, leaving this image with the empty format and
    /// no pixels.
    pub fn take(&mut self) -> Image {
        std::mem::take(self)
    }

    /// Typed read-only view. Fails unless `P` matches the stored pixel type.
    pub fn view<P: Pixel>(&self) -> Result<ImageView<'_, P>, TypeError> {
        self.check_type::<P>()?;
        Ok(ImageView::new(&self.format, &self.pixels))
    }

    /// Typed mutable view. Fails unless `P` matches the stored pixel type.
    pub fn view_mut<P: Pixel>(&mut self) -> Result<ImageViewMut<'_, P>, TypeError> {
        self.check_type::<P>()?;
        Ok(ImageViewMut::new(&self.format, &mut self.pixels))
    }

    /// Read a single pixel at (`x`, `y`), row 0 being the top of the image.
    pub fn pixel<P: Pixel>(&self, x: u32, y: u32) -> Result<P, TypeError> {
        self.view::<P>()?.get(x, y)
    }

    /// Sum of the amplitude of every pixel, whatever the pixel type.
    pub fn amplitude_sum(&self) -> f64 {
        fn sum<P: Pixel>(image: &Image) -> f64 {
            image
                .pixels
                .chunks_exact(P::TYPE.byte_size())
                .map(|b| P::read_le(b).amplitude())
                .sum()
        }
        match self.format.pixel_type {
            PixelType::Au8 => sum::<PixelAu8>(self),
            PixelType::Au8Tu8 => sum::<PixelAu8Tu8>(self),
            PixelType::Au16 => sum::<PixelAu16>(self),
            PixelType::Au16Tu16 => sum::<PixelAu16Tu16>(self),
            PixelType::Af32Tf32 => sum::<PixelAf32Tf32>(self),
        }
    }

    fn check_type<P: Pixel>(&self) -> Result<(), TypeError> {
        if P::TYPE != self.format.pixel_type {
            return Err(TypeError::PixelTypeMismatch {
                stored: self.format.pixel_type,
                requested: P::TYPE,
            });
        }
        Ok(())
    }
}
