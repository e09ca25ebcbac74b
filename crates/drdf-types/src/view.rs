use std::marker::PhantomData;

use crate::error::TypeError;
use crate::format::ImageFormat;
use crate::pixel::Pixel;

/// Byte offset of pixel (`x`, `y`) for a record type of `stride` bytes.
fn offset(format: &ImageFormat, x: u32, y: u32, stride: usize) -> Result<usize, TypeError> {
    let width = u32::from(format.size_x);
    let height = u32::from(format.size_y);
    if x >= width || y >= height {
        return Err(TypeError::PixelOutOfRange {
            x,
            y,
            width,
            height,
        });
    }
    Ok((x as usize + y as usize * width as usize) * stride)
}

/// Read-only typed view over an image's pixel buffer.
///
/// Obtained through [`Image::view`](crate::Image::view), which has already
/// checked that `P` matches the stored pixel type.
#[derive(Debug)]
pub struct ImageView<'a, P> {
    format: &'a ImageFormat,
    bytes: &'a [u8],
    _pixel: PhantomData<P>,
}

impl<'a, P: Pixel> ImageView<'a, P> {
    pub(crate) fn new(format: &'a ImageFormat, bytes: &'a [u8]) -> Self {
        Self {
            format,
            bytes,
            _pixel: PhantomData,
        }
    }

    pub fn width(&self) -> u32 {
        u32::from(self.format.size_x)
    }

    pub fn height(&self) -> u32 {
        u32::from(self.format.size_y)
    }

    /// The pixel at (`x`, `y`), row 0 at the top.
    pub fn get(&self, x: u32, y: u32) -> Result<P, TypeError> {
        let stride = P::TYPE.byte_size();
        let at = offset(self.format, x, y, stride)?;
        Ok(P::read_le(&self.bytes[at..at + stride]))
    }

    /// All pixels in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = P> + 'a {
        self.bytes.chunks_exact(P::TYPE.byte_size()).map(P::read_le)
    }
}

/// Mutable typed view over an image's pixel buffer.
#[derive(Debug)]
pub struct ImageViewMut<'a, P> {
    format: &'a ImageFormat,
    bytes: &'a mut [u8],
    _pixel: PhantomData<P>,
}

impl<'a, P: Pixel> ImageViewMut<'a, P> {
    pub(crate) fn new(format: &'a ImageFormat, bytes: &'a mut [u8]) -> Self {
        Self {
            format,
            bytes,
            _pixel: PhantomData,
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Result<P, TypeError> {
        let stride = P::TYPE.byte_size();
        let at = offset(self.format, x, y, stride)?;
        Ok(P::read_le(&self.bytes[at..at + stride]))
    }

    /// Overwrite the pixel at (`x`, `y`).
    pub fn set(&mut self, x: u32, y: u32, pixel: P) -> Result<(), TypeError> {
        let stride = P::TYPE.byte_size();
        let at = offset(self.format, x, y, stride)?;
        pixel.write_le(&mut self.bytes[at..at + stride]);
        Ok(())
    }

    /// Overwrite every pixel with `pixel`.
    pub fn fill(&mut self, pixel: P) {
        for out in self.bytes.chunks_exact_mut(P::TYPE.byte_size()) {
            pixel.write_le(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::pixel::{PixelAu16, PixelAu8Tu8, PixelType};
    use crate::{Image, ImageFormat};

    #[test]
    fn iter_yields_row_major() {
        let img = Image::from_bytes(ImageFormat::new(2, 2, PixelType::Au8Tu8), &[1, 10, 2, 20, 3, 30, 4, 40])
            .unwrap();
        let view = img.view::<PixelAu8Tu8>().unwrap();
        let amps: Vec<u8> = view.iter().map(|p| p.amplitude).collect();
        assert_eq!(amps, vec![1, 2, 3, 4]);
        assert_eq!(view.get(1, 1).unwrap().time, 40);
    }

    #[test]
    fn fill_and_get() {
        let mut img = Image::new(ImageFormat::new(3, 3, PixelType::Au16));
        let mut view = img.view_mut::<PixelAu16>().unwrap();
        view.fill(PixelAu16 { amplitude: 7 });
        assert_eq!(view.get(2, 2).unwrap().amplitude, 7);
        assert!(view.set(3, 0, PixelAu16::default()).is_err());
        assert_eq!(img.amplitude_sum(), 63.0);
    }

    #[test]
    fn empty_image_views_are_always_out_of_range() {
        let img = Image::default();
        let view = img.view::<crate::pixel::PixelAu8>().unwrap();
        assert!(view.get(0, 0).is_err());
        assert_eq!(view.iter().count(), 0);
    }
}
