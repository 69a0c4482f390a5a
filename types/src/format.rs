/*!
    Input image formats and borrowed image views.
*/

use crate::error::{Error, Result};

/**
    Packed input pixel layouts.

    This is the subset of packed 32-bit layouts the pipeline knows about.
    The converter accepts the RGBA family ([`Rgba`](Self::Rgba) and
    [`Rgbx`](Self::Rgbx)); other layouts are rejected with
    [`Error::UnsupportedFormat`].
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ImageFormat {
    /// Packed RGBA, 32bpp, with an independent alpha channel.
    Rgba,
    /// Packed RGBX, 32bpp; the fourth byte is padding, not alpha.
    Rgbx,
    /// Packed BGRA, 32bpp.
    Bgra,
    /// Packed BGRX, 32bpp; the fourth byte is padding.
    Bgrx,
}

impl ImageFormat {
    /**
        Returns the number of bytes per pixel for this format.
    */
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba | Self::Rgbx | Self::Bgra | Self::Bgrx => 4,
        }
    }

    /**
        Returns true if the fourth byte carries an independent alpha channel.
    */
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::Rgba | Self::Bgra)
    }
}

/**
    A borrowed view of a packed-pixel image.

    This is the input interface of the pipeline: any producer that can expose
    width, height, a pixel layout, and a packed byte buffer with a known row
    stride can hand its images to the encoder without copying.
*/
#[derive(Clone, Copy, Debug)]
pub struct ImageView<'a> {
    width: u32,
    height: u32,
    stride: usize,
    format: ImageFormat,
    data: &'a [u8],
}

impl<'a> ImageView<'a> {
    /**
        Create a view over a packed pixel buffer with an explicit row stride.

        The stride is in bytes and must cover at least one row of pixels.
        Fails with [`Error::InvalidData`] if the buffer is too small for the
        described image.
    */
    pub fn new(
        data: &'a [u8],
        width: u32,
        height: u32,
        stride: usize,
        format: ImageFormat,
    ) -> Result<Self> {
        let row_bytes = width as usize * format.bytes_per_pixel();
        if stride < row_bytes {
            return Err(Error::InvalidData(format!(
                "stride {} is smaller than row size {}",
                stride, row_bytes
            )));
        }

        // The last row does not need trailing stride padding.
        let needed = match height as usize {
            0 => 0,
            h => stride * (h - 1) + row_bytes,
        };
        if data.len() < needed {
            return Err(Error::InvalidData(format!(
                "buffer holds {} bytes, image needs {}",
                data.len(),
                needed
            )));
        }

        Ok(Self {
            width,
            height,
            stride,
            format,
            data,
        })
    }

    /**
        Create a view over a tightly packed buffer (stride = width * bpp).
    */
    pub fn packed(data: &'a [u8], width: u32, height: u32, format: ImageFormat) -> Result<Self> {
        Self::new(
            data,
            width,
            height,
            width as usize * format.bytes_per_pixel(),
            format,
        )
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row stride in bytes.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Pixel layout of the buffer.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// The packed pixel data.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /**
        One row of pixel data, without stride padding.
    */
    pub fn row(&self, y: u32) -> &'a [u8] {
        let start = y as usize * self.stride;
        let row_bytes = self.width as usize * self.format.bytes_per_pixel();
        &self.data[start..start + row_bytes]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_format_bytes_per_pixel() {
        assert_eq!(ImageFormat::Rgba.bytes_per_pixel(), 4);
        assert_eq!(ImageFormat::Rgbx.bytes_per_pixel(), 4);
    }

    #[test]
    fn image_format_has_alpha() {
        assert!(ImageFormat::Rgba.has_alpha());
        assert!(ImageFormat::Bgra.has_alpha());
        assert!(!ImageFormat::Rgbx.has_alpha());
        assert!(!ImageFormat::Bgrx.has_alpha());
    }

    #[test]
    fn packed_view_accepts_exact_buffer() {
        let data = vec![0u8; 4 * 4 * 4];
        let view = ImageView::packed(&data, 4, 4, ImageFormat::Rgba).unwrap();
        assert_eq!(view.stride(), 16);
        assert_eq!(view.row(3).len(), 16);
    }

    #[test]
    fn view_rejects_short_buffer() {
        let data = vec![0u8; 10];
        let err = ImageView::packed(&data, 4, 4, ImageFormat::Rgba).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn view_rejects_undersized_stride() {
        let data = vec![0u8; 64];
        let err = ImageView::new(&data, 4, 4, 8, ImageFormat::Rgba).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn strided_view_reads_rows_at_stride_offsets() {
        // 2x2 image with 12-byte stride (4 bytes padding per row).
        let mut data = vec![0u8; 12 + 8];
        data[12] = 0xAA;
        let view = ImageView::new(&data, 2, 2, 12, ImageFormat::Rgba).unwrap();
        assert_eq!(view.row(1)[0], 0xAA);
    }
}
