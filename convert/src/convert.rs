/*!
    Pixel converter implementation.
*/

use ffmpeg_next::{
    format::Pixel,
    software::scaling::{context::Context as ScalerContext, flag::Flags as ScalerFlags},
    util::frame::video::Video as VideoFrameFFmpeg,
};

use rawvid_types::{
    Convert, Error, ImageFormat, ImageView, Result, VideoFrame, validate_dimensions,
};

/**
    Converts packed RGBA-family images into planar YUV 4:2:0 frames.

    The conversion runs through FFmpeg's swscale with bicubic interpolation,
    resizing when the source dimensions differ from the configured encode
    dimensions. Output is written into the caller's persistent [`VideoFrame`]
    without reallocating it.

    The scaler context is lazily initialized on first use and reinitialized
    if the input dimensions or format change.
*/
pub struct PixelConverter {
    dst_width: u32,
    dst_height: u32,
    /// Cached scaler context and the input shape it was created for.
    scaler_state: Option<ScalerState>,
}

struct ScalerState {
    context: ScalerContext,
    src_width: u32,
    src_height: u32,
    src_format: ImageFormat,
}

impl PixelConverter {
    /**
        Create a converter targeting the given encode dimensions.

        Fails with [`Error::InvalidDimensions`] unless both are even and at
        least 2; no conversion resources are allocated here.
    */
    pub fn new(width: u32, height: u32) -> Result<Self> {
        validate_dimensions(width, height)?;

        Ok(Self {
            dst_width: width,
            dst_height: height,
            scaler_state: None,
        })
    }

    /// Target encode dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.dst_width, self.dst_height)
    }

    /**
        Initialize or reinitialize the scaler for the given input shape.
    */
    fn init_scaler(&mut self, src: &ImageView<'_>) -> Result<()> {
        let src_pixel = image_format_to_ffmpeg(src.format())?;

        let context = ScalerContext::get(
            src_pixel,
            src.width(),
            src.height(),
            Pixel::YUV420P,
            self.dst_width,
            self.dst_height,
            ScalerFlags::BICUBIC,
        )
        .map_err(|e| Error::UnsupportedFormat(format!("failed to create scaler: {}", e)))?;

        self.scaler_state = Some(ScalerState {
            context,
            src_width: src.width(),
            src_height: src.height(),
            src_format: src.format(),
        });

        Ok(())
    }

    /**
        Run the initialized scaler, writing into the destination planes.
    */
    fn scale_into(&mut self, src: &ImageView<'_>, dst: &mut VideoFrame) -> Result<()> {
        let state = match self.scaler_state.as_mut() {
            Some(state) => state,
            None => return Err(Error::InvalidData("scaler not initialized".into())),
        };

        // Stage the packed input in an FFmpeg frame, honoring the row stride.
        let src_pixel = image_format_to_ffmpeg(src.format())?;
        let mut src_frame = VideoFrameFFmpeg::new(src_pixel, src.width(), src.height());

        let frame_stride = src_frame.stride(0);
        let frame_data = src_frame.data_mut(0);
        for y in 0..src.height() {
            let row = src.row(y);
            let dst_start = y as usize * frame_stride;
            frame_data[dst_start..dst_start + row.len()].copy_from_slice(row);
        }

        let mut dst_frame = VideoFrameFFmpeg::new(Pixel::YUV420P, self.dst_width, self.dst_height);

        state
            .context
            .run(&src_frame, &mut dst_frame)
            .map_err(|e| Error::InvalidData(format!("pixel conversion failed: {}", e)))?;

        // Unpad each plane into the frame's contiguous layout.
        for plane in 0..3 {
            let src_stride = dst_frame.stride(plane);
            let src_data = dst_frame.data(plane);
            let row_bytes = dst.stride(plane);
            let rows = dst.rows(plane);
            let dst_plane = dst.plane_mut(plane);

            for y in 0..rows {
                let src_start = y * src_stride;
                let dst_start = y * row_bytes;
                dst_plane[dst_start..dst_start + row_bytes]
                    .copy_from_slice(&src_data[src_start..src_start + row_bytes]);
            }
        }

        Ok(())
    }
}

impl Convert for PixelConverter {
    /**
        Convert `src` into `dst`, overwriting the destination planes.

        The input layout is checked before any scaler work, so unsupported
        formats fail with [`Error::UnsupportedFormat`] without touching
        FFmpeg.
    */
    fn convert(&mut self, src: &ImageView<'_>, dst: &mut VideoFrame) -> Result<()> {
        image_format_to_ffmpeg(src.format())?;

        if src.width() == 0 || src.height() == 0 {
            return Err(Error::InvalidData("input image has zero dimensions".into()));
        }

        if dst.width() != self.dst_width || dst.height() != self.dst_height {
            return Err(Error::InvalidData(format!(
                "frame dimensions {}x{} don't match converter {}x{}",
                dst.width(),
                dst.height(),
                self.dst_width,
                self.dst_height
            )));
        }

        let needs_init = match &self.scaler_state {
            None => true,
            Some(state) => {
                state.src_width != src.width()
                    || state.src_height != src.height()
                    || state.src_format != src.format()
            }
        };

        if needs_init {
            self.init_scaler(src)?;
        }

        self.scale_into(src, dst)
    }
}

/**
    Map an input layout to FFmpeg's pixel format.

    Only the packed RGBA family is accepted. The no-alpha variant maps to the
    same scaler input as RGBA: the fourth byte is discarded by the YUV
    conversion either way.
*/
fn image_format_to_ffmpeg(format: ImageFormat) -> Result<Pixel> {
    match format {
        ImageFormat::Rgba | ImageFormat::Rgbx => Ok(Pixel::RGBA),
        other => Err(Error::UnsupportedFormat(format!(
            "input layout {:?} not supported, expected packed RGBA",
            other
        ))),
    }
}

impl std::fmt::Debug for PixelConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelConverter")
            .field("dst_width", &self.dst_width)
            .field("dst_height", &self.dst_height)
            .field("initialized", &self.scaler_state.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_dimensions_are_rejected_at_construction() {
        let err = PixelConverter::new(639, 480).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidDimensions {
                width: 639,
                height: 480
            }
        ));

        assert!(PixelConverter::new(640, 479).is_err());
        assert!(PixelConverter::new(0, 480).is_err());
    }

    #[test]
    fn even_dimensions_construct_without_scaler_work() {
        let converter = PixelConverter::new(640, 480).unwrap();
        assert_eq!(converter.dimensions(), (640, 480));
    }

    #[test]
    fn bgra_input_is_unsupported() {
        let mut converter = PixelConverter::new(4, 4).unwrap();
        let data = vec![0u8; 4 * 4 * 4];
        let image = ImageView::packed(&data, 4, 4, ImageFormat::Bgra).unwrap();
        let mut frame = VideoFrame::new(4, 4);

        let err = converter.convert(&image, &mut frame).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn mismatched_destination_frame_is_rejected() {
        let mut converter = PixelConverter::new(640, 480).unwrap();
        let data = vec![0u8; 4 * 4 * 4];
        let image = ImageView::packed(&data, 4, 4, ImageFormat::Rgba).unwrap();
        let mut frame = VideoFrame::new(320, 240);

        let err = converter.convert(&image, &mut frame).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }
}
