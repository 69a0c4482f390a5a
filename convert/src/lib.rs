/*!
    Packed RGB to planar YUV conversion for the rawvid crate ecosystem.

    This crate owns the scaler collaborator: it turns packed RGBA-family
    images into the planar YUV 4:2:0 frames the encoder consumes, resizing
    with bicubic interpolation when the input dimensions differ from the
    encode dimensions.

    ```ignore
    use rawvid_convert::PixelConverter;
    use rawvid_types::{Convert, ImageFormat, ImageView, VideoFrame};

    let mut converter = PixelConverter::new(640, 480)?;
    let mut frame = VideoFrame::new(640, 480);

    let image = ImageView::packed(&pixels, 640, 480, ImageFormat::Rgba)?;
    converter.convert(&image, &mut frame)?;
    ```
*/

pub use rawvid_types::{Convert, Error, ImageFormat, ImageView, Result, VideoFrame};

mod convert;

pub use convert::PixelConverter;
