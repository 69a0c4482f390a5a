/*!
    RGB image sequence to elementary video stream pipeline.

    This crate composes the rawvid ecosystem into one encoder: packed
    RGBA-family images go in, a terminated elementary video bitstream comes
    out. Per frame it converts (packed RGB → planar YUV 4:2:0, resizing if
    needed), submits to the codec session, and writes any produced packet to
    the sink; `close` drains the codec and terminates the stream.

    # Usage

    ```ignore
    use rawvid_pipeline::EncoderPipeline;
    use rawvid_types::{CodecId, ImageFormat, ImageView};

    let mut output = Vec::new();
    let first = ImageView::packed(&pixels, 640, 480, ImageFormat::Rgba)?;

    // Encode dimensions are taken from the first image.
    let mut pipeline = EncoderPipeline::new(CodecId::Mpeg4, &first, &mut output)?;

    for image in images {
        pipeline.write_frame(&image)?;
    }

    // Flush buffered packets and append the stream terminator.
    pipeline.close()?;
    ```

    # Error policy

    Configuration errors (`CodecNotFound`, `InvalidDimensions`, `OpenFailed`)
    fail construction; no partial pipeline exists. Sink faults (`ShortWrite`,
    I/O errors) abort the current `write_frame` but leave the session open —
    the fault is in the sink, not the codec, and the next frame may be
    written. Per-frame codec failures are tolerated: the frame is dropped
    silently and counted; install an observer hook to be told about each one.

    # Output format

    A raw elementary stream: codec packets in production order followed by a
    fixed 4-byte end-of-sequence marker. No container.
*/

pub use rawvid_types::{
    CodecId, CodecProvider, Convert, EncoderConfig, Error, ImageFormat, ImageView, Packet, Pts,
    Rational, Result, VideoFrame,
};

pub use rawvid_convert::PixelConverter;
pub use rawvid_encode::{CodecSession, FfmpegCodec, SessionState};
pub use rawvid_sink::{END_OF_SEQUENCE, PacketSink};

mod pipeline;

pub use pipeline::EncoderPipeline;
