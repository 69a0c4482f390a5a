/*!
    Encoder pipeline implementation.
*/

use std::io::Write;

use log::debug;

use rawvid_convert::PixelConverter;
use rawvid_encode::{CodecSession, FfmpegCodec, SessionState};
use rawvid_sink::PacketSink;
use rawvid_types::{
    CodecId, CodecProvider, Convert, EncoderConfig, Error, ImageView, Result, VideoFrame,
};

/**
    Encodes a sequence of packed RGB images into an elementary video stream.

    Owns the whole chain: pixel converter, codec session, one long-lived
    planar frame buffer, and the packet sink. The frame buffer is overwritten
    in place on every [`write_frame`](Self::write_frame) call, so callers
    must not expect prior frame contents to survive between calls.

    Dropping the pipeline without calling [`close`](Self::close) releases all
    codec resources but leaves the output stream unterminated.
*/
pub struct EncoderPipeline<W: Write> {
    converter: Box<dyn Convert>,
    session: CodecSession,
    frame: VideoFrame,
    sink: PacketSink<W>,
}

impl<W: Write> EncoderPipeline<W> {
    /**
        Create a pipeline encoding at the dimensions of the sample image.

        The sample is only measured, not encoded; pass it again through
        [`write_frame`](Self::write_frame) if it is part of the sequence.
        Fails with `InvalidDimensions` before any codec negotiation if its
        dimensions are odd.
    */
    pub fn new(codec: CodecId, sample: &ImageView<'_>, writer: W) -> Result<Self> {
        Self::with_config(
            codec,
            EncoderConfig::new(sample.width(), sample.height()),
            writer,
        )
    }

    /**
        Create a pipeline with an explicit encoder configuration.

        Input images whose dimensions differ from the configured encode
        dimensions are resized by the converter.
    */
    pub fn with_config(codec: CodecId, config: EncoderConfig, writer: W) -> Result<Self> {
        // Built first: converter construction validates the dimensions, so
        // bad geometry never reaches codec negotiation.
        let converter = PixelConverter::new(config.width, config.height)?;
        Self::open_with(&FfmpegCodec, Box::new(converter), codec, &config, writer)
    }

    /**
        Create a pipeline over explicit collaborator implementations.
    */
    pub fn open_with(
        provider: &dyn CodecProvider,
        converter: Box<dyn Convert>,
        codec: CodecId,
        config: &EncoderConfig,
        writer: W,
    ) -> Result<Self> {
        let session = CodecSession::open_with(provider, codec, config)?;
        let frame = VideoFrame::new(config.width, config.height);

        Ok(Self {
            converter,
            session,
            frame,
            sink: PacketSink::new(writer),
        })
    }

    /**
        Convert, encode, and write one image.

        "The codec buffered the frame and produced no packet" is a normal
        outcome, not an error. Sink faults propagate and leave the session
        open; the frame they interrupted is lost to the output but the next
        call may proceed.
    */
    pub fn write_frame(&mut self, image: &ImageView<'_>) -> Result<()> {
        self.converter.convert(image, &mut self.frame)?;

        if let Some(packet) = self.session.submit(&mut self.frame)? {
            self.sink.write(&packet)?;
        }

        Ok(())
    }

    /**
        Drain the codec, terminate the stream, and consume the pipeline.

        Buffered packets are flushed through the sink, then the fixed
        end-of-sequence marker is appended. Failures after the drain begins
        surface as `FinalizeFailed`; codec resources are released before the
        error is returned.
    */
    pub fn close(mut self) -> Result<()> {
        let packets = self.session.finish()?;
        debug!("closing stream after {} flushed packets", packets.len());

        for packet in &packets {
            self.sink
                .write(packet)
                .map_err(|e| Error::FinalizeFailed(e.to_string()))?;
        }

        self.sink.finish()
    }

    /// Lifecycle state of the codec session.
    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// Number of per-frame encode failures tolerated so far.
    pub fn encode_error_count(&self) -> u64 {
        self.session.encode_error_count()
    }

    /**
        Install an observer for tolerated per-frame encode failures.
    */
    pub fn set_encode_error_hook(&mut self, hook: impl FnMut(&Error) + 'static) {
        self.session.set_encode_error_hook(hook);
    }

    /// Total bytes accepted by the output writer so far.
    pub fn bytes_written(&self) -> u64 {
        self.sink.bytes_written()
    }
}

impl<W: Write> std::fmt::Debug for EncoderPipeline<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncoderPipeline")
            .field("frame", &self.frame)
            .field("session", &self.session)
            .field("bytes_written", &self.sink.bytes_written())
            .finish()
    }
}
