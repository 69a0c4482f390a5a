/*!
    Codec session management for the rawvid crate ecosystem.

    This crate owns the codec collaborator: it negotiates and configures an
    encoder, submits frames with monotonically increasing timestamps, and
    drains buffered packets at shutdown.

    ```ignore
    use rawvid_encode::CodecSession;
    use rawvid_types::{CodecId, EncoderConfig};

    let config = EncoderConfig::new(640, 480);
    let mut session = CodecSession::open(CodecId::Mpeg4, &config)?;

    for frame in frames {
        if let Some(packet) = session.submit(frame)? {
            // Write to the packet sink
        }
    }

    // Drain buffered packets; the codec context is released here.
    let remaining = session.finish()?;
    ```

    The session reaches the codec through the [`CodecProvider`] capability
    trait; [`FfmpegCodec`] is the production implementation.
*/

pub use rawvid_types::{
    CodecContext, CodecId, CodecProvider, EncoderConfig, Error, Packet, Pts, Result, VideoFrame,
};

mod backend;
mod session;

pub use backend::FfmpegCodec;
pub use session::{CodecSession, SessionState};
