/*!
    Codec identifiers and the capability traits for external collaborators.

    The pipeline never talks to a codec library directly: it goes through
    [`CodecProvider`] / [`CodecContext`] for encoding and [`Convert`] for
    pixel conversion. The production implementations wrap FFmpeg; tests
    substitute scripted doubles.
*/

use crate::config::EncoderConfig;
use crate::error::Result;
use crate::format::ImageView;
use crate::frame::VideoFrame;
use crate::packet::Packet;

/**
    Identifies a compression algorithm.

    Immutable once an encoding session starts.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CodecId {
    /// MPEG-4 part 2.
    Mpeg4,
    /// VP8.
    Vp8,
}

/**
    An open encoder context owned by one codec session.

    Closing the context is `Drop`: releasing the value releases the codec
    resources, on every exit path.
*/
pub trait CodecContext {
    /**
        Submit a frame for encoding, or request a flush packet with `None`.

        Returns `Ok(Some(packet))` when the codec produced output and
        `Ok(None)` when it buffered the input (or, during flushing, when no
        more output is pending). Repeatedly calling with `None` drains the
        codec: once it returns `Ok(None)` the stream is complete.
    */
    fn encode(&mut self, frame: Option<&VideoFrame>) -> Result<Option<Packet>>;
}

/**
    Capability interface over the external codec library.

    Looks up a codec by identifier and opens an encoder context for it,
    combining the library's find and open steps: an unknown identifier is
    `Error::CodecNotFound`, a rejected configuration is `Error::OpenFailed`.
*/
pub trait CodecProvider {
    /**
        Open an encoder context for the given codec and configuration.
    */
    fn open(&self, codec: CodecId, config: &EncoderConfig) -> Result<Box<dyn CodecContext>>;
}

/**
    Capability interface over the external pixel conversion routine.

    Converts a packed input image into the planar layout of the destination
    frame, resizing if the dimensions differ. The destination is caller-owned
    and reused across calls.
*/
pub trait Convert {
    /**
        Convert `src` into `dst`, overwriting the destination planes.
    */
    fn convert(&mut self, src: &ImageView<'_>, dst: &mut VideoFrame) -> Result<()>;
}
