/*!
    Shared types for the rawvid crate ecosystem.

    This crate defines the vocabulary of the ecosystem — the types that cross
    crate boundaries — plus the capability traits through which the pipeline
    reaches its external collaborators (codec and scaler). It has no
    dependency on FFmpeg, so consumers can depend on it without pulling in
    FFmpeg bindings, and test doubles can implement the collaborator traits
    without touching a real codec.
*/

mod codec;
mod config;
mod error;
mod format;
mod frame;
mod packet;
mod timing;

pub use codec::{CodecContext, CodecId, CodecProvider, Convert};
pub use config::{EncoderConfig, validate_dimensions};
pub use error::{Error, Result};
pub use format::{ImageFormat, ImageView};
pub use frame::VideoFrame;
pub use packet::Packet;
pub use timing::{Pts, Rational};
