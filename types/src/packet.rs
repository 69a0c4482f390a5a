/*!
    Compressed packet type.
*/

use crate::timing::Pts;

/**
    One unit of compressed output produced by the codec.

    A packet may cover zero or more submitted frames (codecs with lookahead
    buffer frames internally and emit packets later). The data buffer is
    owned: the codec backend copies it out of the codec's allocator and
    releases the codec-side packet before returning, so the codec never has
    more than one in-flight packet per session.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    /// Compressed bitstream data.
    pub data: Vec<u8>,
    /// Presentation timestamp, if the codec reported one.
    pub pts: Option<Pts>,
    /// Whether this packet starts a fully self-contained reference frame.
    pub is_keyframe: bool,
}

impl Packet {
    /**
        Create a new packet.
    */
    pub fn new(data: Vec<u8>, pts: Option<Pts>, is_keyframe: bool) -> Self {
        Self {
            data,
            pts,
            is_keyframe,
        }
    }

    /// Size of the compressed data in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the packet carries no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
