/*!
    Elementary stream output for the rawvid crate ecosystem.

    Takes encoded packets and writes them to a byte sink as a raw elementary
    stream: packets in production order, terminated by a fixed end-of-sequence
    marker. There is no container — no length prefixing and no embedded
    timestamps beyond what the codec's own bitstream syntax carries.
*/

pub use rawvid_types::{Error, Packet, Result};

mod sink;

pub use sink::{END_OF_SEQUENCE, PacketSink};
