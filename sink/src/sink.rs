/*!
    Packet sink implementation.
*/

use std::io::Write;

use rawvid_types::{Error, Packet, Result};

/**
    Stream termination marker appended by [`PacketSink::finish`].

    This is the MPEG-4 end-of-sequence start code. The pipeline has always
    appended it regardless of which codec produced the stream — a quirk kept
    for byte-for-byte output compatibility, not a cross-codec requirement.
*/
pub const END_OF_SEQUENCE: [u8; 4] = [0x00, 0x00, 0x01, 0xB7];

/**
    Writes encoded packets through to a byte sink.

    Packets must land in the stream atomically to keep the bitstream
    parseable downstream, so a write is attempted exactly once and a partial
    acceptance surfaces as [`Error::ShortWrite`] instead of being retried.

    [`finish`](Self::finish) consumes the sink, appends the end-of-sequence
    marker, and flushes; a finished sink cannot be written to again.
*/
pub struct PacketSink<W: Write> {
    writer: W,
    bytes_written: u64,
}

impl<W: Write> PacketSink<W> {
    /**
        Create a sink over the given writer.
    */
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            bytes_written: 0,
        }
    }

    /**
        Write one packet, returning the number of bytes written.

        Fails with [`Error::ShortWrite`] if the writer accepts fewer bytes
        than the packet size; I/O errors propagate as [`Error::Io`].
    */
    pub fn write(&mut self, packet: &Packet) -> Result<usize> {
        if packet.is_empty() {
            return Ok(0);
        }

        let written = self.writer.write(&packet.data)?;
        self.bytes_written += written as u64;

        if written < packet.len() {
            return Err(Error::ShortWrite {
                expected: packet.len(),
                written,
            });
        }

        Ok(written)
    }

    /**
        Terminate the stream: append the end-of-sequence marker and flush.

        Failures here are [`Error::FinalizeFailed`] — the stream is left
        without a valid terminator and cannot be repaired by retrying.
    */
    pub fn finish(mut self) -> Result<()> {
        let written = self
            .writer
            .write(&END_OF_SEQUENCE)
            .map_err(|e| Error::FinalizeFailed(format!("trailer write failed: {}", e)))?;
        self.bytes_written += written as u64;

        if written != END_OF_SEQUENCE.len() {
            return Err(Error::FinalizeFailed(format!(
                "trailer truncated, wrote {} of {} bytes",
                written,
                END_OF_SEQUENCE.len()
            )));
        }

        self.writer
            .flush()
            .map_err(|e| Error::FinalizeFailed(format!("flush failed: {}", e)))?;

        Ok(())
    }

    /// Total bytes accepted by the writer so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Shared access to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }
}

impl<W: Write> std::fmt::Debug for PacketSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketSink")
            .field("bytes_written", &self.bytes_written)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io;

    fn packet(data: &[u8]) -> Packet {
        Packet::new(data.to_vec(), None, false)
    }

    /// Writer that accepts only half of the first write, then cooperates.
    struct HalfWriter {
        inner: Vec<u8>,
        choke_next: bool,
    }

    impl io::Write for HalfWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let take = if self.choke_next {
                self.choke_next = false;
                buf.len() / 2
            } else {
                buf.len()
            };
            self.inner.extend_from_slice(&buf[..take]);
            Ok(take)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writes_pass_through_and_are_counted() {
        let mut sink = PacketSink::new(Vec::new());
        assert_eq!(sink.write(&packet(&[1, 2, 3, 4])).unwrap(), 4);
        assert_eq!(sink.write(&packet(&[5, 6])).unwrap(), 2);
        assert_eq!(sink.bytes_written(), 6);
        assert_eq!(sink.get_ref().as_slice(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn empty_packets_touch_nothing() {
        let mut sink = PacketSink::new(Vec::new());
        assert_eq!(sink.write(&packet(&[])).unwrap(), 0);
        assert_eq!(sink.bytes_written(), 0);
    }

    #[test]
    fn partial_acceptance_is_a_short_write() {
        let writer = HalfWriter {
            inner: Vec::new(),
            choke_next: true,
        };
        let mut sink = PacketSink::new(writer);

        let err = sink.write(&packet(&[1, 2, 3, 4, 5, 6])).unwrap_err();
        assert!(matches!(
            err,
            Error::ShortWrite {
                expected: 6,
                written: 3
            }
        ));

        // The sink itself remains usable; the fault was in the writer.
        assert_eq!(sink.write(&packet(&[7, 8])).unwrap(), 2);
    }

    #[test]
    fn finish_appends_the_trailer_once() {
        let mut buf = Vec::new();
        let mut sink = PacketSink::new(&mut buf);
        sink.write(&packet(&[0xAA, 0xBB])).unwrap();
        sink.finish().unwrap();

        assert_eq!(buf, vec![0xAA, 0xBB, 0x00, 0x00, 0x01, 0xB7]);
    }

    #[test]
    fn truncated_trailer_fails_finalization() {
        let writer = HalfWriter {
            inner: Vec::new(),
            choke_next: true,
        };
        let sink = PacketSink::new(writer);

        let err = sink.finish().unwrap_err();
        assert!(matches!(err, Error::FinalizeFailed(_)));
    }
}
