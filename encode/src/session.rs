/*!
    Codec session state machine.
*/

use log::{debug, warn};

use rawvid_types::{
    CodecContext, CodecId, CodecProvider, EncoderConfig, Error, Packet, Pts, Result, VideoFrame,
};

use crate::backend::FfmpegCodec;

/**
    Where a session is in its lifecycle.

    A session moves `Open` → `Draining` → `Closed`; no operation except
    destruction is valid once it is `Closed`.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Accepting frame submissions.
    Open,
    /// Flushing buffered packets out of the codec.
    Draining,
    /// Codec resources released; the session is spent.
    Closed,
}

type EncodeErrorHook = Box<dyn FnMut(&Error)>;

/**
    One encoding session over an open codec context.

    Owns codec negotiation, frame submission, packet retrieval, and the
    drain sequencing at shutdown. Each submitted frame is stamped with a
    zero-based, gapless presentation timestamp.

    Per-frame codec failures do not close the session: the frame is dropped,
    an error counter increments, and an optional observer hook fires. This
    matches the long-standing behavior of the pipeline; callers that care
    can watch [`encode_error_count`](Self::encode_error_count) or install a
    hook.

    The codec context is released when the session is finished or dropped,
    whichever comes first.
*/
pub struct CodecSession {
    context: Option<Box<dyn CodecContext>>,
    state: SessionState,
    submitted: i64,
    encode_errors: u64,
    on_encode_error: Option<EncodeErrorHook>,
}

impl CodecSession {
    /**
        Open a session with the FFmpeg codec backend.

        Fails with `CodecNotFound` if the codec is unavailable,
        `InvalidDimensions` for odd or degenerate dimensions (checked before
        any codec negotiation), or `OpenFailed` if the codec rejects the
        configuration.
    */
    pub fn open(codec: CodecId, config: &EncoderConfig) -> Result<Self> {
        Self::open_with(&FfmpegCodec, codec, config)
    }

    /**
        Open a session through an arbitrary codec provider.
    */
    pub fn open_with(
        provider: &dyn CodecProvider,
        codec: CodecId,
        config: &EncoderConfig,
    ) -> Result<Self> {
        config.validate()?;

        debug!("encoder dimensions: {}x{}", config.width, config.height);
        let context = provider.open(codec, config)?;

        Ok(Self {
            context: Some(context),
            state: SessionState::Open,
            submitted: 0,
            encode_errors: 0,
            on_encode_error: None,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Number of frames submitted so far.
    pub fn frames_submitted(&self) -> i64 {
        self.submitted
    }

    /// Number of per-frame encode failures tolerated so far.
    pub fn encode_error_count(&self) -> u64 {
        self.encode_errors
    }

    /**
        Install an observer for tolerated per-frame encode failures.
    */
    pub fn set_encode_error_hook(&mut self, hook: impl FnMut(&Error) + 'static) {
        self.on_encode_error = Some(Box::new(hook));
    }

    /**
        Submit a frame for encoding.

        Stamps the frame with the next presentation timestamp (equal to the
        number of frames submitted so far, zero-based) and hands it to the
        codec. `Ok(None)` means the codec buffered the frame without
        producing output, which is normal for codecs with lookahead.

        A codec failure on an individual frame is tolerated: the frame is
        dropped and the session stays open.
    */
    pub fn submit(&mut self, frame: &mut VideoFrame) -> Result<Option<Packet>> {
        if self.state != SessionState::Open || self.context.is_none() {
            return Err(Error::SessionClosed);
        }

        frame.set_pts(Pts(self.submitted));
        self.submitted += 1;

        let result = match self.context.as_mut() {
            Some(context) => context.encode(Some(frame)),
            None => return Err(Error::SessionClosed),
        };

        match result {
            Ok(packet) => Ok(packet),
            Err(err @ Error::EncodeFailed(_)) => {
                self.encode_errors += 1;
                warn!("dropping frame {}: {}", self.submitted - 1, err);
                if let Some(hook) = self.on_encode_error.as_mut() {
                    hook(&err);
                }
                Ok(None)
            }
            Err(other) => Err(other),
        }
    }

    /**
        Drain the codec and close the session.

        Repeatedly requests flush packets until the codec reports no more
        output pending and returns them in production order. Codec errors
        during the drain end it early rather than failing it. The codec
        context is released on every exit path; afterwards the session is
        `Closed` and further calls fail fast with `SessionClosed`.
    */
    pub fn finish(&mut self) -> Result<Vec<Packet>> {
        if self.state != SessionState::Open {
            return Err(Error::SessionClosed);
        }
        self.state = SessionState::Draining;

        // Moving the context out ties its release to this scope even if the
        // drain ends early.
        let mut context = self.context.take().ok_or(Error::SessionClosed)?;

        let mut packets = Vec::new();
        loop {
            match context.encode(None) {
                Ok(Some(packet)) => packets.push(packet),
                Ok(None) => break,
                Err(e) => {
                    debug!("codec error while draining, ending flush: {}", e);
                    break;
                }
            }
        }

        self.state = SessionState::Closed;
        debug!("drained {} buffered packets", packets.len());
        Ok(packets)
    }
}

impl std::fmt::Debug for CodecSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecSession")
            .field("state", &self.state)
            .field("submitted", &self.submitted)
            .field("encode_errors", &self.encode_errors)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    /// Scripted codec double: buffers `delay` frames before emitting, fails
    /// every `fail_every`-th submission when set.
    struct FakeContext {
        delay: usize,
        fail_every: Option<usize>,
        queue: VecDeque<i64>,
        calls: usize,
        released: Rc<Cell<bool>>,
    }

    impl Drop for FakeContext {
        fn drop(&mut self) {
            self.released.set(true);
        }
    }

    fn packet_for(pts: i64) -> Packet {
        Packet::new(pts.to_le_bytes().to_vec(), Some(Pts(pts)), pts % 10 == 0)
    }

    impl CodecContext for FakeContext {
        fn encode(&mut self, frame: Option<&VideoFrame>) -> Result<Option<Packet>> {
            match frame {
                Some(frame) => {
                    self.calls += 1;
                    if let Some(n) = self.fail_every {
                        if self.calls % n == 0 {
                            return Err(Error::EncodeFailed("scripted failure".into()));
                        }
                    }
                    let pts = frame.pts().expect("session must stamp pts").0;
                    self.queue.push_back(pts);
                    if self.queue.len() > self.delay {
                        Ok(self.queue.pop_front().map(packet_for))
                    } else {
                        Ok(None)
                    }
                }
                None => Ok(self.queue.pop_front().map(packet_for)),
            }
        }
    }

    struct FakeProvider {
        delay: usize,
        fail_every: Option<usize>,
        open_calls: Cell<usize>,
        released: Rc<Cell<bool>>,
    }

    impl FakeProvider {
        fn new(delay: usize) -> Self {
            Self {
                delay,
                fail_every: None,
                open_calls: Cell::new(0),
                released: Rc::new(Cell::new(false)),
            }
        }

        fn failing_every(delay: usize, n: usize) -> Self {
            Self {
                fail_every: Some(n),
                ..Self::new(delay)
            }
        }
    }

    impl CodecProvider for FakeProvider {
        fn open(&self, _codec: CodecId, _config: &EncoderConfig) -> Result<Box<dyn CodecContext>> {
            self.open_calls.set(self.open_calls.get() + 1);
            Ok(Box::new(FakeContext {
                delay: self.delay,
                fail_every: self.fail_every,
                queue: VecDeque::new(),
                calls: 0,
                released: Rc::clone(&self.released),
            }))
        }
    }

    fn open_session(provider: &FakeProvider) -> CodecSession {
        CodecSession::open_with(provider, CodecId::Mpeg4, &EncoderConfig::new(640, 480)).unwrap()
    }

    #[test]
    fn pts_are_gapless_and_monotonic() {
        let provider = FakeProvider::new(2);
        let mut session = open_session(&provider);
        let mut frame = VideoFrame::new(640, 480);

        let mut seen = Vec::new();
        for _ in 0..5 {
            if let Some(packet) = session.submit(&mut frame).unwrap() {
                seen.push(packet.pts.unwrap().0);
            }
        }
        for packet in session.finish().unwrap() {
            seen.push(packet.pts.unwrap().0);
        }

        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert_eq!(session.frames_submitted(), 5);
    }

    #[test]
    fn odd_dimensions_never_reach_the_codec() {
        let provider = FakeProvider::new(0);
        let err =
            CodecSession::open_with(&provider, CodecId::Mpeg4, &EncoderConfig::new(639, 480))
                .unwrap_err();

        assert!(matches!(err, Error::InvalidDimensions { .. }));
        assert_eq!(provider.open_calls.get(), 0);
    }

    #[test]
    fn per_frame_failures_keep_the_session_open() {
        let provider = FakeProvider::failing_every(0, 2);
        let mut session = open_session(&provider);
        let mut frame = VideoFrame::new(640, 480);

        let hits = Rc::new(Cell::new(0u32));
        let hook_hits = Rc::clone(&hits);
        session.set_encode_error_hook(move |_| hook_hits.set(hook_hits.get() + 1));

        for _ in 0..4 {
            assert!(session.submit(&mut frame).is_ok());
        }

        assert_eq!(session.state(), SessionState::Open);
        assert_eq!(session.encode_error_count(), 2);
        assert_eq!(hits.get(), 2);
        // Dropped frames still consume a pts slot.
        assert_eq!(session.frames_submitted(), 4);
    }

    #[test]
    fn finish_drains_buffered_packets_in_order() {
        let provider = FakeProvider::new(3);
        let mut session = open_session(&provider);
        let mut frame = VideoFrame::new(640, 480);

        for _ in 0..3 {
            assert_eq!(session.submit(&mut frame).unwrap(), None);
        }

        let drained: Vec<i64> = session
            .finish()
            .unwrap()
            .into_iter()
            .map(|p| p.pts.unwrap().0)
            .collect();
        assert_eq!(drained, vec![0, 1, 2]);
    }

    #[test]
    fn closed_session_fails_fast() {
        let provider = FakeProvider::new(0);
        let mut session = open_session(&provider);
        session.finish().unwrap();

        assert_eq!(session.state(), SessionState::Closed);

        let mut frame = VideoFrame::new(640, 480);
        assert!(matches!(
            session.submit(&mut frame),
            Err(Error::SessionClosed)
        ));
        assert!(matches!(session.finish(), Err(Error::SessionClosed)));
    }

    #[test]
    fn finish_releases_the_codec_context() {
        let provider = FakeProvider::new(0);
        let mut session = open_session(&provider);
        assert!(!provider.released.get());

        session.finish().unwrap();
        assert!(provider.released.get());
    }
}
