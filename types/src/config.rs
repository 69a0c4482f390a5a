/*!
    Encoder configuration.
*/

use crate::error::{Error, Result};
use crate::timing::Rational;

/**
    Validate encode dimensions.

    The codec family this pipeline targets requires macroblock-aligned
    dimensions, so width and height must be even and at least 2.
*/
pub fn validate_dimensions(width: u32, height: u32) -> Result<()> {
    if width < 2 || height < 2 || width % 2 != 0 || height % 2 != 0 {
        return Err(Error::InvalidDimensions { width, height });
    }
    Ok(())
}

/**
    Configuration for a codec session.

    Constructed once and consumed by `CodecSession::open`; immutable
    thereafter.
*/
#[derive(Clone, Debug)]
pub struct EncoderConfig {
    /// Encode width in pixels; must be even.
    pub width: u32,
    /// Encode height in pixels; must be even.
    pub height: u32,
    /// Target bit rate in bits per second.
    pub bit_rate: u64,
    /// Duration of one frame as a fraction of a second.
    pub time_base: Rational,
    /// Maximum number of frames between full refresh frames.
    pub gop_size: u32,
    /// Maximum number of consecutive bidirectionally predicted frames.
    pub max_b_frames: u32,
}

impl EncoderConfig {
    /**
        Create a configuration with the defaults this pipeline has always
        used: 400 kbit/s, 25 fps, an intra frame every ten frames, one
        B-frame.
    */
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bit_rate: 400_000,
            time_base: Rational::new(1, 25),
            gop_size: 10,
            max_b_frames: 1,
        }
    }

    /**
        Set the target bit rate in bits per second.
    */
    pub fn with_bit_rate(mut self, bit_rate: u64) -> Self {
        self.bit_rate = bit_rate;
        self
    }

    /**
        Set the frame duration as a fraction of a second (1/fps).
    */
    pub fn with_time_base(mut self, time_base: Rational) -> Self {
        self.time_base = time_base;
        self
    }

    /**
        Set the maximum interval between full refresh frames.
    */
    pub fn with_gop_size(mut self, gop_size: u32) -> Self {
        self.gop_size = gop_size;
        self
    }

    /**
        Set the maximum number of consecutive B-frames.
    */
    pub fn with_max_b_frames(mut self, max_b_frames: u32) -> Self {
        self.max_b_frames = max_b_frames;
        self
    }

    /**
        Check that the configured dimensions are encodable.
    */
    pub fn validate(&self) -> Result<()> {
        validate_dimensions(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_legacy_values() {
        let config = EncoderConfig::new(640, 480);
        assert_eq!(config.bit_rate, 400_000);
        assert_eq!(config.time_base, Rational::new(1, 25));
        assert_eq!(config.gop_size, 10);
        assert_eq!(config.max_b_frames, 1);
    }

    #[test]
    fn even_dimensions_validate() {
        assert!(EncoderConfig::new(640, 480).validate().is_ok());
        assert!(EncoderConfig::new(2, 2).validate().is_ok());
    }

    #[test]
    fn odd_dimensions_are_rejected() {
        for (w, h) in [(639, 480), (640, 479), (639, 479)] {
            let err = EncoderConfig::new(w, h).validate().unwrap_err();
            assert!(matches!(
                err,
                Error::InvalidDimensions { width, height } if width == w && height == h
            ));
        }
    }

    #[test]
    fn degenerate_dimensions_are_rejected() {
        assert!(EncoderConfig::new(0, 480).validate().is_err());
        assert!(EncoderConfig::new(640, 0).validate().is_err());
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = EncoderConfig::new(640, 480)
            .with_bit_rate(1_000_000)
            .with_time_base(Rational::new(1, 30))
            .with_gop_size(30)
            .with_max_b_frames(0);
        assert_eq!(config.bit_rate, 1_000_000);
        assert_eq!(config.time_base, Rational::new(1, 30));
        assert_eq!(config.gop_size, 30);
        assert_eq!(config.max_b_frames, 0);
    }
}
