/*!
    FFmpeg-backed codec provider.
*/

use std::collections::VecDeque;

use ffmpeg_next::{
    Dictionary, Rational as FFmpegRational,
    codec::{self, Id as CodecIdFFmpeg, encoder::Video as VideoEncoderFFmpeg},
    ffi,
    format::Pixel,
    util::frame::video::Video as VideoFrameFFmpeg,
};

use rawvid_types::{
    CodecContext, CodecId, CodecProvider, EncoderConfig, Error, Packet, Pts, Result, VideoFrame,
};

/**
    Codec provider backed by FFmpeg's libavcodec.

    Opening a context looks up the requested encoder, applies the session
    configuration, and opens the codec. The returned context owns the FFmpeg
    encoder; dropping it releases the codec resources.
*/
pub struct FfmpegCodec;

impl CodecProvider for FfmpegCodec {
    fn open(&self, codec: CodecId, config: &EncoderConfig) -> Result<Box<dyn CodecContext>> {
        ffmpeg_next::init().map_err(|e| Error::OpenFailed(e.to_string()))?;

        let codec_id = codec_id_to_ffmpeg(codec)?;
        let ffmpeg_codec =
            ffmpeg_next::encoder::find(codec_id).ok_or(Error::CodecNotFound(codec))?;

        let encoder_ctx = codec::context::Context::new_with_codec(ffmpeg_codec);
        let mut encoder = encoder_ctx
            .encoder()
            .video()
            .map_err(|e| Error::OpenFailed(e.to_string()))?;

        encoder.set_width(config.width);
        encoder.set_height(config.height);
        encoder.set_format(Pixel::YUV420P);

        // Time base is the frame duration; frame rate is its inverse.
        let time_base = FFmpegRational::new(config.time_base.num, config.time_base.den);
        encoder.set_time_base(time_base);
        encoder.set_frame_rate(Some(FFmpegRational::new(
            config.time_base.den,
            config.time_base.num,
        )));

        encoder.set_gop(config.gop_size);
        encoder.set_bit_rate(config.bit_rate as usize);

        let mut opts = Dictionary::new();
        opts.set("bf", &config.max_b_frames.to_string());

        let encoder = encoder
            .open_with(opts)
            .map_err(|e| Error::OpenFailed(format!("codec rejected configuration: {}", e)))?;

        Ok(Box::new(FfmpegContext {
            encoder,
            pending: VecDeque::new(),
            eof_sent: false,
            eof_reached: false,
        }))
    }
}

/**
    An open FFmpeg encoder.

    libavcodec may emit packets at its own pace, so produced packets are
    queued and handed out one per `encode` call. The queue is fully drained
    before the end-of-stream signal is reported.
*/
struct FfmpegContext {
    encoder: VideoEncoderFFmpeg,
    pending: VecDeque<Packet>,
    eof_sent: bool,
    eof_reached: bool,
}

impl CodecContext for FfmpegContext {
    fn encode(&mut self, frame: Option<&VideoFrame>) -> Result<Option<Packet>> {
        match frame {
            Some(frame) => {
                let mut ffmpeg_frame =
                    VideoFrameFFmpeg::new(Pixel::YUV420P, frame.width(), frame.height());
                copy_planes_to_ffmpeg_frame(&mut ffmpeg_frame, frame);
                ffmpeg_frame.set_pts(frame.pts().map(|p| p.0));

                self.encoder
                    .send_frame(&ffmpeg_frame)
                    .map_err(|e| Error::EncodeFailed(e.to_string()))?;
            }
            None => {
                if !self.eof_sent {
                    self.encoder
                        .send_eof()
                        .map_err(|e| Error::EncodeFailed(e.to_string()))?;
                    self.eof_sent = true;
                }
            }
        }

        self.receive_pending()?;
        Ok(self.pending.pop_front())
    }
}

impl FfmpegContext {
    /**
        Pull every packet the encoder has ready into the pending queue.
    */
    fn receive_pending(&mut self) -> Result<()> {
        if self.eof_reached {
            return Ok(());
        }

        let mut encoded_pkt = ffmpeg_next::Packet::empty();

        loop {
            match self.encoder.receive_packet(&mut encoded_pkt) {
                Ok(()) => {
                    self.pending.push_back(convert_packet(&encoded_pkt));
                }
                Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::AVERROR(ffi::EAGAIN) => {
                    break;
                }
                Err(ffmpeg_next::Error::Eof) => {
                    self.eof_reached = true;
                    break;
                }
                Err(e) => {
                    return Err(Error::EncodeFailed(e.to_string()));
                }
            }
        }

        Ok(())
    }
}

/**
    Convert an FFmpeg packet to our Packet type.

    The data is copied out; the FFmpeg-side buffer is reused for the next
    receive, so the codec never holds more than one live packet.
*/
fn convert_packet(pkt: &ffmpeg_next::Packet) -> Packet {
    let data = pkt.data().map(|d| d.to_vec()).unwrap_or_default();
    Packet::new(data, pkt.pts().map(Pts), pkt.is_key())
}

/**
    Copy the planar frame data into an FFmpeg frame, honoring its strides.
*/
fn copy_planes_to_ffmpeg_frame(dst: &mut VideoFrameFFmpeg, src: &VideoFrame) {
    for plane in 0..3 {
        let dst_stride = dst.stride(plane);
        let dst_data = dst.data_mut(plane);
        let row_bytes = src.stride(plane);
        let src_plane = src.plane(plane);

        for y in 0..src.rows(plane) {
            let src_start = y * row_bytes;
            let dst_start = y * dst_stride;
            dst_data[dst_start..dst_start + row_bytes]
                .copy_from_slice(&src_plane[src_start..src_start + row_bytes]);
        }
    }
}

/**
    Map our codec identifier to FFmpeg's.
*/
fn codec_id_to_ffmpeg(codec: CodecId) -> Result<CodecIdFFmpeg> {
    match codec {
        CodecId::Mpeg4 => Ok(CodecIdFFmpeg::MPEG4),
        CodecId::Vp8 => Ok(CodecIdFFmpeg::VP8),
        _ => Err(Error::CodecNotFound(codec)),
    }
}
