//! Tiny MPEG-4 clips written with FFmpeg's built-in encoder, for tests.

use anyhow::{Context, Result};
use ffmpeg_next as ffmpeg;
use image::{GrayImage, Luma};
use std::path::Path;

pub const CLIP_SIZE: u32 = 128;

const FPS: i32 = 25;

/// Bright disc centred at (cx, cy) on a dark background
pub fn disc(cx: u32, cy: u32) -> GrayImage {
    GrayImage::from_fn(CLIP_SIZE, CLIP_SIZE, |x, y| {
        let dx = x as i64 - cx as i64;
        let dy = y as i64 - cy as i64;
        if dx * dx + dy * dy < 30 * 30 {
            Luma([200])
        } else {
            Luma([40])
        }
    })
}

pub fn dog_picture() -> GrayImage {
    disc(90, 90)
}

pub fn cat_picture() -> GrayImage {
    disc(36, 36)
}

fn drain(
    encoder: &mut ffmpeg::encoder::Video,
    octx: &mut ffmpeg::format::context::Output,
    stream_index: usize,
    stream_time_base: ffmpeg::Rational,
) -> Result<()> {
    let mut packet = ffmpeg::Packet::empty();
    while encoder.receive_packet(&mut packet).is_ok() {
        packet.set_stream(stream_index);
        packet.rescale_ts(ffmpeg::Rational::new(1, FPS), stream_time_base);
        packet
            .write_interleaved(octx)
            .context("Failed to write packet")?;
    }
    Ok(())
}

/// Encode `frames` (all `CLIP_SIZE` square) into an mp4 at `path`, in order
pub fn write_clip(path: &Path, frames: &[GrayImage]) -> Result<()> {
    ffmpeg::init().context("Failed to initialize FFmpeg")?;

    let mut octx = ffmpeg::format::output(&path).context("Failed to create output")?;
    let global_header = octx
        .format()
        .flags()
        .contains(ffmpeg::format::Flags::GLOBAL_HEADER);

    let codec = ffmpeg::encoder::find(ffmpeg::codec::Id::MPEG4).context("No MPEG-4 encoder")?;
    let mut encoder = ffmpeg::codec::context::Context::new_with_codec(codec)
        .encoder()
        .video()
        .context("Failed to create video encoder")?;

    encoder.set_width(CLIP_SIZE);
    encoder.set_height(CLIP_SIZE);
    encoder.set_format(ffmpeg::format::Pixel::YUV420P);
    encoder.set_time_base((1, FPS));
    encoder.set_frame_rate(Some((FPS, 1)));
    encoder.set_bit_rate(2_000_000);
    if global_header {
        encoder.set_flags(ffmpeg::codec::Flags::GLOBAL_HEADER);
    }

    let mut encoder = encoder.open().context("Failed to open encoder")?;

    let stream_index = {
        let mut ost = octx.add_stream(codec).context("Failed to add stream")?;
        ost.set_parameters(&encoder);
        ost.set_time_base((1, FPS));
        ost.index()
    };

    octx.write_header().context("Failed to write header")?;
    let stream_time_base = octx
        .stream(stream_index)
        .context("Missing output stream")?
        .time_base();

    for (index, picture) in frames.iter().enumerate() {
        let mut frame = ffmpeg::util::frame::video::Video::new(
            ffmpeg::format::Pixel::YUV420P,
            CLIP_SIZE,
            CLIP_SIZE,
        );

        let stride = frame.stride(0);
        let luma = frame.data_mut(0);
        for (x, y, pixel) in picture.enumerate_pixels() {
            luma[y as usize * stride + x as usize] = pixel.0[0];
        }
        frame.data_mut(1).fill(128);
        frame.data_mut(2).fill(128);
        frame.set_pts(Some(index as i64));

        encoder.send_frame(&frame).context("Failed to send frame")?;
        drain(&mut encoder, &mut octx, stream_index, stream_time_base)?;
    }

    encoder.send_eof().context("Failed to flush encoder")?;
    drain(&mut encoder, &mut octx, stream_index, stream_time_base)?;
    octx.write_trailer().context("Failed to write trailer")?;

    Ok(())
}
