use super::reference::resize_for_comparison;
use super::{MatchError, MatchingResult, VideoInput};
use anyhow::{Context, Result};
use ffmpeg_next as ffmpeg;
use image::RgbImage;

/// Intialize FFmpeg (must be called once at startup)
pub fn init_ffmpeg() -> Result<()> {
    ffmpeg::init().context("Failed to initialize FFmpeg")?;

    Ok(())
}

/// Decode the first frame of a video, resized to `size`x`size` RGB.
///
/// Every failure along the way is reported as [`MatchError::Frame`] so the
/// caller can skip the video and carry on with the rest of the run.
pub fn extract_first_frame(video: &VideoInput, size: u32) -> MatchingResult<RgbImage> {
    let frame = decode_first_frame(video).map_err(|e| MatchError::frame(&video.name, format!("{e:#}")))?;

    Ok(resize_for_comparison(&frame, size))
}

fn decode_first_frame(video: &VideoInput) -> Result<RgbImage> {
    let mut input = ffmpeg::format::input(&video.path).context("Failed to open video file")?;

    let video_stream_index = input
        .streams()
        .best(ffmpeg::media::Type::Video)
        .context("Could not find video stream")?
        .index();

    let video_stream = input
        .stream(video_stream_index)
        .context("Failed to get video stream")?;

    let context_decoder =
        ffmpeg::codec::context::Context::from_parameters(video_stream.parameters())
            .context("Failed to create codec context")?;

    let mut decoder = context_decoder
        .decoder()
        .video()
        .context("Failed to create video decoder")?;

    let mut decoded_frame = ffmpeg::util::frame::video::Video::empty();
    let mut found_frame = false;

    for (stream, packet) in input.packets() {
        if stream.index() != video_stream_index {
            continue;
        }

        if decoder.send_packet(&packet).is_err() {
            continue;
        }

        if decoder.receive_frame(&mut decoded_frame).is_ok() {
            found_frame = true;
            break;
        }
    }

    // Codecs with frame delay only hand out the first picture after a flush
    if !found_frame {
        decoder.send_eof().ok();
        found_frame = decoder.receive_frame(&mut decoded_frame).is_ok();
    }

    if !found_frame {
        anyhow::bail!("No decodable frame in video stream");
    }

    frame_to_rgb(&decoded_frame)
}

/// Convert a decoded frame of any pixel format to a tightly packed RGB buffer
fn frame_to_rgb(frame: &ffmpeg::util::frame::video::Video) -> Result<RgbImage> {
    let width = frame.width();
    let height = frame.height();

    let mut scaler = ffmpeg::software::scaling::context::Context::get(
        frame.format(),
        width,
        height,
        ffmpeg::format::Pixel::RGB24,
        width,
        height,
        ffmpeg::software::scaling::flag::Flags::BILINEAR,
    )
    .context("Failed to create scaler")?;

    let mut rgb_frame = ffmpeg::util::frame::video::Video::empty();
    scaler
        .run(frame, &mut rgb_frame)
        .context("Failed to scale frame")?;

    // Rows may be padded past width * 3
    let data = rgb_frame.data(0);
    let stride = rgb_frame.stride(0);
    let row_len = width as usize * 3;

    let mut packed = Vec::with_capacity(row_len * height as usize);
    for y in 0..height as usize {
        let row_start = y * stride;
        let row = data
            .get(row_start..row_start + row_len)
            .context("Frame buffer shorter than expected")?;
        packed.extend_from_slice(row);
    }

    RgbImage::from_raw(width, height, packed).context("Failed to create image buffer from frame")
}
