//! Soundbite frame container
//!
//! The on-disk format for pre-encoded audio: a flat sequence of records,
//! each a `u16` little-endian length followed by that many bytes of opaque
//! frame data. Zero-length frames are legal. The dispatcher itself never
//! parses this — it is the frame sources' format, read by the soundbank and
//! written by the transcoding pipeline that produces soundbites.

use bytes::{Buf, BufMut, Bytes};

use mynah_core::{MynahError, Result};

/// Upper bound on a single frame's size in bytes
///
/// Frames are length-bounded by contract; anything larger than this is a
/// corrupt or hostile container, not audio.
pub const MAX_FRAME_LEN: usize = 4096;

/// Parse a whole container into its frames
///
/// Empty input yields an empty frame list. Fails on a truncated record or a
/// length above [`MAX_FRAME_LEN`], naming the byte offset of the bad record.
pub fn read_frames(data: &[u8]) -> Result<Vec<Bytes>> {
    let total = data.len();
    let mut buf = data;
    let mut frames = Vec::new();

    while buf.has_remaining() {
        let offset = total - buf.remaining();
        if buf.remaining() < 2 {
            return Err(MynahError::soundbite(format!(
                "truncated frame header at byte {}",
                offset
            )));
        }
        let len = buf.get_u16_le() as usize;
        if len > MAX_FRAME_LEN {
            return Err(MynahError::soundbite(format!(
                "frame of {} bytes at byte {} exceeds the {} byte limit",
                len, offset, MAX_FRAME_LEN
            )));
        }
        if buf.remaining() < len {
            return Err(MynahError::soundbite(format!(
                "truncated frame body at byte {}: header says {} bytes, {} remain",
                offset,
                len,
                buf.remaining()
            )));
        }
        frames.push(buf.copy_to_bytes(len));
    }

    Ok(frames)
}

/// Encode frames into container bytes
///
/// Fails if any frame exceeds [`MAX_FRAME_LEN`], naming its index.
pub fn write_frames(frames: &[Bytes]) -> Result<Vec<u8>> {
    let body: usize = frames.iter().map(|frame| frame.len()).sum();
    let mut out = Vec::with_capacity(body + frames.len() * 2);

    for (index, frame) in frames.iter().enumerate() {
        if frame.len() > MAX_FRAME_LEN {
            return Err(MynahError::soundbite(format!(
                "frame {} is {} bytes, above the {} byte limit",
                index,
                frame.len(),
                MAX_FRAME_LEN
            )));
        }
        out.put_u16_le(frame.len() as u16);
        out.put_slice(frame);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let frames = vec![
            Bytes::from_static(b"first frame"),
            Bytes::from_static(b""),
            Bytes::from_static(b"third"),
        ];
        let encoded = write_frames(&frames).unwrap();
        let decoded = read_frames(&encoded).unwrap();
        assert_eq!(decoded, frames);
    }

    #[test]
    fn test_empty_container() {
        assert!(read_frames(&[]).unwrap().is_empty());
        assert!(write_frames(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_header() {
        // A lone byte cannot hold a u16 length
        let err = read_frames(&[0x05]).unwrap_err();
        assert!(err.to_string().contains("truncated frame header at byte 0"));
    }

    #[test]
    fn test_truncated_body() {
        // Header promises 4 bytes, only 2 follow
        let data = [0x04, 0x00, 0xAA, 0xBB];
        let err = read_frames(&data).unwrap_err();
        assert!(err.to_string().contains("truncated frame body at byte 0"));
    }

    #[test]
    fn test_oversize_length_rejected() {
        let mut data = vec![0xFF, 0xFF];
        data.extend(std::iter::repeat(0u8).take(0xFFFF));
        let err = read_frames(&data).unwrap_err();
        assert!(err.to_string().contains("exceeds the 4096 byte limit"));
    }

    #[test]
    fn test_write_rejects_oversize_frame() {
        let frames = vec![Bytes::from(vec![0u8; MAX_FRAME_LEN + 1])];
        let err = write_frames(&frames).unwrap_err();
        assert!(err.to_string().contains("frame 0"));
    }

    #[test]
    fn test_offset_of_second_record_reported() {
        // First record is fine (2 + 3 bytes); the second is truncated
        let mut data = write_frames(&[Bytes::from_static(b"abc")]).unwrap();
        data.push(0x09);
        let err = read_frames(&data).unwrap_err();
        assert!(err.to_string().contains("at byte 5"));
    }
}
