//! Marker scanning and slicing of motion photo buffers

use crate::{SplitError, SplitOutcome};
use std::ops::Range;

/// Box type of the MP4 file type box
pub const FTYP_MARKER: &[u8; 4] = b"ftyp";

/// Size field that precedes every MP4 box type
pub const BOX_SIZE_LEN: usize = 4;

/// JPEG End Of Image marker
pub const EOI_MARKER: &[u8; 2] = &[0xFF, 0xD9];

/// Byte ranges of the two assets inside a motion photo buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitResult {
    /// JPEG image, `0..jpeg_end`
    pub photo_range: Range<usize>,

    /// MP4 clip, `mp4_start..len`
    pub video_range: Range<usize>,
}

impl SplitResult {
    /// Photo bytes within the buffer this result was computed from
    pub fn photo<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        &buffer[self.photo_range.clone()]
    }

    /// Video bytes within the buffer this result was computed from
    pub fn video<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        &buffer[self.video_range.clone()]
    }

    /// Bytes between the image terminator and the container start, belonging to neither asset
    pub fn gap_len(&self) -> usize {
        self.video_range.start - self.photo_range.end
    }
}

/// Offset of the embedded MP4, i.e. 4 bytes before the first `ftyp`.
///
/// Returns `None` when there is no `ftyp` marker. A marker sitting closer than
/// [`BOX_SIZE_LEN`] to the start has no room for its size field and yields
/// `Some(0)`, which leaves nothing for the image to occupy.
pub fn locate_container_start(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(FTYP_MARKER.len())
        .position(|window| window == FTYP_MARKER)
        .map(|pos| pos.saturating_sub(BOX_SIZE_LEN))
}

/// Offset of the last `FF D9` pair that lies entirely within `buffer[..search_limit]`.
///
/// Scans backward so embedded thumbnails ending in their own EOI marker do not
/// truncate the main image.
pub fn locate_image_end(buffer: &[u8], search_limit: usize) -> Option<usize> {
    let region = &buffer[..search_limit.min(buffer.len())];
    region
        .windows(EOI_MARKER.len())
        .rposition(|window| window == EOI_MARKER)
}

/// Split a motion photo buffer into its photo and video ranges
pub fn split(buffer: &[u8]) -> SplitOutcome {
    let mp4_start = locate_container_start(buffer).ok_or(SplitError::NoContainerMarkerFound)?;
    let marker = locate_image_end(buffer, mp4_start).ok_or(SplitError::NoImageTerminatorFound)?;
    let jpeg_end = marker + EOI_MARKER.len();

    Ok(SplitResult {
        photo_range: 0..jpeg_end,
        video_range: mp4_start..buffer.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &[u8] = &[
        0x00, 0x01, 0xFF, 0xD9, 0x00, 0x00, 0x00, 0x18, b'f', b't', b'y', b'p', b'i', b's', b'o',
        b'm',
    ];

    #[test]
    fn test_split_minimal_motion_photo() {
        let result = split(SCENARIO).unwrap();
        assert_eq!(result.photo_range, 0..4);
        assert_eq!(result.video_range, 4..SCENARIO.len());
        assert_eq!(result.gap_len(), 0);
        assert_eq!(result.photo(SCENARIO), &[0x00, 0x01, 0xFF, 0xD9]);
        assert_eq!(&result.video(SCENARIO)[4..8], b"ftyp");
    }

    #[test]
    fn test_container_start_is_before_size_field() {
        assert_eq!(locate_container_start(SCENARIO), Some(4));
        assert_eq!(locate_container_start(b"no marker here"), None);
    }

    #[test]
    fn test_container_start_uses_first_marker() {
        let buffer = b"\xFF\xD9\0\0\0\x10ftypmp42\0\0\0\x08ftyp";
        assert_eq!(locate_container_start(buffer), Some(2));
    }

    #[test]
    fn test_marker_at_buffer_start_has_no_room_for_image() {
        assert_eq!(locate_container_start(b"ftypisom"), Some(0));
        assert_eq!(locate_container_start(b"\xFF\xD9ftypisom"), Some(0));
        assert_eq!(split(b"\xFF\xD9ftypisom"), Err(SplitError::NoImageTerminatorFound));
    }

    #[test]
    fn test_image_end_prefers_rightmost_marker() {
        let buffer = [0xFF, 0xD8, 0xFF, 0xD9, 0x10, 0xFF, 0xD9, 0x20];
        assert_eq!(locate_image_end(&buffer, buffer.len()), Some(5));
        assert_eq!(locate_image_end(&buffer, 5), Some(2));
    }

    #[test]
    fn test_image_end_ignores_marker_straddling_limit() {
        let buffer = [0x00, 0xFF, 0xD9];
        assert_eq!(locate_image_end(&buffer, 2), None);
        assert_eq!(locate_image_end(&buffer, 3), Some(1));
    }

    #[test]
    fn test_image_end_clamps_limit() {
        let buffer = [0xFF, 0xD9];
        assert_eq!(locate_image_end(&buffer, 100), Some(0));
        assert_eq!(locate_image_end(&[], 0), None);
    }

    #[test]
    fn test_split_missing_container() {
        assert_eq!(split(&[0xFF, 0xD8, 0xFF, 0xD9]), Err(SplitError::NoContainerMarkerFound));
        assert_eq!(split(&[]), Err(SplitError::NoContainerMarkerFound));
    }

    #[test]
    fn test_split_missing_terminator() {
        let buffer = b"\xFF\xD8jpeg\0\0\0\x18ftypisom";
        assert_eq!(split(buffer), Err(SplitError::NoImageTerminatorFound));
    }

    #[test]
    fn test_terminator_after_container_is_ignored() {
        let buffer = b"\xFF\xD8\0\0\0\x18ftyp\xFF\xD9";
        assert_eq!(split(buffer), Err(SplitError::NoImageTerminatorFound));
    }

    #[test]
    fn test_gap_is_discarded() {
        let buffer = b"\xFF\xD8\xFF\xD9pad\0\0\0\x18ftypisom";
        let result = split(buffer).unwrap();
        assert_eq!(result.photo_range, 0..4);
        assert_eq!(result.video_range, 7..buffer.len());
        assert_eq!(result.gap_len(), 3);
    }
}
