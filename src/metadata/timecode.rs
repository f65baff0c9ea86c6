//! SMPTE timecode decoding.

/// Decode a raw header timecode value into `HH:MM:SS:FF`.
///
/// Scanners serialize the timecode as a frames-since-zero count, usually as
/// a one-element sequence (`"(25,)"`); bare integers and bracketed lists are
/// accepted too. Anything unparseable decodes to an empty string — a frame
/// with a broken timecode must not sink the whole scan.
pub fn decode_timecode(raw: &str, fps: u32) -> String {
    if fps == 0 {
        return String::new();
    }

    let first = raw
        .trim()
        .trim_start_matches(['(', '['])
        .trim_end_matches([')', ']'])
        .split(',')
        .next()
        .map(str::trim)
        .unwrap_or("");

    let total: i64 = match first.parse() {
        Ok(n) => n,
        Err(_) => {
            if !raw.is_empty() {
                tracing::warn!("unparseable timecode value: {raw:?}");
            }
            return String::new();
        }
    };
    if total < 0 {
        tracing::warn!("negative timecode value: {raw:?}");
        return String::new();
    }

    let fps = i64::from(fps);
    let hh = total / (3600 * fps);
    let mm = (total / (60 * fps)) % 60;
    let ss = (total / fps) % 60;
    let ff = total % fps;
    format!("{hh:02}:{mm:02}:{ss:02}:{ff:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_one_element_tuple() {
        assert_eq!(decode_timecode("(25,)", 24), "00:00:01:01");
    }

    #[test]
    fn test_decode_bare_and_list_forms() {
        assert_eq!(decode_timecode("25", 24), "00:00:01:01");
        assert_eq!(decode_timecode("[25]", 24), "00:00:01:01");
        assert_eq!(decode_timecode("(25, 0)", 24), "00:00:01:01");
    }

    #[test]
    fn test_decode_rollover() {
        // One hour plus one minute plus one second plus one frame at 24 fps.
        let total = 3600 * 24 + 60 * 24 + 24 + 1;
        assert_eq!(decode_timecode(&format!("({total},)"), 24), "01:01:01:01");
    }

    #[test]
    fn test_decode_garbage_degrades() {
        assert_eq!(decode_timecode("", 24), "");
        assert_eq!(decode_timecode("banana", 24), "");
        assert_eq!(decode_timecode("(-3,)", 24), "");
        assert_eq!(decode_timecode("25", 0), "");
    }
}
