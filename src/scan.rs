use memchr::memchr_iter;

use crate::TreeError;

/// Scan a UTF-8 buffer for the byte offsets at which lines start.
///
/// The first line always starts at offset 0, and every `\n` at byte `i`
/// opens a new line at byte `i + 1`. A trailing newline therefore opens a
/// final empty line one past the end of the buffer. Only `\n` (0x0A) counts
/// as a line break; a `\r` is just another byte of the line its on.
///
/// An empty buffer has no lines at all and yields an empty vector.
pub fn line_starts(bytes: &[u8]) -> Result<Vec<u64>, TreeError> {
    std::str::from_utf8(bytes)?;

    if bytes.is_empty() {
        return Ok(vec![]);
    }

    // Preallocation heuristic: code averages a newline every ~48 bytes.
    let mut starts = Vec::with_capacity(1 + bytes.len() / 48);
    starts.push(0);
    starts.extend(memchr_iter(b'\n', bytes).map(|i| (i + 1) as u64));
    Ok(starts)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_input_has_no_lines() {
        assert_eq!(line_starts(b"").unwrap(), Vec::<u64>::new());
    }

    #[test]
    fn no_newline_is_one_line() {
        assert_eq!(line_starts(b"hello").unwrap(), vec![0]);
    }

    #[test]
    fn trailing_newline_opens_a_line_past_the_end() {
        assert_eq!(line_starts(b"const\nvar\n").unwrap(), vec![0, 6, 10]);
    }

    #[test]
    fn leading_newline() {
        assert_eq!(
            line_starts(b"\nzig\nc\nrust\ncpp\n").unwrap(),
            vec![0, 1, 5, 7, 12, 16]
        );
    }

    #[test]
    fn offsets_are_bytes_not_chars() {
        // The 'é' takes 2 bytes, so the second line starts at 7 not 6.
        assert_eq!(line_starts("h\u{e9}llo\nx".as_bytes()).unwrap(), vec![0, 7]);
    }

    #[test]
    fn crlf_is_not_special() {
        // The \r stays part of the first line's content.
        assert_eq!(line_starts(b"a\r\nb").unwrap(), vec![0, 3]);
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let err = line_starts(&[b'f', 0xff, b'\n']).unwrap_err();
        assert!(matches!(err, TreeError::InvalidUtf8(_)));
    }
}
