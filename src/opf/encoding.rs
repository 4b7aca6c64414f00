//! Text in OPF files is single-byte ISO-8859-1. Every byte maps to the
//! code point of the same value, so decoding never fails. Characters above
//! U+00FF have no encoding and are written as `?`.

pub const SUBSTITUTE: u8 = b'?';

pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

pub fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(SUBSTITUTE))
        .collect()
}

/// Whether `text` survives an encode/decode cycle unchanged.
pub fn is_representable(text: &str) -> bool {
    text.chars().all(|c| u32::from(c) <= 0xff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_bytes_map_to_latin1() {
        let bytes = [b'K', 0xe4, b'r', 0xe5, 0xff];
        let text = decode_latin1(&bytes);
        assert_eq!(text, "K\u{e4}r\u{e5}\u{ff}");
        assert_eq!(encode_latin1(&text), bytes);
    }

    #[test]
    fn unrepresentable_chars_become_question_marks() {
        assert_eq!(encode_latin1("a\u{20ac}b\u{1f600}"), b"a?b?");
        assert!(!is_representable("\u{20ac}"));
        assert!(is_representable("\u{e9}t\u{e9}"));
    }
}
