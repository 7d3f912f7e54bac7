//! Converting octet sequences to hex strings.

use std::fmt;


/// Writes an octet sequence as an upper case hex string.
pub fn write(src: &[u8], f: &mut fmt::Formatter) -> fmt::Result {
    for ch in src {
        let [hi, lo] = encode_u8(*ch);
        write!(f, "{}{}", char::from(hi), char::from(lo))?;
    }
    Ok(())
}

/// Returns the hex string for an octet sequence.
pub fn encode(src: &[u8]) -> String {
    let mut res = String::with_capacity(src.len() * 2);
    for ch in src {
        let [hi, lo] = encode_u8(*ch);
        res.push(char::from(hi));
        res.push(char::from(lo));
    }
    res
}

/// Decodes a hex string of either case.
pub fn decode(src: &str) -> Option<Vec<u8>> {
    if src.len() % 2 != 0 {
        return None
    }
    src.as_bytes().chunks(2).map(|pair| {
        Some((decode_digit(pair[0])? << 4) | decode_digit(pair[1])?)
    }).collect()
}

fn encode_u8(ch: u8) -> [u8; 2] {
    [DIGITS[usize::from(ch >> 4)], DIGITS[usize::from(ch & 0x0F)]]
}

fn decode_digit(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'a'..=b'f' => Some(ch - b'a' + 10),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        _ => None
    }
}

const DIGITS: &[u8] = b"0123456789ABCDEF";


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn encode_decode() {
        assert_eq!(encode(b"\x01\xab\xff"), "01ABFF");
        assert_eq!(decode("01abFF"), Some(vec![0x01, 0xab, 0xff]));
        assert_eq!(decode("0"), None);
        assert_eq!(decode("0g"), None);
    }
}
