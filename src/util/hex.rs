//! Converting from and to hex strings.

use std::fmt;


//------------ Encoding ------------------------------------------------------

/// Returns a value displaying an octet sequence as upper case hex digits.
pub fn display(src: &[u8]) -> impl fmt::Display + '_ {
    Hex(src)
}

/// Returns a value displaying an octet sequence as colon separated octets.
///
/// This is the format the `openssl` command line tool uses for key
/// identifiers, e.g., `CF:08:7E`.
pub fn display_colon(src: &[u8]) -> impl fmt::Display + '_ {
    ColonHex(src)
}

struct Hex<'a>(&'a [u8]);

impl fmt::Display for Hex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for ch in self.0 {
            write!(f, "{:02X}", ch)?;
        }
        Ok(())
    }
}

struct ColonHex<'a>(&'a [u8]);

impl fmt::Display for ColonHex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for ch in self.0 {
            if first {
                first = false;
            }
            else {
                f.write_str(":")?;
            }
            write!(f, "{:02X}", ch)?;
        }
        Ok(())
    }
}


//------------ Decoding ------------------------------------------------------

/// Decodes a hex string into the octets of `dest`.
///
/// Colons between octets are skipped so that both `CF087E` and `CF:08:7E`
/// are accepted. Returns `None` if the string contains anything else or
/// doesn’t provide exactly the length of `dest`.
pub fn decode_into(src: &str, dest: &mut [u8]) -> Option<()> {
    let mut digits = src.bytes().filter(|&ch| ch != b':');
    for octet in dest.iter_mut() {
        let high = digit(digits.next()?)?;
        let low = digit(digits.next()?)?;
        *octet = (high << 4) | low;
    }
    if digits.next().is_some() {
        None
    }
    else {
        Some(())
    }
}

fn digit(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'a'..=b'f' => Some(ch - b'a' + 10),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        _ => None
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn encode() {
        assert_eq!(display(b"\x01\xab\xff").to_string(), "01ABFF");
        assert_eq!(display_colon(b"\x01\xab\xff").to_string(), "01:AB:FF");
        assert_eq!(display_colon(b"").to_string(), "");
    }

    #[test]
    fn decode() {
        let mut buf = [0u8; 3];
        assert_eq!(decode_into("01abFF", &mut buf), Some(()));
        assert_eq!(buf, [0x01, 0xab, 0xff]);
        assert_eq!(decode_into("01:AB:FE", &mut buf), Some(()));
        assert_eq!(buf, [0x01, 0xab, 0xfe]);
        assert_eq!(decode_into("01AB", &mut buf), None);
        assert_eq!(decode_into("01ABFF00", &mut buf), None);
        assert_eq!(decode_into("01ABFG", &mut buf), None);
    }
}
