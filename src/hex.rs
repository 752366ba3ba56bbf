use std::fmt::Display;

/// A valid lowercase hexadecimal encoding of binary data, without any prefix.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Hex(pub Vec<u8>);

/// Why a string could not be read back as hexadecimal.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum HexError {
    OddLength(usize),
    BadDigit(char),
}

impl Display for HexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HexError::OddLength(n) => write!(f, "hex length {} is not even", n),
            HexError::BadDigit(c) => write!(f, "bad hex digit {:?}", c),
        }
    }
}

impl Display for Hex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // only ever built from hex digits
        let r: &[u8] = &self.0;
        f.write_str(std::str::from_utf8(r).map_err(|_| std::fmt::Error)?)
    }
}

impl<'a> From<&'a [u8]> for Hex {
    fn from(bytes: &[u8]) -> Self {
        fn hex_digit(b: u8) -> u8 {
            if b <= 9 {
                b + b'0'
            } else {
                b + b'a' - 10
            }
        }

        let mut out = Vec::with_capacity(bytes.len() * 2);
        for &b in bytes {
            out.push(hex_digit((b & 0b11110000) >> 4));
            out.push(hex_digit(b & 0b00001111));
        }
        Hex(out)
    }
}

impl Hex {
    /// Decodes hex digits (either case) back into bytes.
    pub fn decode(s: &str) -> Result<Vec<u8>, HexError> {
        fn unhex_digit(h: u8) -> Result<u8, HexError> {
            match h {
                b'0'..=b'9' => Ok(h - b'0'),
                b'a'..=b'f' => Ok(h - b'a' + 10),
                b'A'..=b'F' => Ok(h - b'A' + 10),
                _ => Err(HexError::BadDigit(h as char)),
            }
        }

        let digits = s.as_bytes();
        if digits.len() % 2 != 0 {
            return Err(HexError::OddLength(digits.len()));
        }

        digits
            .chunks(2)
            .map(|pair| Ok((unhex_digit(pair[0])? << 4) | unhex_digit(pair[1])?))
            .collect()
    }
}

#[test]
fn test_hex_round_trip() {
    let example: &[u8] = b"hello, world";
    let hex = Hex::from(example);
    let bytes = Hex::decode(&hex.to_string()).unwrap();
    assert_eq!(example, bytes.as_slice());
}

#[test]
fn test_hex_decode_rejects_garbage() {
    assert_eq!(Hex::decode("abc"), Err(HexError::OddLength(3)));
    assert_eq!(Hex::decode("zz"), Err(HexError::BadDigit('z')));
    assert_eq!(Hex::decode("AbFf").unwrap(), vec![0xab, 0xff]);
}
