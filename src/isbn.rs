//! ISBN normalization and validation.
//!
//! Accepts ISBN-10 and ISBN-13 in any punctuation (`978-0-13-468599-1`,
//! `0 13 468599 7`, ...) and produces the canonical 13-digit form used as the
//! lookup and cache key.
//!
//! ```
//! use isbn_kit::isbn::{self, Isbn};
//!
//! let isbn = isbn::normalize("0-13-468599-7").unwrap();
//! assert_eq!(isbn.as_str(), "9780134685991");
//! assert!(isbn::is_valid("978-0-13-468599-1"));
//! assert!(isbn::normalize("not-an-isbn").is_none());
//! # let _: Isbn = isbn;
//! ```

use crate::error::LookupError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const ISBN13_LEN: usize = 13;
const ISBN10_LEN: usize = 10;
const BOOKLAND_PREFIX: &str = "978";

/// A canonical ISBN-13: thirteen ASCII digits with a valid check digit.
///
/// The only way to obtain one is through [`normalize`] (or the `FromStr` /
/// `TryFrom<String>` impls, which call it), so every value passes ISBN-13
/// validation on its own. Deserialization re-validates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Isbn(String);

impl Isbn {
    /// The 13-digit canonical form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// ISBN-10 form, for `978`-prefixed values.
    ///
    /// Returns `None` for `979` ISBNs, which have no ISBN-10 equivalent.
    pub fn to_isbn10(&self) -> Option<String> {
        let body = self.0.strip_prefix(BOOKLAND_PREFIX)?;
        let body = &body[..9];
        let sum: u32 = body
            .bytes()
            .enumerate()
            .map(|(i, b)| u32::from(b - b'0') * (10 - i as u32))
            .sum();
        let check = match (11 - sum % 11) % 11 {
            10 => 'X',
            d => char::from(b'0' + d as u8),
        };
        Some(format!("{}{}", body, check))
    }
}

impl fmt::Display for Isbn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Isbn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Isbn {
    type Err = LookupError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        normalize(s).ok_or(LookupError::InvalidIsbn)
    }
}

impl TryFrom<String> for Isbn {
    type Error = LookupError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Isbn> for String {
    fn from(isbn: Isbn) -> Self {
        isbn.0
    }
}

/// Normalize a raw identifier to a canonical ISBN-13.
///
/// Every character other than an ASCII digit or `X`/`x` is dropped. A valid
/// ISBN-13 is returned as is; a valid ISBN-10 is converted. Anything else,
/// including any length other than 10 or 13 after stripping, yields `None`.
pub fn normalize(raw: &str) -> Option<Isbn> {
    let stripped = strip(raw);
    if is_valid_isbn13(&stripped) {
        Some(Isbn(stripped))
    } else if is_valid_isbn10(&stripped) {
        Some(Isbn(convert_to_isbn13(&stripped)))
    } else {
        None
    }
}

/// Whether `raw` is a valid ISBN-10 or ISBN-13 after stripping.
pub fn is_valid(raw: &str) -> bool {
    let stripped = strip(raw);
    is_valid_isbn13(&stripped) || is_valid_isbn10(&stripped)
}

fn strip(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == 'X' || *c == 'x')
        .collect()
}

/// Weighted 1,3,1,3,... digit sum. Callers guarantee ASCII digits.
fn isbn13_weighted_sum(digits: &str) -> u32 {
    digits
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 0 {
                digit
            } else {
                digit * 3
            }
        })
        .sum()
}

fn is_valid_isbn13(isbn: &str) -> bool {
    if isbn.len() != ISBN13_LEN || !isbn.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    isbn13_weighted_sum(isbn) % 10 == 0
}

fn is_valid_isbn10(isbn: &str) -> bool {
    if isbn.len() != ISBN10_LEN {
        return false;
    }
    let bytes = isbn.as_bytes();
    if !bytes[..9].iter().all(u8::is_ascii_digit) {
        return false;
    }

    let last = bytes[9];
    let check = match last {
        b'0'..=b'9' => u32::from(last - b'0'),
        b'X' | b'x' => 10,
        _ => return false,
    };

    let sum: u32 = bytes[..9]
        .iter()
        .enumerate()
        .map(|(i, b)| u32::from(b - b'0') * (10 - i as u32))
        .sum::<u32>()
        + check;
    sum % 11 == 0
}

fn convert_to_isbn13(isbn10: &str) -> String {
    let mut base = String::with_capacity(ISBN13_LEN);
    base.push_str(BOOKLAND_PREFIX);
    base.push_str(&isbn10[..9]);
    let check = (10 - isbn13_weighted_sum(&base) % 10) % 10;
    base.push(char::from(b'0' + check as u8));
    base
}
