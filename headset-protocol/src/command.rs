//! Menu command decoding.
//!
//! [`decode`] is total: every byte sequence maps to a command or a
//! [`DecodeError`], never a panic. Malformed traffic is an expected
//! condition on this link (the body controller also broadcasts to other
//! units), so a reject is not an event the decoder reports on - logging is
//! the receive loop's job.

/// Commands carried by menu packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuCommand {
    /// Switch the display to the given catalog page.
    PageSelect(u16),
}

/// Why a payload failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Zero-length payload.
    Empty,
    /// Payload is not valid UTF-8.
    NotUtf8,
    /// Payload text is not a known command token.
    NotACommand,
}

/// Decode a raw packet payload into a menu command.
pub fn decode(raw: &[u8]) -> Result<MenuCommand, DecodeError> {
    if raw.is_empty() {
        return Err(DecodeError::Empty);
    }

    let text = core::str::from_utf8(raw).map_err(|_| DecodeError::NotUtf8)?;

    parse_page_token(text)
        .map(MenuCommand::PageSelect)
        .ok_or(DecodeError::NotACommand)
}

/// Parse a page-number token: 1-5 ASCII decimal digits, no sign, no
/// whitespace. Page 0 is reserved (catalog numbers are positive).
fn parse_page_token(text: &str) -> Option<u16> {
    if text.is_empty() || text.len() > 5 {
        return None;
    }
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match text.parse::<u16>() {
        Ok(n) if n > 0 => Some(n),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_page_select() {
        assert_eq!(decode(b"30"), Ok(MenuCommand::PageSelect(30)));
        assert_eq!(decode(b"110"), Ok(MenuCommand::PageSelect(110)));
        assert_eq!(decode(b"65535"), Ok(MenuCommand::PageSelect(65535)));
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode(b""), Err(DecodeError::Empty));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        // lone continuation byte
        assert_eq!(decode(&[0x80]), Err(DecodeError::NotUtf8));
        assert_eq!(decode(&[b'3', 0xC0, b'0']), Err(DecodeError::NotUtf8));
    }

    #[test]
    fn test_decode_rejects_non_tokens() {
        assert_eq!(decode(b"hello"), Err(DecodeError::NotACommand));
        assert_eq!(decode(b"30x"), Err(DecodeError::NotACommand));
        assert_eq!(decode(b" 30"), Err(DecodeError::NotACommand));
        assert_eq!(decode(b"30 "), Err(DecodeError::NotACommand));
        assert_eq!(decode(b"-30"), Err(DecodeError::NotACommand));
        assert_eq!(decode(b"+30"), Err(DecodeError::NotACommand));
        assert_eq!(decode(b"3.0"), Err(DecodeError::NotACommand));
    }

    #[test]
    fn test_decode_rejects_page_zero() {
        assert_eq!(decode(b"0"), Err(DecodeError::NotACommand));
        assert_eq!(decode(b"000"), Err(DecodeError::NotACommand));
    }

    #[test]
    fn test_decode_rejects_out_of_range() {
        // six digits never fit the token grammar
        assert_eq!(decode(b"999999"), Err(DecodeError::NotACommand));
        // five digits that overflow u16
        assert_eq!(decode(b"65536"), Err(DecodeError::NotACommand));
        assert_eq!(decode(b"99999"), Err(DecodeError::NotACommand));
    }

    #[test]
    fn test_decode_accepts_leading_zeros() {
        // digits are digits; the sender's canonical form has none, but a
        // zero-padded token still names the same page
        assert_eq!(decode(b"030"), Ok(MenuCommand::PageSelect(30)));
    }

    mod totality {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Every input decodes to something; nothing panics.
            #[test]
            fn decode_is_total(raw in proptest::collection::vec(any::<u8>(), 0..128)) {
                let _ = decode(&raw);
            }

            // Successful decodes only ever come from pure digit strings.
            #[test]
            fn page_select_implies_digits(raw in proptest::collection::vec(any::<u8>(), 0..128)) {
                if decode(&raw).is_ok() {
                    prop_assert!(!raw.is_empty() && raw.len() <= 5);
                    prop_assert!(raw.iter().all(|b| b.is_ascii_digit()));
                }
            }
        }
    }
}
