//! Content classification of artifact pairs.
//!
//! A buffer counts as binary when it holds any byte outside the allow-list of
//! printable and common control bytes. When either side is binary, the path's
//! guessed MIME type decides between [`ContentKind::Image`] and
//! [`ContentKind::Binary`].

use std::path::Path;

use mime_guess::mime;

use crate::types::ContentKind;

/// Control bytes that may appear in text: BEL, BS, TAB, LF, FF, CR, ESC.
const TEXT_CONTROL_BYTES: [u8; 7] = [0x07, 0x08, 0x09, 0x0A, 0x0C, 0x0D, 0x1B];

static TEXT_BYTES: [bool; 256] = build_text_table();

const fn build_text_table() -> [bool; 256] {
    let mut table = [false; 256];
    let mut b = 0x20;
    while b < 0xFF {
        table[b] = b != 0x7F;
        b += 1;
    }
    let mut i = 0;
    while i < TEXT_CONTROL_BYTES.len() {
        table[TEXT_CONTROL_BYTES[i] as usize] = true;
        i += 1;
    }
    table
}

/// Whether `bytes` contains any byte outside the text allow-list.
///
/// An empty buffer is never binary.
pub fn is_binary(bytes: &[u8]) -> bool {
    bytes.iter().any(|&b| !TEXT_BYTES[b as usize])
}

/// Whether `path` guesses to an `image/*` MIME type.
pub fn is_image_path(path: &str) -> bool {
    mime_guess::from_path(Path::new(path))
        .iter()
        .any(|m| m.type_() == mime::IMAGE)
}

/// Classify an artifact pair.
///
/// Deterministic and total: unrecognised or malformed paths are treated as
/// non-image.
pub fn classify(old_bytes: &[u8], new_bytes: &[u8], path: &str) -> ContentKind {
    if !is_binary(old_bytes) && !is_binary(new_bytes) {
        return ContentKind::Text;
    }
    if is_image_path(path) {
        ContentKind::Image
    } else {
        ContentKind::Binary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_plain_text() {
        assert_eq!(
            classify(b"fn main() {}\n", b"fn main() { }\r\n\t", "main.rs"),
            ContentKind::Text
        );
    }

    #[test]
    fn test_empty_buffers_are_text() {
        assert_eq!(classify(b"", b"", "x.png"), ContentKind::Text);
        assert_eq!(classify(b"", b"hello", "x.bin"), ContentKind::Text);
    }

    #[test]
    fn test_nul_byte_in_old_is_binary() {
        assert_eq!(classify(b"ab\x00cd", b"plain", "data.bin"), ContentKind::Binary);
        assert_eq!(classify(b"ab\x00cd", b"", "data"), ContentKind::Binary);
    }

    #[test]
    fn test_nul_byte_with_image_path() {
        assert_eq!(classify(b"\x89PNG\x00", b"", "logo.png"), ContentKind::Image);
        assert_eq!(classify(b"", b"\x00", "photo.JPG"), ContentKind::Image);
    }

    #[test]
    fn test_allow_list_edges() {
        for b in TEXT_CONTROL_BYTES {
            assert!(!is_binary(&[b]), "byte {:#04x} should be text", b);
        }
        assert!(!is_binary(&[0x20]));
        assert!(!is_binary(&[0x7E]));
        assert!(!is_binary(&[0x80]));
        assert!(!is_binary(&[0xFE]));

        assert!(is_binary(&[0x00]));
        assert!(is_binary(&[0x0B]));
        assert!(is_binary(&[0x1F]));
        assert!(is_binary(&[0x7F]));
        assert!(is_binary(&[0xFF]));
    }

    #[test]
    fn test_binary_without_extension() {
        assert_eq!(classify(b"\x01", b"\x02", "Makefile"), ContentKind::Binary);
        assert_eq!(classify(b"\x01", b"", ""), ContentKind::Binary);
        assert_eq!(classify(b"\x01", b"", "weird/..//.png/"), ContentKind::Binary);
    }

    proptest! {
        #[test]
        fn classify_is_total(old in proptest::collection::vec(any::<u8>(), 0..64),
                             new in proptest::collection::vec(any::<u8>(), 0..64),
                             path in ".{0,24}") {
            let kind = classify(&old, &new, &path);
            let binary = is_binary(&old) || is_binary(&new);
            prop_assert_eq!(kind == ContentKind::Text, !binary);
        }
    }
}
