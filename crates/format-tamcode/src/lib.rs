//! Parser for the TAM binary program image format.
//!
//! A TAM binary is a flat sequence of big-endian 32-bit code words, one per
//! instruction, with no header. The only structural constraint is that the
//! file length is a multiple of 4.

use std::fmt;

use tam_core::CodeWord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    /// The file length was not a multiple of 4, so the final word is
    /// incomplete.
    IncompleteInstruction,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncompleteInstruction => {
                write!(f, "program file contained incomplete instruction")
            }
        }
    }
}

impl std::error::Error for FormatError {}

/// Parse a TAM binary image into its sequence of code words.
///
/// Does not validate that the decoded words are semantically valid
/// instructions, nor that the program fits in memory — that is
/// `tam_vm::Emulator::load_program`'s job, since it alone knows `MEM_SIZE`.
pub fn parse(bytes: &[u8]) -> Result<Vec<CodeWord>, FormatError> {
    if bytes.len() % 4 != 0 {
        return Err(FormatError::IncompleteInstruction);
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Encode a sequence of code words back into big-endian bytes.
///
/// Used by tests and by tooling that assembles or round-trips TAM binaries.
#[must_use]
pub fn encode(words: &[CodeWord]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(words.len() * 4);
    for word in words {
        bytes.extend_from_slice(&word.to_be_bytes());
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_size_not_multiple_of_four() {
        assert_eq!(parse(&[0, 0, 0]), Err(FormatError::IncompleteInstruction));
        assert_eq!(parse(&[0, 0, 0, 0, 0]), Err(FormatError::IncompleteInstruction));
    }

    #[test]
    fn accepts_empty_program() {
        assert_eq!(parse(&[]), Ok(vec![]));
    }

    #[test]
    fn decodes_big_endian_words() {
        let bytes = [0xF0, 0x00, 0x00, 0x00, 0x3E, 0x00, 0x00, 0x58];
        assert_eq!(parse(&bytes), Ok(vec![0xF000_0000, 0x3E00_0058]));
    }

    #[test]
    fn encode_parse_round_trip() {
        let words = vec![0x0000_0000, 0xDEAD_BEEF, 0x1234_5678];
        let bytes = encode(&words);
        assert_eq!(parse(&bytes), Ok(words));
    }

    #[test]
    fn error_message_matches_spec() {
        let err = parse(&[0, 0, 0]).unwrap_err();
        assert_eq!(err.to_string(), "program file contained incomplete instruction");
    }
}
