use std::path::Path;

use crate::machine::MEMORY_SIZE;

use super::{ImageFormat, LoaderError};

/// Read a program file and build the initial memory image from it
pub fn load_image(
    path: impl AsRef<Path>,
    format: ImageFormat,
    offset: usize,
) -> Result<[u8; MEMORY_SIZE], LoaderError> {
    let bytes = match format {
        ImageFormat::Raw => std::fs::read(path)?,
        ImageFormat::Hex => parse_hex(&std::fs::read_to_string(path)?)?,
    };
    place(&bytes, offset)
}

/// Copy `bytes` into a zeroed image starting at `offset`
pub fn place(bytes: &[u8], offset: usize) -> Result<[u8; MEMORY_SIZE], LoaderError> {
    if offset > MEMORY_SIZE || bytes.len() > MEMORY_SIZE - offset {
        return Err(LoaderError::ImageTooLarge {
            len: bytes.len(),
            offset,
        });
    }

    let mut memory = [0u8; MEMORY_SIZE];
    memory[offset..offset + bytes.len()].copy_from_slice(bytes);
    Ok(memory)
}

/// Parse text like `05 01 07  # addi r1, 7` into bytes
pub fn parse_hex(text: &str) -> Result<Vec<u8>, LoaderError> {
    let mut bytes = vec![];
    for (i, line) in text.lines().enumerate() {
        // everything after a '#' is a comment
        let code = line.split('#').next().unwrap_or("");
        for token in code.split_whitespace() {
            let digits = token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token);
            if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(LoaderError::InvalidHexByte {
                    line: i + 1,
                    token: token.to_string(),
                });
            }
            let byte = u8::from_str_radix(digits, 16).map_err(|_| LoaderError::InvalidHexByte {
                line: i + 1,
                token: token.to_string(),
            })?;
            bytes.push(byte);
        }
    }
    Ok(bytes)
}
