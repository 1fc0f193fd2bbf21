use clap::ValueEnum;
use thiserror::Error;

pub mod loader;

/// How a program file is laid out on disk
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Bytes copied verbatim
    Raw,
    /// Whitespace separated hex bytes, `#` starts a comment
    Hex,
}

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO Error: {0}")]
    FileIO(
        #[from]
        std::io::Error,
    ),

    #[error("Invalid hex byte `{token:}` on line {line:}")]
    InvalidHexByte { line: usize, token: String },

    #[error("Image of {len:} bytes at offset {offset:} doesn't fit in memory")]
    ImageTooLarge { len: usize, offset: usize },
}
