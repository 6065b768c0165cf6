mod tools;
pub mod table;
pub mod huffman;
pub mod static_huff;

/// Maximum length of a code table's name in bytes, including the
/// terminating NUL in the file image.
pub const MAX_NAME: usize = 32;
/// Maximum number of symbols in an alphabet.  Covers the full keyboard
/// character range with room to spare; larger alphabets would want a
/// different table layout.
pub const MAX_ALPHABET_LEN: usize = 128;
/// Maximum length of any single code in bits.
pub const MAX_CODE_BITS: usize = 32;
/// First bytes of every code table file.
pub const MAGIC: &[u8;5] = b"HFENC";
/// Marks the end of a code in the file's fixed-width code arrays,
/// distinct from the bit values 0 and 1.
pub const CODE_END: i32 = -1;

/// Codec errors
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("alphabet must have 2 to {MAX_ALPHABET_LEN} symbols with finite non-negative weights")]
    InvalidAlphabet,
    #[error("code would exceed {MAX_CODE_BITS} bits")]
    EncodingTooLong,
    #[error("symbol {0:#04x} is not in the code table")]
    UnknownSymbol(u8),
    #[error("compressed stream is malformed")]
    MalformedEncoding,
    #[error("code table file format mismatch")]
    InvalidFormat,
    #[error("priority queue is full")]
    QueueFull,
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error)
}
