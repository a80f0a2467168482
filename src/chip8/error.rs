use thiserror::Error;

#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("ROM is too large ({size} bytes), max size is {max} bytes")]
    RomTooLarge { size: usize, max: usize },

    #[error("key index {0} is outside the 16-key keypad")]
    InvalidKey(usize),

    #[error("failed to read ROM: {0}")]
    Io(#[from] std::io::Error),
}
