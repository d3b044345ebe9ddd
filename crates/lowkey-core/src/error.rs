use std::string::FromUtf8Error;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LowkeyError {
    /// Represents an unsupported carrier media. For example, a PDF file is not supported
    #[error("Carrier format is not supported")]
    UnsupportedCarrier,

    /// Represents an invalid carrier audio media. For example, a broken WAV file
    #[error("Audio carrier is invalid")]
    InvalidAudioCarrier,

    /// Represents an invalid carrier image media. For example, a broken PNG file
    #[error("Image carrier is invalid")]
    InvalidImageCarrier,

    /// Represents a WAV carrier with a sample format the embedding cannot address,
    /// such as float samples or a bit width other than 8, 16 or 24
    #[error("Unsupported PCM sample width: {0} bits")]
    UnsupportedPcmWidth(u16),

    /// Represents an empty secret key
    #[error("Secret key must not be empty")]
    EmptyKey,

    /// Represents an LSB depth outside of 1..=8
    #[error("LSB depth {0} is out of range, must be between 1 and 8")]
    InvalidLsbDepth(u8),

    /// Represents an embedding region that is degenerate or exceeds the carrier dimensions
    #[error("Embedding region is out of bounds for this carrier")]
    InvalidRegion,

    /// Represents a carrier with fewer units than the fixed header needs
    #[error("Carrier is too small: the header needs {needed} units but only {available} are available")]
    InsufficientCapacity { needed: usize, available: usize },

    /// Represents a payload that does not fit the candidate units at the chosen depth
    #[error("Payload needs {needed_bits} bits but the carrier offers {capacity_bits} at this depth")]
    PayloadTooLarge { needed_bits: u64, capacity_bits: u64 },

    /// Represents a carrier whose header bits do not parse, e.g. a magic mismatch
    /// on plain media or a truncated carrier
    #[error("No valid payload header found in this carrier")]
    CorruptHeader,

    /// Represents a key whose authentication prefix does not match the stored one
    #[error("Wrong secret key for this carrier")]
    WrongKey,

    /// Represents a carrier with fewer candidate bits than the header declares,
    /// pointing to truncation or an LSB depth mismatch
    #[error("Carrier holds {available_bits} candidate bits but the header declares {needed_bits}")]
    IncompleteData { needed_bits: u64, available_bits: u64 },

    /// Represents a declared length outside its sane bounds
    #[error("Declared {field} of {value} is out of range")]
    InvalidLength { field: &'static str, value: u64 },

    /// Represents an error caused by an invalid filename, for example an unsupported
    /// charset, path separators or an empty filename
    #[error("A file with an invalid file name was provided")]
    InvalidFileName,

    /// Represents the error of invalid UTF-8 data where text was expected
    #[error("Invalid text data found inside a payload")]
    InvalidTextData(#[from] FromUtf8Error),

    /// Represents a frame extraction or splicing subprocess that failed
    #[error("{tool} failed: {detail}")]
    ExternalToolFailure { tool: &'static str, detail: String },

    /// Represents a failure when encoding an image file.
    #[error("Image encoding error")]
    ImageEncodingError,

    /// Represents a failure when creating an audio file.
    #[error("Audio creation error")]
    AudioCreationError,

    /// Represents a failure when encoding an audio file.
    #[error("Audio encoding error")]
    AudioEncodingError,

    /// Represents a failure to read from input.
    #[error("Read error")]
    ReadError { source: std::io::Error },

    /// Represents a failure to write the target file.
    #[error("Write error")]
    WriteError { source: std::io::Error },

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}
