pub mod error;
pub mod validation;
pub mod formats;
pub mod fs;
pub mod display;

pub use error::{CompressorError, CompressorResult, ValidationError};
pub use validation::{validate_options, validate_descriptor, validate_index};
pub use formats::{
    ImageFormat,
    format_from_extension,
    compressed_file_name,
    numbered_file_name,
    to_data_uri,
    base64_payload,
    decode_base64,
};
pub use fs::{read_file, write_file, extract_filename};
pub use display::{round2, bytes_to_mb, format_mb, format_duration, format_seconds};
