use crate::core::{CompressionOptions, ImageDescriptor};
use crate::utils::{CompressorResult, ValidationError};

/// Validates compression options before a run starts
pub fn validate_options(options: &CompressionOptions) -> CompressorResult<()> {
    if options.quality > 100 {
        return Err(ValidationError::Quality(options.quality as u32).into());
    }
    Ok(())
}

/// Validates a descriptor handed in by the bridge
pub fn validate_descriptor(image: &ImageDescriptor) -> CompressorResult<()> {
    if image.path.trim().is_empty() {
        return Err(ValidationError::EmptyPath.into());
    }
    Ok(())
}

pub fn validate_index(index: usize, len: usize) -> CompressorResult<()> {
    if index >= len {
        return Err(ValidationError::IndexOutOfRange { index, len }.into());
    }
    Ok(())
}
