use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("log.max_lines must be at least 2, got {value}")]
    InvalidMaxLines { value: usize },

    #[error("log.path must not be empty")]
    EmptyLogPath,

    #[error("capture.target must not be blank")]
    BlankTarget,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_log(config)?;
    validate_capture(config)?;
    Ok(())
}

fn validate_log(config: &Config) -> Result<(), ValidationError> {
    // Halving a single line keeps it, so the cap could never hold
    if config.log.max_lines < 2 {
        return Err(ValidationError::InvalidMaxLines {
            value: config.log.max_lines,
        });
    }
    if config.log.path.as_os_str().is_empty() {
        return Err(ValidationError::EmptyLogPath);
    }
    Ok(())
}

fn validate_capture(config: &Config) -> Result<(), ValidationError> {
    match config.capture.target.as_deref() {
        Some(target) if target.trim().is_empty() => Err(ValidationError::BlankTarget),
        _ => Ok(()),
    }
}
