use std::fmt;

#[derive(Debug)]
pub enum BandmixError {
    Decode(DecodeError),
    Render(RenderError),
    Service(ServiceError),
}

/// The uploaded bytes could not be turned into a sample buffer.
#[derive(Debug)]
pub enum DecodeError {
    EmptyFile,
    UnsupportedFormat,
    CorruptStream { detail: String },
    NoChannels,
}

/// The offline mixdown could not be completed.
#[derive(Debug)]
pub enum RenderError {
    EmptyBuffer,
    ChannelMismatch { expected: usize, got: usize },
}

/// The suggestion service call failed. Always converted to fallback
/// text at the boundary, never surfaced to the user as an error.
#[derive(Debug)]
pub enum ServiceError {
    MissingApiKey,
    Network { detail: String },
    Api { status: u16, message: String },
    EmptyResponse,
}

impl fmt::Display for BandmixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BandmixError::Decode(e) => write!(f, "Decode error: {e}"),
            BandmixError::Render(e) => write!(f, "Render error: {e}"),
            BandmixError::Service(e) => write!(f, "Service error: {e}"),
        }
    }
}

impl std::error::Error for BandmixError {}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::EmptyFile => write!(f, "Audio file is empty"),
            DecodeError::UnsupportedFormat => write!(f, "Unsupported audio container or codec"),
            DecodeError::CorruptStream { detail } => write!(f, "Corrupt audio stream: {detail}"),
            DecodeError::NoChannels => write!(f, "Audio stream has no channels"),
        }
    }
}

impl std::error::Error for DecodeError {}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::EmptyBuffer => write!(f, "Nothing to render: buffer has no audio"),
            RenderError::ChannelMismatch { expected, got } => {
                write!(f, "Channel count mismatch: expected {expected}, got {got}")
            }
        }
    }
}

impl std::error::Error for RenderError {}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::MissingApiKey => write!(f, "No API key configured"),
            ServiceError::Network { detail } => write!(f, "Network failure: {detail}"),
            ServiceError::Api { status, message } => {
                write!(f, "Service responded with status {status}: {message}")
            }
            ServiceError::EmptyResponse => write!(f, "Service returned no text"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<DecodeError> for BandmixError {
    fn from(e: DecodeError) -> Self {
        BandmixError::Decode(e)
    }
}

impl From<RenderError> for BandmixError {
    fn from(e: RenderError) -> Self {
        BandmixError::Render(e)
    }
}

impl From<ServiceError> for BandmixError {
    fn from(e: ServiceError) -> Self {
        BandmixError::Service(e)
    }
}
