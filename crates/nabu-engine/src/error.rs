use std::fmt;
use std::panic::Location;

/// Result alias used by the GPU core.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the GPU core and its backends.
///
/// Application-level code wraps these in `anyhow::Error` with extra context.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A native API call returned a failure status.
    #[error("{0}")]
    Api(ApiError),

    /// A system call returned a null or zero handle.
    #[error("{0}")]
    OsHandle(ApiError),

    /// A fixed-capacity resource container is full.
    #[error("resource container '{container}' is full (capacity {capacity})")]
    CapacityExceeded {
        container: &'static str,
        capacity: usize,
    },

    /// An id that was never handed out, or was already released.
    #[error("invalid id {id} for resource container '{container}'")]
    InvalidId { container: &'static str, id: u32 },

    #[error("descriptor index {index} out of range for heap of {count} descriptors")]
    DescriptorOutOfRange { index: u32, count: u32 },

    #[error("failed to compile shader '{name}':\n{diagnostic}")]
    ShaderCompilation { name: String, diagnostic: String },

    #[error("unsupported vertex attribute: {format:?} with {dimension} components")]
    UnsupportedVertexAttribute {
        format: crate::resource::VertexAttribFormat,
        dimension: u32,
    },

    #[error("unsupported index element size of {0} bytes")]
    UnsupportedIndexFormat(usize),

    /// A pipeline state was created before a required facet was set.
    #[error("graphics pipeline is missing its {0}")]
    IncompletePipeline(&'static str),

    #[error("no hardware adapter supports feature level {feature_level}")]
    NoSuitableAdapter {
        feature_level: crate::hal::FeatureLevel,
    },

    /// The operation is declared but deliberately not implemented.
    #[error("{0} is not supported")]
    Unsupported(&'static str),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Builds an [`Error::Api`] carrying the caller's source location.
    #[track_caller]
    pub fn api(operation: &'static str, user_message: impl Into<String>, system_message: impl Into<String>) -> Self {
        Error::Api(ApiError::new(operation, user_message, system_message))
    }

    /// Builds an [`Error::OsHandle`] carrying the caller's source location.
    #[track_caller]
    pub fn os_handle(operation: &'static str, user_message: impl Into<String>, system_message: impl Into<String>) -> Self {
        Error::OsHandle(ApiError::new(operation, user_message, system_message))
    }

    /// Returns true for the native/OS failure classes.
    pub fn is_api_failure(&self) -> bool {
        matches!(self, Error::Api(_) | Error::OsHandle(_))
    }
}

/// Structured context for a failed native call.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub file: &'static str,
    pub line: u32,
    /// Name of the API entry point that failed.
    pub operation: &'static str,
    pub user_message: String,
    pub system_message: String,
}

impl ApiError {
    #[track_caller]
    pub fn new(operation: &'static str, user_message: impl Into<String>, system_message: impl Into<String>) -> Self {
        let location = Location::caller();
        Self {
            file: location.file(),
            line: location.line(),
            operation,
            user_message: user_message.into(),
            system_message: system_message.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "********** DX12 API ERROR **********")?;
        writeln!(f, "[FILE]: {}", self.file)?;
        writeln!(f, "[FUNCTION]: {}", self.operation)?;
        writeln!(f, "[LINE]: {}", self.line)?;
        writeln!(f, "[USER MESSAGE]: {}", self.user_message)?;
        write!(f, "[SYSTEM MESSAGE]: {}", self.system_message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_records_caller_location() {
        let line = line!() + 1;
        let err = ApiError::new("CreateFence", "failed to create fence", "E_OUTOFMEMORY");
        assert_eq!(err.line, line);
        assert!(err.file.ends_with("error.rs"));
    }

    #[test]
    fn api_error_banner_lists_every_field() {
        let text = Error::api("Present", "failed to present", "DXGI_ERROR_DEVICE_REMOVED").to_string();
        assert!(text.starts_with("********** DX12 API ERROR **********"));
        assert!(text.contains("[FUNCTION]: Present"));
        assert!(text.contains("[USER MESSAGE]: failed to present"));
        assert!(text.contains("[SYSTEM MESSAGE]: DXGI_ERROR_DEVICE_REMOVED"));
    }

    #[test]
    fn capacity_error_is_not_an_api_failure() {
        let err = Error::CapacityExceeded { container: "meshes", capacity: 64 };
        assert!(!err.is_api_failure());
        assert_eq!(err.to_string(), "resource container 'meshes' is full (capacity 64)");
    }
}
