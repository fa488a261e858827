//! Error handling module for the TV-out sequencer

use core::fmt;

/// POSIX error numbers surfaced to the device-node layer
pub mod errno {
    /// No such file or directory
    pub const ENOENT: i32 = 2;
    /// Input/output error
    pub const EIO: i32 = 5;
    /// Permission denied
    pub const EACCES: i32 = 13;
    /// Device or resource busy
    pub const EBUSY: i32 = 16;
    /// No such device
    pub const ENODEV: i32 = 19;
    /// Invalid argument
    pub const EINVAL: i32 = 22;
}

/// Failure code reported by an external collaborator (regulator, clock
/// framework, power-domain framework, display hardware)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HwError(pub i32);

impl HwError {
    /// Generic I/O failure
    pub const IO: HwError = HwError(errno::EIO);
    /// Handle does not refer to a usable device
    pub const NO_DEVICE: HwError = HwError(errno::ENODEV);
    /// Collaborator rejected the request as malformed
    pub const INVALID: HwError = HwError(errno::EINVAL);

    /// Raw error number carried by this failure
    pub fn code(self) -> i32 {
        self.0
    }
}

impl fmt::Display for HwError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hardware error {}", self.0)
    }
}

/// Result type for collaborator calls
pub type HwResult<T = ()> = core::result::Result<T, HwError>;

/// Common error type used throughout the TV-out sequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Regulator failure; the rail flag is left in its prior state
    Power(HwError),
    /// Power-domain acquisition or release failure
    ClockDomain {
        /// Name of the power domain that refused the request
        domain: &'static str,
    },
    /// Operation invoked out of its required order
    PrecedenceViolation(&'static str),
    /// Resource already owned by another session
    Busy,
    /// Output pipeline is not enabled
    NotReady,
    /// Output pipeline is already enabled
    AlreadyEnabled,
    /// Missing resource handle or unknown index
    NotFound(&'static str),
    /// Invalid argument
    InvalidArgument(&'static str),
    /// Display hardware or clock framework failure
    Hardware(HwError),
}

impl Error {
    /// POSIX error number for this error (positive value)
    pub fn errno(&self) -> i32 {
        match self {
            Error::Busy | Error::AlreadyEnabled => errno::EBUSY,
            Error::NotReady => errno::EACCES,
            Error::NotFound(_) => errno::ENOENT,
            Error::InvalidArgument(_) | Error::PrecedenceViolation(_) => errno::EINVAL,
            Error::Power(_) | Error::ClockDomain { .. } | Error::Hardware(_) => errno::EIO,
        }
    }

    /// Whether this error must abort the remainder of a cascade
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Power(_) | Error::ClockDomain { .. })
    }

    /// Whether the caller may simply retry later
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Busy | Error::NotReady)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Power(err) => write!(f, "Power rail error: {}", err),
            Error::ClockDomain { domain } => write!(f, "Power domain {} not available", domain),
            Error::PrecedenceViolation(msg) => write!(f, "Precedence violation: {}", msg),
            Error::Busy => write!(f, "Resource busy"),
            Error::NotReady => write!(f, "Output pipeline not enabled"),
            Error::AlreadyEnabled => write!(f, "Output pipeline already enabled"),
            Error::NotFound(what) => write!(f, "Not found: {}", what),
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::Hardware(err) => write!(f, "Hardware error: {}", err),
        }
    }
}

/// Result type for operations that can fail
pub type Result<T> = core::result::Result<T, Error>;

/// Converts an operation result into the return convention of the
/// device-node layer: `0` on success, negative errno on failure
pub fn to_errno<T>(result: &Result<T>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(err) => -err.errno(),
    }
}

/// Creates a new not found error
pub fn not_found(what: &'static str) -> Error {
    Error::NotFound(what)
}

/// Creates a new invalid argument error
pub fn invalid_argument(msg: &'static str) -> Error {
    Error::InvalidArgument(msg)
}

/// Creates a new precedence violation error
pub fn precedence_violation(msg: &'static str) -> Error {
    Error::PrecedenceViolation(msg)
}
