//! Every status the installer pipeline can report.
//!
//! The variants and their numeric codes form a closed taxonomy shared with
//! the underlying driver-installation library; the orchestration layer only
//! ever distinguishes success (`Ok`) from non-success, but the exact code is
//! preserved because it becomes the process exit code.

use thiserror::Error;

/// Alias to simplify implementing the results of installer functions.
pub type InstallResult<T> = Result<T, Error>;

#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Input/output error")]
    Io,

    #[error("Invalid parameter")]
    InvalidParam,

    #[error("Access denied (insufficient permissions)")]
    Access,

    #[error("No such device (it may have been disconnected)")]
    NoDevice,

    #[error("Entity not found")]
    NotFound,

    #[error("Resource busy, or API call already running")]
    Busy,

    #[error("Operation timed out")]
    Timeout,

    #[error("Overflow")]
    Overflow,

    #[error("Another installation is detected pending")]
    PendingInstallation,

    #[error("System call interrupted (perhaps due to signal)")]
    Interrupted,

    #[error("Could not acquire resource (insufficient memory)")]
    Resource,

    #[error("Operation not supported or unimplemented on this platform")]
    NotSupported,

    #[error("Entity already exists")]
    Exists,

    #[error("Cancelled by user")]
    UserCancel,

    #[error("Couldn't run installer with required privileges")]
    NeedsAdmin,

    #[error("Attempted to run the 32 bit installer on 64 bit")]
    Wow64,

    #[error("Bad inf syntax")]
    InfSyntax,

    #[error("Missing cat file")]
    CatMissing,

    #[error("System policy prevents the installation of unsigned drivers")]
    Unsigned,

    #[error("Other error")]
    Other,
}

impl Error {
    /// The numeric status code for this error, as reported by the
    /// installation library and used as the process exit code.
    pub fn code(&self) -> i32 {
        use Error::*;

        match self {
            Io => -1,
            InvalidParam => -2,
            Access => -3,
            NoDevice => -4,
            NotFound => -5,
            Busy => -6,
            Timeout => -7,
            Overflow => -8,
            PendingInstallation => -9,
            Interrupted => -10,
            Resource => -11,
            NotSupported => -12,
            Exists => -13,
            UserCancel => -14,
            NeedsAdmin => -15,
            Wow64 => -16,
            InfSyntax => -17,
            CatMissing => -18,
            Unsigned => -19,
            Other => -99,
        }
    }

    /// Converts a raw status code into a result; 0 is success, anything the
    /// taxonomy doesn't know collapses to [Error::Other].
    pub fn check(code: i32) -> InstallResult<()> {
        use Error::*;

        match code {
            0 => Ok(()),
            -1 => Err(Io),
            -2 => Err(InvalidParam),
            -3 => Err(Access),
            -4 => Err(NoDevice),
            -5 => Err(NotFound),
            -6 => Err(Busy),
            -7 => Err(Timeout),
            -8 => Err(Overflow),
            -9 => Err(PendingInstallation),
            -10 => Err(Interrupted),
            -11 => Err(Resource),
            -12 => Err(NotSupported),
            -13 => Err(Exists),
            -14 => Err(UserCancel),
            -15 => Err(NeedsAdmin),
            -16 => Err(Wow64),
            -17 => Err(InfSyntax),
            -18 => Err(CatMissing),
            -19 => Err(Unsigned),
            _ => Err(Other),
        }
    }
}

/// Human-readable status text for a pipeline step, success included.
pub fn status_text(result: &InstallResult<()>) -> String {
    match result {
        Ok(()) => "Success".to_string(),
        Err(e) => e.to_string(),
    }
}

/// The status code for a finished run: 0 for success, the error's code
/// otherwise. This is what the process exits with.
pub fn status_code(result: &InstallResult<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => e.code(),
    }
}
