//! A bunch of wrap errors.
use crate::prelude::chord_core;

/// A wrap `Result` contains custom errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors enum mapping global custom errors.
/// The error type can be expressed in decimal, where the high decs represent
/// the error category and the low decs represent the error type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
#[repr(u32)]
pub enum Error {
    #[error("Config has no identity to seed the ring.")]
    NoSeedIdentity = 100,
    #[error("Processor is stopped.")]
    ProcessorStopped = 101,
    #[error("Join ring error: {0}.")]
    JoinError(chord_core::error::Error) = 200,
    #[error("Create node error: {0}.")]
    CreateNodeError(chord_core::error::Error) = 201,
    #[error("Storage Error: {0}")]
    Storage(chord_core::error::Error) = 807,
    #[error("Invalid logging level: {0}")]
    InvalidLoggingLevel(String) = 809,
    #[error("Create File Error: {0}")]
    CreateFileError(String) = 900,
    #[error("Open File Error: {0}")]
    OpenFileError(String) = 901,
    #[error("Cannot find home directory")]
    HomeDirError = 903,
    #[error("Cannot find parent directory")]
    ParentDirError = 904,
    #[error("Serde yaml error: {0}")]
    SerdeYamlError(#[from] serde_yaml::Error) = 1001,
    #[error("Core error: {0}")]
    CoreError(#[from] chord_core::error::Error) = 1102,
}

impl Error {
    fn discriminant(&self) -> u32 {
        // SAFETY: `Self` is `repr(u32)`, so its layout is a `repr(C)` union of
        // `repr(C)` structs which all start with the `u32` discriminant.
        // ref: https://doc.rust-lang.org/std/mem/fn.discriminant.html
        unsafe { *<*const _>::from(self).cast::<u32>() }
    }

    pub fn code(&self) -> u32 {
        self.discriminant()
    }

    /// Stale routing in the core resolves itself after stabilization.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::JoinError(e) | Error::Storage(e) | Error::CoreError(e) => e.is_retryable(),
            _ => false,
        }
    }
}
