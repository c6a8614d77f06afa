// [apps/atomic-cli/src/failure.rs]
//! The CLI's single failure path (spec §7): every error funnels through
//! `CliError`, which prints one line of `{status, error, code}` JSON to
//! stderr and exits with the documented code. Nothing else in this
//! binary calls `std::process::exit` directly.

use std::fmt;

/// Exit codes named in spec §6's CLI surface. `Generic` covers `mint`
/// and `price`, which the spec does not assign a dedicated taxonomy to.
#[derive(Debug, Clone, Copy)]
pub enum ExitCode {
    InvalidToken = 2,
    InputError = 3,
    IoError = 4,
    ClassificationError = 5,
    InsufficientAtoms = 10,
    ValidatorRejected = 11,
    Generic = 1,
}

#[derive(Debug)]
pub struct CliError {
    pub code: ExitCode,
    pub message: String,
}

impl CliError {
    pub fn new(code: ExitCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ExitCode::InvalidToken, message)
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(ExitCode::InputError, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ExitCode::IoError, message)
    }

    pub fn classification(message: impl Into<String>) -> Self {
        Self::new(ExitCode::ClassificationError, message)
    }

    pub fn insufficient_atoms(message: impl Into<String>) -> Self {
        Self::new(ExitCode::InsufficientAtoms, message)
    }

    pub fn validator_rejected(message: impl Into<String>) -> Self {
        Self::new(ExitCode::ValidatorRejected, message)
    }

    pub fn generic(message: impl Into<String>) -> Self {
        Self::new(ExitCode::Generic, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Prints spec §7's single-line stderr JSON and exits with `error.code`.
/// Never returns.
pub fn fail(error: CliError) -> ! {
    let code = error.code as i32;
    let body = serde_json::json!({
        "status": "error",
        "error": error.message,
        "code": code,
    });
    eprintln!("{body}");
    std::process::exit(code);
}
