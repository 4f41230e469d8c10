//! Short code generation and validation utilities.
//!
//! Generated codes are drawn uniformly from a 62-symbol alphanumeric alphabet
//! using the operating system's CSPRNG. Custom codes supplied by callers are
//! validated against the same alphabet.

use crate::error::AppError;
use serde_json::json;

/// Symbols a code may contain.
pub const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of generated codes unless configured otherwise.
pub const DEFAULT_CODE_LENGTH: usize = 4;

/// Longest code accepted, generated or custom.
pub const MAX_CODE_LENGTH: usize = 32;

/// Largest multiple of the alphabet size that fits in a byte.
///
/// Random bytes at or above it are discarded so that `byte % 62` stays uniform.
const REJECTION_BOUND: u8 = 248;

/// Codes that would shadow service routes.
const RESERVED_CODES: &[&str] = &["create", "dashboard", "api", "health", "static", "home"];

/// Produces random fixed-length candidate codes.
#[derive(Debug, Clone, Copy)]
pub struct CodeGenerator {
    length: usize,
}

impl CodeGenerator {
    /// Creates a generator for codes of `length` symbols.
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of distinct codes this generator can produce, if it fits in `u64`.
    pub fn namespace_size(&self) -> Option<u64> {
        let exponent = u32::try_from(self.length).ok()?;
        (ALPHABET.len() as u64).checked_pow(exponent)
    }

    /// Generates one candidate code.
    ///
    /// The candidate is not checked against any store.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the system random source fails.
    pub fn generate(&self) -> Result<String, AppError> {
        let mut code = String::with_capacity(self.length);
        let mut buffer = [0u8; 32];

        while code.len() < self.length {
            getrandom::fill(&mut buffer).map_err(|e| {
                AppError::internal(
                    "Random source unavailable",
                    json!({ "reason": e.to_string() }),
                )
            })?;

            for byte in buffer.iter().copied().filter(|b| *b < REJECTION_BOUND) {
                code.push(char::from(ALPHABET[usize::from(byte) % ALPHABET.len()]));
                if code.len() == self.length {
                    break;
                }
            }
        }

        Ok(code)
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LENGTH)
    }
}

/// Validates a caller-supplied custom code.
///
/// # Rules
///
/// - Length: 1-32 characters
/// - Allowed characters: ASCII letters and digits
/// - Cannot be a reserved route name
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if code.is_empty() || code.len() > MAX_CODE_LENGTH {
        return Err(AppError::bad_request(
            "Custom code must be 1-32 characters",
            json!({ "provided_length": code.len() }),
        ));
    }

    if !code.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(AppError::bad_request(
            "Custom code can only contain letters and digits",
            json!({ "code": code }),
        ));
    }

    if RESERVED_CODES.contains(&code) {
        return Err(AppError::bad_request(
            "This code is reserved",
            json!({ "code": code }),
        ));
    }

    Ok(())
}
