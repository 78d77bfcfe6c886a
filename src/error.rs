//! Centralised error hierarchy for the **Tern interpreter**.
//!
//! All subsystems (scanner, parser, runtime, CLI) must convert their internal
//! failure modes into one of the variants defined here.  This enables a
//! uniform `Result<T>` alias throughout the crate and ergonomic
//! inter‑operation with `anyhow`, while still preserving rich diagnostic
//! detail.
//!
//! The module **does not** print diagnostics itself

use std::io;
use thiserror::Error;

use log::debug;

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TernError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.
    #[error("[line {line}] Error: {message}")]
    Parse { message: String, line: usize },

    /// Runtime evaluation error.
    #[error("{0}")]
    Runtime(#[from] RuntimeError),

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl TernError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Lex error: line={}, msg={}", line, message);

        TernError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Parse error: line={}, msg={}", line, message);

        TernError::Parse { message, line }
    }
}

/// Failures the evaluator can raise while executing a program.
///
/// Every variant is fatal to the run: the interpreter reports the first one
/// encountered and abandons the remaining statements.  Each carries the
/// source line of the offending token.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RuntimeError {
    /// A name was read or assigned that no enclosing scope declares.
    #[error("[line {line}] Undefined variable '{name}'.")]
    UndefinedVariable { name: String, line: usize },

    /// An operand had the wrong type for its operator or position.
    #[error("[line {line}] {message}")]
    TypeMismatch { message: String, line: usize },

    /// Right operand of `/` was zero.
    #[error("[line {line}] Division by zero.")]
    DivisionByZero { line: usize },

    /// A call supplied the wrong number of arguments.
    #[error("[line {line}] Expected {expected} arguments but got {got}.")]
    ArityMismatch {
        expected: usize,
        got: usize,
        line: usize,
    },

    /// The callee of a call expression was not a function.
    #[error("[line {line}] Can only call functions.")]
    NotCallable { line: usize },

    /// A `return` statement executed outside of any function call.
    #[error("[line {line}] Cannot return from top-level code.")]
    StrayReturn { line: usize },

    /// Writing to the output sink failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl RuntimeError {
    /// Helper constructor for operand type failures.
    pub fn type_mismatch<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating TypeMismatch error: line={}, msg={}", line, message);

        RuntimeError::TypeMismatch { message, line }
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, TernError>;
