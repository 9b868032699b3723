//! The TAM fault model: every engine failure carries a kind and, except for
//! I/O failures, the code address of the faulting instruction.

use std::fmt;

use thiserror::Error;

use crate::Addr;

/// A kind of runtime fault, excluding I/O failures (which carry a message
/// instead of an address).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    CodeAccessViolation,
    DataAccessViolation,
    StackUnderflow,
    StackOverflow,
    HeapOverflow,
    UnknownOpcode,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CodeAccessViolation => "CodeAccessViolation",
            Self::DataAccessViolation => "DataAccessViolation",
            Self::StackUnderflow => "StackUnderflow",
            Self::StackOverflow => "StackOverflow",
            Self::HeapOverflow => "HeapOverflow",
            Self::UnknownOpcode => "UnknownOpcode",
        };
        f.write_str(name)
    }
}

/// Every way that executing a TAM program can fail.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TamError {
    /// A memory, stack, heap, or decode fault at a specific code address.
    #[error("{kind} at loc {addr:04x}")]
    Fault { kind: FaultKind, addr: Addr },

    /// A failure reading the program file or talking to the I/O streams.
    #[error("IO error: {0}")]
    Io(String),
}

impl TamError {
    /// Construct a fault with its faulting address.
    #[must_use]
    pub const fn fault(kind: FaultKind, addr: Addr) -> Self {
        Self::Fault { kind, addr }
    }

    /// Construct an I/O error from a free-form message.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }
}
