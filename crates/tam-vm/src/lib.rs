//! The Triangle Abstract Machine emulator engine.
//!
//! [`Emulator`] owns the code store, the data store, the register file, and
//! the heap bookkeeping maps, and drives the fetch-decode-execute cycle one
//! instruction at a time. Nothing here reads a file or parses a command
//! line; that is [`format_tamcode`](../format_tamcode/index.html) and the
//! host binary's job.

mod emulator;
mod execute;
mod heap;
mod io;
mod memory;
mod primitives;
mod snapshot;
#[cfg(feature = "test-util")]
mod testutil;

pub use emulator::Emulator;
pub use snapshot::mnemonic;

/// `Ok(true)` to keep fetching, `Ok(false)` after a `HALT`.
pub type StepResult = Result<bool, tam_core::TamError>;
