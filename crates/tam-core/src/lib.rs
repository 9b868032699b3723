//! Wire-level types shared by the TAM emulator crates.
//!
//! Nothing in this crate has behaviour beyond simple conversions: it exists
//! so that `format-tamcode`, `tam-vm`, and `tam-runner` agree on what a code
//! word, a register, and a fault look like without depending on each other.

mod error;
mod instruction;
mod opcode;
mod primitive;
mod register;

pub use error::{FaultKind, TamError};
pub use instruction::Instruction;
pub use opcode::Opcode;
pub use primitive::{PRIMITIVE_NAMES, primitive_name};
pub use register::Register;

/// A code store word: one 32-bit TAM instruction.
pub type CodeWord = u32;

/// A data store word: signed 16-bit, two's-complement.
pub type DataWord = i16;

/// An address into the code store or the data store.
pub type Addr = u16;

/// Number of addressable words in each store.
pub const MEM_SIZE: usize = 1 << 16;

/// Index of the highest-addressed word in memory.
pub const MAX_ADDR: Addr = (MEM_SIZE - 1) as Addr;

/// Number of primitive routines, including the unused index 0.
pub const PRIMITIVE_COUNT: u8 = 29;
