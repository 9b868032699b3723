//! Setters for building specific starting states in tests.
//!
//! Gated behind the `test-util` feature rather than folded into the main
//! API: an emulator under normal use only ever reaches a state by
//! executing instructions, and should keep it that way.

use tam_core::{Addr, DataWord, Register};

use crate::emulator::Emulator;

impl Emulator {
    #[must_use]
    pub fn register_for_test(&self, r: Register) -> Addr {
        self.reg(r)
    }

    pub fn set_register_for_test(&mut self, r: Register, value: Addr) {
        self.set_reg(r, value);
    }

    pub fn set_data_for_test(&mut self, addr: Addr, value: DataWord) {
        self.set_data_at(addr, value);
    }

    /// Push directly onto the stack, bypassing instruction dispatch.
    /// Panics on overflow; callers build states that are known to fit.
    pub fn push_for_test(&mut self, value: DataWord) {
        self.push(value, 0).expect("test setup pushed past HT");
    }

    /// Pop directly off the stack, bypassing instruction dispatch.
    pub fn pop_for_test(&mut self) -> DataWord {
        self.pop(0).expect("test popped an empty stack")
    }

    /// Invoke a primitive routine directly, bypassing `CALL` decoding.
    pub fn call_primitive_for_test(&mut self, index: u8) {
        self.call_primitive(index, 0).expect("test primitive call faulted");
    }

    pub fn allocate_for_test(&mut self, n: i32) -> Addr {
        self.allocate(n, 0).expect("test setup allocation overflowed the heap")
    }

    pub fn free_for_test(&mut self, addr: Addr, size: i32) {
        self.free(addr, size, 0).expect("test setup freed an invalid block");
    }

    pub fn insert_allocated_for_test(&mut self, addr: Addr, size: i32) {
        self.allocated_mut().insert(addr, size);
    }

    pub fn insert_free_for_test(&mut self, addr: Addr, size: i32) {
        self.free_mut().insert(addr, size);
    }
}
