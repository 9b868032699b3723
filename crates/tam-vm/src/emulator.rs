use std::collections::BTreeMap;
use std::io::{Read, Write};

use tam_core::{Addr, CodeWord, DataWord, MAX_ADDR, MEM_SIZE, Register, TamError};

use crate::io::InputStream;

/// The full state of one Triangle Abstract Machine: code store, data store,
/// register file, heap bookkeeping, and the I/O streams primitives 21-26
/// read and write through.
///
/// Construction never fails; [`Emulator::load_program`] is the first
/// fallible step, since it is the first point a caller supplies data this
/// type does not control the shape of.
pub struct Emulator {
    code: Box<[CodeWord]>,
    data: Box<[DataWord]>,
    registers: [Addr; 16],
    allocated: BTreeMap<Addr, i32>,
    free: BTreeMap<Addr, i32>,
    input: InputStream,
    output: Box<dyn Write>,
}

impl Emulator {
    /// Create an emulator wired to the process's standard input and output.
    #[must_use]
    pub fn new() -> Self {
        Self::with_io(Box::new(std::io::stdin()), Box::new(std::io::stdout()))
    }

    /// Create an emulator with caller-supplied I/O streams, e.g. for tests
    /// or for redirecting a program's input/output to files.
    #[must_use]
    pub fn with_io(input: Box<dyn Read>, output: Box<dyn Write>) -> Self {
        let mut registers = [0u16; 16];
        registers[Register::Hb.index() as usize] = MAX_ADDR;
        registers[Register::Ht.index() as usize] = MAX_ADDR;

        Self {
            code: vec![0; MEM_SIZE].into_boxed_slice(),
            data: vec![0; MEM_SIZE].into_boxed_slice(),
            registers,
            allocated: BTreeMap::new(),
            free: BTreeMap::new(),
            input: InputStream::new(input),
            output,
        }
    }

    /// Load a program into the code store.
    ///
    /// Fails with [`TamError::Io`] if the program has more words than fit
    /// in the code store. `CT`, `PB`, and `PT` are set from the program's
    /// length; every other register and the data store are left at their
    /// constructor defaults.
    pub fn load_program(&mut self, words: &[CodeWord]) -> Result<(), TamError> {
        if words.len() > MEM_SIZE {
            return Err(TamError::io("program file too large"));
        }

        self.code.fill(0);
        self.code[..words.len()].copy_from_slice(words);

        let len = words.len() as Addr;
        self.set_reg(Register::Ct, len);
        self.set_reg(Register::Pb, len);
        self.set_reg(Register::Pt, len.wrapping_add(29));

        Ok(())
    }

    pub(crate) fn reg(&self, r: Register) -> Addr {
        self.registers[r.index() as usize]
    }

    pub(crate) fn set_reg(&mut self, r: Register, value: Addr) {
        self.registers[r.index() as usize] = value;
    }

    pub(crate) fn data_at(&self, addr: Addr) -> DataWord {
        self.data[addr as usize]
    }

    pub(crate) fn set_data_at(&mut self, addr: Addr, value: DataWord) {
        self.data[addr as usize] = value;
    }

    pub(crate) fn code_at(&self, addr: Addr) -> CodeWord {
        self.code[addr as usize]
    }

    pub(crate) fn allocated_mut(&mut self) -> &mut BTreeMap<Addr, i32> {
        &mut self.allocated
    }

    pub(crate) fn free_mut(&mut self) -> &mut BTreeMap<Addr, i32> {
        &mut self.free
    }

    pub(crate) fn input_mut(&mut self) -> &mut InputStream {
        &mut self.input
    }

    pub(crate) fn output_mut(&mut self) -> &mut dyn Write {
        &mut *self.output
    }

    /// Read-only window into engine state, for tests and the trace/step
    /// host loop. Not part of the instruction execution API.
    #[must_use]
    pub fn inspect(&self) -> Inspect<'_> {
        Inspect { emulator: self }
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrowed, read-only view into an [`Emulator`]'s registers, stores, and
/// heap bookkeeping. Exists so that tests and the trace/step host loop can
/// inspect state without the execution API growing getters it otherwise
/// has no use for.
#[derive(Clone, Copy)]
pub struct Inspect<'a> {
    emulator: &'a Emulator,
}

impl Inspect<'_> {
    #[must_use]
    pub fn register(&self, r: Register) -> Addr {
        self.emulator.reg(r)
    }

    #[must_use]
    pub fn data(&self, addr: Addr) -> DataWord {
        self.emulator.data_at(addr)
    }

    #[must_use]
    pub fn code(&self, addr: Addr) -> CodeWord {
        self.emulator.code_at(addr)
    }

    /// Allocated heap blocks, ascending by address.
    pub fn allocated(&self) -> impl Iterator<Item = (Addr, i32)> + '_ {
        self.emulator.allocated.iter().map(|(&a, &n)| (a, n))
    }

    /// Free heap blocks, ascending by address.
    pub fn free(&self) -> impl Iterator<Item = (Addr, i32)> + '_ {
        self.emulator.free.iter().map(|(&a, &n)| (a, n))
    }
}
