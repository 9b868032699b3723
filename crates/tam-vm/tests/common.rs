//! Shared test scaffolding for `tam-vm` integration tests.

use std::io::Write;
use std::sync::{Arc, Mutex};

/// A cloneable byte sink so a test can hand an `Emulator` a `Box<dyn Write>`
/// and still read back what it wrote afterwards.
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Run an emulator to completion, returning the final step result.
pub fn run_to_halt(vm: &mut tam_vm::Emulator) -> Result<(), tam_core::TamError> {
    loop {
        let instr = vm.fetch_decode()?;
        if !vm.execute(instr)? {
            return Ok(());
        }
    }
}
