//! Human-readable disassembly and the trace/step snapshot format.

use std::fmt::Write as _;

use tam_core::{Instruction, Opcode, Register, primitive_name};

use crate::emulator::Emulator;

/// Render `instr` the way the trace/step host loop displays it.
///
/// `CALL` to a primitive slot is named after the primitive; every other
/// opcode uses the operand formatting from the component design table
/// (e.g. `LOAD(2) 4[LB]`, `LOADA 0[SB]`, `HALT`).
#[must_use]
pub fn mnemonic(instr: Instruction) -> String {
    let Ok(op) = Opcode::try_from(instr.op) else {
        return format!("UNKNOWN({})", instr.op);
    };
    let reg = Register::from_index(instr.r).name();

    if matches!(op, Opcode::Call) && instr.r == Register::Pb.index() && (1..=28).contains(&instr.d) {
        let name = primitive_name(instr.d as u8).unwrap_or("?");
        return format!("CALL {name}");
    }

    match op {
        Opcode::Load | Opcode::Store | Opcode::Call | Opcode::Jumpif => {
            format!("{}({}) {}[{reg}]", op.mnemonic(), instr.n, instr.d)
        }
        Opcode::Loada | Opcode::Jump => format!("{} {}[{reg}]", op.mnemonic(), instr.d),
        Opcode::Return | Opcode::Pop => format!("{}({}) {}", op.mnemonic(), instr.n, instr.d),
        Opcode::Loadi | Opcode::Storei => format!("{} {}", op.mnemonic(), instr.n),
        Opcode::Loadl | Opcode::Push => format!("{} {}", op.mnemonic(), instr.d),
        Opcode::Calli | Opcode::Jumpi | Opcode::Halt => op.mnemonic().to_string(),
    }
}

impl Emulator {
    /// Render the trace/step snapshot shown after executing `instr`:
    /// the just-executed instruction's address and mnemonic, the stack
    /// contents, then each allocated heap block.
    #[must_use]
    pub fn snapshot(&self, instr: Instruction) -> String {
        let mut out = String::new();
        let cp_minus_one = self.reg(Register::Cp).wrapping_sub(1);
        let _ = writeln!(out, "\n{cp_minus_one}: {}", mnemonic(instr));

        let st = self.reg(Register::St);
        out.push_str("stack");
        for i in 0..st {
            if i % 8 == 0 {
                out.push('\n');
            }
            let _ = write!(out, "{:04x} ", self.data_at(i) as u16);
        }
        out.push('\n');

        for (addr, size) in self.inspect().allocated() {
            let _ = write!(out, "heap {addr:04x}");
            for i in 0..size {
                if i % 8 == 0 {
                    out.push('\n');
                }
                let word_addr = addr.wrapping_add(i as u16);
                let _ = write!(out, "{:04x} ", self.data_at(word_addr) as u16);
            }
        }

        out
    }
}
