//! Fetch-decode-execute: turning code words into register and data-store
//! mutations.

use tam_core::{Addr, DataWord, FaultKind, Instruction, Opcode, Register, TamError};

use crate::StepResult;
use crate::emulator::Emulator;

fn offset_addr(base: Addr, d: DataWord) -> Addr {
    base.wrapping_add(d as u16)
}

impl Emulator {
    /// Fetch the instruction at `CP`, advancing `CP` past it.
    pub fn fetch_decode(&mut self) -> Result<Instruction, TamError> {
        let cp = self.reg(Register::Cp);
        if cp >= self.reg(Register::Ct) {
            return Err(TamError::fault(FaultKind::CodeAccessViolation, cp));
        }
        let word = self.code_at(cp);
        self.set_reg(Register::Cp, cp.wrapping_add(1));
        Ok(Instruction::decode(word))
    }

    /// Execute one already-decoded instruction.
    ///
    /// Returns `Ok(true)` to keep running, `Ok(false)` after `HALT`.
    pub fn execute(&mut self, instr: Instruction) -> StepResult {
        // CP has already been advanced by fetch_decode; the faulting
        // address of anything this instruction does is CP - 1.
        let fault_addr = self.reg(Register::Cp).wrapping_sub(1);

        let Ok(op) = Opcode::try_from(instr.op) else {
            return Err(TamError::fault(FaultKind::UnknownOpcode, fault_addr));
        };

        match op {
            Opcode::Load => self.exec_load(instr, fault_addr).map(|()| true),
            Opcode::Loada => self.exec_loada(instr, fault_addr).map(|()| true),
            Opcode::Loadi => self.exec_loadi(instr, fault_addr).map(|()| true),
            Opcode::Loadl => self.exec_loadl(instr, fault_addr).map(|()| true),
            Opcode::Store => self.exec_store(instr, fault_addr).map(|()| true),
            Opcode::Storei => self.exec_storei(instr, fault_addr).map(|()| true),
            Opcode::Call => self.exec_call(instr, fault_addr).map(|()| true),
            Opcode::Calli => self.exec_calli(fault_addr).map(|()| true),
            Opcode::Return => self.exec_return(instr, fault_addr).map(|()| true),
            Opcode::Push => self.exec_push(instr, fault_addr).map(|()| true),
            Opcode::Pop => self.exec_pop(instr, fault_addr).map(|()| true),
            Opcode::Jump => self.exec_jump(instr, fault_addr).map(|()| true),
            Opcode::Jumpi => self.exec_jumpi(fault_addr).map(|()| true),
            Opcode::Jumpif => self.exec_jumpif(instr, fault_addr).map(|()| true),
            Opcode::Halt => Ok(false),
        }
    }

    fn pop_n(&mut self, n: u8, fault_addr: Addr) -> Result<Vec<DataWord>, TamError> {
        let mut buf = Vec::with_capacity(n as usize);
        for _ in 0..n {
            buf.push(self.pop(fault_addr)?);
        }
        Ok(buf)
    }

    fn push_buf_reversed(&mut self, buf: &[DataWord], fault_addr: Addr) -> Result<(), TamError> {
        for &v in buf.iter().rev() {
            self.push(v, fault_addr)?;
        }
        Ok(())
    }

    fn check_data_access(&self, addr: Addr, fault_addr: Addr) -> Result<(), TamError> {
        if self.in_gap(addr) {
            Err(TamError::fault(FaultKind::DataAccessViolation, fault_addr))
        } else {
            Ok(())
        }
    }

    fn check_code_access(&self, target: Addr, fault_addr: Addr) -> Result<(), TamError> {
        if target >= self.reg(Register::Ct) {
            Err(TamError::fault(FaultKind::CodeAccessViolation, fault_addr))
        } else {
            Ok(())
        }
    }

    fn exec_load(&mut self, instr: Instruction, fault_addr: Addr) -> Result<(), TamError> {
        let base = offset_addr(self.reg(Register::from_index(instr.r)), instr.d);
        for i in 0..instr.n {
            let addr = base.wrapping_add(u16::from(i));
            self.check_data_access(addr, fault_addr)?;
            let value = self.data_at(addr);
            self.push(value, fault_addr)?;
        }
        Ok(())
    }

    fn exec_loada(&mut self, instr: Instruction, fault_addr: Addr) -> Result<(), TamError> {
        let addr = offset_addr(self.reg(Register::from_index(instr.r)), instr.d);
        self.push(addr as DataWord, fault_addr)
    }

    fn exec_loadi(&mut self, instr: Instruction, fault_addr: Addr) -> Result<(), TamError> {
        let base = self.pop(fault_addr)? as u16;
        for i in 0..instr.n {
            let addr = base.wrapping_add(u16::from(i));
            self.check_data_access(addr, fault_addr)?;
            let value = self.data_at(addr);
            self.push(value, fault_addr)?;
        }
        Ok(())
    }

    fn exec_loadl(&mut self, instr: Instruction, fault_addr: Addr) -> Result<(), TamError> {
        self.push(instr.d, fault_addr)
    }

    fn store_words(&mut self, base: Addr, n: u8, fault_addr: Addr) -> Result<(), TamError> {
        let buf = self.pop_n(n, fault_addr)?;
        for (i, &value) in buf.iter().rev().enumerate() {
            let addr = base.wrapping_add(i as u16);
            self.check_data_access(addr, fault_addr)?;
            self.set_data_at(addr, value);
        }
        Ok(())
    }

    fn exec_store(&mut self, instr: Instruction, fault_addr: Addr) -> Result<(), TamError> {
        let base = offset_addr(self.reg(Register::from_index(instr.r)), instr.d);
        self.store_words(base, instr.n, fault_addr)
    }

    fn exec_storei(&mut self, instr: Instruction, fault_addr: Addr) -> Result<(), TamError> {
        let base = self.pop(fault_addr)? as u16;
        self.store_words(base, instr.n, fault_addr)
    }

    fn push_frame(&mut self, static_link: Addr, target: Addr, fault_addr: Addr) -> Result<(), TamError> {
        let dynamic_link = self.reg(Register::Lb);
        let return_addr = self.reg(Register::Cp);
        self.push(static_link as DataWord, fault_addr)?;
        self.push(dynamic_link as DataWord, fault_addr)?;
        self.push(return_addr as DataWord, fault_addr)?;
        self.set_reg(Register::Lb, self.reg(Register::St).wrapping_sub(3));
        self.set_reg(Register::Cp, target);
        Ok(())
    }

    fn exec_call(&mut self, instr: Instruction, fault_addr: Addr) -> Result<(), TamError> {
        if instr.r == Register::Pb.index() && (1..=28).contains(&instr.d) {
            return self.call_primitive(instr.d as u8, fault_addr);
        }

        let target = offset_addr(self.reg(Register::from_index(instr.r)), instr.d);
        self.check_code_access(target, fault_addr)?;
        let static_link = self.reg(Register::from_index(instr.n));
        self.push_frame(static_link, target, fault_addr)
    }

    fn exec_calli(&mut self, fault_addr: Addr) -> Result<(), TamError> {
        let target = self.pop(fault_addr)? as u16;
        let static_link = self.pop(fault_addr)? as u16;
        self.check_code_access(target, fault_addr)?;
        self.push_frame(static_link, target, fault_addr)
    }

    fn exec_return(&mut self, instr: Instruction, fault_addr: Addr) -> Result<(), TamError> {
        let results = self.pop_n(instr.n, fault_addr)?;

        let lb = self.reg(Register::Lb);
        let dynamic_link = self.data_at(lb.wrapping_add(1)) as u16;
        let return_addr = self.data_at(lb.wrapping_add(2)) as u16;
        self.check_code_access(return_addr, fault_addr)?;

        self.set_reg(Register::St, lb);
        for _ in 0..instr.d {
            self.pop(fault_addr)?;
        }
        self.push_buf_reversed(&results, fault_addr)?;

        self.set_reg(Register::Lb, dynamic_link);
        self.set_reg(Register::Cp, return_addr);
        Ok(())
    }

    fn exec_push(&mut self, instr: Instruction, fault_addr: Addr) -> Result<(), TamError> {
        let new_st = offset_addr(self.reg(Register::St), instr.d);
        if new_st >= self.reg(Register::Ht) {
            return Err(TamError::fault(FaultKind::StackOverflow, fault_addr));
        }
        self.set_reg(Register::St, new_st);
        Ok(())
    }

    fn exec_pop(&mut self, instr: Instruction, fault_addr: Addr) -> Result<(), TamError> {
        let buf = self.pop_n(instr.n, fault_addr)?;
        for _ in 0..instr.d {
            self.pop(fault_addr)?;
        }
        self.push_buf_reversed(&buf, fault_addr)
    }

    fn exec_jump(&mut self, instr: Instruction, fault_addr: Addr) -> Result<(), TamError> {
        let target = offset_addr(self.reg(Register::from_index(instr.r)), instr.d);
        self.check_code_access(target, fault_addr)?;
        self.set_reg(Register::Cp, target);
        Ok(())
    }

    fn exec_jumpi(&mut self, fault_addr: Addr) -> Result<(), TamError> {
        let target = self.pop(fault_addr)? as u16;
        self.check_code_access(target, fault_addr)?;
        self.set_reg(Register::Cp, target);
        Ok(())
    }

    fn exec_jumpif(&mut self, instr: Instruction, fault_addr: Addr) -> Result<(), TamError> {
        let value = self.pop(fault_addr)?;
        if i32::from(value) != i32::from(instr.n) {
            return Ok(());
        }
        self.exec_jump(instr, fault_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tam_core::Instruction;

    #[test]
    fn simple_halt_program() {
        let mut vm = Emulator::new();
        vm.load_program(&[0xF000_0000]).unwrap();
        let instr = vm.fetch_decode().unwrap();
        assert_eq!(instr, Instruction { op: 15, r: 0, n: 0, d: 0 });
        assert!(!vm.execute(instr).unwrap());
    }

    #[test]
    fn loadl_call_put_halt() {
        let out = crate::test_support::SharedBuf::new();
        let mut vm = Emulator::with_io(Box::new(std::io::empty()), Box::new(out.clone()));
        vm.load_program(&[0x3E00_0058, 0x6200_0016, 0xF000_0000]).unwrap();

        for _ in 0..3 {
            let instr = vm.fetch_decode().unwrap();
            if !vm.execute(instr).unwrap() {
                break;
            }
        }

        assert_eq!(vm.reg(Register::Cp), 3);
        assert_eq!(vm.reg(Register::St), 0);
        assert_eq!(out.contents(), vec![0x58]);
    }

    #[test]
    fn call_return_round_trip() {
        let mut vm = Emulator::new();
        vm.load_program(&[0, 0, 0]).unwrap();
        for (i, &v) in [1i16, 2, 3, 4, 5].iter().enumerate() {
            vm.set_data_at(i as u16, v);
        }
        vm.set_reg(Register::St, 5);
        vm.set_reg(Register::Cp, 1);
        vm.set_reg(Register::Lb, 0);

        let instr = Instruction { op: 6, r: Register::Sb.index(), n: 0, d: 2 };
        vm.execute(instr).unwrap();

        assert_eq!(vm.data_at(5), 0);
        assert_eq!(vm.data_at(6), 0);
        assert_eq!(vm.data_at(7), 1);
        assert_eq!(vm.reg(Register::St), 8);
        assert_eq!(vm.reg(Register::Lb), 5);
        assert_eq!(vm.reg(Register::Cp), 2);
    }

    #[test]
    fn unknown_opcode_faults() {
        let mut vm = Emulator::new();
        vm.load_program(&[0x9000_0000]).unwrap();
        let instr = vm.fetch_decode().unwrap();
        let err = vm.execute(instr).unwrap_err();
        assert_eq!(err, TamError::fault(FaultKind::UnknownOpcode, 0));
    }

    #[test]
    fn jumpif_compares_against_n_not_d() {
        let mut vm = Emulator::new();
        vm.load_program(&[0, 0, 0]).unwrap();
        vm.push(5, 0).unwrap();
        let instr = Instruction { op: 14, r: Register::Cb.index(), n: 5, d: 2 };
        vm.execute(instr).unwrap();
        assert_eq!(vm.reg(Register::Cp), 2);
    }
}
