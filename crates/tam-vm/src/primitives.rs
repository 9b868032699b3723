//! The 28 primitive routines invoked by `CALL PB, d` for `d` in `1..=28`.

use std::io::Write as _;

use tam_core::{Addr, DataWord, FaultKind, TamError};

use crate::emulator::Emulator;

impl Emulator {
    pub(crate) fn call_primitive(&mut self, index: u8, fault_addr: Addr) -> Result<(), TamError> {
        match index {
            1 => Ok(()), // id: no-op
            2 => self.primitive_not(fault_addr),
            3 => self.primitive_and(fault_addr),
            4 => self.primitive_or(fault_addr),
            5 => self.primitive_unary(fault_addr, |v| v.wrapping_add(1)),
            6 => self.primitive_unary(fault_addr, |v| v.wrapping_sub(1)),
            7 => self.primitive_unary(fault_addr, DataWord::wrapping_neg),
            8 => self.primitive_binary(fault_addr, DataWord::wrapping_add),
            9 => self.primitive_binary(fault_addr, DataWord::wrapping_sub),
            10 => self.primitive_binary(fault_addr, DataWord::wrapping_mul),
            11 => self.primitive_div(fault_addr),
            12 => self.primitive_mod(fault_addr),
            13 => self.primitive_cmp(fault_addr, |a, b| a < b),
            14 => self.primitive_cmp(fault_addr, |a, b| a <= b),
            15 => self.primitive_cmp(fault_addr, |a, b| a >= b),
            16 => self.primitive_cmp(fault_addr, |a, b| a > b),
            17 => self.primitive_eq(fault_addr, false),
            18 => self.primitive_eq(fault_addr, true),
            19 => self.primitive_eol(fault_addr),
            20 => self.primitive_eof(fault_addr),
            21 => self.primitive_get(fault_addr),
            22 => self.primitive_put(fault_addr),
            23 => self.primitive_geteol(),
            24 => self.primitive_puteol(),
            25 => self.primitive_getint(fault_addr),
            26 => self.primitive_putint(fault_addr),
            27 => self.primitive_new(fault_addr),
            28 => self.primitive_dispose(fault_addr),
            _ => unreachable!("call_primitive is only invoked with 1..=28"),
        }
    }

    fn primitive_unary(
        &mut self,
        fault_addr: Addr,
        f: impl FnOnce(DataWord) -> DataWord,
    ) -> Result<(), TamError> {
        let v = self.pop(fault_addr)?;
        self.push(f(v), fault_addr)
    }

    fn primitive_binary(
        &mut self,
        fault_addr: Addr,
        f: impl FnOnce(DataWord, DataWord) -> DataWord,
    ) -> Result<(), TamError> {
        let b = self.pop(fault_addr)?;
        let a = self.pop(fault_addr)?;
        self.push(f(a, b), fault_addr)
    }

    fn primitive_cmp(
        &mut self,
        fault_addr: Addr,
        f: impl FnOnce(DataWord, DataWord) -> bool,
    ) -> Result<(), TamError> {
        let b = self.pop(fault_addr)?;
        let a = self.pop(fault_addr)?;
        self.push(DataWord::from(f(a, b)), fault_addr)
    }

    fn primitive_not(&mut self, fault_addr: Addr) -> Result<(), TamError> {
        let v = self.pop(fault_addr)?;
        self.push(DataWord::from(v == 0), fault_addr)
    }

    fn primitive_and(&mut self, fault_addr: Addr) -> Result<(), TamError> {
        let b = self.pop(fault_addr)?;
        let a = self.pop(fault_addr)?;
        self.push(DataWord::from(a.wrapping_mul(b) != 0), fault_addr)
    }

    /// The source formula is `a + b || a == -b`, not the usual
    /// `a != 0 || b != 0`. Preserved verbatim rather than "corrected";
    /// see the design notes for which pairs this disagrees with a
    /// bitwise-or of truth values on.
    fn primitive_or(&mut self, fault_addr: Addr) -> Result<(), TamError> {
        let b = self.pop(fault_addr)?;
        let a = self.pop(fault_addr)?;
        let result = a.wrapping_add(b) != 0 || a == b.wrapping_neg();
        self.push(DataWord::from(result), fault_addr)
    }

    fn primitive_div(&mut self, fault_addr: Addr) -> Result<(), TamError> {
        let b = self.pop(fault_addr)?;
        let a = self.pop(fault_addr)?;
        if b == 0 {
            return Err(TamError::fault(FaultKind::DataAccessViolation, fault_addr));
        }
        self.push(a.wrapping_div(b), fault_addr)
    }

    fn primitive_mod(&mut self, fault_addr: Addr) -> Result<(), TamError> {
        let b = self.pop(fault_addr)?;
        let a = self.pop(fault_addr)?;
        if b == 0 {
            return Err(TamError::fault(FaultKind::DataAccessViolation, fault_addr));
        }
        self.push(a.wrapping_rem(b), fault_addr)
    }

    fn primitive_eq(&mut self, fault_addr: Addr, negate: bool) -> Result<(), TamError> {
        // A negative width runs zero iterations below, leaving both tuples
        // empty (and therefore equal) rather than faulting.
        let width = self.pop(fault_addr)?;

        let mut rhs = Vec::new();
        for _ in 0..width {
            rhs.push(self.pop(fault_addr)?);
        }
        let mut lhs = Vec::new();
        for _ in 0..width {
            lhs.push(self.pop(fault_addr)?);
        }

        let equal = lhs == rhs;
        self.push(DataWord::from(equal != negate), fault_addr)
    }

    fn primitive_eol(&mut self, fault_addr: Addr) -> Result<(), TamError> {
        let next = self.input_mut().peek()?;
        self.push(DataWord::from(next == Some(b'\n')), fault_addr)
    }

    fn primitive_eof(&mut self, fault_addr: Addr) -> Result<(), TamError> {
        let next = self.input_mut().peek()?;
        self.push(DataWord::from(next.is_none()), fault_addr)
    }

    fn primitive_get(&mut self, fault_addr: Addr) -> Result<(), TamError> {
        let addr = self.pop(fault_addr)? as u16;
        let byte = self.input_mut().read_byte()?;
        let value = byte.map_or(-1, DataWord::from);
        self.set_data_at(addr, value);
        Ok(())
    }

    fn primitive_put(&mut self, fault_addr: Addr) -> Result<(), TamError> {
        let v = self.pop(fault_addr)?;
        let byte = [v as u8];
        self.output_mut().write_all(&byte).map_err(|e| TamError::io(e.to_string()))
    }

    fn primitive_geteol(&mut self) -> Result<(), TamError> {
        self.input_mut().skip_to_eol()
    }

    fn primitive_puteol(&mut self) -> Result<(), TamError> {
        self.output_mut().write_all(b"\n").map_err(|e| TamError::io(e.to_string()))
    }

    fn primitive_getint(&mut self, fault_addr: Addr) -> Result<(), TamError> {
        let addr = self.pop(fault_addr)? as u16;
        let value = self.input_mut().read_int()?;
        self.set_data_at(addr, value);
        Ok(())
    }

    fn primitive_putint(&mut self, fault_addr: Addr) -> Result<(), TamError> {
        let v = self.pop(fault_addr)?;
        self.output_mut().write_all(v.to_string().as_bytes()).map_err(|e| TamError::io(e.to_string()))
    }

    fn primitive_new(&mut self, fault_addr: Addr) -> Result<(), TamError> {
        let n = self.pop(fault_addr)?;
        let addr = self.allocate(i32::from(n), fault_addr)?;
        self.push(addr as DataWord, fault_addr)
    }

    fn primitive_dispose(&mut self, fault_addr: Addr) -> Result<(), TamError> {
        let addr = self.pop(fault_addr)? as u16;
        let size = self.pop(fault_addr)?;
        self.free(addr, i32::from(size), fault_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::SharedBuf;
    use tam_core::Register;

    fn vm_with_output() -> (Emulator, SharedBuf) {
        let out = SharedBuf::new();
        let vm = Emulator::with_io(Box::new(std::io::empty()), Box::new(out.clone()));
        (vm, out)
    }

    #[test]
    fn add_wraps_on_overflow() {
        let (mut vm, _) = vm_with_output();
        vm.push(i16::MAX, 0).unwrap();
        vm.push(1, 0).unwrap();
        vm.call_primitive(8, 0).unwrap();
        assert_eq!(vm.pop(0).unwrap(), i16::MIN);
    }

    #[test]
    fn div_by_zero_is_data_access_violation() {
        let (mut vm, _) = vm_with_output();
        vm.push(4, 0).unwrap();
        vm.push(0, 0).unwrap();
        let err = vm.call_primitive(11, 9).unwrap_err();
        assert_eq!(err, TamError::fault(FaultKind::DataAccessViolation, 9));
    }

    #[test]
    fn lt_pushes_boolean() {
        let (mut vm, _) = vm_with_output();
        vm.push(1, 0).unwrap();
        vm.push(2, 0).unwrap();
        vm.call_primitive(13, 0).unwrap();
        assert_eq!(vm.pop(0).unwrap(), 1);
    }

    #[test]
    fn eq_compares_width_prefixed_tuples() {
        let (mut vm, _) = vm_with_output();
        // lhs = [1, 2], rhs = [1, 2], width 2
        vm.push(1, 0).unwrap();
        vm.push(2, 0).unwrap();
        vm.push(1, 0).unwrap();
        vm.push(2, 0).unwrap();
        vm.push(2, 0).unwrap(); // width
        vm.call_primitive(17, 0).unwrap();
        assert_eq!(vm.pop(0).unwrap(), 1);
    }

    #[test]
    fn eq_with_negative_width_compares_empty_tuples() {
        let (mut vm, _) = vm_with_output();
        vm.push(-1, 0).unwrap(); // width
        vm.call_primitive(17, 0).unwrap();
        assert_eq!(vm.pop(0).unwrap(), 1);
    }

    #[test]
    fn ne_is_eq_negated() {
        let (mut vm, _) = vm_with_output();
        vm.push(1, 0).unwrap();
        vm.push(3, 0).unwrap();
        vm.push(1, 0).unwrap();
        vm.push(2, 0).unwrap();
        vm.push(2, 0).unwrap(); // width
        vm.call_primitive(18, 0).unwrap();
        assert_eq!(vm.pop(0).unwrap(), 1);
    }

    #[test]
    fn or_formula_matches_source_quirk() {
        // Whenever `a + b == 0` under wrapping arithmetic, `a == -b` holds
        // too (including the `a == b == i16::MIN` wraparound corner), so
        // this formula's two disjuncts are complementary: it is always
        // true, including at (0, 0) where the usual `a != 0 || b != 0`
        // would be false. This is the preserved quirk, not a typo.
        let (mut vm, _) = vm_with_output();
        vm.push(0, 0).unwrap();
        vm.push(0, 0).unwrap();
        vm.call_primitive(4, 0).unwrap();
        assert_eq!(vm.pop(0).unwrap(), 1);

        vm.push(i16::MIN, 0).unwrap();
        vm.push(i16::MIN, 0).unwrap();
        vm.call_primitive(4, 0).unwrap();
        assert_eq!(vm.pop(0).unwrap(), 1);

        vm.push(3, 0).unwrap();
        vm.push(-3, 0).unwrap();
        vm.call_primitive(4, 0).unwrap();
        assert_eq!(vm.pop(0).unwrap(), 1);
    }

    #[test]
    fn put_writes_low_byte() {
        let (mut vm, out) = vm_with_output();
        vm.push(0x58, 0).unwrap();
        vm.call_primitive(22, 0).unwrap();
        assert_eq!(out.contents(), vec![0x58]);
    }

    #[test]
    fn putint_writes_decimal() {
        let (mut vm, out) = vm_with_output();
        vm.push(-17, 0).unwrap();
        vm.call_primitive(26, 0).unwrap();
        assert_eq!(out.contents(), b"-17");
    }

    #[test]
    fn get_at_eof_writes_sentinel() {
        let mut vm = Emulator::with_io(Box::new(std::io::empty()), Box::new(std::io::sink()));
        vm.push(0, 0).unwrap(); // destination address
        vm.call_primitive(21, 0).unwrap();
        assert_eq!(vm.data_at(0), -1);
    }

    #[test]
    fn eol_peeks_without_consuming() {
        let mut vm = Emulator::with_io(Box::new(&b"\nrest"[..]), Box::new(std::io::sink()));
        vm.call_primitive(19, 0).unwrap();
        assert_eq!(vm.pop(0).unwrap(), 1);
        // still there: get should read the newline itself, not 'r'
        vm.push(0, 0).unwrap();
        vm.call_primitive(21, 0).unwrap();
        assert_eq!(vm.data_at(0), i16::from(b'\n'));
    }

    #[test]
    fn new_and_dispose_round_trip() {
        let (mut vm, _) = vm_with_output();
        vm.push(4, 0).unwrap();
        vm.call_primitive(27, 0).unwrap();
        let addr = vm.pop(0).unwrap() as u16;
        assert_eq!(vm.reg(Register::Ht), 65531);

        vm.push(4, 0).unwrap(); // size
        vm.push(addr as i16, 0).unwrap(); // addr
        vm.call_primitive(28, 0).unwrap();
        assert_eq!(vm.reg(Register::Ht), 65535);
    }
}
