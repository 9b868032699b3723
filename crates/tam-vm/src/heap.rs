//! The heap allocator: first-fit over the high end of the data store, with
//! shrinkage (not coalescing) when a freed block sits at the current top.

use tam_core::{Addr, FaultKind, Register, TamError};

use crate::emulator::Emulator;

impl Emulator {
    /// Allocate `n` words from the heap, returning the block's address.
    ///
    /// `n == 0` always returns the sentinel address `0` without touching
    /// heap state; `0` never appears as a key of the bookkeeping maps.
    pub(crate) fn allocate(&mut self, n: i32, fault_addr: Addr) -> Result<Addr, TamError> {
        if n == 0 {
            return Ok(0);
        }

        let reuse = self
            .free_mut()
            .iter()
            .find(|&(_, &size)| size >= n)
            .map(|(&addr, &size)| (addr, size));

        if let Some((addr, size)) = reuse {
            self.free_mut().remove(&addr);
            self.allocated_mut().insert(addr, n);
            if size > n {
                self.free_mut().insert(addr.wrapping_add(n as u16), size - n);
            }
            return Ok(addr);
        }

        let ht = self.reg(Register::Ht).wrapping_sub(n as u16);
        self.set_reg(Register::Ht, ht);
        if ht <= self.reg(Register::St) {
            return Err(TamError::fault(FaultKind::HeapOverflow, fault_addr));
        }

        let addr = ht.wrapping_add(1);
        self.allocated_mut().insert(addr, n);
        Ok(addr)
    }

    /// Free the block at `addr` with recorded size `size`.
    pub(crate) fn free(&mut self, addr: Addr, size: i32, fault_addr: Addr) -> Result<(), TamError> {
        if addr == 0 {
            return if size == 0 {
                Ok(())
            } else {
                Err(TamError::fault(FaultKind::DataAccessViolation, fault_addr))
            };
        }

        let ht = self.reg(Register::Ht);
        if addr <= ht {
            return Err(TamError::fault(FaultKind::DataAccessViolation, fault_addr));
        }

        match self.allocated_mut().get(&addr) {
            Some(&recorded) if recorded == size => {}
            _ => return Err(TamError::fault(FaultKind::DataAccessViolation, fault_addr)),
        }

        self.allocated_mut().remove(&addr);

        if addr == ht.wrapping_add(1) {
            self.set_reg(Register::Ht, ht.wrapping_add(size as u16));
        } else {
            self.free_mut().insert(addr, size);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_zero_is_sentinel_and_free() {
        let mut vm = Emulator::new();
        assert_eq!(vm.allocate(0, 0).unwrap(), 0);
        assert_eq!(vm.inspect().allocated().count(), 0);
    }

    #[test]
    fn allocate_then_free_at_top_restores_heap() {
        let mut vm = Emulator::new();
        let addr = vm.allocate(3, 0).unwrap();
        assert_eq!(addr, 65533);
        assert_eq!(vm.reg(Register::Ht), 65532);
        assert_eq!(vm.inspect().allocated().collect::<Vec<_>>(), vec![(65533, 3)]);

        vm.free(65533, 3, 0).unwrap();
        assert_eq!(vm.reg(Register::Ht), 65535);
        assert_eq!(vm.inspect().allocated().count(), 0);
        assert_eq!(vm.inspect().free().count(), 0);
    }

    #[test]
    fn allocate_reuses_free_block() {
        let mut vm = Emulator::new();
        vm.set_reg(Register::Ht, 65530);
        vm.allocated_mut().insert(65531, 2);
        vm.free_mut().insert(65533, 3);

        let addr = vm.allocate(2, 0).unwrap();
        assert_eq!(addr, 65533);
        assert_eq!(
            vm.inspect().allocated().collect::<Vec<_>>(),
            vec![(65531, 2), (65533, 2)]
        );
        assert_eq!(vm.inspect().free().collect::<Vec<_>>(), vec![(65535, 1)]);
    }

    #[test]
    fn allocate_that_collides_with_stack_overflows() {
        let mut vm = Emulator::new();
        vm.set_reg(Register::St, 65530);
        let err = vm.allocate(10, 99).unwrap_err();
        assert_eq!(err, TamError::fault(FaultKind::HeapOverflow, 99));
    }

    #[test]
    fn free_wrong_size_is_data_access_violation() {
        let mut vm = Emulator::new();
        let addr = vm.allocate(3, 0).unwrap();
        let err = vm.free(addr, 4, 5).unwrap_err();
        assert_eq!(err, TamError::fault(FaultKind::DataAccessViolation, 5));
    }

    #[test]
    fn free_zero_addr_requires_zero_size() {
        let mut vm = Emulator::new();
        vm.free(0, 0, 0).unwrap();
        let err = vm.free(0, 1, 2).unwrap_err();
        assert_eq!(err, TamError::fault(FaultKind::DataAccessViolation, 2));
    }
}
