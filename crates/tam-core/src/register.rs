//! The sixteen named TAM registers.

/// A TAM register, also the index of that register's slot in the register
/// file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Register {
    /// Code base. Always 0.
    Cb = 0,
    /// Code top: first address past loaded code.
    Ct = 1,
    /// Primitive base: equals `Ct` after load.
    Pb = 2,
    /// Primitive top: `Pb + 29`.
    Pt = 3,
    /// Stack base. Always 0.
    Sb = 4,
    /// Stack top: next free data address.
    St = 5,
    /// Heap base: initially `MAX_ADDR`.
    Hb = 6,
    /// Heap top: decreases as the heap grows.
    Ht = 7,
    /// Local base of the current stack frame.
    Lb = 8,
    /// Enclosing local base, depth 1.
    L1 = 9,
    /// Enclosing local base, depth 2.
    L2 = 10,
    /// Enclosing local base, depth 3.
    L3 = 11,
    /// Enclosing local base, depth 4.
    L4 = 12,
    /// Enclosing local base, depth 5.
    L5 = 13,
    /// Enclosing local base, depth 6.
    L6 = 14,
    /// Code pointer.
    Cp = 15,
}

impl Register {
    /// Human-readable register name, as used in disassembly.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cb => "CB",
            Self::Ct => "CT",
            Self::Pb => "PB",
            Self::Pt => "PT",
            Self::Sb => "SB",
            Self::St => "ST",
            Self::Hb => "HB",
            Self::Ht => "HT",
            Self::Lb => "LB",
            Self::L1 => "L1",
            Self::L2 => "L2",
            Self::L3 => "L3",
            Self::L4 => "L4",
            Self::L5 => "L5",
            Self::L6 => "L6",
            Self::Cp => "CP",
        }
    }

    /// Decode a 4-bit register index. Every value in `0..16` is valid.
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        match index & 0xF {
            0 => Self::Cb,
            1 => Self::Ct,
            2 => Self::Pb,
            3 => Self::Pt,
            4 => Self::Sb,
            5 => Self::St,
            6 => Self::Hb,
            7 => Self::Ht,
            8 => Self::Lb,
            9 => Self::L1,
            10 => Self::L2,
            11 => Self::L3,
            12 => Self::L4,
            13 => Self::L5,
            _ => Self::Cp,
        }
    }

    /// This register's index into the 16-slot register file.
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }
}
