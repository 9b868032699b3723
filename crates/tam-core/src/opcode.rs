//! The fifteen TAM opcodes (index 9 is reserved and never valid).

/// A decoded TAM opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Load = 0,
    Loada = 1,
    Loadi = 2,
    Loadl = 3,
    Store = 4,
    Storei = 5,
    Call = 6,
    Calli = 7,
    Return = 8,
    Push = 10,
    Pop = 11,
    Jump = 12,
    Jumpi = 13,
    Jumpif = 14,
    Halt = 15,
}

impl Opcode {
    /// Mnemonic used in disassembly, independent of operand formatting.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Load => "LOAD",
            Self::Loada => "LOADA",
            Self::Loadi => "LOADI",
            Self::Loadl => "LOADL",
            Self::Store => "STORE",
            Self::Storei => "STOREI",
            Self::Call => "CALL",
            Self::Calli => "CALLI",
            Self::Return => "RETURN",
            Self::Push => "PUSH",
            Self::Pop => "POP",
            Self::Jump => "JUMP",
            Self::Jumpi => "JUMPI",
            Self::Jumpif => "JUMPIF",
            Self::Halt => "HALT",
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = ();

    /// Decode a 4-bit opcode field. Opcode 9 is reserved and any value
    /// above 15 cannot occur after masking, but is rejected defensively.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Load),
            1 => Ok(Self::Loada),
            2 => Ok(Self::Loadi),
            3 => Ok(Self::Loadl),
            4 => Ok(Self::Store),
            5 => Ok(Self::Storei),
            6 => Ok(Self::Call),
            7 => Ok(Self::Calli),
            8 => Ok(Self::Return),
            10 => Ok(Self::Push),
            11 => Ok(Self::Pop),
            12 => Ok(Self::Jump),
            13 => Ok(Self::Jumpi),
            14 => Ok(Self::Jumpif),
            15 => Ok(Self::Halt),
            _ => Err(()),
        }
    }
}
