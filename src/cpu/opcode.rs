//! Opcode bit fields and decoded instructions
//!
//! Most 6502 opcodes follow the `aaabbbcc` pattern: `cc` selects the instruction
//! group, `aaa` the operation within the group and `bbb` the addressing mode.

use super::types::{AddressingMode, InstructionMeta};

const CC_MASK: u8 = 0b011;
const BBB_MASK: u8 = 0b111;
const AAA_MASK: u8 = 0b111;

/// Bit fields extracted from an opcode byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeBits {
    /// The opcode byte value
    pub opcode: u8,
    /// Bits 5-7
    pub aaa: u8,
    /// Bits 2-4
    pub bbb: u8,
    /// Bits 0-1
    pub cc: u8,
}

impl OpcodeBits {
    pub const fn new(opcode: u8) -> Self {
        Self {
            opcode,
            aaa: (opcode >> 5) & AAA_MASK,
            bbb: (opcode >> 2) & BBB_MASK,
            cc: opcode & CC_MASK,
        }
    }
}

impl From<u8> for OpcodeBits {
    fn from(opcode: u8) -> Self {
        Self::new(opcode)
    }
}

/// An opcode resolved to its addressing mode and metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedInstruction {
    pub bits: OpcodeBits,
    pub mode: AddressingMode,
    pub meta: InstructionMeta,
}

impl DecodedInstruction {
    pub fn opcode(&self) -> u8 {
        self.bits.opcode
    }

    pub fn mnemonic(&self) -> &'static str {
        self.meta.mnemonic
    }
}
