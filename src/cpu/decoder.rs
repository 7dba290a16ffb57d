//! Opcode matrix lookup
//!
//! Maps an opcode byte to its addressing mode and instruction metadata using the
//! `aaabbbcc` decomposition. Both tables hold three groups of eight entries, one
//! group per `cc` value 0-2. The `cc = 3` column holds only undocumented opcodes
//! and has no table entries.

use crate::error::Error;

use super::opcode::{DecodedInstruction, OpcodeBits};
use super::types::{AddressingMode, Category, InstructionMeta};

use AddressingMode::*;

const GROUP_SIZE: usize = 8;
const ILLEGAL_CLASS: u8 = 3;

/// Addressing mode, indexed by `cc * 8 + bbb`
#[rustfmt::skip]
const ADDRESSING_MODES: [AddressingMode; 24] = [
    // cc = 00
    Immediate, ZeroPage, Unused, Absolute, Unused, ZeroPageX, Unused, AbsoluteX,
    // cc = 01
    IndexedIndirect, ZeroPage, Immediate, Absolute, IndirectIndexed, ZeroPageX, AbsoluteY, AbsoluteX,
    // cc = 10
    Immediate, ZeroPage, Accumulator, Absolute, Unused, ZeroPageX, Unused, AbsoluteX,
];

const fn meta(mnemonic: &'static str, category: Category) -> InstructionMeta {
    InstructionMeta::new(mnemonic, category)
}

/// Instruction metadata, indexed by `cc * 8 + aaa`
const INSTRUCTIONS: [InstructionMeta; 24] = [
    // cc = 00
    meta("NOP", Category::NoOp),
    meta("BIT", Category::BitTest),
    meta("JMP", Category::Jump),
    meta("JMP", Category::NoOp), // indirect form, resolved by the irregular table
    meta("STY", Category::NoOp),
    meta("LDY", Category::NoOp),
    meta("CPY", Category::NoOp),
    meta("CPX", Category::NoOp),
    // cc = 01
    meta("ORA", Category::NoOp),
    meta("AND", Category::NoOp),
    meta("EOR", Category::NoOp),
    meta("ADC", Category::NoOp),
    meta("STA", Category::NoOp),
    meta("LDA", Category::NoOp),
    meta("CMP", Category::NoOp),
    meta("SBC", Category::NoOp),
    // cc = 10
    meta("ASL", Category::NoOp),
    meta("ROL", Category::NoOp),
    meta("LSR", Category::NoOp),
    meta("ROR", Category::NoOp),
    meta("STX", Category::StoreX),
    meta("LDX", Category::LoadX),
    meta("DEC", Category::NoOp),
    meta("INC", Category::NoOp),
];

/// Opcodes the matrix does not describe
fn irregular(opcode: u8) -> Option<(AddressingMode, InstructionMeta)> {
    match opcode {
        0x20 => Some((Absolute, meta("JSR", Category::JumpSubroutine))),
        0x6C => Some((Indirect, meta("JMP", Category::Jump))),
        0xEA => Some((Implied, meta("NOP", Category::NoOp))),
        _ => None,
    }
}

/// Result of decoding one opcode byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    Supported(DecodedInstruction),
    /// `cc = 3`: no table entry exists
    Unsupported(OpcodeBits),
}

impl Decoded {
    pub fn bits(&self) -> OpcodeBits {
        match self {
            Decoded::Supported(instruction) => instruction.bits,
            Decoded::Unsupported(bits) => *bits,
        }
    }

    pub fn into_instruction(self) -> Result<DecodedInstruction, Error> {
        match self {
            Decoded::Supported(instruction) => Ok(instruction),
            Decoded::Unsupported(bits) => Err(Error::IllegalOpcodeClass(bits.opcode)),
        }
    }
}

/// Decode an opcode byte. Pure; never fails for `cc` in 0..=2.
pub fn decode(opcode: u8) -> Decoded {
    let bits = OpcodeBits::new(opcode);
    if bits.cc == ILLEGAL_CLASS {
        return Decoded::Unsupported(bits);
    }

    let group = bits.cc as usize * GROUP_SIZE;
    let (mode, meta) = irregular(opcode).unwrap_or((
        ADDRESSING_MODES[group + bits.bbb as usize],
        INSTRUCTIONS[group + bits.aaa as usize],
    ));

    Decoded::Supported(DecodedInstruction { bits, mode, meta })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supported(opcode: u8) -> DecodedInstruction {
        decode(opcode).into_instruction().unwrap()
    }

    #[test]
    fn test_all_opcodes_decodeable() {
        for opcode in 0..=255u8 {
            let decoded = decode(opcode);
            let bits = decoded.bits();
            assert_eq!(bits.cc, opcode & 3);
            assert_eq!(bits.bbb, (opcode >> 2) & 7);
            assert_eq!(bits.aaa, (opcode >> 5) & 7);

            if opcode & 3 == 3 {
                assert_eq!(decoded, Decoded::Unsupported(bits));
            } else {
                assert!(matches!(decoded, Decoded::Supported(_)));
            }
        }
    }

    #[test]
    fn test_decode_is_deterministic() {
        for opcode in 0..=255u8 {
            assert_eq!(decode(opcode), decode(opcode));
        }
    }

    #[test]
    fn test_illegal_class_is_an_error() {
        assert_eq!(
            decode(0xFF).into_instruction(),
            Err(Error::IllegalOpcodeClass(0xFF))
        );
        assert_eq!(
            decode(0x03).into_instruction(),
            Err(Error::IllegalOpcodeClass(0x03))
        );
    }

    #[test]
    fn test_sample_opcodes() {
        let jmp = supported(0x4C);
        assert_eq!(jmp.mnemonic(), "JMP");
        assert_eq!(jmp.mode, AddressingMode::Absolute);
        assert_eq!(jmp.meta.category, Category::Jump);

        let ldx_imm = supported(0xA2);
        assert_eq!(ldx_imm.mnemonic(), "LDX");
        assert_eq!(ldx_imm.mode, AddressingMode::Immediate);
        assert_eq!(ldx_imm.meta.category, Category::LoadX);

        let ldx_abs = supported(0xAE);
        assert_eq!(ldx_abs.mode, AddressingMode::Absolute);

        let stx_zp = supported(0x86);
        assert_eq!(stx_zp.mnemonic(), "STX");
        assert_eq!(stx_zp.mode, AddressingMode::ZeroPage);
        assert_eq!(stx_zp.meta.category, Category::StoreX);

        let bit_zp = supported(0x24);
        assert_eq!(bit_zp.mnemonic(), "BIT");
        assert_eq!(bit_zp.mode, AddressingMode::ZeroPage);
        assert_eq!(bit_zp.meta.category, Category::BitTest);
    }

    #[test]
    fn test_group_one_modes() {
        assert_eq!(supported(0xA1).mode, AddressingMode::IndexedIndirect); // LDA (zp,X)
        assert_eq!(supported(0xA9).mode, AddressingMode::Immediate); // LDA #
        assert_eq!(supported(0xB1).mode, AddressingMode::IndirectIndexed); // LDA (zp),Y
        assert_eq!(supported(0xB9).mode, AddressingMode::AbsoluteY); // LDA abs,Y
        assert_eq!(supported(0xBD).mode, AddressingMode::AbsoluteX); // LDA abs,X
        assert_eq!(supported(0xA9).mnemonic(), "LDA");
    }

    #[test]
    fn test_unimplemented_instructions_are_no_ops() {
        assert_eq!(supported(0xA9).meta.category, Category::NoOp); // LDA
        assert_eq!(supported(0xE6).meta.category, Category::NoOp); // INC
    }

    #[test]
    fn test_irregular_opcodes() {
        let jsr = supported(0x20);
        assert_eq!(jsr.mnemonic(), "JSR");
        assert_eq!(jsr.mode, AddressingMode::Absolute);
        assert_eq!(jsr.meta.category, Category::JumpSubroutine);
        // Bit fields are still reported as extracted
        assert_eq!(jsr.bits.aaa, 1);
        assert_eq!(jsr.bits.bbb, 0);

        let jmp_indirect = supported(0x6C);
        assert_eq!(jmp_indirect.mode, AddressingMode::Indirect);
        assert_eq!(jmp_indirect.meta.category, Category::Jump);

        let nop = supported(0xEA);
        assert_eq!(nop.mnemonic(), "NOP");
        assert_eq!(nop.mode, AddressingMode::Implied);
    }

    #[test]
    fn test_unused_slots() {
        // cc = 00, bbb = 100: branch column
        assert_eq!(supported(0xD0).mode, AddressingMode::Unused);
        // cc = 10, bbb = 010: accumulator column
        assert_eq!(supported(0x0A).mode, AddressingMode::Accumulator);
    }
}
