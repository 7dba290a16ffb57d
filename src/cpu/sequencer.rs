//! Micro-program construction
//!
//! Builds the cycle-by-cycle action list for an instruction from its category and
//! addressing mode. The first cycle is always the opcode fetch; the rest come from
//! the read/write sequences below, which are shared by every category that loads
//! or stores through memory.

use crate::error::Error;

use super::decoder::decode;
use super::flags::{FLAG_NEGATIVE, FLAG_ZERO};
use super::opcode::DecodedInstruction;
use super::state::CpuState;
use super::types::{Action, AddressingMode, Behavior, Category, InstructionMeta, Location, MicroProgram};

const LOAD_FLAGS: Behavior = Behavior::SetFlags {
    mask: FLAG_ZERO | FLAG_NEGATIVE,
};

fn emit(program: &mut MicroProgram, action: Action) -> Option<()> {
    program.push(action).then_some(())
}

/// Fetch operand bytes into the latch and return where the effective address lives
fn effective_address(program: &mut MicroProgram, mode: AddressingMode) -> Option<Location> {
    match mode {
        AddressingMode::ZeroPage => {
            // 2    PC     R  fetch address, increment PC
            emit(program, Action::copy_byte(Location::PcPointerAdvance, Location::TempLow))?;
            Some(Location::TempLow)
        }
        AddressingMode::Absolute => {
            // 2    PC     R  fetch low byte of address, increment PC
            // 3    PC     R  fetch high byte of address, increment PC
            emit(program, Action::copy_byte(Location::PcPointerAdvance, Location::TempLow))?;
            emit(program, Action::copy_byte(Location::PcPointerAdvance, Location::TempHigh))?;
            Some(Location::Temp)
        }
        _ => None,
    }
}

/// Load a byte into `to`, applying `behavior` to the value read
fn read_sequence(
    program: &mut MicroProgram,
    mode: AddressingMode,
    to: Location,
    behavior: Behavior,
) -> Option<()> {
    if mode == AddressingMode::Immediate {
        return emit(
            program,
            Action::copy_byte(Location::PcPointerAdvance, to).then(behavior),
        );
    }

    let address = effective_address(program, mode)?;
    // N  address  R  read from effective address
    emit(program, Action::read_byte(address, to).then(behavior))
}

/// Store the byte in `from` at the effective address
fn write_sequence(program: &mut MicroProgram, mode: AddressingMode, from: Location) -> Option<()> {
    let address = effective_address(program, mode)?;
    // N  address  W  write register to effective address
    emit(program, Action::write_byte(from, address))
}

fn jump_sequence(program: &mut MicroProgram, mode: AddressingMode) -> Option<()> {
    if mode != AddressingMode::Absolute {
        return None;
    }
    // 2    PC     R  fetch low address byte, increment PC
    // 3    PC     R  copy low address byte to PCL, fetch high address byte to PCH
    emit(program, Action::copy_short(Location::PcPointerAdvance, Location::Temp))?;
    emit(program, Action::copy_short(Location::Temp, Location::Pc))
}

fn subroutine_sequence(program: &mut MicroProgram, mode: AddressingMode) -> Option<()> {
    if mode != AddressingMode::Absolute {
        return None;
    }
    // 2    PC     R  fetch low address byte, increment PC
    // 3  $0100,S  W  push PCH on stack, decrement S
    // 4  $0100,S  W  push PCL on stack, decrement S
    // 5    PC     R  fetch high address byte
    // 6    PC     R  copy latch to PC
    emit(program, Action::copy_byte(Location::PcPointerAdvance, Location::TempLow))?;
    emit(program, Action::write_byte(Location::PcHigh, Location::Stack))?;
    emit(program, Action::write_byte(Location::PcLow, Location::Stack))?;
    emit(program, Action::copy_byte(Location::PcPointer, Location::TempHigh))?;
    emit(program, Action::copy_short(Location::Temp, Location::Pc))
}

/// Build the micro-program for an instruction
///
/// Fails with `UnimplementedAddressingMode` when the category has no sequence for
/// the mode; no partially filled program is returned.
pub fn build(meta: InstructionMeta, mode: AddressingMode) -> Result<MicroProgram, Error> {
    let mut program = MicroProgram::new();
    // 1    PC     R  fetch opcode, increment PC
    program.push(Action::increment_pc());

    let built = match meta.category {
        Category::NoOp => Some(()),
        Category::Jump => jump_sequence(&mut program, mode),
        Category::LoadX => read_sequence(&mut program, mode, Location::X, LOAD_FLAGS),
        Category::StoreX => write_sequence(&mut program, mode, Location::X),
        Category::BitTest => match mode {
            AddressingMode::ZeroPage | AddressingMode::Absolute => {
                read_sequence(&mut program, mode, Location::None, Behavior::BitTest)
            }
            _ => None,
        },
        Category::JumpSubroutine => subroutine_sequence(&mut program, mode),
    };

    built.map(|()| program).ok_or(Error::UnimplementedAddressingMode {
        mnemonic: meta.mnemonic,
        mode,
    })
}

/// Decode the opcode at PC and build its micro-program. Does not modify the state.
pub fn next_instruction(state: &CpuState) -> Result<(DecodedInstruction, MicroProgram), Error> {
    let opcode = state.read(state.pc)?;
    let instruction = decode(opcode).into_instruction()?;
    let program = build(instruction.meta, instruction.mode)?;
    Ok((instruction, program))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::types::ActionKind;

    fn build_opcode(opcode: u8) -> Result<MicroProgram, Error> {
        let instruction = decode(opcode).into_instruction()?;
        build(instruction.meta, instruction.mode)
    }

    #[test]
    fn test_every_program_starts_with_fetch() {
        for opcode in 0..=255u8 {
            if let Ok(program) = build_opcode(opcode) {
                assert_eq!(program.actions()[0], Action::increment_pc());
            }
        }
    }

    #[test]
    fn test_jmp_absolute_program() {
        let program = build_opcode(0x4C).unwrap();
        assert_eq!(program.cycle_count(), 3);
        assert_eq!(
            program.actions()[1..],
            [
                Action::copy_short(Location::PcPointerAdvance, Location::Temp),
                Action::copy_short(Location::Temp, Location::Pc),
            ]
        );
    }

    #[test]
    fn test_ldx_immediate_program() {
        let program = build_opcode(0xA2).unwrap();
        assert_eq!(program.cycle_count(), 2);
        assert_eq!(
            program.actions()[1],
            Action::copy_byte(Location::PcPointerAdvance, Location::X).then(LOAD_FLAGS)
        );
    }

    #[test]
    fn test_ldx_absolute_program() {
        let program = build_opcode(0xAE).unwrap();
        assert_eq!(program.cycle_count(), 4);
        assert_eq!(
            program.actions()[3],
            Action::read_byte(Location::Temp, Location::X).then(LOAD_FLAGS)
        );
    }

    #[test]
    fn test_ldx_zero_page_program() {
        let program = build_opcode(0xA6).unwrap();
        assert_eq!(program.cycle_count(), 3);
        assert_eq!(
            program.actions()[2],
            Action::read_byte(Location::TempLow, Location::X).then(LOAD_FLAGS)
        );
    }

    #[test]
    fn test_stx_zero_page_program() {
        let program = build_opcode(0x86).unwrap();
        assert_eq!(program.cycle_count(), 3);
        assert_eq!(
            program.actions()[1..],
            [
                Action::copy_byte(Location::PcPointerAdvance, Location::TempLow),
                Action::write_byte(Location::X, Location::TempLow),
            ]
        );
    }

    #[test]
    fn test_stx_absolute_program() {
        let program = build_opcode(0x8E).unwrap();
        assert_eq!(program.cycle_count(), 4);
        assert_eq!(
            program.actions()[3],
            Action::write_byte(Location::X, Location::Temp)
        );
    }

    #[test]
    fn test_bit_programs() {
        let zero_page = build_opcode(0x24).unwrap();
        assert_eq!(zero_page.cycle_count(), 3);
        assert_eq!(zero_page.actions()[2].behavior, Behavior::BitTest);

        let absolute = build_opcode(0x2C).unwrap();
        assert_eq!(absolute.cycle_count(), 4);
        assert_eq!(
            absolute.actions()[3],
            Action::read_byte(Location::Temp, Location::None).then(Behavior::BitTest)
        );
    }

    #[test]
    fn test_jsr_program_takes_six_cycles() {
        let program = build_opcode(0x20).unwrap();
        assert_eq!(program.cycle_count(), 6);
        let pushes = program
            .actions()
            .iter()
            .filter(|a| {
                matches!(
                    a.kind,
                    ActionKind::WriteByte {
                        address: Location::Stack,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(pushes, 2);
    }

    #[test]
    fn test_no_op_is_fetch_only() {
        let program = build(InstructionMeta::new("NOP", Category::NoOp), AddressingMode::Implied).unwrap();
        assert_eq!(program.cycle_count(), 1);
        assert_eq!(program.actions(), [Action::increment_pc()]);
    }

    #[test]
    fn test_every_load_sets_flags() {
        for opcode in [0xA2, 0xA6, 0xAE] {
            let program = build_opcode(opcode).unwrap();
            let last = program.actions()[program.len() - 1];
            assert_eq!(last.behavior, LOAD_FLAGS, "opcode {:02X}", opcode);
        }
    }

    #[test]
    fn test_unimplemented_modes_are_errors() {
        // LDX zp,Y column decodes as ZeroPageX
        assert_eq!(
            build_opcode(0xB6),
            Err(Error::UnimplementedAddressingMode {
                mnemonic: "LDX",
                mode: AddressingMode::ZeroPageX
            })
        );
        // STX has no immediate form
        assert_eq!(
            build_opcode(0xA2 & !0x20),
            Err(Error::UnimplementedAddressingMode {
                mnemonic: "STX",
                mode: AddressingMode::Immediate
            })
        );
        // JMP (indirect)
        assert_eq!(
            build_opcode(0x6C),
            Err(Error::UnimplementedAddressingMode {
                mnemonic: "JMP",
                mode: AddressingMode::Indirect
            })
        );
        // BIT #imm does not exist on the 6502
        assert!(build(InstructionMeta::new("BIT", Category::BitTest), AddressingMode::Immediate).is_err());
    }

    #[test]
    fn test_next_instruction_reads_at_pc() {
        let mut prg = vec![0; 0x4000];
        prg[0] = 0xA2;
        prg[1] = 0x05;
        let mut state = CpuState::new(prg);
        state.pc = 0xC000;

        let (instruction, program) = next_instruction(&state).unwrap();
        assert_eq!(instruction.opcode(), 0xA2);
        assert_eq!(program.cycle_count(), 2);
        assert_eq!(state.pc, 0xC000);
    }

    #[test]
    fn test_next_instruction_rejects_illegal_class() {
        let mut state = CpuState::new(Vec::new());
        state.load(0x0000, &[0xFF]).unwrap();
        assert_eq!(next_instruction(&state), Err(Error::IllegalOpcodeClass(0xFF)));
    }
}
