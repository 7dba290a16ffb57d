use crate::error::{Error, Width};

use super::flags::{FLAG_NEGATIVE, FLAG_OVERFLOW, FLAG_ZERO};
use super::sequencer::next_instruction;
use super::state::{CpuState, STACK_BASE};
use super::types::{Action, ActionKind, Behavior, Location, MicroProgram};

/// Run every action of `program` in order against `state`.
/// Returns the number of cycles consumed.
pub fn execute(state: &mut CpuState, program: &MicroProgram) -> Result<u8, Error> {
    for action in program.actions() {
        execute_action(state, action)?;
    }
    Ok(program.cycle_count())
}

/// Fetch, decode, build and execute the instruction at PC
pub fn step(state: &mut CpuState) -> Result<u8, Error> {
    let (_, program) = next_instruction(state)?;
    execute(state, &program)
}

fn execute_action(state: &mut CpuState, action: &Action) -> Result<(), Error> {
    let moved = match action.kind {
        ActionKind::IncrementPc => {
            state.pc = state.pc.wrapping_add(1);
            None
        }
        ActionKind::Idle => None,
        ActionKind::CopyByte { from, to } => {
            let value = read_byte(state, from)?;
            write_byte(state, to, value)?;
            Some(value)
        }
        ActionKind::CopyShort { from, to } => {
            let value = read_short(state, from)?;
            write_short(state, to, value)?;
            None
        }
        ActionKind::ReadByte { address, to } => {
            let value = load(state, address)?;
            write_byte(state, to, value)?;
            Some(value)
        }
        ActionKind::WriteByte { from, address } => {
            let value = read_byte(state, from)?;
            store(state, address, value)?;
            Some(value)
        }
    };

    // Behaviors only see byte-sized moves
    if let Some(value) = moved {
        apply_behavior(state, action.behavior, value);
    }
    Ok(())
}

fn apply_behavior(state: &mut CpuState, behavior: Behavior, value: u8) {
    match behavior {
        Behavior::None => {}
        Behavior::SetFlags { mask } => {
            // Z and N always follow the value; V only when the mask asks for it
            let updated = FLAG_ZERO | FLAG_NEGATIVE | (mask & FLAG_OVERFLOW);
            let mut flags = value & (FLAG_NEGATIVE | FLAG_OVERFLOW);
            if value == 0 {
                flags |= FLAG_ZERO;
            }
            state.p = (state.p & !updated) | (flags & updated);
        }
        Behavior::BitTest => {
            let mut flags = value & (FLAG_NEGATIVE | FLAG_OVERFLOW);
            if state.a & value == 0 {
                flags |= FLAG_ZERO;
            }
            state.p = (state.p & !(FLAG_ZERO | FLAG_NEGATIVE | FLAG_OVERFLOW)) | flags;
        }
    }
}

fn invalid(location: Location, width: Width) -> Error {
    Error::InvalidLocation { location, width }
}

/// Push a byte onto the stack
fn push(state: &mut CpuState, value: u8) -> Result<(), Error> {
    state.write(STACK_BASE | state.sp as u16, value)?;
    state.sp = state.sp.wrapping_sub(1);
    Ok(())
}

/// Pull a byte from the stack
fn pull(state: &mut CpuState) -> Result<u8, Error> {
    state.sp = state.sp.wrapping_add(1);
    state.read(STACK_BASE | state.sp as u16)
}

fn read_byte(state: &mut CpuState, location: Location) -> Result<u8, Error> {
    match location {
        Location::A => Ok(state.a),
        Location::X => Ok(state.x),
        Location::Y => Ok(state.y),
        Location::PcHigh => Ok((state.pc >> 8) as u8),
        Location::PcLow => Ok(state.pc as u8),
        Location::TempHigh => Ok((state.latch >> 8) as u8),
        Location::TempLow => Ok(state.latch as u8),
        Location::PcPointer => state.read(state.pc),
        Location::PcPointerAdvance => {
            let value = state.read(state.pc)?;
            state.pc = state.pc.wrapping_add(1);
            Ok(value)
        }
        Location::Stack => pull(state),
        Location::None | Location::Pc | Location::Temp => Err(invalid(location, Width::Byte)),
    }
}

fn write_byte(state: &mut CpuState, location: Location, value: u8) -> Result<(), Error> {
    match location {
        Location::None => {}
        Location::A => state.a = value,
        Location::X => state.x = value,
        Location::Y => state.y = value,
        Location::PcHigh => state.pc = (state.pc & 0x00FF) | ((value as u16) << 8),
        Location::PcLow => state.pc = (state.pc & 0xFF00) | value as u16,
        Location::TempHigh => state.latch = (state.latch & 0x00FF) | ((value as u16) << 8),
        Location::TempLow => state.latch = (state.latch & 0xFF00) | value as u16,
        Location::Stack => push(state, value)?,
        Location::Pc | Location::Temp | Location::PcPointer | Location::PcPointerAdvance => {
            return Err(invalid(location, Width::Byte));
        }
    }
    Ok(())
}

fn read_short(state: &mut CpuState, location: Location) -> Result<u16, Error> {
    match location {
        Location::Pc => Ok(state.pc),
        Location::Temp => Ok(state.latch),
        Location::PcPointer => state.read_u16(state.pc),
        Location::PcPointerAdvance => {
            let value = state.read_u16(state.pc)?;
            state.pc = state.pc.wrapping_add(2);
            Ok(value)
        }
        _ => Err(invalid(location, Width::Short)),
    }
}

fn write_short(state: &mut CpuState, location: Location, value: u16) -> Result<(), Error> {
    match location {
        Location::Pc => state.pc = value,
        Location::Temp => state.latch = value,
        _ => return Err(invalid(location, Width::Short)),
    }
    Ok(())
}

/// Resolve a location used as a memory address
fn address(state: &CpuState, location: Location) -> Result<u16, Error> {
    match location {
        Location::Temp => Ok(state.latch),
        Location::TempLow => Ok(state.latch & 0x00FF),
        Location::Pc => Ok(state.pc),
        _ => Err(invalid(location, Width::Address)),
    }
}

fn load(state: &mut CpuState, location: Location) -> Result<u8, Error> {
    if location == Location::Stack {
        return pull(state);
    }
    let addr = address(state, location)?;
    state.read(addr)
}

fn store(state: &mut CpuState, location: Location, value: u8) -> Result<(), Error> {
    if location == Location::Stack {
        return push(state, value);
    }
    let addr = address(state, location)?;
    state.write(addr, value)
}
