//! Operand column of a trace line
//!
//! Renders the raw operand bytes followed by the mnemonic and its operand in the
//! nestest notation, e.g. `F5 C5  JMP $C5F5` or `10     STX $10 = 00`.

use crate::cpu::{AddressingMode, Category, CpuState, DecodedInstruction};
use crate::error::Error;

/// Width of the raw operand bytes column
const OPERAND_BYTES_WIDTH: usize = 7;

/// Render an instruction whose opcode sits at `state.pc`, using the state as it is
/// before the instruction executes.
pub fn disassemble(state: &CpuState, instruction: &DecodedInstruction) -> Result<String, Error> {
    let category = instruction.meta.category;
    let mode = instruction.mode;

    // NoOp programs only fetch the opcode, so no operand bytes are consumed
    let operand_len = match category {
        Category::NoOp => 0,
        _ => mode.operand_len(),
    };

    let mut bytes = Vec::with_capacity(operand_len as usize);
    for offset in 1..=operand_len {
        bytes.push(state.read(state.pc.wrapping_add(offset))?);
    }

    let raw = bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ");

    let operand = render_operand(state, category, mode, &bytes)?;
    let text = match operand {
        Some(operand) => format!("{} {}", instruction.mnemonic(), operand),
        None => instruction.mnemonic().to_string(),
    };

    Ok(format!("{:<width$}{}", raw, text, width = OPERAND_BYTES_WIDTH))
}

fn render_operand(
    state: &CpuState,
    category: Category,
    mode: AddressingMode,
    bytes: &[u8],
) -> Result<Option<String>, Error> {
    let operand = match (category, mode, bytes) {
        (Category::NoOp, _, _) => None,
        (_, AddressingMode::Immediate, [value]) => Some(format!("#${:02X}", value)),
        (Category::Jump | Category::JumpSubroutine | Category::LoadX, AddressingMode::Absolute, [lo, hi]) => {
            Some(format!("${:04X}", u16::from_le_bytes([*lo, *hi])))
        }
        (Category::LoadX | Category::BitTest, AddressingMode::ZeroPage, [zp]) => {
            let value = state.read(*zp as u16)?;
            Some(format!("${:02X} = {:02X}", zp, value))
        }
        (Category::BitTest, AddressingMode::Absolute, [lo, hi]) => {
            let addr = u16::from_le_bytes([*lo, *hi]);
            let value = state.read(addr)?;
            Some(format!("${:04X} = {:02X}", addr, value))
        }
        (Category::StoreX, AddressingMode::ZeroPage, [zp]) => {
            Some(format!("${:02X} = {:02X}", zp, state.x))
        }
        (Category::StoreX, AddressingMode::Absolute, [lo, hi]) => Some(format!(
            "${:04X} = {:02X}",
            u16::from_le_bytes([*lo, *hi]),
            state.x
        )),
        // Other combinations are rejected by the sequencer before anything is rendered
        (_, _, bytes) => Some(
            bytes
                .iter()
                .rev()
                .fold(String::from("$"), |text, b| text + &format!("{:02X}", b)),
        ),
    };
    Ok(operand)
}
