//! 6502 instruction core
//!
//! Instructions are decoded from the `aaabbbcc` opcode matrix, turned into a
//! [`MicroProgram`] of one action per cycle, and interpreted against a [`CpuState`].

mod decoder;
pub mod flags;
mod interpreter;
mod opcode;
mod sequencer;
mod state;
mod types;

pub use decoder::{decode, Decoded};
pub use interpreter::{execute, step};
pub use opcode::{DecodedInstruction, OpcodeBits};
pub use sequencer::{build, next_instruction};
pub use state::{CpuState, RAM_SIZE, STACK_BASE};
pub use types::{
    Action, ActionKind, AddressingMode, Behavior, Category, InstructionMeta, Location, MicroProgram,
    MAX_ACTIONS,
};
