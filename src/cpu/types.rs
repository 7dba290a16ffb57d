//! Core types for cycle-level instruction execution
//!
//! An instruction is described by two orthogonal pieces of metadata:
//! 1. **Addressing mode** - how the operand is located
//! 2. **Category** - what the instruction does with it
//!
//! The sequencer turns that pair into a [`MicroProgram`]: an ordered list of
//! [`Action`]s, one per bus cycle, which the interpreter applies to the CPU state.

/// The rule for locating an instruction's operand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Accumulator,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Immediate,
    Implied,
    Indirect,
    /// (zp,X)
    IndexedIndirect,
    /// (zp),Y
    IndirectIndexed,
    Relative,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    /// Slot of the opcode matrix with no addressing mode
    Unused,
}

impl AddressingMode {
    /// Number of operand bytes following the opcode
    pub fn operand_len(self) -> u16 {
        match self {
            AddressingMode::Immediate
            | AddressingMode::ZeroPage
            | AddressingMode::ZeroPageX
            | AddressingMode::ZeroPageY
            | AddressingMode::IndexedIndirect
            | AddressingMode::IndirectIndexed
            | AddressingMode::Relative => 1,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 2,
            AddressingMode::Accumulator | AddressingMode::Implied | AddressingMode::Unused => 0,
        }
    }
}

/// Functional category an instruction's micro-program is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    NoOp,
    Jump,
    LoadX,
    StoreX,
    BitTest,
    JumpSubroutine,
}

/// Mnemonic and category for one slot of the opcode matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionMeta {
    pub mnemonic: &'static str,
    pub category: Category,
}

impl InstructionMeta {
    pub const fn new(mnemonic: &'static str, category: Category) -> Self {
        Self { mnemonic, category }
    }
}

/// Symbolic operand of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Discard the value (the behavior still sees it)
    None,
    A,
    X,
    Y,
    Pc,
    PcHigh,
    PcLow,
    /// Memory at PC
    PcPointer,
    /// Memory at PC, then PC advances past what was read
    PcPointerAdvance,
    /// 16-bit address latch
    Temp,
    TempHigh,
    /// Low half of the latch; as an address it selects zero page
    TempLow,
    /// Hardware stack at $0100 + SP (push on write, pull on read)
    Stack,
}

/// Post-action effect on the status register, applied to the byte the action moved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    None,
    /// Recompute the flags in `mask` from the value
    SetFlags { mask: u8 },
    /// 6502 BIT semantics against the accumulator
    BitTest,
}

/// Primary effect of one bus cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    IncrementPc,
    /// Internal cycle with no visible effect
    Idle,
    CopyByte { from: Location, to: Location },
    CopyShort { from: Location, to: Location },
    ReadByte { address: Location, to: Location },
    WriteByte { from: Location, address: Location },
}

/// One atomic bus cycle of an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    pub kind: ActionKind,
    pub behavior: Behavior,
}

impl Action {
    pub const fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            behavior: Behavior::None,
        }
    }

    pub const fn with_behavior(kind: ActionKind, behavior: Behavior) -> Self {
        Self { kind, behavior }
    }

    pub const fn increment_pc() -> Self {
        Self::new(ActionKind::IncrementPc)
    }

    pub const fn copy_byte(from: Location, to: Location) -> Self {
        Self::new(ActionKind::CopyByte { from, to })
    }

    pub const fn copy_short(from: Location, to: Location) -> Self {
        Self::new(ActionKind::CopyShort { from, to })
    }

    pub const fn read_byte(address: Location, to: Location) -> Self {
        Self::new(ActionKind::ReadByte { address, to })
    }

    pub const fn write_byte(from: Location, address: Location) -> Self {
        Self::new(ActionKind::WriteByte { from, address })
    }

    pub const fn then(self, behavior: Behavior) -> Self {
        Self::with_behavior(self.kind, behavior)
    }
}

pub const MAX_ACTIONS: usize = 16;

/// The actions of one instruction, one per cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MicroProgram {
    actions: [Action; MAX_ACTIONS],
    len: usize,
}

impl MicroProgram {
    pub const fn new() -> Self {
        Self {
            actions: [Action::new(ActionKind::Idle); MAX_ACTIONS],
            len: 0,
        }
    }

    /// Append an action. Returns false when the program is full.
    pub fn push(&mut self, action: Action) -> bool {
        if self.len == MAX_ACTIONS {
            return false;
        }
        self.actions[self.len] = action;
        self.len += 1;
        true
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Cycles the instruction takes: one per action
    pub fn cycle_count(&self) -> u8 {
        self.len as u8
    }
}

impl Default for MicroProgram {
    fn default() -> Self {
        Self::new()
    }
}
