use std::fmt;

use crate::cpu::{AddressingMode, Location};

/// Errors raised while loading a cartridge, executing instructions or verifying a trace.
///
/// None of these are fatal to the process. Callers either propagate them or queue them
/// as text in an [`ErrorQueue`](crate::diagnostics::ErrorQueue).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A ROM or trace log could not be opened or read
    FileUnreadable { path: String, reason: String },
    /// The image does not start with "NES\x1A"
    InvalidMagicNumber,
    /// The image is shorter than its header claims
    TruncatedImage { expected: usize, actual: usize },
    /// The address is outside RAM and PRG ROM
    UnmappedAddress(u16),
    /// No micro-program exists for this instruction and addressing mode
    UnimplementedAddressingMode {
        mnemonic: &'static str,
        mode: AddressingMode,
    },
    /// Opcodes with cc == 3 (the undocumented class)
    IllegalOpcodeClass(u8),
    /// A location was used with a width it cannot provide
    InvalidLocation { location: Location, width: Width },
    /// A reference trace line does not follow the log layout
    MalformedTraceLine { reason: String },
    /// The produced trace line differs from the reference
    TraceMismatch { line: usize, column: usize },
}

/// Operand width an action moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Byte,
    Short,
    Address,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FileUnreadable { path, reason } => {
                write!(f, "Unable to read file {}: {}", path, reason)
            }
            Error::InvalidMagicNumber => write!(f, "Invalid header, no magic number"),
            Error::TruncatedImage { expected, actual } => write!(
                f,
                "File too small for specified ROM sizes ({} bytes expected, {} found)",
                expected, actual
            ),
            Error::UnmappedAddress(addr) => {
                write!(f, "Memory access at ${:04X} is not implemented", addr)
            }
            Error::UnimplementedAddressingMode { mnemonic, mode } => {
                write!(f, "{} does not implement addressing mode {:?}", mnemonic, mode)
            }
            Error::IllegalOpcodeClass(opcode) => {
                write!(f, "Opcode 0x{:02X} belongs to the illegal cc=3 class", opcode)
            }
            Error::InvalidLocation { location, width } => {
                write!(f, "{:?} cannot be used as a {:?} operand", location, width)
            }
            Error::MalformedTraceLine { reason } => write!(f, "Malformed trace line: {}", reason),
            Error::TraceMismatch { line, column } => {
                write!(f, "Trace mismatch at line {}, column {}", line, column)
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_address_in_hex() {
        let message = Error::UnmappedAddress(0x2002).to_string();
        assert!(message.contains("$2002"));
    }

    #[test]
    fn test_display_illegal_opcode() {
        let message = Error::IllegalOpcodeClass(0xFF).to_string();
        assert!(message.contains("0xFF"));
        assert!(message.contains("cc=3"));
    }

    #[test]
    fn test_display_unimplemented_mode() {
        let err = Error::UnimplementedAddressingMode {
            mnemonic: "LDX",
            mode: AddressingMode::ZeroPageX,
        };
        assert_eq!(err.to_string(), "LDX does not implement addressing mode ZeroPageX");
    }
}
