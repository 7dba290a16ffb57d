//! Instruction-level core of a NES emulator.
//!
//! Cartridge images are parsed into PRG/CHR banks, the 6502 instruction stream is
//! decoded and executed cycle by cycle as micro-programs, and the resulting
//! execution is checked line by line against a reference trace log.

pub mod cartridge;
pub mod cpu;
pub mod diagnostics;
pub mod error;
pub mod trace;

pub use error::Error;
