//! Conformance checking against nestest-style execution logs.

mod disassembly;
mod record;
mod verifier;

pub use disassembly::disassemble;
pub use record::{compare_lines, TraceRecord, PPU_COLUMNS};
pub use verifier::{Mismatch, SessionConfig, TraceVerifier, VerifierState};
