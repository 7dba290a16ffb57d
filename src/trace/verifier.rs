use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ansi_term::Colour::{Green, Red, Yellow};
use log::{debug, info, trace, warn};

use crate::cartridge::Cartridge;
use crate::cpu::{execute, next_instruction, CpuState};
use crate::diagnostics::ErrorQueue;
use crate::error::Error;

use super::disassembly::disassemble;
use super::record::{compare_lines, TraceRecord, PPU_COLUMNS};

/// Start-up values of a verification session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Address of the first traced instruction
    pub entry: u16,
    /// Initial status register
    pub status: u8,
    /// Initial stack pointer
    pub stack_pointer: u8,
    /// Cycle counter of the first traced instruction (the reset sequence takes 7)
    pub start_cycles: u64,
}

impl Default for SessionConfig {
    /// nestest's automated mode: start at $C000 with interrupts disabled
    fn default() -> Self {
        Self {
            entry: 0xC000,
            status: 0x24,
            stack_pointer: 0xFD,
            start_cycles: 7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifierState {
    Ready,
    Running,
    Passed,
    Failed,
}

/// First line where the produced trace differs from the reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// 1-based line number in the reference log
    pub line: usize,
    /// 0-based column of the first differing character
    pub column: usize,
    pub expected: String,
    pub produced: String,
}

impl Mismatch {
    /// The reference line with matching characters in green, differing ones in red and the
    /// ignored PPU slot in yellow. Without colour, a caret marks the first difference.
    pub fn render(&self, color: bool) -> String {
        if !color {
            return format!(
                "{}\n{}\n{}^",
                self.expected,
                self.produced,
                " ".repeat(self.column)
            );
        }

        let produced = self.produced.as_bytes();
        let mut out = String::new();
        // Columns are byte offsets, as in `compare_lines`
        for (column, ch) in self.expected.char_indices() {
            let text = ch.to_string();
            let colour = if PPU_COLUMNS.contains(&column) {
                Yellow
            } else if produced.get(column..column + text.len()) == Some(text.as_bytes()) {
                Green
            } else {
                Red
            };
            out.push_str(&colour.paint(text).to_string());
        }
        out
    }
}

/// Runs a cartridge against a reference log one instruction per line
pub struct TraceVerifier {
    config: SessionConfig,
    cpu: CpuState,
    cycles: u64,
    state: VerifierState,
    errors: ErrorQueue,
    mismatch: Option<Mismatch>,
    lines_checked: usize,
    source: String,
}

impl TraceVerifier {
    pub fn new(cartridge: &Cartridge, config: SessionConfig) -> Self {
        Self {
            config,
            cpu: CpuState::from_cartridge(cartridge),
            cycles: config.start_cycles,
            state: VerifierState::Ready,
            errors: ErrorQueue::new(),
            mismatch: None,
            lines_checked: 0,
            source: String::from("<reader>"),
        }
    }

    pub fn state(&self) -> VerifierState {
        self.state
    }

    pub fn cpu(&self) -> &CpuState {
        &self.cpu
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn errors(&self) -> &ErrorQueue {
        &self.errors
    }

    pub fn errors_mut(&mut self) -> &mut ErrorQueue {
        &mut self.errors
    }

    pub fn mismatch(&self) -> Option<&Mismatch> {
        self.mismatch.as_ref()
    }

    /// Reference lines compared so far, including a mismatching one
    pub fn lines_checked(&self) -> usize {
        self.lines_checked
    }

    fn start(&mut self) {
        self.cpu
            .reset(self.config.entry, self.config.status, self.config.stack_pointer);
        self.cycles = self.config.start_cycles;
        self.mismatch = None;
        self.lines_checked = 0;
        self.errors = ErrorQueue::new();
        self.state = VerifierState::Running;
        info!(
            "Verifying trace from {} starting at ${:04X}",
            self.source, self.config.entry
        );
    }

    fn fail(&mut self, error: &Error) {
        warn!("{}", error);
        self.errors.push_error(error);
        self.state = VerifierState::Failed;
    }

    /// Execute the instruction at PC and render its trace line
    fn execute_next(&mut self) -> Result<TraceRecord, Error> {
        let (instruction, program) = next_instruction(&self.cpu)?;
        let record = TraceRecord {
            pc: self.cpu.pc,
            opcode: instruction.opcode(),
            disassembly: disassemble(&self.cpu, &instruction)?,
            a: self.cpu.a,
            x: self.cpu.x,
            y: self.cpu.y,
            p: self.cpu.p,
            sp: self.cpu.sp,
            ppu: (0, 0),
            cycles: self.cycles,
        };

        let cycles = execute(&mut self.cpu, &program)?;
        self.cycles += cycles as u64;
        Ok(record)
    }

    fn report_mismatch(&mut self, mismatch: Mismatch) {
        let error = Error::TraceMismatch {
            line: mismatch.line,
            column: mismatch.column + 1,
        };
        self.fail(&error);
        self.errors.push(format!("Expected: {}", mismatch.expected));
        self.errors.push(format!("Produced: {}", mismatch.produced));

        match (
            TraceRecord::parse(&mismatch.expected),
            TraceRecord::parse(&mismatch.produced),
        ) {
            (Ok(expected), Ok(produced)) => {
                for difference in expected.differences(&produced) {
                    self.errors.push(difference);
                }
            }
            (Err(e), _) | (_, Err(e)) => self.errors.push_error(&e),
        }

        self.mismatch = Some(mismatch);
    }

    /// Compare the emulator against every line of `reader`, stopping at the first mismatch
    /// or execution error.
    pub fn run<R: BufRead>(&mut self, reader: R) -> VerifierState {
        self.start();

        for (index, line) in reader.lines().enumerate() {
            let expected = match line {
                Ok(line) => line,
                Err(e) => {
                    let error = Error::FileUnreadable {
                        path: self.source.clone(),
                        reason: e.to_string(),
                    };
                    self.fail(&error);
                    return self.state;
                }
            };
            let expected = expected.trim_end();
            if expected.is_empty() {
                continue;
            }

            let record = match self.execute_next() {
                Ok(record) => record,
                Err(e) => {
                    self.fail(&e);
                    return self.state;
                }
            };
            self.lines_checked += 1;

            let produced = record.to_string();
            trace!("{}", produced);

            if let Some(column) = compare_lines(expected, &produced) {
                self.report_mismatch(Mismatch {
                    line: index + 1,
                    column,
                    expected: expected.to_string(),
                    produced,
                });
                return self.state;
            }
        }

        self.state = VerifierState::Passed;
        debug!(
            "Trace verified: {} instructions, {} cycles",
            self.lines_checked, self.cycles
        );
        self.state
    }

    /// Open a reference log and run it
    pub fn verify_file(&mut self, path: impl AsRef<Path>) -> Result<VerifierState, Error> {
        let path = path.as_ref();
        self.source = path.display().to_string();

        let file = File::open(path).map_err(|e| Error::FileUnreadable {
            path: self.source.clone(),
            reason: e.to_string(),
        });
        match file {
            Ok(file) => Ok(self.run(BufReader::new(file))),
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }
}
