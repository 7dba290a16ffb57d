//! One line of a nestest-style execution log
//!
//! ```text
//! C000  4C F5 C5  JMP $C5F5                       A:00 X:00 Y:00 P:24 SP:FD PPU:  0, 21 CYC:7
//! ```

use std::fmt;
use std::ops::Range;

use crate::error::Error;

/// Columns of the `PPU:ddd,ddd ` slot, skipped when comparing lines
pub const PPU_COLUMNS: Range<usize> = 74..86;

const PC_COLUMNS: Range<usize> = 0..4;
const OPCODE_COLUMNS: Range<usize> = 6..8;
const DISASSEMBLY_COLUMNS: Range<usize> = 9..48;
const A_COLUMNS: Range<usize> = 50..52;
const X_COLUMNS: Range<usize> = 55..57;
const Y_COLUMNS: Range<usize> = 60..62;
const P_COLUMNS: Range<usize> = 65..67;
const SP_COLUMNS: Range<usize> = 71..73;
const DOT_COLUMNS: Range<usize> = 78..81;
const SCANLINE_COLUMNS: Range<usize> = 82..85;
const CYCLES_START: usize = 90;

const LABELS: [(usize, &str); 7] = [
    (48, "A:"),
    (53, "X:"),
    (58, "Y:"),
    (63, "P:"),
    (68, "SP:"),
    (74, "PPU:"),
    (86, "CYC:"),
];

/// Machine state printed for one executed instruction. Registers are captured before
/// the instruction runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRecord {
    pub pc: u16,
    pub opcode: u8,
    /// Operand bytes, mnemonic and operand
    pub disassembly: String,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub p: u8,
    pub sp: u8,
    /// PPU (dot, scanline)
    pub ppu: (u16, u16),
    /// CPU cycles elapsed before the instruction
    pub cycles: u64,
}

fn malformed(reason: impl Into<String>) -> Error {
    Error::MalformedTraceLine {
        reason: reason.into(),
    }
}

fn slice(line: &str, columns: Range<usize>) -> Result<&str, Error> {
    line.get(columns.clone())
        .ok_or_else(|| malformed(format!("line too short for columns {:?}", columns)))
}

fn hex_u8(line: &str, columns: Range<usize>, name: &str) -> Result<u8, Error> {
    let text = slice(line, columns)?;
    u8::from_str_radix(text, 16).map_err(|_| malformed(format!("{} is not hex: {:?}", name, text)))
}

fn decimal(line: &str, columns: Range<usize>, name: &str) -> Result<u16, Error> {
    let text = slice(line, columns)?;
    text.trim()
        .parse()
        .map_err(|_| malformed(format!("{} is not a number: {:?}", name, text)))
}

impl TraceRecord {
    /// Parse a log line in the fixed column layout
    pub fn parse(line: &str) -> Result<Self, Error> {
        let line = line.trim_end_matches(['\r', '\n']);

        for (column, label) in LABELS {
            if line.get(column..column + label.len()) != Some(label) {
                return Err(malformed(format!("expected {:?} at column {}", label, column)));
            }
        }

        let pc_text = slice(line, PC_COLUMNS)?;
        let pc = u16::from_str_radix(pc_text, 16)
            .map_err(|_| malformed(format!("PC is not hex: {:?}", pc_text)))?;

        let cycles_text = line
            .get(CYCLES_START..)
            .ok_or_else(|| malformed("missing cycle counter"))?;
        let cycles = cycles_text
            .trim()
            .parse()
            .map_err(|_| malformed(format!("CYC is not a number: {:?}", cycles_text)))?;

        Ok(Self {
            pc,
            opcode: hex_u8(line, OPCODE_COLUMNS, "opcode")?,
            disassembly: slice(line, DISASSEMBLY_COLUMNS)?.trim_end().to_string(),
            a: hex_u8(line, A_COLUMNS, "A")?,
            x: hex_u8(line, X_COLUMNS, "X")?,
            y: hex_u8(line, Y_COLUMNS, "Y")?,
            p: hex_u8(line, P_COLUMNS, "P")?,
            sp: hex_u8(line, SP_COLUMNS, "SP")?,
            ppu: (
                decimal(line, DOT_COLUMNS, "PPU dot")?,
                decimal(line, SCANLINE_COLUMNS, "PPU scanline")?,
            ),
            cycles,
        })
    }

    /// Describe every field that differs from `other`, ignoring the PPU pair
    pub fn differences(&self, other: &TraceRecord) -> Vec<String> {
        let mut fields = Vec::new();
        let mut check = |name: &str, expected: String, actual: String| {
            if expected != actual {
                fields.push(format!("{}: expected {}, produced {}", name, expected, actual));
            }
        };

        check("PC", format!("{:04X}", self.pc), format!("{:04X}", other.pc));
        check("opcode", format!("{:02X}", self.opcode), format!("{:02X}", other.opcode));
        check("disassembly", self.disassembly.clone(), other.disassembly.clone());
        check("A", format!("{:02X}", self.a), format!("{:02X}", other.a));
        check("X", format!("{:02X}", self.x), format!("{:02X}", other.x));
        check("Y", format!("{:02X}", self.y), format!("{:02X}", other.y));
        check("P", format!("{:02X}", self.p), format!("{:02X}", other.p));
        check("SP", format!("{:02X}", self.sp), format!("{:02X}", other.sp));
        check("CYC", self.cycles.to_string(), other.cycles.to_string());
        fields
    }
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:04X}  {:02X} {:<39}A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} PPU:{:>3},{:>3} CYC:{}",
            self.pc,
            self.opcode,
            self.disassembly,
            self.a,
            self.x,
            self.y,
            self.p,
            self.sp,
            self.ppu.0,
            self.ppu.1,
            self.cycles
        )
    }
}

/// Index of the first column where the lines differ outside [`PPU_COLUMNS`].
/// A line that ends early differs at the column where it ends.
pub fn compare_lines(expected: &str, produced: &str) -> Option<usize> {
    let expected = expected.as_bytes();
    let produced = produced.as_bytes();

    let differing = expected
        .iter()
        .zip(produced)
        .enumerate()
        .find(|(column, (e, p))| e != p && !PPU_COLUMNS.contains(column))
        .map(|(column, _)| column);

    differing.or_else(|| {
        let shortest = expected.len().min(produced.len());
        (expected.len() != produced.len()).then_some(shortest)
    })
}
