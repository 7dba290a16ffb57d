//! iNES cartridge images: header model and PRG/CHR extraction.

mod cartridge;
mod header;

pub use cartridge::{Cartridge, TRAINER_SIZE};
pub use header::{HEADER_SIZE, Header, MAGIC, MirroringMode, TvSystem};

#[cfg(test)]
pub(crate) use cartridge::tests::create_test_rom;
