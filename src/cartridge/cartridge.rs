use std::fs;
use std::path::Path;

use log::debug;

use crate::cartridge::header::{HEADER_SIZE, Header};
use crate::error::Error;

pub const TRAINER_SIZE: usize = 512;

/// Represents an NES cartridge image: header, optional trainer, PRG ROM and CHR ROM
#[derive(Debug, Clone)]
pub struct Cartridge {
    header: Header,
    trainer: Option<Vec<u8>>,
    prg_rom: Vec<u8>,
    /// Empty when the board uses CHR RAM
    chr_rom: Vec<u8>,
}

impl Cartridge {
    /// Create a new cartridge by parsing iNES v1 file data
    pub fn new(data: &[u8]) -> Result<Self, Error> {
        let header = Header::parse(data)?;

        let trainer_size = if header.has_trainer() { TRAINER_SIZE } else { 0 };

        // Calculate ROM positions
        let prg_rom_start = HEADER_SIZE + trainer_size;
        let prg_rom_end = prg_rom_start + header.prg_size();
        let chr_rom_start = prg_rom_end;
        let chr_rom_end = chr_rom_start + header.chr_size();

        if data.len() < chr_rom_end {
            return Err(Error::TruncatedImage {
                expected: chr_rom_end,
                actual: data.len(),
            });
        }

        let trainer = header
            .has_trainer()
            .then(|| data[HEADER_SIZE..prg_rom_start].to_vec());
        let prg_rom = data[prg_rom_start..prg_rom_end].to_vec();
        let chr_rom = data[chr_rom_start..chr_rom_end].to_vec();

        debug!(
            "Loaded cartridge: {} PRG bytes, {} CHR bytes, mapper {}",
            prg_rom.len(),
            chr_rom.len(),
            header.mapper_id()
        );

        Ok(Self {
            header,
            trainer,
            prg_rom,
            chr_rom,
        })
    }

    /// Read an image from disk and parse it
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|e| Error::FileUnreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::new(&data)
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn mapper_id(&self) -> u8 {
        self.header.mapper_id()
    }

    pub fn trainer(&self) -> Option<&[u8]> {
        self.trainer.as_deref()
    }

    pub fn prg_rom(&self) -> &[u8] {
        &self.prg_rom
    }

    pub fn chr_rom(&self) -> &[u8] {
        &self.chr_rom
    }

    pub fn has_chr_ram(&self) -> bool {
        self.chr_rom.is_empty()
    }

    /// Create a cartridge directly from a PRG image (for testing)
    #[cfg(test)]
    pub fn from_prg(prg_rom: Vec<u8>) -> Self {
        let header = Header {
            prg_pages: (prg_rom.len() / 16384) as u8,
            chr_pages: 0,
            flags6: 0,
            flags7: 0,
            flags8: 0,
            flags9: 0,
            flags10: 0,
        };
        Self {
            header,
            trainer: None,
            prg_rom,
            chr_rom: Vec::new(),
        }
    }
}
