use std::fmt;

use crate::error::Error;

pub const HEADER_SIZE: usize = 16;
pub const MAGIC: &[u8; 4] = b"NES\x1A";

// Mirroring types for nametables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirroringMode {
    Vertical,
    Horizontal,
    FourScreen,
}

/// TV system declared in flags 10 (bits 0-1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TvSystem {
    Ntsc,
    Pal,
    Dual,
}

/// The 16-byte iNES header
///
/// Layout:
/// - 0-3: "NES" followed by MS-DOS end-of-file (0x1A)
/// - 4: PRG ROM size in 16 KB units
/// - 5: CHR ROM size in 8 KB units (0 means the board uses CHR RAM)
/// - 6: mirroring, battery, trainer, four-screen, mapper low nibble
/// - 7: VS Unisystem, PlayChoice-10, NES 2.0 marker, mapper high nibble
/// - 8: PRG RAM size
/// - 9: TV system
/// - 10: TV system, PRG RAM presence, bus conflicts
/// - 11-15: padding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub prg_pages: u8,
    pub chr_pages: u8,
    pub flags6: u8,
    pub flags7: u8,
    pub flags8: u8,
    pub flags9: u8,
    pub flags10: u8,
}

impl Header {
    /// Parse the header from the start of an image
    pub fn parse(data: &[u8]) -> Result<Self, Error> {
        if data.len() < MAGIC.len() || &data[0..4] != MAGIC {
            return Err(Error::InvalidMagicNumber);
        }
        if data.len() < HEADER_SIZE {
            return Err(Error::TruncatedImage {
                expected: HEADER_SIZE,
                actual: data.len(),
            });
        }

        Ok(Self {
            prg_pages: data[4],
            chr_pages: data[5],
            flags6: data[6],
            flags7: data[7],
            flags8: data[8],
            flags9: data[9],
            flags10: data[10],
        })
    }

    /// Bit 0 of flags 6: 0 = horizontal, 1 = vertical
    pub fn vertical_mirroring(&self) -> bool {
        self.flags6 & 0x01 != 0
    }

    pub fn battery_backed_prg(&self) -> bool {
        self.flags6 & 0x02 != 0
    }

    pub fn has_trainer(&self) -> bool {
        self.flags6 & 0x04 != 0
    }

    /// Bit 3 of flags 6: ignore mirroring control, provide four-screen VRAM
    pub fn ignore_mirroring(&self) -> bool {
        self.flags6 & 0x08 != 0
    }

    pub fn mirroring(&self) -> MirroringMode {
        if self.ignore_mirroring() {
            MirroringMode::FourScreen
        } else if self.vertical_mirroring() {
            MirroringMode::Vertical
        } else {
            MirroringMode::Horizontal
        }
    }

    pub fn mapper_low(&self) -> u8 {
        self.flags6 >> 4
    }

    pub fn mapper_high(&self) -> u8 {
        self.flags7 >> 4
    }

    /// Mapper number: low nibble from flags 6, high nibble from flags 7
    pub fn mapper_id(&self) -> u8 {
        self.mapper_low() | (self.mapper_high() << 4)
    }

    pub fn vs_unisystem(&self) -> bool {
        self.flags7 & 0x01 != 0
    }

    pub fn playchoice_10(&self) -> bool {
        self.flags7 & 0x02 != 0
    }

    /// Bits 2-3 of flags 7 equal to 2 mark an NES 2.0 header
    pub fn is_nes2(&self) -> bool {
        (self.flags7 >> 2) & 0x03 == 0x02
    }

    pub fn prg_ram_size(&self) -> u8 {
        self.flags8
    }

    /// Bit 0 of flags 9: 0 = NTSC, 1 = PAL
    pub fn pal(&self) -> bool {
        self.flags9 & 0x01 != 0
    }

    pub fn tv_system(&self) -> TvSystem {
        match self.flags10 & 0x03 {
            0 => TvSystem::Ntsc,
            2 => TvSystem::Pal,
            _ => TvSystem::Dual,
        }
    }

    /// Bit 4 of flags 10 set means there is no PRG RAM at $6000-$7FFF
    pub fn has_prg_ram(&self) -> bool {
        self.flags10 & 0x10 == 0
    }

    pub fn has_bus_conflicts(&self) -> bool {
        self.flags10 & 0x20 != 0
    }

    pub fn prg_size(&self) -> usize {
        self.prg_pages as usize * 16384
    }

    pub fn chr_size(&self) -> usize {
        self.chr_pages as usize * 8192
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "True" } else { "False" }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let tv_system = match self.tv_system() {
            TvSystem::Ntsc => "NTSC",
            TvSystem::Pal => "PAL",
            TvSystem::Dual => "Dual Compatible",
        };
        let mirroring = match self.mirroring() {
            MirroringMode::Vertical => "Vertical",
            MirroringMode::Horizontal => "Horizontal",
            MirroringMode::FourScreen => "Four-screen VRAM",
        };

        // Parsing rejects any other magic, so the constant is what the image holds
        writeln!(f, "Magic                          : {}", MAGIC.escape_ascii())?;
        writeln!(f, "Page count (PRG)               : {}", self.prg_pages)?;
        writeln!(f, "Page count (CHR)               : {}", self.chr_pages)?;
        writeln!(f, "Flag 6 (Nametable Mirror Mode) : {}", mirroring)?;
        writeln!(f, "Flag 6 (Battery Backed PRG)    : {}", yes_no(self.battery_backed_prg()))?;
        writeln!(f, "Flag 6 (Has Trainer Data)      : {}", yes_no(self.has_trainer()))?;
        writeln!(f, "Flag 6 (Ignore Mirror Control) : {}", yes_no(self.ignore_mirroring()))?;
        writeln!(f, "Flag 6 (Mapper Number Lower)   : {}", self.mapper_low())?;
        writeln!(f, "Flag 7 (VS Unisystem)          : {}", yes_no(self.vs_unisystem()))?;
        writeln!(f, "Flag 7 (Playchoice 10)         : {}", yes_no(self.playchoice_10()))?;
        writeln!(f, "Flag 7 (NES 2.0)               : {}", yes_no(self.is_nes2()))?;
        writeln!(f, "Flag 7 (Mapper Number Higher)  : {}", self.mapper_high())?;
        writeln!(f, "Mapper ID                      : {}", self.mapper_id())?;
        writeln!(f, "Flag 8 (PRG RAM Size)          : {}", self.prg_ram_size())?;
        writeln!(f, "Flag 9 (TV System)             : {}", if self.pal() { "PAL" } else { "NTSC" })?;
        writeln!(f, "Flag 10 (TV System)            : {}", tv_system)?;
        writeln!(f, "Flag 10 (PRG RAM)              : {}", yes_no(self.has_prg_ram()))?;
        write!(
            f,
            "Flag 10 (Bus Conflict)         : {}",
            if self.has_bus_conflicts() { "Has Conflict" } else { "No Conflict" }
        )
    }
}
