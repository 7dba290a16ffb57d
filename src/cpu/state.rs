use log::debug;

use crate::cartridge::Cartridge;
use crate::error::Error;

use super::flags::{FLAG_INTERRUPT, FLAG_UNUSED};

pub const RAM_SIZE: usize = 0x0800;
const PRG_BANK_SIZE: usize = 0x4000; // 16KB
pub const STACK_BASE: u16 = 0x0100;

/// Registers and address space of one emulation session
///
/// Memory map:
/// - $0000-$1FFF: 2KB internal RAM, mirrored every $0800
/// - $2000-$7FFF: not implemented, accesses fail with `UnmappedAddress`
/// - $8000-$FFFF: PRG ROM (a single 16KB bank is mirrored at $C000)
#[derive(Debug, Clone)]
pub struct CpuState {
    /// Accumulator
    pub a: u8,
    /// X register
    pub x: u8,
    /// Y register
    pub y: u8,
    /// Status register (processor flags)
    pub p: u8,
    /// Stack pointer
    pub sp: u8,
    /// Program counter
    pub pc: u16,
    /// Temporary address latch used by multi-cycle operand fetches
    pub latch: u16,
    ram: [u8; RAM_SIZE],
    prg_rom: Vec<u8>,
}

impl CpuState {
    /// Create a state with zeroed registers over the given PRG image
    pub fn new(prg_rom: Vec<u8>) -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            p: FLAG_INTERRUPT | FLAG_UNUSED,
            sp: 0xFD,
            pc: 0,
            latch: 0,
            ram: [0; RAM_SIZE],
            prg_rom,
        }
    }

    /// Copy the cartridge's PRG ROM into a fresh state
    pub fn from_cartridge(cartridge: &Cartridge) -> Self {
        Self::new(cartridge.prg_rom().to_vec())
    }

    /// Put registers back to their power-on values; RAM is cleared, PRG is kept
    pub fn reset(&mut self, pc: u16, p: u8, sp: u8) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.p = p;
        self.sp = sp;
        self.pc = pc;
        self.latch = 0;
        self.ram = [0; RAM_SIZE];
    }

    pub fn read(&self, addr: u16) -> Result<u8, Error> {
        match addr {
            0x0000..=0x1FFF => Ok(self.ram[addr as usize % RAM_SIZE]),
            0x8000..=0xFFFF => self.read_prg(addr),
            _ => Err(Error::UnmappedAddress(addr)),
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) -> Result<(), Error> {
        match addr {
            0x0000..=0x1FFF => {
                self.ram[addr as usize % RAM_SIZE] = value;
                Ok(())
            }
            0x8000..=0xFFFF => {
                // NROM has no registers; writes to ROM are dropped
                debug!("Ignoring write of ${:02X} to PRG ROM at ${:04X}", value, addr);
                Ok(())
            }
            _ => Err(Error::UnmappedAddress(addr)),
        }
    }

    /// Read a little-endian word
    pub fn read_u16(&self, addr: u16) -> Result<u16, Error> {
        let lo = self.read(addr)?;
        let hi = self.read(addr.wrapping_add(1))?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Copy bytes into memory starting at `addr` (test programs, trainers)
    pub fn load(&mut self, addr: u16, bytes: &[u8]) -> Result<(), Error> {
        for (offset, byte) in bytes.iter().enumerate() {
            self.write(addr.wrapping_add(offset as u16), *byte)?;
        }
        Ok(())
    }

    pub fn prg_rom(&self) -> &[u8] {
        &self.prg_rom
    }

    fn read_prg(&self, addr: u16) -> Result<u8, Error> {
        if self.prg_rom.is_empty() {
            return Err(Error::UnmappedAddress(addr));
        }
        let offset = (addr - 0x8000) as usize;
        let index = if self.prg_rom.len() == PRG_BANK_SIZE {
            offset % PRG_BANK_SIZE
        } else {
            offset % self.prg_rom.len()
        };
        Ok(self.prg_rom[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_registers() {
        let state = CpuState::new(vec![0; 0x4000]);
        assert_eq!(state.a, 0);
        assert_eq!(state.x, 0);
        assert_eq!(state.y, 0);
        assert_eq!(state.sp, 0xFD);
        assert_eq!(state.pc, 0);
    }

    #[test]
    fn test_ram_is_mirrored() {
        let mut state = CpuState::new(Vec::new());
        state.write(0x0010, 0x42).unwrap();
        assert_eq!(state.read(0x0010).unwrap(), 0x42);
        assert_eq!(state.read(0x0810).unwrap(), 0x42);
        assert_eq!(state.read(0x1010).unwrap(), 0x42);
        assert_eq!(state.read(0x1810).unwrap(), 0x42);
    }

    #[test]
    fn test_16kb_prg_mirrored_at_c000() {
        let mut prg = vec![0; 0x4000];
        prg[0x0000] = 0x4C;
        prg[0x3FFF] = 0x99;
        let state = CpuState::new(prg);
        assert_eq!(state.read(0x8000).unwrap(), 0x4C);
        assert_eq!(state.read(0xC000).unwrap(), 0x4C);
        assert_eq!(state.read(0xBFFF).unwrap(), 0x99);
        assert_eq!(state.read(0xFFFF).unwrap(), 0x99);
    }

    #[test]
    fn test_32kb_prg_direct_mapping() {
        let mut prg = vec![0; 0x8000];
        prg[0x0000] = 0xAA;
        prg[0x4000] = 0xBB;
        let state = CpuState::new(prg);
        assert_eq!(state.read(0x8000).unwrap(), 0xAA);
        assert_eq!(state.read(0xC000).unwrap(), 0xBB);
    }

    #[test]
    fn test_unimplemented_region_is_an_error() {
        let mut state = CpuState::new(vec![0; 0x4000]);
        assert_eq!(state.read(0x2002), Err(Error::UnmappedAddress(0x2002)));
        assert_eq!(state.read(0x6000), Err(Error::UnmappedAddress(0x6000)));
        assert_eq!(state.write(0x4016, 1), Err(Error::UnmappedAddress(0x4016)));
    }

    #[test]
    fn test_empty_prg_is_an_error() {
        let state = CpuState::new(Vec::new());
        assert_eq!(state.read(0xC000), Err(Error::UnmappedAddress(0xC000)));
    }

    #[test]
    fn test_prg_writes_are_ignored() {
        let mut state = CpuState::new(vec![0x11; 0x4000]);
        state.write(0x8000, 0x22).unwrap();
        assert_eq!(state.read(0x8000).unwrap(), 0x11);
    }

    #[test]
    fn test_read_u16_little_endian() {
        let mut state = CpuState::new(Vec::new());
        state.load(0x0200, &[0xCD, 0xAB]).unwrap();
        assert_eq!(state.read_u16(0x0200).unwrap(), 0xABCD);
    }

    #[test]
    fn test_reset_clears_ram_and_sets_registers() {
        let mut state = CpuState::new(vec![0; 0x4000]);
        state.x = 5;
        state.write(0x0000, 0xFF).unwrap();

        state.reset(0xC000, 0x24, 0xFD);

        assert_eq!(state.x, 0);
        assert_eq!(state.pc, 0xC000);
        assert_eq!(state.p, 0x24);
        assert_eq!(state.sp, 0xFD);
        assert_eq!(state.read(0x0000).unwrap(), 0);
    }

    #[test]
    fn test_from_cartridge_copies_prg() {
        let cartridge = Cartridge::from_prg(vec![0x4C; 0x4000]);
        let state = CpuState::from_cartridge(&cartridge);
        assert_eq!(state.prg_rom().len(), 0x4000);
        assert_eq!(state.read(0xC000).unwrap(), 0x4C);
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut first = CpuState::new(Vec::new());
        let second = CpuState::new(Vec::new());
        first.write(0x0010, 0x42).unwrap();
        first.x = 7;
        assert_eq!(second.read(0x0010).unwrap(), 0);
        assert_eq!(second.x, 0);
    }
}
