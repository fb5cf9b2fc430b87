//! In-memory cartridge used by the test suites and the dump harness.
//!
//! Reads and lane writes behave like RAM. Flash programming behaves like a
//! NOR part: a program cycle can only clear bits, and the result is read
//! back and verified, so attempting to set a 0 bit back to 1 reports a
//! verify fault just as real hardware would.

use crate::bus::{BusError, CartridgeBus};
use crate::debug_flags;

pub struct SimCartridge {
    words: Vec<u16>,
    /// Writes routed through the SST entry point, observable from tests.
    pub sst_writes: u32,
}

impl SimCartridge {
    /// Erased flash image: every word 0xFFFF, ready to program.
    pub fn erased(words: usize) -> Self {
        SimCartridge {
            words: vec![0xFFFF; words],
            sst_writes: 0,
        }
    }

    /// RAM-like image of zeroes.
    pub fn zeroed(words: usize) -> Self {
        SimCartridge {
            words: vec![0; words],
            sst_writes: 0,
        }
    }

    pub fn from_words(words: Vec<u16>) -> Self {
        SimCartridge {
            words,
            sst_writes: 0,
        }
    }

    /// Build from a raw byte image, big-endian pairs as a Genesis ROM dump
    /// lays them out. An odd trailing byte pads with 0xFF.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut words = Vec::with_capacity(bytes.len().div_ceil(2));
        for pair in bytes.chunks(2) {
            let hi = pair[0];
            let lo = pair.get(1).copied().unwrap_or(0xFF);
            words.push(u16::from_be_bytes([hi, lo]));
        }
        SimCartridge::from_words(words)
    }

    pub fn len_words(&self) -> usize {
        self.words.len()
    }

    /// Direct peek for assertions; goes around the bus entirely.
    pub fn word(&self, addr: u32) -> Option<u16> {
        self.words.get(addr as usize).copied()
    }

    fn slot(&mut self, addr: u32) -> Result<&mut u16, BusError> {
        self.words
            .get_mut(addr as usize)
            .ok_or(BusError::AddressRange(addr))
    }
}

impl CartridgeBus for SimCartridge {
    fn read_word(&mut self, addr: u32) -> Result<u16, BusError> {
        let word = *self.slot(addr)?;
        if debug_flags::bus() {
            println!("bus: rd {:06X} -> {:04X}", addr, word);
        }
        Ok(word)
    }

    fn write_lower(&mut self, addr: u32, data: u8) -> Result<(), BusError> {
        let slot = self.slot(addr)?;
        *slot = (*slot & 0xFF00) | u16::from(data);
        if debug_flags::bus() {
            println!("bus: wr lo {:06X} <- {:02X}", addr, data);
        }
        Ok(())
    }

    fn write_upper(&mut self, addr: u32, data: u8) -> Result<(), BusError> {
        let slot = self.slot(addr)?;
        *slot = (*slot & 0x00FF) | (u16::from(data) << 8);
        if debug_flags::bus() {
            println!("bus: wr hi {:06X} <- {:02X}", addr, data);
        }
        Ok(())
    }

    fn flash_write(&mut self, addr: u32, word: u16) -> Result<(), BusError> {
        let slot = self.slot(addr)?;
        // Program pulls bits low only; verify catches the rest.
        let programmed = *slot & word;
        *slot = programmed;
        if debug_flags::bus() {
            println!("bus: flash {:06X} <- {:04X} (now {:04X})", addr, word, programmed);
        }
        if programmed != word {
            return Err(BusError::FlashVerify(addr));
        }
        Ok(())
    }

    fn sst_flash_write(&mut self, addr: u32, word: u16) -> Result<(), BusError> {
        self.sst_writes += 1;
        self.flash_write(addr, word)
    }
}
