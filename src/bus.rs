//! Trait representing the bus driver that performs the physical cartridge
//! access. The pin-level bit-banging lives on the firmware side of this
//! seam; the dispatcher only hands over composed word addresses and data.

use thiserror::Error;

/// Faults a bus driver can report. Address/bank state is never touched by a
/// faulted call, so the host can correct and retry.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    #[error("address 0x{0:06X} outside the mapped image")]
    AddressRange(u32),
    #[error("flash write at 0x{0:06X} did not verify")]
    FlashVerify(u32),
}

pub trait CartridgeBus {
    /// Read one 16-bit word. CE and OE are held low.
    fn read_word(&mut self, addr: u32) -> Result<u16, BusError>;

    /// Write the lower byte (D0-7). CE, OE and LDSW are held low.
    fn write_lower(&mut self, addr: u32, data: u8) -> Result<(), BusError>;

    /// Write the upper byte (D8-15). CE, OE and UDSW are held low.
    fn write_upper(&mut self, addr: u32, data: u8) -> Result<(), BusError>;

    /// Program one word into flash and verify it stuck.
    fn flash_write(&mut self, addr: u32, word: u16) -> Result<(), BusError>;

    /// Program entry for SST-family flash parts, which need their own
    /// command preamble. Drivers without vendor sequencing fall through to
    /// the plain flash write.
    fn sst_flash_write(&mut self, addr: u32, word: u16) -> Result<(), BusError> {
        self.flash_write(addr, word)
    }
}
