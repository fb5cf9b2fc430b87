//! Opcode dictionary for the Genesis/Megadrive cartridge interface.
//!
//! The opcode rides in the request byte of a USB control transfer; the
//! transfer's 16-bit value and index fields carry the operand and miscdata.
//! Decoding is strict: a request byte outside the dictionary is an error,
//! never a no-op.

use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// Active-low cartridge control lines. A set bit means the firmware
    /// pulls that line low for the duration of the operation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ControlLines: u8 {
        const CE = 0b000001;
        const OE = 0b000010;
        const LDSW = 0b000100;
        const UDSW = 0b001000;
        const LO_MEM = 0b010000;
        const TIME = 0b100000;
    }
}

/// One bus operation class. Discriminants are the wire request values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    /// oper = A1-A16: latch the low half of the target address.
    SetAddr = 0,
    /// oper = A1-A16 (latch updated), CE and OE low: read one 16-bit word.
    RomRd = 1,
    /// oper = A17-A23: latch the bank half. LO_MEM and TIME stay fixed high.
    SetBank = 2,
    /// miscdata = D0-7, oper = A1-A16 (latch updated), CE/OE/LDSW low:
    /// write the lower byte.
    WrLo = 3,
    /// miscdata = D8-15, oper = A1-A16 (latch updated), CE/OE/UDSW low:
    /// write the upper byte.
    WrHi = 4,
    /// oper = D0-D15, miscdata = address offset from the latch, CE/OE/UDSW
    /// low: program one word into flash.
    FlashWrAddrOff = 5,
    /// SST-family variant of [`Opcode::FlashWrAddrOff`]; command sequencing
    /// for those parts belongs to the bus driver.
    SstFlashWrAddrOff = 6,
}

impl Opcode {
    /// Decode the raw request byte. `None` for anything outside the
    /// dictionary; the dispatcher turns that into an error reply.
    pub fn decode(raw: u8) -> Option<Opcode> {
        match raw {
            0 => Some(Opcode::SetAddr),
            1 => Some(Opcode::RomRd),
            2 => Some(Opcode::SetBank),
            3 => Some(Opcode::WrLo),
            4 => Some(Opcode::WrHi),
            5 => Some(Opcode::FlashWrAddrOff),
            6 => Some(Opcode::SstFlashWrAddrOff),
            _ => None,
        }
    }

    /// The raw wire value carried in the transfer's request field.
    pub fn request(self) -> u8 {
        self as u8
    }

    /// Control lines the firmware asserts (pulls low) for this operation.
    /// The address-setting opcodes touch no lines at all.
    pub fn asserted_lines(self) -> ControlLines {
        match self {
            Opcode::SetAddr | Opcode::SetBank => ControlLines::empty(),
            Opcode::RomRd => ControlLines::CE | ControlLines::OE,
            Opcode::WrLo => ControlLines::CE | ControlLines::OE | ControlLines::LDSW,
            Opcode::WrHi | Opcode::FlashWrAddrOff | Opcode::SstFlashWrAddrOff => {
                ControlLines::CE | ControlLines::OE | ControlLines::UDSW
            }
        }
    }

    /// Dictionary name, as shared with the firmware side.
    pub fn name(self) -> &'static str {
        match self {
            Opcode::SetAddr => "GEN_SET_ADDR",
            Opcode::RomRd => "GEN_ROM_RD",
            Opcode::SetBank => "GEN_SET_BANK",
            Opcode::WrLo => "GEN_WR_LO",
            Opcode::WrHi => "GEN_WR_HI",
            Opcode::FlashWrAddrOff => "GEN_FLASH_WR_ADDROFF",
            Opcode::SstFlashWrAddrOff => "GEN_SST_FLASH_WR_ADDROFF",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
