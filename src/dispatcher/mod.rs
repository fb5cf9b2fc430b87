//! Opcode dispatch against the session address/bank latch.
//!
//! One [`Session`] per attached device. The latch is a single shared
//! register and every data opcode reads it, so operations must run strictly
//! in arrival order; dispatch takes `&mut self`, and transports that might
//! re-deliver wrap the session in [`crate::transport::SharedSession`].
//!
//! A call either completes and commits its state update, or fails leaving
//! the latch exactly where it was. For the opcodes that carry A1-A16 in the
//! operand, the bus operation runs against the prospective address first and
//! the latch moves only on success.

#[cfg(test)]
mod tests;

use thiserror::Error;

use crate::address::{AddressState, BankSelect, BANK_MAX};
use crate::bus::{BusError, CartridgeBus};
use crate::opcode::Opcode;

/// Successful dispatch result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Operation completed, nothing to return.
    Ack,
    /// One 16-bit word read from the cartridge.
    Data(u16),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    #[error("unsupported opcode 0x{request:02X}")]
    UnsupportedOpcode { request: u8 },
    #[error("{opcode}: {field} 0x{value:04X} exceeds 0x{max:04X}")]
    OperandOutOfRange {
        opcode: Opcode,
        field: &'static str,
        value: u16,
        max: u16,
    },
    #[error("bus fault: {0}")]
    Bus(#[from] BusError),
}

impl DispatchError {
    /// Stable wire status code; 0 is reserved for success.
    pub fn code(&self) -> u8 {
        match self {
            DispatchError::UnsupportedOpcode { .. } => 1,
            DispatchError::OperandOutOfRange { .. } => 2,
            DispatchError::Bus(BusError::AddressRange(_)) => 3,
            DispatchError::Bus(BusError::FlashVerify(_)) => 4,
        }
    }
}

/// One device session: the address/bank latch plus dispatch over it. State
/// lives for the session and is dropped with it; nothing persists.
#[derive(Debug, Default)]
pub struct Session {
    addr: AddressState,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    /// The currently latched word address.
    pub fn current_address(&self) -> u32 {
        self.addr.current_address()
    }

    /// Decode the raw request byte, then dispatch.
    pub fn dispatch_raw(
        &mut self,
        bus: &mut dyn CartridgeBus,
        request: u8,
        value: u16,
        index: u16,
    ) -> Result<Reply, DispatchError> {
        let opcode = match Opcode::decode(request) {
            Some(op) => op,
            None => {
                log::error!("unsupported opcode request 0x{:02X}", request);
                return Err(DispatchError::UnsupportedOpcode { request });
            }
        };
        self.dispatch(bus, opcode, value, index)
    }

    /// Run one operation. `operand` and `miscdata` are the transfer's value
    /// and index fields; their meaning depends on the opcode.
    pub fn dispatch(
        &mut self,
        bus: &mut dyn CartridgeBus,
        opcode: Opcode,
        operand: u16,
        miscdata: u16,
    ) -> Result<Reply, DispatchError> {
        log::trace!("{} oper={:04X} misc={:04X}", opcode, operand, miscdata);
        match opcode {
            Opcode::SetAddr => {
                self.addr.set_low(operand);
                Ok(Reply::Ack)
            }
            Opcode::SetBank => {
                let bank = BankSelect::new(operand).ok_or(DispatchError::OperandOutOfRange {
                    opcode,
                    field: "operand",
                    value: operand,
                    max: BANK_MAX,
                })?;
                self.addr.set_bank(bank);
                Ok(Reply::Ack)
            }
            Opcode::RomRd => {
                let word = bus.read_word(self.addr.compose_with_low(operand))?;
                self.addr.set_low(operand);
                Ok(Reply::Data(word))
            }
            Opcode::WrLo => {
                let data = byte_field(opcode, miscdata)?;
                bus.write_lower(self.addr.compose_with_low(operand), data)?;
                self.addr.set_low(operand);
                Ok(Reply::Ack)
            }
            Opcode::WrHi => {
                let data = byte_field(opcode, miscdata)?;
                bus.write_upper(self.addr.compose_with_low(operand), data)?;
                self.addr.set_low(operand);
                Ok(Reply::Ack)
            }
            Opcode::FlashWrAddrOff => {
                // Operand carries the data word; the offset rides in
                // miscdata and the latch stays put.
                bus.flash_write(self.addr.current_address() + u32::from(miscdata), operand)?;
                Ok(Reply::Ack)
            }
            Opcode::SstFlashWrAddrOff => {
                bus.sst_flash_write(self.addr.current_address() + u32::from(miscdata), operand)?;
                Ok(Reply::Ack)
            }
        }
    }
}

// Single-byte miscdata fields are rejected, never truncated.
fn byte_field(opcode: Opcode, value: u16) -> Result<u8, DispatchError> {
    if value > 0xFF {
        return Err(DispatchError::OperandOutOfRange {
            opcode,
            field: "miscdata",
            value,
            max: 0xFF,
        });
    }
    Ok(value as u8)
}
