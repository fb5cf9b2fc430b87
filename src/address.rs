//! Session address/bank register.
//!
//! The cartridge bus is word-wide, so the target is a 23-line word address:
//! A1-A16 latched as the low half, A17-A23 latched separately as the bank.
//! Composed addresses place A1-A16 in bits 0-15 and A17-A23 in bits 16-22.
//! The byte lane (upper/lower) is selected by the opcode, not the address.

/// Highest bank operand: seven address lines, A17 through A23.
pub const BANK_MAX: u16 = 0x7F;

/// Validated bank half of the address register. Only A17-A23 are
/// caller-settable; the LO_MEM and TIME lines stay fixed deasserted, exactly
/// as the firmware leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankSelect(u8);

impl BankSelect {
    /// Validate a raw bank operand. `None` once any bit above A23 is set.
    pub fn new(operand: u16) -> Option<BankSelect> {
        if operand <= BANK_MAX {
            Some(BankSelect(operand as u8))
        } else {
            None
        }
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

/// The latch a device session carries between operations. Created zeroed,
/// mutated only by dispatched opcodes, never reset mid-session.
#[derive(Debug, Default, Clone, Copy)]
pub struct AddressState {
    low: u16, // A1-A16
    bank: u8, // A17-A23
}

impl AddressState {
    pub fn new() -> Self {
        AddressState::default()
    }

    /// Store A1-A16. Always succeeds.
    pub fn set_low(&mut self, bits: u16) {
        self.low = bits;
    }

    /// Store the validated bank half. Always succeeds.
    pub fn set_bank(&mut self, bank: BankSelect) {
        self.bank = bank.bits();
    }

    pub fn low(&self) -> u16 {
        self.low
    }

    pub fn bank(&self) -> u8 {
        self.bank
    }

    /// The currently latched word address. Pure read.
    pub fn current_address(&self) -> u32 {
        self.compose_with_low(self.low)
    }

    /// The address that would result from latching `low`, without latching
    /// it. The dispatcher uses this to run the bus operation first and
    /// commit the latch only on success.
    pub fn compose_with_low(&self, low: u16) -> u32 {
        (u32::from(self.bank) << 16) | u32::from(low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_half_independent_of_bank() {
        let mut addr = AddressState::new();
        addr.set_bank(BankSelect::new(0x55).unwrap());
        addr.set_low(0xBEEF);
        assert_eq!(addr.current_address(), 0x55BEEF);
        addr.set_low(0x0001);
        assert_eq!(addr.bank(), 0x55);
        assert_eq!(addr.current_address(), 0x550001);
    }

    #[test]
    fn test_bank_half_independent_of_low() {
        let mut addr = AddressState::new();
        addr.set_low(0x1234);
        addr.set_bank(BankSelect::new(0x7F).unwrap());
        assert_eq!(addr.low(), 0x1234);
        assert_eq!(addr.current_address(), 0x7F1234);
    }

    #[test]
    fn test_bank_select_range() {
        assert!(BankSelect::new(0x7F).is_some());
        assert!(BankSelect::new(0x80).is_none());
        assert!(BankSelect::new(0xFFFF).is_none());
    }

    #[test]
    fn test_compose_without_latching() {
        let mut addr = AddressState::new();
        addr.set_bank(BankSelect::new(0x01).unwrap());
        addr.set_low(0x2000);
        assert_eq!(addr.compose_with_low(0x4000), 0x014000);
        // Nothing moved.
        assert_eq!(addr.current_address(), 0x012000);
    }
}
