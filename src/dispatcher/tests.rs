use super::*;
use crate::sim_cart::SimCartridge;

fn setup_zeroed(words: usize) -> (Session, SimCartridge) {
    (Session::new(), SimCartridge::zeroed(words))
}

fn setup_erased(words: usize) -> (Session, SimCartridge) {
    (Session::new(), SimCartridge::erased(words))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_addr_latches_low_half() {
        let (mut session, mut cart) = setup_zeroed(0x100);
        session
            .dispatch(&mut cart, Opcode::SetBank, 0x05, 0)
            .unwrap();
        session
            .dispatch(&mut cart, Opcode::SetAddr, 0xBEEF, 0)
            .unwrap();
        assert_eq!(session.current_address(), 0x05BEEF);
    }

    #[test]
    fn test_set_bank_leaves_low_half() {
        let (mut session, mut cart) = setup_zeroed(0x100);
        session
            .dispatch(&mut cart, Opcode::SetAddr, 0x1234, 0)
            .unwrap();
        session
            .dispatch(&mut cart, Opcode::SetBank, 0x55, 0)
            .unwrap();
        assert_eq!(session.current_address(), 0x551234);
    }

    #[test]
    fn test_set_addr_idempotent() {
        let (mut session, mut cart) = setup_zeroed(0x100);
        session
            .dispatch(&mut cart, Opcode::SetAddr, 0x0042, 0)
            .unwrap();
        let once = session.current_address();
        session
            .dispatch(&mut cart, Opcode::SetAddr, 0x0042, 0)
            .unwrap();
        assert_eq!(session.current_address(), once);
    }

    #[test]
    fn test_bank_and_addr_compose() {
        let (mut session, mut cart) = setup_zeroed(0x100);
        session
            .dispatch(&mut cart, Opcode::SetBank, 0x01, 0)
            .unwrap();
        session
            .dispatch(&mut cart, Opcode::SetAddr, 0x2000, 0)
            .unwrap();
        assert_eq!(session.current_address(), 0x01_2000);
    }

    #[test]
    fn test_unknown_opcode_rejected() {
        let (mut session, mut cart) = setup_zeroed(0x100);
        session
            .dispatch(&mut cart, Opcode::SetAddr, 0x0040, 0)
            .unwrap();
        let before = session.current_address();

        let err = session.dispatch_raw(&mut cart, 7, 0x1111, 0x2222).unwrap_err();
        assert_eq!(err, DispatchError::UnsupportedOpcode { request: 7 });
        assert_eq!(session.current_address(), before);
    }

    #[test]
    fn test_rom_rd_returns_word_and_latches() {
        let mut session = Session::new();
        let mut cart = SimCartridge::from_words(vec![0x0000, 0xCAFE, 0x0000]);
        let reply = session
            .dispatch(&mut cart, Opcode::RomRd, 0x0001, 0)
            .unwrap();
        assert_eq!(reply, Reply::Data(0xCAFE));
        assert_eq!(session.current_address(), 0x0001);
    }

    #[test]
    fn test_write_lo_then_read_back() {
        let (mut session, mut cart) = setup_zeroed(0x100);
        session
            .dispatch(&mut cart, Opcode::WrLo, 0x0010, 0xAB)
            .unwrap();
        // An upper-lane write somewhere else must not disturb it.
        session
            .dispatch(&mut cart, Opcode::WrHi, 0x0020, 0xCD)
            .unwrap();
        let reply = session
            .dispatch(&mut cart, Opcode::RomRd, 0x0010, 0)
            .unwrap();
        assert_eq!(reply, Reply::Data(0x00AB));
    }

    #[test]
    fn test_write_hi_sets_upper_lane() {
        let (mut session, mut cart) = setup_zeroed(0x100);
        session
            .dispatch(&mut cart, Opcode::WrHi, 0x0030, 0xCD)
            .unwrap();
        assert_eq!(cart.word(0x30), Some(0xCD00));
        assert_eq!(session.current_address(), 0x0030);
    }

    #[test]
    fn test_flash_write_at_offset() {
        let (mut session, mut cart) = setup_erased(0x200);
        session
            .dispatch(&mut cart, Opcode::SetBank, 0x00, 0)
            .unwrap();
        session
            .dispatch(&mut cart, Opcode::SetAddr, 0x0100, 0)
            .unwrap();
        session
            .dispatch(&mut cart, Opcode::FlashWrAddrOff, 0x1234, 0x0004)
            .unwrap();
        let reply = session
            .dispatch(&mut cart, Opcode::RomRd, 0x0104, 0)
            .unwrap();
        assert_eq!(reply, Reply::Data(0x1234));
    }

    #[test]
    fn test_flash_offset_leaves_latch() {
        let (mut session, mut cart) = setup_erased(0x200);
        session
            .dispatch(&mut cart, Opcode::SetAddr, 0x0100, 0)
            .unwrap();
        session
            .dispatch(&mut cart, Opcode::FlashWrAddrOff, 0x00FF, 0x0004)
            .unwrap();
        assert_eq!(session.current_address(), 0x0100);
    }

    #[test]
    fn test_bank_operand_out_of_range() {
        let (mut session, mut cart) = setup_zeroed(0x100);
        let err = session
            .dispatch(&mut cart, Opcode::SetBank, 0x80, 0)
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::OperandOutOfRange { value: 0x80, .. }
        ));
        assert_eq!(session.current_address(), 0);
    }

    #[test]
    fn test_data_byte_out_of_range() {
        let (mut session, mut cart) = setup_zeroed(0x100);
        session
            .dispatch(&mut cart, Opcode::SetAddr, 0x0001, 0)
            .unwrap();
        let err = session
            .dispatch(&mut cart, Opcode::WrLo, 0x0010, 0x1AB)
            .unwrap_err();
        assert!(matches!(err, DispatchError::OperandOutOfRange { .. }));
        // Rejected before anything moved: latch and memory untouched.
        assert_eq!(session.current_address(), 0x0001);
        assert_eq!(cart.word(0x10), Some(0));
    }

    #[test]
    fn test_bus_fault_preserves_latch() {
        let (mut session, mut cart) = setup_zeroed(0x10);
        session
            .dispatch(&mut cart, Opcode::SetAddr, 0x0008, 0)
            .unwrap();
        let err = session
            .dispatch(&mut cart, Opcode::RomRd, 0x0020, 0)
            .unwrap_err();
        assert_eq!(err, DispatchError::Bus(BusError::AddressRange(0x20)));
        assert_eq!(session.current_address(), 0x0008);

        let err = session
            .dispatch(&mut cart, Opcode::WrLo, 0x0040, 0x7F)
            .unwrap_err();
        assert_eq!(err, DispatchError::Bus(BusError::AddressRange(0x40)));
        assert_eq!(session.current_address(), 0x0008);
    }

    #[test]
    fn test_flash_verify_failure_surfaces() {
        let (mut session, mut cart) = setup_zeroed(0x100);
        // Everything is already 0; programming 1-bits cannot stick.
        let err = session
            .dispatch(&mut cart, Opcode::FlashWrAddrOff, 0xFFFF, 0)
            .unwrap_err();
        assert_eq!(err, DispatchError::Bus(BusError::FlashVerify(0)));
    }

    #[test]
    fn test_sst_write_routes_to_sst_entry() {
        let (mut session, mut cart) = setup_erased(0x100);
        session
            .dispatch(&mut cart, Opcode::SstFlashWrAddrOff, 0x5678, 0x0002)
            .unwrap();
        assert_eq!(cart.sst_writes, 1);
        assert_eq!(cart.word(2), Some(0x5678));
    }

    #[test]
    fn test_rom_rd_latch_feeds_flash_offset() {
        let (mut session, mut cart) = setup_erased(0x100);
        // The read updates the latch, so a following offset write lands
        // relative to it.
        session
            .dispatch(&mut cart, Opcode::RomRd, 0x0040, 0)
            .unwrap();
        session
            .dispatch(&mut cart, Opcode::FlashWrAddrOff, 0x0F0F, 0x0001)
            .unwrap();
        assert_eq!(cart.word(0x41), Some(0x0F0F));
    }

    #[test]
    fn test_error_codes_stable() {
        assert_eq!(DispatchError::UnsupportedOpcode { request: 9 }.code(), 1);
        assert_eq!(
            DispatchError::OperandOutOfRange {
                opcode: Opcode::SetBank,
                field: "operand",
                value: 0x100,
                max: 0x7F,
            }
            .code(),
            2
        );
        assert_eq!(DispatchError::Bus(BusError::AddressRange(0)).code(), 3);
        assert_eq!(DispatchError::Bus(BusError::FlashVerify(0)).code(), 4);
    }
}
