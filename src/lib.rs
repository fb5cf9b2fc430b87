//! Protocol core for a Genesis/Megadrive cartridge dumper-programmer.
//!
//! Every cartridge bus operation travels as one USB control transfer: the
//! request byte selects an opcode from the dictionary in [`opcode`], and the
//! 16-bit value/index fields carry its operand and miscdata. A [`Session`]
//! holds the address/bank latch for one attached device and dispatches each
//! triple against a [`CartridgeBus`] implementation.

pub mod address;
pub mod bus;
pub mod debug_flags;
pub mod dispatcher;
pub mod opcode;
pub mod sim_cart;
pub mod transport;

pub use bus::{BusError, CartridgeBus};
pub use dispatcher::{DispatchError, Reply, Session};
pub use opcode::{ControlLines, Opcode};
