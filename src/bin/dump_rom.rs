use std::path::PathBuf;
use std::process;

use genesis_cart_io::debug_flags;
use genesis_cart_io::dispatcher::{Reply, Session};
use genesis_cart_io::opcode::Opcode;
use genesis_cart_io::sim_cart::SimCartridge;

// Headless dump harness over the simulated cartridge.
// Usage:
//   cargo run --bin dump_rom -- [image.bin] --start 0x0000 --len 0x80 [--nonzero]
// Dumps the requested word window by issuing the real opcode sequence
// (GEN_SET_BANK on bank crossings, GEN_ROM_RD per word) through a session.
// Without an image path a counting test pattern is generated.
// DEBUG_DISPATCH=1 echoes every issued operation.

fn parse_u32_hex_or_dec(s: &str) -> Option<u32> {
    let s = s.trim();
    if let Some(stripped) = s.strip_prefix("0x") {
        u32::from_str_radix(stripped, 16).ok()
    } else {
        s.parse::<u32>().ok()
    }
}

fn parse_args() -> (Option<PathBuf>, u32, u32, bool) {
    let mut image: Option<PathBuf> = None;
    let mut start: Option<u32> = None;
    let mut len: Option<u32> = None;
    let mut nonzero_only = false;

    let mut args = std::env::args().skip(1);
    while let Some(a) = args.next() {
        match a.as_str() {
            "--start" => {
                if let Some(v) = args.next() {
                    start = parse_u32_hex_or_dec(&v);
                }
            }
            "--len" | "--length" => {
                if let Some(v) = args.next() {
                    len = parse_u32_hex_or_dec(&v);
                }
            }
            "--nonzero" | "--nz" => {
                nonzero_only = true;
            }
            "--help" | "-h" => {
                eprintln!("Usage: dump_rom [image.bin] [--start N] [--len N] [--nonzero]");
                process::exit(0);
            }
            s if s.starts_with('-') => {
                eprintln!("Unknown option: {}", s);
                process::exit(2);
            }
            s => {
                image = Some(PathBuf::from(s));
            }
        }
    }

    (image, start.unwrap_or(0), len.unwrap_or(0x80), nonzero_only)
}

fn main() {
    env_logger::init();
    let (image, start, len, nonzero_only) = parse_args();
    let quiet = debug_flags::quiet();

    let mut cart = match &image {
        Some(path) => match std::fs::read(path) {
            Ok(bytes) => SimCartridge::from_bytes(&bytes),
            Err(e) => {
                eprintln!("Failed to read {}: {}", path.display(), e);
                process::exit(1);
            }
        },
        None => {
            // Counting pattern, just enough words to cover the window.
            let words = (start + len) as usize;
            SimCartridge::from_words((0..words).map(|i| i as u16).collect())
        }
    };

    if !quiet {
        println!(
            "image: {} words, dumping 0x{:06X}..0x{:06X}",
            cart.len_words(),
            start,
            start + len
        );
    }

    let mut session = Session::new();
    let mut current_bank = None;
    let mut words = Vec::with_capacity(len as usize);

    for addr in start..start + len {
        let bank = (addr >> 16) as u16;
        if current_bank != Some(bank) {
            if let Err(e) = session.dispatch(&mut cart, Opcode::SetBank, bank, 0) {
                eprintln!("bank select failed at 0x{:06X}: {}", addr, e);
                process::exit(1);
            }
            current_bank = Some(bank);
        }

        let low = addr as u16;
        match session.dispatch(&mut cart, Opcode::RomRd, low, 0) {
            Ok(Reply::Data(word)) => {
                if debug_flags::dispatch() {
                    println!("{} {:04X} -> {:04X}", Opcode::RomRd, low, word);
                }
                words.push(word);
            }
            Ok(reply) => {
                eprintln!("unexpected reply at 0x{:06X}: {:?}", addr, reply);
                process::exit(1);
            }
            Err(e) => {
                eprintln!("read failed at 0x{:06X}: {}", addr, e);
                process::exit(1);
            }
        }
    }

    for (row_idx, row) in words.chunks(8).enumerate() {
        if nonzero_only && row.iter().all(|&w| w == 0) {
            continue;
        }
        let row_addr = start + (row_idx as u32) * 8;
        let cells: Vec<String> = row.iter().map(|w| format!("{:04X}", w)).collect();
        println!("{:06X}: {}", row_addr, cells.join(" "));
    }
}
