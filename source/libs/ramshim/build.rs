// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

use std::{env, fs, path::PathBuf};

const DEFAULT_BASE: u64 = 0x2f00_0000;
const DEFAULT_SIZE: u64 = 0x0080_0000;

fn parse(name: &str, default: u64) -> u64 {
    println!("cargo:rerun-if-env-changed={name}");
    let Ok(raw) = env::var(name) else {
        return default;
    };
    let text = raw.trim().replace('_', "");
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse::<u64>(),
    };
    match parsed {
        Ok(value) => value,
        Err(err) => panic!("{name}={raw:?} is not a valid address: {err}"),
    }
}

fn main() {
    let base = parse("RAMSHIM_REGION_BASE", DEFAULT_BASE);
    let size = parse("RAMSHIM_REGION_SIZE", DEFAULT_SIZE);

    if size == 0 || !size.is_power_of_two() {
        panic!("RAMSHIM_REGION_SIZE=0x{size:x} must be a non-zero power of two");
    }
    if base & (size - 1) != 0 {
        panic!("RAMSHIM_REGION_BASE=0x{base:x} is not aligned to size 0x{size:x}");
    }
    if size > 1 << 31 || base + size > 1 << 32 {
        panic!("region 0x{base:x}+0x{size:x} exceeds the 32-bit address space");
    }

    let out = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR set by cargo"));
    let body = format!(
        "pub(crate) const DEFAULT_BASE: u32 = 0x{base:08x};\n\
         pub(crate) const DEFAULT_SIZE: u32 = 0x{size:08x};\n"
    );
    fs::write(out.join("region_defaults.rs"), body).expect("write region_defaults.rs");
}
