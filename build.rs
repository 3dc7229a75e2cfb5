use std::env;

const DEFAULTS: [(&str, &str); 4] = [
    ("BOOT_CPU_FREQ_HZ", "16000000"),
    ("BOOT_BAUD_RATE", "115200"),
    ("BOOT_TIMEOUT_MS", "1000"),
    ("BOOT_START", "0x7400"),
];

fn parse(name: &str, raw: &str) -> u32 {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    match parsed {
        Ok(value) => value,
        Err(_) => panic!("{} must be a number, got {:?}", name, raw),
    }
}

fn main() {
    // Build-time knobs, handed to config.rs as decimal strings
    for (name, default) in DEFAULTS {
        println!("cargo:rerun-if-env-changed={}", name);
        let raw = env::var(name).unwrap_or_else(|_| default.to_string());
        println!("cargo:rustc-env={}={}", name, parse(name, &raw));
    }

    let target = env::var("TARGET").unwrap_or_default();
    if target.contains("avr") {
        let boot_start = env::var("BOOT_START").unwrap_or_else(|_| "0x7400".to_string());
        let boot_start = parse("BOOT_START", &boot_start);

        // Firmware lives at the top of flash, everything below belongs to the application
        println!("cargo:rustc-link-arg-bins=-Wl,--section-start=.text={:#x}", boot_start);
        println!("cargo:warning=Bootloader placed at {:#06x}", boot_start);
    }
}
