//! Build script for marquee-firmware
//!
//! - Installs memory.x and the RP2040 link scripts
//! - Rejects an invalid panel.toml before it reaches the board

use std::env;
use std::fs;
use std::path::PathBuf;

use marquee_core::config::parse_config;

/// Inner width of the error box
const BOX_WIDTH: usize = 66;

fn main() {
    link();
    check_panel_config();
}

fn link() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("memory.x"), include_bytes!("memory.x")).unwrap();
    println!("cargo:rustc-link-search={}", out_dir.display());

    for arg in ["--nmagic", "-Tlink.x", "-Tlink-rp.x", "-Tdefmt.x"] {
        println!("cargo:rustc-link-arg-bins={}", arg);
    }

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Parse panel.toml twice: as full TOML for syntax errors with positions,
/// then with the firmware's own parser and validation
fn check_panel_config() {
    println!("cargo:rerun-if-changed=panel.toml");

    let text = match fs::read_to_string("panel.toml") {
        Ok(text) => text,
        Err(e) => fail(
            "panel.toml could not be read",
            &format!("{}\nCreate one in the marquee-firmware directory.", e),
        ),
    };

    if let Err(e) = toml::from_str::<toml::Value>(&text) {
        fail("Invalid TOML syntax in panel.toml", &e.to_string());
    }

    let config = match parse_config(&text) {
        Ok(config) => config,
        Err(e) => fail(
            "panel.toml uses unsupported syntax or keys",
            &format!(
                "{:?}\nOne string array per line, known sections and keys only.",
                e
            ),
        ),
    };

    if let Err(e) = config.validate() {
        fail("Invalid configuration in panel.toml", &e.to_string());
    }

    println!(
        "cargo:warning=panel.toml OK: {} messages on a {}x{} display",
        config.messages.len(),
        config.display.columns,
        config.display.rows
    );
}

/// Abort the build with `detail` framed under `title`
fn fail(title: &str, detail: &str) -> ! {
    let rule = "═".repeat(BOX_WIDTH);
    let mut out = format!("\n╔{rule}╗\n{}\n╠{rule}╣\n", boxed(&format!("ERROR: {}", title)));
    for line in detail.lines() {
        out.push_str(&boxed(line));
        out.push('\n');
    }
    out.push_str(&format!("╚{rule}╝\n"));
    panic!("{}", out);
}

/// One line of the box, clipped on a character boundary
fn boxed(line: &str) -> String {
    let width = BOX_WIDTH - 4;
    let text: String = if line.chars().count() > width {
        line.chars().take(width - 3).chain("...".chars()).collect()
    } else {
        line.to_string()
    };
    format!("║  {:<width$}  ║", text, width = width)
}
