//! Build script for headset-fw
//!
//! - Sets up linker search paths for memory.x
//! - Validates headset.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate headset.toml configuration at compile time
fn validate_config() {
    // Re-run if headset.toml changes
    println!("cargo:rerun-if-changed=headset.toml");

    let config_path = Path::new("headset.toml");
    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: headset.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds a headset.toml configuration file.          ║\n\
            ║  Please create one in the headset-fw directory.                  ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = fs::read_to_string(config_path).expect("failed to read headset.toml");

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in headset.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_radio(&config, &mut errors);
    validate_display(&config, &mut errors);
    validate_pages(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid headset configuration                            ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=headset.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn validate_radio(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(radio) = config.get("radio") else {
        errors.push("Missing [radio] section".to_string());
        return;
    };

    match radio.get("frequency_khz") {
        Some(toml::Value::Integer(f)) => {
            // RFM69HCW tuning range (868/915 MHz variant)
            if *f < 850_000 || *f > 1_020_000 {
                errors.push(format!("[radio] frequency_khz {} outside 850000-1020000", f));
            }
        }
        Some(_) => errors.push("[radio] frequency_khz must be an integer".to_string()),
        None => errors.push("[radio] missing 'frequency_khz'".to_string()),
    }

    match radio.get("encryption_key") {
        Some(toml::Value::String(key)) => {
            if key.len() != 32 || !key.chars().all(|c| c.is_ascii_hexdigit()) {
                errors.push("[radio] encryption_key must be 32 hex digits".to_string());
            }
        }
        Some(_) => errors.push("[radio] encryption_key must be a string".to_string()),
        None => errors.push("[radio] missing 'encryption_key'".to_string()),
    }
}

fn validate_display(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(display) = config.get("display") else {
        errors.push("Missing [display] section".to_string());
        return;
    };

    if display.get("default_page").is_none() {
        errors.push("[display] missing 'default_page'".to_string());
    }
}

fn validate_pages(config: &toml::Value, errors: &mut Vec<String>) {
    let pages = match config.get("page") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[page.*] sections malformed".to_string());
            return;
        }
        None => {
            errors.push("Missing [page.*] sections - at least one page is required".to_string());
            return;
        }
    };

    let default_page = config
        .get("display")
        .and_then(|d| d.get("default_page"))
        .and_then(|v| v.as_integer());

    for (name, page) in pages {
        if name.parse::<u16>().map(|n| n == 0).unwrap_or(true) {
            errors.push(format!("[page.{}] page numbers are positive integers", name));
        }

        let page = match page {
            toml::Value::Table(t) => t,
            _ => {
                errors.push(format!("[page.{}] must be a table", name));
                continue;
            }
        };

        if page.get("title").and_then(|t| t.as_str()).is_none() {
            errors.push(format!("[page.{}] missing 'title'", name));
        }

        match page.get("items") {
            Some(toml::Value::Array(items)) => {
                if items.len() != 8 {
                    errors.push(format!(
                        "[page.{}] needs exactly 8 items, found {}",
                        name,
                        items.len()
                    ));
                }
                if !items.iter().all(|i| i.is_str()) {
                    errors.push(format!("[page.{}] items must all be strings", name));
                }
            }
            Some(_) => errors.push(format!("[page.{}] items must be an array", name)),
            None => errors.push(format!("[page.{}] missing 'items'", name)),
        }
    }

    // the startup page must exist in the catalog
    if let Some(n) = default_page {
        if !pages.contains_key(&n.to_string()) {
            errors.push(format!("[display] default_page {} has no [page.{}]", n, n));
        }
    }
}
