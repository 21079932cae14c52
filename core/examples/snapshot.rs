//! Example: Capture open ports once and print every column.
//!
//! Usage:
//!   cargo run --example snapshot                 # Run lsof
//!   cargo run --example snapshot < capture.txt   # Parse a saved `lsof -F` capture

use std::io::{IsTerminal, Read};

use pvw_core::{derive, CaptureSource, Column, FilterSettings, LsofCapture, ProcDirectoryLookup};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let raw = if std::io::stdin().is_terminal() {
        match LsofCapture::new().capture().await {
            Ok(raw) => raw,
            Err(e) => {
                eprintln!("Error capturing ports: {}", e);
                return;
            }
        }
    } else {
        let mut raw = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut raw) {
            eprintln!("Error reading capture: {}", e);
            return;
        }
        raw
    };

    let settings = FilterSettings::new().with_columns(Column::ALL);
    let derivation = match derive(&raw, &settings, &ProcDirectoryLookup::new()) {
        Ok(derivation) => derivation,
        Err(e) => {
            eprintln!("Error parsing capture: {}", e);
            return;
        }
    };

    if derivation.table.is_empty() {
        println!("No open ports found.");
        return;
    }

    let header: Vec<String> = settings
        .columns
        .iter()
        .map(|c| format!("{:<w$}", c.title(), w = c.width() as usize))
        .collect();
    println!("{}", header.join(" "));

    for row in &derivation.table.rows {
        let cells: Vec<String> = row
            .iter()
            .zip(&settings.columns)
            .map(|(cell, c)| format!("{:<w$}", cell, w = c.width() as usize))
            .collect();
        println!("{}", cells.join(" "));
    }

    println!(
        "\nTotal: {} connections across {} processes",
        derivation.connection_count(),
        derivation.processes.len()
    );
}
