//! Verify command implementation
//!
//! Decodes a binary image and reports whether it is well formed. A
//! malformed file is a normal outcome here, not a CLI failure, so it is
//! reported with exit code 1 instead of an error.

use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use cueforge_binary::read_image_from_path;

/// Run the verify command
///
/// # Arguments
/// * `input` - Path to the binary image
/// * `json_output` - Emit machine-readable JSON instead of colored text
///
/// # Returns
/// Exit code: 0 if the image decodes cleanly, 1 otherwise
pub fn run(input: &str, json_output: bool) -> Result<ExitCode> {
    match read_image_from_path(input) {
        Ok(image) => {
            if json_output {
                let report = json!({
                    "valid": true,
                    "mixBuses": image.mix_buses.len(),
                    "mixPresets": image.mix_presets.len(),
                    "waveBanks": image.wave_banks.len(),
                    "audioDataEntries": image.total_audio_data_entries(),
                    "sounds": image.sounds.len(),
                    "events": image.events.len(),
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{} {}", "OK:".green().bold(), input);
                println!(
                    "  {} mix buses, {} mix presets, {} wave banks, {} sounds, {} events",
                    image.mix_buses.len(),
                    image.mix_presets.len(),
                    image.wave_banks.len(),
                    image.sounds.len(),
                    image.events.len()
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            if json_output {
                let report = json!({
                    "valid": false,
                    "error": error.to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{} {}: {}", "INVALID:".red().bold(), input, error);
            }
            Ok(ExitCode::from(1))
        }
    }
}
