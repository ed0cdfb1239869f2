//! Compile command implementation
//!
//! Loads a source project document, compiles it and writes the binary
//! engine-data image.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;

use cueforge_project::{compile, SourceTree};

/// Run the compile command
///
/// # Arguments
/// * `input` - Path to the source project document (JSON)
/// * `output` - Path the binary image is written to
/// * `quiet` - Suppress the summary printed on success
///
/// # Returns
/// Exit code: 0 on success
pub fn run(input: &str, output: &str, quiet: bool) -> Result<ExitCode> {
    let json = std::fs::read_to_string(Path::new(input))
        .with_context(|| format!("failed to read project document: {}", input))?;
    let (tree, root) =
        SourceTree::from_json_str(&json).with_context(|| format!("failed to load {}", input))?;
    let image =
        compile(&tree, root).with_context(|| format!("failed to compile {}", input))?;
    cueforge_binary::write_image_to_path(&image, output)
        .with_context(|| format!("failed to write binary image: {}", output))?;

    if !quiet {
        println!("{} {} -> {}", "Compiled:".cyan().bold(), input, output);
        println!(
            "  {} mix buses, {} mix presets, {} wave banks ({} entries), {} sounds, {} events",
            image.mix_buses.len(),
            image.mix_presets.len(),
            image.wave_banks.len(),
            image.total_audio_data_entries(),
            image.sounds.len(),
            image.events.len()
        );
    }
    Ok(ExitCode::SUCCESS)
}
