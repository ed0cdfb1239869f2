//! Inspect command implementation
//!
//! Decodes a binary image and prints a chunk-by-chunk summary.

use std::process::ExitCode;

use anyhow::{Context, Result};

use cueforge_binary::{dump, read_image_from_path};

/// Run the inspect command; the image is fully validated while decoding,
/// so a dump is only ever produced for a well-formed file.
pub fn run(input: &str) -> Result<ExitCode> {
    let image = read_image_from_path(input)
        .with_context(|| format!("failed to read binary image: {}", input))?;
    dump(&image, |line| println!("{}", line));
    Ok(ExitCode::SUCCESS)
}
