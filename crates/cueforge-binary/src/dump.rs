//! Human-readable image listing.
//!
//! The dump goes through a line-oriented sink callback so callers decide
//! where diagnostics end up (stdout, a log file, a test buffer, or
//! [`silent_sink`] for none at all).

use crate::image::{ProjectImage, FILE_IDENTIFIER};

/// A no-op diagnostic sink.
pub fn silent_sink(_line: &str) {}

/// Emits the full image, one line per sink call: file identifier, then
/// each chunk's summary and per-entry detail.
pub fn dump<F: FnMut(&str)>(image: &ProjectImage, mut sink: F) {
    let id_bytes: Vec<String> = FILE_IDENTIFIER
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect();
    sink(&format!("engine data binary (file ID: {})", id_bytes.join(" ")));

    sink(&format!(
        "  mix bus chunk ({} mix buses):",
        image.mix_buses.len()
    ));
    for bus in &image.mix_buses {
        let subs: Vec<String> = bus
            .sub_bus_indices
            .iter()
            .map(|i| i.to_string())
            .collect();
        if subs.is_empty() {
            sink(&format!("    {} (no sub buses)", bus.id));
        } else {
            sink(&format!(
                "    {} ({} sub buses: {})",
                bus.id,
                subs.len(),
                subs.join(", ")
            ));
        }
    }

    sink(&format!(
        "  mix preset chunk ({} mix presets):",
        image.mix_presets.len()
    ));
    for preset in &image.mix_presets {
        let marker = if preset.is_default { " (default)" } else { "" };
        sink(&format!("    {}{}", preset.id, marker));
        for params in &preset.parameters {
            sink(&format!(
                "      bus {}: gain left {}, gain right {}, pitch {}",
                params.mix_bus_index, params.gain_left, params.gain_right, params.pitch
            ));
        }
    }

    sink(&format!(
        "  wave bank chunk ({} entries total, {} wave banks):",
        image.total_audio_data_entries(),
        image.wave_banks.len()
    ));
    for bank in &image.wave_banks {
        sink(&format!(
            "    {} ({} entries)",
            bank.id,
            bank.audio_data_entries.len()
        ));
        for entry in &bank.audio_data_entries {
            sink(&format!("      {}", entry));
        }
    }

    sink(&format!("  sound chunk ({} sounds):", image.sounds.len()));
    for (i, sound) in image.sounds.iter().enumerate() {
        sink(&format!(
            "    sound {}: defer stop {}, playback count {}, mode {:?}, {} wave refs",
            i,
            sound.defer_stop,
            sound.playback_count,
            sound.playback_mode,
            sound.wave_references.len()
        ));
        sink(&format!(
            "      gain {} (var {}), pitch {} (var {})",
            sound.gain, sound.gain_variation, sound.pitch, sound.pitch_variation
        ));
        for reference in &sound.wave_references {
            sink(&format!(
                "      wave bank {} entry {}",
                reference.wave_bank_index, reference.audio_data_index
            ));
        }
    }

    sink(&format!("  event chunk ({} events):", image.events.len()));
    for event in &image.events {
        let target = if event.is_streaming() {
            format!(
                "streams bank {} entry {}",
                event.wave_bank_index, event.audio_data_index
            )
        } else {
            format!("sound {}", event.sound_index)
        };
        sink(&format!(
            "    {} (bus {}, {}, instances {})",
            event.id, event.mix_bus_index, target, event.instance_count
        ));
    }
}

/// Renders the dump into a single string, one line per row.
pub fn dump_to_string(image: &ProjectImage) -> String {
    let mut out = String::new();
    dump(image, |line| {
        out.push_str(line);
        out.push('\n');
    });
    out
}
