//! Engine-data image encoder.
//!
//! Each chunk payload is serialized to a buffer first, then framed with
//! its id and byte length, so chunk sizes never need backpatching. Field
//! order mirrors the decoder exactly; the wire format is defined by that
//! shared order.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{BigEndian, WriteBytesExt};

use crate::error::BinaryResult;
use crate::image::{
    ProjectImage, EVENT_CHUNK_ID, MIX_BUS_CHUNK_ID, MIX_PRESET_CHUNK_ID, SOUND_CHUNK_ID,
    WAVE_BANK_CHUNK_ID,
};
use crate::stream::{write_bool, write_chunk, write_string};

/// Encodes a complete engine-data image to a stream.
pub fn write_image<W: Write>(image: &ProjectImage, writer: &mut W) -> BinaryResult<()> {
    writer.write_all(&crate::image::FILE_IDENTIFIER)?;
    write_chunk(writer, MIX_BUS_CHUNK_ID, &mix_bus_payload(image)?)?;
    write_chunk(writer, MIX_PRESET_CHUNK_ID, &mix_preset_payload(image)?)?;
    write_chunk(writer, WAVE_BANK_CHUNK_ID, &wave_bank_payload(image)?)?;
    write_chunk(writer, SOUND_CHUNK_ID, &sound_payload(image)?)?;
    write_chunk(writer, EVENT_CHUNK_ID, &event_payload(image)?)?;
    Ok(())
}

/// Encodes an image to a file, creating or truncating it.
pub fn write_image_to_path(image: &ProjectImage, path: impl AsRef<Path>) -> BinaryResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_image(image, &mut writer)?;
    writer.flush()?;
    Ok(())
}

fn mix_bus_payload(image: &ProjectImage) -> BinaryResult<Vec<u8>> {
    let mut buf = Vec::new();
    buf.write_i32::<BigEndian>(image.mix_buses.len() as i32)?;
    for bus in &image.mix_buses {
        write_string(&mut buf, &bus.id)?;
        buf.write_i32::<BigEndian>(bus.sub_bus_indices.len() as i32)?;
        for &index in &bus.sub_bus_indices {
            buf.write_i32::<BigEndian>(index as i32)?;
        }
    }
    Ok(buf)
}

fn mix_preset_payload(image: &ProjectImage) -> BinaryResult<Vec<u8>> {
    let mut buf = Vec::new();
    buf.write_i32::<BigEndian>(image.mix_presets.len() as i32)?;
    for preset in &image.mix_presets {
        write_string(&mut buf, &preset.id)?;
        write_bool(&mut buf, preset.is_default)?;
        for params in &preset.parameters {
            buf.write_i32::<BigEndian>(params.mix_bus_index as i32)?;
            buf.write_f32::<BigEndian>(params.gain_left)?;
            buf.write_f32::<BigEndian>(params.gain_right)?;
            buf.write_f32::<BigEndian>(params.pitch)?;
        }
    }
    Ok(buf)
}

fn wave_bank_payload(image: &ProjectImage) -> BinaryResult<Vec<u8>> {
    let mut buf = Vec::new();
    buf.write_i32::<BigEndian>(image.total_audio_data_entries() as i32)?;
    buf.write_i32::<BigEndian>(image.wave_banks.len() as i32)?;
    for bank in &image.wave_banks {
        write_string(&mut buf, &bank.id)?;
        buf.write_i32::<BigEndian>(bank.audio_data_entries.len() as i32)?;
        for entry in &bank.audio_data_entries {
            write_string(&mut buf, entry)?;
        }
    }
    Ok(buf)
}

fn sound_payload(image: &ProjectImage) -> BinaryResult<Vec<u8>> {
    let mut buf = Vec::new();
    buf.write_i32::<BigEndian>(image.sounds.len() as i32)?;
    for sound in &image.sounds {
        buf.write_i32::<BigEndian>(sound.playback_count)?;
        write_bool(&mut buf, sound.defer_stop)?;
        buf.write_f32::<BigEndian>(sound.gain)?;
        buf.write_f32::<BigEndian>(sound.gain_variation)?;
        buf.write_f32::<BigEndian>(sound.pitch)?;
        buf.write_f32::<BigEndian>(sound.pitch_variation)?;
        buf.write_i32::<BigEndian>(sound.playback_mode.to_wire())?;
        buf.write_i32::<BigEndian>(sound.wave_references.len() as i32)?;
        for reference in &sound.wave_references {
            buf.write_i32::<BigEndian>(reference.wave_bank_index as i32)?;
            buf.write_i32::<BigEndian>(reference.audio_data_index as i32)?;
        }
    }
    Ok(buf)
}

fn event_payload(image: &ProjectImage) -> BinaryResult<Vec<u8>> {
    let mut buf = Vec::new();
    buf.write_i32::<BigEndian>(image.events.len() as i32)?;
    for event in &image.events {
        write_string(&mut buf, &event.id)?;
        buf.write_i32::<BigEndian>(event.instance_count)?;
        buf.write_f32::<BigEndian>(event.gain)?;
        buf.write_f32::<BigEndian>(event.pitch)?;
        buf.write_f32::<BigEndian>(event.inner_cone_angle_deg)?;
        buf.write_f32::<BigEndian>(event.outer_cone_angle_deg)?;
        buf.write_f32::<BigEndian>(event.outer_cone_gain)?;
        buf.write_i32::<BigEndian>(event.mix_bus_index as i32)?;
        write_bool(&mut buf, event.is_positional)?;
        buf.write_i32::<BigEndian>(event.sound_index)?;
        buf.write_i32::<BigEndian>(event.retrigger_mode.to_wire())?;
        buf.write_i32::<BigEndian>(event.wave_bank_index)?;
        buf.write_i32::<BigEndian>(event.audio_data_index)?;
        write_bool(&mut buf, event.loop_if_streaming)?;
        buf.write_i32::<BigEndian>(event.referenced_wave_banks.len() as i32)?;
        for &index in &event.referenced_wave_banks {
            buf.write_i32::<BigEndian>(index as i32)?;
        }
    }
    Ok(buf)
}
