//! Engine-data image decoder.
//!
//! Decoding is eager and field-by-field: every cross-reference index is
//! validated against the bounds established by sibling chunks as soon as
//! it is read, and the first failure aborts the whole read. The caller
//! either gets a fully validated [`ProjectImage`] or an error; never a
//! half-populated image.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use crate::error::{BinaryError, BinaryResult};
use crate::image::{
    BusParameters, Event, MixBus, MixPreset, PlaybackMode, ProjectImage, RetriggerMode, Sound,
    WaveBank, WaveReference, EVENT_CHUNK_ID, MIX_BUS_CHUNK_ID, MIX_PRESET_CHUNK_ID,
    SOUND_CHUNK_ID, WAVE_BANK_CHUNK_ID,
};
use crate::stream::ChunkReader;

/// Decodes a complete engine-data image from a seekable stream.
///
/// Chunks are located by id, so their order in the stream is free; the
/// five chunk kinds are decoded in dependency order (mix buses first)
/// because later chunks are validated against earlier index spaces.
pub fn read_image<R: Read + Seek>(reader: R) -> BinaryResult<ProjectImage> {
    let mut reader = ChunkReader::new(reader);
    reader.check_file_identifier()?;

    let mix_buses = read_mix_buses(&mut reader)?;
    let mix_presets = read_mix_presets(&mut reader, mix_buses.len())?;
    let wave_banks = read_wave_banks(&mut reader)?;
    let sounds = read_sounds(&mut reader, &wave_banks)?;
    let events = read_events(&mut reader, mix_buses.len(), &wave_banks, sounds.len())?;

    Ok(ProjectImage {
        mix_buses,
        mix_presets,
        wave_banks,
        sounds,
        events,
    })
}

/// Opens and decodes an engine-data binary file.
pub fn read_image_from_path(path: impl AsRef<Path>) -> BinaryResult<ProjectImage> {
    let file = File::open(path)?;
    read_image(BufReader::new(file))
}

/// Reads an `i32` count and rejects values below `min`.
fn read_count<R: Read + Seek>(
    reader: &mut ChunkReader<R>,
    entity: &str,
    field: &'static str,
    min: i32,
    expected: &'static str,
) -> BinaryResult<i32> {
    let value = reader.read_i32()?;
    if value < min {
        return Err(BinaryError::MalformedCount {
            entity: entity.to_string(),
            field,
            value: value as i64,
            expected,
        });
    }
    Ok(value)
}

/// Reads an `i32` index and validates it against `[0, bound)`.
fn read_index<R: Read + Seek>(
    reader: &mut ChunkReader<R>,
    entity: &str,
    field: &'static str,
    bound: usize,
) -> BinaryResult<u32> {
    let value = reader.read_i32()?;
    if value < 0 || value as usize >= bound {
        return Err(BinaryError::OutOfBoundsIndex {
            entity: entity.to_string(),
            field,
            index: value as i64,
            bound,
        });
    }
    Ok(value as u32)
}

fn read_mix_buses<R: Read + Seek>(reader: &mut ChunkReader<R>) -> BinaryResult<Vec<MixBus>> {
    reader.seek_to_chunk(MIX_BUS_CHUNK_ID)?;
    let count = read_count(
        reader,
        "mix bus chunk",
        "mix bus count",
        0,
        "a non-negative count",
    )? as usize;

    let mut buses = Vec::new();
    for _ in 0..count {
        let id = reader.read_string()?;
        let entity = format!("mix bus {:?}", id);
        let num_sub_buses = read_count(
            reader,
            &entity,
            "sub-bus count",
            0,
            "a non-negative count",
        )?;
        let mut sub_bus_indices = Vec::new();
        for _ in 0..num_sub_buses {
            sub_bus_indices.push(read_index(reader, &entity, "sub-bus index", count)?);
        }
        buses.push(MixBus {
            id,
            sub_bus_indices,
        });
    }

    check_bus_graph(&buses)?;
    Ok(buses)
}

/// Rejects cycles in the sub-bus graph.
///
/// The runtime mixer walks the graph without cycle detection, so a cycle
/// in the decoded image would hang the consumer.
fn check_bus_graph(buses: &[MixBus]) -> BinaryResult<()> {
    const WHITE: u8 = 0; // unvisited
    const GREY: u8 = 1; // on the current DFS path
    const BLACK: u8 = 2; // fully explored

    let mut marks = vec![WHITE; buses.len()];
    for start in 0..buses.len() {
        if marks[start] != WHITE {
            continue;
        }
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        marks[start] = GREY;
        while let Some(frame) = stack.last_mut() {
            let (bus, next_child) = *frame;
            if next_child < buses[bus].sub_bus_indices.len() {
                frame.1 += 1;
                let child = buses[bus].sub_bus_indices[next_child] as usize;
                match marks[child] {
                    GREY => {
                        return Err(BinaryError::CyclicBusGraph {
                            id: buses[child].id.clone(),
                            index: child,
                        });
                    }
                    WHITE => {
                        marks[child] = GREY;
                        stack.push((child, 0));
                    }
                    _ => {}
                }
            } else {
                marks[bus] = BLACK;
                stack.pop();
            }
        }
    }
    Ok(())
}

fn read_mix_presets<R: Read + Seek>(
    reader: &mut ChunkReader<R>,
    num_mix_buses: usize,
) -> BinaryResult<Vec<MixPreset>> {
    reader.seek_to_chunk(MIX_PRESET_CHUNK_ID)?;
    let count = read_count(
        reader,
        "mix preset chunk",
        "mix preset count",
        0,
        "a non-negative count",
    )?;

    let mut presets = Vec::new();
    let mut num_defaults = 0usize;
    for _ in 0..count {
        let id = reader.read_string()?;
        let entity = format!("mix preset {:?}", id);
        let is_default = reader.read_bool()?;
        if is_default {
            num_defaults += 1;
            if num_defaults > 1 {
                return Err(BinaryError::DuplicateOrMissingDefault {
                    found: num_defaults,
                });
            }
        }

        // Every preset carries one parameter set per mix bus.
        let mut parameters = Vec::new();
        for _ in 0..num_mix_buses {
            let mix_bus_index = read_index(reader, &entity, "mix bus index", num_mix_buses)?;
            let gain_left = reader.read_f32()?;
            let gain_right = reader.read_f32()?;
            let pitch = reader.read_f32()?;
            parameters.push(BusParameters {
                mix_bus_index,
                gain_left,
                gain_right,
                pitch,
            });
        }
        presets.push(MixPreset {
            id,
            is_default,
            parameters,
        });
    }

    if num_defaults == 0 {
        return Err(BinaryError::DuplicateOrMissingDefault { found: 0 });
    }
    Ok(presets)
}

fn read_wave_banks<R: Read + Seek>(reader: &mut ChunkReader<R>) -> BinaryResult<Vec<WaveBank>> {
    reader.seek_to_chunk(WAVE_BANK_CHUNK_ID)?;
    let declared_total = read_count(
        reader,
        "wave bank chunk",
        "audio data total",
        0,
        "a non-negative count",
    )?;
    let count = read_count(
        reader,
        "wave bank chunk",
        "wave bank count",
        0,
        "a non-negative count",
    )?;

    let mut banks = Vec::new();
    for _ in 0..count {
        let id = reader.read_string()?;
        let entity = format!("wave bank {:?}", id);
        let num_entries = read_count(
            reader,
            &entity,
            "audio data entry count",
            1,
            "at least one entry",
        )?;
        let mut audio_data_entries = Vec::new();
        for _ in 0..num_entries {
            audio_data_entries.push(reader.read_string()?);
        }
        banks.push(WaveBank {
            id,
            audio_data_entries,
        });
    }

    let actual_total: usize = banks.iter().map(|b| b.audio_data_entries.len()).sum();
    if declared_total as usize != actual_total {
        return Err(BinaryError::MalformedCount {
            entity: "wave bank chunk".to_string(),
            field: "audio data total",
            value: declared_total as i64,
            expected: "the sum of per-bank entry counts",
        });
    }
    Ok(banks)
}

fn read_sounds<R: Read + Seek>(
    reader: &mut ChunkReader<R>,
    wave_banks: &[WaveBank],
) -> BinaryResult<Vec<Sound>> {
    reader.seek_to_chunk(SOUND_CHUNK_ID)?;
    let count = read_count(
        reader,
        "sound chunk",
        "sound count",
        0,
        "a non-negative count",
    )?;

    let mut sounds = Vec::new();
    for i in 0..count {
        let entity = format!("sound {}", i);
        let playback_count = reader.read_i32()?;
        let defer_stop = reader.read_bool()?;
        let gain = reader.read_f32()?;
        let gain_variation = reader.read_f32()?;
        let pitch = reader.read_f32()?;
        let pitch_variation = reader.read_f32()?;
        let mode_raw = reader.read_i32()?;
        let playback_mode =
            PlaybackMode::from_wire(mode_raw).ok_or_else(|| BinaryError::InvalidEnumValue {
                entity: entity.clone(),
                field: "playback mode",
                value: mode_raw,
            })?;

        let num_references = read_count(
            reader,
            &entity,
            "wave reference count",
            1,
            "at least one wave reference",
        )?;
        let mut wave_references = Vec::new();
        for _ in 0..num_references {
            let wave_bank_index =
                read_index(reader, &entity, "wave bank index", wave_banks.len())?;
            let num_bank_entries =
                wave_banks[wave_bank_index as usize].audio_data_entries.len();
            let audio_data_index =
                read_index(reader, &entity, "audio data index", num_bank_entries)?;
            wave_references.push(WaveReference {
                wave_bank_index,
                audio_data_index,
            });
        }

        sounds.push(Sound {
            gain,
            gain_variation,
            pitch,
            pitch_variation,
            defer_stop,
            playback_count,
            playback_mode,
            wave_references,
        });
    }
    Ok(sounds)
}

fn read_events<R: Read + Seek>(
    reader: &mut ChunkReader<R>,
    num_mix_buses: usize,
    wave_banks: &[WaveBank],
    num_sounds: usize,
) -> BinaryResult<Vec<Event>> {
    reader.seek_to_chunk(EVENT_CHUNK_ID)?;
    let count = read_count(
        reader,
        "event chunk",
        "event count",
        1,
        "at least one event definition",
    )?;

    let mut events = Vec::new();
    for _ in 0..count {
        let id = reader.read_string()?;
        let entity = format!("event {:?}", id);

        let instance_count = reader.read_i32()?;
        if instance_count < -1 {
            return Err(BinaryError::MalformedCount {
                entity,
                field: "instance count",
                value: instance_count as i64,
                expected: "-1 (unlimited) or a non-negative count",
            });
        }

        let gain = reader.read_f32()?;
        let pitch = reader.read_f32()?;
        let inner_cone_angle_deg = reader.read_f32()?;
        let outer_cone_angle_deg = reader.read_f32()?;
        let outer_cone_gain = reader.read_f32()?;
        let mix_bus_index = read_index(reader, &entity, "mix bus index", num_mix_buses)?;
        let is_positional = reader.read_bool()?;

        let sound_index = reader.read_i32()?;
        if sound_index < -1 || sound_index as i64 >= num_sounds as i64 {
            return Err(BinaryError::OutOfBoundsIndex {
                entity,
                field: "sound index",
                index: sound_index as i64,
                bound: num_sounds,
            });
        }

        let retrigger_raw = reader.read_i32()?;
        let retrigger_mode = RetriggerMode::from_wire(retrigger_raw).ok_or_else(|| {
            BinaryError::InvalidEnumValue {
                entity: entity.clone(),
                field: "retrigger mode",
                value: retrigger_raw,
            }
        })?;

        let wave_bank_index = reader.read_i32()?;
        let audio_data_index = reader.read_i32()?;
        if sound_index == -1 {
            // Streaming event: the (bank, entry) pair is live and must
            // resolve.
            if wave_bank_index < 0 || wave_bank_index as usize >= wave_banks.len() {
                return Err(BinaryError::OutOfBoundsIndex {
                    entity,
                    field: "wave bank index",
                    index: wave_bank_index as i64,
                    bound: wave_banks.len(),
                });
            }
            let num_bank_entries = wave_banks[wave_bank_index as usize]
                .audio_data_entries
                .len();
            if audio_data_index < 0 || audio_data_index as usize >= num_bank_entries {
                return Err(BinaryError::OutOfBoundsIndex {
                    entity,
                    field: "audio data index",
                    index: audio_data_index as i64,
                    bound: num_bank_entries,
                });
            }
        } else if wave_bank_index != -1 || audio_data_index != -1 {
            // Non-streaming events carry -1 in both streaming fields,
            // keeping the two reference forms mutually exclusive.
            return Err(BinaryError::MalformedCount {
                entity,
                field: "wave bank index",
                value: wave_bank_index as i64,
                expected: "-1 for non-streaming events",
            });
        }

        let loop_if_streaming = reader.read_bool()?;

        let num_referenced = read_count(
            reader,
            &entity,
            "referenced wave bank count",
            0,
            "a non-negative count",
        )?;
        let mut referenced_wave_banks = Vec::new();
        for _ in 0..num_referenced {
            referenced_wave_banks.push(read_index(
                reader,
                &entity,
                "referenced wave bank index",
                wave_banks.len(),
            )?);
        }

        events.push(Event {
            id,
            instance_count,
            gain,
            pitch,
            inner_cone_angle_deg,
            outer_cone_angle_deg,
            outer_cone_gain,
            mix_bus_index,
            is_positional,
            sound_index,
            retrigger_mode,
            wave_bank_index,
            audio_data_index,
            loop_if_streaming,
            referenced_wave_banks,
        });
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bus(id: &str, subs: &[u32]) -> MixBus {
        MixBus {
            id: id.to_string(),
            sub_bus_indices: subs.to_vec(),
        }
    }

    #[test]
    fn bus_graph_tree_is_accepted() {
        let buses = [bus("master", &[1, 2]), bus("music", &[]), bus("sfx", &[])];
        assert!(check_bus_graph(&buses).is_ok());
    }

    #[test]
    fn bus_graph_diamond_is_accepted() {
        // Two parents sharing a child is not a cycle.
        let buses = [
            bus("master", &[1, 2]),
            bus("music", &[3]),
            bus("sfx", &[3]),
            bus("shared", &[]),
        ];
        assert!(check_bus_graph(&buses).is_ok());
    }

    #[test]
    fn bus_graph_self_loop_is_rejected() {
        let buses = [bus("master", &[0])];
        let err = check_bus_graph(&buses).unwrap_err();
        assert!(matches!(err, BinaryError::CyclicBusGraph { index: 0, .. }));
    }

    #[test]
    fn bus_graph_two_node_cycle_is_rejected() {
        let buses = [bus("a", &[1]), bus("b", &[0])];
        assert!(matches!(
            check_bus_graph(&buses).unwrap_err(),
            BinaryError::CyclicBusGraph { .. }
        ));
    }
}
