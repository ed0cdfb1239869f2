//! Source-to-binary compiler.
//!
//! Five gather passes populate a [`ProjectImage`] from the source tree,
//! run strictly in order because each pass resolves references against
//! the index space built by an earlier one: mix buses, mix presets, wave
//! banks, sounds, events.

use cueforge_binary::{
    BusParameters, Event, MixBus, MixPreset, PlaybackMode, ProjectImage, RetriggerMode, Sound,
    WaveBank, WaveReference,
};

use crate::error::{CompileError, CompileResult};
use crate::names::{
    ATTR_BUS, ATTR_CONE_GAIN, ATTR_DEFER_STOP, ATTR_GAIN, ATTR_GAIN_LEFT, ATTR_GAIN_RIGHT,
    ATTR_GAIN_VARIATION, ATTR_ID, ATTR_INNER_CONE_ANGLE, ATTR_INSTANCE_COUNT, ATTR_IS_DEFAULT,
    ATTR_IS_POSITIONAL, ATTR_LOOP, ATTR_OUTER_CONE_ANGLE, ATTR_PITCH, ATTR_PITCH_VARIATION,
    ATTR_PLAYBACK_COUNT, ATTR_PLAYBACK_MODE, ATTR_REL_PATH, ATTR_RETRIGGER_MODE, ATTR_SOUND,
    ATTR_WAVE_BANK, AUDIO_DATA_ITEM_NODE, AUDIO_DATA_REFERENCE_NODE, EVENT_GROUP_NODE,
    EVENT_NODE, MIX_BUS_NODE, MIX_PRESET_GROUP_NODE, MIX_PRESET_NODE, PARAMETER_SET_NODE,
    PROJECT_ROOT_NODE, SOUND_GROUP_NODE, SOUND_NODE, WAVE_BANK_GROUP_NODE, WAVE_BANK_NODE,
};
use crate::resolve::{node_path, IdTable};
use crate::tree::{walk, NodeId, SourceTree};

/// The required top-level sections of a project tree.
struct Sections {
    presets: NodeId,
    wave_banks: NodeId,
    sounds: NodeId,
    events: NodeId,
}

/// Compiles a source tree into a binary image.
///
/// `root` must be the project root node. Each call produces an
/// independently owned image; compiling unrelated trees concurrently is
/// safe because no state is shared across invocations.
pub fn compile(tree: &SourceTree, root: NodeId) -> CompileResult<ProjectImage> {
    if tree.name(root) != PROJECT_ROOT_NODE {
        return Err(CompileError::ProjectStructureError {
            section: "project root",
        });
    }
    let sections = find_sections(tree, root)?;

    let mut image = ProjectImage::new();
    let bus_table = gather_mix_buses(tree, root, &mut image)?;
    gather_mix_presets(tree, sections.presets, &mut image, &bus_table)?;
    let (bank_table, entry_tables) = gather_wave_banks(tree, sections.wave_banks, &mut image)?;
    let sound_table = gather_sounds(tree, sections.sounds, &mut image, &bank_table, &entry_tables)?;
    gather_events(
        tree,
        sections.events,
        &mut image,
        &bus_table,
        &bank_table,
        &entry_tables,
        &sound_table,
    )?;
    Ok(image)
}

/// Locates the five required top-level sections under the project root.
fn find_sections(tree: &SourceTree, root: NodeId) -> CompileResult<Sections> {
    let mut mix_bus = None;
    let mut presets = None;
    let mut wave_banks = None;
    let mut sounds = None;
    let mut events = None;
    for &child in tree.children(root) {
        match tree.name(child) {
            MIX_BUS_NODE => mix_bus = mix_bus.or(Some(child)),
            MIX_PRESET_GROUP_NODE => presets = presets.or(Some(child)),
            WAVE_BANK_GROUP_NODE => wave_banks = wave_banks.or(Some(child)),
            SOUND_GROUP_NODE => sounds = sounds.or(Some(child)),
            EVENT_GROUP_NODE => events = events.or(Some(child)),
            _ => {}
        }
    }

    let missing = |section| CompileError::ProjectStructureError { section };
    mix_bus.ok_or(missing("mix bus"))?;
    Ok(Sections {
        presets: presets.ok_or(missing("mix preset"))?,
        wave_banks: wave_banks.ok_or(missing("wave bank"))?,
        sounds: sounds.ok_or(missing("sound"))?,
        events: events.ok_or(missing("event"))?,
    })
}

/// Pass 1: gather mix buses into a flat array, then resolve sub-buses.
///
/// Two passes over the same nodes: sub-bus children can be declared
/// anywhere in the tree, so every bus must be gathered before any child
/// reference can resolve.
fn gather_mix_buses(
    tree: &SourceTree,
    root: NodeId,
    image: &mut ProjectImage,
) -> CompileResult<IdTable> {
    let mut bus_nodes = Vec::new();
    walk(tree, root, MIX_BUS_NODE, MIX_BUS_NODE, &mut |node| {
        let id = tree.require_attr(node, ATTR_ID)?.to_string();
        image.mix_buses.push(MixBus {
            id,
            sub_bus_indices: Vec::new(),
        });
        bus_nodes.push(node);
        Ok(())
    })?;

    let table = IdTable::new("mix bus", image.mix_buses.iter().map(|b| b.id.as_str()));

    for (index, &node) in bus_nodes.iter().enumerate() {
        let entity = format!("mix bus {:?}", image.mix_buses[index].id);
        let mut sub_bus_indices = Vec::new();
        for &child in tree.children(node) {
            if tree.name(child) != MIX_BUS_NODE {
                continue;
            }
            let child_id = tree.require_attr(child, ATTR_ID)?;
            sub_bus_indices.push(table.resolve(&entity, child_id)? as u32);
        }
        image.mix_buses[index].sub_bus_indices = sub_bus_indices;
    }
    Ok(table)
}

/// Pass 2: gather mix presets; every preset needs one parameter set per
/// mix bus, and exactly one preset in the project is the default.
fn gather_mix_presets(
    tree: &SourceTree,
    preset_root: NodeId,
    image: &mut ProjectImage,
    bus_table: &IdTable,
) -> CompileResult<()> {
    let num_buses = image.mix_buses.len();
    let mut presets = Vec::new();
    walk(
        tree,
        preset_root,
        MIX_PRESET_GROUP_NODE,
        MIX_PRESET_NODE,
        &mut |node| {
            let id = node_path(tree, node, preset_root)?;
            let entity = format!("mix preset {:?}", id);
            let is_default = tree.attr_bool_or(node, ATTR_IS_DEFAULT, false)?;

            let mut parameters = Vec::new();
            for &child in tree.children(node) {
                if tree.name(child) != PARAMETER_SET_NODE {
                    continue;
                }
                let bus_id = tree.require_attr(child, ATTR_BUS)?;
                parameters.push(BusParameters {
                    mix_bus_index: bus_table.resolve(&entity, bus_id)? as u32,
                    gain_left: tree.attr_f32(child, ATTR_GAIN_LEFT)?,
                    gain_right: tree.attr_f32(child, ATTR_GAIN_RIGHT)?,
                    pitch: tree.attr_f32(child, ATTR_PITCH)?,
                });
            }
            if parameters.len() != num_buses {
                return Err(CompileError::MalformedCount {
                    entity,
                    expected: format!("{} parameter sets, one per mix bus", num_buses),
                    found: parameters.len(),
                });
            }
            presets.push(MixPreset {
                id,
                is_default,
                parameters,
            });
            Ok(())
        },
    )?;

    let defaults = presets.iter().filter(|p| p.is_default).count();
    if defaults != 1 {
        return Err(CompileError::DuplicateOrMissingDefault { found: defaults });
    }
    image.mix_presets = presets;
    Ok(())
}

/// Pass 3: gather wave banks and their audio data entries.
fn gather_wave_banks(
    tree: &SourceTree,
    bank_root: NodeId,
    image: &mut ProjectImage,
) -> CompileResult<(IdTable, Vec<IdTable>)> {
    walk(
        tree,
        bank_root,
        WAVE_BANK_GROUP_NODE,
        WAVE_BANK_NODE,
        &mut |node| {
            let id = node_path(tree, node, bank_root)?;
            let mut audio_data_entries = Vec::new();
            for &child in tree.children(node) {
                if tree.name(child) != AUDIO_DATA_ITEM_NODE {
                    continue;
                }
                audio_data_entries.push(tree.require_attr(child, ATTR_REL_PATH)?.to_string());
            }
            if audio_data_entries.is_empty() {
                return Err(CompileError::MalformedCount {
                    entity: format!("wave bank {:?}", id),
                    expected: "at least one audio data entry".to_string(),
                    found: 0,
                });
            }
            image.wave_banks.push(WaveBank {
                id,
                audio_data_entries,
            });
            Ok(())
        },
    )?;

    let bank_table = IdTable::new("wave bank", image.wave_banks.iter().map(|b| b.id.as_str()));
    let entry_tables = image
        .wave_banks
        .iter()
        .map(|bank| {
            IdTable::new(
                "audio data entry",
                bank.audio_data_entries.iter().map(|e| e.as_str()),
            )
        })
        .collect();
    Ok((bank_table, entry_tables))
}

/// Pass 4: gather sounds, resolving each wave reference against the
/// banks gathered in pass 3. Returns the sound path-id table so pass 5
/// can resolve events to sound indices.
fn gather_sounds(
    tree: &SourceTree,
    sound_root: NodeId,
    image: &mut ProjectImage,
    bank_table: &IdTable,
    entry_tables: &[IdTable],
) -> CompileResult<IdTable> {
    let mut sound_paths = Vec::new();
    walk(tree, sound_root, SOUND_GROUP_NODE, SOUND_NODE, &mut |node| {
        let path = node_path(tree, node, sound_root)?;
        let entity = format!("sound {:?}", path);

        let mut wave_references = Vec::new();
        for &child in tree.children(node) {
            if tree.name(child) != AUDIO_DATA_REFERENCE_NODE {
                continue;
            }
            let bank_id = tree.require_attr(child, ATTR_WAVE_BANK)?;
            let rel_path = tree.require_attr(child, ATTR_REL_PATH)?;
            let bank_index = bank_table.resolve(&entity, bank_id)?;
            let entry_index = entry_tables[bank_index].resolve(&entity, rel_path)?;
            wave_references.push(WaveReference {
                wave_bank_index: bank_index as u32,
                audio_data_index: entry_index as u32,
            });
        }
        if wave_references.is_empty() {
            return Err(CompileError::MalformedCount {
                entity,
                expected: "at least one wave reference".to_string(),
                found: 0,
            });
        }

        image.sounds.push(Sound {
            gain: tree.attr_f32(node, ATTR_GAIN)?,
            gain_variation: tree.attr_f32(node, ATTR_GAIN_VARIATION)?,
            pitch: tree.attr_f32(node, ATTR_PITCH)?,
            pitch_variation: tree.attr_f32(node, ATTR_PITCH_VARIATION)?,
            defer_stop: tree.attr_bool_or(node, ATTR_DEFER_STOP, false)?,
            playback_count: tree.attr_i32(node, ATTR_PLAYBACK_COUNT)?,
            playback_mode: parse_playback_mode(tree, node)?,
            wave_references,
        });
        sound_paths.push(path);
        Ok(())
    })?;

    Ok(IdTable::new("sound", sound_paths.iter().map(|p| p.as_str())))
}

/// Pass 5: gather events.
///
/// An event names either a sound by path id or a streaming wave bank
/// entry, never both. The event's referenced wave bank set is derived
/// here: the deduplicated banks of the sound's wave references in
/// first-use order, or the single streaming bank.
fn gather_events(
    tree: &SourceTree,
    event_root: NodeId,
    image: &mut ProjectImage,
    bus_table: &IdTable,
    bank_table: &IdTable,
    entry_tables: &[IdTable],
    sound_table: &IdTable,
) -> CompileResult<()> {
    walk(tree, event_root, EVENT_GROUP_NODE, EVENT_NODE, &mut |node| {
        let id = node_path(tree, node, event_root)?;
        let entity = format!("event {:?}", id);

        let instance_count = tree.attr_i32(node, ATTR_INSTANCE_COUNT)?;
        if instance_count < -1 {
            return Err(CompileError::InvalidAttribute {
                node: tree.describe(node),
                attribute: ATTR_INSTANCE_COUNT.to_string(),
                value: instance_count.to_string(),
                expected: "-1 (unlimited) or a non-negative count".to_string(),
            });
        }

        let mix_bus_index = bus_table.resolve(&entity, tree.require_attr(node, ATTR_BUS)?)? as u32;
        let retrigger_mode = parse_retrigger_mode(tree, node)?;

        let sound_ref = tree.attr(node, ATTR_SOUND);
        let stream_bank = tree.attr(node, ATTR_WAVE_BANK);
        let (sound_index, wave_bank_index, audio_data_index, loop_if_streaming, referenced) =
            match (sound_ref, stream_bank) {
                (Some(_), Some(_)) => {
                    return Err(CompileError::AmbiguousEventReference { id, found: "both" });
                }
                (None, None) => {
                    return Err(CompileError::AmbiguousEventReference {
                        id,
                        found: "neither",
                    });
                }
                (Some(sound_id), None) => {
                    let sound_index = sound_table.resolve(&entity, sound_id)?;
                    let mut referenced: Vec<u32> = Vec::new();
                    for reference in &image.sounds[sound_index].wave_references {
                        if !referenced.contains(&reference.wave_bank_index) {
                            referenced.push(reference.wave_bank_index);
                        }
                    }
                    (sound_index as i32, -1, -1, false, referenced)
                }
                (None, Some(bank_id)) => {
                    let bank_index = bank_table.resolve(&entity, bank_id)?;
                    let rel_path = tree.require_attr(node, ATTR_REL_PATH)?;
                    let entry_index = entry_tables[bank_index].resolve(&entity, rel_path)?;
                    let looped = tree.attr_bool_or(node, ATTR_LOOP, false)?;
                    (
                        -1,
                        bank_index as i32,
                        entry_index as i32,
                        looped,
                        vec![bank_index as u32],
                    )
                }
            };

        image.events.push(Event {
            id,
            instance_count,
            gain: tree.attr_f32(node, ATTR_GAIN)?,
            pitch: tree.attr_f32(node, ATTR_PITCH)?,
            inner_cone_angle_deg: tree.attr_f32(node, ATTR_INNER_CONE_ANGLE)?,
            outer_cone_angle_deg: tree.attr_f32(node, ATTR_OUTER_CONE_ANGLE)?,
            outer_cone_gain: tree.attr_f32(node, ATTR_CONE_GAIN)?,
            mix_bus_index,
            is_positional: tree.attr_bool_or(node, ATTR_IS_POSITIONAL, false)?,
            sound_index,
            retrigger_mode,
            wave_bank_index,
            audio_data_index,
            loop_if_streaming,
            referenced_wave_banks: referenced,
        });
        Ok(())
    })?;

    if image.events.is_empty() {
        return Err(CompileError::MalformedCount {
            entity: "event section".to_string(),
            expected: "at least one event".to_string(),
            found: 0,
        });
    }
    Ok(())
}

fn parse_playback_mode(tree: &SourceTree, node: NodeId) -> CompileResult<PlaybackMode> {
    let raw = tree.require_attr(node, ATTR_PLAYBACK_MODE)?;
    match raw {
        "random" => Ok(PlaybackMode::Random),
        "randomNoRepeat" => Ok(PlaybackMode::RandomNoRepeat),
        "sequential" => Ok(PlaybackMode::Sequential),
        "sequentialNoReset" => Ok(PlaybackMode::SequentialNoReset),
        "inRandomOut" => Ok(PlaybackMode::InRandomOut),
        "inSequentialOut" => Ok(PlaybackMode::InSequentialOut),
        _ => Err(CompileError::InvalidAttribute {
            node: tree.describe(node),
            attribute: ATTR_PLAYBACK_MODE.to_string(),
            value: raw.to_string(),
            expected: "one of random, randomNoRepeat, sequential, sequentialNoReset, \
                       inRandomOut, inSequentialOut"
                .to_string(),
        }),
    }
}

fn parse_retrigger_mode(tree: &SourceTree, node: NodeId) -> CompileResult<RetriggerMode> {
    match tree.attr(node, ATTR_RETRIGGER_MODE) {
        None => Ok(RetriggerMode::Retrigger),
        Some("retrigger") => Ok(RetriggerMode::Retrigger),
        Some("noRetrigger") => Ok(RetriggerMode::NoRetrigger),
        Some(raw) => Err(CompileError::InvalidAttribute {
            node: tree.describe(node),
            attribute: ATTR_RETRIGGER_MODE.to_string(),
            value: raw.to_string(),
            expected: "retrigger or noRetrigger".to_string(),
        }),
    }
}
