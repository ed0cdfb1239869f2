//! Decoder validation tests: every malformed stream must be rejected
//! with a typed error, never decoded into a half-checked image.

use std::io::Cursor;

use cueforge_binary::{
    read_image, write_image, BinaryError, BusParameters, Event, MixBus, MixPreset, PlaybackMode,
    ProjectImage, RetriggerMode, Sound, WaveBank, WaveReference, EVENT_CHUNK_ID, SOUND_CHUNK_ID,
    WAVE_BANK_CHUNK_ID,
};

// =============================================================================
// Helpers
// =============================================================================

/// A small valid image: two buses, one default preset, one bank with two
/// entries, one sound, one non-streaming event.
fn valid_image() -> ProjectImage {
    let mut image = ProjectImage::new();
    image.mix_buses = vec![
        MixBus {
            id: "master".to_string(),
            sub_bus_indices: vec![1],
        },
        MixBus {
            id: "sfx".to_string(),
            sub_bus_indices: vec![],
        },
    ];
    image.mix_presets = vec![MixPreset {
        id: "default".to_string(),
        is_default: true,
        parameters: vec![
            BusParameters {
                mix_bus_index: 0,
                gain_left: 1.0,
                gain_right: 1.0,
                pitch: 1.0,
            },
            BusParameters {
                mix_bus_index: 1,
                gain_left: 1.0,
                gain_right: 1.0,
                pitch: 1.0,
            },
        ],
    }];
    image.wave_banks = vec![WaveBank {
        id: "bank".to_string(),
        audio_data_entries: vec!["a.wav".to_string(), "b.wav".to_string()],
    }];
    image.sounds = vec![Sound {
        gain: 1.0,
        gain_variation: 0.0,
        pitch: 1.0,
        pitch_variation: 0.0,
        defer_stop: false,
        playback_count: 1,
        playback_mode: PlaybackMode::Random,
        wave_references: vec![WaveReference {
            wave_bank_index: 0,
            audio_data_index: 0,
        }],
    }];
    image.events = vec![Event {
        id: "e".to_string(),
        instance_count: 1,
        gain: 1.0,
        pitch: 1.0,
        inner_cone_angle_deg: 0.0,
        outer_cone_angle_deg: 0.0,
        outer_cone_gain: 1.0,
        mix_bus_index: 0,
        is_positional: false,
        sound_index: 0,
        retrigger_mode: RetriggerMode::Retrigger,
        wave_bank_index: -1,
        audio_data_index: -1,
        loop_if_streaming: false,
        referenced_wave_banks: vec![0],
    }];
    image
}

fn encode(image: &ProjectImage) -> Vec<u8> {
    // The writer does not re-validate, so deliberately broken images can
    // be encoded to exercise the decoder.
    let mut bytes = Vec::new();
    write_image(image, &mut bytes).expect("encoding succeeds");
    bytes
}

fn decode_err(bytes: Vec<u8>) -> BinaryError {
    read_image(Cursor::new(bytes)).expect_err("decoding should fail")
}

/// Locates a chunk's payload in encoded bytes by walking the framing.
/// Returns (payload offset, payload length).
fn chunk_bounds(bytes: &[u8], chunk_id: i32) -> (usize, usize) {
    let mut pos = 8; // past the file identifier
    loop {
        let id = i32::from_be_bytes(bytes[pos..pos + 4].try_into().unwrap());
        let len = i32::from_be_bytes(bytes[pos + 4..pos + 8].try_into().unwrap()) as usize;
        if id == chunk_id {
            return (pos + 8, len);
        }
        pos += 8 + len;
    }
}

fn write_be(bytes: &mut [u8], offset: usize, value: i32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
}

// =============================================================================
// File identifier
// =============================================================================

#[test]
fn sanity_valid_image_decodes() {
    let decoded = read_image(Cursor::new(encode(&valid_image()))).unwrap();
    assert_eq!(decoded, valid_image());
}

#[test]
fn bad_magic_is_rejected() {
    let mut bytes = encode(&valid_image());
    bytes[0] ^= 0xFF;
    assert!(matches!(
        decode_err(bytes),
        BinaryError::InvalidFileIdentifier { .. }
    ));
}

#[test]
fn empty_stream_is_rejected_as_bad_identifier() {
    assert!(matches!(
        decode_err(Vec::new()),
        BinaryError::InvalidFileIdentifier { .. }
    ));
}

#[test]
fn truncated_stream_is_rejected() {
    let mut bytes = encode(&valid_image());
    bytes.truncate(bytes.len() / 2);
    // Depending on where the cut lands this is either a missing chunk or
    // a short read inside one; both are hard failures.
    let err = decode_err(bytes);
    assert!(matches!(
        err,
        BinaryError::Io(_) | BinaryError::ChunkNotFound { .. }
    ));
}

#[test]
fn missing_chunk_is_rejected() {
    let mut bytes = encode(&valid_image());
    let (payload, _) = chunk_bounds(&bytes, EVENT_CHUNK_ID);
    bytes.truncate(payload - 8); // drop the event chunk entirely
    assert!(matches!(
        decode_err(bytes),
        BinaryError::ChunkNotFound {
            chunk_id: EVENT_CHUNK_ID
        }
    ));
}

// =============================================================================
// Mix buses
// =============================================================================

#[test]
fn sub_bus_index_off_by_one_is_rejected() {
    let mut image = valid_image();
    image.mix_buses[0].sub_bus_indices = vec![2]; // == bus count
    assert!(matches!(
        decode_err(encode(&image)),
        BinaryError::OutOfBoundsIndex {
            field: "sub-bus index",
            index: 2,
            bound: 2,
            ..
        }
    ));
}

#[test]
fn last_valid_sub_bus_index_is_accepted() {
    let mut image = valid_image();
    image.mix_buses[0].sub_bus_indices = vec![1]; // == bus count - 1
    assert!(read_image(Cursor::new(encode(&image))).is_ok());
}

#[test]
fn sub_bus_cycle_is_rejected() {
    let mut image = valid_image();
    image.mix_buses[1].sub_bus_indices = vec![0]; // master -> sfx -> master
    assert!(matches!(
        decode_err(encode(&image)),
        BinaryError::CyclicBusGraph { .. }
    ));
}

// =============================================================================
// Mix presets
// =============================================================================

#[test]
fn missing_default_preset_is_rejected() {
    let mut image = valid_image();
    image.mix_presets[0].is_default = false;
    assert!(matches!(
        decode_err(encode(&image)),
        BinaryError::DuplicateOrMissingDefault { found: 0 }
    ));
}

#[test]
fn duplicate_default_preset_is_rejected() {
    let mut image = valid_image();
    let mut second = image.mix_presets[0].clone();
    second.id = "other".to_string();
    image.mix_presets.push(second);
    assert!(matches!(
        decode_err(encode(&image)),
        BinaryError::DuplicateOrMissingDefault { found: 2 }
    ));
}

#[test]
fn single_default_preset_is_accepted() {
    let mut image = valid_image();
    let mut second = image.mix_presets[0].clone();
    second.id = "other".to_string();
    second.is_default = false;
    image.mix_presets.push(second);
    assert!(read_image(Cursor::new(encode(&image))).is_ok());
}

#[test]
fn preset_bus_index_out_of_range_is_rejected() {
    let mut image = valid_image();
    image.mix_presets[0].parameters[1].mix_bus_index = 5;
    assert!(matches!(
        decode_err(encode(&image)),
        BinaryError::OutOfBoundsIndex {
            field: "mix bus index",
            index: 5,
            bound: 2,
            ..
        }
    ));
}

// =============================================================================
// Wave banks
// =============================================================================

#[test]
fn empty_wave_bank_is_rejected() {
    let mut image = valid_image();
    image.wave_banks[0].audio_data_entries.clear();
    // The event and sound still reference the bank; the bank itself fails
    // first, during the wave bank chunk.
    assert!(matches!(
        decode_err(encode(&image)),
        BinaryError::MalformedCount {
            field: "audio data entry count",
            ..
        }
    ));
}

#[test]
fn wrong_audio_data_total_is_rejected() {
    let mut bytes = encode(&valid_image());
    let (payload, _) = chunk_bounds(&bytes, WAVE_BANK_CHUNK_ID);
    write_be(&mut bytes, payload, 99); // declared total != sum of banks
    assert!(matches!(
        decode_err(bytes),
        BinaryError::MalformedCount {
            field: "audio data total",
            value: 99,
            ..
        }
    ));
}

// =============================================================================
// Sounds
// =============================================================================

#[test]
fn sound_without_wave_references_is_rejected() {
    let mut image = valid_image();
    image.sounds[0].wave_references.clear();
    assert!(matches!(
        decode_err(encode(&image)),
        BinaryError::MalformedCount {
            field: "wave reference count",
            value: 0,
            ..
        }
    ));
}

#[test]
fn sound_bank_index_out_of_range_is_rejected() {
    let mut image = valid_image();
    image.sounds[0].wave_references[0].wave_bank_index = 1;
    assert!(matches!(
        decode_err(encode(&image)),
        BinaryError::OutOfBoundsIndex {
            field: "wave bank index",
            index: 1,
            bound: 1,
            ..
        }
    ));
}

#[test]
fn sound_entry_index_out_of_range_is_rejected() {
    let mut image = valid_image();
    image.sounds[0].wave_references[0].audio_data_index = 2;
    assert!(matches!(
        decode_err(encode(&image)),
        BinaryError::OutOfBoundsIndex {
            field: "audio data index",
            index: 2,
            bound: 2,
            ..
        }
    ));
}

#[test]
fn unknown_playback_mode_is_rejected() {
    let mut bytes = encode(&valid_image());
    let (payload, _) = chunk_bounds(&bytes, SOUND_CHUNK_ID);
    // Sound 0 layout: playback count, defer stop, four floats, mode.
    let mode_offset = payload + 4 + 4 + 4 + 16;
    write_be(&mut bytes, mode_offset, 99);
    assert!(matches!(
        decode_err(bytes),
        BinaryError::InvalidEnumValue {
            field: "playback mode",
            value: 99,
            ..
        }
    ));
}

// =============================================================================
// Events
// =============================================================================

#[test]
fn zero_events_is_rejected() {
    let mut image = valid_image();
    image.events.clear();
    assert!(matches!(
        decode_err(encode(&image)),
        BinaryError::MalformedCount {
            field: "event count",
            value: 0,
            ..
        }
    ));
}

#[test]
fn instance_count_below_minus_one_is_rejected() {
    let mut image = valid_image();
    image.events[0].instance_count = -2;
    assert!(matches!(
        decode_err(encode(&image)),
        BinaryError::MalformedCount {
            field: "instance count",
            value: -2,
            ..
        }
    ));
}

#[test]
fn event_mix_bus_index_out_of_range_is_rejected() {
    let mut image = valid_image();
    image.events[0].mix_bus_index = 2;
    assert!(matches!(
        decode_err(encode(&image)),
        BinaryError::OutOfBoundsIndex {
            field: "mix bus index",
            index: 2,
            bound: 2,
            ..
        }
    ));
}

#[test]
fn event_sound_index_out_of_range_is_rejected() {
    let mut image = valid_image();
    image.events[0].sound_index = 1; // only one sound
    // Make the streaming fields consistent with a sound event.
    assert!(matches!(
        decode_err(encode(&image)),
        BinaryError::OutOfBoundsIndex {
            field: "sound index",
            index: 1,
            bound: 1,
            ..
        }
    ));
}

#[test]
fn streaming_event_with_bad_bank_is_rejected() {
    let mut image = valid_image();
    image.events[0].sound_index = -1;
    image.events[0].wave_bank_index = 3;
    image.events[0].audio_data_index = 0;
    assert!(matches!(
        decode_err(encode(&image)),
        BinaryError::OutOfBoundsIndex {
            field: "wave bank index",
            index: 3,
            bound: 1,
            ..
        }
    ));
}

#[test]
fn streaming_event_with_bad_entry_is_rejected() {
    let mut image = valid_image();
    image.events[0].sound_index = -1;
    image.events[0].wave_bank_index = 0;
    image.events[0].audio_data_index = 2;
    assert!(matches!(
        decode_err(encode(&image)),
        BinaryError::OutOfBoundsIndex {
            field: "audio data index",
            index: 2,
            bound: 2,
            ..
        }
    ));
}

#[test]
fn streaming_event_with_valid_pair_is_accepted() {
    let mut image = valid_image();
    image.events[0].sound_index = -1;
    image.events[0].wave_bank_index = 0;
    image.events[0].audio_data_index = 1;
    image.events[0].loop_if_streaming = true;
    assert!(read_image(Cursor::new(encode(&image))).is_ok());
}

#[test]
fn non_streaming_event_with_live_streaming_fields_is_rejected() {
    let mut image = valid_image();
    image.events[0].wave_bank_index = 0; // sound_index is 0, so this must be -1
    assert!(matches!(
        decode_err(encode(&image)),
        BinaryError::MalformedCount {
            field: "wave bank index",
            value: 0,
            ..
        }
    ));
}

#[test]
fn event_referenced_bank_out_of_range_is_rejected() {
    let mut image = valid_image();
    image.events[0].referenced_wave_banks = vec![1];
    assert!(matches!(
        decode_err(encode(&image)),
        BinaryError::OutOfBoundsIndex {
            field: "referenced wave bank index",
            index: 1,
            bound: 1,
            ..
        }
    ));
}

#[test]
fn unknown_retrigger_mode_is_rejected() {
    let mut bytes = encode(&valid_image());
    let (payload, _) = chunk_bounds(&bytes, EVENT_CHUNK_ID);
    // Event 0 layout: id ("e" = 4 + 1 bytes), instance count, five
    // floats, mix bus index, positional flag, sound index, retrigger.
    let retrigger_offset = payload + 4 + (4 + 1) + 4 + 20 + 4 + 4 + 4;
    write_be(&mut bytes, retrigger_offset, 7);
    assert!(matches!(
        decode_err(bytes),
        BinaryError::InvalidEnumValue {
            field: "retrigger mode",
            value: 7,
            ..
        }
    ));
}
