//! Engine-data image model.
//!
//! A [`ProjectImage`] is the in-memory form of a compiled audio project:
//! five flat chunk arrays whose cross-references are plain integer indices
//! into sibling arrays. The image owns every string and array it contains,
//! so it is a single self-contained, relocatable value with no aliasing
//! into any other image.

/// File identifier bytes at the start of every engine-data binary.
///
/// PNG-style corruption canary: a high-bit byte, the ASCII name, then
/// CRLF and EOF-character traps.
pub const FILE_IDENTIFIER: [u8; 8] = [0x89, b'C', b'U', b'E', b'B', 0x0D, 0x0A, 0x1A];

/// Chunk id for the mix bus chunk ("mbus").
pub const MIX_BUS_CHUNK_ID: i32 = 0x6D62_7573;

/// Chunk id for the mix preset chunk ("mprs").
pub const MIX_PRESET_CHUNK_ID: i32 = 0x6D70_7273;

/// Chunk id for the wave bank chunk ("wbnk").
pub const WAVE_BANK_CHUNK_ID: i32 = 0x7762_6E6B;

/// Chunk id for the sound chunk ("sond").
pub const SOUND_CHUNK_ID: i32 = 0x736F_6E64;

/// Chunk id for the event chunk ("evnt").
pub const EVENT_CHUNK_ID: i32 = 0x6576_6E74;

/// How a sound picks the next wave to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackMode {
    /// Pick a random wave reference each trigger.
    Random,
    /// Pick a random wave reference, never the same twice in a row.
    RandomNoRepeat,
    /// Step through the wave references in order.
    Sequential,
    /// Step through in order without resetting between triggers.
    SequentialNoReset,
    /// First reference in, random middle, last reference out.
    InRandomOut,
    /// First reference in, sequential middle, last reference out.
    InSequentialOut,
}

impl PlaybackMode {
    /// Decodes a wire discriminant.
    pub fn from_wire(value: i32) -> Option<Self> {
        match value {
            0 => Some(PlaybackMode::Random),
            1 => Some(PlaybackMode::RandomNoRepeat),
            2 => Some(PlaybackMode::Sequential),
            3 => Some(PlaybackMode::SequentialNoReset),
            4 => Some(PlaybackMode::InRandomOut),
            5 => Some(PlaybackMode::InSequentialOut),
            _ => None,
        }
    }

    /// Returns the wire discriminant.
    pub fn to_wire(self) -> i32 {
        match self {
            PlaybackMode::Random => 0,
            PlaybackMode::RandomNoRepeat => 1,
            PlaybackMode::Sequential => 2,
            PlaybackMode::SequentialNoReset => 3,
            PlaybackMode::InRandomOut => 4,
            PlaybackMode::InSequentialOut => 5,
        }
    }
}

/// What happens when an event is triggered while already playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetriggerMode {
    /// Restart the event instance.
    Retrigger,
    /// Ignore the trigger and keep playing.
    NoRetrigger,
}

impl RetriggerMode {
    /// Decodes a wire discriminant.
    pub fn from_wire(value: i32) -> Option<Self> {
        match value {
            0 => Some(RetriggerMode::Retrigger),
            1 => Some(RetriggerMode::NoRetrigger),
            _ => None,
        }
    }

    /// Returns the wire discriminant.
    pub fn to_wire(self) -> i32 {
        match self {
            RetriggerMode::Retrigger => 0,
            RetriggerMode::NoRetrigger => 1,
        }
    }
}

/// A named gain-routing stage in the mix bus tree.
#[derive(Debug, Clone, PartialEq)]
pub struct MixBus {
    /// Unique bus id as declared in the source project.
    pub id: String,
    /// Indices of this bus's immediate sub-buses in the mix bus array.
    ///
    /// The graph formed by these edges must be acyclic; the runtime mixer
    /// walks it without cycle detection.
    pub sub_bus_indices: Vec<u32>,
}

/// One mix preset's parameters for a single mix bus.
#[derive(Debug, Clone, PartialEq)]
pub struct BusParameters {
    /// Index of the target bus in the mix bus array.
    pub mix_bus_index: u32,
    /// Left-channel gain.
    pub gain_left: f32,
    /// Right-channel gain.
    pub gain_right: f32,
    /// Pitch multiplier.
    pub pitch: f32,
}

/// A named snapshot of per-bus gain/pitch parameters.
///
/// Every preset carries exactly one [`BusParameters`] entry per mix bus,
/// and exactly one preset in an image has `is_default` set.
#[derive(Debug, Clone, PartialEq)]
pub struct MixPreset {
    /// Unique preset id, derived from the source tree path.
    pub id: String,
    /// Whether this is the image's default preset.
    pub is_default: bool,
    /// Per-bus parameter sets, one per mix bus.
    pub parameters: Vec<BusParameters>,
}

/// A named group of audio-data file references loaded together at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveBank {
    /// Unique bank id, derived from the source tree path.
    pub id: String,
    /// Relative file paths of the bank's audio data, in document order.
    /// Never empty in a valid image.
    pub audio_data_entries: Vec<String>,
}

/// A resolved reference to one audio-data entry in one wave bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveReference {
    /// Index into the wave bank array.
    pub wave_bank_index: u32,
    /// Index into that bank's `audio_data_entries`.
    pub audio_data_index: u32,
}

/// A sound definition: playback parameters plus the waves it can play.
#[derive(Debug, Clone, PartialEq)]
pub struct Sound {
    /// Base gain.
    pub gain: f32,
    /// Random gain variation range.
    pub gain_variation: f32,
    /// Base pitch.
    pub pitch: f32,
    /// Random pitch variation range.
    pub pitch_variation: f32,
    /// Whether stop requests wait for the current wave to finish.
    pub defer_stop: bool,
    /// Number of waves to play per trigger; -1 means loop forever.
    pub playback_count: i32,
    /// Wave selection strategy.
    pub playback_mode: PlaybackMode,
    /// Resolved wave references. Never empty in a valid image.
    pub wave_references: Vec<WaveReference>,
}

/// A triggerable playback unit.
///
/// An event references either a sound (`sound_index >= 0`) or, when
/// streaming (`sound_index == -1`), a single wave bank entry directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Unique event id, derived from the source tree path.
    pub id: String,
    /// Maximum simultaneous instances; -1 means unlimited.
    pub instance_count: i32,
    /// Event gain.
    pub gain: f32,
    /// Event pitch.
    pub pitch: f32,
    /// Inner cone angle in degrees (positional events).
    pub inner_cone_angle_deg: f32,
    /// Outer cone angle in degrees (positional events).
    pub outer_cone_angle_deg: f32,
    /// Gain applied outside the outer cone.
    pub outer_cone_gain: f32,
    /// Index of the mix bus this event plays through.
    pub mix_bus_index: u32,
    /// Whether the event is positioned in 3D space.
    pub is_positional: bool,
    /// Index of the referenced sound, or -1 for a streaming event.
    pub sound_index: i32,
    /// Retrigger behavior (ignored for streaming events).
    pub retrigger_mode: RetriggerMode,
    /// Streaming wave bank index; -1 for non-streaming events.
    pub wave_bank_index: i32,
    /// Streaming audio-data index; -1 for non-streaming events.
    pub audio_data_index: i32,
    /// Whether a streaming event loops its wave.
    pub loop_if_streaming: bool,
    /// Every wave bank this event may touch at runtime.
    pub referenced_wave_banks: Vec<u32>,
}

impl Event {
    /// Whether this event streams a wave bank entry directly instead of
    /// playing a sound.
    pub fn is_streaming(&self) -> bool {
        self.sound_index < 0
    }
}

/// A complete engine-data image: the binary form of one audio project.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectImage {
    /// Mix bus chunk, in source document order.
    pub mix_buses: Vec<MixBus>,
    /// Mix preset chunk.
    pub mix_presets: Vec<MixPreset>,
    /// Wave bank chunk.
    pub wave_banks: Vec<WaveBank>,
    /// Sound chunk.
    pub sounds: Vec<Sound>,
    /// Event chunk.
    pub events: Vec<Event>,
}

impl ProjectImage {
    /// Creates an empty image.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of audio-data entries across all wave banks.
    ///
    /// Stored in the wave bank chunk so the runtime can size its audio
    /// data table without walking the banks.
    pub fn total_audio_data_entries(&self) -> usize {
        self.wave_banks
            .iter()
            .map(|wb| wb.audio_data_entries.len())
            .sum()
    }

    /// Returns the default mix preset, if the image has exactly the one
    /// it is supposed to have.
    pub fn default_preset(&self) -> Option<&MixPreset> {
        self.mix_presets.iter().find(|p| p.is_default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playback_mode_wire_values_round_trip() {
        for v in 0..6 {
            let mode = PlaybackMode::from_wire(v).unwrap();
            assert_eq!(mode.to_wire(), v);
        }
        assert_eq!(PlaybackMode::from_wire(6), None);
        assert_eq!(PlaybackMode::from_wire(-1), None);
    }

    #[test]
    fn retrigger_mode_wire_values_round_trip() {
        for v in 0..2 {
            let mode = RetriggerMode::from_wire(v).unwrap();
            assert_eq!(mode.to_wire(), v);
        }
        assert_eq!(RetriggerMode::from_wire(2), None);
    }

    #[test]
    fn total_audio_data_entries_sums_all_banks() {
        let mut image = ProjectImage::new();
        image.wave_banks.push(WaveBank {
            id: "sfx".to_string(),
            audio_data_entries: vec!["a.wav".to_string(), "b.wav".to_string()],
        });
        image.wave_banks.push(WaveBank {
            id: "music".to_string(),
            audio_data_entries: vec!["c.ogg".to_string()],
        });
        assert_eq!(image.total_audio_data_entries(), 3);
    }
}
