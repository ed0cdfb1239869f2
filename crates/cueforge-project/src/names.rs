//! Node and attribute names of the authored project schema.
//!
//! The source document is a generic labeled tree; these constants are the
//! vocabulary the compiler recognizes in it. The schema itself is
//! validated upstream, so the compiler only deals with well-formed trees.

/// Name of the project root node; path ids stop just below it.
pub const PROJECT_ROOT_NODE: &str = "AudioProject";

/// A mix bus node. Buses nest: a `MixBus` child of a `MixBus` is a
/// sub-bus.
pub const MIX_BUS_NODE: &str = "MixBus";

/// A grouping node inside the mix preset section.
pub const MIX_PRESET_GROUP_NODE: &str = "MixPresetGroup";

/// A mix preset node.
pub const MIX_PRESET_NODE: &str = "MixPreset";

/// A per-bus parameter set inside a mix preset.
pub const PARAMETER_SET_NODE: &str = "ParameterSet";

/// A grouping node inside the wave bank section.
pub const WAVE_BANK_GROUP_NODE: &str = "WaveBankGroup";

/// A wave bank node.
pub const WAVE_BANK_NODE: &str = "WaveBank";

/// An audio data item inside a wave bank.
pub const AUDIO_DATA_ITEM_NODE: &str = "AudioData";

/// A wave reference inside a sound.
pub const AUDIO_DATA_REFERENCE_NODE: &str = "AudioDataReference";

/// A grouping node inside the sound section.
pub const SOUND_GROUP_NODE: &str = "SoundGroup";

/// A sound node.
pub const SOUND_NODE: &str = "Sound";

/// A grouping node inside the event section.
pub const EVENT_GROUP_NODE: &str = "EventGroup";

/// An event node.
pub const EVENT_NODE: &str = "Event";

// Attribute names.

/// Declared id of a node; path ids are built from these.
pub const ATTR_ID: &str = "id";

/// Gain (buses are referenced by id, sounds and events carry their own).
pub const ATTR_GAIN: &str = "gain";

/// Random gain variation range.
pub const ATTR_GAIN_VARIATION: &str = "gainVar";

/// Pitch.
pub const ATTR_PITCH: &str = "pitch";

/// Random pitch variation range.
pub const ATTR_PITCH_VARIATION: &str = "pitchVar";

/// Whether stop requests wait for the current wave (sounds).
pub const ATTR_DEFER_STOP: &str = "deferStop";

/// Waves played per trigger; -1 loops forever (sounds).
pub const ATTR_PLAYBACK_COUNT: &str = "playbackCount";

/// Wave selection strategy (sounds).
pub const ATTR_PLAYBACK_MODE: &str = "playbackMode";

/// Marks the default mix preset.
pub const ATTR_IS_DEFAULT: &str = "default";

/// Mix bus reference by declared id (parameter sets, events).
pub const ATTR_BUS: &str = "bus";

/// Left-channel gain (parameter sets).
pub const ATTR_GAIN_LEFT: &str = "gainLeft";

/// Right-channel gain (parameter sets).
pub const ATTR_GAIN_RIGHT: &str = "gainRight";

/// Relative file path of an audio data item or reference.
pub const ATTR_REL_PATH: &str = "relativePath";

/// Wave bank reference by path id (wave references, streaming events).
pub const ATTR_WAVE_BANK: &str = "waveBank";

/// Sound reference by path id (events).
pub const ATTR_SOUND: &str = "sound";

/// Retrigger behavior (events).
pub const ATTR_RETRIGGER_MODE: &str = "retriggerMode";

/// Whether a streaming event loops its wave.
pub const ATTR_LOOP: &str = "loop";

/// Maximum simultaneous instances; -1 means unlimited (events).
pub const ATTR_INSTANCE_COUNT: &str = "instanceCount";

/// Whether an event is positioned in 3D space.
pub const ATTR_IS_POSITIONAL: &str = "positional";

/// Inner cone angle in degrees (events).
pub const ATTR_INNER_CONE_ANGLE: &str = "innerConeAngle";

/// Outer cone angle in degrees (events).
pub const ATTR_OUTER_CONE_ANGLE: &str = "outerConeAngle";

/// Gain outside the outer cone (events).
pub const ATTR_CONE_GAIN: &str = "coneGain";
