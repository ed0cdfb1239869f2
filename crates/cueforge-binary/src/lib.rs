//! Cueforge engine-data binary image.
//!
//! This crate defines the in-memory model of a compiled audio project
//! (the [`ProjectImage`] and its five chunk kinds) and the codec that
//! moves it to and from the chunk-framed big-endian wire format consumed
//! by the runtime audio engine.
//!
//! # Wire format
//!
//! A fixed 8-byte file identifier, followed by five independently
//! seekable chunks, each framed as `chunk id (i32 BE), byte length
//! (i32 BE), payload`. Strings are length-prefixed ASCII. The decoder
//! validates every cross-reference index against the bounds established
//! by sibling chunks; any failure aborts the whole read.
//!
//! ```no_run
//! use cueforge_binary::{read_image_from_path, dump};
//!
//! let image = read_image_from_path("project.cfb")?;
//! dump(&image, |line| println!("{}", line));
//! # Ok::<(), cueforge_binary::BinaryError>(())
//! ```
//!
//! # Modules
//!
//! - [`image`]: chunk model and wire constants
//! - [`reader`]: decoder with eager validation
//! - [`writer`]: encoder, mirroring the decoder's field order
//! - [`dump`](crate::dump()): human-readable listing through a line sink
//! - [`error`]: typed codec errors

pub mod dump;
pub mod error;
pub mod image;
pub mod reader;
pub mod writer;

mod stream;

pub use dump::{dump, dump_to_string, silent_sink};
pub use error::{BinaryError, BinaryResult};
pub use image::{
    BusParameters, Event, MixBus, MixPreset, PlaybackMode, ProjectImage, RetriggerMode, Sound,
    WaveBank, WaveReference, EVENT_CHUNK_ID, FILE_IDENTIFIER, MIX_BUS_CHUNK_ID,
    MIX_PRESET_CHUNK_ID, SOUND_CHUNK_ID, WAVE_BANK_CHUNK_ID,
};
pub use reader::{read_image, read_image_from_path};
pub use writer::{write_image, write_image_to_path};
