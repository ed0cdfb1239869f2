//! Source project model and compiler.
//!
//! Loads an authored audio project (a labeled tree of buses, presets,
//! wave banks, sounds and events) and compiles it into the engine's
//! binary image format, resolving every by-id reference to an array
//! index along the way.
//!
//! ```no_run
//! use cueforge_project::{compile, SourceTree};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let json = std::fs::read_to_string("project.json")?;
//! let (tree, root) = SourceTree::from_json_str(&json)?;
//! let image = compile(&tree, root)?;
//! cueforge_binary::write_image_to_path(&image, "project.cfb")?;
//! # Ok(())
//! # }
//! ```

pub mod compiler;
pub mod error;
pub mod names;
pub mod resolve;
pub mod tree;

pub use compiler::compile;
pub use error::{CompileError, CompileResult};
pub use resolve::{node_path, IdTable};
pub use tree::{walk, NodeId, SourceTree};
