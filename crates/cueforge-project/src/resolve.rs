//! Identity resolution: path ids and id-to-index lookup.

use std::collections::HashMap;

use crate::error::{CompileError, CompileResult};
use crate::names::ATTR_ID;
use crate::tree::{NodeId, SourceTree};

/// Computes a node's fully qualified path id: the `id` attributes of its
/// ancestors from just below `section_root` down to the node itself,
/// joined with `/`. The section root itself (the unnamed top-level group
/// a gather pass starts from) contributes nothing.
pub fn node_path(
    tree: &SourceTree,
    node: NodeId,
    section_root: NodeId,
) -> CompileResult<String> {
    let mut ids = Vec::new();
    let mut current = Some(node);
    while let Some(n) = current {
        if n == section_root {
            break;
        }
        ids.push(tree.require_attr(n, ATTR_ID)?);
        current = tree.parent(n);
    }
    ids.reverse();
    Ok(ids.join("/"))
}

/// Id-to-index mapping for one gathered chunk array.
///
/// Built once per array after its gather pass completes; lookups are then
/// independent of array size. On duplicate ids the first index wins,
/// matching first-match resolution semantics.
#[derive(Debug)]
pub struct IdTable {
    kind: &'static str,
    indices: HashMap<String, usize>,
}

impl IdTable {
    /// Builds a table over ids in array order.
    pub fn new<'a>(kind: &'static str, ids: impl IntoIterator<Item = &'a str>) -> Self {
        let mut indices = HashMap::new();
        for (index, id) in ids.into_iter().enumerate() {
            indices.entry(id.to_string()).or_insert(index);
        }
        Self { kind, indices }
    }

    /// Resolves an id to its array index.
    ///
    /// A miss means the referencing entity names something that was never
    /// gathered, which is a referential-integrity defect in the source
    /// data; the error carries both sides of the broken link.
    pub fn resolve(&self, entity: &str, id: &str) -> CompileResult<usize> {
        self.indices
            .get(id)
            .copied()
            .ok_or_else(|| CompileError::UnknownReference {
                entity: entity.to_string(),
                kind: self.kind,
                referenced: id.to_string(),
            })
    }
}
