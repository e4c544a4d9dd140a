//! # Block Registry
//!
//! Maps block names to compact [`BlockId`]s and records which blocks are
//! depth variants of another block ("deepslate_iron_ore" is a variant of
//! "iron_ore").
//!
//! The variant relation is resolved once, when the registry is built, so
//! gameplay code compares ids instead of matching name prefixes.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::constants::AIR_NAME;

/// Compact identity of a block kind.
#[repr(transparent)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable, Serialize,
    Deserialize,
)]
pub struct BlockId(pub u16);

impl BlockId {
    /// The empty block.
    pub const AIR: Self = Self(0);

    /// Returns true for the empty block.
    #[inline]
    #[must_use]
    pub const fn is_air(self) -> bool {
        self.0 == 0
    }
}

/// Definition of a registered block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockDef {
    /// Block name, e.g. `"iron_ore"`.
    pub name: String,
    /// The block this one is a depth variant of, if any.
    pub variant_of: Option<BlockId>,
}

/// Registry of all block kinds known to the server.
///
/// Built at startup, read-only afterwards. Share it behind an `Arc`.
#[derive(Clone, Debug)]
pub struct BlockRegistry {
    defs: Vec<BlockDef>,
    by_name: HashMap<String, BlockId>,
}

impl BlockRegistry {
    /// Creates a registry containing only air.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            defs: Vec::with_capacity(64),
            by_name: HashMap::with_capacity(64),
        };
        registry.register(AIR_NAME);
        registry
    }

    /// Creates a registry from a list of names and links depth variants.
    #[must_use]
    pub fn with_blocks<'a>(
        names: impl IntoIterator<Item = &'a str>,
        depth_variant_prefixes: &[String],
    ) -> Self {
        let mut registry = Self::new();
        for name in names {
            registry.register(name);
        }
        registry.link_depth_variants(depth_variant_prefixes);
        registry
    }

    /// Registers a block name, returning its id.
    ///
    /// Registering an existing name returns the existing id.
    pub fn register(&mut self, name: &str) -> BlockId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = BlockId(self.defs.len() as u16);
        self.defs.push(BlockDef {
            name: name.to_owned(),
            variant_of: None,
        });
        self.by_name.insert(name.to_owned(), id);
        id
    }

    /// Links every block whose name starts with one of `prefixes` to the
    /// block named by the remainder, when that block is registered.
    ///
    /// Only a single prefix is stripped.
    pub fn link_depth_variants(&mut self, prefixes: &[String]) {
        for index in 0..self.defs.len() {
            let base = prefixes.iter().find_map(|prefix| {
                self.defs[index]
                    .name
                    .strip_prefix(prefix.as_str())
                    .and_then(|rest| self.by_name.get(rest).copied())
            });
            if let Some(base) = base {
                self.defs[index].variant_of = Some(base);
            }
        }
    }

    /// Looks up a block id by name.
    #[must_use]
    pub fn id(&self, name: &str) -> Option<BlockId> {
        self.by_name.get(name).copied()
    }

    /// Returns the definition of a block.
    #[must_use]
    pub fn def(&self, id: BlockId) -> Option<&BlockDef> {
        self.defs.get(usize::from(id.0))
    }

    /// Returns the name of a block, or `"unknown"` for unregistered ids.
    #[must_use]
    pub fn name(&self, id: BlockId) -> &str {
        self.def(id).map_or("unknown", |def| def.name.as_str())
    }

    /// Returns the block `id` is a depth variant of, or `id` itself.
    #[inline]
    #[must_use]
    pub fn canonical(&self, id: BlockId) -> BlockId {
        self.def(id).and_then(|def| def.variant_of).unwrap_or(id)
    }

    /// Number of registered blocks (air included).
    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Always false: air is registered on creation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}
