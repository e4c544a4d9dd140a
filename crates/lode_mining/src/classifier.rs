//! # Ore Classification
//!
//! Decides which blocks can start a vein and which blocks belong to the
//! same vein. Depth variants (`deepslate_iron_ore`) are linked to their
//! base block by the [`BlockRegistry`] when it is built, so classification
//! here is an id lookup, not string work.

use std::collections::HashSet;
use std::sync::Arc;

use lode_shared::{BlockId, BlockRegistry};

/// Canonical ore class: the base block of a depth-variant family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OreClass(BlockId);

impl OreClass {
    /// The base block representing this class.
    #[must_use]
    pub const fn block(self) -> BlockId {
        self.0
    }
}

/// Eligibility and equivalence of block types.
///
/// Immutable after construction and cheap to clone.
#[derive(Clone, Debug)]
pub struct OreClassifier {
    registry: Arc<BlockRegistry>,
    eligible: Arc<HashSet<BlockId>>,
}

impl OreClassifier {
    /// Creates a classifier over a registry and an eligible set.
    #[must_use]
    pub fn new(registry: Arc<BlockRegistry>, eligible: impl IntoIterator<Item = BlockId>) -> Self {
        Self {
            registry,
            eligible: Arc::new(eligible.into_iter().collect()),
        }
    }

    /// Whether breaking `block` can start a vein.
    #[inline]
    #[must_use]
    pub fn is_eligible(&self, block: BlockId) -> bool {
        self.eligible.contains(&block)
    }

    /// Ore class of a block.
    #[inline]
    #[must_use]
    pub fn classify(&self, block: BlockId) -> OreClass {
        OreClass(self.registry.canonical(block))
    }

    /// Number of eligible block types.
    #[must_use]
    pub fn eligible_count(&self) -> usize {
        self.eligible.len()
    }

    /// The registry blocks are classified against.
    #[must_use]
    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    /// Builds the vein predicate for an origin block type.
    #[must_use]
    pub fn matcher(&self, origin: BlockId) -> VeinMatcher {
        VeinMatcher {
            classifier: self.clone(),
            origin,
            class: self.classify(origin),
        }
    }
}

/// Membership test for one vein, fixed at activation.
#[derive(Clone, Debug)]
pub struct VeinMatcher {
    classifier: OreClassifier,
    origin: BlockId,
    class: OreClass,
}

impl VeinMatcher {
    /// Block type the vein started from.
    #[must_use]
    pub const fn origin(&self) -> BlockId {
        self.origin
    }

    /// Ore class of the vein.
    #[must_use]
    pub const fn class(&self) -> OreClass {
        self.class
    }

    /// Whether `candidate` belongs to this vein.
    ///
    /// Exact type matches always count. Otherwise the candidate must share
    /// the origin's ore class and be eligible itself.
    #[inline]
    #[must_use]
    pub fn matches(&self, candidate: BlockId) -> bool {
        if candidate == self.origin {
            return true;
        }
        !candidate.is_air()
            && self.classifier.classify(candidate) == self.class
            && self.classifier.is_eligible(candidate)
    }
}
