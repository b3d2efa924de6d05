//! Linked view of the collection hierarchy.

use schema::{CapabilityTable, Usage, UsagePage};
use tracing::trace;

use crate::error::{HidpError, HidpResult};

/// A collection node with its tree links resolved.
///
/// Link fields hold node indices; 0 means "none" except for `parent`, where
/// the top-level node is its own parent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionNode {
    pub usage_page: UsagePage,
    pub usage: Usage,
    pub parent: u16,
    pub child_count: u16,
    pub next_sibling: u16,
    pub first_child: u16,
    pub collection_type: u8,
}

/// Writes the collection hierarchy into `nodes` and returns the node count.
///
/// Children are linked in a single forward pass, so each parent's
/// `first_child` is its last declared child and siblings chain backwards in
/// declaration order.
///
/// # Errors
///
/// - [`HidpError::InvalidPreparsedData`] if the table is untagged or a
///   parent does not precede its child.
/// - [`HidpError::BufferTooSmall`] with the node count if `nodes` is short;
///   nothing is written.
pub fn get_link_collection_nodes(
    table: &CapabilityTable,
    nodes: &mut [CollectionNode],
) -> HidpResult<usize> {
    trace!(nodes_len = nodes.len(), "get_link_collection_nodes");

    if !table.is_valid() {
        return Err(HidpError::InvalidPreparsedData);
    }
    let defs = table.collections();
    if nodes.len() < defs.len() {
        return Err(HidpError::BufferTooSmall {
            required: defs.len(),
        });
    }

    for (i, def) in defs.iter().enumerate() {
        let index = u16::try_from(i).map_err(|_| HidpError::InvalidPreparsedData)?;
        nodes[i] = CollectionNode {
            usage_page: def.usage_page,
            usage: def.usage,
            parent: def.parent,
            collection_type: def.collection_type,
            ..CollectionNode::default()
        };
        if i == 0 {
            continue;
        }

        let parent = usize::from(def.parent);
        if parent >= i {
            return Err(HidpError::InvalidPreparsedData);
        }
        nodes[i].next_sibling = nodes[parent].first_child;
        nodes[parent].first_child = index;
        nodes[parent].child_count += 1;
    }
    Ok(defs.len())
}
