use super::types::{AStarNode, NodeId, PoolStats};
use crate::game::error::NavError;
use crate::game::fixed_math::FixedNum;
use crate::game::types::TileCoord;

/// Arena of search nodes with a free list.
///
/// Nodes are handed out during a search and returned en masse by
/// [`NodePool::release_all`]; they are never freed one at a time. The arena
/// only grows, up to `max_nodes`.
#[derive(Clone, Debug)]
pub struct NodePool {
    nodes: Vec<AStarNode>,
    free: Vec<NodeId>,
    used: Vec<NodeId>,
    max_nodes: usize,
}

impl NodePool {
    pub fn new(max_nodes: usize) -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            used: Vec::new(),
            max_nodes,
        }
    }

    pub fn alloc(&mut self, tile: TileCoord, g: FixedNum, h: FixedNum, parent: Option<NodeId>) -> Result<NodeId, NavError> {
        let node = AStarNode::new(tile, g, h, parent);

        let id = if let Some(id) = self.free.pop() {
            self.nodes[id as usize] = node;
            id
        } else {
            if self.nodes.len() >= self.max_nodes {
                return Err(NavError::PoolExhausted { capacity: self.max_nodes });
            }
            self.nodes
                .try_reserve(1)
                .map_err(|_| NavError::PoolExhausted { capacity: self.nodes.len() })?;
            self.used
                .try_reserve(1)
                .map_err(|_| NavError::PoolExhausted { capacity: self.nodes.len() })?;
            let id = self.nodes.len() as NodeId;
            self.nodes.push(node);
            id
        };

        self.used.push(id);
        Ok(id)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &AStarNode {
        &self.nodes[id as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut AStarNode {
        &mut self.nodes[id as usize]
    }

    /// Return every node handed out since the last release.
    pub fn release_all(&mut self) {
        // Reverse so the next search pops ids in the same order as this one
        self.free.extend(self.used.drain(..).rev());
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            allocated: self.nodes.len(),
            free: self.free.len(),
            in_use: self.used.len(),
        }
    }

    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }
}
