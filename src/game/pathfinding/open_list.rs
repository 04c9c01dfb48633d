use super::node_pool::NodePool;
use super::types::NodeId;
use std::cmp::Ordering;

/// Binary min-heap of open nodes keyed by f.
///
/// Each node records its heap slot, so promoting a node after its f drops is
/// a sift-up from a known position instead of a linear scan.
///
/// Ordering is total and independent of memory layout: f ascending, then
/// (optionally) h ascending, then insertion order.
#[derive(Clone, Debug, Default)]
pub struct OpenList {
    heap: Vec<NodeId>,
    tie_break_on_h: bool,
}

impl OpenList {
    pub fn new(tie_break_on_h: bool) -> Self {
        Self { heap: Vec::new(), tie_break_on_h }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    fn cmp(&self, pool: &NodePool, a: NodeId, b: NodeId) -> Ordering {
        let na = pool.get(a);
        let nb = pool.get(b);
        let by_f = na.f.cmp(&nb.f);
        let by_h = if self.tie_break_on_h { na.h.cmp(&nb.h) } else { Ordering::Equal };
        by_f.then(by_h).then(na.seq.cmp(&nb.seq))
    }

    pub fn push(&mut self, pool: &mut NodePool, id: NodeId) {
        let slot = self.heap.len();
        self.heap.push(id);
        pool.get_mut(id).heap_slot = Some(slot);
        self.sift_up(pool, slot);
    }

    pub fn pop_min(&mut self, pool: &mut NodePool) -> Option<NodeId> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(pool, 0, last);
        let id = self.heap.pop()?;
        pool.get_mut(id).heap_slot = None;
        if !self.heap.is_empty() {
            self.sift_down(pool, 0);
        }
        Some(id)
    }

    /// Restore heap order after `id`'s f decreased in place.
    pub fn promote(&mut self, pool: &mut NodePool, id: NodeId) {
        if let Some(slot) = pool.get(id).heap_slot {
            self.sift_up(pool, slot);
        }
    }

    pub fn clear(&mut self, pool: &mut NodePool) {
        for &id in &self.heap {
            pool.get_mut(id).heap_slot = None;
        }
        self.heap.clear();
    }

    fn swap(&mut self, pool: &mut NodePool, a: usize, b: usize) {
        self.heap.swap(a, b);
        pool.get_mut(self.heap[a]).heap_slot = Some(a);
        pool.get_mut(self.heap[b]).heap_slot = Some(b);
    }

    fn sift_up(&mut self, pool: &mut NodePool, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if self.cmp(pool, self.heap[slot], self.heap[parent]) == Ordering::Less {
                self.swap(pool, slot, parent);
                slot = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, pool: &mut NodePool, mut slot: usize) {
        let len = self.heap.len();
        loop {
            let left = slot * 2 + 1;
            let right = left + 1;
            let mut smallest = slot;
            if left < len && self.cmp(pool, self.heap[left], self.heap[smallest]) == Ordering::Less {
                smallest = left;
            }
            if right < len && self.cmp(pool, self.heap[right], self.heap[smallest]) == Ordering::Less {
                smallest = right;
            }
            if smallest == slot {
                break;
            }
            self.swap(pool, slot, smallest);
            slot = smallest;
        }
    }
}
