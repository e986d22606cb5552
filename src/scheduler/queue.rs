use std::collections::HashMap;

use uuid::Uuid;

use crate::scheduler::item::{ItemSpec, ItemStatus, WorkItem};

const DEFAULT_MAX_PENDING: usize = 10_000;

/// Holds every live item, pending or assigned.
///
/// An item leaves the store exactly once: through [`ItemQueue::remove`],
/// driven by completion or by explicit cancellation. Nothing is dropped
/// silently.
#[derive(Debug)]
pub struct ItemQueue {
    items: HashMap<Uuid, WorkItem>,
    next_seq: u64,
    max_pending: usize,
}

impl Default for ItemQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemQueue {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_PENDING)
    }

    pub fn with_capacity(max_pending: usize) -> Self {
        Self {
            items: HashMap::new(),
            next_seq: 0,
            max_pending,
        }
    }

    /// Add a new pending item. Returns `None` when the pending set is at
    /// capacity.
    pub fn enqueue(&mut self, spec: ItemSpec) -> Option<Uuid> {
        if self.pending_len() >= self.max_pending {
            return None;
        }
        let item = WorkItem::new(self.next_seq, spec);
        self.next_seq += 1;
        let id = item.id;
        self.items.insert(id, item);
        Some(id)
    }

    pub fn get(&self, id: &Uuid) -> Option<&WorkItem> {
        self.items.get(id)
    }

    /// True while `item`'s upstream is still live (queued or running), in
    /// which case the item sits out the current match pass but stays pending.
    pub fn is_blocked(&self, item: &WorkItem) -> bool {
        item.blocked_by
            .map(|upstream| self.items.contains_key(&upstream))
            .unwrap_or(false)
    }

    /// Pending items in submission order.
    pub fn pending_items(&self) -> Vec<&WorkItem> {
        let mut pending: Vec<&WorkItem> = self.items.values().filter(|i| i.is_pending()).collect();
        pending.sort_by_key(|i| i.seq);
        pending
    }

    /// Every live item in submission order.
    pub fn all_items(&self) -> Vec<&WorkItem> {
        let mut items: Vec<&WorkItem> = self.items.values().collect();
        items.sort_by_key(|i| i.seq);
        items
    }

    /// Move a pending item to `Assigned` on `node`. Returns false if the
    /// item is unknown or already assigned.
    pub fn assign(&mut self, id: &Uuid, node: &str) -> bool {
        match self.items.get_mut(id) {
            Some(item) if item.is_pending() => {
                item.status = ItemStatus::Assigned;
                item.assigned_node = Some(node.to_string());
                true
            }
            _ => false,
        }
    }

    /// Take an item out of the store (completion or cancellation).
    pub fn remove(&mut self, id: &Uuid) -> Option<WorkItem> {
        self.items.remove(id)
    }

    pub fn pending_len(&self) -> usize {
        self.items.values().filter(|i| i.is_pending()).count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
