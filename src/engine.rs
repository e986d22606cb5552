use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{oneshot, Mutex};
use uuid::Uuid;

use crate::config::SchedulerConfig;
use crate::error::{Result, SchedulerError};
use crate::label::{Atom, LabelRegistry};
use crate::scheduler::{
    run_match_pass, ItemQueue, ItemSpec, NodePool, NodeState, WorkItem,
};

/// Handle returned by [`Scheduler::submit`], resolved with the chosen node's
/// identity once the item is assigned.
pub struct SubmitHandle {
    id: Uuid,
    rx: oneshot::Receiver<String>,
}

impl SubmitHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Wait until the item is assigned; yields the node it landed on.
    /// Resolves with `Cancelled` if the item was cancelled first.
    pub async fn assigned(self) -> Result<String> {
        self.rx.await.map_err(|_| SchedulerError::Cancelled)
    }
}

struct Core {
    pool: NodePool,
    queue: ItemQueue,
    waiters: HashMap<Uuid, oneshot::Sender<String>>,
}

impl Core {
    /// Run one match pass and resolve the handles of everything assigned.
    /// oneshot sends never block, so doing this under the lock is fine;
    /// actual execution is whatever the handle's owner does afterwards.
    fn match_and_notify(&mut self) {
        for assignment in run_match_pass(&mut self.pool, &mut self.queue) {
            if let Some(tx) = self.waiters.remove(&assignment.item) {
                let _ = tx.send(assignment.node);
            }
        }
    }
}

/// The assignment engine: a node pool and an item queue behind one mutex.
///
/// Every trigger (submission, a node turning idle, completion) takes the
/// lock, mutates state, and runs a match pass before releasing it, which
/// makes assignment exactly-once per item and at-most-one-item per node
/// even under racing callers. Clones share the same scheduler.
#[derive(Clone)]
pub struct Scheduler {
    registry: Arc<LabelRegistry>,
    core: Arc<Mutex<Core>>,
}

impl Scheduler {
    pub fn new(registry: Arc<LabelRegistry>) -> Self {
        Self::with_config(registry, SchedulerConfig::default())
    }

    pub fn with_config(registry: Arc<LabelRegistry>, config: SchedulerConfig) -> Self {
        Self {
            registry,
            core: Arc::new(Mutex::new(Core {
                pool: NodePool::new(),
                queue: ItemQueue::with_capacity(config.max_pending),
                waiters: HashMap::new(),
            })),
        }
    }

    /// The label universe this scheduler interns atoms into.
    pub fn registry(&self) -> &LabelRegistry {
        &self.registry
    }

    /// Register a node with its static label set. The node starts idle, so
    /// this immediately triggers a match pass.
    pub async fn register_node(
        &self,
        name: &str,
        labels: impl IntoIterator<Item = Atom>,
    ) -> Result<()> {
        let mut core = self.core.lock().await;
        if !core.pool.register(&self.registry, name, labels) {
            return Err(SchedulerError::DuplicateNode(name.to_string()));
        }
        core.match_and_notify();
        Ok(())
    }

    /// Convenience: register a node with labels given as plain names.
    pub async fn register_node_with(&self, name: &str, labels: &[&str]) -> Result<()> {
        let atoms: Vec<Atom> = labels.iter().map(|l| self.registry.atom(l)).collect();
        self.register_node(name, atoms).await
    }

    /// Decommission a node. An item already assigned to it stays with its
    /// executor; its completion later is simply no longer the pool's
    /// concern.
    pub async fn remove_node(&self, name: &str) -> Result<()> {
        let mut core = self.core.lock().await;
        core.pool
            .remove(name)
            .ok_or_else(|| SchedulerError::NodeNotFound(name.to_string()))?;
        Ok(())
    }

    /// Externally force a node idle or busy. Going idle triggers a pass.
    pub async fn set_node_state(&self, name: &str, state: NodeState) -> Result<()> {
        let mut core = self.core.lock().await;
        if !core.pool.set_state(name, state) {
            return Err(SchedulerError::NodeNotFound(name.to_string()));
        }
        if state == NodeState::Idle {
            core.match_and_notify();
        }
        Ok(())
    }

    /// Submit an item. Returns a handle resolved when the item is assigned.
    /// The submitter is never blocked waiting for a node: if nothing is
    /// eligible right now the item just sits pending.
    pub async fn submit(&self, spec: ItemSpec) -> Result<SubmitHandle> {
        let mut core = self.core.lock().await;
        let id = core
            .queue
            .enqueue(spec)
            .ok_or_else(|| SchedulerError::QueueFull(core.queue.pending_len()))?;
        tracing::debug!(item = %id, "item submitted");

        let (tx, rx) = oneshot::channel();
        core.waiters.insert(id, tx);
        core.match_and_notify();
        Ok(SubmitHandle { id, rx })
    }

    /// Submit with the expression given as text; parse failures are
    /// reported to the submitter and nothing is enqueued.
    pub async fn submit_expr(&self, expr: &str) -> Result<SubmitHandle> {
        let expr = self.registry.parse(expr)?;
        self.submit(ItemSpec::labeled(expr)).await
    }

    /// Cancel a still-pending item. Returns true if it was removed; false
    /// if the cancellation lost the race (already assigned) or the item is
    /// already gone; in both cases the cancel is a no-op.
    pub async fn cancel(&self, id: Uuid) -> Result<bool> {
        let mut core = self.core.lock().await;
        let still_pending = core.queue.get(&id).map(WorkItem::is_pending).unwrap_or(false);
        if !still_pending {
            return Ok(false);
        }
        core.queue.remove(&id);
        core.waiters.remove(&id);
        tracing::info!(item = %id, "item cancelled");
        Ok(true)
    }

    /// Report that an assigned item finished. Frees its node and runs a
    /// match pass so waiting work can take the slot.
    ///
    /// Only assigned items can complete: a pending item leaves the queue
    /// through assignment or its owner's cancellation, nothing else.
    pub async fn mark_completed(&self, id: Uuid) -> Result<()> {
        let mut core = self.core.lock().await;
        match core.queue.get(&id) {
            None => return Err(SchedulerError::ItemNotFound(id)),
            Some(item) if item.is_pending() => {
                return Err(SchedulerError::ItemNotAssigned(id));
            }
            Some(_) => {}
        }
        let item = core
            .queue
            .remove(&id)
            .ok_or(SchedulerError::ItemNotFound(id))?;
        core.waiters.remove(&id);

        if let Some(node) = &item.assigned_node {
            if core.pool.set_state(node, NodeState::Idle) {
                tracing::info!(item = %id, node = %node, "item completed");
            } else {
                // node was decommissioned while the item ran
                tracing::debug!(item = %id, node = %node, "completed on removed node");
            }
        }
        core.match_and_notify();
        Ok(())
    }

    /// Snapshot of live items in submission order.
    pub async fn items(&self) -> Vec<WorkItem> {
        let core = self.core.lock().await;
        core.queue.all_items().into_iter().cloned().collect()
    }

    /// Current state of a node, if registered.
    pub async fn node_state(&self, name: &str) -> Option<NodeState> {
        let core = self.core.lock().await;
        core.pool.get(name).map(|n| n.state())
    }
}
