use serde::Serialize;
use uuid::Uuid;

use crate::scheduler::pool::{NodePool, NodeState};
use crate::scheduler::queue::ItemQueue;

/// One (item, node) pairing produced by a match pass. The caller dispatches
/// the actual execution after the scheduler lock is released.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub item: Uuid,
    pub node: String,
}

/// Run the assignment algorithm until a full sweep makes no progress.
///
/// Per sweep, each idle node (registration order) takes the earliest
/// submitted pending item it is eligible for: not blocked on a live
/// upstream, and its expression satisfied by the node's labels. Assignment
/// is atomic within the sweep: item goes `Assigned`, node goes `Busy`, so
/// a node never takes a second item and an item never wins twice. Nodes
/// with no compatible work are left idle.
pub fn run_match_pass(pool: &mut NodePool, queue: &mut ItemQueue) -> Vec<Assignment> {
    let mut assignments = Vec::new();

    loop {
        let mut progressed = false;
        let idle: Vec<String> = pool.idle_nodes().map(|n| n.name().to_string()).collect();

        for name in idle {
            let winner = {
                let Some(node) = pool.get(&name) else { continue };
                if node.state() != NodeState::Idle {
                    continue;
                }
                queue
                    .pending_items()
                    .into_iter()
                    .filter(|item| !queue.is_blocked(item))
                    .find(|item| node.accepts(item.expr.as_ref()))
                    .map(|item| item.id)
            };

            if let Some(item) = winner {
                queue.assign(&item, &name);
                pool.set_state(&name, NodeState::Busy);
                tracing::info!(item = %item, node = %name, "item assigned");
                assignments.push(Assignment { item, node: name });
                progressed = true;
            }
        }

        if !progressed {
            break;
        }
    }

    assignments
}
