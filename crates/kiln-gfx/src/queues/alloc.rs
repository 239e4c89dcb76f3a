use crate::adapter::QueueFamily;

use super::{QueueRole, RoleCounts, RoleSet};

/// Result of mapping role demand onto a family table.
///
/// Always usable: when the topology cannot host every role on its own queue,
/// roles share concrete queues and [`satisfied`](QueuePlan::satisfied) turns
/// false. Callers must treat a shared mapping as a valid reduced-parallelism
/// mode, not an error.
#[derive(Debug, Clone, Default)]
pub struct QueuePlan {
    satisfied: bool,
    assignments: [Vec<(u32, u32)>; QueueRole::COUNT],
}

impl QueuePlan {
    /// True when every role got dedicated queues without duplication
    /// (possibly after the allocator reduced per-role counts toward 1).
    pub fn satisfied(&self) -> bool {
        self.satisfied
    }

    /// `(family_index, index_in_family)` pairs committed for `role`.
    pub fn role(&self, role: QueueRole) -> &[(u32, u32)] {
        &self.assignments[role.index()]
    }

    /// Distinct queues to create per family, in family order.
    ///
    /// This is what the device-creation layer feeds into its per-family
    /// queue-create counts; duplicated role mappings collapse to one queue.
    pub fn family_counts(&self) -> Vec<(u32, u32)> {
        let mut counts: std::collections::BTreeMap<u32, u32> = Default::default();
        for pairs in &self.assignments {
            for &(family, index) in pairs {
                let entry = counts.entry(family).or_insert(0);
                *entry = (*entry).max(index + 1);
            }
        }
        counts.into_iter().collect()
    }
}

/// Per-family allocation state during an attempt.
type FamilyAlloc = Vec<RoleCounts>;

/// Maps `requested` per-role queue counts onto `families`.
///
/// `support` is the external per-(family, role) predicate; it refines each
/// family's declared role bitset, in particular pruning present support from
/// families that cannot present to a registered surface.
///
/// The allocator never fails. It first tries dedicated queues (a compact
/// pass committing whole families, then a round-robin sweep), then trades
/// per-role parallelism for feasibility by stepwise reducing requested
/// counts toward 1, and finally shares already-committed queues for any role
/// still unmet. A role no family supports at all is logged per role and left
/// unmapped.
pub fn allocate(
    requested: RoleCounts,
    families: &[QueueFamily],
    support: impl Fn(u32, QueueRole) -> bool,
) -> QueuePlan {
    let real_support: Vec<RoleSet> = families
        .iter()
        .enumerate()
        .map(|(index, family)| {
            let mut roles = RoleSet::empty();
            for role in family.roles.roles() {
                if support(index as u32, role) {
                    roles |= role.mask();
                }
            }
            roles
        })
        .collect();

    // Dedicated-queue attempts, trading parallelism for feasibility.
    let mut counts = requested;
    let mut reduce_cursor = 0;
    let (satisfied, alloc) = loop {
        let (ok, alloc) = try_allocate(counts, families, &real_support);
        if ok {
            break (true, alloc);
        }
        let mut reduced = false;
        for step in 0..QueueRole::COUNT {
            let role = QueueRole::ALL[(reduce_cursor + step) % QueueRole::COUNT];
            if counts[role] > 1 {
                counts[role] -= 1;
                reduce_cursor = (reduce_cursor + step + 1) % QueueRole::COUNT;
                log::debug!(
                    "queue allocation failed, retrying with {} x{}",
                    role.name(),
                    counts[role]
                );
                reduced = true;
                break;
            }
        }
        if !reduced {
            break (false, alloc);
        }
    };

    // Concrete (family, index) pairs in family order, then role order.
    let mut plan = QueuePlan {
        satisfied,
        ..Default::default()
    };
    let mut next_index = vec![0u32; families.len()];
    for (family, family_alloc) in alloc.iter().enumerate() {
        for role in QueueRole::ALL {
            for _ in 0..family_alloc[role] {
                plan.assignments[role.index()].push((family as u32, next_index[family]));
                next_index[family] += 1;
            }
        }
    }

    // Best-effort fallback: unmet roles share a queue of a supporting family.
    if !satisfied {
        for role in QueueRole::ALL {
            let committed = plan.assignments[role.index()].len() as u32;
            if committed >= counts[role] {
                continue;
            }
            let supporting = |&family: &usize| {
                real_support[family].contains(role.mask()) && families[family].count > 0
            };
            let reuse = (0..families.len())
                .find(|family| supporting(family) && next_index[*family] > 0)
                .or_else(|| (0..families.len()).find(supporting));
            match reuse {
                Some(family) => {
                    log::warn!(
                        "not enough queues for {}, sharing queue 0 of family {}",
                        role.name(),
                        family
                    );
                    for _ in committed..counts[role] {
                        plan.assignments[role.index()].push((family as u32, 0));
                    }
                }
                None => {
                    if counts[role] > 0 {
                        log::error!("no queue family supports {}", role.name());
                    }
                }
            }
        }
    }

    for role in QueueRole::ALL {
        if requested[role] > 0 {
            log::info!(
                "queue plan: {} -> {:?}",
                role.name(),
                plan.assignments[role.index()]
            );
        }
    }
    plan
}

/// One dedicated-queue attempt for the given per-role counts.
///
/// Returns the (possibly partial) per-family allocation either way so the
/// fallback path can reuse what the failed attempt committed.
fn try_allocate(
    counts: RoleCounts,
    families: &[QueueFamily],
    real_support: &[RoleSet],
) -> (bool, FamilyAlloc) {
    let mut remaining = counts;
    let mut alloc: FamilyAlloc = vec![RoleCounts::new(); families.len()];
    if families.is_empty() {
        return (remaining.is_zero(), alloc);
    }

    // Compact pass: commit whole families whose supported demand fits their
    // capacity, most specialized families first so narrow families are
    // claimed before generalists.
    let mut order: Vec<usize> = (0..families.len()).collect();
    order.sort_by_key(|&family| {
        (
            real_support[family].bits().count_ones(),
            families[family].count,
            family,
        )
    });
    for family in order {
        let demand: u32 = real_support[family]
            .roles()
            .map(|role| remaining[role])
            .sum();
        if demand == 0 || demand > families[family].count {
            continue;
        }
        for role in real_support[family].roles() {
            alloc[family][role] = remaining[role];
            remaining[role] = 0;
        }
    }

    // Sweep pass: round-robin leftover demand over leftover capacity, role
    // by role. Two full placement-free wraps mean the attempt is stuck.
    let mut used: Vec<u32> = alloc.iter().map(RoleCounts::total).collect();
    let mut cursor = 0;
    for role in QueueRole::ALL {
        let mut idle_steps = 0;
        while remaining[role] > 0 {
            if idle_steps >= families.len() * 2 {
                return (false, alloc);
            }
            let family = cursor % families.len();
            cursor += 1;
            if real_support[family].contains(role.mask()) && used[family] < families[family].count
            {
                alloc[family][role] += 1;
                used[family] += 1;
                remaining[role] -= 1;
                idle_steps = 0;
            } else {
                idle_steps += 1;
            }
        }
    }

    (true, alloc)
}
