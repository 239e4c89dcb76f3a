use std::ops::{Index, IndexMut};

use bitflags::bitflags;

/// Abstract purpose a hardware queue is used for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum QueueRole {
    Graphics,
    Present,
    Transfer,
    Compute,
}

impl QueueRole {
    pub const COUNT: usize = 4;

    pub const ALL: [QueueRole; Self::COUNT] = [
        QueueRole::Graphics,
        QueueRole::Present,
        QueueRole::Transfer,
        QueueRole::Compute,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            QueueRole::Graphics => "graphics",
            QueueRole::Present => "present",
            QueueRole::Transfer => "transfer",
            QueueRole::Compute => "compute",
        }
    }

    pub const fn mask(self) -> RoleSet {
        match self {
            QueueRole::Graphics => RoleSet::GRAPHICS,
            QueueRole::Present => RoleSet::PRESENT,
            QueueRole::Transfer => RoleSet::TRANSFER,
            QueueRole::Compute => RoleSet::COMPUTE,
        }
    }
}

bitflags! {
    /// Set of roles a queue family can serve.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
    pub struct RoleSet: u8 {
        const GRAPHICS = 1 << 0;
        const PRESENT  = 1 << 1;
        const TRANSFER = 1 << 2;
        const COMPUTE  = 1 << 3;
    }
}

impl RoleSet {
    /// Roles present in the set, in canonical role order.
    pub fn roles(self) -> impl Iterator<Item = QueueRole> {
        QueueRole::ALL
            .into_iter()
            .filter(move |role| self.contains(role.mask()))
    }
}

/// Per-role queue counts.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RoleCounts([u32; QueueRole::COUNT]);

impl RoleCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `other` role by role.
    pub fn add(&mut self, other: RoleCounts) {
        for role in QueueRole::ALL {
            self.0[role.index()] += other.0[role.index()];
        }
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    pub fn is_zero(&self) -> bool {
        self.total() == 0
    }

    /// `(role, count)` pairs in canonical role order.
    pub fn iter(&self) -> impl Iterator<Item = (QueueRole, u32)> + '_ {
        QueueRole::ALL.into_iter().map(|role| (role, self.0[role.index()]))
    }

    /// True when every count in `self` is covered by `avail`.
    pub fn fits_within(&self, avail: &RoleCounts) -> bool {
        QueueRole::ALL
            .into_iter()
            .all(|role| self.0[role.index()] <= avail.0[role.index()])
    }
}

impl Index<QueueRole> for RoleCounts {
    type Output = u32;

    fn index(&self, role: QueueRole) -> &u32 {
        &self.0[role.index()]
    }
}

impl IndexMut<QueueRole> for RoleCounts {
    fn index_mut(&mut self, role: QueueRole) -> &mut u32 {
        &mut self.0[role.index()]
    }
}

impl From<[(QueueRole, u32); QueueRole::COUNT]> for RoleCounts {
    fn from(pairs: [(QueueRole, u32); QueueRole::COUNT]) -> Self {
        let mut counts = RoleCounts::new();
        for (role, count) in pairs {
            counts[role] += count;
        }
        counts
    }
}
