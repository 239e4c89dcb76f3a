//! Abstract device and instance descriptions.
//!
//! This core never talks to a graphics driver. The binding layer enumerates
//! the platform and hands over plain descriptions: which layers and
//! extensions exist at each scope, which feature bits and limits a device
//! reports, and its queue-family table. Negotiation and planning operate on
//! these values only.

mod score;

pub use score::{pick_best, score_adapter};

use crate::queues::{QueueRole, RoleCounts, RoleSet};

/// Broad device class, used only for adapter scoring.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum DeviceType {
    Discrete,
    Integrated,
    Virtual,
    Cpu,
    #[default]
    Other,
}

/// Property subset consulted during negotiation and scoring.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdapterLimits {
    pub max_image_dimension_2d: u32,
    pub max_sampler_anisotropy: f32,
    /// Bitmask of supported color sample counts, power-of-two convention
    /// (one bit each for 1, 2, 4, ... 64 samples).
    pub framebuffer_color_sample_counts: u32,
    /// Bitmask of supported depth sample counts, same convention.
    pub framebuffer_depth_sample_counts: u32,
}

impl AdapterLimits {
    /// True when both color and depth framebuffers support `samples`.
    pub fn supports_sample_count(&self, samples: u32) -> bool {
        samples.is_power_of_two()
            && self.framebuffer_color_sample_counts & samples != 0
            && self.framebuffer_depth_sample_counts & samples != 0
    }
}

/// Boolean device feature bits relevant to the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureBits {
    pub sampler_anisotropy: bool,
    pub sample_rate_shading: bool,
    pub geometry_shader: bool,
    pub tessellation_shader: bool,
}

impl FeatureBits {
    /// True when every bit set in `other` is also set in `self`.
    pub fn contains(&self, other: &FeatureBits) -> bool {
        (self.sampler_anisotropy || !other.sampler_anisotropy)
            && (self.sample_rate_shading || !other.sample_rate_shading)
            && (self.geometry_shader || !other.geometry_shader)
            && (self.tessellation_shader || !other.tessellation_shader)
    }
}

/// One device-reported queue family.
#[derive(Debug, Clone, Copy)]
pub struct QueueFamily {
    pub count: u32,
    pub roles: RoleSet,
}

/// Everything negotiation needs to know about one physical device.
#[derive(Debug, Clone, Default)]
pub struct AdapterInfo {
    pub name: String,
    pub device_type: DeviceType,
    pub limits: AdapterLimits,
    pub features: FeatureBits,
    pub layers: Vec<String>,
    pub extensions: Vec<String>,
    pub families: Vec<QueueFamily>,
}

impl AdapterInfo {
    pub fn has_layer(&self, name: &str) -> bool {
        self.layers.iter().any(|layer| layer == name)
    }

    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.iter().any(|extension| extension == name)
    }

    /// Total queues per role across every family, before surface pruning.
    pub fn queues_total(&self) -> RoleCounts {
        let mut totals = RoleCounts::new();
        for family in &self.families {
            for role in family.roles.roles() {
                totals[role] += family.count;
            }
        }
        totals
    }

    /// Families able to serve `role` per the declared bitsets.
    pub fn families_for(&self, role: QueueRole) -> impl Iterator<Item = u32> + '_ {
        self.families
            .iter()
            .enumerate()
            .filter(move |(_, family)| family.roles.contains(role.mask()))
            .map(|(index, _)| index as u32)
    }
}

/// Instance-scope capabilities reported by the driver loader.
#[derive(Debug, Clone, Default)]
pub struct InstanceCaps {
    pub layers: Vec<String>,
    pub extensions: Vec<String>,
}

impl InstanceCaps {
    pub fn has_layer(&self, name: &str) -> bool {
        self.layers.iter().any(|layer| layer == name)
    }

    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.iter().any(|extension| extension == name)
    }
}
