use crate::adapter::{AdapterInfo, InstanceCaps};
use crate::queues::RoleCounts;

use super::{DeviceRequest, FeatureId, FeatureSpec, PlatformCaps, feature_spec};

/// Per-context feature negotiation state.
///
/// One registry per graphics context; nothing here is global. The registry
/// tracks six feature sets:
///
/// - `required`: hard requirements; missing prerequisites are reported but
///   the request still carries them, deferring failure to device creation.
/// - `candidate`: eligible at instance scope. Pruned by phase 1.
/// - `defaults`: auto-on when available.
/// - `user_enabled` / `user_disabled`: explicit overrides; disable wins.
/// - `enabled`: the final per-device resolution computed by phase 2.
///
/// All sets are insertion-ordered and de-duplicated so negotiation output
/// is deterministic.
pub struct FeatureRegistry {
    platform: PlatformCaps,
    required: Vec<FeatureId>,
    candidate: Vec<FeatureId>,
    defaults: Vec<FeatureId>,
    user_enabled: Vec<FeatureId>,
    user_disabled: Vec<FeatureId>,
    enabled: Vec<FeatureId>,
}

impl FeatureRegistry {
    pub fn new(platform: PlatformCaps) -> Self {
        let mut registry = Self {
            platform,
            required: Vec::new(),
            candidate: Vec::new(),
            defaults: Vec::new(),
            user_enabled: Vec::new(),
            user_disabled: Vec::new(),
            enabled: Vec::new(),
        };

        for id in FeatureId::PUBLIC {
            add_unique(&mut registry.candidate, id);
        }
        // Housekeeping features ride along silently when available.
        add_unique(&mut registry.candidate, FeatureId::PortabilitySubset);
        add_unique(&mut registry.defaults, FeatureId::PortabilitySubset);
        if cfg!(debug_assertions) {
            add_unique(&mut registry.candidate, FeatureId::DebugUtils);
            add_unique(&mut registry.defaults, FeatureId::DebugUtils);
        }
        registry
    }

    /// Marks a feature as a hard requirement (and therefore a default-on
    /// candidate, preserving `required ⊆ candidate`).
    pub fn require(&mut self, id: FeatureId) {
        add_unique(&mut self.required, id);
        add_unique(&mut self.candidate, id);
        add_unique(&mut self.defaults, id);
    }

    /// Requests a feature. Fails without state change when the feature is
    /// not an instance-scope candidate (unknown or pruned by phase 1).
    pub fn enable(&mut self, id: FeatureId) -> bool {
        if !self.candidate.contains(&id) {
            return false;
        }
        add_unique(&mut self.user_enabled, id);
        remove(&mut self.user_disabled, id);
        true
    }

    /// Vetoes a feature. Always succeeds; disable wins over enable.
    pub fn disable(&mut self, id: FeatureId) {
        remove(&mut self.user_enabled, id);
        add_unique(&mut self.user_disabled, id);
    }

    pub fn features_required(&self) -> Vec<FeatureId> {
        self.required.clone()
    }

    pub fn features_enabled(&self) -> Vec<FeatureId> {
        self.enabled.clone()
    }

    /// Membership in the final resolved set. False before phase 2 runs.
    pub fn feature_enabled(&self, id: FeatureId) -> bool {
        self.enabled.contains(&id)
    }

    pub fn is_candidate(&self, id: FeatureId) -> bool {
        self.candidate.contains(&id)
    }

    /// Queue demand implied by the required set.
    pub fn queues_required(&self) -> RoleCounts {
        self.fold_queues(&self.required)
    }

    /// Queue demand implied by the resolved enabled set.
    pub fn queues_enabled(&self) -> RoleCounts {
        self.fold_queues(&self.enabled)
    }

    pub fn spec(&self, id: FeatureId) -> FeatureSpec {
        feature_spec(id, &self.platform)
    }

    /// Phase 1: instance-scope negotiation, run once per context.
    ///
    /// Required features with missing instance prerequisites are reported
    /// and kept in the request; candidates with missing prerequisites are
    /// dropped from `candidate` and `defaults`.
    pub fn negotiate_instance(&mut self, caps: &InstanceCaps) -> DeviceRequest {
        let mut request = DeviceRequest::default();

        for id in self.required.clone() {
            let spec = self.spec(id);
            if !spec.instance_available(caps) {
                log::error!(
                    "feature {} is required but not available on instance",
                    id.name()
                );
            }
            // Device creation downstream will surface the real failure.
            request.merge(&spec);
        }

        for id in self.candidate.clone() {
            if self.required.contains(&id) {
                continue;
            }
            let spec = self.spec(id);
            if spec.instance_available(caps) {
                request.merge(&spec);
            } else {
                log::info!("feature {} is not available on instance", id.name());
                remove(&mut self.candidate, id);
                remove(&mut self.defaults, id);
            }
        }

        log::info!("instance candidates:");
        for id in &self.candidate {
            log::info!(" - {}", id.name());
        }
        log::info!("instance layers requested:");
        for layer in &request.instance_layers {
            log::info!(" - {layer}");
        }
        log::info!("instance extensions requested:");
        for extension in &request.instance_extensions {
            log::info!(" - {extension}");
        }

        request
    }

    /// Phase 2: device-scope resolution, run once per selected device.
    ///
    /// Recomputes `enabled = (user_enabled ∪ defaults) ∩ candidate \
    /// user_disabled`, filtered by device availability, and accumulates the
    /// survivors' device requirements. Any previous resolution is discarded.
    pub fn resolve_device(&mut self, adapter: &AdapterInfo) -> DeviceRequest {
        self.enabled.clear();
        let mut request = DeviceRequest::default();

        for id in self.candidate.clone() {
            let wanted = self.user_enabled.contains(&id)
                || (!self.user_disabled.contains(&id) && self.defaults.contains(&id));
            if !wanted {
                continue;
            }
            let spec = self.spec(id);
            if !spec.device_available(adapter) {
                if self.required.contains(&id) {
                    log::error!(
                        "feature {} is required but not available on device {}",
                        id.name(),
                        adapter.name
                    );
                } else {
                    log::info!(
                        "feature {} is not available on device {}",
                        id.name(),
                        adapter.name
                    );
                }
                continue;
            }
            add_unique(&mut self.enabled, id);
            request.merge(&spec);
        }

        log::info!("enabled device features:");
        for id in &self.enabled {
            log::info!(" - {}", id.name());
        }
        log::info!("device extensions requested:");
        for extension in &request.device_extensions {
            log::info!(" - {extension}");
        }

        request
    }

    fn fold_queues(&self, ids: &[FeatureId]) -> RoleCounts {
        let mut counts = RoleCounts::new();
        for &id in ids {
            counts.add(self.spec(id).queues);
        }
        counts
    }
}

fn add_unique(set: &mut Vec<FeatureId>, id: FeatureId) {
    if !set.contains(&id) {
        set.push(id);
    }
}

fn remove(set: &mut Vec<FeatureId>, id: FeatureId) {
    set.retain(|existing| *existing != id);
}
