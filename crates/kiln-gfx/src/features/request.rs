use crate::adapter::FeatureBits;
use crate::queues::RoleCounts;

use super::FeatureSpec;

/// Accumulated requirements of every enabled feature, handed to the
/// device-creation layer.
///
/// Name lists are de-duplicated and keep insertion order so repeated
/// negotiation runs produce identical requests.
#[derive(Debug, Clone, Default)]
pub struct DeviceRequest {
    pub instance_layers: Vec<String>,
    pub instance_extensions: Vec<String>,
    pub device_layers: Vec<String>,
    pub device_extensions: Vec<String>,
    pub feature_bits: FeatureBits,
    pub queues: RoleCounts,
}

impl DeviceRequest {
    /// Folds one feature's prerequisites and effects into the request.
    pub fn merge(&mut self, spec: &FeatureSpec) {
        push_unique(&mut self.instance_layers, &spec.instance_layers);
        push_unique(&mut self.instance_extensions, &spec.instance_extensions);
        push_unique(&mut self.device_layers, &spec.device_layers);
        push_unique(&mut self.device_extensions, &spec.device_extensions);
        if let Some(set_bits) = spec.enable_bits {
            set_bits(&mut self.feature_bits);
        }
        self.queues.add(spec.queues);
    }
}

fn push_unique(into: &mut Vec<String>, names: &[String]) {
    for name in names {
        if !into.iter().any(|existing| existing == name) {
            into.push(name.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FeatureId, PlatformCaps, feature_spec};
    use crate::queues::QueueRole;

    #[test]
    fn merge_deduplicates_and_sums_queues() {
        let platform = PlatformCaps {
            surface_instance_extensions: vec!["VK_KHR_surface".to_string()],
        };
        let mut request = DeviceRequest::default();
        let surface = feature_spec(FeatureId::WindowSurface, &platform);
        request.merge(&surface);
        request.merge(&surface);
        request.merge(&feature_spec(FeatureId::SeparateTransfer, &platform));

        assert_eq!(request.instance_extensions, vec!["VK_KHR_surface".to_string()]);
        assert_eq!(request.device_extensions.len(), 1);
        // Double merge doubles demand; de-duplication applies to names only.
        assert_eq!(request.queues[QueueRole::Graphics], 2);
        assert_eq!(request.queues[QueueRole::Transfer], 1);
    }

    #[test]
    fn merge_applies_feature_bit_mutators() {
        let platform = PlatformCaps::default();
        let mut request = DeviceRequest::default();
        request.merge(&feature_spec(FeatureId::SamplerAnisotropy, &platform));
        request.merge(&feature_spec(FeatureId::SampleShading, &platform));
        assert!(request.feature_bits.sampler_anisotropy);
        assert!(request.feature_bits.sample_rate_shading);
        assert!(!request.feature_bits.geometry_shader);
    }
}
