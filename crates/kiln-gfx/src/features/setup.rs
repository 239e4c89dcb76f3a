use kiln_core::Config;

use crate::adapter::AdapterLimits;

use super::{FeatureId, FeatureRegistry};

/// Resolved quality settings that need a concrete value beyond on/off.
/// Values are already clamped to the selected device's limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GfxSetup {
    pub max_sampler_anisotropy: f32,
    pub msaa_samples: u32,
}

impl Default for GfxSetup {
    fn default() -> Self {
        Self {
            max_sampler_anisotropy: 0.0,
            msaa_samples: 1,
        }
    }
}

/// Applies user configuration to the feature registry and computes the
/// clamped quality settings for the selected device.
///
/// Config keys follow the `gfx-` prefix; absent keys read as zero or false
/// and leave their feature unrequested. Enabling can still fail when a
/// feature was pruned at instance scope; those failures are logged and the
/// corresponding setting stays at its default.
pub fn enable_from_config(
    registry: &mut FeatureRegistry,
    config: &Config,
    limits: &AdapterLimits,
) -> GfxSetup {
    let mut setup = GfxSetup::default();

    if config.get_bool("gfx-separate-transfer") {
        enable(registry, FeatureId::SeparateTransfer);
    }

    let anisotropy = config.get_f64("gfx-max-sampler-anisotropy") as f32;
    if anisotropy > 0.0 {
        if enable(registry, FeatureId::SamplerAnisotropy) {
            if anisotropy > limits.max_sampler_anisotropy {
                log::warn!(
                    "sampler anisotropy {anisotropy} exceeds device limit {}, clamping",
                    limits.max_sampler_anisotropy
                );
                setup.max_sampler_anisotropy = limits.max_sampler_anisotropy;
            } else {
                setup.max_sampler_anisotropy = anisotropy;
            }
        }
    }

    if config.get_bool("gfx-enable-sampler-filter-cubic") {
        enable(registry, FeatureId::SamplerFilterCubic);
    }
    if config.get_bool("gfx-enable-sampler-mirror-clamp-to-edge") {
        enable(registry, FeatureId::SamplerMirrorClampToEdge);
    }

    let requested_samples = config.get_i64("gfx-msaa-samples").max(0) as u32;
    if requested_samples > 1 {
        if enable(registry, FeatureId::Msaa) {
            setup.msaa_samples = best_sample_count(requested_samples, limits);
            if setup.msaa_samples < requested_samples {
                log::warn!(
                    "msaa sample count {requested_samples} not supported, using {}",
                    setup.msaa_samples
                );
            }
        }
    }

    if config.get_bool("gfx-enable-sample-shading") {
        enable(registry, FeatureId::SampleShading);
    }

    setup
}

fn enable(registry: &mut FeatureRegistry, id: FeatureId) -> bool {
    let ok = registry.enable(id);
    if !ok {
        log::warn!("feature {} requested by config is unavailable", id.name());
    }
    ok
}

/// Largest supported power-of-two sample count not exceeding `requested`.
fn best_sample_count(requested: u32, limits: &AdapterLimits) -> u32 {
    let mut best = 1;
    let mut candidate = 1u32;
    while candidate <= 64 && candidate <= requested {
        if limits.supports_sample_count(candidate) {
            best = candidate;
        }
        candidate <<= 1;
    }
    best
}
