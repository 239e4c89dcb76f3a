use crate::adapter::{AdapterInfo, AdapterLimits, FeatureBits, InstanceCaps};
use crate::queues::{QueueRole, RoleCounts};

pub const KHR_SWAPCHAIN: &str = "VK_KHR_swapchain";
pub const EXT_FILTER_CUBIC: &str = "VK_EXT_filter_cubic";
pub const KHR_SAMPLER_MIRROR_CLAMP_TO_EDGE: &str = "VK_KHR_sampler_mirror_clamp_to_edge";
pub const KHR_GET_PHYSICAL_DEVICE_PROPERTIES_2: &str = "VK_KHR_get_physical_device_properties2";
pub const KHR_PORTABILITY_SUBSET: &str = "VK_KHR_portability_subset";
pub const EXT_DEBUG_UTILS: &str = "VK_EXT_debug_utils";
pub const KHRONOS_VALIDATION_LAYER: &str = "VK_LAYER_KHRONOS_validation";

/// Engine feature identifiers.
///
/// The leading entries are public knobs; `PortabilitySubset` and
/// `DebugUtils` are internal housekeeping features the registry seeds
/// itself.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FeatureId {
    WindowSurface,
    SeparateTransfer,
    SamplerAnisotropy,
    SamplerFilterCubic,
    SamplerMirrorClampToEdge,
    Msaa,
    SampleShading,
    /// Must be requested whenever the device advertises it
    /// (VUID-VkDeviceCreateInfo-pProperties-04451).
    PortabilitySubset,
    /// Validation layer plus debug messenger extension, debug builds only.
    DebugUtils,
}

impl FeatureId {
    pub const ALL: [FeatureId; 9] = [
        FeatureId::WindowSurface,
        FeatureId::SeparateTransfer,
        FeatureId::SamplerAnisotropy,
        FeatureId::SamplerFilterCubic,
        FeatureId::SamplerMirrorClampToEdge,
        FeatureId::Msaa,
        FeatureId::SampleShading,
        FeatureId::PortabilitySubset,
        FeatureId::DebugUtils,
    ];

    /// Features user code may enable or disable directly.
    pub const PUBLIC: [FeatureId; 7] = [
        FeatureId::WindowSurface,
        FeatureId::SeparateTransfer,
        FeatureId::SamplerAnisotropy,
        FeatureId::SamplerFilterCubic,
        FeatureId::SamplerMirrorClampToEdge,
        FeatureId::Msaa,
        FeatureId::SampleShading,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            FeatureId::WindowSurface => "window_surface",
            FeatureId::SeparateTransfer => "separate_transfer",
            FeatureId::SamplerAnisotropy => "sampler_anisotropy",
            FeatureId::SamplerFilterCubic => "sampler_filter_cubic",
            FeatureId::SamplerMirrorClampToEdge => "sampler_mirror_clamp_to_edge",
            FeatureId::Msaa => "msaa",
            FeatureId::SampleShading => "sample_shading",
            FeatureId::PortabilitySubset => "portability_subset",
            FeatureId::DebugUtils => "debug_utils",
        }
    }
}

/// Platform requirements the binding layer discovers at startup, folded
/// into feature prerequisites (the window system dictates which instance
/// extensions surface creation needs).
#[derive(Debug, Clone, Default)]
pub struct PlatformCaps {
    pub surface_instance_extensions: Vec<String>,
}

/// Prerequisites and effects of one feature.
#[derive(Debug, Clone, Default)]
pub struct FeatureSpec {
    pub instance_layers: Vec<String>,
    pub instance_extensions: Vec<String>,
    pub device_layers: Vec<String>,
    pub device_extensions: Vec<String>,
    /// Queues this feature needs when enabled.
    pub queues: RoleCounts,
    /// Device-scope availability predicate over reported properties/bits.
    pub check: Option<fn(&AdapterLimits, &FeatureBits) -> bool>,
    /// Feature bits to set on the device request when enabled.
    pub enable_bits: Option<fn(&mut FeatureBits)>,
}

impl FeatureSpec {
    /// True when the instance scope satisfies every prerequisite.
    pub fn instance_available(&self, caps: &InstanceCaps) -> bool {
        self.instance_layers.iter().all(|layer| caps.has_layer(layer))
            && self
                .instance_extensions
                .iter()
                .all(|extension| caps.has_extension(extension))
    }

    /// True when the device satisfies every device-scope prerequisite.
    pub fn device_available(&self, adapter: &AdapterInfo) -> bool {
        self.device_layers.iter().all(|layer| adapter.has_layer(layer))
            && self
                .device_extensions
                .iter()
                .all(|extension| adapter.has_extension(extension))
            && self
                .check
                .is_none_or(|check| check(&adapter.limits, &adapter.features))
            && self.queues.fits_within(&adapter.queues_total())
    }
}

/// Maps a feature id to its prerequisites and effects.
pub fn feature_spec(id: FeatureId, platform: &PlatformCaps) -> FeatureSpec {
    match id {
        FeatureId::WindowSurface => {
            let mut queues = RoleCounts::new();
            queues[QueueRole::Graphics] = 1;
            queues[QueueRole::Present] = 1;
            FeatureSpec {
                instance_extensions: platform.surface_instance_extensions.clone(),
                device_extensions: vec![KHR_SWAPCHAIN.to_string()],
                queues,
                ..Default::default()
            }
        }
        FeatureId::SeparateTransfer => {
            let mut queues = RoleCounts::new();
            queues[QueueRole::Transfer] = 1;
            FeatureSpec {
                queues,
                ..Default::default()
            }
        }
        FeatureId::SamplerAnisotropy => FeatureSpec {
            check: Some(|_, features| features.sampler_anisotropy),
            enable_bits: Some(|features| features.sampler_anisotropy = true),
            ..Default::default()
        },
        FeatureId::SamplerFilterCubic => FeatureSpec {
            device_extensions: vec![EXT_FILTER_CUBIC.to_string()],
            ..Default::default()
        },
        FeatureId::SamplerMirrorClampToEdge => FeatureSpec {
            device_extensions: vec![KHR_SAMPLER_MIRROR_CLAMP_TO_EDGE.to_string()],
            ..Default::default()
        },
        FeatureId::Msaa => FeatureSpec {
            // Any color sample count beyond single-sampled will do.
            check: Some(|limits, _| limits.framebuffer_color_sample_counts & !1 != 0),
            ..Default::default()
        },
        FeatureId::SampleShading => FeatureSpec {
            check: Some(|_, features| features.sample_rate_shading),
            enable_bits: Some(|features| features.sample_rate_shading = true),
            ..Default::default()
        },
        FeatureId::PortabilitySubset => FeatureSpec {
            instance_extensions: vec![KHR_GET_PHYSICAL_DEVICE_PROPERTIES_2.to_string()],
            device_extensions: vec![KHR_PORTABILITY_SUBSET.to_string()],
            ..Default::default()
        },
        FeatureId::DebugUtils => FeatureSpec {
            instance_layers: vec![KHRONOS_VALIDATION_LAYER.to_string()],
            instance_extensions: vec![EXT_DEBUG_UTILS.to_string()],
            ..Default::default()
        },
    }
}
