//! Graphics context.
//!
//! [`Gfx`] owns the per-context negotiation state and the pools of
//! window-related resources. Construct one per application; there is no
//! process-wide instance. The intended call order mirrors device bring-up:
//! register surfaces, run [`Gfx::negotiate_instance`] once, pick an adapter
//! with [`Gfx::select_adapter`], then produce a [`DevicePlan`] for it.

use kiln_core::{Config, Handle, Pool};

use crate::adapter::{AdapterInfo, InstanceCaps};
use crate::features::{
    DeviceRequest, FeatureId, FeatureRegistry, GfxSetup, PlatformCaps, enable_from_config,
};
use crate::queues::{QueuePlan, QueueRole, allocate};

/// A render target the engine must be able to present to.
///
/// Presentation support is a per-surface, per-family question that only the
/// platform layer can answer, so the binding carries a callback instead of
/// precomputed data. Dropping the last handle to a binding removes it from
/// all subsequent adapter gating and queue planning.
pub struct SurfaceBinding {
    pub label: String,
    support: Box<dyn Fn(&AdapterInfo, u32) -> bool>,
}

impl SurfaceBinding {
    pub fn new(
        label: impl Into<String>,
        support: impl Fn(&AdapterInfo, u32) -> bool + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            support: Box::new(support),
        }
    }

    pub fn supports_family(&self, adapter: &AdapterInfo, family: u32) -> bool {
        (self.support)(adapter, family)
    }
}

impl std::fmt::Debug for SurfaceBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceBinding")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Anything whose lifetime is tied to a window.
///
/// Buffers and render targets live in the binding layer; the tags here only
/// tie their release to window teardown.
#[derive(Debug)]
pub enum WindowResource {
    Surface(Handle<SurfaceBinding>),
    Buffer(String),
    RenderTarget(String),
}

/// Everything device creation needs for one selected adapter.
#[derive(Debug)]
pub struct DevicePlan {
    pub request: DeviceRequest,
    pub setup: GfxSetup,
    pub queues: QueuePlan,
}

pub struct Gfx {
    config: Config,
    registry: FeatureRegistry,
    surfaces: Pool<SurfaceBinding>,
    window_resources: Pool<WindowResource>,
    instance_request: Option<DeviceRequest>,
}

impl Gfx {
    pub fn new(config: Config, platform: PlatformCaps) -> Self {
        Self {
            config,
            registry: FeatureRegistry::new(platform),
            surfaces: Pool::new(),
            window_resources: Pool::new(),
            instance_request: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn registry(&self) -> &FeatureRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut FeatureRegistry {
        &mut self.registry
    }

    /// Registers a render target and marks window output as required.
    ///
    /// The returned handle keeps the binding alive; hold it for as long as
    /// the window exists.
    pub fn register_surface(&mut self, binding: SurfaceBinding) -> Handle<SurfaceBinding> {
        self.registry.require(FeatureId::WindowSurface);
        log::debug!("registered surface {:?}", binding.label);
        self.surfaces.store(binding)
    }

    /// Ties an arbitrary resource to window lifetime.
    pub fn track(&mut self, resource: WindowResource) -> Handle<WindowResource> {
        self.window_resources.store(resource)
    }

    pub fn surfaces(&self) -> &Pool<SurfaceBinding> {
        &self.surfaces
    }

    pub fn window_resources(&self) -> &Pool<WindowResource> {
        &self.window_resources
    }

    /// Phase 1 of negotiation. Run once, before instance creation; the
    /// returned request lists the layers and extensions to create it with.
    pub fn negotiate_instance(&mut self, caps: &InstanceCaps) -> DeviceRequest {
        let request = self.registry.negotiate_instance(caps);
        self.instance_request = Some(request.clone());
        request
    }

    pub fn instance_request(&self) -> Option<&DeviceRequest> {
        self.instance_request.as_ref()
    }

    /// Picks the adapter to create the device on, or `None` when no adapter
    /// can serve the required queues and every registered surface.
    pub fn select_adapter(&self, adapters: &[AdapterInfo], hint: Option<usize>) -> Option<usize> {
        let required = self.registry.queues_required();
        crate::adapter::pick_best(adapters, &required, |adapter| self.can_present(adapter), hint)
    }

    /// Phase 2 of negotiation plus queue planning for `adapter`.
    ///
    /// Applies config-driven feature requests, resolves the enabled set
    /// against the adapter, and maps the resulting queue demand onto its
    /// families. Presentation queues are only placed on families every live
    /// surface can present to.
    pub fn plan_device(&mut self, adapter: &AdapterInfo) -> DevicePlan {
        let setup = enable_from_config(&mut self.registry, &self.config, &adapter.limits);
        let request = self.registry.resolve_device(adapter);
        let surfaces = &self.surfaces;
        let queues = allocate(request.queues, &adapter.families, |family, role| {
            role != QueueRole::Present
                || surfaces
                    .iter()
                    .all(|binding| binding.supports_family(adapter, family))
        });
        DevicePlan {
            request,
            setup,
            queues,
        }
    }

    /// True when every live surface has at least one presentation-capable
    /// family willing to serve it.
    fn can_present(&self, adapter: &AdapterInfo) -> bool {
        self.surfaces.iter().all(|binding| {
            adapter
                .families_for(QueueRole::Present)
                .any(|family| binding.supports_family(adapter, family))
        })
    }
}

impl std::fmt::Debug for Gfx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gfx")
            .field("surfaces", &self.surfaces.len())
            .field("window_resources", &self.window_resources.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{AdapterLimits, DeviceType, FeatureBits, QueueFamily};
    use crate::features::catalog::{self, KHR_SWAPCHAIN};
    use crate::queues::RoleSet;

    fn platform() -> PlatformCaps {
        PlatformCaps {
            surface_instance_extensions: vec!["VK_KHR_surface".to_string()],
        }
    }

    fn instance_caps() -> InstanceCaps {
        InstanceCaps {
            layers: vec![catalog::KHRONOS_VALIDATION_LAYER.to_string()],
            extensions: vec![
                "VK_KHR_surface".to_string(),
                catalog::KHR_GET_PHYSICAL_DEVICE_PROPERTIES_2.to_string(),
                catalog::EXT_DEBUG_UTILS.to_string(),
            ],
        }
    }

    fn discrete_adapter() -> AdapterInfo {
        AdapterInfo {
            name: "discrete".to_string(),
            device_type: DeviceType::Discrete,
            limits: AdapterLimits {
                max_image_dimension_2d: 16384,
                max_sampler_anisotropy: 16.0,
                framebuffer_color_sample_counts: 0b0111_1111,
                framebuffer_depth_sample_counts: 0b0111_1111,
                ..Default::default()
            },
            features: FeatureBits {
                sampler_anisotropy: true,
                sample_rate_shading: true,
                geometry_shader: true,
                tessellation_shader: true,
            },
            extensions: vec![KHR_SWAPCHAIN.to_string()],
            families: vec![
                QueueFamily {
                    count: 16,
                    roles: RoleSet::GRAPHICS | RoleSet::PRESENT | RoleSet::COMPUTE,
                },
                QueueFamily {
                    count: 2,
                    roles: RoleSet::TRANSFER,
                },
            ],
            ..Default::default()
        }
    }

    fn gfx() -> Gfx {
        Gfx::new(Config::new("unused.json"), platform())
    }

    // ── adapter gating ────────────────────────────────────────────────────

    #[test]
    fn selection_respects_surface_support() {
        let mut gfx = gfx();
        // Only family 1 of the adapter can present to this surface, and
        // family 1 has no present bit, so the adapter is disqualified.
        let _surface = gfx.register_surface(SurfaceBinding::new("main", |_, family| family == 1));
        gfx.negotiate_instance(&instance_caps());
        assert_eq!(gfx.select_adapter(&[discrete_adapter()], None), None);
    }

    #[test]
    fn dropping_the_surface_lifts_the_gate() {
        let mut gfx = gfx();
        let surface = gfx.register_surface(SurfaceBinding::new("main", |_, _| false));
        gfx.negotiate_instance(&instance_caps());
        assert_eq!(gfx.select_adapter(&[discrete_adapter()], None), None);

        drop(surface);
        // Window output stays required, and the universal family 0 covers
        // the present queue once the unpresentable surface is gone.
        assert_eq!(gfx.select_adapter(&[discrete_adapter()], None), Some(0));
    }

    #[test]
    fn hint_biases_between_comparable_adapters() {
        let mut gfx = gfx();
        gfx.negotiate_instance(&instance_caps());
        let twins = [discrete_adapter(), discrete_adapter()];
        assert_eq!(gfx.select_adapter(&twins, Some(1)), Some(1));
    }

    // ── device planning ───────────────────────────────────────────────────

    #[test]
    fn plan_covers_required_and_config_features() {
        let mut gfx = gfx();
        let _surface = gfx.register_surface(SurfaceBinding::new("main", |_, family| family == 0));
        gfx.config_mut().set_bool("gfx-separate-transfer", true);
        gfx.config_mut().set_f64("gfx-max-sampler-anisotropy", 32.0);
        gfx.negotiate_instance(&instance_caps());

        let adapter = discrete_adapter();
        assert_eq!(gfx.select_adapter(&[adapter.clone()], None), Some(0));
        let plan = gfx.plan_device(&adapter);

        assert!(gfx.registry().feature_enabled(FeatureId::WindowSurface));
        assert!(gfx.registry().feature_enabled(FeatureId::SeparateTransfer));
        assert_eq!(plan.setup.max_sampler_anisotropy, 16.0);
        assert!(plan.queues.satisfied());
        assert_eq!(plan.queues.role(QueueRole::Graphics), &[(0, 0)]);
        assert_eq!(plan.queues.role(QueueRole::Present), &[(0, 1)]);
        assert_eq!(plan.queues.role(QueueRole::Transfer), &[(1, 0)]);
        assert!(
            plan.request
                .device_extensions
                .contains(&KHR_SWAPCHAIN.to_string())
        );
    }

    #[test]
    fn present_queues_avoid_unsupported_families() {
        let mut gfx = gfx();
        // Family 0 declares the present bit but the surface rejects it.
        let adapter = AdapterInfo {
            extensions: vec![KHR_SWAPCHAIN.to_string()],
            families: vec![
                QueueFamily {
                    count: 4,
                    roles: RoleSet::GRAPHICS | RoleSet::PRESENT,
                },
                QueueFamily {
                    count: 1,
                    roles: RoleSet::PRESENT,
                },
            ],
            ..Default::default()
        };
        let _surface = gfx.register_surface(SurfaceBinding::new("main", |_, family| family == 1));
        gfx.negotiate_instance(&instance_caps());
        let plan = gfx.plan_device(&adapter);
        assert_eq!(plan.queues.role(QueueRole::Present), &[(1, 0)]);
    }

    #[test]
    fn tracked_resources_follow_pool_semantics() {
        let mut gfx = gfx();
        let surface = gfx.register_surface(SurfaceBinding::new("main", |_, _| true));
        let tracked = gfx.track(WindowResource::Surface(surface.clone()));
        let buffer = gfx.track(WindowResource::Buffer("staging".to_string()));
        assert_eq!(gfx.window_resources().len(), 2);
        match gfx.window_resources().get(&tracked) {
            Some(WindowResource::Surface(handle)) => {
                assert_eq!(gfx.surfaces().get(handle).unwrap().label, "main");
            }
            other => panic!("unexpected resource {other:?}"),
        }
        drop(tracked);
        assert_eq!(gfx.window_resources().len(), 1);
        drop(buffer);
        assert_eq!(gfx.window_resources().len(), 0);
    }
}
