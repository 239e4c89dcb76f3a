use crate::queues::RoleCounts;

use super::{AdapterInfo, DeviceType};

/// Scores one adapter for selection.
///
/// Zero means disqualified: the adapter cannot cover the required per-role
/// queue totals, or `present_ok` rejects it (typically because no family can
/// present to a registered surface). Otherwise the score favors discrete
/// GPUs, large texture limits, and geometry/tessellation support.
pub fn score_adapter(
    adapter: &AdapterInfo,
    required_queues: &RoleCounts,
    present_ok: impl Fn(&AdapterInfo) -> bool,
) -> u32 {
    if !required_queues.fits_within(&adapter.queues_total()) {
        log::info!(
            "adapter {} disqualified: insufficient queues",
            adapter.name
        );
        return 0;
    }
    if !present_ok(adapter) {
        log::info!(
            "adapter {} disqualified: cannot present to a registered surface",
            adapter.name
        );
        return 0;
    }

    let mut score = adapter.limits.max_image_dimension_2d;
    if adapter.device_type == DeviceType::Discrete {
        score += 1000;
    }
    if adapter.features.geometry_shader {
        score += 100;
    }
    if adapter.features.tessellation_shader {
        score += 100;
    }
    score
}

/// Picks the best-scoring adapter index, or `None` when every adapter is
/// disqualified. `hint` grants a fixed bonus to one index, letting callers
/// bias toward a previously used device without forcing it.
pub fn pick_best(
    adapters: &[AdapterInfo],
    required_queues: &RoleCounts,
    present_ok: impl Fn(&AdapterInfo) -> bool,
    hint: Option<usize>,
) -> Option<usize> {
    let mut best: Option<(u32, usize)> = None;
    for (index, adapter) in adapters.iter().enumerate() {
        let mut score = score_adapter(adapter, required_queues, &present_ok);
        if score > 0 && hint == Some(index) {
            score += 500;
        }
        log::debug!("adapter [{index}] {}: score {score}", adapter.name);
        if score > 0 && best.is_none_or(|(top, _)| score > top) {
            best = Some((score, index));
        }
    }

    match best {
        Some((_, index)) => {
            log::info!("selected adapter [{index}] {}", adapters[index].name);
            Some(index)
        }
        None => {
            log::error!("no usable adapter found");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{AdapterLimits, FeatureBits, QueueFamily};
    use crate::queues::{QueueRole, RoleSet};

    fn adapter(name: &str, device_type: DeviceType, dim: u32, queues: u32) -> AdapterInfo {
        AdapterInfo {
            name: name.to_string(),
            device_type,
            limits: AdapterLimits {
                max_image_dimension_2d: dim,
                ..Default::default()
            },
            families: vec![QueueFamily {
                count: queues,
                roles: RoleSet::all(),
            }],
            ..Default::default()
        }
    }

    fn no_queues(required: u32) -> RoleCounts {
        let mut counts = RoleCounts::new();
        counts[QueueRole::Graphics] = required;
        counts
    }

    #[test]
    fn discrete_beats_integrated() {
        let adapters = [
            adapter("igpu", DeviceType::Integrated, 8192, 4),
            adapter("dgpu", DeviceType::Discrete, 8192, 4),
        ];
        assert_eq!(
            pick_best(&adapters, &no_queues(1), |_| true, None),
            Some(1)
        );
    }

    #[test]
    fn hint_biases_between_close_scores() {
        let adapters = [
            adapter("a", DeviceType::Discrete, 8192, 4),
            adapter("b", DeviceType::Discrete, 8192, 4),
        ];
        assert_eq!(
            pick_best(&adapters, &no_queues(1), |_| true, Some(1)),
            Some(1)
        );
    }

    #[test]
    fn missing_queues_disqualify() {
        let adapters = [adapter("small", DeviceType::Discrete, 8192, 1)];
        assert_eq!(pick_best(&adapters, &no_queues(2), |_| true, None), None);
    }

    #[test]
    fn feature_bits_contribute() {
        let mut fancy = adapter("fancy", DeviceType::Integrated, 4096, 4);
        fancy.features = FeatureBits {
            geometry_shader: true,
            tessellation_shader: true,
            ..Default::default()
        };
        let plain = adapter("plain", DeviceType::Integrated, 4096, 4);
        assert_eq!(
            pick_best(&[plain, fancy], &no_queues(1), |_| true, None),
            Some(1)
        );
    }

    #[test]
    fn surface_gate_disqualifies() {
        let adapters = [adapter("offscreen", DeviceType::Discrete, 8192, 4)];
        assert_eq!(pick_best(&adapters, &no_queues(1), |_| false, None), None);
    }
}
