//! Distance attenuation models, all clamped to `[0.0, 1.0]`.

/// Which attenuation curve a 3D source's distance model uses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DistanceModel {
    /// `gain = ref / (ref + rolloff * (max(distance, ref) - ref))`.
    Inverse,
    /// `gain = 1 - rolloff * (distance - ref) / (max - ref)`, clamped.
    Linear,
    /// `gain = (max(distance, ref) / ref) ^ -rolloff`.
    Exponential,
}

/// Per-source distance parameters.
#[derive(Clone, Copy, Debug)]
pub struct DistanceParams {
    /// Distance at which attenuation begins (gain is 1.0 at or below this).
    pub reference: f64,
    /// Distance beyond which gain no longer decreases (linear model only).
    pub max: f64,
    /// Rolloff steepness.
    pub rolloff: f64,
}

impl Default for DistanceParams {
    fn default() -> Self {
        Self {
            reference: 1.0,
            max: 100.0,
            rolloff: 1.0,
        }
    }
}

impl DistanceModel {
    /// Computes the attenuation gain for `distance` meters, clamped to
    /// `[0.0, 1.0]`.
    pub fn attenuation(&self, distance: f64, params: &DistanceParams) -> f64 {
        let reference = params.reference.max(1e-6);
        let distance = distance.max(0.0);
        let gain = match self {
            DistanceModel::Inverse => {
                reference / (reference + params.rolloff * (distance.max(reference) - reference))
            }
            DistanceModel::Linear => {
                let max = params.max.max(reference + 1e-6);
                1.0 - params.rolloff * (distance - reference).max(0.0) / (max - reference)
            }
            DistanceModel::Exponential => {
                (distance.max(reference) / reference).powf(-params.rolloff)
            }
        };
        gain.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_model_is_unity_at_reference_distance() {
        let params = DistanceParams {
            reference: 2.0,
            ..Default::default()
        };
        assert!((DistanceModel::Inverse.attenuation(2.0, &params) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn linear_model_reaches_zero_at_max_distance() {
        let params = DistanceParams {
            reference: 1.0,
            max: 10.0,
            rolloff: 1.0,
        };
        assert!(DistanceModel::Linear.attenuation(10.0, &params).abs() < 1e-9);
    }

    #[test]
    fn all_models_stay_in_unit_range() {
        let params = DistanceParams::default();
        for model in [
            DistanceModel::Inverse,
            DistanceModel::Linear,
            DistanceModel::Exponential,
        ] {
            for distance in [0.0, 0.5, 1.0, 50.0, 10_000.0] {
                let gain = model.attenuation(distance, &params);
                assert!((0.0..=1.0).contains(&gain), "{model:?} gave {gain} at {distance}");
            }
        }
    }
}
