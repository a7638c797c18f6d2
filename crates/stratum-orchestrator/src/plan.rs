//! Band plan enumeration
//!
//! Turns the five plan parameters into the concrete, ordered list of bands
//! to create, plus the derived geometry of the persisted range descriptor.

use crate::error::OrchestratorError;

/// Prefix of the generator spec handed to the backing store; the suffix is
/// the band's inverse vertical offset, so the generator produces terrain
/// shifted into the band's local frame.
pub const GENERATOR_PREFIX: &str = "terraoffset";

/// The five user-tunable plan parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanParams {
    /// Height of one band's primary range
    pub world_height: i32,
    /// Overlap shared with each neighbor
    pub buffer_size: i32,
    /// Lower bound of the covered global range
    pub global_min: i32,
    /// Upper bound of the covered global range
    pub global_max: i32,
    /// Base name for band stores
    pub base_name: String,
}

/// One band the plan will realize
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedBand {
    /// Band name, `<base>_<minY>_<maxY>`
    pub name: String,
    /// Inclusive lower bound of the primary range
    pub min_y: i32,
    /// Exclusive upper bound of the primary range
    pub max_y: i32,
    /// Generator spec for the backing store
    pub generator: String,
}

impl PlanParams {
    /// Check the plan invariants, naming the violated constraint.
    ///
    /// # Errors
    /// [`OrchestratorError::InvalidConfiguration`] with the first violated
    /// constraint.
    pub fn validate(&self) -> Result<(), OrchestratorError> {
        let invalid = |constraint: &str| {
            Err(OrchestratorError::InvalidConfiguration(
                constraint.to_string(),
            ))
        };

        if self.global_max - self.global_min <= 0 {
            return invalid("globalMax - globalMin must be positive");
        }
        if self.world_height <= 0 {
            return invalid("worldHeight must be positive");
        }
        if self.world_height % 16 != 0 {
            return invalid("worldHeight must be a multiple of 16");
        }
        if self.buffer_size % 16 != 0 {
            return invalid("bufferSize must be a multiple of 16");
        }
        if (self.global_max - self.global_min) % self.world_height != 0 {
            return invalid("globalMax - globalMin must be a multiple of worldHeight");
        }
        if self.global_max % self.world_height != 0 {
            return invalid("globalMax must be a multiple of worldHeight");
        }
        if self.global_min % self.world_height != 0 {
            return invalid("globalMin must be a multiple of worldHeight");
        }
        Ok(())
    }

    /// Enumerate the bands in ascending coordinate order
    #[must_use]
    pub fn bands(&self) -> Vec<PlannedBand> {
        let mut bands = Vec::new();
        let mut min_y = self.global_min;
        while min_y < self.global_max {
            let max_y = min_y + self.world_height;
            bands.push(PlannedBand {
                name: band_name(&self.base_name, min_y, max_y),
                min_y,
                max_y,
                generator: generator_spec(min_y),
            });
            min_y = max_y;
        }
        bands
    }

    /// Minimum coordinate the persisted descriptor must carry.
    ///
    /// The same physical structure is replicated per band, so the descriptor
    /// spans one band plus its two half-buffers and starts at `-bufferSize`.
    #[inline]
    #[must_use]
    pub fn descriptor_min_y(&self) -> i32 {
        -self.buffer_size
    }

    /// Total height the persisted descriptor must carry
    #[inline]
    #[must_use]
    pub fn descriptor_height(&self) -> i32 {
        self.world_height + 2 * self.buffer_size
    }
}

/// Name of the band covering `[min_y, max_y)`
#[must_use]
pub fn band_name(base: &str, min_y: i32, max_y: i32) -> String {
    format!("{base}_{min_y}_{max_y}")
}

/// Generator spec for a band starting at `min_y`
#[must_use]
pub fn generator_spec(min_y: i32) -> String {
    format!("{GENERATOR_PREFIX}:{}", -min_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> PlanParams {
        PlanParams {
            world_height: 1024,
            buffer_size: 256,
            global_min: -11264,
            global_max: 9216,
            base_name: "base".to_string(),
        }
    }

    #[test]
    fn example_plan_produces_twenty_named_bands() {
        let bands = params().bands();
        assert_eq!(bands.len(), 20);
        assert_eq!(bands[0].name, "base_-11264_-10240");
        assert_eq!(bands[1].name, "base_-10240_-9216");
        assert_eq!(bands[19].name, "base_8192_9216");
        assert!(bands.windows(2).all(|w| w[0].max_y == w[1].min_y));
    }

    #[test]
    fn generator_spec_inverts_the_band_offset() {
        let bands = params().bands();
        assert_eq!(bands[0].generator, "terraoffset:11264");
        let zero_band = bands.iter().find(|b| b.min_y == 0).unwrap();
        assert_eq!(zero_band.generator, "terraoffset:0");
    }

    #[test]
    fn descriptor_geometry_spans_one_band_plus_both_half_buffers() {
        let p = params();
        assert_eq!(p.descriptor_min_y(), -256);
        assert_eq!(p.descriptor_height(), 1024 + 512);
    }

    #[test]
    fn valid_params_pass() {
        assert!(params().validate().is_ok());
    }

    #[test]
    fn validation_names_the_violated_constraint() {
        let mut p = params();
        p.global_max = p.global_min;
        let err = p.validate().unwrap_err();
        assert!(err.to_string().contains("globalMax - globalMin"));

        let mut p = params();
        p.world_height = 1000;
        let err = p.validate().unwrap_err();
        assert!(err.to_string().contains("worldHeight must be a multiple of 16"));

        let mut p = params();
        p.buffer_size = 100;
        let err = p.validate().unwrap_err();
        assert!(err.to_string().contains("bufferSize"));

        let mut p = params();
        p.global_max = 9216 + 512;
        let err = p.validate().unwrap_err();
        assert!(err
            .to_string()
            .contains("globalMax - globalMin must be a multiple of worldHeight"));

        // span stays a multiple of worldHeight but the bounds are not
        let mut p = params();
        p.global_min = -11264 + 512;
        p.global_max = 9216 + 512;
        let err = p.validate().unwrap_err();
        assert!(err
            .to_string()
            .contains("globalMax must be a multiple of worldHeight"));
    }
}
