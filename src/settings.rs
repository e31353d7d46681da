//! Persistent description of a curve
//!
//! Keys are only meaningful for the exact curve that produced them, so an
//! index must be able to rebuild that curve every time it is opened. These
//! settings are what it stores next to its keys.

use crate::{
    curve::{CurveFamily, SpaceFillingCurve},
    envelope::Envelope,
    error::Result,
    NumBits,
};

/// Everything needed to rebuild a [`SpaceFillingCurve`]
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurveSettings {
    /// Kind of curve
    pub family: CurveFamily,
    /// Region of space covered by the curve
    pub extent: Envelope,
    /// Resolution, the family's default if unset
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_level: Option<NumBits>,
}

impl CurveSettings {
    /// Settings for a curve of the family's default resolution
    pub fn new(family: CurveFamily, extent: Envelope) -> Self {
        Self {
            family,
            extent,
            max_level: None,
        }
    }

    /// Use a specific resolution
    #[must_use]
    pub fn with_max_level(mut self, max_level: NumBits) -> Self {
        self.max_level = Some(max_level);
        self
    }

    /// Resolution of the curve that these settings describe
    pub fn max_level(&self) -> NumBits {
        self.max_level
            .unwrap_or_else(|| self.family.default_max_level())
    }

    /// Build the curve
    ///
    /// # Errors
    ///
    /// See [`SpaceFillingCurve::new()`].
    ///
    pub fn curve(&self) -> Result<SpaceFillingCurve> {
        SpaceFillingCurve::new(self.family, self.extent, self.max_level())
    }
}

impl From<&SpaceFillingCurve> for CurveSettings {
    fn from(curve: &SpaceFillingCurve) -> Self {
        Self::new(curve.family(), *curve.extent()).with_max_level(curve.max_level())
    }
}
