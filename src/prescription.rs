//! Prescription pricing

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::items::PricedComponent;

/// Errors specific to prescription charge derivation.
#[derive(Debug, Error, PartialEq)]
pub enum PrescriptionError {
    /// A derived charge left the representable minor-unit range.
    #[error("prescription charge computation overflowed")]
    PriceOverflow,
}

/// Lens focal design.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LensType {
    /// One focal power across the whole lens.
    SingleVision,

    /// Two focal zones.
    Bifocal,

    /// Gradual focal transition.
    Progressive,
}

/// Lens blank material.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LensMaterial {
    /// Standard index plastic.
    Standard,

    /// Impact-resistant polycarbonate.
    Polycarbonate,

    /// Thin high-index plastic.
    HighIndex,
}

/// Prescription details captured for a specs order.
#[derive(Clone, Debug, PartialEq)]
pub struct PrescriptionContext {
    /// Lens focal design.
    pub lens_type: LensType,

    /// Lens blank material.
    pub lens_material: LensMaterial,

    /// Selected coatings. See [`parse_coatings`] for the form-field format.
    pub coatings: Vec<String>,

    /// Pupillary distance in millimetres.
    pub pupillary_distance: Option<Decimal>,

    /// Sphere power in dioptres.
    pub sphere: Option<Decimal>,

    /// Cylinder power in dioptres.
    pub cylinder: Option<Decimal>,
}

impl PrescriptionContext {
    /// Create a context with the given lens design and material and no
    /// optional measurements.
    #[must_use]
    pub fn new(lens_type: LensType, lens_material: LensMaterial) -> Self {
        Self {
            lens_type,
            lens_material,
            coatings: Vec::new(),
            pupillary_distance: None,
            sphere: None,
            cylinder: None,
        }
    }
}

/// Splits a comma-delimited coating field, dropping empty entries.
///
/// `"anti-glare, UV,"` yields `["anti-glare", "UV"]`.
#[must_use]
pub fn parse_coatings(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|coating| !coating.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Price lookup table driving lens and coating charges.
///
/// The lens price is `base_price * material multiplier * lens-type
/// multiplier`; each selected coating adds `per_coating`. Multipliers are
/// deployment configuration, not business law: construct the table yourself
/// to override any of them.
#[derive(Clone, Debug)]
pub struct LensPriceTable<'a> {
    /// Base lens price before multipliers.
    pub base_price: Money<'a, Currency>,

    /// Flat price added per selected coating.
    pub per_coating: Money<'a, Currency>,

    /// Multiplier for standard material.
    pub standard: Decimal,

    /// Multiplier for polycarbonate material.
    pub polycarbonate: Decimal,

    /// Multiplier for high-index material.
    pub high_index: Decimal,

    /// Multiplier for single-vision lenses.
    pub single_vision: Decimal,

    /// Multiplier for bifocal lenses.
    pub bifocal: Decimal,

    /// Multiplier for progressive lenses.
    pub progressive: Decimal,
}

impl<'a> LensPriceTable<'a> {
    /// The stock table: 50.00 base, 25.00 per coating, material multipliers
    /// 1 / 1.5 / 2 and lens-type multipliers 1 / 2 / 3.
    #[must_use]
    pub fn standard(currency: &'a Currency) -> Self {
        Self {
            base_price: Money::from_minor(5000, currency),
            per_coating: Money::from_minor(2500, currency),
            standard: Decimal::ONE,
            polycarbonate: Decimal::new(15, 1),
            high_index: Decimal::from(2),
            single_vision: Decimal::ONE,
            bifocal: Decimal::from(2),
            progressive: Decimal::from(3),
        }
    }

    /// Returns the multiplier for a material.
    #[must_use]
    pub fn material_multiplier(&self, material: LensMaterial) -> Decimal {
        match material {
            LensMaterial::Standard => self.standard,
            LensMaterial::Polycarbonate => self.polycarbonate,
            LensMaterial::HighIndex => self.high_index,
        }
    }

    /// Returns the multiplier for a lens type.
    #[must_use]
    pub fn lens_type_multiplier(&self, lens_type: LensType) -> Decimal {
        match lens_type {
            LensType::SingleVision => self.single_vision,
            LensType::Bifocal => self.bifocal,
            LensType::Progressive => self.progressive,
        }
    }

    /// Derives the lens price for a design/material combination.
    ///
    /// # Errors
    ///
    /// Returns [`PrescriptionError::PriceOverflow`] if the multiplied price
    /// leaves the minor-unit range.
    pub fn lens_price(
        &self,
        lens_type: LensType,
        material: LensMaterial,
    ) -> Result<Money<'a, Currency>, PrescriptionError> {
        let factor = self.material_multiplier(material) * self.lens_type_multiplier(lens_type);
        let base = Decimal::from(self.base_price.to_minor_units());

        let minor = base
            .checked_mul(factor)
            .map(|value| value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|value| value.to_i64())
            .ok_or(PrescriptionError::PriceOverflow)?;

        Ok(Money::from_minor(minor, self.base_price.currency()))
    }

    /// Lowers a prescription to priced components: one lens line, plus a
    /// coating line when any coatings are selected.
    ///
    /// # Errors
    ///
    /// Returns [`PrescriptionError::PriceOverflow`] if a derived charge
    /// leaves the minor-unit range.
    pub fn components(
        &self,
        prescription: &PrescriptionContext,
    ) -> Result<SmallVec<[PricedComponent<'a>; 2]>, PrescriptionError> {
        let mut components = SmallVec::new();

        components.push(PricedComponent::new(
            "Lens",
            self.lens_price(prescription.lens_type, prescription.lens_material)?,
            1,
        ));

        let coating_count = u32::try_from(prescription.coatings.len())
            .map_err(|_err| PrescriptionError::PriceOverflow)?;

        if coating_count > 0 {
            components.push(PricedComponent::new(
                "Coating",
                self.per_coating,
                coating_count,
            ));
        }

        Ok(components)
    }
}
