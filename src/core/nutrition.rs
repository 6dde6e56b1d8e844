use crate::domain::nutrition::{Nutrient, NutritionPayload};
use serde::Serialize;

/// Estimated nutrients for a given quantity. `None` means "no data", which
/// is different from a measured zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NutritionSummary {
    pub kcal: Option<f64>,
    pub fat: Option<f64>,
    pub saturated_fat: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub sugars: Option<f64>,
    pub proteins: Option<f64>,
    pub salt: Option<f64>,
}

impl NutritionSummary {
    pub fn get(&self, nutrient: Nutrient) -> Option<f64> {
        match nutrient {
            Nutrient::EnergyKcal => self.kcal,
            Nutrient::Fat => self.fat,
            Nutrient::SaturatedFat => self.saturated_fat,
            Nutrient::Carbohydrates => self.carbohydrates,
            Nutrient::Sugars => self.sugars,
            Nutrient::Proteins => self.proteins,
            Nutrient::Salt => self.salt,
        }
    }

    fn set(&mut self, nutrient: Nutrient, value: Option<f64>) {
        let slot = match nutrient {
            Nutrient::EnergyKcal => &mut self.kcal,
            Nutrient::Fat => &mut self.fat,
            Nutrient::SaturatedFat => &mut self.saturated_fat,
            Nutrient::Carbohydrates => &mut self.carbohydrates,
            Nutrient::Sugars => &mut self.sugars,
            Nutrient::Proteins => &mut self.proteins,
            Nutrient::Salt => &mut self.salt,
        };
        *slot = value;
    }

    pub fn entries(&self) -> impl Iterator<Item = (Nutrient, Option<f64>)> + '_ {
        Nutrient::ALL.into_iter().map(|n| (n, self.get(n)))
    }

    pub fn is_empty(&self) -> bool {
        self.entries().all(|(_, value)| value.is_none())
    }
}

/// Scales per-100g values to `quantity` grams, falling back to the
/// per-serving value (unscaled) when scaling is impossible.
///
/// A quantity that is absent, zero, negative or non-finite disables scaling.
pub fn derive_nutrition(payload: &NutritionPayload, quantity: Option<f64>) -> NutritionSummary {
    let grams = quantity.filter(|q| q.is_finite() && *q > 0.0);

    let mut summary = NutritionSummary::default();
    for nutrient in Nutrient::ALL {
        let facts = payload.facts(nutrient);
        let value = match (facts.per_100g, grams) {
            (Some(per_100g), Some(grams)) => Some(per_100g * (grams / 100.0)),
            _ => facts.per_serving,
        };
        summary.set(nutrient, value);
    }
    summary
}
