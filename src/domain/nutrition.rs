use crate::domain::coerce;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    EnergyKcal,
    Fat,
    SaturatedFat,
    Carbohydrates,
    Sugars,
    Proteins,
    Salt,
}

impl Nutrient {
    pub const ALL: [Nutrient; 7] = [
        Nutrient::EnergyKcal,
        Nutrient::Fat,
        Nutrient::SaturatedFat,
        Nutrient::Carbohydrates,
        Nutrient::Sugars,
        Nutrient::Proteins,
        Nutrient::Salt,
    ];

    /// OpenFoodFacts key stem, e.g. `saturated-fat` for `saturated-fat_100g`.
    pub fn key(self) -> &'static str {
        match self {
            Nutrient::EnergyKcal => "energy-kcal",
            Nutrient::Fat => "fat",
            Nutrient::SaturatedFat => "saturated-fat",
            Nutrient::Carbohydrates => "carbohydrates",
            Nutrient::Sugars => "sugars",
            Nutrient::Proteins => "proteins",
            Nutrient::Salt => "salt",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Nutrient::EnergyKcal => "Energy",
            Nutrient::Fat => "Fat",
            Nutrient::SaturatedFat => "Saturated fat",
            Nutrient::Carbohydrates => "Carbohydrates",
            Nutrient::Sugars => "Sugars",
            Nutrient::Proteins => "Proteins",
            Nutrient::Salt => "Salt",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Nutrient::EnergyKcal => "kcal",
            _ => "g",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Source values for one nutrient after coercion.
///
/// `per_100g` is read from `{key}_100g`, or the bare `{key}` when that is
/// absent. `per_serving` is read from `{key}_serving`, or `{key}_100g` when
/// that is absent. A key that is present but not numeric does not fall back
/// to its alternative and yields `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NutrientFacts {
    pub per_100g: Option<f64>,
    pub per_serving: Option<f64>,
}

/// Typed view over a product's `nutritional_info` JSON.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NutritionPayload {
    facts: [NutrientFacts; 7],
    pub serving_size: Option<String>,
    pub product_name: Option<String>,
}

impl NutritionPayload {
    /// Accepts either a wrapper carrying a `nutriments` object or a flat
    /// nutrient map. Never fails; unusable input gives an empty payload.
    pub fn from_value(value: &Value) -> Self {
        let Value::Object(outer) = value else {
            return Self::default();
        };

        let empty = Map::new();
        let nutriments = match outer.get("nutriments") {
            None | Some(Value::Null) => outer,
            Some(Value::Object(inner)) => inner,
            // nutriments 不是物件時視為沒有資料
            Some(_) => &empty,
        };

        let mut facts = [NutrientFacts::default(); 7];
        for nutrient in Nutrient::ALL {
            let key = nutrient.key();
            let per_100g_key = format!("{}_100g", key);
            let serving_key = format!("{}_serving", key);

            facts[nutrient.index()] = NutrientFacts {
                per_100g: first_present(nutriments, &[&per_100g_key, key]).and_then(coerce::number),
                per_serving: first_present(nutriments, &[&serving_key, &per_100g_key])
                    .and_then(coerce::number),
            };
        }

        Self {
            facts,
            serving_size: text_field(outer, "serving_size"),
            product_name: text_field(outer, "product_name"),
        }
    }

    pub fn facts(&self, nutrient: Nutrient) -> NutrientFacts {
        self.facts[nutrient.index()]
    }

    pub fn has_data(&self) -> bool {
        self.facts
            .iter()
            .any(|f| f.per_100g.is_some() || f.per_serving.is_some())
    }
}

fn first_present<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| !value.is_null())
}

fn text_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wrapper_and_flat_payloads_read_the_same() {
        let flat = json!({"fat_100g": 10, "sugars_serving": "4.5"});
        let wrapped = json!({"nutriments": flat.clone(), "serving_size": "15 g"});

        let a = NutritionPayload::from_value(&flat);
        let b = NutritionPayload::from_value(&wrapped);

        assert_eq!(a.facts(Nutrient::Fat), b.facts(Nutrient::Fat));
        assert_eq!(b.facts(Nutrient::Sugars).per_serving, Some(4.5));
        assert_eq!(b.serving_size.as_deref(), Some("15 g"));
        assert_eq!(a.serving_size, None);
    }

    #[test]
    fn test_bare_key_backs_up_per_100g() {
        let payload = NutritionPayload::from_value(&json!({"salt": 1.2}));
        assert_eq!(payload.facts(Nutrient::Salt).per_100g, Some(1.2));
        assert_eq!(payload.facts(Nutrient::Salt).per_serving, None);
    }

    #[test]
    fn test_per_100g_backs_up_per_serving() {
        let payload = NutritionPayload::from_value(&json!({"proteins_100g": "6.3"}));
        let facts = payload.facts(Nutrient::Proteins);
        assert_eq!(facts.per_100g, Some(6.3));
        assert_eq!(facts.per_serving, Some(6.3));
    }

    #[test]
    fn test_null_falls_back_but_garbage_does_not() {
        let payload = NutritionPayload::from_value(&json!({
            "fat_100g": null,
            "fat": 3,
            "sugars_100g": "n/a",
            "sugars": 9
        }));
        assert_eq!(payload.facts(Nutrient::Fat).per_100g, Some(3.0));
        assert_eq!(payload.facts(Nutrient::Sugars).per_100g, None);
        assert_eq!(payload.facts(Nutrient::Sugars).per_serving, None);
    }

    #[test]
    fn test_unusable_input_is_empty() {
        assert!(!NutritionPayload::from_value(&Value::Null).has_data());
        assert!(!NutritionPayload::from_value(&json!("fat")).has_data());
        assert!(!NutritionPayload::from_value(&json!({"nutriments": "oops", "fat_100g": 1})).has_data());
        assert!(!NutritionPayload::from_value(&json!({})).has_data());
    }
}
