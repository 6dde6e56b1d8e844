use crate::domain::model::ProductDraft;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One candidate from the OpenFoodFacts search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub brands: Option<String>,
    #[serde(default)]
    pub categories: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_small_url: Option<String>,
    #[serde(default)]
    pub serving_size: Option<String>,
    #[serde(default)]
    pub nutriments: Option<Value>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

impl CatalogProduct {
    pub fn display_name(&self) -> &str {
        non_empty(&self.product_name).unwrap_or("(unnamed)")
    }

    /// Payload stored on a product by the product form.
    pub fn nutrition_payload(&self) -> Value {
        json!({
            "nutriments": self.nutriments.clone().unwrap_or_else(|| json!({})),
            "serving_size": self.serving_size,
        })
    }

    /// Payload stored by the backfill job, which also records the matched name.
    pub fn backfill_payload(&self) -> Value {
        json!({
            "nutriments": self.nutriments.clone().unwrap_or_else(|| json!({})),
            "serving_size": self.serving_size,
            "product_name": self.product_name,
        })
    }

    /// Fills a draft from this candidate, keeping draft values the catalog lacks.
    pub fn apply_to(&self, draft: &mut ProductDraft) {
        if let Some(name) = non_empty(&self.product_name) {
            draft.name = name.to_string();
        }
        if let Some(brand) = non_empty(&self.brands) {
            draft.brand = brand.to_string();
        }
        if let Some(picture) = non_empty(&self.image_url) {
            draft.picture = picture.to_string();
        } else if draft.picture.is_empty() {
            draft.picture = non_empty(&self.image_small_url).unwrap_or_default().to_string();
        }
        if let Some(category) = non_empty(&self.categories) {
            draft.category = category.to_string();
        }
        draft.nutritional_info = Some(self.nutrition_payload());
    }
}

/// `{"products": [...]}` envelope returned by `/cgi/search.pl`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSearchResponse {
    #[serde(default)]
    pub products: Option<Vec<Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_to_fills_draft() {
        let candidate = CatalogProduct {
            product_name: Some("Nutella".to_string()),
            brands: Some("Ferrero".to_string()),
            image_small_url: Some("https://img/small.jpg".to_string()),
            serving_size: Some("15 g".to_string()),
            nutriments: Some(json!({"fat_100g": 30.9})),
            ..Default::default()
        };
        let mut draft = ProductDraft {
            name: "hazelnut spread".to_string(),
            price: 4.99,
            category: "Spreads".to_string(),
            ..Default::default()
        };

        candidate.apply_to(&mut draft);

        assert_eq!(draft.name, "Nutella");
        assert_eq!(draft.brand, "Ferrero");
        assert_eq!(draft.picture, "https://img/small.jpg");
        assert_eq!(draft.category, "Spreads");
        assert_eq!(draft.price, 4.99);
        let info = draft.nutritional_info.unwrap();
        assert_eq!(info["nutriments"]["fat_100g"], json!(30.9));
        assert_eq!(info["serving_size"], json!("15 g"));
    }

    #[test]
    fn test_payload_without_nutriments() {
        let candidate = CatalogProduct::default();
        let payload = candidate.backfill_payload();
        assert_eq!(payload["nutriments"], json!({}));
        assert!(payload["product_name"].is_null());
    }
}
