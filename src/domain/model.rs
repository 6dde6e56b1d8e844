use crate::domain::coerce;
use crate::domain::nutrition::NutritionPayload;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_non_negative_amount, Validate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, deserialize_with = "coerce::lenient_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "coerce::lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "coerce::lenient_f64")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "coerce::lenient_string")]
    pub brand: String,
    #[serde(default, deserialize_with = "coerce::lenient_string")]
    pub picture: String,
    #[serde(default, deserialize_with = "coerce::lenient_string")]
    pub category: String,
    #[serde(default, deserialize_with = "coerce::lenient_f64")]
    pub quantity: Option<f64>,
    /// Raw JSON as stored by the API, kept for round-tripping on update.
    #[serde(default)]
    pub nutritional_info: Option<Value>,
}

impl Product {
    /// `price × quantity`, with a missing side counting as zero.
    pub fn inventory_value(&self) -> f64 {
        self.price.unwrap_or(0.0) * self.quantity.unwrap_or(0.0)
    }

    pub fn nutrition(&self) -> NutritionPayload {
        self.nutritional_info
            .as_ref()
            .map(NutritionPayload::from_value)
            .unwrap_or_default()
    }

    /// `null`, `{}` and other empty values all count as "not enriched yet".
    pub fn lacks_nutrition(&self) -> bool {
        match &self.nutritional_info {
            None | Some(Value::Null) => true,
            Some(Value::Object(map)) => map.is_empty(),
            Some(Value::Array(items)) => items.is_empty(),
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        }
    }

    pub fn to_draft(&self) -> ProductDraft {
        ProductDraft {
            name: self.name.clone(),
            price: self.price.unwrap_or(0.0),
            brand: self.brand.clone(),
            picture: self.picture.clone(),
            category: self.category.clone(),
            quantity: self.quantity.map(|q| q.max(0.0).round() as i64).unwrap_or(0),
            nutritional_info: self.nutritional_info.clone().filter(|v| !v.is_null()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default, deserialize_with = "coerce::lenient_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "coerce::lenient_string")]
    pub first_name: String,
    #[serde(default, deserialize_with = "coerce::lenient_string")]
    pub last_name: String,
    #[serde(default, deserialize_with = "coerce::lenient_string")]
    pub phone: String,
    #[serde(default, deserialize_with = "coerce::lenient_string")]
    pub address: String,
    #[serde(default, deserialize_with = "coerce::lenient_string")]
    pub city: String,
    #[serde(default, deserialize_with = "coerce::lenient_string")]
    pub zip_code: String,
    #[serde(default, deserialize_with = "coerce::lenient_string")]
    pub country: String,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn to_draft(&self) -> CustomerDraft {
        CustomerDraft {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            zip_code: self.zip_code.clone(),
            country: self.country.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(default, deserialize_with = "coerce::lenient_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "coerce::lenient_i64")]
    pub customer: Option<i64>,
    #[serde(default, deserialize_with = "coerce::lenient_f64")]
    pub total: Option<f64>,
    #[serde(default, deserialize_with = "coerce::lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Invoice {
    pub fn amount(&self) -> f64 {
        self.total.unwrap_or(0.0)
    }

    pub fn to_draft(&self) -> InvoiceDraft {
        InvoiceDraft {
            customer: self.customer.unwrap_or_default(),
            total: self.amount(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub picture: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutritional_info: Option<Value>,
}

impl Validate for ProductDraft {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("name", &self.name)?;
        validate_non_negative_amount("price", self.price)?;
        validate_non_negative_amount("quantity", self.quantity as f64)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerDraft {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub country: String,
}

impl Validate for CustomerDraft {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("first_name", &self.first_name)?;
        validate_non_empty_string("last_name", &self.last_name)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub customer: i64,
    pub total: f64,
}

impl Validate for InvoiceDraft {
    fn validate(&self) -> Result<()> {
        if self.customer <= 0 {
            return Err(crate::utils::error::TrinityError::validation(
                "customer must reference an existing customer id",
            ));
        }
        validate_non_negative_amount("total", self.total)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_coerces_string_decimals() {
        let product: Product = serde_json::from_value(json!({
            "id": 3,
            "name": "Nutella",
            "price": "4.99",
            "quantity": 12,
            "nutritional_info": {"nutriments": {"fat_100g": 30.9}}
        }))
        .unwrap();

        assert_eq!(product.price, Some(4.99));
        assert_eq!(product.quantity, Some(12.0));
        assert!((product.inventory_value() - 59.88).abs() < 1e-9);
        assert!(!product.lacks_nutrition());
        assert!(product.nutrition().has_data());
    }

    #[test]
    fn test_bad_fields_do_not_reject_the_record() {
        let product: Product = serde_json::from_value(json!({
            "id": "8",
            "name": null,
            "price": "free",
            "quantity": null,
            "brand": 42
        }))
        .unwrap();

        assert_eq!(product.id, 8);
        assert_eq!(product.name, "");
        assert_eq!(product.price, None);
        assert_eq!(product.brand, "42");
        assert_eq!(product.inventory_value(), 0.0);
        assert!(product.lacks_nutrition());
    }

    #[test]
    fn test_invoice_parses_date_only_and_garbage() {
        let invoices: Vec<Invoice> = serde_json::from_value(json!([
            {"id": 1, "customer": 2, "total": "10.50", "created_at": "2024-01-01"},
            {"id": 2, "customer": "2", "total": 5, "created_at": "not a date"}
        ]))
        .unwrap();

        assert_eq!(invoices[0].total, Some(10.5));
        assert!(invoices[0].created_at.is_some());
        assert_eq!(invoices[1].customer, Some(2));
        assert_eq!(invoices[1].created_at, None);
    }

    #[test]
    fn test_empty_nutrition_object_counts_as_missing() {
        let product: Product =
            serde_json::from_value(json!({"id": 1, "name": "Milk", "nutritional_info": {}})).unwrap();
        assert!(product.lacks_nutrition());
    }

    #[test]
    fn test_draft_validation() {
        let mut draft = ProductDraft {
            name: "Bread".to_string(),
            price: 2.5,
            ..Default::default()
        };
        assert!(draft.validate().is_ok());
        draft.price = -1.0;
        assert!(draft.validate().is_err());

        assert!(InvoiceDraft { customer: 0, total: 1.0 }.validate().is_err());
        assert!(InvoiceDraft { customer: 4, total: 1.0 }.validate().is_ok());

        let customer = CustomerDraft {
            first_name: "Ada".to_string(),
            last_name: " ".to_string(),
            ..Default::default()
        };
        assert!(customer.validate().is_err());
    }

    #[test]
    fn test_product_draft_omits_missing_nutrition() {
        let draft = ProductDraft {
            name: "Eggs".to_string(),
            price: 3.0,
            quantity: 12,
            ..Default::default()
        };
        let body = serde_json::to_value(&draft).unwrap();
        assert!(body.get("nutritional_info").is_none());
        assert_eq!(body["quantity"], json!(12));
    }
}
