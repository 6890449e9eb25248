//! Inventory medication models.

use serde::{Deserialize, Serialize};

/// A single stocked medication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationRecord {
    /// Unique name (case-insensitive)
    pub name: String,
    /// Units currently in stock
    pub quantity_in_stock: u32,
    /// Unit price
    pub price: f64,
    /// How often to take it (e.g., "twice daily")
    pub dosage_frequency: Option<String>,
    /// Free-text usage instructions
    pub usage_instructions: Option<String>,
    /// Food interactions (e.g., "take with food")
    pub food_warnings: Option<String>,
}

impl MedicationRecord {
    pub fn is_in_stock(&self) -> bool {
        self.quantity_in_stock > 0
    }
}

/// Input for adding a medication to the inventory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewMedication {
    pub name: String,
    pub quantity_in_stock: u32,
    pub price: f64,
    #[serde(default)]
    pub dosage_frequency: Option<String>,
    #[serde(default)]
    pub usage_instructions: Option<String>,
    #[serde(default)]
    pub food_warnings: Option<String>,
}

impl NewMedication {
    /// Create a new medication with required fields.
    pub fn new(name: impl Into<String>, quantity_in_stock: u32, price: f64) -> Self {
        Self {
            name: name.into(),
            quantity_in_stock,
            price,
            dosage_frequency: None,
            usage_instructions: None,
            food_warnings: None,
        }
    }

    /// Check field constraints, returning a description of the first violation.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("medication name cannot be empty".into());
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(format!("price must be a non-negative number, got {}", self.price));
        }
        Ok(())
    }

    /// Convert into a record, trimming the name and blank optional fields.
    pub fn into_record(self) -> MedicationRecord {
        MedicationRecord {
            name: self.name.trim().to_string(),
            quantity_in_stock: self.quantity_in_stock,
            price: self.price,
            dosage_frequency: non_blank(self.dosage_frequency),
            usage_instructions: non_blank(self.usage_instructions),
            food_warnings: non_blank(self.food_warnings),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
