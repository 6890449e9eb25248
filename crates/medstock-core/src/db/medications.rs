//! Medication inventory operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult, InventoryStore};
use crate::models::{MedicationRecord, NewMedication};

const SELECT_COLUMNS: &str = r#"
    SELECT name, quantity_in_stock, price, dosage_frequency, usage_instructions, food_warnings
    FROM medications
"#;

impl Database {
    /// Add a medication. Names are unique case-insensitively.
    pub fn add_medication(&self, medication: NewMedication) -> DbResult<MedicationRecord> {
        medication.validate().map_err(DbError::Constraint)?;
        let record = medication.into_record();

        let result = self.conn.execute(
            r#"
            INSERT INTO medications (
                name, name_key, quantity_in_stock, price,
                dosage_frequency, usage_instructions, food_warnings
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                record.name,
                name_key(&record.name),
                record.quantity_in_stock,
                record.price,
                record.dosage_frequency,
                record.usage_instructions,
                record.food_warnings,
            ],
        );

        match result {
            Ok(_) => Ok(record),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Err(DbError::Duplicate(record.name))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get a medication by name (case-insensitive).
    pub fn get_medication(&self, name: &str) -> DbResult<Option<MedicationRecord>> {
        let sql = format!("{} WHERE name_key = ?1", SELECT_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, [name_key(name)], map_row)
            .optional()?)
    }

    /// All medications in insertion order.
    pub fn list_medications(&self) -> DbResult<Vec<MedicationRecord>> {
        let sql = format!("{} ORDER BY id", SELECT_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_row)?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    /// Set the stock level of a medication.
    pub fn update_stock(&self, name: &str, quantity_in_stock: u32) -> DbResult<MedicationRecord> {
        let rows_affected = self.conn.execute(
            "UPDATE medications SET quantity_in_stock = ?1, updated_at = datetime('now') WHERE name_key = ?2",
            params![quantity_in_stock, name_key(name)],
        )?;
        if rows_affected == 0 {
            return Err(DbError::NotFound(name.to_string()));
        }

        self.get_medication(name)?
            .ok_or_else(|| DbError::NotFound(name.to_string()))
    }
}

impl InventoryStore for Database {
    fn find_exact_in_stock(&self, name: &str) -> DbResult<Option<MedicationRecord>> {
        let sql = format!(
            "{} WHERE name_key = ?1 AND quantity_in_stock > 0",
            SELECT_COLUMNS
        );
        Ok(self
            .conn
            .query_row(&sql, [name_key(name)], map_row)
            .optional()?)
    }

    fn find_exact(&self, name: &str) -> DbResult<Option<MedicationRecord>> {
        self.get_medication(name)
    }

    fn list_all(&self) -> DbResult<Vec<MedicationRecord>> {
        self.list_medications()
    }
}

/// Lookup key for a name. SQLite `NOCASE` only folds ASCII, so names are
/// folded here with Unicode rules and matched on this key.
pub(crate) fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<MedicationRecord> {
    Ok(MedicationRecord {
        name: row.get(0)?,
        quantity_in_stock: row.get(1)?,
        price: row.get(2)?,
        dosage_frequency: row.get(3)?,
        usage_instructions: row.get(4)?,
        food_warnings: row.get(5)?,
    })
}
