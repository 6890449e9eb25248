//! SQLite schema definition.

/// Complete database schema for medstock.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Medication Inventory
-- ============================================================================

CREATE TABLE IF NOT EXISTS medications (
    id INTEGER PRIMARY KEY AUTOINCREMENT,         -- insertion order = catalog order
    name TEXT NOT NULL,
    name_key TEXT NOT NULL UNIQUE,                -- trimmed, Unicode-lowercased name
    quantity_in_stock INTEGER NOT NULL DEFAULT 0 CHECK (quantity_in_stock >= 0),
    price REAL NOT NULL CHECK (price >= 0),
    dosage_frequency TEXT,
    usage_instructions TEXT,
    food_warnings TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Partial index for in-stock lookups
CREATE INDEX IF NOT EXISTS idx_medications_in_stock
    ON medications(name_key) WHERE quantity_in_stock > 0;
"#;
