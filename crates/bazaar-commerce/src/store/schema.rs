//! Table definitions for the catalog and order ledger.

use bazaar_db::Db;

use crate::error::CommerceError;

/// Schema, created idempotently at startup.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS product (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        VARCHAR(50) NOT NULL UNIQUE,
    price       INTEGER NOT NULL,
    stock       INTEGER NOT NULL,
    description VARCHAR(500) NOT NULL DEFAULT '',
    image       VARCHAR(100) NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS "order" (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    reference    VARCHAR(5) NOT NULL,
    first_name   VARCHAR(20) NOT NULL,
    last_name    VARCHAR(20) NOT NULL,
    phone_number VARCHAR(20) NOT NULL,
    email        VARCHAR(50) NOT NULL,
    address      VARCHAR(100) NOT NULL,
    city         VARCHAR(100) NOT NULL,
    region       VARCHAR(50) NOT NULL,
    country      VARCHAR(40) NOT NULL,
    status       VARCHAR(15) NOT NULL,
    payment_type VARCHAR(20) NOT NULL,
    placed_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS order_item (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id   INTEGER NOT NULL REFERENCES "order" (id),
    product_id INTEGER NOT NULL REFERENCES product (id),
    quantity   INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_order_item_order ON order_item (order_id);
"#;

/// Create any missing tables.
pub fn ensure_schema(db: &Db) -> Result<(), CommerceError> {
    db.execute_batch(SCHEMA)?;
    tracing::debug!("schema ensured");
    Ok(())
}
