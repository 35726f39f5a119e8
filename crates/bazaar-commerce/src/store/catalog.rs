//! SQL-backed product catalog.

use bazaar_db::{params, Db, Executor};

use crate::catalog::{NewProduct, Product, ProductLookup};
use crate::error::CommerceError;
use crate::ids::ProductId;

const PRODUCT_COLUMNS: &str = "id, name, price, stock, description, image";

/// Product table access.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    db: Db,
}

impl CatalogStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// All products in insertion order.
    pub fn list(&self) -> Result<Vec<Product>, CommerceError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM product ORDER BY id");
        Ok(self.db.query_as(&sql, params![])?)
    }

    pub fn get(&self, id: ProductId) -> Result<Option<Product>, CommerceError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE id = ?");
        Ok(self.db.query_optional(&sql, params![id])?)
    }

    /// Number of products with stock above zero.
    pub fn count_in_stock(&self) -> Result<i64, CommerceError> {
        Ok(self
            .db
            .query_scalar("SELECT COUNT(*) FROM product WHERE stock > 0", params![])?)
    }

    /// Store a new product. A duplicate name fails with
    /// [`CommerceError::ConstraintViolation`].
    pub fn insert(&self, product: &NewProduct) -> Result<Product, CommerceError> {
        let id = self
            .db
            .insert(
                "INSERT INTO product (name, price, stock, description, image) \
                 VALUES (?, ?, ?, ?, ?)",
                params![
                    product.name.as_str(),
                    product.price,
                    product.stock,
                    product.description.as_str(),
                    product.image.as_str()
                ],
            )
            .map_err(|e| {
                if e.is_constraint_violation() {
                    CommerceError::ConstraintViolation(format!(
                        "a product named '{}' already exists",
                        product.name
                    ))
                } else {
                    e.into()
                }
            })?;

        let id = ProductId::new(id);
        tracing::info!(product_id = %id, name = %product.name, "product created");

        Ok(Product {
            id,
            name: product.name.clone(),
            price: product.price,
            stock: product.stock,
            description: product.description.clone(),
            image: product.image.clone(),
        })
    }
}

impl ProductLookup for CatalogStore {
    fn find_product(&self, id: ProductId) -> Result<Option<Product>, CommerceError> {
        self.get(id)
    }
}

/// Subtract `quantity` from a product's stock. No floor: stock may go
/// negative.
pub(crate) fn decrement_stock<E: Executor>(
    exec: &E,
    id: ProductId,
    quantity: i64,
) -> Result<(), CommerceError> {
    let changed = exec.execute(
        "UPDATE product SET stock = stock - ? WHERE id = ?",
        params![quantity, id],
    )?;
    if changed == 0 {
        return Err(CommerceError::ProductNotFound(id));
    }
    Ok(())
}
