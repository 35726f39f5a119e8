//! Product types and the add-product form.

use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};
use crate::validation::FieldErrors;
use serde::{Deserialize, Serialize};

/// Maximum length of a product name.
pub const MAX_NAME_LEN: usize = 50;

/// Maximum length of a product description.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Maximum length of a stored image reference.
pub const MAX_IMAGE_REF_LEN: usize = 100;

/// File extensions accepted for product images.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpe", "jpeg", "png", "gif", "svg", "bmp"];

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    /// Unique display name.
    pub name: String,
    /// Price in minor currency units.
    pub price: i64,
    /// Units on hand. Checkout does not floor this at zero.
    pub stock: i64,
    pub description: String,
    /// Public URL of the product image.
    pub image: String,
}

impl Product {
    /// Price as money in the shop currency.
    pub fn unit_price(&self, currency: Currency) -> Money {
        Money::new(self.price, currency)
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// A validated product that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub price: i64,
    pub stock: i64,
    pub description: String,
    pub image: String,
}

/// Raw fields of the admin add-product form.
///
/// The image itself travels separately; only its client file name is
/// checked here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProductForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub stock: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_filename: Option<String>,
}

impl NewProductForm {
    /// Validate every field, collecting all messages before failing.
    pub fn validate(&self) -> Result<ProductDraft, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = errors.required_text("name", &self.name, MAX_NAME_LEN);
        let price = errors.integer("price", &self.price);
        let stock = errors.integer("stock", &self.stock);
        let description = errors.optional_text("description", &self.description, MAX_DESCRIPTION_LEN);

        match self.image_filename.as_deref().map(str::trim) {
            None | Some("") => errors.add("image", "This field is required."),
            Some(file_name) if !has_image_extension(file_name) => {
                errors.add("image", "Images only!");
            }
            Some(_) => {}
        }

        errors.finish(|| ProductDraft {
            name,
            price: price.unwrap_or_default(),
            stock: stock.unwrap_or_default(),
            description,
        })
    }
}

/// Form fields that passed validation, waiting for the stored image URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub price: i64,
    pub stock: i64,
    pub description: String,
}

impl ProductDraft {
    /// Attach the public URL of the saved image.
    pub fn with_image(self, image: impl Into<String>) -> NewProduct {
        NewProduct {
            name: self.name,
            price: self.price,
            stock: self.stock,
            description: self.description,
            image: image.into(),
        }
    }
}

/// Check a file name against [`IMAGE_EXTENSIONS`], case-insensitively.
pub fn has_image_extension(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(stem, ext)| {
            !stem.is_empty() && IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        })
        .unwrap_or(false)
}

/// Resolves product ids to products.
///
/// Implemented by the SQL catalog store and by plain product slices, so cart
/// pricing can run with or without a database.
pub trait ProductLookup {
    fn find_product(&self, id: ProductId) -> Result<Option<Product>, CommerceError>;

    /// Like [`find_product`](Self::find_product) but a missing id is an error.
    fn require_product(&self, id: ProductId) -> Result<Product, CommerceError> {
        self.find_product(id)?
            .ok_or(CommerceError::ProductNotFound(id))
    }
}

impl ProductLookup for [Product] {
    fn find_product(&self, id: ProductId) -> Result<Option<Product>, CommerceError> {
        Ok(self.iter().find(|p| p.id == id).cloned())
    }
}

impl ProductLookup for Vec<Product> {
    fn find_product(&self, id: ProductId) -> Result<Option<Product>, CommerceError> {
        self.as_slice().find_product(id)
    }
}
