//! Product catalog module.

mod product;

pub use product::{
    has_image_extension, NewProduct, NewProductForm, Product, ProductDraft, ProductLookup,
    IMAGE_EXTENSIONS, MAX_DESCRIPTION_LEN, MAX_IMAGE_REF_LEN, MAX_NAME_LEN,
};
