//! Product catalog

use rusty_money::{Money, iso::Currency};
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Product
///
/// A read-only reference record. The cart snapshots what it needs from a
/// product at add time; later catalog changes never reach back into a cart.
#[derive(Debug, Clone)]
pub struct Product<'a> {
    /// Product name
    pub name: String,

    /// Product category
    pub category: String,

    /// Unit price
    pub price: Money<'a, Currency>,

    /// Units currently on hand
    pub stock_quantity: u32,
}

/// In-memory product catalog.
#[derive(Debug)]
pub struct Catalog<'a> {
    products: SlotMap<ProductKey, Product<'a>>,
}

impl<'a> Catalog<'a> {
    /// Create a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            products: SlotMap::with_key(),
        }
    }

    /// Insert a product, returning its key.
    pub fn insert(&mut self, product: Product<'a>) -> ProductKey {
        self.products.insert(product)
    }

    /// Look up a product by key.
    pub fn get(&self, key: ProductKey) -> Option<&Product<'a>> {
        self.products.get(key)
    }

    /// List products matching an optional search term and category.
    ///
    /// The term matches case-insensitively anywhere in the product name; the
    /// category must match exactly (ignoring ASCII case). Passing `None` for
    /// either filter leaves it unconstrained.
    pub fn search(
        &self,
        term: Option<&str>,
        category: Option<&str>,
    ) -> Vec<(ProductKey, &Product<'a>)> {
        let term = term.map(str::to_lowercase);

        self.products
            .iter()
            .filter(|(_, product)| {
                term.as_deref()
                    .is_none_or(|t| product.name.to_lowercase().contains(t))
            })
            .filter(|(_, product)| {
                category.is_none_or(|c| product.category.eq_ignore_ascii_case(c))
            })
            .collect()
    }

    /// Iterate over all products.
    pub fn iter(&self) -> impl Iterator<Item = (ProductKey, &Product<'a>)> {
        self.products.iter()
    }

    /// Get the number of products in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl Default for Catalog<'_> {
    fn default() -> Self {
        Self::new()
    }
}
