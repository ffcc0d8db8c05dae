//! Read-only client for the public product catalog.
//!
//! The catalog sits outside the sync core: it only populates `add_item`
//! inputs (category lists, product lists, product detail). Responses are
//! cached with `moka` (5-minute TTL) since catalog data changes rarely;
//! cart and order state is never cached here.

use std::time::Duration;

use moka::future::Cache;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use tangelo_core::{CartItem, ProductId};

use crate::config::ClientConfig;
use crate::remote::ServiceError;

const CACHE_CAPACITY: u64 = 1000;
const CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// A product as listed by the public catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogProduct {
    /// Catalog product ID.
    pub id: ProductId,
    /// Product title.
    pub title: String,
    /// Unit price in the currency's standard unit.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Long-form description shown on the detail screen.
    #[serde(default)]
    pub description: String,
    /// Category this product belongs to.
    #[serde(default)]
    pub category: String,
    /// Product image URL.
    pub image: String,
}

impl CatalogProduct {
    /// Convert into a single-unit cart line, ready for `add_item`.
    #[must_use]
    pub fn into_cart_item(self) -> CartItem {
        CartItem {
            id: self.id,
            title: self.title,
            price: self.price,
            image: self.image,
            quantity: 1,
        }
    }
}

/// Cached catalog responses.
#[derive(Clone)]
enum CacheValue {
    Categories(Vec<String>),
    Products(Vec<CatalogProduct>),
    Product(Box<CatalogProduct>),
}

/// Client for the public catalog API.
///
/// Category and product reads are cached for 5 minutes.
#[derive(Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<String, CacheValue>,
}

impl CatalogClient {
    /// Create a catalog client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Ok(Self {
            client,
            base_url: config.catalog_base_url.clone(),
            cache,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn fetch<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let response = self.client.get(self.endpoint(path)).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status(status));
        }

        Ok(response.json().await?)
    }

    /// Get the list of category names.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<String>, ServiceError> {
        let cache_key = "categories".to_string();

        if let Some(CacheValue::Categories(categories)) = self.cache.get(&cache_key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<String> = self.fetch("products/categories").await?;

        self.cache
            .insert(cache_key, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// Get the products in a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog request fails.
    #[instrument(skip(self), fields(category = %category))]
    pub async fn products_in_category(
        &self,
        category: &str,
    ) -> Result<Vec<CatalogProduct>, ServiceError> {
        let cache_key = format!("category:{category}");

        if let Some(CacheValue::Products(products)) = self.cache.get(&cache_key).await {
            debug!("Cache hit for category products");
            return Ok(products);
        }

        let products: Vec<CatalogProduct> =
            self.fetch(&format!("products/category/{category}")).await?;

        self.cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a single product by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn product(&self, product_id: ProductId) -> Result<CatalogProduct, ServiceError> {
        let cache_key = format!("product:{product_id}");

        if let Some(CacheValue::Product(product)) = self.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: CatalogProduct = self.fetch(&format!("products/{product_id}")).await?;

        self.cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Invalidate all cached catalog data.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_product_deserializes_from_catalog_shape() {
        let json = r#"{
            "id": 3,
            "title": "Mens Cotton Jacket",
            "price": 55.99,
            "description": "great outerwear jackets",
            "category": "men's clothing",
            "image": "https://img.example/3.jpg",
            "rating": { "rate": 4.7, "count": 500 }
        }"#;

        let product: CatalogProduct = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(3));
        assert_eq!(product.price, Decimal::new(5599, 2));
    }

    #[test]
    fn test_into_cart_item_starts_at_one_unit() {
        let product = CatalogProduct {
            id: ProductId::new(9),
            title: "Backpack".to_string(),
            price: Decimal::new(10995, 2),
            description: String::new(),
            category: "bags".to_string(),
            image: "https://img.example/9.jpg".to_string(),
        };

        let line = product.into_cart_item();
        assert_eq!(line.id, ProductId::new(9));
        assert_eq!(line.quantity, 1);
    }
}
