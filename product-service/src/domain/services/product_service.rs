use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::domain::models::product::{decode_product, Product};
use crate::domain::repositories::product_repository::ProductRepository;
use crate::error::AppError;

/// 列表查询条件，name 优先于 category
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductFilter {
    All,
    Name(String),
    Category(String),
}

impl ProductFilter {
    pub fn from_query(name: Option<String>, category: Option<String>) -> Self {
        match (name.filter(|n| !n.is_empty()), category.filter(|c| !c.is_empty())) {
            (Some(name), _) => Self::Name(name),
            (None, Some(category)) => Self::Category(category),
            (None, None) => Self::All,
        }
    }
}

pub struct ProductService {
    repository: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(repository: Arc<dyn ProductRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_products(&self, filter: ProductFilter) -> Result<Vec<Product>, AppError> {
        let products = match filter {
            ProductFilter::Name(name) => {
                info!("Filtering by name: {}", name);
                self.repository.find_by_name(&name).await?
            }
            ProductFilter::Category(category) => {
                info!("Filtering by category: {}", category);
                self.repository.find_by_category(&category).await?
            }
            ProductFilter::All => {
                info!("Returning unfiltered list.");
                self.repository.all().await?
            }
        };

        info!("[{}] Products returned", products.len());
        Ok(products)
    }

    pub async fn get_product(&self, id: i64) -> Result<Product, AppError> {
        self.repository.find_or_fail(id).await
    }

    pub async fn create_product(&self, payload: &Value) -> Result<Product, AppError> {
        let mut product = decode_product(payload, Product::default())?;
        self.repository.create(&mut product).await?;

        info!("Product with new id [{}] created!", product.id.unwrap_or_default());
        Ok(product)
    }

    /// 先确认存在，再校验请求体
    pub async fn update_product(&self, id: i64, payload: &Value) -> Result<Product, AppError> {
        let product = self.repository.find_or_fail(id).await?;

        let mut product = decode_product(payload, product)?;
        product.id = Some(id);
        self.repository.update(&product).await?;

        Ok(product)
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), AppError> {
        let product = self.repository.find_or_fail(id).await?;
        self.repository.delete(&product).await?;

        info!("Product with id [{}] was deleted", id);
        Ok(())
    }

    /// 库存减一。读改写之间没有加锁，并发购买可能丢失一次扣减
    pub async fn purchase_product(&self, id: i64) -> Result<Product, AppError> {
        let mut product = self
            .repository
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product with id [{}] was not found.", id)))?;

        if product.stock <= 0 {
            return Err(AppError::Conflict(format!(
                "Product with id [{}] is out of stock.",
                id
            )));
        }

        product.stock -= 1;
        self.repository.update(&product).await?;

        info!("Product with id [{}] has been purchased!", id);
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::product_repository::SqliteProductRepository;
    use crate::infrastructure::database::sqlite::memory_pool;
    use serde_json::json;

    async fn service() -> ProductService {
        let repo = SqliteProductRepository::new(memory_pool().await.unwrap());
        ProductService::new(Arc::new(repo))
    }

    fn payload(stock: i64) -> Value {
        json!({"name": "iPhone13", "category": "Phone", "price": 999, "stock": stock, "description": "x"})
    }

    #[test]
    fn name_filter_wins_over_category() {
        assert_eq!(
            ProductFilter::from_query(Some("iPad".into()), Some("Tablet".into())),
            ProductFilter::Name("iPad".into())
        );
        assert_eq!(
            ProductFilter::from_query(Some(String::new()), Some("Tablet".into())),
            ProductFilter::Category("Tablet".into())
        );
        assert_eq!(ProductFilter::from_query(None, None), ProductFilter::All);
    }

    #[tokio::test]
    async fn create_ignores_supplied_id() {
        let service = service().await;
        let mut body = payload(5);
        body["id"] = json!(77);

        let created = service.create_product(&body).await.unwrap();

        assert_eq!(created.id, Some(1));
        assert_eq!(service.get_product(1).await.unwrap(), created);
    }

    #[tokio::test]
    async fn invalid_create_persists_nothing() {
        let service = service().await;

        let err = service.create_product(&json!({"name": "X"})).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(service.list_products(ProductFilter::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_keeps_path_id() {
        let service = service().await;
        let created = service.create_product(&payload(5)).await.unwrap();

        let mut body = payload(9);
        body["id"] = json!(1234);
        body["name"] = json!("Huawei");
        let updated = service.update_product(1, &body).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Huawei");
        assert_eq!(updated.stock, 9);
        assert_eq!(service.get_product(1).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn update_checks_existence_before_body() {
        let service = service().await;

        let err = service.update_product(3, &json!("garbage")).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_then_lookup_is_not_found() {
        let service = service().await;
        service.create_product(&payload(1)).await.unwrap();

        service.delete_product(1).await.unwrap();

        assert!(matches!(service.get_product(1).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.delete_product(1).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn purchase_runs_stock_down_to_conflict() {
        let service = service().await;
        service.create_product(&payload(3)).await.unwrap();

        for expected in [2, 1, 0] {
            assert_eq!(service.purchase_product(1).await.unwrap().stock, expected);
        }

        let err = service.purchase_product(1).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m == "Product with id [1] is out of stock."));
        assert_eq!(service.get_product(1).await.unwrap().stock, 0);
    }

    #[tokio::test]
    async fn purchase_of_negative_stock_is_a_conflict() {
        let service = service().await;
        service.create_product(&payload(-2)).await.unwrap();

        assert!(matches!(service.purchase_product(1).await, Err(AppError::Conflict(_))));
        assert_eq!(service.get_product(1).await.unwrap().stock, -2);
    }

    #[tokio::test]
    async fn purchase_of_unknown_product_is_not_found() {
        let service = service().await;
        let err = service.purchase_product(42).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "Product with id [42] was not found."));
    }
}
