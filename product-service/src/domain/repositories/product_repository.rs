use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::info;

use crate::domain::models::product::Product;
use crate::error::AppError;

/// Persistence over the `products` table.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Inserts `product` under a freshly assigned id, discarding any id it carried.
    async fn create(&self, product: &mut Product) -> Result<(), AppError>;

    /// Overwrites the row matching `product.id`; a product without an id matches nothing.
    async fn update(&self, product: &Product) -> Result<(), AppError>;

    async fn delete(&self, product: &Product) -> Result<(), AppError>;

    async fn find(&self, id: i64) -> Result<Option<Product>, AppError>;

    async fn find_or_fail(&self, id: i64) -> Result<Product, AppError> {
        info!("Processing lookup or 404 for id {} ...", id);
        self.find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product with id '{}' was not found.", id)))
    }

    async fn all(&self) -> Result<Vec<Product>, AppError>;

    async fn find_by_name(&self, name: &str) -> Result<Vec<Product>, AppError>;

    async fn find_by_category(&self, category: &str) -> Result<Vec<Product>, AppError>;
}

#[derive(Clone, Debug)]
pub struct SqliteProductRepository {
    pool: SqlitePool,
}

impl SqliteProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for SqliteProductRepository {
    async fn create(&self, product: &mut Product) -> Result<(), AppError> {
        info!("Creating {}", product.name);

        // id 置空，由数据库分配主键
        product.id = None;

        let result = sqlx::query(
            r#"
            INSERT INTO products (name, category, price, stock, description)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price)
        .bind(product.stock)
        .bind(&product.description)
        .execute(&self.pool)
        .await?;

        product.id = Some(result.last_insert_rowid());
        info!("Created {}", product);
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<(), AppError> {
        info!("Saving {}", product);

        sqlx::query(
            r#"
            UPDATE products
            SET name = ?, category = ?, price = ?, stock = ?, description = ?
            WHERE id = ?
            "#,
        )
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price)
        .bind(product.stock)
        .bind(&product.description)
        .bind(product.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, product: &Product) -> Result<(), AppError> {
        info!("Deleting {}", product);

        sqlx::query(r#"DELETE FROM products WHERE id = ?"#)
            .bind(product.id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find(&self, id: i64) -> Result<Option<Product>, AppError> {
        info!("Processing lookup for id {} ...", id);

        let product = sqlx::query_as::<_, Product>(
            r#"SELECT id, name, category, price, stock, description FROM products WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn all(&self) -> Result<Vec<Product>, AppError> {
        info!("Processing all Products");

        let products = sqlx::query_as::<_, Product>(
            r#"SELECT id, name, category, price, stock, description FROM products ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Product>, AppError> {
        info!("Processing name query for {} ...", name);

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category, price, stock, description FROM products
            WHERE name = ?
            ORDER BY id
            "#,
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn find_by_category(&self, category: &str) -> Result<Vec<Product>, AppError> {
        info!("Processing category query for {} ...", category);

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category, price, stock, description FROM products
            WHERE category = ?
            ORDER BY id
            "#,
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }
}
