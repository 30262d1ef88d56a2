/// PostgreSQLで商品を管理するためのリポジトリ
///
/// すべてのSQLパラメータは位置指定でバインドし、文字列連結は行わない。
/// idはSERIAL/BIGSERIAL、priceはNUMERIC/DOUBLE PRECISIONのどちらでも読めるよう、
/// 取得するカラムはすべてint8/float8にキャストする。
use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::domain::{NewProduct, Product, ProductId};

/// 商品リポジトリ操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProductRepositoryError {
    /// クエリ実行に失敗
    #[error("Query execution error: {0}")]
    QueryError(String),

    /// 接続に失敗
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

impl From<sqlx::Error> for ProductRepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => ProductRepositoryError::ConnectionError(err.to_string()),
            other => ProductRepositoryError::QueryError(other.to_string()),
        }
    }
}

/// 商品永続化用トレイト
///
/// 実際のPostgreSQLとテスト用モックを差し替え可能にする。
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// IDで1件取得（見つからなければ`Ok(None)`）
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, ProductRepositoryError>;

    /// 全件取得
    async fn find_all(&self) -> Result<Vec<Product>, ProductRepositoryError>;

    /// 新規作成し、採番済みのIDを含む行を返す
    async fn insert(&self, product: &NewProduct) -> Result<Product, ProductRepositoryError>;

    /// 全カラムを更新し、更新後の行を返す（対象がなければ`Ok(None)`）
    async fn update(&self, product: &Product) -> Result<Option<Product>, ProductRepositoryError>;

    /// IDで削除し、削除した行を返す（対象がなければ`Ok(None)`）
    async fn delete(&self, id: ProductId) -> Result<Option<Product>, ProductRepositoryError>;
}

/// ProductRepositoryのPostgreSQL実装
#[derive(Debug, Clone)]
pub struct PgProductRepository {
    /// 接続プール（Lambda実行環境内で共有）
    pool: PgPool,
}

impl PgProductRepository {
    /// 新しいPgProductRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, ProductRepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id::int8 AS id, name, price::float8 AS price, description, slug, featured \
             FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn find_all(&self) -> Result<Vec<Product>, ProductRepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id::int8 AS id, name, price::float8 AS price, description, slug, featured \
             FROM products ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn insert(&self, product: &NewProduct) -> Result<Product, ProductRepositoryError> {
        let inserted = sqlx::query_as::<_, Product>(
            "INSERT INTO products (name, price, description, slug, featured) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id::int8 AS id, name, price::float8 AS price, description, slug, featured",
        )
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.description)
        .bind(&product.slug)
        .bind(product.featured)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }

    async fn update(&self, product: &Product) -> Result<Option<Product>, ProductRepositoryError> {
        let updated = sqlx::query_as::<_, Product>(
            "UPDATE products SET name = $1, price = $2, slug = $3, featured = $4, description = $5 \
             WHERE id = $6 \
             RETURNING id::int8 AS id, name, price::float8 AS price, description, slug, featured",
        )
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.slug)
        .bind(product.featured)
        .bind(&product.description)
        .bind(product.id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: ProductId) -> Result<Option<Product>, ProductRepositoryError> {
        let deleted = sqlx::query_as::<_, Product>(
            "DELETE FROM products WHERE id = $1 \
             RETURNING id::int8 AS id, name, price::float8 AS price, description, slug, featured",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(deleted)
    }
}
