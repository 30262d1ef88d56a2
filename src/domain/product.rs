/// 商品エンティティ
///
/// productsテーブルの1行に対応するドメインモデルと、
/// 作成・更新時に使う入力モデルを定義する。
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 商品ID（ストレージ側で採番される整数）
pub type ProductId = i64;

/// productsテーブルの1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    /// 主キー（不変）
    pub id: ProductId,
    /// 商品名
    pub name: String,
    /// 価格
    pub price: f64,
    /// 説明文
    pub description: String,
    /// URLスラッグ
    pub slug: String,
    /// おすすめフラグ（未設定の場合はnull）
    pub featured: Option<bool>,
}

/// INSERT用の商品データ（idはストレージが採番する）
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub description: String,
    pub slug: String,
    pub featured: Option<bool>,
}

impl NewProduct {
    /// バリデーション済みのリクエストボディから生成
    ///
    /// 必須フィールドの存在と型はバリデーション層で検証済みであることが前提。
    /// 型が合わない場合は`None`を返す。
    pub fn from_body(body: &Value) -> Option<Self> {
        Some(Self {
            name: body.get("name")?.as_str()?.to_string(),
            price: body.get("price")?.as_f64()?,
            description: body.get("description")?.as_str()?.to_string(),
            slug: body.get("slug")?.as_str()?.to_string(),
            featured: match body.get("featured") {
                None | Some(Value::Null) => None,
                Some(value) => Some(value.as_bool()?),
            },
        })
    }
}

/// 部分更新の差分
///
/// 各フィールドは「キーがリクエストに存在したか」で区別する。
/// `None`は未指定（既存値を維持）、`Some`は指定値で置き換える。
/// `featured`の`Some(None)`は明示的なnull（フラグ解除）を表す。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub featured: Option<Option<bool>>,
}

impl ProductChanges {
    /// バリデーション済みのリクエストボディから差分を抽出
    ///
    /// 型が合わないフィールドは未指定として扱う。
    pub fn from_body(body: &Value) -> Self {
        Self {
            name: body.get("name").and_then(Value::as_str).map(str::to_string),
            price: body.get("price").and_then(Value::as_f64),
            description: body
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            slug: body.get("slug").and_then(Value::as_str).map(str::to_string),
            featured: match body.get("featured") {
                None => None,
                Some(Value::Null) => Some(None),
                Some(value) => value.as_bool().map(Some),
            },
        }
    }

    /// 既存の商品に差分を適用した結果を返す
    pub fn apply_to(self, current: &Product) -> Product {
        Product {
            id: current.id,
            name: self.name.unwrap_or_else(|| current.name.clone()),
            price: self.price.unwrap_or(current.price),
            description: self
                .description
                .unwrap_or_else(|| current.description.clone()),
            slug: self.slug.unwrap_or_else(|| current.slug.clone()),
            featured: self.featured.unwrap_or(current.featured),
        }
    }
}
