/// 商品CRUDハンドラー
///
/// 1イベントを受け取り、HTTPメソッドとidの有無でディスパッチして
/// バリデーション・SQL実行・レスポンス整形を行う。
/// 呼び出し間で状態を持たず、共有するのは注入されたリポジトリ（接続プール）のみ。
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, error, info, info_span, Instrument};

use crate::application::{RequestParseError, RequestParser};
use crate::domain::validation::{
    self, FieldErrors, validate_boolean_fields, validate_number_fields, validate_required_fields,
    validate_string_fields, validate_text_fields,
};
use crate::domain::{ApiResponse, NewProduct, ProductChanges, ProductId};
use crate::infrastructure::{ProductRepository, ProductRepositoryError};

/// ボディがJSONオブジェクトでない場合のメッセージ
pub const BODY_NOT_OBJECT_MESSAGE: &str = "Request body must be a JSON object";

/// ハンドラー内部のエラー型
///
/// すべて`handle`で500レスポンスに変換され、詳細は呼び出し元に返さない。
#[derive(Debug, Error)]
pub enum ProductHandlerError {
    /// イベントのパースに失敗
    #[error("request parse error: {0}")]
    Parse(#[from] RequestParseError),

    /// データベースアクセスに失敗
    #[error("repository error: {0}")]
    Repository(#[from] ProductRepositoryError),

    /// レスポンスのシリアライズに失敗
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// バリデーション済みのボディから商品を組み立てられなかった
    #[error("validated body could not be converted to a product")]
    UnconvertibleBody,
}

/// 商品CRUDハンドラー
pub struct ProductHandler<R>
where
    R: ProductRepository,
{
    /// 商品リポジトリ
    repository: R,
}

impl<R> ProductHandler<R>
where
    R: ProductRepository,
{
    /// 新しいProductHandlerを作成
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Lambdaイベントを処理してレスポンスを返す
    ///
    /// エラー境界はここだけで、内部エラーはログに出したうえで
    /// 汎用の500レスポンスに変換する。
    pub async fn handle(&self, event: &Value) -> ApiResponse {
        match self.try_handle(event).await {
            Ok(response) => {
                debug!(status_code = response.status_code, "レスポンス返却");
                response
            }
            Err(err) => {
                error!(error = %err, "リクエスト処理中にエラーが発生");
                ApiResponse::internal_error()
            }
        }
    }

    async fn try_handle(&self, event: &Value) -> Result<ApiResponse, ProductHandlerError> {
        let request = RequestParser::parse(event)?;

        let span = info_span!(
            "request",
            method = %request.method,
            product_id = request.id.as_deref().unwrap_or("-"),
        );

        async {
            info!(
                raw_path = request.raw_path.as_deref().unwrap_or(""),
                "リクエスト受信"
            );

            match (request.method.as_str(), request.id.as_deref()) {
                ("GET", Some(id)) => self.get_product(id).await,
                ("GET", None) => self.list_products().await,
                ("POST", _) => self.create_product(request.body.as_ref()).await,
                ("PUT", Some(id)) => self.update_product(id, request.body.as_ref()).await,
                ("DELETE", Some(id)) => self.delete_product(id).await,
                ("PUT", None) | ("DELETE", None) => {
                    info!("idが指定されていない");
                    Ok(ApiResponse::invalid_id())
                }
                (method, _) => {
                    info!(method = method, "未対応のメソッド");
                    Ok(ApiResponse::method_not_allowed(method))
                }
            }
        }
        .instrument(span)
        .await
    }

    /// GET（id指定）: 1件取得
    async fn get_product(&self, raw_id: &str) -> Result<ApiResponse, ProductHandlerError> {
        let Some(id) = Self::parse_id(raw_id) else {
            return Ok(ApiResponse::invalid_id());
        };

        match self.repository.find_by_id(id).await? {
            Some(product) => Ok(ApiResponse::from_serializable(200, &product)?),
            None => Ok(ApiResponse::not_found()),
        }
    }

    /// GET（id指定なし）: 全件取得
    async fn list_products(&self) -> Result<ApiResponse, ProductHandlerError> {
        let products = self.repository.find_all().await?;
        debug!(count = products.len(), "商品一覧を取得");

        Ok(ApiResponse::from_serializable(200, &products)?)
    }

    /// POST: 新規作成
    async fn create_product(&self, body: Option<&Value>) -> Result<ApiResponse, ProductHandlerError> {
        let empty = Value::Object(Map::new());
        let body = match body {
            None | Some(Value::Null) => &empty,
            Some(value) if value.is_object() => value,
            Some(_) => return Ok(ApiResponse::error(400, BODY_NOT_OBJECT_MESSAGE)),
        };

        let name = body.get("name");
        let price = body.get("price");
        let description = body.get("description");
        let slug = body.get("slug");
        let featured = body.get("featured");

        let errors = validation::merge([
            validate_required_fields(&[
                ("name", name),
                ("price", price),
                ("description", description),
                ("slug", slug),
            ]),
            validate_string_fields(&[("name", name), ("slug", slug), ("description", description)]),
            validate_text_fields(&[("name", name), ("slug", slug), ("description", description)]),
            validate_number_fields(&[("price", price)]),
            validate_boolean_fields(&[("featured", featured)]),
        ]);

        if !errors.is_empty() {
            return Ok(Self::reject(errors));
        }

        let new_product = NewProduct::from_body(body).ok_or(ProductHandlerError::UnconvertibleBody)?;
        let inserted = self.repository.insert(&new_product).await?;
        info!(product_id = inserted.id, "商品を作成");

        Ok(ApiResponse::from_serializable(201, &inserted)?)
    }

    /// PUT: 部分更新
    ///
    /// リクエストに存在するキーだけを反映し、それ以外は既存値を維持する。
    /// name/price/slug/descriptionのnullは未指定扱い、featuredのnullはフラグ解除。
    async fn update_product(
        &self,
        raw_id: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, ProductHandlerError> {
        let Some(id) = Self::parse_id(raw_id) else {
            return Ok(ApiResponse::invalid_id());
        };

        let empty = Value::Object(Map::new());
        let body = match body {
            None | Some(Value::Null) => &empty,
            Some(value) if value.is_object() => value,
            Some(_) => return Ok(ApiResponse::error(400, BODY_NOT_OBJECT_MESSAGE)),
        };

        let present = move |key: &str| body.get(key).filter(|value| !value.is_null());
        let name = present("name");
        let price = present("price");
        let description = present("description");
        let slug = present("slug");
        let featured = present("featured");

        let errors = validation::merge([
            validate_string_fields(&[("name", name), ("slug", slug), ("description", description)]),
            validate_text_fields(&[("name", name), ("slug", slug), ("description", description)]),
            validate_number_fields(&[("price", price)]),
            validate_boolean_fields(&[("featured", featured)]),
        ]);

        if !errors.is_empty() {
            return Ok(Self::reject(errors));
        }

        let Some(current) = self.repository.find_by_id(id).await? else {
            return Ok(ApiResponse::not_found());
        };

        let resolved = ProductChanges::from_body(body).apply_to(&current);

        // 取得後に削除された場合もレコード不在として扱う
        match self.repository.update(&resolved).await? {
            Some(updated) => {
                info!(product_id = updated.id, "商品を更新");
                Ok(ApiResponse::from_serializable(201, &updated)?)
            }
            None => Ok(ApiResponse::not_found()),
        }
    }

    /// DELETE: 削除
    async fn delete_product(&self, raw_id: &str) -> Result<ApiResponse, ProductHandlerError> {
        let Some(id) = Self::parse_id(raw_id) else {
            return Ok(ApiResponse::invalid_id());
        };

        match self.repository.delete(id).await? {
            Some(_) => {
                info!(product_id = id, "商品を削除");
                Ok(ApiResponse::deleted())
            }
            None => Ok(ApiResponse::not_found()),
        }
    }

    fn parse_id(raw_id: &str) -> Option<ProductId> {
        let id = validation::parse_identifier(Some(raw_id));
        if id.is_none() {
            info!(raw_id = raw_id, "idが整数でない");
        }
        id
    }

    fn reject(errors: FieldErrors) -> ApiResponse {
        info!(fields = ?errors.keys().collect::<Vec<_>>(), "バリデーションエラー");
        ApiResponse::validation_failed(&errors)
    }
}
