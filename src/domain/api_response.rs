/// Lambdaに返却するHTTP形式のレスポンス
///
/// Function URL / HTTP API (payload v2) の形式に合わせ、
/// `statusCode`とJSON文字列の`body`を持つ。
/// 定型レスポンスは呼び出しごとに新しい値を生成する関数として提供する。
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::validation::FieldErrors;

/// ID形式エラー時のメッセージ
pub const INVALID_ID_MESSAGE: &str = "Id must be an integer";
/// レコード不在時のメッセージ
pub const NOT_FOUND_MESSAGE: &str = "Record not found";
/// 内部エラー時のメッセージ
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";
/// 削除成功時のメッセージ
pub const DELETED_MESSAGE: &str = "Product deleted successfully";

/// HTTP形式のレスポンス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    /// HTTPステータスコード
    pub status_code: u16,
    /// レスポンスヘッダー
    pub headers: HashMap<String, String>,
    /// JSONシリアライズ済みのボディ
    pub body: String,
}

impl ApiResponse {
    /// JSON値をボディに持つレスポンスを生成
    pub fn json(status_code: u16, body: &Value) -> Self {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());

        Self {
            status_code,
            headers,
            body: body.to_string(),
        }
    }

    /// シリアライズ可能な値をボディに持つレスポンスを生成
    pub fn from_serializable<T: Serialize>(
        status_code: u16,
        value: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::json(status_code, &serde_json::to_value(value)?))
    }

    /// `{"error": ...}`形式のレスポンスを生成
    pub fn error(status_code: u16, error: impl Into<Value>) -> Self {
        Self::json(status_code, &json!({ "error": error.into() }))
    }

    /// 400: IDが整数でない（またはIDが必要なのに指定されていない）
    pub fn invalid_id() -> Self {
        Self::error(400, INVALID_ID_MESSAGE)
    }

    /// 400: フィールドのバリデーションエラー（全フィールド分をまとめて返す）
    pub fn validation_failed(errors: &FieldErrors) -> Self {
        Self::error(400, json!(errors))
    }

    /// 404: レコードが存在しない
    pub fn not_found() -> Self {
        Self::error(404, NOT_FOUND_MESSAGE)
    }

    /// 405: 未対応のHTTPメソッド
    pub fn method_not_allowed(method: &str) -> Self {
        Self::error(405, format!("Method {} not allowed", method))
    }

    /// 500: 内部エラー（詳細は呼び出し元に返さない）
    pub fn internal_error() -> Self {
        Self::error(500, INTERNAL_ERROR_MESSAGE)
    }

    /// 200: 削除成功
    pub fn deleted() -> Self {
        Self::json(200, &json!({ "message": DELETED_MESSAGE }))
    }

    /// ボディをJSONとしてパース（テスト・ログ用）
    pub fn body_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}
