/// Lambdaイベントパーサー
///
/// Function URL / HTTP API (payload v2) 形式のイベントJSONから
/// ルーティングに必要な情報だけを取り出す。
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value;
use thiserror::Error;

/// メソッドが取得できない場合のデフォルト
pub const DEFAULT_METHOD: &str = "GET";

/// パース済みのリクエスト
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRequest {
    /// HTTPメソッド（大文字小文字はそのまま）
    pub method: String,
    /// リクエストパス（ログ用）
    pub raw_path: Option<String>,
    /// パスパラメータのid（未検証の生文字列）
    pub id: Option<String>,
    /// JSONボディ（ボディがなければ`None`）
    pub body: Option<Value>,
}

/// イベントパースエラー
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RequestParseError {
    /// ボディがJSONとしてパースできない
    #[error("failed to parse body as JSON: {0}")]
    InvalidJsonBody(String),

    /// isBase64Encodedなのにボディがデコードできない
    #[error("failed to decode base64 body: {0}")]
    InvalidBase64Body(String),
}

/// Lambdaイベントパーサー
pub struct RequestParser;

impl RequestParser {
    /// イベントJSONをパースしてProductRequestに変換
    ///
    /// # 例
    /// ```
    /// use products::application::RequestParser;
    /// use serde_json::json;
    ///
    /// let event = json!({
    ///     "requestContext": { "http": { "method": "GET" } },
    ///     "rawPath": "/products/1",
    ///     "pathParameters": { "id": "1" }
    /// });
    /// let request = RequestParser::parse(&event).unwrap();
    /// assert_eq!(request.method, "GET");
    /// assert_eq!(request.id.as_deref(), Some("1"));
    /// ```
    pub fn parse(event: &Value) -> Result<ProductRequest, RequestParseError> {
        let method = event
            .pointer("/requestContext/http/method")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_METHOD)
            .to_string();

        let raw_path = event
            .get("rawPath")
            .and_then(Value::as_str)
            .map(str::to_string);

        let id = event
            .get("pathParameters")
            .and_then(|params| params.get("id"))
            .and_then(Self::extract_id);

        let is_base64 = event
            .get("isBase64Encoded")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let body = match event.get("body") {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) if text.is_empty() => None,
            Some(Value::String(text)) => Some(Self::parse_body(text, is_base64)?),
            // 直接呼び出し時などにJSONのまま渡されたボディ
            Some(other) => Some(other.clone()),
        };

        Ok(ProductRequest {
            method,
            raw_path,
            id,
            body,
        })
    }

    /// パスパラメータのidを文字列として取り出す
    ///
    /// 空文字・null・false・0は未指定扱い。それ以外の数値はそのまま文字列化し、
    /// その他の値は文字列化して後段のID検証で弾かせる。
    fn extract_id(value: &Value) -> Option<String> {
        match value {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.is_empty() => None,
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    fn parse_body(text: &str, is_base64: bool) -> Result<Value, RequestParseError> {
        if is_base64 {
            let decoded = BASE64
                .decode(text)
                .map_err(|e| RequestParseError::InvalidBase64Body(e.to_string()))?;
            serde_json::from_slice(&decoded)
                .map_err(|e| RequestParseError::InvalidJsonBody(e.to_string()))
        } else {
            serde_json::from_str(text).map_err(|e| RequestParseError::InvalidJsonBody(e.to_string()))
        }
    }
}
