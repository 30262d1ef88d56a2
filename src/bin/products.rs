/// 商品CRUD Lambdaエントリポイント
///
/// Function URL / HTTP API経由のイベントを受け取り、
/// ProductHandlerでproductsテーブルへのCRUDを実行する。
use lambda_runtime::{service_fn, Error, LambdaEvent};
use products::application::ProductHandler;
use products::domain::ApiResponse;
use products::infrastructure::{
    init_logging, DatabaseConfig, DatabaseConfigError, PgProductRepository,
};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::OnceCell;
use tracing::{error, info};

/// ProductHandlerの静的インスタンス
///
/// Lambda warm start時に接続プールを再利用するため、
/// 一度初期化したハンドラーを静的に保持する。明示的なクローズは行わない。
static PRODUCT_HANDLER: OnceCell<ProductHandler<PgProductRepository>> = OnceCell::const_new();

/// ProductHandlerを取得（初期化されていなければ初期化）
///
/// 設定エラーの場合は初期化されず、次の呼び出しで再試行される。
async fn get_product_handler()
-> Result<&'static ProductHandler<PgProductRepository>, DatabaseConfigError> {
    PRODUCT_HANDLER
        .get_or_try_init(|| async { build_product_handler() })
        .await
}

/// 環境変数から接続プールを構築してハンドラーを作成
///
/// プールは遅延接続のため、ここではデータベースへの接続は発生しない。
fn build_product_handler() -> Result<ProductHandler<PgProductRepository>, DatabaseConfigError> {
    let config = DatabaseConfig::from_env()?;

    info!(
        host = config.host(),
        database = config.database(),
        user = config.user(),
        "接続プールを作成"
    );

    let pool = PgPoolOptions::new().connect_lazy_with(config.connect_options());
    Ok(ProductHandler::new(PgProductRepository::new(pool)))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    info!("商品Lambda関数を初期化");

    lambda_runtime::run(service_fn(handler)).await
}

/// Lambda関数のメインハンドラー
///
/// 設定不備を含むすべての失敗は500レスポンスとして返し、
/// ランタイムにはエラーを伝播させない。
async fn handler(event: LambdaEvent<Value>) -> Result<ApiResponse, Error> {
    let (payload, context) = event.into_parts();

    info!(request_id = %context.request_id, "Lambdaイベント受信");

    let product_handler = match get_product_handler().await {
        Ok(product_handler) => product_handler,
        Err(err) => {
            error!(error = %err, "データベース設定の読み込みに失敗");
            return Ok(ApiResponse::internal_error());
        }
    };

    Ok(product_handler.handle(&payload).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_runtime::Context;
    use serde_json::json;
    use serial_test::serial;

    // テストで環境変数を安全に設定/削除するヘルパー
    // 注: Rust 2024エディションでset_var/remove_varはunsafe
    unsafe fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    unsafe fn cleanup_db_env() {
        unsafe {
            remove_env("DB_HOST");
            remove_env("DB_USER");
            remove_env("DB_PASSWORD");
            remove_env("DB_NAME");
        }
    }

    unsafe fn set_db_env() {
        unsafe {
            set_env("DB_HOST", "localhost");
            set_env("DB_USER", "app");
            set_env("DB_PASSWORD", "secret");
            set_env("DB_NAME", "shop");
        }
    }

    fn lambda_event(payload: Value) -> LambdaEvent<Value> {
        LambdaEvent::new(payload, Context::default())
    }

    #[test]
    #[serial(db_env)]
    fn test_build_handler_fails_without_env() {
        unsafe { cleanup_db_env() };

        let result = build_product_handler();

        assert!(matches!(result, Err(DatabaseConfigError::MissingEnvVar(_))));
    }

    /// データベースに触れない分岐は接続なしで応答できる
    #[tokio::test]
    #[serial(db_env)]
    async fn test_built_handler_answers_without_database() {
        unsafe {
            cleanup_db_env();
            set_db_env();
        }

        let product_handler = build_product_handler().unwrap();

        let response = product_handler
            .handle(&json!({
                "requestContext": { "http": { "method": "GET" } },
                "pathParameters": { "id": "abc" }
            }))
            .await;
        assert_eq!(response.status_code, 400);

        let response = product_handler
            .handle(&json!({ "requestContext": { "http": { "method": "PATCH" } } }))
            .await;
        assert_eq!(response.status_code, 405);

        unsafe { cleanup_db_env() };
    }

    #[tokio::test]
    #[serial(db_env)]
    async fn test_handler_returns_lambda_response_shape() {
        unsafe {
            cleanup_db_env();
            set_db_env();
        }

        let response = handler(lambda_event(json!({
            "requestContext": { "http": { "method": "DELETE" } },
            "rawPath": "/products"
        })))
        .await
        .unwrap();

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["statusCode"], 400);
        assert_eq!(value["body"], r#"{"error":"Id must be an integer"}"#);

        unsafe { cleanup_db_env() };
    }
}
