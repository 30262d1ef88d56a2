/// ログ基盤モジュール
///
/// CloudWatch Logsで検索しやすいよう、tracingのJSON出力を設定する。
use std::sync::Once;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// デフォルトのログレベル（`RUST_LOG`未設定時）
const DEFAULT_LOG_LEVEL: &str = "info";

/// Lambda環境向けのログサブスクライバーを初期化する
///
/// `RUST_LOG`でフィルタを上書きできる。複数回呼び出しても最初の1回だけ初期化する。
/// リクエストごとのspan（method, id）はJSONの`span`フィールドに出力される。
pub fn init_logging() {
    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .init();
    });
}

/// テスト時のデフォルトフィルタ（ハンドラーの判断ログは出し、sqlxのクエリログは抑える）
#[cfg(test)]
const TEST_LOG_FILTER: &str = "products=debug,sqlx=warn";

/// テスト用のログサブスクライバーを初期化する
///
/// ハンドラーのテストで`create_test_handler`から呼ばれ、
/// 400/404/500の判断理由がテスト出力に残るようにする。
#[cfg(test)]
pub fn init_test_logging() {
    static TEST_INIT: Once = Once::new();

    TEST_INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(TEST_LOG_FILTER));

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .without_time()
            .with_target(false)
            .compact();

        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_filter_parses() {
        assert!(EnvFilter::try_new(TEST_LOG_FILTER).is_ok());
    }

    #[test]
    fn test_init_test_logging_idempotent() {
        init_test_logging();
        init_test_logging();
    }

    /// リクエストspan内で構造化フィールド付きのログが出せること
    #[test]
    fn test_request_span_logging() {
        init_test_logging();

        let span = tracing::info_span!("request", method = "GET", product_id = "42");
        let _guard = span.enter();

        tracing::info!(raw_path = "/products/42", "リクエスト受信");
        tracing::debug!(status_code = 200, "レスポンス返却");
    }
}
