/// PostgreSQL接続設定
///
/// 接続プール作成時に一度だけ環境変数から読み込む（リクエストごとには読み直さない）。
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use thiserror::Error;

/// PostgreSQLのポート番号（固定）
pub const DATABASE_PORT: u16 = 5432;

/// データベース設定のエラー型
#[derive(Debug, Error)]
pub enum DatabaseConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// 接続先とクレデンシャルを持つデータベース設定
///
/// 以下の環境変数で設定:
/// - DB_HOST: 接続先ホスト
/// - DB_USER: ユーザー名
/// - DB_PASSWORD: パスワード
/// - DB_NAME: データベース名
#[derive(Clone)]
pub struct DatabaseConfig {
    host: String,
    user: String,
    password: String,
    database: String,
}

// パスワードをログに出さない
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

impl DatabaseConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, DatabaseConfigError> {
        Ok(Self {
            host: required_env("DB_HOST")?,
            user: required_env("DB_USER")?,
            password: required_env("DB_PASSWORD")?,
            database: required_env("DB_NAME")?,
        })
    }

    /// 明示的な値で設定を作成（テスト用）
    pub fn new(host: String, user: String, password: String, database: String) -> Self {
        Self {
            host,
            user,
            password,
            database,
        }
    }

    /// 接続先ホストを取得
    pub fn host(&self) -> &str {
        &self.host
    }

    /// ユーザー名を取得
    pub fn user(&self) -> &str {
        &self.user
    }

    /// データベース名を取得
    pub fn database(&self) -> &str {
        &self.database
    }

    /// sqlxの接続オプションを構築
    ///
    /// TLSは必須だが証明書の検証は行わない（`sslmode=require`相当）。
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(DATABASE_PORT)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .ssl_mode(PgSslMode::Require)
    }
}

fn required_env(key: &str) -> Result<String, DatabaseConfigError> {
    std::env::var(key).map_err(|_| DatabaseConfigError::MissingEnvVar(key.to_string()))
}
