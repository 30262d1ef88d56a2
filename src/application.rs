// アプリケーション層モジュール
pub mod product_handler;
pub mod request_parser;

// 再エクスポート
pub use product_handler::{ProductHandler, ProductHandlerError};
pub use request_parser::{ProductRequest, RequestParseError, RequestParser};
