//! エラーハンドリングシステム
//!
//! キー処理そのものは失敗しない。ここで定義するエラーは設定読み込み、
//! 文字列からのキーバインド登録、プロンプト操作など、キー経路の外側で使われる。

use thiserror::Error;

/// クレート全体のエラー型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KeysError {
    /// 入力処理エラー
    #[error("Input processing failed: {0}")]
    Input(#[from] InputError),

    /// 設定エラー
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// プロンプト操作エラー
    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),
}

/// 入力処理固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid key sequence: {sequence}")]
    InvalidKeySequence { sequence: String },

    #[error("Command not found: {command}")]
    CommandNotFound { command: String },
}

/// 設定固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration file {path}: {message}")]
    InvalidFile { path: String, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration directory is not available")]
    NoConfigDir,

    #[error("IO error: {message}")]
    Io { message: String },
}

/// プロンプト固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    #[error("No prompt is active")]
    NotActive,
}

/// プロジェクト標準のResult型
pub type Result<T> = std::result::Result<T, KeysError>;

// std::io::Error から KeysError への変換
impl From<std::io::Error> for KeysError {
    fn from(error: std::io::Error) -> Self {
        KeysError::Config(ConfigError::Io { message: error.to_string() })
    }
}

// JSON パースエラーの変換
impl From<serde_json::Error> for KeysError {
    fn from(error: serde_json::Error) -> Self {
        KeysError::Config(ConfigError::InvalidFile {
            path: "<inline>".to_string(),
            message: error.to_string(),
        })
    }
}
