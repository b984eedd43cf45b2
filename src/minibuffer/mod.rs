//! ミニバッファモジュール
//!
//! コマンドが利用する1行入力プロンプト

pub mod prompt;

pub use prompt::{Prompt, PromptAnswer, PromptKind, PromptResult};
