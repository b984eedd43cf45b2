//! emacs-keys - Emacs-style keybinding layer for text editor widgets
//!
//! ホストエディタの上にEmacs風のキーシーケンス（数値引数、2キープレフィックス）、
//! キルリング、マークモードを重ねる。

// コアモジュール
pub mod error;
pub mod logging;
pub mod config;

// 編集層
pub mod editor;

// ロジック層
pub mod input;
pub mod minibuffer;

// セッション
pub mod app;

// 公開API
pub use app::{EmacsKeys, KeyOutcome};
pub use config::KeysConfig;
pub use editor::{EditorHost, KillRing, TextModel};
pub use error::{KeysError, Result};
pub use input::{Command, CommandTable, KeyToken, RawKeyEvent};
