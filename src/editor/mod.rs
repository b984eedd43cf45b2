//! エディタモジュール
//!
//! ホストエディタとの境界と、キー層が保持する編集状態

pub mod change_notifier;
pub mod host;
pub mod kill_ring;
pub mod mark;
pub mod text_model;

// 公開API
pub use change_notifier::{Emitter, ListenerId};
pub use host::{EditorHost, Position, Range, Selection, SelectionDirection, TextEdit};
pub use kill_ring::KillRing;
pub use mark::MarkMode;
pub use text_model::TextModel;
