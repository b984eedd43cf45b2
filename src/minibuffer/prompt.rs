//! プロンプト管理
//!
//! 同時に1件だけ保留できるテキスト入力要求。新しい要求は前の要求を棄却する。

use crate::error::{PromptError, Result};
use crate::input::keybinding::KeyToken;

/// 要求元コマンドの種類（結果の継続処理を選ぶ）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    GotoLine,
}

/// プロンプトの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResult {
    /// 入力が確定した
    Completed(String),
    /// 入力が棄却された（Escape、フォーカス喪失、新しい要求による割り込み）
    Cancelled,
}

/// 確定または棄却された要求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptAnswer {
    pub kind: PromptKind,
    pub result: PromptResult,
}

#[derive(Debug, Clone)]
struct PendingPrompt {
    message: String,
    kind: PromptKind,
    input: String,
}

/// プロンプト管理器
#[derive(Debug, Default)]
pub struct Prompt {
    pending: Option<PendingPrompt>,
}

impl Prompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新しい要求を開始する。保留中の要求があれば棄却して返す。
    pub fn request(
        &mut self,
        message: impl Into<String>,
        kind: PromptKind,
    ) -> Option<PromptAnswer> {
        let preempted = self.cancel_input();
        let message = message.into();
        log::debug!("prompt requested: {:?}", message);
        self.pending = Some(PendingPrompt { message, kind, input: String::new() });
        preempted
    }

    /// アクティブかどうか
    pub fn is_active(&self) -> bool {
        self.pending.is_some()
    }

    /// プロンプトメッセージを取得
    pub fn message(&self) -> &str {
        self.pending.as_ref().map_or("", |p| p.message.as_str())
    }

    /// 現在の入力を取得
    pub fn input(&self) -> &str {
        self.pending.as_ref().map_or("", |p| p.input.as_str())
    }

    pub fn kind(&self) -> Option<PromptKind> {
        self.pending.as_ref().map(|p| p.kind)
    }

    /// 文字を追加
    pub fn add_char(&mut self, ch: char) -> Result<()> {
        let pending = self.pending.as_mut().ok_or(PromptError::NotActive)?;
        pending.input.push(ch);
        Ok(())
    }

    /// 最後の文字を削除
    pub fn backspace(&mut self) -> Result<bool> {
        let pending = self.pending.as_mut().ok_or(PromptError::NotActive)?;
        Ok(pending.input.pop().is_some())
    }

    /// 入力を確定
    pub fn complete_input(&mut self) -> Option<PromptAnswer> {
        self.pending.take().map(|p| PromptAnswer {
            kind: p.kind,
            result: PromptResult::Completed(p.input),
        })
    }

    /// 入力を棄却
    pub fn cancel_input(&mut self) -> Option<PromptAnswer> {
        self.pending.take().map(|p| PromptAnswer {
            kind: p.kind,
            result: PromptResult::Cancelled,
        })
    }

    /// フォーカス喪失は棄却として扱う
    pub fn blur(&mut self) -> Option<PromptAnswer> {
        self.cancel_input()
    }

    /// 保留中のプロンプトへキー入力を渡す。確定・棄却した場合は結果を返す。
    pub fn handle_key(&mut self, key: &KeyToken) -> Option<PromptAnswer> {
        match key.as_str() {
            "Return" => return self.complete_input(),
            "Escape" => return self.cancel_input(),
            _ => {}
        }

        let pending = self.pending.as_mut()?;
        match key.as_str() {
            "Backspace" => {
                pending.input.pop();
            }
            "SPC" => pending.input.push(' '),
            other => {
                if let Some(ch) = Self::printable(other) {
                    pending.input.push(ch);
                }
            }
        }
        None
    }

    fn printable(key: &str) -> Option<char> {
        let (shifted, base) = match key.strip_prefix("S-") {
            Some(base) => (true, base),
            None => (false, key),
        };

        let mut chars = base.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if shifted && c.is_alphabetic() => c.to_uppercase().next(),
            (Some(c), None) if !shifted => Some(c),
            _ => None,
        }
    }

    /// プロンプト全体の表示文字列を生成
    pub fn display_string(&self) -> String {
        format!("{}{}", self.message(), self.input())
    }
}
