//! キー処理セッション
//!
//! 1つのホストエディタに対するキーバインド層全体の状態を保持し、
//! 生のキーイベントを正規化・シーケンス解決・ディスパッチする。

use crate::config::KeysConfig;
use crate::editor::change_notifier::{Emitter, ListenerId};
use crate::editor::host::{CursorVisibility, EditorHost, Position, Selection};
use crate::editor::{KillRing, MarkMode};
use crate::error::Result;
use crate::input::commands::{self, Command, CommandContext};
use crate::input::keybinding::{normalize, KeyToken, RawKeyEvent};
use crate::input::keymap::CommandTable;
use crate::input::sequence::{ResolvedCommand, SequenceState, Step};
use crate::minibuffer::prompt::{Prompt, PromptAnswer};

/// キー1つの処理結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// 正規化できないキー（修飾キー単独など）
    Ignored,
    /// シーケンスの途中として消費された
    Swallowed,
    /// 入力待ちのプロンプトへ渡された
    Prompt,
    /// コマンドを実行した
    Dispatched(ResolvedCommand),
    /// 解決したがバインドが無い
    Unbound(ResolvedCommand),
}

impl KeyOutcome {
    /// ホスト側の既定処理を抑止すべきかどうか
    pub fn prevents_default(&self) -> bool {
        !matches!(self, KeyOutcome::Ignored | KeyOutcome::Unbound(_))
    }
}

/// Emacs風キーバインドのセッション
pub struct EmacsKeys<H: EditorHost> {
    host: H,
    state: SequenceState,
    table: CommandTable,
    kill_ring: KillRing,
    mark: MarkMode,
    prompt: Prompt,
    key_events: Emitter<String>,
}

impl<H: EditorHost> EmacsKeys<H> {
    /// 既定のバインドでセッションを開始
    pub fn new(host: H) -> Self {
        Self::with_parts(host, CommandTable::with_defaults(), KillRing::new())
    }

    /// 設定を適用してセッションを開始
    pub fn with_config(host: H, config: &KeysConfig) -> Result<Self> {
        config.validate()?;
        let mut table = CommandTable::with_defaults();
        config.apply(&mut table)?;
        Ok(Self::with_parts(host, table, KillRing::with_capacity(config.kill_ring_capacity)))
    }

    fn with_parts(mut host: H, table: CommandTable, kill_ring: KillRing) -> Self {
        host.set_block_cursor(true);
        log::info!("emacs keys started with {} bindings", table.len());
        Self {
            host,
            state: SequenceState::new(),
            table,
            kill_ring,
            mark: MarkMode::new(),
            prompt: Prompt::new(),
            key_events: Emitter::new(),
        }
    }

    /// 生のキーイベントを処理
    pub fn handle_key(&mut self, event: &RawKeyEvent) -> KeyOutcome {
        match normalize(event) {
            Some(key) => self.handle_token(key),
            None => KeyOutcome::Ignored,
        }
    }

    /// 正規化済みトークンを処理
    pub fn handle_token(&mut self, key: KeyToken) -> KeyOutcome {
        if self.prompt.is_active() {
            if let Some(answer) = self.prompt.handle_key(&key) {
                self.finish_prompt(answer);
            }
            return KeyOutcome::Prompt;
        }

        let outcome = match self.state.step(&key) {
            Step::Swallow => KeyOutcome::Swallowed,
            Step::Resolved(resolved) => {
                let resolved = self.state.resolve(resolved);
                self.state.reset();

                let outcome = match self.table.get(&resolved.key).cloned() {
                    Some(command) => {
                        self.execute(&command, &resolved);
                        KeyOutcome::Dispatched(resolved.clone())
                    }
                    None => {
                        log::debug!("{} is not bound", resolved.key);
                        KeyOutcome::Unbound(resolved.clone())
                    }
                };

                self.state.set_last_command_key(resolved.key);
                outcome
            }
        };

        let display = self.state.readable_state();
        self.key_events.fire(&display);
        outcome
    }

    fn execute(&mut self, command: &Command, resolved: &ResolvedCommand) {
        let mut ctx = CommandContext {
            host: &mut self.host,
            kill_ring: &mut self.kill_ring,
            mark: &mut self.mark,
            sequence: &mut self.state,
            prompt: &mut self.prompt,
            repeat: resolved.repeat_count,
            repeated: resolved.is_repeat_of_last,
        };
        command.execute(&mut ctx);
    }

    fn finish_prompt(&mut self, answer: PromptAnswer) {
        let mut ctx = CommandContext {
            host: &mut self.host,
            kill_ring: &mut self.kill_ring,
            mark: &mut self.mark,
            sequence: &mut self.state,
            prompt: &mut self.prompt,
            repeat: 1,
            repeated: false,
        };
        commands::finish_prompt(&mut ctx, answer);
    }

    /// 保留中のプロンプトを確定
    pub fn confirm_prompt(&mut self) -> bool {
        match self.prompt.complete_input() {
            Some(answer) => {
                self.finish_prompt(answer);
                true
            }
            None => false,
        }
    }

    /// 保留中のプロンプトを棄却
    pub fn reject_prompt(&mut self) -> bool {
        match self.prompt.cancel_input() {
            Some(answer) => {
                self.finish_prompt(answer);
                true
            }
            None => false,
        }
    }

    /// プロンプトからフォーカスが外れた
    pub fn blur_prompt(&mut self) -> bool {
        self.reject_prompt()
    }

    /// ホストの内容が変更された。マークモード中なら解除する。
    pub fn notify_content_changed(&mut self) {
        if self.mark.is_active() {
            self.mark.set(false);
        }
    }

    /// スクロールでカーソルが画面外に出たら表示範囲の端へ移動する
    pub fn on_scroll(&mut self) {
        let visibility = self.host.cursor_visibility();
        if visibility == CursorVisibility::Visible {
            return;
        }

        let ranges = self.host.visible_ranges();
        let (Some(first), Some(last)) = (ranges.first(), ranges.last()) else {
            return;
        };

        let line = match visibility {
            CursorVisibility::Above => first.start_line,
            CursorVisibility::Below => last.end_line,
            CursorVisibility::Visible => return,
        };
        let target = Position::new(line, 1);

        if self.mark.is_active() {
            let start = self.host.selection().start();
            self.host.set_selection(Selection::from_positions(start, target));
        } else {
            self.host.set_position(target);
        }
    }

    /// 表示用キー状態の変更を購読
    pub fn on_did_change_key(&mut self, listener: impl FnMut(&String) + 'static) -> ListenerId {
        self.key_events.subscribe(listener)
    }

    pub fn remove_key_listener(&mut self, id: ListenerId) -> bool {
        self.key_events.unsubscribe(id)
    }

    /// マークモードの変更を購読
    pub fn on_did_mark_change(&mut self, listener: impl FnMut(&bool) + 'static) -> ListenerId {
        self.mark.subscribe(listener)
    }

    pub fn remove_mark_listener(&mut self, id: ListenerId) -> bool {
        self.mark.unsubscribe(id)
    }

    /// 一時状態を破棄（最後のコマンドキーは保持）
    pub fn clear_state(&mut self) {
        self.state.reset();
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn state(&self) -> &SequenceState {
        &self.state
    }

    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut CommandTable {
        &mut self.table
    }

    pub fn kill_ring(&self) -> &KillRing {
        &self.kill_ring
    }

    pub fn kill_ring_mut(&mut self) -> &mut KillRing {
        &mut self.kill_ring
    }

    pub fn is_mark_active(&self) -> bool {
        self.mark.is_active()
    }

    pub fn set_mark_active(&mut self, active: bool) {
        self.mark.set(active);
    }

    pub fn prompt(&self) -> &Prompt {
        &self.prompt
    }

    /// セッションを終了してホストを返す
    pub fn dispose(mut self) -> H {
        self.prompt.cancel_input();
        self.mark.dispose();
        self.key_events.dispose();
        self.host.set_block_cursor(false);
        log::info!("emacs keys disposed");
        self.host
    }
}
