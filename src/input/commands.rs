//! コマンドシステム
//!
//! エディタコマンドの定義と実行。各コマンドは「X を N 回、マークモード M で」
//! をホストエディタの基本操作へ変換する薄いアダプタ。

use super::sequence::SequenceState;
use crate::editor::host::{
    EditorHost, Position, Range, Selection, SelectionDirection, TextEdit,
};
use crate::editor::{KillRing, MarkMode};
use crate::minibuffer::prompt::{Prompt, PromptAnswer, PromptKind, PromptResult};

/// 繰り返し挿入で一度に生成するテキストの上限（バイト）
const MAX_INSERT_LEN: usize = 1 << 20;

/// カーソル移動の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Motion {
    Up,
    Down,
    Left,
    Right,
    WordLeft,
    WordRight,
    LineStart,
    LineEnd,
    BufferTop,
    BufferBottom,
}

impl Motion {
    /// ホストのカーソルアクション名
    fn host_action(self, selecting: bool) -> String {
        let name = match self {
            Motion::Up => "Up",
            Motion::Down => "Down",
            Motion::Left => "Left",
            Motion::Right => "Right",
            Motion::WordLeft => "WordLeft",
            Motion::WordRight => "WordRight",
            Motion::LineStart => "Home",
            Motion::LineEnd => "End",
            Motion::BufferTop => "Top",
            Motion::BufferBottom => "Bottom",
        };
        format!("cursor{}{}", name, if selecting { "Select" } else { "" })
    }
}

/// コマンドの種類
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    // ホスト組み込みアクション
    TriggerSuggest,
    CommentLine,
    TransposeLetters,
    SelectAll,
    FormatDocument,
    DeleteWordLeft,
    DeleteWordRight,
    DeleteLeft,
    DeleteRight,
    Upcase,
    Downcase,
    PageDown,
    PageUp,
    NextMarker,
    PreviousMarker,
    AddSelectionToNextMatch,
    ParameterHints,
    Search,
    SearchReplace,
    Undo,
    Redo,
    DeleteLines,

    // カーソル移動
    Move(Motion),

    // 編集操作
    SetMark,
    KillLine,
    Newline,
    OpenLine,
    KillRegion,
    CopyRegion,
    Yank,
    YankPop,
    InsertTab,
    ExchangePointAndMark,

    // 表示・移動
    KeyboardQuit,
    Recenter,
    RecenterTop,
    ScrollUpReveal,
    MoveToWindowLine,
    GotoLine,

    /// 任意のホストアクション（ユーザー定義バインド用）
    HostAction(String),
}

/// コマンド実行時の文脈
pub struct CommandContext<'a, H: EditorHost> {
    pub host: &'a mut H,
    pub kill_ring: &'a mut KillRing,
    pub mark: &'a mut MarkMode,
    pub sequence: &'a mut SequenceState,
    pub prompt: &'a mut Prompt,
    /// 繰り返し回数（1以上）
    pub repeat: usize,
    /// 直前と同じキーで呼ばれたか
    pub repeated: bool,
}

impl Command {
    /// 名前付きコマンドの一覧
    pub fn catalog() -> Vec<Command> {
        use Command::*;
        vec![
            TriggerSuggest,
            CommentLine,
            TransposeLetters,
            SelectAll,
            FormatDocument,
            DeleteWordLeft,
            DeleteWordRight,
            DeleteLeft,
            DeleteRight,
            Upcase,
            Downcase,
            PageDown,
            PageUp,
            NextMarker,
            PreviousMarker,
            AddSelectionToNextMatch,
            ParameterHints,
            Search,
            SearchReplace,
            Undo,
            Redo,
            DeleteLines,
            Move(Motion::Up),
            Move(Motion::Down),
            Move(Motion::Left),
            Move(Motion::Right),
            Move(Motion::WordLeft),
            Move(Motion::WordRight),
            Move(Motion::LineStart),
            Move(Motion::LineEnd),
            Move(Motion::BufferTop),
            Move(Motion::BufferBottom),
            SetMark,
            KillLine,
            Newline,
            OpenLine,
            KillRegion,
            CopyRegion,
            Yank,
            YankPop,
            InsertTab,
            ExchangePointAndMark,
            KeyboardQuit,
            Recenter,
            RecenterTop,
            ScrollUpReveal,
            MoveToWindowLine,
            GotoLine,
        ]
    }

    /// 名前からコマンドを作成。`action:<id>` はホストアクションへのバインド。
    pub fn from_name(name: &str) -> Option<Command> {
        if let Some(action) = name.strip_prefix("action:") {
            return (!action.is_empty()).then(|| Command::HostAction(action.to_string()));
        }

        Self::catalog().into_iter().find(|command| command.name() == name)
    }

    /// コマンド名
    pub fn name(&self) -> &str {
        match self {
            Command::TriggerSuggest => "trigger-suggest",
            Command::CommentLine => "comment-line",
            Command::TransposeLetters => "transpose-letters",
            Command::SelectAll => "select-all",
            Command::FormatDocument => "format-document",
            Command::DeleteWordLeft => "delete-word-left",
            Command::DeleteWordRight => "delete-word-right",
            Command::DeleteLeft => "delete-left",
            Command::DeleteRight => "delete-right",
            Command::Upcase => "upcase",
            Command::Downcase => "downcase",
            Command::PageDown => "page-down",
            Command::PageUp => "page-up",
            Command::NextMarker => "next-marker",
            Command::PreviousMarker => "previous-marker",
            Command::AddSelectionToNextMatch => "add-selection-to-next-match",
            Command::ParameterHints => "parameter-hints",
            Command::Search => "search",
            Command::SearchReplace => "search-replace",
            Command::Undo => "undo",
            Command::Redo => "redo",
            Command::DeleteLines => "delete-lines",
            Command::Move(Motion::Up) => "previous-line",
            Command::Move(Motion::Down) => "next-line",
            Command::Move(Motion::Left) => "backward-char",
            Command::Move(Motion::Right) => "forward-char",
            Command::Move(Motion::WordLeft) => "backward-word",
            Command::Move(Motion::WordRight) => "forward-word",
            Command::Move(Motion::LineStart) => "move-beginning-of-line",
            Command::Move(Motion::LineEnd) => "move-end-of-line",
            Command::Move(Motion::BufferTop) => "beginning-of-buffer",
            Command::Move(Motion::BufferBottom) => "end-of-buffer",
            Command::SetMark => "set-mark",
            Command::KillLine => "kill-line",
            Command::Newline => "newline",
            Command::OpenLine => "open-line",
            Command::KillRegion => "kill-region",
            Command::CopyRegion => "copy-region",
            Command::Yank => "yank",
            Command::YankPop => "yank-pop",
            Command::InsertTab => "insert-tab",
            Command::ExchangePointAndMark => "exchange-point-and-mark",
            Command::KeyboardQuit => "keyboard-quit",
            Command::Recenter => "recenter",
            Command::RecenterTop => "recenter-top",
            Command::ScrollUpReveal => "scroll-page-up-reveal",
            Command::MoveToWindowLine => "move-to-window-line",
            Command::GotoLine => "goto-line",
            Command::HostAction(action) => action.as_str(),
        }
    }

    /// コマンドの説明を取得
    pub fn description(&self) -> &str {
        match self {
            Command::TriggerSuggest => "補完候補を表示",
            Command::CommentLine => "行コメントを切り替え",
            Command::TransposeLetters => "前後の文字を入れ替え",
            Command::SelectAll => "バッファ全体を選択",
            Command::FormatDocument => "ドキュメントを整形",
            Command::DeleteWordLeft => "前の単語を削除",
            Command::DeleteWordRight => "次の単語を削除",
            Command::DeleteLeft => "前の文字を削除",
            Command::DeleteRight => "カーソル位置の文字を削除",
            Command::Upcase => "大文字に変換",
            Command::Downcase => "小文字に変換",
            Command::PageDown => "1ページ下へ移動",
            Command::PageUp => "1ページ上へ移動",
            Command::NextMarker => "次の診断位置へ移動",
            Command::PreviousMarker => "前の診断位置へ移動",
            Command::AddSelectionToNextMatch => "次の一致箇所を選択に追加",
            Command::ParameterHints => "引数ヒントを表示",
            Command::Search => "検索",
            Command::SearchReplace => "検索して置換",
            Command::Undo => "直前の操作を取り消し",
            Command::Redo => "取り消した操作をやり直し",
            Command::DeleteLines => "行全体を削除",
            Command::Move(Motion::Up) => "カーソルを上に移動",
            Command::Move(Motion::Down) => "カーソルを下に移動",
            Command::Move(Motion::Left) => "カーソルを左に移動",
            Command::Move(Motion::Right) => "カーソルを右に移動",
            Command::Move(Motion::WordLeft) => "前の単語先頭に移動",
            Command::Move(Motion::WordRight) => "次の単語末尾に移動",
            Command::Move(Motion::LineStart) => "行頭に移動",
            Command::Move(Motion::LineEnd) => "行末に移動",
            Command::Move(Motion::BufferTop) => "バッファ先頭に移動",
            Command::Move(Motion::BufferBottom) => "バッファ末尾に移動",
            Command::SetMark => "マークを設定",
            Command::KillLine => "行末まで削除",
            Command::Newline => "改行を挿入",
            Command::OpenLine => "下に空行を挿入",
            Command::KillRegion => "リージョンを削除",
            Command::CopyRegion => "リージョンをコピー",
            Command::Yank => "キルリングから貼り付け",
            Command::YankPop => "キルリングを巡回して貼り付け",
            Command::InsertTab => "タブを挿入",
            Command::ExchangePointAndMark => "カーソルとマークを交換",
            Command::KeyboardQuit => "操作をキャンセル",
            Command::Recenter => "カーソル行を画面中央に表示",
            Command::RecenterTop => "カーソル行を画面上端に表示",
            Command::ScrollUpReveal => "画面を上にスクロール",
            Command::MoveToWindowLine => "カーソルを画面の中央・上端・下端へ移動",
            Command::GotoLine => "指定行へ移動",
            Command::HostAction(_) => "ホストアクションを実行",
        }
    }

    /// 単純に委譲するホストアクション
    pub fn host_action(&self) -> Option<&str> {
        let action = match self {
            Command::TriggerSuggest => "editor.action.triggerSuggest",
            Command::CommentLine => "editor.action.commentLine",
            Command::TransposeLetters => "editor.action.transposeLetters",
            Command::SelectAll => "editor.action.selectAll",
            Command::FormatDocument => "editor.action.formatDocument",
            Command::DeleteWordLeft => "deleteWordLeft",
            Command::DeleteWordRight => "deleteWordRight",
            Command::DeleteLeft => "deleteLeft",
            Command::DeleteRight => "deleteRight",
            Command::Upcase => "editor.action.transformToUppercase",
            Command::Downcase => "editor.action.transformToLowercase",
            Command::PageDown => "cursorPageDown",
            Command::PageUp => "cursorPageUp",
            Command::NextMarker => "editor.action.marker.next",
            Command::PreviousMarker => "editor.action.marker.prev",
            Command::AddSelectionToNextMatch => "editor.action.addSelectionToNextFindMatch",
            Command::ParameterHints => "editor.action.triggerParameterHints",
            Command::Search => "editor.actions.findWithArgs",
            Command::SearchReplace => "editor.action.startFindReplaceAction",
            Command::Undo => "undo",
            Command::Redo => "redo",
            Command::HostAction(action) => action.as_str(),
            _ => return None,
        };
        Some(action)
    }

    /// コマンドを実行
    pub fn execute<H: EditorHost>(&self, ctx: &mut CommandContext<'_, H>) {
        log::debug!("execute {} (repeat {}, repeated {})", self.name(), ctx.repeat, ctx.repeated);

        match self {
            // 検索系は繰り返さない
            Command::Search | Command::SearchReplace => {
                if let Some(action) = self.host_action() {
                    ctx.host.trigger(action);
                }
            }
            Command::DeleteLines => {
                ctx.mark.set(false);
                for _ in 0..ctx.repeat {
                    ctx.host.trigger("editor.action.deleteLines");
                }
            }
            Command::Move(motion) => {
                let action = motion.host_action(ctx.mark.is_active());
                for _ in 0..ctx.repeat {
                    ctx.host.trigger(&action);
                }
            }
            Command::SetMark => set_mark(ctx),
            Command::KillLine => kill_line(ctx),
            Command::Newline => newline(ctx),
            Command::OpenLine => {
                let position = ctx.host.position();
                ctx.host.trigger("editor.action.insertLineAfter");
                ctx.host.set_position(position);
            }
            Command::KillRegion => kill_region(ctx),
            Command::CopyRegion => copy_region(ctx),
            Command::Yank => {
                let text = ctx.kill_ring.get(Some(ctx.repeat));
                if text.is_empty() {
                    return;
                }
                let position = ctx.host.position();
                ctx.host.execute_edits(&[TextEdit::insert(position, text)]);
            }
            Command::YankPop => {
                let text = ctx.kill_ring.pop();
                if text.is_empty() {
                    return;
                }
                let anchor = ctx.host.selection().active;
                ctx.host.execute_edits(&[TextEdit::insert(anchor, text)]);
            }
            Command::InsertTab => insert_tab(ctx),
            Command::ExchangePointAndMark => {
                let selection = ctx.host.selection();
                if !selection.is_empty() {
                    ctx.host.set_selection(selection.inverted());
                }
            }
            Command::KeyboardQuit => {
                ctx.mark.set(false);
                ctx.sequence.reset();
                let position = ctx.host.position();
                ctx.host.set_position(position);
            }
            Command::Recenter => {
                let range = ctx.host.selection().range();
                ctx.host.reveal_range_in_center(range);
            }
            Command::RecenterTop => {
                let range = ctx.host.selection().range();
                ctx.host.reveal_range_at_top(range);
            }
            Command::ScrollUpReveal => ctx.host.trigger("scrollPageUp"),
            Command::MoveToWindowLine => move_to_window_line(ctx),
            Command::GotoLine => {
                if let Some(preempted) = ctx.prompt.request("Goto Line: ", PromptKind::GotoLine) {
                    finish_prompt(ctx, preempted);
                }
            }
            _ => {
                if let Some(action) = self.host_action() {
                    for _ in 0..ctx.repeat {
                        ctx.host.trigger(action);
                    }
                }
            }
        }
    }
}

/// プロンプトの確定・棄却を要求元コマンドの継続処理へ渡す
pub fn finish_prompt<H: EditorHost>(ctx: &mut CommandContext<'_, H>, answer: PromptAnswer) {
    match (answer.kind, answer.result) {
        (PromptKind::GotoLine, PromptResult::Completed(input)) => goto_line(ctx, &input),
        (_, PromptResult::Cancelled) => {
            log::debug!("prompt {:?} cancelled", answer.kind);
            ctx.host.focus();
        }
    }
}

fn set_mark<H: EditorHost>(ctx: &mut CommandContext<'_, H>) {
    let selection = ctx.host.selection();
    let empty = selection.is_empty();

    if !empty {
        let keep = match selection.direction() {
            SelectionDirection::Ltr => selection.end(),
            SelectionDirection::Rtl => selection.start(),
        };
        ctx.host.set_selection(Selection::collapsed(keep));
    }

    let active = !(empty && ctx.mark.is_active());
    ctx.mark.set(active);
}

fn kill_line<H: EditorHost>(ctx: &mut CommandContext<'_, H>) {
    ctx.mark.set(false);
    let position = ctx.host.selection().active;

    let end = if ctx.repeat == 1 {
        let line_length = ctx.host.line_length(position.line);
        let at_end = position.column == line_length + 1;
        if line_length == 0 || at_end {
            let eol = ctx.host.eol().to_string();
            record_kill(ctx, &eol);
            ctx.host.trigger("deleteAllRight");
            return;
        }
        Position::new(position.line, line_length + 1)
    } else {
        // N行分を1回の編集で削除する
        let end_line = position.line.saturating_add(ctx.repeat).min(ctx.host.line_count());
        Position::new(end_line, ctx.host.line_length(end_line) + 1)
    };

    let range = Range::from_positions(position, end);
    let text = ctx.host.text_in_range(range);
    record_kill(ctx, &text);
    ctx.host.execute_edits(&[TextEdit::delete(range)]);
    ctx.host.set_selection(Selection::collapsed(position));
}

fn record_kill<H: EditorHost>(ctx: &mut CommandContext<'_, H>, text: &str) {
    if ctx.repeated {
        ctx.kill_ring.grow_top(text);
    } else {
        ctx.kill_ring.add(text);
    }
}

fn newline<H: EditorHost>(ctx: &mut CommandContext<'_, H>) {
    let Some(text) = repeat_text(ctx.host.eol(), ctx.repeat) else {
        log::warn!("newline: repeat count {} is too large", ctx.repeat);
        return;
    };
    ctx.mark.set(false);
    let anchor = ctx.host.selection().active;
    ctx.host.execute_edits(&[TextEdit::insert(anchor, text)]);
}

/// 挿入テキストを `count` 回連結する。上限を超える場合は `None`。
fn repeat_text(unit: &str, count: usize) -> Option<String> {
    let total = unit.len().checked_mul(count)?;
    (total <= MAX_INSERT_LEN).then(|| unit.repeat(count))
}

fn kill_region<H: EditorHost>(ctx: &mut CommandContext<'_, H>) {
    let mut selections = ctx.host.selections();
    if selections.is_empty() {
        return;
    }

    // 後ろから削除して前方の位置を保つ
    selections.sort_by(|a, b| b.start().cmp(&a.start()));
    for selection in selections {
        let range = selection.range();
        let text = ctx.host.text_in_range(range);
        ctx.kill_ring.add(text);
        ctx.host.execute_edits(&[TextEdit::delete(range)]);
    }
}

fn copy_region<H: EditorHost>(ctx: &mut CommandContext<'_, H>) {
    let selection = ctx.host.selection();
    if selection.is_empty() {
        return;
    }

    let text = ctx.host.text_in_range(selection.range());
    ctx.kill_ring.add(text);
    ctx.mark.set(false);
    ctx.host.set_selection(Selection::collapsed(selection.active));
}

fn insert_tab<H: EditorHost>(ctx: &mut CommandContext<'_, H>) {
    let options = ctx.host.tab_options();
    let unit = if options.insert_spaces {
        " ".repeat(options.tab_size)
    } else {
        "\t".to_string()
    };
    let Some(text) = repeat_text(&unit, ctx.repeat) else {
        log::warn!("insert-tab: repeat count {} is too large", ctx.repeat);
        return;
    };
    let range = ctx.host.selection().range();
    ctx.host.execute_edits(&[TextEdit::replace(range, text)]);
}

fn move_to_window_line<H: EditorHost>(ctx: &mut CommandContext<'_, H>) {
    let lines: Vec<usize> = ctx
        .host
        .visible_ranges()
        .iter()
        .flat_map(|range| range.start_line..=range.end_line)
        .collect();

    let (Some(&first), Some(&last)) = (lines.first(), lines.last()) else {
        return;
    };
    let center = lines[((lines.len() + 1) / 2).min(lines.len() - 1)];
    let current = ctx.host.position().line;

    let target = if current == center {
        first
    } else if current == first {
        last
    } else {
        center
    };
    ctx.host.set_position(Position::new(target, 1));
}

fn goto_line<H: EditorHost>(ctx: &mut CommandContext<'_, H>, input: &str) {
    let digits: String = input
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    // 桁あふれは最終行へ丸める
    let requested = match digits.parse::<usize>() {
        Ok(line) => line,
        Err(_) if !digits.is_empty() => usize::MAX,
        Err(_) => 0,
    };
    ctx.host.focus();

    let total = ctx.host.line_count();
    let line = if requested == 0 { 1 } else { requested.min(total) };
    let target = Position::new(line, 1);

    let selection = if ctx.mark.is_active() {
        let current = ctx.host.selection();
        match current.direction() {
            SelectionDirection::Ltr => Selection::from_positions(current.start(), target),
            SelectionDirection::Rtl => Selection::from_positions(current.end(), target),
        }
    } else {
        Selection::collapsed(target)
    };

    ctx.host.set_selection(selection);
    ctx.host.reveal_range_in_center(selection.range());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::TextModel;

    struct Fixture {
        host: TextModel,
        kill_ring: KillRing,
        mark: MarkMode,
        sequence: SequenceState,
        prompt: Prompt,
    }

    impl Fixture {
        fn new(text: &str) -> Self {
            Self {
                host: TextModel::new(text),
                kill_ring: KillRing::new(),
                mark: MarkMode::new(),
                sequence: SequenceState::new(),
                prompt: Prompt::new(),
            }
        }

        fn run(&mut self, command: Command, repeat: usize, repeated: bool) {
            let mut ctx = CommandContext {
                host: &mut self.host,
                kill_ring: &mut self.kill_ring,
                mark: &mut self.mark,
                sequence: &mut self.sequence,
                prompt: &mut self.prompt,
                repeat,
                repeated,
            };
            command.execute(&mut ctx);
        }
    }

    #[test]
    fn test_name_round_trip() {
        for command in Command::catalog() {
            assert_eq!(Command::from_name(command.name()), Some(command.clone()));
        }
        assert_eq!(
            Command::from_name("action:editor.action.fold"),
            Some(Command::HostAction("editor.action.fold".to_string()))
        );
        assert_eq!(Command::from_name("action:"), None);
        assert_eq!(Command::from_name("no-such-command"), None);
    }

    #[test]
    fn test_move_repeats_and_selects_in_mark_mode() {
        let mut fx = Fixture::new("a\nb\nc\nd");
        fx.run(Command::Move(Motion::Down), 2, false);
        assert_eq!(fx.host.triggered(), ["cursorDown", "cursorDown"]);
        assert_eq!(fx.host.position(), Position::new(3, 1));

        fx.mark.set(true);
        fx.run(Command::Move(Motion::Up), 1, false);
        assert_eq!(fx.host.triggered().last().map(String::as_str), Some("cursorUpSelect"));
    }

    #[test]
    fn test_kill_line_to_end_of_line() {
        let mut fx = Fixture::new("hello world\nnext");
        fx.host.set_position(Position::new(1, 7));
        fx.run(Command::KillLine, 1, false);
        assert_eq!(fx.host.text(), "hello \nnext");
        assert_eq!(fx.kill_ring.get(None), "world");
        assert_eq!(fx.host.position(), Position::new(1, 7));
    }

    #[test]
    fn test_kill_line_at_end_kills_newline() {
        let mut fx = Fixture::new("ab\ncd");
        fx.host.set_position(Position::new(1, 3));
        fx.run(Command::KillLine, 1, false);
        assert_eq!(fx.host.text(), "abcd");
        assert_eq!(fx.kill_ring.get(None), "\n");
        assert_eq!(fx.host.triggered(), ["deleteAllRight"]);
    }

    #[test]
    fn test_kill_line_with_count_is_single_edit() {
        let mut fx = Fixture::new("one\ntwo\nthree\nfour");
        fx.host.set_position(Position::new(1, 1));
        fx.run(Command::KillLine, 2, false);
        assert_eq!(fx.host.text(), "\nfour");
        assert_eq!(fx.kill_ring.get(None), "one\ntwo\nthree");
        assert_eq!(fx.kill_ring.len(), 1);
    }

    #[test]
    fn test_repeated_kill_uses_grow_top() {
        let mut fx = Fixture::new("first\nsecond");
        fx.run(Command::KillLine, 1, false);
        fx.run(Command::KillLine, 1, true);
        // 空でないリングへの追記は行われない
        assert_eq!(fx.kill_ring.len(), 1);
        assert_eq!(fx.kill_ring.get(None), "first");
        assert_eq!(fx.host.text(), "second");
    }

    #[test]
    fn test_yank_and_yank_pop() {
        let mut fx = Fixture::new("");
        fx.kill_ring.add("alpha");
        fx.kill_ring.add("beta");

        fx.run(Command::Yank, 1, false);
        assert_eq!(fx.host.text(), "beta");
        assert_eq!(fx.host.position(), Position::new(1, 5));

        fx.run(Command::YankPop, 1, false);
        assert_eq!(fx.host.text(), "betabeta");
        fx.run(Command::Yank, 4, false);
        assert_eq!(fx.host.text(), "betabetaalpha");
    }

    #[test]
    fn test_yank_on_empty_ring_does_nothing() {
        let mut fx = Fixture::new("text");
        fx.run(Command::Yank, 1, false);
        fx.run(Command::YankPop, 1, false);
        assert_eq!(fx.host.text(), "text");
    }

    #[test]
    fn test_kill_and_copy_region() {
        let mut fx = Fixture::new("hello world");
        fx.host.set_selection(Selection::from_positions(Position::new(1, 1), Position::new(1, 6)));
        fx.mark.set(true);
        fx.run(Command::CopyRegion, 1, false);
        assert_eq!(fx.kill_ring.get(None), "hello");
        assert!(!fx.mark.is_active());
        assert!(fx.host.selection().is_empty());

        fx.host.set_selection(Selection::from_positions(Position::new(1, 6), Position::new(1, 12)));
        fx.run(Command::KillRegion, 1, false);
        assert_eq!(fx.host.text(), "hello");
        assert_eq!(fx.kill_ring.get(None), " world");
    }

    #[test]
    fn test_set_mark_toggles() {
        let mut fx = Fixture::new("abc");
        fx.run(Command::SetMark, 1, false);
        assert!(fx.mark.is_active());
        fx.run(Command::SetMark, 1, false);
        assert!(!fx.mark.is_active());

        fx.host.set_selection(Selection::from_positions(Position::new(1, 3), Position::new(1, 1)));
        fx.run(Command::SetMark, 1, false);
        assert!(fx.mark.is_active());
        assert_eq!(fx.host.selection(), Selection::collapsed(Position::new(1, 1)));
    }

    #[test]
    fn test_newline_and_insert_tab() {
        let mut fx = Fixture::new("ab");
        fx.host.set_position(Position::new(1, 2));
        fx.run(Command::Newline, 2, false);
        assert_eq!(fx.host.text(), "a\n\nb");

        let mut fx = Fixture::new("x");
        fx.host = TextModel::new("x").with_tab_options(crate::editor::host::TabOptions {
            tab_size: 2,
            insert_spaces: true,
        });
        fx.run(Command::InsertTab, 2, false);
        assert_eq!(fx.host.text(), "    x");
    }

    #[test]
    fn test_open_line_restores_cursor() {
        let mut fx = Fixture::new("abc\ndef");
        fx.host.set_position(Position::new(1, 2));
        fx.run(Command::OpenLine, 1, false);
        assert_eq!(fx.host.text(), "abc\n\ndef");
        assert_eq!(fx.host.position(), Position::new(1, 2));
    }

    #[test]
    fn test_exchange_point_and_mark() {
        let mut fx = Fixture::new("abcdef");
        let selection = Selection::from_positions(Position::new(1, 1), Position::new(1, 4));
        fx.host.set_selection(selection);
        fx.run(Command::ExchangePointAndMark, 1, false);
        assert_eq!(fx.host.selection(), selection.inverted());
    }

    #[test]
    fn test_search_triggers_once() {
        let mut fx = Fixture::new("");
        fx.run(Command::Search, 3, false);
        fx.run(Command::Undo, 2, false);
        assert_eq!(fx.host.triggered(), ["editor.actions.findWithArgs", "undo", "undo"]);
    }

    #[test]
    fn test_move_to_window_line_rotates() {
        let text = (1..=10).map(|n| n.to_string()).collect::<Vec<_>>().join("\n");
        let mut fx = Fixture::new(&text);
        fx.host = TextModel::new(&text).with_viewport_height(5);
        fx.host.set_position(Position::new(2, 1));

        fx.run(Command::MoveToWindowLine, 1, false);
        assert_eq!(fx.host.position().line, 4);
        fx.run(Command::MoveToWindowLine, 1, false);
        assert_eq!(fx.host.position().line, 1);
        fx.run(Command::MoveToWindowLine, 1, false);
        assert_eq!(fx.host.position().line, 5);
    }

    #[test]
    fn test_goto_line_prompt_flow() {
        let mut fx = Fixture::new("1\n2\n3\n4\n5");
        fx.run(Command::GotoLine, 1, false);
        assert!(fx.prompt.is_active());
        assert_eq!(fx.prompt.message(), "Goto Line: ");

        fx.prompt.add_char('4').unwrap();
        let answer = fx.prompt.complete_input().unwrap();
        let mut ctx = CommandContext {
            host: &mut fx.host,
            kill_ring: &mut fx.kill_ring,
            mark: &mut fx.mark,
            sequence: &mut fx.sequence,
            prompt: &mut fx.prompt,
            repeat: 1,
            repeated: false,
        };
        finish_prompt(&mut ctx, answer);
        assert_eq!(fx.host.position(), Position::new(4, 1));
        assert_eq!(fx.host.focus_count(), 1);
    }

    #[test]
    fn test_goto_line_clamps_and_extends_selection() {
        let mut fx = Fixture::new("1\n2\n3");
        fx.mark.set(true);
        fx.host.set_position(Position::new(1, 2));
        let mut ctx = CommandContext {
            host: &mut fx.host,
            kill_ring: &mut fx.kill_ring,
            mark: &mut fx.mark,
            sequence: &mut fx.sequence,
            prompt: &mut fx.prompt,
            repeat: 1,
            repeated: false,
        };
        goto_line(&mut ctx, "99");
        assert_eq!(
            fx.host.selection(),
            Selection::from_positions(Position::new(1, 2), Position::new(3, 1))
        );
    }

    #[test]
    fn test_goto_line_overflowing_number_goes_to_last_line() {
        let mut fx = Fixture::new("1\n2\n3\n4");
        let mut ctx = CommandContext {
            host: &mut fx.host,
            kill_ring: &mut fx.kill_ring,
            mark: &mut fx.mark,
            sequence: &mut fx.sequence,
            prompt: &mut fx.prompt,
            repeat: 1,
            repeated: false,
        };
        goto_line(&mut ctx, "99999999999999999999999");
        assert_eq!(fx.host.position(), Position::new(4, 1));
    }

    #[test]
    fn test_repeat_text_limits_length() {
        assert_eq!(repeat_text("\n", 3), Some("\n\n\n".to_string()));
        assert_eq!(repeat_text("    ", usize::MAX), None);
        assert_eq!(repeat_text("\n", MAX_INSERT_LEN + 1), None);
    }

    #[test]
    fn test_huge_count_is_not_fatal() {
        let mut fx = Fixture::new("one\ntwo\nthree");
        fx.host.set_position(Position::new(2, 1));
        fx.run(Command::KillLine, usize::MAX, false);
        assert_eq!(fx.host.text(), "one\n");
        assert_eq!(fx.kill_ring.get(None), "two\nthree");

        fx.run(Command::Newline, usize::MAX, false);
        fx.run(Command::InsertTab, usize::MAX, false);
        assert_eq!(fx.host.text(), "one\n");
    }
}
