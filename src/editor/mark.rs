//! マークモード（選択モード）

use super::change_notifier::{Emitter, ListenerId};

/// マークモードの状態と変更通知
#[derive(Debug, Default)]
pub struct MarkMode {
    active: bool,
    on_change: Emitter<bool>,
}

impl MarkMode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// 値が変わったときだけ通知する
    pub fn set(&mut self, active: bool) {
        if self.active == active {
            return;
        }

        self.active = active;
        log::debug!("mark mode {}", if active { "on" } else { "off" });
        self.on_change.fire(&active);
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&bool) + 'static) -> ListenerId {
        self.on_change.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.on_change.unsubscribe(id)
    }

    pub(crate) fn dispose(&mut self) {
        self.on_change.dispose();
    }
}
