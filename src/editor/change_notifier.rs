//! 変更通知システム
//!
//! 購読・購読解除を明示する同期イベント配信。リスナーは登録順に呼ばれる。

use std::fmt;

/// リスナーの一意識別子
pub type ListenerId = usize;

type Listener<T> = Box<dyn FnMut(&T)>;

/// イベント配信器
pub struct Emitter<T> {
    listeners: Vec<(ListenerId, Listener<T>)>,
    next_listener_id: ListenerId,
    disposed: bool,
}

impl<T> Emitter<T> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_listener_id: 0,
            disposed: false,
        }
    }

    /// リスナーを登録し、購読解除用のIDを返す
    pub fn subscribe(&mut self, listener: impl FnMut(&T) + 'static) -> ListenerId {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        if !self.disposed {
            self.listeners.push((id, Box::new(listener)));
        }
        id
    }

    /// 購読を解除。見つからなければ false。
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// 全リスナーへ配信
    pub fn fire(&mut self, event: &T) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// 全リスナーを破棄する。以降の購読は無視される。
    pub fn dispose(&mut self) {
        self.listeners.clear();
        self.disposed = true;
    }
}

impl<T> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listeners.len())
            .field("disposed", &self.disposed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn fires_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut emitter = Emitter::<u32>::new();

        let first = Rc::clone(&log);
        emitter.subscribe(move |v| first.borrow_mut().push(format!("a{}", v)));
        let second = Rc::clone(&log);
        emitter.subscribe(move |v| second.borrow_mut().push(format!("b{}", v)));

        emitter.fire(&1);
        assert_eq!(*log.borrow(), vec!["a1", "b1"]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let count = Rc::new(RefCell::new(0));
        let mut emitter = Emitter::<bool>::new();
        let counter = Rc::clone(&count);
        let id = emitter.subscribe(move |_| *counter.borrow_mut() += 1);

        emitter.fire(&true);
        assert!(emitter.unsubscribe(id));
        assert!(!emitter.unsubscribe(id));
        emitter.fire(&true);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn dispose_drops_listeners() {
        let mut emitter = Emitter::<String>::new();
        emitter.subscribe(|_| {});
        emitter.dispose();
        emitter.subscribe(|_| {});
        assert_eq!(emitter.listener_count(), 0);
    }
}
