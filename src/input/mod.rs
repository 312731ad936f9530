//! Keyboard shortcut routing.
//!
//! [`KeyEventBus`] stands in for a document-level key listener: the host
//! dispatches key events into it, handlers are owned subscriptions that
//! deregister on drop, so a torn-down editor session can never leave a
//! stale handler behind. Events flagged as coming from a text-input context
//! are ignored by the controller so shortcuts never intercept text entry.

use std::cell::RefCell;
use std::mem;
use std::rc::{Rc, Weak};

use crate::transform::TransformMode;

/// One key press, as reported by the host's windowing/DOM layer.
#[derive(Debug, Clone)]
pub struct KeyEvent {
    /// Key name (`"g"`, `"R"`, `"Escape"`); matching is case-insensitive.
    pub key: String,
    /// True when the event target is a text-input-capable element.
    pub from_text_input: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            from_text_input: false,
        }
    }

    pub fn in_text_input(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            from_text_input: true,
        }
    }
}

/// What a shortcut asks the controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    SetMode(TransformMode),
    /// Escape: deselect and drop back to no mode.
    ClearSelection,
}

/// Map a key name to its editor action, if any.
pub fn shortcut_action(key: &str) -> Option<ShortcutAction> {
    match key.to_ascii_lowercase().as_str() {
        "g" => Some(ShortcutAction::SetMode(TransformMode::Position)),
        "r" => Some(ShortcutAction::SetMode(TransformMode::Rotation)),
        "s" => Some(ShortcutAction::SetMode(TransformMode::Scale)),
        "escape" => Some(ShortcutAction::ClearSelection),
        _ => None,
    }
}

type Handler = Box<dyn FnMut(&KeyEvent)>;

#[derive(Default)]
struct BusInner {
    next_id: u64,
    dispatch_depth: u32,
    pending_removals: Vec<u64>,
    handlers: Vec<(u64, Handler)>,
}

impl BusInner {
    fn remove(&mut self, id: u64) {
        if self.dispatch_depth > 0 {
            self.pending_removals.push(id);
        } else {
            self.handlers.retain(|(i, _)| *i != id);
        }
    }
}

/// Shared key-event fan-out, one per editor window.
#[derive(Clone, Default)]
pub struct KeyEventBus {
    inner: Rc<RefCell<BusInner>>,
}

impl KeyEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. Dropping (or closing) the returned subscription
    /// deregisters it.
    pub fn subscribe(&self, handler: impl FnMut(&KeyEvent) + 'static) -> KeySubscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.handlers.push((id, Box::new(handler)));
        KeySubscription {
            bus: Rc::downgrade(&self.inner),
            id: Some(id),
        }
    }

    /// Deliver one key event to every registered handler. Handlers may
    /// subscribe or unsubscribe while the event is being dispatched, but
    /// dispatching a new event from inside a handler is unsupported: the
    /// handler list is taken out for the outer pass, so a nested event only
    /// reaches handlers registered during that pass. Hosts deliver key
    /// events one at a time.
    pub fn dispatch(&self, event: &KeyEvent) {
        let mut handlers = {
            let mut inner = self.inner.borrow_mut();
            inner.dispatch_depth += 1;
            mem::take(&mut inner.handlers)
        };
        for (_, handler) in handlers.iter_mut() {
            handler(event);
        }
        let mut inner = self.inner.borrow_mut();
        handlers.append(&mut inner.handlers);
        inner.handlers = handlers;
        inner.dispatch_depth -= 1;
        if inner.dispatch_depth == 0 {
            let removed = mem::take(&mut inner.pending_removals);
            if !removed.is_empty() {
                inner.handlers.retain(|(id, _)| !removed.contains(id));
            }
        }
    }

    pub fn handler_count(&self) -> usize {
        self.inner.borrow().handlers.len()
    }
}

/// Owned registration on a [`KeyEventBus`]. Deregisters on `close` or drop,
/// whichever comes first.
pub struct KeySubscription {
    bus: Weak<RefCell<BusInner>>,
    id: Option<u64>,
}

impl KeySubscription {
    pub fn close(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        if let Some(bus) = self.bus.upgrade() {
            bus.borrow_mut().remove(id);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.id.is_none()
    }
}

impl Drop for KeySubscription {
    fn drop(&mut self) {
        self.close();
    }
}
