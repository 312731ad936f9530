//! Transform- and mode-change notification.
//!
//! Explicit observer lists rather than a single replaceable callback slot,
//! so wiring a second consumer (property panel plus asset sync) cannot
//! silently drop the first. Listeners always receive copies of the
//! transform state, never live node references.

use std::cell::RefCell;
use std::mem;

use crate::transform::{TransformMode, TransformSnapshot};

/// Handle for unregistering a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type TransformListener = Box<dyn FnMut(Option<&TransformSnapshot>)>;
type ModeListener = Box<dyn FnMut(TransformMode)>;

#[derive(Default)]
struct Inner {
    next_id: u64,
    emit_depth: u32,
    pending_removals: Vec<ListenerId>,
    transform: Vec<(ListenerId, TransformListener)>,
    mode: Vec<(ListenerId, ModeListener)>,
}

/// Single-threaded change notifier. Listeners may register or remove
/// listeners from inside a callback; emission takes the list out and merges
/// changes back afterwards. Emitting from inside a listener is unsupported:
/// the nested emission only reaches listeners registered during the outer
/// pass, since the list is taken out for its duration. The controller only
/// emits after its own mutations complete, so emissions never nest on the
/// same channel.
#[derive(Default)]
pub struct ChangeNotifier {
    inner: RefCell<Inner>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_transform_changed(
        &self,
        listener: impl FnMut(Option<&TransformSnapshot>) + 'static,
    ) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.next_id);
        inner.next_id += 1;
        inner.transform.push((id, Box::new(listener)));
        id
    }

    pub fn on_mode_changed(&self, listener: impl FnMut(TransformMode) + 'static) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.next_id);
        inner.next_id += 1;
        inner.mode.push((id, Box::new(listener)));
        id
    }

    /// Unregister a listener from either list. Removals requested during an
    /// emission are applied once it finishes.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.emit_depth > 0 {
            inner.pending_removals.push(id);
            return true;
        }
        let before = inner.transform.len() + inner.mode.len();
        inner.transform.retain(|(i, _)| *i != id);
        inner.mode.retain(|(i, _)| *i != id);
        before != inner.transform.len() + inner.mode.len()
    }

    pub fn emit_transform(&self, snapshot: Option<&TransformSnapshot>) {
        let mut taken = {
            let mut inner = self.inner.borrow_mut();
            inner.emit_depth += 1;
            mem::take(&mut inner.transform)
        };
        for (_, listener) in taken.iter_mut() {
            listener(snapshot);
        }
        self.merge_back(taken, |inner| &mut inner.transform);
    }

    pub fn emit_mode(&self, mode: TransformMode) {
        let mut taken = {
            let mut inner = self.inner.borrow_mut();
            inner.emit_depth += 1;
            mem::take(&mut inner.mode)
        };
        for (_, listener) in taken.iter_mut() {
            listener(mode);
        }
        self.merge_back(taken, |inner| &mut inner.mode);
    }

    fn merge_back<T>(
        &self,
        mut taken: Vec<(ListenerId, T)>,
        list: impl Fn(&mut Inner) -> &mut Vec<(ListenerId, T)>,
    ) {
        let mut inner = self.inner.borrow_mut();
        // keep registrations made during the emission
        taken.append(list(&mut inner));
        *list(&mut inner) = taken;
        inner.emit_depth -= 1;
        if inner.emit_depth == 0 {
            let removed = mem::take(&mut inner.pending_removals);
            if !removed.is_empty() {
                inner.transform.retain(|(i, _)| !removed.contains(i));
                inner.mode.retain(|(i, _)| !removed.contains(i));
            }
        }
    }

    pub fn transform_listener_count(&self) -> usize {
        self.inner.borrow().transform.len()
    }

    pub fn mode_listener_count(&self) -> usize {
        self.inner.borrow().mode.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn snapshot() -> TransformSnapshot {
        TransformSnapshot {
            name: "mesh".to_string(),
            position: Vec3::ONE,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    #[test]
    fn every_listener_sees_every_emission() {
        let notifier = ChangeNotifier::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for tag in ["panel", "sync"] {
            let seen = Rc::clone(&seen);
            notifier.on_transform_changed(move |snap| {
                seen.borrow_mut().push((tag, snap.is_some()));
            });
        }

        let snap = snapshot();
        notifier.emit_transform(Some(&snap));
        notifier.emit_transform(None);
        assert_eq!(
            *seen.borrow(),
            vec![("panel", true), ("sync", true), ("panel", false), ("sync", false)]
        );
    }

    #[test]
    fn remove_unregisters() {
        let notifier = ChangeNotifier::new();
        let count = Rc::new(RefCell::new(0));
        let id = {
            let count = Rc::clone(&count);
            notifier.on_mode_changed(move |_| *count.borrow_mut() += 1)
        };
        notifier.emit_mode(TransformMode::Position);
        assert!(notifier.remove(id));
        notifier.emit_mode(TransformMode::Scale);
        assert_eq!(*count.borrow(), 1);
        assert!(!notifier.remove(id));
    }

    #[test]
    fn listener_may_register_another_during_emission() {
        let notifier = Rc::new(ChangeNotifier::new());
        let count = Rc::new(RefCell::new(0));
        {
            let notifier = Rc::clone(&notifier);
            let count = Rc::clone(&count);
            let mut registered = false;
            notifier.clone().on_mode_changed(move |_| {
                if !registered {
                    registered = true;
                    let count = Rc::clone(&count);
                    notifier.on_mode_changed(move |_| *count.borrow_mut() += 1);
                }
            });
        }
        notifier.emit_mode(TransformMode::Position);
        assert_eq!(notifier.mode_listener_count(), 2);
        notifier.emit_mode(TransformMode::Rotation);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn nested_emission_skips_listeners_in_the_outer_pass() {
        let notifier = Rc::new(ChangeNotifier::new());
        let first_seen = Rc::new(RefCell::new(Vec::new()));
        let second_seen = Rc::new(RefCell::new(Vec::new()));
        {
            let notifier_handle = Rc::clone(&notifier);
            let first_seen = Rc::clone(&first_seen);
            let mut reemitted = false;
            notifier.on_mode_changed(move |mode| {
                first_seen.borrow_mut().push(mode);
                if !reemitted {
                    reemitted = true;
                    notifier_handle.emit_mode(TransformMode::Scale);
                }
            });
            let second_seen = Rc::clone(&second_seen);
            notifier.on_mode_changed(move |mode| {
                second_seen.borrow_mut().push(mode);
            });
        }

        notifier.emit_mode(TransformMode::Position);
        // the nested Scale emission reaches neither listener: both were
        // taken out for the outer pass
        assert_eq!(*first_seen.borrow(), vec![TransformMode::Position]);
        assert_eq!(*second_seen.borrow(), vec![TransformMode::Position]);
        assert_eq!(notifier.mode_listener_count(), 2);
    }

    #[test]
    fn listener_may_remove_itself_during_emission() {
        let notifier = Rc::new(ChangeNotifier::new());
        let count = Rc::new(RefCell::new(0));
        let id = Rc::new(RefCell::new(None));
        {
            let notifier_handle = Rc::clone(&notifier);
            let count = Rc::clone(&count);
            let id_cell = Rc::clone(&id);
            let registered = notifier.on_mode_changed(move |_| {
                *count.borrow_mut() += 1;
                if let Some(id) = *id_cell.borrow() {
                    notifier_handle.remove(id);
                }
            });
            *id.borrow_mut() = Some(registered);
        }
        notifier.emit_mode(TransformMode::Position);
        notifier.emit_mode(TransformMode::Position);
        assert_eq!(*count.borrow(), 1);
    }
}
