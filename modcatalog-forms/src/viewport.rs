use crate::autocomplete::Autocomplete;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Window-level resize subscriptions.
///
/// Widgets are held weakly. A subscription whose widget was dropped or
/// disconnected is removed on the next [`Viewport::resize`].
#[derive(Debug, Default)]
pub struct Viewport {
    listeners: Vec<Weak<RefCell<Autocomplete>>>,
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, widget: &Rc<RefCell<Autocomplete>>) {
        self.listeners.push(Rc::downgrade(widget));
    }

    /// Dispatches a resize; returns the number of listeners still attached.
    pub fn resize(&mut self) -> usize {
        self.listeners.retain(|listener| {
            let Some(widget) = listener.upgrade() else {
                return false;
            };
            let mut widget = widget.borrow_mut();
            if !widget.is_connected() {
                return false;
            }
            widget.reposition();
            true
        });
        self.listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autocomplete::{InputBox, Placement};

    #[test]
    fn resize_repositions_live_widgets_and_detaches_dead_ones() {
        let mut viewport = Viewport::new();
        let live = Rc::new(RefCell::new(Autocomplete::attach(vec!["a".into()])));
        let removed = Rc::new(RefCell::new(Autocomplete::attach(vec!["b".into()])));
        let dropped = Rc::new(RefCell::new(Autocomplete::attach(vec!["c".into()])));
        viewport.subscribe(&live);
        viewport.subscribe(&removed);
        viewport.subscribe(&dropped);

        live.borrow_mut().set_anchor(InputBox {
            client_width: 120,
            client_height: 20,
            offset_left: 5,
            offset_top: 10,
        });
        removed.borrow_mut().disconnect();
        drop(dropped);

        assert_eq!(viewport.resize(), 1);
        assert_eq!(
            live.borrow().placement(),
            Placement {
                width: 120,
                left: 5,
                top: 30
            }
        );

        drop(live);
        assert_eq!(viewport.resize(), 0);
    }
}
