use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    rc::{Rc, Weak},
};

use tracing::debug;

/// Window dimensions in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

type Listener = Box<dyn FnMut(ViewportSize)>;

#[derive(Default)]
struct Inner {
    size: ViewportSize,
    next_id: u64,
    listeners: BTreeMap<u64, Listener>,
    /// Set while `resize` holds the listeners outside of `listeners`.
    dispatching: bool,
    /// Subscriptions dropped while dispatching.
    dropped: BTreeSet<u64>,
}

/// Process wide viewport size that views subscribe to while mounted.
///
/// Cloning shares the same signal. Listeners run on the thread that calls
/// [`ViewportSignal::resize`]; the editor is single threaded.
#[derive(Clone, Default)]
pub struct ViewportSignal {
    inner: Rc<RefCell<Inner>>,
}

impl ViewportSignal {
    pub fn new(size: ViewportSize) -> Self {
        let signal = Self::default();
        signal.inner.borrow_mut().size = size;
        signal
    }

    pub fn size(&self) -> ViewportSize {
        self.inner.borrow().size
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Registers `listener`; it stays registered until the returned guard is dropped.
    /// The listener is called once immediately with the current size.
    pub fn subscribe<F>(&self, mut listener: F) -> Subscription
    where
        F: FnMut(ViewportSize) + 'static,
    {
        let size = self.size();
        listener(size);
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.insert(id, Box::new(listener));
        Subscription {
            id,
            signal: Rc::downgrade(&self.inner),
        }
    }

    pub fn resize(&self, size: ViewportSize) {
        // Listeners are taken out while they run so one may subscribe or drop
        // a subscription without a double borrow. Drops during the loop are
        // recorded in `dropped` and honoured before the map is put back.
        let mut listeners = {
            let mut inner = self.inner.borrow_mut();
            if inner.size == size || inner.dispatching {
                inner.size = size;
                return;
            }
            inner.size = size;
            inner.dispatching = true;
            std::mem::take(&mut inner.listeners)
        };
        debug!(
            "Viewport resized to {}x{}, notifying {} listeners",
            size.width,
            size.height,
            listeners.len()
        );
        for (id, listener) in listeners.iter_mut() {
            let dropped = self.inner.borrow().dropped.contains(id);
            if !dropped {
                listener(size);
            }
        }
        // Discarded listeners may own guards of their own, so they are
        // dropped outside any borrow until no further drops are recorded.
        loop {
            let dropped = std::mem::take(&mut self.inner.borrow_mut().dropped);
            if dropped.is_empty() {
                break;
            }
            listeners.retain(|id, _| !dropped.contains(id));
        }
        let mut inner = self.inner.borrow_mut();
        let added = std::mem::take(&mut inner.listeners);
        listeners.extend(added);
        inner.listeners = listeners;
        inner.dispatching = false;
    }
}

/// Unsubscribes its listener when dropped.
pub struct Subscription {
    id: u64,
    signal: Weak<RefCell<Inner>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.signal.upgrade() {
            let mut inner = inner.borrow_mut();
            if inner.listeners.remove(&self.id).is_none() && inner.dispatching {
                inner.dropped.insert(self.id);
            }
        }
    }
}

#[test]
fn dropped_subscription_stops_listening() {
    let signal = ViewportSignal::new(ViewportSize {
        width: 800,
        height: 600,
    });
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let subscription = signal.subscribe(move |size| sink.borrow_mut().push(size.width));
    signal.resize(ViewportSize {
        width: 1024,
        height: 600,
    });
    drop(subscription);
    signal.resize(ViewportSize {
        width: 1280,
        height: 600,
    });
    assert_eq!(*seen.borrow(), vec![800, 1024]);
    assert_eq!(signal.listener_count(), 0);
}

#[test]
fn subscription_dropped_by_another_listener() {
    let signal = ViewportSignal::new(ViewportSize {
        width: 800,
        height: 600,
    });
    let calls = Rc::new(RefCell::new(0));
    let counter = calls.clone();
    let first = signal.subscribe(move |_| *counter.borrow_mut() += 1);
    let held = Rc::new(RefCell::new(Some(first)));
    let holder = held.clone();
    let _second = signal.subscribe(move |_| {
        holder.borrow_mut().take();
    });

    signal.resize(ViewportSize {
        width: 1024,
        height: 600,
    });
    assert_eq!(signal.listener_count(), 1);
    signal.resize(ViewportSize {
        width: 1280,
        height: 600,
    });
    assert_eq!(*calls.borrow(), 2);
    assert!(held.borrow().is_none());
}
