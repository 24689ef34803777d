use std::sync::mpsc::{self, Receiver};

type Callback<T> = Box<dyn FnMut(T) + Send>;

/// A list of observer callbacks for tag-only notifications
///
/// Callbacks run synchronously, in registration order, on the thread that notifies.
/// A slow observer delays the notifier.
pub struct Observers<T> {
    callbacks: Vec<Callback<T>>,
}

impl<T: Copy> Observers<T> {
    pub fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    /// Register a callback
    pub fn subscribe(&mut self, f: impl FnMut(T) + Send + 'static) {
        self.callbacks.push(Box::new(f));
    }

    /// Register a channel and return its receiving end
    ///
    /// Notifications sent after the receiver is dropped are discarded.
    pub fn channel(&mut self) -> Receiver<T>
    where
        T: Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        self.subscribe(move |event| {
            let _ = tx.send(event);
        });
        rx
    }

    /// Invoke every callback with `event`
    pub fn notify(&mut self, event: T) {
        for f in self.callbacks.iter_mut() {
            f(event);
        }
    }
}

impl<T: Copy> Default for Observers<T> {
    fn default() -> Self {
        Self::new()
    }
}
