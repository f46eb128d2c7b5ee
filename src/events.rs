use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn() + Send + Sync>;

/// Subscribers to the "tiles were removed" notification, called in subscription order.
#[derive(Default)]
pub struct RemovalListeners {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl RemovalListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Arc::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Copies the current listener list so it can be invoked without holding a lock.
    pub(crate) fn snapshot(&self) -> Vec<Listener> {
        self.listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
    }
}

impl std::fmt::Debug for RemovalListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemovalListeners")
            .field("subscribers", &self.listeners.len())
            .finish()
    }
}
