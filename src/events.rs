//! Change notification
//!
//! Listeners receive `(key, old_value, new_value)` synchronously after every
//! successful mutation, in registration order. A panicking listener is
//! isolated so the mutation and the remaining listeners still complete.

use crate::sync::RwLockExt;
use crate::value::ConfigValue;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, RwLock};

/// Type alias for a change callback
pub type ChangeListener = Arc<dyn Fn(&str, &ConfigValue, &ConfigValue) + Send + Sync>;

/// Ordered list of change listeners
#[derive(Default)]
pub struct ChangeNotifier {
    listeners: RwLock<Vec<ChangeListener>>,
}

impl ChangeNotifier {
    /// Create a notifier with no listeners
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener, appended after existing ones
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&str, &ConfigValue, &ConfigValue) + Send + Sync + 'static,
    {
        self.listeners.write_recovered().push(Arc::new(listener));
    }

    /// Invoke every listener in registration order
    pub fn notify(&self, key: &str, old_value: &ConfigValue, new_value: &ConfigValue) {
        let listeners = self.listeners.read_recovered().clone();
        for listener in &listeners {
            let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
                listener(key, old_value, new_value);
            }));
            if result.is_err() {
                log::warn!("Change listener panicked for key '{key}', continuing");
            }
        }
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners.read_recovered().len()
    }

    /// True if no listeners are registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every listener
    pub fn clear(&self) {
        self.listeners.write_recovered().clear();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_listeners_invoked_in_order() {
        let notifier = ChangeNotifier::new();
        let order = Arc::new(RwLock::new(Vec::new()));

        for id in 0..3 {
            let order = order.clone();
            notifier.subscribe(move |_key, _old, _new| {
                order.write().unwrap().push(id);
            });
        }

        notifier.notify("ui.theme", &ConfigValue::Null, &"dark".into());
        assert_eq!(*order.read().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_listener_receives_old_and_new() {
        let notifier = ChangeNotifier::new();
        let seen = Arc::new(RwLock::new(None));
        let seen_clone = seen.clone();

        notifier.subscribe(move |key, old, new| {
            *seen_clone.write().unwrap() = Some((key.to_string(), old.clone(), new.clone()));
        });

        notifier.notify("ui.theme", &"light".into(), &"dark".into());

        let captured = seen.read().unwrap().clone().unwrap();
        assert_eq!(captured.0, "ui.theme");
        assert_eq!(captured.1, ConfigValue::from("light"));
        assert_eq!(captured.2, ConfigValue::from("dark"));
    }

    #[test]
    fn test_panicking_listener_does_not_abort_rest() {
        let notifier = ChangeNotifier::new();
        let counter = Arc::new(AtomicUsize::new(0));

        notifier.subscribe(|_key, _old, _new| panic!("listener bug"));

        let counter_clone = counter.clone();
        notifier.subscribe(move |_key, _old, _new| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        notifier.notify("key", &ConfigValue::Null, &ConfigValue::Bool(true));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clear() {
        let notifier = ChangeNotifier::new();
        notifier.subscribe(|_, _, _| {});
        assert_eq!(notifier.len(), 1);
        notifier.clear();
        assert!(notifier.is_empty());
    }
}
