//! Request-scoped context.
//!
//! Each request carries its own [`Context`]. Middleware and the router add
//! values to it (the authenticated user, the matched path parameters) and
//! handlers read them back. A context is never mutated in place: [`Context::with`]
//! returns a new context and leaves the original untouched, so two requests
//! can never observe each other's values.
//!
//! Values are addressed by typed [`Key`]s. A key carries both a name and the
//! type stored under it, so a lookup either yields a `&T` or nothing.
//!
//! ```rust
//! use gatehouse::context::{Context, USER_ID};
//!
//! let anonymous = Context::new();
//! let signed_in = anonymous.with(USER_ID, "507f1f77bcf86cd799439011".to_owned());
//!
//! assert!(anonymous.get(USER_ID).is_none());
//! assert_eq!(signed_in.get(USER_ID).map(String::as_str), Some("507f1f77bcf86cd799439011"));
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::path::Params;

/// Identity of the authenticated principal, set by the auth gate.
pub const USER_ID: Key<String> = Key::new("user_id");

/// Parameters bound by the matched route template, set by the router.
pub const PATH_PARAMS: Key<Params> = Key::new("path_params");

/// A typed handle into a [`Context`].
pub struct Key<T> {
    name: &'static str,
    _type: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    pub const fn new(name: &'static str) -> Self {
        Self { name, _type: PhantomData }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

// Manual impls: derive would demand `T: Clone`.
impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Key<T> {}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Key").field(&self.name).finish()
    }
}

type Value = Arc<dyn Any + Send + Sync>;

/// Immutable per-request key/value store.
///
/// Cloning is one atomic increment; deriving a new context with
/// [`with`](Context::with) copies the (small) map once.
#[derive(Clone, Default)]
pub struct Context {
    values: Arc<HashMap<&'static str, Value>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of this context with `key` set to `value`.
    ///
    /// Every other key keeps its value. An existing value under `key` is
    /// replaced in the returned context only.
    pub fn with<T>(&self, key: Key<T>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        let mut values = HashMap::clone(&self.values);
        values.insert(key.name, Arc::new(value));
        Self { values: Arc::new(values) }
    }

    /// Looks up `key`. `None` means the value was never set for this request.
    pub fn get<T>(&self, key: Key<T>) -> Option<&T>
    where
        T: Any + Send + Sync,
    {
        self.values.get(key.name)?.downcast_ref::<T>()
    }

    pub fn contains<T>(&self, key: Key<T>) -> bool
    where
        T: Any + Send + Sync,
    {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNT: Key<u32> = Key::new("count");

    #[test]
    fn missing_key_is_none() {
        let ctx = Context::new();
        assert!(ctx.get(USER_ID).is_none());
        assert!(!ctx.contains(PATH_PARAMS));
    }

    #[test]
    fn with_preserves_existing_keys() {
        let params: Params = [("id", "42")].into_iter().collect();
        let ctx = Context::new()
            .with(PATH_PARAMS, params)
            .with(USER_ID, "u1".to_owned());

        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx.get(USER_ID).map(String::as_str), Some("u1"));
        assert_eq!(ctx.get(PATH_PARAMS).and_then(|p| p.get("id")), Some("42"));
    }

    #[test]
    fn with_does_not_touch_the_source_context() {
        let base = Context::new().with(COUNT, 1);
        let derived = base.with(COUNT, 2);

        assert_eq!(base.get(COUNT), Some(&1));
        assert_eq!(derived.get(COUNT), Some(&2));
    }

    #[test]
    fn type_mismatch_reads_as_missing() {
        let ctx = Context::new().with(COUNT, 7);
        let wrong: Key<String> = Key::new("count");
        assert!(ctx.get(wrong).is_none());
    }

    #[test]
    fn sibling_contexts_are_isolated() {
        let root = Context::new();
        let a = root.with(USER_ID, "alice".to_owned());
        let b = root.with(USER_ID, "bob".to_owned());

        assert_eq!(a.get(USER_ID).map(String::as_str), Some("alice"));
        assert_eq!(b.get(USER_ID).map(String::as_str), Some("bob"));
        assert!(root.get(USER_ID).is_none());
    }

    #[test]
    fn concurrent_tasks_never_share_values() {
        let handles: Vec<_> = (0..8u32)
            .map(|i| {
                std::thread::spawn(move || {
                    let ctx = Context::new().with(COUNT, i);
                    *ctx.get(COUNT).unwrap()
                })
            })
            .collect();
        let seen: Vec<u32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(seen, (0..8).collect::<Vec<_>>());
    }
}
