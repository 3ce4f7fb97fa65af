//! Lazy asset version lookup.

use std::fmt;
use std::sync::{Arc, OnceLock};

type VersionFn = Box<dyn Fn() -> Option<String> + Send + Sync>;

struct Inner {
    resolve: VersionFn,
    cached: OnceLock<Option<String>>,
}

/// Resolves the current asset version on first use and remembers it for
/// the rest of the request.
#[derive(Clone)]
pub struct VersionResolver {
    inner: Arc<Inner>,
}

impl VersionResolver {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> Option<String> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                resolve: Box::new(f),
                cached: OnceLock::new(),
            }),
        }
    }

    /// A resolver with a known value.
    pub fn fixed(version: Option<String>) -> Self {
        let resolver = Self::new(|| None);
        let _ = resolver.inner.cached.set(version);
        resolver
    }

    /// `None` means versioning is not in use.
    pub fn get(&self) -> Option<&str> {
        self.inner
            .cached
            .get_or_init(|| (self.inner.resolve)())
            .as_deref()
    }

    pub fn is_resolved(&self) -> bool {
        self.inner.cached.get().is_some()
    }
}

impl Default for VersionResolver {
    fn default() -> Self {
        Self::fixed(None)
    }
}

impl fmt::Debug for VersionResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionResolver")
            .field("cached", &self.inner.cached.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_resolves_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let resolver = VersionResolver::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
            Some("1234".to_string())
        });

        assert!(!resolver.is_resolved());
        assert_eq!(resolver.get(), Some("1234"));
        assert_eq!(resolver.clone().get(), Some("1234"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fixed() {
        assert_eq!(VersionResolver::fixed(None).get(), None);
        assert_eq!(VersionResolver::fixed(Some("v2".into())).get(), Some("v2"));
        assert!(VersionResolver::default().is_resolved());
    }
}
