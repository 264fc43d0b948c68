//! Handle registry of live sessions.
//!
//! Handles come from a monotonically increasing counter starting at 1 and are
//! never reused, so a disposed handle can never alias a newer session and the
//! registry can tell "disposed" apart from "never issued" without keeping
//! tombstones.
//!
//! The map lock is held only to insert, look up or remove an entry. Each
//! session sits behind its own mutex, so calls on one handle are serialized
//! while different handles build and solve in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use ftlp_core::{Backend, CacheStats, ModelError, Session, SessionError, SparseRowCache};
use ftlp_solver::SolverConfig;

use crate::error::ApiError;

/// Opaque session handle.
pub type Handle = i32;

type SharedSession<B> = Arc<Mutex<Session<B>>>;

#[derive(Debug)]
struct Slots<B: Backend> {
    sessions: HashMap<Handle, SharedSession<B>>,
    next_handle: Handle,
}

/// Owns every live session plus the row cache they share.
#[derive(Debug)]
pub struct SessionRegistry<B: Backend> {
    slots: Mutex<Slots<B>>,
    cache: Arc<SparseRowCache>,
    backend: B,
    default_config: SolverConfig,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn dimension(what: &'static str, value: i32) -> Result<usize, ModelError> {
    usize::try_from(value).map_err(|_| ModelError::NegativeDimension {
        what,
        value: i64::from(value),
    })
}

impl<B: Backend + Clone> SessionRegistry<B> {
    /// Create an empty registry; every session gets a clone of `backend`.
    pub fn new(backend: B) -> Self {
        Self {
            slots: Mutex::new(Slots {
                sessions: HashMap::new(),
                next_handle: 1,
            }),
            cache: Arc::new(SparseRowCache::new()),
            backend,
            default_config: SolverConfig::default(),
        }
    }

    /// Configuration copied into every new session.
    pub fn with_default_config(mut self, config: SolverConfig) -> Self {
        self.default_config = config;
        self
    }

    /// Create a session and return its handle.
    pub fn create(&self, num_columns: i32, num_rows: i32) -> Result<Handle, ApiError> {
        let num_columns = dimension("num_columns", num_columns)?;
        let row_hint = dimension("num_rows", num_rows)?;
        let session = Session::new(
            num_columns,
            row_hint,
            self.backend.clone(),
            Arc::clone(&self.cache),
        )?
        .with_config(self.default_config.clone());

        let mut slots = lock(&self.slots);
        let handle = slots.next_handle;
        if handle == Handle::MAX {
            tracing::warn!(
                component = "registry",
                operation = "create",
                status = "error",
                "Handle space exhausted"
            );
            return Err(ApiError::HandlesExhausted);
        }
        slots.next_handle += 1;
        slots
            .sessions
            .insert(handle, Arc::new(Mutex::new(session)));
        let live = slots.sessions.len();
        drop(slots);

        tracing::debug!(
            component = "registry",
            operation = "create",
            status = "success",
            handle,
            num_columns,
            row_hint,
            live_sessions = live,
            "Created session"
        );
        Ok(handle)
    }
}

impl<B: Backend> SessionRegistry<B> {
    /// Run `f` on the session behind `handle`.
    ///
    /// The registry lock is released before the session lock is taken, so a
    /// long solve only blocks callers of the same handle.
    pub fn with_session<R, E>(
        &self,
        handle: Handle,
        operation: &'static str,
        f: impl FnOnce(&mut Session<B>) -> Result<R, E>,
    ) -> Result<R, ApiError>
    where
        ApiError: From<E>,
    {
        let session = self.lookup(handle, operation)?;
        let mut session = lock(&session);
        let result = f(&mut session);
        drop(session);
        result.map_err(|err| {
            let err = ApiError::from(err);
            if matches!(err, ApiError::Session(SessionError::UseAfterDispose { .. })) {
                ApiError::DisposedHandle { handle, operation }
            } else {
                err
            }
        })
    }

    /// Dispose the session behind `handle`.
    ///
    /// Returns `Ok(false)` when the handle was already disposed.
    pub fn dispose(&self, handle: Handle) -> Result<bool, ApiError> {
        let mut slots = lock(&self.slots);
        let removed = slots.sessions.remove(&handle);
        let issued = Self::was_issued(&slots, handle);
        let live = slots.sessions.len();
        drop(slots);

        match removed {
            Some(session) => {
                lock(&session).dispose();
                tracing::debug!(
                    component = "registry",
                    operation = "dispose",
                    status = "success",
                    handle,
                    live_sessions = live,
                    "Disposed session"
                );
                Ok(true)
            }
            None if issued => Ok(false),
            None => Err(ApiError::UnknownHandle { handle }),
        }
    }

    /// The backend's unbounded sentinel.
    pub fn infinity(&self) -> f64 {
        self.backend.infinity()
    }

    /// The row cache shared by every session of this registry.
    pub fn cache(&self) -> &Arc<SparseRowCache> {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Number of live (not yet disposed) sessions.
    pub fn len(&self) -> usize {
        lock(&self.slots).sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, handle: Handle, operation: &'static str) -> Result<SharedSession<B>, ApiError> {
        let slots = lock(&self.slots);
        if let Some(session) = slots.sessions.get(&handle) {
            return Ok(Arc::clone(session));
        }
        let err = if Self::was_issued(&slots, handle) {
            ApiError::DisposedHandle { handle, operation }
        } else {
            ApiError::UnknownHandle { handle }
        };
        drop(slots);
        tracing::warn!(
            component = "registry",
            operation,
            status = "error",
            handle,
            code = err.code(),
            "Rejected handle"
        );
        Err(err)
    }

    fn was_issued(slots: &Slots<B>, handle: Handle) -> bool {
        (1..slots.next_handle).contains(&handle)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use ftlp_core::{ErrorKind, Model};
    use ftlp_solver::{Solution, SolverError, SolverStatus};
    use std::thread;

    /// Scores the objective at each column's upper bound.
    #[derive(Debug, Clone, Copy, Default)]
    struct UpperBoundBackend;

    impl Backend for UpperBoundBackend {
        fn name(&self) -> &'static str {
            "upper_bound"
        }

        fn solve(
            &mut self,
            model: &Model,
            _config: &SolverConfig,
        ) -> Result<Solution, SolverError> {
            let point: Vec<f64> = model.columns().iter().map(|c| c.bounds.upper).collect();
            let score = model.objective_value(&point);
            Ok(Solution::new(SolverStatus::Optimal, point, score))
        }
    }

    fn registry() -> SessionRegistry<UpperBoundBackend> {
        SessionRegistry::new(UpperBoundBackend)
    }

    #[test]
    fn test_handles_are_monotonic_and_never_reused() {
        let registry = registry();
        let first = registry.create(1, 0).unwrap();
        let second = registry.create(1, 0).unwrap();
        assert_eq!((first, second), (1, 2));
        assert!(registry.dispose(first).unwrap());
        let third = registry.create(1, 0).unwrap();
        assert_eq!(third, 3);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_disposed_and_unknown_handles() {
        let registry = registry();
        let handle = registry.create(2, 0).unwrap();
        assert!(registry.dispose(handle).unwrap());
        assert!(!registry.dispose(handle).unwrap());

        let err = registry
            .with_session(handle, "solve", |session| session.solve())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UseAfterDispose);

        for unknown in [0, -4, 99] {
            let err = registry
                .with_session(unknown, "solve", |session| session.solve())
                .unwrap_err();
            assert_eq!(err, ApiError::UnknownHandle { handle: unknown });
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
            assert!(registry.dispose(unknown).is_err());
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_negative_dimensions_rejected() {
        let registry = registry();
        let err = registry.create(-1, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.code(), "MODEL_NEGATIVE_DIMENSION");
        assert!(registry.create(1, -5).is_err());
        assert!(registry.is_empty());
        assert_eq!(registry.create(1, 0).unwrap(), 1);
    }

    #[test]
    fn test_default_config_is_copied_into_sessions() {
        let registry = registry().with_default_config(SolverConfig::new().with_time_limit(3.0));
        let handle = registry.create(1, 0).unwrap();
        let limit = registry
            .with_session(handle, "read config", |session| {
                Ok::<_, SessionError>(session.config().time_limit)
            })
            .unwrap();
        assert_eq!(limit, Some(3.0));
    }

    #[test]
    fn test_sessions_share_the_registry_cache() {
        let registry = registry();
        let a = registry.create(3, 0).unwrap();
        let b = registry.create(3, 0).unwrap();
        for handle in [a, b] {
            registry
                .with_session(handle, "add cached sparse row", |session| {
                    session.add_sparse_row_cached(&[1.0, 1.0], &[0, 2], 0.0, 1.0)
                })
                .unwrap();
        }
        assert_eq!(registry.cache().len(), 1);
        assert_eq!(registry.cache_stats().hits, 1);
    }

    #[test]
    fn test_concurrent_sessions() {
        let registry = Arc::new(registry());
        let workers: Vec<_> = (1..=8)
            .map(|upper| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    let handle = registry.create(2, 1).unwrap();
                    registry
                        .with_session(handle, "build", |session| {
                            session.set_column_bounds(&[0.0, 0.0], &[upper as f64, 1.0])?;
                            session.set_objective(&[1.0, 1.0])?;
                            session.add_sparse_row_cached(&[1.0], &[1], 0.0, 1.0)?;
                            session.solve()
                        })
                        .unwrap();
                    let score = registry
                        .with_session(handle, "get score", |session| session.score())
                        .unwrap();
                    assert!(registry.dispose(handle).unwrap());
                    (upper, score)
                })
            })
            .collect();

        for worker in workers {
            let (upper, score) = worker.join().unwrap();
            assert_eq!(score, upper as f64 + 1.0);
        }
        assert!(registry.is_empty());
        assert_eq!(registry.cache().len(), 1);
    }
}
