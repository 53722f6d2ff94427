//! Per-thread display handles
//!
//! OS capture handles are bound to the thread that created them. A
//! [`ThreadLocalHandle`] is itself `Send + Sync`; it opens a handle lazily
//! the first time each thread uses it and keeps that handle in thread-local
//! storage, keyed by pool instance, until the thread exits or the pool is
//! dropped.
//!
//! Dropping a pool releases the dropping thread's handle at once. Other
//! threads release theirs on their next use of any pool, so a long-lived
//! worker does not accumulate handles across screen frame rebuilds.

use std::{
    any::Any,
    cell::{Cell, RefCell},
    collections::{BTreeSet, HashMap},
    sync::{
        Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use super::traits::HandleFactory;
use crate::error::{FrameError, FrameResult};

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// Ids of pools that have not been dropped yet
static LIVE_POOLS: Mutex<BTreeSet<u64>> = Mutex::new(BTreeSet::new());

/// Bumped after every pool drop
static DROP_GENERATION: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static HANDLES: RefCell<HashMap<u64, Box<dyn Any>>> = RefCell::new(HashMap::new());
    static SEEN_GENERATION: Cell<u64> = const { Cell::new(0) };
}

fn live_pools() -> MutexGuard<'static, BTreeSet<u64>> {
    LIVE_POOLS.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drops this thread's handles of pools dropped elsewhere since the last check
fn evict_stale_handles() {
    let generation = DROP_GENERATION.load(Ordering::Acquire);
    if SEEN_GENERATION.with(|seen| seen.replace(generation)) == generation {
        return;
    }

    let stale: Vec<Box<dyn Any>> = {
        let live = live_pools();
        HANDLES.with(|cell| {
            let mut map = cell.borrow_mut();
            let ids: Vec<u64> = map.keys().filter(|id| !live.contains(id)).copied().collect();
            ids.iter().filter_map(|id| map.remove(id)).collect()
        })
    };

    if !stale.is_empty() {
        tracing::debug!(
            "Released {} stale display handle(s) on thread {:?}",
            stale.len(),
            std::thread::current().id()
        );
    }
}

/// Lazily opened, thread-confined [`super::DisplayService`] handle
#[derive(Debug)]
pub struct ThreadLocalHandle<F: HandleFactory> {
    id:      u64,
    factory: F,
}

impl<F: HandleFactory> ThreadLocalHandle<F> {
    /// Creates a pool; no handle is opened until first use
    pub fn new(factory: F) -> Self {
        let id = NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed);
        live_pools().insert(id);
        Self { id, factory }
    }

    /// The factory handles are opened from
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Runs `f` with this thread's handle, opening it on first use.
    ///
    /// The handle is taken out of thread-local storage for the duration of
    /// `f`, so `f` may itself use the pool without a double borrow; a nested
    /// call opens a second handle. A failed open stores nothing and is
    /// retried on the next call.
    ///
    /// # Errors
    ///
    /// Whatever [`HandleFactory::open`] or `f` returns.
    pub fn with<R>(&self, f: impl FnOnce(&F::Handle) -> FrameResult<R>) -> FrameResult<R> {
        evict_stale_handles();
        let stored = HANDLES.with(|cell| cell.borrow_mut().remove(&self.id));

        let handle: Box<F::Handle> = match stored {
            Some(any) => any.downcast::<F::Handle>().map_err(|_| {
                FrameError::capture_failed(format!("display handle {} has the wrong type", self.id))
            })?,
            None => {
                let handle = self.factory.open()?;
                tracing::debug!(
                    "Opened display handle for pool {} on thread {:?}",
                    self.id,
                    std::thread::current().id()
                );
                Box::new(handle)
            }
        };

        let result = f(&*handle);
        HANDLES.with(|cell| cell.borrow_mut().insert(self.id, handle));
        result
    }

    /// Returns true when the calling thread already holds a handle
    pub fn is_open_on_this_thread(&self) -> bool {
        HANDLES.with(|cell| cell.borrow().contains_key(&self.id))
    }
}

impl<F: HandleFactory> Drop for ThreadLocalHandle<F> {
    fn drop(&mut self) {
        live_pools().remove(&self.id);
        DROP_GENERATION.fetch_add(1, Ordering::Release);

        let _ = HANDLES.try_with(|cell| {
            if let Ok(mut map) = cell.try_borrow_mut() {
                map.remove(&self.id);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
        mpsc,
    };

    use super::*;
    use crate::{
        capture::DisplayService,
        model::{MonitorDescriptor, RawPixels, ScreenRect},
    };

    struct CountingHandle(usize);

    impl DisplayService for CountingHandle {
        fn list_monitors(&self) -> FrameResult<Vec<MonitorDescriptor>> {
            Ok(vec![MonitorDescriptor::new(self.0, 0, 0, 1, 1)])
        }

        fn grab_pixels(&self, _: usize, rect: ScreenRect) -> FrameResult<RawPixels> {
            Err(FrameError::capture_failed(rect))
        }
    }

    #[derive(Clone, Default)]
    struct CountingFactory {
        opened: Arc<AtomicUsize>,
        fail:   bool,
    }

    impl HandleFactory for CountingFactory {
        type Handle = CountingHandle;

        fn open(&self) -> FrameResult<CountingHandle> {
            if self.fail {
                return Err(FrameError::capture_failed("no display"));
            }
            Ok(CountingHandle(self.opened.fetch_add(1, Ordering::SeqCst)))
        }
    }

    #[test]
    fn test_opens_once_per_thread() {
        let factory = CountingFactory::default();
        let pool = ThreadLocalHandle::new(factory.clone());

        assert!(!pool.is_open_on_this_thread());
        let first = pool.with(|h| Ok(h.0)).unwrap();
        let second = pool.with(|h| Ok(h.0)).unwrap();
        assert_eq!(first, second);
        assert!(pool.is_open_on_this_thread());
        assert_eq!(factory.opened.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_each_thread_gets_its_own_handle() {
        let factory = CountingFactory::default();
        let pool = Arc::new(ThreadLocalHandle::new(factory.clone()));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pool = Arc::clone(&pool);
                std::thread::spawn(move || {
                    pool.with(|_| Ok(())).unwrap();
                    pool.with(|_| Ok(())).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(factory.opened.load(Ordering::SeqCst), 4);
        assert!(!pool.is_open_on_this_thread());
    }

    #[test]
    fn test_pools_do_not_share_handles() {
        let factory = CountingFactory::default();
        let a = ThreadLocalHandle::new(factory.clone());
        let b = ThreadLocalHandle::new(factory.clone());

        a.with(|_| Ok(())).unwrap();
        b.with(|_| Ok(())).unwrap();
        assert_eq!(factory.opened.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_error_from_closure_keeps_handle() {
        let factory = CountingFactory::default();
        let pool = ThreadLocalHandle::new(factory.clone());

        let result = pool.with(|h| h.grab_pixels(1, ScreenRect {
            left:   0,
            top:    0,
            width:  1,
            height: 1,
        }));
        assert!(result.is_err());
        assert!(pool.is_open_on_this_thread());
        pool.with(|_| Ok(())).unwrap();
        assert_eq!(factory.opened.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_open_is_retried() {
        let pool = ThreadLocalHandle::new(CountingFactory {
            fail: true,
            ..Default::default()
        });
        assert!(pool.with(|_| Ok(())).is_err());
        assert!(!pool.is_open_on_this_thread());
    }

    #[test]
    fn test_drop_releases_this_threads_handle() {
        let factory = CountingFactory::default();
        let pool = ThreadLocalHandle::new(factory);
        let id = pool.id;
        pool.with(|_| Ok(())).unwrap();
        drop(pool);
        assert!(!HANDLES.with(|cell| cell.borrow().contains_key(&id)));
    }

    #[test]
    fn test_dropped_pool_is_released_on_other_threads() {
        let pool = Arc::new(ThreadLocalHandle::new(CountingFactory::default()));
        let id = pool.id;
        let (used_tx, used_rx) = mpsc::channel();
        let (dropped_tx, dropped_rx) = mpsc::channel();

        let worker = {
            let pool = Arc::clone(&pool);
            std::thread::spawn(move || {
                pool.with(|_| Ok(())).unwrap();
                drop(pool);
                used_tx.send(()).unwrap();
                dropped_rx.recv().unwrap();

                let held_after_drop = HANDLES.with(|cell| cell.borrow().contains_key(&id));
                ThreadLocalHandle::new(CountingFactory::default())
                    .with(|_| Ok(()))
                    .unwrap();
                let held_after_use = HANDLES.with(|cell| cell.borrow().contains_key(&id));
                (held_after_drop, held_after_use)
            })
        };

        used_rx.recv().unwrap();
        // Last owner, so the pool drops here on the main thread
        drop(pool);
        dropped_tx.send(()).unwrap();

        assert_eq!(worker.join().unwrap(), (true, false));
    }
}
