//! Collection: the typed, thread-safe facade over an `OrderedStore`
//!
//! ## Design
//!
//! A `Collection<T, P>` owns one `OrderedStore` behind a single exclusive
//! lock, one payload codec, and one list of event hooks. The policy `P`
//! only decides where new entries land (see [`crate::policy`]); every
//! other operation is shared.
//!
//! ## Locking
//!
//! Reads and writes alike take the same lock, so all operations on one
//! instance are totally ordered. Blocking methods wait with
//! `tokio::sync::Mutex::blocking_lock`. Called from a multi-thread runtime
//! worker they wait inside `block_in_place`; called from a current-thread
//! runtime they return `InvalidArgument`, since that runtime cannot block.
//! Prefer the `*_async` variants inside async code.
//!
//! Events raised while the lock is held are buffered and delivered after
//! it is released.
//!
//! ## Multiple instances
//!
//! Two collections bound to the same directory do not coordinate. Using
//! them concurrently, in one process or across processes, is unsafe.

mod async_ops;
mod ops;

use crate::codec::{Payload, PayloadCodec};
use crate::config::CollectionConfig;
use crate::events::{EventHooks, SubscriptionId};
use crate::policy::Policy;
use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stowage_core::{CollectionEvent, StowageError, StowageResult};
use stowage_storage::{EventSink, OrderedStore};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Disk-backed ordered collection with placement policy `P`.
///
/// # Example
///
/// ```ignore
/// use stowage_primitives::PersistentStack;
///
/// let stack = PersistentStack::<String>::open("/tmp/undo")?;
/// stack.push(&"first".to_string())?;
/// stack.push(&"second".to_string())?;
/// assert_eq!(stack.pop()?, "second");
/// ```
pub struct Collection<T, P> {
    store: Mutex<OrderedStore>,
    root: PathBuf,
    codec: Arc<dyn PayloadCodec<T>>,
    hooks: EventHooks,
    config: CollectionConfig,
    disposed: bool,
    _policy: PhantomData<fn() -> P>,
}

impl<T: Payload, P: Policy> Collection<T, P> {
    /// Open (or create) a collection at `path` with the default config and
    /// the payload type's default codec.
    pub fn open(path: impl AsRef<Path>) -> StowageResult<Self> {
        Self::open_with_config(path, CollectionConfig::default())
    }

    /// Open with an explicit config and the payload type's default codec.
    pub fn open_with_config(path: impl AsRef<Path>, config: CollectionConfig) -> StowageResult<Self> {
        Self::open_with_codec(path, config, T::default_codec())
    }
}

impl<T, P: Policy> Collection<T, P> {
    /// Open with an explicit config and codec.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `path` is empty or the config is invalid
    /// - `Io` if the directory or index file cannot be created
    pub fn open_with_codec(
        path: impl AsRef<Path>,
        config: CollectionConfig,
        codec: Arc<dyn PayloadCodec<T>>,
    ) -> StowageResult<Self> {
        config.validate()?;
        let store = OrderedStore::open(path, &config.store_options())?;

        if config.sweep_orphans_on_open {
            // No hooks can be registered yet; faults are only logged
            let mut events = EventSink::new();
            let swept = store.sweep_orphans(&mut events)?;
            info!(target: "stowage::collection", swept, "Swept orphan data files at open");
        }

        info!(
            target: "stowage::collection",
            policy = P::NAME,
            path = ?store.root(),
            codec = codec.codec_id(),
            "Opened collection"
        );

        Ok(Collection {
            root: store.root().to_path_buf(),
            store: Mutex::new(store),
            codec,
            hooks: EventHooks::new(),
            config,
            disposed: false,
            _policy: PhantomData,
        })
    }

    /// Directory the collection is bound to
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Configuration the collection was opened with
    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    /// Identifier of the payload codec
    pub fn codec_id(&self) -> &str {
        self.codec.codec_id()
    }

    /// Policy name ("stack", "queue", or "list")
    pub fn policy_name(&self) -> &'static str {
        P::NAME
    }

    /// Register an observer for every event this collection raises.
    ///
    /// Callbacks run after the operation commits and the lock is released.
    pub fn on_event<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&CollectionEvent) + Send + Sync + 'static,
    {
        self.hooks.subscribe(callback)
    }

    /// Remove an observer. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.hooks.unsubscribe(id)
    }

    /// Release the collection.
    ///
    /// With `clear_on_dispose` the directory subtree is deleted and any
    /// failure to do so is returned.
    pub fn dispose(mut self) -> StowageResult<()> {
        self.disposed = true;
        if self.config.clear_on_dispose {
            self.store.get_mut().destroy()?;
        }
        info!(target: "stowage::collection", policy = P::NAME, "Disposed collection");
        Ok(())
    }

    // ========================================================================
    // Shared plumbing for the operation modules
    // ========================================================================

    /// Run `op` under the lock, then deliver the events it raised.
    pub(crate) fn with_store<R, F>(&self, op: F) -> StowageResult<R>
    where
        F: FnOnce(&OrderedStore, &mut EventSink) -> StowageResult<R>,
    {
        let mut events = EventSink::new();
        let result = {
            let store = self.lock_blocking()?;
            op(&store, &mut events)
        };
        self.hooks.dispatch(&events);
        result
    }

    /// Acquire the lock from synchronous code.
    ///
    /// On a multi-thread runtime worker the wait is moved off the worker
    /// with `block_in_place`. A current-thread runtime cannot block at all,
    /// so the call is rejected there.
    fn lock_blocking(&self) -> StowageResult<MutexGuard<'_, OrderedStore>> {
        match Handle::try_current() {
            Err(_) => Ok(self.store.blocking_lock()),
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                Ok(tokio::task::block_in_place(|| self.store.blocking_lock()))
            }
            Ok(_) => Err(StowageError::invalid_argument(
                "blocking collection call on a current-thread runtime; use the *_async variant",
            )),
        }
    }

    /// Acquire the lock, giving up if `cancel` fires first.
    ///
    /// Cancellation is checked before waiting and again once the lock is held.
    pub(crate) async fn lock_async(
        &self,
        cancel: &CancellationToken,
    ) -> StowageResult<MutexGuard<'_, OrderedStore>> {
        if cancel.is_cancelled() {
            return Err(StowageError::Cancelled);
        }
        let guard = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StowageError::Cancelled),
            guard = self.store.lock() => guard,
        };
        if cancel.is_cancelled() {
            return Err(StowageError::Cancelled);
        }
        Ok(guard)
    }

    /// Deliver events collected by an async operation.
    pub(crate) fn finish<R>(&self, events: EventSink, result: StowageResult<R>) -> StowageResult<R> {
        self.hooks.dispatch(&events);
        result
    }

    pub(crate) fn encode(&self, item: &T) -> StowageResult<Vec<u8>> {
        Ok(self.codec.encode(item)?)
    }

    pub(crate) fn decode(&self, bytes: &[u8]) -> StowageResult<T> {
        Ok(self.codec.decode(bytes)?)
    }

    pub(crate) fn codec(&self) -> &Arc<dyn PayloadCodec<T>> {
        &self.codec
    }
}

impl<T, P> Drop for Collection<T, P> {
    fn drop(&mut self) {
        if self.disposed || !self.config.clear_on_dispose {
            return;
        }
        if let Err(e) = self.store.get_mut().destroy() {
            warn!(
                target: "stowage::collection",
                path = ?self.root,
                error = %e,
                "Failed to remove collection directory on drop"
            );
        }
    }
}

impl<T, P: Policy> fmt::Debug for Collection<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("policy", &P::NAME)
            .field("path", &self.root)
            .field("codec", &self.codec.codec_id())
            .field("hooks", &self.hooks)
            .finish()
    }
}
