//! In-process [`DocumentStore`] backend.
//!
//! [`MemoryStore`] keeps every collection in memory and runs a single
//! dispatcher task that re-evaluates live queries after each write and pushes
//! replacement snapshots to subscribers. An optional propagation delay and an
//! offline switch let tests and the demo reproduce the timing windows and
//! failure modes of a remote backend.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use honeydo_core::types::DocId;

use crate::document::Document;
use crate::error::StoreError;
use crate::feed::{ChangeFeed, QuerySnapshot, UnsubscribeGuard};
use crate::query::Query;
use crate::store::DocumentStore;

// ---------------------------------------------------------------------------
// MemoryStoreConfig
// ---------------------------------------------------------------------------

/// Tuning knobs for [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct MemoryStoreConfig {
    /// Delay between a committed write and the snapshot fan-out.
    ///
    /// Zero by default, which makes feeds deliver as soon as the dispatcher
    /// is scheduled. Tests raise it to surface the propagation window that a
    /// remote backend would have.
    pub propagation_delay: Duration,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            propagation_delay: Duration::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// State shared between the store handle and its dispatcher task.
struct Shared {
    /// Collection name to documents keyed by id. BTreeMap keeps snapshot
    /// ordering stable across evaluations.
    collections: RwLock<HashMap<&'static str, BTreeMap<DocId, Document>>>,

    /// Number of live feeds, maintained by the dispatcher.
    subscriber_count: AtomicUsize,
}

/// In-memory document store with live query feeds.
///
/// Created via [`MemoryStore::start`], which also spawns the dispatcher
/// task. Designed to be shared as `Arc<MemoryStore>` and used through the
/// [`DocumentStore`] trait.
pub struct MemoryStore {
    shared: Arc<Shared>,
    events: mpsc::UnboundedSender<StoreEvent>,
    next_subscriber: AtomicU64,
    offline: AtomicBool,
    closed: AtomicBool,
    cancel: CancellationToken,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
}

impl MemoryStore {
    /// Start a store with default configuration.
    pub fn start() -> Arc<Self> {
        Self::start_with(MemoryStoreConfig::default())
    }

    /// Start a store with the given configuration and spawn its dispatcher.
    pub fn start_with(config: MemoryStoreConfig) -> Arc<Self> {
        let shared = Arc::new(Shared {
            collections: RwLock::new(HashMap::new()),
            subscriber_count: AtomicUsize::new(0),
        });
        let (events, inbox) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let dispatcher = Dispatcher {
            shared: Arc::clone(&shared),
            config,
            subscribers: HashMap::new(),
        };
        let handle = tokio::spawn(dispatcher.run(inbox, cancel.clone()));

        Arc::new(Self {
            shared,
            events,
            next_subscriber: AtomicU64::new(0),
            offline: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            cancel,
            dispatcher: Mutex::new(Some(handle)),
        })
    }

    /// Simulate losing or regaining the connection to the backend.
    ///
    /// Going offline fails all subsequent operations with
    /// [`StoreError::Unavailable`] and ends every live feed, matching how a
    /// remote store drops its listeners on disconnect. Coming back online
    /// does not revive old feeds; callers must resubscribe.
    pub fn set_offline(&self, offline: bool) {
        let was_offline = self.offline.swap(offline, Ordering::SeqCst);
        if offline && !was_offline {
            let _ = self.events.send(StoreEvent::DropAllFeeds);
            tracing::warn!("Memory store went offline; live feeds ended");
        } else if !offline && was_offline {
            tracing::info!("Memory store back online");
        }
    }

    /// Whether the store is currently simulating an outage.
    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    /// Number of currently registered live feeds.
    ///
    /// Registration happens on the dispatcher task, so a feed opened a
    /// moment ago may not be counted yet.
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscriber_count.load(Ordering::Relaxed)
    }

    /// Stop the dispatcher and refuse all further operations.
    pub async fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.cancel.cancel();

        let handle = self.dispatcher.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        tracing::info!("Memory store shut down");
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::Closed);
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store is offline".to_string()));
        }
        Ok(())
    }

    fn notify(&self, collection: &'static str) {
        // Ignore the SendError; it only means the dispatcher already ended.
        let _ = self.events.send(StoreEvent::Changed { collection });
    }
}

fn new_doc_id() -> DocId {
    uuid::Uuid::new_v4().to_string()
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn add_document(
        &self,
        collection: &'static str,
        fields: serde_json::Value,
    ) -> Result<Document, StoreError> {
        self.ensure_available()?;
        if !fields.is_object() {
            return Err(StoreError::InvalidFields);
        }

        let now = Utc::now();
        let doc = Document {
            id: new_doc_id(),
            fields,
            created_at: now,
            updated_at: now,
        };

        {
            let mut collections = self.shared.collections.write().await;
            collections
                .entry(collection)
                .or_default()
                .insert(doc.id.clone(), doc.clone());
        }

        self.notify(collection);
        Ok(doc)
    }

    async fn update_document(
        &self,
        collection: &'static str,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<(), StoreError> {
        self.ensure_available()?;
        let patch = match patch {
            serde_json::Value::Object(map) => map,
            _ => return Err(StoreError::InvalidFields),
        };

        {
            let mut collections = self.shared.collections.write().await;
            let doc = collections
                .get_mut(collection)
                .and_then(|coll| coll.get_mut(id))
                .ok_or_else(|| StoreError::NotFound {
                    collection,
                    id: id.to_string(),
                })?;

            if let serde_json::Value::Object(fields) = &mut doc.fields {
                for (key, value) in patch {
                    fields.insert(key, value);
                }
            }
            doc.updated_at = Utc::now();
        }

        self.notify(collection);
        Ok(())
    }

    async fn delete_document(&self, collection: &'static str, id: &str) -> Result<(), StoreError> {
        self.ensure_available()?;

        let removed = {
            let mut collections = self.shared.collections.write().await;
            collections
                .get_mut(collection)
                .and_then(|coll| coll.remove(id))
                .is_some()
        };

        // Deleting an absent document is a success without a change event.
        if removed {
            self.notify(collection);
        }
        Ok(())
    }

    async fn get_document(
        &self,
        collection: &'static str,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        self.ensure_available()?;

        let collections = self.shared.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|coll| coll.get(id))
            .cloned())
    }

    async fn fetch(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.ensure_available()?;

        let collections = self.shared.collections.read().await;
        Ok(evaluate(&collections, query).docs)
    }

    async fn subscribe(&self, query: Query) -> Result<ChangeFeed, StoreError> {
        self.ensure_available()?;

        let id = self.next_subscriber.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::unbounded_channel();
        self.events
            .send(StoreEvent::Register { id, query, sender })
            .map_err(|_| StoreError::Closed)?;

        let events = self.events.clone();
        let guard = UnsubscribeGuard::new(move || {
            let _ = events.send(StoreEvent::Unregister { id });
        });
        Ok(ChangeFeed::new(receiver, guard))
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Messages from store handles and feed guards to the dispatcher task.
enum StoreEvent {
    Register {
        id: u64,
        query: Query,
        sender: mpsc::UnboundedSender<QuerySnapshot>,
    },
    Unregister {
        id: u64,
    },
    Changed {
        collection: &'static str,
    },
    DropAllFeeds,
}

/// One live feed as tracked by the dispatcher.
struct Subscriber {
    query: Query,
    sender: mpsc::UnboundedSender<QuerySnapshot>,
    /// Last snapshot delivered, kept to suppress no-op re-deliveries.
    last: QuerySnapshot,
}

/// Owns the subscriber registry and performs all snapshot fan-out.
///
/// Runs as a single task so registration, teardown, and change delivery are
/// serialized; subscribers therefore see snapshots in commit order.
struct Dispatcher {
    shared: Arc<Shared>,
    config: MemoryStoreConfig,
    subscribers: HashMap<u64, Subscriber>,
}

impl Dispatcher {
    async fn run(
        mut self,
        mut inbox: mpsc::UnboundedReceiver<StoreEvent>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("Store dispatcher cancelled");
                    break;
                }
                event = inbox.recv() => match event {
                    Some(event) => self.handle(event).await,
                    // All senders gone: the store and every feed are dropped.
                    None => break,
                },
            }
        }

        self.subscribers.clear();
        self.shared.subscriber_count.store(0, Ordering::Relaxed);
    }

    async fn handle(&mut self, event: StoreEvent) {
        match event {
            StoreEvent::Register { id, query, sender } => {
                let snapshot = {
                    let collections = self.shared.collections.read().await;
                    evaluate(&collections, &query)
                };
                // The initial snapshot is pushed before the feed is live so
                // every subscriber starts from the current result set.
                if sender.send(snapshot.clone()).is_ok() {
                    self.subscribers.insert(
                        id,
                        Subscriber {
                            query,
                            sender,
                            last: snapshot,
                        },
                    );
                }
            }
            StoreEvent::Unregister { id } => {
                self.subscribers.remove(&id);
            }
            StoreEvent::Changed { collection } => {
                if !self.config.propagation_delay.is_zero() {
                    tokio::time::sleep(self.config.propagation_delay).await;
                }
                self.fan_out(collection).await;
            }
            StoreEvent::DropAllFeeds => {
                let count = self.subscribers.len();
                self.subscribers.clear();
                if count > 0 {
                    tracing::debug!(count, "Dropped all live feeds");
                }
            }
        }

        self.shared
            .subscriber_count
            .store(self.subscribers.len(), Ordering::Relaxed);
    }

    /// Re-evaluate every feed on `collection` and push changed snapshots.
    async fn fan_out(&mut self, collection: &'static str) {
        let collections = self.shared.collections.read().await;

        let mut dropped = Vec::new();
        for (id, sub) in self.subscribers.iter_mut() {
            if sub.query.collection != collection {
                continue;
            }

            let snapshot = evaluate(&collections, &sub.query);
            if snapshot == sub.last {
                continue;
            }
            if sub.sender.send(snapshot.clone()).is_err() {
                dropped.push(*id);
                continue;
            }
            sub.last = snapshot;
        }
        drop(collections);

        for id in dropped {
            self.subscribers.remove(&id);
        }
    }
}

/// Evaluate `query` against the current collection contents.
fn evaluate(
    collections: &HashMap<&'static str, BTreeMap<DocId, Document>>,
    query: &Query,
) -> QuerySnapshot {
    let docs = collections
        .get(query.collection)
        .map(|coll| {
            coll.values()
                .filter(|doc| query.filter.matches(doc))
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    QuerySnapshot { docs }
}
