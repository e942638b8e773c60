//! Adapter pool: memoized, per-key-once adapter construction.
//!
//! Grounded on `neuron-orch-local`'s `HashMap<_, Arc<dyn Operator>>` plus
//! `tokio::sync::OnceCell` so the second caller for a given key awaits
//! the first builder rather than racing it — a short
//! `parking_lot::Mutex` guards only the map's shape (inserting a new
//! key's cell), never the adapter construction itself.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use router_adapters::{Adapter, EchoBackend, HttpChatAdapter, HttpCompletionAdapter, InProcessAdapter};
use router_types::{BackendAddress, BackendKind, ModelDescriptor, RouterError};
use tokio::sync::OnceCell;

/// Lazily-constructed, memoized map of `model_id -> initialized adapter`.
pub struct AdapterPool {
    cells: Mutex<HashMap<String, Arc<OnceCell<Arc<Adapter>>>>>,
}

impl Default for AdapterPool {
    fn default() -> Self {
        Self::new()
    }
}

impl AdapterPool {
    /// An empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
        }
    }

    /// Return the memoized adapter for `descriptor.id`, constructing and
    /// initializing it on first use. Concurrent first-callers for the
    /// same id all await the same construction.
    pub async fn acquire(&self, descriptor: &ModelDescriptor) -> Result<Arc<Adapter>, RouterError> {
        let cell = {
            let mut guard = self.cells.lock();
            Arc::clone(guard.entry(descriptor.id.clone()).or_insert_with(|| Arc::new(OnceCell::new())))
        };

        cell.get_or_try_init(|| async {
            let adapter = build_adapter(descriptor)?;
            adapter.initialize().await?;
            Ok(Arc::new(adapter))
        })
        .await
        .map(Arc::clone)
    }

    /// Tear down every constructed adapter concurrently.
    pub async fn close(&self) {
        let cells: Vec<_> = self.cells.lock().values().cloned().collect();
        let mut handles = Vec::with_capacity(cells.len());
        for cell in cells {
            handles.push(tokio::spawn(async move {
                if let Some(adapter) = cell.get() {
                    adapter.close().await;
                }
            }));
        }
        for handle in handles {
            let _ = handle.await;
        }
        self.cells.lock().clear();
    }
}

fn build_adapter(descriptor: &ModelDescriptor) -> Result<Adapter, RouterError> {
    match (&descriptor.backend_kind, &descriptor.backend_address) {
        (BackendKind::HttpChat, BackendAddress::Network { url }) => {
            Ok(Adapter::HttpChat(HttpChatAdapter::new(url.clone(), descriptor.id.clone())))
        }
        (BackendKind::HttpCompletion, BackendAddress::Network { url }) => {
            Ok(Adapter::HttpCompletion(HttpCompletionAdapter::new(url.clone(), descriptor.id.clone())))
        }
        (BackendKind::InProcess, BackendAddress::InProcess { model_path, prompt_format_tag }) => {
            Ok(Adapter::InProcess(InProcessAdapter::new(
                model_path.clone(),
                prompt_format_tag.clone(),
                Arc::new(EchoBackend),
            )))
        }
        _ => Err(RouterError::internal(format!(
            "descriptor {} has a backend_kind/backend_address mismatch that should have been rejected at construction",
            descriptor.id
        ))),
    }
}
