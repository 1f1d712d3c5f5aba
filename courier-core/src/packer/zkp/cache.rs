use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rst_common::with_logging::log::debug;
use rst_common::with_tokio::tokio::sync::OnceCell;

use super::types::{KeyLoader, ProvingBinding, ZkpError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum KeyKind {
    Proving,
    Verification,
}

type Slot = Arc<OnceCell<Arc<Vec<u8>>>>;

/// `KeyCache` is a single-flight cache in front of a [`KeyLoader`]
///
/// Concurrent first requests for the same binding share one load. A failed load leaves the
/// slot empty so the next request tries again.
pub struct KeyCache {
    loader: Arc<dyn KeyLoader>,
    slots: Mutex<HashMap<(KeyKind, ProvingBinding), Slot>>,
}

impl KeyCache {
    pub fn new(loader: Arc<dyn KeyLoader>) -> Self {
        Self {
            loader,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, kind: KeyKind, binding: &ProvingBinding) -> Slot {
        let mut slots = self
            .slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        slots.entry((kind, *binding)).or_default().clone()
    }

    pub async fn proving_key(&self, binding: &ProvingBinding) -> Result<Arc<Vec<u8>>, ZkpError> {
        let slot = self.slot(KeyKind::Proving, binding);
        let key = slot
            .get_or_try_init(|| async {
                debug!("[packer:zkp] loading proving key: {:?}", binding);
                self.loader.proving_key(binding).await.map(Arc::new)
            })
            .await?;

        Ok(key.clone())
    }

    pub async fn verification_key(
        &self,
        binding: &ProvingBinding,
    ) -> Result<Arc<Vec<u8>>, ZkpError> {
        let slot = self.slot(KeyKind::Verification, binding);
        let key = slot
            .get_or_try_init(|| async {
                debug!("[packer:zkp] loading verification key: {:?}", binding);
                self.loader.verification_key(binding).await.map(Arc::new)
            })
            .await?;

        Ok(key.clone())
    }
}
