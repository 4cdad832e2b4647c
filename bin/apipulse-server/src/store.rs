use apipulse_models::MetricRecord;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Bounded, clonable handle to the in-memory record sequence.
///
/// Records are appended in completion order. Once the capacity is reached the
/// oldest record is evicted on every append, so the store degrades to a
/// sliding window over the most recent traffic instead of growing without
/// bound for the lifetime of the process.
#[derive(Clone)]
pub struct MetricStore {
    records: Arc<RwLock<VecDeque<MetricRecord>>>,
    capacity: usize,
}

impl MetricStore {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: Arc::new(RwLock::new(VecDeque::with_capacity(capacity.min(1024)))),
            capacity,
        }
    }

    pub async fn record(&self, record: MetricRecord) {
        let mut records = self.records.write().await;
        if records.len() == self.capacity {
            records.pop_front();
        }
        records.push_back(record);
    }

    /// Clone out the current contents, oldest first. Aggregation works on the
    /// snapshot so queries never hold the lock while computing.
    pub async fn snapshot(&self) -> Vec<MetricRecord> {
        self.records.read().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
