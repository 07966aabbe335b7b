//! In-memory [`TransactionStore`] for tests.

use std::sync::Mutex;

use api_types::transaction::{TransactionId, TransactionNew, TransactionView};

use super::{ClientError, TransactionStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<TransactionView>>,
    next_id: Mutex<i64>,
    calls: Mutex<Vec<&'static str>>,
    offline: Mutex<bool>,
    garbled: Mutex<bool>,
}

impl MemoryStore {
    pub fn with_records(records: Vec<TransactionView>) -> Self {
        let next_id = records.iter().map(|tx| tx.id.0).max().unwrap_or(0);
        Self {
            records: Mutex::new(records),
            next_id: Mutex::new(next_id),
            ..Self::default()
        }
    }

    /// Makes every following call fail with a server error.
    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap() = offline;
    }

    /// Makes every following call answer with a body that does not decode.
    pub fn set_garbled(&self, garbled: bool) {
        *self.garbled.lock().unwrap() = garbled;
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn records(&self) -> Vec<TransactionView> {
        self.records.lock().unwrap().clone()
    }

    fn enter(&self, call: &'static str) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(call);
        if *self.offline.lock().unwrap() {
            return Err(ClientError::Server("store offline".to_string()));
        }
        if *self.garbled.lock().unwrap() {
            return Err(ClientError::Decode("unknown variant `Pets`".to_string()));
        }
        Ok(())
    }
}

impl TransactionStore for MemoryStore {
    async fn list(&self) -> Result<Vec<TransactionView>, ClientError> {
        self.enter("list")?;
        Ok(self.records())
    }

    async fn create(&self, payload: &TransactionNew) -> Result<TransactionView, ClientError> {
        self.enter("create")?;
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let record = TransactionView {
            id: TransactionId(*next_id),
            amount: Some(payload.amount),
            category: payload.category,
            description: payload.description.clone(),
            date: payload.date,
        };
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn delete(&self, id: TransactionId) -> Result<TransactionView, ClientError> {
        self.enter("delete")?;
        let mut records = self.records.lock().unwrap();
        let pos = records
            .iter()
            .position(|tx| tx.id == id)
            .ok_or(ClientError::NotFound)?;
        Ok(records.remove(pos))
    }

    async fn delete_all(&self) -> Result<u64, ClientError> {
        self.enter("delete_all")?;
        let mut records = self.records.lock().unwrap();
        let count = records.len() as u64;
        records.clear();
        Ok(count)
    }
}
