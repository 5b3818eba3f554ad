use crate::repository::traits::InteractionLogStore;
use crate::repository::{InteractionRecord, Result};

/// Interaction log kept in a `Vec`; nothing survives the process.
#[derive(Debug, Default)]
pub struct InMemoryLogStore {
    records: Vec<InteractionRecord>,
}

impl InMemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl InteractionLogStore for InMemoryLogStore {
    fn append(&mut self, record: &InteractionRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn get_all(&mut self) -> Result<Vec<InteractionRecord>> {
        Ok(self.records.clone())
    }

    fn clear(&mut self) -> Result<()> {
        self.records.clear();
        Ok(())
    }
}
