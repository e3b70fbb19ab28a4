use crate::adapters::Adapter;
use crate::model::RawItem;
use crate::AdapterError;
use async_trait::async_trait;

/// A registered source without a parser yet; always yields nothing
pub struct Placeholder {
    id: &'static str,
}

impl Placeholder {
    pub fn new(id: &'static str) -> Self {
        Self { id }
    }
}

#[async_trait]
impl Adapter for Placeholder {
    fn id(&self) -> &str {
        self.id
    }

    async fn fetch_raw_items(&self) -> Result<Vec<RawItem>, AdapterError> {
        tracing::debug!(adapter = self.id, "Placeholder adapter, nothing to fetch");
        Ok(Vec::new())
    }
}
