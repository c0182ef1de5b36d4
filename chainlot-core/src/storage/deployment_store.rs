use crate::error::Result;
use crate::storage::Storage;
use crate::types::Address;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

/// One recorded contract deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub id: String,
    pub network: String,
    pub contract: String,
    pub address: Address,
    pub deployed_at: DateTime<Utc>,
}

pub struct DeploymentStore<'a> {
    storage: &'a Storage,
}

impl<'a> DeploymentStore<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub async fn record(&self, record: &DeploymentRecord) -> Result<()> {
        let conn = self.storage.get_connection().await;

        conn.execute(
            "INSERT OR REPLACE INTO deployments (id, network, contract, address, deployed_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id,
                record.network,
                record.contract,
                record.address.to_string(),
                record.deployed_at.timestamp(),
            ],
        )?;

        Ok(())
    }

    /// Most recent deployment of `contract` on `network`, if any.
    pub async fn latest(&self, network: &str, contract: &str) -> Result<Option<DeploymentRecord>> {
        let conn = self.storage.get_connection().await;

        let mut stmt = conn.prepare(
            "SELECT id, network, contract, address, deployed_at FROM deployments
             WHERE network = ?1 AND contract = ?2
             ORDER BY deployed_at DESC, rowid DESC LIMIT 1",
        )?;

        let record = stmt
            .query_row(params![network, contract], row_to_record)
            .optional()?;

        Ok(record)
    }

    pub async fn list(&self, network: &str) -> Result<Vec<DeploymentRecord>> {
        let conn = self.storage.get_connection().await;

        let mut stmt = conn.prepare(
            "SELECT id, network, contract, address, deployed_at FROM deployments
             WHERE network = ?1 ORDER BY deployed_at DESC, rowid DESC",
        )?;

        let record_iter = stmt.query_map(params![network], row_to_record)?;

        let mut records = Vec::new();
        for record in record_iter {
            records.push(record?);
        }

        Ok(records)
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<DeploymentRecord> {
    let address_str: String = row.get(3)?;

    Ok(DeploymentRecord {
        id: row.get(0)?,
        network: row.get(1)?,
        contract: row.get(2)?,
        address: address_str.parse().unwrap_or(Address::ZERO),
        deployed_at: chrono::DateTime::from_timestamp(row.get(4)?, 0).unwrap_or_else(Utc::now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use uuid::Uuid;

    fn record(network: &str, contract: &str, deployed_at: DateTime<Utc>) -> DeploymentRecord {
        DeploymentRecord {
            id: Uuid::new_v4().to_string(),
            network: network.to_string(),
            contract: contract.to_string(),
            address: Address::fresh(),
            deployed_at,
        }
    }

    #[tokio::test]
    async fn latest_returns_most_recent() {
        let temp_dir = tempdir().unwrap();
        let storage = Storage::new(&temp_dir.path().join("chainlot.db"))
            .await
            .unwrap();
        let store = DeploymentStore::new(&storage);

        let older = record("development", "usd_price_feed", Utc::now());
        let newer = record("development", "usd_price_feed", Utc::now());
        store.record(&older).await.unwrap();
        store.record(&newer).await.unwrap();

        let latest = store
            .latest("development", "usd_price_feed")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.address, newer.address);

        assert!(store
            .latest("development", "fee_token")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn list_is_scoped_to_network() {
        let temp_dir = tempdir().unwrap();
        let storage = Storage::new(&temp_dir.path().join("chainlot.db"))
            .await
            .unwrap();
        let store = DeploymentStore::new(&storage);

        store
            .record(&record("development", "fee_token", Utc::now()))
            .await
            .unwrap();
        store
            .record(&record("ganache-local", "fee_token", Utc::now()))
            .await
            .unwrap();

        assert_eq!(store.list("development").await.unwrap().len(), 1);
        assert_eq!(store.list("ganache-local").await.unwrap().len(), 1);
        assert!(store.list("mainnet-fork").await.unwrap().is_empty());
    }
}
