// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use stockroom::application::{BatchFilter, LedgerService};
use stockroom::domain::BatchView;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to list every batch in store order
pub async fn all_batches(service: &LedgerService) -> Result<Vec<BatchView>> {
    Ok(service.list_batches(BatchFilter::default()).await?)
}

/// Helper to fetch the single batch with the given natural key
pub async fn batch_by_key(
    service: &LedgerService,
    color: &str,
    cotton_part: i64,
) -> Result<BatchView> {
    let batches = service
        .list_batches(BatchFilter {
            color: Some(color.to_string()),
            min_cotton: Some(cotton_part),
            max_cotton: Some(cotton_part),
            sort_by: None,
        })
        .await?;
    assert_eq!(batches.len(), 1, "expected exactly one batch for the key");
    Ok(batches.into_iter().next().unwrap())
}
