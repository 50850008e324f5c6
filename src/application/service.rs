use std::io::Read;

use tracing::{debug, info, warn};

use crate::domain::{Batch, BatchId, BatchView, NewBatch, SortKey};
use crate::storage::Repository;

use super::AppError;

/// Application service providing high-level operations for the stock ledger.
/// This is the primary interface for any client (CLI, API, TUI, etc.).
pub struct LedgerService {
    repo: Repository,
}

/// Filter and ordering for batch listings. All fields are independently
/// optional and compose conjunctively.
#[derive(Debug, Clone, Default)]
pub struct BatchFilter {
    pub color: Option<String>,
    pub min_cotton: Option<i64>,
    pub max_cotton: Option<i64>,
    pub sort_by: Option<String>,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Record incoming stock, merging into the existing batch for this
    /// (color, cotton_part) key or creating one when none exists.
    pub async fn register_income(
        &self,
        color: &str,
        cotton_part: i64,
        quantity: i64,
    ) -> Result<(), AppError> {
        debug!(color, cotton_part, quantity, "registering income");

        validate_quantity(quantity)?;
        validate_cotton_part(cotton_part)?;

        match self.repo.find_by_key(color, cotton_part).await? {
            Some(mut batch) => {
                batch.quantity += quantity;
                self.repo.update(&batch).await?;
                info!(color, cotton_part, quantity = batch.quantity, "batch quantity increased");
            }
            None => {
                let batch = self
                    .repo
                    .insert(&NewBatch::new(color, cotton_part, quantity))
                    .await?;
                info!(color, cotton_part, id = batch.id, "batch created");
            }
        }

        Ok(())
    }

    /// Release stock from an existing batch. The decrement is rejected
    /// wholesale when the batch holds less than the requested quantity.
    pub async fn register_outcome(
        &self,
        color: &str,
        cotton_part: i64,
        quantity: i64,
    ) -> Result<(), AppError> {
        debug!(color, cotton_part, quantity, "registering outcome");

        validate_quantity(quantity)?;
        validate_cotton_part(cotton_part)?;

        let mut batch = self
            .repo
            .find_by_key(color, cotton_part)
            .await?
            .ok_or_else(|| {
                warn!(color, cotton_part, "no batch for outcome");
                AppError::BatchNotFound(format!("{} ({}% cotton)", color, cotton_part))
            })?;

        if batch.quantity < quantity {
            warn!(
                color,
                cotton_part,
                available = batch.quantity,
                requested = quantity,
                "insufficient stock"
            );
            return Err(AppError::InsufficientStock {
                color: batch.color,
                cotton_part: batch.cotton_part,
                available: batch.quantity,
                requested: quantity,
            });
        }

        batch.quantity -= quantity;
        self.repo.update(&batch).await?;
        info!(color, cotton_part, remaining = batch.quantity, "stock released");

        Ok(())
    }

    /// List batches matching the filter, optionally sorted.
    ///
    /// Without a sort key rows come back in store (id) order; both sorts are
    /// stable, so ties keep that order.
    pub async fn list_batches(&self, filter: BatchFilter) -> Result<Vec<BatchView>, AppError> {
        let sort_key = match filter.sort_by.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(s) => Some(SortKey::from_str(s).ok_or_else(|| {
                AppError::InvalidDataFormat(format!(
                    "unsupported sort key '{}', valid keys: color, cottonPart",
                    s
                ))
            })?),
            None => None,
        };

        let color = filter.color.as_deref().filter(|c| !c.trim().is_empty());
        let mut batches = self
            .repo
            .list_filtered(color, filter.min_cotton, filter.max_cotton)
            .await?;

        match sort_key {
            Some(SortKey::Color) => batches.sort_by(|a, b| a.color.cmp(&b.color)),
            Some(SortKey::CottonPart) => batches.sort_by_key(|b| b.cotton_part),
            None => {}
        }

        debug!(count = batches.len(), "batches listed");
        Ok(batches.iter().map(Batch::view).collect())
    }

    /// Replace every field of the batch with the given id.
    ///
    /// The new (color, cotton_part) pair is not checked against other
    /// batches; two ids may end up sharing a natural key.
    pub async fn update_batch(
        &self,
        id: BatchId,
        color: &str,
        cotton_part: i64,
        quantity: i64,
    ) -> Result<BatchView, AppError> {
        debug!(id, color, cotton_part, quantity, "updating batch");

        validate_cotton_part(cotton_part)?;
        validate_quantity(quantity)?;

        let mut batch = self.repo.find_by_id(id).await?.ok_or_else(|| {
            warn!(id, "no batch with this id");
            AppError::BatchNotFound(format!("id {}", id))
        })?;

        batch.color = color.to_string();
        batch.cotton_part = cotton_part;
        batch.quantity = quantity;
        self.repo.update(&batch).await?;

        info!(id, "batch updated");
        Ok(batch.view())
    }

    /// Import batches from CSV records of `color,cotton_part,quantity`.
    ///
    /// The whole import succeeds or fails as a unit: the first malformed
    /// record aborts it and nothing is persisted. Every record inserts a new
    /// row, never merging into an existing same-key batch.
    pub async fn import_batches<R: Read>(&self, reader: R) -> Result<usize, AppError> {
        let batches = parse_import(reader)?;

        self.repo.insert_all(&batches).await.map_err(|e| {
            AppError::FileProcessing(format!("could not persist imported batches: {}", e))
        })?;

        info!(count = batches.len(), "batches imported");
        Ok(batches.len())
    }
}

fn parse_import<R: Read>(mut reader: R) -> Result<Vec<NewBatch>, AppError> {
    let mut raw = String::new();
    reader
        .read_to_string(&mut raw)
        .map_err(|e| AppError::FileProcessing(format!("could not read import source: {}", e)))?;

    if raw.is_empty() {
        return Err(AppError::FileProcessing("import source is empty".to_string()));
    }

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(raw.as_bytes());

    let mut batches = Vec::new();
    for result in csv_reader.records() {
        let record = result
            .map_err(|e| AppError::FileProcessing(format!("malformed CSV record: {}", e)))?;

        if record.len() != 3 {
            return Err(AppError::FileProcessing(format!(
                "each record must hold three values (color, cotton part, quantity), got {}",
                record.len()
            )));
        }

        let color = record[0].to_string();
        let cotton_part: i64 = record[1].parse().map_err(|_| {
            AppError::FileProcessing(format!(
                "cotton part must be an integer, got '{}'",
                &record[1]
            ))
        })?;
        let quantity: i64 = record[2].parse().map_err(|_| {
            AppError::FileProcessing(format!("quantity must be an integer, got '{}'", &record[2]))
        })?;

        validate_cotton_part(cotton_part)
            .and_then(|()| validate_quantity(quantity))
            .map_err(reclassify)?;

        batches.push(NewBatch::new(color, cotton_part, quantity));
    }

    if batches.is_empty() {
        return Err(AppError::FileProcessing(
            "import source holds no records".to_string(),
        ));
    }

    Ok(batches)
}

/// Validation failures surface as file-processing failures during import.
fn reclassify(err: AppError) -> AppError {
    match err {
        AppError::InvalidDataFormat(msg) => AppError::FileProcessing(msg),
        other => other,
    }
}

fn validate_quantity(quantity: i64) -> Result<(), AppError> {
    if quantity <= 0 {
        return Err(AppError::InvalidDataFormat(format!(
            "quantity must be positive, got {}",
            quantity
        )));
    }
    Ok(())
}

fn validate_cotton_part(cotton_part: i64) -> Result<(), AppError> {
    if !(0..=100).contains(&cotton_part) {
        return Err(AppError::InvalidDataFormat(format!(
            "cotton part must be between 0 and 100, got {}",
            cotton_part
        )));
    }
    Ok(())
}
