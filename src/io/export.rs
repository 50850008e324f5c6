use anyhow::Result;
use std::io::Write;

use crate::application::{BatchFilter, LedgerService};

/// Exporter for writing batch listings in machine-readable formats.
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export batches to CSV format.
    pub async fn export_batches_csv<W: Write>(
        &self,
        writer: W,
        filter: BatchFilter,
    ) -> Result<usize> {
        let batches = self.service.list_batches(filter).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        // Write header
        csv_writer.write_record(["id", "color", "cotton_part", "quantity"])?;

        let mut count = 0;
        for batch in &batches {
            csv_writer.write_record([
                batch.id.to_string(),
                batch.color.clone(),
                batch.cotton_part.to_string(),
                batch.quantity.to_string(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export batches as pretty-printed JSON.
    pub async fn export_batches_json<W: Write>(
        &self,
        mut writer: W,
        filter: BatchFilter,
    ) -> Result<usize> {
        let batches = self.service.list_batches(filter).await?;

        let json = serde_json::to_string_pretty(&batches)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(batches.len())
    }
}
