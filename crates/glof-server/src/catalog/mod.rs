pub mod models;

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;

use serde::Serialize;

use self::models::{GlofEvent, GlofEventRow, Lake, LakeRow};
use crate::config::DataConfig;
use crate::error::{AppError, AppResult};

/// Lakes plus the historical outburst events for the monitored regions
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSnapshot {
    pub lakes: Vec<Lake>,
    pub glof_events: Vec<GlofEvent>,
}

/// CSV backed glacial lake inventory.
///
/// The files are re-read on every load so that operators can update them in
/// place without restarting the service.
#[derive(Clone)]
pub struct LakeCatalog {
    lakes_path: PathBuf,
    events_path: PathBuf,
    regions: Vec<String>,
}

impl LakeCatalog {
    pub fn new(config: &DataConfig) -> Self {
        println!(
            "[CATALOG] Lakes: {} | Events: {} | Regions: {}",
            config.lakes_csv,
            config.events_csv,
            config.regions.join(", ")
        );

        Self {
            lakes_path: PathBuf::from(&config.lakes_csv),
            events_path: PathBuf::from(&config.events_csv),
            regions: config.regions.clone(),
        }
    }

    pub async fn load(&self) -> AppResult<CatalogSnapshot> {
        let start = Instant::now();
        let catalog = self.clone();

        let snapshot = tokio::task::spawn_blocking(move || catalog.load_blocking())
            .await
            .map_err(|e| AppError::Internal(format!("Catalog task failed: {}", e)))??;

        tracing::debug!(
            lakes = %snapshot.lakes.len(),
            events = %snapshot.glof_events.len(),
            duration_ms = %start.elapsed().as_millis(),
            "Lake catalog loaded"
        );

        Ok(snapshot)
    }

    fn load_blocking(&self) -> AppResult<CatalogSnapshot> {
        let lakes = read_lakes(open(&self.lakes_path)?)?;
        let glof_events = read_events(open(&self.events_path)?, &self.regions)?;
        Ok(CatalogSnapshot { lakes, glof_events })
    }
}

fn open(path: &PathBuf) -> AppResult<File> {
    File::open(path).map_err(|e| AppError::Catalog(format!("{}: {}", path.display(), e)))
}

fn reader<R: Read>(source: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source)
}

pub fn read_lakes<R: Read>(source: R) -> AppResult<Vec<Lake>> {
    let mut lakes: Vec<Lake> = Vec::new();
    for row in reader(source).deserialize::<LakeRow>() {
        lakes.push(row?.into());
    }
    Ok(lakes)
}

/// Historical events, keeping only those whose region is in `regions`
pub fn read_events<R: Read>(source: R, regions: &[String]) -> AppResult<Vec<GlofEvent>> {
    let mut events: Vec<GlofEvent> = Vec::new();
    for row in reader(source).deserialize::<GlofEventRow>() {
        let row = row?;
        if regions.iter().any(|r| r == &row.region) {
            events.push(row.into());
        }
    }
    Ok(events)
}
