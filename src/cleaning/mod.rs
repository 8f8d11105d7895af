pub mod addresses;
pub mod audit;
pub mod columns;
pub mod dates;
pub mod dedup;
pub mod duplicates;
pub mod vacancy;

use clap::ValueEnum;
use rusqlite::Connection;
use serde::Serialize;
use std::fmt;
use tracing::{info, info_span};

use crate::config::CleaningConfig;
use crate::db::connection::Database;
use crate::errors::Result;

/// One step of the cleaning pipeline, declared in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Dedup,
    Dates,
    FillAddresses,
    SplitAddresses,
    SoldAsVacant,
    Duplicates,
    DropColumns,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::Dedup,
        Stage::Dates,
        Stage::FillAddresses,
        Stage::SplitAddresses,
        Stage::SoldAsVacant,
        Stage::Duplicates,
        Stage::DropColumns,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Dedup => "dedup",
            Stage::Dates => "dates",
            Stage::FillAddresses => "fill-addresses",
            Stage::SplitAddresses => "split-addresses",
            Stage::SoldAsVacant => "sold-as-vacant",
            Stage::Duplicates => "duplicates",
            Stage::DropColumns => "drop-columns",
        }
    }

    /// Runs the stage against `conn` and returns how many rows (or columns,
    /// for `DropColumns`) it touched. The duplicate detector reports the
    /// duplicates it found, or deleted when deletion is enabled.
    fn apply(self, conn: &Connection, cfg: &CleaningConfig) -> Result<usize> {
        match self {
            Stage::Dedup => dedup::remove_duplicate_ids(conn),
            Stage::Dates => dates::normalize_sale_dates(conn),
            Stage::FillAddresses => addresses::fill_missing_addresses(conn, cfg.donor_pick),
            Stage::SplitAddresses => addresses::split_addresses(conn),
            Stage::SoldAsVacant => vacancy::normalize_sold_as_vacant_column(conn),
            Stage::Duplicates => {
                if cfg.delete_duplicate_transactions {
                    duplicates::delete_duplicate_transactions(conn)
                } else {
                    let found = duplicates::find_duplicate_transactions(conn)?;
                    info!(found = found.len(), "duplicate transactions detected (not deleted)");
                    Ok(found.len())
                }
            }
            Stage::DropColumns => columns::drop_columns(conn, &cfg.drop_columns),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub rows_affected: usize,
}

/// Chooses which stages run and in what order.
///
/// An empty request means the whole pipeline; `DropColumns` is only part of
/// it when the config lists columns. Requested stages always run in
/// pipeline order, each at most once.
pub fn plan_stages(requested: &[Stage], cfg: &CleaningConfig) -> Vec<Stage> {
    if requested.is_empty() {
        return Stage::ALL
            .into_iter()
            .filter(|s| *s != Stage::DropColumns || !cfg.drop_columns.is_empty())
            .collect();
    }

    let mut stages = requested.to_vec();
    stages.sort();
    stages.dedup();
    stages
}

/// Runs the planned stages in sequence, each in its own transaction.
/// A failing stage rolls back its own changes and stops the run.
pub fn run_pipeline(
    db: &mut Database,
    cfg: &CleaningConfig,
    requested: &[Stage],
) -> Result<Vec<StageReport>> {
    let mut reports = Vec::new();

    for stage in plan_stages(requested, cfg) {
        let span = info_span!("stage", name = stage.name());
        let _enter = span.enter();

        let rows_affected = db.with_conn(|conn| {
            let tx = conn.transaction()?;
            let n = stage.apply(&tx, cfg)?;
            tx.commit()?;
            Ok(n)
        })?;

        info!(rows_affected, "stage complete");
        reports.push(StageReport {
            stage,
            rows_affected,
        });
    }

    Ok(reports)
}
