// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::load_store;
use crate::models::Category;
use crate::store::RecordStore;
use crate::utils::{humanize_field, parse_category};
use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use std::path::Path;
use tracing::info;

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let category = parse_category(sub.get_one::<String>("category").unwrap())?;
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let store = load_store(conn)?;
    let written = export_category(&store, category, &fmt, Path::new(out))?;
    if written == 0 {
        println!("No data available to export");
    } else {
        println!("Exported {} {} records to {}", written, category, out);
    }
    Ok(())
}

/// Writes one category to `out`; returns the number of records written.
/// Nothing is written for an empty category.
pub fn export_category(
    store: &RecordStore,
    category: Category,
    fmt: &str,
    out: &Path,
) -> Result<usize> {
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }
    let records = store.list(category);
    if records.is_empty() {
        return Ok(0);
    }
    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Create {}", out.display()))?;
            wtr.write_record(category.field_names().iter().map(|f| humanize_field(f)))?;
            for r in records {
                wtr.write_record(r.details.to_fields().into_iter().map(|(_, v)| v))?;
            }
            wtr.flush()?;
        }
        _ => {
            std::fs::write(out, serde_json::to_string_pretty(records)?)
                .with_context(|| format!("Write {}", out.display()))?;
        }
    }
    info!(%category, count = records.len(), path = %out.display(), "exported");
    Ok(records.len())
}
