// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{params_from_iter, Connection};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::models::{BookingDetails, Category, FieldMap, Record};
use crate::store::RecordStore;
use crate::utils::CAMEL_BOUNDARY;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Tripledger", "tripledger"));

pub const DB_ENV: &str = "TRIPLEDGER_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Ok(p) = std::env::var(DB_ENV) {
        if !p.trim().is_empty() {
            return Ok(PathBuf::from(p));
        }
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("tripledger.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    open_at(&path)
}

pub fn open_at(path: &Path) -> Result<Connection> {
    let conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn table_name(category: Category) -> String {
    format!("{}_records", category.key())
}

/// `checkInDate` -> `check_in_date`.
pub fn column_name(field: &str) -> String {
    CAMEL_BOUNDARY
        .replace_all(field, "${1}_${2}")
        .to_lowercase()
}

fn columns(category: Category) -> Vec<String> {
    category.field_names().iter().map(|f| column_name(f)).collect()
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
    "#,
    )?;
    // one table per category; values kept as TEXT like the decimals elsewhere
    for category in Category::ALL {
        let cols: Vec<String> = columns(category)
            .into_iter()
            .map(|c| format!("{} TEXT NOT NULL DEFAULT ''", c))
            .collect();
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {}(
                id TEXT PRIMARY KEY,
                pos INTEGER NOT NULL,
                {}
            )",
            table_name(category),
            cols.join(",\n                ")
        );
        conn.execute_batch(&sql)?;
    }
    Ok(())
}

fn load_category(conn: &Connection, category: Category) -> Result<Vec<Record>> {
    let fields = category.field_names();
    let sql = format!(
        "SELECT id, {} FROM {} ORDER BY pos, id",
        columns(category).join(", "),
        table_name(category)
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let id: String = r.get(0)?;
        let mut map = FieldMap::new();
        for (i, name) in fields.iter().enumerate() {
            let v: String = r.get(i + 1)?;
            map.insert((*name).to_string(), v);
        }
        let details = BookingDetails::from_fields(category, &map)
            .with_context(|| format!("Stored {} record '{}' is invalid", category, id))?;
        out.push(Record { id, details });
    }
    Ok(out)
}

pub fn load_store(conn: &Connection) -> Result<RecordStore> {
    let mut store = RecordStore::new();
    for category in Category::ALL {
        let records = load_category(conn, category)?;
        store.replace_category(category, records);
    }
    debug!(records = store.len(), "store loaded");
    Ok(store)
}

// DELETE + INSERT for one table; the caller owns the transaction.
fn write_category(conn: &Connection, store: &RecordStore, category: Category) -> Result<()> {
    let table = table_name(category);
    let cols = columns(category);
    let placeholders: Vec<String> = (1..=cols.len() + 2).map(|i| format!("?{}", i)).collect();
    let insert = format!(
        "INSERT INTO {}(id, pos, {}) VALUES ({})",
        table,
        cols.join(", "),
        placeholders.join(", ")
    );

    conn.execute(&format!("DELETE FROM {}", table), [])?;
    let mut stmt = conn.prepare(&insert)?;
    for (pos, rec) in store.list(category).iter().enumerate() {
        let mut values = vec![rec.id.clone(), pos.to_string()];
        values.extend(rec.details.to_fields().into_iter().map(|(_, v)| v));
        stmt.execute(params_from_iter(values.iter()))?;
    }
    Ok(())
}

/// Rewrites one category's table from the store, keeping list order.
pub fn save_category(conn: &mut Connection, store: &RecordStore, category: Category) -> Result<()> {
    let tx = conn.transaction()?;
    write_category(&tx, store, category)?;
    tx.commit()
        .with_context(|| format!("Saving {} records", category))?;
    info!(%category, count = store.list(category).len(), "category saved");
    Ok(())
}

/// Rewrites every category table in a single transaction.
pub fn save_all(conn: &mut Connection, store: &RecordStore) -> Result<()> {
    let tx = conn.transaction()?;
    for category in Category::ALL {
        write_category(&tx, store, category)
            .with_context(|| format!("Saving {} records", category))?;
    }
    tx.commit()?;
    info!(records = store.len(), "all categories saved");
    Ok(())
}
