// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{load_store, save_all};
use crate::store::RecordStore;
use anyhow::{bail, Result};
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let force = sub.get_flag("force");
    let existing = load_store(conn)?;
    if !existing.is_empty() && !force {
        bail!(
            "Database already holds {} bookings; use --force to replace them",
            existing.len()
        );
    }
    let demo = RecordStore::with_sample_data();
    save_all(conn, &demo)?;
    println!("Loaded {} demo bookings", demo.len());
    Ok(())
}
