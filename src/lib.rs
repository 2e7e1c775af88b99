// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod commands;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod stats;
pub mod store;
pub mod utils;

pub use error::StoreError;
pub use models::{BookingDetails, Category, FieldMap, Record};
pub use store::RecordStore;
