// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

use crate::models::Category;

/// Errors raised by the record store and the field-bag adapter.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{category} record '{id}' not found")]
    NotFound { category: Category, id: String },
    #[error("invalid input: {0}")]
    Validation(String),
}

impl StoreError {
    pub fn not_found(category: Category, id: &str) -> Self {
        StoreError::NotFound {
            category,
            id: id.to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        StoreError::Validation(msg.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
