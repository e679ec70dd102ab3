//! The query canvas: everything needed to render one SOQL statement.

use crate::ast::{FilterCondition, OrderBy, SortDirection};
use crate::soql_compiler::SoqlCompiler;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest `LIMIT` the canvas accepts.
pub const MAX_LIMIT: u32 = 2000;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CanvasError {
    #[error("limit must be between 1 and {}, got {0}", MAX_LIMIT)]
    LimitOutOfRange(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryCanvas {
    object: String,
    fields: Vec<String>,
    conditions: Vec<FilterCondition>,
    order_by: Vec<OrderBy>,
    limit: Option<u32>,
}

impl QueryCanvas {
    pub fn new(object: &str) -> Self {
        Self {
            object: object.to_string(),
            fields: Vec::new(),
            conditions: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    pub fn object(&self) -> &str {
        &self.object
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn conditions(&self) -> &[FilterCondition] {
        &self.conditions
    }

    pub fn order_by(&self) -> &[OrderBy] {
        &self.order_by
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    /// Switch to another object. Fields, conditions and ordering refer to the
    /// old object's schema and are dropped; the limit is kept.
    pub fn select_object(&mut self, object: &str) {
        self.object = object.to_string();
        self.fields.clear();
        self.conditions.clear();
        self.order_by.clear();
    }

    pub fn set_fields(&mut self, fields: Vec<String>) {
        self.fields = fields;
    }

    /// Replace the condition tree with a new root produced by the editor.
    pub fn set_conditions(&mut self, conditions: Vec<FilterCondition>) {
        self.conditions = conditions;
    }

    pub fn add_order(&mut self, field: &str, direction: SortDirection) {
        self.order_by.push(OrderBy {
            field: field.to_string(),
            direction,
        });
    }

    pub fn clear_order(&mut self) {
        self.order_by.clear();
    }

    pub fn set_limit(&mut self, limit: Option<u32>) -> Result<(), CanvasError> {
        match limit {
            Some(n) if n == 0 || n > MAX_LIMIT => Err(CanvasError::LimitOutOfRange(n)),
            _ => {
                self.limit = limit;
                Ok(())
            }
        }
    }

    /// Snapshot the rendered query as a saved-query record.
    pub fn to_saved_query(
        &self,
        compiler: &SoqlCompiler,
        name: &str,
        description: Option<&str>,
    ) -> SavedQuery {
        SavedQuery {
            name: name.to_string(),
            description: description.map(str::to_string),
            object: self.object.clone(),
            query: compiler.compile(self).soql,
        }
    }
}

/// A named query kept for later. The query text is opaque; the condition tree is not stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedQuery {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub object: String,
    pub query: String,
}
