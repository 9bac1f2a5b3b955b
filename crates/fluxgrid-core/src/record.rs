//! Flat persistence records.
//!
//! A node reduces to a [`NodeRecord`]: a type tag, a position, and a
//! string-keyed map of scalars. The encoding on disk is the host's
//! business; this crate only defines the shape. Network membership is
//! deliberately absent from records -- topology is rebuilt by
//! re-registering nodes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::fixed::Fixed64;
use crate::pos::BlockPos;

/// One scalar field of a node record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Fixed(Fixed64),
    Text(String),
}

/// The persisted state of a single node.
///
/// `node_type` names the concrete machine kind (e.g. `"generator"`); the
/// host uses it to pick a constructor when rebuilding the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub node_type: String,
    pub position: BlockPos,
    pub active: bool,
    pub fields: BTreeMap<String, Scalar>,
}

impl NodeRecord {
    pub fn new(node_type: &str, position: BlockPos) -> Self {
        Self {
            node_type: node_type.to_string(),
            position,
            active: false,
            fields: BTreeMap::new(),
        }
    }

    // --- setters ---

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.fields.insert(key.to_string(), Scalar::Bool(value));
    }

    pub fn set_int(&mut self, key: &str, value: i64) {
        self.fields.insert(key.to_string(), Scalar::Int(value));
    }

    pub fn set_fixed(&mut self, key: &str, value: Fixed64) {
        self.fields.insert(key.to_string(), Scalar::Fixed(value));
    }

    pub fn set_text(&mut self, key: &str, value: &str) {
        self.fields
            .insert(key.to_string(), Scalar::Text(value.to_string()));
    }

    // --- getters (typed, with defaults for missing or mismatched fields) ---

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.fields.get(key) {
            Some(Scalar::Bool(v)) => *v,
            _ => default,
        }
    }

    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        match self.fields.get(key) {
            Some(Scalar::Int(v)) => *v,
            _ => default,
        }
    }

    pub fn get_fixed(&self, key: &str, default: Fixed64) -> Fixed64 {
        match self.fields.get(key) {
            Some(Scalar::Fixed(v)) => *v,
            _ => default,
        }
    }

    pub fn get_text(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(Scalar::Text(v)) => Some(v.as_str()),
            _ => None,
        }
    }
}
