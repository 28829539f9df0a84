//! Infrastructure primitives for the provisioning store.
//!
//! This module provides the record naming types used across every layer of the
//! store, and the key validation applied before a request reaches storage.

pub mod naming;
pub mod validation;
