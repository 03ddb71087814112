//! Domain Layer - Pure identity logic with no I/O
//!
//! This module contains:
//! - Node identifiers and the XOR distance metric
//! - Prefix length (leading zero bits) used for bucketing
//! - The immutable `Identity` value
//! - Provisioning and parsing errors

pub mod entities;
pub mod errors;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use services::*;
pub use value_objects::*;
