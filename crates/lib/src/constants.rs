//! Constants used throughout the Listkeeper library.
//!
//! This module provides central definitions for reserved document field names
//! and other defaults shared by the store and the list engine.

/// Reserved document field holding the record id.
pub const ID_FIELD: &str = "_id";

/// Reserved document field holding the inheritance type discriminator.
pub const TYPE_FIELD: &str = "_type";

/// Default name of the integer position field.
pub const DEFAULT_POSITION_FIELD: &str = "position";

/// First position of every list. Positions are 1-based.
pub const TOP_POSITION: i64 = 1;
