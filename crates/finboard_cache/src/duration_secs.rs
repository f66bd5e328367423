// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Serde helpers for durations written as a number of seconds.
//!
//! Use with `#[serde(with = "finboard_cache::duration_secs")]`. Fractional seconds are accepted
//! on input; output is always fractional seconds.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer, de::Error};

/// Serializes `duration` as fractional seconds.
///
/// # Errors
///
/// Returns the serializer's error.
pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Deserializes a non-negative number of seconds.
///
/// # Errors
///
/// Fails for negative, non-finite or out-of-range values.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let secs = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
}
