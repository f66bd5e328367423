// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use opentelemetry::metrics::{Counter, Histogram, Meter};

const CACHE_EVENT_COUNT_NAME: &str = "cache.event.count";
const CACHE_FETCH_DURATION_NAME: &str = "cache.fetch.duration";

pub(crate) fn create_event_counter(meter: &Meter) -> Counter<u64> {
    meter
        .u64_counter(CACHE_EVENT_COUNT_NAME)
        .with_description("Cache events")
        .with_unit("{event}")
        .build()
}

pub(crate) fn create_fetch_duration_histogram(meter: &Meter) -> Histogram<f64> {
    meter
        .f64_histogram(CACHE_FETCH_DURATION_NAME)
        .with_description("Duration of upstream fetches")
        .with_unit("s")
        .build()
}
