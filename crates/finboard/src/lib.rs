// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! The FinBoard dashboard data service.
//!
//! A [`Dashboard`] is constructed once per process and shared by every widget. It reads
//! payloads through one stale-while-revalidate [`DataCache`](finboard_cache::DataCache) and
//! hands each payload to the schema engine, so a widget receives the data together with its
//! field list, inferred widget type and suggested display in a single [`WidgetData`].
//!
//! - [`Dashboard::load`] and [`Dashboard::refresh_widget`] serve widgets, falling back to stale
//!   data when an upstream API fails.
//! - [`Dashboard::force_refresh`] drops the cached payload and fetches it again.
//! - [`Dashboard::stats`], [`Dashboard::cleanup`] and [`Dashboard::start_janitor`] cover
//!   diagnostics and housekeeping.
//!
//! The cache and schema engine are re-exported as [`cache`] and [`schema`].

mod config;
mod dashboard;
mod widget;

pub use config::DashboardConfig;
pub use dashboard::{DASHBOARD_CACHE_NAME, Dashboard, WIDGET_MAX_AGE_FACTOR};
#[doc(inline)]
pub use finboard_cache as cache;
#[doc(inline)]
pub use finboard_schema as schema;
pub use widget::WidgetData;
