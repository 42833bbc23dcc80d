//! Shipment milestone validation.
//!
//! A customs operation passes four tracked milestones: revalidation (073),
//! last document (114), MSA (130) and transport delivery (138). This crate
//! decides whether a proposed milestone date is consistent with the ones
//! already recorded and whether the business-day gap it creates has to be
//! justified with an exception code. Everything is a pure function over its
//! inputs; persisting the milestones is up to the caller.

pub mod business_days;
pub mod config;
pub mod date;
pub mod exception;
pub mod milestone;
pub mod phase;
pub mod policy;
pub mod trend;

pub use {
    business_days::business_days_between,
    config::PolicyConfig,
    date::{CalendarDate, InvalidDate, normalize},
    exception::{Catalog, CatalogError, ExceptionCode},
    milestone::{MilestoneGap, MilestoneSet, MilestoneUpdateRequest},
    phase::Phase,
    policy::{Clock, Field, FixedClock, Policy, SystemClock, ValidationResult, Violation},
};

use std::sync::{Arc, LazyLock};

static BUILTIN_CATALOG: LazyLock<Arc<Catalog>> = LazyLock::new(|| {
    Arc::new(Catalog::builtin().expect("bundled exception code catalog is valid"))
});

/// Validates `request` with the default configuration, the bundled exception
/// code catalog and today's local date.
pub fn validate(existing: &MilestoneSet, request: &MilestoneUpdateRequest) -> ValidationResult {
    Policy::new(
        PolicyConfig::default(),
        BUILTIN_CATALOG.clone(),
        Arc::new(SystemClock),
    )
    .validate(existing, request)
}
