//! Milestone validation policy.
//!
//! Decides whether a proposed milestone date is consistent with the other
//! milestones of a shipment and whether the gap it creates has to be
//! justified with an exception code. Every problem found is reported at once
//! so that the caller can show all of them next to the offending fields.

use {
    crate::{
        business_days::business_days_between,
        config::PolicyConfig,
        date::CalendarDate,
        exception::{Catalog, ExceptionCode},
        milestone::{MilestoneSet, MilestoneUpdateRequest},
        phase::Phase,
    },
    serde::Serialize,
    std::{collections::BTreeMap, fmt, sync::Arc},
};

/// Source of the current calendar date.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn today(&self) -> CalendarDate;
}

/// The local calendar date of the machine.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> CalendarDate {
        chrono::Local::now().date_naive().into()
    }
}

/// Always returns the same date.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub CalendarDate);

impl Clock for FixedClock {
    fn today(&self) -> CalendarDate {
        self.0
    }
}

/// Request field a violation is reported on.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Date,
    ExceptionCode,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Date => "date",
            Field::ExceptionCode => "exceptionCode",
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Relation {
    OnOrBefore,
    OnOrAfter,
}

impl Relation {
    fn holds(&self, date: CalendarDate, other: CalendarDate) -> bool {
        match self {
            Relation::OnOrBefore => date <= other,
            Relation::OnOrAfter => date >= other,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Relation::OnOrBefore => "on or before",
            Relation::OnOrAfter => "on or after",
        })
    }
}

/// A single reason why a milestone update is rejected. The display string is
/// the message shown on the field.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Violation {
    #[error("date {date} must be between {earliest} and {latest}")]
    OutOfRangeDate {
        date: CalendarDate,
        earliest: CalendarDate,
        latest: CalendarDate,
    },
    #[error("phase {phase} date {date} must be {relation} phase {other} date {other_date}")]
    OrderingViolation {
        phase: Phase,
        date: CalendarDate,
        relation: Relation,
        other: Phase,
        other_date: CalendarDate,
    },
    #[error("{}", describe_mismatch(.phase, .date, .counterpart, .expected))]
    MismatchRequiredPair {
        phase: Phase,
        date: CalendarDate,
        counterpart: Phase,
        expected: Option<CalendarDate>,
    },
    #[error(
        "{business_days} business days between phase {from} and phase {to} reach the \
         {threshold} day threshold, an exception code is required"
    )]
    MissingExceptionCode {
        from: Phase,
        to: Phase,
        business_days: u32,
        threshold: u32,
    },
    #[error("exception code {code:?} must be two uppercase letters followed by two digits")]
    InvalidExceptionCode { code: String },
    #[error("exception code {code} is not in the catalog")]
    UnknownExceptionCode { code: ExceptionCode },
}

fn describe_mismatch(
    phase: &Phase,
    date: &CalendarDate,
    counterpart: &Phase,
    expected: &Option<CalendarDate>,
) -> String {
    match expected {
        Some(expected) => {
            format!("phase {phase} date {date} must match phase {counterpart} date {expected}")
        }
        None => format!(
            "phase {phase} requires a matching phase {counterpart} date to be recorded first"
        ),
    }
}

impl Violation {
    pub fn field(&self) -> Field {
        match self {
            Violation::OutOfRangeDate { .. }
            | Violation::OrderingViolation { .. }
            | Violation::MismatchRequiredPair { .. } => Field::Date,
            Violation::MissingExceptionCode { .. }
            | Violation::InvalidExceptionCode { .. }
            | Violation::UnknownExceptionCode { .. } => Field::ExceptionCode,
        }
    }
}

/// Outcome of validating one milestone update.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// One message per field. Messages of several violations on the same
    /// field are joined in detection order.
    pub field_errors: BTreeMap<Field, String>,
    pub is_valid: bool,
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        let mut field_errors: BTreeMap<Field, String> = BTreeMap::new();
        for violation in &violations {
            let message = violation.to_string();
            field_errors
                .entry(violation.field())
                .and_modify(|existing| {
                    existing.push_str("; ");
                    existing.push_str(&message);
                })
                .or_insert(message);
        }
        Self {
            is_valid: field_errors.is_empty(),
            field_errors,
            violations,
        }
    }
}

/// Validates milestone updates against the milestones already known for a
/// shipment.
#[derive(Clone)]
pub struct Policy {
    config: PolicyConfig,
    catalog: Arc<Catalog>,
    clock: Arc<dyn Clock>,
}

impl Policy {
    pub fn new(config: PolicyConfig, catalog: Arc<Catalog>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            catalog,
            clock,
        }
    }

    pub fn validate(
        &self,
        existing: &MilestoneSet,
        request: &MilestoneUpdateRequest,
    ) -> ValidationResult {
        let phase = request.phase;
        let date = request.proposed_date;

        let mut violations = Vec::new();
        violations.extend(self.range_violation(date));
        violations.extend(ordering_violations(existing, phase, date));
        violations.extend(pair_violation(existing, phase, date));
        violations.extend(self.exception_code_violations(existing, request));

        let result = ValidationResult::from_violations(violations);
        tracing::debug!(
            shipment_ref = %request.shipment_ref,
            %phase,
            %date,
            violations = result.violations.len(),
            "validated milestone update"
        );
        result
    }

    /// Proposed dates may be neither in the future nor older than the
    /// configured maximum age.
    fn range_violation(&self, date: CalendarDate) -> Option<Violation> {
        let latest = self.clock.today();
        let earliest = latest
            .checked_sub_days(self.config.max_date_age_days())
            .unwrap_or(CalendarDate::MIN);
        (date < earliest || date > latest).then_some(Violation::OutOfRangeDate {
            date,
            earliest,
            latest,
        })
    }

    fn exception_code_violations(
        &self,
        existing: &MilestoneSet,
        request: &MilestoneUpdateRequest,
    ) -> Vec<Violation> {
        let mut violations = Vec::new();

        match request.exception_code.as_deref() {
            Some(raw) => match raw.parse::<ExceptionCode>() {
                Ok(code) if !self.catalog.contains(&code) => {
                    violations.push(Violation::UnknownExceptionCode { code });
                }
                Ok(_) => {}
                Err(_) => violations.push(Violation::InvalidExceptionCode {
                    code: raw.to_owned(),
                }),
            },
            None => {
                let threshold = self.config.exception_threshold;
                if let Some((from, to, business_days)) =
                    exception_gap(existing, request.phase, request.proposed_date)
                        .filter(|(_, _, business_days)| *business_days >= threshold)
                {
                    violations.push(Violation::MissingExceptionCode {
                        from,
                        to,
                        business_days,
                        threshold,
                    });
                }
            }
        }

        violations
    }
}

fn ordering_violations(
    existing: &MilestoneSet,
    phase: Phase,
    date: CalendarDate,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut require = |relation: Relation, other: Phase, other_date: Option<CalendarDate>| {
        if let Some(other_date) =
            other_date.filter(|other_date| !relation.holds(date, *other_date))
        {
            violations.push(Violation::OrderingViolation {
                phase,
                date,
                relation,
                other,
                other_date,
            });
        }
    };

    match phase {
        Phase::Revalidation => {
            require(Relation::OnOrBefore, Phase::LastDocument, existing.last_document);
        }
        Phase::LastDocument => {
            require(Relation::OnOrAfter, Phase::Revalidation, existing.revalidation);
            if let Some((release, release_date)) = existing.earliest_release() {
                require(Relation::OnOrBefore, release, Some(release_date));
            }
        }
        Phase::Msa | Phase::TransportDelivery => {
            require(Relation::OnOrAfter, Phase::LastDocument, existing.last_document);
        }
    }

    violations
}

/// MSA and transport delivery must carry the same date, and whichever is
/// recorded second has to match the first.
fn pair_violation(existing: &MilestoneSet, phase: Phase, date: CalendarDate) -> Option<Violation> {
    let counterpart = phase.counterpart()?;
    let expected = existing.get(counterpart);
    (expected != Some(date)).then_some(Violation::MismatchRequiredPair {
        phase,
        date,
        counterpart,
        expected,
    })
}

/// The milestone pair whose business-day gap decides whether an exception
/// code is needed, along with that gap.
fn exception_gap(
    existing: &MilestoneSet,
    phase: Phase,
    date: CalendarDate,
) -> Option<(Phase, Phase, u32)> {
    let (from, start, to, end) = match phase {
        Phase::Revalidation => return None,
        Phase::LastDocument => {
            let (release, release_date) = existing.earliest_release()?;
            (phase, date, release, release_date)
        }
        Phase::Msa | Phase::TransportDelivery => {
            (Phase::LastDocument, existing.last_document?, phase, date)
        }
    };
    Some((from, to, business_days_between(start, end)))
}
