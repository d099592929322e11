use std::fmt;

use chrono::NaiveDate;
use tracing::trace;

use crate::entity::RecurringEntity;
use crate::error::Result;
use crate::period::PeriodKey;

/// Why a template was not generated for a period. Skips are not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AutoGenerateDisabled,
    /// The recurrence end date lies before today.
    Expired,
    /// The cadence does not reach the target period.
    NotDue,
    InstallmentsExhausted,
    /// An instance for the same template and period already exists.
    AlreadyGenerated,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::AutoGenerateDisabled => "auto-generation disabled",
            SkipReason::Expired => "recurrence ended",
            SkipReason::NotDue => "not due this period",
            SkipReason::InstallmentsExhausted => "all installments generated",
            SkipReason::AlreadyGenerated => "already generated for period",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Skip(SkipReason),
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

/// Decides whether `template` gets an instance for `period`.
///
/// Checks run in order: the auto-generate flag (never bypassed), the end date,
/// the kind-specific rules, then, unless `force` is set, the `(parent, period)`
/// duplicate check against `siblings`. Malformed schedules surface as errors.
pub fn check_eligibility<E: RecurringEntity>(
    template: &E,
    period: PeriodKey,
    siblings: &[E],
    today: NaiveDate,
    force: bool,
) -> Result<Eligibility> {
    let skip = |reason: SkipReason| -> Result<Eligibility> {
        trace!("Skipping {} {} for {}: {}", E::KIND, template.id(), period, reason);
        Ok(Eligibility::Skip(reason))
    };

    if !template.auto_generate() {
        return skip(SkipReason::AutoGenerateDisabled);
    }

    if template.end_date().is_some_and(|end| end < today) {
        return skip(SkipReason::Expired);
    }

    if let Some(reason) = template.eligibility_extras(period)? {
        return skip(reason);
    }

    if !force && already_generated(template, period, siblings) {
        return skip(SkipReason::AlreadyGenerated);
    }

    Ok(Eligibility::Eligible)
}

fn already_generated<E: RecurringEntity>(template: &E, period: PeriodKey, siblings: &[E]) -> bool {
    if E::ADVANCES_IN_PLACE && period.matches(template.generated_for()) {
        return true;
    }

    siblings
        .iter()
        .any(|sibling| sibling.parent_id() == Some(template.id()) && period.matches(sibling.generated_for()))
}
