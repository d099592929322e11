//! Building the rows a run persists.

use model::entities::recurrence::History;
use tracing::trace;

use crate::entity::{GenerationContext, RecurringEntity};
use crate::error::{RecurrenceError, Result};

pub const CREATED_ACTION: &str = "created";

/// Audit text stamped on every generated row.
pub fn generation_description(ctx: &GenerationContext) -> String {
    format!("generated automatically for {}", ctx.period)
}

/// History of a freshly generated instance: a single `created` entry.
pub fn fresh_history(ctx: &GenerationContext) -> History {
    let mut history = History::default();
    history.push(CREATED_ACTION, generation_description(ctx), ctx.now);
    history
}

/// Builds the instance of `template` for `ctx.period` and checks its lineage.
///
/// Spawned instances must point back at the template; in-place kinds must keep
/// the template id. Both must carry the target period.
pub fn materialize<E: RecurringEntity>(template: &E, ctx: &GenerationContext) -> Result<E> {
    let instance = template.build_instance(ctx)?;

    let lineage_ok = if E::ADVANCES_IN_PLACE {
        instance.id() == template.id()
    } else {
        instance.id() != template.id() && instance.parent_id() == Some(template.id())
    };
    if !lineage_ok || !ctx.period.matches(instance.generated_for()) {
        return Err(RecurrenceError::InvalidSchedule(format!(
            "{} {} produced an instance with broken lineage",
            E::KIND,
            template.id()
        )));
    }

    trace!(
        "Materialized {} {} from {} for {}",
        E::KIND,
        instance.id(),
        template.id(),
        ctx.period
    );
    Ok(instance)
}
