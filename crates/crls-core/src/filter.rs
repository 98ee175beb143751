//! Row and column filtering.
//!
//! Single pass over the acquired records in input order. For each record
//! the compiled policy decides exclusion or the visible columns; admitted
//! records are cloned whole or projected. Output never grows beyond the
//! input and never holds a field the source record lacks.

use tracing::{debug, trace};

use crate::columns::{Columns, Decision, FieldSet};
use crate::config::FilterConfig;
use crate::error::{GuardError, GuardResult};
use crate::policy::CompiledPolicy;
use crate::record::Record;

/// Apply row and column security to `rows`.
///
/// Fails fast: the first predicate error aborts the call and no partial
/// output is returned. Errors are returned to the caller and logged at
/// debug level only.
pub fn filter_rows<R: Record, C>(
    rows: &[R],
    context: &C,
    policy: &CompiledPolicy<R, C>,
    config: &FilterConfig,
) -> GuardResult<Vec<R>> {
    let mut filtered = Vec::with_capacity(rows.len());
    let mut excluded = 0usize;
    let mut projected = 0usize;

    for (index, record) in rows.iter().enumerate() {
        let decision = policy.decide(record, context).map_err(|e| {
            let err = e.at(index);
            debug!(label = %config.label, error = %err, "security predicate failed");
            err
        })?;

        match decision {
            Decision::Exclude => {
                trace!(index, "record excluded");
                excluded += 1;
            }
            Decision::Include(Columns::All) => filtered.push(record.clone()),
            Decision::Include(Columns::Only(fields)) => {
                if config.is_strict() {
                    check_fields_present(record, &fields, index).inspect_err(|err| {
                        debug!(label = %config.label, error = %err, "column selection rejected");
                    })?;
                }
                filtered.push(record.project(&fields));
                projected += 1;
            }
        }
    }

    debug!(
        label = %config.label,
        input = rows.len(),
        admitted = filtered.len(),
        excluded,
        projected,
        "rows filtered"
    );

    Ok(filtered)
}

/// Ensure every selected field exists on the record.
fn check_fields_present<R: Record>(record: &R, fields: &FieldSet, index: usize) -> GuardResult<()> {
    // Smallest name first so the reported field is stable across runs.
    match fields.iter().filter(|name| !record.has_field(name)).min() {
        Some(field) => Err(GuardError::UnknownField {
            index,
            field: field.to_string(),
        }),
        None => Ok(()),
    }
}
