//! Result shaping for lookups

use adbridge_core::types::{FindOptions, UserRecord, DN_ATTRIBUTE};

/// Transforms raw lookup results before they are returned to callers.
pub trait ResultShaper: Send + Sync {
    fn shape(&self, options: &FindOptions, records: Vec<UserRecord>) -> Vec<UserRecord>;
}

/// Keeps only the requested attributes (plus `dn`). No selection keeps all.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldSelector;

impl ResultShaper for FieldSelector {
    fn shape(&self, options: &FindOptions, records: Vec<UserRecord>) -> Vec<UserRecord> {
        if options.fields.is_empty() {
            return records;
        }

        records
            .into_iter()
            .map(|mut record| {
                record.retain(|name| {
                    name.eq_ignore_ascii_case(DN_ATTRIBUTE)
                        || options.fields.iter().any(|f| f.eq_ignore_ascii_case(name))
                });
                record
            })
            .collect()
    }
}
