//! Patient-set membership masks

use arrow::array::{Array, BooleanArray, StringArray};

use crate::cohort::CohortSet;

/// Membership of each patient identifier in a set
///
/// Null identifiers are never members.
#[must_use]
pub fn membership_mask(patients: &StringArray, members: &CohortSet) -> BooleanArray {
    let mut mask = Vec::with_capacity(patients.len());
    for i in 0..patients.len() {
        mask.push(!patients.is_null(i) && members.contains(patients.value(i)));
    }
    BooleanArray::from(mask)
}
