//! Edit policy for provisioned resources.
//!
//! The store itself accepts any provenance transition. This is the check the
//! rule-management side applies before it lets an edit through: once a resource
//! is owned by a channel, edits coming through another channel are rejected
//! unless the caller forces them.

use crate::provisioning::{error::ProvisioningError, infrastructure::naming::Provenance};

/// Checks whether an edit arriving through `incoming` may replace a resource
/// whose stored provenance is `stored`.
///
/// | stored | incoming        | force | result   |
/// |--------|-----------------|-------|----------|
/// | None   | any             | any   | allowed  |
/// | P      | P               | any   | allowed  |
/// | P      | Q != P          | true  | allowed  |
/// | P      | Q != P          | false | conflict |
pub fn check_edit(
    stored: Provenance,
    incoming: Provenance,
    force: bool,
) -> Result<(), ProvisioningError> {
    if stored == Provenance::None || stored == incoming || force {
        Ok(())
    } else {
        Err(ProvisioningError::ProvenanceConflict { stored, incoming })
    }
}
