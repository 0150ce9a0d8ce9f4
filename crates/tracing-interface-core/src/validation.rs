use crate::error::RelationError;
use crate::metadata::{CharmMetadata, RelationRole};

/// Check that `relation_name` is declared in `metadata` with the expected
/// interface and on the expected side.
///
/// The checks run in order (existence, interface, role) and the first
/// failing one is reported.
pub fn validate_relation(
    metadata: &CharmMetadata,
    relation_name: &str,
    expected_interface: &str,
    expected_role: RelationRole,
) -> Result<(), RelationError> {
    let (actual_role, relation) =
        metadata
            .relation(relation_name)
            .ok_or_else(|| RelationError::NotFound {
                relation_name: relation_name.to_string(),
            })?;

    if relation.interface != expected_interface {
        return Err(RelationError::InterfaceMismatch {
            relation_name: relation_name.to_string(),
            expected: expected_interface.to_string(),
            actual: relation.interface.clone(),
        });
    }

    if actual_role != expected_role {
        return Err(RelationError::RoleMismatch {
            relation_name: relation_name.to_string(),
            expected: expected_role,
            actual: actual_role,
        });
    }

    Ok(())
}
