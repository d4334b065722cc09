//! Manual mapping against the module's canonical field catalog.

use intake_model::{Confidence, FieldMapping, Module};
use tracing::debug;

use crate::collaborator::MappingResolver;
use crate::error::MappingError;

/// Resolves a mapping to a canonical field picked by the user.
///
/// The target must name one of the module's canonical fields (ignoring
/// case) that no other column is already mapped to. The result is a full
/// match at 100% confidence.
#[derive(Debug, Default, Clone, Copy)]
pub struct CatalogResolver;

impl MappingResolver for CatalogResolver {
    fn assign_mapping(
        &self,
        module: Module,
        mappings: &[FieldMapping],
        mapping_id: &str,
        target: &str,
    ) -> Result<FieldMapping, MappingError> {
        let mapping = mappings
            .iter()
            .find(|m| m.id == mapping_id)
            .ok_or_else(|| MappingError::MappingNotFound(mapping_id.to_string()))?;
        let field = module
            .canonical_field(target)
            .ok_or_else(|| MappingError::UnknownTarget {
                module,
                target: target.to_string(),
            })?;

        if let Some(owner) = mappings.iter().find(|m| {
            m.id != mapping_id
                && m.is_mapped()
                && m.mapped_field
                    .as_deref()
                    .is_some_and(|t| t.eq_ignore_ascii_case(field.name))
        }) {
            return Err(MappingError::TargetAlreadyUsed {
                target: field.name.to_string(),
                source_field: owner.source_field.clone(),
            });
        }

        debug!(%module, mapping_id, target = field.name, "mapping assigned");
        Ok(mapping
            .clone()
            .resolved(field.name, Confidence::CERTAIN, false))
    }
}
