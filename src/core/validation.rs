use thiserror::Error;
use validator::Validate;
use crate::models::{EntityKind, MatchWarning, Property, PurchaseProfile};

/// Errors that reject a single (property, profile) pair
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatchError {
    #[error("Invalid property {id}: {reason}")]
    InvalidProperty { id: String, reason: String },

    #[error("Invalid purchase profile {id}: {reason}")]
    InvalidProfile { id: String, reason: String },
}

impl MatchError {
    /// Soft warning form used when a batch skips the record
    pub fn to_warning(&self) -> MatchWarning {
        match self {
            MatchError::InvalidProperty { id, reason } => MatchWarning {
                entity: EntityKind::Property,
                entity_id: id.clone(),
                message: reason.clone(),
            },
            MatchError::InvalidProfile { id, reason } => MatchWarning {
                entity: EntityKind::Profile,
                entity_id: id.clone(),
                message: reason.clone(),
            },
        }
    }
}

pub fn validate_property(property: &Property) -> Result<(), MatchError> {
    property.validate().map_err(|errors| MatchError::InvalidProperty {
        id: property.id.clone(),
        reason: errors.to_string(),
    })
}

pub fn validate_profile(profile: &PurchaseProfile) -> Result<(), MatchError> {
    profile.validate().map_err(|errors| MatchError::InvalidProfile {
        id: profile.id.clone(),
        reason: errors.to_string(),
    })
}

/// Splits records into valid ones and warnings for the rest
pub fn partition_valid<'a, T, I, F>(records: I, check: F) -> (Vec<&'a T>, Vec<MatchWarning>)
where
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> Result<(), MatchError>,
    T: 'a,
{
    let mut valid = Vec::new();
    let mut warnings = Vec::new();

    for record in records {
        match check(record) {
            Ok(()) => valid.push(record),
            Err(e) => {
                tracing::warn!("Skipping record: {}", e);
                warnings.push(e.to_warning());
            }
        }
    }

    (valid, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PropertyStatus, PropertyType};

    fn property(id: &str, price: Option<f64>) -> Property {
        Property {
            id: id.to_string(),
            property_type: PropertyType::Industrial,
            status: PropertyStatus::Active,
            price,
            size_m2: None,
            bedrooms: None,
            bathrooms: None,
            city: "Dortmund".to_string(),
            features: vec![],
            updated_at: None,
        }
    }

    #[test]
    fn test_invalid_property_error() {
        let err = validate_property(&property("", None)).unwrap_err();
        assert!(matches!(err, MatchError::InvalidProperty { .. }));

        let warning = err.to_warning();
        assert_eq!(warning.entity, EntityKind::Property);
        assert_eq!(warning.entity_id, "");
    }

    #[test]
    fn test_partition_valid() {
        let records = vec![
            property("a", Some(10.0)),
            property("b", Some(-5.0)),
            property("c", None),
        ];

        let (valid, warnings) = partition_valid(&records, validate_property);

        assert_eq!(valid.len(), 2);
        assert_eq!(valid[0].id, "a");
        assert_eq!(valid[1].id, "c");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].entity_id, "b");
    }
}
