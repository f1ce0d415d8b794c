//! Feature types: which kind of metamodel element a facet factory targets.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of program element a holder describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureType {
    Object,
    Property,
    Collection,
    Action,
    ActionParameter,
}

impl FeatureType {
    pub const OBJECTS_ONLY: &'static [FeatureType] = &[FeatureType::Object];
    pub const PROPERTIES_ONLY: &'static [FeatureType] = &[FeatureType::Property];
    pub const COLLECTIONS_ONLY: &'static [FeatureType] = &[FeatureType::Collection];
    pub const ACTIONS_ONLY: &'static [FeatureType] = &[FeatureType::Action];
    pub const PARAMETERS_ONLY: &'static [FeatureType] = &[FeatureType::ActionParameter];
    pub const PROPERTIES_AND_COLLECTIONS: &'static [FeatureType] =
        &[FeatureType::Property, FeatureType::Collection];
    pub const PROPERTIES_AND_PARAMETERS: &'static [FeatureType] =
        &[FeatureType::Property, FeatureType::ActionParameter];
    pub const MEMBERS: &'static [FeatureType] = &[
        FeatureType::Property,
        FeatureType::Collection,
        FeatureType::Action,
    ];
    pub const MEMBERS_AND_PARAMETERS: &'static [FeatureType] = &[
        FeatureType::Property,
        FeatureType::Collection,
        FeatureType::Action,
        FeatureType::ActionParameter,
    ];
    pub const EVERYTHING: &'static [FeatureType] = &[
        FeatureType::Object,
        FeatureType::Property,
        FeatureType::Collection,
        FeatureType::Action,
        FeatureType::ActionParameter,
    ];

    pub fn is_member(self) -> bool {
        matches!(self, Self::Property | Self::Collection | Self::Action)
    }

    pub fn is_association(self) -> bool {
        matches!(self, Self::Property | Self::Collection)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Property => "property",
            Self::Collection => "collection",
            Self::Action => "action",
            Self::ActionParameter => "parameter",
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_classification() {
        assert!(FeatureType::Action.is_member());
        assert!(!FeatureType::ActionParameter.is_member());
        assert!(FeatureType::Collection.is_association());
        assert!(!FeatureType::Object.is_association());
    }

    #[test]
    fn feature_sets_are_consistent() {
        assert!(FeatureType::MEMBERS.iter().all(|f| f.is_member()));
        assert_eq!(FeatureType::EVERYTHING.len(), 5);
    }
}
