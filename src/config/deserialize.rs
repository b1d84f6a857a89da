// ABOUTME: Custom serde deserializers for settings fields.
// ABOUTME: Validates stack names, regions and repository names while parsing.

use serde::Deserialize;

use crate::types::{Region, RepositoryName, StackName};

pub fn deserialize_stack_name<'de, D>(deserializer: D) -> Result<Option<StackName>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|s| StackName::new(&s).map_err(serde::de::Error::custom))
        .transpose()
}

pub fn deserialize_region<'de, D>(deserializer: D) -> Result<Option<Region>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|s| Region::new(&s).map_err(serde::de::Error::custom))
        .transpose()
}

pub fn deserialize_repository<'de, D>(deserializer: D) -> Result<Option<RepositoryName>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|s| RepositoryName::new(&s).map_err(serde::de::Error::custom))
        .transpose()
}
