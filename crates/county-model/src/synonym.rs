//! Synonym groups: several source labels that stand for one output county.
//!
//! The age-by-county table splits some administrative areas (Cork City and
//! Cork County, the four Dublin local authorities). A [`SynonymMap`] holds the
//! validated set of groups used to collapse those splits before aggregation.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// One canonical output name and the source labels it replaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymGroup {
    pub name: String,
    pub members: Vec<String>,
}

impl SynonymGroup {
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        let label = label.trim();
        self.members.iter().any(|member| member.trim() == label)
    }
}

/// A validated, disjoint collection of synonym groups.
///
/// Validation guarantees:
/// - no label belongs to two groups;
/// - no group name is itself a member label of any group, so applying the
///   map to its own output changes nothing;
/// - every group has at least one member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynonymMap {
    groups: Vec<SynonymGroup>,
    owner: HashMap<String, usize>,
}

impl SynonymMap {
    pub fn new(groups: Vec<SynonymGroup>) -> Result<Self> {
        let mut owner: HashMap<String, usize> = HashMap::new();
        for (idx, group) in groups.iter().enumerate() {
            if group.members.is_empty() {
                return Err(ModelError::EmptySynonymGroup {
                    group: group.name.clone(),
                });
            }
            for member in &group.members {
                let label = member.trim().to_string();
                if let Some(&existing) = owner.get(&label) {
                    if existing != idx {
                        return Err(ModelError::OverlappingSynonym {
                            label,
                            first: groups[existing].name.clone(),
                            second: group.name.clone(),
                        });
                    }
                }
                owner.insert(label, idx);
            }
        }
        for group in &groups {
            if let Some(&idx) = owner.get(group.name.trim()) {
                return Err(ModelError::GroupNameIsMember {
                    group: group.name.clone(),
                    owner: groups[idx].name.clone(),
                });
            }
        }
        Ok(Self { groups, owner })
    }

    /// Build from the `name -> members` form used in configuration files.
    pub fn from_mapping(mapping: &BTreeMap<String, Vec<String>>) -> Result<Self> {
        let groups = mapping
            .iter()
            .map(|(name, members)| SynonymGroup::new(name.clone(), members.iter().cloned()))
            .collect();
        Self::new(groups)
    }

    pub fn groups(&self) -> &[SynonymGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The group claiming `label`, if any.
    pub fn group_for(&self, label: &str) -> Option<&SynonymGroup> {
        self.owner
            .get(label.trim())
            .and_then(|&idx| self.groups.get(idx))
    }
}

/// The city/county splits of the Irish census average-age table.
///
/// Member spellings match the source table exactly, including the accented
/// "Dún Laoghaire-Rathdown".
pub fn default_synonym_mapping() -> BTreeMap<String, Vec<String>> {
    let mut mapping = BTreeMap::new();
    mapping.insert(
        "Galway".to_string(),
        vec!["Galway County".to_string(), "Galway City".to_string()],
    );
    mapping.insert(
        "Cork".to_string(),
        vec!["Cork County".to_string(), "Cork City".to_string()],
    );
    mapping.insert(
        "Dublin".to_string(),
        vec![
            "Dún Laoghaire-Rathdown".to_string(),
            "Fingal".to_string(),
            "Dublin City".to_string(),
            "South Dublin".to_string(),
        ],
    );
    mapping.insert(
        "Waterford".to_string(),
        vec!["Waterford City and County".to_string()],
    );
    mapping.insert(
        "Limerick".to_string(),
        vec!["Limerick City and County".to_string()],
    );
    mapping
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mapping_is_valid() {
        let map = SynonymMap::from_mapping(&default_synonym_mapping()).unwrap();
        assert_eq!(map.groups().len(), 5);
        assert_eq!(map.group_for("Fingal").map(|g| g.name.as_str()), Some("Dublin"));
        assert_eq!(map.group_for(" Cork City ").map(|g| g.name.as_str()), Some("Cork"));
        assert!(map.group_for("Kerry").is_none());
        assert!(map.group_for("Dublin").is_none());
    }

    #[test]
    fn overlapping_groups_are_rejected() {
        let err = SynonymMap::new(vec![
            SynonymGroup::new("Cork", ["Cork City", "Cork County"]),
            SynonymGroup::new("Munster", ["Cork City", "Kerry"]),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ModelError::OverlappingSynonym {
                label: "Cork City".to_string(),
                first: "Cork".to_string(),
                second: "Munster".to_string(),
            }
        );
    }

    #[test]
    fn group_name_that_is_a_member_is_rejected() {
        let err = SynonymMap::new(vec![
            SynonymGroup::new("Cork", ["Cork City"]),
            SynonymGroup::new("Munster", ["Cork", "Kerry"]),
        ])
        .unwrap_err();
        assert!(matches!(err, ModelError::GroupNameIsMember { .. }));
    }

    #[test]
    fn empty_group_is_rejected() {
        let err = SynonymMap::new(vec![SynonymGroup::new("Cork", Vec::<String>::new())])
            .unwrap_err();
        assert!(matches!(err, ModelError::EmptySynonymGroup { .. }));
    }
}
