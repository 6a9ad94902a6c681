//! Grouping of mutually exclusive fields.
//!
//! Radio buttons sharing a name form one group. A group is required when any
//! member declares `required`, and satisfied as soon as any member holds a
//! value (is checked). Members are always evaluated together so that each
//! one ends up caching the same verdict.

use crate::field::{FieldDescriptor, Verdict};

/// One evaluation unit of a pass, in document order of its first field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    /// A field outside any group (index into the field list).
    Single(usize),
    /// All members of one group.
    Group { key: String, members: Vec<usize> },
}

/// The fields of a pass, split into singles and groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    units: Vec<Unit>,
}

impl Partition {
    /// Returns the units in evaluation order.
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Returns the indices of ungrouped fields.
    pub fn singles(&self) -> Vec<usize> {
        self.units
            .iter()
            .filter_map(|unit| match unit {
                Unit::Single(index) => Some(*index),
                Unit::Group { .. } => None,
            })
            .collect()
    }

    /// Returns the groups as `(key, members)` pairs.
    pub fn groups(&self) -> Vec<(&str, &[usize])> {
        self.units
            .iter()
            .filter_map(|unit| match unit {
                Unit::Group { key, members } => Some((key.as_str(), members.as_slice())),
                Unit::Single(_) => None,
            })
            .collect()
    }

    /// Returns the unit containing the field at `index`.
    pub fn unit_of(&self, index: usize) -> Option<&Unit> {
        self.units.iter().find(|unit| match unit {
            Unit::Single(single) => *single == index,
            Unit::Group { members, .. } => members.contains(&index),
        })
    }
}

/// Splits the non-skipped fields into evaluation units.
///
/// Pure: reads only descriptor state.
pub fn partition(fields: &[FieldDescriptor]) -> Partition {
    let mut units: Vec<Unit> = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        if field.is_skipped() {
            continue;
        }
        let Some(key) = field.group() else {
            units.push(Unit::Single(index));
            continue;
        };
        let existing = units.iter_mut().find_map(|unit| match unit {
            Unit::Group { key: k, members } if *k == key => Some(members),
            _ => None,
        });
        match existing {
            Some(members) => members.push(index),
            None => units.push(Unit::Group {
                key: key.to_string(),
                members: vec![index],
            }),
        }
    }
    Partition { units }
}

/// Reduces member verdicts to the group verdict: the first failing member's
/// verdict, or a pass.
pub fn reduce<I>(verdicts: I) -> Verdict
where
    I: IntoIterator<Item = Verdict>,
{
    verdicts
        .into_iter()
        .find(|verdict| !verdict.valid)
        .unwrap_or_else(Verdict::pass)
}
