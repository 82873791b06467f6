//! Request paths and their validation.
//!
//! The transport hands the engine loosely-shaped paths: a family name plus
//! optional group and column names (`RawPath`). Which combinations are legal
//! depends on the family kind and on the operation class:
//!
//! | operation    | Simple family        | Super family                   |
//! |--------------|----------------------|--------------------------------|
//! | point lookup | column, no group     | group and column               |
//! | slice        | neither              | group, no column               |
//! | count        | neither              | group optional, no column      |
//! | delete       | column optional      | group optional; column ⇒ group |
//!
//! Each operation class gets its own closed variant type (`PointPath`,
//! `ScopePath`, `DeletePath`) built through a validating constructor, so
//! illegal shapes are rejected at the boundary with `InvalidRequest` and the
//! resolution code downstream only ever sees legal combinations.

use crate::schema::{FamilyKind, TableDef};
use crate::util::{Result, Slice, Status};

/// Wire-shaped path: family plus optional group and column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPath {
    pub family: String,
    pub group: Option<Slice>,
    pub column: Option<Slice>,
}

impl RawPath {
    pub fn family<S: Into<String>>(family: S) -> Self {
        RawPath {
            family: family.into(),
            group: None,
            column: None,
        }
    }

    pub fn column<S: Into<String>>(family: S, column: Slice) -> Self {
        RawPath {
            family: family.into(),
            group: None,
            column: Some(column),
        }
    }

    pub fn group<S: Into<String>>(family: S, group: Slice) -> Self {
        RawPath {
            family: family.into(),
            group: Some(group),
            column: None,
        }
    }

    pub fn group_column<S: Into<String>>(family: S, group: Slice, column: Slice) -> Self {
        RawPath {
            family: family.into(),
            group: Some(group),
            column: Some(column),
        }
    }
}

/// Fully-qualified leaf coordinate for point lookups and single inserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointPath {
    Simple {
        family: String,
        column: Slice,
    },
    Super {
        family: String,
        group: Slice,
        column: Slice,
    },
}

impl PointPath {
    pub fn resolve(def: &TableDef, raw: &RawPath) -> Result<Self> {
        let kind = def.family_kind(&raw.family)?;
        match kind {
            FamilyKind::Simple => {
                if raw.group.is_some() {
                    return Err(Status::invalid_request(format!(
                        "{} is a simple family; no group allowed",
                        raw.family
                    )));
                }
                let column = raw.column.clone().ok_or_else(|| {
                    Status::invalid_request("point lookup requires a column name")
                })?;
                Ok(PointPath::Simple {
                    family: raw.family.clone(),
                    column,
                })
            }
            FamilyKind::Super => {
                let group = raw.group.clone().ok_or_else(|| {
                    Status::invalid_request(format!(
                        "{} is a super family; a group name is required",
                        raw.family
                    ))
                })?;
                let column = raw.column.clone().ok_or_else(|| {
                    Status::invalid_request("point lookup requires a column name")
                })?;
                Ok(PointPath::Super {
                    family: raw.family.clone(),
                    group,
                    column,
                })
            }
        }
    }

    pub fn family_name(&self) -> &str {
        match self {
            PointPath::Simple { family, .. } => family,
            PointPath::Super { family, .. } => family,
        }
    }
}

/// Scope addressed by slices, name-list lookups, and counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopePath {
    /// Whole family: the columns of a Simple family, or (for counts only)
    /// the groups of a Super family.
    Family { family: String },
    /// One group of a Super family.
    Group { family: String, group: Slice },
}

impl ScopePath {
    /// Shape for `get_slice`/`get_slice_by_names`: a super family must be
    /// addressed through a group (a bare super family is not a flat column
    /// scope).
    pub fn resolve_slice(def: &TableDef, raw: &RawPath) -> Result<Self> {
        let path = Self::resolve_count(def, raw)?;
        if let (ScopePath::Family { family }, FamilyKind::Super) =
            (&path, def.family_kind(&raw.family)?)
        {
            return Err(Status::invalid_request(format!(
                "{family} is a super family; slices require a group name"
            )));
        }
        Ok(path)
    }

    /// Shape for `get_column_count`: additionally admits a bare super
    /// family, whose immediate entries are its groups.
    pub fn resolve_count(def: &TableDef, raw: &RawPath) -> Result<Self> {
        let kind = def.family_kind(&raw.family)?;
        if raw.column.is_some() {
            return Err(Status::invalid_request(
                "scope paths do not take a column name",
            ));
        }
        match (kind, &raw.group) {
            (FamilyKind::Simple, Some(_)) => Err(Status::invalid_request(format!(
                "{} is a simple family; no group allowed",
                raw.family
            ))),
            (FamilyKind::Simple, None) | (FamilyKind::Super, None) => Ok(ScopePath::Family {
                family: raw.family.clone(),
            }),
            (FamilyKind::Super, Some(group)) => Ok(ScopePath::Group {
                family: raw.family.clone(),
                group: group.clone(),
            }),
        }
    }

    pub fn family_name(&self) -> &str {
        match self {
            ScopePath::Family { family } => family,
            ScopePath::Group { family, .. } => family,
        }
    }
}

/// Deletion target: whole family, whole group, or single leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletePath {
    Family {
        family: String,
    },
    Group {
        family: String,
        group: Slice,
    },
    SimpleColumn {
        family: String,
        column: Slice,
    },
    SuperColumn {
        family: String,
        group: Slice,
        column: Slice,
    },
}

impl DeletePath {
    pub fn resolve(def: &TableDef, raw: &RawPath) -> Result<Self> {
        let kind = def.family_kind(&raw.family)?;
        match kind {
            FamilyKind::Simple => {
                if raw.group.is_some() {
                    return Err(Status::invalid_request(format!(
                        "{} is a simple family; no group allowed",
                        raw.family
                    )));
                }
                Ok(match &raw.column {
                    Some(column) => DeletePath::SimpleColumn {
                        family: raw.family.clone(),
                        column: column.clone(),
                    },
                    None => DeletePath::Family {
                        family: raw.family.clone(),
                    },
                })
            }
            FamilyKind::Super => match (&raw.group, &raw.column) {
                (None, Some(_)) => Err(Status::invalid_request(format!(
                    "deleting a column of super family {} requires its group",
                    raw.family
                ))),
                (None, None) => Ok(DeletePath::Family {
                    family: raw.family.clone(),
                }),
                (Some(group), None) => Ok(DeletePath::Group {
                    family: raw.family.clone(),
                    group: group.clone(),
                }),
                (Some(group), Some(column)) => Ok(DeletePath::SuperColumn {
                    family: raw.family.clone(),
                    group: group.clone(),
                    column: column.clone(),
                }),
            },
        }
    }

    pub fn family_name(&self) -> &str {
        match self {
            DeletePath::Family { family } => family,
            DeletePath::Group { family, .. } => family,
            DeletePath::SimpleColumn { family, .. } => family,
            DeletePath::SuperColumn { family, .. } => family,
        }
    }
}
