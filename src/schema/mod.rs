//! Declared table schemas.
//!
//! A table fixes the set of column families a row may hold and the kind of
//! each family. The schema is immutable once a store is opened; requests
//! naming an undeclared family are rejected at the boundary.
//!
//! Definitions are serde-derived so surrounding infrastructure can ship them
//! as JSON documents.

use serde::{Deserialize, Serialize};

use crate::util::{Result, Status};

/// Kind of a declared column family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FamilyKind {
    /// Flat column-name → column map
    Simple,
    /// Two-level group-name → column map
    Super,
}

/// Declaration of one column family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyDef {
    pub name: String,
    pub kind: FamilyKind,
}

impl FamilyDef {
    pub fn new<S: Into<String>>(name: S, kind: FamilyKind) -> Self {
        FamilyDef {
            name: name.into(),
            kind,
        }
    }

    pub fn simple<S: Into<String>>(name: S) -> Self {
        FamilyDef::new(name, FamilyKind::Simple)
    }

    pub fn super_family<S: Into<String>>(name: S) -> Self {
        FamilyDef::new(name, FamilyKind::Super)
    }
}

/// Declaration of one table: a named collection of family schemas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDef {
    pub name: String,
    pub families: Vec<FamilyDef>,
}

impl TableDef {
    pub fn new<S: Into<String>>(name: S, families: Vec<FamilyDef>) -> Self {
        TableDef {
            name: name.into(),
            families,
        }
    }

    pub fn family(&self, name: &str) -> Option<&FamilyDef> {
        self.families.iter().find(|f| f.name == name)
    }

    /// Kind of the named family, or `InvalidRequest` if undeclared.
    pub fn family_kind(&self, name: &str) -> Result<FamilyKind> {
        self.family(name)
            .map(|f| f.kind)
            .ok_or_else(|| Status::invalid_request(format!("no such column family: {name}")))
    }
}

/// Parse a schema document: a JSON array of table definitions.
pub fn tables_from_json(json: &str) -> Result<Vec<TableDef>> {
    let tables: Vec<TableDef> = serde_json::from_str(json)?;
    Ok(tables)
}

/// Load a schema document from a file path.
pub fn tables_from_json_file(path: impl AsRef<std::path::Path>) -> Result<Vec<TableDef>> {
    let json = std::fs::read_to_string(path)?;
    tables_from_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table1() -> TableDef {
        TableDef::new(
            "Table1",
            vec![
                FamilyDef::simple("Standard1"),
                FamilyDef::simple("Standard2"),
                FamilyDef::super_family("Super1"),
            ],
        )
    }

    #[test]
    fn test_family_lookup() {
        let def = table1();
        assert_eq!(def.family_kind("Standard1").unwrap(), FamilyKind::Simple);
        assert_eq!(def.family_kind("Super1").unwrap(), FamilyKind::Super);
    }

    #[test]
    fn test_unknown_family_is_invalid_request() {
        let def = table1();
        let err = def.family_kind("Standard9").unwrap_err();
        assert!(err.is_invalid_request());
    }

    #[test]
    fn test_json_round_trip() {
        let def = table1();
        let json = serde_json::to_string(&vec![def.clone()]).unwrap();
        let parsed = tables_from_json(&json).unwrap();
        assert_eq!(parsed, vec![def]);
    }

    #[test]
    fn test_bad_json_is_corruption() {
        let err = tables_from_json("{not json").unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("schema.json");
        let json = serde_json::to_string(&vec![table1()]).unwrap();
        std::fs::write(&path, json).unwrap();

        let tables = tables_from_json_file(&path).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "Table1");
    }
}
