//! The exportable columns and the user's choice among them.

use crate::errors::*;

/// One of the columns we know how to export, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Repository,
    Tag,
    Created,
    Size,
    SharedSize,
    VirtualSize,
    Containers,
    Labels,
}

impl Column {
    /// Every column, in the order used when none are requested.
    pub const ALL: [Column; 9] = [
        Column::Id,
        Column::Repository,
        Column::Tag,
        Column::Created,
        Column::Size,
        Column::SharedSize,
        Column::VirtualSize,
        Column::Containers,
        Column::Labels,
    ];

    /// The header text, which is also what users type to select it.
    pub fn name(self) -> &'static str {
        match self {
            Column::Id => "ID",
            Column::Repository => "Repository",
            Column::Tag => "Tag",
            Column::Created => "Created",
            Column::Size => "Size (MB)",
            Column::SharedSize => "SharedSize (MB)",
            Column::VirtualSize => "VirtualSize (MB)",
            Column::Containers => "Containers",
            Column::Labels => "Labels",
        }
    }

    /// Position of this column in a full row.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up a column by its exact (case-sensitive) name.
    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.iter().copied().find(|c| c.name() == name)
    }

    fn available() -> String {
        Column::ALL
            .iter()
            .map(|c| c.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The ordered list of columns to write.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSelection {
    columns: Vec<Column>,
}

impl ColumnSelection {
    /// All nine columns in canonical order.
    pub fn all() -> ColumnSelection {
        ColumnSelection {
            columns: Column::ALL.to_vec(),
        }
    }

    /// Parse a comma-separated list such as `"Repository, Tag"`. `None` or
    /// an empty string selects everything. The first unknown name is an
    /// error.
    pub fn parse(list: Option<&str>) -> Result<ColumnSelection> {
        let list = match list {
            Some(list) if !list.is_empty() => list,
            _ => return Ok(ColumnSelection::all()),
        };
        let columns = list
            .split(',')
            .map(|name| {
                let name = name.trim();
                Column::from_name(name).ok_or_else(|| {
                    Error::from(ErrorKind::InvalidColumn(
                        name.to_owned(),
                        Column::available(),
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ColumnSelection { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Header names, in selection order.
    pub fn header(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    /// Positions of the selected columns within a full row.
    pub fn indices(&self) -> Vec<usize> {
        self.columns.iter().map(|c| c.index()).collect()
    }

    /// Pick our columns out of a full, canonically ordered row.
    pub fn project<'a>(&self, row: &'a [String; 9]) -> Vec<&'a str> {
        self.columns.iter().map(|c| row[c.index()].as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_or_empty_selects_everything() {
        assert_eq!(ColumnSelection::parse(None).unwrap(), ColumnSelection::all());
        assert_eq!(
            ColumnSelection::parse(Some("")).unwrap(),
            ColumnSelection::all()
        );
        assert_eq!(ColumnSelection::all().indices(), (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn keeps_requested_order() {
        let sel = ColumnSelection::parse(Some("Tag, Size (MB) ,ID")).unwrap();
        assert_eq!(sel.header(), vec!["Tag", "Size (MB)", "ID"]);
        assert_eq!(sel.indices(), vec![2, 4, 0]);
    }

    #[test]
    fn every_canonical_name_round_trips() {
        for (i, column) in Column::ALL.iter().enumerate() {
            assert_eq!(Column::from_name(column.name()), Some(*column));
            assert_eq!(column.index(), i);
        }
    }

    #[test]
    fn names_are_case_sensitive() {
        let err = ColumnSelection::parse(Some("Repository,tag")).unwrap_err();
        match err.kind() {
            ErrorKind::InvalidColumn(name, available) => {
                assert_eq!(name, "tag");
                assert_eq!(
                    available,
                    "ID, Repository, Tag, Created, Size (MB), SharedSize (MB), \
                     VirtualSize (MB), Containers, Labels"
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn empty_entries_are_invalid() {
        assert!(ColumnSelection::parse(Some("ID,,Tag")).is_err());
        assert!(ColumnSelection::parse(Some(" ")).is_err());
    }

    #[test]
    fn projects_rows() {
        let row: [String; 9] = [
            "id", "repo", "tag", "1", "2.00", "0.00", "2.00", "0", "",
        ]
        .map(String::from);
        let sel = ColumnSelection::parse(Some("Repository,Tag")).unwrap();
        assert_eq!(sel.project(&row), vec!["repo", "tag"]);
    }
}
