//! Source categories and their map marker colours.

use crate::table::{Cell, Table};

/// Column holding the category label of each record.
pub const DIR_TYPE: &str = "dir_type";

/// Column holding the marker colour of each record.
pub const MARKER_COLOR: &str = "marker-color";

/// One of the four sample tables a record can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    MetagenomeAnthropogenic,
    MetagenomeEnvironmental,
    MetagenomeHostAssociated,
    SingleGenomeHostAssociated,
}

impl Category {
    /// All categories in merge order.
    pub const ALL: [Category; 4] = [
        Category::MetagenomeAnthropogenic,
        Category::MetagenomeEnvironmental,
        Category::MetagenomeHostAssociated,
        Category::SingleGenomeHostAssociated,
    ];

    /// Label written to the `dir_type` column.
    pub fn label(self) -> &'static str {
        match self {
            Category::MetagenomeAnthropogenic => "Ancient Metagenome - Anthropogenic",
            Category::MetagenomeEnvironmental => "Ancient Metagenome - Environmental",
            Category::MetagenomeHostAssociated => "Ancient Metagenome - Host-associated",
            Category::SingleGenomeHostAssociated => "Ancient Single-genome - Host-associated",
        }
    }

    /// Marker colour for the category.
    ///
    /// | Category                                | Colour  |
    /// |-----------------------------------------|---------|
    /// | Ancient Metagenome - Anthropogenic      | #E7D400 |
    /// | Ancient Metagenome - Environmental      | #4AAE72 |
    /// | Ancient Metagenome - Host-associated    | #8AD5F7 |
    /// | Ancient Single-genome - Host-associated | #D3498E |
    pub fn color(self) -> &'static str {
        match self {
            Category::MetagenomeAnthropogenic => "#E7D400",
            Category::MetagenomeEnvironmental => "#4AAE72",
            Category::MetagenomeHostAssociated => "#8AD5F7",
            Category::SingleGenomeHostAssociated => "#D3498E",
        }
    }

    pub fn from_label(label: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.label() == label)
    }
}

/// Appends a `marker-color` column looked up from each row's `dir_type`.
///
/// Rows with a missing or unknown label get a null colour.
pub fn assign_colors(table: &mut Table) {
    let dir_type = table.column_index(DIR_TYPE);

    let colors: Vec<Cell> = table
        .rows()
        .iter()
        .map(|row| {
            dir_type
                .and_then(|i| row[i].as_text())
                .and_then(Category::from_label)
                .map(|c| Cell::Text(c.color().to_string()))
                .unwrap_or(Cell::Null)
        })
        .collect();

    table.push_column(MARKER_COLOR, colors);
}
