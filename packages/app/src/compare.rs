//! Side-by-side comparison of saved properties.
//!
//! The table is transposed: one column per property, one row per
//! attribute. The property with the lowest price per square foot is the
//! best value; on a tie the first in selection order wins.

use std::fmt;
use std::ops::RangeInclusive;

use realty_map_models::FavoriteProperty;

use crate::format::{self, CURRENCY, RUPEES_PER_LAKH};
use crate::notice::{Notice, ToNotice};

/// How many properties can be compared at once.
pub const SELECTION_LIMITS: RangeInclusive<usize> = 2..=4;

/// Errors from [`compare`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompareError {
    /// The selection is outside [`SELECTION_LIMITS`].
    #[error("{}", selection_message(.selected))]
    SelectionSize {
        /// Number of properties selected.
        selected: usize,
    },

    /// A selected id is not in the favorites list.
    #[error("Favorite {0} is no longer saved. Refresh your favorites and try again.")]
    UnknownFavorite(i64),
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn selection_message(selected: &usize) -> &'static str {
    if selected < SELECTION_LIMITS.start() {
        "Please select at least 2 properties to compare."
    } else {
        "You can compare up to 4 properties at a time."
    }
}

impl ToNotice for CompareError {
    fn to_notice(&self) -> Notice {
        match self {
            Self::SelectionSize { .. } => Notice::validation(self.to_string()),
            Self::UnknownFavorite(_) => Notice::error(self.to_string()),
        }
    }
}

/// One cell of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonCell {
    /// Display text.
    pub text: String,
    /// Set on the best-value price-per-area cell only.
    pub best_value: bool,
}

impl ComparisonCell {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            best_value: false,
        }
    }
}

/// One attribute across every compared property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRow {
    /// Attribute name.
    pub label: &'static str,
    /// One cell per column.
    pub cells: Vec<ComparisonCell>,
}

/// The comparison output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonTable {
    /// Location of each compared property, in selection order.
    pub headers: Vec<String>,
    /// Attribute rows.
    pub rows: Vec<ComparisonRow>,
    /// Column of the best-value property.
    pub best_index: usize,
}

impl ComparisonTable {
    /// Number of compared properties.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.headers.len()
    }
}

impl fmt::Display for ComparisonTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell_text = |cell: &ComparisonCell| {
            if cell.best_value {
                format!("{} *", cell.text)
            } else {
                cell.text.clone()
            }
        };

        let label_width = self
            .rows
            .iter()
            .map(|r| r.label.chars().count())
            .max()
            .unwrap_or(0);
        let widths: Vec<usize> = (0..self.columns())
            .map(|i| {
                self.rows
                    .iter()
                    .filter_map(|r| r.cells.get(i))
                    .map(|c| cell_text(c).chars().count())
                    .chain(std::iter::once(self.headers[i].chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:label_width$}", "")?;
        for (header, width) in self.headers.iter().zip(&widths) {
            write!(f, " | {header:width$}")?;
        }
        writeln!(f)?;

        for row in &self.rows {
            write!(f, "{:label_width$}", row.label)?;
            for (cell, width) in row.cells.iter().zip(&widths) {
                write!(f, " | {:width$}", cell_text(cell))?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Index of the lowest price per area; the first one wins a tie.
fn best_value_index(properties: &[&FavoriteProperty]) -> usize {
    let mut best_index = 0;
    let mut best_ratio = f64::INFINITY;

    for (i, property) in properties.iter().enumerate() {
        let ratio = property.price_per_area();
        if ratio < best_ratio {
            best_ratio = ratio;
            best_index = i;
        }
    }

    best_index
}

/// Rupees per square foot, rounded.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn rupees_per_area(property: &FavoriteProperty) -> String {
    let ratio = property.price_per_area() * RUPEES_PER_LAKH;
    if ratio.is_finite() {
        format!("{CURRENCY}{}", format::group_indian(ratio.abs().round() as u64))
    } else {
        "-".to_string()
    }
}

/// Builds the comparison table for `selected`, in the given order.
///
/// # Errors
///
/// Returns [`CompareError::SelectionSize`] unless 2 to 4 ids are selected,
/// or [`CompareError::UnknownFavorite`] if an id is not in `favorites`.
pub fn compare(
    favorites: &[FavoriteProperty],
    selected: &[i64],
) -> Result<ComparisonTable, CompareError> {
    if !SELECTION_LIMITS.contains(&selected.len()) {
        return Err(CompareError::SelectionSize {
            selected: selected.len(),
        });
    }

    let properties = selected
        .iter()
        .map(|id| {
            favorites
                .iter()
                .find(|f| f.id == *id)
                .ok_or(CompareError::UnknownFavorite(*id))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let best_index = best_value_index(&properties);

    let row = |label: &'static str, text: &dyn Fn(&FavoriteProperty) -> String| ComparisonRow {
        label,
        cells: properties
            .iter()
            .map(|p| ComparisonCell::plain(text(*p)))
            .collect(),
    };

    let mut price_per_area = row("Price / Sqft", &rupees_per_area);
    price_per_area.cells[best_index].best_value = true;

    let rows = vec![
        row("Price", &|p: &FavoriteProperty| {
            format!("{CURRENCY}{} L", p.price)
        }),
        row("Area (Sqft)", &|p: &FavoriteProperty| p.area.to_string()),
        price_per_area,
        row("BHK", &|p: &FavoriteProperty| p.room_count.to_string()),
        row("Bathrooms", &|p: &FavoriteProperty| p.bath_count.to_string()),
        row("Age", &|p: &FavoriteProperty| format!("{} Years", p.property_age)),
    ];

    Ok(ComparisonTable {
        headers: properties.iter().map(|p| p.location.clone()).collect(),
        rows,
        best_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::favorite;

    fn saved() -> Vec<FavoriteProperty> {
        vec![
            favorite(1, "Hebbal", 1000.0, 50.0),
            favorite(2, "Whitefield", 1200.0, 48.0),
            favorite(3, "Indiranagar", 2000.0, 80.0),
            favorite(4, "Jayanagar", 1500.0, 90.0),
            favorite(5, "Yelahanka", 1100.0, 40.0),
        ]
    }

    #[test]
    fn one_selected_is_rejected() {
        let err = compare(&saved(), &[1]).unwrap_err();
        assert_eq!(err, CompareError::SelectionSize { selected: 1 });
        assert_eq!(
            err.to_string(),
            "Please select at least 2 properties to compare."
        );
    }

    #[test]
    fn five_selected_is_rejected() {
        let err = compare(&saved(), &[1, 2, 3, 4, 5]).unwrap_err();
        assert_eq!(err, CompareError::SelectionSize { selected: 5 });
        assert_eq!(err.to_string(), "You can compare up to 4 properties at a time.");
    }

    #[test]
    fn two_and_four_selected_give_that_many_columns() {
        let table = compare(&saved(), &[1, 2]).unwrap();
        assert_eq!(table.columns(), 2);
        assert!(table.rows.iter().all(|r| r.cells.len() == 2));

        let table = compare(&saved(), &[4, 3, 2, 1]).unwrap();
        assert_eq!(table.columns(), 4);
        assert_eq!(table.headers[0], "Jayanagar");
        assert!(table.rows.iter().all(|r| r.cells.len() == 4));
    }

    #[test]
    fn lowest_price_per_area_is_best_value() {
        // 0.05, 0.04, 0.04 lakh per sqft: Whitefield ties Indiranagar and
        // comes first.
        let table = compare(&saved(), &[1, 2, 3]).unwrap();
        assert_eq!(table.best_index, 1);

        let row = table.rows.iter().find(|r| r.label == "Price / Sqft").unwrap();
        let flagged: Vec<bool> = row.cells.iter().map(|c| c.best_value).collect();
        assert_eq!(flagged, [false, true, false]);
        assert_eq!(row.cells[1].text, "₹4,000");
    }

    #[test]
    fn tie_goes_to_first_in_selection_order() {
        let favorites = vec![
            favorite(1, "A", 1000.0, 50.0),
            favorite(2, "B", 1000.0, 50.0),
        ];
        assert_eq!(compare(&favorites, &[2, 1]).unwrap().best_index, 0);
        assert_eq!(compare(&favorites, &[2, 1]).unwrap().headers[0], "B");
    }

    #[test]
    fn unknown_id_fails() {
        let err = compare(&saved(), &[1, 42]).unwrap_err();
        assert_eq!(err, CompareError::UnknownFavorite(42));
    }

    #[test]
    fn price_row_shows_stored_value() {
        let favorites = vec![
            favorite(1, "A", 1000.0, 42.5),
            favorite(2, "B", 1000.0, 60.0),
        ];
        let table = compare(&favorites, &[1, 2]).unwrap();
        assert_eq!(table.rows[0].cells[0].text, "₹42.5 L");
        assert_eq!(table.rows[0].cells[1].text, "₹60 L");
    }

    #[test]
    fn rows_are_formatted() {
        let table = compare(&saved(), &[1, 2]).unwrap();
        let labels: Vec<&str> = table.rows.iter().map(|r| r.label).collect();
        assert_eq!(
            labels,
            ["Price", "Area (Sqft)", "Price / Sqft", "BHK", "Bathrooms", "Age"]
        );
        assert_eq!(table.rows[0].cells[0].text, "₹50 L");
        assert_eq!(table.rows[1].cells[0].text, "1000");
        assert_eq!(table.rows[5].cells[0].text, "5 Years");

        let rendered = table.to_string();
        assert!(rendered.contains("Hebbal"));
        assert!(rendered.contains("₹4,000 *"));
    }
}
