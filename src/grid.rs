//! Grid generation: split a bounding rectangle into rows x columns of zones.

use roi_geom::ZoneCoords;
use serde::{Deserialize, Serialize};

use crate::constants::MAX_GRID_CELLS;
use crate::error::EditorError;
use crate::model::{Zone, ZoneIdGenerator};

/// How generated zones are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingMode {
    /// `"{prefix} {n}"`, continuing after the zones that already exist
    #[default]
    Sequential,
    /// Row/column labels such as `"R1-M2"`
    Grid,
}

/// Label order for [`NamingMode::Grid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GridOrder {
    /// `"R{row}-M{col}"`
    #[default]
    #[serde(rename = "rows-cols")]
    RowsCols,
    /// `"M{col}-R{row}"`
    #[serde(rename = "cols-rows")]
    ColsRows,
}

/// Parameters for one grid generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridOptions {
    /// Number of rows
    pub rows: u32,
    /// Number of columns
    pub cols: u32,
    /// Naming scheme
    #[serde(default)]
    pub naming: NamingMode,
    /// Label order for grid naming
    #[serde(default)]
    pub order: GridOrder,
    /// Optional name prefix
    #[serde(default)]
    pub prefix: String,
}

impl GridOptions {
    /// Create grid options with sequential naming and no prefix.
    pub fn new(rows: u32, cols: u32) -> Self {
        Self {
            rows,
            cols,
            naming: NamingMode::default(),
            order: GridOrder::default(),
            prefix: String::new(),
        }
    }

    pub fn with_naming(mut self, naming: NamingMode) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_order(mut self, order: GridOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Validate parameters.
    pub fn validate(&self) -> Result<(), EditorError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(EditorError::InvalidGridSize {
                rows: self.rows,
                cols: self.cols,
            });
        }
        match self.rows.checked_mul(self.cols) {
            Some(cells) if cells <= MAX_GRID_CELLS => Ok(()),
            _ => Err(EditorError::GridTooLarge {
                rows: self.rows,
                cols: self.cols,
                max: MAX_GRID_CELLS,
            }),
        }
    }

    /// Get total number of cells.
    pub fn total_cells(&self) -> u32 {
        self.rows.saturating_mul(self.cols)
    }

    /// Name of the cell at 0-based (`row`, `col`).
    ///
    /// `sequence` is the 1-based running number used by sequential naming.
    pub fn cell_name(&self, row: u32, col: u32, sequence: usize) -> String {
        let prefix = self.prefix.trim();
        match self.naming {
            NamingMode::Sequential if prefix.is_empty() => sequence.to_string(),
            NamingMode::Sequential => format!("{} {}", prefix, sequence),
            NamingMode::Grid => {
                let label = match self.order {
                    GridOrder::RowsCols => format!("R{}-M{}", row + 1, col + 1),
                    GridOrder::ColsRows => format!("M{}-R{}", col + 1, row + 1),
                };
                if prefix.is_empty() {
                    label
                } else {
                    format!("{}-{}", prefix, label)
                }
            }
        }
    }
}

/// Split `bounds` into `rows * cols` equal cells in row-major order.
///
/// Each cell runs between two computed edges; the last row and column end on
/// the far edge of `bounds` so no cell pokes past the image.
pub fn cell_rects(bounds: &ZoneCoords, rows: u32, cols: u32) -> Vec<ZoneCoords> {
    if rows == 0 || cols == 0 {
        return Vec::new();
    }
    let right = bounds.right().min(1.0);
    let bottom = bounds.bottom().min(1.0);
    let col_edge = |col: u32| {
        if col == cols {
            right
        } else {
            bounds.x + bounds.w * f64::from(col) / f64::from(cols)
        }
    };
    let row_edge = |row: u32| {
        if row == rows {
            bottom
        } else {
            bounds.y + bounds.h * f64::from(row) / f64::from(rows)
        }
    };

    let mut cells = Vec::with_capacity((rows as usize) * (cols as usize));
    for row in 0..rows {
        for col in 0..cols {
            cells.push(ZoneCoords::from_edges(
                col_edge(col),
                row_edge(row),
                col_edge(col + 1),
                row_edge(row + 1),
            ));
        }
    }
    cells
}

/// Size of one cell when `bounds` is split into `rows * cols`.
pub fn cell_size(bounds: &ZoneCoords, rows: u32, cols: u32) -> (f64, f64) {
    (
        bounds.w / f64::from(cols.max(1)),
        bounds.h / f64::from(rows.max(1)),
    )
}

/// Generate one zone per grid cell.
///
/// `existing_count` is the number of saved zones already in the list;
/// sequential numbering starts right after it.
pub fn generate_grid(
    bounds: &ZoneCoords,
    options: &GridOptions,
    existing_count: usize,
    ids: &mut ZoneIdGenerator,
) -> Result<Vec<Zone>, EditorError> {
    options.validate()?;

    let zones: Vec<Zone> = cell_rects(bounds, options.rows, options.cols)
        .into_iter()
        .enumerate()
        .map(|(index, coords)| {
            let row = index as u32 / options.cols;
            let col = index as u32 % options.cols;
            let name = options.cell_name(row, col, existing_count + index + 1);
            Zone::new(ids.mint(), name, coords)
        })
        .collect();

    log::debug!(
        "Generated {}x{} grid ({} zones) inside {:?}",
        options.rows,
        options.cols,
        zones.len(),
        bounds
    );
    Ok(zones)
}
