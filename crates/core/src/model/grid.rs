use std::collections::HashMap;

use heatmap_cat_protocol::SharedStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::cell::Cell;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("heatmap has no selectable cells")]
    Empty,
    #[error("duplicate cell id: {0}")]
    DuplicateCell(SharedStr),
    #[error("cell {0} has negative or out-of-range geometry")]
    InvalidGeometry(SharedStr),
}

/// Knobs a grid document may carry alongside its cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorOptions {
    /// Id of the background rectangle, excluded from all selection logic.
    pub background: SharedStr,
    pub overlay_opacity: f32,
}

impl Default for SelectorOptions {
    fn default() -> Self {
        Self {
            background: SharedStr::from("bkg"),
            overlay_opacity: 0.2,
        }
    }
}

/// Vertical extent of every selectable cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    pub min_y: i32,
    pub max_y: i32,
}

impl GridBounds {
    /// Scan the selectable cells once. Fails on an empty set, where the
    /// extent is undefined.
    pub fn compute<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> Result<Self, GridError> {
        cells
            .into_iter()
            .fold(None, |acc: Option<GridBounds>, cell| {
                Some(match acc {
                    None => GridBounds {
                        min_y: cell.y,
                        max_y: cell.bottom(),
                    },
                    Some(b) => GridBounds {
                        min_y: b.min_y.min(cell.y),
                        max_y: b.max_y.max(cell.bottom()),
                    },
                })
            })
            .ok_or(GridError::Empty)
    }

}

/// The rendered heatmap as handed over by the upstream generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    #[serde(flatten)]
    pub options: SelectorOptions,
    pub cells: Vec<Cell>,
    #[serde(skip)]
    index: HashMap<SharedStr, usize>,
}

impl Grid {
    pub fn new(cells: Vec<Cell>, options: SelectorOptions) -> Result<Self, GridError> {
        let mut grid = Self {
            options,
            cells,
            index: HashMap::new(),
        };
        grid.reindex()?;
        Ok(grid)
    }

    /// Parse a grid document (`{"background": .., "cells": [..]}`).
    pub fn from_json(data: &[u8]) -> Result<Self, GridDocumentError> {
        let mut grid: Grid = serde_json::from_slice(data)?;
        grid.reindex()?;
        Ok(grid)
    }

    fn reindex(&mut self) -> Result<(), GridError> {
        self.index.clear();
        for (i, cell) in self.cells.iter().enumerate() {
            if !has_valid_geometry(cell) {
                return Err(GridError::InvalidGeometry(cell.id.clone()));
            }
            if self.index.insert(cell.id.clone(), i).is_some() {
                return Err(GridError::DuplicateCell(cell.id.clone()));
            }
        }
        Ok(())
    }

    pub fn background(&self) -> &SharedStr {
        &self.options.background
    }

    pub fn is_selectable(&self, id: &str) -> bool {
        id != self.options.background.as_str() && self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Cell> {
        self.index.get(id).map(|&i| &self.cells[i])
    }

    pub fn selectable(&self) -> impl Iterator<Item = &Cell> {
        let bkg = self.options.background.clone();
        self.cells.iter().filter(move |c| c.id != bkg)
    }

    /// Topmost selectable cell containing the pixel, if any.
    pub fn hit_test(&self, x: i32, y: i32) -> Option<&Cell> {
        self.selectable().find(|c| c.rect().contains(x, y))
    }

    pub fn bounds(&self) -> Result<GridBounds, GridError> {
        GridBounds::compute(self.selectable())
    }
}

/// Pixel geometry is non-negative and its far edges fit in `i32`, so edge
/// and extent arithmetic on indexed cells cannot overflow.
fn has_valid_geometry(cell: &Cell) -> bool {
    let non_negative = cell.x >= 0 && cell.y >= 0 && cell.width >= 0 && cell.height >= 0;
    non_negative
        && cell.x.checked_add(cell.width).is_some()
        && cell.y.checked_add(cell.height).is_some()
}

#[derive(Debug, Error)]
pub enum GridDocumentError {
    #[error("invalid grid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Grid(#[from] GridError),
}
