use std::collections::BTreeSet;

use foundation::ids::AxisLabel;
use matching::{ContingencyMatrix, CorrespondenceOrdering};
use serde::Serialize;

use crate::palette::{CELL_FADED_OPACITY, CELL_SELECTED_STROKE, LinearScale, Rgb};
use crate::selection::{CellFocus, Highlight, SelectionEvent};
use crate::views::HighlightTarget;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellInstruction {
    /// Column position in the ordered axis.
    pub x: usize,
    /// Row position in the ordered axis.
    pub y: usize,
    pub row: AxisLabel,
    pub col: AxisLabel,
    pub value: u64,
    pub fill: Rgb,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Rgb>,
    pub opacity: f64,
}

/// The contingency matrix drawn with greedily matched axes.
#[derive(Debug, Clone)]
pub struct TableView {
    matrix: ContingencyMatrix,
    ordering: CorrespondenceOrdering,
    scale: LinearScale,
    focus: BTreeSet<CellFocus>,
}

impl TableView {
    pub fn new(matrix: ContingencyMatrix, ordering: CorrespondenceOrdering) -> Self {
        Self {
            matrix,
            ordering,
            scale: LinearScale::cell_counts(),
            focus: BTreeSet::new(),
        }
    }

    pub fn ordering(&self) -> &CorrespondenceOrdering {
        &self.ordering
    }

    pub fn focus(&self) -> &BTreeSet<CellFocus> {
        &self.focus
    }

    /// Event for a click on the cell at ordered position (`x`, `y`).
    pub fn click(&self, x: usize, y: usize) -> Option<SelectionEvent> {
        let row = *self.ordering.rows.get(y)?;
        let col = *self.ordering.cols.get(x)?;
        Some(SelectionEvent::CellSelected {
            old: row,
            new: col,
            value: self.matrix.label_value(row, col),
        })
    }

    pub fn cells(&self) -> Vec<CellInstruction> {
        let mut cells = Vec::with_capacity(self.ordering.rows.len() * self.ordering.cols.len());
        for (y, &row) in self.ordering.rows.iter().enumerate() {
            for (x, &col) in self.ordering.cols.iter().enumerate() {
                let value = self.matrix.label_value(row, col);
                let selected = self.focus.iter().any(|f| f.covers(row, col));
                let (stroke, opacity) = match (self.focus.is_empty(), selected) {
                    (true, _) => (None, 1.0),
                    (false, true) => (Some(CELL_SELECTED_STROKE), 1.0),
                    (false, false) => (None, CELL_FADED_OPACITY),
                };
                cells.push(CellInstruction {
                    x,
                    y,
                    row,
                    col,
                    value,
                    fill: self.scale.color(value as f64),
                    stroke,
                    opacity,
                });
            }
        }
        cells
    }
}

impl HighlightTarget for TableView {
    fn apply(&mut self, highlight: &Highlight) {
        self.focus = highlight.cells.clone();
    }
}
