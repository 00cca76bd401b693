use std::collections::BTreeSet;

use crate::geometry::Rect;

pub const DEFAULT_CELL_SIZE: i32 = 64;

/// Index of a collider inside its owning [`CollisionGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColliderId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellRange {
    col_min: i32,
    col_max: i32,
    row_min: i32,
    row_max: i32,
}

/// Uniform-cell spatial hash over static rectangles.
///
/// Each collider is stored once; every cell it touches holds its id. Grids are
/// built once per map and never shrink, so there is no removal.
#[derive(Debug, Clone)]
pub struct CollisionGrid {
    cell_size: i32,
    cols: i32,
    rows: i32,
    colliders: Vec<Rect>,
    cells: Vec<Vec<ColliderId>>,
}

impl CollisionGrid {
    pub fn new(width_px: i32, height_px: i32) -> Self {
        Self::with_cell_size(width_px, height_px, DEFAULT_CELL_SIZE)
    }

    pub fn with_cell_size(width_px: i32, height_px: i32, cell_size: i32) -> Self {
        let cell_size = cell_size.max(1);
        let cols = ceil_div(width_px.max(0), cell_size);
        let rows = ceil_div(height_px.max(0), cell_size);
        Self {
            cell_size,
            cols,
            rows,
            colliders: Vec::new(),
            cells: vec![Vec::new(); cols as usize * rows as usize],
        }
    }

    pub fn dimensions(&self) -> (i32, i32) {
        (self.cols, self.rows)
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    pub fn collider(&self, id: ColliderId) -> Option<&Rect> {
        self.colliders.get(id.0 as usize)
    }

    pub fn colliders(&self) -> &[Rect] {
        &self.colliders
    }

    /// Stores `rect` and references it from every in-bounds cell it touches.
    /// Cells outside the grid are skipped; the collider is still stored.
    pub fn insert(&mut self, rect: Rect) -> ColliderId {
        let id = ColliderId(self.colliders.len() as u32);
        self.colliders.push(rect);
        let range = self.cell_range(&rect);
        for row in range.row_min..=range.row_max {
            for col in range.col_min..=range.col_max {
                if let Some(index) = self.cell_index(col, row) {
                    self.cells[index].push(id);
                }
            }
        }
        id
    }

    /// Ids of every collider referenced by a cell that `query` touches,
    /// deduplicated and in ascending id order.
    pub fn query_nearby(&self, query: &Rect) -> Vec<ColliderId> {
        let range = self.cell_range(query);
        let mut found = BTreeSet::new();
        for row in range.row_min..=range.row_max {
            for col in range.col_min..=range.col_max {
                if let Some(index) = self.cell_index(col, row) {
                    found.extend(self.cells[index].iter().copied());
                }
            }
        }
        found.into_iter().collect()
    }

    pub fn nearby_colliders<'a>(
        &'a self,
        query: &Rect,
    ) -> impl Iterator<Item = (ColliderId, &'a Rect)> + 'a {
        self.query_nearby(query)
            .into_iter()
            .filter_map(move |id| self.collider(id).map(|rect| (id, rect)))
    }

    fn cell_range(&self, rect: &Rect) -> CellRange {
        CellRange {
            col_min: rect.min_x.div_euclid(self.cell_size),
            col_max: (rect.max_x - 1).div_euclid(self.cell_size),
            row_min: rect.min_y.div_euclid(self.cell_size),
            row_max: (rect.max_y - 1).div_euclid(self.cell_size),
        }
    }

    fn cell_index(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || row < 0 || col >= self.cols || row >= self.rows {
            return None;
        }
        Some(row as usize * self.cols as usize + col as usize)
    }

    #[cfg(test)]
    fn cell(&self, col: i32, row: i32) -> &[ColliderId] {
        self.cell_index(col, row)
            .map(|index| self.cells[index].as_slice())
            .unwrap_or(&[])
    }
}

fn ceil_div(value: i32, divisor: i32) -> i32 {
    (value + divisor - 1) / divisor
}
