//! Rectangular region layouts for spatial histograms.

use crate::util::{ImgMatchError, ImgMatchResult};

/// Axis-aligned pixel rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole image.
    pub fn full(width: usize, height: usize) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Checks that the rectangle is non-empty and lies inside the image.
    pub fn check_within(&self, img_width: usize, img_height: usize) -> ImgMatchResult<()> {
        let err = ImgMatchError::RegionOutOfBounds {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            img_width,
            img_height,
        };
        if self.width == 0 || self.height == 0 {
            return Err(err);
        }
        let end_x = self.x.checked_add(self.width).ok_or_else(|| err.clone())?;
        let end_y = self.y.checked_add(self.height).ok_or_else(|| err.clone())?;
        if end_x > img_width || end_y > img_height {
            return Err(err);
        }
        Ok(())
    }
}

/// How an image is partitioned into non-overlapping regions.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RegionLayout {
    /// Top and bottom halves, split on row `height / 2`.
    ///
    /// Both halves are `height / 2` rows tall, so the last row of an odd-height
    /// image is not covered.
    #[default]
    Halves,
    /// Equal cells in row-major order; remainder pixels are dropped.
    Grid { columns: usize, rows: usize },
    /// Explicit pixel rectangles in the given order.
    Rects(Vec<Rect>),
}

impl RegionLayout {
    /// Number of regions this layout yields.
    pub fn len(&self) -> usize {
        match self {
            RegionLayout::Halves => 2,
            RegionLayout::Grid { columns, rows } => columns * rows,
            RegionLayout::Rects(rects) => rects.len(),
        }
    }

    /// Returns true when the layout has no regions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolves the layout into validated rectangles for an image size.
    pub fn resolve(&self, width: usize, height: usize) -> ImgMatchResult<Vec<Rect>> {
        let rects = match self {
            RegionLayout::Halves => grid_cells(width, height, 1, 2)?,
            RegionLayout::Grid { columns, rows } => grid_cells(width, height, *columns, *rows)?,
            RegionLayout::Rects(rects) => rects.clone(),
        };
        if rects.is_empty() {
            return Err(ImgMatchError::InvalidInput("region layout has no regions"));
        }
        for rect in &rects {
            rect.check_within(width, height)?;
        }
        Ok(rects)
    }
}

fn grid_cells(
    width: usize,
    height: usize,
    columns: usize,
    rows: usize,
) -> ImgMatchResult<Vec<Rect>> {
    if columns == 0 || rows == 0 {
        return Err(ImgMatchError::InvalidInput(
            "grid layout needs at least one column and row",
        ));
    }
    let cell_w = width / columns;
    let cell_h = height / rows;
    let mut cells = Vec::with_capacity(columns * rows);
    for row in 0..rows {
        for col in 0..columns {
            cells.push(Rect::new(col * cell_w, row * cell_h, cell_w, cell_h));
        }
    }
    Ok(cells)
}
