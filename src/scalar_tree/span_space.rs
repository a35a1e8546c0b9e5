//! Span space scalar tree

use crate::grid::DataArray;
use crate::scalar_tree::{batch, cell_ranges, fill_cell, number_of_batches, TreeInput};
use crate::traits::{DataSet, ScalarTree};
use crate::types::{Error, Result};
use log::{debug, error};
use rayon::prelude::*;
use std::ops::Range;

/// The bins of span space that can hold cells containing a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanRectangle {
    /// Bins along the max-scalar axis
    pub rows: Range<usize>,
    /// Bins along the min-scalar axis
    pub columns: Range<usize>,
}

/// A scalar tree that bins cells in span space
///
/// Each cell is a point (min, max) in span space. Span space is divided into a grid of N x N bins and
/// the cells are sorted by bin, so that the cells containing a value `v` (those with `min <= v <= max`)
/// are found in a rectangle of bins: every row of the rectangle is a contiguous run of cells.
#[derive(Debug, Clone)]
pub struct SpanSpace {
    input: TreeInput,
    resolution: usize,
    compute_resolution: bool,
    number_of_cells_per_bucket: usize,
    scalar_range: [f64; 2],
    compute_scalar_range: bool,
    batch_size: usize,

    dimension: usize,
    range: [f64; 2],
    offsets: Vec<usize>,
    cell_ids: Vec<usize>,

    rectangle: Option<SpanRectangle>,
    row: usize,
    current: Range<usize>,
    candidates: Vec<usize>,
    number_of_batches: usize,
}

impl Default for SpanSpace {
    fn default() -> Self {
        Self {
            input: TreeInput::default(),
            resolution: 100,
            compute_resolution: true,
            number_of_cells_per_bucket: 5,
            scalar_range: [0.0, 1.0],
            compute_scalar_range: true,
            batch_size: 100,
            dimension: 0,
            range: [0.0, 0.0],
            offsets: vec![],
            cell_ids: vec![],
            rectangle: None,
            row: 0,
            current: 0..0,
            candidates: vec![],
            number_of_batches: 0,
        }
    }
}

impl SpanSpace {
    /// Create a span space tree with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of bins along each axis. Only used if the resolution is not computed.
    pub fn set_resolution(&mut self, resolution: usize) {
        self.resolution = resolution.clamp(1, 10000);
        self.input.reset_build();
    }

    /// Get the resolution setting
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Choose the resolution from the number of cells
    pub fn set_compute_resolution(&mut self, compute: bool) {
        self.compute_resolution = compute;
        self.input.reset_build();
    }

    /// Is the resolution chosen from the number of cells?
    pub fn compute_resolution(&self) -> bool {
        self.compute_resolution
    }

    /// Set the average number of cells per bin used when computing the resolution
    pub fn set_number_of_cells_per_bucket(&mut self, cells: usize) {
        self.number_of_cells_per_bucket = cells.max(1);
        self.input.reset_build();
    }

    /// Get the average number of cells per bin used when computing the resolution
    pub fn number_of_cells_per_bucket(&self) -> usize {
        self.number_of_cells_per_bucket
    }

    /// Set the scalar range. Only used if the scalar range is not computed.
    pub fn set_scalar_range(&mut self, range: [f64; 2]) {
        self.scalar_range = range;
        self.input.reset_build();
    }

    /// Get the scalar range setting
    pub fn scalar_range(&self) -> [f64; 2] {
        self.scalar_range
    }

    /// Compute the scalar range from the scalars
    pub fn set_compute_scalar_range(&mut self, compute: bool) {
        self.compute_scalar_range = compute;
        self.input.reset_build();
    }

    /// Is the scalar range computed from the scalars?
    pub fn compute_scalar_range(&self) -> bool {
        self.compute_scalar_range
    }

    /// Set the number of cells per batch (at least 100)
    pub fn set_batch_size(&mut self, batch_size: usize) {
        self.batch_size = batch_size.max(100);
    }

    /// Get the number of cells per batch
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// The number of bins along each axis used by the last build
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The scalar range used by the last build
    pub fn built_scalar_range(&self) -> [f64; 2] {
        self.range
    }

    /// The rectangle of bins holding the cells that may contain `value`
    ///
    /// Returns `None` if the tree has not been built or if the value is outside the scalar range.
    pub fn span_rectangle(&self, value: f64) -> Option<SpanRectangle> {
        let n = self.dimension;
        let [min, max] = self.range;
        if n == 0 || !(min..=max).contains(&value) {
            return None;
        }
        let i = ((n as f64) * (value - min) / (max - min)).floor() as usize;
        let i = usize::min(i, n - 1);
        Some(SpanRectangle {
            rows: i..n,
            columns: 0..i + 1,
        })
    }

    /// The cells of one row of a rectangle
    fn row_cells(&self, row: usize, columns: &Range<usize>) -> Range<usize> {
        let n = self.dimension;
        self.offsets[row * n + columns.start]..self.offsets[row * n + columns.end]
    }

    fn build(&mut self) -> Result<()> {
        let (ds, scalars) = self.input.validate()?;
        let range = if self.compute_scalar_range {
            scalars.range(0).ok_or(Error::NoScalars)?
        } else {
            (self.scalar_range[0], self.scalar_range[1])
        };
        if !(range.1 > range.0) {
            return Err(Error::BadScalarRange {
                min: range.0,
                max: range.1,
            });
        }
        let ncells = ds.number_of_cells();
        let dimension = if self.compute_resolution {
            let d = ((ncells as f64) / (self.number_of_cells_per_bucket as f64)).sqrt() as usize;
            d.clamp(100, 10000)
        } else {
            self.resolution
        };
        let (offsets, cell_ids) = bin_cells(&*ds, scalars, dimension, [range.0, range.1]);
        debug!(
            "Built span space over {ncells} cells with {dimension}x{dimension} bins, scalar range [{}, {}]",
            range.0, range.1
        );
        self.dimension = dimension;
        self.range = [range.0, range.1];
        self.offsets = offsets;
        self.cell_ids = cell_ids;
        Ok(())
    }

    fn clear_query(&mut self) {
        self.rectangle = None;
        self.current = 0..0;
        self.candidates.clear();
        self.number_of_batches = 0;
    }
}

/// Sort the cells by span space bin. Returns the bin offsets and the sorted cell ids.
fn bin_cells(
    ds: &dyn DataSet,
    scalars: &DataArray,
    dimension: usize,
    range: [f64; 2],
) -> (Vec<usize>, Vec<usize>) {
    let n = dimension as f64;
    let width = range[1] - range[0];
    let max_bin = dimension - 1;
    let bin = |x: f64| {
        let b = (n * (x - range[0]) / width).floor();
        if b.is_nan() || b < 0.0 {
            0
        } else {
            usize::min(b as usize, max_bin)
        }
    };
    let mut tuples = cell_ranges(ds, scalars)
        .into_par_iter()
        .enumerate()
        .map(|(cell, [lo, hi])| (bin(lo) + bin(hi) * dimension, cell))
        .collect::<Vec<_>>();
    tuples.par_sort_unstable();

    let mut offsets = vec![0; dimension * dimension + 1];
    for (b, _) in &tuples {
        offsets[b + 1] += 1;
    }
    for i in 0..dimension * dimension {
        offsets[i + 1] += offsets[i];
    }
    let cell_ids = tuples.into_par_iter().map(|(_, cell)| cell).collect();
    (offsets, cell_ids)
}

impl ScalarTree for SpanSpace {
    fn input(&self) -> &TreeInput {
        &self.input
    }

    fn input_mut(&mut self) -> &mut TreeInput {
        &mut self.input
    }

    fn build_tree(&mut self) -> Result<()> {
        if !self.input.needs_rebuild() {
            return Ok(());
        }
        self.initialize();
        self.build()?;
        self.input.mark_built();
        Ok(())
    }

    fn initialize(&mut self) {
        self.dimension = 0;
        self.range = [0.0, 0.0];
        self.offsets = vec![];
        self.cell_ids = vec![];
        self.clear_query();
        self.input.reset_build();
    }

    fn init_traversal(&mut self, value: f64) {
        self.clear_query();
        if let Err(e) = self.build_tree() {
            error!("{e}");
            return;
        }
        self.rectangle = self.span_rectangle(value);
        if let Some(rect) = &self.rectangle {
            self.row = rect.rows.start;
            self.current = self.row_cells(self.row, &rect.columns);
        }
    }

    fn next_cell(
        &mut self,
        point_ids: &mut Vec<usize>,
        cell_scalars: &mut Vec<f64>,
    ) -> Option<usize> {
        let rect = self.rectangle.clone()?;
        loop {
            if let Some(index) = self.current.next() {
                let cell = self.cell_ids[index];
                let ds = self.input.data_set()?;
                let scalars = self.input.scalars()?;
                fill_cell(&**ds, scalars, cell, point_ids, cell_scalars);
                return Some(cell);
            }
            self.row += 1;
            if self.row >= rect.rows.end {
                self.rectangle = None;
                return None;
            }
            self.current = self.row_cells(self.row, &rect.columns);
        }
    }

    fn number_of_cell_batches(&mut self, value: f64) -> usize {
        self.clear_query();
        if let Err(e) = self.build_tree() {
            error!("{e}");
            return 0;
        }
        let Some(rect) = self.span_rectangle(value) else {
            return 0;
        };
        let mut candidates = std::mem::take(&mut self.candidates);
        for row in rect.rows.clone() {
            candidates.extend_from_slice(&self.cell_ids[self.row_cells(row, &rect.columns)]);
        }
        self.candidates = candidates;
        self.number_of_batches = number_of_batches(self.candidates.len(), self.batch_size);
        self.number_of_batches
    }

    fn cell_batch(&self, index: usize) -> &[usize] {
        if index >= self.number_of_batches {
            return &[];
        }
        batch(&self.candidates, self.batch_size, index)
    }

    fn new_instance(&self) -> Box<dyn ScalarTree> {
        Box::new(Self {
            resolution: self.resolution,
            compute_resolution: self.compute_resolution,
            number_of_cells_per_bucket: self.number_of_cells_per_bucket,
            scalar_range: self.scalar_range,
            compute_scalar_range: self.compute_scalar_range,
            batch_size: self.batch_size,
            ..Self::default()
        })
    }
}
