//! Iso-contours of datasets with cells of any dimension

use crate::contour::extract::{edge_parameter, interpolate, CellCursor};
use crate::contour::point_locator::MergePoints;
use crate::contour::polygon_builder::PolygonBuilder;
use crate::contour::values::ContourValues;
use crate::element::case_table::{case_table, polygon_segments};
use crate::element::reference_cell::boundary_loop;
use crate::grid::{ArrayData, ArrayValue, CellArray, CellType, Coordinate, DataArray, Points, PolyData};
use crate::scalar_tree::SpanSpace;
use crate::traits::{DataSet, ScalarTree};
use crate::types::{Error, Precision, Result};
use log::{debug, error, warn};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Extract iso-contours from a dataset with cells of any dimension
///
/// Vertex cells produce vertices, 1D cells produce vertices, 2D cells produce lines and 3D cells
/// produce triangles or polygons. Points are merged exactly as they are generated.
///
/// Without a scalar tree the cells are processed by dimension (1D, then 2D, then 3D) and vertex
/// cells are ignored. With a scalar tree the cells are processed value by value in the order the
/// tree returns them, vertex cells included.
#[derive(Debug)]
pub struct ContourGrid {
    values: ContourValues,
    compute_scalars: bool,
    generate_triangles: bool,
    use_scalar_tree: bool,
    scalar_tree: Option<Box<dyn ScalarTree>>,
    scalars_name: Option<String>,
    output_precision: Precision,
}

impl Default for ContourGrid {
    fn default() -> Self {
        Self {
            values: ContourValues::new(),
            compute_scalars: true,
            generate_triangles: true,
            use_scalar_tree: false,
            scalar_tree: None,
            scalars_name: None,
            output_precision: Precision::Default,
        }
    }
}

impl ContourGrid {
    /// Create a filter with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the iso-value at `index`
    pub fn set_value(&mut self, index: usize, value: f64) {
        self.values.set_value(index, value);
    }

    /// The iso-values
    pub fn values(&self) -> &[f64] {
        self.values.values()
    }

    /// Mutable access to the iso-values
    pub fn contour_values_mut(&mut self) -> &mut ContourValues {
        &mut self.values
    }

    /// Replace the iso-values by `number` equally spaced values over `range`
    pub fn generate_values(&mut self, number: usize, range: [f64; 2]) {
        self.values.generate_values(number, range);
    }

    /// Write the iso-value of every output point into a scalar array
    pub fn set_compute_scalars(&mut self, compute_scalars: bool) {
        self.compute_scalars = compute_scalars;
    }

    /// Are output scalars computed?
    pub fn compute_scalars(&self) -> bool {
        self.compute_scalars
    }

    /// Output the triangles of 3D cells, rather than merging them into polygons
    pub fn set_generate_triangles(&mut self, generate_triangles: bool) {
        self.generate_triangles = generate_triangles;
    }

    /// Are triangles output for 3D cells?
    pub fn generate_triangles(&self) -> bool {
        self.generate_triangles
    }

    /// Visit the cells through a scalar tree
    pub fn set_use_scalar_tree(&mut self, use_scalar_tree: bool) {
        self.use_scalar_tree = use_scalar_tree;
    }

    /// Are the cells visited through a scalar tree?
    pub fn use_scalar_tree(&self) -> bool {
        self.use_scalar_tree
    }

    /// Set the scalar tree. A [SpanSpace] is created on first use if none is set.
    pub fn set_scalar_tree(&mut self, tree: Box<dyn ScalarTree>) {
        self.scalar_tree = Some(tree);
    }

    /// The scalar tree
    pub fn scalar_tree(&self) -> Option<&dyn ScalarTree> {
        self.scalar_tree.as_deref()
    }

    /// Contour the named point array instead of the active scalars
    pub fn set_scalars_name(&mut self, name: Option<&str>) {
        self.scalars_name = name.map(str::to_string);
    }

    /// The name of the contoured array, if set
    pub fn scalars_name(&self) -> Option<&str> {
        self.scalars_name.as_deref()
    }

    /// Set the precision of the output points
    pub fn set_output_precision(&mut self, precision: Precision) {
        self.output_precision = precision;
    }

    /// The precision of the output points
    pub fn output_precision(&self) -> Precision {
        self.output_precision
    }

    /// Contour a dataset
    ///
    /// Errors in the input are logged and give an empty output.
    pub fn execute(&mut self, input: &Arc<dyn DataSet>) -> PolyData {
        let mut tree = if self.use_scalar_tree {
            Some(
                self.scalar_tree
                    .take()
                    .unwrap_or_else(|| Box::new(SpanSpace::new())),
            )
        } else {
            None
        };
        let tree_ref: Option<&mut dyn ScalarTree> = match &mut tree {
            Some(tree) => Some(&mut **tree),
            None => None,
        };
        let output = match self.contour(input, tree_ref) {
            Ok(output) => output,
            Err(e @ Error::UnsupportedScalarType(_)) => {
                warn!("{e}");
                PolyData::default()
            }
            Err(e) => {
                error!("{e}");
                PolyData::default()
            }
        };
        if tree.is_some() {
            self.scalar_tree = tree;
        }
        output
    }

    fn contour(&self, input: &Arc<dyn DataSet>, tree: Option<&mut dyn ScalarTree>) -> Result<PolyData> {
        if input.number_of_cells() == 0 {
            return Err(Error::NoCells);
        }
        let point_data = input.point_data();
        let scalars = match &self.scalars_name {
            Some(name) => point_data.array(name),
            None => point_data.scalars(),
        }
        .ok_or(Error::NoScalars)?;
        if scalars.components() != 1 {
            return Err(Error::ScalarComponents(scalars.components()));
        }
        if !scalars.scalar_type().is_contourable() {
            return Err(Error::UnsupportedScalarType(scalars.scalar_type()));
        }
        if scalars.number_of_tuples() < input.number_of_points() {
            return Err(Error::ScalarCount {
                expected: input.number_of_points(),
                found: scalars.number_of_tuples(),
            });
        }
        let tree = match tree {
            Some(tree) => {
                tree.set_data_set(input.clone());
                tree.set_scalars_name(self.scalars_name.as_deref());
                tree.build_tree()?;
                Some(tree)
            }
            None => None,
        };
        let output = Points::new_for_output(self.output_precision, input.points());
        let (mut output, point_scalars) = match scalars.data() {
            ArrayData::Int32(s) => self.with_points(&**input, s, output, tree),
            ArrayData::UInt32(s) => self.with_points(&**input, s, output, tree),
            ArrayData::Float32(s) => self.with_points(&**input, s, output, tree),
            ArrayData::Float64(s) => self.with_points(&**input, s, output, tree),
            data => return Err(Error::UnsupportedScalarType(data.scalar_type())),
        };
        if self.compute_scalars {
            let data = scalars.data().from_f64_like(&point_scalars);
            output
                .point_data_mut()
                .set_scalars(DataArray::new(scalars.name(), 1, data));
        }
        debug!(
            "Contoured {} values into {} points, {} verts, {} lines and {} polygons",
            self.values.number_of_contours(),
            output.number_of_points(),
            output.verts().number_of_cells(),
            output.lines().number_of_cells(),
            output.polys().number_of_cells()
        );
        output.squeeze();
        Ok(output)
    }

    fn with_points<S: ArrayValue>(
        &self,
        input: &dyn DataSet,
        scalars: &[S],
        output: Points,
        tree: Option<&mut dyn ScalarTree>,
    ) -> (PolyData, Vec<f64>) {
        match input.points() {
            Points::Float32(p) => self.run(input, scalars, p, output, tree),
            Points::Float64(p) => self.run(input, scalars, p, output, tree),
        }
    }

    fn run<S: ArrayValue, P: Coordinate>(
        &self,
        input: &dyn DataSet,
        scalars: &[S],
        points: &[P],
        output: Points,
        tree: Option<&mut dyn ScalarTree>,
    ) -> (PolyData, Vec<f64>) {
        let mut contourer = CellContourer::new(scalars, points, output, self.generate_triangles);
        let values = self.values.values();
        match tree {
            Some(tree) => {
                let (mut ids, mut cell_scalars) = (vec![], vec![]);
                for &value in values {
                    tree.init_traversal(value);
                    while let Some(cell) = tree.next_cell(&mut ids, &mut cell_scalars) {
                        contourer.contour(input.cell_type(cell), &ids, value);
                    }
                }
            }
            None => {
                let dims = input
                    .distinct_cell_types()
                    .iter()
                    .map(|t| t.dim())
                    .collect::<BTreeSet<_>>();
                let mut cursor = CellCursor::new(input);
                for dim in (1..=3).filter(|d| dims.contains(d)) {
                    for cell in 0..input.number_of_cells() {
                        if input.cell_type(cell).dim() != dim {
                            continue;
                        }
                        let (cell_type, ids) = cursor.cell(cell);
                        let (min, max) = ids.iter().fold(
                            (f64::INFINITY, f64::NEG_INFINITY),
                            |(lo, hi), id| {
                                let s = scalars[*id].as_f64();
                                (lo.min(s), hi.max(s))
                            },
                        );
                        for &value in values.iter().filter(|v| min <= **v && **v <= max) {
                            contourer.contour(cell_type, ids, value);
                        }
                    }
                }
            }
        }
        contourer.finish()
    }
}

/// Contours single cells into a shared output
struct CellContourer<'a, S, P> {
    scalars: &'a [S],
    points: &'a [P],
    generate_triangles: bool,
    locator: MergePoints,
    point_scalars: Vec<f64>,
    verts: CellArray,
    lines: CellArray,
    polys: CellArray,
    builder: PolygonBuilder,
}

impl<'a, S: ArrayValue, P: Coordinate> CellContourer<'a, S, P> {
    fn new(scalars: &'a [S], points: &'a [P], output: Points, generate_triangles: bool) -> Self {
        Self {
            scalars,
            points,
            generate_triangles,
            locator: MergePoints::new(output),
            point_scalars: vec![],
            verts: CellArray::new(),
            lines: CellArray::new(),
            polys: CellArray::new(),
            builder: PolygonBuilder::new(),
        }
    }

    fn inside(&self, id: usize, value: f64) -> bool {
        self.scalars[id].as_f64() >= value
    }

    fn insert(&mut self, x: [f64; 3], value: f64) -> usize {
        let (id, inserted) = self.locator.insert_unique_point(x);
        if inserted {
            self.point_scalars.push(value);
        }
        id
    }

    /// The output point where the iso-value crosses the edge `a`-`b`
    ///
    /// The point is interpolated from the lower to the higher id, so that every cell sharing the edge
    /// computes the same coordinates.
    fn edge_point(&mut self, a: usize, b: usize, value: f64) -> usize {
        let (p0, p1) = if a < b { (a, b) } else { (b, a) };
        let t = edge_parameter(
            self.scalars[p0].as_f64(),
            self.scalars[p1].as_f64(),
            value,
        );
        let x = interpolate(self.points, p0, p1, t);
        self.insert(x, value)
    }

    fn contour(&mut self, cell_type: CellType, ids: &[usize], value: f64) {
        match cell_type.dim() {
            0 => self.contour_vertices(ids, value),
            1 => self.contour_polyline(ids, value),
            2 => self.contour_polygon(cell_type, ids, value),
            _ => self.contour_solid(cell_type, ids, value),
        }
    }

    fn contour_vertices(&mut self, ids: &[usize], value: f64) {
        for id in ids {
            if self.scalars[*id].as_f64() == value {
                let p = self.insert(interpolate(self.points, *id, *id, 0.0), value);
                self.verts.push_cell(&[p]);
            }
        }
    }

    fn contour_polyline(&mut self, ids: &[usize], value: f64) {
        for w in ids.windows(2) {
            if self.inside(w[0], value) != self.inside(w[1], value) {
                let p = self.edge_point(w[0], w[1], value);
                self.verts.push_cell(&[p]);
            }
        }
    }

    fn contour_polygon(&mut self, cell_type: CellType, ids: &[usize], value: f64) {
        let order: Vec<usize> = match boundary_loop(cell_type) {
            Some(order) if order.len() == ids.len() => order.iter().map(|i| ids[*i]).collect(),
            Some(_) => return,
            None => ids.to_vec(),
        };
        if order.len() < 3 {
            return;
        }
        let n = order.len();
        let inside = order
            .iter()
            .map(|id| self.inside(*id, value))
            .collect::<Vec<_>>();
        for [k, m] in polygon_segments(&inside) {
            let p = self.edge_point(order[k], order[(k + 1) % n], value);
            let q = self.edge_point(order[m], order[(m + 1) % n], value);
            if p != q {
                self.lines.push_cell(&[p, q]);
            }
        }
    }

    fn contour_solid(&mut self, cell_type: CellType, ids: &[usize], value: f64) {
        let Some(table) = case_table(cell_type) else {
            return;
        };
        if Some(ids.len()) != cell_type.number_of_points() {
            return;
        }
        let mask = (0..ids.len())
            .filter(|i| self.inside(ids[*i], value))
            .fold(0, |m, i| m | (1 << i));
        let edges = table.edges();
        for triangle in &table.case(mask).triangles {
            let [a, b, c] = triangle.map(|e| {
                let [v0, v1] = edges[e];
                self.edge_point(ids[v0], ids[v1], value)
            });
            if self.generate_triangles {
                if a != b && b != c && a != c {
                    self.polys.push_cell(&[a, b, c]);
                }
            } else {
                self.builder.insert_triangle([a, b, c]);
            }
        }
        if !self.generate_triangles {
            for polygon in self.builder.polygons() {
                self.polys.push_cell(&polygon);
            }
        }
    }

    fn finish(self) -> (PolyData, Vec<f64>) {
        let output = PolyData::from_parts(
            self.locator.into_points(),
            self.verts,
            self.lines,
            self.polys,
        );
        (output, self.point_scalars)
    }
}
