//! Iso-surfaces of unstructured grids of linear 3D cells

use crate::contour::attributes::AttributeInterpolator;
use crate::contour::extract::CellSource;
use crate::contour::fast_path::{append_triangles, extract_points, Extraction};
use crate::contour::merged::{append_merged, extract_edges, merge_edges, EdgeId};
use crate::contour::normals::point_normals;
use crate::contour::values::ContourValues;
use crate::grid::{ArrayData, ArrayValue, CellArray, Coordinate, DataArray, Points, PolyData};
use crate::scalar_tree::{ScalarTreeMap, SpanSpace};
use crate::traits::{DataSet, ScalarTree};
use crate::types::{Error, Precision, Result};
use log::{debug, error, trace, warn};
use std::sync::Arc;

/// Inputs with at least this many points or cells use 64-bit ids while merging points
pub const LARGE_ID_THRESHOLD: usize = i32::MAX as usize;

/// Options of a [Contour3DLinearGrid]
#[derive(Debug, Clone)]
struct LinearGridOptions {
    values: ContourValues,
    merge_points: bool,
    interpolate_attributes: bool,
    compute_normals: bool,
    sequential_processing: bool,
    output_precision: Precision,
    use_scalar_tree: bool,
    scalars_name: Option<String>,
    large_id_threshold: usize,
}

impl Default for LinearGridOptions {
    fn default() -> Self {
        Self {
            values: ContourValues::new(),
            merge_points: false,
            interpolate_attributes: false,
            compute_normals: false,
            sequential_processing: false,
            output_precision: Precision::Default,
            use_scalar_tree: false,
            scalars_name: None,
            large_id_threshold: LARGE_ID_THRESHOLD,
        }
    }
}

impl LinearGridOptions {
    fn merging(&self) -> bool {
        self.merge_points || self.interpolate_attributes || self.compute_normals
    }
}

/// What the last execution did
#[derive(Debug, Clone, Copy, Default)]
struct Diagnostics {
    number_of_threads_used: usize,
    large_ids: bool,
}

impl Diagnostics {
    fn combine(&mut self, other: Diagnostics) {
        self.number_of_threads_used = self
            .number_of_threads_used
            .max(other.number_of_threads_used);
        self.large_ids |= other.large_ids;
    }
}

/// Extract triangulated iso-surfaces from unstructured grids of linear 3D cells
///
/// Only tetrahedra, hexahedra, voxels, wedges and pyramids are contoured; other cells are skipped.
/// By default every triangle gets its own three points. Merging points, interpolating attributes or
/// computing normals switches to a slower path where triangles share the points on shared edges.
///
/// Cells can be visited through a scalar tree, which only pays off when the same grid is contoured
/// many times.
#[derive(Debug, Default)]
pub struct Contour3DLinearGrid {
    options: LinearGridOptions,
    scalar_tree: Option<Box<dyn ScalarTree>>,
    tree_map: ScalarTreeMap,
    diagnostics: Diagnostics,
}

impl Contour3DLinearGrid {
    /// Create a filter with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the iso-value at `index`
    pub fn set_value(&mut self, index: usize, value: f64) {
        self.options.values.set_value(index, value);
    }

    /// The iso-values
    pub fn values(&self) -> &[f64] {
        self.options.values.values()
    }

    /// Mutable access to the iso-values
    pub fn contour_values_mut(&mut self) -> &mut ContourValues {
        &mut self.options.values
    }

    /// The number of iso-values
    pub fn number_of_contours(&self) -> usize {
        self.options.values.number_of_contours()
    }

    /// Replace the iso-values by `number` equally spaced values over `range`
    pub fn generate_values(&mut self, number: usize, range: [f64; 2]) {
        self.options.values.generate_values(number, range);
    }

    /// Merge coincident points
    pub fn set_merge_points(&mut self, merge_points: bool) {
        self.options.merge_points = merge_points;
    }

    /// Are coincident points merged?
    pub fn merge_points(&self) -> bool {
        self.options.merge_points
    }

    /// Interpolate the point data of the input onto the output points
    pub fn set_interpolate_attributes(&mut self, interpolate: bool) {
        self.options.interpolate_attributes = interpolate;
    }

    /// Are point attributes interpolated?
    pub fn interpolate_attributes(&self) -> bool {
        self.options.interpolate_attributes
    }

    /// Compute point normals
    pub fn set_compute_normals(&mut self, compute_normals: bool) {
        self.options.compute_normals = compute_normals;
    }

    /// Are point normals computed?
    pub fn compute_normals(&self) -> bool {
        self.options.compute_normals
    }

    /// Run every phase on the calling thread
    pub fn set_sequential_processing(&mut self, sequential: bool) {
        self.options.sequential_processing = sequential;
    }

    /// Is every phase run on the calling thread?
    pub fn sequential_processing(&self) -> bool {
        self.options.sequential_processing
    }

    /// Set the precision of the output points
    pub fn set_output_precision(&mut self, precision: Precision) {
        self.options.output_precision = precision;
    }

    /// The precision of the output points
    pub fn output_precision(&self) -> Precision {
        self.options.output_precision
    }

    /// Visit the cells through a scalar tree
    pub fn set_use_scalar_tree(&mut self, use_scalar_tree: bool) {
        self.options.use_scalar_tree = use_scalar_tree;
    }

    /// Are the cells visited through a scalar tree?
    pub fn use_scalar_tree(&self) -> bool {
        self.options.use_scalar_tree
    }

    /// Set the scalar tree. A [SpanSpace] is created on first use if none is set.
    ///
    /// For composite input the tree serves as a prototype: each block gets a new tree with the same
    /// settings.
    pub fn set_scalar_tree(&mut self, tree: Box<dyn ScalarTree>) {
        self.scalar_tree = Some(tree);
        self.tree_map.clear();
    }

    /// The scalar tree
    pub fn scalar_tree(&self) -> Option<&dyn ScalarTree> {
        self.scalar_tree.as_deref()
    }

    /// The trees built for the blocks of composite input
    pub fn tree_map(&self) -> &ScalarTreeMap {
        &self.tree_map
    }

    /// Contour the named point array instead of the active scalars
    pub fn set_scalars_name(&mut self, name: Option<&str>) {
        self.options.scalars_name = name.map(str::to_string);
    }

    /// The name of the contoured array, if set
    pub fn scalars_name(&self) -> Option<&str> {
        self.options.scalars_name.as_deref()
    }

    /// Set the number of points or cells from which 64-bit ids are used while merging points
    pub fn set_large_id_threshold(&mut self, threshold: usize) {
        self.options.large_id_threshold = threshold;
    }

    /// The number of points or cells from which 64-bit ids are used while merging points
    pub fn large_id_threshold(&self) -> usize {
        self.options.large_id_threshold
    }

    /// The number of distinct threads that extracted triangles in the last execution
    pub fn number_of_threads_used(&self) -> usize {
        self.diagnostics.number_of_threads_used
    }

    /// Did the last execution merge points with 64-bit ids?
    pub fn large_ids(&self) -> bool {
        self.diagnostics.large_ids
    }

    /// Can every cell and the scalars of `data_set` be processed?
    ///
    /// Datasets without the scalars have nothing to reject.
    pub fn can_fully_process(data_set: &dyn DataSet, scalars_name: Option<&str>) -> bool {
        if !data_set
            .distinct_cell_types()
            .iter()
            .all(|t| t.is_linear_3d())
        {
            return false;
        }
        match find_scalars(data_set, scalars_name) {
            Some(s) => s.scalar_type().is_contourable() && s.components() == 1,
            None => true,
        }
    }

    /// Can every block be processed?
    pub fn can_fully_process_blocks(blocks: &[Arc<dyn DataSet>], scalars_name: Option<&str>) -> bool {
        blocks
            .iter()
            .all(|b| Self::can_fully_process(&**b, scalars_name))
    }

    /// Contour a dataset
    ///
    /// Errors in the input are logged and give an empty output.
    pub fn execute(&mut self, input: &Arc<dyn DataSet>) -> PolyData {
        self.diagnostics = Diagnostics::default();
        let mut tree = if self.options.use_scalar_tree {
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
        let output = contour_or_log(&self.options, input, tree_ref, &mut self.diagnostics);
        if tree.is_some() {
            self.scalar_tree = tree;
        }
        output
    }

    /// Contour every block of a composite dataset
    ///
    /// Each block keeps its own scalar tree across executions.
    pub fn execute_composite(&mut self, blocks: &[Arc<dyn DataSet>]) -> Vec<PolyData> {
        self.diagnostics = Diagnostics::default();
        if self.options.use_scalar_tree && self.scalar_tree.is_none() {
            self.scalar_tree = Some(Box::new(SpanSpace::new()));
        }
        let mut outputs = Vec::with_capacity(blocks.len());
        for block in blocks {
            let mut diagnostics = Diagnostics::default();
            let tree: Option<&mut dyn ScalarTree> = match &self.scalar_tree {
                Some(prototype) if self.options.use_scalar_tree => Some(
                    &mut **self
                        .tree_map
                        .get_or_insert_with(block, || prototype.new_instance()),
                ),
                _ => None,
            };
            outputs.push(contour_or_log(&self.options, block, tree, &mut diagnostics));
            self.diagnostics.combine(diagnostics);
        }
        outputs
    }
}

fn find_scalars<'a>(data_set: &'a dyn DataSet, name: Option<&str>) -> Option<&'a DataArray> {
    match name {
        Some(name) => data_set.point_data().array(name),
        None => data_set.point_data().scalars(),
    }
}

fn contour_or_log(
    options: &LinearGridOptions,
    input: &Arc<dyn DataSet>,
    tree: Option<&mut dyn ScalarTree>,
    diagnostics: &mut Diagnostics,
) -> PolyData {
    match contour(options, input, tree, diagnostics) {
        Ok(output) => output,
        Err(e) => {
            match &e {
                Error::UnsupportedScalarType(_) => warn!("{e}"),
                Error::BadScalarRange { min, max } if min == max => warn!("{e}"),
                _ => error!("{e}"),
            }
            PolyData::default()
        }
    }
}

/// The state shared by the iso-values of one execution
struct Context<'a> {
    options: &'a LinearGridOptions,
    input: &'a dyn DataSet,
    scalars_name: &'a str,
    large_ids: bool,
}

fn contour(
    options: &LinearGridOptions,
    input: &Arc<dyn DataSet>,
    tree: Option<&mut dyn ScalarTree>,
    diagnostics: &mut Diagnostics,
) -> Result<PolyData> {
    let ncells = input.number_of_cells();
    let npoints = input.number_of_points();
    if ncells == 0 {
        return Err(Error::NoCells);
    }
    let scalars = find_scalars(&**input, options.scalars_name.as_deref()).ok_or(Error::NoScalars)?;
    if scalars.components() != 1 {
        return Err(Error::ScalarComponents(scalars.components()));
    }
    if !scalars.scalar_type().is_contourable() {
        return Err(Error::UnsupportedScalarType(scalars.scalar_type()));
    }
    if scalars.number_of_tuples() < npoints {
        return Err(Error::ScalarCount {
            expected: npoints,
            found: scalars.number_of_tuples(),
        });
    }
    let (min, max) = scalars.range(0).ok_or(Error::BadScalarRange {
        min: f64::NAN,
        max: f64::NAN,
    })?;
    if min >= max {
        return Err(Error::BadScalarRange { min, max });
    }
    if let Some(t) = input
        .distinct_cell_types()
        .into_iter()
        .find(|t| !t.is_linear_3d())
    {
        warn!("{}: these cells are skipped", Error::UnsupportedCellType(t));
    }

    let tree = match tree {
        Some(tree) => {
            tree.set_data_set(input.clone());
            tree.set_scalars_name(options.scalars_name.as_deref());
            tree.build_tree()?;
            Some(tree)
        }
        None => None,
    };

    let large_ids = npoints >= options.large_id_threshold || ncells >= options.large_id_threshold;
    if options.merging() {
        diagnostics.large_ids = large_ids;
        debug!(
            "Merging points with {} ids",
            if large_ids { "64-bit" } else { "32-bit" }
        );
    }
    let context = Context {
        options,
        input: &**input,
        scalars_name: scalars.name(),
        large_ids,
    };
    let output = match scalars.data() {
        ArrayData::Int32(s) => with_points(&context, s, tree, diagnostics),
        ArrayData::UInt32(s) => with_points(&context, s, tree, diagnostics),
        ArrayData::Float32(s) => with_points(&context, s, tree, diagnostics),
        ArrayData::Float64(s) => with_points(&context, s, tree, diagnostics),
        data => return Err(Error::UnsupportedScalarType(data.scalar_type())),
    };
    debug!(
        "Contoured {} values into {} points and {} triangles on {} threads",
        options.values.number_of_contours(),
        output.number_of_points(),
        output.polys().number_of_cells(),
        diagnostics.number_of_threads_used
    );
    Ok(output)
}

fn with_points<S: ArrayValue>(
    context: &Context,
    scalars: &[S],
    tree: Option<&mut dyn ScalarTree>,
    diagnostics: &mut Diagnostics,
) -> PolyData {
    match context.input.points() {
        Points::Float32(p) => with_output::<S, f32>(context, scalars, p, tree, diagnostics),
        Points::Float64(p) => with_output::<S, f64>(context, scalars, p, tree, diagnostics),
    }
}

fn with_output<S: ArrayValue, IP: Coordinate>(
    context: &Context,
    scalars: &[S],
    points: &[IP],
    tree: Option<&mut dyn ScalarTree>,
    diagnostics: &mut Diagnostics,
) -> PolyData {
    match Points::new_for_output(context.options.output_precision, context.input.points()) {
        Points::Float32(_) => process::<S, IP, f32>(context, scalars, points, tree, diagnostics),
        Points::Float64(_) => process::<S, IP, f64>(context, scalars, points, tree, diagnostics),
    }
}

fn process<S: ArrayValue, IP: Coordinate, OP: Coordinate>(
    context: &Context,
    scalars: &[S],
    points: &[IP],
    mut tree: Option<&mut dyn ScalarTree>,
    diagnostics: &mut Diagnostics,
) -> PolyData {
    let options = context.options;
    let sequential = options.sequential_processing;
    let mut out_points = Vec::<OP>::new();
    let mut triangles = CellArray::new();
    let mut attributes = if options.interpolate_attributes {
        Some(AttributeInterpolator::new(
            context.input.point_data(),
            context.scalars_name,
        ))
    } else {
        None
    };

    for &value in options.values.values() {
        let source = match tree.as_deref_mut() {
            Some(tree) => {
                let batches = tree.number_of_cell_batches(value);
                CellSource::Batches(tree, batches)
            }
            None => CellSource::All(context.input.number_of_cells()),
        };
        let extraction = Extraction {
            data_set: context.input,
            scalars,
            points,
            value,
            sequential,
        };
        let (added, threads) = if options.merging() {
            if context.large_ids {
                contour_merged::<S, IP, OP, u64>(
                    &extraction,
                    &source,
                    &mut out_points,
                    &mut triangles,
                    attributes.as_mut(),
                )
            } else {
                contour_merged::<S, IP, OP, u32>(
                    &extraction,
                    &source,
                    &mut out_points,
                    &mut triangles,
                    attributes.as_mut(),
                )
            }
        } else {
            let (locals, threads) = extract_points::<S, IP, OP>(&extraction, &source);
            let added = append_triangles(sequential, &locals, &mut out_points, &mut triangles);
            (added, threads)
        };
        diagnostics.number_of_threads_used = diagnostics.number_of_threads_used.max(threads);
        trace!("Value {value}: {added} points from {} work items", source.len());
    }

    let normals = if options.compute_normals {
        Some(point_normals(sequential, &out_points, &triangles))
    } else {
        None
    };
    let mut output = PolyData::from_parts(
        OP::wrap(out_points),
        CellArray::new(),
        CellArray::new(),
        triangles,
    );
    if let Some(attributes) = attributes {
        trace!("Interpolated {} point arrays", attributes.len());
        for array in attributes.finish() {
            output.point_data_mut().add_array(array);
        }
    }
    if let Some(normals) = normals {
        output.point_data_mut().set_normals(normals);
    }
    output.squeeze();
    output
}

fn contour_merged<S: ArrayValue, IP: Coordinate, OP: Coordinate, I: EdgeId>(
    extraction: &Extraction<S, IP>,
    source: &CellSource,
    out_points: &mut Vec<OP>,
    triangles: &mut CellArray,
    attributes: Option<&mut AttributeInterpolator>,
) -> (usize, usize) {
    let sequential = extraction.sequential;
    let (mut edges, threads) = extract_edges::<S, IP, I>(extraction, source);
    let offsets = merge_edges(sequential, &mut edges);
    let added = append_merged(
        sequential,
        extraction.points,
        &edges,
        &offsets,
        out_points,
        triangles,
    );
    if let Some(attributes) = attributes {
        attributes.append(sequential, &edges, &offsets);
    }
    (added, threads)
}
