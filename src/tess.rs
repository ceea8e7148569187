// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Public tessellator: contour submission, options, the tessellation pipeline
// and its output buffers.
//
// Pipeline per call: project onto the sweep plane, run the sweep (which
// splits crossings and classifies faces under the winding rule), then either
// keep only the boundary loops or triangulate the interior faces, optionally
// refine them towards a constrained Delaunay triangulation and merge them
// into convex polygons.

mod output;
mod projection;

use std::sync::Arc;

use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::alloc::{AllocConfig, AllocError, HeapAllocator, SharedAllocator};
use crate::error::{TessError, TessResult, TessStatus};
use crate::geom::{is_valid_coord, Real};
use crate::mesh::{sym, Mesh, INVALID};
use crate::monotone::{merge_convex_faces, tessellate_interior};
use crate::sweep::compute_interior;
use crate::winding::{set_winding_number, WindingRule};

use output::Output;

/// Marks an unused slot in element output, and the source index of
/// vertices created where input edges cross.
pub const TESS_UNDEF: u32 = u32::MAX;

const COMPONENT_BYTES: usize = std::mem::size_of::<Real>();

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ElementType {
    /// Polygons of up to `poly_size` vertices, padded with [`TESS_UNDEF`].
    Polygons,
    /// Like `Polygons`, each followed by `poly_size` neighbour polygon indices.
    ConnectedPolygons,
    /// `(first vertex, vertex count)` pairs, one per boundary loop.
    BoundaryContours,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TessOption {
    /// Contours submitted while set wind the opposite way.
    ReverseContours,
    /// Emit boundary contours regardless of the requested element type.
    BoundaryOnly,
    /// Flip triangle edges towards a constrained Delaunay triangulation.
    ConstrainedDelaunay,
}

/// Polygon tessellator.
///
/// Submit contours with [`add_contour`](Self::add_contour), then call
/// [`tessellate`](Self::tessellate). Each call consumes the submitted
/// contours; results stay readable until the next call.
pub struct Tessellator {
    alloc: SharedAllocator,
    config: AllocConfig,
    mesh: Option<Mesh>,
    status: TessStatus,
    error: Option<TessError>,
    /// Invalid input seen since the last tessellation; later contours are ignored.
    submission_error: Option<TessError>,
    reverse_contours: bool,
    boundary_only: bool,
    process_cdt: bool,
    vertex_index_counter: u32,
    out: Output,
}

impl Tessellator {
    pub fn new() -> Self {
        Self::with_allocator(Arc::new(HeapAllocator), AllocConfig::default())
    }

    /// Tessellator whose internal memory is accounted against `alloc`.
    pub fn with_allocator(alloc: SharedAllocator, config: AllocConfig) -> Self {
        Tessellator {
            alloc,
            config: config.normalized(),
            mesh: None,
            status: TessStatus::Ok,
            error: None,
            submission_error: None,
            reverse_contours: false,
            boundary_only: false,
            process_cdt: false,
            vertex_index_counter: 0,
            out: Output::default(),
        }
    }

    pub fn set_option(&mut self, option: TessOption, value: bool) {
        match option {
            TessOption::ReverseContours => self.reverse_contours = value,
            TessOption::BoundaryOnly => self.boundary_only = value,
            TessOption::ConstrainedDelaunay => self.process_cdt = value,
        }
    }

    /// Add a closed contour from tightly packed vertices of `size` components.
    ///
    /// Components beyond the third are ignored. Failures are reported through
    /// [`status`](Self::status) and by the next [`tessellate`](Self::tessellate).
    pub fn add_contour(&mut self, size: usize, vertices: &[Real]) {
        if size < 2 {
            self.reject(TessError::BadLayout("vertex size must be at least 2"));
            return;
        }
        self.add_contour_strided(size, vertices, size * COMPONENT_BYTES, vertices.len() / size);
    }

    /// Add a closed contour of `count` vertices, each starting `stride_bytes`
    /// after the previous one in `data`.
    pub fn add_contour_strided(
        &mut self,
        size: usize,
        data: &[Real],
        stride_bytes: usize,
        count: usize,
    ) {
        if self.status == TessStatus::OutOfMemory || self.submission_error.is_some() {
            return;
        }
        let points = match gather_vertices(size, data, stride_bytes, count) {
            Ok(points) => points,
            Err(err) => {
                self.reject(err);
                return;
            }
        };
        if let Err(err) = self.push_contour(&points) {
            debug!(%err, "contour submission ran out of memory");
            self.mesh = None;
            self.status = TessStatus::OutOfMemory;
            self.error = Some(err.into());
        }
    }

    fn reject(&mut self, err: TessError) {
        debug!(%err, "contour rejected");
        self.mesh = None;
        self.status = err.status();
        self.error = Some(err.clone());
        self.submission_error = Some(err);
    }

    fn push_contour(&mut self, points: &[[Real; 3]]) -> Result<(), AllocError> {
        if points.is_empty() {
            return Ok(());
        }
        let mesh = match self.mesh.take() {
            Some(mesh) => mesh,
            None => Mesh::new(&self.alloc, &self.config)?,
        };
        let mesh = self.mesh.insert(mesh);
        let winding = if self.reverse_contours { -1 } else { 1 };

        let mut e = INVALID;
        for p in points {
            if e == INVALID {
                // A single edge looping back onto its own origin.
                e = mesh.make_edge()?;
                mesh.splice(e, sym(e))?;
            } else {
                mesh.split_edge(e)?;
                e = mesh.lnext(e);
            }
            let v = mesh.org(e);
            mesh.verts[v].coords = *p;
            mesh.verts[v].idx = self.vertex_index_counter;
            self.vertex_index_counter += 1;
            mesh.edges[e].winding = winding;
            mesh.edges[sym(e)].winding = -winding;
        }
        Ok(())
    }

    /// Tessellate everything submitted since the last call.
    ///
    /// `poly_size` is raised to at least 3 and `vertex_size` is clamped to
    /// 2 or 3. A `normal` of all zeros, or `None`, lets the plane be
    /// estimated from the input. Returns `false` on failure; see
    /// [`status`](Self::status) and [`error`](Self::error).
    pub fn tessellate(
        &mut self,
        winding_rule: WindingRule,
        element_type: ElementType,
        poly_size: usize,
        vertex_size: usize,
        normal: Option<[Real; 3]>,
    ) -> bool {
        self.try_tessellate(winding_rule, element_type, poly_size, vertex_size, normal)
            .is_ok()
    }

    /// [`tessellate`](Self::tessellate) reporting the failure reason.
    pub fn try_tessellate(
        &mut self,
        winding_rule: WindingRule,
        element_type: ElementType,
        poly_size: usize,
        vertex_size: usize,
        normal: Option<[Real; 3]>,
    ) -> Result<(), TessError> {
        if self.status == TessStatus::OutOfMemory {
            let err = self
                .error
                .clone()
                .unwrap_or(TessError::Alloc(AllocError { requested: 0 }));
            debug!(%err, "tessellator is out of memory; reset required");
            return Err(err);
        }

        self.out = Output::default();
        self.vertex_index_counter = 0;
        let mesh = self.mesh.take();
        let result = match self.submission_error.take() {
            Some(err) => Err(err),
            None => self.run(mesh, winding_rule, element_type, poly_size, vertex_size, normal),
        };

        match result {
            Ok(out) => {
                debug!(
                    vertices = out.vertex_count,
                    elements = out.element_count,
                    ?winding_rule,
                    ?element_type,
                    "tessellation finished"
                );
                self.out = out;
                self.status = TessStatus::Ok;
                self.error = None;
                Ok(())
            }
            Err(err) => {
                debug!(%err, "tessellation failed");
                self.status = err.status();
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn run(
        &self,
        mesh: Option<Mesh>,
        winding_rule: WindingRule,
        element_type: ElementType,
        poly_size: usize,
        vertex_size: usize,
        normal: Option<[Real; 3]>,
    ) -> TessResult<Output> {
        if normal.is_some_and(|n| n.iter().any(|c| !c.is_finite())) {
            return Err(TessError::InvalidNormal);
        }
        let Some(mut mesh) = mesh else {
            return Ok(Output::default());
        };
        debug!(
            vertices = mesh.verts.len().saturating_sub(1),
            ?winding_rule,
            "tessellation started"
        );

        projection::project(&mut mesh, normal);
        compute_interior(&mut mesh, winding_rule, &self.alloc, &self.config)?;

        let vertex_size = vertex_size.clamp(2, 3);
        if self.boundary_only || element_type == ElementType::BoundaryContours {
            set_winding_number(&mut mesh, 1, true)?;
            return Ok(output::contours(&mesh, vertex_size));
        }

        tessellate_interior(&mut mesh)?;
        if self.process_cdt {
            mesh.refine_delaunay(&self.alloc)?;
        }
        let poly_size = poly_size.max(3);
        if poly_size > 3 {
            merge_convex_faces(&mut mesh, poly_size)?;
        }
        // Neighbour lookups still walk across exterior faces.
        if element_type == ElementType::Polygons {
            mesh.discard_exterior();
        }
        Ok(output::polymesh(&mut mesh, element_type, poly_size, vertex_size))
    }

    /// Drop pending contours and results and clear any failure, including
    /// an out-of-memory state. Options are kept.
    pub fn reset(&mut self) {
        self.mesh = None;
        self.status = TessStatus::Ok;
        self.error = None;
        self.submission_error = None;
        self.vertex_index_counter = 0;
        self.out = Output::default();
    }

    pub fn status(&self) -> TessStatus {
        self.status
    }

    /// Reason for the current non-`Ok` status.
    pub fn error(&self) -> Option<&TessError> {
        self.error.as_ref()
    }

    pub fn vertex_count(&self) -> usize {
        self.out.vertex_count
    }

    pub fn element_count(&self) -> usize {
        self.out.element_count
    }

    /// Output coordinates, `vertex_size` components per vertex.
    pub fn vertices(&self) -> &[Real] {
        &self.out.vertices
    }

    /// Submission-order index of each output vertex, or [`TESS_UNDEF`] for
    /// vertices created at intersections.
    pub fn vertex_indices(&self) -> &[u32] {
        &self.out.vertex_indices
    }

    pub fn elements(&self) -> &[u32] {
        &self.out.elements
    }
}

impl Default for Tessellator {
    fn default() -> Self {
        Self::new()
    }
}

/// Read and validate `count` vertices before anything touches the mesh.
fn gather_vertices(
    size: usize,
    data: &[Real],
    stride_bytes: usize,
    count: usize,
) -> TessResult<Vec<[Real; 3]>> {
    if size < 2 {
        return Err(TessError::BadLayout("vertex size must be at least 2"));
    }
    if stride_bytes % COMPONENT_BYTES != 0 {
        return Err(TessError::BadLayout("stride is not a whole number of components"));
    }
    let stride = stride_bytes / COMPONENT_BYTES;
    if stride < size {
        return Err(TessError::BadLayout("stride is shorter than one vertex"));
    }
    if count == 0 {
        return Ok(Vec::new());
    }
    let needed = (count - 1).checked_mul(stride).and_then(|n| n.checked_add(size));
    if needed.map_or(true, |n| n > data.len()) {
        return Err(TessError::BadLayout("buffer holds fewer vertices than requested"));
    }

    let components = size.min(3);
    let mut points = Vec::with_capacity(count);
    for index in 0..count {
        let base = index * stride;
        let mut p = [0.0; 3];
        for (component, slot) in p.iter_mut().enumerate().take(components) {
            let c = data[base + component];
            if !is_valid_coord(c) {
                return Err(TessError::InvalidCoordinate { index, component });
            }
            *slot = c;
        }
        points.push(p);
    }
    Ok(points)
}
