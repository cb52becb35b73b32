//! Ball pivoting surface reconstruction
//!
//! Reconstructs a triangle mesh from an oriented point cloud by rolling
//! virtual balls of one or more radii over the samples. A ball resting
//! on three points spawns a seed triangle; pivoting the ball around the
//! edges of the growing mesh discovers the next sample to connect. Edges
//! where no pivot succeeds are parked as border edges and may be
//! reactivated when a larger radius is tried.

use std::collections::{HashMap, VecDeque};
use std::f64::consts::PI;

use tracing::debug;

use pivotmesh_core::{
    ColoredNormalPoint3d, Error, NearestNeighborSearch, NormalPoint3d, Point3d, PointCloud,
    Result, TriangleMesh, Vector3d,
};
use pivotmesh_spatial::KdTree;

use crate::intersection::{points_coplanar, segments_minimum_distance};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VertexType {
    /// Not used by any edge yet
    Orphan,
    /// Used by at least one edge that is still open
    Front,
    /// All incident edges are interior
    Inner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeType {
    /// Abandoned at the current radius, kept for reactivation
    Border,
    /// One adjacent triangle, still pivotable
    Front,
    /// Two adjacent triangles
    Inner,
}

#[derive(Debug)]
struct Vertex {
    /// Incident edge indices; no duplicates, maintained on edge creation
    edges: Vec<usize>,
    kind: VertexType,
}

/// Topological edge with an oriented (source, target) pair.
///
/// The orientation is fixed when the first triangle is attached so that
/// pivoting can assume a consistent winding against that triangle.
#[derive(Debug)]
struct Edge {
    source: usize,
    target: usize,
    triangle0: Option<usize>,
    triangle1: Option<usize>,
    kind: EdgeType,
}

#[derive(Debug)]
struct Triangle {
    vertices: [usize; 3],
    /// Center of the ball resting on the three vertices
    ball_center: Point3d,
}

/// Unit normal of the triangle (p0, p1, p2), zero vector if degenerate
fn face_normal(p0: &Point3d, p1: &Point3d, p2: &Point3d) -> Vector3d {
    let normal = (p1 - p0).cross(&(p2 - p0));
    let norm = normal.norm();
    if norm > 0.0 {
        normal / norm
    } else {
        normal
    }
}

/// The reconstruction state machine.
///
/// Owns the topology (vertices, edges, triangles), the front queue and
/// border list, and the accumulating output mesh. One instance serves
/// one reconstruction run.
struct BallPivoting {
    positions: Vec<Point3d>,
    normals: Vec<Vector3d>,
    kdtree: KdTree,
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    triangles: Vec<Triangle>,
    /// Edge lookup by unordered endpoint pair
    edge_map: HashMap<(usize, usize), usize>,
    edge_front: VecDeque<usize>,
    border_edges: Vec<usize>,
    mesh: TriangleMesh,
}

impl BallPivoting {
    fn new(positions: Vec<Point3d>, normals: Vec<Vector3d>, colors: Option<Vec<[u8; 3]>>) -> Self {
        let kdtree = KdTree::new(&positions);
        let vertices = (0..positions.len())
            .map(|_| Vertex {
                edges: Vec::new(),
                kind: VertexType::Orphan,
            })
            .collect();

        let mut mesh = TriangleMesh::new();
        mesh.vertices = positions.clone();
        mesh.normals = Some(normals.clone());
        mesh.colors = colors;
        mesh.face_normals = Some(Vec::new());

        Self {
            positions,
            normals,
            kdtree,
            vertices,
            edges: Vec::new(),
            triangles: Vec::new(),
            edge_map: HashMap::new(),
            edge_front: VecDeque::new(),
            border_edges: Vec::new(),
            mesh,
        }
    }

    /// Center of the radius-`radius` ball resting on three samples, on
    /// the side agreeing with the summed vertex normals.
    ///
    /// Fails when the triplet is (nearly) collinear or when the ball is
    /// too small to touch all three points.
    fn ball_center(&self, vidx1: usize, vidx2: usize, vidx3: usize, radius: f64) -> Option<Point3d> {
        let v1 = self.positions[vidx1];
        let v2 = self.positions[vidx2];
        let v3 = self.positions[vidx3];

        let c = (v2 - v1).norm_squared();
        let b = (v1 - v3).norm_squared();
        let a = (v3 - v2).norm_squared();

        let alpha = a * (b + c - a);
        let beta = b * (a + c - b);
        let gamma = c * (a + b - c);
        let abg = alpha + beta + gamma;
        if abg < 1e-16 {
            return None;
        }
        let alpha = alpha / abg;
        let beta = beta / abg;
        let gamma = gamma / abg;

        let circ_center = Point3d::from(alpha * v1.coords + beta * v2.coords + gamma * v3.coords);
        let (sa, sb, sc) = (a.sqrt(), b.sqrt(), c.sqrt());
        let circ_radius2 =
            (a * b * c) / ((sa + sb + sc) * (sb + sc - sa) * (sc + sa - sb) * (sa + sb - sc));

        let height2 = radius * radius - circ_radius2;
        if height2 < 0.0 {
            return None;
        }

        let mut tr_norm = (v2 - v1).cross(&(v3 - v1));
        tr_norm /= tr_norm.norm();
        let pt_norm = self.normals[vidx1] + self.normals[vidx2] + self.normals[vidx3];
        if tr_norm.dot(&pt_norm) < 0.0 {
            tr_norm = -tr_norm;
        }

        Some(circ_center + height2.sqrt() * tr_norm)
    }

    /// The existing edge whose endpoints are the unordered pair {u, v}
    fn edge_between(&self, u: usize, v: usize) -> Option<usize> {
        let key = if u < v { (u, v) } else { (v, u) };
        self.edge_map.get(&key).copied()
    }

    fn get_or_create_edge(&mut self, u: usize, v: usize) -> usize {
        if let Some(edge) = self.edge_between(u, v) {
            return edge;
        }
        let edge = self.edges.len();
        self.edges.push(Edge {
            source: u,
            target: v,
            triangle0: None,
            triangle1: None,
            kind: EdgeType::Front,
        });
        let key = if u < v { (u, v) } else { (v, u) };
        self.edge_map.insert(key, edge);
        self.vertices[u].edges.push(edge);
        self.vertices[v].edges.push(edge);
        edge
    }

    /// Vertex of the edge's first adjacent triangle that is neither the
    /// source nor the target
    fn opposite_vertex(&self, edge: usize) -> Option<usize> {
        let e = &self.edges[edge];
        let triangle = &self.triangles[e.triangle0?];
        triangle
            .vertices
            .iter()
            .copied()
            .find(|&v| v != e.source && v != e.target)
    }

    /// Record `triangle` as adjacent to `edge`.
    ///
    /// The first attachment marks the edge as front and orients the
    /// (source, target) pair so the triangle winds consistently with the
    /// summed vertex normals; the second marks it inner. A third
    /// attachment is a topological anomaly and is ignored.
    fn attach_triangle(&mut self, edge: usize, triangle: usize) {
        let (t0, t1) = (self.edges[edge].triangle0, self.edges[edge].triangle1);
        if t0 == Some(triangle) || t1 == Some(triangle) {
            return;
        }
        if t0.is_none() {
            self.edges[edge].triangle0 = Some(triangle);
            self.edges[edge].kind = EdgeType::Front;

            let opp = self
                .opposite_vertex(edge)
                .expect("edge with a triangle attached has an opposite vertex");
            let (src, tgt) = (self.edges[edge].source, self.edges[edge].target);
            let tr_norm = (self.positions[tgt] - self.positions[src])
                .cross(&(self.positions[opp] - self.positions[src]));
            let pt_norm = self.normals[src] + self.normals[tgt] + self.normals[opp];
            if pt_norm.dot(&tr_norm) < 0.0 {
                let e = &mut self.edges[edge];
                std::mem::swap(&mut e.source, &mut e.target);
            }
        } else if t1.is_none() {
            self.edges[edge].triangle1 = Some(triangle);
            self.edges[edge].kind = EdgeType::Inner;
        } else {
            let e = &self.edges[edge];
            debug!(
                source = e.source,
                target = e.target,
                "edge already has two adjacent triangles"
            );
        }
    }

    /// Recompute the derived vertex type from the incident edges
    fn update_vertex_type(&mut self, vidx: usize) {
        let vertex = &self.vertices[vidx];
        let kind = if vertex.edges.is_empty() {
            VertexType::Orphan
        } else if vertex
            .edges
            .iter()
            .all(|&e| self.edges[e].kind == EdgeType::Inner)
        {
            VertexType::Inner
        } else {
            VertexType::Front
        };
        self.vertices[vidx].kind = kind;
    }

    /// Insert the triangle (v0, v1, v2) into the topology and emit it.
    ///
    /// The emitted winding keeps (v0, v1, v2) when the face normal
    /// agrees with the normal of v0 and swaps the last two indices
    /// otherwise; the stored per-face normal is unflipped.
    fn create_triangle(&mut self, v0: usize, v1: usize, v2: usize, center: Point3d) {
        let triangle = self.triangles.len();
        self.triangles.push(Triangle {
            vertices: [v0, v1, v2],
            ball_center: center,
        });

        for (a, b) in [(v0, v1), (v1, v2), (v2, v0)] {
            let edge = self.get_or_create_edge(a, b);
            self.attach_triangle(edge, triangle);
        }
        self.update_vertex_type(v0);
        self.update_vertex_type(v1);
        self.update_vertex_type(v2);

        let normal = face_normal(
            &self.positions[v0],
            &self.positions[v1],
            &self.positions[v2],
        );
        if normal.dot(&self.normals[v0]) > -1e-16 {
            self.mesh.faces.push([v0, v1, v2]);
        } else {
            self.mesh.faces.push([v0, v2, v1]);
        }
        if let Some(face_normals) = &mut self.mesh.face_normals {
            face_normals.push(normal);
        }
    }

    /// Whether a triangle over the three samples can face consistently
    /// with all three vertex normals
    fn compatible(&self, v0: usize, v1: usize, v2: usize) -> bool {
        let mut normal = face_normal(
            &self.positions[v0],
            &self.positions[v1],
            &self.positions[v2],
        );
        if normal.dot(&self.normals[v0]) < -1e-16 {
            normal = -normal;
        }
        normal.dot(&self.normals[v0]) > -1e-16
            && normal.dot(&self.normals[v1]) > -1e-16
            && normal.dot(&self.normals[v2]) > -1e-16
    }

    /// Pivot the ball around `edge` and return the first sample it
    /// strikes, together with the pivoted ball center.
    ///
    /// Candidates come from a 2·radius neighborhood of the edge
    /// midpoint: any point on the pivoted ball is within radius of its
    /// center, which itself stays within radius of the midpoint. Among
    /// the candidates admitting an empty ball, the one reached by the
    /// smallest rotation from the current ball center wins; rotations
    /// past the half-space of the current triangle are measured beyond
    /// pi so candidates behind the rotation plane lose.
    fn find_candidate(&self, edge: usize, radius: f64) -> Option<(usize, Point3d)> {
        let (src, tgt, t0) = {
            let e = &self.edges[edge];
            (
                e.source,
                e.target,
                e.triangle0
                    .expect("pivoting requires an edge with an adjacent triangle"),
            )
        };
        let opp = self
            .opposite_vertex(edge)
            .expect("pivoting requires an edge with an adjacent triangle");

        let src_pos = self.positions[src];
        let tgt_pos = self.positions[tgt];
        let opp_pos = self.positions[opp];

        let mp = Point3d::from(0.5 * (src_pos.coords + tgt_pos.coords));
        let center = self.triangles[t0].ball_center;

        let mut v = tgt_pos - src_pos;
        v /= v.norm();
        let mut a = center - mp;
        a /= a.norm();

        let neighbors = self.kdtree.find_radius_neighbors(&mp, 2.0 * radius);

        let mut min_angle = 2.0 * PI;
        let mut best: Option<(usize, Point3d)> = None;

        for &(nbidx, _) in &neighbors {
            if nbidx == src || nbidx == tgt || nbidx == opp {
                continue;
            }
            let candidate_pos = self.positions[nbidx];

            // a candidate in the plane of the current triangle must not
            // fold the new triangle across the existing one
            let coplanar = points_coplanar(&src_pos, &tgt_pos, &opp_pos, &candidate_pos);
            if coplanar
                && (segments_minimum_distance(&mp, &candidate_pos, &src_pos, &opp_pos) < 1e-12
                    || segments_minimum_distance(&mp, &candidate_pos, &tgt_pos, &opp_pos) < 1e-12)
            {
                continue;
            }

            let Some(new_center) = self.ball_center(src, tgt, nbidx, radius) else {
                continue;
            };

            let mut b = new_center - mp;
            b /= b.norm();

            let cosinus = a.dot(&b).clamp(-1.0, 1.0);
            let mut angle = cosinus.acos();
            if a.cross(&b).dot(&v) < 0.0 {
                angle = 2.0 * PI - angle;
            }
            if angle >= min_angle {
                continue;
            }

            let mut empty_ball = true;
            for &(nbidx2, _) in &neighbors {
                if nbidx2 == src || nbidx2 == tgt || nbidx2 == nbidx {
                    continue;
                }
                if (new_center - self.positions[nbidx2]).norm() < radius - 1e-16 {
                    empty_ball = false;
                    break;
                }
            }
            if empty_ball {
                min_angle = angle;
                best = Some((nbidx, new_center));
            }
        }

        best
    }

    fn demote_to_border(&mut self, edge: usize) {
        self.edges[edge].kind = EdgeType::Border;
        self.border_edges.push(edge);
    }

    /// Grow the triangulation until the front queue drains.
    ///
    /// Edges may stop being front edges while queued, so every popped
    /// edge is re-checked. Edges of a freshly created triangle go to the
    /// head of the queue so the front advances locally.
    fn expand_triangulation(&mut self, radius: f64) {
        while let Some(edge) = self.edge_front.pop_front() {
            if self.edges[edge].kind != EdgeType::Front {
                continue;
            }

            let (src, tgt) = (self.edges[edge].source, self.edges[edge].target);

            let Some((candidate, center)) = self.find_candidate(edge, radius) else {
                self.demote_to_border(edge);
                continue;
            };
            if self.vertices[candidate].kind == VertexType::Inner
                || !self.compatible(candidate, src, tgt)
            {
                self.demote_to_border(edge);
                continue;
            }

            let e0 = self.edge_between(candidate, src);
            let e1 = self.edge_between(candidate, tgt);
            if e0.is_some_and(|e| self.edges[e].kind != EdgeType::Front)
                || e1.is_some_and(|e| self.edges[e].kind != EdgeType::Front)
            {
                self.demote_to_border(edge);
                continue;
            }

            self.create_triangle(src, tgt, candidate, center);

            for pair in [(candidate, src), (candidate, tgt)] {
                let e = self
                    .edge_between(pair.0, pair.1)
                    .expect("triangle creation links its edges");
                if self.edges[e].kind == EdgeType::Front {
                    self.edge_front.push_front(e);
                }
            }
        }
    }

    /// Test whether (v0, v1, v2) can start a new triangulation patch,
    /// returning the ball center on success
    fn try_triangle_seed(
        &self,
        v0: usize,
        v1: usize,
        v2: usize,
        neighbors: &[(usize, f64)],
        radius: f64,
    ) -> Option<Point3d> {
        if !self.compatible(v0, v1, v2) {
            return None;
        }

        if let Some(e0) = self.edge_between(v0, v2) {
            if self.edges[e0].kind == EdgeType::Inner {
                return None;
            }
        }
        if let Some(e1) = self.edge_between(v1, v2) {
            if self.edges[e1].kind == EdgeType::Inner {
                return None;
            }
        }

        let center = self.ball_center(v0, v1, v2, radius)?;

        for &(nb, _) in neighbors {
            if nb == v0 || nb == v1 || nb == v2 {
                continue;
            }
            if (center - self.positions[nb]).norm() < radius - 1e-16 {
                return None;
            }
        }

        Some(center)
    }

    /// Look for a seed triangle around vertex `vidx`; on success the new
    /// front edges are queued and the front is ready to expand
    fn try_seed(&mut self, vidx: usize, radius: f64) -> bool {
        let neighbors = self
            .kdtree
            .find_radius_neighbors(&self.positions[vidx], 2.0 * radius);
        if neighbors.len() < 3 {
            return false;
        }

        for i0 in 0..neighbors.len() {
            let nb0 = neighbors[i0].0;
            if self.vertices[nb0].kind != VertexType::Orphan || nb0 == vidx {
                continue;
            }

            let mut seed = None;
            for &(nb1, _) in &neighbors[i0 + 1..] {
                if self.vertices[nb1].kind != VertexType::Orphan || nb1 == vidx {
                    continue;
                }
                if let Some(center) = self.try_triangle_seed(vidx, nb0, nb1, &neighbors, radius) {
                    seed = Some((nb1, center));
                    break;
                }
            }
            let Some((nb1, center)) = seed else {
                continue;
            };

            // a seed triangle may only reuse edges that are still open
            let front_or_absent = |edge: Option<usize>| match edge {
                Some(e) => self.edges[e].kind == EdgeType::Front,
                None => true,
            };
            if !front_or_absent(self.edge_between(vidx, nb1))
                || !front_or_absent(self.edge_between(nb0, nb1))
                || !front_or_absent(self.edge_between(vidx, nb0))
            {
                continue;
            }

            self.create_triangle(vidx, nb0, nb1, center);

            for pair in [(vidx, nb1), (nb0, nb1), (vidx, nb0)] {
                let e = self
                    .edge_between(pair.0, pair.1)
                    .expect("triangle creation links its edges");
                if self.edges[e].kind == EdgeType::Front {
                    self.edge_front.push_front(e);
                }
            }

            if !self.edge_front.is_empty() {
                debug!(vertex = vidx, "seed triangle found");
                return true;
            }
        }

        false
    }

    /// Scan vertices in index order, seeding and expanding a patch from
    /// every orphan that admits one
    fn find_seed_triangles(&mut self, radius: f64) {
        for vidx in 0..self.vertices.len() {
            if self.vertices[vidx].kind != VertexType::Orphan {
                continue;
            }
            if self.try_seed(vidx, radius) {
                self.expand_triangulation(radius);
            }
        }
    }

    /// Give border edges whose triangle admits an empty ball at the new
    /// radius another chance on the front
    fn reactivate_border_edges(&mut self, radius: f64) {
        let borders = std::mem::take(&mut self.border_edges);
        for edge in borders {
            let t0 = self.edges[edge]
                .triangle0
                .expect("border edge has an adjacent triangle");
            let [v0, v1, v2] = self.triangles[t0].vertices;

            let reactivated = match self.ball_center(v0, v1, v2, radius) {
                Some(center) => self
                    .kdtree
                    .find_radius_neighbors(&center, radius)
                    .iter()
                    .all(|&(idx, _)| idx == v0 || idx == v1 || idx == v2),
                None => false,
            };

            if reactivated {
                self.edges[edge].kind = EdgeType::Front;
                self.edge_front.push_back(edge);
            } else {
                self.border_edges.push(edge);
            }
        }
    }

    /// Run the reconstruction over the ordered radius sequence and
    /// return the accumulated mesh
    fn run(mut self, radii: &[f64]) -> TriangleMesh {
        self.mesh.faces.clear();
        if let Some(face_normals) = &mut self.mesh.face_normals {
            face_normals.clear();
        }

        for &radius in radii {
            debug!(radius, "ball pivoting pass");

            self.reactivate_border_edges(radius);

            if self.edge_front.is_empty() {
                self.find_seed_triangles(radius);
            } else {
                self.expand_triangulation(radius);
            }

            debug!(radius, triangles = self.mesh.faces.len(), "pass finished");
        }

        self.mesh
    }
}

fn validate_radii(radii: &[f64]) -> Result<()> {
    if !radii.iter().all(|&r| r > 0.0) {
        return Err(Error::InvalidData(
            "ball pivoting radii must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Ball pivoting surface reconstruction
///
/// Rolls balls of the given radii (in order, typically small to large)
/// over the oriented point cloud and returns the triangle mesh the balls
/// trace out. Vertex positions and normals are copied verbatim from the
/// cloud; faces carry per-face normals consistent with the point
/// normals. The mesh may be empty or partial where no ball of any given
/// radius fits the sampling.
///
/// # Arguments
/// * `cloud` - Point cloud with oriented unit normals
/// * `radii` - Ball radii to apply in sequence, each > 0
///
/// # Returns
/// * `Result<TriangleMesh>` - Reconstructed triangle mesh
pub fn ball_pivoting_reconstruction(
    cloud: &PointCloud<NormalPoint3d>,
    radii: &[f64],
) -> Result<TriangleMesh> {
    if !cloud.has_normals() {
        return Err(Error::InvalidData(
            "ball pivoting requires oriented normals".to_string(),
        ));
    }
    validate_radii(radii)?;

    Ok(BallPivoting::new(cloud.positions(), cloud.normals(), None).run(radii))
}

/// Ball pivoting surface reconstruction with vertex colors
///
/// Same as [`ball_pivoting_reconstruction`], with the cloud's colors
/// copied verbatim onto the mesh vertices.
pub fn ball_pivoting_reconstruction_colored(
    cloud: &PointCloud<ColoredNormalPoint3d>,
    radii: &[f64],
) -> Result<TriangleMesh> {
    if !cloud.has_normals() {
        return Err(Error::InvalidData(
            "ball pivoting requires oriented normals".to_string(),
        ));
    }
    validate_radii(radii)?;

    let mesh = BallPivoting::new(cloud.positions(), cloud.normals(), Some(cloud.colors()))
        .run(radii);
    Ok(mesh)
}

/// Estimate a ball radius from the sampling density
///
/// Averages the distances to the k nearest neighbors over the cloud and
/// scales by 1.5, so the ball comfortably bridges typical point
/// spacings. Returns 1.0 for clouds too small to measure.
pub fn estimate_ball_radius(cloud: &PointCloud<NormalPoint3d>, k: usize) -> f64 {
    if cloud.len() < 2 || k == 0 {
        return 1.0;
    }

    let positions = cloud.positions();
    let kdtree = KdTree::new(&positions);
    let k_query = k.min(cloud.len() - 1);

    let mut total = 0.0;
    let mut count = 0usize;
    for position in &positions {
        // the nearest result is the query point itself
        for (_, d2) in kdtree.find_k_nearest(position, k_query + 1).into_iter().skip(1) {
            total += d2.sqrt();
            count += 1;
        }
    }

    if count == 0 {
        return 1.0;
    }
    1.5 * total / count as f64
}
