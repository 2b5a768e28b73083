//! In-memory mesh handed from the PLY decoder to the OBJ encoder.

/// Which optional per-vertex attributes are present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Attributes {
    pub normals: bool,
    pub colors: bool,
    pub tex_coords: bool,
}

/// A single decoded vertex.
///
/// Optional attributes are `None` when the vertex carries no value for them,
/// which is different from carrying a zero value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: Option<[f32; 3]>,
    /// RGB in `[0, 1]`.
    pub color: Option<[f32; 3]>,
    pub tex_coord: Option<[f32; 2]>,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: [x, y, z],
            ..Default::default()
        }
    }

    pub fn with_normal(mut self, normal: [f32; 3]) -> Self {
        self.normal = Some(normal);
        self
    }

    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_tex_coord(mut self, tex_coord: [f32; 2]) -> Self {
        self.tex_coord = Some(tex_coord);
        self
    }
}

/// Zero-based vertex indices of one triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Triangle {
    pub v0: u32,
    pub v1: u32,
    pub v2: u32,
}

impl Triangle {
    pub fn new(v0: u32, v1: u32, v2: u32) -> Self {
        Self { v0, v1, v2 }
    }

    pub fn indices(&self) -> [u32; 3] {
        [self.v0, self.v1, self.v2]
    }
}

/// Fan-triangulates a polygon, appending `n - 2` triangles that all share
/// the first index. Polygons with fewer than three corners produce nothing.
/// No convexity check or winding correction is done.
pub fn triangulate_fan(polygon: &[u32], out: &mut Vec<Triangle>) {
    let Some((&first, rest)) = polygon.split_first() else {
        return;
    };
    out.extend(
        rest.windows(2)
            .map(|pair| Triangle::new(first, pair[0], pair[1])),
    );
}

/// A triangle mesh with optional per-vertex attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
    /// Logical OR of the per-vertex attribute presence.
    pub attributes: Attributes,
}

impl Mesh {
    /// Builds a mesh and derives its attribute flags from the vertices.
    pub fn new(vertices: Vec<Vertex>, triangles: Vec<Triangle>) -> Self {
        let attributes = vertices
            .iter()
            .fold(Attributes::default(), |acc, v| Attributes {
                normals: acc.normals || v.normal.is_some(),
                colors: acc.colors || v.color.is_some(),
                tex_coords: acc.tex_coords || v.tex_coord.is_some(),
            });

        Self {
            vertices,
            triangles,
            attributes,
        }
    }

    pub fn has_normals(&self) -> bool {
        self.attributes.normals
    }

    pub fn has_colors(&self) -> bool {
        self.attributes.colors
    }

    pub fn has_tex_coords(&self) -> bool {
        self.attributes.tex_coords
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fan(polygon: &[u32]) -> Vec<Triangle> {
        let mut out = Vec::new();
        triangulate_fan(polygon, &mut out);
        out
    }

    #[test]
    fn test_triangle_passes_through() {
        assert_eq!(fan(&[4, 9, 2]), vec![Triangle::new(4, 9, 2)]);
    }

    #[test]
    fn test_quad_fan() {
        assert_eq!(
            fan(&[0, 1, 2, 3]),
            vec![Triangle::new(0, 1, 2), Triangle::new(0, 2, 3)]
        );
    }

    #[test]
    fn test_ngon_fan_law() {
        let polygon: Vec<u32> = (10..17).collect();
        let triangles = fan(&polygon);
        assert_eq!(triangles.len(), polygon.len() - 2);

        for tri in &triangles {
            assert_eq!(tri.v0, polygon[0]);
        }

        let mut seen: Vec<u32> = triangles.iter().flat_map(|t| t.indices()).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen, polygon);
    }

    #[test]
    fn test_degenerate_polygons() {
        assert!(fan(&[]).is_empty());
        assert!(fan(&[1]).is_empty());
        assert!(fan(&[1, 2]).is_empty());
    }

    #[test]
    fn test_attribute_flags_are_or_of_vertices() {
        let mesh = Mesh::new(
            vec![
                Vertex::new(0.0, 0.0, 0.0),
                Vertex::new(1.0, 0.0, 0.0).with_normal([0.0, 1.0, 0.0]),
                Vertex::new(0.0, 1.0, 0.0),
            ],
            vec![Triangle::new(0, 1, 2)],
        );
        assert!(mesh.has_normals());
        assert!(!mesh.has_colors());
        assert!(!mesh.has_tex_coords());

        let empty = Mesh::new(Vec::new(), Vec::new());
        assert_eq!(empty.attributes, Attributes::default());
    }
}
