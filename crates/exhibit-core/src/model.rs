//! glTF → flat triangle mesh.
//!
//! Node transforms and material base colours are baked into the vertices so
//! the renderer only ever deals with a single vertex/index buffer per model,
//! and the bounding box matches what the visitor actually sees.

use crate::bounds::Bounds;
use glam::{Mat3, Mat4, Vec3, Vec4};
use thiserror::Error;

pub const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";
pub const MESHOPT_EXTENSION: &str = "EXT_meshopt_compression";

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid glTF: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("compressed meshes ({0}) need an external decoder")]
    Compressed(String),
    #[error("glTF file has no scene")]
    NoScene,
    #[error("glTF scene contains no triangle geometry")]
    NoGeometry,
}

#[derive(Clone, Debug, Default)]
pub struct ModelMesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    pub bounds: Bounds,
}

impl ModelMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Parse a GLB (or self-contained `.gltf`) file.
pub fn parse_gltf(bytes: &[u8]) -> Result<ModelMesh, ModelError> {
    reject_compressed(bytes)?;
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes)?;
    let buffers = gltf::import_buffers(&document, None, blob)?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(ModelError::NoScene)?;

    let mut mesh = ModelMesh::default();
    for node in scene.nodes() {
        collect_node(&node, Mat4::IDENTITY, &buffers, &mut mesh);
    }
    if mesh.indices.is_empty() {
        return Err(ModelError::NoGeometry);
    }
    mesh.bounds = Bounds::from_points(mesh.vertices.iter().map(|v| Vec3::from(v.position)));
    log::debug!(
        "[model] {} vertices, {} triangles, size {:?}",
        mesh.vertices.len(),
        mesh.triangle_count(),
        mesh.bounds.size()
    );
    Ok(mesh)
}

fn reject_compressed(bytes: &[u8]) -> Result<(), ModelError> {
    let unchecked = gltf::Gltf::from_slice_without_validation(bytes)?;
    let required = unchecked
        .document
        .extensions_required()
        .find(|ext| *ext == DRACO_EXTENSION || *ext == MESHOPT_EXTENSION)
        .map(str::to_owned);
    match required {
        Some(ext) => Err(ModelError::Compressed(ext)),
        None => Ok(()),
    }
}

fn collect_node(
    node: &gltf::Node<'_>,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut ModelMesh,
) {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
    if let Some(mesh) = node.mesh() {
        let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!("[model] skipping non-triangle primitive ({:?})", primitive.mode());
                continue;
            }
            append_primitive(&primitive, world, normal_matrix, buffers, out);
        }
    }
    for child in node.children() {
        collect_node(&child, world, buffers, out);
    }
}

fn append_primitive(
    primitive: &gltf::Primitive<'_>,
    world: Mat4,
    normal_matrix: Mat3,
    buffers: &[gltf::buffer::Data],
    out: &mut ModelMesh,
) {
    let reader = primitive.reader(|b| buffers.get(b.index()).map(|d| d.0.as_slice()));
    let Some(positions) = reader.read_positions() else {
        return;
    };
    let positions: Vec<Vec3> = positions
        .map(|p| world.transform_point3(Vec3::from(p)))
        .collect();
    if positions.is_empty() {
        return;
    }

    let base_color = Vec4::from(primitive.material().pbr_metallic_roughness().base_color_factor());
    let colors: Vec<Vec4> = match reader.read_colors(0) {
        Some(c) => c.into_rgba_f32().map(|c| Vec4::from(c) * base_color).collect(),
        None => vec![base_color; positions.len()],
    };

    let local_indices: Vec<u32> = match reader.read_indices() {
        Some(ix) => ix.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    let normals: Vec<Vec3> = match reader.read_normals() {
        Some(n) => n
            .map(|n| (normal_matrix * Vec3::from(n)).normalize_or_zero())
            .collect(),
        None => smooth_normals(&positions, &local_indices),
    };

    let base = out.vertices.len() as u32;
    out.vertices.extend(positions.iter().enumerate().map(|(i, p)| MeshVertex {
        position: p.to_array(),
        normal: normals.get(i).copied().unwrap_or(Vec3::Y).to_array(),
        color: colors.get(i).copied().unwrap_or(base_color).to_array(),
    }));
    out.indices.extend(
        local_indices
            .chunks_exact(3)
            .filter(|tri| tri.iter().all(|&i| (i as usize) < positions.len()))
            .flatten()
            .map(|i| base + i),
    );
}

/// Area-weighted vertex normals for primitives exported without them.
pub fn smooth_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let n = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        acc[a] += n;
        acc[b] += n;
        acc[c] += n;
    }
    acc.into_iter()
        .map(|n| {
            let n = n.normalize_or_zero();
            if n == Vec3::ZERO {
                Vec3::Y
            } else {
                n
            }
        })
        .collect()
}

/// Download progress as a whole percentage, when the total size is known.
pub fn progress_percent(loaded: u64, total: Option<u64>) -> Option<u32> {
    let total = total.filter(|&t| t > 0)?;
    let pct = (loaded as f64 / total as f64 * 100.0).round();
    Some(pct.clamp(0.0, 100.0) as u32)
}
