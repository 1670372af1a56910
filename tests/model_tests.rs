// Host-side tests for glTF loading. Fixtures are assembled in memory.

use exhibit_core::model::*;
use glam::Vec3;

/// Minimal binary glTF: one triangle under a node translated by `y = 1`.
fn triangle_glb() -> Vec<u8> {
    let positions: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 2.0, 0.0]];
    let indices: [u16; 3] = [0, 1, 2];

    let mut bin = Vec::new();
    for p in positions.iter().flatten() {
        bin.extend_from_slice(&p.to_le_bytes());
    }
    for i in indices {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    let byte_length = bin.len();
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let json = format!(
        r#"{{
  "asset": {{"version": "2.0"}},
  "scene": 0,
  "scenes": [{{"nodes": [0]}}],
  "nodes": [{{"mesh": 0, "translation": [0.0, 1.0, 0.0]}}],
  "meshes": [{{"primitives": [{{"attributes": {{"POSITION": 0}}, "indices": 1}}]}}],
  "buffers": [{{"byteLength": {byte_length}}}],
  "bufferViews": [
    {{"buffer": 0, "byteOffset": 0, "byteLength": 36}},
    {{"buffer": 0, "byteOffset": 36, "byteLength": 6}}
  ],
  "accessors": [
    {{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
      "min": [0.0, 0.0, 0.0], "max": [1.0, 2.0, 0.0]}},
    {{"bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR"}}
  ]
}}"#
    );
    let mut json = json.into_bytes();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }

    let total = 12 + 8 + json.len() + 8 + bin.len();
    let mut glb = Vec::with_capacity(total);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total as u32).to_le_bytes());
    glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"JSON");
    glb.extend_from_slice(&json);
    glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"BIN\0");
    glb.extend_from_slice(&bin);
    glb
}

#[test]
fn glb_triangle_is_flattened_into_world_space() {
    let mesh = parse_gltf(&triangle_glb()).unwrap();
    assert_eq!(mesh.triangle_count(), 1);
    assert_eq!(mesh.indices, vec![0, 1, 2]);
    assert_eq!(mesh.bounds.min, Vec3::new(0.0, 1.0, 0.0));
    assert_eq!(mesh.bounds.max, Vec3::new(1.0, 3.0, 0.0));
    for v in &mesh.vertices {
        // no normals in the file: generated from the winding
        assert_eq!(v.normal, [0.0, 0.0, 1.0]);
        // default material
        assert_eq!(v.color, [1.0, 1.0, 1.0, 1.0]);
    }
}

#[test]
fn draco_compressed_files_are_rejected() {
    let gltf = br#"{
  "asset": {"version": "2.0"},
  "extensionsUsed": ["KHR_draco_mesh_compression"],
  "extensionsRequired": ["KHR_draco_mesh_compression"]
}"#;
    match parse_gltf(gltf) {
        Err(ModelError::Compressed(ext)) => assert_eq!(ext, DRACO_EXTENSION),
        other => panic!("expected a compression error, got {other:?}"),
    }
}

#[test]
fn files_without_geometry_are_rejected() {
    let gltf = br#"{"asset": {"version": "2.0"}, "scenes": [{"nodes": []}]}"#;
    assert!(matches!(parse_gltf(gltf), Err(ModelError::NoGeometry)));
    let no_scene = br#"{"asset": {"version": "2.0"}}"#;
    assert!(matches!(parse_gltf(no_scene), Err(ModelError::NoScene)));
    assert!(matches!(parse_gltf(b"not a model"), Err(ModelError::Gltf(_))));
}

#[test]
fn smooth_normals_fall_back_to_up_for_degenerate_triangles() {
    let positions = [Vec3::ZERO, Vec3::X, Vec3::X * 2.0, Vec3::Z];
    let normals = smooth_normals(&positions, &[0, 1, 2]);
    assert_eq!(normals, vec![Vec3::Y; 4]);

    let normals = smooth_normals(&[Vec3::ZERO, Vec3::X, Vec3::Z], &[0, 2, 1, 0, 9, 1]);
    assert!(normals[0].abs_diff_eq(Vec3::Y, 1e-6));
}

#[test]
fn download_progress_percentages() {
    assert_eq!(progress_percent(0, Some(200)), Some(0));
    assert_eq!(progress_percent(1, Some(3)), Some(33));
    assert_eq!(progress_percent(2, Some(3)), Some(67));
    assert_eq!(progress_percent(250, Some(200)), Some(100));
    assert_eq!(progress_percent(10, Some(0)), None);
    assert_eq!(progress_percent(10, None), None);
}
