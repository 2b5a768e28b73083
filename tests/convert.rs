//! File to file conversion

use std::fs;
use std::path::PathBuf;

use byteorder::{LittleEndian, WriteBytesExt};
use ply2obj::Error;

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("ply2obj-{}-{name}", std::process::id()))
}

#[test]
fn test_convert_binary_file() {
    let input = scratch_path("tetra.ply");
    let output = scratch_path("tetra.obj");

    let mut data = b"ply\nformat binary_little_endian 1.0\nelement vertex 4\nproperty float x\nproperty float y\nproperty float z\nelement face 4\nproperty list uchar uint vertex_indices\nend_header\n".to_vec();
    for [x, y, z] in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]] {
        data.write_f32::<LittleEndian>(x).unwrap();
        data.write_f32::<LittleEndian>(y).unwrap();
        data.write_f32::<LittleEndian>(z).unwrap();
    }
    for face in [[0u32, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]] {
        data.write_u8(3).unwrap();
        for i in face {
            data.write_u32::<LittleEndian>(i).unwrap();
        }
    }
    fs::write(&input, data).unwrap();

    let mesh = ply2obj::convert(&input, &output).unwrap();
    assert_eq!(mesh.vertices.len(), 4);
    assert_eq!(mesh.triangles.len(), 4);

    let obj = fs::read_to_string(&output).unwrap();
    assert!(obj.starts_with("# Converted from PLY to OBJ by ply2obj\n"));
    assert!(obj.contains("\nv 0 0 1\n"));
    assert!(obj.contains("\nf 2 3 4\n"));

    fs::remove_file(&input).ok();
    fs::remove_file(&output).ok();
}

#[test]
fn test_failed_decode_writes_nothing() {
    let input = scratch_path("broken.ply");
    let output = scratch_path("broken.obj");
    fs::write(&input, "ply\nformat ascii 1.0\nelement vertex 2\nproperty float x\n").unwrap();

    let err = ply2obj::convert(&input, &output).unwrap_err();
    assert!(matches!(err, Error::InvalidHeader(_)));
    assert!(!output.exists());

    fs::remove_file(&input).ok();
}

#[test]
fn test_missing_input() {
    let err = ply2obj::read_ply(scratch_path("does-not-exist.ply")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
