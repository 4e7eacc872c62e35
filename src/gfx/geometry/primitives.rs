//! # Primitive Shape Generation
//!
//! All shapes are generated with outward normals, UVs in [0, 1] with v up,
//! and counter-clockwise front faces.

use super::GeometryData;
use std::f32::consts::PI;

/// Generate a plane in the XY plane facing +Z, centred at the origin.
///
/// Rows run from the top edge (+Y) down, so `uv.v` is 1 on the top edge.
pub fn generate_plane(
    width: f32,
    height: f32,
    width_segments: u32,
    height_segments: u32,
) -> GeometryData {
    let mut data = GeometryData::new();
    build_face(
        &mut data,
        FaceAxes {
            u: 0,
            v: 1,
            w: 2,
        },
        1.0,
        -1.0,
        width,
        height,
        0.0,
        width_segments.max(1),
        height_segments.max(1),
    );
    data
}

/// Generate a box centred at the origin.
///
/// Faces are emitted in the order +X, -X, +Y, -Y, +Z, -Z, each a subdivided
/// grid with its own 0..1 UV square.
pub fn generate_box(
    width: f32,
    height: f32,
    depth: f32,
    width_segments: u32,
    height_segments: u32,
    depth_segments: u32,
) -> GeometryData {
    let mut data = GeometryData::new();

    let ws = width_segments.max(1);
    let hs = height_segments.max(1);
    let ds = depth_segments.max(1);

    let zyx = FaceAxes { u: 2, v: 1, w: 0 };
    let xzy = FaceAxes { u: 0, v: 2, w: 1 };
    let xyz = FaceAxes { u: 0, v: 1, w: 2 };

    build_face(&mut data, zyx, -1.0, -1.0, depth, height, width, ds, hs);
    build_face(&mut data, zyx, 1.0, -1.0, depth, height, -width, ds, hs);
    build_face(&mut data, xzy, 1.0, 1.0, width, depth, height, ws, ds);
    build_face(&mut data, xzy, 1.0, -1.0, width, depth, -height, ws, ds);
    build_face(&mut data, xyz, 1.0, -1.0, width, height, depth, ws, hs);
    build_face(&mut data, xyz, -1.0, -1.0, width, height, -depth, ws, hs);

    data
}

/// Which vertex component each face-local axis writes to
#[derive(Clone, Copy)]
struct FaceAxes {
    u: usize,
    v: usize,
    w: usize,
}

/// Emits one subdivided rectangle. `depth` places the face along its normal
/// axis; its sign picks the normal direction (zero faces positive).
#[allow(clippy::too_many_arguments)]
fn build_face(
    data: &mut GeometryData,
    axes: FaceAxes,
    u_dir: f32,
    v_dir: f32,
    width: f32,
    height: f32,
    depth: f32,
    grid_x: u32,
    grid_y: u32,
) {
    let segment_width = width / grid_x as f32;
    let segment_height = height / grid_y as f32;
    let half_width = width * 0.5;
    let half_height = height * 0.5;
    let half_depth = depth * 0.5;
    let base = data.vertex_count() as u32;

    for iy in 0..=grid_y {
        let y = iy as f32 * segment_height - half_height;
        for ix in 0..=grid_x {
            let x = ix as f32 * segment_width - half_width;

            let mut position = [0.0; 3];
            position[axes.u] = x * u_dir;
            position[axes.v] = y * v_dir;
            position[axes.w] = half_depth;

            let mut normal = [0.0; 3];
            normal[axes.w] = if depth >= 0.0 { 1.0 } else { -1.0 };

            let uv = [ix as f32 / grid_x as f32, 1.0 - iy as f32 / grid_y as f32];
            data.push_vertex(position, normal, uv);
        }
    }

    let row = grid_x + 1;
    for iy in 0..grid_y {
        for ix in 0..grid_x {
            let a = base + ix + row * iy;
            let b = base + ix + row * (iy + 1);
            let c = base + (ix + 1) + row * (iy + 1);
            let d = base + (ix + 1) + row * iy;
            data.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
}

/// Generate a cylinder along the Y axis, centred at the origin.
///
/// A zero radius at either end collapses that ring into an apex and drops its
/// cap.
pub fn generate_cylinder(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    radial_segments: u32,
    height_segments: u32,
    open_ended: bool,
) -> GeometryData {
    let mut data = GeometryData::new();

    let radial = radial_segments.max(3);
    let rows = height_segments.max(1);
    let half_height = height * 0.5;
    let slope = (radius_bottom - radius_top) / height;

    let mut grid: Vec<Vec<u32>> = Vec::with_capacity(rows as usize + 1);
    for y in 0..=rows {
        let v = y as f32 / rows as f32;
        let radius = v * (radius_bottom - radius_top) + radius_top;
        let mut ring = Vec::with_capacity(radial as usize + 1);

        for x in 0..=radial {
            let u = x as f32 / radial as f32;
            let theta = u * 2.0 * PI;
            let (sin_theta, cos_theta) = theta.sin_cos();

            let position = [radius * sin_theta, -v * height + half_height, radius * cos_theta];
            let normal = normalize([sin_theta, slope, cos_theta]);

            ring.push(data.vertex_count() as u32);
            data.push_vertex(position, normal, [u, 1.0 - v]);
        }
        grid.push(ring);
    }

    for x in 0..radial as usize {
        for y in 0..rows as usize {
            let a = grid[y][x];
            let b = grid[y + 1][x];
            let c = grid[y + 1][x + 1];
            let d = grid[y][x + 1];

            if radius_top > 0.0 || y != 0 {
                data.indices.extend_from_slice(&[a, b, d]);
            }
            if radius_bottom > 0.0 || y != rows as usize - 1 {
                data.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    if !open_ended {
        if radius_top > 0.0 {
            build_cap(&mut data, true, radius_top, half_height, radial);
        }
        if radius_bottom > 0.0 {
            build_cap(&mut data, false, radius_bottom, half_height, radial);
        }
    }

    data
}

fn build_cap(data: &mut GeometryData, top: bool, radius: f32, half_height: f32, radial: u32) {
    let sign = if top { 1.0 } else { -1.0 };
    let y = half_height * sign;
    let normal = [0.0, sign, 0.0];

    // One centre vertex per segment so every wedge gets its own UV
    let center_start = data.vertex_count() as u32;
    for _ in 0..radial {
        data.push_vertex([0.0, y, 0.0], normal, [0.5, 0.5]);
    }
    let ring_start = data.vertex_count() as u32;

    for x in 0..=radial {
        let theta = x as f32 / radial as f32 * 2.0 * PI;
        let (sin_theta, cos_theta) = theta.sin_cos();
        data.push_vertex(
            [radius * sin_theta, y, radius * cos_theta],
            normal,
            [cos_theta * 0.5 + 0.5, sin_theta * 0.5 * sign + 0.5],
        );
    }

    for x in 0..radial {
        let c = center_start + x;
        let i = ring_start + x;
        if top {
            data.indices.extend_from_slice(&[i, i + 1, c]);
        } else {
            data.indices.extend_from_slice(&[i + 1, i, c]);
        }
    }
}

/// Generate a cone with its apex at +Y and its base cap at -Y.
///
/// With 4 radial segments this is a square pyramid whose corners sit on the
/// ±X and ±Z axes.
pub fn generate_cone(radius: f32, height: f32, radial_segments: u32) -> GeometryData {
    generate_cylinder(0.0, radius, height, radial_segments, 1, false)
}

/// Generate a UV sphere centred at the origin.
///
/// # Arguments
/// * `radius` - Sphere radius
/// * `width_segments` - Number of longitude segments
/// * `height_segments` - Number of latitude segments
pub fn generate_sphere(radius: f32, width_segments: u32, height_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let ws = width_segments.max(3);
    let hs = height_segments.max(2);

    let mut grid: Vec<Vec<u32>> = Vec::with_capacity(hs as usize + 1);
    for iy in 0..=hs {
        let v = iy as f32 / hs as f32;

        // Shift the pole UVs half a segment so each pole triangle samples its own column
        let u_offset = if iy == 0 {
            0.5 / ws as f32
        } else if iy == hs {
            -0.5 / ws as f32
        } else {
            0.0
        };

        let theta = v * PI;
        let mut ring = Vec::with_capacity(ws as usize + 1);
        for ix in 0..=ws {
            let u = ix as f32 / ws as f32;
            let phi = u * 2.0 * PI;

            let position = [
                -radius * phi.cos() * theta.sin(),
                radius * theta.cos(),
                radius * phi.sin() * theta.sin(),
            ];
            let normal = normalize(position);

            ring.push(data.vertex_count() as u32);
            data.push_vertex(position, normal, [u + u_offset, 1.0 - v]);
        }
        grid.push(ring);
    }

    for iy in 0..hs as usize {
        for ix in 0..ws as usize {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];

            if iy != 0 {
                data.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != hs as usize - 1 {
                data.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    data
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let length = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if length > 0.0 {
        [v[0] / length, v[1] / length, v[2] / length]
    } else {
        [0.0, 1.0, 0.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face_normal(data: &GeometryData, tri: usize) -> [f32; 3] {
        let i = &data.indices[tri * 3..tri * 3 + 3];
        let p0 = data.vertices[i[0] as usize];
        let p1 = data.vertices[i[1] as usize];
        let p2 = data.vertices[i[2] as usize];
        let e1 = [p1[0] - p0[0], p1[1] - p0[1], p1[2] - p0[2]];
        let e2 = [p2[0] - p0[0], p2[1] - p0[1], p2[2] - p0[2]];
        [
            e1[1] * e2[2] - e1[2] * e2[1],
            e1[2] * e2[0] - e1[0] * e2[2],
            e1[0] * e2[1] - e1[1] * e2[0],
        ]
    }

    fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    /// Every triangle winds counter-clockwise when seen from its vertex normals
    fn assert_front_faces_outward(data: &GeometryData) {
        for tri in 0..data.triangle_count() {
            let n = face_normal(data, tri);
            let vn = data.normals[data.indices[tri * 3] as usize];
            assert!(dot(n, vn) > 0.0, "triangle {} winds against its normal", tri);
        }
    }

    #[test]
    fn test_plane_generation() {
        let plane = generate_plane(2.0, 2.0, 2, 2);
        assert_eq!(plane.vertices.len(), 9); // 3x3 grid
        assert_eq!(plane.indices.len(), 24); // 4 quads * 2 triangles * 3 indices
        assert_eq!(plane.vertices[0], [-1.0, 1.0, 0.0]);
        assert_eq!(plane.tex_coords[0], [0.0, 1.0]);
        assert_eq!(plane.vertices[8], [1.0, -1.0, 0.0]);
        assert_front_faces_outward(&plane);
    }

    #[test]
    fn test_box_generation() {
        let cube = generate_box(4.0, 2.5, 4.0, 1, 1, 1);
        assert_eq!(cube.vertex_count(), 24); // 6 faces * 4 vertices
        assert_eq!(cube.triangle_count(), 12);
        assert_front_faces_outward(&cube);

        for (p, n) in cube.vertices.iter().zip(&cube.normals) {
            assert!(p[0].abs() <= 2.0 && p[1].abs() <= 1.25 && p[2].abs() <= 2.0);
            // Each vertex lies on the face its normal points out of
            assert!(dot(*p, *n) > 0.0);
        }
    }

    #[test]
    fn test_cone_has_apex_and_base_only() {
        let cone = generate_cone(3.5, 1.5, 4);
        // 2 rings of 5 + 4 cap centres + 5 cap ring vertices
        assert_eq!(cone.vertex_count(), 19);
        // 4 side triangles (apex row keeps one per quad) + 4 cap wedges
        assert_eq!(cone.triangle_count(), 8);
        assert!(cone.vertices.iter().all(|p| p[1] == 0.75 || p[1] == -0.75));
        assert_front_faces_outward(&cone);

        let base_corner = cone.vertices[5];
        assert!((base_corner[2] - 3.5).abs() < 1e-5);
    }

    #[test]
    fn test_cylinder_caps() {
        let closed = generate_cylinder(1.0, 1.0, 2.0, 8, 1, false);
        let open = generate_cylinder(1.0, 1.0, 2.0, 8, 1, true);
        assert_eq!(closed.triangle_count(), open.triangle_count() + 16);
        assert_front_faces_outward(&closed);
    }

    #[test]
    fn test_sphere_generation() {
        let sphere = generate_sphere(1.0, 16, 16);
        assert_eq!(sphere.vertex_count(), 17 * 17);
        // Pole rows contribute one triangle per segment
        assert_eq!(sphere.triangle_count(), 16 * 16 * 2 - 2 * 16);
        assert_eq!(sphere.vertices.len(), sphere.normals.len());
        assert_eq!(sphere.vertices.len(), sphere.tex_coords.len());
        for p in &sphere.vertices {
            let r = dot(*p, *p).sqrt();
            assert!((r - 1.0).abs() < 1e-5);
        }
        assert_front_faces_outward(&sphere);
    }
}
