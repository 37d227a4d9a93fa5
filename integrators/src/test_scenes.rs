//! Scenes shared by the tests of this crate.

use accelerators::{BVHAccel, BVHOptions};
use std::sync::Arc;
use tinsel_core::camera::Camera;
use tinsel_core::geometry::*;
use tinsel_core::material::Material;
use tinsel_core::primitive::*;
use tinsel_core::scene::Scene;
use tinsel_core::spectrum::*;

/// Appends the 2 triangles of the parallelogram `o`, `o + u`, `o + u + v`,
/// `o + v`. Its normal is `u x v`.
pub fn quad(triangles: &mut Vec<Triangle>, o: Point3f, u: Vector3f, v: Vector3f, material: u32) {
    triangles.push(Triangle::new(o, o + u, o + u + v, material));
    triangles.push(Triangle::new(o, o + u + v, o + v, material));
}

/// Builds a scene over a BVH with a black background.
pub fn build(triangles: Vec<Triangle>, materials: Vec<Material>, camera: Camera) -> Scene {
    let primitives = Arc::new(triangles);
    let bvh = BVHAccel::new(Arc::clone(&primitives), BVHOptions::default()).expect("bvh");
    Scene::new(primitives, materials, camera, Spectrum::ZERO, Arc::new(bvh)).expect("scene")
}

/// Radiance of the square light of `light_over_floor()`.
pub const FLOOR_LIGHT_LE: Float = 5.0;

/// Albedo of the floor of `light_over_floor()`.
pub const FLOOR_ALBEDO: Float = 0.5;

/// A diffuse floor at `y = 0` lit by a downward facing unit square light
/// centered at `(0, 1, 0)`.
pub fn light_over_floor() -> Scene {
    let mut triangles = vec![];
    quad(
        &mut triangles,
        Point3f::new(-2.0, 0.0, -2.0),
        Vector3f::new(0.0, 0.0, 4.0),
        Vector3f::new(4.0, 0.0, 0.0),
        0,
    );
    quad(
        &mut triangles,
        Point3f::new(-0.5, 1.0, -0.5),
        Vector3f::new(1.0, 0.0, 0.0),
        Vector3f::new(0.0, 0.0, 1.0),
        1,
    );
    let materials = vec![
        Material::diffuse(Spectrum::new(FLOOR_ALBEDO)),
        Material::emissive(Spectrum::new(FLOOR_LIGHT_LE)),
    ];
    let camera = Camera::look_at(
        Point3f::new(0.0, 0.6, 3.0),
        Point3f::new(0.0, 0.0, 0.0),
        Vector3f::new(0.0, 1.0, 0.0),
        60.0,
    )
    .expect("camera");
    build(triangles, materials, camera)
}

/// Radiance of the ceiling light of `closed_box()`.
pub const BOX_LIGHT_LE: Float = 10.0;

/// Albedo of the floor, ceiling, back and front walls of `closed_box()`.
pub const BOX_WALL_ALBEDO: Float = 0.7;

/// Corner and edges of the ceiling light of `closed_box()`. It faces down.
pub const BOX_LIGHT: ([Float; 3], [Float; 3], [Float; 3]) =
    ([-0.3, 0.99, -0.3], [0.6, 0.0, 0.0], [0.0, 0.0, 0.6]);

/// A closed box `[-1, 1]^3` with colored side walls and a small ceiling
/// light. The camera sits inside the box looking at the back wall.
pub fn closed_box() -> Scene {
    let mut triangles = vec![];
    let o = Point3f::new(-1.0, -1.0, -1.0);
    let x = Vector3f::new(2.0, 0.0, 0.0);
    let y = Vector3f::new(0.0, 2.0, 0.0);
    let z = Vector3f::new(0.0, 0.0, 2.0);

    quad(&mut triangles, o, z, x, 0); // floor
    quad(&mut triangles, o + y, x, z, 0); // ceiling
    quad(&mut triangles, o, x, y, 0); // back
    quad(&mut triangles, o + z, y, x, 0); // front
    quad(&mut triangles, o, y, z, 1); // left
    quad(&mut triangles, o + x, z, y, 2); // right
    let (c, u, v) = BOX_LIGHT;
    quad(
        &mut triangles,
        Point3f::new(c[0], c[1], c[2]),
        Vector3f::new(u[0], u[1], u[2]),
        Vector3f::new(v[0], v[1], v[2]),
        3,
    );

    let materials = vec![
        Material::diffuse(Spectrum::new(BOX_WALL_ALBEDO)),
        Material::diffuse(Spectrum::from_rgb(0.6, 0.1, 0.1)),
        Material::diffuse(Spectrum::from_rgb(0.1, 0.6, 0.1)),
        Material::emissive(Spectrum::new(BOX_LIGHT_LE)),
    ];
    let camera = Camera::look_at(
        Point3f::new(0.0, 0.0, 0.95),
        Point3f::new(0.0, 0.0, -1.0),
        Vector3f::new(0.0, 1.0, 0.0),
        60.0,
    )
    .expect("camera");
    build(triangles, materials, camera)
}
