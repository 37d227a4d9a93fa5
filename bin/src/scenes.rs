//! Built-in scenes

use accelerators::{BVHAccel, BVHOptions};
use std::sync::Arc;
use tinsel_core::app::SceneName;
use tinsel_core::camera::Camera;
use tinsel_core::error::BuildError;
use tinsel_core::geometry::*;
use tinsel_core::material::Material;
use tinsel_core::primitive::Triangle;
use tinsel_core::scene::Scene;
use tinsel_core::spectrum::*;

/// Geometry, materials and camera of a scene before its BVH is built.
pub struct SceneDescription {
    /// Triangles.
    pub triangles: Vec<Triangle>,

    /// Materials referenced by the triangles.
    pub materials: Vec<Material>,

    /// The camera.
    pub camera: Camera,

    /// Radiance of rays that leave the scene.
    pub background: Spectrum,
}

impl SceneDescription {
    /// Create an empty `SceneDescription`.
    ///
    /// * `camera`     - The camera.
    /// * `background` - Radiance of rays that leave the scene.
    fn new(camera: Camera, background: Spectrum) -> Self {
        Self {
            triangles: vec![],
            materials: vec![],
            camera,
            background,
        }
    }

    /// Adds a material and returns its index.
    ///
    /// * `material` - The material.
    fn material(&mut self, material: Material) -> u32 {
        self.materials.push(material);
        self.materials.len() as u32 - 1
    }

    /// Adds the parallelogram `o`, `o + u`, `o + u + v`, `o + v` facing
    /// along `u x v`.
    ///
    /// * `o`        - First corner.
    /// * `u`        - First edge.
    /// * `v`        - Second edge.
    /// * `material` - Material index.
    fn quad(&mut self, o: Point3f, u: Vector3f, v: Vector3f, material: u32) {
        self.triangles.push(Triangle::new(o, o + u, o + u + v, material));
        self.triangles.push(Triangle::new(o, o + u + v, o + v, material));
    }

    /// Adds a box rotated about the y axis with outward facing sides.
    ///
    /// * `center`   - Center of the box.
    /// * `size`     - Edge lengths.
    /// * `angle`    - Rotation about the y axis in degrees.
    /// * `material` - Material index.
    fn cuboid(&mut self, center: Point3f, size: Vector3f, angle: Float, material: u32) {
        let (sin, cos) = angle.to_radians().sin_cos();
        let ex = Vector3f::new(cos, 0.0, sin) * (0.5 * size.x);
        let ey = Vector3f::new(0.0, 0.5 * size.y, 0.0);
        let ez = Vector3f::new(-sin, 0.0, cos) * (0.5 * size.z);
        let corner = center - ex - ey - ez;

        self.quad(center + ex - ey - ez, ey * 2.0, ez * 2.0, material);
        self.quad(corner, ez * 2.0, ey * 2.0, material);
        self.quad(center - ex + ey - ez, ez * 2.0, ex * 2.0, material);
        self.quad(corner, ex * 2.0, ez * 2.0, material);
        self.quad(center - ex - ey + ez, ex * 2.0, ey * 2.0, material);
        self.quad(corner, ey * 2.0, ex * 2.0, material);
    }

    /// Adds a tessellated sphere with smooth shading normals.
    ///
    /// * `center`   - Center.
    /// * `radius`   - Radius.
    /// * `segments` - Subdivisions around the y axis.
    /// * `rings`    - Subdivisions from pole to pole.
    /// * `material` - Material index.
    fn sphere(&mut self, center: Point3f, radius: Float, segments: u32, rings: u32, material: u32) {
        let vertex = |i: u32, j: u32| {
            let theta = PI * i as Float / rings as Float;
            let phi = TWO_PI * j as Float / segments as Float;
            let n = Vector3f::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
            let uv = Point2f::new(j as Float / segments as Float, i as Float / rings as Float);
            (center + n * radius, n, uv)
        };

        for i in 0..rings {
            for j in 0..segments {
                let a = vertex(i, j);
                let b = vertex(i + 1, j);
                let c = vertex(i + 1, j + 1);
                let d = vertex(i, j + 1);

                // The ring at a pole collapses to a single point.
                if i + 1 < rings {
                    self.triangles.push(
                        Triangle::new(a.0, c.0, b.0, material)
                            .with_normals([a.1, c.1, b.1])
                            .with_uvs([a.2, c.2, b.2]),
                    );
                }
                if i > 0 {
                    self.triangles.push(
                        Triangle::new(a.0, d.0, c.0, material)
                            .with_normals([a.1, d.1, c.1])
                            .with_uvs([a.2, d.2, c.2]),
                    );
                }
            }
        }
    }

    /// Builds the BVH and the scene.
    ///
    /// * `options` - BVH build options.
    pub fn build(self, options: BVHOptions) -> Result<Scene, BuildError> {
        let primitives = Arc::new(self.triangles);
        let bvh = BVHAccel::new(Arc::clone(&primitives), options)?;
        Scene::new(primitives, self.materials, self.camera, self.background, Arc::new(bvh))
    }
}

/// Returns the description of a built-in scene.
///
/// * `name` - The scene.
pub fn load(name: SceneName) -> Result<SceneDescription, String> {
    match name {
        SceneName::Cornell => cornell_box(),
        SceneName::Materials => material_showcase(),
    }
}

/// Returns a camera or an error describing the invalid view.
fn look_at(position: Point3f, target: Point3f, fov: Float) -> Result<Camera, String> {
    Camera::look_at(position, target, Vector3f::new(0.0, 1.0, 0.0), fov)
        .ok_or_else(|| format!("invalid camera at {position:?} looking at {target:?}"))
}

/// A box `[-1, 1]^3` open towards the camera with red and green side walls,
/// a tall and a short block and a square ceiling light.
fn cornell_box() -> Result<SceneDescription, String> {
    let camera = look_at(Point3f::new(0.0, 0.0, 3.4), Point3f::new(0.0, 0.0, 0.0), 40.0)?;
    let mut scene = SceneDescription::new(camera, Spectrum::ZERO);

    let white = scene.material(Material::diffuse(Spectrum::from_rgb(0.73, 0.73, 0.73)));
    let red = scene.material(Material::diffuse(Spectrum::from_rgb(0.65, 0.05, 0.05)));
    let green = scene.material(Material::diffuse(Spectrum::from_rgb(0.12, 0.45, 0.15)));
    let light = scene.material(Material::emissive(Spectrum::from_rgb(17.0, 12.0, 4.0)));

    let o = Point3f::new(-1.0, -1.0, -1.0);
    let x = Vector3f::new(2.0, 0.0, 0.0);
    let y = Vector3f::new(0.0, 2.0, 0.0);
    let z = Vector3f::new(0.0, 0.0, 2.0);
    scene.quad(o, z, x, white); // floor
    scene.quad(o + y, x, z, white); // ceiling
    scene.quad(o, x, y, white); // back
    scene.quad(o, y, z, red); // left
    scene.quad(o + x, z, y, green); // right

    scene.quad(
        Point3f::new(-0.25, 0.99, -0.25),
        Vector3f::new(0.5, 0.0, 0.0),
        Vector3f::new(0.0, 0.0, 0.5),
        light,
    );

    scene.cuboid(
        Point3f::new(-0.35, -0.4, -0.35),
        Vector3f::new(0.6, 1.2, 0.6),
        18.0,
        white,
    );
    scene.cuboid(
        Point3f::new(0.35, -0.7, 0.3),
        Vector3f::new(0.6, 0.6, 0.6),
        -17.0,
        white,
    );

    Ok(scene)
}

/// A row of spheres on a floor under a large area light, one per material
/// family.
fn material_showcase() -> Result<SceneDescription, String> {
    let camera = look_at(Point3f::new(0.0, 1.6, 5.5), Point3f::new(0.0, 0.5, 0.0), 40.0)?;
    let mut scene = SceneDescription::new(camera, Spectrum::from_rgb(0.05, 0.06, 0.08));

    let floor = scene.material(Material::diffuse(Spectrum::new(0.5)));
    let light = scene.material(Material::emissive(Spectrum::new(6.0)));

    scene.quad(
        Point3f::new(-6.0, 0.0, -6.0),
        Vector3f::new(0.0, 0.0, 12.0),
        Vector3f::new(12.0, 0.0, 0.0),
        floor,
    );
    scene.quad(
        Point3f::new(-6.0, 0.0, -3.0),
        Vector3f::new(12.0, 0.0, 0.0),
        Vector3f::new(0.0, 6.0, 0.0),
        floor,
    );
    scene.quad(
        Point3f::new(-1.5, 4.0, -1.5),
        Vector3f::new(3.0, 0.0, 0.0),
        Vector3f::new(0.0, 0.0, 3.0),
        light,
    );

    let materials = [
        Material {
            subsurface: 0.5,
            ..Material::diffuse(Spectrum::from_rgb(0.8, 0.25, 0.2))
        },
        Material::metal(Spectrum::from_rgb(1.0, 0.78, 0.34), 0.4),
        Material::metal(Spectrum::from_rgb(0.95, 0.93, 0.88), 0.05),
        Material {
            specular: 0.5,
            roughness: 0.3,
            clearcoat: 1.0,
            clearcoat_gloss: 0.9,
            ..Material::diffuse(Spectrum::from_rgb(0.1, 0.2, 0.7))
        },
        Material {
            roughness: 0.8,
            sheen: 1.0,
            sheen_tint: 0.5,
            ..Material::diffuse(Spectrum::from_rgb(0.45, 0.2, 0.55))
        },
    ];
    for (i, material) in materials.into_iter().enumerate() {
        let m = scene.material(material);
        let x = -2.4 + 1.2 * i as Float;
        scene.sphere(Point3f::new(x, 0.5, 0.0), 0.5, 48, 24, m);
    }

    Ok(scene)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_scenes_build() {
        for name in [SceneName::Cornell, SceneName::Materials] {
            let description = load(name).expect("description");
            let n = description.triangles.len();
            let scene = description.build(BVHOptions::default()).expect("scene");
            assert_eq!(scene.primitives.len(), n);
            assert!(!scene.lights.is_empty());
        }
    }

    #[test]
    fn generated_geometry_is_not_degenerate() {
        for name in [SceneName::Cornell, SceneName::Materials] {
            let description = load(name).expect("description");
            assert!(description.triangles.iter().all(|t| !t.is_degenerate()));
        }
    }

    #[test]
    fn cuboid_faces_point_outwards() {
        let mut scene = SceneDescription::new(
            look_at(Point3f::new(0.0, 0.0, 5.0), Point3f::zero(), 40.0).expect("camera"),
            Spectrum::ZERO,
        );
        let center = Point3f::new(1.0, 2.0, 3.0);
        scene.cuboid(center, Vector3f::new(1.0, 2.0, 3.0), 30.0, 0);
        assert_eq!(scene.triangles.len(), 12);
        for t in scene.triangles.iter() {
            let n = t.normal().expect("normal");
            assert!(n.dot(&(t.centroid() - center)) > 0.0);
        }
    }

    #[test]
    fn sphere_normals_point_outwards() {
        let mut scene = SceneDescription::new(
            look_at(Point3f::new(0.0, 0.0, 5.0), Point3f::zero(), 40.0).expect("camera"),
            Spectrum::ZERO,
        );
        scene.sphere(Point3f::zero(), 1.0, 16, 8, 0);
        assert_eq!(scene.triangles.len(), 16 * (2 * 8 - 2));
        for t in scene.triangles.iter() {
            let n = t.normal().expect("normal");
            assert!(n.dot(&(t.centroid() - Point3f::zero())) > 0.0);
        }
    }
}
