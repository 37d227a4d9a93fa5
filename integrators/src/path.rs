//! Path Integrator

use tinsel_core::geometry::*;
use tinsel_core::options::Options;
use tinsel_core::primitive::Intersection;
use tinsel_core::reflection::*;
use tinsel_core::sampler::*;
use tinsel_core::sampling::power_heuristic;
use tinsel_core::scene::Scene;
use tinsel_core::spectrum::*;
use tinsel_core::{stat_counter, stat_dist, stat_inc, stat_int_distribution, stat_percent, stat_register_fns};

stat_counter!("Integrator/Shadow rays traced", SHADOW_RAYS, path_stats_shadow_rays);
stat_percent!(
    "Integrator/Paths terminated by Russian roulette",
    RR_TERMINATED,
    RR_TESTED,
    path_stats_rr,
);
stat_int_distribution!("Integrator/Path length", PATH_LENGTH, path_stats_path_length);
stat_counter!("Integrator/Diffuse bounces", DIFFUSE_BOUNCES, path_stats_diffuse);
stat_counter!("Integrator/Specular bounces", SPECULAR_BOUNCES, path_stats_specular);
stat_counter!("Integrator/Clearcoat bounces", CLEARCOAT_BOUNCES, path_stats_clearcoat);

stat_register_fns!(
    path_stats_shadow_rays,
    path_stats_rr,
    path_stats_path_length,
    path_stats_diffuse,
    path_stats_specular,
    path_stats_clearcoat,
);

/// State of one path between bounces. Everything a path needs to continue
/// lives here so that paths can be advanced one bounce at a time.
#[derive(Copy, Clone, Debug)]
pub struct PathState {
    /// The ray to trace next.
    pub ray: Ray,

    /// Path throughput.
    pub beta: Spectrum,

    /// Radiance gathered so far.
    pub l: Spectrum,

    /// Number of bounces taken.
    pub depth: u32,

    /// Solid angle pdf of the BSDF sample that produced `ray`.
    pub prev_bsdf_pdf: Float,

    /// Origin of the previous bounce.
    pub prev_p: Point3f,

    /// The sampler positioned at this path's pixel sample.
    pub sampler: Sampler,

    /// False once the path has terminated.
    pub active: bool,
}

impl PathState {
    /// Starts a path along a camera ray.
    ///
    /// * `ray`     - The camera ray.
    /// * `sampler` - The sampler positioned at the pixel sample.
    pub fn new(ray: Ray, sampler: Sampler) -> Self {
        Self {
            ray,
            beta: Spectrum::ONE,
            l: Spectrum::ZERO,
            depth: 0,
            prev_bsdf_pdf: 0.0,
            prev_p: ray.o,
            sampler,
            active: true,
        }
    }

    /// Terminates the path.
    fn terminate(&mut self) {
        stat_dist!(PATH_LENGTH, self.depth as i64);
        self.active = false;
    }
}

/// Implements the path tracing algorithm with next event estimation,
/// multiple importance sampling and Russian roulette.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PathIntegrator {
    /// Maximum number of bounces.
    max_depth: u32,

    /// Bounce from which Russian roulette applies.
    rr_depth: u32,

    /// Lower bound of the survival probability.
    rr_min_probability: Float,
}

impl PathIntegrator {
    /// Create a new `PathIntegrator`.
    ///
    /// * `max_depth`          - Maximum number of bounces.
    /// * `rr_depth`           - Bounce from which Russian roulette applies;
    ///                          `u32::MAX` disables it.
    /// * `rr_min_probability` - Lower bound of the survival probability.
    pub fn new(max_depth: u32, rr_depth: u32, rr_min_probability: Float) -> Self {
        register_stats();
        Self {
            max_depth,
            rr_depth,
            rr_min_probability: clamp(rr_min_probability, 1e-3, 1.0),
        }
    }

    /// Returns the maximum number of bounces.
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Returns the incident radiance along a camera ray. The sampler must
    /// already be positioned at the pixel sample.
    ///
    /// * `scene`   - The scene.
    /// * `ray`     - The camera ray.
    /// * `sampler` - The sampler.
    pub fn li(&self, scene: &Scene, ray: &Ray, sampler: &Sampler) -> Spectrum {
        let mut state = PathState::new(*ray, *sampler);
        while state.active {
            let hit = scene.intersect(&state.ray);
            self.shade(scene, &mut state, hit.as_ref());
        }
        state.l
    }

    /// Advances a path by one vertex given the closest hit of its current
    /// ray: gathers emission and direct light, then samples the continuation.
    ///
    /// * `scene` - The scene.
    /// * `state` - The path.
    /// * `hit`   - Closest intersection of `state.ray`.
    pub fn shade(&self, scene: &Scene, state: &mut PathState, hit: Option<&Intersection>) {
        if !state.active {
            return;
        }
        debug!(
            "Path tracer bounce {}, current L = {:?}, beta = {:?}",
            state.depth, state.l, state.beta
        );

        let isect = match hit {
            Some(isect) => isect,
            None => {
                state.l += state.beta * scene.background;
                state.terminate();
                return;
            }
        };

        let wo = match (-state.ray.d).try_normalize() {
            Some(wo) => wo,
            None => {
                state.terminate();
                return;
            }
        };
        state.sampler.start_bounce(state.depth);

        // Add emitted light, weighted against light sampling from the
        // previous vertex.
        if let Some(light) = scene.lights.get(isect.primitive) {
            let le = light.l(&wo);
            if !le.is_black() {
                let weight = if state.depth == 0 {
                    1.0
                } else {
                    let light_pdf = scene.lights.pdf(isect.primitive, &state.prev_p, &isect.p);
                    power_heuristic(1, state.prev_bsdf_pdf, 1, light_pdf)
                };
                state.l += state.beta * le * weight;
                debug!("Added Le -> L = {:?}", state.l);
            }
        }

        if state.depth >= self.max_depth {
            state.terminate();
            return;
        }

        let (n_g, n_s, _) = isect.oriented_normals(&wo);
        let bsdf = BSDF::new(&n_s, &n_g, &isect.tangent, scene.material(isect));

        // Sample illumination from one light.
        state.l += state.beta * self.estimate_direct(scene, isect, &bsdf, &n_g, &wo, &mut state.sampler);

        // Sample BSDF to get new path direction.
        let sample = match bsdf.sample(&wo, &mut state.sampler) {
            Some(s) => s,
            None => {
                state.terminate();
                return;
            }
        };
        match sample.lobe {
            Lobe::Diffuse => {
                stat_inc!(DIFFUSE_BOUNCES, 1);
            }
            Lobe::Specular => {
                stat_inc!(SPECULAR_BOUNCES, 1);
            }
            Lobe::Clearcoat => {
                stat_inc!(CLEARCOAT_BOUNCES, 1);
            }
        }
        state.beta *= sample.weight;
        if !state.beta.is_finite() || state.beta.is_black() {
            state.terminate();
            return;
        }
        state.prev_bsdf_pdf = sample.pdf;
        state.prev_p = isect.p;
        state.ray = Ray::spawn(&isect.p, &n_g, &sample.wi);

        // Possibly terminate the path with Russian roulette.
        if state.depth >= self.rr_depth {
            let p = clamp(state.beta.max_component_value(), self.rr_min_probability, 1.0);
            stat_inc!(RR_TESTED, 1);
            if state.sampler.get_1d() >= p {
                stat_inc!(RR_TERMINATED, 1);
                state.terminate();
                return;
            }
            state.beta /= p;
        }

        state.depth += 1;
    }

    /// Next event estimation: samples a point on one light chosen uniformly
    /// and returns its MIS-weighted contribution if it is visible.
    ///
    /// * `scene`   - The scene.
    /// * `isect`   - The shading point.
    /// * `bsdf`    - BSDF at the shading point.
    /// * `n_g`     - Geometric normal facing `wo`.
    /// * `wo`      - Outgoing direction.
    /// * `sampler` - The sampler.
    fn estimate_direct(
        &self,
        scene: &Scene,
        isect: &Intersection,
        bsdf: &BSDF,
        n_g: &Vector3f,
        wo: &Vector3f,
        sampler: &mut Sampler,
    ) -> Spectrum {
        let ls = match scene.lights.sample(&isect.p, sampler) {
            Some(ls) => ls,
            None => return Spectrum::ZERO,
        };
        if ls.primitive == isect.primitive {
            return Spectrum::ZERO;
        }

        let (f, bsdf_pdf) = bsdf.evaluate(wo, &ls.wi);
        if f.is_black() {
            return Spectrum::ZERO;
        }

        stat_inc!(SHADOW_RAYS, 1);
        let shadow = Ray::spawn_to(&isect.p, n_g, &ls.p);
        if scene.intersect_p(&shadow) {
            return Spectrum::ZERO;
        }

        let weight = power_heuristic(1, ls.pdf, 1, bsdf_pdf);
        let cos_i = ls.wi.abs_dot(&bsdf.frame.n);
        f * ls.le * (cos_i * weight / ls.pdf)
    }
}

impl From<&Options> for PathIntegrator {
    /// Create a `PathIntegrator` from render options.
    ///
    /// * `options` - Render options.
    fn from(options: &Options) -> Self {
        Self::new(options.max_depth, options.rr_depth, options.rr_min_probability)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
