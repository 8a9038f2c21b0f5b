use rand::Rng;

use crate::config::{Params, Preset, Viewport};
use crate::export;
use crate::noise::{GradientNoise, NoiseField};
use crate::scene::Scene;
use crate::{Timing, generate_with};

/// One drawing session: a noise field seeded once, the live parameter set and
/// the scene they produce.
///
/// Every mutation goes through [`Session::update`], which regenerates exactly
/// once no matter how many fields the closure touches.
pub struct Session<N: NoiseField = GradientNoise> {
    params: Params,
    viewport: Viewport,
    noise: N,
    scene: Scene,
    timings: Vec<Timing>,
    regenerations: u64,
}

impl Session<GradientNoise> {
    pub fn new(noise_seed: u64, viewport: Viewport, params: Params) -> Self {
        Self::with_noise(GradientNoise::new(noise_seed), viewport, params)
    }
}

impl<N: NoiseField> Session<N> {
    pub fn with_noise(noise: N, viewport: Viewport, params: Params) -> Self {
        let mut session = Self {
            params,
            viewport,
            noise,
            scene: Scene::default(),
            timings: Vec::new(),
            regenerations: 0,
        };
        session.regenerate();
        session
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn timings(&self) -> &[Timing] {
        &self.timings
    }

    /// Number of full clear-and-rebuild passes since the session started.
    pub fn regenerations(&self) -> u64 {
        self.regenerations
    }

    /// Applies a batch of parameter changes, then regenerates once.
    pub fn update<F: FnOnce(&mut Params)>(&mut self, mutate: F) {
        mutate(&mut self.params);
        self.regenerate();
    }

    pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
        self.update(|p| p.randomize(rng));
    }

    pub fn apply_preset(&mut self, preset: Preset) {
        self.update(|p| *p = preset.params());
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.regenerate();
    }

    pub fn export_svg(&self) -> String {
        export::to_svg_string(&self.scene, self.viewport, &self.params)
    }

    pub fn export_filename(&self) -> String {
        export::export_filename(&self.params)
    }

    fn regenerate(&mut self) {
        let (scene, timings) = generate_with(&self.params, self.viewport, &self.noise);
        self.scene = scene;
        self.timings = timings;
        self.regenerations += 1;
        log::debug!(
            "regeneration #{}: {} paths, {} vertices",
            self.regenerations,
            self.scene.path_count(),
            self.scene.vertex_count()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathMethod;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn small() -> Params {
        Params {
            ring_count: 6,
            vertices_per_ring: 5,
            ..Params::default()
        }
    }

    #[test]
    fn starts_with_one_generation() {
        let s = Session::new(1, Viewport::default(), small());
        assert_eq!(s.regenerations(), 1);
        assert!(s.scene().vertex_count() > 0);
    }

    #[test]
    fn batch_update_regenerates_once() {
        let mut s = Session::new(1, Viewport::default(), small());
        s.update(|p| {
            p.ring_count = 9;
            p.path_method = PathMethod::Polygons;
            p.moire_enabled = false;
        });
        assert_eq!(s.regenerations(), 2);
        assert_eq!(s.scene().path_count(), 9);
    }

    #[test]
    fn randomize_regenerates_once() {
        let mut s = Session::new(1, Viewport::default(), small());
        let mut rng = StdRng::seed_from_u64(3);
        s.randomize(&mut rng);
        assert_eq!(s.regenerations(), 2);
        assert_eq!(s.params().vertices_per_ring, 3);
    }

    #[test]
    fn preset_and_resize_each_regenerate() {
        let mut s = Session::new(1, Viewport::default(), small());
        s.apply_preset(Preset::Chromecloth);
        s.resize(Viewport::new(400.0, 300.0));
        assert_eq!(s.regenerations(), 3);
        assert_eq!(*s.params(), Preset::Chromecloth.params());
        assert_eq!(s.viewport(), Viewport::new(400.0, 300.0));
    }

    #[test]
    fn export_matches_current_scene() {
        let s = Session::new(4, Viewport::default(), small());
        assert!(s.export_svg().contains("<path"));
        assert_eq!(s.export_filename(), export::export_filename(s.params()));
    }
}
