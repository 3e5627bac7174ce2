//! Per-frame simulation state, advanced by synthetic timestamps.
//!
//! Nothing here touches the GPU. The web front-end feeds input events in
//! between frames and calls [`SimulationState::tick`] once per animation frame;
//! the returned [`FrameState`] is everything the renderer needs to upload.

use crate::camera::{CameraController, Projection};
use crate::derive_rng;
use crate::glitch::{FilmGrainConfig, FilmGrainUniforms, GlitchController, GlitchTransition};
use crate::input::InputEvent;
use crate::nebula::nebula_time;
use crate::scene::BillboardInstance;
use crate::stars::ShootingStarManager;
use crate::viewport::Viewport;
use glam::{Mat4, Vec3};

/// Snapshot produced by one tick.
#[derive(Clone, Debug)]
pub struct FrameState {
    pub now_ms: f64,
    pub nebula_time: f32,
    pub film_grain: FilmGrainUniforms,
    pub glitch: GlitchTransition,
    pub view: Mat4,
    pub projection: Mat4,
    pub view_proj: Mat4,
    pub eye: Vec3,
    pub camera_right: Vec3,
    pub camera_up: Vec3,
    pub shooting_stars: Vec<BillboardInstance>,
}

pub struct SimulationState {
    viewport: Viewport,
    projection: Projection,
    camera: CameraController,
    film: FilmGrainConfig,
    glitch: GlitchController,
    stars: ShootingStarManager,
    frame: u64,
}

impl SimulationState {
    pub fn new(now_ms: f64, seed: u64, mut film: FilmGrainConfig, viewport: Viewport) -> Self {
        let camera = CameraController::from_rng(&mut derive_rng(seed, 10));
        let glitch = GlitchController::new(now_ms, &mut film, derive_rng(seed, 11));
        let stars = ShootingStarManager::new(now_ms, derive_rng(seed, 12));
        Self {
            viewport,
            projection: Projection::for_viewport(viewport),
            camera,
            film,
            glitch,
            stars,
            frame: 0,
        }
    }

    /// Same as [`Self::new`] but with an explicit camera, for scripted runs.
    pub fn with_camera(
        now_ms: f64,
        seed: u64,
        film: FilmGrainConfig,
        viewport: Viewport,
        camera: CameraController,
    ) -> Self {
        let mut sim = Self::new(now_ms, seed, film, viewport);
        sim.camera = camera;
        sim
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        let cam = &mut self.camera;
        match event {
            InputEvent::PointerDown { x, y } => cam.pointer_down(x, y),
            InputEvent::PointerMove { x, y } => cam.pointer_move(x, y),
            InputEvent::PointerUp => cam.pointer_up(),
            InputEvent::TouchStart { touches, x, y } => cam.touch_start(touches, x, y),
            InputEvent::TouchMove { touches, x, y } => cam.touch_move(touches, x, y),
            InputEvent::TouchEnd => cam.touch_end(),
            InputEvent::Wheel { delta_y } => cam.wheel(delta_y),
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.projection.set_viewport(viewport);
    }

    /// Advance one frame: shader time, glitch, camera, then shooting stars.
    pub fn tick(&mut self, now_ms: f64) -> FrameState {
        self.frame += 1;
        let nebula_time = nebula_time(now_ms);

        let glitch = self.glitch.update(now_ms, &mut self.film);
        let film_grain = self.film.sample(now_ms, &self.glitch);

        self.camera.update();
        self.stars.update(now_ms);

        let view = self.camera.view_matrix();
        let projection = self.projection.matrix();
        let (camera_right, camera_up) = self.camera.basis();
        FrameState {
            now_ms,
            nebula_time,
            film_grain,
            glitch,
            view,
            projection,
            view_proj: projection * view,
            eye: self.camera.eye(),
            camera_right,
            camera_up,
            shooting_stars: self.stars.billboards(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn glitch(&self) -> &GlitchController {
        &self.glitch
    }

    pub fn stars(&self) -> &ShootingStarManager {
        &self.stars
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_input_reaches_zoom() {
        let vp = Viewport::new(800, 600).unwrap();
        let mut sim = SimulationState::new(0.0, 1, FilmGrainConfig::constant(), vp);
        sim.handle_input(InputEvent::Wheel { delta_y: 400.0 });
        assert_eq!(sim.camera().zoom().target, 1200.0);
        sim.tick(16.0);
        assert!(sim.camera().zoom().distance > 1000.0);
    }

    #[test]
    fn tick_reports_projection_aspect() {
        let vp = Viewport::new(1000, 500).unwrap();
        let mut sim = SimulationState::new(0.0, 2, FilmGrainConfig::constant(), vp);
        let f = sim.tick(16.0);
        assert!((f.projection.col(1).y / f.projection.col(0).x - 2.0).abs() < 1e-4);
        assert_eq!(sim.frame_count(), 1);
    }
}
