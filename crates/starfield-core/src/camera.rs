//! Camera motion: autonomous drift, user drag, and the ease back to drift.
//!
//! The controller is a plain state machine. Input handlers call the
//! `pointer_*` / `touch_*` / `wheel` methods; the frame loop calls
//! [`CameraController::update`] exactly once per tick.

use crate::constants::*;
use crate::viewport::Viewport;
use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use rand::Rng;

/// Which rule advances the rotation on the next tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraMode {
    /// Constant-velocity drift (default or user-locked direction).
    Autonomous,
    /// A pointer or single touch is held down and dragging the target.
    UserControlling,
    /// Drag released; easing toward the last target before drifting again.
    Completing,
}

/// Pitch (about X) and yaw (about Y), in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rotation {
    pub pitch: f32,
    pub yaw: f32,
}

impl Rotation {
    pub const fn new(pitch: f32, yaw: f32) -> Self {
        Self { pitch, yaw }
    }

    fn clamped(mut self) -> Self {
        self.pitch = clamp_pitch(self.pitch);
        self
    }
}

#[inline]
pub fn clamp_pitch(pitch: f32) -> f32 {
    pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT)
}

#[inline]
fn ease(current: f32, target: f32) -> f32 {
    current + (target - current) * EASING_FACTOR
}

/// Sign of a drag delta; zero falls back to the sign of `previous` (positive
/// when there is none).
#[inline]
fn drag_sign(delta: f32, previous: f32) -> f32 {
    if delta > 0.0 {
        1.0
    } else if delta < 0.0 {
        -1.0
    } else if previous >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Wheel-driven camera distance with exponential easing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Zoom {
    pub distance: f32,
    pub target: f32,
}

impl Default for Zoom {
    fn default() -> Self {
        Self {
            distance: ZOOM_INITIAL,
            target: ZOOM_INITIAL,
        }
    }
}

impl Zoom {
    pub fn scroll(&mut self, delta_y: f32) {
        if !delta_y.is_finite() {
            return;
        }
        self.target = (self.target + delta_y * ZOOM_WHEEL_SCALE).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    pub fn update(&mut self) {
        self.distance = ease(self.distance, self.target);
    }
}

/// Reflecting random walk for the camera position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionDrift {
    pub position: Vec3,
    pub step: Vec3,
}

impl PositionDrift {
    pub fn new(step: Vec3) -> Self {
        Self {
            position: Vec3::ZERO,
            step,
        }
    }

    pub fn update(&mut self) {
        self.position += self.step;
        for axis in 0..3 {
            if self.position[axis].abs() > DRIFT_BOUND {
                self.step[axis] = -self.step[axis];
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct CameraController {
    mode: CameraMode,
    rotation: Rotation,
    target: Rotation,
    default_drift: Rotation,
    locked_drift: Option<Rotation>,
    drag_speed: Rotation,
    pointer: Option<Vec2>,
    last_delta: Vec2,
    zoom: Zoom,
    drift: PositionDrift,
}

impl CameraController {
    /// Controller with an explicit per-frame rotation drift and position step.
    pub fn new(default_drift: Rotation, position_step: Vec3) -> Self {
        Self {
            mode: CameraMode::Autonomous,
            rotation: Rotation::default(),
            target: Rotation::default(),
            default_drift,
            locked_drift: None,
            drag_speed: Rotation::default(),
            pointer: None,
            last_delta: Vec2::ZERO,
            zoom: Zoom::default(),
            drift: PositionDrift::new(position_step),
        }
    }

    /// Controller with drift and step chosen once from `rng`.
    pub fn from_rng(rng: &mut impl Rng) -> Self {
        let mut drift_component = || (rng.gen::<f32>() - 0.5) / DEFAULT_DRIFT_DIVISOR;
        let default_drift = Rotation::new(drift_component(), drift_component());
        let step = Vec3::new(
            rng.gen::<f32>() - 0.5,
            rng.gen::<f32>() - 0.5,
            rng.gen::<f32>() - 0.5,
        );
        log::info!(
            "[camera] drift pitch={:.6} yaw={:.6} step=({:.3},{:.3},{:.3})",
            default_drift.pitch,
            default_drift.yaw,
            step.x,
            step.y,
            step.z
        );
        Self::new(default_drift, step)
    }

    // ---------------- input ----------------

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.pointer = Some(Vec2::new(x, y));
        self.mode = CameraMode::UserControlling;
        self.target = self.rotation;
        log::debug!("[camera] drag start");
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        let Some(last) = self.pointer else {
            return;
        };
        let pos = Vec2::new(x, y);
        self.apply_drag(pos - last);
        self.pointer = Some(pos);
    }

    pub fn pointer_up(&mut self) {
        if self.pointer.take().is_none() || self.mode != CameraMode::UserControlling {
            return;
        }
        let base = self.default_drift;
        let dir_pitch = drag_sign(self.last_delta.y, self.drag_speed.pitch);
        let dir_yaw = drag_sign(self.last_delta.x, self.drag_speed.yaw);
        let locked = Rotation::new(dir_pitch * base.pitch.abs(), dir_yaw * base.yaw.abs());
        self.locked_drift = Some(locked);
        self.drag_speed = locked;
        self.mode = CameraMode::Completing;
        log::debug!(
            "[camera] drag end, locked drift pitch={:.6} yaw={:.6}",
            locked.pitch,
            locked.yaw
        );
    }

    /// Touch start; only a single touch point is recognized.
    pub fn touch_start(&mut self, touch_count: u32, x: f32, y: f32) {
        if touch_count == 1 {
            self.pointer_down(x, y);
        }
    }

    pub fn touch_move(&mut self, touch_count: u32, x: f32, y: f32) {
        if touch_count == 1 {
            self.pointer_move(x, y);
        }
    }

    pub fn touch_end(&mut self) {
        self.pointer_up();
    }

    pub fn wheel(&mut self, delta_y: f32) {
        self.zoom.scroll(delta_y);
    }

    fn apply_drag(&mut self, delta: Vec2) {
        if !delta.is_finite() {
            return;
        }
        self.target.yaw += delta.x * DRAG_SENSITIVITY;
        self.target.pitch = clamp_pitch(self.target.pitch + delta.y * DRAG_SENSITIVITY);
        self.last_delta = delta;
        let dir_pitch = if delta.y > 0.0 { 1.0 } else { -1.0 };
        let dir_yaw = if delta.x > 0.0 { 1.0 } else { -1.0 };
        self.drag_speed = Rotation::new(
            dir_pitch * self.default_drift.pitch.abs(),
            dir_yaw * self.default_drift.yaw.abs(),
        );
    }

    // ---------------- per-frame ----------------

    /// Advance position drift, rotation (by the current mode) and zoom.
    pub fn update(&mut self) {
        self.drift.update();

        match self.mode {
            CameraMode::Autonomous => {
                let speed = self.locked_drift.unwrap_or(self.default_drift);
                self.rotation.pitch += speed.pitch;
                self.rotation.yaw += speed.yaw;
                self.rotation = self.rotation.clamped();
                self.target = self.rotation;
            }
            CameraMode::UserControlling => {
                self.rotation.pitch = ease(self.rotation.pitch, self.target.pitch);
                self.rotation.yaw = ease(self.rotation.yaw, self.target.yaw);
            }
            CameraMode::Completing => {
                let speed = self.locked_drift.unwrap_or(self.default_drift);
                let d_pitch = self.target.pitch - self.rotation.pitch;
                let d_yaw = self.target.yaw - self.rotation.yaw;
                if d_pitch.abs() > TARGET_EPSILON {
                    self.rotation.pitch += d_pitch * EASING_FACTOR;
                } else {
                    self.rotation.pitch += speed.pitch;
                }
                if d_yaw.abs() > TARGET_EPSILON {
                    self.rotation.yaw += d_yaw * EASING_FACTOR;
                } else {
                    self.rotation.yaw += speed.yaw;
                }
                if d_pitch.abs() < TARGET_EPSILON && d_yaw.abs() < TARGET_EPSILON {
                    self.mode = CameraMode::Autonomous;
                    log::debug!("[camera] reached target, drifting");
                }
            }
        }

        self.rotation = self.rotation.clamped();
        self.zoom.update();
    }

    // ---------------- accessors ----------------

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn target(&self) -> Rotation {
        self.target
    }

    pub fn locked_drift(&self) -> Option<Rotation> {
        self.locked_drift
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    pub fn position_drift(&self) -> PositionDrift {
        self.drift
    }

    /// World-space eye: drifted position pushed back along +Z by the zoom
    /// distance.
    pub fn eye(&self) -> Vec3 {
        self.drift.position + Vec3::Z * self.zoom.distance
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.pitch, self.rotation.yaw, 0.0)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation(), self.eye()).inverse()
    }

    /// Camera-space right and up vectors in world space, for billboards.
    pub fn basis(&self) -> (Vec3, Vec3) {
        let q = self.orientation();
        (q * Vec3::X, q * Vec3::Y)
    }
}

/// Perspective projection that tracks the viewport aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub fovy_radians: f32,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fovy_radians: FOV_Y_DEGREES.to_radians(),
            aspect: 1.0,
            znear: Z_NEAR,
            zfar: Z_FAR,
        }
    }
}

impl Projection {
    pub fn for_viewport(viewport: Viewport) -> Self {
        let mut p = Self::default();
        p.set_viewport(viewport);
        p
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.aspect = viewport.aspect();
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }
}
