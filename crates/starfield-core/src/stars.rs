//! Shooting stars: irregular spawns on a wide ring, straight flight, linear fade.

use crate::constants::*;
use crate::scene::BillboardInstance;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::Rng;
use smallvec::SmallVec;
use std::f32::consts::{FRAC_PI_2, TAU};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShootingStar {
    pub position: Vec3,
    pub velocity: Vec3,
    pub max_life: f32,
    /// Whole timesteps left; counted in frames so the last one lands exactly.
    frames_left: u32,
    total_frames: u32,
    opacity: f32,
}

/// Timesteps covering `lifetime` seconds, never one past it.
fn lifetime_frames(lifetime: f32) -> u32 {
    if !(lifetime > 0.0) {
        return 0;
    }
    // absorb rounding in the product so e.g. 1.0 s is exactly 60 frames
    (lifetime / STAR_TIMESTEP_SEC - 1e-3).ceil().max(1.0) as u32
}

impl ShootingStar {
    pub fn new(position: Vec3, velocity: Vec3, lifetime: f32) -> Self {
        Self {
            position,
            velocity,
            max_life: lifetime,
            frames_left: lifetime_frames(lifetime),
            total_frames: lifetime_frames(lifetime),
            opacity: STAR_INITIAL_OPACITY,
        }
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Remaining lifetime in seconds.
    pub fn life(&self) -> f32 {
        self.frames_left as f32 * STAR_TIMESTEP_SEC
    }

    pub fn is_expired(&self) -> bool {
        self.frames_left == 0
    }

    /// Advance by the fixed timestep and refresh opacity from remaining life.
    pub fn step(&mut self) {
        self.position += self.velocity * STAR_TIMESTEP_SEC;
        self.frames_left = self.frames_left.saturating_sub(1);
        self.opacity = if self.total_frames > 0 {
            self.frames_left as f32 / self.total_frames as f32
        } else {
            0.0
        };
    }

    pub fn billboard(&self) -> BillboardInstance {
        BillboardInstance {
            center: self.position.to_array(),
            size: STAR_DOT_RADIUS * 2.0,
            color: [1.0, 1.0, 1.0, self.opacity],
        }
    }
}

/// Spawns, moves and retires shooting stars. Owns the only copy of each star.
#[derive(Clone, Debug)]
pub struct ShootingStarManager {
    active: SmallVec<[ShootingStar; 8]>,
    next_spawn_at_ms: f64,
    rng: StdRng,
}

impl ShootingStarManager {
    pub fn new(now_ms: f64, mut rng: StdRng) -> Self {
        let next_spawn_at_ms = now_ms + spawn_gap_ms(&mut rng);
        Self {
            active: SmallVec::new(),
            next_spawn_at_ms,
            rng,
        }
    }

    pub fn active(&self) -> &[ShootingStar] {
        &self.active
    }

    pub fn next_spawn_at_ms(&self) -> f64 {
        self.next_spawn_at_ms
    }

    /// Spawn if due, then step every star once and drop the expired ones.
    pub fn update(&mut self, now_ms: f64) {
        if now_ms >= self.next_spawn_at_ms {
            self.spawn();
            self.next_spawn_at_ms = now_ms + spawn_gap_ms(&mut self.rng);
        }
        for star in self.active.iter_mut() {
            star.step();
        }
        let before = self.active.len();
        self.active.retain(|s| !s.is_expired());
        let retired = before - self.active.len();
        if retired > 0 {
            log::debug!("[stars] retired {retired}, {} active", self.active.len());
        }
    }

    /// Launch one star from a random point on the spawn ring, flying tangentially.
    pub fn spawn(&mut self) -> &ShootingStar {
        let rng = &mut self.rng;
        let dist = rng.gen_range(STAR_START_DIST_MIN..=STAR_START_DIST_MAX);
        let angle = rng.gen::<f32>() * TAU;
        let height = rng.gen_range(-STAR_START_HEIGHT..=STAR_START_HEIGHT);
        let start = Vec3::new(angle.cos() * dist, height, angle.sin() * dist);

        let turn = if rng.gen_bool(0.5) { FRAC_PI_2 } else { -FRAC_PI_2 };
        let dir_angle = angle + turn;
        let direction = Vec3::new(
            dir_angle.cos(),
            rng.gen_range(-STAR_DIR_VERTICAL..=STAR_DIR_VERTICAL),
            dir_angle.sin(),
        )
        .normalize();
        let speed = rng.gen_range(STAR_SPEED_MIN..=STAR_SPEED_MAX);
        let lifetime = rng.gen_range(STAR_LIFETIME_MIN_SEC..=STAR_LIFETIME_MAX_SEC);

        log::debug!(
            "[stars] spawn at ({:.0},{:.0},{:.0}) speed={speed:.0} life={lifetime:.2}s",
            start.x,
            start.y,
            start.z
        );
        let idx = self.active.len();
        self.active
            .push(ShootingStar::new(start, direction * speed, lifetime));
        &self.active[idx]
    }

    /// Instances for the additive dot pass.
    pub fn billboards(&self) -> Vec<BillboardInstance> {
        self.active.iter().map(ShootingStar::billboard).collect()
    }
}

fn spawn_gap_ms(rng: &mut StdRng) -> f64 {
    rng.gen_range(STAR_SPAWN_GAP_MIN_MS..=STAR_SPAWN_GAP_MAX_MS) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn first_spawn_waits_for_gap() {
        let m = ShootingStarManager::new(0.0, StdRng::seed_from_u64(1));
        let at = m.next_spawn_at_ms();
        assert!((1200.0..=8200.0).contains(&at), "{at}");
    }

    #[test]
    fn spawned_star_is_on_ring_and_tangential() {
        let mut m = ShootingStarManager::new(0.0, StdRng::seed_from_u64(2));
        for _ in 0..100 {
            let s = *m.spawn();
            let flat = Vec3::new(s.position.x, 0.0, s.position.z);
            let r = flat.length();
            assert!((5999.0..=12001.0).contains(&r), "{r}");
            assert!(s.position.y.abs() <= 300.0);
            let speed = s.velocity.length();
            assert!((899.0..=15201.0).contains(&speed));
            let dir = s.velocity / speed;
            // horizontal component is perpendicular to the radius
            assert!(flat.normalize().dot(Vec3::new(dir.x, 0.0, dir.z)).abs() < 1e-3);
            assert!((1.0..=3.0).contains(&s.max_life));
            assert_eq!(s.opacity(), 0.95);
        }
    }

    #[test]
    fn whole_second_lifetime_is_sixty_frames() {
        let mut s = ShootingStar::new(Vec3::ZERO, Vec3::X, 1.0);
        for _ in 0..59 {
            s.step();
            assert!(!s.is_expired());
        }
        s.step();
        assert!(s.is_expired());
        assert_eq!(s.opacity(), 0.0);
        assert_eq!(s.life(), 0.0);
    }

    #[test]
    fn zero_lifetime_is_born_expired() {
        assert!(ShootingStar::new(Vec3::ZERO, Vec3::X, 0.0).is_expired());
        assert!(ShootingStar::new(Vec3::ZERO, Vec3::X, f32::NAN).is_expired());
    }

    #[test]
    fn star_moves_by_fixed_step() {
        let mut s = ShootingStar::new(Vec3::ZERO, Vec3::new(600.0, 0.0, 0.0), 1.0);
        s.step();
        assert!((s.position.x - 10.0).abs() < 1e-4);
        assert!((s.opacity() - (1.0 - 1.0 / 60.0)).abs() < 1e-5);
    }
}
