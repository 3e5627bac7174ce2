//! Render surface lifecycle.
//!
//! The GPU device can disappear at any time (driver reset, tab backgrounded on
//! mobile). Rendering is suspended until the host asks for recovery, at which
//! point every GPU resource is rebuilt and the generation counter advances.

use crate::error::SceneError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceState {
    Uninitialized,
    /// GPU resources are being created; further attempts are refused.
    Initializing,
    Active,
    Suspended,
    Failed,
}

#[derive(Clone, Debug)]
pub struct SurfaceLifecycle {
    state: SurfaceState,
    generation: u32,
}

impl Default for SurfaceLifecycle {
    fn default() -> Self {
        Self {
            state: SurfaceState::Uninitialized,
            generation: 0,
        }
    }
}

impl SurfaceLifecycle {
    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn can_render(&self) -> bool {
        self.state == SurfaceState::Active
    }

    pub fn needs_recovery(&self) -> bool {
        matches!(self.state, SurfaceState::Suspended | SurfaceState::Failed)
    }

    /// Claim the surface for a (re)initialization attempt. Fails while one is
    /// already running or resources are live.
    pub fn begin_init(&mut self) -> Result<(), SceneError> {
        match self.state {
            SurfaceState::Uninitialized | SurfaceState::Suspended | SurfaceState::Failed => {
                self.state = SurfaceState::Initializing;
                Ok(())
            }
            SurfaceState::Initializing | SurfaceState::Active => {
                Err(SceneError::InvalidSurfaceTransition {
                    from: self.state,
                    to: SurfaceState::Initializing,
                })
            }
        }
    }

    /// GPU resources were created successfully.
    pub fn activated(&mut self) -> Result<(), SceneError> {
        if self.state != SurfaceState::Initializing {
            return Err(SceneError::InvalidSurfaceTransition {
                from: self.state,
                to: SurfaceState::Active,
            });
        }
        self.state = SurfaceState::Active;
        self.generation += 1;
        log::info!("[surface] active (generation {})", self.generation);
        Ok(())
    }

    /// The device or surface was lost while rendering.
    pub fn lost(&mut self) {
        if self.state == SurfaceState::Active {
            self.state = SurfaceState::Suspended;
            log::warn!("[surface] lost; rendering suspended");
        }
    }

    /// Initialization or recovery failed.
    pub fn failed(&mut self) {
        self.state = SurfaceState::Failed;
        log::error!("[surface] initialization failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active() -> SurfaceLifecycle {
        let mut s = SurfaceLifecycle::default();
        s.begin_init().unwrap();
        s.activated().unwrap();
        s
    }

    #[test]
    fn lose_and_recover() {
        let mut s = SurfaceLifecycle::default();
        assert!(!s.can_render());
        s.begin_init().unwrap();
        assert!(!s.can_render());
        s.activated().unwrap();
        assert!(s.can_render());
        s.lost();
        assert_eq!(s.state(), SurfaceState::Suspended);
        assert!(s.needs_recovery());
        s.begin_init().unwrap();
        s.activated().unwrap();
        assert_eq!(s.generation, 2);
    }

    #[test]
    fn concurrent_recovery_is_refused() {
        let mut s = active();
        s.lost();
        s.begin_init().unwrap();
        assert_eq!(s.state(), SurfaceState::Initializing);
        assert!(!s.needs_recovery());
        assert!(s.begin_init().is_err());
        assert_eq!(s.state(), SurfaceState::Initializing);
        s.activated().unwrap();
        assert_eq!(s.state(), SurfaceState::Active);
    }

    #[test]
    fn activation_requires_an_attempt() {
        let mut s = SurfaceLifecycle::default();
        assert!(s.activated().is_err());
        let mut s = active();
        assert!(s.activated().is_err());
        assert!(s.begin_init().is_err());
    }

    #[test]
    fn failed_attempt_can_be_retried() {
        let mut s = SurfaceLifecycle::default();
        s.begin_init().unwrap();
        s.failed();
        assert!(s.needs_recovery());
        s.begin_init().unwrap();
        s.activated().unwrap();
        assert!(s.can_render());
    }

    #[test]
    fn loss_before_init_is_ignored() {
        let mut s = SurfaceLifecycle::default();
        s.lost();
        assert_eq!(s.state(), SurfaceState::Uninitialized);
    }
}
