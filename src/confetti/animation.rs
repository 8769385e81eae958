//! Particle state that outlives individual sessions

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use super::clock::FrameClock;
use super::particle::SpawnParams;
use super::set::ParticleSet;
use crate::config::Config;

/// Owns the particle set, its random source and the frame clock.
///
/// Created once per process; sessions start and stop around it without
/// resetting the particles.
#[derive(Debug)]
pub struct Animation<R = StdRng> {
    particles: ParticleSet,
    rng: R,
    clock: FrameClock,
    frames: u64,
}

impl Animation<StdRng> {
    pub fn from_config(config: &Config) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }
}

impl<R: Rng> Animation<R> {
    pub fn with_rng(config: &Config, mut rng: R) -> Self {
        let particles = ParticleSet::new(
            SpawnParams::from_config(config),
            config.particle_count,
            &mut rng,
        );

        Self {
            particles,
            rng,
            clock: FrameClock::new(config.frame_rate),
            frames: 0,
        }
    }

    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    /// Total frames advanced across all sessions
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Prepare for a new session; particles are left where they are
    pub fn begin_session(&mut self) {
        self.clock.reset();
        debug!(
            interval = ?self.clock.interval(),
            particles = self.particles.len(),
            "animation resumed"
        );
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.clock.is_due(now)
    }

    pub fn next_deadline(&self, now: Instant) -> Instant {
        self.clock.next_deadline(now)
    }

    /// Run the frame updater once and mark the frame as produced
    pub fn advance(&mut self, now: Instant) {
        let wrapped = self.particles.step(&mut self.rng);
        self.clock.tick(now);
        self.frames += 1;
        trace!(frame = self.frames, wrapped, "frame advanced");
    }

    #[cfg(test)]
    pub(crate) fn particles_mut(&mut self) -> &mut ParticleSet {
        &mut self.particles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_pcg::Pcg64;
    use std::time::Duration;

    fn create_animation() -> Animation<Pcg64> {
        Animation::with_rng(&Config::default(), Pcg64::seed_from_u64(11))
    }

    #[test]
    fn test_advance_paces_frames() {
        let mut animation = create_animation();
        let start = Instant::now();

        animation.begin_session();
        assert!(animation.is_due(start));
        animation.advance(start);
        assert!(!animation.is_due(start + Duration::from_millis(5)));
        assert!(animation.is_due(start + Duration::from_millis(40)));
        assert_eq!(animation.frames(), 1);
    }

    #[test]
    fn test_state_persists_across_sessions() {
        let mut animation = create_animation();
        let mut now = Instant::now();

        animation.begin_session();
        for _ in 0..10 {
            animation.advance(now);
            now += Duration::from_millis(34);
        }
        let after_first = animation.particles().particles().to_vec();

        // Re-entering must not respawn anything
        animation.begin_session();
        assert_eq!(animation.particles().particles(), after_first.as_slice());
        assert!(animation.is_due(now));

        animation.advance(now);
        assert_eq!(animation.particles().len(), 100);
        assert_eq!(animation.frames(), 11);
    }

    #[test]
    fn test_forced_wrap_through_animation() {
        let mut animation = create_animation();
        {
            let p = &mut animation.particles_mut().particles_mut()[0];
            p.y = 599.0;
            p.speed = 3.0;
        }

        animation.advance(Instant::now());
        assert_eq!(animation.particles().particles()[0].y, 0.0);
    }
}
