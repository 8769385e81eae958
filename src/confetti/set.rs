//! The fixed-size particle collection and its per-frame update

use rand::Rng;

use super::particle::{spawn_particle, Particle, SpawnParams};

/// Owned collection of confetti pieces; its length never changes
#[derive(Debug, Clone)]
pub struct ParticleSet {
    particles: Vec<Particle>,
    params: SpawnParams,
}

impl ParticleSet {
    /// Spawn `count` particles scattered over the whole canvas height
    pub fn new<R: Rng + ?Sized>(params: SpawnParams, count: usize, rng: &mut R) -> Self {
        let particles = (0..count)
            .map(|_| {
                let mut particle = spawn_particle(&params, rng);
                particle.y = rng.gen_range(0.0..=params.height);
                particle
            })
            .collect();

        Self { particles, params }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[cfg(test)]
    pub(crate) fn params(&self) -> &SpawnParams {
        &self.params
    }

    /// Advance every particle by one frame.
    ///
    /// A particle that falls past the bottom edge is respawned at the top.
    /// Returns how many wrapped.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let mut wrapped = 0;
        for particle in &mut self.particles {
            particle.y += particle.speed;
            if particle.y > self.params.height {
                *particle = spawn_particle(&self.params, rng);
                wrapped += 1;
            }
        }
        wrapped
    }

    #[cfg(test)]
    pub(crate) fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn create_set(seed: u64) -> (ParticleSet, Pcg64) {
        let config = Config::default();
        let mut rng = Pcg64::seed_from_u64(seed);
        let set = ParticleSet::new(
            SpawnParams::from_config(&config),
            config.particle_count,
            &mut rng,
        );
        (set, rng)
    }

    #[test]
    fn test_initial_set() {
        let (set, _) = create_set(3);
        assert_eq!(set.len(), 100);
        for p in set.particles() {
            assert!((0.0..800.0).contains(&p.x));
            assert!((0.0..=600.0).contains(&p.y));
        }
        // y is scattered, not all spawned on the top edge
        assert!(set.particles().iter().any(|p| p.y > 0.0));
    }

    #[test]
    fn test_twenty_steps_keep_count_and_bounds() {
        let (mut set, mut rng) = create_set(4);

        for _ in 0..20 {
            set.step(&mut rng);
            assert_eq!(set.len(), 100);
            for p in set.particles() {
                assert!(p.y >= 0.0 && p.y <= 600.0, "y out of bounds: {}", p.y);
            }
        }
    }

    #[test]
    fn test_long_run_keeps_bounds() {
        let (mut set, mut rng) = create_set(5);
        let mut total_wrapped = 0;

        for _ in 0..2000 {
            total_wrapped += set.step(&mut rng);
            assert_eq!(set.len(), 100);
            assert!(set.particles().iter().all(|p| (0.0..=600.0).contains(&p.y)));
        }
        assert!(total_wrapped > 0);
    }

    #[test]
    fn test_monotonic_fall() {
        let (mut set, mut rng) = create_set(6);
        for p in set.particles_mut() {
            p.y = 100.0;
        }
        let before = set.particles().to_vec();

        let wrapped = set.step(&mut rng);
        assert_eq!(wrapped, 0);

        for (old, new) in before.iter().zip(set.particles()) {
            assert_eq!(new.y, old.y + old.speed);
            assert_eq!(new.x, old.x);
            assert_eq!(new.color, old.color);
            assert_eq!(new.size, old.size);
            assert_eq!(new.speed, old.speed);
        }
    }

    #[test]
    fn test_wrap_reseeds() {
        let (mut set, mut rng) = create_set(7);
        for p in set.particles_mut() {
            p.y = 0.0;
            p.speed = 1.0;
        }
        {
            let first = &mut set.particles_mut()[0];
            first.y = 599.0;
            first.speed = 3.0;
            first.x = 0.5;
            first.size = 5;
        }

        // What the seeded source will hand the respawn
        let mut expected_rng = rng.clone();
        let expected = spawn_particle(set.params(), &mut expected_rng);

        let wrapped = set.step(&mut rng);
        assert_eq!(wrapped, 1);

        let p = set.particles()[0];
        assert_eq!(p, expected);
        assert_eq!(p.y, 0.0);
        assert!((0.0..800.0).contains(&p.x));
        assert!((5..=15).contains(&p.size));
        assert!((1.0..3.0).contains(&p.speed));
        assert!(set.params().palette.contains(&p.color));

        // The rest only fell
        assert!(set.particles()[1..].iter().all(|p| p.y == 1.0));
    }

    #[test]
    fn test_exact_bottom_does_not_wrap() {
        let (mut set, mut rng) = create_set(8);
        for p in set.particles_mut() {
            p.y = 598.0;
            p.speed = 2.0;
        }

        assert_eq!(set.step(&mut rng), 0);
        assert!(set.particles().iter().all(|p| p.y == 600.0));
    }
}
