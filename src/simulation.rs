//! Mouse-reactive particle field simulation
//!
//! This module contains pure state and step logic with no browser
//! dependencies, so the motion invariants can be unit tested natively.
//! Rendering lives in `canvas2d` and event wiring in `hero`.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Tunables for the particle field, fixed at startup.
///
/// Colors are RGBA normalized to 0.0-1.0; the canvas renderer converts
/// them to CSS strings. The alpha of `line_color` is the opacity of a
/// connection at zero distance, scaled down linearly with distance.
#[derive(Debug, Clone)]
pub struct FieldConfig {
    /// Upper bound on the number of particles
    pub particle_count: usize,
    /// Surface area (px^2) allotted per particle; caps density on small surfaces
    pub area_per_particle: f32,
    /// Particle fill color
    pub particle_color: [f32; 4],
    /// Connection line color at zero distance
    pub line_color: [f32; 4],
    /// Base particle radius; actual radii are drawn from [0.5x, 1.0x]
    pub particle_radius: f32,
    /// Speed cap (px per frame)
    pub max_speed: f32,
    /// Pairs closer than this get a connecting line
    pub connection_distance: f32,
    /// Pointer-to-particle distance at which repulsion reaches zero
    pub influence_radius: f32,
    /// Impulse scale of the pointer repulsion
    pub repel_strength: f32,
    /// Per-frame velocity decay factor
    pub damping: f32,
    /// Amplitude of the symmetric per-frame velocity jitter
    pub jitter: f32,
    /// Particles wrap once they drift this far past an edge
    pub wrap_margin: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: 80,
            area_per_particle: 15000.0,
            // Warm muted green
            particle_color: [0.353, 0.541, 0.416, 0.35],
            line_color: [0.353, 0.541, 0.416, 0.12],
            particle_radius: 2.0,
            max_speed: 0.5,
            connection_distance: 120.0,
            influence_radius: 150.0,
            repel_strength: 0.02,
            damping: 0.99,
            jitter: 0.02,
            wrap_margin: 10.0,
        }
    }
}

/// A single point mass in the field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
}

/// The particle field: owns all particles, the pointer state, and a
/// seeded RNG so trajectories are reproducible.
///
/// The field is inert until [`ParticleField::resize`] gives it a
/// surface; resizing discards and recreates every particle.
pub struct ParticleField {
    pub config: FieldConfig,
    pub particles: Vec<Particle>,
    width: f32,
    height: f32,
    pointer: Option<(f32, f32)>,
    rng: SmallRng,
}

/// Number of live particles for a surface of the given size:
/// the configured count, capped by surface area.
pub fn particle_count_for(config: &FieldConfig, width: f32, height: f32) -> usize {
    let density_cap = (width * height / config.area_per_particle).floor().max(0.0) as usize;
    config.particle_count.min(density_cap)
}

impl ParticleField {
    /// Create an empty field. `seed` fixes the RNG so repeated runs with
    /// the same inputs produce identical trajectories.
    pub fn new(config: FieldConfig, seed: u64) -> Self {
        Self {
            config,
            particles: Vec::new(),
            width: 0.0,
            height: 0.0,
            pointer: None,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn pointer(&self) -> Option<(f32, f32)> {
        self.pointer
    }

    /// Set new surface bounds and rebuild the particle set from scratch.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;

        let count = particle_count_for(&self.config, width, height);
        let mut particles = Vec::with_capacity(count);
        for _ in 0..count {
            particles.push(Particle {
                x: self.rng.gen_range(0.0..1.0) * width,
                y: self.rng.gen_range(0.0..1.0) * height,
                vx: (self.rng.gen_range(0.0..1.0) - 0.5) * self.config.max_speed,
                vy: (self.rng.gen_range(0.0..1.0) - 0.5) * self.config.max_speed,
                radius: self.config.particle_radius * (0.5 + self.rng.gen_range(0.0..1.0) * 0.5),
            });
        }
        self.particles = particles;
    }

    /// Pointer position in surface coordinates.
    pub fn set_pointer(&mut self, x: f32, y: f32) {
        self.pointer = Some((x, y));
    }

    /// Forget the pointer (it left the surface or never entered).
    pub fn clear_pointer(&mut self) {
        self.pointer = None;
    }

    /// Advance every particle by one frame.
    ///
    /// Order matters: repel from the pointer, integrate, damp, jitter,
    /// clamp speed, then wrap. Clamping after the jitter keeps the speed
    /// invariant exact, and wrapping after integration keeps positions
    /// inside the margin band.
    pub fn step(&mut self) {
        let cfg = self.config.clone();
        let (width, height) = (self.width, self.height);
        let pointer = self.pointer;

        for p in &mut self.particles {
            if let Some((px, py)) = pointer {
                let dx = p.x - px;
                let dy = p.y - py;
                let dist = (dx * dx + dy * dy).sqrt();
                // dist > 0 guards the normalization below
                if dist < cfg.influence_radius && dist > 0.0 {
                    let falloff = (cfg.influence_radius - dist) / cfg.influence_radius;
                    p.vx += dx / dist * falloff * cfg.repel_strength;
                    p.vy += dy / dist * falloff * cfg.repel_strength;
                }
            }

            p.x += p.vx;
            p.y += p.vy;

            p.vx *= cfg.damping;
            p.vy *= cfg.damping;

            // Random drift keeps damped particles from freezing in place
            p.vx += (self.rng.gen_range(0.0..1.0) - 0.5) * cfg.jitter;
            p.vy += (self.rng.gen_range(0.0..1.0) - 0.5) * cfg.jitter;

            let speed = (p.vx * p.vx + p.vy * p.vy).sqrt();
            if speed > cfg.max_speed {
                p.vx = p.vx / speed * cfg.max_speed;
                p.vy = p.vy / speed * cfg.max_speed;
            }

            // Toroidal wrap: reappear at the opposite edge
            if p.x < -cfg.wrap_margin {
                p.x = width + cfg.wrap_margin;
            }
            if p.x > width + cfg.wrap_margin {
                p.x = -cfg.wrap_margin;
            }
            if p.y < -cfg.wrap_margin {
                p.y = height + cfg.wrap_margin;
            }
            if p.y > height + cfg.wrap_margin {
                p.y = -cfg.wrap_margin;
            }
        }
    }

    /// All particle pairs close enough to connect, with the line strength
    /// `1 - d / connection_distance` (1.0 when touching, 0.0 at the
    /// threshold). The renderer scales this by the line color's alpha.
    ///
    /// O(n^2), which is fine at the capped particle counts.
    pub fn connections(&self) -> Vec<(usize, usize, f32)> {
        let threshold = self.config.connection_distance;
        let mut pairs = Vec::new();
        for i in 0..self.particles.len() {
            for j in (i + 1)..self.particles.len() {
                let dx = self.particles[i].x - self.particles[j].x;
                let dy = self.particles[i].y - self.particles[j].y;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist < threshold {
                    pairs.push((i, j, 1.0 - dist / threshold));
                }
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> ParticleField {
        ParticleField::new(FieldConfig::default(), 42)
    }

    fn speed(p: &Particle) -> f32 {
        (p.vx * p.vx + p.vy * p.vy).sqrt()
    }

    #[test]
    fn density_cap_on_small_surface() {
        // 300x150 -> area 45000 -> floor(45000 / 15000) = 3
        let mut f = field();
        f.resize(300.0, 150.0);
        assert_eq!(f.particles.len(), 3);
    }

    #[test]
    fn configured_cap_on_large_surface() {
        let mut f = field();
        f.resize(1920.0, 1080.0);
        assert_eq!(f.particles.len(), 80);
    }

    #[test]
    fn zero_area_yields_no_particles() {
        let mut f = field();
        f.resize(0.0, 0.0);
        assert!(f.particles.is_empty());
        // Stepping an empty field must not panic
        f.step();
    }

    #[test]
    fn resize_recreates_all_particles() {
        let mut f = field();
        f.resize(800.0, 600.0);
        let before = f.particles.clone();
        f.resize(800.0, 600.0);
        assert_eq!(f.particles.len(), before.len());
        assert_ne!(f.particles, before, "resize should reseed positions");
    }

    #[test]
    fn initial_particles_satisfy_bounds_and_speed() {
        let mut f = field();
        f.resize(300.0, 150.0);
        for p in &f.particles {
            assert!(p.x >= 0.0 && p.x <= 300.0);
            assert!(p.y >= 0.0 && p.y <= 150.0);
            assert!(p.vx.abs() <= f.config.max_speed / 2.0);
            assert!(p.vy.abs() <= f.config.max_speed / 2.0);
            assert!(p.radius >= f.config.particle_radius * 0.5);
            assert!(p.radius <= f.config.particle_radius);
        }
    }

    #[test]
    fn speed_never_exceeds_cap() {
        let mut f = field();
        f.resize(800.0, 600.0);
        f.set_pointer(400.0, 300.0);
        for _ in 0..500 {
            f.step();
            for p in &f.particles {
                assert!(speed(p) <= f.config.max_speed + 1e-5);
            }
        }
    }

    #[test]
    fn positions_stay_in_wrap_band() {
        let mut f = field();
        f.resize(400.0, 200.0);
        let margin = f.config.wrap_margin;
        for _ in 0..1000 {
            f.step();
            for p in &f.particles {
                assert!(p.x >= -margin && p.x <= 400.0 + margin);
                assert!(p.y >= -margin && p.y <= 200.0 + margin);
            }
        }
    }

    #[test]
    fn wraps_to_opposite_edge() {
        let mut f = field();
        // 300x150 is large enough for particles to exist at all
        f.resize(300.0, 150.0);
        assert!(!f.particles.is_empty());
        let margin = f.config.wrap_margin;
        f.particles[0] = Particle {
            x: 300.0 + margin + 0.4,
            y: 75.0,
            vx: 0.0,
            vy: 0.0,
            radius: 1.0,
        };
        f.step();
        // Past the right band, so the particle teleports to the left edge
        assert!(f.particles[0].x <= -margin + f.config.max_speed + 1e-5);
    }

    #[test]
    fn pointer_at_particle_position_is_guarded() {
        let mut f = field();
        f.resize(300.0, 150.0);
        let (x, y) = (f.particles[0].x, f.particles[0].y);
        f.set_pointer(x, y);
        f.step();
        for p in &f.particles {
            assert!(p.x.is_finite() && p.y.is_finite());
            assert!(p.vx.is_finite() && p.vy.is_finite());
        }
    }

    #[test]
    fn pointer_repels_nearby_particle() {
        let mut f = field();
        f.resize(800.0, 600.0);
        f.particles[0] = Particle {
            x: 400.0,
            y: 300.0,
            vx: 0.0,
            vy: 0.0,
            radius: 1.0,
        };
        // Pointer just left of the particle pushes it right
        f.set_pointer(390.0, 300.0);
        f.step();
        // Impulse dwarfs the jitter at this distance
        assert!(f.particles[0].vx > 0.0, "repulsion should point away from the pointer");
    }

    #[test]
    fn pointer_outside_influence_radius_has_no_effect() {
        let cfg = FieldConfig {
            jitter: 0.0,
            ..FieldConfig::default()
        };
        let mut f = ParticleField::new(cfg, 7);
        f.resize(800.0, 600.0);
        f.particles[0] = Particle {
            x: 400.0,
            y: 300.0,
            vx: 0.1,
            vy: 0.0,
            radius: 1.0,
        };
        f.set_pointer(400.0 - 200.0, 300.0);
        f.step();
        // Only damping applied, no impulse
        let expected = 0.1 * f.config.damping;
        assert!((f.particles[0].vx - expected).abs() < 1e-6);
        assert_eq!(f.particles[0].vy, 0.0);
    }

    #[test]
    fn trajectories_are_deterministic_for_a_fixed_seed() {
        let mut a = ParticleField::new(FieldConfig::default(), 1234);
        let mut b = ParticleField::new(FieldConfig::default(), 1234);
        a.resize(640.0, 480.0);
        b.resize(640.0, 480.0);
        a.set_pointer(100.0, 100.0);
        b.set_pointer(100.0, 100.0);
        for _ in 0..200 {
            a.step();
            b.step();
        }
        assert_eq!(a.particles, b.particles);
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = ParticleField::new(FieldConfig::default(), 1);
        let mut b = ParticleField::new(FieldConfig::default(), 2);
        a.resize(640.0, 480.0);
        b.resize(640.0, 480.0);
        assert_ne!(a.particles, b.particles);
    }

    #[test]
    fn connection_strength_follows_linear_falloff() {
        let mut f = field();
        f.resize(400.0, 300.0);
        let make = |x: f32| Particle {
            x,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            radius: 1.0,
        };
        // Half the threshold apart -> strength exactly one half
        f.particles = vec![make(0.0), make(60.0)];
        let pairs = f.connections();
        assert_eq!(pairs.len(), 1);
        assert!((pairs[0].2 - 0.5).abs() < 1e-6);

        // Exactly at the threshold -> no line
        f.particles = vec![make(0.0), make(120.0)];
        assert!(f.connections().is_empty());
    }

    #[test]
    fn coincident_particles_connect_at_full_strength() {
        let mut f = field();
        f.resize(400.0, 300.0);
        let p = Particle {
            x: 10.0,
            y: 10.0,
            vx: 0.0,
            vy: 0.0,
            radius: 1.0,
        };
        f.particles = vec![p, p];
        let pairs = f.connections();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].2, 1.0);
    }

    #[test]
    fn clearing_pointer_disables_repulsion() {
        let cfg = FieldConfig {
            jitter: 0.0,
            ..FieldConfig::default()
        };
        let mut f = ParticleField::new(cfg, 9);
        f.resize(800.0, 600.0);
        f.set_pointer(400.0, 300.0);
        f.clear_pointer();
        assert_eq!(f.pointer(), None);
        f.particles[0] = Particle {
            x: 401.0,
            y: 300.0,
            vx: 0.0,
            vy: 0.0,
            radius: 1.0,
        };
        f.step();
        assert_eq!(f.particles[0].vx, 0.0);
    }
}
