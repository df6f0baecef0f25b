//! Particle Celebration Engine.
//!
//! `celebrate` lays out the whole celebration up front as timed
//! [`ParticleBurst`] descriptors: one big centre burst, two follow-ups, a
//! ring of side bursts, then a bounded "rain" from random points along the
//! top edge. Bursts are fire-and-forget; the renderer owns the particles.
//!
//! Reduced motion keeps every stage and shrinks counts and timings, so the
//! celebration is gentler but never missing.

use std::time::Duration;

use bevy::log::{info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::MotionPreference;
use crate::schedule::Scheduler;

/// Celebration colours (rose pinks and gold).
pub const PALETTE: [[u8; 3]; 5] = [
    [0xff, 0x6b, 0x9d],
    [0xff, 0x8f, 0xab],
    [0xff, 0xb3, 0xc1],
    [0xe0, 0xac, 0x69],
    [0xd4, 0xaf, 0x37],
];

/// Frames a particle lives for.
pub const PARTICLE_TICKS: u32 = 200;

/// Spacing between rain bursts (one per display frame at 60 Hz).
pub const RAIN_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeSet {
    /// Rose glyphs.
    Roses,
    /// Circles and squares, used when the rose resource is unavailable.
    Basic,
}

/// One-shot burst descriptor. Origin is normalised screen space, `(0.5,
/// 0.5)` is the centre and `y = 0` the top edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleBurst {
    pub origin_x: f32,
    pub origin_y: f32,
    pub count: u32,
    pub spread_deg: f32,
    pub shapes: ShapeSet,
}

impl ParticleBurst {
    fn new(origin_x: f32, origin_y: f32, count: u32, spread_deg: f32) -> Self {
        Self {
            origin_x,
            origin_y,
            count,
            spread_deg,
            shapes: ShapeSet::Roses,
        }
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowUp {
    pub delay: Duration,
    pub count: u32,
    pub spread_deg: f32,
}

/// Magnitudes and timings for every stage of a celebration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CelebrationProfile {
    pub initial_count: u32,
    pub follow_ups: [FollowUp; 2],
    pub ring_bursts: u32,
    pub ring_count: u32,
    pub ring_radius: f32,
    pub ring_start: Duration,
    pub ring_step: Duration,
    pub rain_start: Duration,
    pub rain_duration: Duration,
    pub rain_count: u32,
    pub rain_spread_deg: f32,
}

impl CelebrationProfile {
    pub fn full() -> Self {
        Self {
            initial_count: 100,
            follow_ups: [
                FollowUp {
                    delay: Duration::from_millis(150),
                    count: 70,
                    spread_deg: 120.0,
                },
                FollowUp {
                    delay: Duration::from_millis(300),
                    count: 50,
                    spread_deg: 90.0,
                },
            ],
            ring_bursts: 8,
            ring_count: 30,
            ring_radius: 0.3,
            ring_start: Duration::from_millis(200),
            ring_step: Duration::from_millis(200),
            rain_start: Duration::from_millis(400),
            rain_duration: Duration::from_millis(3000),
            rain_count: 5,
            rain_spread_deg: 50.0,
        }
    }

    pub fn reduced() -> Self {
        Self {
            initial_count: 20,
            follow_ups: [
                FollowUp {
                    delay: Duration::from_millis(50),
                    count: 14,
                    spread_deg: 120.0,
                },
                FollowUp {
                    delay: Duration::from_millis(100),
                    count: 10,
                    spread_deg: 90.0,
                },
            ],
            ring_bursts: 3,
            ring_count: 6,
            ring_radius: 0.3,
            ring_start: Duration::from_millis(70),
            ring_step: Duration::from_millis(70),
            rain_start: Duration::from_millis(150),
            rain_duration: Duration::from_millis(1000),
            rain_count: 2,
            rain_spread_deg: 30.0,
        }
    }

    pub fn for_motion(motion: MotionPreference) -> Self {
        if motion.is_reduced() {
            Self::reduced()
        } else {
            Self::full()
        }
    }

    /// Every burst of one celebration with its offset from the start,
    /// rain included.
    pub fn plan(&self, rain_seed: u64) -> Vec<(Duration, ParticleBurst)> {
        let mut bursts = vec![(
            Duration::ZERO,
            ParticleBurst::new(0.5, 0.5, self.initial_count, 360.0),
        )];
        bursts.extend(self.follow_ups.iter().map(|f| {
            (f.delay, ParticleBurst::new(0.5, 0.5, f.count, f.spread_deg))
        }));
        for i in 0..self.ring_bursts {
            let angle = std::f32::consts::TAU * i as f32 / self.ring_bursts as f32;
            let x = 0.5 + self.ring_radius * angle.cos();
            let y = 0.5 + self.ring_radius * angle.sin();
            bursts.push((
                self.ring_start + self.ring_step * i,
                ParticleBurst::new(x, y, self.ring_count, 60.0),
            ));
        }
        bursts.extend(Rain::new(rain_seed, self));
        bursts
    }
}

// ---------------------------------------------------------------------------
// Rain
// ---------------------------------------------------------------------------

/// Finite, time-gated stream of small bursts from random top-edge points.
///
/// Yields one burst every [`RAIN_INTERVAL`] from `rain_start` until
/// `rain_start + rain_duration`. The same seed replays the same rain.
#[derive(Debug, Clone)]
pub struct Rain {
    rng: ChaCha8Rng,
    next: Duration,
    end: Duration,
    count: u32,
    spread_deg: f32,
}

impl Rain {
    pub fn new(seed: u64, profile: &CelebrationProfile) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            next: profile.rain_start,
            end: profile.rain_start + profile.rain_duration,
            count: profile.rain_count,
            spread_deg: profile.rain_spread_deg,
        }
    }
}

impl Iterator for Rain {
    type Item = (Duration, ParticleBurst);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let at = self.next;
        self.next += RAIN_INTERVAL;
        let x: f32 = self.rng.gen();
        let burst = ParticleBurst::new(x, 0.0, self.count, self.spread_deg);
        Some((at, burst))
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ParticleEngine {
    profile: CelebrationProfile,
    shapes: ShapeSet,
    rng: ChaCha8Rng,
    pending: Scheduler<ParticleBurst>,
}

impl ParticleEngine {
    pub fn new(motion: MotionPreference, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        Self {
            profile: CelebrationProfile::for_motion(motion),
            shapes: ShapeSet::Roses,
            rng: ChaCha8Rng::seed_from_u64(seed),
            pending: Scheduler::new(),
        }
    }

    /// Queue a full celebration starting at `now`.
    pub fn celebrate(&mut self, now: Duration) {
        let plan = self.profile.plan(self.rng.gen());
        info!("Celebration: {} bursts queued", plan.len());
        for (offset, burst) in plan {
            self.pending.schedule_at(now + offset, burst);
        }
    }

    /// Bursts due at `now`, stamped with the current shape set.
    pub fn poll(&mut self, now: Duration, out: &mut Vec<ParticleBurst>) {
        while let Some(mut burst) = self.pending.pop_due(now) {
            burst.shapes = self.shapes;
            out.push(burst);
        }
    }

    /// Drop every burst not yet fired.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// The rose resource failed to load: fall back to basic shapes.
    pub fn mark_shape_unavailable(&mut self) {
        if self.shapes == ShapeSet::Roses {
            warn!("Celebration: rose shape unavailable, using basic shapes");
            self.shapes = ShapeSet::Basic;
        }
    }

    pub fn shapes(&self) -> ShapeSet {
        self.shapes
    }

    pub fn profile(&self) -> &CelebrationProfile {
        &self.profile
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}
