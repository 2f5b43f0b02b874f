//! Transient wind zones
//!
//! Circular force fields that drift into existence, push the projectile while
//! it is inside them, and expire. The zone population is advanced only by
//! [`WindZoneManager::update`]; nothing outside the tick adds or removes zones.

use glam::Vec2;
use rand::Rng;

use super::pool::FixedPool;
use crate::config::WindConfig;

/// Max deviation of a gust from horizontal, radians
const GUST_TILT: f32 = 0.35;

#[derive(Debug, Clone, PartialEq)]
pub struct WindZone {
    pub pos: Vec2,
    pub radius: f32,
    /// Force at the zone center, pixels/frame²
    pub strength: Vec2,
    /// Seconds left before expiry
    pub remaining: f32,
    /// Initial lifetime, seconds
    pub lifetime: f32,
}

impl WindZone {
    pub fn new(pos: Vec2, radius: f32, strength: Vec2, lifetime: f32) -> Self {
        Self {
            pos,
            radius,
            strength,
            remaining: lifetime,
            lifetime,
        }
    }

    /// Force this zone exerts at `point`; zero outside the radius
    pub fn force_at(&self, point: Vec2) -> Vec2 {
        let d = self.pos.distance(point);
        if d >= self.radius {
            return Vec2::ZERO;
        }
        self.strength * falloff(d, self.radius)
    }

    /// Fraction of lifetime remaining, [0, 1]
    pub fn vitality(&self) -> f32 {
        if self.lifetime <= 0.0 {
            return 0.0;
        }
        (self.remaining / self.lifetime).clamp(0.0, 1.0)
    }
}

/// Smoothstep falloff: 1 at the center, 0 at `radius`, continuous (and flat)
/// at the boundary.
#[inline]
pub fn falloff(distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 || distance >= radius {
        return 0.0;
    }
    let t = 1.0 - distance / radius;
    t * t * (3.0 - 2.0 * t)
}

/// Owns every live zone. Zones appear and expire only through `update`.
///
/// ```compile_fail
/// use glam::Vec2;
/// use snowball_fight::config::WindConfig;
/// use snowball_fight::sim::{WindZone, WindZoneManager};
///
/// let mut wind = WindZoneManager::new(&WindConfig::default(), 64, 32);
/// wind.spawn(WindZone::new(Vec2::ZERO, 4.0, Vec2::X, 1.0));
/// ```
#[derive(Debug, Clone)]
pub struct WindZoneManager {
    zones: FixedPool<WindZone>,
    config: WindConfig,
    field: Vec2,
}

impl WindZoneManager {
    pub fn new(config: &WindConfig, width: u32, height: u32) -> Self {
        Self {
            zones: FixedPool::new(config.max_zones),
            config: config.clone(),
            field: Vec2::new(width as f32, height as f32),
        }
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.zones.capacity()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WindZone> {
        self.zones.values()
    }

    /// Summed force of every zone containing `point`
    pub fn force_at(&self, point: Vec2) -> Vec2 {
        self.zones
            .values()
            .fold(Vec2::ZERO, |acc, zone| acc + zone.force_at(point))
    }

    /// Age zones by `dt` seconds, drop expired ones, then maybe spawn a new one
    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        self.zones.retain(|zone| {
            zone.remaining -= dt;
            if zone.remaining <= 0.0 {
                log::debug!("Wind zone at ({:.1}, {:.1}) expired", zone.pos.x, zone.pos.y);
                false
            } else {
                true
            }
        });

        if self.zones.is_full() || self.config.spawn_rate <= 0.0 {
            return;
        }
        let chance = (self.config.spawn_rate * dt).clamp(0.0, 1.0);
        if rng.random::<f32>() < chance {
            let zone = self.random_zone(rng);
            self.spawn(zone);
        }
    }

    fn random_zone<R: Rng + ?Sized>(&self, rng: &mut R) -> WindZone {
        let pos = Vec2::new(
            rng.random_range(0.0..=self.field.x),
            rng.random_range(0.0..=self.field.y),
        );
        let radius = self.config.radius.sample(rng);
        let magnitude = self.config.strength.sample(rng);
        let tilt = rng.random_range(-GUST_TILT..=GUST_TILT);
        let heading = if rng.random_bool(0.5) {
            tilt
        } else {
            std::f32::consts::PI + tilt
        };
        let strength = Vec2::new(heading.cos(), heading.sin()) * magnitude;
        WindZone::new(pos, radius, strength, self.config.lifetime.sample(rng))
    }

    /// Add a zone if capacity allows. Returns false when full.
    pub(crate) fn spawn(&mut self, zone: WindZone) -> bool {
        let (x, y, r) = (zone.pos.x, zone.pos.y, zone.radius);
        if self.zones.insert(zone).is_some() {
            log::debug!("Wind zone spawned at ({:.1}, {:.1}) r={:.1}", x, y, r);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Span;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn manager(max_zones: usize, spawn_rate: f32) -> WindZoneManager {
        let config = WindConfig {
            max_zones,
            spawn_rate,
            ..Default::default()
        };
        WindZoneManager::new(&config, 64, 32)
    }

    #[test]
    fn test_falloff_shape() {
        assert_eq!(falloff(0.0, 10.0), 1.0);
        assert_eq!(falloff(10.0, 10.0), 0.0);
        assert_eq!(falloff(12.0, 10.0), 0.0);
        assert!((falloff(5.0, 10.0) - 0.5).abs() < 1e-6);
        // Monotonically decreasing
        let mut prev = 1.0;
        for i in 1..=100 {
            let f = falloff(i as f32 * 0.1, 10.0);
            assert!(f <= prev);
            prev = f;
        }
    }

    #[test]
    fn test_force_continuous_at_boundary() {
        let zone = WindZone::new(Vec2::new(20.0, 10.0), 8.0, Vec2::new(-0.02, 0.0), 5.0);
        let inside = zone.force_at(Vec2::new(20.0 + 8.0 - 1e-3, 10.0));
        let outside = zone.force_at(Vec2::new(20.0 + 8.0 + 1e-3, 10.0));
        assert!(inside.length() < 1e-6);
        assert_eq!(outside, Vec2::ZERO);
    }

    #[test]
    fn test_force_sums_overlapping_zones() {
        let mut wind = manager(4, 0.0);
        wind.spawn(WindZone::new(Vec2::new(10.0, 10.0), 5.0, Vec2::new(0.01, 0.0), 5.0));
        wind.spawn(WindZone::new(Vec2::new(10.0, 10.0), 5.0, Vec2::new(0.0, 0.02), 5.0));
        wind.spawn(WindZone::new(Vec2::new(50.0, 10.0), 5.0, Vec2::new(1.0, 1.0), 5.0));
        let force = wind.force_at(Vec2::new(10.0, 10.0));
        assert!((force.x - 0.01).abs() < 1e-6);
        assert!((force.y - 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_zones_expire() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut wind = manager(4, 0.0);
        wind.spawn(WindZone::new(Vec2::ZERO, 5.0, Vec2::X, 0.5));
        wind.spawn(WindZone::new(Vec2::ZERO, 5.0, Vec2::X, 1.0));
        wind.update(0.5, &mut rng);
        assert_eq!(wind.len(), 1);
        wind.update(0.25, &mut rng);
        assert_eq!(wind.len(), 1);
        assert!((wind.iter().next().unwrap().remaining - 0.25).abs() < 1e-6);
        wind.update(0.25, &mut rng);
        assert!(wind.is_empty());
    }

    #[test]
    fn test_spawn_policy_fills_to_capacity() {
        let mut rng = Pcg32::seed_from_u64(42);
        let config = WindConfig {
            max_zones: 3,
            spawn_rate: 1000.0,
            lifetime: Span::new(100.0, 100.0),
            ..Default::default()
        };
        let mut wind = WindZoneManager::new(&config, 64, 32);
        for _ in 0..10 {
            wind.update(1.0 / 60.0, &mut rng);
        }
        assert_eq!(wind.len(), 3);
        for zone in wind.iter() {
            assert!((0.0..=64.0).contains(&zone.pos.x));
            assert!((0.0..=32.0).contains(&zone.pos.y));
            assert!((config.radius.min..=config.radius.max).contains(&zone.radius));
            let magnitude = zone.strength.length();
            assert!(magnitude >= config.strength.min - 1e-6);
            assert!(magnitude <= config.strength.max + 1e-6);
        }
    }

    #[test]
    fn test_no_spawn_when_rate_zero() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut wind = manager(4, 0.0);
        for _ in 0..600 {
            wind.update(1.0 / 60.0, &mut rng);
        }
        assert!(wind.is_empty());
    }

    #[test]
    fn test_vitality() {
        let mut zone = WindZone::new(Vec2::ZERO, 1.0, Vec2::ZERO, 4.0);
        assert_eq!(zone.vitality(), 1.0);
        zone.remaining = 1.0;
        assert_eq!(zone.vitality(), 0.25);
    }

    proptest! {
        #[test]
        fn prop_zone_count_bounded(
            max_zones in 1usize..8,
            seed in any::<u64>(),
            extra in 0usize..20,
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut wind = manager(max_zones, 50.0);
            for _ in 0..extra {
                wind.spawn(WindZone::new(Vec2::ZERO, 2.0, Vec2::X, 10.0));
                prop_assert!(wind.len() <= max_zones);
            }
            for _ in 0..120 {
                wind.update(1.0 / 60.0, &mut rng);
                prop_assert!(wind.len() <= max_zones);
            }
        }
    }
}
