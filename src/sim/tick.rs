//! One simulation tick
//!
//! Fixed order per tick: throw detector -> turn state machine -> wind ->
//! projectile (in flight only) -> particles. Each stage is bounded and
//! non-blocking; `dt` is passed in so tests can drive time explicitly.

use glam::Vec2;
use rand::Rng;

use super::particles::BurstStyle;
use super::physics::{ImpactCause, Termination, launch_velocity};
use super::state::{GameEvent, GamePhase, GameState, PlayerId};
use super::throw::{AccelSample, ThrowEvent};
use crate::color::palette;
use crate::config::{ScoringPolicy, Span};

/// Inputs for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Latest accelerometer reading, if the sensor produced one
    pub sample: Option<AccelSample>,
    /// Abandon the game in progress and start over
    pub reset: bool,
}

/// Advance the game state by `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.clear_events();

    if input.reset {
        state.reset();
        return;
    }
    if !dt.is_finite() || dt < 0.0 {
        log::warn!("Skipping tick with invalid dt {}", dt);
        return;
    }

    state.time_ticks += 1;

    let throw = state.detector.update(input.sample, dt);
    step_phase(state, throw, dt);

    state.wind.update(dt, &mut state.rng);

    if state.phase == GamePhase::InFlight {
        if let Some(termination) = state.physics.integrate(dt, &state.wind) {
            state.pending_termination = Some(termination);
        }
    }

    state.particles.update(dt);
}

/// Turn state machine: at most one transition per tick
fn step_phase(state: &mut GameState, throw: Option<ThrowEvent>, dt: f32) {
    state.phase_time += dt;

    if let Some(event) = throw {
        if state.phase != GamePhase::Aiming {
            log::debug!("Throw {:?} ignored during {:?}", event, state.phase);
            state.push_event(GameEvent::ThrowIgnored { phase: state.phase });
        }
    }

    match state.phase {
        GamePhase::WaitingForPlayer => {
            state.detector.arm();
            state.turn += 1;
            state.trail_timer = 0.0;
            state.advance(GamePhase::Aiming);
        }
        GamePhase::Aiming => {
            if let Some(event) = throw {
                let player = state.current_player;
                log::info!(
                    "Player {:?} threw: power {:.1}, angle {:.1}°",
                    player,
                    event.power,
                    event.angle
                );
                state.pending_throw = Some(event);
                state.push_event(GameEvent::ThrowAccepted { player, event });
                state.advance(GamePhase::ThrowDetected);
            }
        }
        GamePhase::ThrowDetected => {
            let event = state.pending_throw.take().unwrap_or_default();
            let player = state.current_player;
            let pos = state.field().launch_point(player);
            let velocity = launch_velocity(player, &event, &state.config.physics);
            if state.physics.launch(player, pos, velocity) {
                state.push_event(GameEvent::Launched { player, velocity });
                state.advance(GamePhase::InFlight);
            }
        }
        GamePhase::InFlight => match state.pending_termination.take() {
            Some(termination) => {
                spawn_impact_burst(state, &termination);
                state.last_impact = Some(termination);
                state.push_event(GameEvent::Impact(termination));
                state.advance(GamePhase::Impact);
            }
            None => spawn_trail(state, dt),
        },
        GamePhase::Impact => {
            if state.phase_time >= state.config.rules.impact_hold {
                apply_scoring(state);
                state.advance(GamePhase::RoundScoring);
            }
        }
        GamePhase::RoundScoring => {
            if state.phase_time >= state.config.rules.score_hold {
                finish_round(state);
            }
        }
        GamePhase::GameOver => {}
    }
}

/// Points earned by the flight that just ended
fn flight_points(state: &GameState, impact: &Termination) -> u32 {
    match (impact.cause, state.config.rules.scoring) {
        (ImpactCause::Hit { .. }, _) => state.config.rules.points_per_hit,
        (ImpactCause::Ground, ScoringPolicy::DistanceBonus { max_points }) => {
            let field = state.field();
            let target = field.fort(impact.owner.opponent()).center().x;
            let closeness = 1.0 - (impact.pos.x - target).abs() / field.width;
            (max_points as f32 * closeness.clamp(0.0, 1.0)).floor() as u32
        }
        _ => 0,
    }
}

fn apply_scoring(state: &mut GameState) {
    let Some(impact) = state.last_impact else {
        return;
    };
    let points = flight_points(state, &impact);
    if points == 0 {
        log::info!("Player {:?} scores nothing ({:?})", impact.owner, impact.cause);
        return;
    }

    let player = impact.owner;
    let total = {
        let score = &mut state.scores[player.index()];
        *score = score.saturating_add(points);
        *score
    };
    log::info!("Player {:?} scores {} (total {})", player, points, total);
    state.push_event(GameEvent::Scored {
        player,
        points,
        total,
    });

    if total >= state.config.rules.win_score && state.winner.is_none() {
        state.winner = Some(player);
    }
}

fn finish_round(state: &mut GameState) {
    state.last_impact = None;
    if let Some(winner) = state.winner {
        if state.advance(GamePhase::GameOver) {
            log::info!(
                "Game over: player {:?} wins {}-{}",
                winner,
                state.score(PlayerId::One),
                state.score(PlayerId::Two)
            );
            state.push_event(GameEvent::GameOver { winner });
        }
        return;
    }
    state.current_player = state.current_player.opponent();
    state.advance(GamePhase::WaitingForPlayer);
}

fn spawn_impact_burst(state: &mut GameState, termination: &Termination) {
    let cfg = &state.config.particles;
    let up = -std::f32::consts::FRAC_PI_2;
    let (count, style) = match termination.cause {
        ImpactCause::Hit { .. } => (
            cfg.hit_burst,
            BurstStyle {
                colors: [palette::HIT_HOT, palette::HIT_WARM],
                speed: Span::new(0.3, 0.9),
                lifetime: Span::new(0.4, 0.9),
                direction: up,
                spread: std::f32::consts::PI,
            },
        ),
        ImpactCause::Ground => (
            cfg.ground_burst,
            BurstStyle {
                colors: [palette::SNOW, palette::MISS],
                speed: Span::new(0.2, 0.6),
                lifetime: Span::new(0.3, 0.7),
                direction: up,
                spread: 1.0,
            },
        ),
        ImpactCause::OutOfBounds => {
            // Spray back into the field from whichever edge was crossed
            let inward = if termination.pos.x < 0.0 {
                0.0
            } else {
                std::f32::consts::PI
            };
            (
                cfg.out_of_bounds_burst,
                BurstStyle {
                    colors: [palette::MISS, palette::SNOW],
                    speed: Span::new(0.1, 0.3),
                    lifetime: Span::new(0.2, 0.4),
                    direction: inward,
                    spread: 0.8,
                },
            )
        }
    };

    let origin = termination
        .pos
        .clamp(Vec2::ZERO, Vec2::new(state.field().width, state.field().height));
    state
        .particles
        .burst(origin, count, &style, &mut state.rng);
}

fn spawn_trail(state: &mut GameState, dt: f32) {
    let interval = state.config.particles.trail_interval;
    if interval <= 0.0 {
        return;
    }
    state.trail_timer += dt;
    if state.trail_timer < interval {
        return;
    }
    state.trail_timer -= interval;

    let Some(projectile) = state.physics.active_projectile() else {
        return;
    };
    let pos = projectile.pos;
    let jitter = Vec2::new(
        state.rng.random_range(-0.05f32..=0.05),
        state.rng.random_range(-0.05f32..=0.05),
    );
    let lifetime = state.config.particles.trail_lifetime;
    state.particles.spawn(pos, jitter, palette::TRAIL, lifetime);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, OverflowPolicy};

    const DT: f32 = 1.0 / 60.0;

    fn quick_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.wind.spawn_rate = 0.0;
        config.rules.impact_hold = 0.0;
        config.rules.score_hold = 0.0;
        config
    }

    fn idle() -> TickInput {
        TickInput::default()
    }

    fn run_until(state: &mut GameState, phase: GamePhase, max_ticks: usize) {
        for _ in 0..max_ticks {
            if state.phase == phase {
                return;
            }
            tick(state, &idle(), DT);
        }
        assert_eq!(state.phase, phase, "phase never reached");
    }

    /// Place a throw directly into the state machine as if the detector fired
    fn throw(state: &mut GameState, power: f32, angle: f32) {
        step_phase(state, Some(ThrowEvent { power, angle }), 0.0);
    }

    #[test]
    fn test_waiting_advances_to_aiming() {
        let mut state = GameState::new(&quick_config()).unwrap();
        assert_eq!(state.phase, GamePhase::WaitingForPlayer);
        tick(&mut state, &idle(), DT);
        assert_eq!(state.phase, GamePhase::Aiming);
        assert_eq!(state.turn, 1);

        // Nothing but a throw leaves Aiming
        for _ in 0..300 {
            tick(&mut state, &idle(), DT);
        }
        assert_eq!(state.phase, GamePhase::Aiming);
    }

    #[test]
    fn test_full_turn_sequence() {
        let mut state = GameState::new(&quick_config()).unwrap();
        tick(&mut state, &idle(), DT);
        throw(&mut state, 12.0, 45.0);
        assert_eq!(state.phase, GamePhase::ThrowDetected);
        assert!(state.active_projectile().is_none());

        tick(&mut state, &idle(), DT);
        assert_eq!(state.phase, GamePhase::InFlight);
        assert_eq!(state.active_projectile().unwrap().owner, PlayerId::One);

        run_until(&mut state, GamePhase::Impact, 2000);
        assert!(state.active_projectile().is_none());
        assert!(state.last_impact.is_some());
        assert!(!state.particles.is_empty());

        tick(&mut state, &idle(), DT);
        assert_eq!(state.phase, GamePhase::RoundScoring);
        tick(&mut state, &idle(), DT);
        assert_eq!(state.phase, GamePhase::WaitingForPlayer);
        assert_eq!(state.current_player, PlayerId::Two);
    }

    #[test]
    fn test_throw_ignored_outside_aiming() {
        let mut state = GameState::new(&quick_config()).unwrap();
        // Still WaitingForPlayer: the throw must not be taken
        throw(&mut state, 10.0, 0.0);
        assert_eq!(state.phase, GamePhase::Aiming);
        assert!(state.pending_throw.is_none());
        assert!(
            state
                .events()
                .contains(&GameEvent::ThrowIgnored { phase: GamePhase::WaitingForPlayer })
        );
    }

    #[test]
    fn test_hit_scores_for_thrower() {
        let mut state = GameState::new(&quick_config()).unwrap();
        tick(&mut state, &idle(), DT);
        throw(&mut state, 10.0, 0.0);
        tick(&mut state, &idle(), DT);

        // Force the report the physics step would produce
        state.physics.clear();
        state.pending_termination = Some(Termination {
            cause: ImpactCause::Hit {
                target: PlayerId::Two,
            },
            pos: state.field().fort(PlayerId::Two).center(),
            owner: PlayerId::One,
        });
        tick(&mut state, &idle(), DT);
        assert_eq!(state.phase, GamePhase::Impact);
        assert_eq!(state.scores, [0, 0]);

        tick(&mut state, &idle(), DT);
        assert_eq!(state.phase, GamePhase::RoundScoring);
        assert_eq!(state.scores, [1, 0]);
        assert!(state.events().iter().any(|e| matches!(
            e,
            GameEvent::Scored {
                player: PlayerId::One,
                points: 1,
                total: 1
            }
        )));

        // Scoring does not repeat while the result is displayed
        tick(&mut state, &idle(), DT);
        assert_eq!(state.scores, [1, 0]);
    }

    #[test]
    fn test_distance_bonus_for_near_miss() {
        let mut config = quick_config();
        config.rules.scoring = ScoringPolicy::DistanceBonus { max_points: 2 };
        let state = GameState::new(&config).unwrap();
        let target = state.field().fort(PlayerId::Two).center().x;

        let near = Termination {
            cause: ImpactCause::Ground,
            pos: Vec2::new(target - 1.0, 30.0),
            owner: PlayerId::One,
        };
        let far = Termination {
            pos: Vec2::new(6.0, 30.0),
            ..near
        };
        let out = Termination {
            cause: ImpactCause::OutOfBounds,
            ..near
        };
        assert_eq!(flight_points(&state, &near), 1);
        assert_eq!(flight_points(&state, &far), 0);
        assert_eq!(flight_points(&state, &out), 0);
    }

    #[test]
    fn test_hold_timers() {
        let mut config = quick_config();
        config.rules.impact_hold = 0.5;
        let mut state = GameState::new(&config).unwrap();
        tick(&mut state, &idle(), DT);
        throw(&mut state, 10.0, 30.0);
        run_until(&mut state, GamePhase::Impact, 2000);

        let mut ticks = 0;
        while state.phase == GamePhase::Impact {
            tick(&mut state, &idle(), DT);
            ticks += 1;
        }
        // 0.5s at 60 FPS
        assert!((29..=31).contains(&ticks), "held for {} ticks", ticks);
    }

    #[test]
    fn test_trail_particles_during_flight() {
        let mut config = quick_config();
        config.particles.overflow = OverflowPolicy::Drop;
        let mut state = GameState::new(&config).unwrap();
        tick(&mut state, &idle(), DT);
        throw(&mut state, 20.0, 45.0);
        for _ in 0..10 {
            tick(&mut state, &idle(), DT);
        }
        assert_eq!(state.phase, GamePhase::InFlight);
        assert!(!state.particles.is_empty());
    }

    #[test]
    fn test_reset_cancels_flight() {
        let mut state = GameState::new(&quick_config()).unwrap();
        tick(&mut state, &idle(), DT);
        throw(&mut state, 20.0, 45.0);
        for _ in 0..10 {
            tick(&mut state, &idle(), DT);
        }
        assert!(state.active_projectile().is_some());

        tick(
            &mut state,
            &TickInput {
                reset: true,
                ..Default::default()
            },
            DT,
        );
        assert_eq!(state.phase, GamePhase::WaitingForPlayer);
        assert!(state.active_projectile().is_none());
        assert!(state.particles.is_empty());
        assert_eq!(state.events(), &[GameEvent::Reset]);
    }

    #[test]
    fn test_invalid_dt_skipped() {
        let mut state = GameState::new(&quick_config()).unwrap();
        tick(&mut state, &idle(), f32::NAN);
        tick(&mut state, &idle(), -1.0);
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.phase, GamePhase::WaitingForPlayer);
    }

    #[test]
    fn test_determinism() {
        let mut config = GameConfig::default();
        config.wind.spawn_rate = 5.0;
        let mut a = GameState::new(&config).unwrap();
        let mut b = GameState::new(&config).unwrap();

        for i in 0..600 {
            let sample = if (100..110).contains(&i) {
                AccelSample::new(4.0, 0.0, 2.0)
            } else {
                AccelSample::REST
            };
            let input = TickInput {
                sample: Some(sample),
                reset: false,
            };
            tick(&mut a, &input, DT);
            tick(&mut b, &input, DT);
        }

        assert_eq!(a.phase, b.phase);
        assert_eq!(a.scores, b.scores);
        assert_eq!(a.wind.len(), b.wind.len());
        assert_eq!(a.particles.len(), b.particles.len());
        for (za, zb) in a.wind.iter().zip(b.wind.iter()) {
            assert_eq!(za, zb);
        }
    }
}
