//! Game state and core simulation types
//!
//! Everything the tick mutates lives in [`GameState`]. Only [`super::tick`]
//! advances it; hosts read it for rendering and HUD.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::particles::ParticleSystem;
use super::physics::{PhysicsEngine, PlayField, Projectile, Termination};
use super::throw::{ThrowDetector, ThrowEvent};
use super::wind::WindZoneManager;
use crate::config::GameConfig;
use crate::error::ConfigError;

/// Upper bound on events recorded in a single tick
pub const MAX_EVENTS_PER_TICK: usize = 8;

/// Current phase of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Between turns
    WaitingForPlayer,
    /// Current player may throw
    Aiming,
    /// A throw was accepted; launch happens next
    ThrowDetected,
    /// Projectile in the air
    InFlight,
    /// Flight ended, impact effects playing
    Impact,
    /// Points applied, showing the result
    RoundScoring,
    /// Someone reached the win score
    GameOver,
}

impl GamePhase {
    /// Whether `self -> next` is a legal turn transition
    pub fn can_advance_to(self, next: GamePhase) -> bool {
        use GamePhase::*;
        matches!(
            (self, next),
            (WaitingForPlayer, Aiming)
                | (Aiming, ThrowDetected)
                | (ThrowDetected, InFlight)
                | (InFlight, Impact)
                | (Impact, RoundScoring)
                | (RoundScoring, WaitingForPlayer)
                | (RoundScoring, GameOver)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    pub const ALL: [PlayerId; 2] = [PlayerId::One, PlayerId::Two];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }

    pub fn opponent(self) -> PlayerId {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }

    /// Horizontal throw direction: +1 right, -1 left
    pub fn facing(self) -> f32 {
        match self {
            PlayerId::One => 1.0,
            PlayerId::Two => -1.0,
        }
    }
}

/// Notable things that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    ThrowAccepted { player: PlayerId, event: ThrowEvent },
    /// A throw arrived outside `Aiming` and was discarded
    ThrowIgnored { phase: GamePhase },
    Launched { player: PlayerId, velocity: Vec2 },
    Impact(Termination),
    Scored { player: PlayerId, points: u32, total: u32 },
    GameOver { winner: PlayerId },
    Reset,
}

/// Complete simulation state. Read through the accessors; only [`super::tick`]
/// and [`GameState::reset`] change it.
///
/// ```compile_fail
/// use snowball_fight::GameConfig;
/// use snowball_fight::sim::GameState;
///
/// let mut state = GameState::new(&GameConfig::default()).unwrap();
/// state.scores = [99, 0];
/// ```
#[derive(Debug, Clone)]
pub struct GameState {
    pub(crate) config: GameConfig,
    pub(crate) phase: GamePhase,
    /// Seconds spent in the current phase
    pub(crate) phase_time: f32,
    pub(crate) current_player: PlayerId,
    pub(crate) scores: [u32; 2],
    /// 1-based turn counter (0 before the first turn)
    pub(crate) turn: u32,
    pub(crate) winner: Option<PlayerId>,
    /// Simulation tick counter
    pub(crate) time_ticks: u64,
    pub(crate) detector: ThrowDetector,
    pub(crate) wind: WindZoneManager,
    pub(crate) particles: ParticleSystem,
    pub(crate) physics: PhysicsEngine,
    /// Throw accepted in Aiming, consumed by the launch
    pub(crate) pending_throw: Option<ThrowEvent>,
    /// Report from the physics step, consumed by the next state-machine step
    pub(crate) pending_termination: Option<Termination>,
    /// Impact being shown, scored on leaving Impact
    pub(crate) last_impact: Option<Termination>,
    pub(crate) trail_timer: f32,
    pub(crate) rng: Pcg32,
    /// Events from the most recent tick
    events: Vec<GameEvent>,
}

impl GameState {
    /// Build a fresh game. Fails if `config` does not validate.
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let field = PlayField::from_config(config);
        Ok(Self {
            config: config.clone(),
            phase: GamePhase::WaitingForPlayer,
            phase_time: 0.0,
            current_player: PlayerId::One,
            scores: [0; 2],
            turn: 0,
            winner: None,
            time_ticks: 0,
            detector: ThrowDetector::new(&config.throw, &config.physics),
            wind: WindZoneManager::new(&config.wind, config.game_width(), config.game_height()),
            particles: ParticleSystem::new(&config.particles, config.fps),
            physics: PhysicsEngine::new(field, &config.physics, config.fps),
            pending_throw: None,
            pending_termination: None,
            last_impact: None,
            trail_timer: 0.0,
            rng: Pcg32::seed_from_u64(config.seed),
            events: Vec::with_capacity(MAX_EVENTS_PER_TICK),
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn phase_time(&self) -> f32 {
        self.phase_time
    }

    pub fn current_player(&self) -> PlayerId {
        self.current_player
    }

    pub fn scores(&self) -> [u32; 2] {
        self.scores
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn detector(&self) -> &ThrowDetector {
        &self.detector
    }

    pub fn wind(&self) -> &WindZoneManager {
        &self.wind
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    /// Impact currently on display, if any
    pub fn last_impact(&self) -> Option<&Termination> {
        self.last_impact.as_ref()
    }

    pub fn field(&self) -> &PlayField {
        self.physics.field()
    }

    pub fn active_projectile(&self) -> Option<&Projectile> {
        self.physics.active_projectile()
    }

    pub fn score(&self, player: PlayerId) -> u32 {
        self.scores[player.index()]
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub(crate) fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Record an event; beyond the per-tick bound events are dropped
    pub(crate) fn push_event(&mut self, event: GameEvent) {
        if self.events.len() < MAX_EVENTS_PER_TICK {
            self.events.push(event);
        }
    }

    /// Move along the turn sequence. Illegal transitions are refused.
    pub(crate) fn advance(&mut self, next: GamePhase) -> bool {
        let from = self.phase;
        if !from.can_advance_to(next) {
            log::error!("Refused phase transition {:?} -> {:?}", from, next);
            return false;
        }
        log::info!("Phase {:?} -> {:?} (player {:?})", from, next, self.current_player);
        self.phase = next;
        self.phase_time = 0.0;
        self.push_event(GameEvent::PhaseChanged { from, to: next });
        true
    }

    /// Cancel everything in progress and start over from the first turn
    pub fn reset(&mut self) {
        log::info!("Game reset");
        self.physics.clear();
        self.particles.clear();
        self.detector.arm();
        self.phase = GamePhase::WaitingForPlayer;
        self.phase_time = 0.0;
        self.current_player = PlayerId::One;
        self.scores = [0; 2];
        self.turn = 0;
        self.winner = None;
        self.pending_throw = None;
        self.pending_termination = None;
        self.last_impact = None;
        self.trail_timer = 0.0;
        self.push_event(GameEvent::Reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use GamePhase::*;
        let order = [
            WaitingForPlayer,
            Aiming,
            ThrowDetected,
            InFlight,
            Impact,
            RoundScoring,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].can_advance_to(pair[1]));
        }
        assert!(RoundScoring.can_advance_to(WaitingForPlayer));
        assert!(RoundScoring.can_advance_to(GameOver));

        // No skipping, no leaving GameOver
        assert!(!Aiming.can_advance_to(InFlight));
        assert!(!InFlight.can_advance_to(GameOver));
        assert!(!Impact.can_advance_to(WaitingForPlayer));
        for phase in order {
            assert!(!GameOver.can_advance_to(phase));
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = GameConfig::default();
        config.display.layout.panels_vertical = 0;
        assert!(GameState::new(&config).is_err());
    }

    #[test]
    fn test_advance_refuses_skip() {
        let mut state = GameState::new(&GameConfig::default()).unwrap();
        assert!(!state.advance(GamePhase::InFlight));
        assert_eq!(state.phase, GamePhase::WaitingForPlayer);
        assert!(state.advance(GamePhase::Aiming));
        assert_eq!(
            state.events(),
            &[GameEvent::PhaseChanged {
                from: GamePhase::WaitingForPlayer,
                to: GamePhase::Aiming
            }]
        );
    }

    #[test]
    fn test_event_bound() {
        let mut state = GameState::new(&GameConfig::default()).unwrap();
        for _ in 0..20 {
            state.push_event(GameEvent::Reset);
        }
        assert_eq!(state.events().len(), MAX_EVENTS_PER_TICK);
        state.clear_events();
        assert!(state.events().is_empty());
    }

    #[test]
    fn test_player_helpers() {
        assert_eq!(PlayerId::One.opponent(), PlayerId::Two);
        assert_eq!(PlayerId::Two.opponent(), PlayerId::One);
        assert_eq!(PlayerId::Two.index(), 1);
        assert_eq!(PlayerId::One.facing(), 1.0);
    }
}
