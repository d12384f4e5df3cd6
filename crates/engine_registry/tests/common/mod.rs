//! Gameplay-shaped components shared by the integration tests.

#![allow(dead_code)]

use engine_component::Component;
use glam::Vec2;
use tracing_subscriber::EnvFilter;

/// Route registry logs through the test harness. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub pos: Vec2,
}

impl Position {
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
        }
    }
}

impl Component for Position {
    fn type_name() -> &'static str {
        "Position"
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Velocity {
    pub linear: Vec2,
}

impl Component for Velocity {
    fn type_name() -> &'static str {
        "Velocity"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponKind {
    SoccerBall,
    Basketball,
    TennisBall,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weapon {
    pub kind: WeaponKind,
    pub level: u32,
}

impl Weapon {
    #[must_use]
    pub fn new(kind: WeaponKind) -> Self {
        Self { kind, level: 1 }
    }
}

impl Component for Weapon {
    fn type_name() -> &'static str {
        "Weapon"
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    #[must_use]
    pub fn full(max: i32) -> Self {
        Self { current: max, max }
    }
}

impl Component for Health {
    fn type_name() -> &'static str {
        "Health"
    }

    fn validate(&self) -> bool {
        self.max > 0 && (0..=self.max).contains(&self.current)
    }
}

/// Marker for hostile entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enemy;

impl Component for Enemy {
    fn type_name() -> &'static str {
        "Enemy"
    }
}
