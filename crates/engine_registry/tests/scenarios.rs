//! End-to-end registry scenarios, driven the way gameplay systems use it.

mod common;

use common::{Enemy, Health, Position, Velocity, Weapon, WeaponKind, init_tracing};
use engine_component::{Component, EntityAllocator, same_instance};
use engine_registry::{ComponentRegistry, RegistryError};
use glam::Vec2;

#[test]
fn test_player_with_two_weapons() {
    init_tracing();
    let mut alloc = EntityAllocator::new();
    let mut registry = ComponentRegistry::new();
    let e1 = alloc.allocate();

    registry.add_component(e1, Position::new(0.0, 0.0)).unwrap();
    let soccer = registry
        .add_component(e1, Weapon::new(WeaponKind::SoccerBall))
        .unwrap();
    registry
        .add_component(e1, Weapon::new(WeaponKind::Basketball))
        .unwrap();

    assert_eq!(registry.get_component_count_by_type::<Weapon>(e1), 2);
    assert_eq!(
        registry.get_component::<Weapon>(e1, 0).unwrap().kind,
        WeaponKind::SoccerBall
    );

    let removed = registry.remove_component_by_type::<Weapon>(e1, 0).unwrap();
    assert!(same_instance(&removed, &soccer));
    assert_eq!(removed.kind, WeaponKind::SoccerBall);

    let remaining = registry.get_components::<Weapon>(e1);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].kind, WeaponKind::Basketball);
    assert!(registry.validate_registry());
}

#[test]
fn test_clear_after_population() {
    init_tracing();
    let mut alloc = EntityAllocator::new();
    let mut registry = ComponentRegistry::new();
    for i in 0..25 {
        let e = alloc.allocate();
        registry
            .add_component(e, Position::new(i as f32, 0.0))
            .unwrap();
        if i % 3 == 0 {
            registry.add_component(e, Health::full(100)).unwrap();
        }
    }
    assert!(!registry.is_empty());

    registry.clear();

    assert_eq!(registry.len(), 0);
    assert!(registry.get_all_component_types().is_empty());
    assert!(registry.validate_registry());
    assert_eq!(registry.entity_count(), 0);
}

#[test]
fn test_inactive_entity_rejection_leaves_state_untouched() {
    init_tracing();
    let mut alloc = EntityAllocator::new();
    let mut registry = ComponentRegistry::new();
    let live = alloc.allocate();
    registry.add_component(live, Health::full(10)).unwrap();

    let mut dead = alloc.allocate();
    dead.deactivate();
    let before = registry.stats();

    let err = registry
        .add_component(dead, Position::new(1.0, 1.0))
        .unwrap_err();
    assert_eq!(err, RegistryError::InactiveEntity(dead.id()));
    assert_eq!(registry.stats(), before);
    assert!(!registry.contains(dead));
    assert_eq!(registry.get_entities_with_component::<Position>().count(), 0);
    assert!(registry.validate_registry());
}

#[test]
fn test_invalid_component_rejected() {
    init_tracing();
    let mut registry = ComponentRegistry::new();
    let e = EntityAllocator::new().allocate();
    let overhealed = Health {
        current: 120,
        max: 100,
    };
    assert!(matches!(
        registry.add_component(e, overhealed),
        Err(RegistryError::InvalidComponent { kind: "Health", .. })
    ));
    assert!(registry.is_empty());
}

#[test]
fn test_deactivated_enemy_drops_out_of_queries() {
    init_tracing();
    let mut alloc = EntityAllocator::new();
    let mut registry = ComponentRegistry::new();
    let player = alloc.allocate();
    let grunt = alloc.allocate();
    let brute = alloc.allocate();

    registry.add_component(player, Position::new(0.0, 0.0)).unwrap();
    for (enemy, x) in [(grunt, 5.0), (brute, -5.0)] {
        registry.add_component(enemy, Position::new(x, 0.0)).unwrap();
        registry.add_component(enemy, Enemy).unwrap();
        registry.add_component(enemy, Health::full(30)).unwrap();
    }

    registry.set_entity_active(grunt, false);

    let chasing: Vec<_> = registry
        .get_entities_with_components::<(Enemy, Position)>()
        .map(|(e, _)| e.id())
        .collect();
    assert_eq!(chasing, vec![brute.id()]);

    // Still stored; only hidden from queries.
    assert!(registry.has_component::<Enemy>(grunt));
    assert!(registry.validate_registry());
}

#[test]
fn test_enemy_death_removes_everything() {
    init_tracing();
    let mut alloc = EntityAllocator::new();
    let mut registry = ComponentRegistry::new();
    let enemy = alloc.allocate();
    registry.add_component(enemy, Enemy).unwrap();
    registry.add_component(enemy, Position::new(3.0, 4.0)).unwrap();
    registry.add_component(enemy, Health::full(20)).unwrap();

    let removed = registry.remove_entity_components(enemy);
    assert_eq!(removed.component_count(), 3);
    assert_eq!(removed.get::<Position>()[0].pos, Vec2::new(3.0, 4.0));
    assert!(removed.contains_kind(Enemy::component_type_id()));

    assert!(!registry.contains(enemy));
    assert!(registry.is_empty());
    assert!(registry.validate_registry());
}

#[test]
fn test_physics_step_through_update_component() {
    init_tracing();
    let mut alloc = EntityAllocator::new();
    let mut registry = ComponentRegistry::new();
    for i in 0..4 {
        let e = alloc.allocate();
        registry.add_component(e, Position::new(0.0, 0.0)).unwrap();
        if i % 2 == 0 {
            registry
                .add_component(
                    e,
                    Velocity {
                        linear: Vec2::new(1.0, 2.0),
                    },
                )
                .unwrap();
        }
    }

    let dt = 0.5;
    let moving: Vec<_> = registry
        .get_entities_with_single_components::<(Position, Velocity)>()
        .map(|(e, (_, velocity))| (e, velocity.linear))
        .collect();
    for (entity, linear) in moving {
        registry
            .update_component::<Position, _>(entity, 0, |p| p.pos += linear * dt)
            .unwrap();
    }

    let positions: Vec<_> = registry
        .get_entities_with_component::<Position>()
        .map(|(_, ps)| ps[0].pos)
        .collect();
    assert_eq!(
        positions,
        vec![
            Vec2::new(0.5, 1.0),
            Vec2::ZERO,
            Vec2::new(0.5, 1.0),
            Vec2::ZERO
        ]
    );
}

#[test]
fn test_weapon_upgrade_does_not_leak_into_earlier_snapshot() {
    init_tracing();
    let mut registry = ComponentRegistry::new();
    let e = EntityAllocator::new().allocate();
    registry
        .add_component(e, Weapon::new(WeaponKind::TennisBall))
        .unwrap();

    let loadout = registry.get_components::<Weapon>(e);
    registry
        .update_component::<Weapon, _>(e, 0, |w| w.level += 1)
        .unwrap();

    assert_eq!(loadout[0].level, 1);
    assert_eq!(registry.get_component::<Weapon>(e, 0).unwrap().level, 2);
}

#[test]
fn test_overheal_rejected_on_update() {
    init_tracing();
    let mut registry = ComponentRegistry::new();
    let e = EntityAllocator::new().allocate();
    registry.add_component(e, Health::full(10)).unwrap();

    let err = registry
        .update_component::<Health, _>(e, 0, |h| h.current = 500)
        .unwrap_err();
    assert!(matches!(err, RegistryError::InvalidComponent { kind: "Health", .. }));
    assert_eq!(registry.get_component::<Health>(e, 0).unwrap().current, 10);
    assert!(registry.validate_registry());
}

#[test]
fn test_component_meta_lookup() {
    let mut registry = ComponentRegistry::new();
    let e = EntityAllocator::new().allocate();
    registry.add_component(e, Enemy).unwrap();

    let meta = registry.component_meta(Enemy::component_type_id()).unwrap();
    assert_eq!(meta.name, "Enemy");
    assert!(registry.component_meta(Weapon::component_type_id()).is_none());
}
