use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sieve_engine::ecs::{Entity, Mask, System, World, system::Frame};
use sieve_macros::Component;

#[derive(Component, Debug, Clone, Copy, PartialEq)]
struct A(u32);

#[derive(Component, Debug, Clone, Copy, PartialEq)]
struct B(u32);

#[derive(Component, Debug, Clone, Copy, PartialEq)]
struct C(u32);

#[derive(Default)]
struct SystemA {
    last_seen: usize,
}

impl System for SystemA {
    type Filter = (A,);

    fn update(&mut self, frame: Frame<'_>) {
        self.last_seen = frame.entities().len();
    }
}

#[derive(Default)]
struct SystemB {
    last_seen: usize,
}

impl System for SystemB {
    type Filter = (B,);

    fn update(&mut self, frame: Frame<'_>) {
        self.last_seen = frame.entities().len();
    }
}

#[derive(Default)]
struct SystemAB;

impl System for SystemAB {
    type Filter = (A, B);

    fn update(&mut self, _frame: Frame<'_>) {}
}

/// Check every live entity's masks against what its components say they must be.
fn assert_masks_consistent(world: &World) {
    let types = world.component_types();
    let a = types.get::<A>().map_or(Mask::EMPTY, |d| d.bit());
    let b = types.get::<B>().map_or(Mask::EMPTY, |d| d.bit());
    let c = types.get::<C>().map_or(Mask::EMPTY, |d| d.bit());

    for entity in world.entities() {
        let mut expected = Mask::EMPTY;
        if world.has_component::<A>(entity) {
            expected = expected.with(a);
        }
        if world.has_component::<B>(entity) {
            expected = expected.with(b);
        }
        if world.has_component::<C>(entity) {
            expected = expected.with(c);
        }
        assert_eq!(world.component_mask(entity), Some(expected), "{entity:?}");

        let systems = world.system_mask(entity).unwrap();
        let tracked_ab = world.matched::<SystemAB>().unwrap().contains(entity);
        let bit = world.system_types().get::<SystemAB>().unwrap().bit();
        assert_eq!(tracked_ab, expected.contains_all(a.with(b)), "{entity:?}");
        assert_eq!(systems.contains_all(bit), tracked_ab, "{entity:?}");
    }
}

#[test]
fn thousand_entities_split_between_systems() {
    // Given
    let mut world = World::new();
    let entities: Vec<Entity> = (0..1000).map(|_| world.create_entity()).collect();
    for (index, &entity) in entities.iter().enumerate() {
        world.add_component(entity, A(index as u32)).unwrap();
        if index % 2 == 0 {
            world.add_component(entity, B(index as u32)).unwrap();
        }
    }
    world.add_system::<SystemA>().unwrap();
    world.add_system::<SystemB>().unwrap();

    // When
    world.tick(1.0 / 60.0);

    // Then
    assert_eq!(world.get_system::<SystemA>().unwrap().last_seen, 1000);
    assert_eq!(world.get_system::<SystemB>().unwrap().last_seen, 500);

    // When
    assert_eq!(world.remove_component::<B>(entities[0]), Some(B(0)));
    world.tick(1.0 / 60.0);

    // Then
    assert_eq!(world.get_system::<SystemA>().unwrap().last_seen, 1000);
    assert_eq!(world.get_system::<SystemB>().unwrap().last_seen, 499);
}

#[test]
fn destroyed_entity_loses_components_and_id_is_reused() {
    // Given
    let mut world = World::new();
    world.add_system::<SystemAB>().unwrap();
    let entity = world.create_entity();
    world.add_component(entity, A(1)).unwrap();
    world.add_component(entity, B(2)).unwrap();
    assert!(world.matched::<SystemAB>().unwrap().contains(entity));

    // When
    world.destroy_entity(entity);
    world.tick(0.0);

    // Then
    assert!(!world.has_component::<A>(entity));
    assert!(!world.has_component::<B>(entity));
    assert!(world.matched::<SystemAB>().unwrap().is_empty());

    let reused = world.create_entity();
    assert_eq!(reused.id(), entity.id());
    assert_ne!(reused, entity);
    assert_eq!(world.component_mask(reused), Some(Mask::EMPTY));
    assert_eq!(world.system_mask(reused), Some(Mask::EMPTY));
    assert!(!world.has_component::<A>(reused));
    assert!(!world.is_alive(entity));
}

#[test]
fn membership_follows_conjunction() {
    // Given
    let mut world = World::new();
    world.add_system::<SystemAB>().unwrap();
    let entity = world.create_entity();

    // When / Then
    world.add_component(entity, A(0)).unwrap();
    assert!(!world.matched::<SystemAB>().unwrap().contains(entity));

    world.add_component(entity, B(0)).unwrap();
    assert_eq!(world.matched::<SystemAB>().unwrap().len(), 1);

    world.add_component(entity, C(0)).unwrap();
    assert_eq!(world.matched::<SystemAB>().unwrap().len(), 1);

    world.remove_component::<B>(entity);
    assert!(world.matched::<SystemAB>().unwrap().is_empty());
    assert_masks_consistent(&world);
}

#[test]
fn add_system_twice_returns_same_instance() {
    // Given
    let mut world = World::new();
    world.add_system::<SystemA>().unwrap().last_seen = 42;

    // When
    let again = world.add_system::<SystemA>().unwrap();

    // Then
    assert_eq!(again.last_seen, 42);
    assert_eq!(world.system_count(), 1);
}

#[test]
fn destroy_twice_queues_once() {
    // Given
    let mut world = World::new();
    let entity = world.create_entity();

    // When
    let first = world.destroy_entity(entity);
    let second = world.destroy_entity(entity);
    world.tick(0.0);

    // Then
    assert!(first);
    assert!(!second);
    assert_eq!(world.entity_count(), 0);
    assert!(!world.destroy_entity(entity));
}

#[test]
fn late_system_is_seeded_from_existing_entities() {
    // Given
    let mut world = World::new();
    for index in 0..10 {
        let entity = world.create_entity();
        world.add_component(entity, A(index)).unwrap();
        if index < 3 {
            world.add_component(entity, B(index)).unwrap();
        }
    }

    // When
    world.add_system::<SystemAB>().unwrap();

    // Then
    assert_eq!(world.matched::<SystemAB>().unwrap().len(), 3);
    assert_masks_consistent(&world);
}

#[test]
fn removed_system_can_be_added_again() {
    // Given
    let mut world = World::new();
    world.add_system::<SystemAB>().unwrap();
    let entity = world.create_entity();
    world.add_component(entity, A(0)).unwrap();
    world.add_component(entity, B(0)).unwrap();

    // When
    assert!(world.remove_system::<SystemAB>().is_some());
    assert_eq!(world.system_mask(entity), Some(Mask::EMPTY));
    world.add_system::<SystemAB>().unwrap();

    // Then
    assert!(world.matched::<SystemAB>().unwrap().contains(entity));
    assert_masks_consistent(&world);
}

#[test]
fn random_churn_keeps_masks_consistent() {
    // Given
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
    let mut world = World::new();
    world.add_system::<SystemAB>().unwrap();
    let mut live: Vec<Entity> = Vec::new();

    // When
    for step in 0..2000 {
        match rng.gen_range(0..6) {
            0 | 1 => live.push(world.create_entity()),
            2 if !live.is_empty() => {
                let entity = live[rng.gen_range(0..live.len())];
                match rng.gen_range(0..3) {
                    0 => world.add_component(entity, A(step)).unwrap(),
                    1 => world.add_component(entity, B(step)).unwrap(),
                    _ => world.add_component(entity, C(step)).unwrap(),
                };
            }
            3 if !live.is_empty() => {
                let entity = live[rng.gen_range(0..live.len())];
                match rng.gen_range(0..3) {
                    0 => world.remove_component::<A>(entity).is_some(),
                    1 => world.remove_component::<B>(entity).is_some(),
                    _ => world.remove_component::<C>(entity).is_some(),
                };
            }
            4 if !live.is_empty() => {
                let entity = live.swap_remove(rng.gen_range(0..live.len()));
                if rng.gen_bool(0.5) {
                    world.destroy_now(entity);
                } else {
                    world.destroy_entity(entity);
                }
            }
            _ => world.tick(0.0),
        }
    }
    world.tick(0.0);

    // Then
    assert_eq!(world.entity_count(), live.len());
    assert_masks_consistent(&world);
}

#[derive(Component)]
struct Marker<const N: usize>;

macro_rules! register_markers {
    ($world:ident, $($n:literal)*) => {
        $( $world.register_component::<Marker<$n>>().unwrap(); )*
    };
}

#[test]
fn thirty_third_component_type_is_rejected() {
    // Given
    let mut world = World::new();
    register_markers!(world, 0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16 17 18 19 20 21 22 23 24 25 26 27 28 29 30);
    let entity = world.create_entity();
    assert!(world.add_component(entity, A(0)).unwrap());

    // When
    let error = world.add_component(entity, B(0)).unwrap_err();

    // Then
    assert!(error.type_name().ends_with("B"));
    assert_eq!(world.component_types().len(), 32);
    assert!(!world.has_component::<B>(entity));
    assert!(world.add_system::<SystemB>().is_err());
    assert!(world.get_system::<SystemB>().is_none());
}
