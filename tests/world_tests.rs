#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use std::collections::HashSet;

use cellsim::simulation::dna::Dna;
use cellsim::simulation::error::SimError;
use cellsim::simulation::geometric_utils::{length, vec2, wrap_angle};
use cellsim::simulation::params::Params;
use cellsim::simulation::random::RandomSource;
use cellsim::simulation::resource::ResourceKind;
use cellsim::simulation::spatial::{MAX_WORLD_RADIUS, node_coordinates};
use cellsim::simulation::world::{World, point_in_circle, random_point_in_circle};

const DT: f32 = 1.0 / 60.0;

fn create_test_params() -> Params {
    Params {
        world_radius: 1024.0,
        initial_cells: 20,
        initial_food: 5,
        initial_water: 3,
        initial_fire: 2,
        population_floor: 10,
        seed: 7,
        ..Params::default()
    }
}

fn create_world(params: Params) -> World {
    let mut world = World::new(params).unwrap();
    world.initialize().unwrap();
    world
}

fn run(world: &mut World, ticks: usize) {
    for _ in 0..ticks {
        world.update(DT).unwrap();
    }
}

fn count_kind(world: &World, kind: ResourceKind) -> usize {
    world
        .entities()
        .filter(|(_, entity)| entity.resource_kind() == Some(kind))
        .count()
}

fn counted_cells(world: &World) -> usize {
    world.entities().filter(|(_, entity)| entity.is_cell()).count()
}

#[test]
fn test_invalid_params_are_rejected() {
    let params = Params {
        world_radius: 0.0,
        ..Params::default()
    };
    assert!(matches!(World::new(params), Err(SimError::InvalidParams(_))));

    let params = Params {
        world_radius: f32::NAN,
        ..Params::default()
    };
    assert!(World::new(params).is_err());

    let params = Params {
        hidden_count: 0,
        ..Params::default()
    };
    assert!(World::new(params).is_err());
}

#[test]
fn test_oversized_radius_is_rejected() {
    let params = Params {
        world_radius: 3.0e9,
        ..Params::default()
    };
    assert!(matches!(World::new(params), Err(SimError::InvalidParams(_))));

    let params = Params {
        world_radius: MAX_WORLD_RADIUS + 1.0,
        ..Params::default()
    };
    assert!(matches!(params.validate(), Err(SimError::InvalidParams(_))));

    let params = Params {
        world_radius: MAX_WORLD_RADIUS,
        ..Params::default()
    };
    assert!(params.validate().is_ok());
}

#[test]
fn test_nan_limits_are_rejected() {
    let nan_mass = Params {
        max_mass: f32::NAN,
        ..Params::default()
    };
    let nan_energy = Params {
        max_energy: f32::NAN,
        ..Params::default()
    };
    let nan_radius = Params {
        max_radius: f32::NAN,
        ..Params::default()
    };
    let zero_radius = Params {
        max_radius: 0.0,
        ..Params::default()
    };
    for params in [nan_mass, nan_energy, nan_radius, zero_radius] {
        assert!(matches!(World::new(params), Err(SimError::InvalidParams(_))));
    }
}

#[test]
fn test_initialize_spawns_configured_population() {
    let world = create_world(create_test_params());

    assert_eq!(world.cell_count(), 20);
    assert_eq!(counted_cells(&world), 20);
    assert_eq!(count_kind(&world, ResourceKind::Food), 5);
    assert_eq!(count_kind(&world, ResourceKind::Water), 3);
    assert_eq!(count_kind(&world, ResourceKind::Fire), 2);
    assert_eq!(world.entity_count(), 30);
    assert_eq!(world.stats().max_generation, 1);
}

#[test]
fn test_initialize_twice_starts_over() {
    let mut world = create_world(create_test_params());
    run(&mut world, 10);
    world.initialize().unwrap();

    assert_eq!(world.cell_count(), 20);
    assert_eq!(world.entity_count(), 30);
}

#[test]
fn test_clearing_keeps_the_grid() {
    let mut world = create_world(create_test_params());
    let nodes = world.spatial_hash().node_count();

    world.initialize().unwrap();
    assert_eq!(world.spatial_hash().node_count(), nodes);

    world.destroy().unwrap();
    assert_eq!(world.spatial_hash().node_count(), nodes);
    assert!(world.spatial_hash().debug_geometry().iter().all(|node| !node.occupied));
}

#[test]
fn test_indexed_access_matches_iteration() {
    let world = create_world(create_test_params());

    assert_eq!(world.network().weight_count(), 19 * 16 + 16 + 16 * 4 + 4);
    for (index, (key, entity)) in world.entities().enumerate() {
        assert_eq!(world.entity_at(index).unwrap().id, entity.id);
        assert_eq!(world.entity(key).unwrap().id, entity.id);
    }
    assert!(world.entity_at(world.entity_count()).is_none());
}

#[test]
fn test_entity_ids_are_unique() {
    let mut world = create_world(create_test_params());
    run(&mut world, 30);

    let ids: HashSet<u64> = world.entities().map(|(_, entity)| entity.id.0).collect();
    assert_eq!(ids.len(), world.entity_count());
}

#[test]
fn test_point_in_world_boundary_is_inclusive() {
    let world = create_world(create_test_params());

    assert!(world.is_point_in_world(vec2(0.0, 0.0)));
    assert!(world.is_point_in_world(vec2(1024.0, 0.0)));
    assert!(world.is_point_in_world(vec2(0.0, -1024.0)));
    assert!(!world.is_point_in_world(vec2(1024.5, 0.0)));
    assert!(!world.is_point_in_world(vec2(800.0, 800.0)));
    assert!(point_in_circle(vec2(3.0, 4.0), 5.0));
}

#[test]
fn test_random_points_land_inside() {
    let mut world = create_world(create_test_params());
    for _ in 0..1000 {
        let point = world.random_world_point();
        assert!(world.is_point_in_world(point));
    }

    let mut rng = RandomSource::new(3);
    for _ in 0..1000 {
        assert!(length(random_point_in_circle(&mut rng, 10.0)) <= 10.0);
    }
}

#[test]
fn test_entities_stay_in_world() {
    let mut world = create_world(create_test_params());
    run(&mut world, 300);

    for (_, entity) in world.entities() {
        assert!(world.is_entity_in_world(entity));
    }
}

#[test]
fn test_hash_membership_matches_positions() {
    let mut world = create_world(create_test_params());
    run(&mut world, 120);

    let hash = world.spatial_hash();
    for (key, entity) in world.entities() {
        let (x, y) = node_coordinates(entity.body.position);
        let membership = entity.body.membership();
        assert_eq!(membership.node(), Some((x, y)));
        assert_eq!(membership.registered_nodes().len(), 9);
        for nx in x - 1..=x + 1 {
            for ny in y - 1..=y + 1 {
                let node = hash.node(nx, ny).unwrap();
                assert_eq!(node.entities().iter().filter(|&&k| k == key).count(), 1);
            }
        }
    }
}

#[test]
fn test_dead_cell_is_removed_in_same_tick() {
    let mut world = create_world(create_test_params());
    let (key, _) = world
        .entities()
        .find(|(_, entity)| entity.is_cell())
        .unwrap();

    world
        .entity_mut(key)
        .and_then(|entity| entity.as_cell_mut())
        .unwrap()
        .set_energy(0.0);
    world.update(DT).unwrap();

    assert!(world.entity(key).is_none());
    assert!(!world.spatial_hash().contains(key));
    assert_eq!(world.cell_count(), 19);
    assert_eq!(world.stats().cell_deaths, 1);
    assert_eq!(world.stats().replacements, 0);
}

#[test]
fn test_population_floor_replaces_dead_cells() {
    let params = Params {
        initial_cells: 10,
        initial_food: 0,
        initial_water: 0,
        initial_fire: 0,
        ..create_test_params()
    };
    let mut world = create_world(params);
    let keys: Vec<_> = world.entities().map(|(key, _)| key).collect();

    for key in &keys {
        world
            .entity_mut(*key)
            .and_then(|entity| entity.as_cell_mut())
            .unwrap()
            .set_energy(0.0);
    }
    world.update(DT).unwrap();

    assert_eq!(world.cell_count(), 10);
    assert_eq!(counted_cells(&world), 10);
    assert_eq!(world.stats().cell_deaths, 10);
    assert_eq!(world.stats().replacements, 10);
    assert!(keys.iter().all(|&key| world.entity(key).is_none()));
}

#[test]
fn test_depleted_resource_respawns_same_kind() {
    let mut world = create_world(create_test_params());
    let (key, _) = world
        .entities()
        .find(|(_, entity)| entity.resource_kind() == Some(ResourceKind::Food))
        .unwrap();

    world.entity_mut(key).unwrap().body.alive = false;
    world.update(DT).unwrap();

    assert!(world.entity(key).is_none());
    assert_eq!(count_kind(&world, ResourceKind::Food), 5);
    assert_eq!(world.stats().food_depleted, 1);
    assert_eq!(world.stats().respawns, 1);
}

#[test]
fn test_zero_dt_moves_nothing() {
    let params = Params {
        initial_cells: 3,
        initial_food: 0,
        initial_water: 0,
        initial_fire: 0,
        population_floor: 0,
        ..create_test_params()
    };
    let mut world = create_world(params);
    run(&mut world, 10);

    let before: Vec<_> = world
        .entities()
        .map(|(key, entity)| (key, entity.body.position, entity.body.rotation))
        .collect();
    let time = world.time();

    world.update(0.0).unwrap();

    assert_eq!(world.time(), time);
    for (key, position, rotation) in before {
        let entity = world.entity(key).unwrap();
        assert!(length(entity.body.position - position) < 1e-3);
        assert!(wrap_angle(entity.body.rotation - rotation).abs() < 1e-5);
    }
}

#[test]
fn test_negative_or_nan_dt_is_treated_as_zero() {
    let mut world = create_world(create_test_params());
    world.update(-1.0).unwrap();
    world.update(f32::NAN).unwrap();
    assert_eq!(world.time(), 0.0);
    assert_eq!(world.stats().ticks, 2);
}

#[test]
fn test_mismatched_genome_fails_update() {
    let mut world = create_world(create_test_params());
    let dna = Dna::new_random(5, &mut RandomSource::new(1));
    world.spawn_cell(1, dna, vec2(0.0, 0.0));

    assert!(matches!(world.update(DT), Err(SimError::WeightCount { .. })));
    assert_eq!(world.time(), 0.0);
    assert_eq!(world.stats().ticks, 0);
}

#[test]
fn test_tracking_cycles_through_cells() {
    let params = Params {
        initial_cells: 5,
        ..create_test_params()
    };
    let mut world = create_world(params);
    assert!(world.tracked_entity().is_none());

    let visited: Vec<_> = (0..5).map(|_| world.track_next().unwrap()).collect();
    let distinct: HashSet<_> = visited.iter().copied().collect();
    assert_eq!(distinct.len(), 5);
    assert!(visited.iter().all(|&key| world.entity(key).unwrap().is_cell()));

    assert_eq!(world.track_next(), Some(visited[0]));
    assert_eq!(world.track_previous(), Some(visited[4]));
    assert_eq!(world.tracked_key(), Some(visited[4]));

    world
        .entity_mut(visited[4])
        .and_then(|entity| entity.as_cell_mut())
        .unwrap()
        .set_energy(0.0);
    world.update(DT).unwrap();
    assert_eq!(world.tracked_key(), None);
}

#[test]
fn test_debug_geometry_follows_toggle() {
    let mut world = create_world(create_test_params());
    assert!(world.debug_geometry().is_empty());

    world.set_debug(true);
    assert_eq!(world.debug_geometry().len(), world.spatial_hash().node_count());
    assert!(world.debug_geometry().iter().any(|node| node.occupied));

    run(&mut world, 5);
    assert_eq!(world.debug_geometry().len(), world.spatial_hash().node_count());

    world.set_debug(false);
    assert!(world.debug_geometry().is_empty());
}

#[test]
fn test_same_seed_gives_same_run() {
    let mut a = create_world(create_test_params());
    let mut b = create_world(create_test_params());
    run(&mut a, 120);
    run(&mut b, 120);

    let state = |world: &World| -> Vec<_> {
        world
            .entities()
            .map(|(_, entity)| (entity.id, entity.body.position, entity.body.velocity))
            .collect()
    };
    assert_eq!(state(&a), state(&b));
    assert_eq!(a.stats(), b.stats());
}

#[test]
fn test_population_evolves() {
    let params = Params {
        world_radius: 1024.0,
        initial_cells: 50,
        initial_food: 10,
        initial_water: 10,
        initial_fire: 0,
        population_floor: 10,
        seed: 1234,
        ..Params::default()
    };
    let mut world = create_world(params);
    run(&mut world, 1000);

    let stats = world.stats();
    assert!(world.cell_count() >= 10);
    assert_eq!(world.cell_count(), counted_cells(&world));
    assert!(stats.births > 0);
    assert!(stats.max_generation >= 2);
    assert_eq!(stats.ticks, 1000);
    assert!((world.time() - 1000.0 * DT).abs() < 1e-2);
}
