#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use cellsim::simulation::entity::EntityKey;
use cellsim::simulation::geometric_utils::vec2;
use cellsim::simulation::spatial::{
    HashMembership, MAX_GRID_EXTENT, SpatialHash, hash_key, node_coordinates,
};
use slotmap::SlotMap;

fn keys(count: usize) -> Vec<EntityKey> {
    let mut map: SlotMap<EntityKey, ()> = SlotMap::with_key();
    (0..count).map(|_| map.insert(())).collect()
}

#[test]
fn test_node_coordinates_truncate_then_shift() {
    assert_eq!(node_coordinates(vec2(0.0, 0.0)), (0, 0));
    assert_eq!(node_coordinates(vec2(63.9, 64.0)), (0, 1));
    assert_eq!(node_coordinates(vec2(130.0, -130.0)), (2, -3));
    assert_eq!(node_coordinates(vec2(-1.0, -64.0)), (-1, -1));
    // Truncation toward zero comes before the shift.
    assert_eq!(node_coordinates(vec2(-0.5, 0.5)), (0, 0));
}

#[test]
fn test_hash_key_distinguishes_sign() {
    assert_ne!(hash_key(1, -1), hash_key(-1, 1));
    assert_ne!(hash_key(0, 1), hash_key(1, 0));
    assert_eq!(hash_key(-3, 7), hash_key(-3, 7));
}

#[test]
fn test_nodes_cover_arena_with_margin() {
    let hash = SpatialHash::new(256.0);
    assert_eq!(hash.extent(), 6);
    assert_eq!(hash.node_count(), 13 * 13);
    assert!(hash.node(-6, 6).is_some());
    assert!(hash.node(7, 0).is_none());
}

#[test]
fn test_grid_size_is_capped() {
    let hash = SpatialHash::new(1.0e12);
    assert_eq!(hash.extent(), MAX_GRID_EXTENT);

    let hash = SpatialHash::new(f32::NAN);
    assert_eq!(hash.extent(), 2);
}

#[test]
fn test_register_fills_three_by_three_block() {
    let mut hash = SpatialHash::new(512.0);
    let key = keys(1)[0];
    let mut membership = HashMembership::default();

    hash.register_entity(key, vec2(100.0, -20.0), &mut membership);

    assert_eq!(membership.node(), Some((1, -1)));
    assert_eq!(membership.registered_nodes().len(), 9);
    for x in 0..=2 {
        for y in -2..=0 {
            let node = hash.node(x, y).unwrap();
            assert_eq!(node.entities(), &[key]);
        }
    }
    assert!(hash.node(3, -1).unwrap().entities().is_empty());
}

#[test]
fn test_register_twice_keeps_one_entry_per_node() {
    let mut hash = SpatialHash::new(512.0);
    let key = keys(1)[0];
    let mut membership = HashMembership::default();

    hash.register_entity(key, vec2(10.0, 10.0), &mut membership);
    hash.register_entity(key, vec2(10.0, 10.0), &mut membership);

    assert_eq!(membership.registered_nodes().len(), 9);
    assert_eq!(hash.node(0, 0).unwrap().entities().len(), 1);
}

#[test]
fn test_moving_entity_leaves_old_nodes() {
    let mut hash = SpatialHash::new(512.0);
    let key = keys(1)[0];
    let mut membership = HashMembership::default();

    hash.register_entity(key, vec2(10.0, 10.0), &mut membership);
    hash.register_entity(key, vec2(300.0, 300.0), &mut membership);

    assert!(hash.node(0, 0).unwrap().entities().is_empty());
    assert_eq!(hash.node(4, 4).unwrap().entities(), &[key]);
    assert_eq!(membership.node(), Some((4, 4)));
}

#[test]
fn test_position_outside_grid_registers_nowhere() {
    let mut hash = SpatialHash::new(128.0);
    let key = keys(1)[0];
    let mut membership = HashMembership::default();

    hash.register_entity(key, vec2(1.0e6, 1.0e6), &mut membership);

    assert!(membership.registered_nodes().is_empty());
    assert!(!hash.contains(key));
    assert!(hash.query(key, &membership, true).is_empty());
    assert!(hash.query(key, &membership, false).is_empty());
}

#[test]
fn test_narrow_and_full_queries() {
    let mut hash = SpatialHash::new(512.0);
    let k = keys(3);
    let (a, b, c) = (k[0], k[1], k[2]);
    let mut ma = HashMembership::default();
    let mut mb = HashMembership::default();
    let mut mc = HashMembership::default();

    hash.register_entity(a, vec2(10.0, 10.0), &mut ma); // node (0, 0)
    hash.register_entity(b, vec2(70.0, 10.0), &mut mb); // node (1, 0)
    hash.register_entity(c, vec2(200.0, 10.0), &mut mc); // node (3, 0)

    assert_eq!(hash.query(a, &ma, false), vec![b]);
    assert_eq!(hash.query(a, &ma, true), vec![b]);

    let mut expected = vec![a, c];
    expected.sort();
    assert_eq!(hash.query(b, &mb, true), expected);
    assert!(hash.query(c, &mc, false).is_empty());
    assert_eq!(hash.query(c, &mc, true), vec![b]);
}

#[test]
fn test_query_is_deduplicated_and_excludes_self() {
    let mut hash = SpatialHash::new(512.0);
    let k = keys(2);
    let mut ma = HashMembership::default();
    let mut mb = HashMembership::default();

    hash.register_entity(k[0], vec2(5.0, 5.0), &mut ma);
    hash.register_entity(k[1], vec2(6.0, 6.0), &mut mb);

    let mut out = vec![k[0], k[0], k[1]];
    hash.query_into(k[0], &ma, true, &mut out);
    assert_eq!(out, vec![k[1]]);
}

#[test]
fn test_unregister_is_idempotent() {
    let mut hash = SpatialHash::new(512.0);
    let key = keys(1)[0];
    let mut membership = HashMembership::default();

    hash.unregister(key, &mut membership);
    hash.register_entity(key, vec2(0.0, 0.0), &mut membership);
    assert!(hash.contains(key));

    hash.unregister(key, &mut membership);
    hash.unregister(key, &mut membership);
    assert!(!hash.contains(key));
    assert!(!membership.is_registered());
}

#[test]
fn test_debug_geometry_marks_occupied_nodes() {
    let mut hash = SpatialHash::new(256.0);
    let key = keys(1)[0];
    let mut membership = HashMembership::default();
    hash.register_entity(key, vec2(0.0, 0.0), &mut membership);

    let geometry = hash.debug_geometry();
    assert_eq!(geometry.len(), hash.node_count());
    assert_eq!(geometry.iter().filter(|n| n.occupied).count(), 9);
    assert!(geometry.iter().all(|n| n.rect.width() == 64.0));

    hash.clear();
    assert!(hash.debug_geometry().iter().all(|n| !n.occupied));
}
