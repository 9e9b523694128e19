//! # Voxel Raycast
//!
//! Grid traversal (Amanatides & Woo) from a point along a direction, visiting every cell
//! the ray passes through in order until a solid one is found.

use cgmath::{InnerSpace, Point3, Vector3};

use crate::engine_state::voxels::world::BlockQuery;

/// The first solid cell a ray hit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    /// The solid cell
    pub block: Point3<i32>,
    /// The cell the ray was in just before, i.e. the face-adjacent cell it entered through
    pub previous: Point3<i32>,
    /// Distance along the ray to the point where it entered `block`
    pub distance: f32,
}

/// Casts a ray through the grid and returns the first solid cell within `max_distance`.
///
/// `direction` does not need to be normalized. A zero direction never hits anything
/// except the origin's own cell.
pub fn raycast<W: BlockQuery + ?Sized>(
    world: &W,
    origin: Point3<f32>,
    direction: Vector3<f32>,
    max_distance: f32,
) -> Option<RayHit> {
    let mut cell = Point3::new(
        origin.x.floor() as i32,
        origin.y.floor() as i32,
        origin.z.floor() as i32,
    );
    if world.is_solid_at(cell.x, cell.y, cell.z) {
        return Some(RayHit {
            block: cell,
            previous: cell,
            distance: 0.0,
        });
    }
    if direction.magnitude2() == 0.0 {
        return None;
    }
    let direction = direction.normalize();

    let step = direction.map(|d| if d > 0.0 { 1 } else { -1 });
    let t_delta = direction.map(|d| if d != 0.0 { 1.0 / d.abs() } else { f32::INFINITY });
    // an axis the ray does not move along is never crossed
    let first_boundary = |o: f32, c: i32, d: f32, inv: f32| {
        if d > 0.0 {
            ((c as f32 + 1.0) - o) * inv
        } else if d < 0.0 {
            (o - c as f32) * inv
        } else {
            f32::INFINITY
        }
    };
    let mut t_max = Vector3::new(
        first_boundary(origin.x, cell.x, direction.x, t_delta.x),
        first_boundary(origin.y, cell.y, direction.y, t_delta.y),
        first_boundary(origin.z, cell.z, direction.z, t_delta.z),
    );

    loop {
        let previous = cell;
        let distance;
        if t_max.x < t_max.y && t_max.x < t_max.z {
            distance = t_max.x;
            cell.x += step.x;
            t_max.x += t_delta.x;
        } else if t_max.y < t_max.z {
            distance = t_max.y;
            cell.y += step.y;
            t_max.y += t_delta.y;
        } else {
            distance = t_max.z;
            cell.z += step.z;
            t_max.z += t_delta.z;
        }

        if distance > max_distance {
            return None;
        }
        if world.is_solid_at(cell.x, cell.y, cell.z) {
            return Some(RayHit {
                block: cell,
                previous,
                distance,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;
    use crate::engine_state::voxels::block::Block;

    struct Cells(HashSet<(i32, i32, i32)>);

    impl BlockQuery for Cells {
        fn block_at(&self, x: i32, y: i32, z: i32) -> Option<Block> {
            self.0.contains(&(x, y, z)).then(|| Block::new(BlockType::DIRT))
        }
    }

    #[test]
    fn hits_the_first_block_along_an_axis() {
        let world = Cells(HashSet::from([(3, 0, 0), (5, 0, 0)]));
        let hit = raycast(&world, Point3::new(0.5, 0.5, 0.5), Vector3::unit_x(), 10.0)
            .expect("block in reach");
        assert_eq!(hit.block, Point3::new(3, 0, 0));
        assert_eq!(hit.previous, Point3::new(2, 0, 0));
        assert!((hit.distance - 2.5).abs() < 1e-5);
    }

    #[test]
    fn stops_at_max_distance() {
        let world = Cells(HashSet::from([(0, -6, 0)]));
        let down = Vector3::new(0.0, -1.0, 0.0);
        assert!(raycast(&world, Point3::new(0.5, 0.5, 0.5), down, 5.0).is_none());
        assert!(raycast(&world, Point3::new(0.5, 0.5, 0.5), down, 6.0).is_some());
    }

    #[test]
    fn diagonal_rays_walk_through_negative_cells() {
        let world = Cells(HashSet::from([(-2, 0, -2)]));
        let hit = raycast(
            &world,
            Point3::new(0.5, 0.5, 0.5),
            Vector3::new(-1.0, 0.0, -1.0),
            10.0,
        )
        .expect("block on the diagonal");
        assert_eq!(hit.block, Point3::new(-2, 0, -2));
    }

    #[test]
    fn whole_number_origin_stays_in_its_row() {
        let world = Cells(HashSet::from([(0, 0, 2)]));
        let hit = raycast(&world, Point3::new(0.0, 0.5, 0.5), Vector3::unit_z(), 5.0)
            .expect("block straight ahead");
        assert_eq!(hit.block, Point3::new(0, 0, 2));
        assert_eq!(hit.previous, Point3::new(0, 0, 1));
        assert!((hit.distance - 1.5).abs() < 1e-5);

        // an eye at z = 32.0 looking along +X scans row z = 32, not z = 31
        let world = Cells(HashSet::from([(35, 32, 31), (36, 32, 32)]));
        let hit = raycast(&world, Point3::new(32.5, 32.5, 32.0), Vector3::unit_x(), 5.0)
            .expect("block in the eye's row");
        assert_eq!(hit.block, Point3::new(36, 32, 32));
    }

    #[test]
    fn starting_inside_a_block_hits_it() {
        let world = Cells(HashSet::from([(0, 0, 0)]));
        let hit = raycast(&world, Point3::new(0.2, 0.2, 0.2), Vector3::unit_z(), 1.0)
            .expect("origin is solid");
        assert_eq!(hit.distance, 0.0);
    }
}
