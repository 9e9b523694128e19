//! # Player Collision Detection
//!
//! Collision between the player cylinder and the voxel grid runs in two phases:
//!
//! 1. **Broad phase**: every cell in the player's bounding box, rounded outward to whole
//!    cells, is looked up; solid ones become candidates
//! 2. **Narrow phase**: for each candidate the point of the cube closest to the cylinder
//!    axis is tested against the cylinder; a hit becomes a [`Collision`] carrying the
//!    separating normal and penetration depth
//!
//! Cell `(i, j, k)` is the unit cube `[i, i+1] x [j, j+1] x [k, k+1]`.

use cgmath::{InnerSpace, Point3, Vector3};

use crate::engine_state::player_state::player::Player;
use crate::engine_state::voxels::world::BlockQuery;

/// One contact between the player and a block, produced by the narrow phase.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Collision {
    /// World coordinates of the block's cell
    pub block: Point3<i32>,
    /// The point of the block closest to the player's axis
    pub contact_point: Point3<f32>,
    /// Unit vector the player must move along to separate
    pub normal: Vector3<f32>,
    /// How far the player must move along `normal`
    pub overlap: f32,
}

/// Gathers every solid cell overlapping the player's bounding box.
pub fn broad_phase<W: BlockQuery + ?Sized>(player: &Player, world: &W) -> Vec<Point3<i32>> {
    let p = player.position;
    let min_x = (p.x - player.radius).floor() as i32;
    let max_x = (p.x + player.radius).ceil() as i32;
    let min_y = p.y.floor() as i32;
    let max_y = (p.y + player.height).ceil() as i32;
    let min_z = (p.z - player.radius).floor() as i32;
    let max_z = (p.z + player.radius).ceil() as i32;

    let mut candidates = Vec::new();
    for x in min_x..=max_x {
        for y in min_y..=max_y {
            for z in min_z..=max_z {
                if world.is_solid_at(x, y, z) {
                    candidates.push(Point3::new(x, y, z));
                }
            }
        }
    }
    candidates
}

/// Keeps the candidates the player cylinder actually intersects.
///
/// The separating axis is whichever of the vertical and radial overlaps is smaller. A
/// vertical separation pushes straight up or down; a radial one pushes horizontally away
/// from the contact point.
pub fn narrow_phase(candidates: &[Point3<i32>], player: &Player) -> Vec<Collision> {
    let center = player.center();
    let half_height = player.height / 2.0;

    let mut collisions = Vec::new();
    for block in candidates {
        let (x, y, z) = (block.x as f32, block.y as f32, block.z as f32);
        let contact_point = Point3::new(
            center.x.clamp(x, x + 1.0),
            center.y.clamp(y, y + 1.0),
            center.z.clamp(z, z + 1.0),
        );

        if !point_in_player_cylinder(contact_point, player) {
            continue;
        }

        let dx = contact_point.x - center.x;
        let dy = contact_point.y - center.y;
        let dz = contact_point.z - center.z;
        let radial_distance = (dx * dx + dz * dz).sqrt();

        let overlap_y = half_height - dy.abs();
        let overlap_xz = player.radius - radial_distance;

        // with the axis inside the block there is no horizontal direction to push along
        let (normal, overlap) = if overlap_y < overlap_xz || radial_distance <= f32::EPSILON {
            let up = if dy > 0.0 { -1.0 } else { 1.0 };
            (Vector3::new(0.0, up, 0.0), overlap_y)
        } else {
            (Vector3::new(-dx, 0.0, -dz).normalize(), overlap_xz)
        };

        collisions.push(Collision {
            block: *block,
            contact_point,
            normal,
            overlap,
        });
    }
    collisions
}

/// Returns `true` if `point` lies strictly inside the player cylinder.
pub fn point_in_player_cylinder(point: Point3<f32>, player: &Player) -> bool {
    let center = player.center();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    let dz = point.z - center.z;
    dy.abs() < player.height / 2.0 && dx * dx + dz * dz < player.radius * player.radius
}
