#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::geom::Point;
use crate::piece::{PieceId, PieceStore};

/// Topmost piece under `world_pt` that still intercepts pointers.
///
/// Pieces are tested front to back against their rotated rectangle, so a
/// point in the empty corner of a rotated piece's bounding box misses it.
/// Locked and removed pieces never block raycasts and are skipped.
#[must_use]
pub fn hit_test(world_pt: Point, store: &PieceStore) -> Option<PieceId> {
    store
        .front_to_back()
        .filter(|p| p.blocks_raycasts)
        .find(|p| {
            let local = (world_pt - p.transform.position).rotated(-p.transform.rotation);
            let hw = (p.size.width * p.transform.scale.x * 0.5).abs();
            let hh = (p.size.height * p.transform.scale.y * 0.5).abs();
            local.x.abs() <= hw && local.y.abs() <= hh
        })
        .map(|p| p.id)
}
