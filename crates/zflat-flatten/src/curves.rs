//! Arc and circle normalization.
//!
//! Arc curves are drawn from their segment vertices as if they still lay
//! on a circle. Moving those vertices one by one bends the arc out of
//! shape, so circular curves are exploded into plain edges before any
//! vertex moves.

use std::collections::HashSet;

use tracing::debug;
use zflat_scene::{CurveId, EdgeId, SceneHost};

use crate::error::Result;

/// Explode every distinct arc or circle curve that `edges` belong to.
///
/// Returns the number of curves exploded. Polyline curves are left alone.
pub fn explode_circular_curves<H: SceneHost + ?Sized>(
    host: &mut H,
    edges: &[EdgeId],
) -> Result<usize> {
    let mut seen: HashSet<CurveId> = HashSet::new();
    let mut circular = Vec::new();
    for &edge in edges {
        let Some(curve) = host.edge_curve(edge)? else {
            continue;
        };
        if seen.insert(curve) && host.curve_kind(curve)?.is_circular() {
            circular.push(curve);
        }
    }
    for &curve in &circular {
        host.explode_curve(curve)?;
    }
    if !circular.is_empty() {
        debug!(count = circular.len(), "exploded circular curves");
    }
    Ok(circular.len())
}
