//! Ring assembly for boundary relations.
//!
//! A boundary relation is made of many ways, each one a slice of the border.
//! Ways are stitched end to end into closed rings, then inner rings are
//! attached to the outer ring that contains them.

use geo::{Contains, Coord, LineString, Point, Polygon};
use std::collections::VecDeque;
use tracing::debug;

/// Stitch coordinate chains into closed rings by shared endpoints.
///
/// A chain may be reversed to connect. Chains that cannot be closed by
/// stitching are closed by repeating their first vertex. Rings with fewer
/// than 4 coordinates after closing are dropped.
pub fn stitch_rings(chains: Vec<Vec<Coord<f64>>>) -> Vec<LineString<f64>> {
    let mut pending: VecDeque<Vec<Coord<f64>>> =
        chains.into_iter().filter(|c| c.len() >= 2).collect();
    let mut rings = Vec::new();

    while let Some(mut ring) = pending.pop_front() {
        while !is_closed(&ring) {
            let next = pending
                .iter()
                .enumerate()
                .find_map(|(idx, chain)| attachment(&ring, chain).map(|side| (idx, side)));
            let Some((idx, side)) = next else {
                break;
            };
            if let Some(chain) = pending.remove(idx) {
                attach(&mut ring, chain, side);
            }
        }

        if let Some(closed) = close_ring(ring) {
            rings.push(closed);
        }
    }

    rings
}

/// Where a chain joins the ring being built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attachment {
    /// chain start meets ring end
    Tail,
    /// chain end meets ring end
    TailReversed,
    /// chain end meets ring start
    Head,
    /// chain start meets ring start
    HeadReversed,
}

fn attachment(ring: &[Coord<f64>], chain: &[Coord<f64>]) -> Option<Attachment> {
    let (ring_start, ring_end) = (ring.first()?, ring.last()?);
    let (chain_start, chain_end) = (chain.first()?, chain.last()?);

    if ring_end == chain_start {
        Some(Attachment::Tail)
    } else if ring_end == chain_end {
        Some(Attachment::TailReversed)
    } else if ring_start == chain_end {
        Some(Attachment::Head)
    } else if ring_start == chain_start {
        Some(Attachment::HeadReversed)
    } else {
        None
    }
}

/// Join `chain` onto `ring`, keeping the shared vertex once.
fn attach(ring: &mut Vec<Coord<f64>>, mut chain: Vec<Coord<f64>>, side: Attachment) {
    match side {
        Attachment::Tail => ring.extend(chain.into_iter().skip(1)),
        Attachment::TailReversed => ring.extend(chain.into_iter().rev().skip(1)),
        Attachment::Head | Attachment::HeadReversed => {
            if side == Attachment::HeadReversed {
                chain.reverse();
            }
            chain.pop();
            chain.append(ring);
            *ring = chain;
        }
    }
}

fn close_ring(mut ring: Vec<Coord<f64>>) -> Option<LineString<f64>> {
    if ring.len() < 3 {
        return None;
    }
    if !is_closed(&ring) {
        ring.push(ring[0]);
    }
    (distinct_vertices(&ring) >= 3).then(|| LineString::new(ring))
}

fn is_closed(chain: &[Coord<f64>]) -> bool {
    chain.len() >= 4 && chain.first() == chain.last()
}

fn distinct_vertices(ring: &[Coord<f64>]) -> usize {
    let mut seen: Vec<Coord<f64>> = Vec::with_capacity(ring.len());
    for c in ring {
        if !seen.contains(c) {
            seen.push(*c);
        }
    }
    seen.len()
}

/// Build polygons from outer and inner rings. Each inner ring becomes a
/// hole of the first outer ring containing its first vertex.
pub fn assemble_polygons(
    outers: Vec<LineString<f64>>,
    inners: Vec<LineString<f64>>,
) -> Vec<Polygon<f64>> {
    let shells: Vec<Polygon<f64>> = outers
        .into_iter()
        .map(|ring| Polygon::new(ring, vec![]))
        .collect();
    let mut holes: Vec<Vec<LineString<f64>>> = vec![Vec::new(); shells.len()];

    for inner in inners {
        let Some(probe) = inner.0.first().map(|c| Point::from(*c)) else {
            continue;
        };

        match shells.iter().position(|shell| shell.contains(&probe)) {
            Some(idx) => holes[idx].push(inner),
            None => debug!("Dropping inner ring outside every outer ring"),
        }
    }

    shells
        .into_iter()
        .zip(holes)
        .map(|(shell, interiors)| {
            let (exterior, _) = shell.into_inner();
            Polygon::new(exterior, interiors)
        })
        .collect()
}
