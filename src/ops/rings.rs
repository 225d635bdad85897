use std::collections::VecDeque;

use crate::model::molecule::Molecule;

/// Ring membership of atoms and bonds, derived from graph connectivity alone.
///
/// A bond is a ring bond when its two ends stay connected after the bond is
/// removed. Ring sizes are the lengths of the shortest such cycles.
#[derive(Debug, Clone)]
pub struct RingInfo {
    adjacency: Vec<Vec<usize>>,
    ring_bonds: Vec<bool>,
    ring_atoms: Vec<bool>,
}

impl RingInfo {
    pub fn new(mol: &Molecule) -> Self {
        let adjacency = mol.adjacency();
        let mut ring_atoms = vec![false; mol.atom_count()];
        let ring_bonds: Vec<bool> = mol
            .bonds
            .iter()
            .map(|bond| {
                let in_ring = shortest_path(&adjacency, bond.i, bond.j, None, Some((bond.i, bond.j)))
                    .is_some();
                if in_ring {
                    ring_atoms[bond.i] = true;
                    ring_atoms[bond.j] = true;
                }
                in_ring
            })
            .collect();

        Self {
            adjacency,
            ring_bonds,
            ring_atoms,
        }
    }

    #[inline]
    pub fn atom_in_ring(&self, atom: usize) -> bool {
        self.ring_atoms.get(atom).copied().unwrap_or(false)
    }

    #[inline]
    pub fn bond_in_ring(&self, bond: usize) -> bool {
        self.ring_bonds.get(bond).copied().unwrap_or(false)
    }

    pub fn neighbors(&self, atom: usize) -> &[usize] {
        &self.adjacency[atom]
    }

    /// Size of the smallest ring containing the bond `a`-`b`.
    pub fn smallest_ring_with_bond(&self, a: usize, b: usize) -> Option<usize> {
        shortest_path(&self.adjacency, a, b, None, Some((a, b))).map(|d| d + 1)
    }

    /// Size of the smallest ring containing the path `i`-`j`-`k`.
    pub fn smallest_ring_with_angle(&self, i: usize, j: usize, k: usize) -> Option<usize> {
        if i == k {
            return None;
        }
        shortest_path(&self.adjacency, i, k, Some(j), None).map(|d| d + 2)
    }
}

/// Breadth-first distance from `from` to `to`, never visiting `blocked` and
/// never traversing the edge `skip` directly.
fn shortest_path(
    adjacency: &[Vec<usize>],
    from: usize,
    to: usize,
    blocked: Option<usize>,
    skip: Option<(usize, usize)>,
) -> Option<usize> {
    let is_skipped = |a: usize, b: usize| {
        skip.is_some_and(|(x, y)| (a == x && b == y) || (a == y && b == x))
    };

    let mut dist = vec![usize::MAX; adjacency.len()];
    let mut queue = VecDeque::new();
    dist[from] = 0;
    queue.push_back(from);

    while let Some(current) = queue.pop_front() {
        for &next in &adjacency[current] {
            if Some(next) == blocked || dist[next] != usize::MAX || is_skipped(current, next) {
                continue;
            }
            dist[next] = dist[current] + 1;
            if next == to {
                return Some(dist[next]);
            }
            queue.push_back(next);
        }
    }
    None
}
