//! Planarity testing and combinatorial embedding.
//!
//! The graph is split into biconnected blocks (Tarjan, with an explicit DFS stack). Each block
//! is embedded with the path-addition algorithm of Demoucron, Malgrange and Pertuiset: start
//! from a cycle, then repeatedly route a path of some remaining fragment through a face that
//! contains all of the fragment's attachment vertices. A fragment without such a face proves the
//! block non-planar. Blocks are glued back together at cut vertices by concatenating their
//! rotation sectors, which keeps the result planar.

use crate::embedding::PlanarEmbedding;
use crate::error::{Error, Result};
use crate::graph::IndexedGraph;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy)]
struct DfsFrame {
    v: usize,
    parent_edge: Option<usize>,
    next_neighbor: usize,
}

/// Biconnected components as lists of edge indices, in discovery order.
pub fn biconnected_components(graph: &IndexedGraph) -> Vec<Vec<usize>> {
    let n = graph.vertex_count();
    let mut disc: Vec<Option<usize>> = vec![None; n];
    let mut low: Vec<usize> = vec![0; n];
    let mut time: usize = 0;
    let mut edge_stack: Vec<usize> = Vec::new();
    let mut blocks: Vec<Vec<usize>> = Vec::new();
    let mut stack: Vec<DfsFrame> = Vec::new();

    for root in 0..n {
        if disc[root].is_some() {
            continue;
        }
        disc[root] = Some(time);
        low[root] = time;
        time += 1;
        stack.push(DfsFrame {
            v: root,
            parent_edge: None,
            next_neighbor: 0,
        });

        while let Some(frame) = stack.last().copied() {
            let v = frame.v;
            let v_disc = disc[v].unwrap_or(0);
            if let Some(&(w, e)) = graph.incident(v).get(frame.next_neighbor) {
                if let Some(top) = stack.last_mut() {
                    top.next_neighbor += 1;
                }
                if Some(e) == frame.parent_edge {
                    continue;
                }
                match disc[w] {
                    None => {
                        edge_stack.push(e);
                        disc[w] = Some(time);
                        low[w] = time;
                        time += 1;
                        stack.push(DfsFrame {
                            v: w,
                            parent_edge: Some(e),
                            next_neighbor: 0,
                        });
                    }
                    Some(w_disc) if w_disc < v_disc => {
                        edge_stack.push(e);
                        low[v] = low[v].min(w_disc);
                    }
                    Some(_) => {}
                }
                continue;
            }

            stack.pop();
            let Some(parent) = stack.last() else {
                continue;
            };
            let p = parent.v;
            low[p] = low[p].min(low[v]);
            if low[v] >= disc[p].unwrap_or(0) {
                let mut block: Vec<usize> = Vec::new();
                while let Some(e) = edge_stack.pop() {
                    block.push(e);
                    if Some(e) == frame.parent_edge {
                        break;
                    }
                }
                block.reverse();
                blocks.push(block);
            }
        }
    }
    blocks
}

/// Computes a planar rotation system, or fails with [`Error::NotPlanar`].
pub fn embed(graph: &IndexedGraph) -> Result<PlanarEmbedding> {
    let mut rotation: Vec<Vec<usize>> = vec![Vec::new(); graph.vertex_count()];
    for block in biconnected_components(graph) {
        let local = if block.len() == 1 {
            let (v, w) = graph.edge(block[0]);
            vec![(v, vec![w]), (w, vec![v])]
        } else {
            embed_block(graph, &block)?
        };
        for (v, rot) in local {
            rotation[v].extend(rot);
        }
    }
    Ok(PlanarEmbedding::from_rotation(rotation))
}

#[derive(Debug, Clone)]
enum FragmentKind {
    /// An unembedded edge between two embedded vertices.
    Chord(usize, usize),
    /// A connected set of unembedded vertices.
    Component(Vec<usize>),
}

#[derive(Debug, Clone)]
struct Fragment {
    kind: FragmentKind,
    contacts: Vec<usize>,
}

struct BlockState<'a> {
    adj: FxHashMap<usize, Vec<usize>>,
    edges: &'a [(usize, usize)],
    in_h: FxHashSet<usize>,
    h_edges: FxHashSet<(usize, usize)>,
    /// Faces as cyclic vertex sequences, each traversed with the face on the right.
    faces: Vec<Vec<usize>>,
}

fn edge_key(v: usize, w: usize) -> (usize, usize) {
    (v.min(w), v.max(w))
}

impl BlockState<'_> {
    fn fragments(&self) -> Vec<Fragment> {
        let mut out: Vec<Fragment> = Vec::new();
        for &(v, w) in self.edges {
            if self.in_h.contains(&v)
                && self.in_h.contains(&w)
                && !self.h_edges.contains(&edge_key(v, w))
            {
                let mut contacts = vec![v, w];
                contacts.sort_unstable();
                out.push(Fragment {
                    kind: FragmentKind::Chord(v, w),
                    contacts,
                });
            }
        }

        let mut seen: FxHashSet<usize> = FxHashSet::default();
        let mut vertices: Vec<usize> = self.adj.keys().copied().collect();
        vertices.sort_unstable();
        for start in vertices {
            if self.in_h.contains(&start) || !seen.insert(start) {
                continue;
            }
            let mut component: Vec<usize> = vec![start];
            let mut contacts: Vec<usize> = Vec::new();
            let mut queue: VecDeque<usize> = VecDeque::from([start]);
            while let Some(u) = queue.pop_front() {
                for &w in &self.adj[&u] {
                    if self.in_h.contains(&w) {
                        if !contacts.contains(&w) {
                            contacts.push(w);
                        }
                    } else if seen.insert(w) {
                        component.push(w);
                        queue.push_back(w);
                    }
                }
            }
            contacts.sort_unstable();
            out.push(Fragment {
                kind: FragmentKind::Component(component),
                contacts,
            });
        }
        out
    }

    fn admissible_faces(&self, fragment: &Fragment) -> Vec<usize> {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, face)| fragment.contacts.iter().all(|c| face.contains(c)))
            .map(|(f, _)| f)
            .collect()
    }

    /// A path through `fragment` joining two distinct contact vertices.
    fn fragment_path(&self, fragment: &Fragment) -> Option<Vec<usize>> {
        let members: FxHashSet<usize> = match &fragment.kind {
            FragmentKind::Chord(v, w) => return Some(vec![*v, *w]),
            FragmentKind::Component(vs) => vs.iter().copied().collect(),
        };
        let start = *fragment.contacts.first()?;
        let mut prev: FxHashMap<usize, usize> = FxHashMap::default();
        let mut queue: VecDeque<usize> = VecDeque::new();
        for &w in &self.adj[&start] {
            if members.contains(&w) && !prev.contains_key(&w) {
                prev.insert(w, start);
                queue.push_back(w);
            }
        }
        while let Some(u) = queue.pop_front() {
            for &w in &self.adj[&u] {
                if self.in_h.contains(&w) && w != start {
                    let mut path: Vec<usize> = vec![w, u];
                    let mut cur = u;
                    while let Some(&p) = prev.get(&cur) {
                        path.push(p);
                        if p == start {
                            break;
                        }
                        cur = p;
                    }
                    path.reverse();
                    return Some(path);
                }
                if members.contains(&w) && !prev.contains_key(&w) {
                    prev.insert(w, u);
                    queue.push_back(w);
                }
            }
        }
        None
    }

    /// Splits face `f` along `path`, whose end vertices both lie on `f`.
    fn embed_path(&mut self, f: usize, path: &[usize]) -> Result<()> {
        let face = self.faces[f].clone();
        let (Some(&x), Some(&y)) = (path.first(), path.last()) else {
            return Err(Error::invariant("planarity", "empty fragment path"));
        };
        let (Some(i), Some(j)) = (
            face.iter().position(|&v| v == x),
            face.iter().position(|&v| v == y),
        ) else {
            return Err(Error::invariant(
                "planarity",
                "fragment path does not end on the chosen face",
            ));
        };
        let n = face.len();
        let interior = &path[1..path.len() - 1];

        let mut first: Vec<usize> = Vec::new();
        let mut k = i;
        loop {
            first.push(face[k]);
            if k == j {
                break;
            }
            k = (k + 1) % n;
        }
        first.extend(interior.iter().rev());

        let mut second: Vec<usize> = Vec::new();
        let mut k = j;
        loop {
            second.push(face[k]);
            if k == i {
                break;
            }
            k = (k + 1) % n;
        }
        second.extend(interior.iter());

        self.faces[f] = first;
        self.faces.push(second);
        for pair in path.windows(2) {
            self.h_edges.insert(edge_key(pair[0], pair[1]));
        }
        self.in_h.extend(path.iter().copied());
        Ok(())
    }
}

/// Shortest path from `from` to `to` inside the block that avoids the direct edge between them.
fn cycle_through(adj: &FxHashMap<usize, Vec<usize>>, from: usize, to: usize) -> Option<Vec<usize>> {
    let mut prev: FxHashMap<usize, usize> = FxHashMap::default();
    let mut queue: VecDeque<usize> = VecDeque::from([from]);
    prev.insert(from, from);
    while let Some(u) = queue.pop_front() {
        for &w in &adj[&u] {
            if u == from && w == to {
                continue;
            }
            if prev.contains_key(&w) {
                continue;
            }
            prev.insert(w, u);
            if w == to {
                let mut path: Vec<usize> = vec![to];
                let mut cur = to;
                while cur != from {
                    cur = prev[&cur];
                    path.push(cur);
                }
                path.reverse();
                return Some(path);
            }
            queue.push_back(w);
        }
    }
    None
}

fn embed_block(graph: &IndexedGraph, block: &[usize]) -> Result<Vec<(usize, Vec<usize>)>> {
    let edges: Vec<(usize, usize)> = block.iter().map(|&e| graph.edge(e)).collect();
    let mut adj: FxHashMap<usize, Vec<usize>> = FxHashMap::default();
    let mut order: Vec<usize> = Vec::new();
    for &(v, w) in &edges {
        for (a, b) in [(v, w), (w, v)] {
            adj.entry(a)
                .or_insert_with(|| {
                    order.push(a);
                    Vec::new()
                })
                .push(b);
        }
    }

    let (a, b) = edges[0];
    let Some(cycle) = cycle_through(&adj, b, a) else {
        return Err(Error::invariant("planarity", "block without a cycle"));
    };
    // `cycle` runs b -> ... -> a; close it with the edge a-b.
    let mut state = BlockState {
        adj,
        edges: &edges,
        in_h: cycle.iter().copied().collect(),
        h_edges: FxHashSet::default(),
        faces: Vec::new(),
    };
    for pair in cycle.windows(2) {
        state.h_edges.insert(edge_key(pair[0], pair[1]));
    }
    state.h_edges.insert(edge_key(a, b));
    let reversed: Vec<usize> = cycle.iter().rev().copied().collect();
    state.faces.push(cycle);
    state.faces.push(reversed);

    while state.h_edges.len() < edges.len() {
        let fragments = state.fragments();
        let mut choice: Option<(usize, usize)> = None;
        for (fr_ix, fragment) in fragments.iter().enumerate() {
            let faces = state.admissible_faces(fragment);
            match faces.as_slice() {
                [] => return Err(Error::NotPlanar),
                [only] => {
                    choice = Some((fr_ix, *only));
                    break;
                }
                [first, ..] => {
                    if choice.is_none() {
                        choice = Some((fr_ix, *first));
                    }
                }
            }
        }
        let Some((fr_ix, f)) = choice else {
            return Err(Error::invariant("planarity", "no fragment left to embed"));
        };
        let Some(path) = state.fragment_path(&fragments[fr_ix]) else {
            return Err(Error::invariant("planarity", "fragment has a single contact"));
        };
        state.embed_path(f, &path)?;
    }

    // Consecutive vertices x, y, z on a face mean z follows x counter-clockwise around y.
    let mut succ: FxHashMap<(usize, usize), usize> = FxHashMap::default();
    for face in &state.faces {
        let n = face.len();
        for k in 0..n {
            let x = face[(k + n - 1) % n];
            let y = face[k];
            let z = face[(k + 1) % n];
            succ.insert((y, x), z);
        }
    }

    let mut local: Vec<(usize, Vec<usize>)> = Vec::with_capacity(order.len());
    for v in order {
        let nbrs = &state.adj[&v];
        let first = nbrs[0];
        let mut rot: Vec<usize> = vec![first];
        let mut cur = first;
        while let Some(&next) = succ.get(&(v, cur)) {
            if next == first || rot.len() > nbrs.len() {
                break;
            }
            rot.push(next);
            cur = next;
        }
        if rot.len() != nbrs.len() {
            return Err(Error::invariant(
                "planarity",
                "face cycles do not induce a rotation",
            ));
        }
        local.push((v, rot));
    }
    Ok(local)
}
