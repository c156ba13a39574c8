//! Partitions file records into duplicate groups.
//!
//! Exact-key grouping buckets records by file name or checksum. Similarity
//! grouping links every pair of hashes closer than the threshold and takes
//! connected components, so if A matches B and B matches C then {A, B, C}
//! is one group even when A does not match C.

use super::traits::ComparisonStrategy;
use super::DuplicateGroup;
use crate::core::hasher::hamming;
use crate::core::record::FileRecord;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::hash::Hash;

/// Groups records whose key is exactly equal
pub struct KeyGrouper;

impl KeyGrouper {
    /// Buckets of two or more records sharing `key`, in first-seen key order.
    ///
    /// Members keep scan order, so the first file seen becomes the master.
    pub fn group<K, F>(records: &[FileRecord], key: F) -> Vec<DuplicateGroup>
    where
        K: Eq + Hash,
        F: Fn(&FileRecord) -> K,
    {
        let mut slots: HashMap<K, usize> = HashMap::new();
        let mut buckets: Vec<Vec<FileRecord>> = Vec::new();

        for record in records {
            let slot = *slots.entry(key(record)).or_insert_with(|| {
                buckets.push(Vec::new());
                buckets.len() - 1
            });
            buckets[slot].push(record.clone());
        }

        buckets
            .into_iter()
            .filter(|bucket| bucket.len() > 1)
            .map(DuplicateGroup::new)
            .collect()
    }
}

/// Undirected graph over the records that have a perceptual hash
pub struct SimilarityGraph {
    /// Record index of each vertex, ascending
    vertices: Vec<usize>,
    /// Neighbour vertex ids per vertex
    adjacency: Vec<Vec<usize>>,
}

impl SimilarityGraph {
    /// Test every unordered pair of hashed records and link the similar ones.
    pub fn build(records: &[FileRecord], strategy: &dyn ComparisonStrategy) -> Self {
        let hashed: Vec<(usize, u64)> = records
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.perceptual_hash.map(|h| (i, h)))
            .collect();

        let mut adjacency = vec![Vec::new(); hashed.len()];
        for a in 0..hashed.len() {
            for b in (a + 1)..hashed.len() {
                if strategy.is_similar(hamming(hashed[a].1, hashed[b].1)) {
                    adjacency[a].push(b);
                    adjacency[b].push(a);
                }
            }
        }

        Self {
            vertices: hashed.into_iter().map(|(i, _)| i).collect(),
            adjacency,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Connected components with at least two vertices, as record indices.
    ///
    /// Iterative depth-first search; components come out in order of their
    /// first record and each one is sorted by record index.
    pub fn components(&self) -> Vec<Vec<usize>> {
        let mut visited = vec![false; self.vertices.len()];
        let mut components = Vec::new();
        let mut stack = Vec::new();

        for start in 0..self.vertices.len() {
            if visited[start] {
                continue;
            }
            visited[start] = true;
            stack.push(start);

            let mut component = Vec::new();
            while let Some(vertex) = stack.pop() {
                component.push(self.vertices[vertex]);
                for &next in &self.adjacency[vertex] {
                    if !visited[next] {
                        visited[next] = true;
                        stack.push(next);
                    }
                }
            }

            if component.len() > 1 {
                component.sort_unstable();
                components.push(component);
            }
        }

        components
    }
}

/// Groups visually similar images transitively
pub struct TransitiveGrouper<S: ComparisonStrategy> {
    strategy: S,
}

impl<S: ComparisonStrategy> TransitiveGrouper<S> {
    pub fn new(strategy: S) -> Self {
        Self { strategy }
    }

    /// Similarity groups, each ordered by pixel area descending (ties keep
    /// scan order), so the largest copy is the master.
    pub fn group(&self, records: &[FileRecord]) -> Vec<DuplicateGroup> {
        let graph = SimilarityGraph::build(records, &self.strategy);

        graph
            .components()
            .into_iter()
            .map(|component| {
                let mut members: Vec<FileRecord> =
                    component.into_iter().map(|i| records[i].clone()).collect();
                members.sort_by_key(|r| Reverse(r.area()));
                DuplicateGroup::new(members)
            })
            .collect()
    }
}
