//! Parallel construction of packed adjacency lists.
//!
//! A [`ListBuilder`] owns the shared page arena and collects per-node
//! results; each worker drives its own [`NodeCompressor`], which keeps
//! every hot-path buffer (transform scratch, pack scratch, the current
//! page) private. The shared mutex is touched once per worker at flush
//! time and once per page rollover, never per node.

use std::sync::Arc;

use parking_lot::Mutex;
use rayon::prelude::*;
use tracing::debug;

use sympiezo_common::{Address, Error, LocalAllocator, NodeId, PageArena, Result};

use crate::compress::delta::{
    apply_delta_encoding, delta_encode_sorted, sort_with_properties, DeltaContext,
};
use crate::compress::packer::{pack, PackScratch};
use crate::compress::{Aggregation, TailStrategy};
use crate::pack::BLOCK_SIZE;
use crate::list::adjacency::{MemoryInfo, PackedAdjacencyList};
use crate::list::compressed::Compressed;
use crate::list::ListConfig;

/// One node's raw input to [`build_adjacency_list`]: its outgoing targets
/// and zero or more parallel property arrays, one value per target.
#[derive(Debug, Clone, Default)]
pub struct NodeAdjacency {
    pub node: NodeId,
    pub targets: Vec<u64>,
    pub properties: Vec<Vec<u64>>,
}

impl NodeAdjacency {
    #[must_use]
    pub fn new(node: NodeId, targets: Vec<u64>) -> Self {
        Self {
            node,
            targets,
            properties: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_properties(mut self, properties: Vec<Vec<u64>>) -> Self {
        self.properties = properties;
        self
    }
}

/// Accumulates compressed per-node lists from any number of workers.
#[derive(Debug)]
pub struct ListBuilder {
    config: ListConfig,
    arena: Arc<PageArena>,
    results: Mutex<Vec<(NodeId, Compressed)>>,
}

impl ListBuilder {
    #[must_use]
    pub fn new(config: ListConfig) -> Self {
        Self {
            config,
            arena: Arc::new(PageArena::new()),
            results: Mutex::new(Vec::new()),
        }
    }

    /// Creates a worker-local compressor. Results flush to the builder
    /// when the compressor is dropped.
    #[must_use]
    pub fn compressor(&self) -> NodeCompressor<'_> {
        NodeCompressor {
            builder: self,
            alloc: LocalAllocator::new(Arc::clone(&self.arena)),
            scratch: PackScratch::default(),
            ctx: DeltaContext::default(),
            no_aggregation: self
                .config
                .aggregations
                .iter()
                .all(|&a| a == Aggregation::None),
            results: Vec::new(),
        }
    }

    /// Finalizes the list over `node_count` node slots.
    ///
    /// # Errors
    ///
    /// [`Error::AllocatorInUse`] if a compressor is still alive.
    pub fn finish(self, node_count: usize) -> Result<PackedAdjacencyList> {
        let results = self.results.into_inner();
        let arena = Arc::try_unwrap(self.arena).map_err(|_| Error::AllocatorInUse)?;
        let addresses = arena.into_addresses()?;

        let mut nodes: Vec<Option<Compressed>> = Vec::with_capacity(node_count);
        nodes.resize_with(node_count, || None);
        let mut used_bytes = 0usize;
        let mut header_bytes = 0usize;
        let mut property_bytes = 0usize;
        let mut edges = 0u64;
        for (node, compressed) in results {
            let degree = compressed.degree() as usize;
            used_bytes += compressed.slice().len as usize;
            header_bytes += match self.config.strategy {
                TailStrategy::BlockAligned => degree.div_ceil(BLOCK_SIZE),
                TailStrategy::VarLongTail => degree / BLOCK_SIZE,
                TailStrategy::InlinedHead => (degree - 1).div_ceil(BLOCK_SIZE),
            };
            if let Some(properties) = compressed.properties() {
                property_bytes += properties.len() * degree * 8;
            }
            edges += u64::from(compressed.degree());
            let slot = &mut nodes[node as usize];
            debug_assert!(slot.is_none(), "node {node} compressed twice");
            *slot = Some(compressed);
        }

        let memory = MemoryInfo {
            pages: addresses.len(),
            allocated_bytes: addresses.iter().map(Address::size).sum(),
            used_bytes,
            header_bytes,
            property_bytes,
        };
        debug!(
            nodes = node_count,
            edges,
            pages = memory.pages,
            allocated_bytes = memory.allocated_bytes,
            used_bytes = memory.used_bytes,
            "adjacency list finalized"
        );
        Ok(PackedAdjacencyList::new(
            self.config,
            addresses,
            nodes.into_boxed_slice(),
            memory,
        ))
    }
}

/// Worker-local compression pipeline: transform, pack, record.
#[derive(Debug)]
pub struct NodeCompressor<'a> {
    builder: &'a ListBuilder,
    alloc: LocalAllocator,
    scratch: PackScratch,
    ctx: DeltaContext,
    no_aggregation: bool,
    results: Vec<(NodeId, Compressed)>,
}

impl NodeCompressor<'_> {
    /// Compresses one node's list, consuming the buffers in place, and
    /// returns the final degree after any aggregation.
    ///
    /// Zero-target nodes are not recorded; they decode as empty via the
    /// list's empty cursor.
    pub fn compress(
        &mut self,
        node: NodeId,
        targets: &mut Vec<u64>,
        properties: &mut [Vec<u64>],
    ) -> usize {
        if targets.is_empty() {
            return 0;
        }
        let flags = self.builder.config.flags;

        if properties.is_empty() {
            if flags.sort() {
                targets.sort_unstable();
            }
            if flags.delta() {
                delta_encode_sorted(targets, flags.aggregation());
            }
        } else {
            debug_assert_eq!(
                properties.len(),
                self.builder.config.aggregations.len(),
                "one aggregation policy per property"
            );
            if flags.delta() {
                apply_delta_encoding(
                    targets,
                    properties,
                    &self.builder.config.aggregations,
                    self.no_aggregation,
                    &mut self.ctx,
                );
            } else if flags.sort() {
                sort_with_properties(targets, properties, &mut self.ctx);
            }
        }

        let degree = targets.len();
        let slice = pack(
            self.builder.config.strategy,
            targets,
            &mut self.alloc,
            &mut self.scratch,
        );
        let mut compressed = Compressed::new(slice, degree as u32);
        if !properties.is_empty() {
            let stored: Box<[Box<[u64]>]> = properties
                .iter_mut()
                .map(|p| std::mem::take(p).into_boxed_slice())
                .collect();
            compressed.set_properties(stored);
        }
        self.results.push((node, compressed));
        degree
    }
}

impl Drop for NodeCompressor<'_> {
    fn drop(&mut self) {
        // the current page goes back via the allocator's own drop
        self.builder.results.lock().append(&mut self.results);
    }
}

/// Compresses a whole graph's adjacency data in parallel and finalizes
/// the list, with one compressor per worker chunk.
///
/// # Errors
///
/// Propagates finalization errors; with all compressors scoped inside
/// the parallel loop these do not occur.
pub fn build_adjacency_list(
    config: ListConfig,
    node_count: usize,
    mut input: Vec<NodeAdjacency>,
) -> Result<PackedAdjacencyList> {
    let builder = ListBuilder::new(config);
    if !input.is_empty() {
        let chunk = input
            .len()
            .div_ceil(rayon::current_num_threads().max(1))
            .max(1);
        input.par_chunks_mut(chunk).for_each(|entries| {
            let mut compressor = builder.compressor();
            for entry in entries {
                compressor.compress(entry.node, &mut entry.targets, &mut entry.properties);
            }
        });
    }
    builder.finish(node_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::{CompressFlags, TailStrategy};
    use crate::list::cursor::AdjacencyCursor;
    use crate::list::property::PropertyCursor;

    const STRATEGIES: [TailStrategy; 3] = [
        TailStrategy::BlockAligned,
        TailStrategy::VarLongTail,
        TailStrategy::InlinedHead,
    ];

    fn sorted_config(strategy: TailStrategy) -> ListConfig {
        ListConfig::sorted(strategy)
    }

    fn collect(list: &PackedAdjacencyList, node: NodeId) -> Vec<u64> {
        let mut cursor = list.cursor(node).unwrap();
        let mut out = Vec::new();
        while let Some(value) = cursor.next() {
            out.push(value);
        }
        out
    }

    #[test]
    fn test_build_and_decode_all_strategies() {
        for strategy in STRATEGIES {
            let input = vec![
                NodeAdjacency::new(0, vec![9, 1, 5]),
                NodeAdjacency::new(2, (0..130u64).rev().collect()),
            ];
            let list = build_adjacency_list(sorted_config(strategy), 3, input).unwrap();

            assert_eq!(collect(&list, 0), [1, 5, 9], "{strategy:?}");
            assert_eq!(list.degree(2), 130);
            let expected: Vec<u64> = (0..130u64).collect();
            assert_eq!(collect(&list, 2), expected, "{strategy:?}");
        }
    }

    #[test]
    fn test_zero_degree_node_gets_empty_cursor() {
        let input = vec![
            NodeAdjacency::new(0, vec![4]),
            NodeAdjacency::new(1, vec![]),
        ];
        let list =
            build_adjacency_list(sorted_config(TailStrategy::default()), 4, input).unwrap();

        for node in [1u64, 3] {
            assert_eq!(list.degree(node), 0);
            let mut cursor = list.cursor(node).unwrap();
            assert!(!cursor.has_next());
            assert_eq!(cursor.next(), None);
        }
        // out of range reads the same as never compressed
        assert_eq!(list.degree(99), 0);
    }

    #[test]
    fn test_pass_flags_preserve_input_order() {
        let config = ListConfig {
            strategy: TailStrategy::BlockAligned,
            flags: CompressFlags::PASS,
            aggregations: Box::new([]),
        };
        let input = vec![NodeAdjacency::new(0, vec![9, 1, 5, 5, 3])];
        let list = build_adjacency_list(config, 1, input).unwrap();

        assert_eq!(collect(&list, 0), [9, 1, 5, 5, 3]);
    }

    #[test]
    fn test_property_aggregation_sums_parallel_edges() {
        let config =
            ListConfig::aggregating(TailStrategy::InlinedHead, Box::new([Aggregation::Sum]));
        let weights = vec![50.0, 10.0, 30.0, 31.0, 90.0]
            .into_iter()
            .map(f64::to_bits)
            .collect();
        let input = vec![
            NodeAdjacency::new(7, vec![5, 1, 3, 3, 9]).with_properties(vec![weights]),
        ];
        let list = build_adjacency_list(config, 8, input).unwrap();

        assert_eq!(list.degree(7), 4);
        assert_eq!(collect(&list, 7), [1, 3, 5, 9]);

        let mut weights = list.property_cursor(7, 0, 0);
        let decoded: Vec<f64> = std::iter::from_fn(|| weights.next())
            .map(f64::from_bits)
            .collect();
        assert_eq!(decoded, [10.0, 61.0, 50.0, 90.0]);
    }

    #[test]
    fn test_property_cursor_fallback_for_missing_values() {
        let input = vec![NodeAdjacency::new(0, vec![2, 4])];
        let list =
            build_adjacency_list(sorted_config(TailStrategy::default()), 1, input).unwrap();

        let fallback = 1.5f64.to_bits();
        let mut cursor = list.property_cursor(0, 0, fallback);
        assert_eq!(cursor.next(), Some(fallback));
        assert_eq!(cursor.next(), Some(fallback));
        assert_eq!(cursor.next(), None);
    }

    #[test]
    fn test_parallel_build() {
        let node_count = 500usize;
        let input: Vec<NodeAdjacency> = (0..node_count as u64)
            .map(|node| {
                let targets: Vec<u64> = (0..node % 97).map(|i| i * 3 + node).rev().collect();
                NodeAdjacency::new(node, targets)
            })
            .collect();
        let list = build_adjacency_list(
            sorted_config(TailStrategy::BlockAligned),
            node_count,
            input,
        )
        .unwrap();

        for node in 0..node_count as u64 {
            let expected: Vec<u64> = (0..node % 97).map(|i| i * 3 + node).collect();
            assert_eq!(list.degree(node), expected.len());
            assert_eq!(collect(&list, node), expected, "node {node}");
        }
    }

    #[test]
    fn test_compressor_flushes_on_drop() {
        let builder = ListBuilder::new(sorted_config(TailStrategy::default()));
        {
            let mut compressor = builder.compressor();
            assert_eq!(compressor.compress(0, &mut vec![3, 1], &mut []), 2);
            assert!(builder.results.lock().is_empty());
        }
        assert_eq!(builder.results.lock().len(), 1);

        let list = builder.finish(1).unwrap();
        assert_eq!(collect(&list, 0), [1, 3]);
    }

    #[test]
    fn test_release_frees_exactly_once() {
        let input = vec![NodeAdjacency::new(0, vec![1, 2, 3])];
        let mut list =
            build_adjacency_list(sorted_config(TailStrategy::default()), 1, input).unwrap();

        let freed = list.release().unwrap();
        assert!(freed > 0);
        assert!(matches!(list.release(), Err(Error::DoubleFree { .. })));
        assert!(matches!(list.cursor(0), Err(Error::UseAfterFree { .. })));
    }

    #[test]
    fn test_memory_info_accounts_for_regions() {
        let input = vec![
            NodeAdjacency::new(0, vec![1, 2, 3]),
            NodeAdjacency::new(1, (0..200u64).collect()),
        ];
        let list =
            build_adjacency_list(sorted_config(TailStrategy::default()), 2, input).unwrap();

        let info = list.memory_info();
        assert!(info.pages >= 1);
        assert!(info.used_bytes > 0);
        assert!(info.allocated_bytes >= info.used_bytes);
        assert_eq!(info.used_bytes % 8, 0);
        // one width byte for the 3-value list, four for the 200-value one
        assert_eq!(info.header_bytes, 1 + 4);
        assert_eq!(info.property_bytes, 0);
    }

    #[test]
    fn test_rescan_reuses_a_cursor() {
        let input = vec![
            NodeAdjacency::new(0, vec![2, 4, 6]),
            NodeAdjacency::new(1, vec![10, 20]),
        ];
        let list =
            build_adjacency_list(sorted_config(TailStrategy::default()), 2, input).unwrap();

        let mut cursor = list.cursor(0).unwrap();
        assert_eq!(cursor.next(), Some(2));

        list.rescan(&mut cursor, 1).unwrap();
        assert_eq!(cursor.size(), 2);
        assert_eq!(cursor.next(), Some(10));
        assert_eq!(cursor.next(), Some(20));
        assert_eq!(cursor.next(), None);
    }
}
