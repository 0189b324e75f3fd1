//! Sort + aggregate + delta transform.
//!
//! Raw neighbor arrays arrive unsorted and may contain duplicates
//! (parallel edges). Before packing, targets are sorted ascending,
//! duplicate runs are collapsed per the aggregation policy (carrying any
//! parallel property arrays along through the same permutation), and each
//! id is replaced by its difference to the previous one. The first id
//! stays absolute, so decompression is a plain running prefix sum.

use crate::compress::Aggregation;

/// Reusable scratch buffers for the transform with properties.
///
/// One context per worker; the indirect sort order and the copies it
/// permutes through are reused across nodes to keep the hot loop
/// allocation-free after warm-up.
#[derive(Debug, Default)]
pub struct DeltaContext {
    order: Vec<u32>,
    targets: Vec<u64>,
    properties: Vec<Vec<u64>>,
}

impl DeltaContext {
    fn prepare(&mut self, targets: &[u64], properties: &[Vec<u64>]) {
        let len = targets.len();
        self.order.clear();
        self.order.extend(0..len as u32);
        self.order.sort_unstable_by_key(|&i| targets[i as usize]);

        self.targets.clear();
        self.targets.extend_from_slice(targets);

        self.properties.resize_with(properties.len(), Vec::new);
        for (copy, original) in self.properties.iter_mut().zip(properties) {
            copy.clear();
            copy.extend_from_slice(original);
        }
    }
}

/// Delta encodes a sorted, property-less run in place, collapsing
/// duplicates unless the aggregation is [`Aggregation::None`]. Returns the
/// remaining length; `values` is truncated to it.
pub fn delta_encode_sorted(values: &mut Vec<u64>, aggregation: Aggregation) -> usize {
    if values.is_empty() {
        return 0;
    }
    debug_assert!(
        values.windows(2).all(|w| w[0] <= w[1]),
        "delta encoding requires sorted input"
    );

    let mut last = values[0];
    let mut out = 1usize;
    for i in 1..values.len() {
        let value = values[i];
        let delta = value.wrapping_sub(last);
        if delta == 0 && aggregation != Aggregation::None {
            continue;
        }
        values[out] = delta;
        last = value;
        out += 1;
    }
    values.truncate(out);
    out
}

/// Sorts targets ascending and permutes every property array the same way,
/// without aggregating or delta encoding. Used when SORT is requested
/// without DELTA.
pub fn sort_with_properties(
    targets: &mut [u64],
    properties: &mut [Vec<u64>],
    ctx: &mut DeltaContext,
) {
    ctx.prepare(targets, properties);
    for (out, &i) in ctx.order.iter().enumerate() {
        targets[out] = ctx.targets[i as usize];
        for (property, copy) in properties.iter_mut().zip(&ctx.properties) {
            property[out] = copy[i as usize];
        }
    }
}

/// The full transform for lists with properties: indirect sort, duplicate
/// aggregation per property, delta encoding. Targets and every property
/// array are rewritten and truncated to the returned length.
///
/// With `no_aggregation` (every policy is [`Aggregation::None`]) duplicate
/// targets survive as distinct zero-delta entries.
pub fn apply_delta_encoding(
    targets: &mut Vec<u64>,
    properties: &mut [Vec<u64>],
    aggregations: &[Aggregation],
    no_aggregation: bool,
    ctx: &mut DeltaContext,
) -> usize {
    let len = targets.len();
    if len == 0 {
        return 0;
    }
    debug_assert_eq!(properties.len(), aggregations.len());
    debug_assert!(properties.iter().all(|p| p.len() == len));

    ctx.prepare(targets, properties);

    let mut out = 0usize;
    let mut last = 0u64;
    for &i in &ctx.order {
        let target = ctx.targets[i as usize];
        if out > 0 && target == last && !no_aggregation {
            for ((property, copy), aggregation) in
                properties.iter_mut().zip(&ctx.properties).zip(aggregations)
            {
                let merged = aggregation.merge(property[out - 1], copy[i as usize]);
                property[out - 1] = merged;
            }
        } else {
            targets[out] = target.wrapping_sub(last);
            for ((property, copy), aggregation) in
                properties.iter_mut().zip(&ctx.properties).zip(aggregations)
            {
                property[out] = aggregation.normalize(copy[i as usize]);
            }
            last = target;
            out += 1;
        }
    }

    targets.truncate(out);
    for property in properties.iter_mut() {
        property.truncate(out);
    }
    out
}
