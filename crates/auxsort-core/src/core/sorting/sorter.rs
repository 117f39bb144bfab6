use super::banding::{self, Group};
use crate::core::models::aux_det::AuxDet;
use crate::core::models::descriptor::{Descriptor, NumberingKey};
use crate::core::models::naming::Subsystem;
use crate::core::models::sensitive::AuxDetSensitive;
use crate::engine::config::{AxisOrder, SortConfig, SortStrategy};
use nalgebra::Point3;
use tracing::trace;

/// Sorts CRT modules into the standard configuration and numbers them.
///
/// Modules are reordered in place following `config.module_order` (or the volume-name
/// numbering, see [`SortStrategy`]), then receive sequential indices starting at
/// `config.first_index`; the back-reference of every strip follows its module.
/// Collections with fewer than two modules are never reordered.
///
/// Returns `true` when the order of the modules changed.
pub fn sort_aux_dets_standard(aux_dets: &mut [AuxDet], config: &SortConfig) -> bool {
    sort_standard(
        aux_dets,
        &config.module_order,
        config.strategy,
        config.first_index,
    )
}

/// Sorts the strips of a single module into the standard configuration and numbers them.
///
/// Strip coordinates are module-local, so this must be called once per module, never
/// over strips of different modules. The strip ordering is picked from the subsystem
/// tag in the strip volume names, which falls back to `config.sensitive_order`. When the
/// names disagree the lowest subsystem wins, so the choice never depends on input order.
///
/// Returns `true` when the order of the strips changed.
pub fn sort_aux_det_sensitive_standard(
    sensitive: &mut [AuxDetSensitive],
    config: &SortConfig,
) -> bool {
    let subsystem = strip_subsystem(sensitive);
    sort_standard(
        sensitive,
        config.sensitive_order_for(subsystem),
        config.strategy,
        config.first_index,
    )
}

/// Sorts the strips owned by `module`, using the module's own subsystem to pick the
/// strip ordering, and links every strip to the module's index.
pub fn sort_module_sensitive(module: &mut AuxDet, config: &SortConfig) -> bool {
    let order = config.sensitive_order_for(
        module
            .subsystem()
            .or_else(|| strip_subsystem(module.sensitive())),
    );
    let changed = sort_standard(
        module.sensitive_mut(),
        order,
        config.strategy,
        config.first_index,
    );
    let parent = module.index;
    for strip in module.sensitive_mut() {
        strip.parent = parent;
    }
    changed
}

fn strip_subsystem(sensitive: &[AuxDetSensitive]) -> Option<Subsystem> {
    sensitive.iter().filter_map(|s| s.subsystem()).min()
}

fn sort_standard<T: Descriptor>(
    items: &mut [T],
    order: &AxisOrder,
    strategy: SortStrategy,
    first_index: usize,
) -> bool {
    let changed = if items.len() < 2 {
        false
    } else {
        let permutation = canonical_order(items, order, strategy);
        apply_permutation(items, &permutation)
    };

    for (offset, item) in items.iter_mut().enumerate() {
        // Saturates only for configs built by hand past `MAX_FIRST_INDEX`.
        item.set_index(first_index.saturating_add(offset));
    }

    trace!(
        count = items.len(),
        changed,
        %order,
        %strategy,
        "Sorted descriptors into standard order."
    );
    changed
}

/// Computes the permutation that puts `items` into canonical order.
///
/// `result[k]` is the current position of the element that belongs at position `k`.
pub fn canonical_order<T: Descriptor>(
    items: &[T],
    order: &AxisOrder,
    strategy: SortStrategy,
) -> Vec<usize> {
    let points: Vec<Point3<f64>> = items.iter().map(|item| *item.center()).collect();

    match strategy {
        SortStrategy::Spatial => banding::band_order(&points, order),
        SortStrategy::VolumeName => {
            let keys: Vec<Option<NumberingKey>> =
                items.iter().map(T::numbering_key).collect();
            let groups = numbering_groups(&keys);
            banding::flatten(banding::refine_groups(groups, &points, order))
        }
    }
}

/// Groups positions by volume-name numbering: one group per distinct key in ascending
/// key order, then one group holding every position without a key.
fn numbering_groups(keys: &[Option<NumberingKey>]) -> Vec<Group> {
    let mut numbered: Vec<(NumberingKey, usize)> = keys
        .iter()
        .enumerate()
        .filter_map(|(i, key)| key.map(|k| (k, i)))
        .collect();
    numbered.sort_unstable();

    let mut groups: Vec<Group> = Vec::new();
    let mut last_key: Option<NumberingKey> = None;
    for (key, i) in numbered {
        match groups.last_mut() {
            Some(group) if last_key == Some(key) => group.push(i),
            _ => groups.push(vec![i]),
        }
        last_key = Some(key);
    }

    let unnumbered: Group = keys
        .iter()
        .enumerate()
        .filter(|(_, key)| key.is_none())
        .map(|(i, _)| i)
        .collect();
    if !unnumbered.is_empty() {
        groups.push(unnumbered);
    }
    groups
}

/// Reorders `items` in place so that `items[k]` becomes the element previously at
/// `permutation[k]`, following each cycle with swaps.
fn apply_permutation<T>(items: &mut [T], permutation: &[usize]) -> bool {
    debug_assert_eq!(items.len(), permutation.len());

    let mut placed = vec![false; items.len()];
    let mut changed = false;

    for start in 0..items.len() {
        if placed[start] {
            continue;
        }
        placed[start] = true;
        let mut current = start;
        loop {
            let source = permutation[current];
            if source == start {
                break;
            }
            items.swap(current, source);
            placed[source] = true;
            changed = true;
            current = source;
        }
    }
    changed
}
