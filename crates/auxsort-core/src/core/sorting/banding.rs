//! Tolerance bands: turning "equal within tolerance" into a strict total order.
//!
//! Pairwise "close enough" comparison is not transitive (`a ≈ b`, `b ≈ c`, `a ≉ c`),
//! which makes it unusable as a sort comparator. Instead, the values of one axis are
//! walked in ascending order and cut into bands: a band opens at its smallest value
//! and absorbs every value no more than the tolerance above it. Band ordinals are
//! integers, so comparing them is a total order by construction.
//!
//! Bands are refined hierarchically: axis `k + 1` is banded separately inside every
//! band of axis `k`, so a secondary coordinate is only ever compared with elements
//! that tied on every earlier axis. What is left tied after the last axis keeps its
//! original relative order.

use crate::engine::config::{AxisKey, AxisOrder};
use nalgebra::Point3;
use std::cmp::Ordering;

/// A set of element positions (indices into the caller's slice) that tie on every
/// axis processed so far.
pub(crate) type Group = Vec<usize>;

/// Computes the canonical order of `points` under `order`.
///
/// The result is a permutation: `result[k]` is the original position of the element
/// that belongs at position `k`.
pub fn band_order(points: &[Point3<f64>], order: &AxisOrder) -> Vec<usize> {
    let all: Group = (0..points.len()).collect();
    flatten(refine_groups(vec![all], points, order))
}

/// Splits every group into bands along each axis in turn.
pub(crate) fn refine_groups(
    mut groups: Vec<Group>,
    points: &[Point3<f64>],
    order: &AxisOrder,
) -> Vec<Group> {
    for key in order.keys() {
        let mut refined = Vec::with_capacity(groups.len());
        for group in groups {
            if group.len() < 2 {
                refined.push(group);
            } else {
                refined.extend(split_into_bands(group, points, key));
            }
        }
        groups = refined;
    }
    groups
}

/// Concatenates groups, ordering the members of each group by original position.
pub(crate) fn flatten(groups: Vec<Group>) -> Vec<usize> {
    groups
        .into_iter()
        .flat_map(|mut group| {
            group.sort_unstable();
            group
        })
        .collect()
}

/// Orders NaN after every other value, whatever its sign bit.
fn compare_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => a.total_cmp(&b),
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
    }
}

fn split_into_bands(mut group: Group, points: &[Point3<f64>], key: &AxisKey) -> Vec<Group> {
    let value = |i: usize| key.oriented_value(&points[i]);

    // Position as secondary key keeps the walk independent of the incoming order.
    group.sort_unstable_by(|&a, &b| compare_nan_last(value(a), value(b)).then(a.cmp(&b)));

    let mut bands: Vec<Group> = Vec::new();
    let mut anchor: Option<f64> = None;
    let mut in_nan_band = false;

    for i in group {
        let v = value(i);
        let opens_band = if v.is_nan() {
            let opens = !in_nan_band;
            in_nan_band = true;
            opens
        } else {
            match anchor {
                // `v == a` covers infinities, where the difference is NaN.
                Some(a) => !(v == a || v - a <= key.tolerance),
                None => true,
            }
        };

        if opens_band {
            if !v.is_nan() {
                anchor = Some(v);
            }
            bands.push(Vec::new());
        }
        if let Some(band) = bands.last_mut() {
            band.push(i);
        }
    }
    bands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::Axis;

    fn on_x(values: &[f64]) -> Vec<Point3<f64>> {
        values.iter().map(|&x| Point3::new(x, 0.0, 0.0)).collect()
    }

    fn x_order(tolerance: f64) -> AxisOrder {
        AxisOrder::new(vec![AxisKey::ascending(Axis::X, tolerance)]).unwrap()
    }

    #[test]
    fn orders_by_single_axis() {
        let points = on_x(&[10.0, 5.0, 7.0]);
        assert_eq!(band_order(&points, &x_order(0.001)), vec![1, 2, 0]);
    }

    #[test]
    fn empty_and_single_inputs() {
        assert!(band_order(&[], &x_order(0.1)).is_empty());
        assert_eq!(band_order(&on_x(&[3.0]), &x_order(0.1)), vec![0]);
    }

    #[test]
    fn values_within_tolerance_of_anchor_keep_original_order() {
        let points = on_x(&[5.0004, 5.0, 5.0009]);
        assert_eq!(band_order(&points, &x_order(0.001)), vec![0, 1, 2]);
    }

    #[test]
    fn bands_are_anchored_not_chained() {
        // 5.0 .. 5.0009 form one band; 5.0018 exceeds the anchor by more than the
        // tolerance and opens the next band even though it is close to 5.0009.
        let points = on_x(&[5.0018, 5.0009, 5.0]);
        let groups = refine_groups(vec![vec![0, 1, 2]], &points, &x_order(0.001));
        assert_eq!(groups, vec![vec![2, 1], vec![0]]);
        assert_eq!(band_order(&points, &x_order(0.001)), vec![1, 2, 0]);
    }

    #[test]
    fn secondary_axis_breaks_primary_ties() {
        let points = vec![Point3::new(5.0, 2.0, 0.0), Point3::new(5.0004, 1.0, 0.0)];
        let order = AxisOrder::new(vec![
            AxisKey::ascending(Axis::X, 0.001),
            AxisKey::ascending(Axis::Y, 0.001),
        ])
        .unwrap();
        assert_eq!(band_order(&points, &order), vec![1, 0]);
    }

    #[test]
    fn secondary_bands_are_computed_within_primary_bands() {
        // Element 1 sits in another x band; it must not bridge the y values of
        // elements 0 and 2 into a single band.
        let points = vec![
            Point3::new(0.0, 1.0016, 0.0),
            Point3::new(9.0, 1.0008, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let order = AxisOrder::new(vec![
            AxisKey::ascending(Axis::X, 0.001),
            AxisKey::ascending(Axis::Y, 0.001),
        ])
        .unwrap();
        assert_eq!(band_order(&points, &order), vec![2, 0, 1]);
    }

    #[test]
    fn descending_axis_reverses_band_order() {
        let points = on_x(&[1.0, 3.0, 2.0]);
        let order = AxisOrder::new(vec![AxisKey::descending(Axis::X, 0.0)]).unwrap();
        assert_eq!(band_order(&points, &order), vec![1, 2, 0]);
    }

    #[test]
    fn zero_tolerance_is_exact_comparison() {
        let points = on_x(&[1.0, 1.0 + f64::EPSILON, 1.0]);
        assert_eq!(band_order(&points, &x_order(0.0)), vec![0, 2, 1]);
    }

    #[test]
    fn nan_sorts_after_every_real_value_in_both_directions() {
        let points = on_x(&[f64::NAN, 2.0, -f64::NAN, f64::INFINITY, -1.0]);
        assert_eq!(band_order(&points, &x_order(0.1)), vec![4, 1, 3, 0, 2]);

        let descending = AxisOrder::new(vec![AxisKey::descending(Axis::X, 0.1)]).unwrap();
        assert_eq!(band_order(&points, &descending), vec![3, 1, 4, 0, 2]);
    }

    #[test]
    fn equal_infinities_share_a_band() {
        let points = vec![
            Point3::new(f64::INFINITY, 2.0, 0.0),
            Point3::new(f64::INFINITY, 1.0, 0.0),
        ];
        let order = AxisOrder::new(vec![
            AxisKey::ascending(Axis::X, 0.0),
            AxisKey::ascending(Axis::Y, 0.0),
        ])
        .unwrap();
        assert_eq!(band_order(&points, &order), vec![1, 0]);
    }

    #[test]
    fn nan_elements_are_ordered_by_later_axes() {
        let points = vec![
            Point3::new(f64::NAN, 3.0, 0.0),
            Point3::new(f64::NAN, 1.0, 0.0),
            Point3::new(0.0, 9.0, 0.0),
        ];
        let order = AxisOrder::new(vec![
            AxisKey::ascending(Axis::X, 0.0),
            AxisKey::ascending(Axis::Y, 0.0),
        ])
        .unwrap();
        assert_eq!(band_order(&points, &order), vec![2, 1, 0]);
    }
}
