use super::naming::{Subsystem, VolumeName};
use nalgebra::Point3;

/// Numbering extracted from a volume name: `(module number, strip number)`.
///
/// Modules carry a strip number of `0`, so a module and its first strip share the
/// same prefix. Ordering is lexicographic.
pub type NumberingKey = (u32, u32);

/// Common view of anything the standard sorters can reorder.
///
/// Both [`AuxDet`](super::aux_det::AuxDet) and
/// [`AuxDetSensitive`](super::sensitive::AuxDetSensitive) implement this trait, which
/// lets one generic ordering routine serve the module and the strip granularity.
pub trait Descriptor {
    /// The GDML volume name of the descriptor.
    fn name(&self) -> &str;

    /// The reference position used for spatial ordering.
    fn center(&self) -> &Point3<f64>;

    /// The sequential index assigned by the last sort, if any.
    fn index(&self) -> Option<usize>;

    /// Stores the sequential index reflecting the final position.
    fn set_index(&mut self, index: usize);

    /// Parses the volume name, returning `None` for names outside the CRT convention.
    fn volume_name(&self) -> Option<VolumeName> {
        self.name().parse().ok()
    }

    /// The numbering encoded in the volume name, if it follows the CRT convention.
    fn numbering_key(&self) -> Option<NumberingKey> {
        self.volume_name()
            .map(|v| (v.module_number, v.strip_number.unwrap_or(0)))
    }

    /// The CRT subsystem encoded in the volume name.
    fn subsystem(&self) -> Option<Subsystem> {
        self.volume_name().map(|v| v.subsystem)
    }

    /// Whether any coordinate of the reference position is NaN or infinite.
    fn has_non_finite_center(&self) -> bool {
        !self.center().coords.iter().all(|c| c.is_finite())
    }
}
