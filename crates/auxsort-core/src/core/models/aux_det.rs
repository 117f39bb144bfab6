use super::descriptor::Descriptor;
use super::sensitive::AuxDetSensitive;
use nalgebra::Point3;

/// One auxiliary detector (CRT) module.
///
/// A module has a single reference position in the world frame and owns its
/// sensitive strips. Modules are built by a geometry loader and only reordered
/// and numbered by the sorters.
#[derive(Debug, Clone, PartialEq)]
pub struct AuxDet {
    /// The GDML volume name (e.g. `volAuxDet_MINOS_module_017_WestNorth`).
    pub name: String,
    /// Center of the module in the world frame, in cm.
    pub center: Point3<f64>,
    /// Sequential module number, assigned by sorting.
    pub index: Option<usize>,
    /// Sensitive strips, in their current order.
    pub(crate) sensitive: Vec<AuxDetSensitive>,
}

impl AuxDet {
    /// Creates an unnumbered module without strips.
    pub fn new(name: &str, center: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            center,
            index: None,
            sensitive: Vec::new(),
        }
    }

    /// Appends a strip, linking it to this module's current index.
    pub fn push_sensitive(&mut self, mut strip: AuxDetSensitive) {
        strip.parent = self.index;
        self.sensitive.push(strip);
    }

    pub fn sensitive(&self) -> &[AuxDetSensitive] {
        &self.sensitive
    }

    pub fn sensitive_mut(&mut self) -> &mut [AuxDetSensitive] {
        &mut self.sensitive
    }

    pub fn sensitive_count(&self) -> usize {
        self.sensitive.len()
    }

    /// Sets the module number and refreshes the back-reference of every strip.
    pub fn assign_index(&mut self, index: usize) {
        self.index = Some(index);
        for strip in &mut self.sensitive {
            strip.parent = Some(index);
        }
    }
}

impl Descriptor for AuxDet {
    fn name(&self) -> &str {
        &self.name
    }

    fn center(&self) -> &Point3<f64> {
        &self.center
    }

    fn index(&self) -> Option<usize> {
        self.index
    }

    fn set_index(&mut self, index: usize) {
        self.assign_index(index);
    }
}
