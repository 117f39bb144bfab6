use super::descriptor::Descriptor;
use nalgebra::Point3;

/// One sensitive element (scintillator strip) of an auxiliary detector module.
///
/// The center is expressed in the local frame of the parent module, so strips are
/// only ever ordered against siblings of the same module.
#[derive(Debug, Clone, PartialEq)]
pub struct AuxDetSensitive {
    /// The GDML volume name (e.g. `volAuxDetSensitive_CERN_module_004_top_strip_03`).
    pub name: String,
    /// Center of the strip in the module-local frame, in cm.
    pub center: Point3<f64>,
    /// Sequential index within the parent module, assigned by sorting.
    pub index: Option<usize>,
    /// Index of the parent module, refreshed whenever the modules are renumbered.
    pub parent: Option<usize>,
}

impl AuxDetSensitive {
    /// Creates an unnumbered strip with no parent assigned yet.
    pub fn new(name: &str, center: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            center,
            index: None,
            parent: None,
        }
    }
}

impl Descriptor for AuxDetSensitive {
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
        self.index = Some(index);
    }
}
