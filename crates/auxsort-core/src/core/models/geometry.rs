use super::aux_det::AuxDet;
use super::descriptor::Descriptor;
use std::collections::{HashMap, HashSet};

/// The complete set of CRT modules of one detector, as handed over by a loader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrtGeometry {
    modules: Vec<AuxDet>,
    /// Lookup from module volume name to its position in `modules`.
    name_map: HashMap<String, usize>,
}

/// Problems found by [`CrtGeometry::validate`]. These never stop a sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryIssue {
    DuplicateModuleName(String),
    DuplicateSensitiveName { module: String, strip: String },
    NonFiniteModuleCenter(String),
    NonFiniteSensitiveCenter { module: String, strip: String },
}

impl CrtGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_modules(modules: Vec<AuxDet>) -> Self {
        let mut geometry = Self {
            modules,
            name_map: HashMap::new(),
        };
        geometry.rebuild_name_map();
        geometry
    }

    /// Adds a module, returning its position in the current sequence.
    pub fn add_module(&mut self, module: AuxDet) -> usize {
        let position = self.modules.len();
        self.name_map.entry(module.name.clone()).or_insert(position);
        self.modules.push(module);
        position
    }

    pub fn modules(&self) -> &[AuxDet] {
        &self.modules
    }

    /// Mutable access to the module sequence.
    ///
    /// The name lookup is keyed by position; call [`Self::rebuild_name_map`] after
    /// reordering through this slice.
    pub fn modules_mut(&mut self) -> &mut [AuxDet] {
        &mut self.modules
    }

    pub fn into_modules(self) -> Vec<AuxDet> {
        self.modules
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn sensitive_count(&self) -> usize {
        self.modules.iter().map(AuxDet::sensitive_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Finds a module by volume name. The first module wins for duplicated names.
    pub fn find_module_by_name(&self, name: &str) -> Option<usize> {
        self.name_map.get(name).copied()
    }

    pub fn module_by_name_mut(&mut self, name: &str) -> Option<&mut AuxDet> {
        let position = self.find_module_by_name(name)?;
        self.modules.get_mut(position)
    }

    pub fn rebuild_name_map(&mut self) {
        self.name_map.clear();
        for (position, module) in self.modules.iter().enumerate() {
            self.name_map.entry(module.name.clone()).or_insert(position);
        }
    }

    /// Reports duplicate names and non-finite coordinates.
    pub fn validate(&self) -> Vec<GeometryIssue> {
        let mut issues = Vec::new();
        let mut seen_modules = HashSet::new();

        for module in &self.modules {
            if !seen_modules.insert(module.name.as_str()) {
                issues.push(GeometryIssue::DuplicateModuleName(module.name.clone()));
            }
            if module.has_non_finite_center() {
                issues.push(GeometryIssue::NonFiniteModuleCenter(module.name.clone()));
            }

            let mut seen_strips = HashSet::new();
            for strip in module.sensitive() {
                if !seen_strips.insert(strip.name.as_str()) {
                    issues.push(GeometryIssue::DuplicateSensitiveName {
                        module: module.name.clone(),
                        strip: strip.name.clone(),
                    });
                }
                if strip.has_non_finite_center() {
                    issues.push(GeometryIssue::NonFiniteSensitiveCenter {
                        module: module.name.clone(),
                        strip: strip.name.clone(),
                    });
                }
            }
        }
        issues
    }
}
