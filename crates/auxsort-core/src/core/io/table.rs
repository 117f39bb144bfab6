use crate::core::models::aux_det::AuxDet;
use crate::core::models::geometry::CrtGeometry;
use crate::core::models::sensitive::AuxDetSensitive;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Sensitive volume '{strip}' in '{path}' references unknown module '{module}'")]
    UnknownParent {
        path: String,
        module: String,
        strip: String,
    },
}

#[derive(Debug, Deserialize)]
struct ModuleRecord {
    name: String,
    x: f64,
    y: f64,
    z: f64,
}

#[derive(Debug, Deserialize)]
struct SensitiveRecord {
    module: String,
    name: String,
    x: f64,
    y: f64,
    z: f64,
}

#[derive(Debug, Serialize)]
struct SortedModuleRecord<'a> {
    index: Option<usize>,
    name: &'a str,
    x: f64,
    y: f64,
    z: f64,
}

#[derive(Debug, Serialize)]
struct SortedSensitiveRecord<'a> {
    module_index: Option<usize>,
    index: Option<usize>,
    module: &'a str,
    name: &'a str,
    x: f64,
    y: f64,
    z: f64,
}

/// Reads modules from a CSV table with header `name,x,y,z` (world coordinates, cm).
///
/// `origin` names the source in error messages.
pub fn read_modules(reader: impl Read, origin: &str) -> Result<CrtGeometry, GeometryError> {
    let csv_error = |source| GeometryError::Csv {
        path: origin.to_string(),
        source,
    };
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut geometry = CrtGeometry::new();
    for result in csv_reader.deserialize::<ModuleRecord>() {
        let record = result.map_err(csv_error)?;
        geometry.add_module(AuxDet::new(
            &record.name,
            Point3::new(record.x, record.y, record.z),
        ));
    }
    debug!("Read {} modules from '{}'.", geometry.module_count(), origin);
    Ok(geometry)
}

/// Reads strips from a CSV table with header `module,name,x,y,z` (module-local
/// coordinates, cm) and attaches each one to the module it names.
///
/// Returns the number of strips read.
pub fn read_sensitive_into(
    geometry: &mut CrtGeometry,
    reader: impl Read,
    origin: &str,
) -> Result<usize, GeometryError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut count = 0;
    for result in csv_reader.deserialize::<SensitiveRecord>() {
        let record = result.map_err(|source| GeometryError::Csv {
            path: origin.to_string(),
            source,
        })?;
        let module = geometry.module_by_name_mut(&record.module).ok_or_else(|| {
            GeometryError::UnknownParent {
                path: origin.to_string(),
                module: record.module.clone(),
                strip: record.name.clone(),
            }
        })?;
        module.push_sensitive(AuxDetSensitive::new(
            &record.name,
            Point3::new(record.x, record.y, record.z),
        ));
        count += 1;
    }
    debug!("Read {} sensitive volumes from '{}'.", count, origin);
    Ok(count)
}

/// Loads a geometry from a module table and an optional strip table.
pub fn load_geometry(
    modules_path: &Path,
    sensitive_path: Option<&Path>,
) -> Result<CrtGeometry, GeometryError> {
    let mut geometry = read_modules(open(modules_path)?, &display(modules_path))?;
    if let Some(path) = sensitive_path {
        read_sensitive_into(&mut geometry, open(path)?, &display(path))?;
    }
    Ok(geometry)
}

/// Writes modules in their current order with header `index,name,x,y,z`.
pub fn write_modules(
    geometry: &CrtGeometry,
    writer: impl Write,
    origin: &str,
) -> Result<(), GeometryError> {
    let csv_error = |source| GeometryError::Csv {
        path: origin.to_string(),
        source,
    };
    let mut csv_writer = csv::Writer::from_writer(writer);
    for module in geometry.modules() {
        csv_writer
            .serialize(SortedModuleRecord {
                index: module.index,
                name: &module.name,
                x: module.center.x,
                y: module.center.y,
                z: module.center.z,
            })
            .map_err(csv_error)?;
    }
    csv_writer.flush().map_err(|source| GeometryError::Io {
        path: origin.to_string(),
        source,
    })
}

/// Writes strips module by module, in their current order, with header
/// `module_index,index,module,name,x,y,z`.
pub fn write_sensitive(
    geometry: &CrtGeometry,
    writer: impl Write,
    origin: &str,
) -> Result<(), GeometryError> {
    let csv_error = |source| GeometryError::Csv {
        path: origin.to_string(),
        source,
    };
    let mut csv_writer = csv::Writer::from_writer(writer);
    for module in geometry.modules() {
        for strip in module.sensitive() {
            csv_writer
                .serialize(SortedSensitiveRecord {
                    module_index: strip.parent,
                    index: strip.index,
                    module: &module.name,
                    name: &strip.name,
                    x: strip.center.x,
                    y: strip.center.y,
                    z: strip.center.z,
                })
                .map_err(csv_error)?;
        }
    }
    csv_writer.flush().map_err(|source| GeometryError::Io {
        path: origin.to_string(),
        source,
    })
}

/// Writes both tables to the given paths.
pub fn write_geometry(
    geometry: &CrtGeometry,
    modules_path: &Path,
    sensitive_path: &Path,
) -> Result<(), GeometryError> {
    write_modules(geometry, create(modules_path)?, &display(modules_path))?;
    write_sensitive(geometry, create(sensitive_path)?, &display(sensitive_path))
}

fn display(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

fn open(path: &Path) -> Result<File, GeometryError> {
    File::open(path).map_err(|source| GeometryError::Io {
        path: display(path),
        source,
    })
}

fn create(path: &Path) -> Result<File, GeometryError> {
    File::create(path).map_err(|source| GeometryError::Io {
        path: display(path),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const MODULES: &str = "\
name,x,y,z
volAuxDet_CERN_module_001_Top, 10.0, 600.0, -5.0
volAuxDet_CERN_module_000_Top, -10.0, 600.0, -5.0
";

    const SENSITIVE: &str = "\
module,name,x,y,z
volAuxDet_CERN_module_000_Top,volAuxDetSensitive_CERN_module_000_top_strip_00,-80.5,0.755,0
volAuxDet_CERN_module_001_Top,volAuxDetSensitive_CERN_module_001_top_strip_00,-80.5,0.755,0
volAuxDet_CERN_module_000_Top,volAuxDetSensitive_CERN_module_000_bot_strip_08,0,-0.505,-80.5
";

    #[test]
    fn read_modules_parses_rows_in_file_order() {
        let geometry = read_modules(MODULES.as_bytes(), "modules").unwrap();
        assert_eq!(geometry.module_count(), 2);
        assert_eq!(geometry.modules()[0].name, "volAuxDet_CERN_module_001_Top");
        assert_eq!(geometry.modules()[1].center, Point3::new(-10.0, 600.0, -5.0));
        assert_eq!(geometry.modules()[0].index, None);
    }

    #[test]
    fn read_sensitive_attaches_strips_to_named_modules() {
        let mut geometry = read_modules(MODULES.as_bytes(), "modules").unwrap();
        let count = read_sensitive_into(&mut geometry, SENSITIVE.as_bytes(), "strips").unwrap();

        assert_eq!(count, 3);
        assert_eq!(geometry.modules()[0].sensitive_count(), 1);
        assert_eq!(geometry.modules()[1].sensitive_count(), 2);
        assert_eq!(
            geometry.modules()[1].sensitive()[1].center,
            Point3::new(0.0, -0.505, -80.5)
        );
    }

    #[test]
    fn unknown_parent_is_reported() {
        let mut geometry = read_modules(MODULES.as_bytes(), "modules").unwrap();
        let table = "module,name,x,y,z\nvolAuxDet_DC_module_999_Bottom,strip,0,0,0\n";
        let err = read_sensitive_into(&mut geometry, table.as_bytes(), "strips").unwrap_err();
        match err {
            GeometryError::UnknownParent { module, strip, .. } => {
                assert_eq!(module, "volAuxDet_DC_module_999_Bottom");
                assert_eq!(strip, "strip");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_rows_yield_csv_errors() {
        let table = "name,x,y,z\nm,1.0,not-a-number,3.0\n";
        let err = read_modules(table.as_bytes(), "modules").unwrap_err();
        assert!(matches!(err, GeometryError::Csv { ref path, .. } if path == "modules"));
    }

    #[test]
    fn nan_coordinates_are_accepted() {
        let table = "name,x,y,z\nm,NaN,0,0\n";
        let geometry = read_modules(table.as_bytes(), "modules").unwrap();
        assert!(geometry.modules()[0].center.x.is_nan());
    }

    #[test]
    fn load_and_write_geometry_through_files() {
        let dir = tempdir().unwrap();
        let modules_in = dir.path().join("modules.csv");
        let strips_in = dir.path().join("sensitive.csv");
        fs::write(&modules_in, MODULES).unwrap();
        fs::write(&strips_in, SENSITIVE).unwrap();

        let mut geometry = load_geometry(&modules_in, Some(&strips_in)).unwrap();
        geometry.modules_mut()[0].assign_index(4);

        let modules_out = dir.path().join("modules.sorted.csv");
        let strips_out = dir.path().join("sensitive.sorted.csv");
        write_geometry(&geometry, &modules_out, &strips_out).unwrap();

        let modules_text = fs::read_to_string(&modules_out).unwrap();
        let mut lines = modules_text.lines();
        assert_eq!(lines.next(), Some("index,name,x,y,z"));
        assert_eq!(
            lines.next(),
            Some("4,volAuxDet_CERN_module_001_Top,10.0,600.0,-5.0")
        );
        assert_eq!(
            lines.next(),
            Some(",volAuxDet_CERN_module_000_Top,-10.0,600.0,-5.0")
        );

        let strips_text = fs::read_to_string(&strips_out).unwrap();
        assert_eq!(
            strips_text.lines().next(),
            Some("module_index,index,module,name,x,y,z")
        );
        assert_eq!(strips_text.lines().count(), 4);
        assert!(strips_text.contains(
            "4,,volAuxDet_CERN_module_001_Top,volAuxDetSensitive_CERN_module_001_top_strip_00"
        ));
    }

    #[test]
    fn missing_file_yields_io_error() {
        let dir = tempdir().unwrap();
        let err = load_geometry(&dir.path().join("absent.csv"), None).unwrap_err();
        assert!(matches!(err, GeometryError::Io { .. }));
    }
}
