//! Volume name to geometry code lookup
//!
//! Each detector geometry variant declares the closed set of logical volume names a
//! trajectory vertex can lie in. The position of a name in that list is its code in
//! the output tables, so the lists must only ever be appended to.

use crate::error::{Result, RuntimeError};
use muar_storage::GeometryCode;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Detector geometry variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GeometryVariant {
    /// Water-tank shielded cryostat with germanium array in underground argon
    #[default]
    Baseline,
    /// Membrane cryostat with TPC and inner/outer barrel
    Cryostat,
}

const BASELINE_VOLUMES: &[&str] = &[
    "Cavern_log",
    "Hall_log",
    "Tank_log",
    "Water_log",
    "Cout_log",
    "Cvac_log",
    "Cinn_log",
    "Lar_log",
    "Lid_log",
    "Bot_log",
    "Copper_log",
    "ULar_log",
    "Ge_log",
    "Pu_log",
    "Membrane_log",
];

const CRYOSTAT_VOLUMES: &[&str] = &[
    "World_log",
    "Cavern_log",
    "Hall_log",
    "Tank_log",
    "Pu_log",
    "Membrane_log",
    "Lar_log",
    "Copper_log",
    "ULar_log",
    "Layer_log",
    "Ge_log",
    "Gap_log",
    "TPC_log",
    "TIB_log",
    "TOB_log",
];

impl GeometryVariant {
    /// All variants
    pub const ALL: [GeometryVariant; 2] = [GeometryVariant::Baseline, GeometryVariant::Cryostat];

    /// Configuration name
    pub const fn name(&self) -> &'static str {
        match self {
            GeometryVariant::Baseline => "baseline",
            GeometryVariant::Cryostat => "cryostat",
        }
    }

    /// Volume names in code order
    pub const fn volume_names(&self) -> &'static [&'static str] {
        match self {
            GeometryVariant::Baseline => BASELINE_VOLUMES,
            GeometryVariant::Cryostat => CRYOSTAT_VOLUMES,
        }
    }
}

impl fmt::Display for GeometryVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GeometryVariant {
    type Err = RuntimeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| RuntimeError::invalid_parameter("geometry", s, "baseline or cryostat"))
    }
}

/// Immutable volume name lookup for one geometry variant
///
/// Built once per run and shared read-only between workers.
#[derive(Debug, Clone)]
pub struct GeometryTable {
    variant: GeometryVariant,
    names: Vec<String>,
    codes: HashMap<String, GeometryCode>,
}

impl GeometryTable {
    /// Build the table of a variant
    pub fn for_variant(variant: GeometryVariant) -> Self {
        let names = variant.volume_names();
        let codes = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), GeometryCode::new(i as u16)))
            .collect();
        Self {
            variant,
            names: names.iter().map(|n| n.to_string()).collect(),
            codes,
        }
    }

    /// Build a table from an explicit name list; codes follow list order
    pub fn from_names<S: AsRef<str>>(variant: GeometryVariant, names: &[S]) -> Result<Self> {
        if names.len() > usize::from(u16::MAX) {
            return Err(RuntimeError::invalid_parameter(
                "volume names",
                names.len().to_string(),
                "at most 65535 names",
            ));
        }

        let mut codes = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            let name = name.as_ref();
            if codes.insert(name.to_string(), GeometryCode::new(i as u16)).is_some() {
                return Err(RuntimeError::DuplicateVolume {
                    name: name.to_string(),
                    variant: variant.to_string(),
                });
            }
        }

        Ok(Self {
            variant,
            names: names.iter().map(|n| n.as_ref().to_string()).collect(),
            codes,
        })
    }

    /// Code of a volume name
    ///
    /// A name outside the table means the geometry and the lookup table disagree; the
    /// caller must abort rather than write an unmapped code.
    pub fn resolve(&self, name: &str) -> Result<GeometryCode> {
        self.codes
            .get(name)
            .copied()
            .ok_or_else(|| RuntimeError::unknown_volume(name, self.variant.name()))
    }

    /// Volume name of a code
    pub fn name_of(&self, code: GeometryCode) -> Option<&str> {
        self.names.get(usize::from(code.raw())).map(String::as_str)
    }

    /// Variant this table was built for
    pub fn variant(&self) -> GeometryVariant {
        self.variant
    }

    /// Names in code order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Number of volumes
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_codes() {
        let table = GeometryTable::for_variant(GeometryVariant::Baseline);
        assert_eq!(table.len(), 15);
        assert_eq!(table.resolve("Cavern_log").unwrap(), GeometryCode::new(0));
        assert_eq!(table.resolve("Lar_log").unwrap(), GeometryCode::new(7));
        assert_eq!(table.resolve("Ge_log").unwrap(), GeometryCode::new(12));
        assert_eq!(table.resolve("Membrane_log").unwrap(), GeometryCode::new(14));
    }

    #[test]
    fn test_resolve_is_stable() {
        let table = GeometryTable::for_variant(GeometryVariant::Cryostat);
        let first = table.resolve("TPC_log").unwrap();
        for _ in 0..10 {
            assert_eq!(table.resolve("TPC_log").unwrap(), first);
        }
        assert_eq!(table.name_of(first), Some("TPC_log"));
    }

    #[test]
    fn test_unknown_name_is_fatal() {
        let table = GeometryTable::for_variant(GeometryVariant::Baseline);
        let err = table.resolve("TPC_log").unwrap_err();
        assert!(err.is_fatal());
        match err {
            RuntimeError::UnknownVolume { name, variant } => {
                assert_eq!(name, "TPC_log");
                assert_eq!(variant, "baseline");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_names_rejects_duplicates() {
        let err = GeometryTable::from_names(GeometryVariant::Baseline, &["A_log", "B_log", "A_log"]);
        assert!(matches!(err, Err(RuntimeError::DuplicateVolume { .. })));

        let table = GeometryTable::from_names(GeometryVariant::Baseline, &["A_log", "B_log"]).unwrap();
        assert_eq!(table.resolve("B_log").unwrap(), GeometryCode::new(1));
    }

    #[test]
    fn test_variant_parsing() {
        assert_eq!("baseline".parse::<GeometryVariant>().unwrap(), GeometryVariant::Baseline);
        assert_eq!("Cryostat".parse::<GeometryVariant>().unwrap(), GeometryVariant::Cryostat);
        assert!("hallA".parse::<GeometryVariant>().is_err());
    }

    #[test]
    fn test_variant_lists_have_unique_names() {
        for variant in GeometryVariant::ALL {
            assert!(GeometryTable::from_names(variant, variant.volume_names()).is_ok());
        }
    }
}
