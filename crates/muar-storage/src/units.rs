//! Physical units
//!
//! Records hold quantities in the simulation engine's base units (mm, ns, MeV).
//! Output rows are written in a declared reporting unit per quantity; a value is
//! converted by dividing it by the unit's size in base units.

use core::fmt;

/// A named unit with its size expressed in base units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unit {
    /// Unit symbol as accepted in configuration ("m", "ns", ...)
    pub symbol: &'static str,
    /// Quantity kind
    pub dimension: Dimension,
    /// Size of one unit in base units
    pub value: f64,
}

/// Kind of physical quantity a unit measures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    /// Length (base: millimetre)
    Length,
    /// Time (base: nanosecond)
    Time,
    /// Energy (base: MeV)
    Energy,
}

impl Unit {
    /// Millimetre
    pub const MILLIMETER: Unit = Unit { symbol: "mm", dimension: Dimension::Length, value: 1.0 };
    /// Centimetre
    pub const CENTIMETER: Unit = Unit { symbol: "cm", dimension: Dimension::Length, value: 10.0 };
    /// Metre
    pub const METER: Unit = Unit { symbol: "m", dimension: Dimension::Length, value: 1000.0 };
    /// Nanosecond
    pub const NANOSECOND: Unit = Unit { symbol: "ns", dimension: Dimension::Time, value: 1.0 };
    /// Microsecond
    pub const MICROSECOND: Unit = Unit { symbol: "us", dimension: Dimension::Time, value: 1.0e3 };
    /// Millisecond
    pub const MILLISECOND: Unit = Unit { symbol: "ms", dimension: Dimension::Time, value: 1.0e6 };
    /// Second
    pub const SECOND: Unit = Unit { symbol: "s", dimension: Dimension::Time, value: 1.0e9 };
    /// Electronvolt
    pub const EV: Unit = Unit { symbol: "eV", dimension: Dimension::Energy, value: 1.0e-6 };
    /// Kiloelectronvolt
    pub const KEV: Unit = Unit { symbol: "keV", dimension: Dimension::Energy, value: 1.0e-3 };
    /// Megaelectronvolt
    pub const MEV: Unit = Unit { symbol: "MeV", dimension: Dimension::Energy, value: 1.0 };
    /// Gigaelectronvolt
    pub const GEV: Unit = Unit { symbol: "GeV", dimension: Dimension::Energy, value: 1.0e3 };

    const ALL: [Unit; 11] = [
        Self::MILLIMETER,
        Self::CENTIMETER,
        Self::METER,
        Self::NANOSECOND,
        Self::MICROSECOND,
        Self::MILLISECOND,
        Self::SECOND,
        Self::EV,
        Self::KEV,
        Self::MEV,
        Self::GEV,
    ];

    /// Look up a unit by symbol
    pub fn by_symbol(symbol: &str) -> Option<Unit> {
        Self::ALL.iter().copied().find(|u| u.symbol == symbol)
    }

    /// Look up a unit by symbol, requiring a dimension
    pub fn by_symbol_with(symbol: &str, dimension: Dimension) -> Option<Unit> {
        Self::by_symbol(symbol).filter(|u| u.dimension == dimension)
    }

    /// Express a base-unit value in this unit
    pub fn convert(&self, base_value: f64) -> f64 {
        base_value / self.value
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol)
    }
}

/// Units the output tables are written in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportingUnits {
    /// Unit of hit times
    pub time: Unit,
    /// Unit of energy deposits
    pub energy: Unit,
    /// Unit of positions and vertices
    pub length: Unit,
}

impl Default for ReportingUnits {
    fn default() -> Self {
        Self {
            time: Unit::NANOSECOND,
            energy: Unit::MEV,
            length: Unit::METER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reporting_units() {
        let units = ReportingUnits::default();
        assert_eq!(units.time.convert(3.4), 3.4);
        assert_eq!(units.energy.convert(1.2), 1.2);
        assert_eq!(units.length.convert(2500.0), 2.5);
    }

    #[test]
    fn test_lookup() {
        assert_eq!(Unit::by_symbol("keV"), Some(Unit::KEV));
        assert_eq!(Unit::by_symbol("furlong"), None);
        assert_eq!(Unit::by_symbol_with("m", Dimension::Length), Some(Unit::METER));
        assert_eq!(Unit::by_symbol_with("m", Dimension::Time), None);
    }

    #[test]
    fn test_convert_energy() {
        assert!((Unit::KEV.convert(1.2) - 1200.0).abs() < 1e-9);
        assert!((Unit::GEV.convert(3000.0) - 3.0).abs() < 1e-12);
    }
}
