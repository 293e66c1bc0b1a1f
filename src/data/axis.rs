//! `Axis`
//!
//! An axis is one named, calibrated dimension of a dataset
//! or display. The type tag says what the axis means (X, Y,
//! Channel, ...) and the calibration maps pixel coordinates
//! to real-world coordinates.

use std::fmt;

/// The tag identifying what an axis represents. Types are
/// compared by value, so two `Custom` axes with the same label
/// are the same axis type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AxisType {
    X,
    Y,
    Z,
    Time,
    Channel,
    Spectra,
    Lifetime,
    Frequency,
    Phase,
    Custom(String),
}

/// All of the predefined (non-custom) axis types in their
/// canonical order.
pub const KNOWN_AXES : [AxisType; 9] = [
    AxisType::X,
    AxisType::Y,
    AxisType::Z,
    AxisType::Time,
    AxisType::Channel,
    AxisType::Spectra,
    AxisType::Lifetime,
    AxisType::Frequency,
    AxisType::Phase,
];

impl AxisType {
    /// The human-readable label of the axis type, as shown
    /// in axis-order dialogs.
    pub fn label(&self) -> &str {
        match self {
            AxisType::X => "X",
            AxisType::Y => "Y",
            AxisType::Z => "Z",
            AxisType::Time => "Time",
            AxisType::Channel => "Channel",
            AxisType::Spectra => "Spectra",
            AxisType::Lifetime => "Lifetime",
            AxisType::Frequency => "Frequency",
            AxisType::Phase => "Phase",
            AxisType::Custom(label) => label.as_str(),
        }
    }

    /// Returns the axis type with the given label. Known labels
    /// are matched case-insensitively (and "C" / "T" are accepted
    /// for Channel / Time). Anything else becomes a `Custom` type,
    /// so this never fails.
    ///
    /// ## Example
    ///
    /// ```
    /// use axiscope::AxisType;
    ///
    /// assert_eq!(AxisType::from_label("time"), AxisType::Time);
    /// assert_eq!(AxisType::from_label("C"), AxisType::Channel);
    /// assert_eq!(AxisType::from_label("Angle"), AxisType::Custom("Angle".into()));
    /// ```
    pub fn from_label(label : &str) -> AxisType {
        let trimmed = label.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "x" => AxisType::X,
            "y" => AxisType::Y,
            "z" => AxisType::Z,
            "t" | "time" => AxisType::Time,
            "c" | "channel" => AxisType::Channel,
            "spectra" => AxisType::Spectra,
            "lifetime" => AxisType::Lifetime,
            "frequency" => AxisType::Frequency,
            "phase" => AxisType::Phase,
            _ => AxisType::Custom(trimmed.to_string()),
        }
    }

    /// Planar axes define the visible plane itself and never
    /// carry a cursor position.
    pub fn is_xy(&self) -> bool {
        matches!(self, AxisType::X | AxisType::Y)
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, AxisType::Custom(_))
    }
}

impl fmt::Display for AxisType {
    fn fmt(&self, f : &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Maps a pixel coordinate to a calibrated coordinate.
/// Every variant carries its own parameters, and `forward`
/// and `inverse` are pure functions of them.
///
/// * `Linear` - `offset + scale * x`
/// * `Log` - `offset + scale * ln(x)` (only meaningful for `x > 0`)
/// * `Power` - `offset + scale * x^power`
/// * `Exponential` - `offset + scale * base^x`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Calibration {
    Linear { offset : f64, scale : f64 },
    Log { offset : f64, scale : f64 },
    Power { offset : f64, scale : f64, power : f64 },
    Exponential { offset : f64, scale : f64, base : f64 },
}

impl Default for Calibration {
    fn default() -> Self {
        Calibration::Linear { offset : 0.0, scale : 1.0 }
    }
}

impl Calibration {
    pub fn linear(offset : f64, scale : f64) -> Calibration {
        Calibration::Linear { offset, scale }
    }

    pub fn offset(&self) -> f64 {
        match *self {
            Calibration::Linear { offset, .. }
            | Calibration::Log { offset, .. }
            | Calibration::Power { offset, .. }
            | Calibration::Exponential { offset, .. } => offset,
        }
    }

    pub fn scale(&self) -> f64 {
        match *self {
            Calibration::Linear { scale, .. }
            | Calibration::Log { scale, .. }
            | Calibration::Power { scale, .. }
            | Calibration::Exponential { scale, .. } => scale,
        }
    }

    /// Pixel coordinate -> calibrated coordinate
    pub fn forward(&self, x : f64) -> f64 {
        match *self {
            Calibration::Linear { offset, scale } => offset + scale * x,
            Calibration::Log { offset, scale } => offset + scale * x.ln(),
            Calibration::Power { offset, scale, power } => {
                offset + scale * x.powf(power)
            },
            Calibration::Exponential { offset, scale, base } => {
                offset + scale * base.powf(x)
            },
        }
    }

    /// Calibrated coordinate -> pixel coordinate
    pub fn inverse(&self, y : f64) -> f64 {
        match *self {
            Calibration::Linear { offset, scale } => (y - offset) / scale,
            Calibration::Log { offset, scale } => ((y - offset) / scale).exp(),
            Calibration::Power { offset, scale, power } => {
                ((y - offset) / scale).powf(1.0 / power)
            },
            Calibration::Exponential { offset, scale, base } => {
                ((y - offset) / scale).ln() / base.ln()
            },
        }
    }
}

/// A calibrated, typed coordinate dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub axis_type : AxisType,
    pub calibration : Calibration,
    pub unit : String,
}

impl Axis {
    /// An uncalibrated axis (`Linear`, offset 0, scale 1,
    /// no unit).
    pub fn new(axis_type : AxisType) -> Axis {
        Axis {
            axis_type,
            calibration : Calibration::default(),
            unit : String::new(),
        }
    }

    /// An axis with a linear calibration and a unit label.
    ///
    /// ## Arguments
    ///
    /// * `axis_type` - What the axis represents
    /// * `scale` - Calibrated units per pixel
    /// * `offset` - Calibrated value of pixel 0
    /// * `unit` - Unit label, e.g. "um"
    pub fn linear(axis_type : AxisType, scale : f64, offset : f64, unit : &str) -> Axis {
        Axis {
            axis_type,
            calibration : Calibration::linear(offset, scale),
            unit : unit.to_string(),
        }
    }

    pub fn with_calibration(mut self, calibration : Calibration) -> Axis {
        self.calibration = calibration;
        self
    }

    pub fn axis_type(&self) -> &AxisType {
        &self.axis_type
    }

    pub fn scale(&self) -> f64 {
        self.calibration.scale()
    }

    pub fn offset(&self) -> f64 {
        self.calibration.offset()
    }

    pub fn label(&self) -> &str {
        self.axis_type.label()
    }
}

impl From<AxisType> for Axis {
    fn from(axis_type : AxisType) -> Self {
        Axis::new(axis_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS : f64 = 1e-9;

    #[test]
    fn labels_round_trip() {
        for axis in KNOWN_AXES.iter() {
            assert_eq!(&AxisType::from_label(axis.label()), axis);
        }
        assert_eq!(AxisType::from_label(" t "), AxisType::Time);
        assert_eq!(AxisType::from_label("Angle").label(), "Angle");
        assert!(AxisType::from_label("Angle").is_custom());
    }

    #[test]
    fn only_x_and_y_are_planar() {
        assert!(AxisType::X.is_xy());
        assert!(AxisType::Y.is_xy());
        assert!(!AxisType::Z.is_xy());
        assert!(!AxisType::Custom("X2".into()).is_xy());
    }

    #[test]
    fn calibrations_are_bijective() {
        let calibrations = [
            Calibration::linear(3.0, 0.5),
            Calibration::Log { offset : 1.0, scale : 2.0 },
            Calibration::Power { offset : -1.0, scale : 4.0, power : 2.0 },
            Calibration::Exponential { offset : 0.5, scale : 3.0, base : 6.0 },
        ];
        for calibration in calibrations.iter() {
            for &x in [0.5, 1.0, 2.25, 7.0].iter() {
                let y = calibration.forward(x);
                assert!(
                    (calibration.inverse(y) - x).abs() < EPS,
                    "{:?} failed at {}", calibration, x
                );
            }
        }
    }

    #[test]
    fn axis_accessors() {
        let axis = Axis::linear(AxisType::Z, 0.25, 10.0, "um");
        assert_eq!(axis.scale(), 0.25);
        assert_eq!(axis.offset(), 10.0);
        assert_eq!(axis.calibration.forward(4.0), 11.0);
        assert_eq!(axis.label(), "Z");

        let plain : Axis = AxisType::Time.into();
        assert_eq!(plain.scale(), 1.0);
        assert_eq!(plain.offset(), 0.0);
        assert!(plain.unit.is_empty());
    }
}
