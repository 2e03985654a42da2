//! Car Attributes - Encoder input record
//!
//! Fully populated, already validated upstream. Numeric fields carry no range
//! checks here; categorical fields accept any string.

use serde::{Deserialize, Serialize};

/// Numeric field names in slot order
pub const NUMERIC_FIELDS: [&str; 14] = [
    "symboling",
    "wheelbase",
    "carlength",
    "carwidth",
    "carheight",
    "curbweight",
    "enginesize",
    "boreratio",
    "stroke",
    "compressionratio",
    "horsepower",
    "peakrpm",
    "citympg",
    "highwaympg",
];

/// Categorical field names, each one-hot encoded as `field_value`
pub const CATEGORICAL_FIELDS: [&str; 10] = [
    "fueltype",
    "aspiration",
    "doornumber",
    "carbody",
    "drivewheel",
    "enginelocation",
    "enginetype",
    "cylindernumber",
    "fuelsystem",
    "brand",
];

/// Vehicle attributes for one price estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarAttributes {
    // Numeric features
    pub symboling: i32,
    pub wheelbase: f32,
    pub carlength: f32,
    pub carwidth: f32,
    pub carheight: f32,
    pub curbweight: i32,
    pub enginesize: i32,
    pub boreratio: f32,
    pub stroke: f32,
    pub compressionratio: f32,
    pub horsepower: i32,
    pub peakrpm: i32,
    pub citympg: i32,
    pub highwaympg: i32,

    // Categorical features
    pub fueltype: String,
    pub aspiration: String,
    pub doornumber: String,
    pub carbody: String,
    pub drivewheel: String,
    pub enginelocation: String,
    pub enginetype: String,
    pub cylindernumber: String,
    pub fuelsystem: String,
    pub brand: String,
}

impl CarAttributes {
    /// Numeric values paired with their field names, widened to `f32`
    pub fn numeric_values(&self) -> [(&'static str, f32); 14] {
        [
            ("symboling", self.symboling as f32),
            ("wheelbase", self.wheelbase),
            ("carlength", self.carlength),
            ("carwidth", self.carwidth),
            ("carheight", self.carheight),
            ("curbweight", self.curbweight as f32),
            ("enginesize", self.enginesize as f32),
            ("boreratio", self.boreratio),
            ("stroke", self.stroke),
            ("compressionratio", self.compressionratio),
            ("horsepower", self.horsepower as f32),
            ("peakrpm", self.peakrpm as f32),
            ("citympg", self.citympg as f32),
            ("highwaympg", self.highwaympg as f32),
        ]
    }

    /// Categorical values paired with their field names
    pub fn categorical_values(&self) -> [(&'static str, &str); 10] {
        [
            ("fueltype", self.fueltype.as_str()),
            ("aspiration", self.aspiration.as_str()),
            ("doornumber", self.doornumber.as_str()),
            ("carbody", self.carbody.as_str()),
            ("drivewheel", self.drivewheel.as_str()),
            ("enginelocation", self.enginelocation.as_str()),
            ("enginetype", self.enginetype.as_str()),
            ("cylindernumber", self.cylindernumber.as_str()),
            ("fuelsystem", self.fuelsystem.as_str()),
            ("brand", self.brand.as_str()),
        ]
    }
}
