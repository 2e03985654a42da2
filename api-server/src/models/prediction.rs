//! Prediction request/response bodies

use serde::{Deserialize, Serialize};
use validator::Validate;

use carprice_core::CarAttributes;

/// JSON request body for `POST /predict`.
///
/// Every field is required except `symboling`, which defaults to 0.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PredictRequest {
    // Numerical features
    #[serde(default, alias = "Symboling")]
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
    #[validate(length(min = 1, message = "fueltype is required"))]
    pub fueltype: String,
    #[validate(length(min = 1, message = "aspiration is required"))]
    pub aspiration: String,
    #[validate(length(min = 1, message = "doornumber is required"))]
    pub doornumber: String,
    #[validate(length(min = 1, message = "carbody is required"))]
    pub carbody: String,
    #[validate(length(min = 1, message = "drivewheel is required"))]
    pub drivewheel: String,
    #[validate(length(min = 1, message = "enginelocation is required"))]
    pub enginelocation: String,
    #[validate(length(min = 1, message = "enginetype is required"))]
    pub enginetype: String,
    #[validate(length(min = 1, message = "cylindernumber is required"))]
    pub cylindernumber: String,
    #[validate(length(min = 1, message = "fuelsystem is required"))]
    pub fuelsystem: String,
    #[validate(length(min = 1, message = "brand is required"))]
    pub brand: String,
}

impl From<PredictRequest> for CarAttributes {
    fn from(req: PredictRequest) -> Self {
        CarAttributes {
            symboling: req.symboling,
            wheelbase: req.wheelbase,
            carlength: req.carlength,
            carwidth: req.carwidth,
            carheight: req.carheight,
            curbweight: req.curbweight,
            enginesize: req.enginesize,
            boreratio: req.boreratio,
            stroke: req.stroke,
            compressionratio: req.compressionratio,
            horsepower: req.horsepower,
            peakrpm: req.peakrpm,
            citympg: req.citympg,
            highwaympg: req.highwaympg,
            fueltype: req.fueltype,
            aspiration: req.aspiration,
            doornumber: req.doornumber,
            carbody: req.carbody,
            drivewheel: req.drivewheel,
            enginelocation: req.enginelocation,
            enginetype: req.enginetype,
            cylindernumber: req.cylindernumber,
            fuelsystem: req.fuelsystem,
            brand: req.brand,
        }
    }
}
