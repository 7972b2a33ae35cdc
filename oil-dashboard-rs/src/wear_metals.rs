//! Wear-metal summary shown next to an explanation

use reasoning_sdk::Sample;
use serde::Serialize;

/// Wear metals charted against their normal level
pub const WEAR_METALS: [&str; 3] = ["Cu", "Fe", "Pb"];

/// Reference level for a healthy machine
pub const NORMAL_LEVEL: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WearMetalLevel {
    pub metal: &'static str,
    pub entered: Option<f64>,
    pub normal: f64,
}

/// Entered vs. normal level for each wear metal; absent metals stay `None`
pub fn wear_metal_summary(sample: &Sample) -> Vec<WearMetalLevel> {
    WEAR_METALS
        .iter()
        .map(|&metal| WearMetalLevel {
            metal,
            entered: sample.get(metal),
            normal: NORMAL_LEVEL,
        })
        .collect()
}
