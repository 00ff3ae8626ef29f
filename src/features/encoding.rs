//! Integer codes for categorical features
//!
//! The codes are the ones the network was trained with. They are spelled
//! out per variant so reordering the enums cannot change them.

use crate::{LandCover, SoilType};

/// Training-time code for a land cover class
pub fn land_cover_code(land_cover: LandCover) -> u8 {
    match land_cover {
        LandCover::WaterBody => 1,
        LandCover::Forest => 2,
        LandCover::Agricultural => 3,
        LandCover::Desert => 4,
        LandCover::Urban => 5,
    }
}

/// Training-time code for a soil type
pub fn soil_type_code(soil_type: SoilType) -> u8 {
    match soil_type {
        SoilType::Clay => 1,
        SoilType::Peat => 2,
        SoilType::Loam => 3,
        SoilType::Sandy => 4,
        SoilType::Silt => 5,
    }
}
