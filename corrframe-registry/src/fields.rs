//! The field table. A field's code doubles as its slot in the vectorial field list.

use crate::{define_fields, FIRST_DISTANCE_CODE};

define_fields! {
    // Surface-intrinsic fields
    /// Curvature of the inflated surface.
    field InflatedCurvature = 0 { key: "inflated_curvature", name: computed, distance: false },
    /// Sulcal depth.
    field Sulc = 1 { key: "sulc", name: "sulc", distance: false },
    /// Mean curvature of the white surface.
    field Curvature = 2 { key: "curvature", name: computed, distance: false },
    /// Intensity sampled at mid cortical depth.
    field GrayMid = 3 { key: "graymid", name: "graymid", distance: false },
    field T1Mid = 4 { key: "t1mid", name: "T1mid", distance: false },
    field T2Mid = 5 { key: "t2mid", name: "T2mid", distance: false },
    field PdMid = 6 { key: "pdmid", name: "PDmid", distance: false },

    // Subcortical distance fields
    field Amygdala = 7 { key: "amygdala", name: "amygdala_dist", distance: true },
    field Hippocampus = 8 { key: "hippocampus", name: "hippocampus_dist", distance: true },
    field Pallidum = 9 { key: "pallidum", name: "pallidum_dist", distance: true },
    field Putamen = 10 { key: "putamen", name: "putamen_dist", distance: true },
    field Caudate = 11 { key: "caudate", name: "caudate_dist", distance: true },
    field LatVentricle = 12 { key: "lat_ventricle", name: "latventricle_dist", distance: true },
    /// Inferior horn of the lateral ventricle.
    field InfLatVentricle = 13 { key: "inf_lat_ventricle", name: "inflatventricle_dist", distance: true },
}

// Distance flags split the codes into two contiguous ranges.
const _: () = {
    let mut i = 0;
    while i < FieldCode::ALL.len() {
        let field = FieldCode::ALL[i];
        assert!(
            field.is_distance_field() == (field.code() >= FIRST_DISTANCE_CODE),
            "distance flags must cover exactly the codes from FIRST_DISTANCE_CODE up"
        );
        i += 1;
    }
};
