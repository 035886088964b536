use super::ResponseSpec;
use crate::common::constants::FIRST_RESPONSE_UNIT;
use crate::modules::serialization::format_fixed_f64;
use std::fmt::Write as _;

/// Data files the executable reads or writes, as (namelist key, stem).
const FILE_NAMES: [(&str, &str); 9] = [
    ("energy_data_filename", "eigen_"),
    ("energys_data_filename", "energys.d_"),
    ("half_energys_data_filename", "halfenergys.d_"),
    ("pmn_data_filename", "me_pmn_"),
    ("rmn_data_filename", "rmn.d_"),
    ("der_data_filename", "der.d_"),
    ("tet_list_filename", "tetrahedra_"),
    ("integrand_filename", "Integrand_"),
    ("spectrum_filename", "Spectrum_"),
];

/// `&INDATA` namelist read by the response executable.
pub fn namelist(spec: &ResponseSpec) -> String {
    let case = spec.case_id();
    let bands = &spec.bands;
    let with_so = if spec.nspinor == 2 { ".True." } else { ".False." };

    let mut out = String::from("&INDATA\n");
    let _ = writeln!(out, "nVal = {},", bands.valence);
    let _ = writeln!(out, "nMax = {},", bands.total);
    let _ = writeln!(out, "nVal_tetra = {},", bands.valence_total);
    let _ = writeln!(out, "nMax_tetra = {},", bands.conduction);
    let _ = writeln!(out, "kMax = {},", spec.nk_tetra);
    let _ = writeln!(out, "scissor = {},", format_fixed_f64(spec.scissors, 6));
    let _ = writeln!(out, "tol = {},", format_fixed_f64(spec.tolerance, 6));
    let _ = writeln!(out, "nSpinor = {},", spec.nspinor);
    let _ = writeln!(out, "acellz = {},", format_fixed_f64(spec.acellz, 6));
    let _ = writeln!(out, "withSO = {with_so},");
    for (key, stem) in FILE_NAMES {
        let _ = writeln!(out, "{key} = \"{stem}{case}\",");
    }
    let _ = writeln!(out, "energy_min = {},", spec.energy_min.trunc() as i64);
    let _ = writeln!(out, "energy_max = {},", spec.energy_max.trunc() as i64);
    let _ = writeln!(out, "energy_steps = {}", spec.energy_steps);
    out.push_str("/\n");
    out
}

/// Copies the symmetry and matrix-element inputs into the response
/// directory.
pub fn staging_script(spec: &ResponseSpec) -> String {
    let nk = spec.nk_tetra;
    let case = spec.case_id();
    format!(
        "cp ../symmetries/tetrahedra_{nk} .\n\
         cp ../symmetries/Symmetries.Cartesian_{nk} Symmetries.Cartesian\n\
         cp ../eigen_{case} .\n\
         cp ../me_pmn_{case} .\n"
    )
}

/// Component count, then per component a header line and its axis
/// digits. Output units count up from 501.
pub fn component_table(spec: &ResponseSpec) -> String {
    let case = spec.case_id();
    let code = spec.response.code();
    let name = spec.response.name();

    let mut out = String::new();
    let _ = writeln!(out, "{}", spec.components.len());
    for (index, component) in spec.components.iter().enumerate() {
        let unit = FIRST_RESPONSE_UNIT + index;
        let _ = writeln!(out, "{code} {name}.{component}.dat_{case} {unit} T");
        for digit in component.digits() {
            let _ = write!(out, "{digit} ");
        }
        out.push('\n');
    }
    out
}
