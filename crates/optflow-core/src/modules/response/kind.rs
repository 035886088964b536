use crate::domain::{OptError, OptResult};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Response functions the LATM executable can integrate, keyed by its
/// numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    Chi1,
    Eta2,
    Zeta,
    Shg1L,
    Shg2L,
    Shg1V,
    Shg2V,
    Shg1C,
    Shg2C,
    CalChi1Layer,
    CalEta2Layer,
    CalZetaLayer,
    NdotccpLayer,
    Ndotvv,
}

impl ResponseKind {
    pub const ALL: [ResponseKind; 14] = [
        Self::Chi1,
        Self::Eta2,
        Self::Zeta,
        Self::Shg1L,
        Self::Shg2L,
        Self::Shg1V,
        Self::Shg2V,
        Self::Shg1C,
        Self::Shg2C,
        Self::CalChi1Layer,
        Self::CalEta2Layer,
        Self::CalZetaLayer,
        Self::NdotccpLayer,
        Self::Ndotvv,
    ];

    pub const fn code(self) -> u32 {
        match self {
            Self::Chi1 => 1,
            Self::Eta2 => 3,
            Self::Zeta => 41,
            Self::Shg1L => 21,
            Self::Shg2L => 22,
            Self::Shg1V => 42,
            Self::Shg2V => 43,
            Self::Shg1C => 44,
            Self::Shg2C => 45,
            Self::CalChi1Layer => 24,
            Self::CalEta2Layer => 25,
            Self::CalZetaLayer => 29,
            Self::NdotccpLayer => 26,
            Self::Ndotvv => 27,
        }
    }

    /// Stem of the spectrum file names.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Chi1 => "chi1",
            Self::Eta2 => "eta2",
            Self::Zeta => "zeta",
            Self::Shg1L => "shg1L",
            Self::Shg2L => "shg2L",
            Self::Shg1V => "shg1V",
            Self::Shg2V => "shg2V",
            Self::Shg1C => "shg1C",
            Self::Shg2C => "shg2C",
            Self::CalChi1Layer => "calChi1-layer",
            Self::CalEta2Layer => "calEta2-layer",
            Self::CalZetaLayer => "calZeta-layer",
            Self::NdotccpLayer => "ndotccp-layer",
            Self::Ndotvv => "ndotvv",
        }
    }
}

impl TryFrom<u32> for ResponseKind {
    type Error = OptError;

    fn try_from(code: u32) -> OptResult<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.code() == code)
            .ok_or_else(|| {
                OptError::configuration(
                    "CONFIG.UNKNOWN_RESPONSE",
                    format!("unknown response code {code}"),
                )
            })
    }
}

impl Display for ResponseKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

/// Cartesian tensor component such as `xx` or `xyz`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TensorComponent(String);

impl TensorComponent {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Axis digits, `x -> 1`, `y -> 2`, `z -> 3`.
    pub fn digits(&self) -> Vec<u8> {
        self.0
            .bytes()
            .map(|axis| axis - b'x' + 1)
            .collect()
    }
}

impl FromStr for TensorComponent {
    type Err = OptError;

    fn from_str(value: &str) -> OptResult<Self> {
        let valid_len = (2..=3).contains(&value.len());
        if !valid_len || !value.bytes().all(|axis| matches!(axis, b'x' | b'y' | b'z')) {
            return Err(OptError::configuration(
                "CONFIG.TENSOR_COMPONENT",
                format!("'{value}' is not a tensor component (2-3 of x, y, z)"),
            ));
        }
        Ok(Self(value.to_string()))
    }
}

impl Display for TensorComponent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{ResponseKind, TensorComponent};
    use std::collections::HashSet;

    #[test]
    fn every_code_round_trips_and_is_unique() {
        let codes: HashSet<u32> = ResponseKind::ALL.iter().map(|kind| kind.code()).collect();
        assert_eq!(codes.len(), ResponseKind::ALL.len());
        for kind in ResponseKind::ALL {
            assert_eq!(ResponseKind::try_from(kind.code()).expect("known code"), kind);
        }
    }

    #[test]
    fn codes_match_the_executable_table() {
        assert_eq!(ResponseKind::try_from(1).expect("chi1").name(), "chi1");
        assert_eq!(ResponseKind::try_from(24).expect("layer").name(), "calChi1-layer");
        assert_eq!(ResponseKind::try_from(27).expect("ndotvv").name(), "ndotvv");
        assert_eq!(ResponseKind::Shg2C.code(), 45);
    }

    #[test]
    fn unknown_code_is_a_lookup_error() {
        let error = ResponseKind::try_from(999).expect_err("no such response");
        assert_eq!(error.placeholder(), "CONFIG.UNKNOWN_RESPONSE");
        assert!(error.message().contains("999"));
    }

    #[test]
    fn components_map_axes_to_digits() {
        let xyz: TensorComponent = "xyz".parse().expect("component");
        assert_eq!(xyz.digits(), vec![1, 2, 3]);
        assert_eq!("zz".parse::<TensorComponent>().expect("zz").digits(), vec![3, 3]);
    }

    #[test]
    fn malformed_components_are_rejected() {
        for bad in ["x", "xyzx", "xa", "XX", ""] {
            assert_eq!(
                bad.parse::<TensorComponent>().expect_err(bad).placeholder(),
                "CONFIG.TENSOR_COMPONENT"
            );
        }
    }
}
