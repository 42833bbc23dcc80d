use {
    serde_with::{DeserializeFromStr, SerializeDisplay},
    std::{fmt, str::FromStr},
};

/// A tracked checkpoint in the customs clearance timeline of a shipment.
///
/// Phases are identified by their three digit operational code.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, DeserializeFromStr, SerializeDisplay,
)]
pub enum Phase {
    /// 073
    Revalidation,
    /// 114
    LastDocument,
    /// 130
    Msa,
    /// 138
    TransportDelivery,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Revalidation,
        Phase::LastDocument,
        Phase::Msa,
        Phase::TransportDelivery,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Phase::Revalidation => "073",
            Phase::LastDocument => "114",
            Phase::Msa => "130",
            Phase::TransportDelivery => "138",
        }
    }

    /// MSA and transport delivery have to be recorded on the same day, each
    /// is the other's counterpart.
    pub fn counterpart(&self) -> Option<Phase> {
        match self {
            Phase::Msa => Some(Phase::TransportDelivery),
            Phase::TransportDelivery => Some(Phase::Msa),
            Phase::Revalidation | Phase::LastDocument => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown phase {0:?}, expected one of 073, 114, 130, 138")]
pub struct InvalidPhase(pub String);

impl FromStr for Phase {
    type Err = InvalidPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "073" | "73" => Ok(Phase::Revalidation),
            "114" => Ok(Phase::LastDocument),
            "130" => Ok(Phase::Msa),
            "138" => Ok(Phase::TransportDelivery),
            other => Err(InvalidPhase(other.to_owned())),
        }
    }
}
