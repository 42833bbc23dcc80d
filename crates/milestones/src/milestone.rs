use {
    crate::{
        business_days::business_days_between,
        date::{self, CalendarDate},
        exception,
        phase::Phase,
    },
    serde::{Deserialize, Serialize},
};

/// The known milestone dates of one shipment. Any of them may be missing.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneSet {
    #[serde(default, deserialize_with = "date::deserialize_lenient")]
    pub revalidation: Option<CalendarDate>,
    #[serde(default, deserialize_with = "date::deserialize_lenient")]
    pub last_document: Option<CalendarDate>,
    #[serde(default, deserialize_with = "date::deserialize_lenient")]
    pub msa: Option<CalendarDate>,
    #[serde(default, deserialize_with = "date::deserialize_lenient")]
    pub transport_delivery: Option<CalendarDate>,
}

impl MilestoneSet {
    pub fn get(&self, phase: Phase) -> Option<CalendarDate> {
        match phase {
            Phase::Revalidation => self.revalidation,
            Phase::LastDocument => self.last_document,
            Phase::Msa => self.msa,
            Phase::TransportDelivery => self.transport_delivery,
        }
    }

    /// Returns a copy with `phase` set to `date`.
    pub fn with(mut self, phase: Phase, date: CalendarDate) -> Self {
        let slot = match phase {
            Phase::Revalidation => &mut self.revalidation,
            Phase::LastDocument => &mut self.last_document,
            Phase::Msa => &mut self.msa,
            Phase::TransportDelivery => &mut self.transport_delivery,
        };
        *slot = Some(date);
        self
    }

    /// The earlier of MSA and transport delivery together with the phase it
    /// belongs to. MSA wins ties.
    pub fn earliest_release(&self) -> Option<(Phase, CalendarDate)> {
        let msa = self.msa.map(|date| (Phase::Msa, date));
        let delivery = self
            .transport_delivery
            .map(|date| (Phase::TransportDelivery, date));
        match (msa, delivery) {
            (Some(msa), Some(delivery)) if delivery.1 < msa.1 => Some(delivery),
            (Some(msa), _) => Some(msa),
            (None, delivery) => delivery,
        }
    }

    /// Business-day gaps between consecutive milestones that are both known.
    pub fn gaps(&self) -> Vec<MilestoneGap> {
        const PAIRS: [(Phase, Phase); 3] = [
            (Phase::Revalidation, Phase::LastDocument),
            (Phase::LastDocument, Phase::Msa),
            (Phase::LastDocument, Phase::TransportDelivery),
        ];

        PAIRS
            .into_iter()
            .filter_map(|(from, to)| {
                let start = self.get(from)?;
                let end = self.get(to)?;
                Some(MilestoneGap {
                    from,
                    to,
                    business_days: business_days_between(start, end),
                })
            })
            .collect()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneGap {
    pub from: Phase,
    pub to: Phase,
    pub business_days: u32,
}

/// A proposed value for one milestone of a shipment.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneUpdateRequest {
    pub shipment_ref: String,
    pub phase: Phase,
    #[serde(deserialize_with = "date::deserialize_required")]
    pub proposed_date: CalendarDate,
    #[serde(
        default,
        deserialize_with = "exception::deserialize_raw_code",
        skip_serializing_if = "Option::is_none"
    )]
    pub exception_code: Option<String>,
}
