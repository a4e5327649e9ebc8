//! Partition of a reporter's dispute participants into the forking market
//! and every other market

use hashlink::LinkedHashMap;
use serde::{Deserialize, Serialize};

use crate::{
    state::participants::ParticipantRows,
    types::{CrowdsourcerId, InitialReporterId, MarketId, UniverseId},
};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrowdsourcerState {
    pub crowdsourcer_id: CrowdsourcerId,
    pub needs_fork: bool,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialReporterState {
    pub initial_reporter_id: InitialReporterId,
    pub needs_fork: bool,
}

/// Participants of the market whose escalation forked the universe.
/// Settlement is suspended, so each participant only records whether it
/// still has to migrate.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForkedMarket {
    pub market_id: MarketId,
    pub universe: UniverseId,
    pub is_finalized: bool,
    pub crowdsourcers: Vec<CrowdsourcerState>,
    pub initial_reporter: Option<InitialReporterState>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NonforkedMarket {
    pub market_id: MarketId,
    pub universe: UniverseId,
    pub crowdsourcers_are_disavowed: bool,
    pub is_finalized: bool,
    pub is_migrated: bool,
    pub crowdsourcers: Vec<CrowdsourcerId>,
    pub initial_reporter: Option<InitialReporterId>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketParticipants {
    pub forked_market: Option<ForkedMarket>,
    /// In first-seen order
    pub nonforked_markets: Vec<NonforkedMarket>,
}

pub fn classify_participants(rows: &ParticipantRows) -> MarketParticipants {
    let mut forked_market =
        rows.forking_market.as_ref().map(|market| ForkedMarket {
            market_id: market.id,
            universe: market.universe,
            is_finalized: market.is_finalized(),
            crowdsourcers: Vec::new(),
            initial_reporter: None,
        });
    let mut nonforked = LinkedHashMap::<MarketId, NonforkedMarket>::new();
    for row in rows.initial_reports.iter().filter(|row| row.is_participant()) {
        let initial_report = &row.initial_report;
        if let Some(forked) = forked_market.as_mut()
            && forked.market_id == row.market.id
        {
            forked.initial_reporter = Some(InitialReporterState {
                initial_reporter_id: initial_report.initial_reporter,
                needs_fork: !initial_report.disavowed,
            });
            continue;
        }
        nonforked.insert(
            row.market.id,
            NonforkedMarket {
                market_id: row.market.id,
                universe: row.market.universe,
                crowdsourcers_are_disavowed: false,
                is_finalized: row.market.is_finalized(),
                is_migrated: !row.market.needs_migration,
                crowdsourcers: Vec::new(),
                initial_reporter: Some(initial_report.initial_reporter),
            },
        );
    }
    for row in rows.crowdsourcers.iter().filter(|row| row.is_participant()) {
        let crowdsourcer = &row.crowdsourcer;
        if let Some(forked) = forked_market.as_mut()
            && forked.market_id == row.market.id
        {
            forked.crowdsourcers.push(CrowdsourcerState {
                crowdsourcer_id: crowdsourcer.id,
                needs_fork: !crowdsourcer.disavowed,
            });
            continue;
        }
        let entry =
            nonforked
                .entry(row.market.id)
                .or_insert_with(|| NonforkedMarket {
                    market_id: row.market.id,
                    universe: row.market.universe,
                    crowdsourcers_are_disavowed: false,
                    is_finalized: row.market.is_finalized(),
                    is_migrated: !row.market.needs_migration,
                    crowdsourcers: Vec::new(),
                    initial_reporter: None,
                });
        // Last seen flag wins
        entry.crowdsourcers_are_disavowed = crowdsourcer.disavowed;
        entry.crowdsourcers.push(crowdsourcer.id);
    }
    MarketParticipants {
        forked_market,
        nonforked_markets: nonforked.into_iter().map(|(_, market)| market).collect(),
    }
}
