use chrono::{DateTime, Utc};

use crate::models::{ClanDetails, ClanSummary, MemberRecord};

pub const LEADER_ROLE: &str = "leader";

/// Reported when no roster entry carries the leader role.
pub const NO_LEADER: &str = "N/A";

/// Sum of `donations` and `donationsReceived` over the whole roster.
pub fn donation_totals(members: &[MemberRecord]) -> (u64, u64) {
    members.iter().fold((0u64, 0u64), |(given, received), m| {
        (
            given.saturating_add(m.donations),
            received.saturating_add(m.donations_received),
        )
    })
}

/// First member holding the leader role, if any.
pub fn find_leader(members: &[MemberRecord]) -> Option<&MemberRecord> {
    members.iter().find(|m| m.role == LEADER_ROLE)
}

pub fn summarize(clan: &ClanDetails, members: &[MemberRecord], now: DateTime<Utc>) -> ClanSummary {
    let (donations, received) = donation_totals(members);

    let leader = find_leader(members)
        .map(|m| m.name.clone())
        .unwrap_or_else(|| NO_LEADER.to_string());

    ClanSummary {
        name: clan.name.clone(),
        tag: clan.tag.clone(),
        leader,
        donations,
        received,
        members: clan.members,
        level: clan.clan_level,
        last_updated: now,
    }
}
