//! Statistics service: cross-event rollups computed on demand.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{EventId, EventRegistry, ParticipantRegistry};

/// Ticket totals across the whole event set.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TicketUtilization {
    /// Sum of every event's capacity.
    pub total_tickets: u64,
    /// Sum of every event's membership count.
    pub sold_tickets: u64,
    /// `sold / total`, `0.0` when no tickets exist.
    pub utilization_rate: f64,
}

/// Per-event participation figures.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ParticipationTrend {
    /// Event identifier.
    pub event_id: EventId,
    /// Event name.
    pub event_name: String,
    /// Ticket capacity.
    pub total_tickets: u32,
    /// Live membership count.
    pub sold_tickets: u32,
    /// `tickets_remaining` as currently stored (not recomputed here).
    pub remaining_tickets: u32,
}

/// Full statistics overview.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatsOverview {
    /// Number of events.
    pub total_events: u64,
    /// Events with `start <= now <= end`.
    pub active_events: u64,
    /// Events with `end < now`.
    pub completed_events: u64,
    /// Events with `start > now`.
    pub upcoming_events: u64,
    /// Number of participant records.
    pub total_participants: u64,
    /// Memberships per event, `0.0` when there are no events.
    pub average_participants_per_event: f64,
    /// Ticket totals and utilization.
    pub ticket_utilization: TicketUtilization,
    /// Event counts keyed by the month name of their start date.
    pub events_by_month: HashMap<String, u64>,
    /// Per-event participation figures.
    pub participation_trends: Vec<ParticipationTrend>,
}

/// Read-only aggregation over both registries.
///
/// Never mutates stored ticket counters; `remaining_tickets` in the
/// trends is reported exactly as persisted.
#[derive(Debug, Clone)]
pub struct StatsService {
    events: Arc<EventRegistry>,
    participants: Arc<ParticipantRegistry>,
}

impl StatsService {
    /// Creates a new `StatsService`.
    #[must_use]
    pub fn new(events: Arc<EventRegistry>, participants: Arc<ParticipantRegistry>) -> Self {
        Self {
            events,
            participants,
        }
    }

    /// Scans all events once and builds the overview.
    pub async fn overview(&self) -> StatsOverview {
        let now = Utc::now();
        let records = self.events.snapshot().await;

        let mut active_events: u64 = 0;
        let mut completed_events: u64 = 0;
        let mut upcoming_events: u64 = 0;
        let mut total_tickets: u64 = 0;
        let mut sold_tickets: u64 = 0;
        let mut events_by_month: HashMap<String, u64> = HashMap::new();
        let mut participation_trends = Vec::with_capacity(records.len());

        for record in &records {
            if record.start_date > now {
                upcoming_events += 1;
            } else if record.end_date < now {
                completed_events += 1;
            } else {
                active_events += 1;
            }

            let count = self.participants.count_for_event(record.event_id).await;
            total_tickets += u64::from(record.capacity);
            sold_tickets += u64::from(count);

            let month = record.start_date.format("%B").to_string();
            *events_by_month.entry(month).or_insert(0) += 1;

            participation_trends.push(ParticipationTrend {
                event_id: record.event_id,
                event_name: record.name.clone(),
                total_tickets: record.capacity,
                sold_tickets: count,
                remaining_tickets: record.tickets_remaining,
            });
        }

        let total_events = records.len() as u64;
        let average_participants_per_event = if total_events == 0 {
            0.0
        } else {
            sold_tickets as f64 / total_events as f64
        };
        let utilization_rate = if total_tickets == 0 {
            0.0
        } else {
            sold_tickets as f64 / total_tickets as f64
        };

        StatsOverview {
            total_events,
            active_events,
            completed_events,
            upcoming_events,
            total_participants: self.participants.len().await as u64,
            average_participants_per_event,
            ticket_utilization: TicketUtilization {
                total_tickets,
                sold_tickets,
                utilization_rate,
            },
            events_by_month,
            participation_trends,
        }
    }
}
