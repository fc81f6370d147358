use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fulfillment lifecycle steps, in progression order.
///
/// The wire names are the snake_case strings the fulfillment system writes
/// (`order_confirmed`, `processing`, ...). Any other string deserializes to
/// [`TrackingStatus::Unknown`] instead of failing, so a new status rolled out
/// upstream degrades to a generic display row rather than a broken page.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingStatus {
    OrderConfirmed,
    Processing,
    Shipped,
    OutForDelivery,
    Delivered,
    #[serde(other)]
    Unknown,
}

impl TrackingStatus {
    /// Number of steps on the progress timeline (`Unknown` is not a step).
    pub const STEP_COUNT: usize = 5;

    /// Position of this status on the timeline; `None` for `Unknown`.
    pub fn step_index(&self) -> Option<usize> {
        match self {
            TrackingStatus::OrderConfirmed => Some(0),
            TrackingStatus::Processing => Some(1),
            TrackingStatus::Shipped => Some(2),
            TrackingStatus::OutForDelivery => Some(3),
            TrackingStatus::Delivered => Some(4),
            TrackingStatus::Unknown => None,
        }
    }

    /// Human-readable label for the status timeline.
    pub fn label(&self) -> &'static str {
        match self {
            TrackingStatus::OrderConfirmed => "Order confirmed",
            TrackingStatus::Processing => "Processing",
            TrackingStatus::Shipped => "Shipped",
            TrackingStatus::OutForDelivery => "Out for delivery",
            TrackingStatus::Delivered => "Delivered",
            TrackingStatus::Unknown => "Status update",
        }
    }

    /// The wire spelling of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingStatus::OrderConfirmed => "order_confirmed",
            TrackingStatus::Processing => "processing",
            TrackingStatus::Shipped => "shipped",
            TrackingStatus::OutForDelivery => "out_for_delivery",
            TrackingStatus::Delivered => "delivered",
            TrackingStatus::Unknown => "unknown",
        }
    }
}

/// One status update in an order's fulfillment history.
///
/// Written by the external fulfillment system; this crate only ever reads
/// them. The optional fields are display extras: when one is absent the
/// display layer omits the row instead of fabricating a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub status: TrackingStatus,
    pub location: Option<String>,
    pub description: String,
    pub tracking_number: Option<String>,
    pub courier_name: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Where an order stands on the fulfillment timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingProjection {
    pub current_status: TrackingStatus,
    /// Progress in `[0.0, 1.0]`: 0.0 at confirmed, 1.0 at delivered.
    pub completion_fraction: f64,
    /// The event behind `current_status`; `None` when there are no events.
    pub latest_event: Option<TrackingEvent>,
}

/// Project a tracking history into its current display state.
///
/// The current status is the most recently created event's status (ties on
/// `created_at` resolve to the later list position), defaulting to
/// `OrderConfirmed` when the history is empty; an order with no events yet
/// is by definition freshly confirmed. A status without a timeline position
/// clamps the fraction to 0.0. Never fails, whatever the input.
pub fn project(events: &[TrackingEvent]) -> TrackingProjection {
    // max_by_key keeps the last of equally-recent events.
    let latest_event = events.iter().max_by_key(|e| e.created_at).cloned();

    let current_status = latest_event
        .as_ref()
        .map(|e| e.status)
        .unwrap_or(TrackingStatus::OrderConfirmed);

    let completion_fraction = match current_status.step_index() {
        Some(step) => step as f64 / (TrackingStatus::STEP_COUNT - 1) as f64,
        None => 0.0,
    };

    TrackingProjection {
        current_status,
        completion_fraction,
        latest_event,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_event(status: TrackingStatus, minute: u32) -> TrackingEvent {
        TrackingEvent {
            status,
            location: None,
            description: format!("{} update", status.label()),
            tracking_number: None,
            courier_name: None,
            estimated_delivery: None,
            created_at: Utc.with_ymd_and_hms(2025, 3, 14, 9, minute, 0).unwrap(),
        }
    }

    #[test]
    fn empty_history_projects_as_freshly_confirmed() {
        let projection = project(&[]);
        assert_eq!(projection.current_status, TrackingStatus::OrderConfirmed);
        assert_eq!(projection.completion_fraction, 0.0);
        assert!(projection.latest_event.is_none());
    }

    #[test]
    fn shipped_after_confirmed_is_halfway() {
        let events = vec![
            test_event(TrackingStatus::OrderConfirmed, 0),
            test_event(TrackingStatus::Shipped, 10),
        ];
        let projection = project(&events);
        assert_eq!(projection.current_status, TrackingStatus::Shipped);
        assert_eq!(projection.completion_fraction, 0.5);
    }

    #[test]
    fn delivered_is_complete() {
        let events = vec![
            test_event(TrackingStatus::OrderConfirmed, 0),
            test_event(TrackingStatus::Shipped, 5),
            test_event(TrackingStatus::Delivered, 30),
        ];
        assert_eq!(project(&events).completion_fraction, 1.0);
    }

    #[test]
    fn the_most_recently_created_event_wins_regardless_of_list_order() {
        // The fulfillment feed is usually ordered, but the projection keys
        // off created_at rather than trusting the list position.
        let events = vec![
            test_event(TrackingStatus::Shipped, 20),
            test_event(TrackingStatus::Processing, 5),
        ];
        assert_eq!(project(&events).current_status, TrackingStatus::Shipped);
    }

    #[test]
    fn equal_timestamps_resolve_to_the_later_list_position() {
        let events = vec![
            test_event(TrackingStatus::Shipped, 15),
            test_event(TrackingStatus::OutForDelivery, 15),
        ];
        let projection = project(&events);
        assert_eq!(projection.current_status, TrackingStatus::OutForDelivery);
        assert_eq!(projection.completion_fraction, 0.75);
    }

    #[test]
    fn unknown_status_clamps_the_fraction_to_zero() {
        let events = vec![
            test_event(TrackingStatus::Delivered, 0),
            test_event(TrackingStatus::Unknown, 10),
        ];
        let projection = project(&events);
        assert_eq!(projection.current_status, TrackingStatus::Unknown);
        assert_eq!(projection.current_status.label(), "Status update");
        assert_eq!(projection.completion_fraction, 0.0);
    }

    #[test]
    fn latest_event_carries_the_display_extras() {
        let mut event = test_event(TrackingStatus::Shipped, 12);
        event.courier_name = Some("Swift Logistics".to_string());
        event.tracking_number = Some("SL123456789".to_string());
        event.estimated_delivery = Some(Utc.with_ymd_and_hms(2025, 3, 18, 0, 0, 0).unwrap());

        let projection = project(&[event.clone()]);
        assert_eq!(projection.latest_event, Some(event));
    }

    #[test]
    fn unrecognized_wire_status_deserializes_to_unknown() {
        let status: TrackingStatus = serde_json::from_str("\"held_at_customs\"").unwrap();
        assert_eq!(status, TrackingStatus::Unknown);
        assert_eq!(status.step_index(), None);
    }

    #[test]
    fn known_statuses_use_snake_case_wire_names() {
        assert_eq!(
            serde_json::to_string(&TrackingStatus::OutForDelivery).unwrap(),
            "\"out_for_delivery\""
        );
        let status: TrackingStatus = serde_json::from_str("\"order_confirmed\"").unwrap();
        assert_eq!(status, TrackingStatus::OrderConfirmed);
    }
}
