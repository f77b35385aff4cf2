use time::macros::time;
use time::{Duration, OffsetDateTime, UtcOffset};

use crate::context::{parse_instant, DimensionAxis, RequestContext, RequestedDimensions};
use crate::record::Record;
use crate::store::RecordStore;

pub const SLUG_ACTIVE_NEXT_SUNDAY: &str = "active-next-sunday";
pub const SLUG_ACTIVE_UNTIL_NEXT_SUNDAY: &str = "active-until-next-sunday";

/// Validity window of one availability record. Open ends are `None`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct AvailabilityWindow {
    pub starts: Option<OffsetDateTime>,
    pub ends: Option<OffsetDateTime>,
}

impl AvailabilityWindow {
    #[must_use]
    pub fn contains(&self, instant: OffsetDateTime) -> bool {
        let pending = self.starts.is_some_and(|starts| instant < starts);
        let ended = self.ends.is_some_and(|ends| instant >= ends);
        !pending && !ended
    }
}

/// The Sunday after `as_of` (a week later when `as_of` is a Sunday) at 21:00 UTC, or `None`
/// when that Sunday is past the last representable date.
#[must_use]
pub fn next_sunday_evening(as_of: OffsetDateTime) -> Option<OffsetDateTime> {
    let today = as_of.checked_to_offset(UtcOffset::UTC)?.date();
    let days_until = match 7 - today.weekday().number_days_from_sunday() {
        7 => 7,
        days => days,
    };
    let sunday = today.checked_add(Duration::days(i64::from(days_until)))?;
    Some(sunday.with_time(time!(21:00)).assume_utc())
}

fn window_date(record: &Record, field: &str) -> Option<OffsetDateTime> {
    let raw = record.non_empty_text(field)?;
    let parsed = parse_instant(raw);
    if parsed.is_none() {
        tracing::debug!(
            record_id = %record.id,
            field,
            value = raw,
            "ignoring unparseable availability date"
        );
    }
    parsed
}

/// Compute the window, honouring the relative Sunday slugs. `None` is a window that never
/// opens: an `active-next-sunday` record whose Sunday cannot be represented.
#[must_use]
pub fn window(record: &Record, as_of: OffsetDateTime) -> Option<AvailabilityWindow> {
    let window = match record.text("slug") {
        Some(SLUG_ACTIVE_NEXT_SUNDAY) => {
            AvailabilityWindow { starts: Some(next_sunday_evening(as_of)?), ends: None }
        }
        Some(SLUG_ACTIVE_UNTIL_NEXT_SUNDAY) => {
            AvailabilityWindow { starts: None, ends: next_sunday_evening(as_of) }
        }
        _ => AvailabilityWindow {
            starts: window_date(record, "starts"),
            ends: window_date(record, "ends"),
        },
    };
    Some(window)
}

/// Dimension ids per axis. Axes the record leaves empty are filled from its audience
/// segments, first filling segment wins.
fn axis_ids<'a>(store: &'a RecordStore, record: &'a Record) -> [Vec<&'a str>; 3] {
    let mut axes = DimensionAxis::ALL.map(|axis| record.ids(axis.availability_field()));
    for segment_id in record.ids("segments") {
        let Some(segment) = store.audience_segments.get(segment_id) else {
            continue;
        };
        for (slot, axis) in axes.iter_mut().zip(DimensionAxis::ALL) {
            if slot.is_empty() {
                *slot = segment.ids(axis.availability_field());
            }
        }
    }
    axes
}

/// Comparable name of a dimension id: slug, name or title, lower-cased; unknown ids are
/// lower-cased as-is.
fn dimension_name(store: &RecordStore, axis: DimensionAxis, id: &str) -> String {
    store
        .dimension(axis)
        .get(id)
        .and_then(|dimension| {
            ["slug", "name", "title"].into_iter().find_map(|field| dimension.non_empty_text(field))
        })
        .unwrap_or(id)
        .to_lowercase()
}

/// Per-axis match. An empty request does not restrict; an empty offer grants nothing.
/// Values match when either contains the other.
#[must_use]
pub fn axis_matches(requested: &[String], available: &[String]) -> bool {
    if requested.is_empty() {
        return true;
    }
    requested.iter().any(|wanted| {
        available
            .iter()
            .any(|offered| offered.contains(wanted.as_str()) || wanted.contains(offered.as_str()))
    })
}

/// Whether one availability record grants access for the requested dimensions at `as_of`.
#[must_use]
pub fn record_grants(
    store: &RecordStore,
    record: &Record,
    dimensions: &RequestedDimensions,
    as_of: OffsetDateTime,
) -> bool {
    if !window(record, as_of).is_some_and(|window| window.contains(as_of)) {
        return false;
    }
    let axes = axis_ids(store, record);
    DimensionAxis::ALL.into_iter().zip(axes.iter()).all(|(axis, ids)| {
        let names: Vec<String> = ids.iter().map(|id| dimension_name(store, axis, id)).collect();
        axis_matches(dimensions.axis(axis), &names)
    })
}

/// Access check for an object's availability ids: any linked record granting access is
/// enough. Objects without links fall back to the store's default record.
#[must_use]
pub fn is_available(store: &RecordStore, availability_ids: &[&str], ctx: &RequestContext) -> bool {
    if availability_ids.is_empty() {
        return match store.availability.iter().find(|record| record.flag("default")) {
            Some(default) => record_grants(store, default, &ctx.dimensions, ctx.as_of),
            None => false,
        };
    }
    availability_ids.iter().any(|id| {
        store
            .availability
            .get(id)
            .is_some_and(|record| record_grants(store, record, &ctx.dimensions, ctx.as_of))
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use time::macros::datetime;

    use super::*;
    use crate::context::{HEADER_CUSTOMER_TYPES, HEADER_TIME_TRAVEL};
    use crate::test_support::{fixture_context, fixture_store};

    fn ctx(customers: &str, devices: &str, regions: &str) -> RequestContext {
        fixture_context().with_dimensions(RequestedDimensions::new(customers, devices, regions))
    }

    #[test]
    fn next_sunday_is_strictly_in_the_future() {
        // 2025-06-04 is a Wednesday.
        let wednesday = next_sunday_evening(datetime!(2025-06-04 12:00 UTC));
        assert_eq!(wednesday, Some(datetime!(2025-06-08 21:00 UTC)));
        // A Sunday rolls over to the following week.
        let sunday = next_sunday_evening(datetime!(2025-06-08 22:00 UTC));
        assert_eq!(sunday, Some(datetime!(2025-06-15 21:00 UTC)));
        let saturday = next_sunday_evening(datetime!(2025-06-07 23:59 UTC));
        assert_eq!(saturday, Some(datetime!(2025-06-08 21:00 UTC)));
    }

    #[test]
    fn relative_windows_at_the_last_representable_date() {
        let store = fixture_store();
        assert_eq!(next_sunday_evening(datetime!(9999-12-31 00:00 UTC)), None);
        assert_eq!(next_sunday_evening(datetime!(9999-12-31 23:00 -05:00)), None);

        let request = RequestContext::from_headers([
            (HEADER_TIME_TRAVEL, "9999-12-31T00:00:00Z"),
            (HEADER_CUSTOMER_TYPES, "standard"),
        ]);
        assert_eq!(request.time_travel, Some(datetime!(9999-12-31 00:00 UTC)));
        // The end of an until-Sunday window cannot be represented, so it stays open.
        assert!(is_available(&store, &["av-until"], &request));
        // A next-Sunday window never opens.
        assert!(!is_available(&store, &["av-future"], &request));
    }

    #[test]
    fn premium_only_content_is_hidden_from_standard_customers() {
        let store = fixture_store();
        assert!(!is_available(&store, &["av-premium"], &ctx("standard", "", "")));
        assert!(is_available(&store, &["av-premium"], &ctx("premium", "", "")));
    }

    #[test]
    fn segments_fill_only_empty_axes() {
        let store = fixture_store();
        // Devices and regions come from the segment.
        assert!(is_available(&store, &["av-premium"], &ctx("premium", "phone", "europe")));
        assert!(!is_available(&store, &["av-premium"], &ctx("premium", "", "asia")));
        // The segment also lists standard customers, but the record's own axis wins.
        assert!(!is_available(&store, &["av-premium"], &ctx("standard", "pc", "")));
    }

    #[test]
    fn dimension_names_match_by_containment() {
        let store = fixture_store();
        assert!(is_available(&store, &["av-premium"], &ctx("prem", "", "")));
        assert!(is_available(&store, &["av-premium"], &ctx("premium-plus", "", "")));
    }

    #[test]
    fn objects_without_links_use_the_default_record() {
        let store = fixture_store();
        assert!(is_available(&store, &[], &ctx("standard", "", "")));
        assert!(!is_available(&store, &[], &ctx("", "", "asia")));
    }

    #[test]
    fn dangling_availability_ids_grant_nothing() {
        let store = fixture_store();
        assert!(!is_available(&store, &["av-missing"], &ctx("standard", "", "")));
        assert!(is_available(&store, &["av-missing", "av-dated"], &ctx("standard", "", "")));
    }

    #[test]
    fn time_windows_honour_relative_slugs_and_dates() {
        let store = fixture_store();
        let request = ctx("standard", "", "");
        assert!(!is_available(&store, &["av-future"], &request));
        assert!(is_available(&store, &["av-until"], &request));
        assert!(!is_available(&store, &["av-expired"], &request));
        assert!(is_available(&store, &["av-dated"], &request));

        // Relative slugs move with the reference instant; fixed dates do not.
        let travelled = request.with_time_travel(Some(datetime!(2019-06-01 09:00 UTC)));
        assert!(!is_available(&store, &["av-future"], &travelled));
        assert!(is_available(&store, &["av-until"], &travelled));
        assert!(is_available(&store, &["av-expired"], &travelled));
        assert!(!is_available(&store, &["av-dated"], &travelled));
    }

    #[test]
    fn unparseable_dates_are_ignored() {
        let store = fixture_store();
        assert!(is_available(&store, &["av-garbled"], &ctx("standard", "", "")));
    }

    fn dimension_value() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["premium", "standard", "kids", "pc", "tv", "europe", "asia"])
            .prop_map(str::to_string)
    }

    proptest! {
        #[test]
        fn property_axis_match_is_or_across_values(
            requested in prop::collection::vec(dimension_value(), 0..4),
            available in prop::collection::vec(dimension_value(), 0..4),
        ) {
            let expected = requested.is_empty()
                || requested
                    .iter()
                    .any(|wanted| axis_matches(std::slice::from_ref(wanted), &available));
            prop_assert_eq!(axis_matches(&requested, &available), expected);
        }

        #[test]
        fn property_record_grant_is_and_across_axes(
            customers in prop::collection::vec(dimension_value(), 0..3),
            devices in prop::collection::vec(dimension_value(), 0..3),
            regions in prop::collection::vec(dimension_value(), 0..3),
        ) {
            let store = fixture_store();
            let Some(record) = store.availability.get("av-default") else {
                panic!("fixture availability av-default missing");
            };
            let dimensions = RequestedDimensions {
                customer_types: customers.clone(),
                device_types: devices.clone(),
                regions: regions.clone(),
            };
            let per_axis = [
                (DimensionAxis::CustomerTypes, customers),
                (DimensionAxis::DeviceTypes, devices),
                (DimensionAxis::Regions, regions),
            ]
            .into_iter()
            .all(|(axis, requested)| {
                let only = |wanted: DimensionAxis| {
                    if axis == wanted { requested.clone() } else { Vec::new() }
                };
                let single = RequestedDimensions {
                    customer_types: only(DimensionAxis::CustomerTypes),
                    device_types: only(DimensionAxis::DeviceTypes),
                    regions: only(DimensionAxis::Regions),
                };
                record_grants(&store, record, &single, fixture_context().as_of)
            });
            let combined = record_grants(&store, record, &dimensions, fixture_context().as_of);
            prop_assert_eq!(combined, per_axis);
        }
    }
}
