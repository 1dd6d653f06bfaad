use serde::{Deserialize, Serialize};

use crate::models::catalog::TestType;
use crate::models::draft::{AddOnSelection, BookingDraft, FreeLessonTier};

// Per-km pickup rates in cents. The first 50 km bill at the full rate, the
// excess at the reduced one.
const PICKUP_RATE_NEAR: f64 = 100.0;
const PICKUP_RATE_FAR: f64 = 50.0;
const PICKUP_NEAR_LIMIT_KM: f64 = 50.0;

// Distance thresholds for the complimentary lesson. The one-hour tier
// supersedes the thirty-minute one, it never stacks.
const FREE_THIRTY_MIN_KM: f64 = 50.0;
const FREE_ONE_HOUR_KM: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub base_price: i64,
    pub pickup_price: i64,
    pub add_on_price: i64,
    pub discount: i64,
    pub total: i64,
    pub free_lesson: FreeLessonTier,
    pub free_drop_off: bool,
}

pub struct PricingService;

impl PricingService {
    /// Tiered pickup charge in cents. Zero distance means meeting at the
    /// center.
    pub fn pickup_price(distance_km: f64) -> i64 {
        if distance_km <= 0.0 {
            return 0;
        }
        let price = if distance_km <= PICKUP_NEAR_LIMIT_KM {
            distance_km * PICKUP_RATE_NEAR
        } else {
            PICKUP_NEAR_LIMIT_KM * PICKUP_RATE_NEAR
                + (distance_km - PICKUP_NEAR_LIMIT_KM) * PICKUP_RATE_FAR
        };
        price.round() as i64
    }

    pub fn free_lesson_tier(distance_km: f64) -> FreeLessonTier {
        if distance_km >= FREE_ONE_HOUR_KM {
            FreeLessonTier::OneHourLesson
        } else if distance_km >= FREE_THIRTY_MIN_KM {
            FreeLessonTier::ThirtyMinLesson
        } else {
            FreeLessonTier::None
        }
    }

    /// Drop-off is free once the pickup distance earns any lesson tier.
    pub fn free_drop_off(distance_km: f64) -> bool {
        distance_km >= FREE_THIRTY_MIN_KM
    }

    /// Full listed price of an add-on, in cents.
    pub fn add_on_list_price(test_type: TestType, add_on: AddOnSelection) -> i64 {
        match (test_type, add_on) {
            (_, AddOnSelection::None) => 0,
            (TestType::G2, AddOnSelection::MockTest) => 5499,
            (TestType::G, AddOnSelection::MockTest) => 6499,
            (_, AddOnSelection::DrivingLesson) => 4999,
        }
    }

    /// What the selected add-on actually charges. With a free lesson in
    /// effect only the fixed upgrade delta is billed; taking the lesson the
    /// tier already grants costs nothing.
    pub fn add_on_price(
        test_type: TestType,
        free_lesson: FreeLessonTier,
        add_on: AddOnSelection,
    ) -> i64 {
        match (free_lesson, add_on) {
            (_, AddOnSelection::None) => 0,
            (FreeLessonTier::None, selected) => Self::add_on_list_price(test_type, selected),
            (FreeLessonTier::ThirtyMinLesson, AddOnSelection::MockTest) => match test_type {
                TestType::G2 => 2999,
                TestType::G => 3999,
            },
            (FreeLessonTier::ThirtyMinLesson, AddOnSelection::DrivingLesson) => match test_type {
                TestType::G2 => 2499,
                TestType::G => 2999,
            },
            (FreeLessonTier::OneHourLesson, AddOnSelection::MockTest) => match test_type {
                TestType::G2 => 500,
                TestType::G => 1000,
            },
            (FreeLessonTier::OneHourLesson, AddOnSelection::DrivingLesson) => 0,
        }
    }

    /// Full breakdown over the draft. Missing inputs price as zero, they do
    /// not error.
    pub fn breakdown(draft: &BookingDraft) -> PriceBreakdown {
        let base_price = draft
            .test_center
            .as_ref()
            .map(|c| c.base_price)
            .unwrap_or(0);

        let distance_km = draft.distance_km();
        let pickup_price = Self::pickup_price(distance_km);
        let free_lesson = Self::free_lesson_tier(distance_km);
        let free_drop_off = Self::free_drop_off(distance_km);

        let add_on_price = match draft.test_type {
            Some(test_type) => Self::add_on_price(test_type, free_lesson, draft.add_on),
            None => 0,
        };

        let discount = draft
            .coupon
            .as_ref()
            .map(|c| c.discount_cents.max(0))
            .unwrap_or(0);

        let subtotal = base_price + pickup_price + add_on_price;
        let total = (subtotal - discount).max(0);

        PriceBreakdown {
            base_price,
            pickup_price,
            add_on_price,
            discount,
            total,
            free_lesson,
            free_drop_off,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::{Coordinates, TestCenter};
    use crate::models::draft::{AppliedCoupon, DraftUpdate, LocationOption, PickupInfo};
    use mongodb::bson::oid::ObjectId;

    fn center(base_price: i64) -> TestCenter {
        TestCenter {
            id: Some(ObjectId::new()),
            name: "Downsview DriveTest".to_string(),
            address: "37 Carl Hall Rd, Toronto".to_string(),
            coordinates: Coordinates {
                lat: 43.742,
                lng: -79.477,
            },
            base_price,
            created_at: None,
            updated_at: None,
        }
    }

    fn draft_with_pickup(distance_km: f64) -> BookingDraft {
        let mut draft = BookingDraft::empty(ObjectId::new());
        draft.apply(DraftUpdate {
            test_type: Some(TestType::G2),
            test_center: Some(center(8000)),
            location_option: Some(LocationOption::Pickup),
            pickup_info: Some(PickupInfo {
                address: "1 Yonge St, Toronto".to_string(),
                coordinates: Coordinates {
                    lat: 43.643,
                    lng: -79.371,
                },
                distance_km,
            }),
            ..Default::default()
        });
        draft
    }

    #[test]
    fn pickup_price_tiers() {
        assert_eq!(PricingService::pickup_price(0.0), 0);
        assert_eq!(PricingService::pickup_price(10.0), 1000);
        assert_eq!(PricingService::pickup_price(50.0), 5000);
        // 50 * 100 + 25 * 50
        assert_eq!(PricingService::pickup_price(75.0), 6250);
        assert_eq!(PricingService::pickup_price(100.0), 7500);
    }

    #[test]
    fn pickup_price_is_monotonic() {
        let mut last = 0;
        for d in 0..200 {
            let price = PricingService::pickup_price(d as f64);
            assert!(price >= last, "price dropped at {} km", d);
            last = price;
        }
    }

    #[test]
    fn free_lesson_brackets() {
        assert_eq!(PricingService::free_lesson_tier(0.0), FreeLessonTier::None);
        assert_eq!(PricingService::free_lesson_tier(49.9), FreeLessonTier::None);
        assert_eq!(
            PricingService::free_lesson_tier(50.0),
            FreeLessonTier::ThirtyMinLesson
        );
        assert_eq!(
            PricingService::free_lesson_tier(99.9),
            FreeLessonTier::ThirtyMinLesson
        );
        // The one-hour tier replaces the thirty-minute one
        assert_eq!(
            PricingService::free_lesson_tier(100.0),
            FreeLessonTier::OneHourLesson
        );
        assert_eq!(
            PricingService::free_lesson_tier(250.0),
            FreeLessonTier::OneHourLesson
        );
    }

    #[test]
    fn upgrade_charges_delta_not_full_price() {
        let price = PricingService::add_on_price(
            TestType::G2,
            FreeLessonTier::ThirtyMinLesson,
            AddOnSelection::MockTest,
        );
        assert_eq!(price, 2999);
        assert_ne!(
            price,
            PricingService::add_on_list_price(TestType::G2, AddOnSelection::MockTest)
        );
    }

    #[test]
    fn free_tier_lesson_costs_nothing() {
        assert_eq!(
            PricingService::add_on_price(
                TestType::G2,
                FreeLessonTier::OneHourLesson,
                AddOnSelection::DrivingLesson
            ),
            0
        );
    }

    #[test]
    fn no_free_tier_charges_list_price() {
        assert_eq!(
            PricingService::add_on_price(
                TestType::G,
                FreeLessonTier::None,
                AddOnSelection::MockTest
            ),
            6499
        );
    }

    #[test]
    fn meet_at_center_breakdown() {
        let mut draft = BookingDraft::empty(ObjectId::new());
        draft.apply(DraftUpdate {
            test_type: Some(TestType::G2),
            test_center: Some(center(8000)),
            ..Default::default()
        });

        let breakdown = PricingService::breakdown(&draft);
        assert_eq!(breakdown.base_price, 8000);
        assert_eq!(breakdown.pickup_price, 0);
        assert_eq!(breakdown.add_on_price, 0);
        assert_eq!(breakdown.discount, 0);
        assert_eq!(breakdown.total, 8000);
        assert_eq!(breakdown.free_lesson, FreeLessonTier::None);
        assert!(!breakdown.free_drop_off);
    }

    #[test]
    fn seventy_five_km_pickup_breakdown() {
        let draft = draft_with_pickup(75.0);
        let breakdown = PricingService::breakdown(&draft);
        assert_eq!(breakdown.pickup_price, 6250);
        assert_eq!(breakdown.free_lesson, FreeLessonTier::ThirtyMinLesson);
        assert!(breakdown.free_drop_off);
        assert_eq!(breakdown.total, 8000 + 6250);
    }

    #[test]
    fn coupon_subtracts_flat_amount() {
        let mut draft = BookingDraft::empty(ObjectId::new());
        draft.apply(DraftUpdate {
            test_type: Some(TestType::G2),
            test_center: Some(center(8000)),
            coupon: Some(AppliedCoupon {
                code: "WELCOME10".to_string(),
                discount_cents: 1000,
            }),
            ..Default::default()
        });

        let breakdown = PricingService::breakdown(&draft);
        assert_eq!(breakdown.discount, 1000);
        assert_eq!(breakdown.total, 7000);
    }

    #[test]
    fn total_never_goes_negative() {
        let mut draft = BookingDraft::empty(ObjectId::new());
        draft.apply(DraftUpdate {
            test_type: Some(TestType::G2),
            test_center: Some(center(2000)),
            coupon: Some(AppliedCoupon {
                code: "EVERYTHING".to_string(),
                discount_cents: 999_999,
            }),
            ..Default::default()
        });

        assert_eq!(PricingService::breakdown(&draft).total, 0);
    }

    #[test]
    fn switching_back_to_center_drops_distance_pricing() {
        let mut draft = draft_with_pickup(120.0);
        let before = PricingService::breakdown(&draft);
        assert_eq!(before.free_lesson, FreeLessonTier::OneHourLesson);
        assert!(before.pickup_price > 0);

        draft.apply(DraftUpdate {
            location_option: Some(LocationOption::MeetAtCenter),
            ..Default::default()
        });
        let after = PricingService::breakdown(&draft);
        assert_eq!(after.pickup_price, 0);
        assert_eq!(after.free_lesson, FreeLessonTier::None);
        assert!(!after.free_drop_off);
    }

    #[test]
    fn empty_draft_prices_to_zero() {
        let draft = BookingDraft::empty(ObjectId::new());
        let breakdown = PricingService::breakdown(&draft);
        assert_eq!(breakdown.total, 0);
    }
}
