use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::catalog::{Coordinates, TestCenter, TestType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationOption {
    #[default]
    MeetAtCenter,
    Pickup,
}

/// A paid add-on is a single choice, never a combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddOnSelection {
    #[default]
    None,
    MockTest,
    DrivingLesson,
}

/// Complimentary lesson earned from the pickup distance. Derived from the
/// draft, never stored on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreeLessonTier {
    #[default]
    None,
    ThirtyMinLesson,
    OneHourLesson,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupInfo {
    pub address: String,
    pub coordinates: Coordinates,
    pub distance_km: f64,
}

/// Date and time as the user entered them. They are only combined into an
/// absolute timestamp at submission.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Schedule {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDetails {
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

/// Upload result handed back by the upload endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRef {
    pub url: String,
    pub original_name: String,
    pub filename: String,
    pub size: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentRefs {
    pub road_test: Option<FileRef>,
    pub license: Option<FileRef>,
}

impl DocumentRefs {
    pub fn complete(&self) -> bool {
        self.road_test.is_some() && self.license.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedCoupon {
    pub code: String,
    pub discount_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Error {
        message: String,
    },
    Succeeded,
}

/// The wizard's working state. One document per user, shallow-merged on every
/// update and reset after a successful submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDraft {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub test_type: Option<TestType>,
    pub test_center: Option<TestCenter>,
    pub schedule: Option<Schedule>,
    pub user_details: Option<UserDetails>,
    pub location_option: LocationOption,
    pub pickup_info: Option<PickupInfo>,
    pub add_on: AddOnSelection,
    pub documents: DocumentRefs,
    pub coupon: Option<AppliedCoupon>,
    pub submission_status: SubmissionStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial update applied over the stored draft. Absent fields leave the
/// stored value alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftUpdate {
    pub test_type: Option<TestType>,
    pub test_center: Option<TestCenter>,
    pub schedule: Option<Schedule>,
    pub user_details: Option<UserDetails>,
    pub location_option: Option<LocationOption>,
    pub pickup_info: Option<PickupInfo>,
    pub add_on: Option<AddOnSelection>,
    pub documents: Option<DocumentRefs>,
    pub coupon: Option<AppliedCoupon>,
    pub remove_coupon: Option<bool>,
}

impl BookingDraft {
    pub fn empty(user_id: ObjectId) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            user_id,
            test_type: None,
            test_center: None,
            schedule: None,
            user_details: None,
            location_option: LocationOption::default(),
            pickup_info: None,
            add_on: AddOnSelection::default(),
            documents: DocumentRefs::default(),
            coupon: None,
            submission_status: SubmissionStatus::default(),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Pickup distance in effect. Zero when meeting at the center.
    pub fn distance_km(&self) -> f64 {
        match self.location_option {
            LocationOption::MeetAtCenter => 0.0,
            LocationOption::Pickup => self
                .pickup_info
                .as_ref()
                .map(|p| p.distance_km)
                .unwrap_or(0.0),
        }
    }

    /// Shallow merge. Switching back to meet-at-center drops the pickup
    /// details along with everything derived from them.
    pub fn apply(&mut self, update: DraftUpdate) {
        if let Some(test_type) = update.test_type {
            self.test_type = Some(test_type);
        }
        if let Some(test_center) = update.test_center {
            self.test_center = Some(test_center);
        }
        if let Some(schedule) = update.schedule {
            self.schedule = Some(schedule);
        }
        if let Some(user_details) = update.user_details {
            self.user_details = Some(user_details);
        }
        if let Some(pickup_info) = update.pickup_info {
            self.pickup_info = Some(pickup_info);
        }
        if let Some(option) = update.location_option {
            self.location_option = option;
            if option == LocationOption::MeetAtCenter {
                self.pickup_info = None;
            }
        }
        if let Some(add_on) = update.add_on {
            self.add_on = add_on;
        }
        if let Some(documents) = update.documents {
            self.documents = documents;
        }
        if let Some(coupon) = update.coupon {
            self.coupon = Some(coupon);
        }
        if update.remove_coupon.unwrap_or(false) {
            self.coupon = None;
        }
        self.updated_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pickup_update() -> DraftUpdate {
        DraftUpdate {
            location_option: Some(LocationOption::Pickup),
            pickup_info: Some(PickupInfo {
                address: "100 Queen St W, Toronto".to_string(),
                coordinates: Coordinates {
                    lat: 43.653,
                    lng: -79.384,
                },
                distance_km: 62.0,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn merge_keeps_unrelated_fields() {
        let mut draft = BookingDraft::empty(ObjectId::new());
        draft.apply(DraftUpdate {
            test_type: Some(TestType::G2),
            ..Default::default()
        });
        draft.apply(pickup_update());

        assert_eq!(draft.test_type, Some(TestType::G2));
        assert_eq!(draft.location_option, LocationOption::Pickup);
        assert_eq!(draft.distance_km(), 62.0);
    }

    #[test]
    fn meet_at_center_clears_pickup_info() {
        let mut draft = BookingDraft::empty(ObjectId::new());
        draft.apply(pickup_update());
        assert!(draft.pickup_info.is_some());

        draft.apply(DraftUpdate {
            location_option: Some(LocationOption::MeetAtCenter),
            ..Default::default()
        });
        assert!(draft.pickup_info.is_none());
        assert_eq!(draft.distance_km(), 0.0);
    }

    #[test]
    fn remove_coupon_wins_over_stored_coupon() {
        let mut draft = BookingDraft::empty(ObjectId::new());
        draft.apply(DraftUpdate {
            coupon: Some(AppliedCoupon {
                code: "WELCOME10".to_string(),
                discount_cents: 1000,
            }),
            ..Default::default()
        });
        draft.apply(DraftUpdate {
            remove_coupon: Some(true),
            ..Default::default()
        });
        assert!(draft.coupon.is_none());
    }
}
