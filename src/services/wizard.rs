use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use crate::models::draft::BookingDraft;

/// Minimum gap between submission and the test itself.
pub const MIN_LEAD_TIME_DAYS: i64 = 2;

/// The four wizard screens, in order. The guard only ever sends users
/// backward; moving forward is just navigating to the next path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    RoadTestDetails,
    BookingDetails,
    TestDetails,
    Payment,
}

impl WizardStep {
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::RoadTestDetails => 1,
            WizardStep::BookingDetails => 2,
            WizardStep::TestDetails => 3,
            WizardStep::Payment => 4,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            WizardStep::RoadTestDetails => "/book/road-test-details",
            WizardStep::BookingDetails => "/book/booking-details",
            WizardStep::TestDetails => "/book/test-details",
            WizardStep::Payment => "/book/payment",
        }
    }

    /// Whether this step's own inputs have all been captured.
    pub fn complete(&self, draft: &BookingDraft) -> bool {
        match self {
            WizardStep::RoadTestDetails => {
                draft.test_type.is_some()
                    && draft.test_center.is_some()
                    && draft.schedule.is_some()
            }
            WizardStep::BookingDetails => draft.user_details.is_some(),
            WizardStep::TestDetails => draft.documents.complete(),
            WizardStep::Payment => false,
        }
    }
}

const STEP_ORDER: [WizardStep; 4] = [
    WizardStep::RoadTestDetails,
    WizardStep::BookingDetails,
    WizardStep::TestDetails,
    WizardStep::Payment,
];

/// A step may be entered once every step before it is complete.
pub fn step_ready(draft: &BookingDraft, step: WizardStep) -> bool {
    STEP_ORDER
        .iter()
        .take_while(|s| **s < step)
        .all(|s| s.complete(draft))
}

/// The step the user actually belongs on: the first one whose inputs are
/// still missing.
pub fn current_step(draft: &BookingDraft) -> WizardStep {
    for step in STEP_ORDER {
        if !step.complete(draft) {
            return step;
        }
    }
    WizardStep::Payment
}

/// Terminal precondition before the draft is turned into a booking request.
/// Returns every problem at once so the user sees the full list.
pub fn validate_for_submission(draft: &BookingDraft) -> Vec<String> {
    let mut errors = Vec::new();

    if draft.test_type.is_none() {
        errors.push("Please choose a road test type (G2 or G).".to_string());
    }
    if draft.test_center.is_none() {
        errors.push("Please choose a test center.".to_string());
    }
    if draft.schedule.is_none() {
        errors.push("Please choose a test date and time.".to_string());
    }
    if draft.user_details.is_none() {
        errors.push("Please provide your name, email and phone number.".to_string());
    }
    if draft.documents.road_test.is_none() {
        errors.push("Please upload your road test confirmation document.".to_string());
    }
    if draft.documents.license.is_none() {
        errors.push("Please upload a photo of your driver's licence.".to_string());
    }

    errors
}

/// Combine the user-entered date and time into a UTC timestamp, enforcing
/// the minimum lead time. Called only after `validate_for_submission`.
pub fn combined_test_datetime(
    draft: &BookingDraft,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, String> {
    let schedule = draft
        .schedule
        .as_ref()
        .ok_or_else(|| "Please choose a test date and time.".to_string())?;

    let naive = NaiveDateTime::new(schedule.date, schedule.time);
    let scheduled_at = DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc);

    if scheduled_at < now + Duration::days(MIN_LEAD_TIME_DAYS) {
        return Err(format!(
            "Test bookings must be made at least {} days in advance.",
            MIN_LEAD_TIME_DAYS
        ));
    }

    Ok(scheduled_at)
}
