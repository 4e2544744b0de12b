use crate::assembler;
use crate::client::{ScheduleService, ServiceOutcome};
use crate::data::{
    ClassGroup, ClassLoad, Day, Room, ScheduleResult, SubmissionPayload, Teacher, TimeWindow,
};
use crate::error::{Error, Result};
use crate::registry::UnitRegistry;
use crate::time_window::TimeWindowSelection;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Everything the user has entered so far.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub time: TimeWindowSelection,
    pub days: BTreeSet<Day>,
    pub units: UnitRegistry,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            time: TimeWindowSelection::default(),
            days: Day::WORKWEEK.into_iter().collect(),
            units: UnitRegistry::new(),
        }
    }
}

/// On-disk form, as read by the `submit` command.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedForm {
    #[serde(default)]
    pub time: TimeWindowSelection,
    #[serde(default = "default_days")]
    pub days: Vec<Day>,
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    #[serde(default)]
    pub classes: Vec<ClassGroup>,
    #[serde(default)]
    pub rooms: Vec<Room>,
}

fn default_days() -> Vec<Day> {
    Day::WORKWEEK.to_vec()
}

impl From<SavedForm> for FormState {
    fn from(saved: SavedForm) -> Self {
        FormState {
            time: saved.time,
            days: saved.days.into_iter().collect(),
            units: UnitRegistry::from_units(saved.teachers, saved.classes, saved.rooms),
        }
    }
}

/// What the result panel currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Schedule {
        window: TimeWindow,
        result: ScheduleResult,
        requested: Vec<ClassLoad>,
    },
    DocumentDelivered {
        file_name: String,
        bytes: usize,
    },
    Failed {
        kind: &'static str,
        message: String,
    },
}

impl Outcome {
    pub fn from_error(err: &Error) -> Self {
        Outcome::Failed {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Per-browser-session state owned by the view controller.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub form: FormState,
    pub last_outcome: Option<Outcome>,
}

/// Allows one submission in flight at a time.
#[derive(Debug, Clone, Default)]
pub struct SubmitGate {
    busy: Arc<AtomicBool>,
}

impl SubmitGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disables submission until the returned guard is dropped.
    pub fn try_acquire(&self) -> Option<SubmitGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmitGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Re-enables submission on drop, whatever the exit path.
#[derive(Debug)]
pub struct SubmitGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Validates the form and sends it, holding the gate for the whole exchange.
///
/// Validation failures are raised before the service is touched.
pub async fn submit<S: ScheduleService>(
    gate: &SubmitGate,
    form: &FormState,
    service: &S,
) -> Result<(SubmissionPayload, ServiceOutcome)> {
    let Some(_guard) = gate.try_acquire() else {
        warn!("Rejected submission: another one is still in flight");
        return Err(Error::SubmissionInProgress);
    };

    let payload = assembler::assemble(form).inspect_err(|e| {
        warn!("Submission rejected: {}", e);
    })?;

    info!(
        "Submitting {} teachers, {} classes, {} rooms over {} days",
        payload.teacher_count,
        payload.class_count,
        payload.room_count,
        payload.active_days.len()
    );

    match service.submit(&payload).await {
        Ok(outcome) => Ok((payload, outcome)),
        Err(e) => {
            match std::error::Error::source(&e) {
                Some(cause) => error!("Submission failed ({}): {}: {}", e.kind(), e, cause),
                None => error!("Submission failed ({}): {}", e.kind(), e),
            }
            Err(e)
        }
    }
}
