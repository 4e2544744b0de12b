use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use log::{info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::client::{ScheduleService, ServiceOutcome};
use crate::data::{Day, UnitId, UnitKind};
use crate::error::Error;
use crate::page::{EDITS_MARKER, render_page};
use crate::session::{self, FormState, Outcome, SessionState, SubmitGate};
use crate::time_window::HourMinute;

pub const DOCUMENT_FILE_NAME: &str = "planning.pdf";

type FormFields = Vec<(String, String)>;

/// State shared by every handler: the session, its submit gate and the
/// service the session submits to.
pub struct AppState<S> {
    pub session: Arc<Mutex<SessionState>>,
    pub gate: SubmitGate,
    pub service: Arc<S>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            gate: self.gate.clone(),
            service: Arc::clone(&self.service),
        }
    }
}

impl<S> AppState<S> {
    pub fn new(service: S) -> Self {
        Self {
            session: Arc::new(Mutex::new(SessionState::default())),
            gate: SubmitGate::new(),
            service: Arc::new(service),
        }
    }
}

pub fn router<S>(state: AppState<S>) -> Router
where
    S: ScheduleService + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(index_handler::<S>))
        .route("/health", get(|| async { "ok" }))
        .route("/units/:kind/add", post(add_unit_handler::<S>))
        .route("/units/:kind/:id/remove", post(remove_unit_handler::<S>))
        .route("/submit", post(submit_handler::<S>))
        .with_state(state)
}

pub async fn run_server<S>(bind: SocketAddr, state: AppState<S>) -> std::io::Result<()>
where
    S: ScheduleService + Send + Sync + 'static,
{
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Server running at http://{}", listener.local_addr()?);
    axum::serve(listener, app).await
}

async fn index_handler<S>(State(state): State<AppState<S>>) -> Html<String> {
    let session = state.session.lock().await;
    Html(render_page(&session, state.gate.is_busy()))
}

async fn add_unit_handler<S>(
    State(state): State<AppState<S>>,
    Path(kind): Path<UnitKind>,
    Form(fields): Form<FormFields>,
) -> Redirect {
    let mut session = state.session.lock().await;
    apply_edits(&mut session.form, &fields);
    session.form.units.add(kind);
    Redirect::to("/")
}

async fn remove_unit_handler<S>(
    State(state): State<AppState<S>>,
    Path((kind, id)): Path<(UnitKind, UnitId)>,
    Form(fields): Form<FormFields>,
) -> Redirect {
    let mut session = state.session.lock().await;
    apply_edits(&mut session.form, &fields);
    session.form.units.remove(kind, id);
    Redirect::to("/")
}

async fn submit_handler<S>(
    State(state): State<AppState<S>>,
    Form(fields): Form<FormFields>,
) -> Response
where
    S: ScheduleService + Send + Sync + 'static,
{
    let form = {
        let mut session = state.session.lock().await;
        apply_edits(&mut session.form, &fields);
        session.form.clone()
    };

    let result = session::submit(&state.gate, &form, state.service.as_ref()).await;

    let mut session = state.session.lock().await;
    match result {
        Ok((payload, ServiceOutcome::Schedule(schedule))) => {
            session.last_outcome = Some(Outcome::Schedule {
                window: payload.time_window(),
                result: schedule,
                requested: payload.class_loads,
            });
            Html(render_page(&session, state.gate.is_busy())).into_response()
        }
        Ok((_, ServiceOutcome::Document { content_type, bytes })) => {
            session.last_outcome = Some(Outcome::DocumentDelivered {
                file_name: DOCUMENT_FILE_NAME.to_string(),
                bytes: bytes.len(),
            });
            let content_type = if content_type.is_empty() {
                "application/pdf".to_string()
            } else {
                content_type
            };
            (
                [
                    (header::CONTENT_TYPE, content_type),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", DOCUMENT_FILE_NAME),
                    ),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) => {
            session.last_outcome = Some(Outcome::from_error(&e));
            (status_for(&e), Html(render_page(&session, state.gate.is_busy()))).into_response()
        }
    }
}

fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::SubmissionInProgress => StatusCode::CONFLICT,
        Error::Network(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
        Error::Network(_)
        | Error::Http { .. }
        | Error::Service(_)
        | Error::Decode(_)
        | Error::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
    }
}

/// Copies the posted field values into the form state.
///
/// Only requests carrying the edits marker are applied, since unchecked
/// boxes send nothing and would otherwise read as "all cleared".
pub fn apply_edits(form: &mut FormState, fields: &[(String, String)]) {
    if !fields.iter().any(|(name, _)| name == EDITS_MARKER) {
        return;
    }

    let value_of = |name: &str| {
        fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    };
    let number = |name: &str| value_of(name).and_then(|value| value.trim().parse::<u8>().ok());

    if let (Some(hour), Some(minute)) = (number("startHour"), number("startMinute")) {
        form.time.start = HourMinute::new(hour, minute);
    }
    if let (Some(hour), Some(minute)) = (number("endHour"), number("endMinute")) {
        form.time.end = HourMinute::new(hour, minute);
    }

    form.days = fields
        .iter()
        .filter(|(name, _)| name == "day")
        .filter_map(|(_, value)| {
            let day = Day::from_label(value);
            if day.is_none() {
                warn!("Ignoring unknown day '{}'", value);
            }
            day
        })
        .collect();

    for id in form.units.ids(UnitKind::Teacher) {
        let key = format!("teacher-{}-subject", id);
        let subjects: Vec<String> = fields
            .iter()
            .filter(|(name, value)| *name == key && !value.trim().is_empty())
            .map(|(_, value)| value.clone())
            .collect();
        if let Some(teacher) = form.units.teacher_mut(id) {
            teacher.subjects = subjects;
        }
    }

    for id in form.units.ids(UnitKind::Class) {
        let headcount = value_of(&format!("class-{}-headcount", id)).map(str::to_string);
        let weekly_hours = value_of(&format!("class-{}-hours", id)).map(str::to_string);
        if let Some(class) = form.units.class_mut(id) {
            class.headcount = headcount;
            class.weekly_hours = weekly_hours;
        }
    }

    for id in form.units.ids(UnitKind::Room) {
        let capacity = value_of(&format!("room-{}-capacity", id)).map(str::to_string);
        if let Some(room) = form.units.room_mut(id) {
            room.capacity = capacity;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> FormFields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn edits_are_applied_to_live_units_only() {
        let mut form = FormState::default();
        form.units.add(UnitKind::Teacher);
        form.units.add(UnitKind::Class);

        apply_edits(
            &mut form,
            &fields(&[
                (EDITS_MARKER, "1"),
                ("startHour", "9"),
                ("startMinute", "30"),
                ("endHour", "16"),
                ("endMinute", "45"),
                ("day", "Mardi"),
                ("day", "Jeudi"),
                ("teacher-1-subject", "Anglais"),
                ("teacher-1-subject", "Musique"),
                ("teacher-2-subject", "Sport"),
                ("class-1-headcount", "abc"),
                ("class-1-hours", "20"),
            ]),
        );

        assert_eq!(form.time.start, HourMinute::new(9, 30));
        assert_eq!(form.time.end, HourMinute::new(16, 45));
        let days: Vec<Day> = form.days.iter().copied().collect();
        assert_eq!(days, vec![Day::Tuesday, Day::Thursday]);
        let teacher = form.units.teachers().iter().next().unwrap();
        assert_eq!(teacher.subjects, vec!["Anglais", "Musique"]);
        let class = form.units.classes().iter().next().unwrap();
        assert_eq!(class.headcount.as_deref(), Some("abc"));
        assert_eq!(class.weekly_hours.as_deref(), Some("20"));
        assert_eq!(form.units.count(UnitKind::Teacher), 1);
    }

    #[test]
    fn requests_without_marker_leave_the_form_alone() {
        let mut form = FormState::default();
        apply_edits(&mut form, &fields(&[("day", "Dimanche")]));
        assert_eq!(form, FormState::default());
    }

    #[test]
    fn marker_with_no_days_clears_the_selection() {
        let mut form = FormState::default();
        apply_edits(&mut form, &fields(&[(EDITS_MARKER, "1")]));
        assert!(form.days.is_empty());
    }
}
