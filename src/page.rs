//! Markup for the form page. Field names here are the contract with
//! `server::apply_edits`.

use crate::data::{
    CAPACITY_RANGE, Day, HEADCOUNT_RANGE, SUBJECT_CATALOGUE, UnitKind, WEEKLY_HOURS_RANGE,
};
use crate::presenter::{escape_html, render_outcome};
use crate::registry::UnitRegistry;
use crate::session::SessionState;
use crate::time_window::{HourMinute, MAX_HOUR, MIN_HOUR, MINUTE_STEPS};

pub const EDITS_MARKER: &str = "edits";

pub fn render_page(session: &SessionState, busy: bool) -> String {
    let form = &session.form;
    let mut html = String::new();
    html.push_str(
        "<!DOCTYPE html>\n<html lang=\"fr\">\n\
         <head><meta charset=\"utf-8\"><title>EduFlex</title></head>\n<body>\n",
    );
    html.push_str(
        "<h1>EduFlex</h1>\n<form id=\"planningForm\" method=\"post\" action=\"/submit\">\n",
    );
    html.push_str(&format!(
        "<input type=\"hidden\" name=\"{}\" value=\"1\">\n",
        EDITS_MARKER
    ));

    html.push_str("<fieldset id=\"time-window\"><legend>School day</legend>\n");
    render_time_select(&mut html, "start", form.time.start);
    render_time_select(&mut html, "end", form.time.end);
    html.push_str("</fieldset>\n");

    html.push_str("<fieldset id=\"days\"><legend>Working days</legend>\n");
    for day in Day::ALL {
        let checked = if form.days.contains(&day) { " checked" } else { "" };
        html.push_str(&format!(
            "<label><input type=\"checkbox\" name=\"day\" value=\"{day}\"{checked}> {day}</label>\n"
        ));
    }
    html.push_str("</fieldset>\n");

    render_units(&mut html, &form.units);

    let disabled = if busy { " disabled" } else { "" };
    html.push_str(&format!(
        "<button type=\"submit\" class=\"generate-button\"{}>Generate timetable</button>\n",
        disabled
    ));
    html.push_str("</form>\n<div id=\"results-container\">\n");
    if let Some(outcome) = &session.last_outcome {
        html.push_str(&render_outcome(outcome));
    }
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn render_time_select(html: &mut String, prefix: &str, selected: HourMinute) {
    html.push_str(&format!("<select name=\"{prefix}Hour\">"));
    for hour in MIN_HOUR..=MAX_HOUR {
        let mark = if hour == selected.hour { " selected" } else { "" };
        html.push_str(&format!("<option value=\"{hour}\"{mark}>{hour:02}</option>"));
    }
    html.push_str(&format!("</select>:<select name=\"{prefix}Minute\">"));
    for minute in MINUTE_STEPS {
        let mark = if minute == selected.minute { " selected" } else { "" };
        html.push_str(&format!("<option value=\"{minute}\"{mark}>{minute:02}</option>"));
    }
    html.push_str("</select>\n");
}

fn render_units(html: &mut String, units: &UnitRegistry) {
    let counts = units.counts();

    html.push_str("<fieldset id=\"teachers\"><legend>Teachers</legend>\n");
    hidden_count(html, "nbProfs", counts.teachers);
    for teacher in units.teachers().iter() {
        card_header(html, UnitKind::Teacher, teacher.id, "Teacher");
        for subject in SUBJECT_CATALOGUE {
            let ticked = teacher.subjects.iter().any(|s| s == subject);
            let checked = if ticked { " checked" } else { "" };
            html.push_str(&format!(
                "<label><input type=\"checkbox\" name=\"teacher-{}-subject\" value=\"{}\"{}> \
                 {}</label>\n",
                teacher.id,
                escape_html(subject),
                checked,
                escape_html(subject)
            ));
        }
        html.push_str("</div>\n");
    }
    add_button(html, UnitKind::Teacher, "Add a teacher");
    html.push_str("</fieldset>\n");

    html.push_str("<fieldset id=\"classes\"><legend>Classes</legend>\n");
    hidden_count(html, "nbClasses", counts.classes);
    for class in units.classes().iter() {
        card_header(html, UnitKind::Class, class.id, "Class");
        number_input(
            html,
            &format!("class-{}-headcount", class.id),
            "Headcount",
            HEADCOUNT_RANGE,
            class.headcount.as_deref(),
        );
        number_input(
            html,
            &format!("class-{}-hours", class.id),
            "Hours per week",
            WEEKLY_HOURS_RANGE,
            class.weekly_hours.as_deref(),
        );
        html.push_str("</div>\n");
    }
    add_button(html, UnitKind::Class, "Add a class");
    html.push_str("</fieldset>\n");

    html.push_str("<fieldset id=\"rooms\"><legend>Rooms</legend>\n");
    hidden_count(html, "nbSalles", counts.rooms);
    for room in units.rooms().iter() {
        card_header(html, UnitKind::Room, room.id, "Room");
        number_input(
            html,
            &format!("room-{}-capacity", room.id),
            "Capacity",
            CAPACITY_RANGE,
            room.capacity.as_deref(),
        );
        html.push_str("</div>\n");
    }
    add_button(html, UnitKind::Room, "Add a room");
    html.push_str("</fieldset>\n");
}

fn hidden_count(html: &mut String, id: &str, count: u32) {
    html.push_str(&format!("<input type=\"hidden\" id=\"{id}\" value=\"{count}\">\n"));
}

fn card_header(html: &mut String, kind: UnitKind, id: u32, title: &str) {
    html.push_str(&format!(
        "<div class=\"item-card\" id=\"{kind}-card-{id}\">\n<h3>{title} {id}</h3>\
         <button type=\"submit\" formaction=\"/units/{kind}/{id}/remove\" \
         class=\"delete-button\">&times;</button>\n"
    ));
}

fn add_button(html: &mut String, kind: UnitKind, text: &str) {
    html.push_str(&format!(
        "<button type=\"submit\" formaction=\"/units/{kind}/add\" \
         class=\"add-button\">{text}</button>\n"
    ));
}

fn number_input(
    html: &mut String,
    name: &str,
    label: &str,
    range: (u32, u32),
    value: Option<&str>,
) {
    let (min, max) = range;
    html.push_str(&format!(
        "<label>{label} <input type=\"number\" name=\"{name}\" min=\"{min}\" max=\"{max}\" \
         value=\"{}\"></label>\n",
        escape_html(value.unwrap_or_default())
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_reflects_units_and_defaults() {
        let mut session = SessionState::default();
        session.form.units.add(UnitKind::Teacher);
        session.form.units.add(UnitKind::Room);

        let html = render_page(&session, false);
        assert!(html.contains("id=\"teacher-card-1\""));
        assert!(html.contains("formaction=\"/units/teacher/1/remove\""));
        assert!(html.contains("id=\"nbProfs\" value=\"1\""));
        assert!(html.contains("id=\"nbClasses\" value=\"0\""));
        assert!(html.contains("name=\"room-1-capacity\" min=\"1\" max=\"100\" value=\"30\""));
        assert!(html.contains("<option value=\"8\" selected>08</option>"));
        assert!(html.contains("value=\"Lundi\" checked"));
        assert!(!html.contains("value=\"Samedi\" checked"));
        assert!(!html.contains("generate-button\" disabled"));
    }

    #[test]
    fn busy_page_disables_generate() {
        let html = render_page(&SessionState::default(), true);
        assert!(html.contains("class=\"generate-button\" disabled"));
    }
}
