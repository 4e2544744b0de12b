use crate::data::{ClassLoad, Hours, ScheduleResult, TimeWindow, class_name};
use crate::grid::TimetableGrid;
use crate::session::Outcome;
use crate::time_window::format_hhmm;
use itertools::Itertools;
use std::collections::BTreeMap;

pub const EMPTY_CELL: &str = "-";

/// Escapes text for use inside HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn render_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Schedule {
            window,
            result,
            requested,
        } => render_schedule(*window, result, requested),
        Outcome::DocumentDelivered { file_name, bytes } => {
            render_document_delivered(file_name, *bytes)
        }
        Outcome::Failed { kind, message } => render_error(kind, message),
    }
}

/// The timetable plus per-teacher and per-class statistics. `requested`
/// holds the class loads that were submitted, in class order.
pub fn render_schedule(
    window: TimeWindow,
    result: &ScheduleResult,
    requested: &[ClassLoad],
) -> String {
    let grid = TimetableGrid::build(window.start_hour, window.end_hour, &result.assignments);
    let days = grid.visible_days();

    let mut html = String::new();
    html.push_str("<section class=\"result success\">\n");
    html.push_str(&format!(
        "<h2>Timetable {}-{}</h2>\n",
        format_hhmm(window.start_hour),
        format_hhmm(window.end_hour)
    ));

    if let Some(summary) = &result.summary {
        html.push_str("<ul class=\"summary\">\n");
        for (key, line) in summary {
            html.push_str(&format!(
                "<li><strong>{}</strong>: {}</li>\n",
                escape_html(key),
                escape_html(line)
            ));
        }
        html.push_str("</ul>\n");
    }

    if days.is_empty() {
        html.push_str("<p class=\"notice\">No course could be placed in the selected hours.</p>\n");
    }

    html.push_str("<table class=\"timetable\">\n<thead><tr><th>Time</th>");
    for day in &days {
        html.push_str(&format!("<th>{}</th>", day));
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for slot in grid.slots() {
        html.push_str(&format!("<tr><th>{}</th>", escape_html(&slot.label)));
        for day in &days {
            let cell = grid.cell(*day, &slot.label).unwrap_or_default();
            if cell.is_empty() {
                html.push_str(&format!("<td class=\"empty\">{}</td>", EMPTY_CELL));
                continue;
            }
            let stack = cell
                .iter()
                .map(|course| {
                    format!(
                        "<div class=\"course\"><strong>{}</strong><br>{}<br><em>{}</em></div>",
                        escape_html(&course.class),
                        escape_html(&course.teacher),
                        escape_html(&course.room)
                    )
                })
                .join("<hr>");
            html.push_str(&format!("<td>{}</td>", stack));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");

    if grid.dropped() > 0 {
        html.push_str(&format!(
            "<p class=\"notice\">{} course(s) fell outside the displayed hours.</p>\n",
            grid.dropped()
        ));
    }

    let occupancy = teacher_occupancy(result);
    render_stats(&mut html, "Hours per teacher", &result.hours_per_teacher, |name, hours| {
        let rate = occupancy.get(name).copied().unwrap_or_default();
        format!("{}h ({:.0}% occupied)", hours, rate)
    });

    let requested: BTreeMap<String, Hours> = requested
        .iter()
        .enumerate()
        .map(|(index, load)| (class_name(index), load.weekly_hours))
        .collect();
    render_stats(&mut html, "Hours per class", &result.hours_per_class, |name, hours| {
        match requested.get(name) {
            Some(asked) => format!("{}h scheduled / {}h requested", hours, asked),
            None => format!("{}h scheduled", hours),
        }
    });

    html.push_str(&format!(
        "<p class=\"totals\">{} courses scheduled, {} hours in total.</p>\n",
        result.total_courses, result.total_hours
    ));
    html.push_str("</section>\n");
    html
}

/// Share of an even split of the week's courses that each teacher carries, in
/// percent. Every rate is zero when there are fewer courses than teachers.
pub fn teacher_occupancy(result: &ScheduleResult) -> BTreeMap<String, f64> {
    let teachers = result.hours_per_teacher.len();
    let even_share = if teachers == 0 {
        0
    } else {
        result.assignments.len() / teachers
    };
    result
        .hours_per_teacher
        .iter()
        .map(|(name, &hours)| {
            let rate = if even_share == 0 {
                0.0
            } else {
                f64::from(hours) / even_share as f64 * 100.0
            };
            (name.clone(), rate)
        })
        .collect()
}

fn render_stats<F>(html: &mut String, title: &str, hours: &BTreeMap<String, Hours>, line: F)
where
    F: Fn(&str, Hours) -> String,
{
    html.push_str(&format!("<h3>{}</h3>\n<ul class=\"hours\">\n", title));
    for (name, &count) in hours {
        html.push_str(&format!("<li>{}: {}</li>\n", escape_html(name), line(name, count)));
    }
    html.push_str("</ul>\n");
}

pub fn render_document_delivered(file_name: &str, bytes: usize) -> String {
    format!(
        "<section class=\"result success\">\n<p><strong>Timetable generated.</strong> \
         {} ({} bytes) was downloaded.</p>\n</section>\n",
        escape_html(file_name),
        bytes
    )
}

pub fn render_error(kind: &str, message: &str) -> String {
    format!(
        "<section class=\"result error\" data-kind=\"{}\">\n\
         <p><strong>Could not generate the timetable:</strong><br>{}</p>\n</section>\n",
        escape_html(kind),
        escape_html(message)
    )
}
