//! Minimal string-built HTML pages. Everything user-supplied goes through
//! [`escape`] before interpolation.

use qcal_core::{AliasMap, BatchResult};

pub(crate) fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n{body}\n</body>\n</html>\n"
    )
}

pub(crate) fn index_page(aliases: &AliasMap) -> String {
    let mut body = String::from(
        "<h1>qcal</h1>\n\
         <p>One event per line. Prefix a line with <code>@alias</code> to route it.</p>\n\
         <form action=\"/submit\" method=\"post\">\n\
         <textarea name=\"bulk_text\" rows=\"10\" cols=\"72\" \
         placeholder=\"@workout Push day tomorrow 6pm\"></textarea><br>\n\
         <button type=\"submit\">Create events</button>\n\
         </form>\n",
    );

    if aliases.is_empty() {
        body.push_str("<p>No aliases configured.</p>\n");
    } else {
        body.push_str("<p>Aliases: ");
        let names: Vec<String> = aliases
            .names()
            .map(|name| format!("<code>@{}</code>", escape(name)))
            .collect();
        body.push_str(&names.join(", "));
        body.push_str("</p>\n");
    }
    body.push_str("<p><a href=\"/settings\">Settings</a></p>");

    page("qcal", &body)
}

pub(crate) fn results_page(result: &BatchResult) -> String {
    let mut body = String::new();

    if result.is_empty() {
        body.push_str("<p>Nothing submitted.</p>\n");
    }

    if !result.created.is_empty() {
        body.push_str("<h1>Created events</h1>\n<ul>\n");
        for event in &result.created {
            body.push_str(&format!(
                "<li><a href=\"{}\">{}</a> <small>[{}]</small></li>\n",
                escape(&event.link),
                escape(&event.summary),
                escape(&event.calendar_id),
            ));
        }
        body.push_str("</ul>\n");
    }

    if !result.errors.is_empty() {
        body.push_str("<h2>Warnings</h2>\n<ul>\n");
        for error in &result.errors {
            body.push_str(&format!(
                "<li><code>{}</code>: {}</li>\n",
                escape(&error.line),
                escape(&error.message),
            ));
        }
        body.push_str("</ul>\n");
    }

    body.push_str("<p><a href=\"/\">Back</a></p>");
    page("qcal results", &body)
}

pub(crate) fn settings_page(aliases: &AliasMap, notice: Option<&str>) -> String {
    let mut body = String::from("<h1>Alias settings</h1>\n");

    if let Some(notice) = notice {
        body.push_str(&format!("<p><strong>{}</strong></p>\n", escape(notice)));
    }

    let mut lines = String::new();
    for (alias, calendar_id) in aliases.iter() {
        lines.push_str(&format!("{alias} = {calendar_id}\n"));
    }

    body.push_str(&format!(
        "<p>One <code>alias = calendar-id</code> pair per line. Saving replaces \
         the whole mapping.</p>\n\
         <form action=\"/settings\" method=\"post\">\n\
         <textarea name=\"aliases\" rows=\"10\" cols=\"72\">{}</textarea><br>\n\
         <button type=\"submit\">Save</button>\n\
         </form>\n\
         <p><a href=\"/\">Back</a></p>",
        escape(&lines),
    ));

    page("qcal settings", &body)
}

pub(crate) fn failure_page(message: &str) -> String {
    page(
        "qcal error",
        &format!(
            "<h1>Something went wrong</h1>\n<p>{}</p>\n<p><a href=\"/\">Back</a></p>",
            escape(message)
        ),
    )
}
