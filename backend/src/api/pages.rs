//! Server-rendered HTML for the single intake page.
//!
//! The page is a pure function of the session view: re-rendering never
//! triggers a submission.

use crate::controller::SessionView;
use crate::models::{CatalogOption, ContentType, FormDraft, OutputFormat, PaymentTarget, UiState, MAX_MIX_WIDENESS};
use crate::submission::{
    CONTENT_TYPES_FIELD, EMAIL_FIELD, FILES_FIELD, MIX_WIDENESS_FIELD, OUTPUT_FORMATS_FIELD,
};

/// Page stylesheet, served at `/assets/style.css`.
pub const STYLESHEET: &str = include_str!("../../assets/style.css");

pub const TITLE: &str = "Dolby Atmos Conversion";

const WIDENESS_HELP: &str = "100% means severely wide mix with some of main tracks overlapping in the back of audio space, \
50% is a standard Mix when main instruments/objects are focused more in the front and additional background \
instruments are placed on the sides/back/above listener.";

/// Rendering switches taken from configuration.
#[derive(Debug, Clone, Copy)]
pub struct PageOptions {
    pub auto_redirect: bool,
}

/// Render the page for a session.
pub fn render_page(view: &SessionView, options: PageOptions) -> String {
    let body = match &view.state {
        UiState::Collecting => {
            let notice = view
                .warning
                .as_deref()
                .map(|w| notice("warning", w))
                .unwrap_or_default();
            format!("{notice}{}", intake_form(&view.draft))
        }
        UiState::Failed { message } => {
            format!("{}{}", notice("error", message), intake_form(&view.draft))
        }
        UiState::Submitting => submitting(),
        UiState::AwaitingPayment { target } => awaiting_payment(target, options),
    };

    let refresh = if view.state == UiState::Submitting {
        "\n    <meta http-equiv=\"refresh\" content=\"2\">"
    } else {
        ""
    };

    layout(refresh, &body)
}

/// Page shown when a submit is refused because of the session state.
pub fn render_conflict(message: &str) -> String {
    let body = format!(
        "{}\n    <p><a href=\"/\">Back to the form</a></p>",
        notice("warning", message)
    );
    layout("", &body)
}

fn layout(head_extra: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">{head_extra}
    <title>{TITLE}</title>
    <link rel="stylesheet" href="/assets/style.css">
</head>
<body>
<main class="block-container">
    <h1>{TITLE}</h1>
    {body}
</main>
</body>
</html>
"#
    )
}

fn notice(kind: &str, message: &str) -> String {
    format!(
        "<div class=\"notice {kind}\" role=\"alert\">{}</div>\n    ",
        escape_html(message)
    )
}

fn intake_form(draft: &FormDraft) -> String {
    let output_options = select_options::<OutputFormat>(&draft.output_formats);
    let content_options = select_options::<ContentType>(&draft.content_types);
    let email = escape_html(&draft.email);
    let wideness = draft.mix_wideness;

    format!(
        r#"<form id="conversion-form" method="post" action="/submit" enctype="multipart/form-data">
        <label for="{FILES_FIELD}">Upload Audio Files (WAV or MP3):</label>
        <input type="file" id="{FILES_FIELD}" name="{FILES_FIELD}" accept=".wav,.mp3,audio/wav,audio/mpeg" multiple required>

        <label for="{EMAIL_FIELD}">Your Email</label>
        <input type="email" id="{EMAIL_FIELD}" name="{EMAIL_FIELD}" value="{email}" required>
        <p class="caption">Note: please include your email where you want to receive your Dolby Atmos Files.</p>

        <label for="{MIX_WIDENESS_FIELD}">Mix wideness (immersion): <output id="wideness-value" for="{MIX_WIDENESS_FIELD}">{wideness}</output></label>
        <input type="range" id="{MIX_WIDENESS_FIELD}" name="{MIX_WIDENESS_FIELD}" min="0" max="{MAX_MIX_WIDENESS}" step="1" value="{wideness}"
               oninput="document.getElementById('wideness-value').value = this.value">
        <p class="caption">{WIDENESS_HELP}</p>

        <label for="{OUTPUT_FORMATS_FIELD}">Output Format:</label>
        <select id="{OUTPUT_FORMATS_FIELD}" name="{OUTPUT_FORMATS_FIELD}" multiple size="{output_size}">
{output_options}        </select>

        <label for="{CONTENT_TYPES_FIELD}">Content Type:</label>
        <select id="{CONTENT_TYPES_FIELD}" name="{CONTENT_TYPES_FIELD}" multiple size="{content_size}">
{content_options}        </select>

        <button type="submit" id="convert">Convert</button>
        <p class="busy" id="busy" hidden>Uploading and triggering conversion...</p>
    </form>
    <script>
        document.getElementById('conversion-form').addEventListener('submit', function () {{
            document.getElementById('convert').disabled = true;
            document.getElementById('busy').hidden = false;
        }});
    </script>"#,
        output_size = OutputFormat::ALL.len(),
        content_size = ContentType::ALL.len(),
    )
}

fn select_options<T: CatalogOption>(selected: &[String]) -> String {
    T::ALL
        .iter()
        .map(|option| {
            let label = escape_html(option.label());
            let mark = if selected.iter().any(|s| s == option.label()) {
                " selected"
            } else {
                ""
            };
            format!("            <option value=\"{label}\"{mark}>{label}</option>\n")
        })
        .collect()
}

fn submitting() -> String {
    r#"<div class="notice info">Uploading and triggering conversion...</div>
    <p class="busy">This page refreshes automatically.</p>"#
        .to_string()
}

fn awaiting_payment(target: &PaymentTarget, options: PageOptions) -> String {
    let href = escape_html(target.url());
    let redirect = if options.auto_redirect {
        format!(
            r#"
    <p>Redirecting to payment... <a href="{href}" target="_blank" rel="noopener">Click here if not redirected.</a></p>
    <script>
        window.location.href = {};
    </script>"#,
            js_string(target.url())
        )
    } else {
        String::new()
    };

    format!(
        r#"<div class="notice success">Conversion completed. Proceed to payment.</div>
    <p><a class="button" id="go-to-payment" href="/payment">Go to Payment</a></p>{redirect}
    <form method="post" action="/restart">
        <button type="submit" class="secondary">Start a new conversion</button>
    </form>"#
    )
}

/// Escape text for HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// JSON string literal that is also safe inside a `<script>` element.
fn js_string(text: &str) -> String {
    serde_json::Value::String(text.to_string())
        .to_string()
        .replace("</", "<\\/")
}
