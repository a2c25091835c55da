use crate::error::Result;
use crate::models::{RunId, SimulationForm};
use crate::services::visualiser::escape_html;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use std::sync::Arc;

/// GET / - Trigger form pre-filled with the example box
pub async fn trigger_form() -> Html<String> {
    Html(render_form(&SimulationForm::example(), &[]))
}

/// POST / - Validate the form, run the pipeline and redirect to the result
pub async fn submit_form(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SimulationForm>,
) -> Result<Response> {
    let (bounding_box, number_of_requests) = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => {
            tracing::info!(errors = ?errors, "Rejected simulation form");
            return Ok((StatusCode::BAD_REQUEST, Html(render_form(&form, &errors))).into_response());
        }
    };

    let run_id = state.pipeline.run(bounding_box, number_of_requests).await?;
    Ok(Redirect::to(&format!("/visualise/{}", run_id)).into_response())
}

/// GET /visualise/{run_id} - Result page embedding the three artifacts
pub async fn visualise(Path(run_id): Path<RunId>) -> Html<String> {
    Html(render_result(run_id))
}

const STYLE: &str = "body { font-family: sans-serif; margin: 2rem; } \
    label { display: block; margin-top: 0.5rem; } \
    .errors { color: #b00020; } \
    img, iframe { width: 100%; border: 0; margin-top: 1rem; } \
    iframe { height: 600px; }";

fn render_form(form: &SimulationForm, errors: &[String]) -> String {
    let error_list = if errors.is_empty() {
        String::new()
    } else {
        let items: String = errors
            .iter()
            .map(|e| format!("<li>{}</li>", escape_html(e)))
            .collect();
        format!("<ul class=\"errors\">{}</ul>", items)
    };

    let field = |name: &str, label: &str, value: &str| {
        format!(
            "<label for=\"{name}\">{label}</label><input id=\"{name}\" name=\"{name}\" value=\"{}\">",
            escape_html(value)
        )
    };

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>Stop sample visualiser</title>\
         <style>{STYLE}</style></head>\n<body>\n<h1>Simulate requests</h1>\n{error_list}\n\
         <form method=\"post\" action=\"/\">\n{}\n{}\n{}\n{}\n{}\n<p><button type=\"submit\">Visualise</button></p>\n</form>\n\
         </body>\n</html>\n",
        field("x1", "Longitude (x1)", &form.x1),
        field("y1", "Latitude (y1)", &form.y1),
        field("x2", "Longitude (x2)", &form.x2),
        field("y2", "Latitude (y2)", &form.y2),
        field("number_of_requests", "Number of requests", &form.number_of_requests),
    )
}

fn render_result(run_id: RunId) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>Run {run_id}</title>\
         <style>{STYLE}</style></head>\n<body>\n<h1>Run {run_id}</h1>\n<p><a href=\"/\">New simulation</a></p>\n\
         <img src=\"/static/{}\" alt=\"Overview\">\n<img src=\"/static/{}\" alt=\"Close-up\">\n\
         <iframe src=\"/static/{}\" title=\"Interactive map\"></iframe>\n</body>\n</html>\n",
        run_id.overview_file(),
        run_id.closeup_file(),
        run_id.map_file(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_is_prefilled_and_escaped() {
        let html = render_form(&SimulationForm::example(), &[]);
        assert!(html.contains("value=\"13.34014892578125\""));
        assert!(html.contains("name=\"number_of_requests\" value=\"6\""));
        assert!(!html.contains("class=\"errors\""));

        let form = SimulationForm {
            x1: "\"><script>".to_string(),
            ..SimulationForm::default()
        };
        let html = render_form(&form, &["x1 must be a number".to_string()]);
        assert!(html.contains("&quot;&gt;&lt;script&gt;"));
        assert!(html.contains("<li>x1 must be a number</li>"));
    }

    #[test]
    fn result_page_references_artifacts() {
        let html = render_result(RunId(1700000000123));
        assert!(html.contains("/static/1700000000123_overview_plot.png"));
        assert!(html.contains("/static/1700000000123_closeup_plot.png"));
        assert!(html.contains("<iframe src=\"/static/1700000000123_map.html\""));
    }
}
