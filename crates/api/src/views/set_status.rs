//! Admin set-status form.

use askama::Template;
use ideaboard_common::AppResult;
use ideaboard_core::SetStatusForm;
use ideaboard_db::entities::status;

struct StatusOption<'a> {
    id: i32,
    name: &'a str,
    checked: bool,
}

#[derive(Template)]
#[template(path = "set_status.html")]
struct SetStatusTemplate<'a> {
    slug: &'a str,
    idea_id: &'a str,
    options: Vec<StatusOption<'a>>,
    notify_all_voters: bool,
}

/// Render the form with the form's selected status checked.
pub fn render_set_status(
    slug: &str,
    form: &SetStatusForm,
    statuses: &[status::Model],
) -> AppResult<String> {
    let options = statuses
        .iter()
        .map(|status| StatusOption {
            id: status.id,
            name: &status.name,
            checked: status.id == form.selected_status_id(),
        })
        .collect();

    let template = SetStatusTemplate {
        slug,
        idea_id: form.idea_id(),
        options,
        notify_all_voters: form.notify_all_voters(),
    };
    Ok(template.render()?)
}
