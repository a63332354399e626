//! Idea page and index.

use askama::Template;
use chrono::{DateTime, Utc};
use ideaboard_common::AppResult;
use ideaboard_core::{CommentView, SetStatusForm, services::policy};
use ideaboard_db::entities::{category, idea, status, user};

use super::{
    comment::{CommentContext, render_comment},
    format::{relative_time, text_lines},
    set_status::render_set_status,
};

/// Everything shown on an idea page.
#[derive(Debug, Clone)]
pub struct IdeaPage<'a> {
    pub board_name: &'a str,
    pub idea: &'a idea::Model,
    pub category: Option<&'a category::Model>,
    pub statuses: &'a [status::Model],
    pub comments: &'a [CommentView],
    pub viewer: Option<&'a user::Model>,
    pub has_voted: bool,
    pub now: DateTime<Utc>,
}

#[derive(Template)]
#[template(path = "idea.html")]
struct IdeaTemplate<'a> {
    board_name: &'a str,
    id: &'a str,
    slug: &'a str,
    title: &'a str,
    category_name: &'a str,
    status_name: &'a str,
    description_lines: Vec<String>,
    votes_count: i32,
    has_voted: bool,
    datetime: String,
    ago: String,
    /// Rendered form, empty for non-admins.
    set_status_form: String,
    comments: Vec<String>,
}

struct IdeaCard<'a> {
    slug: &'a str,
    title: &'a str,
    status_name: &'a str,
    votes_count: i32,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate<'a> {
    board_name: &'a str,
    ideas: Vec<IdeaCard<'a>>,
}

fn status_name(statuses: &[status::Model], id: i32) -> &str {
    statuses
        .iter()
        .find(|s| s.id == id)
        .map_or("Unknown", |s| s.name.as_str())
}

/// Render an idea page. The set-status form is only included for admins.
pub fn render_idea_page(page: &IdeaPage<'_>) -> AppResult<String> {
    let idea = page.idea;

    let set_status_form = if policy::can_set_status(page.viewer) {
        render_set_status(&idea.slug, &SetStatusForm::for_idea(idea), page.statuses)?
    } else {
        String::new()
    };

    let ctx = CommentContext {
        idea_owner_id: &idea.user_id,
        viewer: page.viewer,
        now: page.now,
    };
    let comments = page
        .comments
        .iter()
        .map(|view| render_comment(view, &ctx))
        .collect::<AppResult<Vec<_>>>()?;

    let template = IdeaTemplate {
        board_name: page.board_name,
        id: &idea.id,
        slug: &idea.slug,
        title: &idea.title,
        category_name: page.category.map_or("", |c| c.name.as_str()),
        status_name: status_name(page.statuses, idea.status_id),
        description_lines: text_lines(&idea.description),
        votes_count: idea.votes_count,
        has_voted: page.has_voted,
        datetime: idea.created_at.to_rfc3339(),
        ago: relative_time(&idea.created_at, page.now),
        set_status_form,
        comments,
    };
    Ok(template.render()?)
}

/// Render the list of recent ideas.
pub fn render_index(
    board_name: &str,
    ideas: &[idea::Model],
    statuses: &[status::Model],
) -> AppResult<String> {
    let ideas = ideas
        .iter()
        .map(|idea| IdeaCard {
            slug: &idea.slug,
            title: &idea.title,
            status_name: status_name(statuses, idea.status_id),
            votes_count: idea.votes_count,
        })
        .collect();

    Ok(IndexTemplate { board_name, ideas }.render()?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn create_test_user(id: &str, is_admin: bool) -> user::Model {
        user::Model {
            id: id.to_string(),
            name: id.to_string(),
            email: format!("{id}@example.com"),
            avatar_url: None,
            token: None,
            is_admin,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_idea() -> idea::Model {
        idea::Model {
            id: "idea1".to_string(),
            user_id: "owner".to_string(),
            category_id: 1,
            status_id: 2,
            title: "Dark mode".to_string(),
            slug: "dark-mode".to_string(),
            description: "Please add dark mode".to_string(),
            votes_count: 7,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn statuses() -> Vec<status::Model> {
        vec![
            status::Model { id: 1, name: "Open".to_string() },
            status::Model { id: 2, name: "Considering".to_string() },
            status::Model { id: 3, name: "In Progress".to_string() },
        ]
    }

    fn render(viewer: Option<&user::Model>) -> String {
        let idea = create_test_idea();
        let statuses = statuses();
        render_idea_page(&IdeaPage {
            board_name: "Feedback",
            idea: &idea,
            category: None,
            statuses: &statuses,
            comments: &[],
            viewer,
            has_voted: false,
            now: Utc::now(),
        })
        .unwrap()
    }

    #[test]
    fn test_non_admin_never_sees_set_status() {
        let user = create_test_user("user1", false);

        assert!(!render(None).contains("set-status"));
        assert!(!render(Some(&user)).contains("set-status"));
    }

    #[test]
    fn test_admin_sees_current_status_selected() {
        let admin = create_test_user("admin", true);
        let html = render(Some(&admin));

        assert!(html.contains(r#"class="set-status""#));
        assert!(html.contains(r#"value="2" checked"#));
        assert!(html.contains(r#"<span class="idea-status">Considering</span>"#));
    }

    #[test]
    fn test_comments_are_embedded_once() {
        let idea = create_test_idea();
        let statuses = statuses();
        let author = create_test_user("ann", false);
        let comments = [CommentView {
            comment: ideaboard_db::entities::comment::Model {
                id: "c1".to_string(),
                idea_id: idea.id.clone(),
                user_id: author.id.clone(),
                body: "<script>alert(1)</script>".to_string(),
                spam_reports: 0,
                is_status_update: false,
                status_id: None,
                created_at: Utc::now().into(),
                updated_at: None,
            },
            author,
            status: None,
        }];

        let html = render_idea_page(&IdeaPage {
            board_name: "Feedback",
            idea: &idea,
            category: None,
            statuses: &statuses,
            comments: &comments,
            viewer: None,
            has_voted: true,
            now: Utc::now(),
        })
        .unwrap();

        assert!(html.contains("<h2>1 Comments</h2>"));
        assert!(html.contains(r#"<div id="comment-c1" class="comment">"#));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains(">Voted</button>"));
    }

    #[test]
    fn test_index_lists_ideas() {
        let html = render_index("Feedback", &[create_test_idea()], &statuses()).unwrap();

        assert!(html.contains(r#"<a href="/ideas/dark-mode">Dark mode</a>"#));
        assert!(html.contains("Considering"));
        assert!(
            render_index("Feedback", &[], &statuses())
                .unwrap()
                .contains("No ideas yet.")
        );
    }
}
