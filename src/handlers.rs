use crate::{
    AppState,
    content::{self, Document, RenderMode, escape},
    models::Session,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
};

// --- Page Shell ---

/// page
///
/// Wraps a rendered body in the document shell shared by every screen.
fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{}</title></head><body>{}</body></html>",
        escape(title),
        body
    ))
}

/// placeholder
///
/// The loading screen shown while a boundary is waiting on identity. Static markup only.
pub fn placeholder() -> Html<String> {
    page("Loading", r#"<div class="loading" aria-busy="true"></div>"#)
}

fn document_page(document: &Document, mode: RenderMode) -> Html<String> {
    let rendered = content::render(document, mode);
    page(
        &document.title,
        &format!("<h1>{}</h1>{}", escape(&document.title), rendered.html),
    )
}

fn find_document(state: &AppState, slug: &str) -> Result<Document, StatusCode> {
    state.catalog.get(slug).cloned().ok_or(StatusCode::NOT_FOUND)
}

// --- Handlers ---

/// landing
///
/// [Public Route] The fallback location: index of every document, plus a sign-in hint.
pub async fn landing(State(state): State<AppState>, session: Session) -> Html<String> {
    let greeting = match session.user() {
        Some(user) => format!("<p>Signed in as {}</p>", escape(&user.email)),
        None => "<p>You are browsing anonymously.</p>".to_string(),
    };
    let items: String = state
        .catalog
        .list()
        .map(|doc| {
            format!(
                r#"<li><a href="/docs/{}">{}</a></li>"#,
                escape(&doc.slug),
                escape(&doc.title)
            )
        })
        .collect();
    page("Portal", &format!("{greeting}<ul class=\"documents\">{items}</ul>"))
}

/// public_document
///
/// [Public Route] Static server rendering, no client-side editor at all.
pub async fn public_document(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Html<String>, StatusCode> {
    let document = find_document(&state, &slug)?;
    Ok(document_page(&document, RenderMode::Static))
}

/// profile
///
/// [Authenticated Route] Shows who the session belongs to.
pub async fn profile(session: Session) -> Result<Html<String>, StatusCode> {
    // The boundary already rejected anonymous sessions.
    let user = session.user().ok_or(StatusCode::UNAUTHORIZED)?;
    let role = if session.is_admin { "admin" } else { "member" };
    Ok(page(
        "Profile",
        &format!(
            r#"<dl class="profile"><dt>Email</dt><dd>{}</dd><dt>Id</dt><dd>{}</dd><dt>Role</dt><dd>{}</dd></dl>"#,
            escape(&user.email),
            user.id,
            role
        ),
    ))
}

/// library_document
///
/// [Authenticated Route] Client-side editor with edit affordances disabled.
pub async fn library_document(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Html<String>, StatusCode> {
    let document = find_document(&state, &slug)?;
    Ok(document_page(&document, RenderMode::ReadOnlyClient))
}

/// admin_dashboard
///
/// [Admin Route] Every document with its edit link and last update time.
pub async fn admin_dashboard(State(state): State<AppState>) -> Html<String> {
    let rows: String = state
        .catalog
        .list()
        .map(|doc| {
            format!(
                r#"<tr><td>{}</td><td>{}</td><td><a href="/admin/docs/{}/edit">Edit</a></td></tr>"#,
                escape(&doc.title),
                doc.updated_at.to_rfc3339(),
                escape(&doc.slug)
            )
        })
        .collect();
    page(
        "Admin",
        &format!(
            r#"<p>{} documents</p><table class="documents">{rows}</table>"#,
            state.catalog.len()
        ),
    )
}

/// edit_document
///
/// [Admin Route] Full editor.
pub async fn edit_document(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Html<String>, StatusCode> {
    let document = find_document(&state, &slug)?;
    Ok(document_page(&document, RenderMode::Editable))
}
