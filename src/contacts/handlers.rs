use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::services::AuthSession,
    contacts::{
        dto::{ContactForm, ContactList, SearchQuery, SearchResults, UpdateForm},
        model::{Contact, ContactError},
        repo::next_uid,
    },
    responses::{found, internal, unprocessable},
    session::query::{find, matching, sorted_by_name},
    state::AppState,
};

const MIN_QUERY_CHARS: usize = 3;

pub fn contact_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(add_contact))
        .route("/all", get(list_contacts))
        .route("/contact/:uid", get(show_contact))
        .route("/contact/:uid/update", post(update_contact))
        .route("/contact/:uid/edit", post(edit_contact))
        .route("/search", get(search_contacts))
        .route("/savetofile", get(save_to_file))
}

type HandlerResult = Result<Response, (StatusCode, String)>;

fn session_gone() -> Response {
    found("/", "Please log in")
}

fn not_found() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, "Contact not found".into())
}

#[instrument(skip(state, form), fields(username = %auth.username))]
pub async fn add_contact(
    State(state): State<AppState>,
    auth: AuthSession,
    Form(form): Form<ContactForm>,
) -> HandlerResult {
    let (name, phone, email) = form.into_trimmed();

    let added = state
        .sessions
        .write(auth.id, |s| {
            let uid = next_uid(&s.contacts);
            let contact = Contact::validated(uid, name, phone, email)?;
            let message = format!("New contact, {} has been added", contact.name);
            s.contacts.push(contact);
            s.message = Some(message.clone());
            Ok::<_, ContactError>((uid, message))
        })
        .await;

    match added {
        None => Ok(session_gone()),
        Some(Ok((uid, message))) => {
            info!(uid, "contact added");
            Ok(found("/", message))
        }
        Some(Err(e)) => {
            warn!(error = %e, "invalid contact details");
            Err(unprocessable(e.to_string()))
        }
    }
}

#[instrument(skip(state), fields(username = %auth.username))]
pub async fn list_contacts(State(state): State<AppState>, auth: AuthSession) -> HandlerResult {
    let Some(contacts) = state
        .sessions
        .read(auth.id, |s| sorted_by_name(&s.contacts))
        .await
    else {
        return Ok(session_gone());
    };
    Ok(Json(ContactList { contacts }).into_response())
}

#[instrument(skip(state), fields(username = %auth.username))]
pub async fn show_contact(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(uid): Path<u64>,
) -> HandlerResult {
    match state
        .sessions
        .read(auth.id, |s| find(&s.contacts, uid).cloned())
        .await
    {
        None => Ok(session_gone()),
        Some(None) => Err(not_found()),
        Some(Some(contact)) => Ok(Json(contact).into_response()),
    }
}

/// `choice=delete` removes the contact; `choice=edit` returns it for editing.
#[instrument(skip(state, form), fields(username = %auth.username))]
pub async fn update_contact(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(uid): Path<u64>,
    Form(form): Form<UpdateForm>,
) -> HandlerResult {
    match form.choice.as_str() {
        "delete" => {
            let removed = state
                .sessions
                .write(auth.id, |s| {
                    let pos = s.contacts.iter().position(|c| c.uid == uid)?;
                    let contact = s.contacts.remove(pos);
                    let message = format!("The contact, {} has been deleted", contact.name);
                    s.message = Some(message.clone());
                    Some(message)
                })
                .await;
            match removed {
                None => Ok(session_gone()),
                Some(None) => Err(not_found()),
                Some(Some(message)) => {
                    info!(uid, "contact deleted");
                    Ok(found("/all", message))
                }
            }
        }
        "edit" => show_contact(State(state), auth, Path(uid)).await,
        other => {
            warn!(choice = %other, "unknown update choice");
            Err(unprocessable(format!("Unknown choice: {other}")))
        }
    }
}

#[instrument(skip(state, form), fields(username = %auth.username))]
pub async fn edit_contact(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(uid): Path<u64>,
    Form(form): Form<ContactForm>,
) -> HandlerResult {
    let (name, phone, email) = form.into_trimmed();

    let edited = state
        .sessions
        .write(auth.id, |s| {
            let contact = s.contacts.iter_mut().find(|c| c.uid == uid)?;
            if let Err(e) = contact.update(name, phone, email) {
                return Some(Err(e));
            }
            s.message = Some("Contact successfully edited".into());
            Some(Ok(()))
        })
        .await;

    match edited {
        None => Ok(session_gone()),
        Some(None) => Err(not_found()),
        Some(Some(Err(e))) => {
            warn!(uid, error = %e, "invalid contact details");
            Err(unprocessable(e.to_string()))
        }
        Some(Some(Ok(()))) => {
            info!(uid, "contact edited");
            Ok(found(&format!("/contact/{uid}"), "Contact successfully edited"))
        }
    }
}

#[instrument(skip(state, params), fields(username = %auth.username))]
pub async fn search_contacts(
    State(state): State<AppState>,
    auth: AuthSession,
    Query(params): Query<SearchQuery>,
) -> HandlerResult {
    let query = params.query.trim().to_lowercase();
    if query.chars().count() < MIN_QUERY_CHARS {
        warn!(len = query.chars().count(), "search query too short");
        return Err(unprocessable(format!(
            "The search query must be at least {MIN_QUERY_CHARS} characters long"
        )));
    }

    let Some(contacts) = state
        .sessions
        .read(auth.id, |s| matching(&s.contacts, &query))
        .await
    else {
        return Ok(session_gone());
    };
    Ok(Json(SearchResults { query, contacts }).into_response())
}

#[instrument(skip(state), fields(username = %auth.username))]
pub async fn save_to_file(State(state): State<AppState>, auth: AuthSession) -> HandlerResult {
    state
        .sessions
        .on_explicit_save(auth.id)
        .await
        .map_err(internal)?;
    let message = "All contacts have been saved";
    state.sessions.set_message(auth.id, message).await;
    Ok(found("/", message))
}
