use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use minijinja::context;

use crate::{db::DB, errors::Error, state::AppState, views::Views, Result};

use super::{handlers, NoteForm, NoteQuery, WriteNote};

async fn notes_view(view: Views, State(db): State<DB>) -> Result<Response> {
    let notes = handlers::find_notes(db).await?;

    Ok(view.response("index.html", context! { title => "My Notes", notes => notes }))
}

async fn new_note_view(view: Views) -> impl IntoResponse {
    view.response("new.html", context! { title => "Create a New Note" })
}

async fn create_note(State(db): State<DB>, Form(form): Form<NoteForm>) -> Result<Redirect> {
    let note = WriteNote::try_from(form)?;
    handlers::create_note(db, note).await?;

    Ok(Redirect::to("/"))
}

async fn note_view(
    view: Views,
    State(db): State<DB>,
    Path(slug): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Response> {
    let query = query.into_iter().collect::<NoteQuery>();
    let note = handlers::get_note(db, slug).await?;

    Ok(view.response(
        "note.html",
        context! { title => note.title.clone(), note => note, is_editing => query.is_editing() },
    ))
}

async fn update_note(State(db): State<DB>, Path(slug): Path<String>, Form(form): Form<NoteForm>) -> Result<Redirect> {
    let note = WriteNote::try_from(form)?;
    let note = handlers::update_note(db, slug, note).await?;

    Ok(Redirect::to(&format!("/note/{}", note.slug)))
}

async fn delete_note(State(db): State<DB>, Path(slug): Path<String>) -> Result<Redirect> {
    if slug.trim().is_empty() {
        return Err(Error::Validation("Missing note identifier".into()));
    }
    handlers::delete_note(db, slug).await?;

    Ok(Redirect::to("/"))
}

async fn missing_slug() -> Error {
    Error::Validation("Missing note identifier".into())
}

async fn method_not_allowed() -> Error {
    Error::MethodNotAllowed
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(notes_view))
        .route("/new", get(new_note_view).post(create_note))
        .route("/note/:slug", get(note_view).post(update_note))
        .route("/note/delete/", post(missing_slug).fallback(method_not_allowed))
        .route("/note/delete/:slug", post(delete_note).fallback(method_not_allowed))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde::Serialize;

    use crate::{
        db::{init_test_db, DB},
        errors::Result,
        notes::handlers,
    };

    #[derive(Serialize)]
    struct NoteForm<'a> {
        title: &'a str,
        content: &'a str,
        labels: &'a str,
    }

    async fn seed(db: &DB, title: &str, content: &str, labels: &str) -> Result<String> {
        handlers::create_note(
            db.clone(),
            super::WriteNote::try_from(super::NoteForm {
                title: title.into(),
                content: content.into(),
                labels: labels.into(),
            })?,
        )
        .await
    }

    #[tokio::test]
    async fn list_notes() -> Result<()> {
        let db = init_test_db().await?;
        seed(&db, "first", "line one\nline two", "rust").await?;
        seed(&db, "second", &"x".repeat(150), "").await?;

        let server = test_server(db).await?;
        let response = server.get("/").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let html = response.text();
        assert!(html.contains("first"));
        assert!(html.contains("line one..."));
        assert!(!html.contains("line two"));
        assert!(html.contains(&format!("{}...", "x".repeat(100))));
        assert!(html.find("second") < html.find("first"));
        Ok(())
    }

    #[tokio::test]
    async fn list_empty() -> Result<()> {
        let server = test_server(init_test_db().await?).await?;

        let response = server.get("/").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert!(response.text().contains("No notes yet"));
        Ok(())
    }

    #[tokio::test]
    async fn new_note_form() -> Result<()> {
        let server = test_server(init_test_db().await?).await?;

        let response = server.get("/new").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert!(response.text().contains(r#"action="/new""#));
        Ok(())
    }

    #[tokio::test]
    async fn create_note() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db.clone()).await?;

        let response = server
            .post("/new")
            .form(&NoteForm {
                title: "hello",
                content: "**world**",
                labels: "a, b ,,c",
            })
            .await;

        assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/");

        let notes = handlers::find_notes(db).await?;
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "hello");
        assert_eq!(notes[0].content, "**world**");
        assert_eq!(notes[0].labels.as_slice(), ["a", "b", "c"]);
        Ok(())
    }

    #[tokio::test]
    async fn create_note_without_title() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db.clone()).await?;

        let response = server
            .post("/new")
            .form(&NoteForm {
                title: " ",
                content: "body",
                labels: "",
            })
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert!(handlers::find_notes(db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn view_note() -> Result<()> {
        let db = init_test_db().await?;
        let slug = seed(&db, "first", "one\ntwo <i>raw</i>", "x, y").await?;

        let server = test_server(db).await?;
        let response = server.get(&format!("/note/{slug}")).await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let html = response.text();
        assert!(html.contains("one<br />"));
        assert!(html.contains("&lt;i&gt;raw&lt;/i&gt;"));
        assert!(html.contains(&format!("/note/{slug}?edit=true")));
        assert!(!html.contains(r#"name="content""#));
        Ok(())
    }

    #[tokio::test]
    async fn edit_note_form() -> Result<()> {
        let db = init_test_db().await?;
        let slug = seed(&db, "first", "body", "x, y").await?;

        let server = test_server(db).await?;
        let response = server.get(&format!("/note/{slug}")).add_query_param("edit", "true").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let html = response.text();
        assert!(html.contains(r#"name="content""#));
        assert!(html.contains(r#"value="x, y""#));
        assert!(html.contains(&format!(r#"action="/note/{slug}""#)));
        Ok(())
    }

    #[tokio::test]
    async fn repeated_edit_flag_uses_first() -> Result<()> {
        let db = init_test_db().await?;
        let slug = seed(&db, "first", "body", "").await?;

        let server = test_server(db).await?;

        let response = server.get(&format!("/note/{slug}?edit=true&edit=false")).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert!(response.text().contains(r#"name="content""#));

        let response = server.get(&format!("/note/{slug}?edit=false&edit=true")).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert!(!response.text().contains(r#"name="content""#));
        Ok(())
    }

    #[tokio::test]
    async fn view_missing_note() -> Result<()> {
        let server = test_server(init_test_db().await?).await?;

        let response = server.get("/note/note-missing").await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn update_note() -> Result<()> {
        let db = init_test_db().await?;
        let slug = seed(&db, "first", "1", "a").await?;

        let server = test_server(db.clone()).await?;
        let response = server
            .post(&format!("/note/{slug}"))
            .form(&NoteForm {
                title: "second",
                content: "2",
                labels: "b,  c",
            })
            .await;

        assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), format!("/note/{slug}").as_str());

        let note = handlers::get_note(db, slug).await?;
        assert_eq!(note.title, "second");
        assert_eq!(note.content, "2");
        assert_eq!(note.labels.as_slice(), ["b", "c"]);
        Ok(())
    }

    #[tokio::test]
    async fn update_note_without_title() -> Result<()> {
        let db = init_test_db().await?;
        let slug = seed(&db, "first", "1", "a").await?;

        let server = test_server(db.clone()).await?;
        let response = server
            .post(&format!("/note/{slug}"))
            .form(&NoteForm {
                title: "  ",
                content: "2",
                labels: "b",
            })
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

        let note = handlers::get_note(db, slug).await?;
        assert_eq!(note.title, "first");
        assert_eq!(note.content, "1");
        assert_eq!(note.labels.as_slice(), ["a"]);
        Ok(())
    }

    #[tokio::test]
    async fn update_missing_note() -> Result<()> {
        let server = test_server(init_test_db().await?).await?;

        let response = server
            .post("/note/note-missing")
            .form(&NoteForm {
                title: "title",
                content: "",
                labels: "",
            })
            .await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn delete_note() -> Result<()> {
        let db = init_test_db().await?;
        let slug = seed(&db, "first", "1", "").await?;

        let server = test_server(db.clone()).await?;

        for _ in 0..2 {
            let response = server.post(&format!("/note/delete/{slug}")).await;

            assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
            assert_eq!(response.header("location"), "/");
        }

        assert!(handlers::find_notes(db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn delete_requires_post() -> Result<()> {
        let db = init_test_db().await?;
        let slug = seed(&db, "first", "1", "").await?;

        let server = test_server(db.clone()).await?;
        let response = server.get(&format!("/note/delete/{slug}")).await;

        assert_eq!(response.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(handlers::find_notes(db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn delete_requires_slug() -> Result<()> {
        let server = test_server(init_test_db().await?).await?;

        let response = server.post("/note/delete/").await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn static_assets() -> Result<()> {
        let server = test_server(init_test_db().await?).await?;

        let response = server.get("/static/style.css").await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let response = server.get("/static/missing.css").await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        Ok(())
    }

    async fn test_server(db: DB) -> Result<TestServer> {
        crate::tests::test_server(db).await
    }
}
