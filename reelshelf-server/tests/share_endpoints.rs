use anyhow::Result;
use axum::http::StatusCode;
use reelshelf_core::share::share_image_key;
use reelshelf_model::api::routes::{utils::replace_param, v1};
use serde_json::{Value, json};

mod support;
use support::{add_book, add_movie, bearer, build_memory_app, register};

#[tokio::test]
async fn generating_without_ratable_items_is_unprocessable() -> Result<()> {
    let (app, blobs) = build_memory_app()?;
    let token = register(&app.server, "ada", "correct horse").await;
    add_book(
        &app.server,
        &token,
        json!({ "title": "Dune", "status": "reading", "score": 9 }),
    )
    .await;

    let response = app
        .server
        .post(v1::profile::SHARE)
        .add_header("Authorization", bearer(&token))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(blobs.is_empty());
    Ok(())
}

#[tokio::test]
async fn generated_share_is_publicly_fetchable() -> Result<()> {
    let (app, blobs) = build_memory_app()?;
    let token = register(&app.server, "ada", "correct horse").await;
    for (title, score) in [("Dune", 9), ("Emma", 7), ("Ubik", 8)] {
        add_book(
            &app.server,
            &token,
            json!({ "title": title, "status": "completed", "score": score }),
        )
        .await;
    }
    add_movie(
        &app.server,
        &token,
        json!({ "title": "Heat", "status": "completed", "score": 10 }),
    )
    .await;

    let response = app
        .server
        .post(v1::profile::SHARE)
        .add_header("Authorization", bearer(&token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let share_id = body["data"]["share_id"].as_str().unwrap().to_string();
    assert_eq!(share_id.len(), 22);
    assert!(blobs.contains(&share_image_key("ada")));

    let image = app
        .server
        .get(&replace_param(v1::share::IMAGE, "id", &share_id))
        .await;
    image.assert_status_ok();
    assert_eq!(image.header("content-type"), "image/png");
    assert_eq!(&image.as_bytes()[..8], b"\x89PNG\r\n\x1a\n");
    Ok(())
}

#[tokio::test]
async fn regenerating_retires_the_old_link() -> Result<()> {
    let (app, _blobs) = build_memory_app()?;
    let token = register(&app.server, "ada", "correct horse").await;
    add_book(
        &app.server,
        &token,
        json!({ "title": "Dune", "status": "completed", "score": 9 }),
    )
    .await;

    let mut ids = Vec::new();
    for _ in 0..2 {
        let body: Value = app
            .server
            .post(v1::profile::SHARE)
            .add_header("Authorization", bearer(&token))
            .await
            .json();
        ids.push(body["data"]["share_id"].as_str().unwrap().to_string());
    }

    app.server
        .get(&replace_param(v1::share::IMAGE, "id", &ids[0]))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    app.server
        .get(&replace_param(v1::share::IMAGE, "id", &ids[1]))
        .await
        .assert_status_ok();
    Ok(())
}

#[tokio::test]
async fn unknown_share_id_is_unprocessable() -> Result<()> {
    let (app, _blobs) = build_memory_app()?;

    let response = app
        .server
        .get(&replace_param(v1::share::IMAGE, "id", "AAAAAAAAAAAAAAAAAAAAAA"))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["error"]["status"], 422);
    Ok(())
}

#[tokio::test]
async fn share_generation_requires_a_token() -> Result<()> {
    let (app, _blobs) = build_memory_app()?;

    app.server
        .post(v1::profile::SHARE)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    app.server
        .post(v1::profile::SHARE)
        .add_header("Authorization", bearer("not-a-real-token"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}
