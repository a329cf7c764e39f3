use axum::http::StatusCode;
use serde_json::Value;

use crate::common::{self, test_data::unique};

fn questions(body: &Value) -> Vec<String> {
    body["cards"]
        .as_array()
        .expect("cards array")
        .iter()
        .map(|c| c["question"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_search_returns_card_once_when_several_tags_match() {
    let (state, client) = common::setup().await;
    let term = unique("dedup");

    let card_id = common::db::create_card(&state.pool, &format!("What is {term}?"), "An answer", None, None)
        .await
        .unwrap();
    common::db::tag_card(&state.pool, card_id, &format!("{term}-one")).await.unwrap();
    common::db::tag_card(&state.pool, card_id, &format!("{term}-two")).await.unwrap();

    let response = client.get(&format!("/cards/?search_query={term}")).await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["page"]["count"], 1);
    assert_eq!(body["cards"].as_array().unwrap().len(), 1);
    assert_eq!(body["cards"][0]["id"], card_id);
    assert_eq!(body["cards"][0]["tags"].as_array().unwrap().len(), 2);
    assert_eq!(body["search_query"], term.as_str());
}

#[tokio::test]
async fn test_search_covers_answer_and_tags_case_insensitively() {
    let (state, client) = common::setup().await;
    let term = unique("ci");

    common::db::create_card(&state.pool, "Plain question", &term.to_uppercase(), None, None)
        .await
        .unwrap();
    let tagged = common::db::create_card(&state.pool, "Tagged question", "Plain answer", None, None)
        .await
        .unwrap();
    common::db::tag_card(&state.pool, tagged, &term).await.unwrap();
    common::db::create_card(&state.pool, "Unrelated", "Nothing here", None, None)
        .await
        .unwrap();

    let response = client.get(&format!("/cards/?search_query=%20{term}%20")).await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["page"]["count"], 2);
}

#[tokio::test]
async fn test_sort_by_question_ascending() {
    let (state, client) = common::setup().await;
    let term = unique("sort");

    for prefix in ["b", "a", "c"] {
        common::db::create_card(&state.pool, &format!("{prefix} {term}"), "answer", None, None)
            .await
            .unwrap();
    }

    let response = client
        .get(&format!("/cards/?search_query={term}&sort=question&order=asc"))
        .await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(
        questions(&body),
        vec![format!("a {term}"), format!("b {term}"), format!("c {term}")]
    );
    assert_eq!(body["order_by"], "question");
}

#[tokio::test]
async fn test_default_order_is_newest_first_and_unknown_sort_falls_back() {
    let (state, client) = common::setup().await;
    let term = unique("newest");

    for n in 1..=3 {
        common::db::create_card(&state.pool, &format!("{term} #{n}"), "answer", None, None)
            .await
            .unwrap();
    }

    let response = client
        .get(&format!("/cards/?search_query={term}&sort=views;drop&order=sideways"))
        .await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(
        questions(&body),
        vec![format!("{term} #3"), format!("{term} #2"), format!("{term} #1")]
    );
    assert_eq!(body["sort"], "upload_date");
    assert_eq!(body["order"], "desc");
    assert_eq!(body["order_by"], "-upload_date");
}

#[tokio::test]
async fn test_pagination_of_61_cards() {
    let (state, client) = common::setup().await;
    let term = unique("paging");

    for n in 0..61 {
        common::db::create_card(&state.pool, &format!("{term} {n:02}"), "answer", None, None)
            .await
            .unwrap();
    }

    let page3: Value = client
        .get(&format!("/cards/?search_query={term}&page=3"))
        .await
        .json();
    assert_eq!(page3["page"]["num_pages"], 3);
    assert_eq!(page3["page"]["number"], 3);
    assert_eq!(page3["cards"].as_array().unwrap().len(), 1);
    assert_eq!(page3["page"]["has_next"], false);

    let first: Value = client
        .get(&format!("/cards/?search_query={term}&page=abc"))
        .await
        .json();
    assert_eq!(first["page"]["number"], 1);
    assert_eq!(first["cards"].as_array().unwrap().len(), 30);

    let past_end: Value = client
        .get(&format!("/cards/?search_query={term}&page=99"))
        .await
        .json();
    assert_eq!(past_end["page"]["number"], 3);

    let last: Value = client
        .get(&format!("/cards/?search_query={term}&page=last"))
        .await
        .json();
    assert_eq!(last["page"]["number"], 3);
}

#[tokio::test]
async fn test_detail_increments_views() {
    let (state, client) = common::setup().await;
    let card_id = common::db::create_card(&state.pool, &unique("viewed"), "answer", None, None)
        .await
        .unwrap();

    let first = client.get(&format!("/cards/{card_id}/")).await;
    first.assert_status(StatusCode::OK);
    let first: Value = first.json();
    assert_eq!(first["card"]["views"], 1);

    let second: Value = client.get(&format!("/cards/{card_id}/")).await.json();
    assert_eq!(second["card"]["views"], 2);
}

#[tokio::test]
async fn test_detail_of_missing_card_is_404() {
    let (_state, client) = common::setup().await;

    let response = client.get("/cards/2147483000/").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_numeric_ids_are_404() {
    let (_state, client) = common::setup().await;

    for uri in ["/cards/abc/", "/cards/99999999999/", "/cards/by-tag/abc/"] {
        let response = client.get(uri).await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["error"], "The requested resource was not found", "{uri}");
    }
}

#[tokio::test]
async fn test_landing_about_and_fallback() {
    let (_state, client) = common::setup().await;

    let index = client.get("/").await;
    index.assert_status(StatusCode::OK);
    let body: Value = index.json();
    assert!(body["cards_count"].is_i64());
    assert_eq!(body["site"]["menu"][2]["url"], "/cards/");

    client.get("/about/").await.assert_status(StatusCode::OK);
    client.get("/health").await.assert_status(StatusCode::OK);

    let missing = client.get("/no/such/page/").await;
    missing.assert_status(StatusCode::NOT_FOUND);
    assert!(missing.header("x-request-id").is_some());
    assert_eq!(missing.header("x-content-type-options"), Some("nosniff"));
}
