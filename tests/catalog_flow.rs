use reqwest::StatusCode;
use serde_json::{json, Value};
use serial_test::serial;

mod common;

fn ids(list: &Value) -> Vec<String> {
    // ---
    list.as_array()
        .expect("array")
        .iter()
        .map(|c| c["id"].as_str().expect("id").to_string())
        .collect()
}

#[tokio::test]
#[serial]
async fn filters_compose_and_empty_values_are_ignored() {
    // ---
    let server = common::TestServer::new().await;
    let token = server.register("592000001").await;

    let old = server
        .create_car(&token, json!({ "city": "Tbilisi", "year": 2012, "capacity": 4 }))
        .await;
    let mid = server
        .create_car(&token, json!({ "city": "tbilisi", "year": 2019, "capacity": 5 }))
        .await;
    let new = server
        .create_car(&token, json!({ "city": "Tbilisi", "year": 2023, "capacity": 7 }))
        .await;
    let elsewhere = server
        .create_car(&token, json!({ "city": "Batumi", "year": 2019, "capacity": 5 }))
        .await;

    let cases: [(&str, Vec<&String>); 7] = [
        ("/", vec![&old, &mid, &new, &elsewhere]),
        ("/?city=&year_from=&year_to=&capacity=", vec![&old, &mid, &new, &elsewhere]),
        ("/?city=TBILISI", vec![&old, &mid, &new]),
        ("/?city=tbilisi&year_from=2015&year_to=2020", vec![&mid]),
        ("/?capacity=5&year_to=2019", vec![&mid, &elsewhere]),
        ("/?year_to=40000", vec![&old, &mid, &new, &elsewhere]),
        ("/?year_from=40000", vec![]),
    ];

    for (path, expected) in cases {
        let res = server.client.get(server.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{path}");

        let body: Value = res.json().await.unwrap();
        let mut found = ids(&body["data"]["cars"]);
        let mut expected: Vec<String> = expected.into_iter().cloned().collect();
        found.sort();
        expected.sort();
        assert_eq!(found, expected, "{path}");
    }

    let res = server
        .client
        .get(server.url("/?year_from=recent"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
#[serial]
async fn create_car_reports_all_invalid_fields() {
    // ---
    let server = common::TestServer::new().await;
    let token = server.register("592000002").await;

    let res = server
        .client
        .post(server.url("/cars"))
        .bearer_auth(&token)
        .json(&common::car_body(json!({
            "brand": "",
            "daily_rental_price": "12.345",
            "transmission": "cvt",
            "fuel_tank": -1,
        })))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = res.json().await.unwrap();
    for field in ["brand", "daily_rental_price", "transmission", "fuel_tank"] {
        assert!(body["fields"][field].is_array(), "expected error on {field}: {body}");
    }
    assert!(body["fields"]["model"].is_null());
}

#[tokio::test]
#[serial]
async fn non_owner_update_and_delete_leave_car_unchanged() {
    // ---
    let server = common::TestServer::new().await;
    let owner = server.register("592000003").await;
    let stranger = server.register("592000004").await;
    let car_id = server.create_car(&owner, json!({})).await;

    let before: Value = server.get_car(&car_id).await.json().await.unwrap();

    let res = server
        .client
        .put(server.url(&format!("/cars/{car_id}")))
        .bearer_auth(&stranger)
        .json(&common::car_body(json!({ "daily_rental_price": "1.00", "city": "Gori" })))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()["location"], "/profile");

    let res = server
        .client
        .delete(server.url(&format!("/cars/{car_id}")))
        .bearer_auth(&stranger)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()["location"], "/profile");

    let after: Value = server.get_car(&car_id).await.json().await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
#[serial]
async fn owner_updates_then_deletes() {
    // ---
    let server = common::TestServer::new().await;
    let owner = server.register("592000005").await;
    let car_id = server.create_car(&owner, json!({})).await;

    let res = server
        .client
        .put(server.url(&format!("/cars/{car_id}")))
        .bearer_auth(&owner)
        .json(&common::car_body(json!({ "daily_rental_price": "64.5", "image2": "side.jpg" })))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["daily_rental_price"], "64.50");
    assert_eq!(body["data"]["image2"], "side.jpg");
    assert_eq!(body["data"]["id"], car_id.as_str());

    let res = server
        .client
        .delete(server.url(&format!("/cars/{car_id}")))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(server.get_car(&car_id).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[serial]
async fn like_toggle_is_an_involution() {
    // ---
    let server = common::TestServer::new().await;
    let owner = server.register("592000006").await;
    let fan = server.register("592000007").await;
    let car_id = server.create_car(&owner, json!({})).await;

    let res = server.toggle_like(&fan, &car_id).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["liked"], true);

    let detail: Value = server.get_car(&car_id).await.json().await.unwrap();
    assert_eq!(detail["data"]["likes"], 1);
    let profile = server.profile(&fan).await;
    assert_eq!(ids(&profile["data"]["liked_cars"]), vec![car_id.clone()]);

    let body: Value = server.toggle_like(&fan, &car_id).await.json().await.unwrap();
    assert_eq!(body["data"]["liked"], false);

    let detail: Value = server.get_car(&car_id).await.json().await.unwrap();
    assert_eq!(detail["data"]["likes"], 0);
    let profile = server.profile(&fan).await;
    assert!(ids(&profile["data"]["liked_cars"]).is_empty());
}

#[tokio::test]
#[serial]
async fn most_liked_strip_ranks_by_likes() {
    // ---
    let server = common::TestServer::new().await;
    let owner = server.register("592000008").await;
    let fans = [
        server.register("592000009").await,
        server.register("592000010").await,
    ];

    let cars: Vec<String> = {
        let mut cars = Vec::new();
        for _ in 0..6 {
            cars.push(server.create_car(&owner, json!({})).await);
        }
        cars
    };

    for fan in &fans {
        server.toggle_like(fan, &cars[4]).await;
    }
    server.toggle_like(&fans[0], &cars[2]).await;

    let body: Value = server
        .client
        .get(server.url("/"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let strip = body["data"]["most_liked"].as_array().unwrap();

    assert_eq!(strip.len(), 5);
    assert_eq!(strip[0]["id"], cars[4].as_str());
    assert_eq!(strip[0]["likes"], 2);
    assert_eq!(strip[1]["id"], cars[2].as_str());
    assert_eq!(strip[1]["likes"], 1);
}

#[tokio::test]
#[serial]
async fn liking_unknown_car_is_not_found() {
    // ---
    let server = common::TestServer::new().await;
    let fan = server.register("592000011").await;

    let res = server
        .toggle_like(&fan, "6f1c1f8e-5b1b-4c55-9a59-3f0a4f3f1b11")
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
