mod common;

use botdesk_api::{api, auth::IdentityService, errors::get_catchers};
use rocket::{
    http::{ContentType, Header, Status},
    local::asynchronous::Client,
};
use rocket_okapi::settings::OpenApiSettings;
use serde_json::{json, Value};

use common::{bearer, FakeIdentity, ADMIN_EMAIL};

async fn client() -> Client {
    let settings = OpenApiSettings::default();
    let rocket = rocket::build()
        .manage(IdentityService::new(FakeIdentity::new(), ADMIN_EMAIL))
        .register("/", get_catchers())
        .mount("/api", api::public_routes(&settings).0)
        .mount("/api/admin/categories", api::category_routes(&settings).0)
        .mount("/api/admin/members", api::member_routes(&settings).0);

    Client::tracked(rocket).await.expect("valid rocket instance")
}

async fn check_admin(client: &Client, token: &str, uid: &str) -> (Status, Value) {
    let response = client
        .post("/api/check-admin")
        .header(ContentType::JSON)
        .header(bearer(token))
        .body(json!({ "uid": uid }).to_string())
        .dispatch()
        .await;
    let status = response.status();
    let body = response.into_json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

#[rocket::async_test]
async fn admin_routes_require_a_token() {
    let client = client().await;

    let response = client.get("/api/admin/categories").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);
    let body: Value = response.into_json().await.unwrap();
    assert!(body["message"].is_string());

    let response = client
        .get("/api/admin/members")
        .header(Header::new("Authorization", "Basic abc"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);
}

#[rocket::async_test]
async fn invalid_token_is_unauthorized() {
    let client = client().await;

    let response = client
        .get("/api/admin/categories")
        .header(bearer("forged"))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Unauthorized);
}

#[rocket::async_test]
async fn non_admin_is_forbidden() {
    let client = client().await;

    let response = client
        .get("/api/admin/categories")
        .header(bearer("user-token"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["message"], "Access denied: Admin privileges required");

    let (status, body) = check_admin(&client, "user-token", "u-user").await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["isAdmin"], false);

    let response = client
        .get("/api/admin/members")
        .header(bearer("user-token"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);
}

#[rocket::async_test]
async fn bootstrap_admin_is_granted_admin_role() {
    let client = client().await;

    let response = client
        .get("/api/admin/members")
        .header(bearer("admin-token"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);

    let (status, body) = check_admin(&client, "admin-token", "u-admin").await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["isAdmin"], true);

    let response = client
        .get("/api/admin/members")
        .header(bearer("admin-token"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let members: Value = response.into_json().await.unwrap();
    assert_eq!(
        members,
        json!([
            { "uid": "u-admin", "email": ADMIN_EMAIL, "role": "admin" },
            { "uid": "u-user", "email": "user@example.com", "role": "user" }
        ])
    );
}

#[rocket::async_test]
async fn check_admin_rejects_mismatched_uid() {
    let client = client().await;

    let (status, body) = check_admin(&client, "admin-token", "u-user").await;

    assert_eq!(status, Status::Forbidden);
    assert_eq!(body["message"], "Token mismatch");
}

#[rocket::async_test]
async fn check_admin_ignores_email_in_body() {
    let client = client().await;

    let response = client
        .post("/api/check-admin")
        .header(ContentType::JSON)
        .header(bearer("user-token"))
        .body(json!({ "uid": "u-user", "email": ADMIN_EMAIL }).to_string())
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["isAdmin"], false);
}

#[rocket::async_test]
async fn admin_can_promote_but_not_demote_bootstrap_admin() {
    let client = client().await;
    check_admin(&client, "admin-token", "u-admin").await;

    let response = client
        .patch("/api/admin/members/role")
        .header(ContentType::JSON)
        .header(bearer("admin-token"))
        .body(json!({ "uid": "u-user", "role": "admin" }).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let response = client
        .patch("/api/admin/members/role")
        .header(ContentType::JSON)
        .header(bearer("user-token"))
        .body(json!({ "uid": "u-admin", "role": "user" }).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(
        body["message"],
        "Cannot change the role of the primary administrator"
    );
}

#[rocket::async_test]
async fn contact_form_is_validated() {
    let client = client().await;

    let response = client
        .post("/api/contact")
        .header(ContentType::JSON)
        .body(json!({ "name": "J", "email": "nope", "message": "short" }).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    let body: Value = response.into_json().await.unwrap();
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|error| error["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["email", "message", "name"]);

    let response = client
        .post("/api/contact")
        .header(ContentType::JSON)
        .body(
            json!({
                "name": "Jane",
                "email": "jane@example..com",
                "message": "I'd like to know more."
            })
            .to_string(),
        )
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["errors"][0]["field"], "email");
    assert_eq!(body["errors"][0]["message"], "Invalid email address");

    let response = client
        .post("/api/contact")
        .header(ContentType::JSON)
        .body(
            json!({
                "name": "Jane",
                "email": "jane@example.com",
                "message": "I'd like to know more."
            })
            .to_string(),
        )
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
}
