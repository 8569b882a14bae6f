/// End-to-end tests for the Ledgerline API
///
/// Every test drives the full router (session layer, extractors, handlers)
/// against its own in-memory database.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::{set_cookie_headers, today, TestContext, TEST_PASSWORD};
use serde_json::json;

#[tokio::test]
async fn test_health_is_public() {
    let ctx = TestContext::new().await;

    let response = ctx.send(Method::GET, "/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);

    let body = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_protected_routes_require_a_session() {
    let ctx = TestContext::new().await;

    for uri in ["/v1/accounts", "/v1/transactions", "/v1/stats/overview", "/v1/auth/me"] {
        let response = ctx.send(Method::GET, uri, None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(response.json()["error"], "unauthorized");
    }
}

#[tokio::test]
async fn test_register_seeds_starter_data() {
    let ctx = TestContext::new().await;
    let session = ctx.sign_up("ada@example.com").await;

    let accounts = ctx.get("/v1/accounts", &session).await.json();
    let accounts = accounts.as_array().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0]["name"], "Cash Wallet");
    assert_eq!(accounts[0]["type"], "WALLET");
    assert_eq!(accounts[0]["balance"], 0.0);

    let categories = ctx.get("/v1/categories", &session).await.json();
    let mut names: Vec<&str> = categories
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    names.sort_unstable();
    assert_eq!(names, vec!["Food", "Rent", "Salary", "Shopping"]);
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() {
    let ctx = TestContext::new().await;

    let first = ctx.register("Ada Lovelace", "ada@example.com").await;
    assert_eq!(first.status, StatusCode::CREATED);
    let body = first.json();
    assert_eq!(body["message"], "User registered successfully");
    assert!(body["user"].get("password_hash").is_none());

    // Emails compare case-insensitively
    let duplicate = ctx.register("Ada Again", "ADA@example.com").await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(duplicate.json()["message"], "User already exists");

    let short_password = ctx
        .send(
            Method::POST,
            "/v1/auth/register",
            None,
            Some(json!({ "name": "Bob", "email": "bob@example.com", "password": "123" })),
        )
        .await;
    assert_eq!(short_password.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        short_password.json()["message"],
        "Password must be at least 6 characters"
    );

    let bad_email = ctx
        .send(
            Method::POST,
            "/v1/auth/register",
            None,
            Some(json!({ "name": "Bob", "email": "not-an-email", "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_sets_http_only_cookie() {
    let ctx = TestContext::new().await;
    ctx.register("Ada Lovelace", "ada@example.com").await;

    let wrong = ctx.login("ada@example.com", "wrong password").await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.json()["message"], "Invalid email or password");

    let unknown = ctx.login("nobody@example.com", TEST_PASSWORD).await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.json()["message"], "Invalid email or password");

    let response = ctx.login("ada@example.com", TEST_PASSWORD).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["message"], "Login successful");

    let cookies = set_cookie_headers(&response.headers);
    let session = cookies
        .iter()
        .find(|c| c.starts_with("auth_token="))
        .expect("session cookie");
    assert!(session.contains("HttpOnly"));
    assert!(session.contains("SameSite=Lax"));
    assert!(session.contains("Path=/"));
    assert!(!session.contains("Secure"));
}

#[tokio::test]
async fn test_me_accepts_cookie_or_bearer_token() {
    let ctx = TestContext::new().await;
    let session = ctx.sign_up("ada@example.com").await;

    let me = ctx.get("/v1/auth/me", &session).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.json()["email"], "ada@example.com");

    let request = Request::builder()
        .method(Method::GET)
        .uri("/v1/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", session.token))
        .body(Body::empty())
        .unwrap();
    let bearer = ctx.send_request(request).await;
    assert_eq!(bearer.status, StatusCode::OK);
    assert_eq!(bearer.json()["id"], session.user_id);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/v1/auth/me")
        .header(header::COOKIE, "auth_token=garbage")
        .body(Body::empty())
        .unwrap();
    let forged = ctx.send_request(request).await;
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_expires_the_cookie() {
    let ctx = TestContext::new().await;
    let session = ctx.sign_up("ada@example.com").await;

    let response = ctx.send(Method::POST, "/v1/auth/logout", Some(&session), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["message"], "Logged out successfully");

    let cookies = set_cookie_headers(&response.headers);
    let cleared = cookies
        .iter()
        .find(|c| c.starts_with("auth_token="))
        .expect("expired cookie");
    assert!(cleared.starts_with("auth_token=;"));
    assert!(cleared.contains("Max-Age=0"));

    let activity = ctx.get("/v1/activity", &session).await.json();
    let actions: Vec<&str> = activity
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|a| a["action"].as_str())
        .collect();
    assert!(actions.contains(&"LOGIN"));
    assert!(actions.contains(&"LOGOUT"));

    // Logging out without a session still succeeds
    let anonymous = ctx.send(Method::POST, "/v1/auth/logout", None, None).await;
    assert_eq!(anonymous.status, StatusCode::OK);
}

#[tokio::test]
async fn test_users_cannot_touch_each_others_data() {
    let ctx = TestContext::new().await;
    let alice = ctx.sign_up("alice@example.com").await;
    let bob = ctx.sign_up("bob@example.com").await;

    let alice_account = ctx.first_account(&alice).await;
    let bob_account = ctx.first_account(&bob).await;
    let alice_food = ctx.category_named(&alice, "Food").await;

    let created = ctx
        .post(
            "/v1/transactions",
            &alice,
            json!({
                "account_id": alice_account,
                "amount": 12.5,
                "type": "EXPENSE",
                "description": "Lunch",
                "transaction_date": today().to_string(),
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let transaction_id = created.json()["id"].as_i64().unwrap();

    // Bob can neither see, change nor delete it
    let fetched = ctx.get(&format!("/v1/transactions/{}", transaction_id), &bob).await;
    assert_eq!(fetched.status, StatusCode::NOT_FOUND);

    let updated = ctx
        .put(
            &format!("/v1/accounts/{}", alice_account),
            &bob,
            json!({ "name": "Stolen", "type": "BANK", "balance": 0.0 }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::NOT_FOUND);

    let deleted = ctx.delete(&format!("/v1/transactions/{}", transaction_id), &bob).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.json()["deleted"], false);

    assert!(ctx.get("/v1/transactions", &bob).await.json().as_array().unwrap().is_empty());

    // Referencing Alice's account or category from Bob's request is a 404
    let foreign_account = ctx
        .post(
            "/v1/transactions",
            &bob,
            json!({
                "account_id": alice_account,
                "amount": 1.0,
                "type": "EXPENSE",
                "transaction_date": today().to_string(),
            }),
        )
        .await;
    assert_eq!(foreign_account.status, StatusCode::NOT_FOUND);

    let foreign_category = ctx
        .post(
            "/v1/transactions",
            &bob,
            json!({
                "account_id": bob_account,
                "category_id": alice_food,
                "amount": 1.0,
                "type": "EXPENSE",
                "transaction_date": today().to_string(),
            }),
        )
        .await;
    assert_eq!(foreign_category.status, StatusCode::NOT_FOUND);

    // Alice still has her transaction
    let mine = ctx.get("/v1/transactions", &alice).await.json();
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_reports_and_recurring_are_scoped_to_the_caller() {
    let ctx = TestContext::new().await;
    let alice = ctx.sign_up("alice@example.com").await;
    let bob = ctx.sign_up("bob@example.com").await;

    let alice_account = ctx.first_account(&alice).await;
    let alice_rent = ctx.category_named(&alice, "Rent").await;
    let bob_account = ctx.first_account(&bob).await;

    ctx.post(
        "/v1/accounts",
        &alice,
        json!({ "name": "Savings", "type": "BANK", "balance": 5000.0 }),
    )
    .await;
    let spent = ctx
        .post(
            "/v1/transactions",
            &alice,
            json!({
                "account_id": alice_account,
                "category_id": alice_rent,
                "amount": 800.0,
                "type": "EXPENSE",
                "description": "Rent",
                "transaction_date": today().to_string(),
            }),
        )
        .await;
    assert_eq!(spent.status, StatusCode::CREATED);

    let rule = ctx
        .post(
            "/v1/recurring",
            &alice,
            json!({
                "account_id": alice_account,
                "amount": 9.99,
                "type": "EXPENSE",
                "description": "Music",
                "frequency": "MONTHLY",
                "start_date": today().to_string(),
            }),
        )
        .await;
    assert_eq!(rule.status, StatusCode::CREATED, "{}", rule.text);

    // Rules cannot point at another user's account or category
    for body in [
        json!({
            "account_id": alice_account,
            "amount": 1.0,
            "type": "EXPENSE",
            "frequency": "DAILY",
            "start_date": today().to_string(),
        }),
        json!({
            "account_id": bob_account,
            "category_id": alice_rent,
            "amount": 1.0,
            "type": "EXPENSE",
            "frequency": "DAILY",
            "start_date": today().to_string(),
        }),
    ] {
        let foreign = ctx.post("/v1/recurring", &bob, body).await;
        assert_eq!(foreign.status, StatusCode::NOT_FOUND, "{}", foreign.text);
    }
    assert!(ctx.get("/v1/recurring", &bob).await.json().as_array().unwrap().is_empty());

    // Bob processing his (empty) schedule leaves Alice's due rule alone
    let processed = ctx.post("/v1/recurring/process", &bob, json!({})).await.json();
    assert_eq!(processed["processed"], 0);
    let alice_rules = ctx.get("/v1/recurring", &alice).await.json();
    assert_eq!(alice_rules[0]["next_run_date"], today().to_string());

    let export = ctx.get("/v1/transactions/export", &bob).await;
    assert_eq!(export.status, StatusCode::OK);
    assert_eq!(export.text.lines().count(), 1, "{}", export.text);
    assert!(!export.text.contains("Rent"));

    let overview = ctx.get("/v1/stats/overview", &bob).await.json();
    assert_eq!(overview["net_worth"], 0.0);
    assert_eq!(overview["monthly_expense"], 0.0);
    assert!(overview["upcoming_bills"].as_array().unwrap().is_empty());

    let charts = ctx.get("/v1/stats/charts", &bob).await.json();
    assert!(charts["history"].as_array().unwrap().is_empty());
    assert!(charts["categories"].as_array().unwrap().is_empty());

    // Alice's own log records her processing; Bob's never shows it
    let alice_processed = ctx.post("/v1/recurring/process", &alice, json!({})).await.json();
    assert_eq!(alice_processed["processed"], 1);

    let activity = ctx.get("/v1/activity", &bob).await.json();
    let entries = activity.as_array().unwrap();
    assert!(!entries.is_empty());
    assert!(entries.iter().all(|e| e["user_id"] == bob.user_id));
    assert!(entries.iter().all(|e| e["action"] != "PROCESS_RECURRING"));

    let alice_activity = ctx.get("/v1/activity", &alice).await.json();
    assert!(alice_activity
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["action"] == "PROCESS_RECURRING"));
}

#[tokio::test]
async fn test_session_of_deleted_user_is_rejected() {
    let ctx = TestContext::new().await;
    let session = ctx.sign_up("ada@example.com").await;

    let deleted = ctx
        .send(
            Method::DELETE,
            "/v1/data",
            Some(&session),
            Some(json!({ "delete_user": true })),
        )
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    // Replaying the old cookie
    let settings = ctx.get("/v1/settings", &session).await;
    assert_eq!(settings.status, StatusCode::UNAUTHORIZED, "{}", settings.text);
    assert_eq!(settings.json()["message"], "User no longer exists");

    let account = ctx
        .post(
            "/v1/accounts",
            &session,
            json!({ "name": "Ghost", "type": "BANK", "balance": 1.0 }),
        )
        .await;
    assert_eq!(account.status, StatusCode::UNAUTHORIZED, "{}", account.text);

    let goal = ctx
        .post(
            "/v1/goals",
            &session,
            json!({ "name": "Ghost fund", "target_amount": 100.0 }),
        )
        .await;
    assert_eq!(goal.status, StatusCode::UNAUTHORIZED, "{}", goal.text);

    // The token still verifies, but as a bearer it is refused too
    let request = Request::builder()
        .method(Method::GET)
        .uri("/v1/stats/overview")
        .header(header::AUTHORIZATION, format!("Bearer {}", session.token))
        .body(Body::empty())
        .unwrap();
    let bearer = ctx.send_request(request).await;
    assert_eq!(bearer.status, StatusCode::UNAUTHORIZED);
    assert_eq!(bearer.json()["error"], "unauthorized");
}

#[tokio::test]
async fn test_account_crud() {
    let ctx = TestContext::new().await;
    let session = ctx.sign_up("ada@example.com").await;

    let created = ctx
        .post(
            "/v1/accounts",
            &session,
            json!({ "name": "Savings", "type": "BANK", "balance": 2500.0 }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.json()["id"].as_i64().unwrap();

    let updated = ctx
        .put(
            &format!("/v1/accounts/{}", id),
            &session,
            json!({ "name": "Rainy Day", "type": "BANK", "balance": 3000.0, "color": "#000000" }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    let body = updated.json();
    assert_eq!(body["name"], "Rainy Day");
    assert_eq!(body["balance"], 3000.0);

    let short_name = ctx
        .post("/v1/accounts", &session, json!({ "name": "X", "type": "BANK", "balance": 0.0 }))
        .await;
    assert_eq!(short_name.status, StatusCode::BAD_REQUEST);

    let missing = ctx
        .put(
            "/v1/accounts/9999",
            &session,
            json!({ "name": "Nope", "type": "BANK", "balance": 0.0 }),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let deleted = ctx.delete(&format!("/v1/accounts/{}", id), &session).await;
    assert_eq!(deleted.json()["deleted"], true);
    assert_eq!(ctx.get("/v1/accounts", &session).await.json().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_transaction_validation() {
    let ctx = TestContext::new().await;
    let session = ctx.sign_up("ada@example.com").await;
    let account = ctx.first_account(&session).await;

    let zero = ctx
        .post(
            "/v1/transactions",
            &session,
            json!({
                "account_id": account,
                "amount": 0.0,
                "type": "EXPENSE",
                "transaction_date": today().to_string(),
            }),
        )
        .await;
    assert_eq!(zero.status, StatusCode::BAD_REQUEST);
    assert_eq!(zero.json()["message"], "Amount must be positive");

    let bad_type = ctx
        .post(
            "/v1/transactions",
            &session,
            json!({
                "account_id": account,
                "amount": 5.0,
                "type": "TRANSFER",
                "transaction_date": today().to_string(),
            }),
        )
        .await;
    assert_eq!(bad_type.status, StatusCode::BAD_REQUEST);

    let missing = ctx
        .put(
            "/v1/transactions/9999",
            &session,
            json!({
                "account_id": account,
                "amount": 5.0,
                "type": "EXPENSE",
                "transaction_date": today().to_string(),
            }),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_transaction_filters() {
    let ctx = TestContext::new().await;
    let session = ctx.sign_up("ada@example.com").await;
    let account = ctx.first_account(&session).await;
    let salary = ctx.category_named(&session, "Salary").await;

    for (amount, kind, description, date, category) in [
        (3000.0, "INCOME", "March salary", "2024-03-01", Some(salary)),
        (45.0, "EXPENSE", "Groceries", "2024-03-05", None),
        (12.0, "EXPENSE", "Coffee beans", "2024-04-02", None),
    ] {
        let response = ctx
            .post(
                "/v1/transactions",
                &session,
                json!({
                    "account_id": account,
                    "category_id": category,
                    "amount": amount,
                    "type": kind,
                    "description": description,
                    "date": date,
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
    }

    let all = ctx.get("/v1/transactions", &session).await.json();
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0]["description"], "Coffee beans");

    let expenses = ctx.get("/v1/transactions?type=EXPENSE", &session).await.json();
    assert_eq!(expenses.as_array().unwrap().len(), 2);

    let march = ctx
        .get("/v1/transactions?start_date=2024-03-01&end_date=2024-03-31", &session)
        .await
        .json();
    assert_eq!(march.as_array().unwrap().len(), 2);

    let searched = ctx.get("/v1/transactions?search=coffee", &session).await.json();
    assert_eq!(searched.as_array().unwrap().len(), 1);

    let by_category = ctx
        .get(&format!("/v1/transactions?category_id={}", salary), &session)
        .await
        .json();
    assert_eq!(by_category[0]["description"], "March salary");

    let limited = ctx.get("/v1/transactions?limit=1", &session).await.json();
    assert_eq!(limited.as_array().unwrap().len(), 1);

    let bad_date = ctx.get("/v1/transactions?start_date=yesterday", &session).await;
    assert_eq!(bad_date.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_csv_import_and_export() {
    let ctx = TestContext::new().await;
    let session = ctx.sign_up("ada@example.com").await;
    let account = ctx.first_account(&session).await;

    let csv = "Date,Description,Amount\n2024-05-01,Coffee,-4.50\n2024-05-02,Refund,20\n";
    let imported = ctx
        .post(
            "/v1/transactions/import",
            &session,
            json!({ "account_id": account, "csv": csv }),
        )
        .await;
    assert_eq!(imported.status, StatusCode::OK, "{}", imported.text);
    let body = imported.json();
    assert_eq!(body["imported"], 2);
    assert_eq!(body["message"], "Successfully imported 2 transactions");

    let expenses = ctx.get("/v1/transactions?type=EXPENSE", &session).await.json();
    assert_eq!(expenses[0]["description"], "Coffee");
    assert_eq!(expenses[0]["amount"], 4.5);

    let export = ctx.get("/v1/transactions/export", &session).await;
    assert_eq!(export.status, StatusCode::OK);
    assert_eq!(
        export.headers.get(header::CONTENT_TYPE).unwrap(),
        "text/csv; charset=utf-8"
    );
    let disposition = export.headers.get(header::CONTENT_DISPOSITION).unwrap().to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"transactions_"));

    let mut lines = export.text.lines();
    assert_eq!(lines.next(), Some("Date,Description,Type,Amount,Category,Account"));
    assert!(export.text.contains("2024-05-01,\"Coffee\",EXPENSE,4.50,,Cash Wallet"));
}

#[tokio::test]
async fn test_csv_import_is_all_or_nothing() {
    let ctx = TestContext::new().await;
    let session = ctx.sign_up("ada@example.com").await;
    let account = ctx.first_account(&session).await;

    let csv = "Date,Description,Amount\n2024-05-01,Coffee,-4.50\n2024-05-02,Broken,abc\n";
    let response = ctx
        .post(
            "/v1/transactions/import",
            &session,
            json!({ "account_id": account, "csv": csv }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["message"].as_str().unwrap().contains("line 3"));

    assert!(ctx.get("/v1/transactions", &session).await.json().as_array().unwrap().is_empty());

    let no_amount = ctx
        .post(
            "/v1/transactions/import",
            &session,
            json!({ "account_id": account, "csv": "Date,Description\n2024-05-01,Coffee\n" }),
        )
        .await;
    assert_eq!(no_amount.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recurring_processing_is_idempotent_per_day() {
    let ctx = TestContext::new().await;
    let session = ctx.sign_up("ada@example.com").await;
    let account = ctx.first_account(&session).await;

    let created = ctx
        .post(
            "/v1/recurring",
            &session,
            json!({
                "account_id": account,
                "amount": 15.99,
                "type": "EXPENSE",
                "description": "Streaming",
                "frequency": "MONTHLY",
                "start_date": today().to_string(),
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.text);
    assert_eq!(created.json()["next_run_date"], today().to_string());

    let first = ctx.post("/v1/recurring/process", &session, json!({})).await;
    assert_eq!(first.status, StatusCode::OK);
    let body = first.json();
    assert_eq!(body["processed"], 1);
    assert_eq!(body["message"], "Processed 1 recurring transactions");

    let second = ctx.post("/v1/recurring/process", &session, json!({})).await.json();
    assert_eq!(second["processed"], 0);
    assert_eq!(second["message"], "No due transactions");

    let transactions = ctx.get("/v1/transactions", &session).await.json();
    let transactions = transactions.as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["transaction_date"], today().to_string());

    let rules = ctx.get("/v1/recurring", &session).await.json();
    assert_ne!(rules[0]["next_run_date"], today().to_string());
}

#[tokio::test]
async fn test_goal_contributions_accumulate() {
    let ctx = TestContext::new().await;
    let session = ctx.sign_up("ada@example.com").await;

    let created = ctx
        .post(
            "/v1/goals",
            &session,
            json!({ "name": "Bike", "target_amount": 200.0 }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let goal = created.json();
    assert_eq!(goal["current_amount"], 0.0);
    let id = goal["id"].as_i64().unwrap();

    let uri = format!("/v1/goals/{}/contribute", id);
    ctx.post(&uri, &session, json!({ "amount": 50.0 })).await;
    let after = ctx.post(&uri, &session, json!({ "amount": 25.0 })).await;
    assert_eq!(after.status, StatusCode::OK);
    let body = after.json();
    assert_eq!(body["current_amount"], 75.0);
    assert_eq!(body["progress_percent"], 37.5);

    let negative = ctx.post(&uri, &session, json!({ "amount": -5.0 })).await;
    assert_eq!(negative.status, StatusCode::BAD_REQUEST);

    let missing = ctx
        .post("/v1/goals/9999/contribute", &session, json!({ "amount": 5.0 }))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.json()["message"], "Goal not found");
}

#[tokio::test]
async fn test_category_budget_goes_over() {
    let ctx = TestContext::new().await;
    let session = ctx.sign_up("ada@example.com").await;
    let account = ctx.first_account(&session).await;
    let food = ctx.category_named(&session, "Food").await;

    let updated = ctx
        .put(
            &format!("/v1/categories/{}", food),
            &session,
            json!({ "budget_limit": 100.0 }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.json()["budget"]["status"], "ON_TRACK");

    ctx.post(
        "/v1/transactions",
        &session,
        json!({
            "account_id": account,
            "category_id": food,
            "amount": 150.0,
            "type": "EXPENSE",
            "transaction_date": today().to_string(),
        }),
    )
    .await;

    let categories = ctx.get("/v1/categories", &session).await.json();
    let food = categories
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "Food")
        .unwrap();
    assert_eq!(food["spent"], 150.0);
    assert_eq!(food["budget"]["status"], "OVER_BUDGET");
    assert_eq!(food["budget"]["percent_used"], 100.0);
}

#[tokio::test]
async fn test_settings_default_then_update() {
    let ctx = TestContext::new().await;
    let session = ctx.sign_up("ada@example.com").await;

    let defaults = ctx.get("/v1/settings", &session).await;
    assert_eq!(defaults.status, StatusCode::OK);
    let body = defaults.json();
    assert_eq!(body["currency"], "USD");
    assert_eq!(body["decimals"], 2);

    let updated = ctx
        .put(
            "/v1/settings",
            &session,
            json!({ "country": "DE", "currency": "EUR", "currency_symbol": "€", "decimals": 2 }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.json()["currency"], "EUR");
    assert_eq!(ctx.get("/v1/settings", &session).await.json()["country"], "DE");

    let invalid = ctx
        .put(
            "/v1/settings",
            &session,
            json!({ "country": "DEU", "currency": "EUR", "currency_symbol": "€", "decimals": 2 }),
        )
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stats_overview_and_charts() {
    let ctx = TestContext::new().await;
    let session = ctx.sign_up("ada@example.com").await;
    let account = ctx.first_account(&session).await;
    let rent = ctx.category_named(&session, "Rent").await;

    ctx.post(
        "/v1/accounts",
        &session,
        json!({ "name": "Checking", "type": "BANK", "balance": 1000.0 }),
    )
    .await;

    for (amount, kind, category) in [(500.0, "INCOME", None), (200.0, "EXPENSE", Some(rent))] {
        ctx.post(
            "/v1/transactions",
            &session,
            json!({
                "account_id": account,
                "category_id": category,
                "amount": amount,
                "type": kind,
                "transaction_date": today().to_string(),
            }),
        )
        .await;
    }

    let overview = ctx.get("/v1/stats/overview", &session).await;
    assert_eq!(overview.status, StatusCode::OK);
    let body = overview.json();
    assert_eq!(body["net_worth"], 1000.0);
    assert_eq!(body["monthly_income"], 500.0);
    assert_eq!(body["monthly_expense"], 200.0);
    assert!(body["upcoming_bills"].as_array().unwrap().is_empty());

    let charts = ctx.get("/v1/stats/charts", &session).await.json();
    let history = charts["history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["month"], today().format("%Y-%m").to_string());
    assert_eq!(charts["categories"][0]["name"], "Rent");
    assert_eq!(charts["categories"][0]["total"], 200.0);
}

#[tokio::test]
async fn test_data_preview_and_reset() {
    let ctx = TestContext::new().await;
    let session = ctx.sign_up("ada@example.com").await;
    let account = ctx.first_account(&session).await;

    ctx.post(
        "/v1/transactions",
        &session,
        json!({
            "account_id": account,
            "amount": 9.0,
            "type": "EXPENSE",
            "transaction_date": today().to_string(),
        }),
    )
    .await;

    let preview = ctx.get("/v1/data", &session).await.json();
    assert_eq!(preview["transactions"].as_array().unwrap().len(), 1);
    assert_eq!(preview["categories"].as_array().unwrap().len(), 4);

    let reset = ctx.delete("/v1/data", &session).await;
    assert_eq!(reset.status, StatusCode::OK);
    let body = reset.json();
    assert_eq!(body["message"], "Data Reset Successful");
    assert_eq!(body["removed"]["transactions"], 1);
    assert_eq!(body["removed"]["accounts"], 1);
    assert!(set_cookie_headers(&reset.headers)
        .iter()
        .any(|c| c.starts_with("auth_token=;")));

    // The login survives a reset
    let after = ctx.get("/v1/data", &session).await.json();
    assert!(after["accounts"].as_array().unwrap().is_empty());
    assert_eq!(ctx.login("ada@example.com", TEST_PASSWORD).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_user_removes_the_login() {
    let ctx = TestContext::new().await;
    let session = ctx.sign_up("ada@example.com").await;

    let response = ctx
        .send(
            Method::DELETE,
            "/v1/data",
            Some(&session),
            Some(json!({ "delete_user": true })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["message"], "Account Deleted");

    assert_eq!(
        ctx.login("ada@example.com", TEST_PASSWORD).await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        ctx.get("/v1/auth/me", &session).await.status,
        StatusCode::UNAUTHORIZED
    );
}
