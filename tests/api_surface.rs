//! Integration tests for the typed endpoint wrappers: request payloads,
//! paths, and response decoding against a mock backend.

mod support;

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use domoctl::models::{
    ApplicationCreate, ApplicationStatus, RegisterRequest, RoomConfig, SensorKind, SensorReading,
    StatusUpdate, ToggleDeviceRequest,
};
use domoctl::ApiError;
use support::{can_bind_localhost, detail_body, test_client};

fn application_body(id: u64, status: &str) -> Value {
    json!({
        "id": id,
        "user_id": 1,
        "user_login": "anna",
        "rooms_config": [{ "room_id": 1, "sensor_ids": [4, 5] }],
        "status": status,
        "rejection_comment": null,
        "created_at": "2025-03-01T10:00:00Z",
        "updated_at": "2025-03-02T08:30:00Z"
    })
}

#[tokio::test]
async fn submit_application_sends_rooms_config() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    let t = test_client(&server.uri());
    t.tokens.save("acc", "ref").unwrap();

    Mock::given(method("POST"))
        .and(path("/applications"))
        .and(body_json(json!({
            "rooms_config": [{ "room_id": 1, "sensor_ids": [4, 5] }]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(application_body(12, "pending")))
        .expect(1)
        .mount(&server)
        .await;

    let app = t
        .client
        .create_application(ApplicationCreate {
            rooms_config: vec![RoomConfig {
                room_id: 1,
                sensor_ids: vec![4, 5],
            }],
        })
        .await
        .unwrap();
    assert_eq!(app.id, 12);
    assert_eq!(app.status, ApplicationStatus::Pending);
}

#[tokio::test]
async fn register_reports_duplicate_login() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    let t = test_client(&server.uri());

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .and(body_json(json!({ "login": "anna", "password": "s3cret" })))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(detail_body("User with this login already exists")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = t
        .client
        .register(RegisterRequest {
            login: "anna".into(),
            password: "s3cret".into(),
        })
        .await
        .unwrap_err();
    match err {
        ApiError::Validation { detail } => {
            assert_eq!(detail, "User with this login already exists");
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[tokio::test]
async fn change_password_rejects_wrong_old_password() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    let t = test_client(&server.uri());
    t.tokens.save("acc", "ref").unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/change-password"))
        .and(body_json(json!({ "old_password": "nope", "new_password": "next" })))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(detail_body("Old password is incorrect")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = t.client.change_password("nope", "next").await.unwrap_err();
    match err {
        ApiError::Validation { detail } => assert_eq!(detail, "Old password is incorrect"),
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[tokio::test]
async fn dictionaries_decode_numeric_keys() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    let t = test_client(&server.uri());
    t.tokens.save("acc", "ref").unwrap();

    Mock::given(method("GET"))
        .and(path("/applications/dictionaries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rooms": { "1": "Kitchen", "2": "Bedroom" },
            "sensors": { "10": "Thermometer", "11": "Gas detector" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dict = t.client.dictionaries().await.unwrap();
    assert_eq!(dict.room_name(2), "Bedroom");
    assert_eq!(dict.sensor_name(11), "Gas detector");
    assert_eq!(dict.sensor_name(999), "sensor 999");
}

#[tokio::test]
async fn review_payload_includes_comment_only_on_rejection() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    let t = test_client(&server.uri());
    t.tokens.save("acc", "ref").unwrap();

    // Exact-body matchers prove the comment key is absent on approval.
    Mock::given(method("PUT"))
        .and(path("/applications/12"))
        .and(body_json(json!({ "status": "approved" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(application_body(12, "approved")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/applications/13"))
        .and(body_json(json!({ "status": "rejected", "rejection_comment": "incomplete" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(application_body(13, "rejected")))
        .expect(1)
        .mount(&server)
        .await;

    let approved = t
        .client
        .process_application(
            12,
            StatusUpdate {
                status: ApplicationStatus::Approved,
                rejection_comment: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(approved.status, ApplicationStatus::Approved);

    let rejected = t
        .client
        .process_application(
            13,
            StatusUpdate {
                status: ApplicationStatus::Rejected,
                rejection_comment: Some("incomplete".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(rejected.status, ApplicationStatus::Rejected);
}

#[tokio::test]
async fn application_lists_hit_their_paths() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    let t = test_client(&server.uri());
    t.tokens.save("acc", "ref").unwrap();

    Mock::given(method("GET"))
        .and(path("/applications/my"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([application_body(12, "pending")])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/applications/admin/42/applications"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([application_body(13, "approved")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mine = t.client.my_applications().await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, 12);

    let theirs = t.client.user_applications(42).await.unwrap();
    assert_eq!(theirs[0].status, ApplicationStatus::Approved);
}

#[tokio::test]
async fn admin_lists_omit_unset_paging() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    let t = test_client(&server.uri());
    t.tokens.save("acc", "ref").unwrap();

    let seen_query = Arc::new(Mutex::new(String::new()));
    let seen_query_clone = seen_query.clone();
    Mock::given(method("GET"))
        .and(path("/users/admin/list"))
        .respond_with(move |req: &Request| {
            *seen_query_clone.lock().unwrap() = req.url.query().unwrap_or_default().to_string();
            ResponseTemplate::new(200).set_body_json(json!([{
                "id": 2,
                "login": "bob",
                "is_admin": false,
                "is_active": true,
                "applications_count": 3,
                "pending_applications": 1,
                "approved_applications": 2,
                "rejected_applications": 0,
                "created_at": "2025-01-05T12:00:00Z"
            }]))
        })
        .expect(1)
        .mount(&server)
        .await;

    let users = t.client.admin_users(Some(50), None).await.unwrap();
    assert_eq!(users[0].login, "bob");
    assert_eq!(users[0].applications_count, 3);

    let query = seen_query.lock().unwrap().clone();
    assert!(query.contains("limit=50"), "query was: {query}");
    assert!(!query.contains("offset"), "query was: {query}");
}

#[tokio::test]
async fn rooms_and_devices_decode() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    let t = test_client(&server.uri());
    t.tokens.save("acc", "ref").unwrap();

    Mock::given(method("GET"))
        .and(path("/rooms/user-rooms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 3,
            "name": "Kitchen",
            "sensors": [
                { "id": 7, "type": "temperature" },
                { "id": 8, "type": "light" }
            ]
        }])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rooms/3/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 7, "type": "temperature" },
            { "id": 9, "type": "ventilation" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let rooms = t.client.user_rooms().await.unwrap();
    assert_eq!(rooms[0].name, "Kitchen");
    assert_eq!(rooms[0].sensors.len(), 2);
    assert_eq!(rooms[0].sensors[1].kind, SensorKind::Light);

    let devices = t.client.room_devices(3).await.unwrap();
    assert_eq!(devices[1].kind, SensorKind::Ventilation);
}

#[tokio::test]
async fn sensor_readings_decode_per_kind() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    let t = test_client(&server.uri());
    t.tokens.save("acc", "ref").unwrap();

    Mock::given(method("GET"))
        .and(path("/sensors/temperature/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": 21.5 })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sensors/light/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sensor_id": 2, "room_id": 3, "is_on": true
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sensors/gas/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": null, "status": "no data yet"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sensors/humidity/4"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "humidity_level": 48.0 })),
        )
        .mount(&server)
        .await;

    match t
        .client
        .sensor_reading(SensorKind::Temperature, 1)
        .await
        .unwrap()
    {
        SensorReading::Temperature(r) => assert!((r.value - 21.5).abs() < f64::EPSILON),
        other => panic!("unexpected reading: {other:?}"),
    }
    match t.client.sensor_reading(SensorKind::Light, 2).await.unwrap() {
        SensorReading::Light(r) => assert!(r.is_on),
        other => panic!("unexpected reading: {other:?}"),
    }
    match t.client.sensor_reading(SensorKind::Gas, 3).await.unwrap() {
        SensorReading::Gas(r) => {
            assert_eq!(r.value, None);
            assert_eq!(r.status, "no data yet");
        }
        other => panic!("unexpected reading: {other:?}"),
    }
    match t
        .client
        .sensor_reading(SensorKind::Humidity, 4)
        .await
        .unwrap()
    {
        SensorReading::Humidity(r) => assert!((r.humidity_level - 48.0).abs() < f64::EPSILON),
        other => panic!("unexpected reading: {other:?}"),
    }
}

#[tokio::test]
async fn control_mode_get_and_set() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    let t = test_client(&server.uri());
    t.tokens.save("acc", "ref").unwrap();

    Mock::given(method("GET"))
        .and(path("/home-control/mode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "is_manual": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/home-control/mode"))
        .and(body_json(json!({ "is_manual": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "is_manual": false })))
        .expect(1)
        .mount(&server)
        .await;

    let mode = t.client.control_mode().await.unwrap();
    assert!(mode.is_manual);
    let mode = t.client.set_control_mode(false).await.unwrap();
    assert!(!mode.is_manual);
}

#[tokio::test]
async fn toggle_device_sends_kind_under_type_key() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    let t = test_client(&server.uri());
    t.tokens.save("acc", "ref").unwrap();

    Mock::given(method("PATCH"))
        .and(path("/home-control/toggle-device"))
        .and(body_json(json!({
            "type": "light", "room_id": 3, "sensor_id": 8, "is_on": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    t.client
        .toggle_device(ToggleDeviceRequest {
            kind: SensorKind::Light,
            room_id: 3,
            sensor_id: 8,
            is_on: true,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn outdoor_temperature_decodes_sides() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    let t = test_client(&server.uri());
    t.tokens.save("acc", "ref").unwrap();

    Mock::given(method("GET"))
        .and(path("/outdoor-temperature/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "min_temperature": -3.2,
            "max_temperature": 1.4,
            "temperatures": [
                { "side": "north", "value": -3.2 },
                { "side": "south", "value": 1.4 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outdoor = t.client.outdoor_temperature().await.unwrap();
    assert!((outdoor.min_temperature + 3.2).abs() < f64::EPSILON);
    assert_eq!(outdoor.temperatures.len(), 2);
    assert_eq!(outdoor.temperatures[1].side, "south");
}
