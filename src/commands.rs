//! CLI command handlers.
//!
//! Thin wrappers over [`DomoClient`]: parse loose input, call the endpoint,
//! print a plain-text rendering. All output goes to stdout; diagnostics go
//! through tracing.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::client::DomoClient;
use crate::error::ApiError;
use crate::models::{
    Application, ApplicationCreate, ApplicationStatus, Dictionaries, ProfileUpdate,
    RegisterRequest, RoomConfig, SensorKind, SensorReading, StatusUpdate, ToggleDeviceRequest,
    UserInfo,
};

/// `login` — sign in and persist the session.
pub async fn login(client: &DomoClient, login: &str, password: &str) -> Result<(), ApiError> {
    let user = client.sign_in(login, password).await?;
    println!("signed in as {}", describe_user(&user));
    if !user.is_admin && !user.application_submitted {
        if user.has_pending_application {
            println!("your provisioning application is awaiting review");
        } else {
            println!("no application on file yet; submit one with `domoctl apply`");
        }
    }
    Ok(())
}

/// `logout` — drop tokens and session state locally.
pub fn logout(client: &DomoClient) -> Result<(), ApiError> {
    client.sign_out();
    println!("signed out");
    Ok(())
}

/// `register` — create an account. Does not sign in.
pub async fn register(client: &DomoClient, login: &str, password: &str) -> Result<(), ApiError> {
    let user = client
        .register(RegisterRequest {
            login: login.to_string(),
            password: password.to_string(),
        })
        .await?;
    println!(
        "account '{}' registered; sign in with `domoctl login`",
        user.login
    );
    Ok(())
}

/// `whoami` — fetch the account from the backend.
pub async fn whoami(client: &DomoClient) -> Result<(), ApiError> {
    let user = client.me().await?;
    println!("{}", describe_user(&user));
    println!(
        "application: {}",
        match (user.has_pending_application, user.application_submitted) {
            (_, true) => "approved, home provisioned",
            (true, false) => "pending review",
            (false, false) => "not submitted",
        }
    );
    Ok(())
}

/// `status` — local session state, no network.
pub fn status(client: &DomoClient) -> Result<(), ApiError> {
    let session = client.session().current();
    if session.is_authenticated {
        match &session.user {
            Some(user) => println!("signed in as {}", describe_user(user)),
            None => println!("signed in"),
        }
    } else {
        println!("signed out");
    }
    let tokens = if client.tokens().pair().is_some() {
        "present"
    } else {
        "absent"
    };
    println!("stored tokens: {tokens}");
    Ok(())
}

/// `profile` — show the extended profile.
pub async fn profile(client: &DomoClient) -> Result<(), ApiError> {
    let profile = client.profile().await?;
    let name: Vec<&str> = [&profile.last_name, &profile.first_name, &profile.middle_name]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .collect();
    if !name.is_empty() {
        println!("name: {}", name.join(" "));
    }
    if let Some(created) = &profile.created_at {
        println!("member since: {created}");
    }
    println!(
        "applications: {} total, {} pending, {} approved, {} rejected",
        profile.total_applications,
        profile.pending_applications,
        profile.approved_applications,
        profile.rejected_applications
    );
    if let (Some(rooms), Some(sensors)) = (profile.total_rooms, profile.total_sensors) {
        println!("provisioned: {rooms} rooms, {sensors} sensors");
    }
    Ok(())
}

/// `update-profile` — change name fields.
pub async fn update_profile(client: &DomoClient, update: ProfileUpdate) -> Result<(), ApiError> {
    if update.is_empty() {
        return Err(ApiError::Validation {
            detail: "nothing to update; pass at least one of --first-name, --last-name, --middle-name".into(),
        });
    }
    client.update_profile(update).await?;
    println!("profile updated");
    Ok(())
}

/// `change-password`.
pub async fn change_password(
    client: &DomoClient,
    old_password: &str,
    new_password: &str,
) -> Result<(), ApiError> {
    client.change_password(old_password, new_password).await?;
    println!("password changed");
    Ok(())
}

/// `apply` — submit a provisioning application from room specs.
pub async fn apply(client: &DomoClient, room_specs: &[String]) -> Result<(), ApiError> {
    let mut rooms_config = Vec::with_capacity(room_specs.len());
    for spec in room_specs {
        rooms_config.push(
            parse_room_spec(spec).map_err(|detail| ApiError::Validation { detail })?,
        );
    }

    let application = client
        .create_application(ApplicationCreate { rooms_config })
        .await?;
    println!(
        "application #{} submitted ({})",
        application.id, application.status
    );

    // The application flags on the account change after submission; refresh
    // the session copy so `status` reflects them.
    match client.me().await {
        Ok(user) => client.session().set_user(user),
        Err(e) => warn!("application submitted but account refresh failed: {e}"),
    }
    Ok(())
}

/// `applications` — own applications, newest first.
pub async fn my_applications(client: &DomoClient) -> Result<(), ApiError> {
    let applications = client.my_applications().await?;
    print_application_rows(&applications);
    Ok(())
}

/// `admin-applications` — every application (admin only).
pub async fn admin_applications(
    client: &DomoClient,
    limit: Option<u32>,
    offset: Option<u32>,
) -> Result<(), ApiError> {
    let applications = client.admin_applications(limit, offset).await?;
    print_application_rows(&applications);
    Ok(())
}

/// `application <id>` — one application in full.
pub async fn show_application(client: &DomoClient, id: u64) -> Result<(), ApiError> {
    let application = client.application(id).await?;
    // Room and sensor names are a nicety; fall back to bare ids when the
    // catalogs cannot be fetched.
    let dictionaries = client.dictionaries().await.unwrap_or_default();
    print_application(&application, &dictionaries);
    Ok(())
}

/// `approve <id>` / `reject <id>` — admin decision.
pub async fn process_application(
    client: &DomoClient,
    id: u64,
    status: ApplicationStatus,
    comment: Option<String>,
) -> Result<(), ApiError> {
    let application = client
        .process_application(
            id,
            StatusUpdate {
                status,
                rejection_comment: comment,
            },
        )
        .await?;
    println!("application #{} is now {}", application.id, application.status);
    Ok(())
}

/// `user-applications <user-id>` — one user's applications (admin only).
pub async fn user_applications(client: &DomoClient, user_id: i64) -> Result<(), ApiError> {
    let applications = client.user_applications(user_id).await?;
    print_application_rows(&applications);
    Ok(())
}

/// `dictionaries` — selectable room and sensor catalogs.
pub async fn dictionaries(client: &DomoClient) -> Result<(), ApiError> {
    let dictionaries = client.dictionaries().await?;
    println!("rooms:");
    for (id, name) in &dictionaries.rooms {
        println!("  {id:>4}  {name}");
    }
    println!("sensors:");
    for (id, name) in &dictionaries.sensors {
        println!("  {id:>4}  {name}");
    }
    Ok(())
}

/// `rooms` — provisioned rooms with their sensors.
pub async fn rooms(client: &DomoClient) -> Result<(), ApiError> {
    let rooms = client.user_rooms().await?;
    if rooms.is_empty() {
        println!("no provisioned rooms yet");
        return Ok(());
    }
    for room in &rooms {
        println!("room {} — {}", room.id, room.name);
        for sensor in &room.sensors {
            println!("  sensor {:>4}  {}", sensor.id, sensor.kind);
        }
        if room.sensors.is_empty() {
            println!("  (no sensors)");
        }
    }
    Ok(())
}

/// `devices <room-id>` — sensors installed in one room.
pub async fn room_devices(client: &DomoClient, room_id: u64) -> Result<(), ApiError> {
    let devices = client.room_devices(room_id).await?;
    if devices.is_empty() {
        println!("room {room_id} has no devices");
        return Ok(());
    }
    for device in &devices {
        println!("sensor {:>4}  {}", device.id, device.kind);
    }
    Ok(())
}

/// `sensor <kind> <id>` — one reading, or a polling loop with `--watch`.
pub async fn sensor(
    client: &DomoClient,
    kind: SensorKind,
    id: u64,
    watch: bool,
    interval_secs: u64,
) -> Result<(), ApiError> {
    if !watch {
        let reading = client.sensor_reading(kind, id).await?;
        println!("{}", describe_reading(id, &reading));
        return Ok(());
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let cancel = CancellationToken::new();
    info!(%kind, id, interval_secs, "watching sensor; Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                cancel.cancel();
                println!("stopped");
                return Ok(());
            }
            _ = ticker.tick() => {
                match client.sensor_reading_cancellable(kind, id, cancel.clone()).await {
                    Ok(reading) => println!("{}", describe_reading(id, &reading)),
                    // Keep polling through transient network trouble; anything
                    // else (401 after refresh, 404, decode) ends the loop.
                    Err(ApiError::Transport(e)) => warn!("poll failed: {e}"),
                    Err(e) => return Err(e),
                }
            }
        }
    }
}

/// `mode` — show the control mode, or switch it first when `set` is given.
pub async fn mode(client: &DomoClient, set_manual: Option<bool>) -> Result<(), ApiError> {
    let mode = match set_manual {
        Some(is_manual) => client.set_control_mode(is_manual).await?,
        None => client.control_mode().await?,
    };
    println!(
        "control mode: {}",
        if mode.is_manual { "manual" } else { "automatic" }
    );
    Ok(())
}

/// `toggle` — switch a light or ventilation device.
pub async fn toggle(
    client: &DomoClient,
    kind: SensorKind,
    room_id: u64,
    sensor_id: u64,
    is_on: bool,
) -> Result<(), ApiError> {
    if !kind.is_switchable() {
        return Err(ApiError::Validation {
            detail: format!("{kind} sensors cannot be toggled; only light and ventilation can"),
        });
    }
    client
        .toggle_device(ToggleDeviceRequest {
            kind,
            room_id,
            sensor_id,
            is_on,
        })
        .await?;
    println!(
        "sensor {sensor_id} in room {room_id} switched {}",
        if is_on { "on" } else { "off" }
    );
    Ok(())
}

/// `outdoor` — latest outdoor temperature aggregate.
pub async fn outdoor(client: &DomoClient) -> Result<(), ApiError> {
    let outdoor = client.outdoor_temperature().await?;
    println!(
        "outdoor temperature: {:.1} to {:.1} °C",
        outdoor.min_temperature, outdoor.max_temperature
    );
    for side in &outdoor.temperatures {
        println!("  {:<12} {:.1} °C", side.side, side.value);
    }
    Ok(())
}

/// `users` — account list with application counters (admin only).
pub async fn admin_users(
    client: &DomoClient,
    limit: Option<u32>,
    offset: Option<u32>,
) -> Result<(), ApiError> {
    let users = client.admin_users(limit, offset).await?;
    for user in &users {
        let role = if user.is_admin { "admin" } else { "user" };
        let state = if user.is_active { "active" } else { "inactive" };
        print!("{:>4}  {:<20} {role:<6} {state:<9}", user.id, user.login);
        if user.is_admin {
            println!();
        } else {
            println!(
                " applications: {} ({} pending, {} approved, {} rejected)",
                user.applications_count,
                user.pending_applications,
                user.approved_applications,
                user.rejected_applications
            );
        }
    }
    Ok(())
}

/// Parses a room spec of the form `ROOM_ID` or `ROOM_ID=SENSOR_ID,SENSOR_ID`.
fn parse_room_spec(spec: &str) -> Result<RoomConfig, String> {
    let (room_part, sensors_part) = match spec.split_once('=') {
        Some((room, sensors)) => (room, Some(sensors)),
        None => (spec, None),
    };

    let room_id: u64 = room_part
        .trim()
        .parse()
        .map_err(|_| format!("invalid room id in '{spec}'"))?;

    let mut sensor_ids = Vec::new();
    if let Some(sensors) = sensors_part {
        for part in sensors.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let sensor_id: u64 = part
                .parse()
                .map_err(|_| format!("invalid sensor id '{part}' in '{spec}'"))?;
            sensor_ids.push(sensor_id);
        }
    }

    Ok(RoomConfig {
        room_id,
        sensor_ids,
    })
}

fn describe_user(user: &UserInfo) -> String {
    let role = if user.is_admin { "admin" } else { "user" };
    format!("{} (id {}, {role})", user.login, user.id)
}

fn describe_reading(id: u64, reading: &SensorReading) -> String {
    match reading {
        SensorReading::Temperature(t) => format!("temperature sensor {id}: {:.1} °C", t.value),
        SensorReading::Light(s) => format!(
            "light sensor {} (room {}): {}",
            s.sensor_id,
            s.room_id,
            if s.is_on { "on" } else { "off" }
        ),
        SensorReading::Ventilation(s) => format!(
            "ventilation sensor {} (room {}): {}",
            s.sensor_id,
            s.room_id,
            if s.is_on { "on" } else { "off" }
        ),
        SensorReading::Gas(g) => {
            let alarm = match g.value {
                Some(true) => "alarm",
                Some(false) => "clear",
                None => "no data",
            };
            format!("gas sensor {id}: {} ({alarm})", g.status)
        }
        SensorReading::Humidity(h) => {
            format!("humidity sensor {id}: {:.1} %", h.humidity_level)
        }
    }
}

fn print_application_rows(applications: &[Application]) {
    if applications.is_empty() {
        println!("no applications");
        return;
    }
    for application in applications {
        let sensors: usize = application
            .rooms_config
            .iter()
            .map(|r| r.sensor_ids.len())
            .sum();
        // `as_str` so the width spec applies; the enum's Display ignores it.
        print!(
            "#{:<5} {:<9} {} rooms, {sensors} sensors, created {}",
            application.id,
            application.status.as_str(),
            application.rooms_config.len(),
            application.created_at
        );
        if let Some(login) = &application.user_login {
            print!("  [{login}]");
        }
        println!();
    }
}

fn print_application(application: &Application, dictionaries: &Dictionaries) {
    println!("application #{}", application.id);
    println!("  status:  {}", application.status);
    if let Some(login) = &application.user_login {
        match application.user_id {
            Some(user_id) => println!("  user:    {login} (id {user_id})"),
            None => println!("  user:    {login}"),
        }
    }
    println!("  created: {}", application.created_at);
    println!("  updated: {}", application.updated_at);
    if let Some(comment) = &application.rejection_comment {
        println!("  comment: {comment}");
    }
    println!("  rooms:");
    for config in &application.rooms_config {
        let sensors = if config.sensor_ids.is_empty() {
            "no sensors".to_string()
        } else {
            config
                .sensor_ids
                .iter()
                .map(|&id| dictionaries.sensor_name(id))
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!(
            "    {}: {sensors}",
            dictionaries.room_name(config.room_id)
        );
    }
}
