// kupub-client/examples/service_hub.rs
// Live service-hub counters for one department

use kupub_client::hub::{HubStats, SearchQuery, StageFilter, classify_and_filter};
use kupub_client::logger::init_logger;
use kupub_client::presentation::{Badge, format_phone};
use kupub_client::{ClientConfig, KupubClient};
use shared::client::LoginRequest;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logger("info", false)?;

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        println!("Usage: {} <dept> <username> <password>", args[0]);
        println!("  Example: {} cs manager secret", args[0]);
        return Ok(());
    }
    let (dept, username, password) = (&args[1], &args[2], &args[3]);

    let client = KupubClient::builder()
        .config(ClientConfig::from_env())
        .storage_dir(std::env::var("KUPUB_DATA_DIR").unwrap_or_else(|_| "./kupub-data".into()))
        .build()?;

    if !client.auth().is_authenticated() {
        let user = client
            .auth_api()
            .login(&LoginRequest {
                username: username.clone(),
                password: password.clone(),
                department_slug: Some(dept.clone()),
            })
            .await?;
        tracing::info!("Logged in as {} ({:?})", user.username, user.role);
    }

    let feed = client.department_feed(dept);
    let mut snapshots = client.reconcile(dept, Some(feed.events()));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }

        let snapshot = snapshots.borrow_and_update().clone();
        let HubStats {
            seated_people,
            empty_tables,
            waiting_sessions,
            unpaid_sessions,
        } = snapshot.stats();
        println!(
            "[{}] seated {seated_people} | empty tables {empty_tables} | waiting {waiting_sessions} | unpaid {unpaid_sessions}",
            if feed.is_live() { "live" } else { "polling" }
        );

        let hub = snapshot.hub();
        for staged in classify_and_filter(&hub, StageFilter::All, &SearchQuery::default()) {
            let session = &staged.entry.session;
            println!(
                "  {:<12} {} {}",
                Badge::for_stage(staged.stage).label,
                session.guest_name,
                session.guest_phone.as_deref().map(format_phone).unwrap_or_default()
            );
        }
    }

    feed.shutdown().await;
    Ok(())
}
