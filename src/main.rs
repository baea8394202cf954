use std::error::Error;
use std::sync::Arc;

use futures::future::FutureExt;
use tokio::sync::mpsc;
use warp::Filter;

use feedback_store::admin::AdminSite;
use feedback_store::config::{get_variable, get_variable_or, parse_variable, Storage};
use feedback_store::db::memory::MemoryDb;
use feedback_store::db::PgDb;
use feedback_store::environment::{Config, Environment, SafeDb};
use feedback_store::routes;
use feedback_store::urls::Urls;
use log::{info, initialize_logger, warn};

const DEFAULT_LIST_PER_PAGE: &str = "100";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let logger = initialize_logger();

    let main_port: u16 = parse_variable("FEEDBACK_PORT", None);
    let admin_port: u16 = parse_variable("FEEDBACK_ADMIN_PORT", None);
    let storage: Storage = parse_variable("FEEDBACK_STORAGE", Some("postgres"));
    let list_per_page: u32 = parse_variable("FEEDBACK_LIST_PER_PAGE", Some(DEFAULT_LIST_PER_PAGE));

    info!(logger, "Starting..."; "main_port" => main_port, "admin_port" => admin_port, "storage" => ?storage);
    let logger = Arc::new(logger);

    let db: Arc<SafeDb> = match storage {
        Storage::Postgres => {
            info!(logger, "Creating database pool...");
            let connection_string = get_variable("FEEDBACK_DB_CONNECTION_STRING");
            let pool = sqlx::PgPool::connect(&connection_string).await?;
            Arc::new(PgDb::new(pool))
        }
        Storage::Memory => {
            warn!(logger, "Keeping feedback in memory; it will be lost on exit");
            Arc::new(MemoryDb::new())
        }
    };

    let urls = Arc::new(Urls::new(
        get_variable("FEEDBACK_BASE_URL"),
        get_variable_or("FEEDBACK_PATH", "feedback"),
    )?);

    let admin = Arc::new(AdminSite::initialize(list_per_page)?);

    let config = Config::new(list_per_page);
    let environment = Environment::new(logger.clone(), db, urls, admin, config);

    let (termination_sender, mut termination_receiver) = mpsc::channel::<()>(1);

    let terminate = Arc::new(move || {
        let termination_sender = termination_sender.clone();

        async move {
            // a closed channel means shutdown is already under way
            termination_sender.send(()).await.ok();
        }
        .boxed()
    });

    let should_terminate = async move {
        termination_receiver.recv().await;
    }
    .shared();

    let ctrlc = {
        let should_terminate = should_terminate.clone();
        let terminate = terminate.clone();

        let signal = tokio::signal::ctrl_c();

        async move {
            tokio::select! {
                _ = should_terminate => {},
                _ = signal => {
                    terminate().await;
                }
            }
        }
    };

    let main_server = {
        let should_terminate = should_terminate.clone();

        let logger2 = logger.clone();

        let routes = routes::make_feedback_routes(environment.clone())
            .recover(move |r| routes::format_rejection(logger2.clone(), r));

        let (_, main_server) =
            warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], main_port), async {
                should_terminate.await;
            });

        main_server
    };

    let admin_server = {
        let should_terminate = should_terminate.clone();
        let terminate = terminate.clone();

        let routes = routes::admin::make_healthz_route(environment.clone()).or(
            routes::admin::make_termination_route(environment.clone(), terminate),
        );

        let (_, admin_server) =
            warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], admin_port), async {
                should_terminate.await;
            });

        admin_server
    };

    tokio::join!(ctrlc, main_server, admin_server);

    info!(logger, "Exiting gracefully...");

    Ok(())
}
