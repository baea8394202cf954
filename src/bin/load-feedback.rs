use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use dotenv::dotenv;
use log::{info, initialize_logger, warn};
use structopt::StructOpt;

use feedback_store::config::get_variable;
use feedback_store::db::{Db, PgDb};
use feedback_store::feedback::NewFeedback;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "load-feedback",
    about = "Create feedback records from JSON files"
)]
struct Opt {
    /// Carry on past records that fail to save
    #[structopt(short, long)]
    keep_going: bool,

    /// Files each holding a JSON array of submissions
    #[structopt(parse(from_os_str), required = true)]
    files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let opt = Opt::from_args();

    let logger = initialize_logger();

    let connection_string = get_variable("FEEDBACK_DB_CONNECTION_STRING");
    let pool = sqlx::PgPool::connect(&connection_string).await?;
    let db = PgDb::new(pool);

    let mut created = 0;
    let mut failed = 0;

    for path in &opt.files {
        let logger = logger.new(log::o!("file" => path.display().to_string()));
        let submissions: Vec<serde_json::Value> =
            serde_json::from_reader(BufReader::new(File::open(path)?))?;
        let submissions = submissions
            .into_iter()
            .map(NewFeedback::from_json)
            .collect::<Result<Vec<_>, _>>()?;

        info!(logger, "Loading {} records...", submissions.len());

        for submission in submissions {
            let id = submission.id.clone();

            match db.create(submission).await {
                Ok(feedback) => {
                    info!(logger, "Created {}", feedback);
                    created += 1;
                }
                Err(e) if opt.keep_going => {
                    warn!(logger, "Could not create feedback"; "id" => &id, "error" => %e);
                    failed += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    info!(logger, "Finished loading"; "created" => created, "failed" => failed);

    Ok(())
}
