//! Runs the store against a real database. Skipped unless
//! `FEEDBACK_TEST_DB_CONNECTION_STRING` names one that may be wiped.

use std::env;

use futures::TryStreamExt;
use tokio::task;

use feedback_store::db::{Db, PgDb};
use feedback_store::errors::{FeedbackError, ValidationError};
use feedback_store::feedback::{Feedback, FeedbackChanges, NewFeedback, Priority, Status};
use feedback_store::query::{ListQuery, Ordering, Page, SortField};

const CONNECTION_STRING_VARIABLE: &str = "FEEDBACK_TEST_DB_CONNECTION_STRING";

#[tokio::test]
async fn store_works_against_postgres() {
    dotenv::dotenv().ok();

    let connection_string = match env::var(CONNECTION_STRING_VARIABLE) {
        Ok(s) => s,
        Err(_) => {
            eprintln!("{} not set, skipping", CONNECTION_STRING_VARIABLE);
            return;
        }
    };

    let db = make_db(connection_string).await;

    test_creation(&db).await;
    test_updates(&db).await;
    test_listing(&db).await;
    test_deletion(&db).await;
}

async fn make_db(connection_string: String) -> PgDb {
    let pool = sqlx::PgPool::connect(&connection_string)
        .await
        .expect("create PgPool from FEEDBACK_TEST_DB_CONNECTION_STRING");

    task::spawn_blocking(move || initialize_db_for_test(&connection_string))
        .await
        .expect("must spawn blocking task");

    PgDb::new(pool)
}

fn initialize_db_for_test(connection_string: &str) {
    use movine::Movine;
    // `movine` wants the synchronous client
    use postgres::{Client, NoTls};

    let mut client = Client::connect(connection_string, NoTls)
        .expect("create postgres::Client from FEEDBACK_TEST_DB_CONNECTION_STRING");

    {
        let mut movine = Movine::new(&mut client);

        if movine.status().is_err() {
            movine.initialize().expect("initialize movine");
        }

        movine.up().expect("run movine migrations");
    }

    client
        .simple_query("TRUNCATE feedback")
        .expect("empty feedback table");
}

fn submission(id: &str, location: &str) -> NewFeedback {
    NewFeedback {
        user_email: Some("porter@example.edu".to_owned()),
        ..NewFeedback::new(id, format!("Report {}", id), location)
    }
}

async fn list(db: &PgDb, query: ListQuery) -> Vec<Feedback> {
    db.list(query).try_collect().await.expect("list feedback")
}

async fn test_creation(db: &PgDb) {
    let created = db
        .create(submission("PG-1", "Boiler Room"))
        .await
        .expect("create feedback");
    assert_eq!(created.status, Status::Open);
    assert_eq!(created.priority, Priority::Low);
    assert_eq!(created.created_at(), created.updated_at());

    let detail = db.retrieve("PG-1").await.expect("retrieve feedback");
    assert_eq!(detail.feedback, created);

    match db.create(submission("PG-1", "Elsewhere")).await {
        Err(FeedbackError::Validation(ValidationError::DuplicateId { id })) => {
            assert_eq!(id, "PG-1")
        }
        other => panic!("expected duplicate ID error, got {:?}", other),
    }

    let dangling = NewFeedback {
        duplicate_of: Some("PG-404".to_owned()),
        ..submission("PG-2", "Boiler Room")
    };
    match db.create(dangling).await {
        Err(FeedbackError::ReferentialIntegrity { field, id }) => {
            assert_eq!((field, id.as_str()), ("duplicate_of", "PG-404"))
        }
        other => panic!("expected referential integrity error, got {:?}", other),
    }

    let duplicate = NewFeedback {
        duplicate_of: Some("PG-1".to_owned()),
        ..submission("PG-2", "Boiler Room")
    };
    db.create(duplicate).await.expect("create duplicate");

    let detail = db.retrieve("PG-2").await.expect("retrieve duplicate");
    assert_eq!(detail.duplicate.map(|d| d.id), Some("PG-1".to_owned()));

    let duplicates = db.duplicates("PG-1").await.expect("list duplicates");
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].id, "PG-2");

    assert!(matches!(
        db.duplicates("PG-404").await,
        Err(FeedbackError::NotFound { .. })
    ));
}

async fn test_updates(db: &PgDb) {
    let before = db.retrieve("PG-1").await.expect("retrieve feedback").feedback;

    let changes = FeedbackChanges {
        user_email: Some(None),
        ..FeedbackChanges::status(Status::Resolved)
    };
    let after = db.update("PG-1", changes).await.expect("update feedback");

    assert_eq!(after.status, Status::Resolved);
    assert_eq!(after.user_email, None);
    assert_eq!(after.location, before.location);
    assert_eq!(after.created_at(), before.created_at());
    assert!(after.updated_at() >= before.updated_at());

    assert!(matches!(
        db.update("PG-1", FeedbackChanges::duplicate_of(Some("PG-404"))).await,
        Err(FeedbackError::ReferentialIntegrity { .. })
    ));
    assert!(matches!(
        db.update("PG-1", FeedbackChanges::duplicate_of(Some("PG-1"))).await,
        Err(FeedbackError::Validation(ValidationError::SelfReference))
    ));
    assert!(matches!(
        db.update("PG-404", FeedbackChanges::priority(Priority::High)).await,
        Err(FeedbackError::NotFound { .. })
    ));
}

async fn test_listing(db: &PgDb) {
    db.create(submission("PG-3", "Attic"))
        .await
        .expect("create feedback");

    let all = list(db, ListQuery::default()).await;
    assert_eq!(all.len(), 3);

    let by_location = ListQuery {
        ordering: Ordering::ascending(SortField::Location),
        ..Default::default()
    };
    let ids: Vec<_> = list(db, by_location.clone())
        .await
        .into_iter()
        .map(|f| f.id)
        .collect();
    assert_eq!(ids, vec!["PG-3", "PG-2", "PG-1"]);

    let paged = ListQuery {
        page: Page {
            limit: Some(1),
            offset: 1,
        },
        ..by_location
    };
    let page = list(db, paged.clone()).await;
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, "PG-2");
    assert_eq!(db.count(paged).await.expect("count feedback"), 3);

    let resolved = ListQuery::with_status(Status::Resolved);
    assert_eq!(db.count(resolved).await.expect("count feedback"), 1);

    let searched = list(db, ListQuery::with_search("BOILER")).await;
    assert_eq!(searched.len(), 2);
}

async fn test_deletion(db: &PgDb) {
    db.delete("PG-1").await.expect("delete feedback");

    assert!(matches!(
        db.retrieve("PG-1").await,
        Err(FeedbackError::NotFound { .. })
    ));
    assert!(matches!(
        db.delete("PG-1").await,
        Err(FeedbackError::NotFound { .. })
    ));

    let referrer = db.retrieve("PG-2").await.expect("retrieve referrer");
    assert_eq!(referrer.feedback.duplicate_of, None);
    assert_eq!(referrer.duplicate, None);
}
