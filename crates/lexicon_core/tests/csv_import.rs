use lexicon_core::db::open_db_in_memory;
use lexicon_core::{
    import_csv_atomically, import_csv_cancellable, Category, CategoryRepository,
    ImportCancellation, ImportError, ImportOptions, ImportOutcome, ImportService,
    SqliteCategoryRepository, SqliteWordRepository, UploadedFile, WordListQuery, WordRepository,
};
use rusqlite::Connection;
use std::collections::HashSet;

const FRUIT_CSV: &str = "term,definition,path
Orange,A citrus fruit,Food > Fruits > Citrus
Lemon,A sour citrus fruit,Food > Fruits > Citrus
Apple,A pome fruit,Food > Fruits > Core
";

fn import(conn: &Connection, upload: Option<UploadedFile<'_>>) -> Result<ImportOutcome, ImportError> {
    let service = ImportService::new(
        SqliteCategoryRepository::try_new(conn).unwrap(),
        SqliteWordRepository::try_new(conn).unwrap(),
    );
    service.import(upload)
}

fn category<'a>(outcome: &'a ImportOutcome, name: &str) -> &'a Category {
    outcome
        .categories
        .iter()
        .find(|category| category.name == name)
        .unwrap_or_else(|| panic!("category {name} missing"))
}

fn word_category<'a>(outcome: &'a ImportOutcome, term: &str) -> &'a str {
    outcome
        .words
        .words
        .iter()
        .find(|word| word.term == term)
        .map(|word| word.category.as_str())
        .unwrap_or_else(|| panic!("word {term} missing"))
}

fn assert_store_empty(conn: &Connection) {
    let categories = SqliteCategoryRepository::try_new(conn).unwrap();
    let words = SqliteWordRepository::try_new(conn).unwrap();
    assert!(categories.list_categories().unwrap().is_empty());
    assert_eq!(words.list_words(&WordListQuery::default()).unwrap().total, 0);
}

#[test]
fn import_builds_shared_tree_and_binds_words_to_leaves() {
    let conn = open_db_in_memory().unwrap();
    let outcome = import(&conn, Some(UploadedFile::csv(FRUIT_CSV.as_bytes()))).unwrap();

    assert_eq!(outcome.categories.len(), 4);
    assert_eq!(outcome.words.total, 3);
    assert_eq!(outcome.words.words.len(), 3);

    let food = category(&outcome, "Food");
    let fruits = category(&outcome, "Fruits");
    let citrus = category(&outcome, "Citrus");
    let core = category(&outcome, "Core");
    assert_eq!(food.id, "food");
    assert_eq!(food.parent_id, None);
    assert_eq!(fruits.parent_id.as_deref(), Some(food.id.as_str()));
    assert_eq!(citrus.parent_id.as_deref(), Some(fruits.id.as_str()));
    assert_eq!(core.parent_id.as_deref(), Some(fruits.id.as_str()));
    assert_eq!(citrus.id, "food-fruits-citrus");

    assert_eq!(word_category(&outcome, "Orange"), citrus.id);
    assert_eq!(word_category(&outcome, "Lemon"), citrus.id);
    assert_eq!(word_category(&outcome, "Apple"), core.id);
}

#[test]
fn importing_twice_keeps_categories_and_duplicates_words() {
    let conn = open_db_in_memory().unwrap();
    let first = import(&conn, Some(UploadedFile::csv(FRUIT_CSV.as_bytes()))).unwrap();
    let second = import(&conn, Some(UploadedFile::csv(FRUIT_CSV.as_bytes()))).unwrap();

    assert_eq!(first.categories, second.categories);
    let ids: HashSet<_> = second.categories.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids.len(), second.categories.len());

    assert_eq!(second.words.total, 6);
    let word_ids: HashSet<_> = second.words.words.iter().map(|w| w.id.as_str()).collect();
    assert_eq!(word_ids.len(), 6);
}

#[test]
fn existing_category_metadata_is_not_overwritten() {
    let conn = open_db_in_memory().unwrap();
    let categories = SqliteCategoryRepository::try_new(&conn).unwrap();
    let mut food = Category::new("food", "Food", None);
    food.description = "Curated by hand".to_string();
    food.icon = Some("apple".to_string());
    categories.upsert_if_absent(&food).unwrap();

    let csv = "term,definition,path\nBread,Baked dough,FOOD > Bakery\n";
    let outcome = import(&conn, Some(UploadedFile::csv(csv.as_bytes()))).unwrap();

    let stored = outcome
        .categories
        .iter()
        .find(|category| category.id == "food")
        .unwrap();
    assert_eq!(stored, &food);
    assert_eq!(word_category(&outcome, "Bread"), "food-bakery");
}

#[test]
fn deep_paths_are_created_parents_first() {
    let conn = open_db_in_memory().unwrap();
    let csv = "term,definition,path
Kumquat,Tiny citrus,Food > Fruits > Citrus > Small > Oval
Lime,Green citrus,Food > Fruits > Citrus
";
    let outcome = import(&conn, Some(UploadedFile::csv(csv.as_bytes()))).unwrap();

    assert_eq!(outcome.categories.len(), 5);
    assert_eq!(
        word_category(&outcome, "Kumquat"),
        "food-fruits-citrus-small-oval"
    );
    for category in &outcome.categories {
        if let Some(parent_id) = category.parent_id.as_deref() {
            assert!(outcome.categories.iter().any(|c| c.id == parent_id));
        }
    }
}

#[test]
fn inner_whitespace_is_kept_in_category_ids() {
    let conn = open_db_in_memory().unwrap();
    let csv = "term,definition,path
Orange,A citrus fruit,Food > Citrus Fruits
Yuzu,A fragrant citrus,Food > Citrus-Fruits
";
    let outcome = import(&conn, Some(UploadedFile::csv(csv.as_bytes()))).unwrap();

    assert_eq!(outcome.categories.len(), 3);
    assert_eq!(word_category(&outcome, "Orange"), "food-citrus fruits");
    assert_eq!(word_category(&outcome, "Yuzu"), "food-citrus-fruits");
    assert_eq!(category(&outcome, "Citrus Fruits").id, "food-citrus fruits");
}

#[test]
fn missing_file_is_a_client_error_without_side_effects() {
    let conn = open_db_in_memory().unwrap();
    let err = import(&conn, None).unwrap_err();

    assert!(matches!(err, ImportError::NoFile));
    assert!(err.is_client_error());
    assert_eq!(err.to_string(), "No file uploaded");
    assert_store_empty(&conn);
}

#[test]
fn non_csv_upload_is_rejected_without_side_effects() {
    let conn = open_db_in_memory().unwrap();
    let upload = UploadedFile {
        content_type: Some("text/plain"),
        bytes: FRUIT_CSV.as_bytes(),
    };
    let err = import(&conn, Some(upload)).unwrap_err();

    assert!(matches!(err, ImportError::InvalidContentType(Some(ref value)) if value == "text/plain"));
    assert!(!err.is_client_error());
    assert_store_empty(&conn);
}

#[test]
fn row_missing_path_fails_whole_import() {
    let conn = open_db_in_memory().unwrap();
    let csv = "term,definition,path
Orange,A citrus fruit,Food > Fruits > Citrus
Lemon,A sour citrus fruit,
";
    let err = import(&conn, Some(UploadedFile::csv(csv.as_bytes()))).unwrap_err();

    assert!(matches!(err, ImportError::MissingFields { line: 3 }));
    assert_store_empty(&conn);
}

#[test]
fn oversized_upload_is_rejected_before_parsing() {
    let conn = open_db_in_memory().unwrap();
    let service = ImportService::with_options(
        SqliteCategoryRepository::try_new(&conn).unwrap(),
        SqliteWordRepository::try_new(&conn).unwrap(),
        ImportOptions {
            max_upload_bytes: 16,
            ..ImportOptions::default()
        },
    );
    let err = service
        .import(Some(UploadedFile::csv(FRUIT_CSV.as_bytes())))
        .unwrap_err();

    assert!(matches!(err, ImportError::UploadTooLarge { limit: 16, .. }));
    assert!(err.is_client_error());
    assert_store_empty(&conn);
}

#[test]
fn header_only_file_imports_nothing() {
    let conn = open_db_in_memory().unwrap();
    let outcome = import(&conn, Some(UploadedFile::csv(b"term,definition,path\n"))).unwrap();
    assert!(outcome.categories.is_empty());
    assert_eq!(outcome.words.total, 0);
}

#[test]
fn atomic_import_commits_on_success() {
    let mut conn = open_db_in_memory().unwrap();
    let outcome = import_csv_atomically(
        &mut conn,
        Some(UploadedFile::csv(FRUIT_CSV.as_bytes())),
        ImportOptions::default(),
    )
    .unwrap();
    assert_eq!(outcome.words.total, 3);

    let words = SqliteWordRepository::try_new(&conn).unwrap();
    assert_eq!(words.list_words(&WordListQuery::default()).unwrap().total, 3);
}

#[test]
fn atomic_import_rolls_back_when_a_write_fails() {
    let mut conn = open_db_in_memory().unwrap();
    // A trigger that rejects one term simulates a store failure mid-import,
    // after categories and earlier words were already written.
    conn.execute_batch(
        "CREATE TRIGGER reject_apple BEFORE INSERT ON words
         WHEN NEW.term = 'Apple'
         BEGIN
             SELECT RAISE(ABORT, 'apple rejected');
         END;",
    )
    .unwrap();

    let err = import_csv_atomically(
        &mut conn,
        Some(UploadedFile::csv(FRUIT_CSV.as_bytes())),
        ImportOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ImportError::Repo(_)));
    assert_store_empty(&conn);
}

#[test]
fn import_cancelled_before_start_touches_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    let cancellation = ImportCancellation::new();
    assert!(cancellation.cancel());

    let err = import_csv_cancellable(
        &mut conn,
        Some(UploadedFile::csv(FRUIT_CSV.as_bytes())),
        ImportOptions::default(),
        &cancellation,
    )
    .unwrap_err();
    assert!(matches!(err, ImportError::Cancelled));
    assert_store_empty(&conn);
}

#[test]
fn cancelled_service_stops_before_first_write() {
    let conn = open_db_in_memory().unwrap();
    let cancellation = ImportCancellation::new();
    cancellation.cancel();
    let service = ImportService::new(
        SqliteCategoryRepository::try_new(&conn).unwrap(),
        SqliteWordRepository::try_new(&conn).unwrap(),
    )
    .with_cancellation(cancellation);

    let err = service
        .import(Some(UploadedFile::csv(FRUIT_CSV.as_bytes())))
        .unwrap_err();
    assert!(matches!(err, ImportError::Cancelled));
    assert_store_empty(&conn);
}

#[test]
fn committed_import_cannot_be_cancelled_afterwards() {
    let mut conn = open_db_in_memory().unwrap();
    let cancellation = ImportCancellation::new();
    import_csv_cancellable(
        &mut conn,
        Some(UploadedFile::csv(FRUIT_CSV.as_bytes())),
        ImportOptions::default(),
        &cancellation,
    )
    .unwrap();

    assert!(!cancellation.cancel());
    let words = SqliteWordRepository::try_new(&conn).unwrap();
    assert_eq!(words.list_words(&WordListQuery::default()).unwrap().total, 3);
}

#[test]
fn result_page_size_bounds_returned_words() {
    let conn = open_db_in_memory().unwrap();
    let service = ImportService::with_options(
        SqliteCategoryRepository::try_new(&conn).unwrap(),
        SqliteWordRepository::try_new(&conn).unwrap(),
        ImportOptions {
            result_page_size: 2,
            ..ImportOptions::default()
        },
    );
    let outcome = service
        .import(Some(UploadedFile::csv(FRUIT_CSV.as_bytes())))
        .unwrap();
    assert_eq!(outcome.words.total, 3);
    let terms: Vec<_> = outcome.words.words.iter().map(|w| w.term.as_str()).collect();
    assert_eq!(terms, vec!["Apple", "Lemon"]);
}

#[test]
fn outcome_serializes_to_api_shape() {
    let conn = open_db_in_memory().unwrap();
    let outcome = import(&conn, Some(UploadedFile::csv(FRUIT_CSV.as_bytes()))).unwrap();
    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(json["categories"].as_array().unwrap().len(), 4);
    assert_eq!(json["words"]["total"], 3);
    assert!(json["words"]["words"][0]["createdAt"].is_i64());
}
