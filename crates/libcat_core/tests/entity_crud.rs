use libcat_core::{
    AuthorDraft, BookDraft, BookInput, Catalog, EntityRepository, ErrorKind, PersonDraft,
    RepoError, ValidationError,
};
use std::collections::HashSet;

#[test]
fn create_assigns_unique_ids_and_list_includes_exactly_the_new_rows() {
    let catalog = Catalog::open_in_memory().unwrap();
    let authors = catalog.authors();

    let austen = authors
        .create(&AuthorDraft::new("Jane Austen", "UK"))
        .unwrap();
    let tolstoy = authors
        .create(&AuthorDraft::new("Leo Tolstoy", "Russia"))
        .unwrap();

    assert_ne!(austen.id, tolstoy.id);
    assert_eq!(authors.list_all().unwrap(), vec![austen, tolstoy]);
}

#[test]
fn create_trims_text_attributes() {
    let catalog = Catalog::open_in_memory().unwrap();

    let user = catalog
        .users()
        .create(&PersonDraft::new("  Ann  ", " ann@example.org "))
        .unwrap();
    assert_eq!(user.name, "Ann");
    assert_eq!(user.email, "ann@example.org");
}

#[test]
fn invalid_drafts_are_rejected_before_the_store() {
    let catalog = Catalog::open_in_memory().unwrap();

    let err = catalog
        .authors()
        .create(&AuthorDraft::new("", "UK"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::MissingField("name"))
    ));

    let err = catalog
        .books()
        .create(&BookDraft::new("Emma", 3, -5))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::Negative {
            field: "papers",
            value: -5
        })
    ));

    let err = catalog
        .students()
        .create(&PersonDraft::new("Sam", "   "))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    assert_eq!(catalog.summary().unwrap(), Default::default());
}

#[test]
fn update_rewrites_attributes_and_keeps_row_count() {
    let catalog = Catalog::open_in_memory().unwrap();
    let students = catalog.students();
    let sam = students
        .create(&PersonDraft::new("Sam", "sam@example.org"))
        .unwrap();
    students
        .create(&PersonDraft::new("Kim", "kim@example.org"))
        .unwrap();

    let updated = students
        .update(sam.id, &PersonDraft::new("Samantha", "sam@example.org"))
        .unwrap();

    assert_eq!(updated.id, sam.id);
    assert_eq!(updated.name, "Samantha");
    let rows = students.list_all().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], updated);
}

#[test]
fn update_and_delete_of_unknown_id_report_not_found() {
    let catalog = Catalog::open_in_memory().unwrap();
    let users = catalog.users();
    users
        .create(&PersonDraft::new("Ann", "ann@example.org"))
        .unwrap();
    let before = users.list_all().unwrap();

    let err = users
        .update(99, &PersonDraft::new("Ghost", "ghost@example.org"))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            kind: "user",
            id: 99
        }
    ));

    let err = users.delete(99).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    assert_eq!(users.list_all().unwrap(), before);
}

#[test]
fn delete_removes_exactly_one_row() {
    let catalog = Catalog::open_in_memory().unwrap();
    let users = catalog.users();
    let ann = users
        .create(&PersonDraft::new("Ann", "ann@example.org"))
        .unwrap();
    let bob = users
        .create(&PersonDraft::new("Bob", "bob@example.org"))
        .unwrap();

    users.delete(ann.id).unwrap();

    assert_eq!(users.list_all().unwrap(), vec![bob]);
    assert_eq!(users.get(ann.id).unwrap(), None);
}

#[test]
fn list_all_is_stable_without_mutation() {
    let catalog = Catalog::open_in_memory().unwrap();
    let books = catalog.books();
    for name in ["Emma", "Persuasion", "Anna Karenina"] {
        books.create(&BookDraft::new(name, 1, 100)).unwrap();
    }

    let first = books.list_all().unwrap();
    let second = books.list_all().unwrap();
    assert_eq!(first, second);
    let ids = first.iter().map(|book| book.id).collect::<HashSet<_>>();
    assert_eq!(ids.len(), 3);
}

#[test]
fn book_author_name_is_joined_at_read_time() {
    let catalog = Catalog::open_in_memory().unwrap();
    let austen = catalog
        .authors()
        .create(&AuthorDraft::new("Jane Austen", "UK"))
        .unwrap();

    let draft = catalog
        .book_draft(&BookInput {
            name: "Emma",
            count: "3",
            papers: "512",
            author: Some("Jane Austen"),
        })
        .unwrap();
    let emma = catalog.books().create(&draft).unwrap();
    assert_eq!(emma.author_id, Some(austen.id));
    assert_eq!(emma.author_name.as_deref(), Some("Jane Austen"));

    catalog
        .authors()
        .update(austen.id, &AuthorDraft::new("J. Austen", "UK"))
        .unwrap();
    let reloaded = catalog.books().get(emma.id).unwrap().unwrap();
    assert_eq!(reloaded.author_name.as_deref(), Some("J. Austen"));

    catalog.authors().delete(austen.id).unwrap();
    let orphan = catalog.books().get(emma.id).unwrap().unwrap();
    assert_eq!(orphan.author_id, None);
    assert_eq!(orphan.author_name, None);
}

#[test]
fn book_input_with_unknown_or_ambiguous_author_is_rejected() {
    let catalog = Catalog::open_in_memory().unwrap();
    let authors = catalog.authors();
    authors.create(&AuthorDraft::new("Anon", "UK")).unwrap();
    authors.create(&AuthorDraft::new("Anon", "FR")).unwrap();

    let input = BookInput {
        name: "Beowulf",
        count: "1",
        papers: "90",
        author: Some("Homer"),
    };
    assert!(matches!(
        catalog.book_draft(&input),
        Err(RepoError::Validation(ValidationError::UnresolvedReference { .. }))
    ));

    let ambiguous = BookInput {
        author: Some("Anon"),
        ..input
    };
    assert!(matches!(
        catalog.book_draft(&ambiguous),
        Err(RepoError::Validation(ValidationError::AmbiguousReference {
            matches: 2,
            ..
        }))
    ));
}

#[test]
fn non_numeric_counts_are_validation_errors() {
    let catalog = Catalog::open_in_memory().unwrap();

    let err = catalog
        .book_draft(&BookInput {
            name: "Emma",
            count: "three",
            papers: "512",
            author: None,
        })
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::NotANumber { field: "count", .. })
    ));
}

#[test]
fn resolve_name_reads_current_store_content() {
    let catalog = Catalog::open_in_memory().unwrap();
    let authors = catalog.authors();
    let lookup_before = authors.name_lookup().unwrap();
    assert!(lookup_before.is_empty());

    let tolstoy = authors
        .create(&AuthorDraft::new("Leo Tolstoy", "Russia"))
        .unwrap();
    assert_eq!(authors.resolve_name(" Leo Tolstoy ").unwrap(), tolstoy.id);
    assert_eq!(authors.name_lookup().unwrap().names(), ["Leo Tolstoy"]);
}

#[test]
fn file_backed_catalog_persists_between_opens() {
    let dir = tempfile::tempdir().unwrap();
    let config = libcat_core::CatalogConfig {
        db_path: Some(dir.path().join("catalog.sqlite3")),
        ..Default::default()
    };

    let catalog = Catalog::open(&config).unwrap();
    catalog
        .students()
        .create(&PersonDraft::new("Kim", "kim@example.org"))
        .unwrap();
    drop(catalog);

    let reopened = Catalog::open(&config).unwrap();
    assert_eq!(reopened.gateway().mode(), "file");
    assert_eq!(reopened.summary().unwrap().students, 1);
}
