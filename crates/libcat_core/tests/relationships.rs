use libcat_core::{
    AssignmentRow, AuthorDraft, BookDraft, Catalog, CatalogConfig, DeletePolicies, DeletePolicy,
    EntityRepository, ErrorKind, PersonDraft, RelationshipRepository, RepoError, ValidationError,
};

fn catalog_with(author_books: DeletePolicy, student_books: DeletePolicy) -> Catalog {
    let config = CatalogConfig {
        delete_policies: DeletePolicies {
            author_books,
            student_books,
        },
        ..CatalogConfig::default()
    };
    Catalog::open(&config).unwrap()
}

fn seed(catalog: &Catalog) {
    catalog
        .authors()
        .create(&AuthorDraft::new("Jane Austen", "UK"))
        .unwrap();
    catalog
        .authors()
        .create(&AuthorDraft::new("Leo Tolstoy", "Russia"))
        .unwrap();
    catalog
        .books()
        .create(&BookDraft::new("Emma", 3, 512))
        .unwrap();
    catalog
        .books()
        .create(&BookDraft::new("War and Peace", 1, 1225))
        .unwrap();
    catalog
        .students()
        .create(&PersonDraft::new("Kim", "kim@example.org"))
        .unwrap();
}

fn pairing(id: i64, left: (i64, &str), right: (i64, &str)) -> AssignmentRow {
    AssignmentRow {
        id,
        left_id: Some(left.0),
        left_name: Some(left.1.to_string()),
        right_id: Some(right.0),
        right_name: Some(right.1.to_string()),
    }
}

#[test]
fn create_by_name_lists_paired_display_names() {
    let catalog = Catalog::open_in_memory().unwrap();
    seed(&catalog);
    let author_books = catalog.author_books();

    let created = author_books.create("Jane Austen", "Emma").unwrap();
    author_books.create("Leo Tolstoy", "War and Peace").unwrap();

    assert_eq!(created, pairing(1, (1, "Jane Austen"), (1, "Emma")));
    assert_eq!(
        author_books.list_all().unwrap(),
        vec![
            pairing(1, (1, "Jane Austen"), (1, "Emma")),
            pairing(2, (2, "Leo Tolstoy"), (2, "War and Peace")),
        ]
    );
}

#[test]
fn unresolved_or_blank_names_write_nothing() {
    let catalog = Catalog::open_in_memory().unwrap();
    seed(&catalog);
    let student_books = catalog.student_books();

    let err = student_books.create("Nobody", "Emma").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::UnresolvedReference {
            kind: "student",
            ..
        })
    ));

    let err = student_books.create("Kim", "").unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::MissingField("book"))
    ));

    assert!(student_books.list_all().unwrap().is_empty());
}

#[test]
fn ambiguous_names_are_rejected() {
    let catalog = Catalog::open_in_memory().unwrap();
    seed(&catalog);
    catalog
        .books()
        .create(&BookDraft::new("Emma", 1, 400))
        .unwrap();

    let err = catalog
        .author_books()
        .create("Jane Austen", "Emma")
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::AmbiguousReference { matches: 2, .. })
    ));
}

#[test]
fn names_resolve_against_rows_created_after_lookup() {
    let catalog = Catalog::open_in_memory().unwrap();
    seed(&catalog);
    let author_books = catalog.author_books();
    let stale = author_books.left_lookup().unwrap();

    catalog
        .authors()
        .create(&AuthorDraft::new("Mary Shelley", "UK"))
        .unwrap();
    assert!(stale.resolve("Mary Shelley").is_err());

    let row = author_books.create("Mary Shelley", "Emma").unwrap();
    assert_eq!(row.left_name.as_deref(), Some("Mary Shelley"));
}

#[test]
fn duplicate_pairs_are_independent_rows() {
    let catalog = Catalog::open_in_memory().unwrap();
    seed(&catalog);
    let student_books = catalog.student_books();

    let first = student_books.create("Kim", "Emma").unwrap();
    let second = student_books.create("Kim", "Emma").unwrap();
    assert_ne!(first.id, second.id);

    student_books.delete(first.id).unwrap();
    assert_eq!(student_books.list_all().unwrap(), vec![second]);
}

#[test]
fn create_by_ids_checks_both_references() {
    let catalog = Catalog::open_in_memory().unwrap();
    seed(&catalog);
    let author_books = catalog.author_books();

    let row = author_books.create_by_ids(2, 1).unwrap();
    assert_eq!(row, pairing(1, (2, "Leo Tolstoy"), (1, "Emma")));

    let err = author_books.create_by_ids(2, 77).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::UnknownReference {
            kind: "book",
            id: 77
        })
    ));
    assert_eq!(author_books.list_all().unwrap().len(), 1);
}

#[test]
fn update_rewrites_both_references() {
    let catalog = Catalog::open_in_memory().unwrap();
    seed(&catalog);
    let author_books = catalog.author_books();
    let row = author_books.create("Jane Austen", "Emma").unwrap();

    let updated = author_books
        .update(row.id, "Leo Tolstoy", "War and Peace")
        .unwrap();

    assert_eq!(
        updated,
        pairing(row.id, (2, "Leo Tolstoy"), (2, "War and Peace"))
    );
    assert_eq!(author_books.get(row.id).unwrap(), Some(updated));
}

#[test]
fn update_and_delete_of_unknown_assignment_report_not_found() {
    let catalog = Catalog::open_in_memory().unwrap();
    seed(&catalog);
    let author_books = catalog.author_books();
    author_books.create("Jane Austen", "Emma").unwrap();

    let err = author_books.update(42, "Jane Austen", "Emma").unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            kind: "author_book",
            id: 42
        }
    ));
    assert_eq!(
        author_books.delete(42).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(author_books.list_all().unwrap().len(), 1);
}

#[test]
fn catalog_walkthrough_leaves_dangling_pairing_under_default_policy() {
    let catalog = Catalog::open_in_memory().unwrap();
    let authors = catalog.authors();
    let books = catalog.books();

    let austen = authors
        .create(&AuthorDraft::new("Jane Austen", "UK"))
        .unwrap();
    assert_eq!(austen.id, 1);

    let blank_author = libcat_core::BookInput {
        name: "Emma",
        count: "3",
        papers: "512",
        author: Some(""),
    };
    assert_eq!(
        catalog.book_draft(&blank_author).unwrap_err().kind(),
        ErrorKind::Validation
    );
    assert!(books.list_all().unwrap().is_empty());

    let emma = books
        .create(
            &catalog
                .book_draft(&libcat_core::BookInput {
                    author: None,
                    ..blank_author
                })
                .unwrap(),
        )
        .unwrap();
    assert_eq!(emma.id, 1);

    let author_books = catalog.author_books();
    let assignment = author_books.create("Jane Austen", "Emma").unwrap();
    assert_eq!(assignment.id, 1);
    assert_eq!(
        author_books.list_all().unwrap(),
        vec![pairing(1, (1, "Jane Austen"), (1, "Emma"))]
    );

    authors.delete(austen.id).unwrap();

    assert!(authors.list_all().unwrap().is_empty());
    let rows = author_books.list_all().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].left_id, Some(1));
    assert_eq!(rows[0].left_name, None);
    assert_eq!(rows[0].right_name.as_deref(), Some("Emma"));
    assert!(rows[0].is_dangling());
}

#[test]
fn restrict_policy_refuses_delete_of_referenced_entity() {
    let catalog = catalog_with(DeletePolicy::Restrict, DeletePolicy::NoAction);
    seed(&catalog);
    catalog
        .author_books()
        .create("Jane Austen", "Emma")
        .unwrap();

    let err = catalog.authors().delete(1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Constraint);
    assert!(matches!(
        err,
        RepoError::Restricted {
            table: "author_books",
            references: 1,
            ..
        }
    ));
    assert_eq!(catalog.authors().list_all().unwrap().len(), 2);

    catalog.authors().delete(2).unwrap();
}

#[test]
fn cascade_policy_removes_referencing_rows_in_the_same_delete() {
    let catalog = catalog_with(DeletePolicy::Cascade, DeletePolicy::Cascade);
    seed(&catalog);
    catalog
        .author_books()
        .create("Jane Austen", "Emma")
        .unwrap();
    catalog
        .author_books()
        .create("Leo Tolstoy", "War and Peace")
        .unwrap();
    catalog.student_books().create("Kim", "Emma").unwrap();

    catalog.books().delete(1).unwrap();

    let remaining = catalog.author_books().list_all().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].right_name.as_deref(), Some("War and Peace"));
    assert!(catalog.student_books().list_all().unwrap().is_empty());
}

#[test]
fn set_null_policy_clears_the_reference_column() {
    let catalog = catalog_with(DeletePolicy::NoAction, DeletePolicy::SetNull);
    seed(&catalog);
    catalog.student_books().create("Kim", "Emma").unwrap();

    catalog.students().delete(1).unwrap();

    let rows = catalog.student_books().list_all().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].left_id, None);
    assert_eq!(rows[0].left_name, None);
    assert_eq!(rows[0].right_id, Some(1));
}

#[test]
fn restrict_on_one_relationship_rolls_back_cascade_on_another() {
    let catalog = catalog_with(DeletePolicy::Cascade, DeletePolicy::Restrict);
    seed(&catalog);
    catalog
        .author_books()
        .create("Jane Austen", "Emma")
        .unwrap();
    catalog.student_books().create("Kim", "Emma").unwrap();

    let err = catalog.books().delete(1).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Restricted {
            table: "student_books",
            ..
        }
    ));
    assert_eq!(catalog.author_books().list_all().unwrap().len(), 1);
    assert!(catalog.books().get(1).unwrap().is_some());
}
