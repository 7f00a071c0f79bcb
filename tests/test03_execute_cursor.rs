use dbo_mysql::prelude::*;
use dbo_mysql::test_utils::{MockClient, connected, scalar, table_rows};

fn no_modes() -> MysqlOptions {
    MysqlOptions::builder()
        .sql_modes(Vec::<String>::new())
        .database("blog")
        .finish()
}

#[tokio::test]
async fn test03_rows_decode_by_table_then_column() -> Result<(), Box<dyn std::error::Error>> {
    let client = MockClient::new();
    client.respond(
        "SELECT",
        QueryOutcome::rows(
            vec![
                ColumnMeta::new("Post", "id"),
                ColumnMeta::new("Post", "title"),
                ColumnMeta::new("User", "name"),
                ColumnMeta::computed("comment_count"),
                ColumnMeta::new("Post", "Post__title_length"),
            ],
            vec![
                vec![
                    RowValues::Int(1),
                    RowValues::Text("Hello".into()),
                    RowValues::Text("ann".into()),
                    RowValues::Int(3),
                    RowValues::Int(5),
                ],
                vec![
                    RowValues::Int(2),
                    RowValues::Text("Again".into()),
                    RowValues::Null,
                    RowValues::Int(0),
                    RowValues::Int(5),
                ],
            ],
        ),
    );
    let mut dbo = connected(no_modes(), &client).await;

    let handle = dbo
        .execute("SELECT Post.id, Post.title, User.name FROM posts AS Post")
        .await?
        .expect("result set");
    assert_eq!(handle.num_fields(), 5);
    dbo.attach_result(handle);
    assert!(dbo.has_result());
    assert_eq!(dbo.last_num_rows(), Some(2));

    let first = dbo.fetch_result().expect("first row");
    let tables: Vec<TableKey> = first.tables().cloned().collect();
    assert_eq!(
        tables,
        vec![
            TableKey::named("Post"),
            TableKey::named("User"),
            TableKey::Computed
        ]
    );
    let post_columns: Vec<&str> = first
        .table(&TableKey::named("Post"))
        .expect("Post columns")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(post_columns, vec!["id", "title"]);
    assert_eq!(first.get("User", "name"), Some(&RowValues::Text("ann".into())));
    assert_eq!(first.computed("comment_count"), Some(&RowValues::Int(3)));
    assert_eq!(first.computed("Post__title_length"), Some(&RowValues::Int(5)));
    assert_eq!(first.get("Post", "Post__title_length"), None);

    let second = dbo.fetch_result().expect("second row");
    assert_eq!(second.get("Post", "id"), Some(&RowValues::Int(2)));
    assert_eq!(second.get("User", "name"), Some(&RowValues::Null));

    assert!(dbo.fetch_result().is_none());
    Ok(())
}

#[tokio::test]
async fn test03_procedure_trailing_results_are_drained() -> Result<(), Box<dyn std::error::Error>>
{
    let client = MockClient::new();
    client.respond_multi(
        "CALL",
        vec![
            table_rows(
                "totals",
                &["day", "n"],
                vec![vec![RowValues::Text("mon".into()), RowValues::Int(4)]],
            ),
            QueryOutcome::affected(0),
        ],
    );
    client.respond("SELECT 1", scalar("1", RowValues::Int(1)));
    let mut dbo = connected(no_modes(), &client).await;

    let handle = dbo
        .execute("  call refresh_totals()")
        .await?
        .expect("first procedure result");
    assert_eq!(handle.num_rows(), 1);
    assert_eq!(client.pending(), 0);

    let next = dbo.execute("SELECT 1").await?;
    assert!(next.is_some());
    assert_eq!(dbo.last_error(), None);
    assert_eq!(client.statements().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test03_unknown_counts_before_any_statement() -> Result<(), Box<dyn std::error::Error>> {
    let client = MockClient::new();
    client.respond("UPDATE", QueryOutcome::affected(0));
    client.respond("INSERT", QueryOutcome::affected(2));
    let mut dbo = connected(no_modes(), &client).await;

    assert_eq!(dbo.last_affected(), None);
    assert_eq!(dbo.last_num_rows(), None);
    assert!(!dbo.has_result());
    assert!(dbo.fetch_result().is_none());

    assert!(dbo.execute("UPDATE posts SET hits = 0 WHERE 0").await?.is_none());
    assert_eq!(dbo.last_affected(), Some(0));
    assert_eq!(dbo.last_num_rows(), None);

    dbo.execute("INSERT INTO posts (title) VALUES ('a'), ('b')")
        .await?;
    assert_eq!(dbo.last_affected(), Some(2));
    Ok(())
}

#[tokio::test]
async fn test03_failed_statement_is_recorded() {
    let client = MockClient::new();
    client.fail(
        "SELEC ",
        NativeError::new(1064, "You have an error in your SQL syntax"),
    );
    let mut dbo = connected(no_modes(), &client).await;

    let err = dbo.execute("SELEC * FROM posts").await.unwrap_err();
    assert_eq!(err.native().map(|e| e.code), Some(1064));
    assert_eq!(
        dbo.last_error().as_deref(),
        Some("1064: You have an error in your SQL syntax")
    );
    assert_eq!(dbo.last_affected(), None);

    // the next good statement clears it
    dbo.execute("DELETE FROM posts WHERE 0").await.unwrap();
    assert_eq!(dbo.last_error(), None);
}

#[tokio::test]
async fn test03_attaching_replaces_previous_result() -> Result<(), Box<dyn std::error::Error>> {
    let client = MockClient::new();
    client.respond(
        "SELECT id",
        table_rows(
            "posts",
            &["id"],
            vec![vec![RowValues::Int(1)], vec![RowValues::Int(2)]],
        ),
    );
    client.respond(
        "SELECT name",
        table_rows("users", &["name"], vec![vec![RowValues::Text("bo".into())]]),
    );
    let mut dbo = connected(no_modes(), &client).await;

    let posts = dbo.execute("SELECT id FROM posts").await?.expect("posts");
    dbo.attach_result(posts);
    assert_eq!(dbo.last_num_rows(), Some(2));

    let users = dbo.execute("SELECT name FROM users").await?.expect("users");
    dbo.attach_result(users);
    assert_eq!(dbo.last_num_rows(), Some(1));
    let row = dbo.fetch_result().expect("user row");
    assert_eq!(row.get("users", "name"), Some(&RowValues::Text("bo".into())));
    assert_eq!(row.get("posts", "id"), None);

    dbo.free_result();
    assert!(!dbo.has_result());
    assert_eq!(dbo.last_num_rows(), None);
    Ok(())
}

#[tokio::test]
async fn test03_fetch_all_and_fetch_row() -> Result<(), Box<dyn std::error::Error>> {
    let client = MockClient::new();
    client.respond(
        "SELECT",
        table_rows(
            "tags",
            &["id", "label"],
            vec![
                vec![RowValues::Int(1), RowValues::Text("rust".into())],
                vec![RowValues::Int(2), RowValues::Text("sql".into())],
            ],
        ),
    );
    let mut dbo = connected(no_modes(), &client).await;

    let rows = dbo.fetch_all("SELECT id, label FROM tags").await?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get("tags", "label"), Some(&RowValues::Text("sql".into())));

    let first = dbo.fetch_row("SELECT id, label FROM tags").await?;
    assert_eq!(
        first.and_then(|row| row.get("tags", "id").cloned()),
        Some(RowValues::Int(1))
    );

    assert!(dbo.fetch_all("DELETE FROM tags WHERE 0").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test03_connecting_leaves_affected_count_unknown() -> Result<(), Box<dyn std::error::Error>>
{
    let client = MockClient::new();
    let mut dbo = connected(MysqlOptions::default(), &client).await;

    // the session setup statement does not count as a caller statement
    assert_eq!(client.statements().len(), 1);
    assert_eq!(dbo.last_affected(), None);
    assert_eq!(dbo.last_num_rows(), None);

    dbo.execute("SET SESSION sql_mode = 'STRICT_TRANS_TABLES'").await?;
    assert_eq!(dbo.last_affected(), Some(0));
    Ok(())
}

#[tokio::test]
async fn test03_procedure_keeps_first_result_when_a_trailing_set_fails()
-> Result<(), Box<dyn std::error::Error>> {
    let client = MockClient::new();
    client.respond_then_fail(
        "CALL",
        table_rows(
            "totals",
            &["day", "n"],
            vec![vec![RowValues::Text("tue".into()), RowValues::Int(7)]],
        ),
        NativeError::new(1329, "No data - zero rows fetched, selected, or processed"),
    );
    client.respond("SELECT 1", scalar("1", RowValues::Int(1)));
    let mut dbo = connected(no_modes(), &client).await;

    let mut handle = dbo
        .execute("CALL refresh_totals()")
        .await?
        .expect("first procedure result");
    assert_eq!(
        handle.fetch_row().map(<[RowValues]>::to_vec),
        Some(vec![RowValues::Text("tue".into()), RowValues::Int(7)])
    );
    assert_eq!(dbo.last_native_error().map(|e| e.code), Some(1329));
    assert_eq!(client.pending(), 0);

    assert!(dbo.execute("SELECT 1").await?.is_some());
    assert_eq!(dbo.last_error(), None);
    Ok(())
}

#[tokio::test]
async fn test03_blank_statement_is_rejected() {
    let client = MockClient::new();
    let mut dbo = connected(no_modes(), &client).await;

    assert!(matches!(
        dbo.execute("  \n ").await,
        Err(DboError::ExecutionError(_))
    ));
    assert!(client.statements().is_empty());
    assert_eq!(dbo.last_affected(), None);
}
