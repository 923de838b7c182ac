//! Soft-delete filtering across FROM, joins and scopes.

use pretty_assertions::assert_eq;
use sqltree_core::ast::{Relation, SqlValue, Table};
use sqltree_core::{Delete, Renderer, Select, Update};
use sqltree_plugins::{SoftDelete, SoftDeleteScope};

#[test]
fn test_hides_deleted_rows_after_existing_predicates() {
    let users = Table::new("users");
    let rendered = Select::new()
        .from(&users)
        .where_clause(users.col("active").eq(true))
        .use_transformer(SoftDelete::default())
        .to_sql(&Renderer::postgres())
        .unwrap();

    assert_eq!(
        rendered.sql,
        r#"SELECT * FROM "users" WHERE "users"."active" = $1 AND "users"."deleted_at" IS NULL"#
    );
    assert_eq!(rendered.params, vec![SqlValue::Bool(true)]);
}

#[test]
fn test_each_joined_table_is_filtered_through_its_alias() {
    let users = Table::new("users");
    let (author, editor) = (users.alias("author"), users.alias("editor"));
    let posts = Table::new("posts");

    let rendered = Select::new()
        .from(&posts)
        .select([posts.col("id")])
        .inner_join(&author)
        .on(author.col("id").eq(posts.col("author_id")))
        .left_join(&editor)
        .on(editor.col("id").eq(posts.col("editor_id")))
        .use_transformer(SoftDelete::default())
        .to_sql(&Renderer::postgres())
        .unwrap();

    assert_eq!(
        rendered.sql,
        concat!(
            r#"SELECT "posts"."id" FROM "posts" "#,
            r#"INNER JOIN "users" AS "author" ON "author"."id" = "posts"."author_id" "#,
            r#"LEFT OUTER JOIN "users" AS "editor" ON "editor"."id" = "posts"."editor_id" "#,
            r#"WHERE "posts"."deleted_at" IS NULL AND "author"."deleted_at" IS NULL "#,
            r#"AND "editor"."deleted_at" IS NULL"#
        )
    );
}

#[test]
fn test_scoped_tables_and_custom_columns() {
    let (users, posts) = (Table::new("users"), Table::new("posts"));
    let base = Select::new()
        .from(&users)
        .inner_join(&posts)
        .on(posts.col("user_id").eq(users.col("id")));

    let only_posts = base
        .clone()
        .use_transformer(SoftDelete::tables(["posts"]))
        .to_sql(&Renderer::sqlite())
        .unwrap();
    assert!(
        only_posts
            .sql
            .ends_with(r#"WHERE "posts"."deleted_at" IS NULL"#),
        "{}",
        only_posts.sql
    );

    let mapped = base
        .use_transformer(SoftDelete::columns([("users", "removed_at")]))
        .to_sql(&Renderer::mysql())
        .unwrap();
    assert!(
        mapped.sql.ends_with("WHERE `users`.`removed_at` IS NULL"),
        "{}",
        mapped.sql
    );
}

#[test]
fn test_scope_from_config() {
    let scope: SoftDeleteScope = serde_json::from_str(r#"{"column": "archived_at"}"#).unwrap();
    let orders = Table::new("orders");
    let rendered = Select::new()
        .from(&orders)
        .use_transformer(SoftDelete::new(scope))
        .to_sql(&Renderer::postgres())
        .unwrap();
    assert_eq!(
        rendered.sql,
        r#"SELECT * FROM "orders" WHERE "orders"."archived_at" IS NULL"#
    );
}

#[test]
fn test_derived_tables_are_not_filtered() {
    let users = Table::new("users");
    let inner = Select::new().from(&users).select([users.col("id")]);
    let derived = Relation::from(inner).alias("recent");

    let rendered = Select::new()
        .from(&derived)
        .select([derived.col("id")])
        .use_transformer(SoftDelete::default())
        .to_sql(&Renderer::postgres())
        .unwrap();
    assert_eq!(
        rendered.sql,
        r#"SELECT "recent"."id" FROM (SELECT "users"."id" FROM "users") AS "recent""#
    );
}

#[test]
fn test_nested_query_filters_when_transformed_first() {
    let users = Table::new("users");
    let posts = Table::new("posts");
    let live_users = Select::new()
        .from(&users)
        .select([users.col("id")])
        .use_transformer(SoftDelete::default());

    let rendered = Select::new()
        .from(&posts)
        .where_clause(posts.col("author_id").in_query(live_users.transformed().unwrap()))
        .to_sql(&Renderer::postgres())
        .unwrap();
    assert_eq!(
        rendered.sql,
        concat!(
            r#"SELECT * FROM "posts" WHERE "posts"."author_id" IN "#,
            r#"(SELECT "users"."id" FROM "users" WHERE "users"."deleted_at" IS NULL)"#
        )
    );
}

#[test]
fn test_update_and_delete_are_untouched() {
    let users = Table::new("users");
    let update = Update::table(&users)
        .set("name", "Ann")
        .use_transformer(SoftDelete::default())
        .to_sql(&Renderer::postgres())
        .unwrap();
    assert_eq!(update.sql, r#"UPDATE "users" SET "name" = $1"#);

    let delete = Delete::from_table(&users)
        .use_transformer(SoftDelete::default())
        .to_sql(&Renderer::postgres())
        .unwrap();
    assert_eq!(delete.sql, r#"DELETE FROM "users""#);
}
