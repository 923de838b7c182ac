//! End-to-end renders of typical queries, checked against exact SQL text
//! and parameter vectors.

mod common;

use common::{orders, pg, posts, render_select, text, users};
use pretty_assertions::assert_eq;
use sqltree_core::ast::SqlValue;
use sqltree_core::builder::{count_star, sum, Select};
use sqltree_core::Renderer;

#[test]
fn test_lookup_by_id_with_limit() {
    let u = users();
    let select = Select::new()
        .from(&u)
        .where_clause(u.col("id").eq(42))
        .limit(10);

    let rendered = render_select(&pg(), &select);
    assert_eq!(
        rendered.sql,
        r#"SELECT * FROM "users" WHERE "users"."id" = $1 LIMIT $2"#
    );
    assert_eq!(rendered.params, vec![SqlValue::Int(42), SqlValue::Int(10)]);
}

#[test]
fn test_join_with_nulls_last_ordering() {
    let (u, p) = (users(), posts());
    let select = Select::new()
        .from(&u)
        .select([u.col("id"), u.col("name")])
        .inner_join(&p)
        .on(u.col("id").eq(p.col("user_id")))
        .where_clause(u.col("active").eq(true))
        .order([u.col("name").desc().nulls_last()]);

    let rendered = render_select(&pg(), &select);
    assert_eq!(
        rendered.sql,
        concat!(
            r#"SELECT "users"."id", "users"."name" FROM "users" "#,
            r#"INNER JOIN "posts" ON "users"."id" = "posts"."user_id" "#,
            r#"WHERE "users"."active" = $1 ORDER BY "users"."name" DESC NULLS LAST"#
        )
    );
    assert_eq!(rendered.params, vec![SqlValue::Bool(true)]);
}

#[test]
fn test_filtered_aggregate_with_having() {
    let o = orders();
    let select = Select::new()
        .from(&o)
        .select([
            count_star(),
            sum(o.col("total")).filter(o.col("status").eq("ok")),
        ])
        .group([o.col("region")])
        .having(count_star().gt(10));

    let rendered = render_select(&pg(), &select);
    assert_eq!(
        rendered.sql,
        concat!(
            r#"SELECT COUNT(*), SUM("orders"."total") FILTER (WHERE "orders"."status" = $1) "#,
            r#"FROM "orders" GROUP BY "orders"."region" HAVING COUNT(*) > $2"#
        )
    );
    assert_eq!(rendered.params, vec![text("ok"), SqlValue::Int(10)]);
}

#[test]
fn test_mysql_regex_match() {
    let u = users();
    let select = Select::new()
        .from(&u)
        .where_clause(u.col("name").matches_regex("^A"));

    let rendered = render_select(&Renderer::mysql(), &select);
    assert_eq!(
        rendered.sql,
        "SELECT * FROM `users` WHERE `users`.`name` REGEXP ?"
    );
    assert_eq!(rendered.params, vec![text("^A")]);
}

#[test]
fn test_same_tree_across_dialects() {
    let u = users();
    let select = Select::new()
        .from(&u)
        .select([u.col("id")])
        .where_clause(u.col("email").ilike("%@example.com"))
        .offset(20);

    assert_eq!(
        render_select(&pg(), &select).sql,
        r#"SELECT "users"."id" FROM "users" WHERE "users"."email" ILIKE $1 OFFSET $2"#
    );
    assert_eq!(
        render_select(&Renderer::mysql(), &select).sql,
        "SELECT `users`.`id` FROM `users` WHERE LOWER(`users`.`email`) LIKE LOWER(?) LIMIT 18446744073709551615 OFFSET ?"
    );
    assert_eq!(
        render_select(&Renderer::sqlite(), &select).sql,
        r#"SELECT "users"."id" FROM "users" WHERE LOWER("users"."email") LIKE LOWER(?) LIMIT -1 OFFSET ?"#
    );
}

#[test]
fn test_inline_rendering_has_no_params() {
    let u = users();
    let select = Select::new()
        .from(&u)
        .where_clause(u.col("name").eq("O'Brien"))
        .limit(1);

    let rendered = render_select(&common::inline_pg(), &select);
    assert_eq!(
        rendered.sql,
        r#"SELECT * FROM "users" WHERE "users"."name" = 'O''Brien' LIMIT 1"#
    );
    assert!(rendered.params.is_empty());
}
