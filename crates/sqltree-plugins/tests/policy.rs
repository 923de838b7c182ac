//! Policy transformer: row filters, denies, masking and the HTTP client.

mod common;

use std::collections::HashMap;
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use common::{call, column, op, replace, serve, string, StubClient};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use sqltree_core::ast::{SqlValue, Table};
use sqltree_core::schema::StaticResolver;
use sqltree_core::{Delete, Error, Renderer, Select, Update};
use sqltree_plugins::policy::{CompileRequest, PolicyClient};
use sqltree_plugins::{HttpPolicyClient, Policy, PolicyConfig, PolicyError};

fn config() -> PolicyConfig {
    PolicyConfig::new("http://policy.invalid", "app/orders/allow")
}

fn policy(client: StubClient) -> Policy {
    Policy::with_client(&config(), client, json!({"user": "ann", "tenant": "acme"}))
}

fn text(value: &str) -> SqlValue {
    SqlValue::Text(value.to_string())
}

fn policy_error(err: &Error) -> &PolicyError {
    match err {
        Error::TransformerRejected { transformer, .. } => assert_eq!(transformer, "policy"),
        other => panic!("Expected TransformerRejected, got {other:?}"),
    }
    err.transformer_error::<PolicyError>()
        .expect("policy error source")
}

// =============================================================================
// Row filters
// =============================================================================

#[test]
fn test_row_filter_and_mask() {
    let orders = Table::new("orders");
    let client = StubClient::new()
        .decide("orders", json!([[call("eq", "orders", "account", "acme")]]))
        .masks(json!({"orders": {"total": replace("***")}}));

    let rendered = Select::new()
        .from(&orders)
        .select([orders.col("id"), orders.col("account"), orders.col("total")])
        .use_transformer(policy(client))
        .to_sql(&Renderer::postgres())
        .unwrap();

    assert_eq!(
        rendered.sql,
        concat!(
            r#"SELECT "orders"."id", "orders"."account", '***' AS "total" "#,
            r#"FROM "orders" WHERE "orders"."account" = $1"#
        )
    );
    assert_eq!(rendered.params, vec![text("acme")]);
}

#[test]
fn test_compile_request_names_each_table() {
    let (orders, users) = (Table::new("orders"), Table::new("users"));
    let owner = users.alias("owner");
    let client = StubClient::new()
        .decide("orders", json!([[]]))
        .decide("users", json!([[call("eq", "users", "tenant", "acme")]]));
    let requests = client.requests();

    let rendered = Select::new()
        .from(&orders)
        .inner_join(&owner)
        .on(owner.col("id").eq(orders.col("owner_id")))
        .use_transformer(policy(client))
        .to_sql(&Renderer::postgres())
        .unwrap();

    assert_eq!(
        rendered.sql,
        concat!(
            r#"SELECT * FROM "orders" INNER JOIN "users" AS "owner" "#,
            r#"ON "owner"."id" = "orders"."owner_id" WHERE "owner"."tenant" = $1"#
        )
    );

    let requests = requests.lock().unwrap();
    assert_eq!(
        *requests,
        vec![
            CompileRequest {
                query: String::from("data.app.orders.allow == true"),
                input: json!({"user": "ann", "tenant": "acme"}),
                unknowns: vec![String::from("data.orders")],
            },
            CompileRequest {
                query: String::from("data.app.orders.allow == true"),
                input: json!({"user": "ann", "tenant": "acme"}),
                unknowns: vec![String::from("data.users")],
            },
        ]
    );
}

#[test]
fn test_multiple_queries_are_ored() {
    let orders = Table::new("orders");
    let client = StubClient::new().decide(
        "orders",
        json!([
            [call("eq", "orders", "account", "acme"), call("neq", "orders", "state", "void")],
            [call("eq", "orders", "public", "yes")]
        ]),
    );

    let rendered = Select::new()
        .from(&orders)
        .where_clause(orders.col("id").gt(10))
        .use_transformer(policy(client))
        .to_sql(&Renderer::postgres().parameterised(false))
        .unwrap();

    assert_eq!(
        rendered.sql,
        concat!(
            r#"SELECT * FROM "orders" WHERE "orders"."id" > 10 AND "#,
            r#"("orders"."account" = 'acme' AND "orders"."state" != 'void' "#,
            r#"OR "orders"."public" = 'yes')"#
        )
    );
}

#[test]
fn test_unconditional_allow_leaves_where_unchanged() {
    let orders = Table::new("orders");
    let select = Select::new()
        .from(&orders)
        .where_clause(orders.col("id").eq(1));
    let without = select.to_sql(&Renderer::postgres()).unwrap();

    for queries in [json!([[]]), json!([[call("eq", "orders", "a", "b")], []])] {
        let client = StubClient::new().decide("orders", queries);
        let with = select
            .clone()
            .use_transformer(policy(client))
            .to_sql(&Renderer::postgres())
            .unwrap();
        assert_eq!(with, without);
    }
}

#[test]
fn test_deny_aborts_rendering() {
    let orders = Table::new("orders");
    let select = Select::new().from(&orders);

    let denials = [
        StubClient::new().decide("orders", json!([])),
        StubClient::new().respond("orders", json!({"result": {}})),
        StubClient::new().respond("orders", json!({})),
    ];
    for client in denials {
        let err = select
            .clone()
            .use_transformer(policy(client))
            .to_sql(&Renderer::postgres())
            .unwrap_err();
        match policy_error(&err) {
            PolicyError::Deny { table } => assert_eq!(table, "orders"),
            other => panic!("Expected Deny, got {other:?}"),
        }
    }
}

#[test]
fn test_like_operators_escape_wildcards() {
    let orders = Table::new("orders");
    let client = StubClient::new().decide(
        "orders",
        json!([[call("startswith", "orders", "code", "50%_off")]]),
    );

    let rendered = Select::new()
        .from(&orders)
        .use_transformer(policy(client))
        .to_sql(&Renderer::postgres())
        .unwrap();
    assert_eq!(
        rendered.sql,
        r#"SELECT * FROM "orders" WHERE "orders"."code" LIKE $1 ESCAPE '\'"#
    );
    assert_eq!(rendered.params, vec![text("50\\%\\_off%")]);
}

#[test]
fn test_translation_errors_surface() {
    let orders = Table::new("orders");
    let unsupported = StubClient::new().decide(
        "orders",
        json!([[{"terms": [op("glob.match"), column("orders", "code"), string("a*")]}]]),
    );
    let err = Select::new()
        .from(&orders)
        .use_transformer(policy(unsupported))
        .to_sql(&Renderer::postgres())
        .unwrap_err();
    assert!(matches!(
        policy_error(&err),
        PolicyError::UnsupportedOperator(name) if name == "glob.match"
    ));

    let malformed = StubClient::new().decide(
        "orders",
        json!([[{"terms": [op("eq"), string("a"), string("b")]}]]),
    );
    let err = Select::new()
        .from(&orders)
        .use_transformer(policy(malformed))
        .to_sql(&Renderer::postgres())
        .unwrap_err();
    assert!(matches!(
        policy_error(&err),
        PolicyError::MalformedExpression(_)
    ));

    let foreign = StubClient::new().decide(
        "orders",
        json!([[call("eq", "users", "tenant", "acme")]]),
    );
    let err = Select::new()
        .from(&orders)
        .use_transformer(policy(foreign))
        .to_sql(&Renderer::postgres())
        .unwrap_err();
    assert!(matches!(
        policy_error(&err),
        PolicyError::MalformedExpression(reason) if reason.contains("users")
    ));
}

#[test]
fn test_update_and_delete_targets_are_filtered() {
    let orders = Table::new("orders");
    let decide = || {
        StubClient::new().decide("orders", json!([[call("eq", "orders", "account", "acme")]]))
    };

    let update = Update::table(&orders)
        .set("state", "paid")
        .where_clause(orders.col("id").eq(3))
        .use_transformer(policy(decide()))
        .to_sql(&Renderer::postgres())
        .unwrap();
    assert_eq!(
        update.sql,
        r#"UPDATE "orders" SET "state" = $1 WHERE "orders"."id" = $2 AND "orders"."account" = $3"#
    );
    assert_eq!(
        update.params,
        vec![text("paid"), SqlValue::Int(3), text("acme")]
    );

    let delete = Delete::from_table(&orders)
        .use_transformer(policy(decide()))
        .to_sql(&Renderer::sqlite())
        .unwrap();
    assert_eq!(
        delete.sql,
        r#"DELETE FROM "orders" WHERE "orders"."account" = ?"#
    );

    let denied = Delete::from_table(&orders)
        .use_transformer(policy(StubClient::new()))
        .to_sql(&Renderer::sqlite())
        .unwrap_err();
    assert!(matches!(policy_error(&denied), PolicyError::Deny { .. }));
}

// =============================================================================
// Masking
// =============================================================================

#[test]
fn test_star_is_expanded_through_the_resolver() {
    let (orders, users) = (Table::new("orders"), Table::new("users"));
    let client = StubClient::new()
        .decide("orders", json!([[]]))
        .decide("users", json!([[]]))
        .masks(json!({"users": {"email": replace("hidden")}}));
    let resolver = StaticResolver::new()
        .with_table("orders", ["id", "user_id"])
        .with_table("users", ["id", "email"]);

    let rendered = Select::new()
        .from(&orders)
        .inner_join(&users)
        .on(users.col("id").eq(orders.col("user_id")))
        .use_transformer(policy(client).resolver(resolver))
        .to_sql(&Renderer::postgres())
        .unwrap();

    assert_eq!(
        rendered.sql,
        concat!(
            r#"SELECT "orders"."id", "orders"."user_id", "users"."id", 'hidden' AS "email" "#,
            r#"FROM "orders" INNER JOIN "users" ON "users"."id" = "orders"."user_id""#
        )
    );
    assert!(rendered.params.is_empty());
}

#[test]
fn test_qualified_star_is_expanded_too() {
    let orders = Table::new("orders");
    let client = StubClient::new()
        .decide("orders", json!([[]]))
        .masks(json!({"orders": {"total": replace("0")}}));
    let mut columns = HashMap::new();
    columns.insert(
        String::from("orders"),
        vec![String::from("id"), String::from("total")],
    );

    let rendered = Select::new()
        .from(&orders)
        .select([orders.star()])
        .use_transformer(policy(client).resolver(columns))
        .to_sql(&Renderer::mysql())
        .unwrap();
    assert_eq!(
        rendered.sql,
        "SELECT `orders`.`id`, '0' AS `total` FROM `orders`"
    );
}

#[test]
fn test_mask_values_use_dialect_string_escaping() {
    let orders = Table::new("orders");
    let select = Select::new()
        .from(&orders)
        .select([orders.col("total"), orders.col("id")]);
    let client = || {
        StubClient::new()
            .decide("orders", json!([[]]))
            .masks(json!({"orders": {"total": replace(r"x\' OR 1=1 -- \")}}))
    };

    let mysql = select
        .clone()
        .use_transformer(policy(client()))
        .to_sql(&Renderer::mysql())
        .unwrap();
    assert_eq!(
        mysql.sql,
        r"SELECT 'x\\'' OR 1=1 -- \\' AS `total`, `orders`.`id` FROM `orders`"
    );
    assert!(mysql.params.is_empty());

    let postgres = select
        .use_transformer(policy(client()))
        .to_sql(&Renderer::postgres())
        .unwrap();
    assert_eq!(
        postgres.sql,
        r#"SELECT 'x\'' OR 1=1 -- \' AS "total", "orders"."id" FROM "orders""#
    );
}

#[test]
fn test_star_without_resolver_fails() {
    let orders = Table::new("orders");
    let client = StubClient::new()
        .decide("orders", json!([[]]))
        .masks(json!({"orders": {"total": replace("***")}}));

    let err = Select::new()
        .from(&orders)
        .use_transformer(policy(client))
        .to_sql(&Renderer::postgres())
        .unwrap_err();
    assert!(matches!(
        policy_error(&err),
        PolicyError::ResolverRequired(table) if table == "orders"
    ));
}

#[test]
fn test_masked_values_are_never_parameters() {
    let orders = Table::new("orders");
    let client = StubClient::new()
        .decide("orders", json!([[]]))
        .masks(json!({"orders": {
            "total": replace("it's secret"),
            "account": {"replace": {"value": {}}}
        }}));

    let rendered = Select::new()
        .from(&orders)
        .select([orders.col("account"), orders.col("total").alias("amount")])
        .use_transformer(policy(client))
        .to_sql(&Renderer::postgres())
        .unwrap();
    assert_eq!(
        rendered.sql,
        r#"SELECT "orders"."account", 'it''s secret' AS "amount" FROM "orders""#
    );
    assert!(rendered.params.is_empty());
}

// =============================================================================
// HTTP client
// =============================================================================

#[test]
fn test_http_client_end_to_end() {
    let compile = json!({"result": {"queries": [[call("eq", "orders", "account", "acme")]]}});
    let masks = json!({"result": {"orders": {"total": {"replace": {"value": "***"}}}}});
    let (base_url, server) = serve(vec![
        (200, compile.to_string()),
        (200, masks.to_string()),
    ]);

    let config = PolicyConfig::new(base_url, "data.app.orders.allow");
    let input = json!({"user": "ann"});
    let orders = Table::new("orders");
    let rendered = Select::new()
        .from(&orders)
        .select([orders.col("id"), orders.col("total")])
        .use_transformer(Policy::new(&config, input.clone()).unwrap())
        .to_sql(&Renderer::postgres())
        .unwrap();

    assert_eq!(
        rendered.sql,
        r#"SELECT "orders"."id", '***' AS "total" FROM "orders" WHERE "orders"."account" = $1"#
    );

    let received = server.join().unwrap();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].method, "POST");
    assert_eq!(received[0].path, "/v1/compile");
    assert_eq!(
        received[0].body,
        json!({
            "query": "data.app.orders.allow == true",
            "input": input,
            "unknowns": ["data.orders"]
        })
    );
    assert_eq!(received[1].method, "POST");
    assert_eq!(received[1].path, "/v1/data/app/orders/masks");
    assert_eq!(received[1].body, json!({"input": input}));
}

#[test]
fn test_http_client_bad_responses() {
    let (base_url, server) = serve(vec![
        (500, String::from(r#"{"code": "internal_error"}"#)),
        (200, String::from("not json")),
    ]);
    let client = HttpPolicyClient::new(&PolicyConfig::new(base_url, "app/allow")).unwrap();

    for _ in 0..2 {
        let err = client.masks(&Value::Null).unwrap_err();
        assert!(matches!(err, PolicyError::BadResponse(_)), "{err:?}");
    }
    server.join().unwrap();
}

#[test]
fn test_http_client_unreachable() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client =
        HttpPolicyClient::new(&PolicyConfig::new(format!("http://{addr}"), "app/allow")).unwrap();
    let request = CompileRequest {
        query: String::from("data.app.allow == true"),
        input: Value::Null,
        unknowns: vec![String::from("data.orders")],
    };
    let err = client.compile(&request).unwrap_err();
    assert!(matches!(err, PolicyError::Unreachable(_)), "{err:?}");
}

#[test]
fn test_http_client_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let silent = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        thread::sleep(Duration::from_secs(3));
        drop(stream);
    });

    let config = PolicyConfig::new(base_url, "app/allow").with_timeout_secs(1);
    let err = HttpPolicyClient::new(&config)
        .unwrap()
        .masks(&Value::Null)
        .unwrap_err();
    assert!(matches!(err, PolicyError::Unreachable(_)), "{err:?}");
    silent.join().unwrap();
}
