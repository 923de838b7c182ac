//! Invoicing queries built from derived table metadata.
//!
//! Prints the same statements for each dialect, with their parameters.
//!
//! Run with: cargo run --example invoicing

use sqltree_core::ast::{SqlValue, WindowDefinition};
use sqltree_core::builder::{count_star, excluded, row_number, sum};
use sqltree_core::{Delete, Insert, Rendered, Renderer, Result, Select, Update};
use sqltree_derive::Table;

#[allow(dead_code)]
#[derive(Debug, Clone, Table)]
#[table(name = "clients")]
pub struct Client {
    #[column(primary_key)]
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub email: Option<String>,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Table)]
#[table(name = "invoices", schema = "billing")]
pub struct Invoice {
    #[column(primary_key)]
    pub id: i64,
    pub company_id: i64,
    pub client_id: i64,
    #[column(name = "number")]
    pub invoice_number: String,
    pub status: String,
    pub total_cents: i64,
    pub due_date: String,
}

fn print(title: &str, rendered: &Rendered) {
    println!("-- {title}");
    println!("{};", rendered.sql);
    if !rendered.params.is_empty() {
        println!("-- params: {:?}", rendered.params);
    }
    println!();
}

fn run(renderer: &Renderer) -> Result<()> {
    let company_id = 1_i64;
    let today = "2024-01-15";

    println!("-- ==================== {} ====================", renderer.dialect().name());
    println!();

    let overdue = Select::new()
        .from(Invoice::table())
        .select([
            Invoice::id(),
            Invoice::invoice_number(),
            Invoice::total_cents(),
        ])
        .where_clause(Invoice::company_id().eq(company_id))
        .where_clause(Invoice::status().eq("sent"))
        .where_clause(Invoice::due_date().lt(today))
        .order([Invoice::due_date().asc()]);
    print("Overdue invoices", &overdue.to_sql(renderer)?);

    let outstanding = Select::new()
        .from(Client::table())
        .select([
            Client::name(),
            count_star().alias("invoices"),
            sum(Invoice::total_cents()).alias("outstanding_cents"),
        ])
        .inner_join(Invoice::table())
        .on(Invoice::client_id().eq(Client::id()))
        .where_clause(Invoice::status().not_eq("paid"))
        .group([Client::name()])
        .having(sum(Invoice::total_cents()).gt(100_000))
        .order([sum(Invoice::total_cents()).desc()])
        .limit(10);
    print("Clients with large outstanding balances", &outstanding.to_sql(renderer)?);

    let latest = Select::new()
        .from(Invoice::table())
        .select([
            Invoice::client_id(),
            Invoice::invoice_number(),
            row_number()
                .over(
                    WindowDefinition::new()
                        .partition_by([Invoice::client_id()])
                        .order_by([Invoice::due_date().desc()]),
                )
                .alias("recency"),
        ])
        .where_clause(Invoice::company_id().eq(company_id));
    print("Invoices ranked per client", &latest.to_sql(renderer)?);

    let upsert = Insert::into_table(Client::table())
        .columns(["id", "company_id", "name", "email"])
        .values([
            SqlValue::Int(7),
            SqlValue::Int(company_id),
            SqlValue::Text(String::from("Acme Corp")),
            SqlValue::Null,
        ])
        .on_conflict_do_update(["id"], [("name", excluded("name"))]);
    print("Upsert client", &upsert.to_sql(renderer)?);

    let mark_paid = Update::table(Invoice::table())
        .set("status", "paid")
        .where_clause(Invoice::id().eq(42));
    print("Mark invoice paid", &mark_paid.to_sql(renderer)?);

    let purge = Delete::from_table(Invoice::table())
        .where_clause(Invoice::status().eq("draft"))
        .where_clause(Invoice::due_date().lt("2023-01-01"));
    print("Purge stale drafts", &purge.to_sql(renderer)?);

    Ok(())
}

fn main() -> Result<()> {
    for renderer in [Renderer::postgres(), Renderer::mysql(), Renderer::sqlite()] {
        run(&renderer)?;
    }
    Ok(())
}
