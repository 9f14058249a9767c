use tabula_core::statement::{
    delete_statement, insert_statement, select_statement, update_statement,
};
use tabula_core::{filter, row, Columns, CompareOp, Dialect, Modifier, Predicate, Target};

// Note: This example demonstrates SQL generation only.
// To actually execute, wrap the statements in a Db with a pool:
//   let pool = tabula_core::executor::sqlite::SqlitePool::connect("sqlite:example.db").await?;
//   let db = tabula_core::Db::with_dialect(pool, Dialect::sqlite());

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Tabula - Statement Generation Example ===\n");

    let dialect = Dialect::mysql();

    // INSERT with an ordered column-value mapping
    let user = row().set("name", "John").set("age", 30).set("city", "York");
    let insert = insert_statement("users", &user, &dialect)?;
    println!("1. INSERT:");
    println!("   SQL: {}", insert.sql);
    println!("   Values: {:?}\n", insert.values);

    // SELECT with a structured filter and trailing modifiers
    let adults = filter()
        .where_("age", Predicate::gte(18).and_also(CompareOp::Lt, 65))
        .where_("status", Predicate::eq("active").or_any(["pending"]));
    let select = select_statement(
        "users",
        &Columns::from(vec!["id", "name", "age"]),
        &adults,
        &Modifier::new().order_by("age desc").limit(0, 10),
        &dialect,
    );
    println!("2. SELECT:");
    println!("   SQL: {}", select.sql);
    println!("   Values: {:?}\n", select.values);

    // UPDATE composes the set skeleton with the compiled filter
    let update = update_statement(
        "users",
        &row().set("city", "London"),
        &filter().eq("id", 7),
        &dialect,
    )?;
    println!("3. UPDATE:");
    println!("   SQL: {}", update.sql);
    println!("   Values: {:?}\n", update.values);

    // DELETE with an in-list, and the unconditional form
    let purge = delete_statement(
        "sessions",
        &Target::from(filter().where_("id", Predicate::in_list([1, 2, 3]))),
        &dialect,
    )
    .expect("non-empty filter");
    println!("4. DELETE:");
    println!("   SQL: {}", purge.sql);
    println!("   Values: {:?}", purge.values);

    let purge_all = delete_statement("sessions", &Target::All, &dialect).expect("unconditional");
    println!("   SQL: {}\n", purge_all.sql);

    // The same builders target other engines
    let pg = update_statement(
        "users",
        &row().set("city", "London"),
        &filter().eq("id", 7),
        &Dialect::postgres(),
    )?;
    println!("5. PostgreSQL dialect:");
    println!("   SQL: {}", pg.sql);

    Ok(())
}
