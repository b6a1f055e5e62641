//! End-to-end scenarios spanning the builder, dialect transformers, and the
//! text parser together, as opposed to the unit tests living alongside each
//! module.

use sql_core::builder::Builder;
use sql_core::dialect::mysql::MySqlDialect;
use sql_core::dialect::oracle::OracleDialect;
use sql_core::dialect::postgres::PostgresDialect;
use sql_core::dialect::sqlite::SqliteDialect;
use sql_core::expr::Expr;
use sql_core::predicate::Where;
use sql_core::table_source::TableSource;
use sql_core::value::SqlValue;

#[test]
fn select_with_join_and_literal_in_list_on_mysql() {
    let dialect = MySqlDialect::default();
    let built = Builder::select()
        .table_source(TableSource::table_with_alias("users", "u"))
        .fields(vec![Expr::qualified_field("u", "id"), Expr::qualified_field("u", "name")])
        .left_join(
            TableSource::table_with_alias("orders", "o"),
            Where::leaf(Expr::qualified_field("u", "id").eq(Expr::qualified_field("o", "user_id"))),
        )
        .where_clause(Where::leaf(
            Expr::qualified_field("u", "status")
                .in_list(vec![Expr::literal(SqlValue::Text("A".to_string())), Expr::literal(SqlValue::Text("B".to_string()))]),
        ))
        .order_by_desc(Expr::qualified_field("u", "id"))
        .limit(10)
        .build(&dialect)
        .unwrap();

    assert_eq!(
        built.sql,
        "SELECT u.id, u.name FROM users u LEFT JOIN orders o ON u.id = o.user_id WHERE u.status IN ('A', 'B') ORDER BY u.id DESC LIMIT 10"
    );
    assert!(built.params.is_empty());
}

#[test]
fn insert_with_named_parameters_on_oracle() {
    let dialect = OracleDialect::default();
    let built = Builder::insert()
        .table("LOGS")
        .columns(vec!["ID".into(), "MSG".into()])
        .values(vec![Expr::param("ID"), Expr::param("MSG")])
        .build(&dialect)
        .unwrap();

    assert_eq!(built.sql, "INSERT INTO LOGS (ID, MSG) VALUES (:ID, :MSG)");
    let param_order: Vec<&str> = built.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(param_order, vec!["ID", "MSG"]);
}

#[test]
fn upsert_with_primary_key_on_postgres_rebinds_every_column() {
    let dialect = PostgresDialect::default();
    let built = Builder::upsert()
        .table("t")
        .primary_keys(vec!["id".into()])
        .columns(vec!["id".into(), "name".into(), "age".into()])
        .values(vec![Expr::param("id"), Expr::param("name"), Expr::param("age")])
        .build(&dialect)
        .unwrap();

    assert_eq!(
        built.sql,
        "INSERT INTO t (id, name, age) VALUES (:id, :name, :age) ON CONFLICT (id) DO UPDATE SET id = :id, name = :name, age = :age"
    );
    let param_order: Vec<&str> = built.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(param_order, vec!["id", "name", "age", "id", "name", "age"]);
}

#[test]
fn tokenizer_folds_mysql_delimiter_trigger_into_one_statement() {
    let input = "DELIMITER //\nCREATE TRIGGER x BEFORE UPDATE ON u FOR EACH ROW\nBEGIN\n  UPDATE u SET t=NOW() WHERE id=NEW.id;\nEND//\nDELIMITER ;\n";
    let stmts = sql_core::splitter::split_statements(input).unwrap();

    assert_eq!(stmts.len(), 1);
    assert_eq!(stmts[0].kind, sql_core::splitter::StatementKind::CreateTrigger);
    assert!(stmts[0].text.contains("DELIMITER //"));
    assert!(stmts[0].text.contains("END//"));
    assert!(stmts[0].text.contains("DELIMITER ;"));
}

#[test]
fn parser_round_trips_select_with_alias_and_placeholder_pagination() {
    let builder = sql_core::parser::parse_statement("SELECT a.id AS A FROM A a LIMIT :limit OFFSET :offset").unwrap();
    let dialect = SqliteDialect::default();
    let built = builder.build(&dialect).unwrap();

    assert_eq!(built.sql, "SELECT a.id AS A FROM A a LIMIT :limit OFFSET :offset");
    let param_order: Vec<&str> = built.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(param_order, vec!["limit", "offset"]);
}

#[test]
fn parser_round_trip_is_stable_for_supported_dml() {
    let statements = [
        "SELECT id, email FROM users WHERE active = 1 ORDER BY id DESC LIMIT 10",
        "INSERT INTO users (id, email) VALUES (1, 'a@example.com')",
        "UPDATE users SET email = 'new@example.com' WHERE id = 1",
        "DELETE FROM users WHERE id = 1",
    ];
    let dialect = MySqlDialect::default();
    for sql in statements {
        let parsed = sql_core::parser::parse_statement(sql).unwrap();
        let first_pass = parsed.build(&dialect).unwrap();
        let reparsed = sql_core::parser::parse_statement(&first_pass.sql).unwrap();
        let second_pass = reparsed.build(&dialect).unwrap();
        assert_eq!(first_pass.sql, second_pass.sql);
    }
}
