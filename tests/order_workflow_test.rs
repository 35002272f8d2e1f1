//! Integration tests for the address registry, the order ledger and the
//! full order-creation workflow, running against an in-memory SQLite
//! database with the real migrations applied.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use chrono::{Datelike, Local};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;

use sigp::config::Config;
use sigp::domain::{AddressInput, AddressStatus, LineItem, NewOrderRecord, OrderCategory};
use sigp::infra::Migrator;
use sigp::infra::{Persistence, UnitOfWork};
use sigp::services::{OrderCompiler, OrderForm, OrderService};

async fn setup() -> (DatabaseConnection, Arc<Persistence>) {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("sqlite connect");
    Migrator::up(&db, None).await.expect("migrations");
    let uow = Arc::new(Persistence::new(db.clone()));
    (db, uow)
}

fn sample_input() -> AddressInput {
    AddressInput {
        street: "AV BRASIL".to_string(),
        number: "120".to_string(),
        neighborhood: "CENTRO".to_string(),
        complement: Some("PROX. AO TERMINAL".to_string()),
    }
}

fn sample_record(number: i32, year: i32, site_id: &str) -> NewOrderRecord {
    NewOrderRecord {
        number,
        category: OrderCategory::UrbMidia.label().to_string(),
        year,
        issued_on: Local::now().date_naive(),
        site_id: site_id.to_string(),
        site_ids: site_id.to_string(),
        action_type: "Implantação".to_string(),
        action_type_norm: "IMPLANTACAO".to_string(),
        item_type: "Abrigo".to_string(),
        item_type_norm: "ABRIGO".to_string(),
        street: "AV BRASIL".to_string(),
        neighborhood: "CENTRO".to_string(),
        neighborhood_norm: "CENTRO".to_string(),
        complement: String::new(),
        description: "IMPLANTACAO DE ABRIGO NA AV BRASIL".to_string(),
        created_by: "jsilva".to_string(),
    }
}

// =============================================================================
// Address Registry
// =============================================================================

#[tokio::test]
async fn test_create_then_find_returns_written_fields() {
    let (_db, uow) = setup().await;

    let input = sample_input();
    uow.addresses()
        .create("P1042", &input, "jsilva")
        .await
        .unwrap();

    let entry = uow.addresses().find("P1042").await.unwrap().unwrap();
    assert_eq!(entry.site_id, "P1042");
    assert_eq!(entry.street, input.street);
    assert_eq!(entry.number, input.number);
    assert_eq!(entry.neighborhood, input.neighborhood);
    assert_eq!(entry.complement, input.complement);
    assert_eq!(entry.status, AddressStatus::Active);
    assert_eq!(entry.last_inspector, "jsilva");
}

#[tokio::test]
async fn test_find_unknown_site_id_is_absent() {
    let (_db, uow) = setup().await;
    assert!(uow.addresses().find("P9999").await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_with_reactivate_flips_inactive_to_active() {
    let (db, uow) = setup().await;

    uow.addresses()
        .create("P2000", &sample_input(), "jsilva")
        .await
        .unwrap();

    // Entries only go inactive outside the order workflow; flip directly
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "UPDATE addresses SET status = 'inactive' WHERE site_id = 'P2000'".to_string(),
    ))
    .await
    .unwrap();

    let entry = uow.addresses().find("P2000").await.unwrap().unwrap();
    assert_eq!(entry.status, AddressStatus::Inactive);

    uow.addresses()
        .update("P2000", &sample_input(), "maria", true)
        .await
        .unwrap();

    let entry = uow.addresses().find("P2000").await.unwrap().unwrap();
    assert_eq!(entry.status, AddressStatus::Active);
    assert_eq!(entry.last_inspector, "maria");
}

#[tokio::test]
async fn test_update_without_reactivate_leaves_status_unchanged() {
    let (db, uow) = setup().await;

    uow.addresses()
        .create("P2001", &sample_input(), "jsilva")
        .await
        .unwrap();
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "UPDATE addresses SET status = 'inactive' WHERE site_id = 'P2001'".to_string(),
    ))
    .await
    .unwrap();

    uow.addresses()
        .update("P2001", &sample_input(), "maria", false)
        .await
        .unwrap();

    let entry = uow.addresses().find("P2001").await.unwrap().unwrap();
    assert_eq!(entry.status, AddressStatus::Inactive);
    // Inspection metadata is still refreshed
    assert_eq!(entry.last_inspector, "maria");
}

// =============================================================================
// Order Ledger
// =============================================================================

#[tokio::test]
async fn test_next_number_is_stable_without_writes_and_advances_after_append() {
    let (_db, uow) = setup().await;
    let year = 2026;

    let first = uow
        .orders()
        .next_number(OrderCategory::UrbMidia, year)
        .await;
    assert_eq!(first, 1);
    assert_eq!(
        uow.orders().next_number(OrderCategory::UrbMidia, year).await,
        first
    );

    uow.orders()
        .append(sample_record(first, year, "P1042"))
        .await
        .unwrap();

    assert_eq!(
        uow.orders().next_number(OrderCategory::UrbMidia, year).await,
        first + 1
    );
}

#[tokio::test]
async fn test_number_scopes_are_independent_per_category_and_year() {
    let (_db, uow) = setup().await;

    uow.orders()
        .append(sample_record(1, 2026, "P1042"))
        .await
        .unwrap();

    assert_eq!(
        uow.orders().next_number(OrderCategory::UrbMidia, 2026).await,
        2
    );
    assert_eq!(
        uow.orders()
            .next_number(OrderCategory::ProximaParada, 2026)
            .await,
        1
    );
    assert_eq!(
        uow.orders().next_number(OrderCategory::UrbMidia, 2025).await,
        1
    );
}

#[tokio::test]
async fn test_history_returns_newest_first_and_caps_at_five() {
    let (_db, uow) = setup().await;

    for n in 1..=7 {
        uow.orders()
            .append(sample_record(n, 2026, "P1042"))
            .await
            .unwrap();
    }

    let history = uow.orders().history("P1042").await;
    assert_eq!(history.len(), 5);
}

#[tokio::test]
async fn test_history_for_unknown_site_is_empty() {
    let (_db, uow) = setup().await;
    assert!(uow.orders().history("P0000").await.is_empty());
}

#[tokio::test]
async fn test_history_does_not_match_overlapping_site_ids() {
    let (_db, uow) = setup().await;

    uow.orders()
        .append(sample_record(1, 2026, "P1042"))
        .await
        .unwrap();

    let mut multi = sample_record(2, 2026, "P104");
    multi.site_ids = "P104-P2000".to_string();
    uow.orders().append(multi).await.unwrap();

    // P104 is a prefix of P1042 and must only see its own orders
    let history = uow.orders().history("P104").await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].number, 2);

    // The joined-ids column matches on hyphen boundaries
    let other = uow.orders().history("P2000").await;
    assert_eq!(other.len(), 1);
    assert_eq!(other[0].number, 2);

    assert_eq!(uow.orders().history("P1042").await.len(), 1);
}

// =============================================================================
// Order Compiler - full workflow
// =============================================================================

/// Minimal but valid template: a ZIP holding word/document.xml with the tags.
fn write_template(path: &Path) {
    use zip::write::FileOptions;
    use zip::ZipWriter;

    let file = File::create(path).unwrap();
    let mut writer = ZipWriter::new(file);
    writer
        .start_file("[Content_Types].xml", FileOptions::default())
        .unwrap();
    writer.write_all(b"<Types/>").unwrap();
    writer
        .start_file("word/document.xml", FileOptions::default())
        .unwrap();
    writer
        .write_all(
            b"<w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
              <w:body>\
              <w:p><w:r><w:t>O.S. {{NUMERO_OS}} de {{DATA}} - Ponto {{ID}}</w:t></w:r></w:p>\
              <w:p><w:r><w:t>{{DESCRICAO}}</w:t></w:r></w:p>\
              </w:body></w:document>",
        )
        .unwrap();
    writer.finish().unwrap();
}

fn workflow_config(root: &Path) -> Config {
    let mut config = Config::for_tests();
    config.orders_root = root.join("orders");
    config.template_dir = root.join("templates");

    std::fs::create_dir_all(config.orders_root.join(OrderCategory::UrbMidia.label())).unwrap();
    std::fs::create_dir_all(&config.template_dir).unwrap();
    write_template(
        &config
            .template_dir
            .join(OrderCategory::UrbMidia.template_file()),
    );

    config
}

fn order_form(items: Vec<LineItem>) -> OrderForm {
    OrderForm {
        category: OrderCategory::UrbMidia,
        action_type: "Implantação".to_string(),
        item_type: "Abrigo".to_string(),
        street: "AV BRASIL".to_string(),
        number: "120".to_string(),
        neighborhood: "CENTRO".to_string(),
        complement: String::new(),
        items,
    }
}

#[tokio::test]
async fn test_create_order_end_to_end() {
    let (_db, uow) = setup().await;
    let dir = tempfile::tempdir().unwrap();
    let config = workflow_config(dir.path());
    let service = OrderCompiler::new(uow.clone(), &config);

    let year = Local::now().date_naive().year();
    let expected = uow
        .orders()
        .next_number(OrderCategory::UrbMidia, year)
        .await;

    // Two line items sharing one site identifier
    let items = vec![
        LineItem {
            site_id: "P1042".to_string(),
            description: "IMPLANTACAO DE ABRIGO NA AV BRASIL, 120 BAIRRO CENTRO - PROX. AO TERMINAL"
                .to_string(),
        },
        LineItem {
            site_id: "P1042".to_string(),
            description: "TROCA DE VIDRO".to_string(),
        },
    ];

    let created = service
        .create_order(order_form(items), "jsilva")
        .await
        .unwrap();

    assert_eq!(created.number, expected);
    assert_eq!(created.category, "URBMIDIA");
    assert_eq!(created.year, year);

    // Exactly one ledger record with the allocated number
    let history = uow.orders().history("P1042").await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].number, expected);
    assert_eq!(history[0].created_by, "jsilva");
    // Heuristic-derived address snapshot
    assert_eq!(history[0].street, "AV BRASIL");
    assert_eq!(history[0].neighborhood, "CENTRO");

    // Exactly one registry entry, active
    let entry = uow.addresses().find("P1042").await.unwrap().unwrap();
    assert_eq!(entry.status, AddressStatus::Active);
    assert_eq!(entry.last_inspector, "jsilva");

    // The document landed in the per-order folder
    let found = walk_for_docx(&config.orders_root);
    assert_eq!(found.len(), 1);
    assert!(found[0].ends_with(&created.document));

    // The next allocation moves past the appended record
    assert_eq!(
        uow.orders().next_number(OrderCategory::UrbMidia, year).await,
        expected + 1
    );
}

#[tokio::test]
async fn test_create_order_reactivates_inactive_entry() {
    let (db, uow) = setup().await;
    let dir = tempfile::tempdir().unwrap();
    let config = workflow_config(dir.path());
    let service = OrderCompiler::new(uow.clone(), &config);

    uow.addresses()
        .create("P3000", &sample_input(), "jsilva")
        .await
        .unwrap();
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "UPDATE addresses SET status = 'inactive' WHERE site_id = 'P3000'".to_string(),
    ))
    .await
    .unwrap();

    let items = vec![LineItem {
        site_id: "P3000".to_string(),
        description: "REPARO NA AV UM".to_string(),
    }];
    service
        .create_order(order_form(items), "maria")
        .await
        .unwrap();

    let entry = uow.addresses().find("P3000").await.unwrap().unwrap();
    assert_eq!(entry.status, AddressStatus::Active);
}

#[tokio::test]
async fn test_create_order_without_items_is_rejected() {
    let (_db, uow) = setup().await;
    let dir = tempfile::tempdir().unwrap();
    let config = workflow_config(dir.path());
    let service = OrderCompiler::new(uow.clone(), &config);

    let result = service.create_order(order_form(Vec::new()), "jsilva").await;
    assert!(matches!(result, Err(sigp::AppError::Validation(_))));
}

#[tokio::test]
async fn test_create_order_with_unreachable_folder_reports_path() {
    let (_db, uow) = setup().await;
    let dir = tempfile::tempdir().unwrap();
    let mut config = workflow_config(dir.path());
    // Point at a category folder that does not exist
    config.orders_root = dir.path().join("missing");
    let service = OrderCompiler::new(uow.clone(), &config);

    let items = vec![LineItem {
        site_id: "P1042".to_string(),
        description: "IMPLANTACAO DE ABRIGO NA AV BRASIL".to_string(),
    }];
    let err = service
        .create_order(order_form(items), "jsilva")
        .await
        .unwrap_err();

    match err {
        sigp::AppError::Document(msg) => assert!(msg.contains("missing")),
        other => panic!("expected Document error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_render_rolls_back_ledger_and_registry() {
    let (_db, uow) = setup().await;
    let dir = tempfile::tempdir().unwrap();
    let mut config = workflow_config(dir.path());
    // Category folder exists, but the template is missing
    config.template_dir = dir.path().join("no-templates");
    let service = OrderCompiler::new(uow.clone(), &config);

    let items = vec![LineItem {
        site_id: "P4000".to_string(),
        description: "IMPLANTACAO DE ABRIGO NA AV BRASIL".to_string(),
    }];
    let result = service.create_order(order_form(items), "jsilva").await;
    assert!(result.is_err());

    // The transaction rolled the address upsert and any append back
    assert!(uow.addresses().find("P4000").await.unwrap().is_none());
    assert!(uow.orders().history("P4000").await.is_empty());
    let year = Local::now().date_naive().year();
    assert_eq!(
        uow.orders().next_number(OrderCategory::UrbMidia, year).await,
        1
    );
}

fn walk_for_docx(root: &Path) -> Vec<String> {
    let mut found = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().is_some_and(|e| e == "docx") {
                found.push(path.to_string_lossy().into_owned());
            }
        }
    }
    found
}
