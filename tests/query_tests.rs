// ==================== Query Tests (file-backed) ====================

mod common;

use common::*;
use maungdb::{QueryError, Value};

#[test]
fn test_select_all_uses_qualified_header() {
    let (executor, _dir) = create_seeded_executor();
    let set = query(&executor, &super_ctx(), "TINGALI * TI divisi");

    assert_eq!(set.columns, vec!["divisi.id", "divisi.nama"]);
    assert_eq!(set.rows.len(), 3);
    assert_eq!(set.message, "3 row(s) found");
}

#[test]
fn test_where_chain_and_typed_comparisons() {
    let (executor, _dir) = create_seeded_executor();
    let ctx = super_ctx();

    let set = query(
        &executor,
        &ctx,
        "TINGALI nama TI pegawai DIMANA gaji >= 6000 SARENG aktif = true",
    );
    assert_eq!(column(&set), vec![text("Ujang")]);

    let set = query(
        &executor,
        &ctx,
        "SELECT nama FROM pegawai WHERE lebet < 2020-06-01 OR nama LIKE eu",
    );
    assert_eq!(column(&set), vec![text("Asep"), text("Ujang"), text("Euis")]);

    let set = query(&executor, &ctx, "TINGALI nama TI pegawai DIMANA gaji = NULL");
    assert_eq!(column(&set), vec![text("Dadang")]);

    // Ordering against a missing value is never true
    let set = query(&executor, &ctx, "TINGALI nama TI pegawai DIMANA gaji < 100000");
    assert_eq!(set.rows.len(), 3);
}

#[test]
fn test_unknown_projection_is_null() {
    let (executor, _dir) = create_seeded_executor();
    let set = query(
        &executor,
        &super_ctx(),
        "TINGALI nama,umur TI pegawai DIMANA id = 1",
    );
    assert_eq!(set.columns, vec!["nama", "umur"]);
    assert_eq!(set.rows, vec![vec![text("Asep"), Value::Null]]);
}

#[test]
fn test_order_limit_offset() {
    let (executor, _dir) = create_seeded_executor();
    let ctx = super_ctx();

    let set = query(
        &executor,
        &ctx,
        "TINGALI nama TI pegawai DIMANA gaji != NULL RUNTUYKEUN gaji TURUN SAKADAR 2",
    );
    assert_eq!(column(&set), vec![text("Ujang"), text("Euis")]);

    let set = query(&executor, &ctx, "SELECT id FROM pegawai ORDER BY id DESC LIMIT 2 OFFSET 1");
    assert_eq!(column(&set), vec![Value::Int(3), Value::Int(2)]);

    let set = query(&executor, &ctx, "TINGALI id TI pegawai LIWATAN 10");
    assert!(set.rows.is_empty());

    assert!(matches!(
        executor.execute(&ctx, "TINGALI id TI pegawai SAKADAR -1"),
        Err(QueryError::Syntax(_))
    ));
}

#[test]
fn test_limit_past_end_is_clamped() {
    let (executor, _dir) = create_test_executor();
    let ctx = super_ctx();
    status(&executor, &ctx, "DAMEL angka n:INT");
    for n in 1..=6 {
        status(&executor, &ctx, &format!("SIMPEN angka {}", n));
    }

    let set = query(&executor, &ctx, "TINGALI n TI angka SAKADAR 2 LIWATAN 5");
    assert_eq!(column(&set), vec![Value::Int(6)]);
    assert_eq!(set.message, "1 row(s) found");

    let set = query(&executor, &ctx, "TINGALI n TI angka RUNTUYKEUN n TURUN SAKADAR 10 LIWATAN 4");
    assert_eq!(column(&set), vec![Value::Int(2), Value::Int(1)]);

    let set = query(&executor, &ctx, "TINGALI n TI angka SAKADAR 2 LIWATAN 6");
    assert!(set.rows.is_empty());
}

#[test]
fn test_where_chain_folds_left() {
    let (executor, _dir) = create_seeded_executor();
    let ctx = super_ctx();

    // Euis fails the AND pair and is kept by the trailing OR
    let set = query(
        &executor,
        &ctx,
        "TINGALI nama TI pegawai DIMANA gaji > 5500 SARENG divisi_id = 10 ATAWA aktif = false",
    );
    assert_eq!(column(&set), vec![text("Ujang"), text("Euis")]);

    // ((gaji > 5500 AND divisi_id = 20) OR aktif = true), not gaji > 5500 AND (...)
    let set = query(
        &executor,
        &ctx,
        "TINGALI nama TI pegawai DIMANA gaji > 5500 SARENG divisi_id = 20 ATAWA aktif = true",
    );
    assert_eq!(
        column(&set),
        vec![text("Asep"), text("Ujang"), text("Euis"), text("Dadang")]
    );
}

#[test]
fn test_partial_date_filters() {
    let (executor, _dir) = create_seeded_executor();
    let ctx = super_ctx();

    let set = query(&executor, &ctx, "TINGALI nama TI pegawai DIMANA lebet < 2021");
    assert_eq!(column(&set), vec![text("Asep"), text("Ujang")]);

    let set = query(&executor, &ctx, "TINGALI nama TI pegawai DIMANA lebet >= 2021-03");
    assert_eq!(column(&set), vec![text("Euis"), text("Dadang")]);

    assert_eq!(
        status(&executor, &ctx, "MICEUN TI pegawai DIMANA lebet >= 2022"),
        "1 row(s) deleted"
    );
}

#[test]
fn test_joins() {
    let (executor, _dir) = create_seeded_executor();
    let ctx = super_ctx();

    let set = query(
        &executor,
        &ctx,
        "TINGALI pegawai.nama,divisi.nama TI pegawai GABUNG divisi DINA pegawai.divisi_id = divisi.id RUNTUYKEUN pegawai.id",
    );
    assert_eq!(set.rows.len(), 3);
    assert_eq!(set.rows[2], vec![text("Euis"), text("HRD")]);

    // Unmatched left rows are padded
    let set = query(
        &executor,
        &ctx,
        "TINGALI pegawai.nama,divisi.nama TI pegawai KENCA GABUNG divisi DINA pegawai.divisi_id = divisi.id DIMANA pegawai.id = 4",
    );
    assert_eq!(set.rows, vec![vec![text("Dadang"), Value::Null]]);

    // Unmatched right rows are padded
    let set = query(
        &executor,
        &ctx,
        "TINGALI divisi.nama TI pegawai KATUHU GABUNG divisi DINA pegawai.divisi_id = divisi.id DIMANA pegawai.id = NULL",
    );
    assert_eq!(column(&set), vec![text("Keuangan")]);

    // Reversed ON sides resolve the same way
    let set = query(
        &executor,
        &ctx,
        "SELECT pegawai.nama FROM pegawai INNER JOIN divisi ON divisi.id = pegawai.divisi_id WHERE divisi.nama = IT",
    );
    assert_eq!(column(&set), vec![text("Asep"), text("Ujang")]);

    let set = query(
        &executor,
        &ctx,
        "SELECT pegawai.id, divisi.id FROM pegawai FULL JOIN divisi ON pegawai.divisi_id = divisi.id",
    );
    // 3 matches + Dadang + Keuangan
    assert_eq!(set.rows.len(), 5);
}

#[test]
fn test_aggregates() {
    let (executor, _dir) = create_seeded_executor();
    let ctx = super_ctx();

    let set = query(
        &executor,
        &ctx,
        "TINGALI JUMLAH(*),TOTAL(gaji),RATA(gaji),PANGGEDENA(gaji),PANGLEUTIKNA(gaji) TI pegawai",
    );
    assert_eq!(
        set.rows,
        vec![vec![
            Value::Int(4),
            Value::Float(18000.0),
            Value::Float(6000.0),
            Value::Float(7000.0),
            Value::Float(5000.0),
        ]]
    );

    let set = query(&executor, &ctx, "SELECT COUNT(id) FROM pegawai WHERE divisi_id = 10");
    assert_eq!(set.rows, vec![vec![Value::Int(2)]]);

    let set = query(&executor, &ctx, "SELECT SUM(gaji) FROM pegawai WHERE id > 100");
    assert_eq!(set.rows, vec![vec![Value::Int(0)]]);
}

#[test]
fn test_update_and_delete() {
    let (executor, dir) = create_seeded_executor();
    let ctx = super_ctx();

    assert_eq!(
        status(&executor, &ctx, "OMEAN pegawai JADI gaji=8000 DIMANA divisi_id = 10"),
        "2 row(s) updated"
    );
    let set = query(&executor, &ctx, "TINGALI gaji TI pegawai DIMANA divisi_id = 10");
    assert_eq!(column(&set), vec![Value::Float(8000.0), Value::Float(8000.0)]);

    assert_eq!(
        status(&executor, &ctx, "MICEUN TI pegawai DIMANA aktif = false"),
        "1 row(s) deleted"
    );
    assert!(!record_file(&dir, "pegawai").contains("Euis"));

    assert_eq!(
        status(&executor, &ctx, "MICEUN TI pegawai DIMANA id = 99"),
        "0 row(s) deleted"
    );
}

#[test]
fn test_permissions() {
    let (executor, _dir) = create_seeded_executor();
    let user = user_ctx();

    // Default permissions let users read but not write
    assert_eq!(query(&executor, &user, "TINGALI divisi").rows.len(), 3);
    assert!(matches!(
        executor.execute(&user, "SIMPEN divisi 40|Hukum"),
        Err(QueryError::PermissionDenied { .. })
    ));

    status(
        &executor,
        &super_ctx(),
        "DAMEL rahasia id:INT --read=admin --write=admin",
    );
    assert!(matches!(
        executor.execute(&user, "TINGALI rahasia"),
        Err(QueryError::PermissionDenied { .. })
    ));
    assert!(matches!(
        executor.execute(&user, "TINGALI divisi GABUNG rahasia DINA divisi.id = rahasia.id"),
        Err(QueryError::PermissionDenied { .. })
    ));
}

#[test]
fn test_missing_table() {
    let (executor, _dir) = create_test_executor();
    assert!(matches!(
        executor.execute(&super_ctx(), "TINGALI euweuh"),
        Err(QueryError::NotFound(_))
    ));
}
