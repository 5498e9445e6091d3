// ==================== Concurrency Tests ====================

mod common;

use common::*;
use maungdb::Value;
use std::sync::Arc;
use std::thread;

#[test]
fn test_parallel_inserts_keep_every_row() {
    let (executor, dir) = create_test_executor();
    let executor = Arc::new(executor);
    status(&executor, &super_ctx(), "DAMEL log id:INT:PK,sumber:STRING");

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let executor = Arc::clone(&executor);
            thread::spawn(move || {
                let ctx = super_ctx();
                for i in 0..25 {
                    let id = t * 100 + i;
                    executor
                        .execute(&ctx, &format!("SIMPEN log {}|thread{}", id, t))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let set = query(&executor, &super_ctx(), "TINGALI JUMLAH(*) TI log");
    assert_eq!(set.rows, vec![vec![Value::Int(200)]]);
    assert_eq!(record_file(&dir, "log").lines().count(), 200);
}

#[test]
fn test_racing_duplicate_keys_admit_one() {
    let (executor, _dir) = create_test_executor();
    let executor = Arc::new(executor);
    status(&executor, &super_ctx(), "DAMEL kunci id:INT:PK");

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let executor = Arc::clone(&executor);
            thread::spawn(move || executor.execute(&super_ctx(), "SIMPEN kunci 1").is_ok())
        })
        .collect();
    let accepted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(accepted, 1);
}

#[test]
fn test_updates_and_reads_interleave() {
    let (executor, _dir) = create_seeded_executor();
    let executor = Arc::new(executor);

    let writer = {
        let executor = Arc::clone(&executor);
        thread::spawn(move || {
            for i in 0..50 {
                executor
                    .execute(
                        &super_ctx(),
                        &format!("OMEAN pegawai JADI gaji={} DIMANA id = 1", i),
                    )
                    .unwrap();
            }
        })
    };
    let reader = {
        let executor = Arc::clone(&executor);
        thread::spawn(move || {
            for _ in 0..50 {
                // Every read sees all four rows, never a half-written file
                let set = query(
                    &executor,
                    &super_ctx(),
                    "TINGALI pegawai.id TI pegawai KENCA GABUNG divisi DINA pegawai.divisi_id = divisi.id",
                );
                assert_eq!(set.rows.len(), 4);
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();

    let set = query(&executor, &super_ctx(), "TINGALI gaji TI pegawai DIMANA id = 1");
    assert_eq!(column(&set), vec![Value::Float(49.0)]);
}
