mod common;

use common::RunBuilder;
use qcsim_lib::qcsim_core::config::AppConfig;
use qcsim_lib::qcsim_core::engine::{NullPerturbation, SeededPerturbation};
use qcsim_lib::qcsim_data::CivilizationSnapshot;
use qcsim_lib::qcsim_io::{
    load_state, read_events, read_status, write_json_file, ErrorKind, RunContext, RunEvent,
    RunLayout,
};

#[test]
fn test_recovery_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();

    let first = RunContext::open(dir.path(), AppConfig::default()).unwrap();
    assert!(first.recovered());
    let state = first.state().clone();
    first.close();

    let second = RunContext::open(dir.path(), AppConfig::default()).unwrap();
    assert!(second.recovered());
    assert_eq!(second.state(), &state);
    assert_eq!(second.cycle(), 0);
    second.close();

    let events = read_events(dir.path()).unwrap();
    assert_eq!(events.len(), 2);
    assert!(events
        .iter()
        .all(|e| matches!(e, RunEvent::Recovered { entities: 5, .. })));
}

#[test]
fn test_reopen_continues_from_persisted_cycle() {
    let dir = tempfile::tempdir().unwrap();

    let mut ctx = RunContext::open(dir.path(), AppConfig::default()).unwrap();
    let mut source = SeededPerturbation::new(3);
    ctx.advance(&mut source).unwrap();
    ctx.advance(&mut source).unwrap();
    let state = ctx.state().clone();
    ctx.close();

    let ctx = RunContext::open(dir.path(), AppConfig::default()).unwrap();
    assert!(!ctx.recovered());
    assert_eq!(ctx.cycle(), 2);
    assert_eq!(ctx.state(), &state);
    assert_eq!(ctx.last_seed(), Some(3));
}

#[test]
fn test_status_reads_without_lock() {
    let dir = tempfile::tempdir().unwrap();
    assert!(read_status(dir.path()).unwrap().is_none());

    let config = RunBuilder::new()
        .at_cycle(4)
        .with_values(0.55, 0.7, 0.3, 0.3, 0.4)
        .build(dir.path());
    let _held = RunContext::open(dir.path(), config).unwrap();

    let status = read_status(dir.path()).unwrap().unwrap();
    assert_eq!(status.panel.cycle, 4);
    assert_eq!(status.snapshot.delta_h, 0.55);
}

#[test]
fn test_second_writer_is_locked_out() {
    let dir = tempfile::tempdir().unwrap();
    let _first = RunContext::open(dir.path(), AppConfig::default()).unwrap();
    assert_io_kind!(
        RunContext::open(dir.path(), AppConfig::default()),
        ErrorKind::ConcurrentWriteConflict
    );
}

#[test]
fn test_lock_released_when_context_dropped() {
    let dir = tempfile::tempdir().unwrap();
    {
        let _ctx = RunContext::open(dir.path(), AppConfig::default()).unwrap();
    }
    assert!(RunContext::open(dir.path(), AppConfig::default()).is_ok());
}

#[test]
fn test_lock_file_left_by_a_dead_process_does_not_block() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunBuilder::new().at_cycle(2).build(dir.path());
    std::fs::write(dir.path().join("run.lock"), "0123abcd pid=999999\n").unwrap();

    let mut ctx = RunContext::open(dir.path(), config).unwrap();
    let outcome = ctx.advance(&mut NullPerturbation).unwrap();
    assert_eq!(outcome.cycle, 3);
}

#[test]
fn test_existing_snapshot_is_never_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = RunContext::open(dir.path(), AppConfig::default()).unwrap();

    let layout = RunLayout::new(dir.path());
    let mut foreign = CivilizationSnapshot::initial();
    foreign.cycle = 1;
    write_json_file(&foreign, layout.snapshot(1)).unwrap();
    let before = std::fs::read(layout.snapshot(1)).unwrap();

    assert_io_kind!(
        ctx.advance(&mut NullPerturbation),
        ErrorKind::ConcurrentWriteConflict
    );
    assert_eq!(std::fs::read(layout.snapshot(1)).unwrap(), before);
    assert_eq!(ctx.cycle(), 0);
}

#[test]
fn test_garbled_snapshot_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunBuilder::new().at_cycle(2).build(dir.path());
    let layout = RunLayout::new(dir.path());
    std::fs::write(layout.snapshot(2), "{ not json").unwrap();

    assert_io_kind!(load_state(&layout, &config), ErrorKind::PersistenceCorrupt);
    assert_io_kind!(RunContext::open(dir.path(), config), ErrorKind::PersistenceCorrupt);
}

#[test]
fn test_out_of_range_snapshot_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunBuilder::new().at_cycle(1).build(dir.path());
    let layout = RunLayout::new(dir.path());
    let mut snapshot: CivilizationSnapshot =
        qcsim_lib::qcsim_io::read_json_file(layout.snapshot(1)).unwrap();
    snapshot.coherence = 1.5;
    write_json_file(&snapshot, layout.snapshot(1)).unwrap();

    assert_io_kind!(load_state(&layout, &config), ErrorKind::PersistenceCorrupt);
}

#[test]
fn test_missing_entities_with_panel_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunBuilder::new().at_cycle(1).build(dir.path());
    let layout = RunLayout::new(dir.path());
    std::fs::remove_dir_all(layout.entities_dir()).unwrap();

    assert_io_kind!(load_state(&layout, &config), ErrorKind::PersistenceCorrupt);
}

#[test]
fn test_entity_behind_the_civilization_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunBuilder::new().at_cycle(3).build(dir.path());
    let layout = RunLayout::new(dir.path());
    let stale = common::entity_at_cycle(
        qcsim_lib::qcsim_core::engine::initial_entity(&config.run.roster[0]),
        2,
    );
    write_json_file(&stale, layout.entity(&stale.id)).unwrap();

    assert_io_kind!(load_state(&layout, &config), ErrorKind::PersistenceCorrupt);
}

#[test]
fn test_interrupted_advance_is_detected() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunBuilder::new().at_cycle(1).build(dir.path());
    let layout = RunLayout::new(dir.path());
    let mut ahead = CivilizationSnapshot::initial();
    ahead.cycle = 2;
    write_json_file(&ahead, layout.snapshot(2)).unwrap();

    assert_io_kind!(load_state(&layout, &config), ErrorKind::PersistenceCorrupt);
}

#[test]
fn test_invalid_config_is_rejected_before_locking() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunBuilder::new()
        .with_config(|c| c.drift.max_step = 3.0)
        .config();

    assert_io_kind!(RunContext::open(dir.path(), config), ErrorKind::InvalidInput);
    assert!(!dir.path().join("run.lock").exists());
}
