use amber::Value;
use pretty_assertions::assert_eq;
use tests::{fixtures, session, store};

#[test]
fn subtype_rows_are_written_root_first() {
    let (mut session, log) = session(fixtures::staff());

    let manager = session.model("Manager").unwrap();
    let boss = session.create(manager);
    session.set(boss, "id", 1i64).unwrap();
    session.set(boss, "name", "dana").unwrap();
    session.set(boss, "bonus", 500i64).unwrap();
    session.persist(boss).unwrap();

    assert_eq!(
        log.sql(),
        [
            "insert into Person (id, name) values (?, ?)",
            "insert into Manager (id, bonus) values (?, ?)",
        ]
    );
    assert_eq!(store(&mut session).rows("Manager")[0]["id"], Value::I64(1));
}

#[test]
fn subtype_loads_one_group_per_table() {
    let (mut session, log) = session(fixtures::staff());
    store(&mut session).seed("Person", [("id", Value::I64(1)), ("name", Value::from("dana"))]);
    store(&mut session).seed("Manager", [("id", Value::I64(1)), ("bonus", Value::I64(500))]);

    let manager = session.model("Manager").unwrap();
    let boss = session.find(manager, 1i64).unwrap().unwrap();

    assert_eq!(
        log.sql(),
        [
            "select o.id, o.name from Person o where o.id=?",
            "select o.bonus from Manager o where o.id=?",
        ]
    );
    assert_eq!(session.get(boss, "bonus").unwrap(), Value::I64(500));
    assert_eq!(session.get(boss, "name").unwrap(), Value::from("dana"));
}

#[test]
fn subtype_updates_only_dirty_tables() {
    let (mut session, mut log) = session(fixtures::staff());

    let manager = session.model("Manager").unwrap();
    let boss = session.create(manager);
    session.set(boss, "id", 1i64).unwrap();
    session.persist(boss).unwrap();
    log.clear();

    session.set(boss, "bonus", 750i64).unwrap();
    session.flush().unwrap();

    assert_eq!(log.sql(), ["update Manager set bonus=? where id=?"]);
}

#[test]
fn subtype_rows_are_deleted_first() {
    let (mut session, mut log) = session(fixtures::staff());

    let manager = session.model("Manager").unwrap();
    let boss = session.create(manager);
    session.set(boss, "id", 1i64).unwrap();
    session.persist(boss).unwrap();
    log.clear();

    session.remove(boss).unwrap();

    assert_eq!(
        log.sql(),
        [
            "delete from Manager where id=?",
            "delete from Person where id=?",
        ]
    );
    assert!(store(&mut session).rows("Person").is_empty());
}

#[test]
fn subtype_shares_root_identity() {
    let (mut session, _log) = session(fixtures::staff());

    let person = session.model("Person").unwrap();
    let manager = session.model("Manager").unwrap();

    let boss = session.create(manager);
    session.set(boss, "id", 1i64).unwrap();
    session.persist(boss).unwrap();

    // Keys are unique across the hierarchy.
    let other = session.create(person);
    session.set(other, "id", 1i64).unwrap();
    assert!(session.persist(other).unwrap_err().is_invalid_state());
}
