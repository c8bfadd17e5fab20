use amber::Value;
use pretty_assertions::assert_eq;
use tests::{fixtures, session, store, TestSession};

fn seed_office(session: &mut TestSession) {
    store(session).seed(
        "Office",
        [
            ("createdBy", Value::from("root")),
            ("id", Value::I64(1)),
            ("city", Value::from("Oslo")),
            ("zip", Value::from("0150")),
        ],
    );
}

#[test]
fn superclass_and_embedded_columns_load_together() {
    let (mut session, log) = session(fixtures::offices());
    seed_office(&mut session);

    let office = session.model("Office").unwrap();
    let hq = session.find(office, 1i64).unwrap().unwrap();

    assert_eq!(
        log.sql(),
        ["select o.createdBy, o.id, o.city, o.zip from Office o where o.id=?"]
    );
    assert_eq!(session.get(hq, "createdBy").unwrap(), Value::from("root"));
    assert_eq!(
        session.get(hq, "address").unwrap(),
        Value::record([Value::from("Oslo"), Value::from("0150")])
    );
    assert_eq!(log.selects(), 1);
}

#[test]
fn embedded_update_writes_every_part() {
    let (mut session, mut log) = session(fixtures::offices());
    seed_office(&mut session);

    let office = session.model("Office").unwrap();
    let hq = session.find(office, 1i64).unwrap().unwrap();
    log.clear();

    let moved = Value::record([Value::from("Bergen"), Value::from("5003")]);
    session.set(hq, "address", moved.clone()).unwrap();
    assert!(session.is_dirty(hq, "address").unwrap());
    assert!(!session.is_dirty(hq, "createdBy").unwrap());

    session.flush().unwrap();

    let op = log.pop().expect("expected an UPDATE");
    assert_eq!(op.sql, "update Office set city=?, zip=? where id=?");
    assert_eq!(
        op.params,
        [Value::from("Bergen"), Value::from("5003"), Value::I64(1)]
    );
    assert!(log.is_empty());

    let rows = store(&mut session).rows("Office");
    assert_eq!(rows[0]["city"], Value::from("Bergen"));
    assert_eq!(rows[0]["createdBy"], Value::from("root"));
}

#[test]
fn embedded_with_null_parts_reads_null() {
    let (mut session, _log) = session(fixtures::offices());
    store(&mut session).seed(
        "Office",
        [
            ("createdBy", Value::from("root")),
            ("id", Value::I64(2)),
            ("city", Value::Null),
            ("zip", Value::Null),
        ],
    );

    let office = session.model("Office").unwrap();
    let annex = session.find(office, 2i64).unwrap().unwrap();

    assert_eq!(session.get(annex, "address").unwrap(), Value::Null);
}

#[test]
fn embedded_id_filters_on_every_part() {
    let (mut session, log) = session(fixtures::badges());
    store(&mut session).seed(
        "Badge",
        [
            ("deptId", Value::I32(3)),
            ("empId", Value::I32(5)),
            ("label", Value::from("visitor")),
        ],
    );

    let badge = session.model("Badge").unwrap();
    let key = Value::record([Value::I32(3), Value::I32(5)]);
    let found = session.find(badge, key.clone()).unwrap().unwrap();

    assert_eq!(
        log.sql(),
        ["select o.deptId, o.empId, o.label from Badge o where o.deptId=? and o.empId=?"]
    );
    assert_eq!(session.key(found), Some(&key));
    assert_eq!(session.get(found, "id").unwrap(), key);
    assert_eq!(session.get(found, "label").unwrap(), Value::from("visitor"));
}

#[test]
fn embedded_id_is_written_as_columns() {
    let (mut session, mut log) = session(fixtures::badges());

    let badge = session.model("Badge").unwrap();
    let created = session.create(badge);
    let key = Value::record([Value::I32(1), Value::I32(2)]);
    session.set(created, "id", key.clone()).unwrap();
    session.set(created, "label", "staff").unwrap();
    session.persist(created).unwrap();

    let op = log.pop().expect("expected an INSERT");
    assert_eq!(
        op.sql,
        "insert into Badge (deptId, empId, label) values (?, ?, ?)"
    );
    assert_eq!(
        op.params,
        [Value::I32(1), Value::I32(2), Value::from("staff")]
    );
    assert_eq!(session.key(created), Some(&key));

    // The key cannot change once managed.
    let err = session
        .set(created, "id", Value::record([Value::I32(1), Value::I32(3)]))
        .unwrap_err();
    assert!(err.is_invalid_state());

    session.set(created, "label", "guest").unwrap();
    session.flush().unwrap();

    let op = log.pop().expect("expected an UPDATE");
    assert_eq!(op.sql, "update Badge set label=? where deptId=? and empId=?");
    assert_eq!(
        op.params,
        [Value::from("guest"), Value::I32(1), Value::I32(2)]
    );
}
