use amber::{EntityState, Value};
use pretty_assertions::assert_eq;
use tests::{fixtures, session, store};

#[test]
fn identity_key_is_read_back() {
    let (mut session, mut log) = session(fixtures::company());

    let employee = session.model("Employee").unwrap();
    let emp = session.create(employee);
    session.set(emp, "name", "ann").unwrap();
    session.persist(emp).unwrap();

    let op = log.pop().expect("expected an INSERT");
    assert_eq!(
        op.sql,
        "insert into Employee (name, version, dept_id) values (?, ?, ?)"
    );
    assert_eq!(op.params, [Value::from("ann"), Value::I32(0), Value::Null]);
    assert!(log.is_empty());

    assert_eq!(session.state(emp), EntityState::Managed);
    assert_eq!(session.key(emp), Some(&Value::I64(1)));
    assert_eq!(session.get(emp, "id").unwrap(), Value::I64(1));
    assert_eq!(session.get(emp, "version").unwrap(), Value::I32(0));
}

#[test]
fn sequence_key_is_assigned_before_insert() {
    let (mut session, mut log) = session(fixtures::company());
    store(&mut session).set_sequence("Department_cseq", 41);

    let department = session.model("Department").unwrap();
    let dept = session.create(department);
    session.set(dept, "name", "research").unwrap();
    session.persist(dept).unwrap();

    let op = log.pop().expect("expected an INSERT");
    assert_eq!(op.sql, "insert into Department (id, name) values (?, ?)");
    assert_eq!(op.params, [Value::I64(42), Value::from("research")]);
    assert_eq!(session.key(dept), Some(&Value::I64(42)));
}

#[test]
fn assigned_key_skips_generator() {
    let (mut session, log) = session(fixtures::company());

    let department = session.model("Department").unwrap();
    let dept = session.create(department);
    session.set(dept, "id", 7i64).unwrap();
    session.persist(dept).unwrap();

    assert_eq!(session.key(dept), Some(&Value::I64(7)));
    assert_eq!(log.inserts(), 1);

    // The sequence was never consumed.
    let next = session.create(department);
    session.persist(next).unwrap();
    assert_eq!(session.key(next), Some(&Value::I64(1)));
}

#[test]
fn max_key_selects_current_maximum() {
    let (mut session, log) = session(fixtures::shop());
    for id in [4, 9] {
        store(&mut session).seed("Purchase", [("id", Value::I64(id))]);
    }

    let purchase = session.model("Purchase").unwrap();
    let order = session.create(purchase);
    session.persist(order).unwrap();

    assert_eq!(
        log.sql(),
        [
            "select max(id) from Purchase",
            "insert into Purchase (id, customer_id) values (?, ?)",
        ]
    );
    assert_eq!(session.key(order), Some(&Value::I64(10)));
}

#[test]
fn max_key_of_empty_table_starts_at_one() {
    let (mut session, _log) = session(fixtures::shop());

    let purchase = session.model("Purchase").unwrap();
    let order = session.create(purchase);
    session.persist(order).unwrap();

    assert_eq!(session.key(order), Some(&Value::I64(1)));
}

#[test]
fn null_key_is_rejected_on_create() {
    let (mut session, log) = session(fixtures::documents());

    let document = session.model("Document").unwrap();
    let doc = session.create(document);
    session.set(doc, "name", "untitled").unwrap();

    let err = session.persist(doc).unwrap_err();
    assert!(err.is_invalid_state());
    assert!(err.to_string().contains("must not be null"));
    assert!(log.is_empty());
    assert_eq!(session.state(doc), EntityState::Transient);
}

#[test]
fn duplicate_key_is_rejected() {
    let (mut session, log) = session(fixtures::documents());

    let document = session.model("Document").unwrap();
    let first = session.create(document);
    session.set(first, "id", 1i64).unwrap();
    session.persist(first).unwrap();

    let second = session.create(document);
    session.set(second, "id", 1i64).unwrap();
    let err = session.persist(second).unwrap_err();

    assert!(err.is_invalid_state());
    assert_eq!(log.inserts(), 1);
}

#[test]
fn persisted_instance_is_fully_loaded() {
    let (mut session, log) = session(fixtures::documents());

    let document = session.model("Document").unwrap();
    let doc = session.create(document);
    session.set(doc, "id", 3i64).unwrap();
    session.set(doc, "body", b"draft".to_vec()).unwrap();
    session.persist(doc).unwrap();

    assert_eq!(session.get(doc, "body").unwrap(), Value::from(b"draft".to_vec()));
    assert_eq!(session.get(doc, "name").unwrap(), Value::Null);
    assert_eq!(log.selects(), 0);

    // Persisting again is a no-op.
    session.persist(doc).unwrap();
    assert_eq!(log.inserts(), 1);
}

#[test]
fn detached_instance_cannot_be_persisted() {
    let (mut session, _log) = session(fixtures::documents());

    let document = session.model("Document").unwrap();
    let doc = session.create(document);
    session.set(doc, "id", 3i64).unwrap();
    session.persist(doc).unwrap();
    session.detach(doc);

    assert_eq!(session.state(doc), EntityState::Detached);
    assert!(session.persist(doc).unwrap_err().is_invalid_state());
}
