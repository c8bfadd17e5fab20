use amber::Value;
use pretty_assertions::assert_eq;
use tests::{fixtures, session, store};

#[test]
fn make_key_round_trip() {
    let schema = fixtures::assignments();
    let assignment = schema.app.model_by_name("Assignment").unwrap().id;
    let id = &schema.entity(assignment).id;

    let factory = id.factory(&schema).expect("composite key has a factory");
    assert_eq!(factory.name, "make_key_assignment");
    assert_eq!(factory.arity(), 2);

    let key = factory.make(vec![Value::I32(3), Value::I32(5)]).unwrap();
    assert_eq!(
        factory.decompose(&key).unwrap(),
        [Value::I32(3), Value::I32(5)]
    );

    assert!(factory.make(vec![Value::I32(3)]).unwrap_err().is_invalid_state());
}

#[test]
fn load_filters_on_every_key_column() {
    let (mut session, log) = session(fixtures::assignments());
    store(&mut session).seed(
        "Assignment",
        [
            ("deptId", Value::I32(3)),
            ("empId", Value::I32(5)),
            ("role", Value::from("lead")),
        ],
    );

    let assignment = session.model("Assignment").unwrap();
    let key = Value::record([Value::I32(3), Value::I32(5)]);
    let found = session.find(assignment, key.clone()).unwrap().unwrap();

    assert_eq!(
        log.sql(),
        ["select o.deptId, o.empId, o.role from Assignment o where o.deptId=? and o.empId=?"]
    );
    assert_eq!(session.key(found), Some(&key));
    assert_eq!(session.get(found, "empId").unwrap(), Value::I32(5));
    assert_eq!(session.get(found, "role").unwrap(), Value::from("lead"));
}

#[test]
fn persist_builds_key_from_fields() {
    let (mut session, mut log) = session(fixtures::assignments());

    let assignment = session.model("Assignment").unwrap();
    let created = session.create(assignment);
    session.set(created, "deptId", 1i32).unwrap();
    session.set(created, "empId", 2i32).unwrap();
    session.set(created, "role", "member").unwrap();
    session.persist(created).unwrap();

    let op = log.pop().expect("expected an INSERT");
    assert_eq!(
        op.sql,
        "insert into Assignment (deptId, empId, role) values (?, ?, ?)"
    );

    let key = Value::record([Value::I32(1), Value::I32(2)]);
    assert_eq!(session.key(created), Some(&key));

    // Found through the identity map without a SELECT.
    let found = session.find(assignment, key).unwrap().unwrap();
    assert_eq!(found, created);
    assert!(log.is_empty());

    session.set(created, "role", "lead").unwrap();
    session.flush().unwrap();

    let op = log.pop().expect("expected an UPDATE");
    assert_eq!(
        op.sql,
        "update Assignment set role=? where deptId=? and empId=?"
    );
    assert_eq!(
        op.params,
        [Value::from("lead"), Value::I32(1), Value::I32(2)]
    );
}

#[test]
fn partially_null_key_is_rejected() {
    let (mut session, log) = session(fixtures::assignments());

    let assignment = session.model("Assignment").unwrap();
    let created = session.create(assignment);
    session.set(created, "deptId", 1i32).unwrap();

    assert!(session.persist(created).unwrap_err().is_invalid_state());
    assert!(log.is_empty());
}
