use amber::{EntityState, Value};
use pretty_assertions::assert_eq;
use tests::{fixtures, session, store};

fn seed_document(session: &mut tests::TestSession) {
    store(session).seed(
        "Document",
        [
            ("id", Value::I64(1)),
            ("name", Value::from("readme")),
            ("body", Value::from(b"hello".to_vec())),
        ],
    );
}

#[test]
fn find_reads_default_group_only() {
    let (mut session, log) = session(fixtures::documents());
    seed_document(&mut session);

    let document = session.model("Document").unwrap();
    let doc = session.find(document, 1i64).unwrap().unwrap();

    assert_eq!(
        log.sql(),
        ["select o.id, o.name from Document o where o.id=?"]
    );
    assert_eq!(session.state(doc), EntityState::Managed);
    assert!(session.is_loaded(doc, "name").unwrap());
    assert!(!session.is_loaded(doc, "body").unwrap());
    assert_eq!(session.get(doc, "name").unwrap(), Value::from("readme"));
    assert_eq!(log.selects(), 1);
}

#[test]
fn lazy_field_loads_once() {
    let (mut session, log) = session(fixtures::documents());
    seed_document(&mut session);

    let document = session.model("Document").unwrap();
    let doc = session.find(document, 1i64).unwrap().unwrap();

    let body = session.get(doc, "body").unwrap();
    assert_eq!(body, Value::from(b"hello".to_vec()));
    assert_eq!(log.selects(), 2);
    assert_eq!(
        log.sql()[1],
        "select o.body from Document o where o.id=?"
    );

    session.get(doc, "body").unwrap();
    session.get(doc, "name").unwrap();
    assert_eq!(log.selects(), 2);
}

#[test]
fn find_missing_row() {
    let (mut session, log) = session(fixtures::documents());

    let document = session.model("Document").unwrap();
    assert!(session.find(document, 7i64).unwrap().is_none());
    assert_eq!(log.selects(), 1);

    // The failed lookup leaves nothing in the identity map.
    assert!(session.find(document, 7i64).unwrap().is_none());
    assert_eq!(log.selects(), 2);
}

#[test]
fn identity_map_returns_same_instance() {
    let (mut session, log) = session(fixtures::documents());
    seed_document(&mut session);

    let document = session.model("Document").unwrap();
    let first = session.find(document, 1i64).unwrap().unwrap();
    let second = session.find(document, 1i64).unwrap().unwrap();

    assert_eq!(first, second);
    assert_eq!(log.selects(), 1);
}

#[test]
fn hollow_instance_loads_on_first_read() {
    let (mut session, log) = session(fixtures::documents());
    seed_document(&mut session);

    let document = session.model("Document").unwrap();
    let doc = session
        .load_entity(document, Value::I64(1), false)
        .unwrap();

    assert!(log.is_empty());
    assert!(session.load_mask(doc).is_empty());
    assert_eq!(session.key(doc), Some(&Value::I64(1)));

    assert_eq!(session.get(doc, "name").unwrap(), Value::from("readme"));
    assert_eq!(log.selects(), 1);
}

#[test]
fn failed_load_leaves_group_unloaded() {
    let (mut session, log) = session(fixtures::documents());
    seed_document(&mut session);

    let document = session.model("Document").unwrap();
    let doc = session.find(document, 1i64).unwrap().unwrap();

    store(&mut session).fail_next("Document");
    let err = session.get(doc, "body").unwrap_err();
    assert!(err.is_storage());
    assert!(!session.is_loaded(doc, "body").unwrap());

    // The next access retries the SELECT.
    assert_eq!(
        session.get(doc, "body").unwrap(),
        Value::from(b"hello".to_vec())
    );
    assert_eq!(log.selects(), 3);
}

#[test]
fn null_key_is_rejected() {
    let (mut session, log) = session(fixtures::documents());

    let document = session.model("Document").unwrap();
    let err = session.find(document, Value::Null).unwrap_err();

    assert!(err.is_invalid_state());
    assert!(log.is_empty());
}

#[test]
fn transient_instance_reads_in_memory() {
    let (mut session, log) = session(fixtures::documents());

    let document = session.model("Document").unwrap();
    let doc = session.create(document);
    session.set(doc, "name", "draft").unwrap();

    assert_eq!(session.state(doc), EntityState::Transient);
    assert_eq!(session.get(doc, "name").unwrap(), Value::from("draft"));
    assert_eq!(session.get(doc, "body").unwrap(), Value::Null);
    assert!(log.is_empty());
    assert_eq!(session.pending_updates().len(), 0);
}

#[test]
fn eager_one_to_many_loads_with_owner() {
    let (mut session, log) = session(fixtures::branches());
    store(&mut session).seed("Branch", [("id", Value::I64(1)), ("name", Value::from("north"))]);
    for (id, name) in [(1, "cyd"), (2, "ann")] {
        store(&mut session).seed(
            "Clerk",
            [
                ("id", Value::I64(id)),
                ("name", Value::from(name)),
                ("branch_id", Value::I64(1)),
            ],
        );
    }

    let branch = session.model("Branch").unwrap();
    let north = session.find(branch, 1i64).unwrap().unwrap();

    assert_eq!(
        log.sql(),
        [
            "select o.id, o.name from Branch o where o.id=?",
            "select o.id from Clerk o where o.branch_id=? order by o.name",
        ]
    );
    assert!(session.is_loaded(north, "clerks").unwrap());

    let clerks = session.get(north, "clerks").unwrap();
    let keys: Vec<_> = clerks
        .as_list()
        .unwrap()
        .iter()
        .map(|clerk| session.key(clerk.as_entity().unwrap()).cloned())
        .collect();
    assert_eq!(keys, [Some(Value::I64(2)), Some(Value::I64(1))]);
    assert_eq!(log.selects(), 2);
}

#[test]
fn dependent_one_to_one_loads_with_owner() {
    let (mut session, log) = session(fixtures::directors());
    store(&mut session).seed("Dept", [("id", Value::I64(1)), ("name", Value::from("ops"))]);
    store(&mut session).seed(
        "Boss",
        [
            ("id", Value::I64(7)),
            ("name", Value::from("dana")),
            ("dept_id", Value::I64(1)),
        ],
    );

    let dept = session.model("Dept").unwrap();
    let ops = session.find(dept, 1i64).unwrap().unwrap();

    assert_eq!(
        log.sql(),
        [
            "select o.id, o.name from Dept o where o.id=?",
            "select o.id from Boss o where o.dept_id=?",
        ]
    );

    let boss = session.get(ops, "boss").unwrap();
    assert_eq!(session.key(boss.as_entity().unwrap()), Some(&Value::I64(7)));
    assert_eq!(log.selects(), 2);
}
