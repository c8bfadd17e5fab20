use amber::{EntityState, Value};
use pretty_assertions::assert_eq;
use tests::{fixtures, session, store, TestSession};

fn seed_document(session: &mut TestSession) {
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
fn merge_detached_copies_onto_managed_instance() {
    let (mut session, mut log) = session(fixtures::documents());
    seed_document(&mut session);

    let document = session.model("Document").unwrap();
    let doc = session.find(document, 1i64).unwrap().unwrap();
    session.detach(doc);
    session.set(doc, "name", "changelog").unwrap();
    log.clear();

    let managed = session.merge(doc).unwrap();

    assert_ne!(managed, doc);
    assert_eq!(session.state(doc), EntityState::Detached);
    assert_eq!(session.state(managed), EntityState::Managed);
    assert_eq!(session.get(managed, "name").unwrap(), Value::from("changelog"));
    assert!(session.is_dirty(managed, "name").unwrap());

    // `body` was never loaded on the detached copy and is left alone.
    assert!(!session.is_dirty(managed, "body").unwrap());
    assert_eq!(
        log.sql(),
        ["select o.id, o.name from Document o where o.id=?"]
    );

    session.flush().unwrap();
    assert_eq!(log.updates(), 1);
    assert_eq!(
        store(&mut session).rows("Document")[0]["name"],
        Value::from("changelog")
    );
}

#[test]
fn merge_managed_instance_returns_itself() {
    let (mut session, log) = session(fixtures::documents());
    seed_document(&mut session);

    let document = session.model("Document").unwrap();
    let doc = session.find(document, 1i64).unwrap().unwrap();

    assert_eq!(session.merge(doc).unwrap(), doc);
    assert_eq!(log.len(), 1);
}

#[test]
fn merge_transient_without_row_persists_copy() {
    let (mut session, log) = session(fixtures::documents());

    let document = session.model("Document").unwrap();
    let draft = session.create(document);
    session.set(draft, "id", 4i64).unwrap();
    session.set(draft, "name", "notes").unwrap();

    let managed = session.merge(draft).unwrap();

    assert_ne!(managed, draft);
    assert_eq!(session.state(draft), EntityState::Transient);
    assert_eq!(session.state(managed), EntityState::Managed);
    assert_eq!(session.key(managed), Some(&Value::I64(4)));
    assert_eq!(
        log.sql(),
        [
            "select o.id, o.name from Document o where o.id=?",
            "insert into Document (id, name, body) values (?, ?, ?)",
        ]
    );
}

#[test]
fn merge_cascades_to_collection() {
    let (mut session, log) = session(fixtures::company());

    let department = session.model("Department").unwrap();
    let employee = session.model("Employee").unwrap();

    let dept = session.create(department);
    session.set(dept, "name", "research").unwrap();
    let emp = session.create(employee);
    session.set(emp, "name", "ann").unwrap();
    session.set(dept, "employees", vec![emp]).unwrap();

    let managed = session.merge(dept).unwrap();

    assert_eq!(session.state(managed), EntityState::Managed);
    assert_eq!(log.inserts(), 2);

    let employees = session.get(managed, "employees").unwrap();
    let employees = employees.as_list().unwrap();
    assert_eq!(employees.len(), 1);

    let merged_emp = employees[0].as_entity().unwrap();
    assert_eq!(session.state(merged_emp), EntityState::Managed);
    assert_eq!(session.get(merged_emp, "dept").unwrap(), Value::Entity(managed));
}

#[test]
fn merge_removed_instance_is_rejected() {
    let (mut session, _log) = session(fixtures::documents());
    seed_document(&mut session);

    let document = session.model("Document").unwrap();
    let doc = session.find(document, 1i64).unwrap().unwrap();
    session.remove(doc).unwrap();

    assert!(session.merge(doc).unwrap_err().is_invalid_state());
}

#[test]
fn refresh_discards_changes() {
    let (mut session, log) = session(fixtures::documents());
    seed_document(&mut session);

    let document = session.model("Document").unwrap();
    let doc = session.find(document, 1i64).unwrap().unwrap();
    session.get(doc, "body").unwrap();

    session.set(doc, "name", "draft").unwrap();
    store(&mut session).overwrite("Document", ("id", Value::I64(1)), "name", Value::from("final"));

    session.refresh(doc).unwrap();

    assert!(session.dirty_mask(doc).is_empty());
    assert_eq!(session.pending_updates().len(), 0);
    assert!(!session.is_loaded(doc, "body").unwrap());
    assert_eq!(session.get(doc, "name").unwrap(), Value::from("final"));
    assert_eq!(log.selects(), 3);
}

#[test]
fn refresh_cascades_to_collection() {
    let (mut session, _log) = session(fixtures::company());

    let department = session.model("Department").unwrap();
    let employee = session.model("Employee").unwrap();

    let dept = session.create(department);
    let emp = session.create(employee);
    session.set(emp, "name", "ann").unwrap();
    session.set(dept, "employees", vec![emp]).unwrap();
    session.persist(dept).unwrap();

    store(&mut session).overwrite("Employee", ("id", Value::I64(1)), "name", Value::from("anne"));
    session.refresh(dept).unwrap();

    assert_eq!(session.get(emp, "name").unwrap(), Value::from("anne"));
}

#[test]
fn refresh_requires_managed_instance() {
    let (mut session, _log) = session(fixtures::documents());

    let document = session.model("Document").unwrap();
    let draft = session.create(document);

    assert!(session.refresh(draft).unwrap_err().is_invalid_state());
}

#[test]
fn detached_instance_is_not_tracked() {
    let (mut session, log) = session(fixtures::documents());
    seed_document(&mut session);

    let document = session.model("Document").unwrap();
    let doc = session.find(document, 1i64).unwrap().unwrap();
    session.detach(doc);

    session.set(doc, "name", "offline").unwrap();
    assert_eq!(session.pending_updates().len(), 0);

    // Unloaded groups stay unloaded.
    assert_eq!(session.get(doc, "body").unwrap(), Value::Null);

    let again = session.find(document, 1i64).unwrap().unwrap();
    assert_ne!(again, doc);
    assert_eq!(session.get(again, "name").unwrap(), Value::from("readme"));
    assert_eq!(log.selects(), 2);
}

#[test]
fn clear_detaches_everything() {
    let (mut session, _log) = session(fixtures::documents());
    seed_document(&mut session);

    let document = session.model("Document").unwrap();
    let doc = session.find(document, 1i64).unwrap().unwrap();
    session.set(doc, "name", "pending").unwrap();

    session.clear();

    assert_eq!(session.state(doc), EntityState::Detached);
    assert_eq!(session.pending_updates().len(), 0);
}
