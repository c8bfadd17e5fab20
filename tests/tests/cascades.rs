use amber::{EntityRef, EntityState, Value};
use pretty_assertions::assert_eq;
use tests::{fixtures, session, store, TestSession};

/// A transient department holding two transient employees.
fn new_department(session: &mut TestSession) -> (EntityRef, EntityRef, EntityRef) {
    let department = session.model("Department").unwrap();
    let employee = session.model("Employee").unwrap();

    let dept = session.create(department);
    session.set(dept, "name", "research").unwrap();

    let ann = session.create(employee);
    session.set(ann, "name", "ann").unwrap();

    let bob = session.create(employee);
    session.set(bob, "name", "bob").unwrap();

    session.set(dept, "employees", vec![ann, bob]).unwrap();
    (dept, ann, bob)
}

#[test]
fn persist_inserts_parent_before_collection() {
    let (mut session, log) = session(fixtures::company());
    let (dept, ann, bob) = new_department(&mut session);

    session.persist(dept).unwrap();

    assert_eq!(
        log.sql(),
        [
            "insert into Department (id, name) values (?, ?)",
            "insert into Employee (name, version, dept_id) values (?, ?, ?)",
            "insert into Employee (name, version, dept_id) values (?, ?, ?)",
        ]
    );

    for emp in [ann, bob] {
        assert_eq!(session.state(emp), EntityState::Managed);
        assert_eq!(session.get(emp, "dept").unwrap(), Value::Entity(dept));
    }

    let rows = store(&mut session).rows("Employee");
    assert!(rows.iter().all(|row| row["dept_id"] == Value::I64(1)));
    assert_eq!(log.selects(), 0);
}

#[test]
fn persist_inserts_to_one_target_first() {
    let (mut session, log) = session(fixtures::shop());

    let customer = session.model("Customer").unwrap();
    let purchase = session.model("Purchase").unwrap();

    let buyer = session.create(customer);
    session.set(buyer, "id", 5i64).unwrap();
    session.set(buyer, "name", "carol").unwrap();

    let order = session.create(purchase);
    session.set(order, "customer", buyer).unwrap();
    session.persist(order).unwrap();

    assert_eq!(
        log.sql(),
        [
            "insert into Customer (id, name) values (?, ?)",
            "select max(id) from Purchase",
            "insert into Purchase (id, customer_id) values (?, ?)",
        ]
    );
    assert_eq!(
        store(&mut session).rows("Purchase")[0]["customer_id"],
        Value::I64(5)
    );
}

#[test]
fn reference_to_transient_target_binds_null() {
    let (mut session, mut log) = session(fixtures::company());

    let department = session.model("Department").unwrap();
    let employee = session.model("Employee").unwrap();

    let dept = session.create(department);
    let emp = session.create(employee);
    session.set(emp, "dept", dept).unwrap();

    // `Employee.dept` does not cascade persist.
    session.persist(emp).unwrap();

    let op = log.pop().expect("expected an INSERT");
    assert_eq!(op.params[2], Value::Null);
    assert_eq!(session.state(dept), EntityState::Transient);
}

#[test]
fn remove_deletes_collection_before_parent() {
    let (mut session, mut log) = session(fixtures::company());
    let (dept, ann, bob) = new_department(&mut session);
    session.persist(dept).unwrap();
    log.clear();

    session.remove(dept).unwrap();

    assert_eq!(
        log.sql(),
        [
            "delete from Employee where id=? and version=?",
            "delete from Employee where id=? and version=?",
            "delete from Department where id=?",
        ]
    );

    for entity in [dept, ann, bob] {
        assert_eq!(session.state(entity), EntityState::Removed);
    }
    assert!(store(&mut session).rows("Employee").is_empty());
    assert!(store(&mut session).rows("Department").is_empty());
}

#[test]
fn remove_loads_collection_and_versions() {
    let (mut session, log) = session(fixtures::company());
    store(&mut session).seed("Department", [("id", Value::I64(1)), ("name", Value::from("ops"))]);
    for (id, name) in [(1, "bob"), (2, "ann")] {
        store(&mut session).seed(
            "Employee",
            [
                ("id", Value::I64(id)),
                ("name", Value::from(name)),
                ("version", Value::I32(2)),
                ("dept_id", Value::I64(1)),
            ],
        );
    }

    let department = session.model("Department").unwrap();
    let dept = session.find(department, 1i64).unwrap().unwrap();
    session.remove(dept).unwrap();

    assert_eq!(
        log.sql(),
        [
            "select o.id, o.name from Department o where o.id=?",
            "select o.id from Employee o where o.dept_id=? order by o.name",
            "select o.id, o.name, o.version, o.dept_id from Employee o where o.id=?",
            "delete from Employee where id=? and version=?",
            "select o.id, o.name, o.version, o.dept_id from Employee o where o.id=?",
            "delete from Employee where id=? and version=?",
            "delete from Department where id=?",
        ]
    );
    assert!(store(&mut session).rows("Employee").is_empty());
}

#[test]
fn remove_orders_pre_and_post_cascades() {
    let (mut session, mut log) = session(fixtures::shop());

    let customer = session.model("Customer").unwrap();
    let product = session.model("Product").unwrap();
    let purchase = session.model("Purchase").unwrap();

    let buyer = session.create(customer);
    session.set(buyer, "id", 1i64).unwrap();

    let apple = session.create(product);
    session.set(apple, "id", 1i64).unwrap();

    let order = session.create(purchase);
    session.set(order, "customer", buyer).unwrap();
    session.set(order, "products", vec![apple]).unwrap();
    session.persist(order).unwrap();
    log.clear();

    session.remove(order).unwrap();

    // Collections cascade remove before the owner's rows go, to-one
    // targets after.
    assert_eq!(
        log.sql(),
        [
            "delete from Product where id=?",
            "delete from Purchase_Product where purchase_id=?",
            "delete from Purchase_tags where purchase_id=?",
            "delete from Purchase where id=?",
            "delete from Customer where id=?",
        ]
    );
}

#[test]
fn remove_ignores_transient_and_rejects_detached() {
    let (mut session, log) = session(fixtures::documents());

    let document = session.model("Document").unwrap();
    let draft = session.create(document);
    session.remove(draft).unwrap();
    assert_eq!(session.state(draft), EntityState::Transient);

    session.set(draft, "id", 1i64).unwrap();
    session.persist(draft).unwrap();
    session.detach(draft);

    assert!(session.remove(draft).unwrap_err().is_invalid_state());
    assert_eq!(log.deletes(), 0);
}

#[test]
fn removed_instance_is_dequeued() {
    let (mut session, log) = session(fixtures::documents());

    let document = session.model("Document").unwrap();
    let doc = session.create(document);
    session.set(doc, "id", 1i64).unwrap();
    session.persist(doc).unwrap();

    session.set(doc, "name", "gone").unwrap();
    assert_eq!(session.pending_updates().len(), 1);

    session.remove(doc).unwrap();
    assert_eq!(session.pending_updates().len(), 0);

    session.flush().unwrap();
    assert_eq!(log.updates(), 0);

    let found = session.find(document, 1i64).unwrap();
    assert!(found.is_none());
}

#[test]
fn dependent_one_to_one_persists_after_and_removes_before_owner() {
    let (mut session, mut log) = session(fixtures::directors());

    let dept = session.model("Dept").unwrap();
    let boss = session.model("Boss").unwrap();

    let ops = session.create(dept);
    session.set(ops, "id", 1i64).unwrap();
    session.set(ops, "name", "ops").unwrap();

    let dana = session.create(boss);
    session.set(dana, "id", 7i64).unwrap();
    session.set(dana, "name", "dana").unwrap();
    session.set(ops, "boss", dana).unwrap();

    session.persist(ops).unwrap();

    assert_eq!(
        log.sql(),
        [
            "insert into Dept (id, name) values (?, ?)",
            "insert into Boss (id, name, dept_id) values (?, ?, ?)",
        ]
    );
    assert_eq!(session.get(dana, "dept").unwrap(), Value::Entity(ops));
    assert_eq!(
        store(&mut session).rows("Boss")[0]["dept_id"],
        Value::I64(1)
    );
    log.clear();

    session.remove(ops).unwrap();

    assert_eq!(
        log.sql(),
        ["delete from Boss where id=?", "delete from Dept where id=?"]
    );
    assert_eq!(session.state(dana), EntityState::Removed);
    assert_eq!(session.state(ops), EntityState::Removed);
    assert!(store(&mut session).rows("Boss").is_empty());
}
