use amber::{EntityRef, Value};
use pretty_assertions::assert_eq;
use tests::{fixtures, session, store, TestSession};

/// Persists a purchase of two new products tagged `b`, `a`.
fn new_purchase(session: &mut TestSession) -> (EntityRef, EntityRef, EntityRef) {
    let product = session.model("Product").unwrap();
    let purchase = session.model("Purchase").unwrap();

    let apple = session.create(product);
    session.set(apple, "id", 1i64).unwrap();
    session.set(apple, "name", "apple").unwrap();

    let pear = session.create(product);
    session.set(pear, "id", 2i64).unwrap();
    session.set(pear, "name", "pear").unwrap();

    let order = session.create(purchase);
    session.set(order, "products", vec![apple, pear]).unwrap();
    session
        .set(order, "tags", Value::List(vec![Value::from("b"), Value::from("a")]))
        .unwrap();
    session.persist(order).unwrap();

    (order, apple, pear)
}

#[test]
fn persist_writes_association_rows() {
    let (mut session, log) = session(fixtures::shop());
    new_purchase(&mut session);

    assert_eq!(
        log.sql(),
        [
            "select max(id) from Purchase",
            "insert into Purchase (id, customer_id) values (?, ?)",
            "insert into Product (id, name) values (?, ?)",
            "insert into Product (id, name) values (?, ?)",
            "insert into Purchase_Product (purchase_id, products_id) values (?, ?)",
            "insert into Purchase_Product (purchase_id, products_id) values (?, ?)",
            "insert into Purchase_tags (purchase_id, tags) values (?, ?)",
            "insert into Purchase_tags (purchase_id, tags) values (?, ?)",
        ]
    );

    let rows = store(&mut session).rows("Purchase_Product");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["products_id"], Value::I64(2));
}

#[test]
fn one_to_many_loads_in_database_order() {
    let (mut session, log) = session(fixtures::company());
    store(&mut session).seed("Department", [("id", Value::I64(1)), ("name", Value::from("ops"))]);
    for (id, name) in [(1, "cyd"), (2, "ann"), (3, "bob")] {
        store(&mut session).seed(
            "Employee",
            [
                ("id", Value::I64(id)),
                ("name", Value::from(name)),
                ("version", Value::I32(0)),
                ("dept_id", Value::I64(1)),
            ],
        );
    }

    let department = session.model("Department").unwrap();
    let dept = session.find(department, 1i64).unwrap().unwrap();

    assert!(!session.is_loaded(dept, "employees").unwrap());
    let employees = session.get(dept, "employees").unwrap();

    assert_eq!(
        log.sql()[1],
        "select o.id from Employee o where o.dept_id=? order by o.name"
    );

    let keys: Vec<_> = employees
        .as_list()
        .unwrap()
        .iter()
        .map(|emp| session.key(emp.as_entity().unwrap()).cloned())
        .collect();
    assert_eq!(
        keys,
        [Some(Value::I64(2)), Some(Value::I64(3)), Some(Value::I64(1))]
    );

    // Targets are hollow until read.
    assert_eq!(log.selects(), 2);
}

#[test]
fn many_to_many_is_sorted_after_loading() {
    let (mut session, mut log) = session(fixtures::shop());
    let (order, ..) = new_purchase(&mut session);
    let key = session.key(order).cloned().unwrap();
    session.clear();
    log.clear();

    let purchase = session.model("Purchase").unwrap();
    let order = session.find(purchase, key).unwrap().unwrap();
    let products = session.get(order, "products").unwrap();

    let names: Vec<_> = products
        .as_list()
        .unwrap()
        .iter()
        .map(|product| session.get(product.as_entity().unwrap(), "name").unwrap())
        .collect();

    // Ordered by name, descending.
    assert_eq!(names, [Value::from("pear"), Value::from("apple")]);
    assert_eq!(
        log.sql()[..2],
        [
            "select o.id, o.customer_id from Purchase o where o.id=?",
            "select o.products_id from Purchase_Product o where o.purchase_id=?",
        ]
    );
    assert_eq!(log.selects(), 4);
}

#[test]
fn element_collection_loads_ordered_values() {
    let (mut session, mut log) = session(fixtures::shop());
    let (order, ..) = new_purchase(&mut session);
    let key = session.key(order).cloned().unwrap();
    session.clear();
    log.clear();

    let purchase = session.model("Purchase").unwrap();
    let order = session.find(purchase, key).unwrap().unwrap();
    let tags = session.get(order, "tags").unwrap();

    assert_eq!(
        tags,
        Value::List(vec![Value::from("a"), Value::from("b")])
    );
    assert_eq!(
        log.sql()[1],
        "select o.tags from Purchase_tags o where o.purchase_id=? order by o.tags"
    );
}

#[test]
fn dirty_collection_rows_are_rewritten() {
    let (mut session, mut log) = session(fixtures::shop());
    let (order, _apple, pear) = new_purchase(&mut session);
    log.clear();

    session
        .set(order, "tags", Value::List(vec![Value::from("c")]))
        .unwrap();
    session.set(order, "products", vec![pear]).unwrap();
    assert!(session.is_dirty(order, "tags").unwrap());

    session.flush().unwrap();

    assert_eq!(
        log.sql(),
        [
            "delete from Purchase_Product where purchase_id=?",
            "insert into Purchase_Product (purchase_id, products_id) values (?, ?)",
            "delete from Purchase_tags where purchase_id=?",
            "insert into Purchase_tags (purchase_id, tags) values (?, ?)",
        ]
    );

    let tags = store(&mut session).rows("Purchase_tags");
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0]["tags"], Value::from("c"));
}

#[test]
fn unchanged_collection_is_not_dirty() {
    let (mut session, _log) = session(fixtures::shop());
    let (order, apple, pear) = new_purchase(&mut session);

    session.set(order, "products", vec![apple, pear]).unwrap();
    session
        .set(order, "tags", Value::List(vec![Value::from("b"), Value::from("a")]))
        .unwrap();

    assert!(session.dirty_mask(order).is_empty());
    assert_eq!(session.pending_updates().len(), 0);
}

#[test]
fn one_to_many_loads_as_map() {
    let (mut session, log) = session(fixtures::floors());
    store(&mut session).seed("Floor", [("id", Value::I64(1))]);
    for (id, code) in [(1, "a2"), (2, "b7")] {
        store(&mut session).seed(
            "Desk",
            [
                ("id", Value::I64(id)),
                ("code", Value::from(code)),
                ("floor_id", Value::I64(1)),
            ],
        );
    }

    let floor = session.model("Floor").unwrap();
    let first = session.find(floor, 1i64).unwrap().unwrap();
    let desks = session.get(first, "desks").unwrap();

    assert_eq!(
        log.sql(),
        [
            "select o.id from Floor o where o.id=?",
            "select o.id, o.code from Desk o where o.floor_id=?",
        ]
    );
    assert_eq!(desks.as_map().unwrap().len(), 2);

    let desk = desks.get_entry(&Value::from("b7")).unwrap();
    assert_eq!(session.key(desk.as_entity().unwrap()), Some(&Value::I64(2)));
    assert!(desks.get_entry(&Value::from("c1")).is_none());
}

#[test]
fn persist_cascades_to_map_values() {
    let (mut session, log) = session(fixtures::floors());

    let floor = session.model("Floor").unwrap();
    let desk = session.model("Desk").unwrap();

    let ground = session.create(floor);
    session.set(ground, "id", 1i64).unwrap();

    let mut entries = vec![];
    for (id, code) in [(1i64, "a2"), (2, "b7")] {
        let created = session.create(desk);
        session.set(created, "id", id).unwrap();
        session.set(created, "code", code).unwrap();
        entries.push((Value::from(code), created));
    }
    session.set(ground, "desks", entries).unwrap();
    session.persist(ground).unwrap();

    assert_eq!(
        log.sql(),
        [
            "insert into Floor (id) values (?)",
            "insert into Desk (id, code, floor_id) values (?, ?, ?)",
            "insert into Desk (id, code, floor_id) values (?, ?, ?)",
        ]
    );

    let rows = store(&mut session).rows("Desk");
    assert!(rows.iter().all(|row| row["floor_id"] == Value::I64(1)));
}
