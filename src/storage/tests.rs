use crate::common::utility::create_n_records;
use crate::common::Error;
use crate::config::config::{ATTRCAT_RELNAME, RELCAT_RELNAME};
use crate::config::KernelConfig;
use crate::storage::catalog::{relcat_schema, AttrCatEntry, RelCatEntry};
use crate::storage::{
    BlockAccess, CatalogCache, MemoryStore, Record, RelId, RelationDirectory, SchemaManager,
};
use crate::types::{AttributeSpec, CompareOp, DataType, Field, Schema};

fn small_config() -> KernelConfig {
    KernelConfig {
        block_size: 256,
        disk_blocks: 16,
        max_open: 4,
        ..KernelConfig::default()
    }
}

fn employee_schema() -> Schema {
    Schema::builder()
        .attribute("Name", DataType::Text)
        .attribute("Age", DataType::Number)
        .build()
}

fn employee(name: &str, age: f64) -> Record {
    Record::from(vec![Field::text(name).unwrap(), Field::number(age)])
}

fn create_employee(store: &mut MemoryStore) -> RelId {
    store.create_relation("Employee", &employee_schema()).unwrap();
    store.open_relation("Employee").unwrap()
}

fn scan_all(store: &mut MemoryStore, rel: RelId) -> Vec<Record> {
    let mut cursor = store.begin_scan(rel).unwrap();
    let mut records = Vec::new();
    while let Some(record) = store.scan_next(&mut cursor).unwrap() {
        records.push(record);
    }
    records
}

#[test]
fn test_catalogs_describe_themselves() {
    let mut store = MemoryStore::new(&KernelConfig::default()).unwrap();
    let relcat = store.rel_id(RELCAT_RELNAME).unwrap();
    let attrcat = store.rel_id(ATTRCAT_RELNAME).unwrap();
    assert_eq!(relcat, RelId::new(0));
    assert_eq!(attrcat, RelId::new(1));

    let entries: Vec<RelCatEntry> = scan_all(&mut store, relcat)
        .iter()
        .map(|r| RelCatEntry::from_record(r).unwrap())
        .collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].rel_name, RELCAT_RELNAME);
    assert_eq!(entries[0].num_records, 2);
    assert_eq!(entries[1].rel_name, ATTRCAT_RELNAME);
    assert_eq!(entries[1].num_records, 10);

    let attrs: Vec<AttrCatEntry> = scan_all(&mut store, attrcat)
        .iter()
        .map(|r| AttrCatEntry::from_record(r).unwrap())
        .collect();
    assert_eq!(attrs.len(), 10);
    assert_eq!(
        store.attribute_by_ordinal(relcat, 5).unwrap().spec(),
        relcat_schema()[5]
    );
}

#[test]
fn test_create_open_insert_scan() {
    let mut store = MemoryStore::new(&KernelConfig::default()).unwrap();
    let rel = create_employee(&mut store);

    store.insert(rel, employee("Al", 25.0)).unwrap();
    store.insert(rel, employee("Bo", 35.0)).unwrap();

    assert_eq!(
        scan_all(&mut store, rel),
        vec![employee("Al", 25.0), employee("Bo", 35.0)]
    );
    assert_eq!(store.relation_entry(rel).unwrap().num_records, 2);
    assert_eq!(
        store.attribute_by_name(rel, "Age").unwrap().attr_type,
        DataType::Number
    );
    assert_eq!(
        store.attribute_by_name(rel, "Salary"),
        Err(Error::AttributeNotFound("Salary".to_string()))
    );
}

#[test]
fn test_counts_written_through_to_catalog() {
    let mut store = MemoryStore::new(&KernelConfig::default()).unwrap();
    let rel = create_employee(&mut store);
    store.insert(rel, employee("Al", 25.0)).unwrap();
    store.close_relation(rel).unwrap();

    let relcat = store.rel_id(RELCAT_RELNAME).unwrap();
    let entry = scan_all(&mut store, relcat)
        .iter()
        .map(|r| RelCatEntry::from_record(r).unwrap())
        .find(|e| e.rel_name == "Employee")
        .unwrap();
    assert_eq!(entry.num_records, 1);
    assert!(entry.first_block.is_some());

    let reopened = store.open_relation("Employee").unwrap();
    assert_eq!(scan_all(&mut store, reopened), vec![employee("Al", 25.0)]);
}

#[test]
fn test_insert_checks_record_shape() {
    let mut store = MemoryStore::new(&KernelConfig::default()).unwrap();
    let rel = create_employee(&mut store);

    assert_eq!(
        store.insert(rel, Record::from(vec![Field::number(1.0)])),
        Err(Error::AttributeCountMismatch {
            expected: 2,
            actual: 1
        })
    );
    assert!(matches!(
        store.insert(rel, Record::from(vec![Field::number(1.0), Field::number(2.0)])),
        Err(Error::AttributeTypeMismatch(_))
    ));
    assert!(matches!(
        store.insert(RelId::new(0), employee("x", 1.0)),
        Err(Error::OperationNotPermitted(_))
    ));
}

#[test]
fn test_search_resumes_and_stays_exhausted() {
    let mut store = MemoryStore::new(&KernelConfig::default()).unwrap();
    let rel = create_employee(&mut store);
    for (name, age) in [("Al", 25.0), ("Bo", 35.0), ("Cy", 41.0), ("Di", 30.0)] {
        store.insert(rel, employee(name, age)).unwrap();
    }

    let mut cursor = store.begin_search(rel, "Age").unwrap();
    let threshold = Field::number(30.0);
    let mut found = Vec::new();
    while let Some(r) = store.search(&mut cursor, &threshold, CompareOp::Gt).unwrap() {
        found.push(r.text_at(0).unwrap().to_string());
    }
    assert_eq!(found, vec!["Bo", "Cy"]);
    assert!(cursor.is_exhausted());
    assert_eq!(store.search(&mut cursor, &threshold, CompareOp::Gt).unwrap(), None);

    cursor.reset();
    let first = store.search(&mut cursor, &threshold, CompareOp::Le).unwrap();
    assert_eq!(first, Some(employee("Al", 25.0)));

    assert!(matches!(
        store.search(&mut cursor, &Field::text("30").unwrap(), CompareOp::Eq),
        Err(Error::AttributeTypeMismatch(_))
    ));
}

#[test]
fn test_stale_cursor_rejected() {
    let mut store = MemoryStore::new(&KernelConfig::default()).unwrap();
    let rel = create_employee(&mut store);
    store.insert(rel, employee("Al", 25.0)).unwrap();

    let mut cursor = store.begin_scan(rel).unwrap();
    store.close_relation(rel).unwrap();
    assert!(matches!(
        store.scan_next(&mut cursor),
        Err(Error::RelationNotOpen(_))
    ));

    // Reopening reuses the slot but not the epoch.
    let reopened = store.open_relation("Employee").unwrap();
    assert_eq!(reopened, rel);
    assert!(matches!(
        store.scan_next(&mut cursor),
        Err(Error::InvalidInput(_))
    ));
}

#[test]
fn test_open_table_limits() {
    let mut store = MemoryStore::new(&small_config()).unwrap();
    for name in ["a", "b", "c"] {
        store
            .create_relation(name, &[AttributeSpec::new("x", DataType::Number)])
            .unwrap();
    }
    let a = store.open_relation("a").unwrap();
    assert_eq!(store.open_relation("a").unwrap(), a);
    store.open_relation("b").unwrap();
    assert_eq!(store.open_relation("c"), Err(Error::CacheFull));
    assert_eq!(
        store.open_relation("zz"),
        Err(Error::RelationNotFound("zz".to_string()))
    );
    assert!(matches!(
        store.close_relation(RelId::new(1)),
        Err(Error::OperationNotPermitted(_))
    ));
    store.close_relation(RelId::new(3)).unwrap();
    assert!(matches!(
        store.close_relation(RelId::new(3)),
        Err(Error::RelationNotOpen(_))
    ));
}

#[test]
fn test_create_relation_validation() {
    let mut store = MemoryStore::new(&KernelConfig::default()).unwrap();
    let num = |name: &str| AttributeSpec::new(name, DataType::Number);

    assert!(matches!(
        store.create_relation("", &[num("a")]),
        Err(Error::InvalidInput(_))
    ));
    assert!(matches!(
        store.create_relation("SixteenBytesLong", &[num("a")]),
        Err(Error::InvalidInput(_))
    ));
    assert!(matches!(
        store.create_relation("t", &[]),
        Err(Error::InvalidInput(_))
    ));
    assert_eq!(
        store.create_relation("t", &[num("a"), num("a")]),
        Err(Error::DuplicateAttribute("a".to_string()))
    );
    store.create_relation("t", &[num("a")]).unwrap();
    assert_eq!(
        store.create_relation("t", &[num("b")]),
        Err(Error::RelationExists("t".to_string()))
    );
    assert_eq!(
        store.create_relation(RELCAT_RELNAME, &[num("b")]),
        Err(Error::RelationExists(RELCAT_RELNAME.to_string()))
    );
}

#[test]
fn test_delete_relation() {
    let mut store = MemoryStore::new(&small_config()).unwrap();
    let rel = create_employee(&mut store);
    let free = store.free_blocks();
    create_n_records(20, &mut store, rel, &employee_schema(), 7).unwrap();
    assert!(store.free_blocks() < free);

    assert_eq!(
        store.delete_relation("Employee"),
        Err(Error::RelationOpen("Employee".to_string()))
    );
    store.close_relation(rel).unwrap();
    store.delete_relation("Employee").unwrap();

    assert_eq!(store.free_blocks(), free);
    assert_eq!(
        store.open_relation("Employee"),
        Err(Error::RelationNotFound("Employee".to_string()))
    );
    assert_eq!(
        store.delete_relation("Employee"),
        Err(Error::RelationNotFound("Employee".to_string()))
    );
    assert!(matches!(
        store.delete_relation(ATTRCAT_RELNAME),
        Err(Error::OperationNotPermitted(_))
    ));
}

#[test]
fn test_disk_full_surfaces_from_insert() {
    let mut store = MemoryStore::new(&small_config()).unwrap();
    let rel = create_employee(&mut store);
    let result = create_n_records(1000, &mut store, rel, &employee_schema(), 11);
    assert_eq!(result.err(), Some(Error::DiskFull));
    assert_eq!(store.free_blocks(), 0);
}

#[test]
fn test_bulk_scan_preserves_order() {
    let mut store = MemoryStore::new(&KernelConfig::default()).unwrap();
    let rel = create_employee(&mut store);
    let inserted = create_n_records(500, &mut store, rel, &employee_schema(), 42).unwrap();

    let expected: Vec<Record> = inserted.into_iter().map(|(_, r)| r).collect();
    assert_eq!(scan_all(&mut store, rel), expected);
}
