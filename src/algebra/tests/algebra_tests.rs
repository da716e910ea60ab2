use crate::algebra::resolve::schema_of;
use crate::algebra::tests::utility::{
    assert_absent, employee, employee_schema, employee_store, records, with_employees,
    FailingStore, EMPLOYEE,
};
use crate::algebra::{insert, project, project_attributes, select};
use crate::common::utility::create_n_records;
use crate::common::Error;
use crate::config::config::{ATTRCAT_RELNAME, RELCAT_RELNAME};
use crate::config::KernelConfig;
use crate::storage::{CatalogCache, MemoryStore, Record, RelationDirectory, SchemaManager};
use crate::types::{AttributeSpec, CompareOp, DataType, Field};

const OLDER: &str = "Older";
const COPY: &str = "Copy";

fn names(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.text_at(0).unwrap().to_string())
        .collect()
}

fn catalog_size(store: &mut MemoryStore) -> (usize, usize) {
    (
        records(store, RELCAT_RELNAME).len(),
        records(store, ATTRCAT_RELNAME).len(),
    )
}

#[test]
fn test_employee_scenario() {
    let mut store = employee_store();

    assert_eq!(
        select(&mut store, EMPLOYEE, OLDER, "Age", CompareOp::Gt, "30"),
        Ok(2)
    );
    assert_eq!(store.rel_id(OLDER), Err(Error::RelationNotOpen(OLDER.to_string())));
    assert_eq!(
        records(&mut store, OLDER),
        vec![employee("Bo", 35.0, "Eng"), employee("Cy", 41.0, "Sales")]
    );

    let older = store.open_relation(OLDER).unwrap();
    assert_eq!(schema_of(&store, older).unwrap(), employee_schema().to_vec());

    assert_eq!(project_attributes(&mut store, OLDER, "Names", &["Name"]), Ok(2));
    let names_rel = store.open_relation("Names").unwrap();
    assert_eq!(
        schema_of(&store, names_rel).unwrap(),
        vec![AttributeSpec::new("Name", DataType::Text)]
    );
    assert_eq!(
        records(&mut store, "Names"),
        vec![
            Record::from(vec![Field::text("Bo").unwrap()]),
            Record::from(vec![Field::text("Cy").unwrap()]),
        ]
    );

    assert_eq!(project_attributes(&mut store, EMPLOYEE, "Depts", &["Dept"]), Ok(3));
    assert_eq!(
        records(&mut store, "Depts"),
        ["Eng", "Eng", "Sales"]
            .iter()
            .map(|dept| Record::from(vec![Field::text(dept).unwrap()]))
            .collect::<Vec<_>>()
    );
}

#[test]
fn test_select_operators() {
    let cases = [
        (CompareOp::Eq, vec!["Bo"]),
        (CompareOp::Ne, vec!["Ann", "Cy"]),
        (CompareOp::Lt, vec!["Ann"]),
        (CompareOp::Le, vec!["Ann", "Bo"]),
        (CompareOp::Gt, vec!["Cy"]),
        (CompareOp::Ge, vec!["Bo", "Cy"]),
    ];
    for (op, expected) in cases {
        let mut store = employee_store();
        assert_eq!(
            select(&mut store, EMPLOYEE, OLDER, "Age", op, " 35 "),
            Ok(expected.len())
        );
        assert_eq!(names(&records(&mut store, OLDER)), expected, "Age {op} 35");
    }

    let mut store = employee_store();
    select(&mut store, EMPLOYEE, OLDER, "Name", CompareOp::Ge, "Bo").unwrap();
    assert_eq!(names(&records(&mut store, OLDER)), vec!["Bo", "Cy"]);

    let mut store = employee_store();
    select(&mut store, EMPLOYEE, OLDER, "Dept", CompareOp::Eq, "Eng").unwrap();
    assert_eq!(names(&records(&mut store, OLDER)), vec!["Ann", "Bo"]);
}

#[test]
fn test_select_empty_result_keeps_target() {
    let mut store = employee_store();
    assert_eq!(
        select(&mut store, EMPLOYEE, OLDER, "Age", CompareOp::Gt, "99"),
        Ok(0)
    );
    assert!(records(&mut store, OLDER).is_empty());
}

#[test]
fn test_select_type_mismatch_creates_nothing() {
    let mut store = employee_store();
    let before = catalog_size(&mut store);

    assert!(matches!(
        select(&mut store, EMPLOYEE, OLDER, "Age", CompareOp::Gt, "thirty"),
        Err(Error::AttributeTypeMismatch(_))
    ));
    assert!(matches!(
        select(&mut store, EMPLOYEE, OLDER, "Age", CompareOp::Gt, "30 years"),
        Err(Error::AttributeTypeMismatch(_))
    ));
    assert_eq!(
        select(&mut store, EMPLOYEE, OLDER, "Salary", CompareOp::Gt, "30"),
        Err(Error::AttributeNotFound("Salary".to_string()))
    );

    assert_absent(&mut store, OLDER);
    assert_eq!(catalog_size(&mut store), before);
}

#[test]
fn test_operators_on_unopened_source() {
    let mut store = MemoryStore::new(&KernelConfig::default()).unwrap();
    store.create_relation(EMPLOYEE, &employee_schema()).unwrap();
    let before = catalog_size(&mut store);
    let not_open = Err(Error::RelationNotOpen(EMPLOYEE.to_string()));

    assert_eq!(
        select(&mut store, EMPLOYEE, OLDER, "Age", CompareOp::Gt, "30"),
        not_open
    );
    assert_eq!(project(&mut store, EMPLOYEE, COPY), not_open);
    assert_eq!(
        project_attributes(&mut store, EMPLOYEE, COPY, &["Name"]),
        not_open
    );
    assert_eq!(
        insert(&mut store, EMPLOYEE, 3, &["Di", "50", "Ops"]).map(|_| 0),
        not_open
    );

    assert_eq!(catalog_size(&mut store), before);
    assert_absent(&mut store, OLDER);
    assert_absent(&mut store, COPY);
}

/// An existing target makes creation fail. The failure is reported to the
/// caller and the existing relation is left alone.
#[test]
fn test_select_reports_target_creation_failure() {
    let mut store = employee_store();
    store
        .create_relation(OLDER, &[AttributeSpec::new("Tag", DataType::Text)])
        .unwrap();

    assert_eq!(
        select(&mut store, EMPLOYEE, OLDER, "Age", CompareOp::Gt, "30"),
        Err(Error::RelationExists(OLDER.to_string()))
    );
    assert!(records(&mut store, OLDER).is_empty());
    let older = store.open_relation(OLDER).unwrap();
    assert_eq!(store.relation_entry(older).unwrap().num_attrs, 1);
}

#[test]
fn test_project_reports_target_creation_failure() {
    let mut store = employee_store();
    assert_eq!(
        project(&mut store, EMPLOYEE, EMPLOYEE),
        Err(Error::RelationExists(EMPLOYEE.to_string()))
    );
    assert_eq!(records(&mut store, EMPLOYEE).len(), 3);
}

#[test]
fn test_insert_failure_rolls_back_target() {
    const N: usize = 12;
    for k in 1..=N {
        let mut base = MemoryStore::new(&KernelConfig::default()).unwrap();
        base.create_relation(EMPLOYEE, &employee_schema()).unwrap();
        let rel = base.open_relation(EMPLOYEE).unwrap();
        create_n_records(N, &mut base, rel, &employee_schema(), k as u64).unwrap();

        let mut store = FailingStore::new(base).fail_insert_at(COPY, k);
        assert_eq!(project(&mut store, EMPLOYEE, COPY), Err(Error::DiskFull), "k={k}");
        assert_absent(&mut store, COPY);
    }
}

#[test]
fn test_select_failure_rolls_back_target() {
    const N: usize = 12;
    for k in 1..=N {
        let mut base = MemoryStore::new(&KernelConfig::default()).unwrap();
        base.create_relation(EMPLOYEE, &employee_schema()).unwrap();
        let rel = base.open_relation(EMPLOYEE).unwrap();
        create_n_records(N, &mut base, rel, &employee_schema(), k as u64).unwrap();

        let before = catalog_size(&mut base);
        let mut store = FailingStore::new(base).fail_insert_at(OLDER, k);
        // Generated numbers never go below -10000, so every record qualifies.
        assert_eq!(
            select(&mut store, EMPLOYEE, OLDER, "Age", CompareOp::Ge, "-10000"),
            Err(Error::DiskFull),
            "k={k}"
        );
        assert_absent(&mut store, OLDER);
        assert_eq!(records(&mut store, RELCAT_RELNAME).len(), before.0, "k={k}");
    }
}

#[test]
fn test_project_attributes_failure_rolls_back_target() {
    let n = 3;
    for k in 1..=n {
        let mut store = FailingStore::new(employee_store()).fail_insert_at(OLDER, k);
        assert_eq!(
            project_attributes(&mut store, EMPLOYEE, OLDER, &["Dept", "Name"]),
            Err(Error::DiskFull),
            "k={k}"
        );
        assert_absent(&mut store, OLDER);
        assert_eq!(
            records(&mut store, ATTRCAT_RELNAME).len(),
            10 + employee_schema().len(),
            "k={k}"
        );
    }

    // The target can be built again once the fault is gone.
    let mut store = FailingStore::new(employee_store());
    assert_eq!(project(&mut store, EMPLOYEE, OLDER), Ok(n));
}

#[test]
fn test_close_failure_discards_target() {
    let mut store = FailingStore::new(employee_store()).fail_close(COPY);
    assert!(matches!(
        project(&mut store, EMPLOYEE, COPY),
        Err(Error::InvalidData(_))
    ));
    assert_absent(&mut store, COPY);

    let mut store = FailingStore::new(employee_store()).fail_close(OLDER);
    assert!(matches!(
        select(&mut store, EMPLOYEE, OLDER, "Age", CompareOp::Gt, "30"),
        Err(Error::InvalidData(_))
    ));
    assert_absent(&mut store, OLDER);
}

#[test]
fn test_failed_cleanup_keeps_original_error() {
    let mut store = FailingStore::new(employee_store())
        .fail_insert_at(COPY, 1)
        .fail_delete();
    assert_eq!(project(&mut store, EMPLOYEE, COPY), Err(Error::DiskFull));
    // The target is still closed even though it could not be deleted.
    assert_eq!(
        store.rel_id(COPY),
        Err(Error::RelationNotOpen(COPY.to_string()))
    );
}

#[test]
fn test_target_open_failure_rolls_back() {
    let config = KernelConfig {
        max_open: 3,
        ..KernelConfig::default()
    };
    let mut store = MemoryStore::new(&config).unwrap();
    with_employees(&mut store);

    assert_eq!(project(&mut store, EMPLOYEE, COPY), Err(Error::CacheFull));
    assert_absent(&mut store, COPY);
}

#[test]
fn test_project_copies_in_order() {
    let mut store = MemoryStore::new(&KernelConfig::default()).unwrap();
    store.create_relation(EMPLOYEE, &employee_schema()).unwrap();
    let rel = store.open_relation(EMPLOYEE).unwrap();
    create_n_records(300, &mut store, rel, &employee_schema(), 3).unwrap();

    assert_eq!(project(&mut store, EMPLOYEE, COPY), Ok(300));
    let copy = records(&mut store, COPY);
    assert_eq!(copy, records(&mut store, EMPLOYEE));
}

#[test]
fn test_project_attributes_follows_requested_order() {
    let mut store = employee_store();
    assert_eq!(
        project_attributes(&mut store, EMPLOYEE, COPY, &["Age", "Name"]),
        Ok(3)
    );

    let copy = store.open_relation(COPY).unwrap();
    assert_eq!(
        schema_of(&store, copy).unwrap(),
        vec![
            AttributeSpec::new("Age", DataType::Number),
            AttributeSpec::new("Name", DataType::Text),
        ]
    );
    assert_eq!(
        records(&mut store, COPY),
        vec![
            Record::from(vec![Field::number(28.0), Field::text("Ann").unwrap()]),
            Record::from(vec![Field::number(35.0), Field::text("Bo").unwrap()]),
            Record::from(vec![Field::number(41.0), Field::text("Cy").unwrap()]),
        ]
    );
}

#[test]
fn test_project_attributes_validation() {
    let mut store = employee_store();

    assert_eq!(
        project_attributes(&mut store, EMPLOYEE, COPY, &["Name", "Salary"]),
        Err(Error::AttributeNotFound("Salary".to_string()))
    );
    assert_absent(&mut store, COPY);

    let no_names: [&str; 0] = [];
    assert!(matches!(
        project_attributes(&mut store, EMPLOYEE, COPY, &no_names),
        Err(Error::InvalidInput(_))
    ));
    assert_absent(&mut store, COPY);

    assert_eq!(
        project_attributes(&mut store, EMPLOYEE, COPY, &["Name", "Name"]),
        Err(Error::DuplicateAttribute("Name".to_string()))
    );
    assert_absent(&mut store, COPY);
}

#[test]
fn test_insert_is_visible_to_scan() {
    let mut store = employee_store();
    insert(&mut store, EMPLOYEE, 3, &["Di", " 50 ", "Ops"]).unwrap();
    assert_eq!(
        records(&mut store, EMPLOYEE).last(),
        Some(&employee("Di", 50.0, "Ops"))
    );
}

#[test]
fn test_insert_into_catalog_not_permitted() {
    let mut store = employee_store();
    let before = catalog_size(&mut store);
    for rel_name in [RELCAT_RELNAME, ATTRCAT_RELNAME] {
        for fields in [vec![], vec!["x"], vec!["x", "1", "2", "3", "4", "5"]] {
            assert!(matches!(
                insert(&mut store, rel_name, fields.len(), &fields),
                Err(Error::OperationNotPermitted(_))
            ));
        }
    }
    assert_eq!(catalog_size(&mut store), before);
}

#[test]
fn test_insert_validation_precedes_storage() {
    let mut store = employee_store();

    assert_eq!(
        insert(&mut store, EMPLOYEE, 4, &["Di", "50", "Ops", "x"]),
        Err(Error::AttributeCountMismatch {
            expected: 3,
            actual: 4
        })
    );
    assert_eq!(
        insert(&mut store, EMPLOYEE, 3, &["Di"]),
        Err(Error::AttributeCountMismatch {
            expected: 3,
            actual: 1
        })
    );
    assert!(matches!(
        insert(&mut store, EMPLOYEE, 3, &["Di", "fifty", "Ops"]),
        Err(Error::AttributeTypeMismatch(_))
    ));
    assert!(matches!(
        insert(&mut store, EMPLOYEE, 3, &["Dimitrios Papadopoulos", "50", "Ops"]),
        Err(Error::AttributeTypeMismatch(_))
    ));
    assert_eq!(
        insert(&mut store, "Nobody", 3, &["Di", "50", "Ops"]),
        Err(Error::RelationNotOpen("Nobody".to_string()))
    );

    let rel = store.rel_id(EMPLOYEE).unwrap();
    assert_eq!(store.relation_entry(rel).unwrap().num_records, 3);
}
