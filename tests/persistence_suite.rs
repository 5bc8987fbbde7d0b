mod common;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use common::{date, setup_test_env};
use paycheck_planner::{
    core::services::{DebtService, IncomeService, MonthlyPlanningService},
    domain::{Debt, IncomeSource, PayFrequency, PaycheckId},
    storage::{AllocationStore, DebtStore},
    AllocationRequest, FixedClock, JsonStore, PaycheckAllocator, PlannerError,
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.tmp", existing),
        None => String::from("tmp"),
    };
    tmp.set_extension(ext);
    tmp
}

#[test]
fn allocations_survive_reopening_the_store() {
    let env = setup_test_env();
    let account = env.create_account("Household");
    let owner = Uuid::new_v4();
    let salary = IncomeService::add(
        env.store.as_ref(),
        IncomeSource::new(
            account,
            owner,
            "Salary",
            Decimal::from(2400),
            PayFrequency::Monthly,
            date(2024, 1, 15),
        ),
    )
    .unwrap();
    let rent = DebtService::add(
        env.store.as_ref(),
        Debt::new(account, "Rent", Decimal::new(125050, 2), date(2024, 1, 1)),
    )
    .unwrap();
    MonthlyPlanningService::populate_month(env.store.as_ref(), account, 2024, 3).unwrap();

    let allocator =
        PaycheckAllocator::new(env.planner_store(), Arc::new(FixedClock::on(date(2024, 3, 2))));
    let paycheck = PaycheckId::new(salary, date(2024, 3, 15));
    allocator
        .update_debt_allocation(&AllocationRequest::allocate(account, rent, paycheck.clone()))
        .unwrap();
    let before = allocator.allocations(account, 2024, 3).unwrap();

    let reopened = Arc::new(JsonStore::open(env.data_file()).unwrap());
    let reloaded = PaycheckAllocator::new(reopened, Arc::new(FixedClock::on(date(2024, 3, 2))));
    let after = reloaded.allocations(account, 2024, 3).unwrap();

    assert_eq!(before, after);
    assert_eq!(after[0].paycheck_id, paycheck);
    assert_eq!(after[0].remaining_amount, Decimal::new(114950, 2));
}

#[test]
fn failed_save_preserves_file_and_memory() {
    let env = setup_test_env();
    let account = env.create_account("Household");
    let path = env.data_file();
    let original = fs::read_to_string(&path).expect("read original file");

    // A directory squatting on the temp file name makes the staged write fail.
    fs::create_dir_all(tmp_path_for(&path)).unwrap();

    let err = env
        .store
        .save_debt(Debt::new(account, "Gym", Decimal::from(40), date(2024, 1, 5)))
        .expect_err("save must fail");
    assert!(matches!(err, PlannerError::PersistenceFailure(_)));

    assert_eq!(fs::read_to_string(&path).unwrap(), original);
    assert!(env.store.list_debts(account).unwrap().is_empty());
}

#[test]
fn newer_schema_versions_are_rejected() {
    let env = setup_test_env();
    let path = env.base.join("future.json");
    fs::write(&path, r#"{ "schema_version": 99 }"#).unwrap();

    let err = JsonStore::open(&path).expect_err("future schema");
    assert!(matches!(err, PlannerError::PersistenceFailure(_)));
}

#[test]
fn missing_fields_default_when_loading() {
    let env = setup_test_env();
    let path = env.base.join("sparse.json");
    fs::write(&path, "{}").unwrap();

    let store = JsonStore::open(&path).unwrap();
    assert!(store.list_debts(Uuid::new_v4()).unwrap().is_empty());
    assert!(store.find_allocation_by_id(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn deleting_a_debt_cascades_on_disk() {
    let env = setup_test_env();
    let account = env.create_account("Household");
    let debt = DebtService::add(
        env.store.as_ref(),
        Debt::new(account, "Loan", Decimal::from(150), date(2024, 2, 10)),
    )
    .unwrap();
    MonthlyPlanningService::populate_month(env.store.as_ref(), account, 2024, 2).unwrap();

    DebtService::remove(env.store.as_ref(), account, debt).unwrap();

    let reopened = JsonStore::open(env.data_file()).unwrap();
    let period = "2024-02".parse().unwrap();
    assert!(reopened.find_monthly_planning(debt, period).unwrap().is_none());
}
