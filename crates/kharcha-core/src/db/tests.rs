//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn tx(day: u32, description: &str, amount: f64, category: &str) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            description: description.to_string(),
            merchant: crate::merchant::extract_merchant(description),
            amount,
            category: category.to_string(),
        }
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        assert_eq!(db.count_transactions().unwrap(), 0);
        assert_eq!(db.dataset_version().unwrap().version, 0);
        assert!(db.latest_transaction_date().unwrap().is_none());
        assert!(db.list_budgets().unwrap().is_empty());
        assert!(db.list_sessions().unwrap().is_empty());
    }

    #[test]
    fn test_schema_exists() {
        let db = Database::in_memory().unwrap();
        let conn = db.conn().unwrap();

        let result: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('transactions') WHERE name IN ('date', 'description', 'merchant', 'amount', 'category')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(result, 5, "transactions table should have 5 data columns");

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM dataset_meta", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1, "dataset_meta should hold exactly one row");
    }

    #[test]
    fn test_reopen_keeps_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kharcha.db");
        let path = path.to_str().unwrap();

        {
            let db = Database::new_unencrypted(path).unwrap();
            db.replace_transactions(&[tx(1, "Coffee", -5.0, "Food")])
                .unwrap();
        }

        let db = Database::new_unencrypted(path).unwrap();
        assert_eq!(db.dataset_version().unwrap().version, 1);
        assert_eq!(db.count_transactions().unwrap(), 1);
    }

    #[test]
    fn test_replace_transactions_bumps_version() {
        let db = Database::in_memory().unwrap();

        let v1 = db
            .replace_transactions(&[
                tx(1, "Swiggy order", -100.0, "Food"),
                tx(3, "Uber trip", -50.0, "Transport"),
            ])
            .unwrap();
        assert_eq!(v1, 1);
        assert_eq!(db.count_transactions().unwrap(), 2);

        let v2 = db
            .replace_transactions(&[tx(7, "Netflix", -199.0, "Entertainment")])
            .unwrap();
        assert_eq!(v2, 2);

        let stored = db.list_transactions(None).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].merchant, "Netflix");
        assert_eq!(stored[0].date, NaiveDate::from_ymd_opt(2024, 1, 7).unwrap());

        let meta = db.dataset_version().unwrap();
        assert_eq!(meta.version, 2);
        assert!(meta.refreshed_at.is_some());
    }

    #[test]
    fn test_list_transactions_insertion_order_and_limit() {
        let db = Database::in_memory().unwrap();
        db.replace_transactions(&[
            tx(9, "Later", -1.0, "Food"),
            tx(2, "Earlier", -2.0, "Food"),
            tx(5, "Middle", -3.0, "Food"),
        ])
        .unwrap();

        let all = db.list_transactions(None).unwrap();
        let names: Vec<&str> = all.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(names, vec!["Later", "Earlier", "Middle"]);

        assert_eq!(db.list_transactions(Some(2)).unwrap().len(), 2);
    }

    #[test]
    fn test_recent_transactions() {
        let db = Database::in_memory().unwrap();
        db.replace_transactions(&[
            tx(2, "First", -1.0, "Food"),
            tx(5, "Newest A", -2.0, "Food"),
            tx(5, "Newest B", -3.0, "Food"),
        ])
        .unwrap();

        let recent = db.recent_transactions(2).unwrap();
        assert_eq!(recent[0].description, "Newest B");
        assert_eq!(recent[1].description, "Newest A");
        assert_eq!(
            db.latest_transaction_date().unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
    }

    #[test]
    fn test_clear_transactions() {
        let db = Database::in_memory().unwrap();
        db.replace_transactions(&[tx(1, "A", -1.0, "Food"), tx(2, "B", -1.0, "Food")])
            .unwrap();

        let (deleted, version) = db.clear_transactions().unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(version, 2);
        assert_eq!(db.count_transactions().unwrap(), 0);
    }

    #[test]
    fn test_budget_upsert() {
        let db = Database::in_memory().unwrap();

        db.set_budget("Food", 400.0).unwrap();
        db.set_budget("Food", 600.0).unwrap();
        db.set_budget("Bills", 2000.0).unwrap();

        let budgets = db.list_budgets().unwrap();
        assert_eq!(budgets.len(), 2);
        assert_eq!(budgets[0].category, "Bills");
        assert_eq!(budgets[1].monthly_budget, 600.0);
    }

    #[test]
    fn test_budget_validation() {
        let db = Database::in_memory().unwrap();
        assert!(matches!(
            db.set_budget("Food", -1.0),
            Err(Error::InvalidData(_))
        ));
        assert!(matches!(
            db.set_budget("   ", 10.0),
            Err(Error::InvalidData(_))
        ));
        assert!(matches!(
            db.set_budget("Food", f64::NAN),
            Err(Error::InvalidData(_))
        ));
        // Zero is allowed
        assert!(db.set_budget("Health", 0.0).is_ok());
    }

    #[test]
    fn test_deactivate_and_reactivate_budget() {
        let db = Database::in_memory().unwrap();
        db.set_budget("Food", 400.0).unwrap();

        db.deactivate_budget("Food").unwrap();
        assert!(db.list_budgets().unwrap().is_empty());

        let stored = db.get_budget("Food").unwrap().unwrap();
        assert!(!stored.is_active);
        assert_eq!(db.budget_table().unwrap().active_limit("Food"), None);

        // Deactivating twice reports not found
        assert!(matches!(
            db.deactivate_budget("Food"),
            Err(Error::NotFound(_))
        ));

        db.set_budget("Food", 500.0).unwrap();
        assert_eq!(db.budget_table().unwrap().active_limit("Food"), Some(500.0));
    }

    #[test]
    fn test_session_lifecycle() {
        let db = Database::in_memory().unwrap();

        let session = db.create_session(Some("January")).unwrap();
        assert_eq!(session.session_name, "January");
        assert_eq!(session.version, 0);
        assert!(!session.has_data);
        assert_eq!(session.session_id.len(), 36);

        assert!(db.session_transactions(&session.session_id).unwrap().is_empty());

        let version = db
            .store_session_transactions(
                &session.session_id,
                &[tx(4, "Swiggy order", -250.0, "Food")],
            )
            .unwrap();
        assert_eq!(version, 1);

        let fetched = db.get_session(&session.session_id).unwrap().unwrap();
        assert!(fetched.has_data);
        assert_eq!(fetched.version, 1);

        let snapshot = db.session_transactions(&session.session_id).unwrap();
        assert_eq!(snapshot, vec![tx(4, "Swiggy order", -250.0, "Food")]);

        db.delete_session(&session.session_id).unwrap();
        assert!(db.get_session(&session.session_id).unwrap().is_none());
        assert!(matches!(
            db.session_transactions(&session.session_id),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_session_default_name() {
        let db = Database::in_memory().unwrap();
        assert_eq!(
            db.create_session(None).unwrap().session_name,
            "Default Session"
        );
        assert_eq!(
            db.create_session(Some("  ")).unwrap().session_name,
            "Default Session"
        );
    }

    #[test]
    fn test_sessions_are_isolated_from_shared_dataset() {
        let db = Database::in_memory().unwrap();
        db.replace_transactions(&[tx(1, "Shared", -10.0, "Food")])
            .unwrap();

        let a = db.create_session(Some("A")).unwrap();
        let b = db.create_session(Some("B")).unwrap();
        db.store_session_transactions(&a.session_id, &[tx(2, "Only A", -20.0, "Bills")])
            .unwrap();

        // Shared dataset and its version are untouched
        let shared = db.list_transactions(None).unwrap();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].description, "Shared");
        assert_eq!(db.dataset_version().unwrap().version, 1);

        // Other sessions are untouched
        assert!(db.session_transactions(&b.session_id).unwrap().is_empty());
    }

    #[test]
    fn test_missing_session_operations() {
        let db = Database::in_memory().unwrap();
        assert!(matches!(
            db.store_session_transactions("nope", &[]),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(db.touch_session("nope"), Err(Error::NotFound(_))));
        assert!(matches!(db.delete_session("nope"), Err(Error::NotFound(_))));
    }
}
