use super::Store;
use crate::db::{read_or_default, with_connection};
use crate::error::{is_fk_violation, is_unique_violation, AppError};
use crate::models::{Category, CategoryInput};
use crate::validation::validate_category_input;
use log::info;

/// A write for a user id with no row fails the foreign key.
fn user_must_exist(e: AppError) -> AppError {
    match e.engine_error() {
        Some(db_err) if is_fk_violation(db_err) => AppError::NotFound { entity: "User" },
        Some(_) | None => e,
    }
}

fn trimmed(input: &CategoryInput) -> CategoryInput {
    CategoryInput {
        name: input.name.trim().to_string(),
        ..input.clone()
    }
}

impl Store {
    /// Categories of a user, newest first.
    pub fn list_categories(&self, user_id: i64) -> Vec<Category> {
        read_or_default(&self.db, "load categories", |conn| Category::find_by_user(conn, user_id))
    }

    /// Create a category. A name the user already has is a no-op and returns `None`.
    pub fn create_category(&self, user_id: i64, input: &CategoryInput) -> Result<Option<Category>, AppError> {
        validate_category_input(input)?;
        let input = trimmed(input);

        let created = with_connection(&self.db, "save category", |conn| {
            Category::insert_or_ignore(conn, user_id, &input)
        })
        .map_err(user_must_exist)?;

        match &created {
            Some(category) => info!("Category saved: {}", category.name),
            None => info!("Category {} already exists, skipped", input.name),
        }
        Ok(created)
    }

    /// Returns `false` when no category has this id. Renaming onto a name the
    /// user already has fails with `AlreadyExists`.
    pub fn update_category(&self, id: i64, input: &CategoryInput) -> Result<bool, AppError> {
        validate_category_input(input)?;
        let input = trimmed(input);

        let found = with_connection(&self.db, "update category", |conn| Category::update(conn, id, &input))
            .map_err(|e| match e.engine_error() {
                Some(db_err) if is_unique_violation(db_err) => AppError::AlreadyExists {
                    name: input.name.clone(),
                },
                Some(_) | None => e,
            })?;
        if found {
            info!("Category updated: {}", input.name);
        }
        Ok(found)
    }

    pub fn delete_category(&self, id: i64) -> Result<bool, AppError> {
        let found = with_connection(&self.db, "delete category", |conn| Category::delete(conn, id))?;
        if found {
            info!("Category deleted: {id}");
        }
        Ok(found)
    }

    /// Seed the default categories for a user that has none.
    pub fn ensure_default_categories(&self, user_id: i64) -> Result<usize, AppError> {
        let inserted = with_connection(&self.db, "seed default categories", |conn| {
            Category::seed_defaults(conn, user_id)
        })
        .map_err(user_must_exist)?;
        if inserted > 0 {
            info!("Seeded {inserted} default categories for user {user_id}");
        }
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::AppError;
    use crate::models::{CategoryInput, Priority};
    use crate::test_utils::{sample_user, setup_test_store};

    fn input(name: &str) -> CategoryInput {
        CategoryInput {
            name: name.to_string(),
            priority: Some(Priority::Low),
            notes: None,
        }
    }

    #[test]
    fn test_duplicate_create_is_a_no_op() {
        let (store, _dir) = setup_test_store();
        let ada = store.upsert_user(&sample_user("ada")).unwrap();

        assert!(store.create_category(ada, &input("Chores")).unwrap().is_some());
        assert!(store.create_category(ada, &input("  Chores ")).unwrap().is_none());

        let chores = store.list_categories(ada).into_iter().filter(|c| c.name == "Chores").count();
        assert_eq!(chores, 1);
    }

    #[test]
    fn test_same_name_for_different_users() {
        let (store, _dir) = setup_test_store();
        let ada = store.upsert_user(&sample_user("ada")).unwrap();
        let grace = store.upsert_user(&sample_user("grace")).unwrap();

        assert!(store.create_category(ada, &input("Chores")).unwrap().is_some());
        assert!(store.create_category(grace, &input("Chores")).unwrap().is_some());
        assert_eq!(store.list_categories(grace).len(), 1);
    }

    #[test]
    fn test_create_for_missing_user_is_not_found() {
        let (store, _dir) = setup_test_store();
        assert!(matches!(
            store.create_category(7, &input("Chores")),
            Err(AppError::NotFound { entity: "User" })
        ));
    }

    #[test]
    fn test_empty_name_is_invalid() {
        let (store, _dir) = setup_test_store();
        let ada = store.upsert_user(&sample_user("ada")).unwrap();
        assert!(matches!(
            store.create_category(ada, &input("   ")),
            Err(AppError::InvalidInput { field: "name", .. })
        ));
    }

    #[test]
    fn test_rename_onto_existing_name_fails() {
        let (store, _dir) = setup_test_store();
        let ada = store.upsert_user(&sample_user("ada")).unwrap();
        store.create_category(ada, &input("Chores")).unwrap();
        let errands = store.create_category(ada, &input("Errands")).unwrap().unwrap();

        match store.update_category(errands.id, &input("Chores")) {
            Err(AppError::AlreadyExists { name }) => assert_eq!(name, "Chores"),
            other => panic!("expected AlreadyExists, got {other:?}"),
        }
        assert!(store.update_category(errands.id, &input("Shopping")).unwrap());
        assert!(!store.update_category(errands.id + 100, &input("Other")).unwrap());
    }

    #[test]
    fn test_delete_reports_found() {
        let (store, _dir) = setup_test_store();
        let ada = store.upsert_user(&sample_user("ada")).unwrap();
        let chores = store.create_category(ada, &input("Chores")).unwrap().unwrap();

        assert!(store.delete_category(chores.id).unwrap());
        assert!(!store.delete_category(chores.id).unwrap());
    }

    #[test]
    fn test_default_categories_seeded_once() {
        let (store, _dir) = setup_test_store();
        let ada = store.upsert_user(&sample_user("ada")).unwrap();

        assert_eq!(store.ensure_default_categories(ada).unwrap(), 3);
        assert_eq!(store.ensure_default_categories(ada).unwrap(), 0);
        assert_eq!(store.list_categories(ada).len(), 3);
    }

    #[test]
    fn test_default_categories_for_missing_user_is_not_found() {
        let (store, _dir) = setup_test_store();
        assert!(matches!(
            store.ensure_default_categories(7),
            Err(AppError::NotFound { entity: "User" })
        ));
    }

    #[test]
    fn test_deleting_users_cascades() {
        let (store, _dir) = setup_test_store();
        let ada = store.upsert_user(&sample_user("ada")).unwrap();
        store.ensure_default_categories(ada).unwrap();

        store.delete_all_users().unwrap();
        assert!(store.list_categories(ada).is_empty());
    }
}
