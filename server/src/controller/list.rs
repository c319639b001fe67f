use crate::app::{AppError, AppResult, AuthenticatedUser};
use chrono::Utc;
use contracts::{create_list, Form};
use database::{self as db, Database};
use std::{convert::TryFrom, sync::Arc};

pub struct ListController {
    list_db: Arc<Database<db::List>>,
    item_db: Arc<Database<db::ListItem>>,
}

impl ListController {
    pub fn new(list_db: Arc<Database<db::List>>, item_db: Arc<Database<db::ListItem>>) -> Self {
        Self { list_db, item_db }
    }

    pub async fn create_list(&self, user: &AuthenticatedUser, form: &Form) -> AppResult<i64> {
        let params = create_list::Params::try_from(form)?;

        let list_id = self
            .list_db
            .insert_list(&params.name, user.id, Utc::now().timestamp())?;
        info!("user {} created list {}", user.id, list_id);

        Ok(list_id)
    }

    pub async fn get_lists(&self, user: &AuthenticatedUser) -> AppResult<Vec<db::List>> {
        Ok(self.list_db.get_lists_by_author(user.id)?)
    }

    /// One list plus its items. Missing and foreign lists both come back as
    /// `NotFound`.
    pub async fn get_list_detail(
        &self,
        user: &AuthenticatedUser,
        list_id: i64,
    ) -> AppResult<(db::List, Vec<db::ListItem>)> {
        let list = self
            .list_db
            .get_owned_list(list_id, user.id)?
            .ok_or_else(AppError::not_found)?;
        let items = self.item_db.get_list_items(list.id)?;

        Ok((list, items))
    }

    pub async fn delete_list(&self, user: &AuthenticatedUser, list_id: i64) -> AppResult<()> {
        let list = self
            .list_db
            .get_owned_list(list_id, user.id)?
            .ok_or_else(AppError::not_found)?;

        self.list_db.delete_list(list.id)?;
        info!("user {} deleted list {}", user.id, list.id);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::app::{test_util::TestApp, App, AuthenticatedUser, ErrorKind};
    use contracts::Form;

    async fn register(app: &App, email: &str) -> AuthenticatedUser {
        let form: Form = format!("name=Someone&email={}&password=pw1", email.replace('@', "%40"))
            .parse()
            .unwrap();
        let user = app.auth().register(&form).await.unwrap();
        app.resolve_user(user.id).unwrap()
    }

    async fn create_list(app: &App, user: &AuthenticatedUser, name: &str) -> i64 {
        let form: Form = format!("name={}", name).parse().unwrap();
        app.lists().create_list(user, &form).await.unwrap()
    }

    #[tokio::test]
    async fn new_lists_start_incomplete_and_in_insertion_order() {
        let test_app = TestApp::new();
        let app = &test_app.app;
        let ann = register(app, "ann@x.com").await;

        create_list(app, &ann, "Groceries").await;
        create_list(app, &ann, "Chores").await;

        let lists = app.lists().get_lists(&ann).await.unwrap();
        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0].name, "Groceries");
        assert_eq!(lists[1].name, "Chores");
        assert!(lists.iter().all(|list| !list.done));
    }

    #[tokio::test]
    async fn foreign_list_is_not_found() {
        let test_app = TestApp::new();
        let app = &test_app.app;
        let ann = register(app, "ann@x.com").await;
        let ben = register(app, "ben@x.com").await;

        let list_id = create_list(app, &ann, "Groceries").await;

        let error = app.lists().get_list_detail(&ben, list_id).await.unwrap_err();
        assert_eq!(*error.kind(), ErrorKind::NotFound);

        let error = app.lists().delete_list(&ben, list_id).await.unwrap_err();
        assert_eq!(*error.kind(), ErrorKind::NotFound);

        // still there for its owner
        assert!(app.lists().get_list_detail(&ann, list_id).await.is_ok());
    }

    #[tokio::test]
    async fn deleting_a_list_removes_its_items() {
        let test_app = TestApp::new();
        let app = &test_app.app;
        let ann = register(app, "ann@x.com").await;

        let list_id = create_list(app, &ann, "Groceries").await;
        let item_form: Form = "body=Milk".parse().unwrap();
        let item_id = app
            .list_items()
            .create_item(&ann, list_id, &item_form)
            .await
            .unwrap();

        app.lists().delete_list(&ann, list_id).await.unwrap();

        let error = app.lists().get_list_detail(&ann, list_id).await.unwrap_err();
        assert_eq!(*error.kind(), ErrorKind::NotFound);
        let error = app
            .list_items()
            .get_owned_item(&ann, item_id)
            .await
            .unwrap_err();
        assert_eq!(*error.kind(), ErrorKind::NotFound);
    }
}
