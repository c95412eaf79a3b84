use std::ops::Deref;

use derive_new::new;

use crate::database::Database;

#[derive(Debug, Clone, new)]
pub struct App {
    pub database: Database,
}

impl Deref for App {
    type Target = Database;

    fn deref(&self) -> &Self::Target {
        &self.database
    }
}
