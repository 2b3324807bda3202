use diesel::prelude::*;

use crate::domain::types::UserId;
use crate::domain::user::{NewUser, User};
use crate::models::user::{NewUser as DbNewUser, User as DbUser};
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, UserReader, UserWriter};

impl UserReader for DieselRepository {
    fn list_users(&self) -> RepositoryResult<Vec<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let items = users::table
            .order(users::name.asc())
            .load::<DbUser>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<User>, _>>()?;

        Ok(items)
    }

    fn get_user_by_id(&self, id: &UserId) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let user = users::table
            .filter(users::id.eq(id.as_str()))
            .first::<DbUser>(&mut conn)
            .optional()?;

        Ok(user.map(TryInto::try_into).transpose()?)
    }
}

impl UserWriter for DieselRepository {
    fn create_user(&self, user: &NewUser) -> RepositoryResult<usize> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let row: DbNewUser = user.clone().into();

        let affected = diesel::insert_into(users::table)
            .values(row)
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn update_user(&self, user: &NewUser) -> RepositoryResult<usize> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let affected = diesel::update(users::table.filter(users::id.eq(user.id.as_str())))
            .set((
                users::name.eq(&user.name),
                users::email.eq(&user.email),
                users::role.eq(user.role.as_str()),
            ))
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn delete_user(&self, id: &UserId) -> RepositoryResult<usize> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let affected = diesel::delete(users::table.filter(users::id.eq(id.as_str())))
            .execute(&mut conn)?;

        Ok(affected)
    }
}
