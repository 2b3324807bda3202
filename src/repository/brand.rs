use diesel::prelude::*;

use crate::domain::brand::Brand;
use crate::domain::types::BrandName;
use crate::models::brand::{Brand as DbBrand, NewBrand as DbNewBrand};
use crate::repository::errors::RepositoryResult;
use crate::repository::{BrandReader, BrandWriter, DieselRepository};

impl BrandReader for DieselRepository {
    fn list_brands(&self) -> RepositoryResult<Vec<Brand>> {
        use crate::schema::brands;

        let mut conn = self.conn()?;

        let items = brands::table
            .order(brands::name.asc())
            .load::<DbBrand>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Brand>, _>>()?;

        Ok(items)
    }

    fn get_brand_by_name(&self, name: &BrandName) -> RepositoryResult<Option<Brand>> {
        use crate::schema::brands;

        let mut conn = self.conn()?;

        // The name column carries COLLATE NOCASE, so equality is already
        // case-insensitive.
        let brand = brands::table
            .filter(brands::name.eq(name.as_str()))
            .first::<DbBrand>(&mut conn)
            .optional()?;

        Ok(brand.map(TryInto::try_into).transpose()?)
    }
}

impl BrandWriter for DieselRepository {
    fn get_or_create_brand(&self, name: &BrandName) -> RepositoryResult<Brand> {
        use crate::schema::brands;

        let mut conn = self.conn()?;

        // Deduplicating upsert: the unique NOCASE constraint makes the insert
        // a no-op when the brand already exists, so concurrent importers of
        // the same unseen name converge on a single row.
        diesel::insert_or_ignore_into(brands::table)
            .values(DbNewBrand {
                name: name.as_str().to_string(),
            })
            .execute(&mut conn)?;

        let brand = brands::table
            .filter(brands::name.eq(name.as_str()))
            .first::<DbBrand>(&mut conn)?;

        Ok(brand.try_into()?)
    }
}
