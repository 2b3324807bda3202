use chrono::Utc;
use diesel::prelude::*;

use crate::domain::product::{LOW_STOCK_THRESHOLD, NewProduct, Product, ProductType};
use crate::domain::types::ProductId;
use crate::models::product::{
    Accessory as DbAccessory, Cellphone as DbCellphone, NewAccessory, NewCellphone,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, ProductListQuery, ProductReader, ProductWriter};

impl DieselRepository {
    fn load_cellphones(
        &self,
        conn: &mut crate::db::DbConnection,
        low_stock_only: bool,
    ) -> RepositoryResult<Vec<Product>> {
        use crate::schema::{brands, cellphones};

        let mut query = cellphones::table
            .left_join(brands::table)
            .select((cellphones::all_columns, brands::name.nullable()))
            .order(cellphones::id.asc())
            .into_boxed::<diesel::sqlite::Sqlite>();

        if low_stock_only {
            query = query
                .filter(cellphones::stock.gt(0))
                .filter(cellphones::stock.lt(LOW_STOCK_THRESHOLD));
        }

        let rows = query.load::<(DbCellphone, Option<String>)>(conn)?;

        rows.into_iter()
            .map(|(row, brand)| row.into_product(brand).map_err(RepositoryError::from))
            .collect()
    }

    fn load_accessories(
        &self,
        conn: &mut crate::db::DbConnection,
        low_stock_only: bool,
    ) -> RepositoryResult<Vec<Product>> {
        use crate::schema::{accessories, brands};

        let mut query = accessories::table
            .left_join(brands::table)
            .select((accessories::all_columns, brands::name.nullable()))
            .order(accessories::id.asc())
            .into_boxed::<diesel::sqlite::Sqlite>();

        if low_stock_only {
            query = query
                .filter(accessories::stock.gt(0))
                .filter(accessories::stock.lt(LOW_STOCK_THRESHOLD));
        }

        let rows = query.load::<(DbAccessory, Option<String>)>(conn)?;

        rows.into_iter()
            .map(|(row, brand)| row.into_product(brand).map_err(RepositoryError::from))
            .collect()
    }
}

impl ProductReader for DieselRepository {
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<Vec<Product>> {
        let mut conn = self.conn()?;

        let mut items = Vec::new();
        if query.product_type != Some(ProductType::Accessory) {
            items.extend(self.load_cellphones(&mut conn, false)?);
        }
        if query.product_type != Some(ProductType::Cellphone) {
            items.extend(self.load_accessories(&mut conn, false)?);
        }

        Ok(items)
    }

    fn get_product(
        &self,
        product_type: ProductType,
        id: ProductId,
    ) -> RepositoryResult<Option<Product>> {
        use crate::schema::{accessories, brands, cellphones};

        let mut conn = self.conn()?;

        match product_type {
            ProductType::Cellphone => {
                let row = cellphones::table
                    .left_join(brands::table)
                    .filter(cellphones::id.eq(id.get()))
                    .select((cellphones::all_columns, brands::name.nullable()))
                    .first::<(DbCellphone, Option<String>)>(&mut conn)
                    .optional()?;

                Ok(row
                    .map(|(row, brand)| row.into_product(brand))
                    .transpose()?)
            }
            ProductType::Accessory => {
                let row = accessories::table
                    .left_join(brands::table)
                    .filter(accessories::id.eq(id.get()))
                    .select((accessories::all_columns, brands::name.nullable()))
                    .first::<(DbAccessory, Option<String>)>(&mut conn)
                    .optional()?;

                Ok(row
                    .map(|(row, brand)| row.into_product(brand))
                    .transpose()?)
            }
        }
    }

    fn list_low_stock_products(&self) -> RepositoryResult<Vec<Product>> {
        let mut conn = self.conn()?;

        let mut items = self.load_cellphones(&mut conn, true)?;
        items.extend(self.load_accessories(&mut conn, true)?);

        Ok(items)
    }
}

impl ProductWriter for DieselRepository {
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<usize> {
        use crate::schema::{accessories, cellphones};

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        let affected = match product.kind.product_type() {
            ProductType::Cellphone => {
                let row = NewCellphone::from_domain(product, now)
                    .ok_or_else(|| RepositoryError::Validation("not a cellphone".into()))?;
                diesel::insert_into(cellphones::table)
                    .values(row)
                    .execute(&mut conn)?
            }
            ProductType::Accessory => {
                let row = NewAccessory::from_domain(product, now)
                    .ok_or_else(|| RepositoryError::Validation("not an accessory".into()))?;
                diesel::insert_into(accessories::table)
                    .values(row)
                    .execute(&mut conn)?
            }
        };

        Ok(affected)
    }

    fn update_product(&self, id: ProductId, product: &NewProduct) -> RepositoryResult<usize> {
        use crate::schema::{accessories, cellphones};

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        let affected = match product.kind.product_type() {
            ProductType::Cellphone => {
                let row = NewCellphone::from_domain(product, now)
                    .ok_or_else(|| RepositoryError::Validation("not a cellphone".into()))?;
                diesel::update(cellphones::table.filter(cellphones::id.eq(id.get())))
                    .set(row)
                    .execute(&mut conn)?
            }
            ProductType::Accessory => {
                let row = NewAccessory::from_domain(product, now)
                    .ok_or_else(|| RepositoryError::Validation("not an accessory".into()))?;
                diesel::update(accessories::table.filter(accessories::id.eq(id.get())))
                    .set(row)
                    .execute(&mut conn)?
            }
        };

        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(affected)
    }

    fn delete_product(&self, product_type: ProductType, id: ProductId) -> RepositoryResult<usize> {
        use crate::schema::{accessories, cellphones};

        let mut conn = self.conn()?;

        let affected = match product_type {
            ProductType::Cellphone => {
                diesel::delete(cellphones::table.filter(cellphones::id.eq(id.get())))
                    .execute(&mut conn)?
            }
            ProductType::Accessory => {
                diesel::delete(accessories::table.filter(accessories::id.eq(id.get())))
                    .execute(&mut conn)?
            }
        };

        Ok(affected)
    }
}
